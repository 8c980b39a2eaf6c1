//! Serialization of boundary conditions into forcing blocks.
//!
//! Builds one raw block per data point of a condition: function name chosen
//! from the schema family (the profile companion when the point carries a
//! non-uniform profile), quantity strings reconstructed from the variable
//! name, component suffix and tracer or fraction identity, the time axis
//! written as offsets from a reference date and harmonic frequencies written
//! back as periods in minutes.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::app::models::{
    period_in_minutes, ArgumentAxis, BoundaryConditionSet, FlowBoundaryCondition, FlowQuantity,
    ForcingKind,
};
use crate::app::services::bc_file::{BcBlockData, BcQuantityData};
use crate::app::services::boundary_assembler::values::{datetime_unit, format_double};
use crate::app::services::forcing_catalog::{ForcingCatalog, ForcingSchema};
use crate::constants::{COMPACT_DATETIME_FORMAT, MINUTES_UNIT};

/// Builder turning structured boundary conditions back into raw blocks
#[derive(Debug, Clone)]
pub struct BcBlockBuilder {
    catalog: Arc<ForcingCatalog>,
}

impl BcBlockBuilder {
    pub fn new(catalog: Arc<ForcingCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ForcingCatalog {
        &self.catalog
    }

    /// Build one block per data point of a condition.
    ///
    /// In a correction pass only the correction components of a correction
    /// condition are written under its correction function name; in a normal
    /// pass the signal components go out under the base name.
    pub fn build_blocks(
        &self,
        condition: &FlowBoundaryCondition,
        set: &BoundaryConditionSet,
        reference_date: Option<NaiveDateTime>,
        series_index: usize,
        correction_file: bool,
    ) -> Vec<BcBlockData> {
        let mut blocks = Vec::new();
        for &point in condition.point_indices() {
            if let Some(block) =
                self.build_block_at(condition, set, point, reference_date, series_index, correction_file)
            {
                blocks.push(block);
            }
        }
        blocks
    }

    fn build_block_at(
        &self,
        condition: &FlowBoundaryCondition,
        set: &BoundaryConditionSet,
        point: usize,
        reference_date: Option<NaiveDateTime>,
        series_index: usize,
        correction_file: bool,
    ) -> Option<BcBlockData> {
        let point_name = set.support_point_names.get(point).cloned().unwrap_or_else(|| {
            set.feature_name.clone()
        });

        // the kernel wants the actual point name for discharges even though
        // the condition is defined per boundary
        let support_point = if condition.is_horizontally_uniform()
            && condition.quantity != FlowQuantity::Discharge
        {
            set.feature_name.clone()
        } else {
            point_name
        };

        let write_kind = if correction_file {
            condition.kind
        } else {
            condition.kind.base_kind().unwrap_or(condition.kind)
        };

        let profile = condition
            .profile_at(point)
            .filter(|_| !condition.is_vertically_uniform());

        let schemas = self.catalog.schemas_for_kind(write_kind);
        let schema: &ForcingSchema = match (schemas.first(), schemas.get(1)) {
            (Some(&plain), Some(&layered)) => {
                if profile.is_some() {
                    layered
                } else {
                    plain
                }
            }
            (Some(&only), None) => only,
            _ => {
                warn!(
                    "Boundary condition function type {:?} not supported by bc file writer; skipping condition.",
                    condition.kind
                );
                return None;
            }
        };

        let mut block = BcBlockData {
            support_point,
            function_type: schema.name.to_string(),
            ..Default::default()
        };

        if series_index > 0 {
            // one-based in the file
            block.series_index = Some((series_index + 1).to_string());
        }

        let data = condition.data_at(point)?;

        if matches!(data.argument, ArgumentAxis::Times(_)) {
            block.time_interpolation = condition
                .time_interpolation
                .map(|t| t.as_str().to_string());
        }

        if let Some(profile) = profile {
            block.vertical_position_type = Some(profile.kind.as_str().to_string());
            block.vertical_position_spec = profile.spec_string();
            block.vertical_interpolation = condition
                .vertical_interpolation
                .as_str()
                .map(|s| s.to_string());
        }

        if condition.offset != 0.0 {
            block.offset = Some(format!("{:.7e}", condition.offset));
        }
        if condition.factor != 1.0 {
            block.factor = Some(format!("{:.7e}", condition.factor));
        }

        block
            .quantities
            .push(self.argument_quantity(condition, schema, data, reference_date));

        let skip_signal = condition.kind.is_correction() && correction_file;
        let skip_correction = condition.kind.is_correction() && !correction_file;

        let mut component_count = schema.component_count();
        if skip_signal || skip_correction {
            component_count += 2;
        }

        let variables = self.catalog.names_for_quantity(condition.quantity);
        if variables.is_empty() {
            warn!(
                "Flow quantity {:?} not supported by bc file writer",
                condition.quantity
            );
            return None;
        }
        let components_per_layer = component_count * variables.len();

        for (j, values) in data.components.iter().enumerate() {
            let component_index = j % component_count;

            if (skip_signal && component_index < 2) || (skip_correction && component_index > 1) {
                continue;
            }

            let variable_index = (j % components_per_layer) / component_count;
            let layer_index = j / components_per_layer + 1;

            let suffix = schema.components[if skip_signal {
                component_index - 2
            } else {
                component_index
            }];

            let mut quantity_string = if suffix.is_empty() {
                variables[variable_index].to_string()
            } else if condition.kind == ForcingKind::QhTable {
                suffix.to_string()
            } else {
                format!("{} {}", variables[variable_index], suffix)
            };

            match condition.quantity {
                FlowQuantity::Tracer => {
                    if let Some(tracer) = &condition.tracer_name {
                        quantity_string.push('_');
                        quantity_string.push_str(tracer);
                    }
                }
                FlowQuantity::SedimentConcentration
                    if condition.kind == ForcingKind::TimeSeries =>
                {
                    if let Some(fraction) = &condition.sediment_fraction {
                        quantity_string.push_str(fraction);
                    }
                }
                _ => {}
            }

            block.quantities.push(BcQuantityData {
                quantity_name: quantity_string,
                unit: Some(component_unit(condition.quantity, suffix).to_string()),
                vertical_position: profile.map(|_| layer_index.to_string()),
                values: values.iter().map(|v| format_double(*v)).collect(),
            });
        }

        Some(block)
    }

    /// Argument column of a block: the independent axis rendered as strings
    fn argument_quantity(
        &self,
        condition: &FlowBoundaryCondition,
        schema: &ForcingSchema,
        data: &crate::app::models::PointData,
        reference_date: Option<NaiveDateTime>,
    ) -> BcQuantityData {
        let role_name = schema.arguments[0].to_string();

        let (unit, values) = match &data.argument {
            ArgumentAxis::Times(times) => match reference_date {
                Some(reference) => (
                    Some(datetime_unit(reference, condition.time_zone)),
                    times
                        .iter()
                        .map(|t| {
                            format_double((*t - reference).num_milliseconds() as f64 / 1000.0)
                        })
                        .collect(),
                ),
                None => (
                    None,
                    times
                        .iter()
                        .map(|t| t.format(COMPACT_DATETIME_FORMAT).to_string())
                        .collect(),
                ),
            },
            ArgumentAxis::Frequencies(frequencies) => (
                Some(MINUTES_UNIT.to_string()),
                frequencies
                    .iter()
                    .map(|f| format_double(period_in_minutes(*f)))
                    .collect(),
            ),
            ArgumentAxis::AstroComponents(names) => (Some("-".to_string()), names.clone()),
            ArgumentAxis::Discharges(discharges) => (
                Some("m3/s".to_string()),
                discharges.iter().map(|d| format_double(*d)).collect(),
            ),
        };

        BcQuantityData {
            quantity_name: role_name,
            unit,
            vertical_position: None,
            values,
        }
    }
}

impl Default for BcBlockBuilder {
    fn default() -> Self {
        Self::new(Arc::new(ForcingCatalog::standard()))
    }
}

/// Unit written for a component column
fn component_unit(quantity: FlowQuantity, suffix: &str) -> &'static str {
    if suffix == "phase" {
        return "deg";
    }
    match quantity {
        FlowQuantity::WaterLevel | FlowQuantity::Riemann | FlowQuantity::Neumann => "m",
        FlowQuantity::Discharge => "m3/s",
        FlowQuantity::Velocity
        | FlowQuantity::VelocityVector
        | FlowQuantity::RiemannVelocity
        | FlowQuantity::NormalVelocity
        | FlowQuantity::TangentVelocity => "m/s",
        FlowQuantity::Salinity => "ppt",
        FlowQuantity::Temperature => "degC",
        FlowQuantity::Tracer | FlowQuantity::SedimentConcentration => "-",
    }
}
