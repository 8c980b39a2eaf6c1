//! Block insertion state machine.
//!
//! Merges one parsed forcing block into a collection of boundary condition
//! sets: set matching by support point, header parsing with per-property
//! warnings, column classification, condition find-or-create at the block's
//! series index, correction overlay onto existing signals and per-point
//! value assignment with rollback on failure.

use tracing::{error, info, warn};

use super::values::{parse_datetimes, parse_doubles, parse_time_zone};
use super::BoundaryDataBuilder;
use crate::app::models::vertical::parse_profile_kind;
use crate::app::models::{
    ArgumentAxis, BoundaryConditionSet, FlowBoundaryCondition, FlowQuantity, TimeInterpolation,
    VerticalInterpolation, VerticalProfile,
};
use crate::app::services::bc_file::BcBlockData;
use crate::app::services::forcing_catalog::ForcingSchema;
use crate::app::services::quantity_classifier::{
    fraction_name, BlockClassification, ClassifiedBlock, ClassifiedComponent,
};
use crate::{Error, Result};

/// What happened to a block offered for insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Merged, or intentionally skipped for good
    Consumed,
    /// Not usable in this pass; retry after other blocks have gone in
    Deferred,
    /// Malformed or unmatchable, dropped with a warning
    Rejected,
}

/// Block header resolved against a forcing schema
struct ParsedHeader<'a> {
    schema: &'a ForcingSchema,
    profile: VerticalProfile,
    vertical_interpolation: VerticalInterpolation,
    time_interpolation: Option<TimeInterpolation>,
    series_index: usize,
    offset: f64,
    factor: f64,
}

impl BoundaryDataBuilder {
    /// Merge one block into the matching boundary condition set
    pub fn insert_block(
        &self,
        sets: &mut [BoundaryConditionSet],
        block: &BcBlockData,
        time_lag: Option<f64>,
    ) -> InsertOutcome {
        let Some(set_index) = sets
            .iter()
            .position(|s| s.matches_support_point(&block.support_point))
        else {
            warn!(
                "{}: support point {} was not found in boundaries; omitting data block.",
                block.context(),
                block.support_point
            );
            return InsertOutcome::Rejected;
        };

        if let Some(filter) = &self.options.location_filter {
            if sets[set_index].feature_name != *filter {
                return InsertOutcome::Deferred;
            }
        }

        let Some(schema) = self.catalog.lookup(&block.function_type) else {
            warn!(
                "{}: function type {} could not be parsed; omitting data block.",
                block.context(),
                block.function_type
            );
            return InsertOutcome::Rejected;
        };

        if self.options.excluded_kinds.contains(&schema.kind) {
            info!(
                "{}: skipping boundary data of function type {:?}.",
                block.context(),
                schema.kind
            );
            return InsertOutcome::Consumed;
        }

        let Some(header) = self.parse_header(block, schema) else {
            return InsertOutcome::Rejected;
        };

        let classified = match self.classifier.classify(block, schema) {
            BlockClassification::Classified(classified) => classified,
            BlockClassification::Deferred => return InsertOutcome::Deferred,
        };

        let mut skipped_any = false;
        for quantity in classified.quantity_groups() {
            if self.options.excluded_quantities.contains(&quantity) {
                skipped_any = true;
                continue;
            }
            self.insert_quantity_group(
                &mut sets[set_index],
                block,
                &header,
                &classified,
                quantity,
                time_lag,
            );
        }

        if skipped_any {
            InsertOutcome::Deferred
        } else {
            InsertOutcome::Consumed
        }
    }

    /// Parse and validate the block header against its schema
    fn parse_header<'a>(
        &self,
        block: &BcBlockData,
        schema: &'a ForcingSchema,
    ) -> Option<ParsedHeader<'a>> {
        let profile = match &block.vertical_position_type {
            None => VerticalProfile::uniform(),
            Some(type_name) => {
                let Some(kind) = parse_profile_kind(type_name) else {
                    warn!(
                        "{}: vertical position type {} could not be parsed; omitting data block.",
                        block.context(),
                        type_name
                    );
                    return None;
                };
                if kind.has_point_depths() {
                    let spec = block.vertical_position_spec.as_deref().unwrap_or("");
                    let depths: std::result::Result<Vec<f64>, _> =
                        spec.split_whitespace().map(str::parse).collect();
                    match depths {
                        Ok(depths) => VerticalProfile::create(kind, depths),
                        Err(_) => {
                            warn!(
                                "{}: vertical positions {} could not be parsed; omitting data block.",
                                block.context(),
                                spec
                            );
                            return None;
                        }
                    }
                } else {
                    VerticalProfile::create(kind, Vec::new())
                }
            }
        };

        let vertical_interpolation =
            match VerticalInterpolation::parse(block.vertical_interpolation.as_deref()) {
                Some(interpolation) => interpolation,
                None => {
                    warn!(
                        "{}: vertical interpolation type {:?} could not be parsed; assuming uniform.",
                        block.context(),
                        block.vertical_interpolation
                    );
                    VerticalInterpolation::Uniform
                }
            };

        let time_interpolation = block.time_interpolation.as_deref().and_then(|name| {
            let parsed = TimeInterpolation::parse(name);
            if parsed.is_none() {
                warn!(
                    "{}: time interpolation type {} could not be parsed; assuming linear.",
                    block.context(),
                    name
                );
            }
            parsed
        });

        let series_index = match &block.series_index {
            None => 0,
            // one-based in the file
            Some(text) => match text.trim().parse::<usize>() {
                Ok(index) if index >= 1 => index - 1,
                _ => {
                    warn!(
                        "{}: series index {} could not be parsed; omitting data block.",
                        block.context(),
                        text
                    );
                    return None;
                }
            },
        };

        let offset = match &block.offset {
            None => 0.0,
            Some(text) => match text.trim().parse::<f64>() {
                Ok(value) => value,
                Err(_) => {
                    warn!(
                        "{}: offset {} could not be parsed; omitting data block.",
                        block.context(),
                        text
                    );
                    return None;
                }
            },
        };

        let factor = match &block.factor {
            None => 1.0,
            Some(text) => match text.trim().parse::<f64>() {
                Ok(value) => value,
                Err(_) => {
                    warn!(
                        "{}: factor {} could not be parsed; omitting data block.",
                        block.context(),
                        text
                    );
                    return None;
                }
            },
        };

        Some(ParsedHeader {
            schema,
            profile,
            vertical_interpolation,
            time_interpolation,
            series_index,
            offset,
            factor,
        })
    }

    /// Merge the component columns of one quantity into its condition
    fn insert_quantity_group(
        &self,
        set: &mut BoundaryConditionSet,
        block: &BcBlockData,
        header: &ParsedHeader<'_>,
        classified: &ClassifiedBlock,
        quantity: FlowQuantity,
        time_lag: Option<f64>,
    ) {
        let components = classified.components_of(quantity);
        let Some(first) = components.first() else {
            return;
        };

        let tracer_name = first.tracer_name.clone();
        let fraction = (quantity == FlowQuantity::SedimentConcentration)
            .then(|| fraction_name(&block.quantities[first.column].quantity_name));

        let matching: Vec<usize> = set
            .conditions
            .iter()
            .enumerate()
            .filter(|(_, bc)| {
                bc.quantity == quantity
                    && (quantity != FlowQuantity::Tracer || bc.tracer_name == tracer_name)
                    && (quantity != FlowQuantity::SedimentConcentration
                        || bc.sediment_fraction == fraction)
                    && bc.kind.accepts(header.schema.kind)
            })
            .map(|(index, _)| index)
            .collect();

        let condition_index = match matching.get(header.series_index) {
            Some(&index) => index,
            None => {
                let is_correction = header.schema.kind.is_correction();
                if self.options.can_create_new_boundary_condition && !is_correction {
                    let mut condition = FlowBoundaryCondition::new(quantity, header.schema.kind);
                    condition.tracer_name = tracer_name;
                    condition.sediment_fraction = fraction;
                    if let Some(lag) = time_lag {
                        condition.thatcher_harleman_lag = lag;
                    }
                    set.conditions.push(condition);
                    set.conditions.len() - 1
                } else {
                    warn!(
                        "{}: quantity {:?} and forcing type {:?} do not match given boundary condition.",
                        block.context(),
                        quantity,
                        header.schema.kind
                    );
                    return;
                }
            }
        };

        let feature_name_matches = block.support_point == set.feature_name;
        let point_index = set
            .support_point_names
            .iter()
            .position(|name| *name == block.support_point);
        let point_count = set.support_point_names.len();

        let condition = &mut set.conditions[condition_index];

        if header.schema.kind.is_correction() && !condition.kind.is_correction() {
            condition.upgrade_to_correction();
        }

        condition.offset = header.offset;
        condition.factor = header.factor;

        let point_index = if condition.is_horizontally_uniform() {
            if feature_name_matches {
                Some(0)
            } else if point_index != Some(0) {
                info!(
                    "{}: {:?} uniform boundary condition cannot be specified at point {}; omitting data columns.",
                    block.context(),
                    quantity,
                    block.support_point
                );
                return;
            } else {
                Some(0)
            }
        } else {
            point_index
        };

        // addressed by feature name: the data applies to every support point
        let data_points: Vec<usize> = match point_index {
            Some(index) => vec![index],
            None => (0..point_count).collect(),
        };

        let variables = self.catalog.variable_count(quantity);
        let components_per_layer = if condition.kind.is_correction() {
            header.schema.component_count() + 2
        } else {
            header.schema.component_count()
        } * variables;
        let storage = components_per_layer * header.profile.layer_count();

        for point in data_points {
            let added = if condition.point_position(point).is_none() {
                condition.add_point(point, header.profile.clone(), storage);
                true
            } else if !self.options.overwrite_existing_data {
                info!(
                    "{}: {:?} boundary condition already contains data at point {}; omitting data columns.",
                    block.context(),
                    quantity,
                    block.support_point
                );
                continue;
            } else {
                false
            };

            if !condition.is_vertically_uniform() {
                condition.set_profile_at(point, header.profile.clone());
            }
            condition.vertical_interpolation = header.vertical_interpolation;

            let result = if header.schema.kind.is_correction() {
                write_correction_data(condition, point, block, classified, &components)
            } else {
                write_signal_data(condition, point, block, header, classified, &components)
            };

            if let Err(e) = result {
                error!(
                    "Skipped: data point {} for boundary condition could not be added during import: {}",
                    point, e
                );
                if added {
                    condition.remove_point(point);
                }
            }
        }
    }
}

/// Assign argument and component columns of a plain signal block
fn write_signal_data(
    condition: &mut FlowBoundaryCondition,
    point: usize,
    block: &BcBlockData,
    header: &ParsedHeader<'_>,
    classified: &ClassifiedBlock,
    components: &[&ClassifiedComponent],
) -> Result<()> {
    let context = block.context();

    for (role, column) in &classified.arguments {
        if *role >= header.schema.arguments.len() {
            return Err(Error::format(
                context.clone(),
                format!("argument role {role} out of range"),
            ));
        }
        let quantity_data = &block.quantities[*column];
        let unit = quantity_data.unit.as_deref();

        let mut is_time_axis = false;
        {
            let data = condition
                .data_at_mut(point)
                .ok_or_else(|| Error::format(context.clone(), "data point missing"))?;
            match &mut data.argument {
                ArgumentAxis::Times(times) => {
                    *times = parse_datetimes(unit, &quantity_data.values, &context)?;
                    is_time_axis = true;
                }
                ArgumentAxis::Frequencies(frequencies) => {
                    *frequencies = parse_doubles(unit, &quantity_data.values, &context)?;
                }
                ArgumentAxis::AstroComponents(names) => {
                    *names = quantity_data.values.clone();
                }
                ArgumentAxis::Discharges(discharges) => {
                    *discharges = parse_doubles(unit, &quantity_data.values, &context)?;
                }
            }
        }

        if is_time_axis {
            condition.time_interpolation = header.time_interpolation;
            condition.time_zone = parse_time_zone(unit);
        }
    }

    for component in components {
        let quantity_data = &block.quantities[component.column];
        let values = parse_doubles(quantity_data.unit.as_deref(), &quantity_data.values, &context)?;

        let data = condition
            .data_at_mut(point)
            .ok_or_else(|| Error::format(context.clone(), "data point missing"))?;
        let slot = data.components.get_mut(component.flat_index).ok_or_else(|| {
            Error::unsupported_value(format!(
                "{context}: component slot {} out of range",
                component.flat_index
            ))
        })?;
        *slot = values;
    }

    Ok(())
}

/// Overlay correction columns onto the base signal at matching argument
/// positions. Signal slot k scatters to correction slot 2k+2 (even k) or
/// 2k+1 (odd k) of the four-per-layer correction layout.
fn write_correction_data(
    condition: &mut FlowBoundaryCondition,
    point: usize,
    block: &BcBlockData,
    classified: &ClassifiedBlock,
    components: &[&ClassifiedComponent],
) -> Result<()> {
    let context = block.context();

    let argument_column = classified
        .argument_column(0)
        .ok_or_else(|| Error::format(context.clone(), "correction block lacks an argument column"))?;
    let argument_data = &block.quantities[argument_column];

    let index_mapping: Vec<Option<usize>> = {
        let data = condition
            .data_at(point)
            .ok_or_else(|| Error::format(context.clone(), "data point missing"))?;
        match &data.argument {
            ArgumentAxis::AstroComponents(_) => argument_data
                .values
                .iter()
                .map(|name| data.argument.position_of_component(name))
                .collect(),
            ArgumentAxis::Frequencies(_) => {
                let frequencies = parse_doubles(
                    argument_data.unit.as_deref(),
                    &argument_data.values,
                    &context,
                )?;
                frequencies
                    .iter()
                    .map(|f| data.argument.position_of_frequency(*f))
                    .collect()
            }
            _ => {
                return Err(Error::unsupported_value(format!(
                    "{context}: correction data requires an astronomic or harmonic signal"
                )))
            }
        }
    };

    for component in components {
        let quantity_data = &block.quantities[component.column];
        let values = parse_doubles(quantity_data.unit.as_deref(), &quantity_data.values, &context)?;

        let k = component.flat_index;
        let l = if k % 2 == 0 { 2 * k + 2 } else { 2 * k + 1 };

        let data = condition
            .data_at_mut(point)
            .ok_or_else(|| Error::format(context.clone(), "data point missing"))?;
        let slot = data.components.get_mut(l).ok_or_else(|| {
            Error::unsupported_value(format!("{context}: correction slot {l} out of range"))
        })?;

        for (i, mapped) in index_mapping.iter().enumerate() {
            if i >= values.len() {
                break;
            }
            let Some(index) = mapped else {
                continue;
            };
            let target = slot.get_mut(*index).ok_or_else(|| {
                Error::unsupported_value(format!(
                    "{context}: argument position {index} out of range"
                ))
            })?;
            *target = values[i];
        }
    }

    Ok(())
}
