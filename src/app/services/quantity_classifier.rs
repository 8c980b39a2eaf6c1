//! Quantity column classification.
//!
//! Resolves the raw quantity columns of a forcing block against a forcing
//! schema: argument columns are matched to their role by name, component
//! columns are stripped of their role suffix, resolved to a flow quantity
//! through the name registry and assigned a flat component index combining
//! vertical layer and quantity variable ordinal.

use std::sync::Arc;

use tracing::warn;

use crate::app::models::{FlowQuantity, ForcingKind};
use crate::app::services::bc_file::BcBlockData;
use crate::app::services::forcing_catalog::{ForcingCatalog, ForcingSchema};
use crate::constants::quantities;

/// A component column resolved to a quantity and a flat component slot
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedComponent {
    /// Column position within the block's quantity list
    pub column: usize,
    pub quantity: FlowQuantity,
    /// Flat slot: variables-per-quantity * layer + variable ordinal
    pub flat_index: usize,
    /// Tracer name split off a tracer column, e.g. "tracerbnd_dye" -> "dye"
    pub tracer_name: Option<String>,
}

/// The classified columns of one forcing block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedBlock {
    /// Argument columns keyed by their role index in the schema
    pub arguments: Vec<(usize, usize)>,
    pub components: Vec<ClassifiedComponent>,
}

impl ClassifiedBlock {
    /// Column of the argument with a given role index
    pub fn argument_column(&self, role: usize) -> Option<usize> {
        self.arguments
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, c)| *c)
    }

    /// Distinct quantities among the component columns, in first-seen order
    pub fn quantity_groups(&self) -> Vec<FlowQuantity> {
        let mut seen = Vec::new();
        for component in &self.components {
            if !seen.contains(&component.quantity) {
                seen.push(component.quantity);
            }
        }
        seen
    }

    /// Components belonging to one quantity, in column order
    pub fn components_of(&self, quantity: FlowQuantity) -> Vec<&ClassifiedComponent> {
        self.components
            .iter()
            .filter(|c| c.quantity == quantity)
            .collect()
    }
}

/// Outcome of classifying a block's quantity columns
#[derive(Debug, Clone, PartialEq)]
pub enum BlockClassification {
    Classified(ClassifiedBlock),
    /// A component name no registered quantity is a prefix of; the block may
    /// belong to a later pass with a wider registry
    Deferred,
}

/// Classifier resolving block columns against the quantity registry
#[derive(Debug, Clone)]
pub struct QuantityClassifier {
    catalog: Arc<ForcingCatalog>,
}

impl QuantityClassifier {
    pub fn new(catalog: Arc<ForcingCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ForcingCatalog {
        &self.catalog
    }

    /// Classify every quantity column of a block against a schema.
    ///
    /// Columns whose vertical position fails to parse are skipped with a
    /// warning; a component name outside the registry defers the whole block.
    pub fn classify(&self, block: &BcBlockData, schema: &ForcingSchema) -> BlockClassification {
        let mut classified = ClassifiedBlock::default();

        for (column, quantity_data) in block.quantities.iter().enumerate() {
            let (mut name, tracer_name) = split_tracer_name(&quantity_data.quantity_name);

            if let Some(role) = schema
                .arguments
                .iter()
                .position(|a| a.eq_ignore_ascii_case(&name))
            {
                if classified.argument_column(role).is_none() {
                    classified.arguments.push((role, column));
                } else {
                    warn!(
                        "{}: duplicate argument column {} skipped",
                        block.context(),
                        quantity_data.quantity_name
                    );
                }
                continue;
            }

            name = self.strip_component_suffix(name, schema);

            if !self.catalog.is_known_quantity_name(&name) {
                return BlockClassification::Deferred;
            }
            let quantity = match self.catalog.quantity_for_name(&name) {
                Some(quantity) => quantity,
                None => return BlockClassification::Deferred,
            };

            let layer_index = match parse_vertical_position(quantity_data.vertical_position.as_deref())
            {
                Some(index) => index,
                None => {
                    warn!(
                        "{}: vertical position {:?} could not be parsed; omitting data column.",
                        block.context(),
                        quantity_data.vertical_position
                    );
                    continue;
                }
            };

            let variables = self.catalog.variable_count(quantity);
            let ordinal = variable_ordinal(block, &classified, quantity, column);
            let flat_index = variables * layer_index + ordinal;

            if classified
                .components
                .iter()
                .any(|c| c.quantity == quantity && c.flat_index == flat_index)
            {
                warn!(
                    "{}: duplicate component column {} skipped",
                    block.context(),
                    quantity_data.quantity_name
                );
                continue;
            }

            classified.components.push(ClassifiedComponent {
                column,
                quantity,
                flat_index,
                tracer_name,
            });
        }

        BlockClassification::Classified(classified)
    }

    /// Strip the schema component suffix off a column name. A Q-H table
    /// component names the water level column directly and maps onto the
    /// canonical water level quantity name.
    fn strip_component_suffix(&self, name: String, schema: &ForcingSchema) -> String {
        for suffix in &schema.components {
            if suffix.is_empty() {
                break;
            }
            if schema.kind == ForcingKind::QhTable && name.eq_ignore_ascii_case(suffix) {
                return self.catalog.water_level_name().to_string();
            }
            if name.len() > suffix.len() {
                if let Some(tail) = name.get(name.len() - suffix.len()..) {
                    if tail.eq_ignore_ascii_case(suffix) {
                        return name[..name.len() - suffix.len()].trim_end().to_string();
                    }
                }
            }
        }
        name
    }
}

/// Split a tracer name off a tracer column, lowercasing the result
fn split_tracer_name(quantity_name: &str) -> (String, Option<String>) {
    let prefixed = format!("{}_", quantities::TRACER);
    for prefix in [prefixed.as_str(), quantities::TRACER] {
        if quantity_name.len() > prefix.len()
            && quantity_name
                .get(..prefix.len())
                .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
        {
            return (
                quantities::TRACER.to_string(),
                Some(quantity_name[prefix.len()..].to_string()),
            );
        }
    }
    (quantity_name.to_lowercase(), None)
}

/// Fraction name of a sediment concentration column
pub fn fraction_name(quantity_name: &str) -> String {
    let prefix = quantities::SEDIMENT_CONCENTRATION;
    if quantity_name
        .get(..prefix.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
    {
        quantity_name[prefix.len()..].to_string()
    } else {
        quantity_name.to_string()
    }
}

/// 1-based layer index as written, converted to 0-based; absent means the
/// single implicit layer
fn parse_vertical_position(vertical_position: Option<&str>) -> Option<usize> {
    match vertical_position {
        None => Some(0),
        Some(text) => text
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| i.checked_sub(1)),
    }
}

/// Ordinal of this column's written name among the distinct names already
/// classified for the same quantity. Repeated names (layer copies) reuse
/// their ordinal; new names (e.g. the y-velocity companion) extend it.
fn variable_ordinal(
    block: &BcBlockData,
    classified: &ClassifiedBlock,
    quantity: FlowQuantity,
    column: usize,
) -> usize {
    let mut existing: Vec<&str> = Vec::new();
    for component in classified.components.iter().filter(|c| c.quantity == quantity) {
        let name = block.quantities[component.column].quantity_name.as_str();
        if !existing.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            existing.push(name);
        }
    }

    let name = block.quantities[column].quantity_name.as_str();
    existing
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .unwrap_or(existing.len())
}
