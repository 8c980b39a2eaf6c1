//! Test utilities for boundary assembler tests

use crate::app::models::BoundaryConditionSet;
use crate::app::services::bc_file::{BcBlockData, BcQuantityData};

// Test modules
mod insert_tests;

/// Boundary set with one feature and named support points
pub fn boundary_set(feature: &str, points: &[&str]) -> BoundaryConditionSet {
    BoundaryConditionSet::new(feature, points.iter().map(|p| (*p).to_string()).collect())
}

/// Quantity column shorthand
pub fn quantity(
    name: &str,
    unit: Option<&str>,
    vertical_position: Option<&str>,
    values: &[&str],
) -> BcQuantityData {
    BcQuantityData {
        quantity_name: name.to_string(),
        unit: unit.map(|u| u.to_string()),
        vertical_position: vertical_position.map(|p| p.to_string()),
        values: values.iter().map(|v| (*v).to_string()).collect(),
    }
}

/// Forcing block shorthand
pub fn forcing_block(
    support_point: &str,
    function_type: &str,
    quantities: Vec<BcQuantityData>,
) -> BcBlockData {
    BcBlockData {
        file_path: "test.bc".to_string(),
        line_number: 1,
        support_point: support_point.to_string(),
        function_type: function_type.to_string(),
        quantities,
        ..Default::default()
    }
}
