//! Configuration for boundary data assembly.
//!
//! Options controlling how parsed forcing blocks are merged into boundary
//! condition sets: overwrite behavior, condition creation, exclusion lists
//! and an optional spatial filter.

use serde::{Deserialize, Serialize};

use crate::app::models::{FlowQuantity, ForcingKind};

/// Options for [`crate::BoundaryDataBuilder`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderOptions {
    /// Overwrite data at points that already carry data; when false such
    /// points are skipped with a log message
    pub overwrite_existing_data: bool,

    /// Allow creating new boundary conditions for unseen quantities;
    /// correction blocks never create conditions regardless of this flag
    pub can_create_new_boundary_condition: bool,

    /// Forcing kinds to skip entirely; skipped blocks count as consumed
    pub excluded_kinds: Vec<ForcingKind>,

    /// Quantities to skip; blocks with skipped quantity groups are retained
    /// for a later pass with different exclusions
    pub excluded_quantities: Vec<FlowQuantity>,

    /// Only accept blocks whose matching set has this feature name
    pub location_filter: Option<String>,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            overwrite_existing_data: true,
            can_create_new_boundary_condition: true,
            excluded_kinds: Vec::new(),
            excluded_quantities: Vec::new(),
            location_filter: None,
        }
    }
}
