//! Assembly of forcing blocks into boundary condition sets
//!
//! The assembler takes the raw blocks produced by the file reader and merges
//! them into structured boundary conditions, matching support points,
//! creating conditions where allowed and overlaying corrections onto
//! existing signals.
//!
//! ## Architecture
//!
//! - [`insert`] - Per-block insertion state machine
//! - [`values`] - Typed parsing of raw column values
//!
//! Blocks that cannot be placed in one pass (a correction arriving before
//! its signal, an excluded quantity meant for a later pass) are retried
//! until a pass makes no progress.

pub mod insert;
pub mod values;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

use tracing::warn;

use crate::app::models::BoundaryConditionSet;
use crate::app::services::bc_file::BcBlockData;
use crate::app::services::forcing_catalog::ForcingCatalog;
use crate::app::services::quantity_classifier::QuantityClassifier;
use crate::config::BuilderOptions;

// Re-export main types for easy access
pub use insert::InsertOutcome;

/// Builder merging forcing blocks into boundary condition sets
#[derive(Debug, Clone)]
pub struct BoundaryDataBuilder {
    pub(crate) catalog: Arc<ForcingCatalog>,
    pub(crate) classifier: QuantityClassifier,
    pub(crate) options: BuilderOptions,
}

impl BoundaryDataBuilder {
    pub fn new(catalog: Arc<ForcingCatalog>, options: BuilderOptions) -> Self {
        let classifier = QuantityClassifier::new(Arc::clone(&catalog));
        Self {
            catalog,
            classifier,
            options,
        }
    }

    /// Builder over the standard catalog with default options
    pub fn standard() -> Self {
        Self::new(Arc::new(ForcingCatalog::standard()), BuilderOptions::default())
    }

    pub fn catalog(&self) -> &ForcingCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Merge blocks into the sets until a fixed point.
    ///
    /// Deferred blocks are retried in subsequent passes; when a pass consumes
    /// nothing the remaining blocks are reported and returned instead of
    /// spinning forever.
    pub fn insert_blocks(
        &self,
        sets: &mut [BoundaryConditionSet],
        blocks: Vec<BcBlockData>,
        time_lag: Option<f64>,
    ) -> Vec<BcBlockData> {
        let mut pending = blocks;

        loop {
            let mut deferred = Vec::new();
            let mut progressed = false;

            for block in pending {
                match self.insert_block(sets, &block, time_lag) {
                    InsertOutcome::Consumed | InsertOutcome::Rejected => progressed = true,
                    InsertOutcome::Deferred => deferred.push(block),
                }
            }

            if deferred.is_empty() {
                return deferred;
            }
            if !progressed {
                for block in &deferred {
                    warn!(
                        "{}: block could not be merged into any boundary condition; giving up.",
                        block.context()
                    );
                }
                return deferred;
            }

            pending = deferred;
        }
    }
}
