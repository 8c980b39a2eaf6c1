//! Reader and writer for bc forcing files
//!
//! This module handles the text layer of the codec: streaming `[forcing]`
//! blocks out of a file and writing structured boundary conditions back.
//!
//! ## Architecture
//!
//! The file layer is organized into logical components:
//! - [`block`] - Raw block and quantity-column records
//! - [`reader`] - Lazy block iterator over an open file
//! - [`writer`] - Block serialization, write modes and sub-file grouping
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use bcforcing::app::services::bc_file::BcFile;
//!
//! # fn example() -> bcforcing::Result<()> {
//! let file = BcFile::new();
//! for block in file.read_lazy(Path::new("boundaries.bc"))? {
//!     let block = block?;
//!     println!("{} drives {}", block.support_point, block.function_type);
//! }
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod reader;
pub mod writer;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use block::{BcBlockData, BcQuantityData};
pub use reader::BcBlockIterator;
pub use writer::{BcFile, WriteMode};
