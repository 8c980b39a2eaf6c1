//! Test utilities for the bc file reader and writer tests

use std::io::Cursor;

use crate::app::services::bc_file::reader::BcBlockIterator;
use crate::app::services::bc_file::BcBlockData;

mod writer_tests;

/// Parse every block of an in-memory bc file
pub fn parse_blocks(text: &str) -> Vec<BcBlockData> {
    BcBlockIterator::from_reader(Cursor::new(text), "test.bc".to_string())
        .collect::<crate::Result<Vec<_>>>()
        .expect("parsing should succeed")
}
