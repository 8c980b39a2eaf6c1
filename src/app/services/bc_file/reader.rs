//! Forcing block reader.
//!
//! Streams `[forcing]` blocks out of a bc file: a lazy, forward-only
//! iterator over an open reader, plus a convenience call that collects a
//! whole file. Malformed blocks are dropped with a warning, short tabular
//! rows are skipped, and I/O errors propagate to the caller.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use tracing::{debug, warn};

use super::block::{BcBlockData, BcQuantityData};
use crate::constants::{keys, BLOCK_KEY, GENERAL_KEY};
use crate::Result;

/// Lazy iterator over the forcing blocks of one open reader
pub struct BcBlockIterator<R: BufRead> {
    lines: Lines<R>,
    file_path: String,
    line_number: usize,
    /// Line already read but not yet consumed by block parsing
    pending: Option<String>,
}

impl BcBlockIterator<BufReader<File>> {
    /// Open a bc file for block-wise reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            crate::Error::io(format!("Failed to open bc file {}", path.display()), e)
        })?;
        Ok(Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

impl<R: BufRead> BcBlockIterator<R> {
    pub fn from_reader(reader: R, file_path: String) -> Self {
        Self {
            lines: reader.lines(),
            file_path,
            line_number: 0,
            pending: None,
        }
    }

    /// Next meaningful line: blank lines and comment lines are skipped,
    /// tabs are normalized to spaces
    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        while let Some(line) = self.lines.next() {
            self.line_number += 1;
            let line = line.map_err(|e| {
                crate::Error::io(format!("Failed to read bc file {}", self.file_path), e)
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some(trimmed.replace('\t', " ")));
        }
        Ok(None)
    }

    /// Split a key=value line on the first `=`, trimming both parts
    fn split_key_value(line: &str) -> Option<(&str, &str)> {
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some((key, value))
    }

    /// Read one block after its `[forcing]` tag. Returns the parsed block
    /// (or `None` when malformed) and the first line following the block.
    fn read_data_block(&mut self) -> Result<(Option<BcBlockData>, Option<String>)> {
        let mut block = BcBlockData {
            file_path: self.file_path.clone(),
            line_number: self.line_number,
            ..Default::default()
        };
        let mut current_quantity: Option<BcQuantityData> = None;

        // key=value section, ends at the first line that is not one
        let mut line = self.next_line()?;
        while let Some(text) = line.as_deref() {
            let Some((key, value)) = Self::split_key_value(text) else {
                break;
            };

            if key.eq_ignore_ascii_case(keys::SUPPORT_POINT) {
                block.support_point = value.to_string();
            } else if key.eq_ignore_ascii_case(keys::FORCING_TYPE) {
                block.function_type = value.to_string();
            } else if key.eq_ignore_ascii_case(keys::SERIES_INDEX) {
                block.series_index = Some(value.to_string());
            } else if key.eq_ignore_ascii_case(keys::TIME_INTERPOLATION)
                || key.eq_ignore_ascii_case(keys::OLD_TIME_INTERPOLATION)
            {
                block.time_interpolation = Some(value.to_string());
            } else if key.eq_ignore_ascii_case(keys::VERTICAL_POSITION_TYPE)
                || key.eq_ignore_ascii_case(keys::OLD_VERTICAL_POSITION_TYPE)
            {
                block.vertical_position_type = Some(value.to_string());
            } else if key.eq_ignore_ascii_case(keys::VERTICAL_POSITION_SPEC)
                || key.eq_ignore_ascii_case(keys::OLD_VERTICAL_POSITION_SPEC)
            {
                block.vertical_position_spec = Some(value.to_string());
            } else if key.eq_ignore_ascii_case(keys::VERTICAL_INTERPOLATION)
                || key.eq_ignore_ascii_case(keys::OLD_VERTICAL_INTERPOLATION)
            {
                block.vertical_interpolation = Some(value.to_string());
            } else if key.eq_ignore_ascii_case(keys::OFFSET) {
                block.offset = Some(value.to_string());
            } else if key.eq_ignore_ascii_case(keys::FACTOR) {
                block.factor = Some(value.to_string());
            } else if key.eq_ignore_ascii_case(keys::QUANTITY) {
                if let Some(quantity) = current_quantity.take() {
                    block.quantities.push(quantity);
                }
                current_quantity = Some(BcQuantityData::new(value));
            } else if key.eq_ignore_ascii_case(keys::UNIT) {
                if let Some(quantity) = current_quantity.as_mut() {
                    quantity.unit = Some(value.to_string());
                }
            } else if key.eq_ignore_ascii_case(keys::VERTICAL_POSITION)
                || key.eq_ignore_ascii_case(keys::OLD_VERTICAL_POSITION)
            {
                if let Some(quantity) = current_quantity.as_mut() {
                    quantity.vertical_position = Some(value.to_string());
                }
            }
            // unrecognized keys are skipped

            line = self.next_line()?;
        }

        if let Some(quantity) = current_quantity.take() {
            block.quantities.push(quantity);
        }

        // tabular section, ends at the next block tag
        while let Some(text) = line.as_deref() {
            if text
                .get(..BLOCK_KEY.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(BLOCK_KEY))
            {
                break;
            }

            let columns: Vec<&str> = text.split_whitespace().collect();
            if columns.len() < block.quantities.len() {
                warn!(
                    "Omitting line {} with less than {} columns",
                    self.line_number,
                    block.quantities.len()
                );
            } else {
                for (quantity, column) in block.quantities.iter_mut().zip(&columns) {
                    quantity.values.push((*column).to_string());
                }
            }

            line = self.next_line()?;
        }

        if block.support_point.is_empty()
            || block.function_type.is_empty()
            || block.quantities.is_empty()
        {
            debug!(
                "Dropping malformed block starting at line {} of {}",
                block.line_number, self.file_path
            );
            return Ok((None, line));
        }

        Ok((Some(block), line))
    }

    /// Advance to the next block
    fn next_block(&mut self) -> Result<Option<BcBlockData>> {
        let mut line = self.next_line()?;
        while let Some(text) = line.as_deref() {
            if text.eq_ignore_ascii_case(GENERAL_KEY) {
                line = self.next_line()?;
                continue;
            }

            if text.eq_ignore_ascii_case(BLOCK_KEY) {
                let (block, rest) = self.read_data_block()?;
                self.pending = rest;
                if let Some(block) = block {
                    return Ok(Some(block));
                }
                line = self.next_line()?;
                continue;
            }

            if text.starts_with('[') && text.ends_with(']') {
                warn!(
                    "Section {} not supported on line {}. File: {}",
                    text, self.line_number, self.file_path
                );
            } else {
                debug!(
                    "Skipping line {} outside any block. File: {}",
                    self.line_number, self.file_path
                );
            }
            line = self.next_line()?;
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for BcBlockIterator<R> {
    type Item = Result<BcBlockData>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}
