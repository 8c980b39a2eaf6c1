//! Forcing block writer.
//!
//! Serializes raw blocks back to text with the fixed key-column layout and
//! column-aligned data rows, and drives the structured write path: boundary
//! condition sets are grouped per write mode, handed to the block builder,
//! and emitted into one or more sub-files.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::block::BcBlockData;
use super::reader::BcBlockIterator;
use crate::app::models::{BoundaryConditionSet, FlowBoundaryCondition, ForcingKind};
use crate::app::services::block_builder::BcBlockBuilder;
use crate::constants::{keys, BLOCK_KEY, FILE_TYPE, FILE_VERSION, GENERAL_KEY, KEY_COLUMN_WIDTH};
use crate::Result;

/// How boundary conditions are distributed over output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteMode {
    #[default]
    SingleFile,
    FilePerFeature,
    FilePerProcess,
    FilePerQuantity,
}

/// Reader/writer for bc forcing files
#[derive(Debug, Default)]
pub struct BcFile {
    pub write_mode: WriteMode,
    /// Restrict output to correction blocks of correction-kind conditions
    pub correction_file: bool,
    /// Append blocks to an existing file instead of rewriting it; the
    /// `[general]` header is only written for a fresh file
    pub append: bool,
}

impl BcFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all forcing blocks of a file
    pub fn read(&self, path: &Path) -> Result<Vec<BcBlockData>> {
        BcBlockIterator::open(path)?.collect()
    }

    /// Lazily iterate the forcing blocks of a file
    pub fn read_lazy(
        &self,
        path: &Path,
    ) -> Result<BcBlockIterator<std::io::BufReader<std::fs::File>>> {
        BcBlockIterator::open(path)
    }

    /// Write boundary condition sets, splitting into sub-files per the
    /// write mode. Sub-file names get the group tag inserted before the
    /// extension and are disambiguated against names already written.
    pub fn write(
        &self,
        sets: &[BoundaryConditionSet],
        path: &Path,
        builder: &BcBlockBuilder,
        reference_date: Option<NaiveDateTime>,
    ) -> Result<()> {
        let mut used_names: HashSet<PathBuf> = HashSet::new();

        for (tag, members) in self.group_boundary_conditions(sets, builder) {
            let sub_path = if tag.is_empty() {
                path.to_path_buf()
            } else {
                disambiguate(append_tag(path, &format!("_{tag}")), &mut used_names)
            };
            self.write_group(sets, &members, &sub_path, builder, reference_date)?;
        }
        Ok(())
    }

    /// Write one group of (set index, condition index) members to a file
    fn write_group(
        &self,
        sets: &[BoundaryConditionSet],
        members: &[(usize, usize)],
        path: &Path,
        builder: &BcBlockBuilder,
        reference_date: Option<NaiveDateTime>,
    ) -> Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        if self.append {
            options.append(true);
        } else {
            options.truncate(true);
        }
        let file = options.open(path).map_err(|e| {
            crate::Error::io(format!("Failed to open bc file {}", path.display()), e)
        })?;
        let mut writer = BufWriter::new(file);

        if !self.append {
            write_general_header(&mut writer)?;
        }

        for &(set_index, condition_index) in members {
            let set = &sets[set_index];
            let condition = &set.conditions[condition_index];

            if self.correction_file && !condition.kind.is_correction() {
                continue;
            }

            let series_index = series_index_of(set, condition_index);
            let blocks = builder.build_blocks(
                condition,
                set,
                reference_date,
                series_index,
                self.correction_file,
            );
            self.write_blocks_to(&mut writer, &blocks)?;
        }

        writer.flush()?;
        info!("Wrote bc file {}", path.display());
        Ok(())
    }

    /// Write raw blocks separated by single blank lines
    pub fn write_blocks_to(&self, writer: &mut impl Write, blocks: &[BcBlockData]) -> Result<()> {
        for block in blocks {
            write_block(writer, block)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Group conditions by the write-mode discriminator, preserving set and
    /// declaration order
    pub fn group_boundary_conditions(
        &self,
        sets: &[BoundaryConditionSet],
        builder: &BcBlockBuilder,
    ) -> Vec<(String, Vec<(usize, usize)>)> {
        let mut groups: Vec<(String, Vec<(usize, usize)>)> = Vec::new();

        for (set_index, set) in sets.iter().enumerate() {
            for (condition_index, condition) in set.conditions.iter().enumerate() {
                let tag = match self.write_mode {
                    WriteMode::SingleFile => String::new(),
                    WriteMode::FilePerFeature => set.feature_name.clone(),
                    WriteMode::FilePerProcess => condition.quantity.process_name().to_string(),
                    WriteMode::FilePerQuantity => builder
                        .catalog()
                        .names_for_quantity(condition.quantity)
                        .first()
                        .copied()
                        .unwrap_or_default()
                        .to_string(),
                };

                match groups.iter_mut().find(|(t, _)| *t == tag) {
                    Some((_, members)) => members.push((set_index, condition_index)),
                    None => groups.push((tag, vec![(set_index, condition_index)])),
                }
            }
        }
        groups
    }
}

/// Position of a condition among the set's conditions sharing its quantity,
/// identity and a compatible forcing kind; this is the 0-based series index
pub fn series_index_of(set: &BoundaryConditionSet, condition_index: usize) -> usize {
    let condition = &set.conditions[condition_index];
    set.conditions[..condition_index]
        .iter()
        .filter(|other| similar_series(other, condition))
        .count()
}

fn similar_series(a: &FlowBoundaryCondition, b: &FlowBoundaryCondition) -> bool {
    a.quantity == b.quantity
        && a.tracer_name == b.tracer_name
        && a.sediment_fraction == b.sediment_fraction
        && similar_kind(a.kind, b.kind)
}

fn similar_kind(a: ForcingKind, b: ForcingKind) -> bool {
    a == b || a.base_kind() == Some(b) || b.base_kind() == Some(a)
}

fn write_general_header(writer: &mut impl Write) -> Result<()> {
    writeln!(writer, "{GENERAL_KEY}")?;
    write_key_value(writer, keys::FILE_VERSION, FILE_VERSION)?;
    write_key_value(writer, keys::FILE_TYPE, FILE_TYPE)?;
    writeln!(writer)?;
    Ok(())
}

fn write_key_value(writer: &mut impl Write, key: &str, value: &str) -> Result<()> {
    writeln!(writer, "{key:<KEY_COLUMN_WIDTH$} = {value}")?;
    Ok(())
}

/// Write one block: tag, present keys, quantity declarations, then the
/// column-aligned data rows trimmed of trailing whitespace
pub fn write_block(writer: &mut impl Write, block: &BcBlockData) -> Result<()> {
    writeln!(writer, "{BLOCK_KEY}")?;

    write_key_value(writer, keys::SUPPORT_POINT, &block.support_point)?;
    write_key_value(writer, keys::FORCING_TYPE, &block.function_type)?;

    if let Some(value) = &block.series_index {
        write_key_value(writer, keys::SERIES_INDEX, value)?;
    }
    if let Some(value) = &block.time_interpolation {
        write_key_value(writer, keys::TIME_INTERPOLATION, value)?;
    }
    if let Some(value) = &block.vertical_position_type {
        write_key_value(writer, keys::VERTICAL_POSITION_TYPE, value)?;
    }
    if let Some(value) = &block.vertical_position_spec {
        write_key_value(writer, keys::VERTICAL_POSITION_SPEC, value)?;
    }
    if let Some(value) = &block.vertical_interpolation {
        write_key_value(writer, keys::VERTICAL_INTERPOLATION, value)?;
    }
    if let Some(value) = &block.offset {
        write_key_value(writer, keys::OFFSET, value)?;
    }
    if let Some(value) = &block.factor {
        write_key_value(writer, keys::FACTOR, value)?;
    }

    for quantity in &block.quantities {
        write_key_value(writer, keys::QUANTITY, &quantity.quantity_name)?;
        if let Some(unit) = &quantity.unit {
            write_key_value(writer, keys::UNIT, unit)?;
        }
        if let Some(position) = &quantity.vertical_position {
            write_key_value(writer, keys::VERTICAL_POSITION, position)?;
        }
    }

    let row_count = block
        .quantities
        .iter()
        .map(|q| q.values.len())
        .min()
        .unwrap_or(0);
    if row_count == 0 {
        return Ok(());
    }

    let column_widths: Vec<usize> = block
        .quantities
        .iter()
        .map(|q| q.values[..row_count].iter().map(|v| v.len()).max().unwrap_or(0) + 1)
        .collect();

    for row in 0..row_count {
        let line = block
            .quantities
            .iter()
            .zip(&column_widths)
            .map(|(q, &width)| format!("{:<width$}", q.values[row]))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

/// Insert a tag before the file extension, `bnd.bc` + `_sea` -> `bnd_sea.bc`
fn append_tag(path: &Path, tag: &str) -> PathBuf {
    match path.extension() {
        Some(extension) => {
            let stem = path.with_extension("");
            let mut name = stem.into_os_string();
            name.push(tag);
            name.push(".");
            name.push(extension);
            PathBuf::from(name)
        }
        None => {
            let mut name = path.to_path_buf().into_os_string();
            name.push(tag);
            PathBuf::from(name)
        }
    }
}

/// Avoid clobbering a sub-file already written in this pass
fn disambiguate(path: PathBuf, used_names: &mut HashSet<PathBuf>) -> PathBuf {
    if used_names.insert(path.clone()) {
        return path;
    }
    let mut counter = 2;
    loop {
        let candidate = append_tag(&path, &format!("_{counter}"));
        if used_names.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
