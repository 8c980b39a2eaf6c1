//! Raw forcing block model.
//!
//! One parsed `[forcing]` block as it appears in the file: key/value header
//! properties plus ordered quantity columns with raw string values. Blocks
//! are produced by the reader, consumed once by the boundary assembler, and
//! built from scratch by the block builder on the write path.

/// One quantity column of a forcing block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BcQuantityData {
    /// Flat quantity column name, e.g. "waterlevelbnd amplitude"
    pub quantity_name: String,
    pub unit: Option<String>,
    /// 1-based vertical layer index as written in the file
    pub vertical_position: Option<String>,
    /// Raw column values in row order
    pub values: Vec<String>,
}

impl BcQuantityData {
    pub fn new(quantity_name: impl Into<String>) -> Self {
        Self {
            quantity_name: quantity_name.into(),
            ..Default::default()
        }
    }
}

/// One parsed forcing block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BcBlockData {
    /// Originating file, for diagnostics
    pub file_path: String,
    /// Line the block tag was found on, for diagnostics
    pub line_number: usize,
    pub support_point: String,
    pub function_type: String,
    pub series_index: Option<String>,
    pub time_interpolation: Option<String>,
    pub vertical_position_type: Option<String>,
    pub vertical_position_spec: Option<String>,
    pub vertical_interpolation: Option<String>,
    pub offset: Option<String>,
    pub factor: Option<String>,
    pub quantities: Vec<BcQuantityData>,
}

impl BcBlockData {
    /// Diagnostic prefix naming the block's origin
    pub fn context(&self) -> String {
        format!(
            "File {}, block starting at line {}",
            self.file_path, self.line_number
        )
    }
}
