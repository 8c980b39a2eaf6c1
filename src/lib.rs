//! Boundary-condition forcing file codec
//!
//! A Rust library for reading and writing block-structured boundary-condition
//! forcing files (`.bc`) and translating them into an in-memory multi-point,
//! multi-layer, multi-component boundary data model for a hydrodynamic solver.
//!
//! This library provides tools for:
//! - Parsing `[forcing]` blocks into raw key/value + tabular records
//! - Classifying quantity column names into argument and component roles,
//!   including tracer/sediment identity and vertical layer extraction
//! - Assembling classified blocks into structured boundary conditions, with
//!   correction blocks overlaid onto existing harmonic/astronomic signals
//! - Serializing structured boundary conditions back into aligned text blocks
//! - Vertical profile parsing and validation
//! - Comprehensive error handling with a warn-and-degrade data quality policy

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod bc_file;
        pub mod block_builder;
        pub mod boundary_assembler;
        pub mod forcing_catalog;
        pub mod quantity_classifier;
    }
}

// Re-export commonly used types
pub use app::models::{
    ArgumentAxis, BoundaryConditionSet, FlowBoundaryCondition, FlowQuantity, ForcingKind,
    PointData,
};
pub use app::services::bc_file::{BcBlockData, BcFile, BcQuantityData, WriteMode};
pub use app::services::block_builder::BcBlockBuilder;
pub use app::services::boundary_assembler::BoundaryDataBuilder;
pub use app::services::forcing_catalog::ForcingCatalog;
pub use config::BuilderOptions;

/// Result type alias for the bc forcing codec
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bc file processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Structural bc file format error
    #[error("{file}: {message}")]
    Format { file: String, message: String },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A vertical profile kind the writer cannot express
    #[error("Vertical profile kind {kind} not supported by bc file writer")]
    UnsupportedVerticalProfile { kind: String },

    /// A value type/unit combination the codec cannot translate
    #[error("Unsupported value: {message}")]
    UnsupportedValue { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a structural format error
    pub fn format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a date/time parsing error with context
    pub fn datetime_parsing(message: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
            source,
        }
    }

    /// Create an unsupported-value error
    pub fn unsupported_value(message: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: "Date/time parsing failed".to_string(),
            source: error,
        }
    }
}
