//! Constants for the bc forcing file format
//!
//! Block and key names of the text format, canonical boundary quantity
//! names, and default header values used throughout the library.

// =============================================================================
// File structure
// =============================================================================

/// Block tag opening a forcing block (compared case-insensitively)
pub const BLOCK_KEY: &str = "[forcing]";

/// Header section tag at the top of the file
pub const GENERAL_KEY: &str = "[general]";

/// Version written in the `[general]` section
pub const FILE_VERSION: &str = "1.01";

/// File type written in the `[general]` section
pub const FILE_TYPE: &str = "boundConds";

// =============================================================================
// Block property keys
// =============================================================================

/// Key names recognized inside a forcing block
pub mod keys {
    pub const SUPPORT_POINT: &str = "name";
    pub const FORCING_TYPE: &str = "function";
    pub const SERIES_INDEX: &str = "functionIndex";
    pub const TIME_INTERPOLATION: &str = "timeInterpolation";
    pub const VERTICAL_INTERPOLATION: &str = "vertInterpolation";
    pub const VERTICAL_POSITION_TYPE: &str = "vertPositionType";
    pub const VERTICAL_POSITION_SPEC: &str = "vertPositions";
    pub const VERTICAL_POSITION: &str = "vertPositionIndex";
    pub const OFFSET: &str = "offset";
    pub const FACTOR: &str = "factor";
    pub const QUANTITY: &str = "quantity";
    pub const UNIT: &str = "unit";
    pub const FILE_VERSION: &str = "fileVersion";
    pub const FILE_TYPE: &str = "fileType";

    // Legacy spellings still accepted on read
    pub const OLD_TIME_INTERPOLATION: &str = "time-interpolation";
    pub const OLD_VERTICAL_INTERPOLATION: &str = "vertical interpolation";
    pub const OLD_VERTICAL_POSITION_TYPE: &str = "vertical position type";
    pub const OLD_VERTICAL_POSITION_SPEC: &str = "vertical position specification";
    pub const OLD_VERTICAL_POSITION: &str = "vertical position";
}

/// Fixed width of the key column on write, the longest current key
pub const KEY_COLUMN_WIDTH: usize = keys::VERTICAL_POSITION.len();

// =============================================================================
// Boundary quantity names
// =============================================================================

/// Canonical quantity names as written in forcing blocks
pub mod quantities {
    pub const WATER_LEVEL: &str = "waterlevelbnd";
    pub const DISCHARGE: &str = "dischargebnd";
    pub const QH_DISCHARGE: &str = "qhbnd";
    pub const VELOCITY: &str = "velocitybnd";
    pub const NEUMANN: &str = "neumannbnd";
    pub const RIEMANN: &str = "riemannbnd";
    pub const RIEMANN_VELOCITY: &str = "riemann_velocitybnd";
    pub const NORMAL_VELOCITY: &str = "normalvelocitybnd";
    pub const TANGENTIAL_VELOCITY: &str = "tangentialvelocitybnd";
    pub const X_VELOCITY: &str = "x-velocity";
    pub const Y_VELOCITY: &str = "y-velocity";
    pub const SALINITY: &str = "salinitybnd";
    pub const TEMPERATURE: &str = "temperaturebnd";
    pub const TRACER: &str = "tracerbnd";
    pub const SEDIMENT_CONCENTRATION: &str = "sedfracbnd";
}

// =============================================================================
// Forcing function type names
// =============================================================================

/// Function type names as written in forcing blocks
pub mod functions {
    pub const TIME_SERIES: &str = "timeseries";
    pub const TIME_SERIES_3D: &str = "t3d";
    pub const ASTRONOMIC: &str = "astronomic";
    pub const ASTRONOMIC_CORRECTION: &str = "astronomic-correction";
    pub const HARMONIC: &str = "harmonic";
    pub const HARMONIC_CORRECTION: &str = "harmonic-correction";
    pub const QH_TABLE: &str = "qhtable";
}

// =============================================================================
// Value formats
// =============================================================================

/// Compact datetime format used when no reference date is available
pub const COMPACT_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Datetime format used in "since" unit strings
pub const UNIT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Unit marking a harmonic argument axis given as periods in minutes
pub const MINUTES_UNIT: &str = "minutes";
