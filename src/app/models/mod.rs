//! Core data structures for boundary-condition forcing data.
//!
//! Defines forcing kinds, flow quantities, argument axes, per-point series
//! data and the structured boundary condition owned by a boundary set.

pub mod vertical;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub use vertical::{VerticalInterpolation, VerticalProfile, VerticalProfileKind};

/// Forcing function kinds supported by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForcingKind {
    TimeSeries,
    Harmonics,
    AstroComponents,
    HarmonicCorrection,
    AstroCorrection,
    QhTable,
}

impl ForcingKind {
    /// Whether this kind overlays amplitude/phase corrections on a base signal
    pub fn is_correction(&self) -> bool {
        matches!(self, ForcingKind::AstroCorrection | ForcingKind::HarmonicCorrection)
    }

    /// The base signal kind belonging to a correction kind
    pub fn base_kind(&self) -> Option<ForcingKind> {
        match self {
            ForcingKind::AstroCorrection => Some(ForcingKind::AstroComponents),
            ForcingKind::HarmonicCorrection => Some(ForcingKind::Harmonics),
            _ => None,
        }
    }

    /// The correction kind belonging to a base signal kind
    pub fn correction_kind(&self) -> Option<ForcingKind> {
        match self {
            ForcingKind::AstroComponents => Some(ForcingKind::AstroCorrection),
            ForcingKind::Harmonics => Some(ForcingKind::HarmonicCorrection),
            _ => None,
        }
    }

    /// Whether a block of kind `block_kind` may be merged into a condition
    /// of this kind. A correction block targets both its base signal kind
    /// and an already-upgraded correction condition.
    pub fn accepts(&self, block_kind: ForcingKind) -> bool {
        match block_kind {
            ForcingKind::AstroCorrection => {
                matches!(self, ForcingKind::AstroComponents | ForcingKind::AstroCorrection)
            }
            ForcingKind::HarmonicCorrection => {
                matches!(self, ForcingKind::Harmonics | ForcingKind::HarmonicCorrection)
            }
            _ => *self == block_kind,
        }
    }
}

/// Flow quantities a boundary condition can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowQuantity {
    WaterLevel,
    Discharge,
    Velocity,
    VelocityVector,
    Neumann,
    Riemann,
    RiemannVelocity,
    NormalVelocity,
    TangentVelocity,
    Salinity,
    Temperature,
    Tracer,
    SedimentConcentration,
}

impl FlowQuantity {
    /// Model process a quantity belongs to, used when output is split into
    /// one file per process
    pub fn process_name(&self) -> &'static str {
        match self {
            FlowQuantity::Salinity => "salinity",
            FlowQuantity::Temperature => "temperature",
            FlowQuantity::Tracer => "tracers",
            FlowQuantity::SedimentConcentration => "sediment",
            _ => "flow",
        }
    }
}

/// Time interpolation over the time argument axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInterpolation {
    Linear,
    BlockConstant,
}

impl TimeInterpolation {
    /// Name as written in a forcing block
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInterpolation::Linear => "linear",
            TimeInterpolation::BlockConstant => "block",
        }
    }

    /// Parse a time interpolation name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "linear" => Some(TimeInterpolation::Linear),
            "block" => Some(TimeInterpolation::BlockConstant),
            _ => None,
        }
    }
}

/// The independent axis of a per-point data series.
///
/// Mirrors the value-type switching of the original variable model as a
/// closed union: time series carry datetimes, harmonics carry frequencies in
/// deg/h, astronomic series carry component names, Q-H tables carry
/// discharges.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentAxis {
    Times(Vec<NaiveDateTime>),
    Frequencies(Vec<f64>),
    AstroComponents(Vec<String>),
    Discharges(Vec<f64>),
}

impl ArgumentAxis {
    /// Empty axis of the variant a forcing kind requires
    pub fn empty_for(kind: ForcingKind) -> Self {
        match kind {
            ForcingKind::TimeSeries => ArgumentAxis::Times(Vec::new()),
            ForcingKind::Harmonics | ForcingKind::HarmonicCorrection => {
                ArgumentAxis::Frequencies(Vec::new())
            }
            ForcingKind::AstroComponents | ForcingKind::AstroCorrection => {
                ArgumentAxis::AstroComponents(Vec::new())
            }
            ForcingKind::QhTable => ArgumentAxis::Discharges(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArgumentAxis::Times(v) => v.len(),
            ArgumentAxis::Frequencies(v) => v.len(),
            ArgumentAxis::AstroComponents(v) => v.len(),
            ArgumentAxis::Discharges(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of an astronomic component name on this axis
    pub fn position_of_component(&self, name: &str) -> Option<usize> {
        match self {
            ArgumentAxis::AstroComponents(v) => v.iter().position(|c| c == name),
            _ => None,
        }
    }

    /// Position of a frequency value on this axis, by exact value
    pub fn position_of_frequency(&self, frequency: f64) -> Option<usize> {
        match self {
            ArgumentAxis::Frequencies(v) => v.iter().position(|f| *f == frequency),
            _ => None,
        }
    }
}

/// One data point's series: a single argument axis plus component values.
///
/// The component count equals schema components x quantity variables x
/// vertical layers, stored layer-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PointData {
    pub argument: ArgumentAxis,
    pub components: Vec<Vec<f64>>,
}

impl PointData {
    pub fn new(kind: ForcingKind, component_count: usize) -> Self {
        Self {
            argument: ArgumentAxis::empty_for(kind),
            components: vec![Vec::new(); component_count],
        }
    }
}

/// A structured boundary condition for one flow quantity on one feature
#[derive(Debug, Clone)]
pub struct FlowBoundaryCondition {
    pub quantity: FlowQuantity,
    pub kind: ForcingKind,
    /// Tracer name for [`FlowQuantity::Tracer`] conditions
    pub tracer_name: Option<String>,
    /// Fraction name for [`FlowQuantity::SedimentConcentration`] conditions
    pub sediment_fraction: Option<String>,
    pub offset: f64,
    pub factor: f64,
    /// Thatcher-Harleman return time lag in seconds
    pub thatcher_harleman_lag: f64,
    pub time_interpolation: Option<TimeInterpolation>,
    /// UTC offset carried by the time unit, minutes east
    pub time_zone: Option<Duration>,
    pub vertical_interpolation: VerticalInterpolation,
    /// Support-point indices with data, in registration order
    point_indices: Vec<usize>,
    point_profiles: Vec<VerticalProfile>,
    point_data: Vec<PointData>,
}

impl FlowBoundaryCondition {
    pub fn new(quantity: FlowQuantity, kind: ForcingKind) -> Self {
        Self {
            quantity,
            kind,
            tracer_name: None,
            sediment_fraction: None,
            offset: 0.0,
            factor: 1.0,
            thatcher_harleman_lag: 0.0,
            time_interpolation: None,
            time_zone: None,
            vertical_interpolation: VerticalInterpolation::Uniform,
            point_indices: Vec::new(),
            point_profiles: Vec::new(),
            point_data: Vec::new(),
        }
    }

    /// Whether the condition holds a single series for the whole feature.
    ///
    /// Q-H tables and total discharges are defined per boundary, not per
    /// support point.
    pub fn is_horizontally_uniform(&self) -> bool {
        self.kind == ForcingKind::QhTable || self.quantity == FlowQuantity::Discharge
    }

    /// Whether every registered point carries a uniform vertical profile
    pub fn is_vertically_uniform(&self) -> bool {
        self.point_profiles
            .iter()
            .all(|p| p.kind == VerticalProfileKind::Uniform)
    }

    pub fn point_indices(&self) -> &[usize] {
        &self.point_indices
    }

    /// Registration-order position of a support-point index
    pub fn point_position(&self, point_index: usize) -> Option<usize> {
        self.point_indices.iter().position(|i| *i == point_index)
    }

    /// Register a data point with its vertical profile and pre-sized storage
    pub fn add_point(&mut self, point_index: usize, profile: VerticalProfile, component_count: usize) {
        self.point_indices.push(point_index);
        self.point_profiles.push(profile);
        self.point_data.push(PointData::new(self.kind, component_count));
    }

    /// Remove a data point registered earlier, used for rollback
    pub fn remove_point(&mut self, point_index: usize) {
        if let Some(pos) = self.point_position(point_index) {
            self.point_indices.remove(pos);
            self.point_profiles.remove(pos);
            self.point_data.remove(pos);
        }
    }

    pub fn profile_at(&self, point_index: usize) -> Option<&VerticalProfile> {
        self.point_position(point_index).map(|p| &self.point_profiles[p])
    }

    pub fn set_profile_at(&mut self, point_index: usize, profile: VerticalProfile) {
        if let Some(pos) = self.point_position(point_index) {
            self.point_profiles[pos] = profile;
        }
    }

    pub fn data_at(&self, point_index: usize) -> Option<&PointData> {
        self.point_position(point_index).map(|p| &self.point_data[p])
    }

    pub fn data_at_mut(&mut self, point_index: usize) -> Option<&mut PointData> {
        let pos = self.point_position(point_index)?;
        Some(&mut self.point_data[pos])
    }

    /// Upgrade a base harmonic/astronomic condition to its correction kind.
    ///
    /// Expands per-layer component storage from (amplitude, phase) to
    /// (amplitude, phase, amplitude correction, phase correction). Requires
    /// exactly two signal components per layer; the correction slot remap
    /// downstream is defined only for that layout.
    pub fn upgrade_to_correction(&mut self) {
        let correction = match self.kind.correction_kind() {
            Some(kind) => kind,
            None => return,
        };

        for data in &mut self.point_data {
            let layers = data.components.len() / 2;
            let axis_len = data.argument.len();
            let mut expanded = Vec::with_capacity(layers * 4);
            for layer in 0..layers {
                expanded.push(data.components[2 * layer].clone());
                expanded.push(data.components[2 * layer + 1].clone());
                expanded.push(vec![0.0; axis_len]);
                expanded.push(vec![0.0; axis_len]);
            }
            data.components = expanded;
        }

        self.kind = correction;
    }
}

/// Boundary conditions sharing one spatial feature
#[derive(Debug, Clone, Default)]
pub struct BoundaryConditionSet {
    pub feature_name: String,
    pub support_point_names: Vec<String>,
    pub conditions: Vec<FlowBoundaryCondition>,
}

impl BoundaryConditionSet {
    pub fn new(feature_name: impl Into<String>, support_point_names: Vec<String>) -> Self {
        Self {
            feature_name: feature_name.into(),
            support_point_names,
            conditions: Vec::new(),
        }
    }

    /// Whether a block's support-point name addresses this set
    pub fn matches_support_point(&self, name: &str) -> bool {
        self.feature_name == name || self.support_point_names.iter().any(|n| n == name)
    }
}

/// Convert a harmonic period in minutes to a frequency in degrees per hour
pub fn frequency_in_deg_per_hour(period_in_minutes: f64) -> f64 {
    if period_in_minutes == 0.0 {
        0.0
    } else {
        (60.0 * 360.0) / period_in_minutes
    }
}

/// Convert a frequency in degrees per hour to a harmonic period in minutes
pub fn period_in_minutes(frequency_in_deg_per_hour: f64) -> f64 {
    if frequency_in_deg_per_hour == 0.0 {
        0.0
    } else {
        (60.0 * 360.0) / frequency_in_deg_per_hour
    }
}
