//! Vertical profile definitions and their textual representation.
//!
//! A vertical profile describes how a boundary condition is distributed over
//! depth: uniform, a top/bottom pair, or an explicit list of positions
//! relative to the bed, the surface or the datum.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Vertical position reference kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalProfileKind {
    Uniform,
    TopBottom,
    ZFromBed,
    ZFromSurface,
    ZFromDatum,
    PercentageFromBed,
    PercentageFromSurface,
}

impl VerticalProfileKind {
    /// Whether this kind carries an explicit depth list
    pub fn has_point_depths(&self) -> bool {
        !matches!(self, VerticalProfileKind::Uniform | VerticalProfileKind::TopBottom)
    }

    /// Canonical name as written in a forcing block
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalProfileKind::Uniform => "uniform",
            VerticalProfileKind::TopBottom => "top-bottom",
            VerticalProfileKind::ZFromBed => "zBed",
            VerticalProfileKind::ZFromSurface => "zSurf",
            VerticalProfileKind::ZFromDatum => "zDatum",
            VerticalProfileKind::PercentageFromBed => "percBed",
            VerticalProfileKind::PercentageFromSurface => "percentage from surface",
        }
    }

    /// Depths relative to the bed run upward, everything else runs downward
    /// from a top reference.
    fn expects_ascending(&self) -> bool {
        matches!(
            self,
            VerticalProfileKind::ZFromBed | VerticalProfileKind::PercentageFromBed
        )
    }
}

/// Resolve a vertical position type name, including legacy spellings
pub fn parse_profile_kind(name: &str) -> Option<VerticalProfileKind> {
    let kind = match name.to_lowercase().as_str() {
        "percbed" | "percentage from bed" | "percentage above bed" | "percentage from bottom"
        | "percentage above bottom" => VerticalProfileKind::PercentageFromBed,
        "percentage from surface" | "percentage from top" => {
            VerticalProfileKind::PercentageFromSurface
        }
        "zbed" | "z from bed" | "z above bed" | "z from bottom" | "z above bottom" => {
            VerticalProfileKind::ZFromBed
        }
        "zsurf" | "z from surface" | "z above surface" | "z from top" | "z above top" => {
            VerticalProfileKind::ZFromSurface
        }
        "zdatum" | "z from datum" | "z above datum" => VerticalProfileKind::ZFromDatum,
        "single" | "uniform" | "none" => VerticalProfileKind::Uniform,
        "bed-surface" | "surface-bed" | "top-bottom" | "bottom-top" => {
            VerticalProfileKind::TopBottom
        }
        _ => return None,
    };
    Some(kind)
}

/// A depth-distribution description for one data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalProfile {
    pub kind: VerticalProfileKind,
    /// Point depths in file order; empty for uniform and top-bottom kinds
    pub point_depths: Vec<f64>,
}

impl VerticalProfile {
    /// Uniform profile, the default when a block declares no vertical type
    pub fn uniform() -> Self {
        Self {
            kind: VerticalProfileKind::Uniform,
            point_depths: Vec::new(),
        }
    }

    /// Build a profile, checking the kind-specific depth ordering.
    ///
    /// An out-of-order depth list is reported but the given order is kept;
    /// reordering would silently break the correspondence between layers and
    /// data columns.
    pub fn create(kind: VerticalProfileKind, point_depths: Vec<f64>) -> Self {
        if kind.has_point_depths() && point_depths.len() > 1 {
            let sorted = if kind.expects_ascending() {
                point_depths.windows(2).all(|w| w[0] <= w[1])
            } else {
                point_depths.windows(2).all(|w| w[0] >= w[1])
            };
            if !sorted {
                warn!(
                    "Vertical positions {:?} are not sorted for profile kind {}; keeping given order",
                    point_depths,
                    kind.as_str()
                );
            }
        }
        Self { kind, point_depths }
    }

    /// Number of vertical layers this profile spans
    pub fn layer_count(&self) -> usize {
        match self.kind {
            VerticalProfileKind::Uniform => 1,
            VerticalProfileKind::TopBottom => 2,
            _ => self.point_depths.len().max(1),
        }
    }

    /// Depth list as written in a block, `None` for kinds without one
    pub fn spec_string(&self) -> Option<String> {
        if !self.kind.has_point_depths() {
            return None;
        }
        Some(
            self.point_depths
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

/// Vertical interpolation between profile layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalInterpolation {
    Uniform,
    Linear,
    Step,
    Logarithmic,
}

impl VerticalInterpolation {
    /// Name as written in a forcing block, `None` for uniform
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            VerticalInterpolation::Linear => Some("linear"),
            VerticalInterpolation::Step => Some("block"),
            VerticalInterpolation::Logarithmic => Some("log"),
            VerticalInterpolation::Uniform => None,
        }
    }

    /// Parse an interpolation name; absent or empty means linear, unknown
    /// names degrade to uniform with a warning at the call site.
    pub fn parse(name: Option<&str>) -> Option<Self> {
        let name = match name {
            None => return Some(VerticalInterpolation::Linear),
            Some(n) if n.is_empty() => return Some(VerticalInterpolation::Linear),
            Some(n) => n,
        };
        match name.to_lowercase().as_str() {
            "linear" => Some(VerticalInterpolation::Linear),
            "block" => Some(VerticalInterpolation::Step),
            "log" => Some(VerticalInterpolation::Logarithmic),
            _ => None,
        }
    }
}
