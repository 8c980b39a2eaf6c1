//! Catalog of forcing function types and boundary quantity names.
//!
//! Maps the function type names written in forcing blocks onto argument and
//! component role schemas, records the correction/base signal relation, and
//! hosts the registry of known flow quantity names. The catalog is built
//! once and passed by reference, so tests can substitute alternate schemas
//! without shared mutable state.

use crate::app::models::{FlowQuantity, ForcingKind};
use crate::constants::{functions, quantities};

/// Argument/component role schema for one written function type name
#[derive(Debug, Clone)]
pub struct ForcingSchema {
    /// Function type name as written in a block
    pub name: &'static str,
    pub kind: ForcingKind,
    /// Ordered argument role names, e.g. "time", "astronomic component"
    pub arguments: Vec<&'static str>,
    /// Ordered component role suffixes, e.g. "amplitude", "phase"; an empty
    /// suffix denotes the single implicit component of a plain series
    pub components: Vec<&'static str>,
}

impl ForcingSchema {
    /// Number of component roles per quantity variable and layer
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// Immutable catalog of forcing schemas and quantity names
#[derive(Debug, Clone)]
pub struct ForcingCatalog {
    schemas: Vec<ForcingSchema>,
    quantity_names: Vec<(&'static str, FlowQuantity)>,
}

impl ForcingCatalog {
    /// The standard catalog covering every supported forcing kind
    pub fn standard() -> Self {
        let schemas = vec![
            ForcingSchema {
                name: functions::TIME_SERIES,
                kind: ForcingKind::TimeSeries,
                arguments: vec!["time"],
                components: vec![""],
            },
            ForcingSchema {
                name: functions::TIME_SERIES_3D,
                kind: ForcingKind::TimeSeries,
                arguments: vec!["time"],
                components: vec![""],
            },
            ForcingSchema {
                name: functions::ASTRONOMIC,
                kind: ForcingKind::AstroComponents,
                arguments: vec!["astronomic component"],
                components: vec!["amplitude", "phase"],
            },
            ForcingSchema {
                name: functions::ASTRONOMIC_CORRECTION,
                kind: ForcingKind::AstroCorrection,
                arguments: vec!["astronomic component"],
                components: vec!["amplitude", "phase"],
            },
            ForcingSchema {
                name: functions::HARMONIC,
                kind: ForcingKind::Harmonics,
                arguments: vec!["harmonic component"],
                components: vec!["amplitude", "phase"],
            },
            ForcingSchema {
                name: functions::HARMONIC_CORRECTION,
                kind: ForcingKind::HarmonicCorrection,
                arguments: vec!["harmonic component"],
                components: vec!["amplitude", "phase"],
            },
            ForcingSchema {
                name: functions::QH_TABLE,
                kind: ForcingKind::QhTable,
                arguments: vec!["qhbnd discharge"],
                components: vec!["qhbnd waterlevel"],
            },
        ];

        // Registration order matters: exact lookups win over prefix lookups,
        // and the per-quantity variable order fixes the component layout of
        // multi-variable quantities such as the velocity vector.
        let quantity_names = vec![
            (quantities::WATER_LEVEL, FlowQuantity::WaterLevel),
            (quantities::DISCHARGE, FlowQuantity::Discharge),
            (quantities::QH_DISCHARGE, FlowQuantity::Discharge),
            (quantities::VELOCITY, FlowQuantity::Velocity),
            (quantities::NEUMANN, FlowQuantity::Neumann),
            (quantities::RIEMANN, FlowQuantity::Riemann),
            (quantities::RIEMANN_VELOCITY, FlowQuantity::RiemannVelocity),
            (quantities::NORMAL_VELOCITY, FlowQuantity::NormalVelocity),
            (quantities::TANGENTIAL_VELOCITY, FlowQuantity::TangentVelocity),
            (quantities::X_VELOCITY, FlowQuantity::VelocityVector),
            (quantities::Y_VELOCITY, FlowQuantity::VelocityVector),
            (quantities::SALINITY, FlowQuantity::Salinity),
            (quantities::TEMPERATURE, FlowQuantity::Temperature),
            (quantities::TRACER, FlowQuantity::Tracer),
            (quantities::SEDIMENT_CONCENTRATION, FlowQuantity::SedimentConcentration),
        ];

        Self {
            schemas,
            quantity_names,
        }
    }

    /// Look up a schema by its written function type name, case-insensitively
    pub fn lookup(&self, name: &str) -> Option<&ForcingSchema> {
        self.schemas
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Schemas of one forcing kind in declaration order: the 2-D variant
    /// first, the 3-D/profile companion second when one exists
    pub fn schemas_for_kind(&self, kind: ForcingKind) -> Vec<&ForcingSchema> {
        self.schemas.iter().filter(|s| s.kind == kind).collect()
    }

    /// Resolve a quantity name against the registry: exact match first, then
    /// the first registered name the given name starts with
    pub fn quantity_for_name(&self, name: &str) -> Option<FlowQuantity> {
        self.quantity_names
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .or_else(|| {
                self.quantity_names.iter().find(|(key, _)| {
                    name.get(..key.len())
                        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(key))
                })
            })
            .map(|(_, quantity)| *quantity)
    }

    /// Whether any registered name is a prefix of the given quantity name
    pub fn is_known_quantity_name(&self, name: &str) -> bool {
        self.quantity_for_name(name).is_some()
    }

    /// Registered written names for a quantity, in registration order
    pub fn names_for_quantity(&self, quantity: FlowQuantity) -> Vec<&'static str> {
        self.quantity_names
            .iter()
            .filter(|(_, q)| *q == quantity)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Number of name variables a quantity spans, e.g. two for the
    /// x/y velocity vector pair
    pub fn variable_count(&self, quantity: FlowQuantity) -> usize {
        self.quantity_names.iter().filter(|(_, q)| *q == quantity).count()
    }

    /// The canonical written name for the water level quantity, the target
    /// of the Q-H component mapping
    pub fn water_level_name(&self) -> &'static str {
        quantities::WATER_LEVEL
    }
}

impl Default for ForcingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = ForcingCatalog::standard();
        let schema = catalog.lookup("TIMESERIES").unwrap();
        assert_eq!(schema.kind, ForcingKind::TimeSeries);
        assert_eq!(schema.arguments, vec!["time"]);
        assert_eq!(schema.components, vec![""]);

        assert!(catalog.lookup("spectral").is_none());
    }

    #[test]
    fn plain_and_profile_series_share_a_kind() {
        let catalog = ForcingCatalog::standard();
        let schemas = catalog.schemas_for_kind(ForcingKind::TimeSeries);
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].name, "timeseries");
        assert_eq!(schemas[1].name, "t3d");
    }

    #[test]
    fn every_correction_kind_has_exactly_one_base() {
        let catalog = ForcingCatalog::standard();
        for schema in catalog.schemas_for_kind(ForcingKind::AstroCorrection) {
            assert_eq!(schema.kind.base_kind(), Some(ForcingKind::AstroComponents));
        }
        for schema in catalog.schemas_for_kind(ForcingKind::HarmonicCorrection) {
            assert_eq!(schema.kind.base_kind(), Some(ForcingKind::Harmonics));
        }
    }

    #[test]
    fn quantity_resolution_prefers_exact_over_prefix() {
        let catalog = ForcingCatalog::standard();
        assert_eq!(
            catalog.quantity_for_name("waterlevelbnd"),
            Some(FlowQuantity::WaterLevel)
        );
        // prefix match: tracer names carry a suffix
        assert_eq!(
            catalog.quantity_for_name("tracerbnd"),
            Some(FlowQuantity::Tracer)
        );
        assert_eq!(
            catalog.quantity_for_name("sedfracbnd_sand"),
            Some(FlowQuantity::SedimentConcentration)
        );
        assert_eq!(catalog.quantity_for_name("sedimentbnd"), None);
    }

    #[test]
    fn velocity_vector_spans_two_variables() {
        let catalog = ForcingCatalog::standard();
        assert_eq!(catalog.variable_count(FlowQuantity::VelocityVector), 2);
        assert_eq!(
            catalog.names_for_quantity(FlowQuantity::VelocityVector),
            vec!["x-velocity", "y-velocity"]
        );
        assert_eq!(catalog.variable_count(FlowQuantity::Salinity), 1);
    }
}
