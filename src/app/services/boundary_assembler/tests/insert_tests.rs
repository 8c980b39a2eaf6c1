//! Tests for the block insertion state machine

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::{boundary_set, forcing_block, quantity};
use crate::app::models::{
    ArgumentAxis, FlowQuantity, ForcingKind, TimeInterpolation, VerticalInterpolation,
    VerticalProfileKind,
};
use crate::app::services::boundary_assembler::{BoundaryDataBuilder, InsertOutcome};
use crate::config::BuilderOptions;

fn date(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

#[test]
fn time_series_block_creates_a_condition_with_parsed_times() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001", "pli1_0002"])];

    let mut block = forcing_block(
        "pli1_0001",
        "timeseries",
        vec![
            quantity(
                "time",
                Some("minutes since 2013-01-01 00:00:00 +01:00"),
                None,
                &["0", "60"],
            ),
            quantity("waterlevelbnd", Some("m"), None, &["1.5", "2.5"]),
        ],
    );
    block.time_interpolation = Some("block".to_string());

    assert_eq!(
        builder.insert_block(&mut sets, &block, None),
        InsertOutcome::Consumed
    );

    let condition = &sets[0].conditions[0];
    assert_eq!(condition.quantity, FlowQuantity::WaterLevel);
    assert_eq!(condition.kind, ForcingKind::TimeSeries);
    assert_eq!(
        condition.time_interpolation,
        Some(TimeInterpolation::BlockConstant)
    );
    assert_eq!(condition.time_zone, Some(Duration::minutes(60)));

    let data = condition.data_at(0).unwrap();
    assert_eq!(
        data.argument,
        ArgumentAxis::Times(vec![date(2013, 1, 1, 0), date(2013, 1, 1, 1)])
    );
    assert_eq!(data.components[0], vec![1.5, 2.5]);
}

#[test]
fn layered_block_distributes_columns_over_layers() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let mut block = forcing_block(
        "pli1_0001",
        "t3d",
        vec![
            quantity(
                "time",
                Some("seconds since 2006-01-01 00:00:00"),
                None,
                &["0", "3600"],
            ),
            quantity("salinitybnd", Some("ppt"), Some("1"), &["31.0", "31.4"]),
            quantity("salinitybnd", Some("ppt"), Some("2"), &["30.2", "30.9"]),
        ],
    );
    block.vertical_position_type = Some("zBed".to_string());
    block.vertical_position_spec = Some("1.0 4.0".to_string());
    block.vertical_interpolation = Some("log".to_string());

    assert_eq!(
        builder.insert_block(&mut sets, &block, None),
        InsertOutcome::Consumed
    );

    let condition = &sets[0].conditions[0];
    assert_eq!(condition.quantity, FlowQuantity::Salinity);
    assert_eq!(
        condition.vertical_interpolation,
        VerticalInterpolation::Logarithmic
    );

    let profile = condition.profile_at(0).unwrap();
    assert_eq!(profile.kind, VerticalProfileKind::ZFromBed);
    assert_eq!(profile.point_depths, vec![1.0, 4.0]);

    let data = condition.data_at(0).unwrap();
    assert_eq!(data.components.len(), 2);
    assert_eq!(data.components[0], vec![31.0, 31.4]);
    assert_eq!(data.components[1], vec![30.2, 30.9]);
}

#[test]
fn correction_block_upgrades_the_signal_and_matches_by_component_name() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let signal = forcing_block(
        "pli1_0001",
        "astronomic",
        vec![
            quantity("astronomic component", None, None, &["M2", "S2"]),
            quantity("waterlevelbnd amplitude", Some("m"), None, &["1.0", "0.5"]),
            quantity("waterlevelbnd phase", Some("deg"), None, &["10", "20"]),
        ],
    );
    let correction = forcing_block(
        "pli1_0001",
        "astronomic-correction",
        vec![
            // swapped order plus an unknown component
            quantity("astronomic component", None, None, &["S2", "M2", "K1"]),
            quantity(
                "waterlevelbnd amplitude",
                Some("-"),
                None,
                &["0.9", "0.8", "0.7"],
            ),
            quantity("waterlevelbnd phase", Some("deg"), None, &["2", "1", "5"]),
        ],
    );

    let leftover = builder.insert_blocks(&mut sets, vec![signal, correction], None);
    assert!(leftover.is_empty());

    let condition = &sets[0].conditions[0];
    assert_eq!(condition.kind, ForcingKind::AstroCorrection);

    let data = condition.data_at(0).unwrap();
    assert_eq!(data.components.len(), 4);
    assert_eq!(data.components[0], vec![1.0, 0.5]);
    assert_eq!(data.components[1], vec![10.0, 20.0]);
    assert_eq!(data.components[2], vec![0.8, 0.9]);
    assert_eq!(data.components[3], vec![1.0, 2.0]);
}

#[test]
fn harmonic_periods_convert_to_frequencies() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let block = forcing_block(
        "pli1_0001",
        "harmonic",
        vec![
            quantity("harmonic component", Some("minutes"), None, &["745"]),
            quantity("waterlevelbnd amplitude", Some("m"), None, &["1.1"]),
            quantity("waterlevelbnd phase", Some("deg"), None, &["33"]),
        ],
    );

    assert_eq!(
        builder.insert_block(&mut sets, &block, None),
        InsertOutcome::Consumed
    );

    let data = sets[0].conditions[0].data_at(0).unwrap();
    match &data.argument {
        ArgumentAxis::Frequencies(frequencies) => {
            assert!((frequencies[0] - 60.0 * 360.0 / 745.0).abs() < 1e-12);
        }
        other => panic!("expected frequencies, got {other:?}"),
    }
}

#[test]
fn unknown_support_points_reject_the_block() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let block = forcing_block(
        "elsewhere_0001",
        "timeseries",
        vec![
            quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
            quantity("waterlevelbnd", Some("m"), None, &["1.0"]),
        ],
    );

    assert_eq!(
        builder.insert_block(&mut sets, &block, None),
        InsertOutcome::Rejected
    );
    assert!(sets[0].conditions.is_empty());
}

#[test]
fn excluded_kinds_consume_without_adding_data() {
    let options = BuilderOptions {
        excluded_kinds: vec![ForcingKind::QhTable],
        ..Default::default()
    };
    let builder = BoundaryDataBuilder::new(
        std::sync::Arc::new(crate::app::services::forcing_catalog::ForcingCatalog::standard()),
        options,
    );
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let block = forcing_block(
        "pli1_0001",
        "qhtable",
        vec![
            quantity("qhbnd discharge", Some("m3/s"), None, &["100"]),
            quantity("qhbnd waterlevel", Some("m"), None, &["1.5"]),
        ],
    );

    assert_eq!(
        builder.insert_block(&mut sets, &block, None),
        InsertOutcome::Consumed
    );
    assert!(sets[0].conditions.is_empty());
}

#[test]
fn excluded_quantities_defer_the_block_for_a_later_pass() {
    let options = BuilderOptions {
        excluded_quantities: vec![FlowQuantity::Salinity],
        ..Default::default()
    };
    let builder = BoundaryDataBuilder::new(
        std::sync::Arc::new(crate::app::services::forcing_catalog::ForcingCatalog::standard()),
        options,
    );
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let block = forcing_block(
        "pli1_0001",
        "timeseries",
        vec![
            quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
            quantity("salinitybnd", Some("ppt"), None, &["31.0"]),
        ],
    );

    assert_eq!(
        builder.insert_block(&mut sets, &block, None),
        InsertOutcome::Deferred
    );
    assert!(sets[0].conditions.is_empty());

    // a stalled work list hands the block back instead of looping
    let leftover = builder.insert_blocks(&mut sets, vec![block], None);
    assert_eq!(leftover.len(), 1);
}

#[test]
fn deferred_blocks_are_consumed_by_a_later_pass_with_wider_options() {
    let options = BuilderOptions {
        excluded_quantities: vec![FlowQuantity::Salinity],
        ..Default::default()
    };
    let first_pass = BoundaryDataBuilder::new(
        std::sync::Arc::new(crate::app::services::forcing_catalog::ForcingCatalog::standard()),
        options,
    );
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let blocks = vec![
        forcing_block(
            "pli1_0001",
            "timeseries",
            vec![
                quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
                quantity("waterlevelbnd", Some("m"), None, &["1.0"]),
            ],
        ),
        forcing_block(
            "pli1_0001",
            "timeseries",
            vec![
                quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
                quantity("salinitybnd", Some("ppt"), None, &["31.0"]),
            ],
        ),
    ];

    let leftover = first_pass.insert_blocks(&mut sets, blocks, None);
    assert_eq!(leftover.len(), 1);
    assert_eq!(sets[0].conditions.len(), 1);
    assert_eq!(sets[0].conditions[0].quantity, FlowQuantity::WaterLevel);

    let second_pass = BoundaryDataBuilder::standard();
    let leftover = second_pass.insert_blocks(&mut sets, leftover, None);
    assert!(leftover.is_empty());
    assert_eq!(sets[0].conditions.len(), 2);
    assert_eq!(sets[0].conditions[1].quantity, FlowQuantity::Salinity);
}

#[test]
fn uniform_conditions_only_accept_data_at_the_first_point() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001", "pli1_0002"])];

    let at_second_point = forcing_block(
        "pli1_0002",
        "timeseries",
        vec![
            quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
            quantity("dischargebnd", Some("m3/s"), None, &["80"]),
        ],
    );
    assert_eq!(
        builder.insert_block(&mut sets, &at_second_point, None),
        InsertOutcome::Consumed
    );
    assert!(sets[0].conditions[0].point_indices().is_empty());

    let at_feature = forcing_block(
        "pli1",
        "timeseries",
        vec![
            quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
            quantity("dischargebnd", Some("m3/s"), None, &["80"]),
        ],
    );
    assert_eq!(
        builder.insert_block(&mut sets, &at_feature, None),
        InsertOutcome::Consumed
    );
    assert_eq!(sets[0].conditions[0].point_indices(), &[0]);
}

#[test]
fn series_index_selects_among_similar_conditions() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let first = forcing_block(
        "pli1_0001",
        "harmonic",
        vec![
            quantity("harmonic component", Some("minutes"), None, &["745"]),
            quantity("waterlevelbnd amplitude", Some("m"), None, &["1.0"]),
            quantity("waterlevelbnd phase", Some("deg"), None, &["0"]),
        ],
    );
    let mut second = first.clone();
    second.series_index = Some("2".to_string());
    second.quantities[1].values = vec!["2.0".to_string()];

    builder.insert_block(&mut sets, &first, None);
    builder.insert_block(&mut sets, &second, None);

    assert_eq!(sets[0].conditions.len(), 2);
    assert_eq!(sets[0].conditions[0].data_at(0).unwrap().components[0], vec![1.0]);
    assert_eq!(sets[0].conditions[1].data_at(0).unwrap().components[0], vec![2.0]);
}

#[test]
fn value_failures_roll_back_the_added_point() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let block = forcing_block(
        "pli1_0001",
        "timeseries",
        vec![
            quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
            quantity("waterlevelbnd", Some("m"), None, &["not-a-number"]),
        ],
    );

    assert_eq!(
        builder.insert_block(&mut sets, &block, None),
        InsertOutcome::Consumed
    );
    let condition = &sets[0].conditions[0];
    assert!(condition.point_indices().is_empty());
    assert!(condition.data_at(0).is_none());
}

#[test]
fn existing_data_is_kept_when_overwrite_is_disabled() {
    let options = BuilderOptions {
        overwrite_existing_data: false,
        ..Default::default()
    };
    let builder = BoundaryDataBuilder::new(
        std::sync::Arc::new(crate::app::services::forcing_catalog::ForcingCatalog::standard()),
        options,
    );
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let first = forcing_block(
        "pli1_0001",
        "timeseries",
        vec![
            quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
            quantity("waterlevelbnd", Some("m"), None, &["1.0"]),
        ],
    );
    let mut second = first.clone();
    second.quantities[1].values = vec!["9.0".to_string()];

    builder.insert_block(&mut sets, &first, None);
    builder.insert_block(&mut sets, &second, None);

    let data = sets[0].conditions[0].data_at(0).unwrap();
    assert_eq!(data.components[0], vec![1.0]);
}

#[test]
fn thatcher_harleman_lag_is_applied_to_new_conditions() {
    let builder = BoundaryDataBuilder::standard();
    let mut sets = vec![boundary_set("pli1", &["pli1_0001"])];

    let block = forcing_block(
        "pli1_0001",
        "timeseries",
        vec![
            quantity("time", Some("seconds since 2001-01-01 00:00:00"), None, &["0"]),
            quantity("tracerbnd_dye", Some("kg/m3"), None, &["0.1"]),
        ],
    );

    builder.insert_block(&mut sets, &block, Some(120.0));

    let condition = &sets[0].conditions[0];
    assert_eq!(condition.quantity, FlowQuantity::Tracer);
    assert_eq!(condition.tracer_name.as_deref(), Some("dye"));
    assert_eq!(condition.thatcher_harleman_lag, 120.0);
}
