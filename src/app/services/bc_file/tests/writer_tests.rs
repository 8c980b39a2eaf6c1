//! Tests for the forcing block writer

use super::parse_blocks;
use crate::app::models::{BoundaryConditionSet, FlowBoundaryCondition, FlowQuantity, ForcingKind};
use crate::app::services::bc_file::writer::{series_index_of, write_block};
use crate::app::services::bc_file::{BcBlockData, BcQuantityData};

fn water_level_block() -> BcBlockData {
    BcBlockData {
        support_point: "pli1_0001".to_string(),
        function_type: "timeseries".to_string(),
        time_interpolation: Some("linear".to_string()),
        quantities: vec![
            BcQuantityData {
                quantity_name: "time".to_string(),
                unit: Some("minutes since 2013-01-01 00:00:00".to_string()),
                vertical_position: None,
                values: vec!["0".to_string(), "60".to_string(), "120".to_string()],
            },
            BcQuantityData {
                quantity_name: "waterlevelbnd".to_string(),
                unit: Some("m".to_string()),
                vertical_position: None,
                values: vec!["3.44".to_string(), "5.2".to_string(), "3.14".to_string()],
            },
        ],
        ..Default::default()
    }
}

fn render(block: &BcBlockData) -> String {
    let mut buffer = Vec::new();
    write_block(&mut buffer, block).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn keys_are_padded_to_the_fixed_column() {
    let text = render(&water_level_block());
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "[forcing]");
    assert_eq!(lines[1], "name              = pli1_0001");
    assert_eq!(lines[2], "function          = timeseries");
    assert_eq!(lines[3], "timeInterpolation = linear");
    assert_eq!(lines[4], "quantity          = time");
    assert_eq!(lines[5], "unit              = minutes since 2013-01-01 00:00:00");
}

#[test]
fn data_columns_are_aligned_and_right_trimmed() {
    let text = render(&water_level_block());
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[8], "0    3.44");
    assert_eq!(lines[9], "60   5.2");
    assert_eq!(lines[10], "120  3.14");
}

#[test]
fn written_blocks_parse_back_unchanged() {
    let mut original = water_level_block();
    original.vertical_position_type = Some("percBed".to_string());
    original.vertical_position_spec = Some("20 80".to_string());
    original.offset = Some("1.2000000e0".to_string());
    original.factor = Some("2.0000000e0".to_string());

    let text = render(&original);
    let parsed = parse_blocks(&text);
    assert_eq!(parsed.len(), 1);

    let block = &parsed[0];
    assert_eq!(block.support_point, original.support_point);
    assert_eq!(block.function_type, original.function_type);
    assert_eq!(block.time_interpolation, original.time_interpolation);
    assert_eq!(block.vertical_position_type, original.vertical_position_type);
    assert_eq!(block.vertical_position_spec, original.vertical_position_spec);
    assert_eq!(block.offset, original.offset);
    assert_eq!(block.factor, original.factor);
    assert_eq!(block.quantities, original.quantities);
}

#[test]
fn vertical_positions_follow_their_quantity() {
    let block = BcBlockData {
        support_point: "pli1_0001".to_string(),
        function_type: "t3d".to_string(),
        quantities: vec![
            BcQuantityData {
                quantity_name: "time".to_string(),
                unit: Some("seconds since 2006-01-01 00:00:00".to_string()),
                vertical_position: None,
                values: vec!["0".to_string()],
            },
            BcQuantityData {
                quantity_name: "salinitybnd".to_string(),
                unit: Some("ppt".to_string()),
                vertical_position: Some("1".to_string()),
                values: vec!["31.0".to_string()],
            },
            BcQuantityData {
                quantity_name: "salinitybnd".to_string(),
                unit: Some("ppt".to_string()),
                vertical_position: Some("2".to_string()),
                values: vec!["30.2".to_string()],
            },
        ],
        ..Default::default()
    };

    let text = render(&block);
    let parsed = parse_blocks(&text);
    assert_eq!(parsed[0].quantities[1].vertical_position.as_deref(), Some("1"));
    assert_eq!(parsed[0].quantities[2].vertical_position.as_deref(), Some("2"));
    assert!(text.contains("vertPositionIndex = 1"));
}

#[test]
fn series_index_counts_similar_conditions_only() {
    let mut set = BoundaryConditionSet::new("pli1", vec!["pli1_0001".to_string()]);
    set.conditions.push(FlowBoundaryCondition::new(
        FlowQuantity::WaterLevel,
        ForcingKind::Harmonics,
    ));
    set.conditions.push(FlowBoundaryCondition::new(
        FlowQuantity::Salinity,
        ForcingKind::TimeSeries,
    ));
    set.conditions.push(FlowBoundaryCondition::new(
        FlowQuantity::WaterLevel,
        ForcingKind::HarmonicCorrection,
    ));
    set.conditions.push(FlowBoundaryCondition::new(
        FlowQuantity::WaterLevel,
        ForcingKind::TimeSeries,
    ));

    assert_eq!(series_index_of(&set, 0), 0);
    assert_eq!(series_index_of(&set, 1), 0);
    // corrections share a series with their base signal
    assert_eq!(series_index_of(&set, 2), 1);
    // a plain time series does not
    assert_eq!(series_index_of(&set, 3), 0);
}
