//! Raw column value parsing.
//!
//! Converts the string columns of a forcing block into typed values: time
//! columns given as offsets from a "since" unit or as compact datetimes,
//! double columns with the minutes-to-frequency conversion of harmonic
//! argument axes, and the time zone carried by a unit string.

use chrono::{Duration, NaiveDateTime};

use crate::app::models::frequency_in_deg_per_hour;
use crate::constants::{COMPACT_DATETIME_FORMAT, MINUTES_UNIT, UNIT_DATETIME_FORMAT};
use crate::{Error, Result};

/// Parse a time column into datetimes.
///
/// A unit of the form `seconds since 2006-01-01 00:00:00 [+01:00]` makes the
/// values offsets from the reference; any other unit means the values are
/// compact `yyyyMMddHHmmss` datetimes.
pub fn parse_datetimes(
    unit: Option<&str>,
    values: &[String],
    context: &str,
) -> Result<Vec<NaiveDateTime>> {
    if let Some(unit) = unit {
        if let Some((reference, step_in_seconds, _)) = parse_since_unit(unit) {
            return values
                .iter()
                .map(|value| {
                    let offset: f64 = value.parse().map_err(|_| {
                        Error::format(context, format!("time value {value} could not be parsed"))
                    })?;
                    let millis = (offset * step_in_seconds * 1000.0).round() as i64;
                    Ok(reference + Duration::milliseconds(millis))
                })
                .collect();
        }
    }

    values
        .iter()
        .map(|value| {
            NaiveDateTime::parse_from_str(value, COMPACT_DATETIME_FORMAT)
                .map_err(|e| Error::datetime_parsing(format!("{context}: time value {value}"), e))
        })
        .collect()
}

/// Time zone offset carried by a "since" unit string, if any
pub fn parse_time_zone(unit: Option<&str>) -> Option<Duration> {
    parse_since_unit(unit?).and_then(|(_, _, zone)| zone)
}

/// Parse a double column. A `minutes` unit marks harmonic periods, which are
/// converted to frequencies in degrees per hour.
pub fn parse_doubles(unit: Option<&str>, values: &[String], context: &str) -> Result<Vec<f64>> {
    let convert = unit.is_some_and(|u| u.eq_ignore_ascii_case(MINUTES_UNIT));
    values
        .iter()
        .map(|value| {
            let parsed: f64 = value.parse().map_err(|_| {
                Error::format(context, format!("value {value} could not be parsed"))
            })?;
            Ok(if convert {
                frequency_in_deg_per_hour(parsed)
            } else {
                parsed
            })
        })
        .collect()
}

/// Unit string for a time axis written as offsets from a reference date
pub fn datetime_unit(reference: NaiveDateTime, time_zone: Option<Duration>) -> String {
    let mut unit = format!("seconds since {}", reference.format(UNIT_DATETIME_FORMAT));
    if let Some(zone) = time_zone {
        let total_minutes = zone.num_minutes();
        let sign = if total_minutes < 0 { '-' } else { '+' };
        let minutes = total_minutes.abs();
        unit.push_str(&format!(" {}{:02}:{:02}", sign, minutes / 60, minutes % 60));
    }
    unit
}

/// Shortest round-tripping decimal representation
pub fn format_double(value: f64) -> String {
    format!("{value}")
}

/// Decompose a `<step> since <datetime> [<zone>]` unit into the reference
/// datetime, the step length in seconds and an optional time zone offset
fn parse_since_unit(unit: &str) -> Option<(NaiveDateTime, f64, Option<Duration>)> {
    let tokens: Vec<&str> = unit.split_whitespace().collect();
    if tokens.len() < 4 || !tokens[1].eq_ignore_ascii_case("since") {
        return None;
    }

    let step_in_seconds = match tokens[0].to_lowercase().as_str() {
        "seconds" => 1.0,
        "minutes" => 60.0,
        "hours" => 3600.0,
        "days" => 86400.0,
        _ => return None,
    };

    let reference = NaiveDateTime::parse_from_str(
        &format!("{} {}", tokens[2], tokens[3]),
        UNIT_DATETIME_FORMAT,
    )
    .ok()?;

    let zone = tokens.get(4).and_then(|t| parse_zone_token(t));

    Some((reference, step_in_seconds, zone))
}

fn parse_zone_token(token: &str) -> Option<Duration> {
    let (sign, rest) = match token.strip_prefix('+') {
        Some(rest) => (1, rest),
        None => (-1, token.strip_prefix('-')?),
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    Some(Duration::minutes(sign * (hours * 60 + minutes)))
}
