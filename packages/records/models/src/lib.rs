#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed rows for the user, shift, application and shifts-in-radius
//! exports.
//!
//! Every record is built once by the loader and never mutated. Field
//! coercion helpers live here so both the loader and tests share the same
//! rules for what counts as a valid coordinate, date or count.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use locum_map_geography_models::Located;
use serde::{Deserialize, Serialize};

pub use locum_map_geography_models::{ParseError, parse_coordinate};

/// Datetime layouts accepted in date columns, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a date column value.
///
/// Empty cells are treated as missing and yield `Ok(None)`. Values with a
/// UTC offset are converted to UTC and the offset dropped.
///
/// # Errors
///
/// Returns [`ParseError`] if the value is non-empty and matches none of
/// the supported layouts.
pub fn parse_datetime(field: &str, raw: &str) -> Result<Option<NaiveDateTime>, ParseError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Some(dt));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.naive_utc()));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(Some(dt.naive_utc()));
    }

    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Ok(d.and_hms_opt(0, 0, 0));
        }
    }

    Err(ParseError::new(field, raw, "unrecognised date format"))
}

/// 2^64, the first whole `f64` that does not fit in a `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Parses a non-negative whole-number count.
///
/// Accepts `"12"` as well as float-formatted whole numbers like `"12.0"`.
///
/// # Errors
///
/// Returns [`ParseError`] if the value is empty, negative, fractional,
/// too large for a `u64` or not a number.
pub fn parse_count(field: &str, raw: &str) -> Result<u64, ParseError> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }

    let value = s
        .parse::<f64>()
        .map_err(|e| ParseError::new(field, raw, e.to_string()))?;

    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(ParseError::new(
            field,
            raw,
            "expected a non-negative whole number",
        ));
    }
    if value >= U64_LIMIT {
        return Err(ParseError::new(field, raw, "value out of range"));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(value as u64)
}

/// Parses a non-negative distance.
///
/// # Errors
///
/// Returns [`ParseError`] if the value is not a finite number `>= 0`.
pub fn parse_distance(field: &str, raw: &str) -> Result<f64, ParseError> {
    let value = parse_coordinate(field, raw)?;
    if value < 0.0 {
        return Err(ParseError::new(field, raw, "distance cannot be negative"));
    }
    Ok(value)
}

/// A posted shift with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    /// `Shift ID` column.
    pub shift_id: String,
    /// When the shift was posted.
    pub posted_date: Option<NaiveDateTime>,
    /// When the shift starts.
    pub start_time: Option<NaiveDateTime>,
    /// When the shift ends.
    pub end_time: Option<NaiveDateTime>,
    /// Latitude of the shift's workplace.
    pub latitude: f64,
    /// Longitude of the shift's workplace.
    pub longitude: f64,
}

impl Located for ShiftRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A registered user with their home location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// `User ID` column.
    pub user_id: String,
    /// Account creation time.
    pub created_date: Option<NaiveDateTime>,
    /// Latitude of the user's home location.
    pub latitude: f64,
    /// Longitude of the user's home location.
    pub longitude: f64,
}

impl Located for UserRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Precomputed count of shifts within a user's stated travel radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusRecord {
    /// `User ID` column.
    pub user_id: String,
    /// Account creation time.
    pub created_date: Option<NaiveDateTime>,
    /// Number of shifts inside the travel radius.
    pub shifts_in_radius: u64,
    /// The user's stated travel radius.
    pub travel_radius: f64,
}

/// One application by a user to a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    /// `Application ID` column, when the export has one.
    pub application_id: Option<String>,
    /// Shift applied to.
    pub shift_id: String,
    /// Applicant.
    pub user_id: String,
}

/// Every record loaded for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Rows of the shifts export.
    pub shifts: Vec<ShiftRecord>,
    /// Rows of the users export.
    pub users: Vec<UserRecord>,
    /// Rows of the applications export.
    pub applications: Vec<ApplicationRecord>,
    /// Rows of the shifts-in-radius export.
    pub radius: Vec<RadiusRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_datetimes() {
        let dt = parse_datetime("Posted Date", "2021-03-01 09:30:00")
            .unwrap()
            .unwrap();
        assert_eq!(dt.to_string(), "2021-03-01 09:30:00");

        let dt = parse_datetime("Posted Date", "2021-03-01T09:30:00.250")
            .unwrap()
            .unwrap();
        assert_eq!(dt.to_string(), "2021-03-01 09:30:00.250");
    }

    #[test]
    fn parses_offset_datetime_as_utc() {
        let dt = parse_datetime("Start Time", "2021-03-01T09:30:00+01:00")
            .unwrap()
            .unwrap();
        assert_eq!(dt.to_string(), "2021-03-01 08:30:00");
    }

    #[test]
    fn parses_date_only_as_midnight() {
        let dt = parse_datetime("Created Date", "2021-02-28").unwrap().unwrap();
        assert_eq!(dt.to_string(), "2021-02-28 00:00:00");

        let dt = parse_datetime("Created Date", "02/28/2021").unwrap().unwrap();
        assert_eq!(dt.to_string(), "2021-02-28 00:00:00");
    }

    #[test]
    fn empty_date_is_missing() {
        assert_eq!(parse_datetime("End Time", "  ").unwrap(), None);
    }

    #[test]
    fn rejects_garbage_date() {
        let err = parse_datetime("Created Date", "yesterday").unwrap_err();
        assert_eq!(err.field, "Created Date");
    }

    #[test]
    fn parses_counts() {
        assert_eq!(parse_count("shifts_in_radius", "0").unwrap(), 0);
        assert_eq!(parse_count("shifts_in_radius", "42").unwrap(), 42);
        assert_eq!(parse_count("shifts_in_radius", "42.0").unwrap(), 42);
        assert!(parse_count("shifts_in_radius", "-1").is_err());
        assert!(parse_count("shifts_in_radius", "4.5").is_err());
        assert!(parse_count("shifts_in_radius", "lots").is_err());
    }

    #[test]
    fn rejects_counts_beyond_u64() {
        let err = parse_count("shifts_in_radius", "1e30").unwrap_err();
        assert_eq!(err.field, "shifts_in_radius");
        assert_eq!(err.reason, "value out of range");
        assert!(parse_count("shifts_in_radius", "18446744073709551616").is_err());
        assert_eq!(
            parse_count("shifts_in_radius", "1e13").unwrap(),
            10_000_000_000_000
        );
    }

    #[test]
    fn parses_distances() {
        assert!((parse_distance("Travel Radius", "25.5").unwrap() - 25.5).abs() < f64::EPSILON);
        assert!(parse_distance("Travel Radius", "-3").is_err());
    }

    #[test]
    fn records_expose_coordinates() {
        let user = UserRecord {
            user_id: "u1".to_string(),
            created_date: None,
            latitude: 53.4,
            longitude: -2.9,
        };
        assert!((user.latitude() - 53.4).abs() < f64::EPSILON);
        assert!((Located::longitude(&user) - -2.9).abs() < f64::EPSILON);
    }
}
