#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate ranges, bounding boxes and per-location aggregates.
//!
//! These types are shared by every record type that carries a
//! latitude/longitude pair. Anything implementing [`Located`] can be
//! filtered to a [`BoundingBox`] and grouped into [`LocationAggregate`]
//! rows by the analytics crate.

use serde::{Deserialize, Serialize};

/// Errors produced when coercing a text field into a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} value '{value}': {reason}")]
pub struct ParseError {
    /// Column the value came from (e.g. `"Latitude"`).
    pub field: String,
    /// The raw text that failed to parse.
    pub value: String,
    /// Why the value was rejected.
    pub reason: String,
}

impl ParseError {
    /// Builds a [`ParseError`] for `field`/`value`.
    #[must_use]
    pub fn new(field: &str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Parses a coordinate column value into a finite `f64`.
///
/// Surrounding whitespace is ignored. Empty strings, non-numeric text and
/// non-finite values (`NaN`, `inf`) are rejected.
///
/// # Errors
///
/// Returns [`ParseError`] if the value is not a finite number.
pub fn parse_coordinate(field: &str, raw: &str) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new(field, raw, "value is empty"));
    }

    let value = trimmed
        .parse::<f64>()
        .map_err(|e| ParseError::new(field, raw, e.to_string()))?;

    if !value.is_finite() {
        return Err(ParseError::new(field, raw, "value is not finite"));
    }

    Ok(value)
}

/// An inclusive `[min, max]` range on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl CoordinateRange {
    /// Creates a range from its bounds.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` lies within the range, bounds included.
    ///
    /// `NaN` is never contained.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Returns `true` if both bounds are finite and `min <= max`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// A rectangular latitude/longitude area.
///
/// A missing axis deserializes to the [`BoundingBox::UK_AND_IRELAND`] range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    /// Allowed latitudes.
    pub latitude: CoordinateRange,
    /// Allowed longitudes.
    pub longitude: CoordinateRange,
}

impl BoundingBox {
    /// Approximate box around Great Britain and Ireland.
    pub const UK_AND_IRELAND: Self = Self {
        latitude: CoordinateRange::new(50.0, 60.0),
        longitude: CoordinateRange::new(-12.0, 2.0),
    };

    /// Creates a bounding box from latitude and longitude ranges.
    #[must_use]
    pub const fn new(latitude: CoordinateRange, longitude: CoordinateRange) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if the point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.latitude.contains(latitude) && self.longitude.contains(longitude)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::UK_AND_IRELAND
    }
}

/// A record that has a position on the map.
pub trait Located {
    /// Latitude in decimal degrees.
    fn latitude(&self) -> f64;

    /// Longitude in decimal degrees.
    fn longitude(&self) -> f64;
}

/// Number of records sharing one exact coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAggregate {
    /// Latitude shared by every counted record.
    pub latitude: f64,
    /// Longitude shared by every counted record.
    pub longitude: f64,
    /// Number of records at this location.
    pub count: u64,
}

impl Located for LocationAggregate {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Grouped counts for one record set, ready for a map layer.
///
/// `count_field` names the count column the rendering layer expects
/// (`user_count`, `shift_count`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationTable {
    /// Name of the count column.
    pub count_field: String,
    /// Rows ordered by count, largest first.
    pub rows: Vec<LocationAggregate>,
}

impl LocationTable {
    /// Sum of all row counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// The busiest location, if any.
    #[must_use]
    pub fn max(&self) -> Option<&LocationAggregate> {
        self.rows.first()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
