//! Raw CSV row shapes and their conversion into typed records.
//!
//! Rows are deserialized with every value as text so that a bad cell
//! surfaces as a [`ParseError`] naming the column, rather than an opaque
//! deserializer error.

use locum_map_records_models::{
    ApplicationRecord, ParseError, RadiusRecord, ShiftRecord, UserRecord, parse_coordinate,
    parse_count, parse_datetime, parse_distance,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// A CSV row shape that converts into a typed record.
pub trait RawRow: DeserializeOwned {
    /// The typed record this row produces.
    type Record;

    /// Coerces the raw text fields.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for the first field that fails to parse.
    fn into_record(self) -> Result<Self::Record, ParseError>;
}

fn optional_datetime(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<chrono::NaiveDateTime>, ParseError> {
    raw.map_or(Ok(None), |s| parse_datetime(field, s))
}

#[derive(Debug, Deserialize)]
pub struct ShiftRow {
    #[serde(rename = "Shift ID")]
    shift_id: String,
    #[serde(rename = "Posted Date", default)]
    posted_date: Option<String>,
    #[serde(rename = "Start Time", default)]
    start_time: Option<String>,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Latitude")]
    latitude: String,
    #[serde(rename = "Longitude")]
    longitude: String,
}

impl RawRow for ShiftRow {
    type Record = ShiftRecord;

    fn into_record(self) -> Result<ShiftRecord, ParseError> {
        Ok(ShiftRecord {
            posted_date: optional_datetime("Posted Date", self.posted_date.as_deref())?,
            start_time: optional_datetime("Start Time", self.start_time.as_deref())?,
            end_time: optional_datetime("End Time", self.end_time.as_deref())?,
            latitude: parse_coordinate("Latitude", &self.latitude)?,
            longitude: parse_coordinate("Longitude", &self.longitude)?,
            shift_id: self.shift_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UserRow {
    #[serde(rename = "User ID")]
    user_id: String,
    #[serde(rename = "Created Date", default)]
    created_date: Option<String>,
    #[serde(rename = "Latitude")]
    latitude: String,
    #[serde(rename = "Longitude")]
    longitude: String,
}

impl RawRow for UserRow {
    type Record = UserRecord;

    fn into_record(self) -> Result<UserRecord, ParseError> {
        Ok(UserRecord {
            created_date: optional_datetime("Created Date", self.created_date.as_deref())?,
            latitude: parse_coordinate("Latitude", &self.latitude)?,
            longitude: parse_coordinate("Longitude", &self.longitude)?,
            user_id: self.user_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RadiusRow {
    #[serde(rename = "User ID")]
    user_id: String,
    #[serde(rename = "Created Date", default)]
    created_date: Option<String>,
    shifts_in_radius: String,
    #[serde(rename = "Travel Radius")]
    travel_radius: String,
}

impl RawRow for RadiusRow {
    type Record = RadiusRecord;

    fn into_record(self) -> Result<RadiusRecord, ParseError> {
        Ok(RadiusRecord {
            created_date: optional_datetime("Created Date", self.created_date.as_deref())?,
            shifts_in_radius: parse_count("shifts_in_radius", &self.shifts_in_radius)?,
            travel_radius: parse_distance("Travel Radius", &self.travel_radius)?,
            user_id: self.user_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplicationRow {
    #[serde(rename = "Application ID", default)]
    application_id: Option<String>,
    #[serde(rename = "Shift ID")]
    shift_id: String,
    #[serde(rename = "User ID")]
    user_id: String,
}

impl RawRow for ApplicationRow {
    type Record = ApplicationRecord;

    fn into_record(self) -> Result<ApplicationRecord, ParseError> {
        if self.shift_id.trim().is_empty() {
            return Err(ParseError::new("Shift ID", &self.shift_id, "value is empty"));
        }
        if self.user_id.trim().is_empty() {
            return Err(ParseError::new("User ID", &self.user_id, "value is empty"));
        }

        Ok(ApplicationRecord {
            application_id: self.application_id.filter(|id| !id.is_empty()),
            shift_id: self.shift_id,
            user_id: self.user_id,
        })
    }
}
