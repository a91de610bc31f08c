#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loading for the user, shift, application and shifts-in-radius
//! exports.
//!
//! Each `read_*` function parses from any [`Read`] source; the matching
//! `load_*` function opens a file first. A missing or unreadable file is a
//! [`RecordsError::Io`], a malformed cell is a [`RecordsError::Parse`]
//! naming the file, row and column. Loading stops at the first error.

pub mod paths;
pub mod progress;
mod rows;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use locum_map_records_models::{
    ApplicationRecord, Dataset, ParseError, RadiusRecord, ShiftRecord, UserRecord,
};

use crate::paths::DataFiles;
use crate::progress::ProgressCallback;
use crate::rows::{ApplicationRow, RadiusRow, RawRow, ShiftRow, UserRow};

/// Errors that can occur while loading records.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    /// The input file could not be opened.
    #[error("Failed to open {}: {source}", .path.display())]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV structure was invalid (bad quoting, missing column, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cell could not be coerced to its column's type.
    #[error("{file}, row {row}: {source}")]
    Parse {
        /// Label of the file being read.
        file: String,
        /// 1-based data row number (the header row is not counted).
        row: u64,
        /// The field-level error.
        source: ParseError,
    },
}

fn read_rows<Raw: RawRow, R: Read>(
    reader: R,
    label: &str,
    progress: &dyn ProgressCallback,
) -> Result<Vec<Raw::Record>, RecordsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut row: u64 = 0;

    for result in reader.deserialize::<Raw>() {
        row += 1;
        let raw = result?;
        let record = raw.into_record().map_err(|source| RecordsError::Parse {
            file: label.to_owned(),
            row,
            source,
        })?;
        records.push(record);
        progress.inc(1);
    }

    log::info!("[{label}] Parsed {} records", records.len());
    progress.finish(format!("[{label}] {} records", records.len()));

    Ok(records)
}

fn open(path: &Path) -> Result<File, RecordsError> {
    log::debug!("Opening {}", path.display());
    File::open(path).map_err(|source| RecordsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn label_for(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Parses shift rows from `reader`.
///
/// # Errors
///
/// Returns [`RecordsError`] if the CSV is malformed or a cell fails to
/// parse.
pub fn read_shifts<R: Read>(
    reader: R,
    label: &str,
    progress: &dyn ProgressCallback,
) -> Result<Vec<ShiftRecord>, RecordsError> {
    read_rows::<ShiftRow, _>(reader, label, progress)
}

/// Parses user rows from `reader`.
///
/// # Errors
///
/// Returns [`RecordsError`] if the CSV is malformed or a cell fails to
/// parse.
pub fn read_users<R: Read>(
    reader: R,
    label: &str,
    progress: &dyn ProgressCallback,
) -> Result<Vec<UserRecord>, RecordsError> {
    read_rows::<UserRow, _>(reader, label, progress)
}

/// Parses shifts-in-radius rows from `reader`.
///
/// # Errors
///
/// Returns [`RecordsError`] if the CSV is malformed or a cell fails to
/// parse.
pub fn read_radius<R: Read>(
    reader: R,
    label: &str,
    progress: &dyn ProgressCallback,
) -> Result<Vec<RadiusRecord>, RecordsError> {
    read_rows::<RadiusRow, _>(reader, label, progress)
}

/// Parses application rows from `reader`.
///
/// # Errors
///
/// Returns [`RecordsError`] if the CSV is malformed or a cell fails to
/// parse.
pub fn read_applications<R: Read>(
    reader: R,
    label: &str,
    progress: &dyn ProgressCallback,
) -> Result<Vec<ApplicationRecord>, RecordsError> {
    read_rows::<ApplicationRow, _>(reader, label, progress)
}

/// Loads the shift export at `path`.
///
/// # Errors
///
/// Returns [`RecordsError::Io`] if the file cannot be opened, otherwise
/// see [`read_shifts`].
pub fn load_shifts(
    path: &Path,
    progress: &dyn ProgressCallback,
) -> Result<Vec<ShiftRecord>, RecordsError> {
    read_shifts(open(path)?, &label_for(path), progress)
}

/// Loads the user export at `path`.
///
/// # Errors
///
/// Returns [`RecordsError::Io`] if the file cannot be opened, otherwise
/// see [`read_users`].
pub fn load_users(
    path: &Path,
    progress: &dyn ProgressCallback,
) -> Result<Vec<UserRecord>, RecordsError> {
    read_users(open(path)?, &label_for(path), progress)
}

/// Loads the shifts-in-radius export at `path`.
///
/// # Errors
///
/// Returns [`RecordsError::Io`] if the file cannot be opened, otherwise
/// see [`read_radius`].
pub fn load_radius(
    path: &Path,
    progress: &dyn ProgressCallback,
) -> Result<Vec<RadiusRecord>, RecordsError> {
    read_radius(open(path)?, &label_for(path), progress)
}

/// Loads the application export at `path`.
///
/// # Errors
///
/// Returns [`RecordsError::Io`] if the file cannot be opened, otherwise
/// see [`read_applications`].
pub fn load_applications(
    path: &Path,
    progress: &dyn ProgressCallback,
) -> Result<Vec<ApplicationRecord>, RecordsError> {
    read_applications(open(path)?, &label_for(path), progress)
}

/// Loads all four exports.
///
/// `progress_for` is called once per file with its label and returns the
/// progress reporter for that file.
///
/// # Errors
///
/// Returns the first [`RecordsError`] encountered; nothing is returned
/// for the files that did load.
pub fn load_dataset<F>(files: &DataFiles, progress_for: F) -> Result<Dataset, RecordsError>
where
    F: Fn(&str) -> Arc<dyn ProgressCallback>,
{
    let shifts = load_shifts(&files.shifts, progress_for("shifts").as_ref())?;
    let users = load_users(&files.users, progress_for("users").as_ref())?;
    let applications =
        load_applications(&files.applications, progress_for("applications").as_ref())?;
    let radius = load_radius(&files.radius, progress_for("shifts in radius").as_ref())?;

    Ok(Dataset {
        shifts,
        users,
        applications,
        radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;

    const SHIFTS_CSV: &str = "\
Shift ID,Posted Date,Start Time,End Time,Latitude,Longitude
s1,2021-03-02 10:00:00,2021-03-05 09:00:00,2021-03-05 17:00:00,51.5,-0.1
s2,2021-03-02 11:00:00,,,53.4,-2.9
";

    const USERS_CSV: &str = "\
User ID,Created Date,Latitude,Longitude,Extra
u1,2020-11-01,51.5,-0.1,ignored
u2,2021-04-01 08:00:00, 40.7 , -74.0 ,ignored
";

    const RADIUS_CSV: &str = "\
User ID,Created Date,shifts_in_radius,Travel Radius
u1,2020-11-01,0,10
u2,2021-01-01,15.0,25.5
";

    const APPLICATIONS_CSV: &str = "\
Application ID,Shift ID,User ID,Status
a1,s1,u1,applied
,s2,u1,booked
";

    #[test]
    fn reads_shift_rows() {
        let shifts = read_shifts(SHIFTS_CSV.as_bytes(), "shifts", &NullProgress).unwrap();
        assert_eq!(shifts.len(), 2);
        assert_eq!(shifts[0].shift_id, "s1");
        assert!(shifts[0].end_time.is_some());
        assert!(shifts[1].start_time.is_none());
        assert!((shifts[1].latitude - 53.4).abs() < f64::EPSILON);
    }

    #[test]
    fn reads_user_rows_and_trims_cells() {
        let users = read_users(USERS_CSV.as_bytes(), "users", &NullProgress).unwrap();
        assert_eq!(users.len(), 2);
        assert!((users[1].latitude - 40.7).abs() < f64::EPSILON);
        assert!((users[1].longitude - -74.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reads_radius_rows() {
        let radius = read_radius(RADIUS_CSV.as_bytes(), "radius", &NullProgress).unwrap();
        assert_eq!(radius[0].shifts_in_radius, 0);
        assert_eq!(radius[1].shifts_in_radius, 15);
        assert!((radius[1].travel_radius - 25.5).abs() < f64::EPSILON);
    }

    #[test]
    fn reads_application_rows() {
        let apps =
            read_applications(APPLICATIONS_CSV.as_bytes(), "applications", &NullProgress).unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].application_id.as_deref(), Some("a1"));
        assert_eq!(apps[1].application_id, None);
        assert_eq!(apps[1].shift_id, "s2");
    }

    #[test]
    fn non_numeric_latitude_is_a_parse_error() {
        let csv = "User ID,Created Date,Latitude,Longitude\nu1,2020-11-01,51.5,-0.1\nu2,2020-11-01,abc,-0.1\n";
        let err = read_users(csv.as_bytes(), "users", &NullProgress).unwrap_err();
        match err {
            RecordsError::Parse { file, row, source } => {
                assert_eq!(file, "users");
                assert_eq!(row, 2);
                assert_eq!(source.field, "Latitude");
                assert_eq!(source.value, "abc");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn blank_longitude_is_a_parse_error() {
        let csv = "Shift ID,Posted Date,Start Time,End Time,Latitude,Longitude\ns1,,,,51.5,\n";
        let err = read_shifts(csv.as_bytes(), "shifts", &NullProgress).unwrap_err();
        match err {
            RecordsError::Parse { row, source, .. } => {
                assert_eq!(row, 1);
                assert_eq!(source.field, "Longitude");
                assert_eq!(source.reason, "value is empty");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_a_csv_error() {
        let csv = "User ID,Latitude\nu1,51.5\n";
        let err = read_users(csv.as_bytes(), "users", &NullProgress).unwrap_err();
        assert!(matches!(err, RecordsError::Csv(_)));
    }

    #[test]
    fn header_only_file_is_empty() {
        let csv = "User ID,Created Date,Latitude,Longitude\n";
        let users = read_users(csv.as_bytes(), "users", &NullProgress).unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = Path::new("definitely/not/here/sample-data-users.csv");
        let err = load_users(path, &NullProgress).unwrap_err();
        match err {
            RecordsError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn dataset_load_fails_fast_on_missing_directory() {
        let files = DataFiles::in_dir(Path::new("definitely/not/here"));
        let err = load_dataset(&files, |_| progress::null_progress()).unwrap_err();
        assert!(matches!(err, RecordsError::Io { .. }));
    }
}
