//! Default file names of the four CSV exports.

use std::path::{Path, PathBuf};

/// Shift export file name.
pub const SHIFTS_FILE: &str = "sample-data-shifts.csv";
/// User export file name.
pub const USERS_FILE: &str = "sample-data-users.csv";
/// Application export file name.
pub const APPLICATIONS_FILE: &str = "sample-data-applications.csv";
/// Shifts-in-radius export file name.
pub const RADIUS_FILE: &str = "shifts_in_radius.csv";

/// Locations of the input files for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    /// Shift export.
    pub shifts: PathBuf,
    /// User export.
    pub users: PathBuf,
    /// Application export.
    pub applications: PathBuf,
    /// Shifts-in-radius export.
    pub radius: PathBuf,
}

impl DataFiles {
    /// Resolves the default file names against `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            shifts: dir.join(SHIFTS_FILE),
            users: dir.join(USERS_FILE),
            applications: dir.join(APPLICATIONS_FILE),
            radius: dir.join(RADIUS_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_default_names() {
        let files = DataFiles::in_dir(Path::new("data"));
        assert_eq!(files.shifts, Path::new("data/sample-data-shifts.csv"));
        assert_eq!(files.users, Path::new("data/sample-data-users.csv"));
        assert_eq!(
            files.applications,
            Path::new("data/sample-data-applications.csv")
        );
        assert_eq!(files.radius, Path::new("data/shifts_in_radius.csv"));
    }
}
