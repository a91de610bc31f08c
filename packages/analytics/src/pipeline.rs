//! The full run: location tables, radius charts and application counts
//! from one loaded [`Dataset`].

use std::collections::BTreeSet;

use locum_map_analytics_models::{ApplicationSummary, PipelineConfig, Report};
use locum_map_records_models::{ApplicationRecord, Dataset};

use crate::AnalyticsError;
use crate::geo::location_summary;
use crate::radius::radius_charts;

/// Row, distinct shift and distinct user counts of the applications.
#[must_use]
pub fn application_summary(applications: &[ApplicationRecord]) -> ApplicationSummary {
    let shifts: BTreeSet<&str> = applications.iter().map(|a| a.shift_id.as_str()).collect();
    let users: BTreeSet<&str> = applications.iter().map(|a| a.user_id.as_str()).collect();

    ApplicationSummary {
        total: applications.len() as u64,
        distinct_shifts: shifts.len() as u64,
        distinct_users: users.len() as u64,
    }
}

/// Runs every transformation over `dataset`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if a histogram step in `config` is zero.
pub fn run_pipeline(dataset: &Dataset, config: &PipelineConfig) -> Result<Report, AnalyticsError> {
    log::info!(
        "Running pipeline over {} users, {} shifts, {} applications, {} radius rows",
        dataset.users.len(),
        dataset.shifts.len(),
        dataset.applications.len(),
        dataset.radius.len()
    );

    let locations = location_summary(&dataset.users, &dataset.shifts, &config.bounding_box);
    let radius = radius_charts(&dataset.radius, config)?;
    let applications = application_summary(&dataset.applications);

    if let Some(top) = locations.users.max() {
        log::info!(
            "Busiest user location ({}, {}) has {} users",
            top.latitude,
            top.longitude,
            top.count
        );
    }
    if let Some(top) = locations.shifts.max() {
        log::info!(
            "Busiest shift location ({}, {}) has {} shifts",
            top.latitude,
            top.longitude,
            top.count
        );
    }

    Ok(Report {
        locations,
        radius,
        applications,
    })
}
