#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geo-filtered aggregation over user, shift and travel radius records.
//!
//! Every function here is a pure transformation over slices of records:
//! filter to a bounding box, count per exact location, band and bin the
//! shifts-in-radius counts, and assemble the chart-ready [`Report`].
//!
//! [`Report`]: locum_map_analytics_models::Report

pub mod config;
pub mod geo;
pub mod pipeline;
pub mod radius;

use thiserror::Error;

pub use geo::{aggregate_by_location, filter_by_bbox, filter_to_box, location_summary};
pub use pipeline::run_pipeline;
pub use radius::bucket_by_threshold;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A histogram was asked for with a zero bin width.
    #[error("Histogram step must be positive, got {step}")]
    InvalidStep {
        /// The rejected step.
        step: u64,
    },
}
