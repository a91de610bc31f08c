#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline configuration and chart-ready result types.
//!
//! Every result type serializes to `camelCase` JSON so the rendering layer
//! can bind chart encodings directly to the field names.

use chrono::{NaiveDate, NaiveDateTime};
use locum_map_geography_models::{BoundingBox, LocationTable};
use serde::{Deserialize, Serialize};

/// One labeled band with an inclusive upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Largest value that falls in this band.
    pub upper_bound: u64,
    /// Label shown for the band.
    pub label: String,
}

impl Band {
    /// Creates a band.
    #[must_use]
    pub fn new(upper_bound: u64, label: &str) -> Self {
        Self {
            upper_bound,
            label: label.to_owned(),
        }
    }
}

/// Ordered bands plus the label for values above every band.
///
/// The first band whose `upper_bound` is `>=` the value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    /// Label for values greater than the last band's bound.
    pub catch_all: String,
    /// Bands in ascending `upper_bound` order.
    pub bands: Vec<Band>,
}

impl BandThresholds {
    /// All labels in classification order, catch-all last.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bands
            .iter()
            .map(|b| b.label.as_str())
            .chain(std::iter::once(self.catch_all.as_str()))
    }
}

impl Default for BandThresholds {
    /// Travel radius bands: Zero / 1 - 20 / 21 - 50 / 50+.
    fn default() -> Self {
        Self {
            catch_all: "50+".to_string(),
            bands: vec![
                Band::new(0, "Zero"),
                Band::new(20, "1 - 20"),
                Band::new(50, "21 - 50"),
            ],
        }
    }
}

/// Tunable parameters of one pipeline run.
///
/// Missing keys in a config file fall back to [`PipelineConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Users created after this are left out of the radius analysis.
    pub created_cutoff: NaiveDateTime,
    /// Bin width of the all-users histogram.
    pub histogram_step: u64,
    /// Bin width of the zoomed histogram.
    pub zoomed_histogram_step: u64,
    /// Largest shifts-in-radius value kept in the zoomed histogram.
    pub zoomed_max_shifts: u64,
    /// Largest travel radius plotted in the scatter.
    pub scatter_max_travel_radius: f64,
    /// "Few shifts" threshold for the radius summary.
    pub few_shifts_threshold: u64,
    /// "Very few shifts" threshold, applied within the few-shifts group.
    pub very_few_shifts_threshold: u64,
    /// Area users and shifts must fall inside.
    pub bounding_box: BoundingBox,
    /// Bands for the shifts-in-radius count.
    pub bands: BandThresholds,
}

/// 2021-03-01 00:00:00, the start of the shift sample.
#[must_use]
pub fn default_created_cutoff() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            created_cutoff: default_created_cutoff(),
            histogram_step: 25,
            zoomed_histogram_step: 5,
            zoomed_max_shifts: 200,
            scatter_max_travel_radius: 300.0,
            few_shifts_threshold: 25,
            very_few_shifts_threshold: 5,
            bounding_box: BoundingBox::UK_AND_IRELAND,
            bands: BandThresholds::default(),
        }
    }
}

/// A fixed-width histogram bin covering `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub start: u64,
    /// Exclusive upper edge.
    pub end: u64,
    /// Values in the bin.
    pub count: u64,
}

/// One user in the travel radius scatterplot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    /// Shifts inside the user's radius (x axis).
    pub shifts_in_radius: u64,
    /// The user's travel radius (y axis).
    pub travel_radius: f64,
    /// Travel radius band label (colour).
    pub band: String,
}

/// Number of users in one band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandCount {
    /// Band label.
    pub label: String,
    /// Users in the band.
    pub count: u64,
}

/// A count and its percentage of some base population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    /// Matching items.
    pub count: u64,
    /// `count` as a percentage (0-100) of the base; `0.0` for an empty base.
    pub percent: f64,
}

/// Map tables for users and shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    /// User counts per location.
    pub users: LocationTable,
    /// Shift counts per location.
    pub shifts: LocationTable,
    /// Users dropped by the bounding box.
    pub users_outside_box: u64,
    /// Shifts dropped by the bounding box.
    pub shifts_outside_box: u64,
}

/// Headline numbers of the travel radius analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusSummary {
    /// Rows in the shifts-in-radius export.
    pub total_users: u64,
    /// Users created after the cut-off or with no creation date.
    pub excluded_users: u64,
    /// Users kept for analysis.
    pub included_users: u64,
    /// Included users with at most `few_shifts_threshold` shifts in radius.
    pub few_shifts: Share,
    /// Of those, users with at most `very_few_shifts_threshold`.
    pub very_few_shifts: Share,
    /// Included users per band, in band order.
    pub bands: Vec<BandCount>,
}

/// Histogram and scatter data for the travel radius section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusCharts {
    /// Headline numbers.
    pub summary: RadiusSummary,
    /// All included users, binned by shifts in radius.
    pub histogram: Vec<HistogramBin>,
    /// Included users up to `zoomed_max_shifts`, binned finer.
    pub zoomed_histogram: Vec<HistogramBin>,
    /// Included users up to `scatter_max_travel_radius`.
    pub scatter: Vec<ScatterPoint>,
}

/// Counts over the applications export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    /// Application rows.
    pub total: u64,
    /// Distinct shifts applied to.
    pub distinct_shifts: u64,
    /// Distinct applicants.
    pub distinct_users: u64,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Map tables.
    pub locations: LocationSummary,
    /// Travel radius charts.
    pub radius: RadiusCharts,
    /// Application counts.
    pub applications: ApplicationSummary,
}
