//! Travel radius analysis: bands, cut-off filtering, histograms and the
//! scatterplot.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use locum_map_analytics_models::{
    BandCount, BandThresholds, HistogramBin, PipelineConfig, RadiusCharts, RadiusSummary,
    ScatterPoint, Share,
};
use locum_map_records_models::RadiusRecord;

use crate::AnalyticsError;

/// Returns the label of the first band whose upper bound is `>= value`,
/// or the catch-all label when none is.
#[must_use]
pub fn bucket_by_threshold(value: u64, thresholds: &BandThresholds) -> &str {
    thresholds
        .bands
        .iter()
        .find(|band| value <= band.upper_bound)
        .map_or(thresholds.catch_all.as_str(), |band| band.label.as_str())
}

/// Keeps users created on or before `cutoff`.
///
/// Users with no creation date are dropped.
#[must_use]
pub fn created_on_or_before(records: &[RadiusRecord], cutoff: NaiveDateTime) -> Vec<RadiusRecord> {
    records
        .iter()
        .filter(|r| r.created_date.is_some_and(|d| d <= cutoff))
        .cloned()
        .collect()
}

/// Keeps users with at most `max_shifts` shifts in radius.
#[must_use]
pub fn at_most(records: &[RadiusRecord], max_shifts: u64) -> Vec<RadiusRecord> {
    records
        .iter()
        .filter(|r| r.shifts_in_radius <= max_shifts)
        .cloned()
        .collect()
}

/// Bins `values` into `[k * step, (k + 1) * step)` buckets.
///
/// Only bins holding at least one value are returned, in ascending order.
/// No values yields no bins.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidStep`] if `step` is zero.
pub fn histogram<I>(values: I, step: u64) -> Result<Vec<HistogramBin>, AnalyticsError>
where
    I: IntoIterator<Item = u64>,
{
    if step == 0 {
        return Err(AnalyticsError::InvalidStep { step });
    }

    let mut counts: BTreeMap<u64, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value / step).or_default() += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(k, count)| HistogramBin {
            start: k * step,
            end: k.saturating_add(1).saturating_mul(step),
            count,
        })
        .collect())
}

/// Scatter points for users with a travel radius of at most
/// `max_travel_radius`, coloured by band.
#[must_use]
pub fn scatter_points(
    records: &[RadiusRecord],
    max_travel_radius: f64,
    bands: &BandThresholds,
) -> Vec<ScatterPoint> {
    records
        .iter()
        .filter(|r| r.travel_radius <= max_travel_radius)
        .map(|r| ScatterPoint {
            shifts_in_radius: r.shifts_in_radius,
            travel_radius: r.travel_radius,
            band: bucket_by_threshold(r.shifts_in_radius, bands).to_owned(),
        })
        .collect()
}

/// Users per band, in band order with the catch-all last. Empty bands
/// are reported with a zero count.
#[must_use]
pub fn band_counts(records: &[RadiusRecord], bands: &BandThresholds) -> Vec<BandCount> {
    let mut counts: Vec<BandCount> = bands
        .labels()
        .map(|label| BandCount {
            label: label.to_owned(),
            count: 0,
        })
        .collect();

    for record in records {
        let label = bucket_by_threshold(record.shifts_in_radius, bands);
        if let Some(entry) = counts.iter_mut().find(|c| c.label == label) {
            entry.count += 1;
        }
    }

    counts
}

#[allow(clippy::cast_precision_loss)]
fn share(count: u64, base: u64) -> Share {
    let percent = if base == 0 {
        0.0
    } else {
        count as f64 / base as f64 * 100.0
    };
    Share { count, percent }
}

/// Headline numbers for the radius section.
///
/// Only users created on or before the configured cut-off are counted
/// beyond `total_users` and `excluded_users`.
#[must_use]
pub fn radius_summary(records: &[RadiusRecord], config: &PipelineConfig) -> RadiusSummary {
    let included = created_on_or_before(records, config.created_cutoff);
    summarize(records.len() as u64, &included, config)
}

fn summarize(total: u64, included: &[RadiusRecord], config: &PipelineConfig) -> RadiusSummary {
    let included_users = included.len() as u64;
    let few = at_most(included, config.few_shifts_threshold);
    let very_few = at_most(&few, config.very_few_shifts_threshold);

    RadiusSummary {
        total_users: total,
        excluded_users: total - included_users,
        included_users,
        few_shifts: share(few.len() as u64, included_users),
        very_few_shifts: share(very_few.len() as u64, few.len() as u64),
        bands: band_counts(included, &config.bands),
    }
}

/// Summary, both histograms and the scatterplot for the radius section.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidStep`] if either histogram step is
/// zero.
pub fn radius_charts(
    records: &[RadiusRecord],
    config: &PipelineConfig,
) -> Result<RadiusCharts, AnalyticsError> {
    let included = created_on_or_before(records, config.created_cutoff);
    log::debug!(
        "{} of {} users created on or before {}",
        included.len(),
        records.len(),
        config.created_cutoff
    );
    if included.is_empty() {
        log::warn!("No users created on or before {}", config.created_cutoff);
    }

    let histogram_all = histogram(
        included.iter().map(|r| r.shifts_in_radius),
        config.histogram_step,
    )?;
    let zoomed = at_most(&included, config.zoomed_max_shifts);
    let zoomed_histogram = histogram(
        zoomed.iter().map(|r| r.shifts_in_radius),
        config.zoomed_histogram_step,
    )?;

    Ok(RadiusCharts {
        summary: summarize(records.len() as u64, &included, config),
        histogram: histogram_all,
        zoomed_histogram,
        scatter: scatter_points(&included, config.scatter_max_travel_radius, &config.bands),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use locum_map_analytics_models::Band;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn radius(id: &str, created: Option<NaiveDateTime>, shifts: u64, travel: f64) -> RadiusRecord {
        RadiusRecord {
            user_id: id.to_string(),
            created_date: created,
            shifts_in_radius: shifts,
            travel_radius: travel,
        }
    }

    #[test]
    fn buckets_default_bands() {
        let bands = BandThresholds::default();
        assert_eq!(bucket_by_threshold(0, &bands), "Zero");
        assert_eq!(bucket_by_threshold(1, &bands), "1 - 20");
        assert_eq!(bucket_by_threshold(15, &bands), "1 - 20");
        assert_eq!(bucket_by_threshold(20, &bands), "1 - 20");
        assert_eq!(bucket_by_threshold(21, &bands), "21 - 50");
        assert_eq!(bucket_by_threshold(50, &bands), "21 - 50");
        assert_eq!(bucket_by_threshold(51, &bands), "50+");
        assert_eq!(bucket_by_threshold(999, &bands), "50+");
    }

    #[test]
    fn first_matching_band_wins() {
        let bands = BandThresholds {
            catch_all: "many".to_string(),
            bands: vec![Band::new(10, "first"), Band::new(10, "second")],
        };
        assert_eq!(bucket_by_threshold(10, &bands), "first");
        assert_eq!(bucket_by_threshold(11, &bands), "many");
    }

    #[test]
    fn no_bands_means_catch_all() {
        let bands = BandThresholds {
            catch_all: "all".to_string(),
            bands: Vec::new(),
        };
        assert_eq!(bucket_by_threshold(0, &bands), "all");
    }

    #[test]
    fn cutoff_is_inclusive_and_drops_undated() {
        let cutoff = date(2021, 3, 1).unwrap();
        let records = vec![
            radius("a", date(2021, 2, 28), 1, 10.0),
            radius("b", date(2021, 3, 1), 1, 10.0),
            radius("c", date(2021, 3, 2), 1, 10.0),
            radius("d", None, 1, 10.0),
        ];
        let kept: Vec<String> = created_on_or_before(&records, cutoff)
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(kept, vec!["a", "b"]);
    }

    #[test]
    fn histogram_bins_values() {
        let bins = histogram(vec![0, 4, 5, 24, 25, 60], 25).unwrap();
        assert_eq!(
            bins,
            vec![
                HistogramBin {
                    start: 0,
                    end: 25,
                    count: 4,
                },
                HistogramBin {
                    start: 25,
                    end: 50,
                    count: 1,
                },
                HistogramBin {
                    start: 50,
                    end: 75,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn histogram_skips_empty_bins_and_sums_to_input() {
        let values = vec![1, 2, 17, 17, 3];
        let bins = histogram(values.clone(), 5).unwrap();
        assert_eq!(
            bins,
            vec![
                HistogramBin {
                    start: 0,
                    end: 5,
                    count: 3,
                },
                HistogramBin {
                    start: 15,
                    end: 20,
                    count: 2,
                },
            ]
        );
        assert_eq!(bins.iter().map(|b| b.count).sum::<u64>(), values.len() as u64);
    }

    #[test]
    fn histogram_handles_huge_outlier() {
        let bins = histogram(vec![0, 10_000_000_000_000], 25).unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[1].start, 10_000_000_000_000);
        assert_eq!(bins[1].end, 10_000_000_000_025);
        assert_eq!(bins[1].count, 1);
    }

    #[test]
    fn histogram_top_bin_end_saturates() {
        let bins = histogram(vec![u64::MAX], 10).unwrap();
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].start, u64::MAX / 10 * 10);
        assert_eq!(bins[0].end, u64::MAX);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        assert!(histogram(Vec::<u64>::new(), 5).unwrap().is_empty());
    }

    #[test]
    fn histogram_rejects_zero_step() {
        let err = histogram(vec![1], 0).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidStep { step: 0 }));
    }

    #[test]
    fn scatter_limits_travel_radius_and_labels_bands() {
        let records = vec![
            radius("a", None, 0, 300.0),
            radius("b", None, 30, 50.0),
            radius("c", None, 5, 300.5),
        ];
        let points = scatter_points(&records, 300.0, &BandThresholds::default());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].band, "Zero");
        assert_eq!(points[1].band, "21 - 50");
    }

    #[test]
    fn band_counts_include_empty_bands() {
        let records = vec![
            radius("a", None, 0, 1.0),
            radius("b", None, 0, 1.0),
            radius("c", None, 100, 1.0),
        ];
        let counts = band_counts(&records, &BandThresholds::default());
        let pairs: Vec<(&str, u64)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(
            pairs,
            vec![("Zero", 2), ("1 - 20", 0), ("21 - 50", 0), ("50+", 1)]
        );
    }

    #[test]
    fn summary_reports_shares() {
        let config = PipelineConfig::default();
        let records = vec![
            radius("a", date(2021, 1, 1), 0, 10.0),
            radius("b", date(2021, 1, 1), 3, 10.0),
            radius("c", date(2021, 1, 1), 20, 10.0),
            radius("d", date(2021, 1, 1), 400, 10.0),
            radius("e", date(2021, 6, 1), 0, 10.0),
        ];

        let summary = radius_summary(&records, &config);

        assert_eq!(summary.total_users, 5);
        assert_eq!(summary.excluded_users, 1);
        assert_eq!(summary.included_users, 4);
        assert_eq!(summary.few_shifts.count, 3);
        assert!((summary.few_shifts.percent - 75.0).abs() < 1e-9);
        assert_eq!(summary.very_few_shifts.count, 2);
        assert!((summary.very_few_shifts.percent - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.bands.iter().map(|b| b.count).sum::<u64>(), 4);
    }

    #[test]
    fn summary_of_nothing_has_zero_shares() {
        let summary = radius_summary(&[], &PipelineConfig::default());
        assert_eq!(summary.included_users, 0);
        assert!(summary.few_shifts.percent.abs() < f64::EPSILON);
    }

    #[test]
    fn charts_use_only_included_users() {
        let config = PipelineConfig::default();
        let records = vec![
            radius("a", date(2021, 1, 1), 10, 10.0),
            radius("b", date(2021, 1, 1), 250, 350.0),
            radius("c", date(2021, 4, 1), 10, 10.0),
        ];

        let charts = radius_charts(&records, &config).unwrap();

        assert_eq!(charts.histogram.iter().map(|b| b.count).sum::<u64>(), 2);
        assert_eq!(charts.zoomed_histogram.iter().map(|b| b.count).sum::<u64>(), 1);
        assert_eq!(charts.scatter.len(), 1);
        assert_eq!(charts.summary.excluded_users, 1);
    }
}
