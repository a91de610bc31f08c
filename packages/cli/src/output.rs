//! Plain-text rendering of pipeline results for `--format text`.

use std::fmt::Write as _;

use locum_map_analytics_models::{
    ApplicationSummary, HistogramBin, LocationSummary, RadiusCharts, Report,
};
use locum_map_geography_models::LocationTable;

/// Number of busiest locations listed per table.
const TOP_LOCATIONS: usize = 10;

fn write_table(out: &mut String, title: &str, table: &LocationTable, dropped: u64) {
    let _ = writeln!(
        out,
        "{title}: {} in box across {} locations ({dropped} outside box)",
        table.total(),
        table.rows.len()
    );
    for row in table.rows.iter().take(TOP_LOCATIONS) {
        let _ = writeln!(
            out,
            "  {:>10.5} {:>10.5}  {:>6} {}",
            row.latitude, row.longitude, row.count, table.count_field
        );
    }
}

fn write_histogram(out: &mut String, title: &str, bins: &[HistogramBin]) {
    let _ = writeln!(out, "{title}:");
    for bin in bins.iter().filter(|b| b.count > 0) {
        let _ = writeln!(out, "  {:>6} - {:<6} {:>6}", bin.start, bin.end, bin.count);
    }
}

/// Renders the user and shift map tables.
#[must_use]
pub fn locations_text(summary: &LocationSummary) -> String {
    let mut out = String::new();
    write_table(&mut out, "Users", &summary.users, summary.users_outside_box);
    write_table(
        &mut out,
        "Shifts",
        &summary.shifts,
        summary.shifts_outside_box,
    );
    out
}

/// Renders the radius summary, band counts and both histograms.
#[must_use]
pub fn radius_text(charts: &RadiusCharts) -> String {
    let summary = &charts.summary;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Users: {} total, {} excluded, {} included",
        summary.total_users, summary.excluded_users, summary.included_users
    );
    let _ = writeln!(
        out,
        "Few shifts in radius: {} ({:.1}%), of which very few: {} ({:.1}%)",
        summary.few_shifts.count,
        summary.few_shifts.percent,
        summary.very_few_shifts.count,
        summary.very_few_shifts.percent
    );

    let _ = writeln!(out, "Bands:");
    for band in &summary.bands {
        let _ = writeln!(out, "  {:<10} {:>6}", band.label, band.count);
    }

    write_histogram(&mut out, "Histogram", &charts.histogram);
    write_histogram(&mut out, "Zoomed histogram", &charts.zoomed_histogram);
    let _ = writeln!(out, "Scatter points: {}", charts.scatter.len());

    out
}

/// Renders the application counts.
#[must_use]
pub fn applications_text(summary: &ApplicationSummary) -> String {
    format!(
        "Applications: {} ({} shifts, {} users)\n",
        summary.total, summary.distinct_shifts, summary.distinct_users
    )
}

/// Renders every section of a report.
#[must_use]
pub fn report_text(report: &Report) -> String {
    let mut out = locations_text(&report.locations);
    out.push('\n');
    out.push_str(&radius_text(&report.radius));
    out.push('\n');
    out.push_str(&applications_text(&report.applications));
    out
}
