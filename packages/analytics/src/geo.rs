//! Bounding-box filtering and per-location counting.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use locum_map_analytics_models::LocationSummary;
use locum_map_geography_models::{
    BoundingBox, CoordinateRange, Located, LocationAggregate, LocationTable,
};
use locum_map_records_models::{ShiftRecord, UserRecord};

/// Count column name for the user map layer.
pub const USER_COUNT_FIELD: &str = "user_count";
/// Count column name for the shift map layer.
pub const SHIFT_COUNT_FIELD: &str = "shift_count";

/// Keeps the records whose coordinates fall inside both ranges, bounds
/// included, in input order.
///
/// Empty input, or input with no matches, yields an empty vector.
#[must_use]
pub fn filter_by_bbox<T: Located + Clone>(
    records: &[T],
    lat_range: CoordinateRange,
    lon_range: CoordinateRange,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| lat_range.contains(r.latitude()) && lon_range.contains(r.longitude()))
        .cloned()
        .collect()
}

/// [`filter_by_bbox`] with both ranges taken from `bbox`.
#[must_use]
pub fn filter_to_box<T: Located + Clone>(records: &[T], bbox: &BoundingBox) -> Vec<T> {
    filter_by_bbox(records, bbox.latitude, bbox.longitude)
}

/// Maps `-0.0` onto `0.0` so both group together.
fn coordinate_key(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

/// Groups records by exact coordinate pair and counts each group.
///
/// Rows are sorted by count, largest first; equal counts keep the order in
/// which their location first appeared. The counts sum to `records.len()`.
#[must_use]
pub fn aggregate_by_location<R: Located>(records: &[R], count_field: &str) -> LocationTable {
    let mut index: BTreeMap<(u64, u64), usize> = BTreeMap::new();
    let mut rows: Vec<LocationAggregate> = Vec::new();

    for record in records {
        let latitude = record.latitude();
        let longitude = record.longitude();

        match index.entry((coordinate_key(latitude), coordinate_key(longitude))) {
            Entry::Occupied(entry) => rows[*entry.get()].count += 1,
            Entry::Vacant(entry) => {
                entry.insert(rows.len());
                rows.push(LocationAggregate {
                    latitude,
                    longitude,
                    count: 1,
                });
            }
        }
    }

    rows.sort_by(|a, b| b.count.cmp(&a.count));

    log::debug!(
        "Aggregated {} records into {} {count_field} locations",
        records.len(),
        rows.len()
    );

    LocationTable {
        count_field: count_field.to_owned(),
        rows,
    }
}

/// Filters users and shifts to `bbox` and builds both map tables.
#[must_use]
pub fn location_summary(
    users: &[UserRecord],
    shifts: &[ShiftRecord],
    bbox: &BoundingBox,
) -> LocationSummary {
    let users_in_box = filter_to_box(users, bbox);
    let shifts_in_box = filter_to_box(shifts, bbox);

    let users_outside_box = (users.len() - users_in_box.len()) as u64;
    let shifts_outside_box = (shifts.len() - shifts_in_box.len()) as u64;

    log::debug!("Bounding box dropped {users_outside_box} users and {shifts_outside_box} shifts");
    if users_in_box.is_empty() {
        log::warn!("No users fall inside the bounding box");
    }
    if shifts_in_box.is_empty() {
        log::warn!("No shifts fall inside the bounding box");
    }

    LocationSummary {
        users: aggregate_by_location(&users_in_box, USER_COUNT_FIELD),
        shifts: aggregate_by_location(&shifts_in_box, SHIFT_COUNT_FIELD),
        users_outside_box,
        shifts_outside_box,
    }
}
