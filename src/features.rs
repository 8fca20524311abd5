//! Per-trip feature derivation.
//!
//! Pure record-to-record transformation: same length, same order, no rows
//! dropped however degenerate the derived values are. Filtering is the
//! aggregator's call.

use chrono::{Datelike, Timelike, Weekday};
use tracing::info;

use crate::trip::{EnrichedTripRecord, TimeOfDay, TripRecord};

/// Derives duration, speed, time-of-day bucket, and weekend flag for one trip.
///
/// A zero-minute duration makes the speed division non-finite (`inf` or NaN)
/// rather than panicking; null timestamps propagate as `None` through every
/// derived field that needs them.
pub fn enrich_trip(trip: TripRecord) -> EnrichedTripRecord {
    let trip_duration_min = match (trip.pickup_ts, trip.dropoff_ts) {
        (Some(pickup), Some(dropoff)) => {
            Some((dropoff - pickup).num_milliseconds() as f64 / 60_000.0)
        }
        _ => None,
    };

    let speed_mph = match (trip.trip_distance, trip_duration_min) {
        (Some(distance), Some(duration)) => Some(distance / (duration / 60.0)),
        _ => None,
    };

    let time_of_day = trip.pickup_ts.map(|ts| TimeOfDay::from_hour(ts.hour()));

    let is_weekend = trip.pickup_ts.map(|ts| {
        matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
    });

    EnrichedTripRecord {
        trip,
        trip_duration_min,
        speed_mph,
        time_of_day,
        is_weekend,
    }
}

/// Enriches a full batch, preserving input order.
pub fn enrich_trips(trips: Vec<TripRecord>) -> Vec<EnrichedTripRecord> {
    let count = trips.len();
    let enriched: Vec<EnrichedTripRecord> = trips.into_iter().map(enrich_trip).collect();

    let non_finite_speeds = enriched
        .iter()
        .filter(|e| e.speed_mph.is_some_and(|s| !s.is_finite()))
        .count();
    info!(count, non_finite_speeds, "Trips enriched");

    enriched
}
