//! Trip record types shared across the pipeline.
//!
//! Every per-field parse failure upstream becomes a `None` here rather than a
//! dropped row, so downstream stages decide their own null policy per
//! computation.

use chrono::NaiveDateTime;

/// One raw taxi trip as loaded from the source file.
///
/// All fields are optional at the value level: the loader guarantees the
/// *columns* exist, but any individual cell may have failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub pickup_ts: Option<NaiveDateTime>,
    pub dropoff_ts: Option<NaiveDateTime>,
    pub passenger_count: Option<i64>,
    pub trip_distance: Option<f64>,
    pub fare_amount: Option<f64>,
    pub tip_amount: Option<f64>,
}

/// Coarse time-of-day bucket derived from the pickup hour.
///
/// Buckets are half-open: `[0,6)` Night, `[6,12)` Morning, `[12,18)`
/// Afternoon, `[18,24)` Evening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Maps an hour in `[0,24)` to its bucket.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeOfDay::Night,
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    /// Label used in the store's `time_of_day` text column.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Night => "Night",
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
        }
    }

    /// Inverse of [`TimeOfDay::as_str`] for reading rows back out of the
    /// store.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Night" => Some(TimeOfDay::Night),
            "Morning" => Some(TimeOfDay::Morning),
            "Afternoon" => Some(TimeOfDay::Afternoon),
            "Evening" => Some(TimeOfDay::Evening),
            _ => None,
        }
    }
}

/// A trip plus its derived features.
///
/// Created once by the feature engine and immutable afterwards. `speed_mph`
/// keeps whatever the division produced, including `inf`/NaN for zero
/// durations; it is `None` only when a source timestamp was null.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTripRecord {
    pub trip: TripRecord,
    pub trip_duration_min: Option<f64>,
    pub speed_mph: Option<f64>,
    pub time_of_day: Option<TimeOfDay>,
    pub is_weekend: Option<bool>,
}
