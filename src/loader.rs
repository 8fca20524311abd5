//! CSV ingestion for raw trip records.
//!
//! The loader validates the *schema* (all required columns present in the
//! header) up front and fails the whole load if any is missing. Individual
//! cell values that fail to parse are coerced to null and counted, never
//! dropped or escalated, so a partially dirty file still yields usable data.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::trip::TripRecord;

/// Default timestamp layout of the NYC TLC yellow-cab exports.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logical-to-physical column name mapping for the source file.
///
/// The header text is configuration, not a constant: other exports of the
/// same data use different prefixes.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub pickup: String,
    pub dropoff: String,
    pub passenger_count: String,
    pub trip_distance: String,
    pub fare_amount: String,
    pub tip_amount: String,
    pub timestamp_format: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            pickup: "tpep_pickup_datetime".to_string(),
            dropoff: "tpep_dropoff_datetime".to_string(),
            passenger_count: "passenger_count".to_string(),
            trip_distance: "trip_distance".to_string(),
            fare_amount: "fare_amount".to_string(),
            tip_amount: "tip_amount".to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Result of a load: the records plus counters for the null coercions that
/// happened along the way.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub trips: Vec<TripRecord>,
    pub rows_read: usize,
    pub bad_timestamps: usize,
    pub bad_numerics: usize,
}

/// Resolved indices of the required columns within the header row.
struct ColumnIndices {
    pickup: usize,
    dropoff: usize,
    passenger_count: usize,
    trip_distance: usize,
    fare_amount: usize,
    tip_amount: usize,
}

impl ColumnIndices {
    /// Locates every required column, collecting all misses into a single
    /// schema error so the operator sees the full list at once.
    fn resolve(headers: &csv::StringRecord, columns: &ColumnMap) -> Result<Self, PipelineError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let wanted: [&str; 6] = [
            &columns.pickup,
            &columns.dropoff,
            &columns.passenger_count,
            &columns.trip_distance,
            &columns.fare_amount,
            &columns.tip_amount,
        ];
        let missing: Vec<&str> = wanted
            .into_iter()
            .filter(|name| find(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Schema(format!(
                "required columns missing from input header: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            pickup: find(&columns.pickup).unwrap(),
            dropoff: find(&columns.dropoff).unwrap(),
            passenger_count: find(&columns.passenger_count).unwrap(),
            trip_distance: find(&columns.trip_distance).unwrap(),
            fare_amount: find(&columns.fare_amount).unwrap(),
            tip_amount: find(&columns.tip_amount).unwrap(),
        })
    }
}

/// Loads trip records from a delimited file, ignoring any columns beyond the
/// six the pipeline uses.
///
/// # Errors
///
/// Returns [`PipelineError::Schema`] if a required column is absent from the
/// header, or a CSV/I/O error if the file itself cannot be read. Malformed
/// cell values never fail the load.
pub fn load_trips(path: &Path, columns: &ColumnMap) -> Result<LoadOutcome, PipelineError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let idx = ColumnIndices::resolve(&headers, columns)?;

    let mut outcome = LoadOutcome::default();

    for result in reader.records() {
        let record = result?;
        outcome.rows_read += 1;

        let pickup_ts = parse_timestamp(&record, idx.pickup, columns, &mut outcome);
        let dropoff_ts = parse_timestamp(&record, idx.dropoff, columns, &mut outcome);

        let passenger_count = parse_int(&record, idx.passenger_count, &mut outcome);
        let trip_distance = parse_float(&record, idx.trip_distance, &mut outcome);
        let fare_amount = parse_float(&record, idx.fare_amount, &mut outcome);
        let tip_amount = parse_float(&record, idx.tip_amount, &mut outcome);

        outcome.trips.push(TripRecord {
            pickup_ts,
            dropoff_ts,
            passenger_count,
            trip_distance,
            fare_amount,
            tip_amount,
        });
    }

    info!(
        rows = outcome.rows_read,
        bad_timestamps = outcome.bad_timestamps,
        bad_numerics = outcome.bad_numerics,
        "Input file loaded"
    );
    if outcome.trips.is_empty() {
        warn!(path = %path.display(), "Input file contained no data rows");
    }

    Ok(outcome)
}

fn parse_timestamp(
    record: &csv::StringRecord,
    idx: usize,
    columns: &ColumnMap,
    outcome: &mut LoadOutcome,
) -> Option<NaiveDateTime> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return None;
    }
    match NaiveDateTime::parse_from_str(raw, &columns.timestamp_format) {
        Ok(ts) => Some(ts),
        Err(_) => {
            debug!(value = raw, "Unparseable timestamp, coercing to null");
            outcome.bad_timestamps += 1;
            None
        }
    }
}

fn parse_int(record: &csv::StringRecord, idx: usize, outcome: &mut LoadOutcome) -> Option<i64> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return None;
    }
    // TLC exports sometimes carry integer counts as "1.0".
    match raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64)
    }) {
        Some(v) => Some(v),
        None => {
            outcome.bad_numerics += 1;
            None
        }
    }
}

fn parse_float(record: &csv::StringRecord, idx: usize, outcome: &mut LoadOutcome) -> Option<f64> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            outcome.bad_numerics += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let path = PathBuf::from(format!("{}/{}", env::temp_dir().display(), name));
        fs::write(&path, content).unwrap();
        path
    }

    const HEADER: &str = "tpep_pickup_datetime,tpep_dropoff_datetime,passenger_count,trip_distance,fare_amount,tip_amount";

    #[test]
    fn test_load_valid_rows() {
        let path = temp_csv(
            "trip_trends_load_valid.csv",
            &format!(
                "{HEADER}\n\
                 2023-01-02 08:00:00,2023-01-02 08:15:00,1,5.0,20.0,3.5\n\
                 2023-01-02 09:00:00,2023-01-02 09:30:00,2,3.2,14.0,0.0\n"
            ),
        );

        let outcome = load_trips(&path, &ColumnMap::default()).unwrap();
        assert_eq!(outcome.rows_read, 2);
        assert_eq!(outcome.trips.len(), 2);
        assert_eq!(outcome.bad_timestamps, 0);

        let first = &outcome.trips[0];
        assert_eq!(first.passenger_count, Some(1));
        assert_eq!(first.trip_distance, Some(5.0));
        assert_eq!(first.fare_amount, Some(20.0));
        assert_eq!(first.tip_amount, Some(3.5));
        assert!(first.pickup_ts.is_some());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let path = temp_csv(
            "trip_trends_load_missing_col.csv",
            "tpep_pickup_datetime,passenger_count,trip_distance,fare_amount,tip_amount\n\
             2023-01-02 08:00:00,1,5.0,20.0,3.5\n",
        );

        let err = load_trips(&path, &ColumnMap::default()).unwrap_err();
        match err {
            PipelineError::Schema(msg) => assert!(msg.contains("tpep_dropoff_datetime")),
            other => panic!("expected schema error, got {other:?}"),
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_values_coerce_to_null() {
        let path = temp_csv(
            "trip_trends_load_malformed.csv",
            &format!(
                "{HEADER}\n\
                 not-a-date,2023-01-02 08:15:00,x,abc,20.0,3.5\n"
            ),
        );

        let outcome = load_trips(&path, &ColumnMap::default()).unwrap();
        assert_eq!(outcome.trips.len(), 1, "bad values must not drop the row");
        assert_eq!(outcome.bad_timestamps, 1);
        assert_eq!(outcome.bad_numerics, 2);

        let row = &outcome.trips[0];
        assert!(row.pickup_ts.is_none());
        assert!(row.dropoff_ts.is_some());
        assert!(row.passenger_count.is_none());
        assert!(row.trip_distance.is_none());
        assert_eq!(row.fare_amount, Some(20.0));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_cells_are_null_without_counting() {
        let path = temp_csv(
            "trip_trends_load_empty_cells.csv",
            &format!("{HEADER}\n2023-01-02 08:00:00,2023-01-02 08:15:00,,5.0,,1.0\n"),
        );

        let outcome = load_trips(&path, &ColumnMap::default()).unwrap();
        assert_eq!(outcome.bad_numerics, 0);
        assert!(outcome.trips[0].passenger_count.is_none());
        assert!(outcome.trips[0].fare_amount.is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let path = temp_csv(
            "trip_trends_load_extra_cols.csv",
            &format!(
                "vendor_id,{HEADER},total_amount\n\
                 2,2023-01-02 08:00:00,2023-01-02 08:15:00,1,5.0,20.0,3.5,25.0\n"
            ),
        );

        let outcome = load_trips(&path, &ColumnMap::default()).unwrap();
        assert_eq!(outcome.trips.len(), 1);
        assert_eq!(outcome.trips[0].fare_amount, Some(20.0));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_custom_column_names() {
        let path = temp_csv(
            "trip_trends_load_custom_cols.csv",
            "pickup,dropoff,pax,miles,fare,tip\n\
             2023-01-02 08:00:00,2023-01-02 08:15:00,1,5.0,20.0,3.5\n",
        );

        let columns = ColumnMap {
            pickup: "pickup".into(),
            dropoff: "dropoff".into(),
            passenger_count: "pax".into(),
            trip_distance: "miles".into(),
            fare_amount: "fare".into(),
            tip_amount: "tip".into(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.into(),
        };
        let outcome = load_trips(&path, &columns).unwrap();
        assert_eq!(outcome.trips.len(), 1);

        fs::remove_file(&path).unwrap();
    }
}
