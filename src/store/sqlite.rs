//! SQLite-backed trip store.
//!
//! The table replace is implemented as stage-then-swap inside a single
//! transaction: the enriched rows land in a staging table, and only once they
//! are all written does the old table get dropped and the staging table
//! renamed over it. A failure at any point rolls the whole transaction back,
//! so readers only ever see the old complete content or the new one.

use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::store::TripStore;
use crate::trip::{EnrichedTripRecord, TimeOfDay, TripRecord};

/// Destination table name, kept from the upstream dataset convention.
const TABLE: &str = "yellow_taxi_trips";
const STAGING_TABLE: &str = "yellow_taxi_trips_staging";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, PipelineError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Number of rows currently in the destination table.
    pub fn trip_count(&self) -> Result<usize, PipelineError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {TABLE}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Reads the enriched rows back out, in surrogate-key order.
    ///
    /// Only meaningful after [`TripStore::replace_table`] has run; before
    /// that the table lacks the derived columns.
    pub fn fetch_enriched(&self) -> Result<Vec<EnrichedTripRecord>, PipelineError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT pickup_datetime, dropoff_datetime, passenger_count, trip_distance, \
             fare_amount, tip_amount, trip_duration_min, speed_mph, time_of_day, is_weekend \
             FROM {TABLE} ORDER BY trip_id"
        ))?;

        let rows = stmt.query_map([], |row| {
            let time_of_day: Option<String> = row.get(8)?;
            Ok(EnrichedTripRecord {
                trip: TripRecord {
                    pickup_ts: row.get(0)?,
                    dropoff_ts: row.get(1)?,
                    passenger_count: row.get(2)?,
                    trip_distance: row.get(3)?,
                    fare_amount: row.get(4)?,
                    tip_amount: row.get(5)?,
                },
                trip_duration_min: row.get(6)?,
                speed_mph: row.get(7)?,
                time_of_day: time_of_day.as_deref().and_then(TimeOfDay::from_label),
                is_weekend: row.get(9)?,
            })
        })?;

        let mut trips = Vec::new();
        for row in rows {
            trips.push(row?);
        }
        Ok(trips)
    }
}

impl TripStore for SqliteStore {
    fn create_schema(&mut self) -> Result<(), PipelineError> {
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {TABLE} (
                    trip_id INTEGER PRIMARY KEY,
                    pickup_datetime TEXT,
                    dropoff_datetime TEXT,
                    passenger_count INTEGER,
                    trip_distance REAL,
                    fare_amount REAL,
                    tip_amount REAL
                );"
            ))
            .map_err(|e| PipelineError::Schema(format!("failed to create {TABLE}: {e}")))?;
        debug!(table = TABLE, "Schema ensured");
        Ok(())
    }

    fn bulk_insert(&mut self, trips: &[TripRecord]) -> Result<(), PipelineError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {TABLE} (pickup_datetime, dropoff_datetime, passenger_count, \
                 trip_distance, fare_amount, tip_amount) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ))?;
            for trip in trips {
                stmt.execute(params![
                    trip.pickup_ts,
                    trip.dropoff_ts,
                    trip.passenger_count,
                    trip.trip_distance,
                    trip.fare_amount,
                    trip.tip_amount,
                ])?;
            }
        }
        tx.commit()?;
        info!(rows = trips.len(), table = TABLE, "Raw trips inserted");
        Ok(())
    }

    fn replace_table(&mut self, trips: &[EnrichedTripRecord]) -> Result<(), PipelineError> {
        let tx = self.conn.transaction()?;
        {
            tx.execute_batch(&format!(
                "DROP TABLE IF EXISTS {STAGING_TABLE};
                 CREATE TABLE {STAGING_TABLE} (
                    trip_id INTEGER PRIMARY KEY,
                    pickup_datetime TEXT,
                    dropoff_datetime TEXT,
                    passenger_count INTEGER,
                    trip_distance REAL,
                    fare_amount REAL,
                    tip_amount REAL,
                    trip_duration_min REAL,
                    speed_mph REAL,
                    time_of_day TEXT,
                    is_weekend INTEGER
                 );"
            ))?;

            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {STAGING_TABLE} (pickup_datetime, dropoff_datetime, \
                 passenger_count, trip_distance, fare_amount, tip_amount, \
                 trip_duration_min, speed_mph, time_of_day, is_weekend) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ))?;
            for trip in trips {
                stmt.execute(params![
                    trip.trip.pickup_ts,
                    trip.trip.dropoff_ts,
                    trip.trip.passenger_count,
                    trip.trip.trip_distance,
                    trip.trip.fare_amount,
                    trip.trip.tip_amount,
                    trip.trip_duration_min,
                    // SQLite stores NaN as NULL; acceptable, both read back
                    // as non-aggregatable.
                    trip.speed_mph,
                    trip.time_of_day.map(TimeOfDay::as_str),
                    trip.is_weekend,
                ])?;
            }

            tx.execute_batch(&format!(
                "DROP TABLE IF EXISTS {TABLE};
                 ALTER TABLE {STAGING_TABLE} RENAME TO {TABLE};"
            ))?;
        }
        tx.commit()?;
        info!(rows = trips.len(), table = TABLE, "Table replaced with enriched trips");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::enrich_trip;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn raw_trip(pickup: &str) -> TripRecord {
        TripRecord {
            pickup_ts: Some(ts(pickup)),
            dropoff_ts: Some(ts(pickup) + chrono::Duration::minutes(15)),
            passenger_count: Some(2),
            trip_distance: Some(3.0),
            fare_amount: Some(12.5),
            tip_amount: Some(2.0),
        }
    }

    #[test]
    fn test_create_schema_is_idempotent() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_schema().unwrap();
        store.create_schema().unwrap();
        assert_eq!(store.trip_count().unwrap(), 0);
    }

    #[test]
    fn test_bulk_insert_appends() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_schema().unwrap();

        store
            .bulk_insert(&[raw_trip("2023-01-01 08:00:00"), raw_trip("2023-01-01 09:00:00")])
            .unwrap();
        store.bulk_insert(&[raw_trip("2023-01-02 08:00:00")]).unwrap();

        assert_eq!(store.trip_count().unwrap(), 3);
    }

    #[test]
    fn test_replace_table_substitutes_content() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_schema().unwrap();
        store
            .bulk_insert(&[raw_trip("2023-01-01 08:00:00"), raw_trip("2023-01-01 09:00:00")])
            .unwrap();

        let enriched = vec![enrich_trip(raw_trip("2023-01-03 10:00:00"))];
        store.replace_table(&enriched).unwrap();

        assert_eq!(store.trip_count().unwrap(), 1);
        let rows = store.fetch_enriched().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trip_duration_min, Some(15.0));
        assert_eq!(rows[0].speed_mph, Some(12.0));
        assert_eq!(rows[0].time_of_day, enriched[0].time_of_day);
        assert_eq!(rows[0].is_weekend, Some(false));
    }

    #[test]
    fn test_replace_table_twice_keeps_latest() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_schema().unwrap();
        store.bulk_insert(&[raw_trip("2023-01-01 08:00:00")]).unwrap();

        store
            .replace_table(&[
                enrich_trip(raw_trip("2023-01-02 08:00:00")),
                enrich_trip(raw_trip("2023-01-02 09:00:00")),
            ])
            .unwrap();
        store
            .replace_table(&[enrich_trip(raw_trip("2023-01-05 08:00:00"))])
            .unwrap();

        let rows = store.fetch_enriched().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trip.pickup_ts, Some(ts("2023-01-05 08:00:00")));
    }

    #[test]
    fn test_null_fields_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_schema().unwrap();

        let mut trip = raw_trip("2023-01-01 08:00:00");
        trip.dropoff_ts = None;
        trip.fare_amount = None;
        let enriched = enrich_trip(trip);
        store.replace_table(&[enriched.clone()]).unwrap();

        let rows = store.fetch_enriched().unwrap();
        assert!(rows[0].trip.dropoff_ts.is_none());
        assert!(rows[0].trip.fare_amount.is_none());
        assert!(rows[0].trip_duration_min.is_none());
        assert!(rows[0].speed_mph.is_none());
        assert_eq!(rows[0].time_of_day, enriched.time_of_day);
    }
}
