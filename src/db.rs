//! SQLite access to the Flighty database.
//!
//! The database belongs to the Flighty app and lives in its macOS container;
//! this module never writes to it. Queries join `Flight`, `UserFlight`,
//! `Airline`, `Airport`, and `Ticket` into named-field row structs at the
//! query boundary so nothing downstream touches positional indexes. The store
//! keeps timestamps and distances with REAL affinity, hence `f64` throughout.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Error;
use crate::timefmt;

/// Import source marking rows mirrored from a friend's shared itinerary.
pub const CONNECTED_FRIEND: &str = "CONNECTED_FRIEND";

const DEFAULT_DB_PATH: &str =
    "Library/Containers/com.flightyapp.flighty/Data/Documents/MainFlightyDatabase.db";

/// Shared join skeleton for the detail queries. The arrival airport joins on
/// `actualArrivalAirportId` so diverted flights show where they really landed;
/// the ticket join is per-traveler (flight AND user) and LEFT so flights
/// without booking details still surface.
const FLIGHT_JOINS: &str = "FROM Flight f
     JOIN UserFlight uf ON f.id = uf.flightId
     JOIN Airline a ON f.airlineId = a.id
     JOIN Airport dep ON f.departureAirportId = dep.id
     JOIN Airport arr ON f.actualArrivalAirportId = arr.id
     LEFT JOIN Ticket t ON f.id = t.flightId AND uf.userId = t.userId";

/// A fully-joined row backing the detailed `list`/`next` records.
#[derive(Debug, Clone)]
pub struct UpcomingRow {
    pub airline_code: Option<String>,
    pub airline_name: Option<String>,
    pub flight_number: Option<String>,
    pub dep_code: Option<String>,
    pub dep_airport: Option<String>,
    pub dep_city: Option<String>,
    pub arr_code: Option<String>,
    pub arr_airport: Option<String>,
    pub arr_city: Option<String>,
    pub departure: Option<f64>,
    pub arrival: Option<f64>,
    pub confirmation: Option<String>,
    pub seat: Option<String>,
    pub cabin_class: Option<String>,
    pub aircraft: Option<String>,
    pub dep_terminal: Option<String>,
    pub dep_gate: Option<String>,
    pub arr_terminal: Option<String>,
    pub arr_gate: Option<String>,
    pub distance_km: Option<f64>,
    pub import_source: Option<String>,
}

/// A reduced-detail row backing the `date` and `pnr` views.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub airline_code: Option<String>,
    pub flight_number: Option<String>,
    pub dep_code: Option<String>,
    pub arr_code: Option<String>,
    pub departure: Option<f64>,
    pub arrival: Option<f64>,
    pub confirmation: Option<String>,
    pub seat: Option<String>,
    pub cabin_class: Option<String>,
    pub aircraft: Option<String>,
}

/// A row backing the `recent` view.
#[derive(Debug, Clone)]
pub struct RecentRow {
    pub airline_code: Option<String>,
    pub flight_number: Option<String>,
    pub dep_code: Option<String>,
    pub arr_code: Option<String>,
    pub departure: Option<f64>,
    pub aircraft: Option<String>,
    pub distance_km: Option<f64>,
}

/// Aggregate totals over the traveler's flights.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FlightStats {
    pub total_flights: i64,
    pub upcoming_flights: i64,
    pub total_distance_km: f64,
    pub total_distance_miles: i64,
    pub earth_circumferences: f64,
}

/// Read-only connection to the Flighty database.
#[derive(Debug)]
pub struct FlightDb {
    conn: Connection,
}

impl FlightDb {
    /// Resolve the Flighty app's database path inside its macOS container.
    pub fn default_path() -> Result<PathBuf, Error> {
        let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
        Ok(home.join(DEFAULT_DB_PATH))
    }

    /// Open the database at an explicit path. The path is injected rather
    /// than resolved internally so tests can point at fixture databases.
    pub fn open_at(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::DatabaseNotFound(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Identify the primary traveler's user id.
    ///
    /// Accounts that exist only to mirror a friend's shared itinerary carry
    /// nothing but `CONNECTED_FRIEND` rows; the real owner necessarily has at
    /// least one directly-imported or manually-entered flight. Group the
    /// remaining rows by user and take the largest. `None` means the store is
    /// empty or everything came through friend sharing.
    pub fn primary_user_id(&self) -> Result<Option<String>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT userId
             FROM UserFlight
             WHERE importSource != ?1
               AND importSource IS NOT NULL
               AND importSource != ''
             GROUP BY userId
             ORDER BY COUNT(*) DESC
             LIMIT 1",
        )?;
        let id = stmt
            .query_row(params![CONNECTED_FRIEND], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// Upcoming flights (departure after now), soonest first.
    ///
    /// With `include_friends` set, any flight marked `isMyFlight` qualifies,
    /// including those tracked for connected friends. Otherwise results are
    /// pinned to the primary traveler and friend-sourced rows are excluded;
    /// when no primary user resolves, the NULL user id matches nothing.
    pub fn upcoming_flights(
        &self,
        limit: u32,
        include_friends: bool,
    ) -> Result<Vec<UpcomingRow>, Error> {
        let now = epoch_now();

        if include_friends {
            let sql = format!(
                "{} {FLIGHT_JOINS}
                 WHERE uf.isMyFlight = 1
                   AND f.departureScheduleGateOriginal > ?1
                 ORDER BY f.departureScheduleGateOriginal
                 LIMIT ?2",
                UPCOMING_COLUMNS
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params![now, limit], upcoming_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
        } else {
            let primary = self.primary_user_id()?;
            log::debug!("resolved primary user: {primary:?}");
            let sql = format!(
                "{} {FLIGHT_JOINS}
                 WHERE uf.isMyFlight = 1
                   AND f.departureScheduleGateOriginal > ?1
                   AND uf.userId = ?2
                   AND uf.importSource != ?3
                 ORDER BY f.departureScheduleGateOriginal
                 LIMIT ?4",
                UPCOMING_COLUMNS
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params![now, primary, CONNECTED_FRIEND, limit],
                upcoming_row,
            )?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
        }
    }

    /// Flights departing on the given local calendar day, inclusive of both
    /// midnight and 23:59:59.
    pub fn flights_on_date(&self, date: NaiveDate) -> Result<Vec<SummaryRow>, Error> {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + Duration::days(1) - Duration::seconds(1);
        let start_ts = timefmt::local_epoch(day_start);
        let end_ts = timefmt::local_epoch(day_end);

        let sql = format!(
            "{} {FLIGHT_JOINS}
             WHERE uf.isMyFlight = 1
               AND f.departureScheduleGateOriginal >= ?1
               AND f.departureScheduleGateOriginal <= ?2
             ORDER BY f.departureScheduleGateOriginal",
            SUMMARY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![start_ts, end_ts], summary_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
    }

    /// Flights whose booking confirmation contains `pnr` as a substring.
    ///
    /// The ticket join is INNER here: a flight without booking details cannot
    /// match a confirmation search.
    pub fn flights_by_pnr(&self, pnr: &str) -> Result<Vec<SummaryRow>, Error> {
        let sql = format!(
            "{SUMMARY_COLUMNS}
             FROM Flight f
             JOIN UserFlight uf ON f.id = uf.flightId
             JOIN Airline a ON f.airlineId = a.id
             JOIN Airport dep ON f.departureAirportId = dep.id
             JOIN Airport arr ON f.actualArrivalAirportId = arr.id
             JOIN Ticket t ON f.id = t.flightId AND uf.userId = t.userId
             WHERE t.pnr LIKE ?1
             ORDER BY f.departureScheduleGateOriginal"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let pattern = format!("%{pnr}%");
        let rows = stmt.query_map(params![pattern], summary_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
    }

    /// Most recent past flights, newest first, skipping archived rows.
    pub fn recent_flights(&self, limit: u32) -> Result<Vec<RecentRow>, Error> {
        let now = epoch_now();
        let mut stmt = self.conn.prepare(
            "SELECT a.iata, f.number, dep.iata, arr.iata,
                    f.departureScheduleGateOriginal, f.equipmentModelName, f.distance
             FROM Flight f
             JOIN UserFlight uf ON f.id = uf.flightId
             JOIN Airline a ON f.airlineId = a.id
             JOIN Airport dep ON f.departureAirportId = dep.id
             JOIN Airport arr ON f.actualArrivalAirportId = arr.id
             WHERE uf.isMyFlight = 1
               AND uf.isArchived = 0
               AND f.departureScheduleGateOriginal < ?1
             ORDER BY f.departureScheduleGateOriginal DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![now, limit], |row| {
            Ok(RecentRow {
                airline_code: row.get(0)?,
                flight_number: row.get(1)?,
                dep_code: row.get(2)?,
                arr_code: row.get(3)?,
                departure: row.get(4)?,
                aircraft: row.get(5)?,
                distance_km: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
    }

    /// Aggregate totals over all the traveler's flights.
    ///
    /// SQL aggregates over zero rows yield NULL; both sums coalesce to 0 so
    /// an empty history reads as zeros rather than nulls.
    pub fn stats(&self) -> Result<FlightStats, Error> {
        let now = epoch_now();
        let (total, upcoming, total_km) = self.conn.query_row(
            "SELECT COUNT(*),
                    SUM(CASE WHEN f.departureScheduleGateOriginal > ?1 THEN 1 ELSE 0 END),
                    SUM(f.distance)
             FROM Flight f
             JOIN UserFlight uf ON f.id = uf.flightId
             WHERE uf.isMyFlight = 1",
            params![now],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            },
        )?;

        let total_km = total_km.unwrap_or(0.0);
        Ok(FlightStats {
            total_flights: total,
            upcoming_flights: upcoming.unwrap_or(0),
            total_distance_km: total_km,
            total_distance_miles: (total_km * 0.621371) as i64,
            earth_circumferences: (total_km / 40_075.0 * 100.0).round() / 100.0,
        })
    }
}

const UPCOMING_COLUMNS: &str = "SELECT a.iata, a.name, f.number,
            dep.iata, dep.name, dep.city,
            arr.iata, arr.name, arr.city,
            f.departureScheduleGateOriginal, f.arrivalScheduleGateOriginal,
            t.pnr, t.seatNumber, t.cabinClass, f.equipmentModelName,
            f.departureTerminal, f.departureGate, f.arrivalTerminal, f.arrivalGate,
            f.distance, uf.importSource";

const SUMMARY_COLUMNS: &str = "SELECT a.iata, f.number, dep.iata, arr.iata,
            f.departureScheduleGateOriginal, f.arrivalScheduleGateOriginal,
            t.pnr, t.seatNumber, t.cabinClass, f.equipmentModelName";

fn upcoming_row(row: &Row<'_>) -> rusqlite::Result<UpcomingRow> {
    Ok(UpcomingRow {
        airline_code: row.get(0)?,
        airline_name: row.get(1)?,
        flight_number: row.get(2)?,
        dep_code: row.get(3)?,
        dep_airport: row.get(4)?,
        dep_city: row.get(5)?,
        arr_code: row.get(6)?,
        arr_airport: row.get(7)?,
        arr_city: row.get(8)?,
        departure: row.get(9)?,
        arrival: row.get(10)?,
        confirmation: row.get(11)?,
        seat: row.get(12)?,
        cabin_class: row.get(13)?,
        aircraft: row.get(14)?,
        dep_terminal: row.get(15)?,
        dep_gate: row.get(16)?,
        arr_terminal: row.get(17)?,
        arr_gate: row.get(18)?,
        distance_km: row.get(19)?,
        import_source: row.get(20)?,
    })
}

fn summary_row(row: &Row<'_>) -> rusqlite::Result<SummaryRow> {
    Ok(SummaryRow {
        airline_code: row.get(0)?,
        flight_number: row.get(1)?,
        dep_code: row.get(2)?,
        arr_code: row.get(3)?,
        departure: row.get(4)?,
        arrival: row.get(5)?,
        confirmation: row.get(6)?,
        seat: row.get(7)?,
        cabin_class: row.get(8)?,
        aircraft: row.get(9)?,
    })
}

fn epoch_now() -> f64 {
    Utc::now().timestamp() as f64
}
