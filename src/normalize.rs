//! Output records built from raw query rows.
//!
//! Each record is assembled fresh per query and serialized straight to
//! stdout; field names here are the consuming agent's contract. The detailed
//! record carries nested departure/arrival stops and derived fields; the
//! `date`/`pnr`/`recent` views deliberately emit a flatter subset.

use serde::Serialize;

use crate::db::{RecentRow, SummaryRow, UpcomingRow};
use crate::timefmt;

/// One endpoint of a flight: the departure or arrival side.
#[derive(Debug, Serialize)]
pub struct Stop {
    pub airport_code: Option<String>,
    pub airport_name: Option<String>,
    pub city: Option<String>,
    pub datetime: Option<String>,
    pub display: Option<String>,
    pub terminal: Option<String>,
    pub gate: Option<String>,
}

/// Full flight record for the `list` and `next` views.
#[derive(Debug, Serialize)]
pub struct FlightRecord {
    pub flight: Option<String>,
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub route: String,
    pub departure: Stop,
    pub arrival: Stop,
    pub confirmation: Option<String>,
    pub seat: Option<String>,
    pub cabin_class: Option<String>,
    pub aircraft: Option<String>,
    pub duration: Option<String>,
    pub distance_km: Option<f64>,
    pub distance_miles: Option<i64>,
    pub days_until: Option<i64>,
    pub import_source: Option<String>,
}

impl FlightRecord {
    pub fn from_row(row: UpcomingRow) -> Self {
        Self {
            flight: flight_label(row.airline_code.as_deref(), row.flight_number.as_deref()),
            airline: row.airline_name,
            route: route_label(row.dep_code.as_deref(), row.arr_code.as_deref()),
            departure: Stop {
                airport_code: row.dep_code,
                airport_name: row.dep_airport,
                city: row.dep_city,
                datetime: timefmt::to_iso(row.departure),
                display: timefmt::to_display(row.departure),
                terminal: row.dep_terminal,
                gate: row.dep_gate,
            },
            arrival: Stop {
                airport_code: row.arr_code,
                airport_name: row.arr_airport,
                city: row.arr_city,
                datetime: timefmt::to_iso(row.arrival),
                display: timefmt::to_display(row.arrival),
                terminal: row.arr_terminal,
                gate: row.arr_gate,
            },
            flight_number: row.flight_number,
            confirmation: row.confirmation,
            seat: row.seat,
            cabin_class: cabin_class_display(row.cabin_class.as_deref()),
            aircraft: row.aircraft,
            duration: timefmt::duration(row.departure, row.arrival),
            distance_km: row.distance_km,
            distance_miles: timefmt::km_to_miles(row.distance_km),
            days_until: timefmt::days_until(row.departure),
            import_source: row.import_source,
        }
    }
}

/// Reduced-detail record for the `date` and `pnr` views. Cabin class stays in
/// its raw stored form here; only the full record rewrites it for display.
#[derive(Debug, Serialize)]
pub struct FlightSummary {
    pub flight: Option<String>,
    pub route: String,
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub confirmation: Option<String>,
    pub seat: Option<String>,
    pub cabin_class: Option<String>,
    pub aircraft: Option<String>,
}

impl FlightSummary {
    pub fn from_row(row: SummaryRow) -> Self {
        Self {
            flight: flight_label(row.airline_code.as_deref(), row.flight_number.as_deref()),
            route: route_label(row.dep_code.as_deref(), row.arr_code.as_deref()),
            departure: timefmt::to_display(row.departure),
            arrival: timefmt::to_display(row.arrival),
            confirmation: row.confirmation,
            seat: row.seat,
            cabin_class: row.cabin_class,
            aircraft: row.aircraft,
        }
    }
}

/// Record for the `recent` view.
#[derive(Debug, Serialize)]
pub struct RecentFlight {
    pub flight: Option<String>,
    pub route: String,
    pub date: Option<String>,
    pub aircraft: Option<String>,
    pub distance_km: Option<f64>,
}

impl RecentFlight {
    pub fn from_row(row: RecentRow) -> Self {
        Self {
            flight: flight_label(row.airline_code.as_deref(), row.flight_number.as_deref()),
            route: route_label(row.dep_code.as_deref(), row.arr_code.as_deref()),
            date: timefmt::to_date(row.departure),
            aircraft: row.aircraft,
            distance_km: row.distance_km,
        }
    }
}

/// `"<airline_iata> <number>"`, or None when either half is missing.
fn flight_label(airline_code: Option<&str>, number: Option<&str>) -> Option<String> {
    match (airline_code, number) {
        (Some(code), Some(num)) => Some(format!("{code} {num}")),
        _ => None,
    }
}

fn route_label(dep_code: Option<&str>, arr_code: Option<&str>) -> String {
    format!("{} → {}", dep_code.unwrap_or("?"), arr_code.unwrap_or("?"))
}

/// Rewrite the stored cabin class for display.
///
/// `premiumEconomy` → "Premium Economy", `privateJet` → "Private Jet", then
/// title-cased word by word.
pub fn cabin_class_display(raw: Option<&str>) -> Option<String> {
    let expanded = raw?
        .replace("premiumEconomy", "premium economy")
        .replace("privateJet", "private jet");
    Some(title_case(&expanded))
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cabin_class_rewrites() {
        assert_eq!(
            cabin_class_display(Some("premiumEconomy")),
            Some("Premium Economy".to_string())
        );
        assert_eq!(
            cabin_class_display(Some("privateJet")),
            Some("Private Jet".to_string())
        );
        assert_eq!(cabin_class_display(Some("economy")), Some("Economy".to_string()));
        assert_eq!(cabin_class_display(Some("business")), Some("Business".to_string()));
        assert_eq!(cabin_class_display(None), None);
    }

    #[test]
    fn test_flight_label_requires_both_halves() {
        assert_eq!(flight_label(Some("UA"), Some("100")), Some("UA 100".to_string()));
        assert_eq!(flight_label(None, Some("100")), None);
        assert_eq!(flight_label(Some("UA"), None), None);
    }

    #[test]
    fn test_route_label() {
        assert_eq!(route_label(Some("SFO"), Some("JFK")), "SFO → JFK");
    }

    #[test]
    fn test_full_record_derives_fields() {
        let dep = 1_900_000_000.0;
        let row = UpcomingRow {
            airline_code: Some("UA".to_string()),
            airline_name: Some("United Airlines".to_string()),
            flight_number: Some("100".to_string()),
            dep_code: Some("SFO".to_string()),
            dep_airport: Some("San Francisco International".to_string()),
            dep_city: Some("San Francisco".to_string()),
            arr_code: Some("JFK".to_string()),
            arr_airport: Some("John F. Kennedy International".to_string()),
            arr_city: Some("New York".to_string()),
            departure: Some(dep),
            arrival: Some(dep + 5.0 * 3600.0 + 30.0 * 60.0),
            confirmation: Some("XKCD42".to_string()),
            seat: Some("12A".to_string()),
            cabin_class: Some("premiumEconomy".to_string()),
            aircraft: Some("Boeing 777-200".to_string()),
            dep_terminal: Some("3".to_string()),
            dep_gate: Some("F12".to_string()),
            arr_terminal: None,
            arr_gate: None,
            distance_km: Some(4150.0),
            import_source: Some("MANUAL".to_string()),
        };

        let record = FlightRecord::from_row(row);
        assert_eq!(record.flight.as_deref(), Some("UA 100"));
        assert_eq!(record.route, "SFO → JFK");
        assert_eq!(record.duration.as_deref(), Some("5h 30m"));
        assert_eq!(record.distance_miles, Some(2578));
        assert_eq!(record.cabin_class.as_deref(), Some("Premium Economy"));
        assert!(record.departure.datetime.is_some());
        assert!(record.arrival.display.is_some());
        assert_eq!(record.arrival.terminal, None);
    }

    #[test]
    fn test_summary_keeps_raw_cabin_class() {
        let row = SummaryRow {
            airline_code: Some("UA".to_string()),
            flight_number: Some("100".to_string()),
            dep_code: Some("SFO".to_string()),
            arr_code: Some("JFK".to_string()),
            departure: Some(1_900_000_000.0),
            arrival: None,
            confirmation: None,
            seat: None,
            cabin_class: Some("premiumEconomy".to_string()),
            aircraft: None,
        };

        let summary = FlightSummary::from_row(row);
        assert_eq!(summary.cabin_class.as_deref(), Some("premiumEconomy"));
        assert_eq!(summary.arrival, None);
    }

    #[test]
    fn test_recent_flight_uses_calendar_date() {
        let row = RecentRow {
            airline_code: Some("UA".to_string()),
            flight_number: Some("100".to_string()),
            dep_code: Some("SFO".to_string()),
            arr_code: Some("JFK".to_string()),
            departure: Some(1_700_000_000.0),
            aircraft: Some("Boeing 777-200".to_string()),
            distance_km: Some(4150.0),
        };

        let recent = RecentFlight::from_row(row);
        let date = recent.date.expect("date");
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
    }
}
