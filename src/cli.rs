//! Command parsing and dispatch.
//!
//! One invocation maps to one query. Commands parse into a closed enum with
//! typed payloads; validation problems (bad dates, missing arguments, unknown
//! commands) become `{"error": ...}` payloads with a successful exit, while
//! store and query faults propagate to `main` and fail the process.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use crate::db::FlightDb;
use crate::error::Error;
use crate::normalize::{FlightRecord, FlightSummary, RecentFlight};

pub const DEFAULT_LIMIT: u32 = 20;

const VALID_COMMANDS: &str = "list, next, date, pnr, stats, recent";

/// One parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { limit: u32, include_friends: bool },
    Next,
    Date { date: String },
    Pnr { code: String },
    Stats,
    Recent { limit: u32 },
}

/// Parse command-line arguments (program name already stripped).
///
/// The command token may carry a leading `--` (`--stats` ≡ `stats`). Errors
/// are user-facing messages for the JSON error payload, not process faults.
pub fn parse(args: &[String]) -> Result<Command, String> {
    let Some(first) = args.first() else {
        return Err("Usage: flightlog <command> [args]".to_string());
    };
    let name = first.trim_start_matches("--");

    match name {
        "list" => {
            let mut limit = DEFAULT_LIMIT;
            let mut include_friends = false;
            for arg in &args[1..] {
                if arg == "--include-friends" {
                    include_friends = true;
                } else if let Ok(n) = arg.parse() {
                    limit = n;
                }
            }
            Ok(Command::List { limit, include_friends })
        }
        "next" => Ok(Command::Next),
        "date" => match args.get(1) {
            Some(date) => Ok(Command::Date { date: date.clone() }),
            None => Err("Usage: flightlog date YYYY-MM-DD".to_string()),
        },
        "pnr" => match args.get(1) {
            Some(code) => Ok(Command::Pnr { code: code.clone() }),
            None => Err("Usage: flightlog pnr <confirmation_code>".to_string()),
        },
        "stats" => Ok(Command::Stats),
        "recent" => match args.get(1) {
            Some(arg) => arg
                .parse()
                .map(|limit| Command::Recent { limit })
                .map_err(|_| format!("Invalid limit: {arg}")),
            None => Ok(Command::Recent { limit: DEFAULT_LIMIT }),
        },
        other => Err(format!(
            "Unknown command: {other}. Use: {VALID_COMMANDS}"
        )),
    }
}

#[derive(Debug, Serialize)]
struct FlightList {
    flights: Vec<FlightRecord>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct NextFlight {
    next_flight: Option<FlightRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct DateFlights {
    date: String,
    flights: Vec<FlightSummary>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct PnrFlights {
    confirmation: String,
    flights: Vec<FlightSummary>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct RecentFlights {
    recent_flights: Vec<RecentFlight>,
    count: usize,
}

/// Execute one command against the store and produce the output payload.
pub fn run(db: &FlightDb, command: &Command) -> Result<Value, Error> {
    match command {
        Command::List { limit, include_friends } => {
            let flights: Vec<FlightRecord> = db
                .upcoming_flights(*limit, *include_friends)?
                .into_iter()
                .map(FlightRecord::from_row)
                .collect();
            let count = flights.len();
            Ok(serde_json::to_value(FlightList { flights, count })?)
        }
        Command::Next => {
            let next_flight = db
                .upcoming_flights(1, false)?
                .into_iter()
                .next()
                .map(FlightRecord::from_row);
            let message = if next_flight.is_none() {
                Some("No upcoming flights found")
            } else {
                None
            };
            Ok(serde_json::to_value(NextFlight { next_flight, message })?)
        }
        Command::Date { date } => {
            // Validate before touching the store; a bad date never queries.
            let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
                return Ok(json!({
                    "error": format!("Invalid date format: {date}. Use YYYY-MM-DD")
                }));
            };
            let flights: Vec<FlightSummary> = db
                .flights_on_date(day)?
                .into_iter()
                .map(FlightSummary::from_row)
                .collect();
            let count = flights.len();
            Ok(serde_json::to_value(DateFlights {
                date: date.clone(),
                flights,
                count,
            })?)
        }
        Command::Pnr { code } => {
            let flights: Vec<FlightSummary> = db
                .flights_by_pnr(code)?
                .into_iter()
                .map(FlightSummary::from_row)
                .collect();
            let count = flights.len();
            Ok(serde_json::to_value(PnrFlights {
                confirmation: code.clone(),
                flights,
                count,
            })?)
        }
        Command::Stats => Ok(serde_json::to_value(db.stats()?)?),
        Command::Recent { limit } => {
            let recent_flights: Vec<RecentFlight> = db
                .recent_flights(*limit)?
                .into_iter()
                .map(RecentFlight::from_row)
                .collect();
            let count = recent_flights.len();
            Ok(serde_json::to_value(RecentFlights { recent_flights, count })?)
        }
    }
}
