//! `flightlog` binary: one command in, one JSON object out.
//!
//! Exit status is the contract boundary: an unreachable database or a query
//! fault exits non-zero; validation errors and empty results are part of the
//! payload and exit zero. Logging goes to stderr so stdout stays pure JSON.

use std::process::ExitCode;

use serde_json::{json, Value};

use flightlog::cli;
use flightlog::db::FlightDb;
use flightlog::error::Error;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_json(&json!({ "error": "Usage: flightlog <command> [args]" }));
        return ExitCode::FAILURE;
    }

    // An unreachable store fails the invocation before any command handling,
    // so even an invalid command exits non-zero when the database is missing.
    let db = match open_default() {
        Ok(db) => db,
        Err(err) => {
            print_json(&json!({ "error": err.to_string() }));
            return ExitCode::FAILURE;
        }
    };

    let command = match cli::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            print_json(&json!({ "error": message }));
            return ExitCode::SUCCESS;
        }
    };

    match cli::run(&db, &command) {
        Ok(value) => {
            print_json(&value);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("command failed: {err}");
            print_json(&json!({ "error": err.to_string() }));
            ExitCode::FAILURE
        }
    }
}

fn open_default() -> Result<FlightDb, Error> {
    let path = FlightDb::default_path()?;
    let db = FlightDb::open_at(&path)?;
    log::debug!("opened flight database at {}", path.display());
    Ok(db)
}

fn print_json(value: &Value) {
    // Pretty-printing a Value cannot fail; the fallback keeps the single
    // JSON object contract anyway.
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    println!("{text}");
}
