//! Read-only query layer over a Flighty flight-tracking database.
//!
//! Flighty (the owning application) maintains the SQLite database; this crate
//! only reads it. Each invocation runs one command against the store and emits
//! exactly one pretty-printed JSON object on stdout, shaped for consumption by
//! an automation agent rather than a human.

pub mod cli;
pub mod db;
pub mod error;
pub mod normalize;
pub mod timefmt;
