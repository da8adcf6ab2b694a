pub mod audit;
pub mod booking;
pub mod reference;
pub mod slot;
pub mod status;
pub mod template;

pub use audit::*;
pub use booking::*;
pub use reference::*;
pub use slot::*;
pub use status::*;
pub use template::*;

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("invalid value for {column}: {value}")]
struct InvalidColumn {
    column: &'static str,
    value: String,
}

fn conversion_failure(idx: usize, column: &'static str, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(InvalidColumn { column, value }))
}

/// Canonical text form for stored instants: second precision, `Z` suffix, so
/// lexical order in SQL matches chronological order.
pub fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn encode_time(t: &NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

pub(crate) fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|_| conversion_failure(idx, "uuid", raw))
}

pub(crate) fn get_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| conversion_failure(idx, "timestamp", raw))
}

pub(crate) fn get_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    NaiveTime::parse_from_str(&raw, "%H:%M:%S").map_err(|_| conversion_failure(idx, "time", raw))
}

pub(crate) fn get_parsed<T: std::str::FromStr>(
    row: &Row<'_>,
    idx: usize,
    column: &'static str,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|_| conversion_failure(idx, column, raw))
}
