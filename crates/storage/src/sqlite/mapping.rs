use chrono::{DateTime, Utc};
use sqlx::Row;
use tipswalk_core::WeekKey;
use tipswalk_core::model::{Trophy, WalkId, WalkSummary};

use crate::repository::{StorageError, WalkSummaryRow};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn i32_from_i64(field: &'static str, v: i64) -> Result<i32, StorageError> {
    i32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn week_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<WeekKey, StorageError> {
    let year = i32_from_i64("iso_year", row.try_get::<i64, _>("iso_year").map_err(ser)?)?;
    let week = u32_from_i64("iso_week", row.try_get::<i64, _>("iso_week").map_err(ser)?)?;
    WeekKey::from_parts(year, week)
        .ok_or_else(|| StorageError::Serialization(format!("invalid iso_week: {week}")))
}

pub(crate) fn map_trophy_row(row: &sqlx::sqlite::SqliteRow) -> Result<Trophy, StorageError> {
    let week = week_from_row(row)?;
    let awarded_at: DateTime<Utc> = row.try_get("awarded_at").map_err(ser)?;
    Ok(Trophy::from_persisted(week, awarded_at))
}

pub(crate) fn map_summary_row(row: &sqlx::sqlite::SqliteRow) -> Result<WalkSummary, StorageError> {
    let walk_id: WalkId = row
        .try_get::<String, _>("walk_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;
    let total_rounds = u32_from_i64(
        "total_rounds",
        row.try_get::<i64, _>("total_rounds").map_err(ser)?,
    )?;
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;

    WalkSummary::from_persisted(walk_id, started_at, completed_at, total_rounds, correct)
        .map_err(ser)
}

pub(crate) fn map_summary_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<WalkSummaryRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let summary = map_summary_row(row)?;
    Ok(WalkSummaryRow::new(id, summary))
}
