use async_trait::async_trait;
use tipswalk_core::model::WalkSummary;

use super::SqliteRepository;
use super::mapping::{conn, map_summary_row, map_summary_row_with_id};
use crate::repository::{StorageError, WalkSummaryRepository, WalkSummaryRow};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl WalkSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &WalkSummary) -> Result<i64, StorageError> {
        let week = summary.week();

        let res = sqlx::query(
            r"
                INSERT INTO walk_summaries (
                    walk_id, started_at, completed_at, total_rounds,
                    correct, iso_year, iso_week
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(summary.walk_id().to_string())
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .bind(i64::from(summary.total_rounds()))
        .bind(i64::from(summary.correct()))
        .bind(i64::from(week.year()))
        .bind(i64::from(week.week()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Conflict
            } else {
                conn(e)
            }
        })?;

        Ok(res.last_insert_rowid())
    }

    async fn get_summary(&self, id: i64) -> Result<WalkSummary, StorageError> {
        let row = sqlx::query(
            r"
                SELECT walk_id, started_at, completed_at, total_rounds, correct
                FROM walk_summaries
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summaries(&self, limit: u32) -> Result<Vec<WalkSummaryRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, walk_id, started_at, completed_at, total_rounds, correct
                FROM walk_summaries
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_summary_row_with_id(&row)?);
        }
        Ok(out)
    }
}
