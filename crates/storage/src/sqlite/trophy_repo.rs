use async_trait::async_trait;
use tipswalk_core::model::Trophy;

use super::SqliteRepository;
use super::mapping::{conn, map_trophy_row};
use crate::repository::{StorageError, TrophyRepository};

#[async_trait]
impl TrophyRepository for SqliteRepository {
    async fn award(&self, trophy: &Trophy) -> Result<bool, StorageError> {
        let week = trophy.week();
        let res = sqlx::query(
            r"
                INSERT INTO trophies (iso_year, iso_week, awarded_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(iso_year, iso_week) DO NOTHING
            ",
        )
        .bind(i64::from(week.year()))
        .bind(i64::from(week.week()))
        .bind(trophy.awarded_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.rows_affected() == 1)
    }

    async fn list_trophies(&self) -> Result<Vec<Trophy>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT iso_year, iso_week, awarded_at
                FROM trophies
                ORDER BY iso_year ASC, iso_week ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_trophy_row).collect()
    }
}
