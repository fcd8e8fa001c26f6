use anyhow::{anyhow, Ok, Result};
use async_trait::async_trait;
use sqlx::{query_as, Pool, Postgres};
use uuid::Uuid;

use crate::{model::MatchModel, schema::NewMatch};

/// Storage seam for the matches table.
///
/// Handlers only see this trait, so tests run against an in-memory double
/// while production uses the Postgres pool.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Most recently created matches first, at most `limit` of them.
    async fn get_matches(&self, limit: i64) -> Result<Vec<MatchModel>>;

    /// Insert one match and return the stored row, id and `created_at` included.
    async fn create_match(&self, new: NewMatch) -> Result<MatchModel>;
}

#[async_trait]
impl MatchStore for Pool<Postgres> {
    async fn get_matches(&self, limit: i64) -> Result<Vec<MatchModel>> {
        let matches: Vec<MatchModel> = query_as(
            r#"
            SELECT id, start_time, end_time, home_score, away_score, status, created_at
            FROM matches
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self)
        .await
        .map_err(|e| anyhow!("Unable to query matches from db: {}", e))?;

        Ok(matches)
    }

    async fn create_match(&self, new: NewMatch) -> Result<MatchModel> {
        let id = Uuid::new_v4();

        let m: MatchModel = query_as(
            r#"
            INSERT INTO matches (id, start_time, end_time, home_score, away_score, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, start_time, end_time, home_score, away_score, status, created_at
            "#,
        )
        .bind(id)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.home_score)
        .bind(new.away_score)
        .bind(new.status)
        .fetch_one(self)
        .await
        .map_err(|e| anyhow!("Unable to insert match into db: {}", e))?;

        Ok(m)
    }
}
