// src/repositories/postgres/user_points.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use crate::models::UserPoints;
use crate::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserPointsRepository: Send + Sync {
    /// The user's running total, or None if no points row exists yet.
    async fn get_total(&self, user_id: &str) -> Result<Option<i64>, Error>;

    /// Top `n` users by total points, descending.
    async fn top_n(&self, n: i64) -> Result<Vec<UserPoints>, Error>;
}

#[derive(Clone)]
pub struct PostgresUserPointsRepository {
    pool: Pool<Postgres>,
}

impl PostgresUserPointsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserPointsRepository for PostgresUserPointsRepository {
    async fn get_total(&self, user_id: &str) -> Result<Option<i64>, Error> {
        let row = sqlx::query(
            r#"
            SELECT total_points
            FROM user_points
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("total_points")?)),
            None => Ok(None),
        }
    }

    async fn top_n(&self, n: i64) -> Result<Vec<UserPoints>, Error> {
        let rows = sqlx::query_as::<_, UserPoints>(
            r#"
            SELECT user_id,
                   total_points,
                   last_activity_at
            FROM user_points
            ORDER BY total_points DESC
            LIMIT $1
            "#,
        )
        .bind(n)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
