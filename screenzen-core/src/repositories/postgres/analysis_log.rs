// src/repositories/postgres/analysis_log.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::models::{AnalysisLog, NewAnalysisLog};
use crate::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisLogRepository: Send + Sync {
    async fn insert(&self, new_log: &NewAnalysisLog) -> Result<AnalysisLog, Error>;

    /// All logs for one user, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AnalysisLog>, Error>;

    /// Apply a task toggle inside a single transaction: lock the log row,
    /// compute the delta from its committed completion flags, write the new
    /// flags and per-analysis points, and add the delta to the user's
    /// running total. The lookup filters on id and owner in one go; a log
    /// owned by someone else is indistinguishable from a missing one.
    /// Returns the updated log, the applied delta, and the user's new total.
    async fn apply_task_toggle(
        &self,
        log_id: Uuid,
        user_id: &str,
        task_index: i64,
        completed: bool,
        point_value: i64,
    ) -> Result<(AnalysisLog, i64, i64), Error>;
}

#[derive(Clone)]
pub struct PostgresAnalysisLogRepository {
    pool: Pool<Postgres>,
}

impl PostgresAnalysisLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisLogRepository for PostgresAnalysisLogRepository {
    async fn insert(&self, new_log: &NewAnalysisLog) -> Result<AnalysisLog, Error> {
        let row = sqlx::query_as::<_, AnalysisLog>(
            r#"
            INSERT INTO analysis_logs (
                user_id,
                api_response_timestamp,
                technology_usage_hours,
                social_media_usage_hours,
                gaming_hours,
                screen_time_hours,
                sleep_hours,
                physical_activity_hours,
                predicted_stress_level,
                prediction_confidence,
                prediction_probabilities,
                recommendation_message,
                recommendation_stress_level,
                recommendation_insights,
                recommendation_tasks,
                recommendation_gamification,
                tasks_completed_status,
                points_earned_for_analysis
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(&new_log.user_id)
        .bind(new_log.api_response_timestamp)
        .bind(new_log.usage.technology_hours)
        .bind(new_log.usage.social_media_hours)
        .bind(new_log.usage.gaming_hours)
        .bind(new_log.usage.screen_time_hours)
        .bind(new_log.usage.sleep_hours)
        .bind(new_log.usage.physical_activity_hours)
        .bind(&new_log.predicted_stress_level)
        .bind(new_log.prediction_confidence)
        .bind(&new_log.prediction_probabilities)
        .bind(&new_log.recommendation_message)
        .bind(&new_log.recommendation_stress_level)
        .bind(&new_log.recommendation_insights)
        .bind(&new_log.recommendation_tasks)
        .bind(&new_log.recommendation_gamification)
        .bind(&new_log.tasks_completed_status)
        .bind(new_log.points_earned_for_analysis)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AnalysisLog>, Error> {
        let rows = sqlx::query_as::<_, AnalysisLog>(
            r#"
            SELECT *
            FROM analysis_logs
            WHERE user_id = $1
            ORDER BY api_response_timestamp DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn apply_task_toggle(
        &self,
        log_id: Uuid,
        user_id: &str,
        task_index: i64,
        completed: bool,
        point_value: i64,
    ) -> Result<(AnalysisLog, i64, i64), Error> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE holds the row until commit, so the delta is always
        // derived from the committed flags. Two concurrent toggles of the
        // same task serialize here; the second one sees the first one's
        // write and plans a zero delta.
        let log = sqlx::query_as::<_, AnalysisLog>(
            r#"
            SELECT *
            FROM analysis_logs
            WHERE log_id = $1
              AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(log_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("log {} not found for user", log_id)))?;

        let plan = log.plan_task_toggle(task_index, completed, point_value)?;

        let updated = sqlx::query_as::<_, AnalysisLog>(
            r#"
            UPDATE analysis_logs
            SET tasks_completed_status = $1,
                points_earned_for_analysis = $2
            WHERE log_id = $3
              AND user_id = $4
            RETURNING *
            "#,
        )
        .bind(&plan.statuses)
        .bind(plan.points_earned)
        .bind(log_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let new_total = if plan.points_delta != 0 {
            let row = sqlx::query(
                r#"
                INSERT INTO user_points (user_id, total_points, last_activity_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id) DO UPDATE
                SET total_points = user_points.total_points + $2,
                    last_activity_at = $3
                RETURNING total_points
                "#,
            )
            .bind(user_id)
            .bind(plan.points_delta)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;
            row.try_get::<i64, _>("total_points")?
        } else {
            let row = sqlx::query(
                r#"
                SELECT total_points
                FROM user_points
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
            match row {
                Some(r) => r.try_get::<i64, _>("total_points")?,
                None => 0,
            }
        };

        tx.commit().await?;
        Ok((updated, plan.points_delta, new_total))
    }
}
