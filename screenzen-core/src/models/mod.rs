// File: screenzen-core/src/models/mod.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::Error;

/// The six required usage fields, in the order they are validated and
/// reported back to the client.
pub const USAGE_FIELDS: [&str; 6] = [
    "technology_hours",
    "social_media_hours",
    "gaming_hours",
    "screen_time_hours",
    "sleep_hours",
    "physical_activity_hours",
];

/// Six-field numeric summary of one day's device usage. This is the exact
/// shape forwarded to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsageRecord {
    pub technology_hours: f64,
    pub social_media_hours: f64,
    pub gaming_hours: f64,
    pub screen_time_hours: f64,
    pub sleep_hours: f64,
    pub physical_activity_hours: f64,
}

impl UsageRecord {
    /// Validate a manual-entry request body. Every field in `USAGE_FIELDS`
    /// must be present and numeric (numeric strings are tolerated); unknown
    /// fields are rejected. The first offending field is named in the error.
    pub fn from_manual(body: &Value) -> Result<Self, Error> {
        let obj = body
            .as_object()
            .ok_or_else(|| Error::Validation("request body must be a JSON object".to_string()))?;

        for key in obj.keys() {
            if !USAGE_FIELDS.contains(&key.as_str()) {
                return Err(Error::Validation(format!("unknown field: {}", key)));
            }
        }

        let mut hours = [0f64; 6];
        for (i, field) in USAGE_FIELDS.iter().enumerate() {
            let value = obj
                .get(*field)
                .and_then(numeric_value)
                .ok_or_else(|| Error::Validation(format!("missing or invalid field: {}", field)))?;
            hours[i] = value;
        }

        Ok(Self {
            technology_hours: hours[0],
            social_media_hours: hours[1],
            gaming_hours: hours[2],
            screen_time_hours: hours[3],
            sleep_hours: hours[4],
            physical_activity_hours: hours[5],
        })
    }
}

fn numeric_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Stress classification returned by the prediction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub stress_level: String,
    pub confidence: f64,
    #[serde(default)]
    pub probabilities: Value,
}

/// One recommended task with its point value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedTask {
    pub task: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub points: i64,
}

/// Recommendation payload attached to a prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub message: String,
    pub stress_level: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<RecommendedTask>,
    #[serde(default)]
    pub gamification: Value,
}

/// Full response body of the prediction service's `/predict` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub timestamp: DateTime<Utc>,
    pub prediction: Prediction,
    pub recommendations: Recommendations,
}

/// One persisted analysis, including its task/points bookkeeping.
///
/// `tasks_completed_status` is sized to `recommendation_tasks` at insert and
/// never resized afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisLog {
    pub log_id: Uuid,
    pub user_id: String,
    pub api_response_timestamp: DateTime<Utc>,
    pub technology_usage_hours: f64,
    pub social_media_usage_hours: f64,
    pub gaming_hours: f64,
    pub screen_time_hours: f64,
    pub sleep_hours: f64,
    pub physical_activity_hours: f64,
    pub predicted_stress_level: String,
    pub prediction_confidence: f64,
    pub prediction_probabilities: Value,
    pub recommendation_message: String,
    pub recommendation_stress_level: String,
    pub recommendation_insights: Value,
    pub recommendation_tasks: Value,
    pub recommendation_gamification: Value,
    pub tasks_completed_status: Vec<bool>,
    pub points_earned_for_analysis: i64,
    pub created_at: DateTime<Utc>,
}

/// The computed effect of one task toggle against a row's current state.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTogglePlan {
    pub statuses: Vec<bool>,
    pub points_earned: i64,
    pub points_delta: i64,
}

impl AnalysisLog {
    /// Plan a task toggle against this row's completion flags.
    ///
    /// The delta is transition-triggered: +points on false->true, -points on
    /// true->false, zero when the flag does not change. The plan must be made
    /// from the row state read under the toggle's own transaction; planning
    /// from a stale read can double-apply a delta.
    pub fn plan_task_toggle(
        &self,
        task_index: i64,
        completed: bool,
        point_value: i64,
    ) -> Result<TaskTogglePlan, Error> {
        let len = self.tasks_completed_status.len() as i64;
        if task_index < 0 || task_index >= len {
            return Err(Error::InvalidArgument(format!(
                "task index {} out of range 0..{}",
                task_index, len
            )));
        }
        let idx = task_index as usize;

        let was_completed = self.tasks_completed_status[idx];
        let points_delta = if completed && !was_completed {
            point_value
        } else if !completed && was_completed {
            -point_value
        } else {
            0
        };

        let mut statuses = self.tasks_completed_status.clone();
        statuses[idx] = completed;

        Ok(TaskTogglePlan {
            statuses,
            points_earned: self.points_earned_for_analysis + points_delta,
            points_delta,
        })
    }
}

/// Row to insert for a freshly completed analysis. The store generates the
/// id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewAnalysisLog {
    pub user_id: String,
    pub api_response_timestamp: DateTime<Utc>,
    pub usage: UsageRecord,
    pub predicted_stress_level: String,
    pub prediction_confidence: f64,
    pub prediction_probabilities: Value,
    pub recommendation_message: String,
    pub recommendation_stress_level: String,
    pub recommendation_insights: Value,
    pub recommendation_tasks: Value,
    pub recommendation_gamification: Value,
    pub tasks_completed_status: Vec<bool>,
    pub points_earned_for_analysis: i64,
}

/// Per-user running points total.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserPoints {
    pub user_id: String,
    pub total_points: i64,
    pub last_activity_at: DateTime<Utc>,
}

/// One leaderboard line as returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub total_points: i64,
    pub username: String,
}
