// src/services/points_service.rs
//
// Task/points bookkeeping and the leaderboard read.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::models::{AnalysisLog, LeaderboardEntry};
use crate::repositories::{AnalysisLogRepository, UserPointsRepository};
use crate::Error;

pub const LEADERBOARD_SIZE: i64 = 10;

/// Fixed synthetic leaderboard entries, merged in alongside real users.
const SYNTHETIC_FRIENDS: [(&str, &str, i64); 4] = [
    ("synthetic_friend_1", "ZenMasterJess", 320),
    ("synthetic_friend_2", "DigitalDetoxDan", 275),
    ("synthetic_friend_3", "HabitHeroKim", 210),
    ("synthetic_friend_4", "FocusFred", 150),
];

/// Result of one task toggle.
#[derive(Debug, Clone)]
pub struct TaskToggleOutcome {
    pub log: AnalysisLog,
    pub points_delta: i64,
    pub new_total_points: i64,
}

pub struct PointsService {
    logs: Arc<dyn AnalysisLogRepository>,
    points: Arc<dyn UserPointsRepository>,
}

impl PointsService {
    pub fn new(logs: Arc<dyn AnalysisLogRepository>, points: Arc<dyn UserPointsRepository>) -> Self {
        Self { logs, points }
    }

    /// The caller's analysis journal, newest first.
    pub async fn list_analyses(&self, user_id: &str) -> Result<Vec<AnalysisLog>, Error> {
        self.logs.list_for_user(user_id).await
    }

    /// The caller's running total; 0 when no points row exists.
    pub async fn total_points(&self, user_id: &str) -> Result<i64, Error> {
        Ok(self.points.get_total(user_id).await?.unwrap_or(0))
    }

    /// Mark or unmark one recommended task as complete.
    ///
    /// The raw toggle intent goes straight to the store, which locks the log
    /// row and derives the points delta from its committed flags
    /// (`AnalysisLog::plan_task_toggle`). A no-op toggle still rewrites the
    /// row but leaves both totals untouched.
    pub async fn toggle_task(
        &self,
        user_id: &str,
        log_id: Uuid,
        task_index: i64,
        completed: bool,
        point_value: i64,
    ) -> Result<TaskToggleOutcome, Error> {
        let (updated, points_delta, new_total) = self
            .logs
            .apply_task_toggle(log_id, user_id, task_index, completed, point_value)
            .await?;

        if points_delta != 0 {
            info!(
                "user {} task {} on log {}: delta {}, new total {}",
                user_id, task_index, log_id, points_delta, new_total
            );
        }

        Ok(TaskToggleOutcome {
            log: updated,
            points_delta,
            new_total_points: new_total,
        })
    }

    /// Top users by points, padded with the fixed synthetic entries and
    /// re-sorted descending. The caller shows up as "You".
    pub async fn leaderboard(&self, caller_id: &str) -> Result<Vec<LeaderboardEntry>, Error> {
        let top = self.points.top_n(LEADERBOARD_SIZE).await?;

        let mut board: Vec<LeaderboardEntry> = top
            .into_iter()
            .map(|u| {
                let username = if u.user_id == caller_id {
                    "You".to_string()
                } else {
                    format!("User_{}", u.user_id.chars().take(4).collect::<String>())
                };
                LeaderboardEntry {
                    id: u.user_id,
                    total_points: u.total_points,
                    username,
                }
            })
            .collect();

        for (id, username, total_points) in SYNTHETIC_FRIENDS {
            if !board.iter().any(|entry| entry.id == id) {
                board.push(LeaderboardEntry {
                    id: id.to_string(),
                    total_points,
                    username: username.to_string(),
                });
            }
        }

        board.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserPoints;
    use crate::repositories::postgres::analysis_log::MockAnalysisLogRepository;
    use crate::repositories::postgres::user_points::MockUserPointsRepository;
    use chrono::Utc;
    use serde_json::json;

    fn make_log(log_id: Uuid, user_id: &str, statuses: Vec<bool>, points: i64) -> AnalysisLog {
        AnalysisLog {
            log_id,
            user_id: user_id.to_string(),
            api_response_timestamp: Utc::now(),
            technology_usage_hours: 5.0,
            social_media_usage_hours: 2.0,
            gaming_hours: 1.0,
            screen_time_hours: 8.0,
            sleep_hours: 7.0,
            physical_activity_hours: 0.5,
            predicted_stress_level: "Medium".to_string(),
            prediction_confidence: 0.82,
            prediction_probabilities: json!({}),
            recommendation_message: "Take a break".to_string(),
            recommendation_stress_level: "Medium".to_string(),
            recommendation_insights: json!([]),
            recommendation_tasks: json!([]),
            recommendation_gamification: json!({}),
            tasks_completed_status: statuses,
            points_earned_for_analysis: points,
            created_at: Utc::now(),
        }
    }

    fn service_with(
        logs: MockAnalysisLogRepository,
        points: MockUserPointsRepository,
    ) -> PointsService {
        PointsService::new(Arc::new(logs), Arc::new(points))
    }

    /// Emulates the real repository: plan against the stored flags, apply,
    /// and add the delta to the given running total.
    fn toggled(
        log: AnalysisLog,
        task_index: i64,
        completed: bool,
        point_value: i64,
        current_total: i64,
    ) -> Result<(AnalysisLog, i64, i64), Error> {
        let plan = log.plan_task_toggle(task_index, completed, point_value)?;
        let updated = AnalysisLog {
            tasks_completed_status: plan.statuses,
            points_earned_for_analysis: plan.points_earned,
            ..log
        };
        Ok((updated, plan.points_delta, current_total + plan.points_delta))
    }

    #[tokio::test]
    async fn completing_an_open_task_awards_its_points() {
        let log_id = Uuid::new_v4();

        // The service hands the raw intent to the store; the delta is
        // derived there, from the row as stored.
        let mut logs = MockAnalysisLogRepository::new();
        logs.expect_apply_task_toggle()
            .withf(|_, user, task_index, completed, point_value| {
                user == "user_1" && *task_index == 0 && *completed && *point_value == 10
            })
            .times(1)
            .returning(|id, user, task_index, completed, point_value| {
                let log = make_log(id, user, vec![false, false], 0);
                toggled(log, task_index, completed, point_value, 0)
            });

        let service = service_with(logs, MockUserPointsRepository::new());
        let outcome = service
            .toggle_task("user_1", log_id, 0, true, 10)
            .await
            .unwrap();
        assert_eq!(outcome.points_delta, 10);
        assert_eq!(outcome.new_total_points, 10);
        assert_eq!(outcome.log.tasks_completed_status, vec![true, false]);
        assert_eq!(outcome.log.points_earned_for_analysis, 10);
    }

    #[tokio::test]
    async fn repeating_the_same_toggle_is_a_zero_delta() {
        let log_id = Uuid::new_v4();

        // Task 0 is already complete in the store; marking it complete again
        // must not move either total, no matter what the client believed.
        let mut logs = MockAnalysisLogRepository::new();
        logs.expect_apply_task_toggle()
            .times(1)
            .returning(|id, user, task_index, completed, point_value| {
                let log = make_log(id, user, vec![true], 10);
                toggled(log, task_index, completed, point_value, 10)
            });

        let service = service_with(logs, MockUserPointsRepository::new());
        let outcome = service
            .toggle_task("user_1", log_id, 0, true, 10)
            .await
            .unwrap();
        assert_eq!(outcome.points_delta, 0);
        assert_eq!(outcome.log.points_earned_for_analysis, 10);
        assert_eq!(outcome.new_total_points, 10);
    }

    #[tokio::test]
    async fn uncompleting_restores_the_pre_toggle_totals() {
        let log_id = Uuid::new_v4();

        // The task was completed earlier (+10); unchecking it must take the
        // log and the user total back to where they started.
        let mut logs = MockAnalysisLogRepository::new();
        logs.expect_apply_task_toggle()
            .times(1)
            .returning(|id, user, task_index, completed, point_value| {
                let log = make_log(id, user, vec![true], 10);
                toggled(log, task_index, completed, point_value, 10)
            });

        let service = service_with(logs, MockUserPointsRepository::new());
        let outcome = service
            .toggle_task("user_1", log_id, 0, false, 10)
            .await
            .unwrap();
        assert_eq!(outcome.points_delta, -10);
        assert_eq!(outcome.log.points_earned_for_analysis, 0);
        assert_eq!(outcome.new_total_points, 0);
    }

    #[tokio::test]
    async fn out_of_range_task_index_is_invalid() {
        let log_id = Uuid::new_v4();
        let mut logs = MockAnalysisLogRepository::new();
        logs.expect_apply_task_toggle()
            .times(1)
            .returning(|id, user, task_index, completed, point_value| {
                let log = make_log(id, user, vec![false, false], 0);
                toggled(log, task_index, completed, point_value, 0)
            });

        let service = service_with(logs, MockUserPointsRepository::new());

        let err = service
            .toggle_task("user_1", log_id, 2, true, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn toggling_someone_elses_log_is_not_found() {
        let log_id = Uuid::new_v4();

        // The combined (log_id, user_id) filter makes another user's log
        // look missing.
        let mut logs = MockAnalysisLogRepository::new();
        logs.expect_apply_task_toggle()
            .times(1)
            .returning(|id, _, _, _, _| Err(Error::NotFound(format!("log {} not found for user", id))));

        let service = service_with(logs, MockUserPointsRepository::new());

        let err = service
            .toggle_task("user_2", log_id, 0, true, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn total_points_defaults_to_zero_without_a_row() {
        let mut points = MockUserPointsRepository::new();
        points.expect_get_total().returning(|_| Ok(None));

        let service = service_with(MockAnalysisLogRepository::new(), points);
        assert_eq!(service.total_points("user_1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn leaderboard_merges_synthetic_entries_and_sorts_descending() {
        let mut points = MockUserPointsRepository::new();
        points.expect_top_n().returning(|_| {
            Ok(vec![
                UserPoints {
                    user_id: "user_abcdef".to_string(),
                    total_points: 500,
                    last_activity_at: Utc::now(),
                },
                UserPoints {
                    user_id: "user_zzz999".to_string(),
                    total_points: 50,
                    last_activity_at: Utc::now(),
                },
            ])
        });

        let service = service_with(MockAnalysisLogRepository::new(), points);
        let board = service.leaderboard("user_abcdef").await.unwrap();

        // 2 real users + 4 synthetic friends.
        assert_eq!(board.len(), 6);

        let mut sorted = board.clone();
        sorted.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        assert_eq!(
            board.iter().map(|e| &e.id).collect::<Vec<_>>(),
            sorted.iter().map(|e| &e.id).collect::<Vec<_>>()
        );

        let mut ids: Vec<&str> = board.iter().map(|e| e.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);

        assert_eq!(board[0].username, "You");
        assert_eq!(board[5].username, "User_user");
    }
}
