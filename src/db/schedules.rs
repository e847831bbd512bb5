//! Schedule queries

use anyhow::Result;
use chrono::NaiveTime;

use super::{Database, Schedule};
use crate::types::ActivityType;

const SCHEDULE_COLUMNS: &str = "id, user_id, activity_name, activity_type, start_time, end_time, \
                                days_of_week, is_active, created_at";

#[derive(Debug, Clone)]
pub struct ScheduleInput {
    pub activity_name: String,
    pub activity_type: ActivityType,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub days_of_week: Vec<i16>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleUpdate {
    pub activity_name: Option<String>,
    pub activity_type: Option<ActivityType>,
    pub start_time: Option<NaiveTime>,
    /// `Some(None)`이면 종료 시각 삭제
    pub end_time: Option<Option<NaiveTime>>,
    pub days_of_week: Option<Vec<i16>>,
    pub is_active: Option<bool>,
}

impl Database {
    /// 전체 일정 (시작 시각 순)
    pub async fn list_schedules(&self, user_id: i64) -> Result<Vec<Schedule>> {
        let schedules = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE user_id = $1 ORDER BY start_time"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules)
    }

    pub async fn create_schedule(&self, user_id: i64, input: &ScheduleInput) -> Result<Schedule> {
        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            r#"
            INSERT INTO schedules
                (user_id, activity_name, activity_type, start_time, end_time, days_of_week)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&input.activity_name)
        .bind(input.activity_type.as_str())
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.days_of_week)
        .fetch_one(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn update_schedule(
        &self,
        schedule_id: i64,
        user_id: i64,
        update: &ScheduleUpdate,
    ) -> Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            r#"
            UPDATE schedules
            SET activity_name = COALESCE($3, activity_name),
                activity_type = COALESCE($4, activity_type),
                start_time = COALESCE($5, start_time),
                end_time = CASE WHEN $9 THEN $6 ELSE end_time END,
                days_of_week = COALESCE($7, days_of_week),
                is_active = COALESCE($8, is_active)
            WHERE id = $1 AND user_id = $2
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(schedule_id)
        .bind(user_id)
        .bind(&update.activity_name)
        .bind(update.activity_type.map(|t| t.as_str()))
        .bind(update.start_time)
        .bind(update.end_time.flatten())
        .bind(&update.days_of_week)
        .bind(update.is_active)
        .bind(update.end_time.is_some())
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn delete_schedule(&self, schedule_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1 AND user_id = $2")
            .bind(schedule_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
