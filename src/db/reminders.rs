//! Reminder queries

use anyhow::Result;
use chrono::NaiveTime;

use super::{Database, Reminder};

const REMINDER_COLUMNS: &str =
    "id, user_id, title, description, reminder_time, days_of_week, is_active, created_at";

#[derive(Debug, Clone)]
pub struct ReminderInput {
    pub title: String,
    pub description: Option<String>,
    pub reminder_time: NaiveTime,
    pub days_of_week: Vec<i16>,
}

#[derive(Debug, Clone, Default)]
pub struct ReminderUpdate {
    pub title: Option<String>,
    /// `Some(None)`이면 설명 삭제
    pub description: Option<Option<String>>,
    pub reminder_time: Option<NaiveTime>,
    pub days_of_week: Option<Vec<i16>>,
    pub is_active: Option<bool>,
}

impl Database {
    /// 전체 리마인더 (시각 순)
    pub async fn list_reminders(&self, user_id: i64) -> Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE user_id = $1 ORDER BY reminder_time"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    /// 활성 리마인더 (시각 순). 요일 필터링은 `services::planner`에서
    pub async fn active_reminders(&self, user_id: i64) -> Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            SELECT {REMINDER_COLUMNS}
            FROM reminders
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY reminder_time
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    pub async fn create_reminder(&self, user_id: i64, input: &ReminderInput) -> Result<Reminder> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            INSERT INTO reminders (user_id, title, description, reminder_time, days_of_week)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REMINDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.reminder_time)
        .bind(&input.days_of_week)
        .fetch_one(&self.pool)
        .await?;

        Ok(reminder)
    }

    pub async fn update_reminder(
        &self,
        reminder_id: i64,
        user_id: i64,
        update: &ReminderUpdate,
    ) -> Result<Option<Reminder>> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            UPDATE reminders
            SET title = COALESCE($3, title),
                description = CASE WHEN $8 THEN $4 ELSE description END,
                reminder_time = COALESCE($5, reminder_time),
                days_of_week = COALESCE($6, days_of_week),
                is_active = COALESCE($7, is_active)
            WHERE id = $1 AND user_id = $2
            RETURNING {REMINDER_COLUMNS}
            "#
        ))
        .bind(reminder_id)
        .bind(user_id)
        .bind(&update.title)
        .bind(update.description.as_ref().and_then(|d| d.as_deref()))
        .bind(update.reminder_time)
        .bind(&update.days_of_week)
        .bind(update.is_active)
        .bind(update.description.is_some())
        .fetch_optional(&self.pool)
        .await?;

        Ok(reminder)
    }

    /// 활성 상태 반전. 새 상태 반환 (없으면 None)
    pub async fn toggle_reminder(&self, reminder_id: i64, user_id: i64) -> Result<Option<bool>> {
        let row: Option<(bool,)> = sqlx::query_as(
            r#"
            UPDATE reminders SET is_active = NOT is_active
            WHERE id = $1 AND user_id = $2
            RETURNING is_active
            "#,
        )
        .bind(reminder_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(active,)| active))
    }

    pub async fn delete_reminder(&self, reminder_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(reminder_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
