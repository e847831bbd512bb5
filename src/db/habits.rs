//! Habit / completion queries

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use super::{Completion, Database, Habit, HabitStore, HabitWithStatus};
use crate::types::Frequency;

/// 습관 생성 입력 (검증 완료)
#[derive(Debug, Clone)]
pub struct HabitInput {
    pub name: String,
    pub icon: Option<String>,
    pub frequency: Frequency,
    pub reminder_time: Option<NaiveTime>,
}

/// 습관 수정 입력. `None`인 필드는 그대로 둔다
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub frequency: Option<Frequency>,
    /// `Some(None)`이면 알림 시각 삭제
    pub reminder_time: Option<Option<NaiveTime>>,
    pub is_active: Option<bool>,
}

impl Database {
    /// 활성 습관 + 해당 날짜 완료 여부 (최근 생성 순)
    pub async fn list_habits_with_status(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<Vec<HabitWithStatus>> {
        let habits = sqlx::query_as::<_, HabitWithStatus>(
            r#"
            SELECT
                h.id, h.user_id, h.name, h.icon, h.frequency,
                h.reminder_time, h.is_active, h.created_at,
                EXISTS (
                    SELECT 1 FROM habit_completions c
                    WHERE c.habit_id = h.id AND c.completed_date = $2
                ) AS completed_today
            FROM habits h
            WHERE h.user_id = $1 AND h.is_active = TRUE
            ORDER BY h.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(habits)
    }

    /// 사용자 소유 습관 조회 (다른 사용자 습관이면 None)
    pub async fn find_habit(&self, habit_id: i64, user_id: i64) -> Result<Option<Habit>> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, icon, frequency, reminder_time, is_active, created_at
            FROM habits
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(habit_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(habit)
    }

    pub async fn create_habit(&self, user_id: i64, input: &HabitInput) -> Result<Habit> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (user_id, name, icon, frequency, reminder_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, icon, frequency, reminder_time, is_active, created_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.icon)
        .bind(input.frequency.as_str())
        .bind(input.reminder_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(habit)
    }

    pub async fn update_habit(
        &self,
        habit_id: i64,
        user_id: i64,
        update: &HabitUpdate,
    ) -> Result<Option<Habit>> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            UPDATE habits
            SET name = COALESCE($3, name),
                icon = COALESCE($4, icon),
                frequency = COALESCE($5, frequency),
                reminder_time = CASE WHEN $8 THEN $6 ELSE reminder_time END,
                is_active = COALESCE($7, is_active)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, icon, frequency, reminder_time, is_active, created_at
            "#,
        )
        .bind(habit_id)
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.icon)
        .bind(update.frequency.map(|f| f.as_str()))
        .bind(update.reminder_time.flatten())
        .bind(update.is_active)
        .bind(update.reminder_time.is_some())
        .fetch_optional(&self.pool)
        .await?;

        Ok(habit)
    }

    /// 삭제되면 true. 완료 기록은 FK cascade로 함께 삭제된다
    pub async fn delete_habit(&self, habit_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
            .bind(habit_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============ Completions ============

    /// 완료 날짜 목록 (습관 하나 또는 사용자 전체)
    pub async fn completion_dates(
        &self,
        user_id: i64,
        habit_id: Option<i64>,
    ) -> Result<Vec<NaiveDate>> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            r#"
            SELECT completed_date
            FROM habit_completions
            WHERE user_id = $1 AND ($2::BIGINT IS NULL OR habit_id = $2)
            ORDER BY completed_date DESC
            "#,
        )
        .bind(user_id)
        .bind(habit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(date,)| date).collect())
    }

    /// 기간 내 완료 날짜 (완료 1건당 1개)
    pub async fn completion_dates_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            r#"
            SELECT completed_date
            FROM habit_completions
            WHERE user_id = $1 AND completed_date BETWEEN $2 AND $3
            ORDER BY completed_date
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(date,)| date).collect())
    }

    /// 습관 완료 이력 (최근 순, 선택적 날짜 범위)
    pub async fn completion_history(
        &self,
        habit_id: i64,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Completion>> {
        let completions = sqlx::query_as::<_, Completion>(
            r#"
            SELECT id, habit_id, user_id, completed_date, notes, completed_at
            FROM habit_completions
            WHERE habit_id = $1 AND user_id = $2
              AND ($3::DATE IS NULL OR completed_date >= $3)
              AND ($4::DATE IS NULL OR completed_date <= $4)
            ORDER BY completed_date DESC
            "#,
        )
        .bind(habit_id)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(completions)
    }
}

#[async_trait]
impl HabitStore for Database {
    async fn find_completion(&self, habit_id: i64, date: NaiveDate) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM habit_completions WHERE habit_id = $1 AND completed_date = $2",
        )
        .bind(habit_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    async fn insert_completion(
        &self,
        habit_id: i64,
        user_id: i64,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO habit_completions (habit_id, user_id, completed_date, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (habit_id, completed_date) DO NOTHING
            "#,
        )
        .bind(habit_id)
        .bind(user_id)
        .bind(date)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_completion(&self, completion_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM habit_completions WHERE id = $1")
            .bind(completion_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
