//! Yoga session queries

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use super::{Database, YogaSession};

const SESSION_COLUMNS: &str = "id, user_id, pose_name, duration_minutes, notes, completed_at";

#[derive(Debug, Clone)]
pub struct SessionInput {
    pub pose_name: String,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

/// 세션 합계 (주간 = 최근 7일, 월간 = 최근 30일)
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YogaTotals {
    pub total_sessions: i64,
    pub total_duration: i64,
    pub weekly_sessions: i64,
    pub monthly_sessions: i64,
    pub average_duration: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PosePopularity {
    pub pose_name: String,
    pub count: i64,
}

impl Database {
    /// 세션 목록 (최근 순). 날짜는 UTC 기준 완료일
    pub async fn list_yoga_sessions(
        &self,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<YogaSession>> {
        let sessions = sqlx::query_as::<_, YogaSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM yoga_sessions
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR (completed_at AT TIME ZONE 'UTC')::DATE >= $2)
              AND ($3::DATE IS NULL OR (completed_at AT TIME ZONE 'UTC')::DATE <= $3)
            ORDER BY completed_at DESC
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    pub async fn create_yoga_session(
        &self,
        user_id: i64,
        input: &SessionInput,
    ) -> Result<YogaSession> {
        let session = sqlx::query_as::<_, YogaSession>(&format!(
            r#"
            INSERT INTO yoga_sessions (user_id, pose_name, duration_minutes, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&input.pose_name)
        .bind(input.duration_minutes)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn yoga_totals(
        &self,
        user_id: i64,
        week_start: NaiveDate,
        month_start: NaiveDate,
    ) -> Result<YogaTotals> {
        let totals = sqlx::query_as::<_, YogaTotals>(
            r#"
            SELECT
                COUNT(*) AS total_sessions,
                COALESCE(SUM(duration_minutes), 0)::BIGINT AS total_duration,
                COUNT(*) FILTER (
                    WHERE (completed_at AT TIME ZONE 'UTC')::DATE >= $2
                ) AS weekly_sessions,
                COUNT(*) FILTER (
                    WHERE (completed_at AT TIME ZONE 'UTC')::DATE >= $3
                ) AS monthly_sessions,
                COALESCE(ROUND(AVG(duration_minutes)), 0)::BIGINT AS average_duration
            FROM yoga_sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(week_start)
        .bind(month_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    /// 가장 많이 한 자세 N개
    pub async fn popular_poses(&self, user_id: i64, limit: i64) -> Result<Vec<PosePopularity>> {
        let poses = sqlx::query_as::<_, PosePopularity>(
            r#"
            SELECT pose_name, COUNT(*) AS count
            FROM yoga_sessions
            WHERE user_id = $1
            GROUP BY pose_name
            ORDER BY count DESC, pose_name
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(poses)
    }
}
