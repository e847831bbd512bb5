//! Database Models
//!
//! Row types returned by the queries in this module. Enum-like columns
//! (`frequency`, `metric_type`, `activity_type`) are stored as VARCHAR and
//! kept as `String` here; request parsing goes through `crate::types`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// 사용자 계정
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,

    /// Argon2id PHC 문자열. 응답에는 절대 포함하지 않음
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub avatar: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// 습관
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub icon: Option<String>,
    /// daily / weekly / monthly
    pub frequency: String,
    pub reminder_time: Option<NaiveTime>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// 오늘 완료 여부가 붙은 습관 (목록/대시보드)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HabitWithStatus {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub habit: Habit,
    pub completed_today: bool,
}

/// 습관 완료 기록. (habit_id, completed_date)당 최대 1개
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Completion {
    pub id: i64,
    pub habit_id: i64,
    pub user_id: i64,
    pub completed_date: NaiveDate,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// 진행 지표. (user_id, metric_type, date)당 최대 1개
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressMetric {
    pub id: i64,
    pub user_id: i64,
    pub metric_type: String,
    pub value: f64,
    pub target_value: Option<f64>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// 리마인더
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reminder {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub reminder_time: NaiveTime,
    /// 0 = Sunday ... 6 = Saturday. 비어 있으면 매일
    pub days_of_week: Vec<i16>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// 일과 일정
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Schedule {
    pub id: i64,
    pub user_id: i64,
    pub activity_name: String,
    pub activity_type: String,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub days_of_week: Vec<i16>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// 요가 세션 기록
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct YogaSession {
    pub id: i64,
    pub user_id: i64,
    pub pose_name: String,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// 획득한 배지
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EarnedBadge {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quote {
    pub id: i64,
    pub quote: String,
    pub author: Option<String>,
}
