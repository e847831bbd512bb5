//! Repository Traits
//!
//! 서비스 로직이 DB 없이 테스트되어야 하는 지점만 trait로 분리한다.
//!
//! - `HabitStore`: 완료 토글
//! - `MetricStore`: 지표 중복 거부
//! - `OtpStore`: OTP 발급/검증/정리
//!
//! PostgreSQL 구현은 `Database`에 있고 (habits.rs, progress.rs, otp.rs),
//! 테스트용 in-memory 구현은 아래 `mock` 모듈에 있다.
//! 나머지 CRUD는 `Database` 메서드를 직접 호출한다.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::models::ProgressMetric;
use crate::types::{MetricType, OtpChannel};

/// 새 지표 입력
#[derive(Debug, Clone)]
pub struct NewMetric {
    pub metric_type: MetricType,
    pub value: f64,
    pub target_value: Option<f64>,
    pub date: NaiveDate,
}

/// 습관 완료 기록 저장소
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// (habit, date) 완료 기록 id
    async fn find_completion(&self, habit_id: i64, date: NaiveDate) -> Result<Option<i64>>;

    async fn insert_completion(
        &self,
        habit_id: i64,
        user_id: i64,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<()>;

    async fn delete_completion(&self, completion_id: i64) -> Result<()>;
}

/// 진행 지표 저장소
#[async_trait]
pub trait MetricStore: Send + Sync {
    async fn metric_exists(
        &self,
        user_id: i64,
        metric_type: MetricType,
        date: NaiveDate,
    ) -> Result<bool>;

    async fn insert_metric(&self, user_id: i64, metric: &NewMetric) -> Result<ProgressMetric>;
}

/// OTP 코드 저장소
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn insert_otp(
        &self,
        user_id: i64,
        code: &str,
        channel: OtpChannel,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// 만료되지 않고 사용되지 않은 가장 최근 코드를 찾아 사용 처리.
    /// 일치하는 코드가 없으면 `false`.
    async fn consume_otp(
        &self,
        user_id: i64,
        code: &str,
        channel: OtpChannel,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// 만료되었거나 사용된 코드 삭제. 삭제된 개수 반환
    async fn purge_otps(&self, now: DateTime<Utc>) -> Result<u64>;
}
