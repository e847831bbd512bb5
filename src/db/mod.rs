//! Database Module
//!
//! PostgreSQL 접근 계층. 모든 쿼리는 `Database`의 메서드이고,
//! 엔티티별로 파일을 나눠 `impl Database` 블록을 둔다.
//!
//! - 모든 쿼리는 `user_id` 조건을 포함한다 (다른 사용자 row는 "없는 것"으로 취급)
//! - 문장 단위 autocommit. 여러 문장을 묶는 트랜잭션은 쓰지 않는다
//! - 스키마는 `migrations/`에 있고 시작 시 `sqlx::migrate!`로 적용한다

mod dashboard;
mod habits;
mod models;
mod otp;
mod progress;
mod reminders;
mod repository;
mod schedules;
mod users;
mod yoga;

pub use habits::{HabitInput, HabitUpdate};
pub use models::*;
pub use progress::{MetricFilter, MetricUpdate};
pub use reminders::{ReminderInput, ReminderUpdate};
pub use repository::*;
pub use schedules::{ScheduleInput, ScheduleUpdate};
pub use yoga::{PosePopularity, SessionInput, YogaTotals};

use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10
    /// - min_connections: 1
    /// - acquire_timeout: 3초
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = Self::pool_options().connect(database_url).await?;
        Ok(Self { pool })
    }

    /// 첫 쿼리 시점에 연결하는 pool (DB 없이 라우터를 띄우는 테스트용)
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = Self::pool_options().connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    fn pool_options() -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// UNIQUE 제약 위반인지 (동시 요청으로 사전 확인을 통과한 경우)
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}
