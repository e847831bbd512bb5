//! Wellness & Habit Tracker API Library
//!
//! # Overview
//!
//! 습관 추적, 진행 지표, 리마인더, 일과 일정, 요가 기록을 위한 REST/JSON 백엔드.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          API                             │
//! │                                                          │
//! │  ┌─────────┐  ┌──────────┐  ┌─────────┐  ┌─────────┐     │
//! │  │ Routes  │─▶│ Services │─▶│   DB    │  │  Types  │     │
//! │  └─────────┘  └────┬─────┘  └────┬────┘  └─────────┘     │
//! │                    │             │                       │
//! └────────────────────┼─────────────┼───────────────────────┘
//!                      ▼             ▼
//!            Email API / Twilio   PostgreSQL
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 HTTP 응답 매핑
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 비즈니스 로직 (analytics, auth, OTP, planner)
//! - `db`: 데이터베이스 연동
//! - `types`: 공통 타입 및 요청 검증
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wellness_api::{config::Config, db::Database, routes, AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::connect(&config.database_url).await?;
//!     let app = routes::create_router(AppState::new(config, db)?);
//!
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::ApiError;
pub use services::{AuthService, Notifier, OtpService};

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<AuthService>,
    pub otp: Arc<OtpService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// 설정과 DB 연결로 서비스 구성
    pub fn new(config: Config, db: Database) -> anyhow::Result<Self> {
        let db = Arc::new(db);
        let auth = AuthService::new(&config.jwt_secret, config.jwt_ttl)?;
        let notifier = Notifier::new(config.email.clone(), config.sms.clone(), config.otp.ttl);
        let otp = OtpService::new(db.clone(), Arc::new(notifier), config.otp.ttl);

        Ok(Self {
            db,
            auth: Arc::new(auth),
            otp: Arc::new(otp),
            config: Arc::new(config),
        })
    }
}
