//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `analytics`: streak, 기간별 집계, wellness score (순수 함수)
//! - `AuthService`: 비밀번호 해시, JWT 발급/검증
//! - `OtpService` / `OtpSweeper`: OTP 발급/검증과 주기적 정리
//! - `Notifier`: Email / SMS 발송
//! - `planner`: 리마인더/일정 요일 계산, 타임라인
//! - `tracking`: 습관 완료 토글, 지표 기록
//! - `yoga`: 정적 요가 카탈로그

pub mod analytics;
pub mod planner;
pub mod tracking;
pub mod yoga;

mod auth;
mod notifier;
mod otp;

pub use auth::{AuthService, SessionClaims, MIN_SECRET_BYTES};
pub use notifier::{Notifier, OtpDelivery};
pub use otp::{generate_code, sweep_once, OtpService, OtpSweeper};
