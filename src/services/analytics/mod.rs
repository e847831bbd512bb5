//! Analytics
//!
//! 요청마다 이미 조회된 row를 다시 훑어 계산하는 순수 함수들.
//! 상태나 캐시는 없다.

pub mod rollup;
pub mod streak;
pub mod wellness;

pub use rollup::{completion_percentage, count_in_window, Window};
pub use streak::{current_streak, longest_streak, streak_runs, StreakRun};
pub use wellness::{analyze, score_from_analytics, summarize, wellness_score, MetricSample};
