//! Dashboard Endpoints
//!
//! 홈 화면용 집계: 오늘 현황, 주간/월간 완료 그리드, streak 정보.
//! 모든 계산은 조회한 완료 날짜 목록 위에서 `services::analytics`로 수행한다.

use axum::{extract::State, Json};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{
    extract::{AppQuery, AuthUser},
    optional_date, today_utc,
};
use crate::{
    db::{EarnedBadge, HabitWithStatus, ProgressMetric, Quote},
    error::ApiError,
    services::analytics::{
        self,
        rollup::{self, DayProgress, MonthDayProgress, MonthlyStats},
        StreakRun, Window,
    },
    types::FieldErrors,
    AppState,
};

/// 대시보드에 표시할 최근 지표 수
const RECENT_METRIC_LIMIT: i64 = 7;
/// streak 이력 최대 개수
const STREAK_HISTORY_LIMIT: usize = 10;
/// 주간 진행 조회 최대 일 수
const MAX_RANGE_DAYS: i64 = 366;

// ============ Request/Response Types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub current_streak: u32,
    pub today_completions: u32,
    pub weekly_completions: u32,
    pub monthly_completions: u32,
    pub total_habits: u32,
    pub completed_habits: u32,
    pub completion_percentage: u32,
}

impl DashboardStats {
    pub fn compute(habits: &[HabitWithStatus], dates: &[NaiveDate], today: NaiveDate) -> Self {
        let total_habits = habits.len() as u32;
        let completed_habits = habits.iter().filter(|h| h.completed_today).count() as u32;

        Self {
            current_streak: analytics::current_streak(dates),
            today_completions: analytics::count_in_window(dates, Window::Today, today),
            weekly_completions: analytics::count_in_window(dates, Window::Week, today),
            monthly_completions: analytics::count_in_window(dates, Window::Month, today),
            total_habits,
            completed_habits,
            completion_percentage: analytics::completion_percentage(completed_habits, total_habits),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub quote: Option<Quote>,
    pub habits: Vec<HabitWithStatus>,
    pub stats: DashboardStats,
    pub badges: Vec<EarnedBadge>,
    pub recent_metrics: Vec<ProgressMetric>,
}

/// 그리드에 함께 내려주는 습관 요약
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
}

fn summarize_habits(habits: Vec<HabitWithStatus>) -> Vec<HabitSummary> {
    habits
        .into_iter()
        .map(|h| HabitSummary {
            id: h.habit.id,
            name: h.habit.name,
            icon: h.habit.icon,
        })
        .collect()
}

/// 주간 진행 범위. 둘 다 있어야 적용되고, 아니면 이번 주 (일-토)
#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl WeekQuery {
    pub fn validate(self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), FieldErrors> {
        let mut errors = FieldErrors::default();
        let start = optional_date("start_date", self.start_date, "Invalid start date", &mut errors);
        let end = optional_date("end_date", self.end_date, "Invalid end date", &mut errors);

        let range = match (start, end) {
            (Some(start), Some(end)) => {
                let days = (end - start).num_days();
                if days < 0 {
                    errors.push("end_date", "End date must not be before start date");
                } else if days >= MAX_RANGE_DAYS {
                    errors.push("end_date", "Date range must not exceed 366 days");
                }
                (start, end)
            }
            _ => rollup::current_week_bounds(today),
        };

        errors.finish(range)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgressResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub habits: Vec<HabitSummary>,
    pub weekly_data: Vec<DayProgress>,
}

/// 월간 진행 (기본: 이번 달)
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProgressResponse {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub habits: Vec<HabitSummary>,
    pub monthly_data: Vec<MonthDayProgress>,
    pub stats: MonthlyStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResponse {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_history: Vec<StreakRun>,
}

impl StreakResponse {
    pub fn from_dates(dates: &[NaiveDate]) -> Self {
        let mut streak_history = analytics::streak_runs(dates);
        streak_history.truncate(STREAK_HISTORY_LIMIT);

        Self {
            current_streak: analytics::current_streak(dates),
            longest_streak: analytics::longest_streak(dates),
            streak_history,
        }
    }
}

// ============ Handlers ============

/// GET /api/dashboard
pub async fn overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let today = today_utc();

    let quote = state.db.random_quote().await?;
    let habits = state.db.list_habits_with_status(user.id(), today).await?;
    let dates = state.db.completion_dates(user.id(), None).await?;
    let badges = state.db.earned_badges(user.id()).await?;
    let recent_metrics = state
        .db
        .recent_metrics(user.id(), RECENT_METRIC_LIMIT)
        .await?;

    let stats = DashboardStats::compute(&habits, &dates, today);

    Ok(Json(DashboardResponse {
        quote,
        habits,
        stats,
        badges,
        recent_metrics,
    }))
}

/// GET /api/dashboard/weekly-progress?start_date=&end_date=
pub async fn weekly_progress(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<WeekQuery>,
) -> Result<Json<WeeklyProgressResponse>, ApiError> {
    let today = today_utc();
    let (start_date, end_date) = query.validate(today)?;

    let habits = state.db.list_habits_with_status(user.id(), today).await?;
    let dates = state
        .db
        .completion_dates_between(user.id(), start_date, end_date)
        .await?;

    let weekly_data = rollup::weekly_progress(start_date, end_date, &dates, habits.len() as u32);

    Ok(Json(WeeklyProgressResponse {
        start_date,
        end_date,
        habits: summarize_habits(habits),
        weekly_data,
    }))
}

/// GET /api/dashboard/monthly-progress?year=&month=
pub async fn monthly_progress(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<MonthQuery>,
) -> Result<Json<MonthlyProgressResponse>, ApiError> {
    let today = today_utc();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let invalid = || ApiError::validation("month", "Invalid year or month");
    let days = rollup::days_in_month(year, month).ok_or_else(invalid)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = NaiveDate::from_ymd_opt(year, month, days).ok_or_else(invalid)?;

    let habits = state.db.list_habits_with_status(user.id(), today).await?;
    let dates = state
        .db
        .completion_dates_between(user.id(), first, last)
        .await?;

    let progress =
        rollup::monthly_progress(year, month, &dates, habits.len() as u32).ok_or_else(invalid)?;

    Ok(Json(MonthlyProgressResponse {
        year: progress.year,
        month: progress.month,
        month_name: progress.month_name,
        habits: summarize_habits(habits),
        monthly_data: progress.monthly_data,
        stats: progress.stats,
    }))
}

/// GET /api/dashboard/streaks
///
/// 사용자 전체 완료 기록 기준 (습관 구분 없음)
pub async fn streaks(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<StreakResponse>, ApiError> {
    let dates = state.db.completion_dates(user.id(), None).await?;
    Ok(Json(StreakResponse::from_dates(&dates)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::db::Habit;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn habit(id: i64, completed_today: bool) -> HabitWithStatus {
        HabitWithStatus {
            habit: Habit {
                id,
                user_id: 1,
                name: format!("habit {}", id),
                icon: None,
                frequency: "daily".to_string(),
                reminder_time: None,
                is_active: true,
                created_at: Utc::now(),
            },
            completed_today,
        }
    }

    #[test]
    fn test_dashboard_stats() {
        // 2024-04-10 is a Wednesday
        let habits = vec![habit(1, true), habit(2, false), habit(3, true)];
        let dates = vec![day(10), day(10), day(9), day(8), day(2)];
        let stats = DashboardStats::compute(&habits, &dates, day(10));

        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.today_completions, 2);
        assert_eq!(stats.weekly_completions, 4);
        assert_eq!(stats.monthly_completions, 5);
        assert_eq!(stats.total_habits, 3);
        assert_eq!(stats.completed_habits, 2);
        assert_eq!(stats.completion_percentage, 67);
    }

    #[test]
    fn test_dashboard_stats_without_habits() {
        let stats = DashboardStats::compute(&[], &[], day(10));
        assert_eq!(stats.completion_percentage, 0);
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn test_week_query_defaults_to_current_week() {
        let (start, end) = WeekQuery::default().validate(day(10)).unwrap();
        assert_eq!(start, day(7));
        assert_eq!(end, day(13));

        // 한쪽만 주면 무시
        let query = WeekQuery {
            start_date: Some("2024-04-01".to_string()),
            end_date: None,
        };
        assert_eq!(query.validate(day(10)).unwrap(), (day(7), day(13)));
    }

    #[test]
    fn test_week_query_rejects_reversed_range() {
        let query = WeekQuery {
            start_date: Some("2024-04-05".to_string()),
            end_date: Some("2024-04-01".to_string()),
        };
        assert!(query.validate(day(10)).is_err());

        let query = WeekQuery {
            start_date: Some("2024-04-01".to_string()),
            end_date: Some("2024-04-03".to_string()),
        };
        assert_eq!(query.validate(day(10)).unwrap(), (day(1), day(3)));
    }

    #[test]
    fn test_streak_history_is_capped() {
        // 격일 완료 → 길이 1인 streak 12개
        let dates: Vec<NaiveDate> = (0..12).map(|i| day(1) + chrono::Duration::days(i * 2)).collect();
        let response = StreakResponse::from_dates(&dates);

        assert_eq!(response.streak_history.len(), STREAK_HISTORY_LIMIT);
        assert_eq!(response.longest_streak, 1);
        assert_eq!(response.current_streak, 1);
    }
}
