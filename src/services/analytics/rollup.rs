//! Periodic Rollups
//!
//! 오늘 / 이번 ISO 주 / 이번 달 단위 완료 횟수와 주간·월간 진행 그리드.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// 집계 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// 날짜 일치
    Today,
    /// 같은 ISO 연도 + ISO 주 번호
    Week,
    /// 같은 연도 + 월
    Month,
}

impl Window {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Window::Today => date == today,
            Window::Week => date.iso_week() == today.iso_week(),
            Window::Month => date.year() == today.year() && date.month() == today.month(),
        }
    }
}

/// 구간 안에 있는 날짜 수
pub fn count_in_window(dates: &[NaiveDate], window: Window, today: NaiveDate) -> u32 {
    dates.iter().filter(|d| window.contains(**d, today)).count() as u32
}

/// `round(completed / total * 100)`, total이 0이면 0
pub fn completion_percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(completed) / f64::from(total) * 100.0).round() as u32
}

// ============ Weekly / Monthly Grid ============

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    pub date: NaiveDate,
    pub day_name: String,
    pub completions: u32,
    pub total_habits: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDayProgress {
    pub day: u32,
    pub date: NaiveDate,
    pub completions: u32,
    pub total_habits: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_completions: u32,
    pub total_possible: u32,
    pub monthly_percentage: u32,
    pub average_daily_completions: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProgress {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub monthly_data: Vec<MonthDayProgress>,
    pub stats: MonthlyStats,
}

/// `today`가 속한 일요일-토요일 주
pub fn current_week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    (start, start + Duration::days(6))
}

fn completions_on(completion_dates: &[NaiveDate], date: NaiveDate) -> u32 {
    completion_dates.iter().filter(|d| **d == date).count() as u32
}

/// `start..=end` 날짜별 완료 수
pub fn weekly_progress(
    start: NaiveDate,
    end: NaiveDate,
    completion_dates: &[NaiveDate],
    total_habits: u32,
) -> Vec<DayProgress> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let completions = completions_on(completion_dates, date);
            DayProgress {
                date,
                day_name: date.format("%a").to_string(),
                completions,
                total_habits,
                percentage: completion_percentage(completions, total_habits),
            }
        })
        .collect()
}

/// 해당 월의 일수 (잘못된 연/월이면 None)
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// 월간 달력 그리드와 통계
pub fn monthly_progress(
    year: i32,
    month: u32,
    completion_dates: &[NaiveDate],
    total_habits: u32,
) -> Option<MonthlyProgress> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = days_in_month(year, month)?;

    let monthly_data: Vec<MonthDayProgress> = first
        .iter_days()
        .take(days as usize)
        .map(|date| {
            let completions = completions_on(completion_dates, date);
            MonthDayProgress {
                day: date.day(),
                date,
                completions,
                total_habits,
                percentage: completion_percentage(completions, total_habits),
            }
        })
        .collect();

    let total_completions = completion_dates
        .iter()
        .filter(|d| d.year() == year && d.month() == month)
        .count() as u32;
    let total_possible = total_habits * days;

    Some(MonthlyProgress {
        year,
        month,
        month_name: first.format("%B").to_string(),
        monthly_data,
        stats: MonthlyStats {
            total_completions,
            total_possible,
            monthly_percentage: completion_percentage(total_completions, total_possible),
            average_daily_completions: (f64::from(total_completions) / f64::from(days)).round()
                as u32,
        },
    })
}
