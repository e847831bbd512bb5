//! Streak Calculation
//!
//! 완료 날짜 목록에서 연속된 날짜 구간(run)을 계산한다.
//!
//! # Design Decision
//!
//! 가장 최근 완료일이 오늘/어제가 아니어도 그 날부터 거꾸로 센다.
//! 몇 달 전에 멈춘 사용자도 0이 아닌 streak을 가질 수 있다 (기존 동작 유지).

use chrono::NaiveDate;
use serde::Serialize;

/// 연속 구간 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRun {
    pub streak_length: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// 내림차순 정렬 + 중복 제거
fn sorted_desc(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();
    sorted
}

/// 가장 최근 완료일부터 끊김 없이 이어진 날 수
///
/// 입력 순서와 무관하며, 같은 날짜가 여러 번 있어도 하루로 센다.
pub fn current_streak(dates: &[NaiveDate]) -> u32 {
    let sorted = sorted_desc(dates);
    let Some(first) = sorted.first() else {
        return 0;
    };

    let mut streak = 1;
    let mut previous = *first;
    for date in sorted.iter().skip(1) {
        if previous.pred_opt() != Some(*date) {
            break;
        }
        streak += 1;
        previous = *date;
    }
    streak
}

/// 모든 연속 구간 (최근 구간이 먼저)
pub fn streak_runs(dates: &[NaiveDate]) -> Vec<StreakRun> {
    let mut runs: Vec<StreakRun> = Vec::new();

    for date in sorted_desc(dates) {
        match runs.last_mut() {
            Some(run) if run.start_date.pred_opt() == Some(date) => {
                run.start_date = date;
                run.streak_length += 1;
            }
            _ => runs.push(StreakRun {
                streak_length: 1,
                start_date: date,
                end_date: date,
            }),
        }
    }

    runs
}

/// 가장 긴 연속 구간 길이
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    streak_runs(dates)
        .iter()
        .map(|run| run.streak_length)
        .max()
        .unwrap_or(0)
}
