//! Wellness Score
//!
//! 네 가지 지표 평균을 고정 목표값 대비 0-100 점수로 환산하고 가중 평균한다.
//!
//! | metric | target | weight |
//! |---|---|---|
//! | water_intake | 8 / day | 0.25 |
//! | sleep_hours | 7-9 h band | 0.30 |
//! | exercise_minutes | 30 / day | 0.25 |
//! | meditation_minutes | 10 / day | 0.20 |
//!
//! 기록된 지표의 가중치만 합산해 나누므로 (renormalization) 일부 지표만
//! 기록한 사용자가 불이익을 받지 않는다.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::MetricType;

impl MetricType {
    /// 점수 가중치
    pub fn weight(&self) -> f64 {
        match self {
            MetricType::WaterIntake => 0.25,
            MetricType::SleepHours => 0.30,
            MetricType::ExerciseMinutes => 0.25,
            MetricType::MeditationMinutes => 0.20,
        }
    }

    /// 평균값 → 0-100 점수
    pub fn sub_score(&self, average: f64) -> f64 {
        match self {
            MetricType::WaterIntake => (average / 8.0).min(1.0) * 100.0,
            MetricType::SleepHours => sleep_band_score(average),
            MetricType::ExerciseMinutes => (average / 30.0).min(1.0) * 100.0,
            MetricType::MeditationMinutes => (average / 10.0).min(1.0) * 100.0,
        }
    }
}

fn sleep_band_score(hours: f64) -> f64 {
    if (7.0..=9.0).contains(&hours) {
        100.0
    } else if (6.0..=10.0).contains(&hours) {
        80.0
    } else if (5.0..=11.0).contains(&hours) {
        60.0
    } else {
        40.0
    }
}

/// 지표별 평균으로 종합 점수 계산
///
/// 평균이 0 이하인 지표는 기록이 없는 것으로 본다.
pub fn wellness_score<I>(averages: I) -> u32
where
    I: IntoIterator<Item = (MetricType, f64)>,
{
    let (weighted, total_weight) = averages
        .into_iter()
        .filter(|(_, avg)| *avg > 0.0)
        .fold((0.0, 0.0), |(score, weight), (metric, avg)| {
            (
                score + metric.sub_score(avg) * metric.weight(),
                weight + metric.weight(),
            )
        });

    if total_weight > 0.0 {
        (weighted / total_weight).round() as u32
    } else {
        0
    }
}

// ============ Analytics / Summary ============

/// 지표 기록 하나 (DB row에서 필요한 부분만)
#[derive(Debug, Clone, Copy)]
pub struct MetricSample {
    pub metric_type: MetricType,
    pub date: NaiveDate,
    pub value: f64,
    pub target: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub target: Option<f64>,
}

/// 기간 내 지표 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricAnalytics {
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub count: u32,
    pub data: Vec<DataPoint>,
}

/// 합계 / 평균 / 개수
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub total: f64,
    pub average: f64,
    pub count: u32,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 모든 지표 종류에 대한 통계 (기록이 없으면 0으로 채움)
pub fn analyze(samples: &[MetricSample]) -> BTreeMap<MetricType, MetricAnalytics> {
    MetricType::ALL
        .iter()
        .map(|metric| {
            let of_type: Vec<&MetricSample> =
                samples.iter().filter(|s| s.metric_type == *metric).collect();

            let analytics = if of_type.is_empty() {
                MetricAnalytics::default()
            } else {
                let total: f64 = of_type.iter().map(|s| s.value).sum();
                MetricAnalytics {
                    total,
                    average: round2(total / of_type.len() as f64),
                    max: of_type.iter().map(|s| s.value).fold(f64::MIN, f64::max),
                    min: of_type.iter().map(|s| s.value).fold(f64::MAX, f64::min),
                    count: of_type.len() as u32,
                    data: of_type
                        .iter()
                        .map(|s| DataPoint {
                            date: s.date,
                            value: s.value,
                            target: s.target,
                        })
                        .collect(),
                }
            };

            (*metric, analytics)
        })
        .collect()
}

/// 통계 결과로 종합 점수 계산
pub fn score_from_analytics(analytics: &BTreeMap<MetricType, MetricAnalytics>) -> u32 {
    wellness_score(analytics.iter().map(|(metric, a)| (*metric, a.average)))
}

/// 지표 종류별 합계/평균
pub fn summarize(samples: &[MetricSample]) -> BTreeMap<MetricType, MetricSummary> {
    let mut summary: BTreeMap<MetricType, MetricSummary> = MetricType::ALL
        .iter()
        .map(|metric| (*metric, MetricSummary::default()))
        .collect();

    for sample in samples {
        if let Some(entry) = summary.get_mut(&sample.metric_type) {
            entry.total += sample.value;
            entry.count += 1;
        }
    }

    for entry in summary.values_mut() {
        if entry.count > 0 {
            entry.average = round2(entry.total / f64::from(entry.count));
        }
    }

    summary
}
