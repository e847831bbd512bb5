//! Progress Metric Endpoints
//!
//! 일별 지표 기록(물, 수면, 운동, 명상)과 기간별 분석.
//! (user, metric_type, date) 조합은 하나만 존재한다.

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    extract::{AppJson, AppPath, AppQuery, AuthUser},
    optional_date, today_utc,
};
use crate::{
    db::{MetricFilter, MetricUpdate, NewMetric, ProgressMetric},
    error::ApiError,
    services::{
        analytics::{self, wellness::MetricAnalytics, wellness::MetricSummary, MetricSample},
        tracking,
    },
    types::{parse_date, FieldErrors, MessageResponse, MetricType},
    AppState,
};

// ============ Request/Response Types ============

/// 목록 조회 필터
#[derive(Debug, Default, Deserialize)]
pub struct MetricQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub metric_type: Option<String>,
}

impl MetricQuery {
    pub fn validate(self) -> Result<MetricFilter, FieldErrors> {
        let mut errors = FieldErrors::default();

        let start = optional_date("start_date", self.start_date, "Invalid start date", &mut errors);
        let end = optional_date("end_date", self.end_date, "Invalid end date", &mut errors);

        let metric_type = match self.metric_type.as_deref() {
            Some(raw) => {
                let parsed = raw.parse::<MetricType>().ok();
                if parsed.is_none() {
                    errors.push("metric_type", "Invalid metric type");
                }
                parsed
            }
            None => None,
        };

        errors.finish(MetricFilter {
            start,
            end,
            metric_type,
        })
    }
}

/// 숫자 또는 숫자 문자열, 0 이상
fn non_negative(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (number.is_finite() && number >= 0.0).then_some(number)
}

fn check_amount(
    field: &str,
    raw: Option<&Value>,
    message: &str,
    errors: &mut FieldErrors,
) -> Option<f64> {
    let parsed = raw.map(non_negative);
    if let Some(None) = parsed {
        errors.push(field, message);
    }
    parsed.flatten()
}

const VALUE_MESSAGE: &str = "Value must be a positive number";
const TARGET_MESSAGE: &str = "Target value must be a positive number";

/// 지표 추가 요청
#[derive(Debug, Deserialize)]
pub struct CreateMetricRequest {
    pub metric_type: Option<String>,
    pub value: Option<Value>,
    pub target_value: Option<Value>,
    pub date: Option<String>,
}

impl CreateMetricRequest {
    pub fn validate(self) -> Result<NewMetric, FieldErrors> {
        let mut errors = FieldErrors::default();

        let metric_type = self
            .metric_type
            .as_deref()
            .and_then(|m| m.parse::<MetricType>().ok());
        if metric_type.is_none() {
            errors.push("metric_type", "Invalid metric type");
        }

        let value = self.value.as_ref().and_then(non_negative);
        if value.is_none() {
            errors.push("value", VALUE_MESSAGE);
        }

        let target_value = check_amount(
            "target_value",
            self.target_value.as_ref().filter(|v| !v.is_null()),
            TARGET_MESSAGE,
            &mut errors,
        );

        let date = self.date.as_deref().and_then(parse_date);
        if date.is_none() {
            errors.push("date", "Invalid date format");
        }

        match (metric_type, value, date) {
            (Some(metric_type), Some(value), Some(date)) if errors.is_empty() => Ok(NewMetric {
                metric_type,
                value,
                target_value,
                date,
            }),
            _ => Err(errors),
        }
    }
}

/// 지표 수정 요청
#[derive(Debug, Deserialize)]
pub struct UpdateMetricRequest {
    pub value: Option<Value>,
    pub target_value: Option<Value>,
}

impl UpdateMetricRequest {
    pub fn validate(self) -> Result<MetricUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();
        let value = check_amount("value", self.value.as_ref(), VALUE_MESSAGE, &mut errors);
        let target_value = check_amount(
            "target_value",
            self.target_value.as_ref(),
            TARGET_MESSAGE,
            &mut errors,
        );
        errors.finish(MetricUpdate {
            value,
            target_value,
        })
    }
}

/// 분석 기간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    /// 알 수 없는 값은 week
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("month") => Period::Month,
            Some("year") => Period::Year,
            _ => Period::Week,
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Year => 365,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricListResponse {
    pub metrics: Vec<ProgressMetric>,
}

#[derive(Debug, Serialize)]
pub struct MetricResponse {
    pub message: String,
    pub metric: ProgressMetric,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub analytics: BTreeMap<MetricType, MetricAnalytics>,
    pub wellness_score: u32,
}

#[derive(Debug, Serialize)]
pub struct SummaryPeriods {
    pub today: BTreeMap<MetricType, MetricSummary>,
    pub week: BTreeMap<MetricType, MetricSummary>,
    pub month: BTreeMap<MetricType, MetricSummary>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: SummaryPeriods,
}

/// DB row를 분석용 샘플로. 알 수 없는 종류의 row는 건너뛴다
pub fn samples(metrics: &[ProgressMetric]) -> Vec<MetricSample> {
    metrics
        .iter()
        .filter_map(|m| {
            Some(MetricSample {
                metric_type: m.metric_type.parse().ok()?,
                date: m.date,
                value: m.value,
                target: m.target_value,
            })
        })
        .collect()
}

/// 오늘 / 최근 7일 / 최근 30일 요약
pub fn summary_periods(samples: &[MetricSample], today: NaiveDate) -> SummaryPeriods {
    let since = |days: i64| -> Vec<MetricSample> {
        let start = today - Duration::days(days);
        samples.iter().filter(|s| s.date >= start).cloned().collect()
    };
    let today_only: Vec<MetricSample> =
        samples.iter().filter(|s| s.date == today).cloned().collect();

    SummaryPeriods {
        today: analytics::summarize(&today_only),
        week: analytics::summarize(&since(7)),
        month: analytics::summarize(&since(30)),
    }
}

// ============ Handlers ============

/// GET /api/progress?start_date=&end_date=&metric_type=
pub async fn list_metrics(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<MetricQuery>,
) -> Result<Json<MetricListResponse>, ApiError> {
    let filter = query.validate()?;
    let metrics = state.db.list_metrics(user.id(), &filter).await?;
    Ok(Json(MetricListResponse { metrics }))
}

/// POST /api/progress
///
/// 같은 날짜에 같은 종류가 이미 있으면 400
pub async fn create_metric(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateMetricRequest>,
) -> Result<(StatusCode, Json<MetricResponse>), ApiError> {
    let metric = req.validate()?;
    let saved = tracking::record_metric(&*state.db, user.id(), &metric).await?;

    Ok((
        StatusCode::CREATED,
        Json(MetricResponse {
            message: "Progress metric added successfully".to_string(),
            metric: saved,
        }),
    ))
}

/// PUT /api/progress/:id
pub async fn update_metric(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(metric_id): AppPath<i64>,
    AppJson(req): AppJson<UpdateMetricRequest>,
) -> Result<Json<MetricResponse>, ApiError> {
    let update = req.validate()?;
    if update.value.is_none() && update.target_value.is_none() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let metric = state
        .db
        .update_metric(metric_id, user.id(), &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Progress metric".to_string()))?;

    Ok(Json(MetricResponse {
        message: "Progress metric updated successfully".to_string(),
        metric,
    }))
}

/// DELETE /api/progress/:id
pub async fn delete_metric(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(metric_id): AppPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.db.delete_metric(metric_id, user.id()).await? {
        return Err(ApiError::NotFound("Progress metric".to_string()));
    }
    Ok(Json(MessageResponse::new("Progress metric deleted successfully")))
}

/// GET /api/progress/analytics?period=week|month|year
///
/// 기간은 오늘(UTC)에서 7/30/365일 전까지
pub async fn metric_analytics(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let period = Period::parse(query.period.as_deref());
    let end_date = today_utc();
    let start_date = end_date - Duration::days(period.days());

    let filter = MetricFilter {
        start: Some(start_date),
        end: Some(end_date),
        metric_type: None,
    };
    let mut metrics = state.db.list_metrics(user.id(), &filter).await?;
    metrics.reverse();

    let analytics = analytics::analyze(&samples(&metrics));
    let wellness_score = analytics::score_from_analytics(&analytics);

    Ok(Json(AnalyticsResponse {
        period,
        start_date,
        end_date,
        analytics,
        wellness_score,
    }))
}

/// GET /api/progress/summary
pub async fn metric_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SummaryResponse>, ApiError> {
    let today = today_utc();
    let filter = MetricFilter {
        start: Some(today - Duration::days(30)),
        end: None,
        metric_type: None,
    };
    let metrics = state.db.list_metrics(user.id(), &filter).await?;

    Ok(Json(SummaryResponse {
        summary: summary_periods(&samples(&metrics), today),
    }))
}
