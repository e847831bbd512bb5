//! Schedule Endpoints
//!
//! 요일별 일과 일정과 그 파생 뷰 (오늘, 주간, 24시간 타임라인, 통계).

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    active_flag, days_of_week,
    extract::{AppJson, AppPath, AppQuery, AuthUser},
    optional_date, time_field, today_utc,
};
use crate::{
    db::{Schedule, ScheduleInput, ScheduleUpdate},
    error::ApiError,
    services::planner::{self, ScheduleStats, TimeSlot},
    types::{nullable, ActivityType, FieldErrors, MessageResponse},
    AppState,
};

// ============ Request/Response Types ============

const START_MESSAGE: &str = "Invalid start time format (HH:MM)";
const END_MESSAGE: &str = "Invalid end time format (HH:MM)";

fn check_activity_name(raw: &str, message: &str, errors: &mut FieldErrors) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > 255 {
        errors.push("activity_name", message);
        return None;
    }
    Some(name.to_string())
}

fn check_activity_type(raw: &str, errors: &mut FieldErrors) -> Option<ActivityType> {
    let activity = raw.parse().ok();
    if activity.is_none() {
        errors.push("activity_type", "Invalid activity type");
    }
    activity
}

/// 일정 생성 요청
#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub activity_name: Option<String>,
    pub activity_type: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub days_of_week: Option<Value>,
}

impl CreateScheduleRequest {
    pub fn validate(self) -> Result<ScheduleInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let activity_name = check_activity_name(
            self.activity_name.as_deref().unwrap_or_default(),
            "Activity name is required",
            &mut errors,
        );
        let activity_type =
            check_activity_type(self.activity_type.as_deref().unwrap_or_default(), &mut errors);
        let start_time = time_field(
            "start_time",
            self.start_time.as_deref().unwrap_or_default(),
            START_MESSAGE,
            &mut errors,
        );
        let end_time = self
            .end_time
            .as_deref()
            .filter(|t| !t.is_empty())
            .and_then(|t| time_field("end_time", t, END_MESSAGE, &mut errors));
        let days = days_of_week(self.days_of_week, &mut errors);

        match (activity_name, activity_type, start_time) {
            (Some(activity_name), Some(activity_type), Some(start_time)) if errors.is_empty() => {
                Ok(ScheduleInput {
                    activity_name,
                    activity_type,
                    start_time,
                    end_time,
                    days_of_week: days.unwrap_or_default(),
                })
            }
            _ => Err(errors),
        }
    }
}

/// 일정 수정 요청
#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub activity_name: Option<String>,
    pub activity_type: Option<String>,
    pub start_time: Option<String>,
    /// `null` 또는 빈 문자열이면 종료 시각 삭제
    #[serde(default, deserialize_with = "nullable")]
    pub end_time: Option<Option<String>>,
    pub days_of_week: Option<Value>,
    pub is_active: Option<Value>,
}

impl UpdateScheduleRequest {
    pub fn validate(self) -> Result<ScheduleUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();

        let update = ScheduleUpdate {
            activity_name: self.activity_name.as_deref().and_then(|n| {
                check_activity_name(
                    n,
                    "Activity name must be between 1-255 characters",
                    &mut errors,
                )
            }),
            activity_type: self
                .activity_type
                .as_deref()
                .and_then(|t| check_activity_type(t, &mut errors)),
            start_time: self
                .start_time
                .as_deref()
                .and_then(|t| time_field("start_time", t, START_MESSAGE, &mut errors)),
            end_time: self.end_time.map(|t| {
                t.as_deref()
                    .filter(|t| !t.is_empty())
                    .and_then(|t| time_field("end_time", t, END_MESSAGE, &mut errors))
            }),
            days_of_week: days_of_week(self.days_of_week, &mut errors),
            is_active: active_flag(self.is_active, &mut errors),
        };

        errors.finish(update)
    }
}

fn is_empty_update(update: &ScheduleUpdate) -> bool {
    update.activity_name.is_none()
        && update.activity_type.is_none()
        && update.start_time.is_none()
        && update.end_time.is_none()
        && update.days_of_week.is_none()
        && update.is_active.is_none()
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleListResponse {
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub message: String,
    pub schedule: Schedule,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyResponse {
    pub weekly_schedule: BTreeMap<i16, Vec<Schedule>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub date: NaiveDate,
    pub day_of_week: i16,
    pub schedules: Vec<Schedule>,
    pub timeline: Vec<TimeSlot>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: ScheduleStats,
}

fn schedule_not_found() -> ApiError {
    ApiError::NotFound("Schedule".to_string())
}

// ============ Handlers ============

/// GET /api/schedules
pub async fn list_schedules(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ScheduleListResponse>, ApiError> {
    let schedules = state.db.list_schedules(user.id()).await?;
    Ok(Json(ScheduleListResponse { schedules }))
}

/// POST /api/schedules
pub async fn create_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), ApiError> {
    let input = req.validate()?;
    let schedule = state.db.create_schedule(user.id(), &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse {
            message: "Schedule created successfully".to_string(),
            schedule,
        }),
    ))
}

/// PUT /api/schedules/:id
pub async fn update_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(schedule_id): AppPath<i64>,
    AppJson(req): AppJson<UpdateScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let update = req.validate()?;
    if is_empty_update(&update) {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let schedule = state
        .db
        .update_schedule(schedule_id, user.id(), &update)
        .await?
        .ok_or_else(schedule_not_found)?;

    Ok(Json(ScheduleResponse {
        message: "Schedule updated successfully".to_string(),
        schedule,
    }))
}

/// DELETE /api/schedules/:id
pub async fn delete_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(schedule_id): AppPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.db.delete_schedule(schedule_id, user.id()).await? {
        return Err(schedule_not_found());
    }
    Ok(Json(MessageResponse::new("Schedule deleted successfully")))
}

/// GET /api/schedules/today
pub async fn today_schedules(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ScheduleListResponse>, ApiError> {
    let all = state.db.list_schedules(user.id()).await?;
    let weekday = planner::weekday_index(today_utc());

    Ok(Json(ScheduleListResponse {
        schedules: planner::schedules_for_day(&all, weekday),
    }))
}

/// GET /api/schedules/weekly
///
/// 요일(0-6) → 활성 일정 목록. 일정이 없는 요일도 빈 배열로 포함
pub async fn weekly(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<WeeklyResponse>, ApiError> {
    let all = state.db.list_schedules(user.id()).await?;
    Ok(Json(WeeklyResponse {
        weekly_schedule: planner::weekly_schedule(&all),
    }))
}

/// GET /api/schedules/timeline?date=YYYY-MM-DD
pub async fn day_timeline(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<TimelineQuery>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let mut errors = FieldErrors::default();
    let date = optional_date("date", query.date, "Invalid date format", &mut errors);
    let date = errors.finish(date)?.unwrap_or_else(today_utc);

    let all = state.db.list_schedules(user.id()).await?;
    let day_of_week = planner::weekday_index(date);
    let schedules = planner::schedules_for_day(&all, day_of_week);
    let timeline = planner::timeline(&schedules);

    Ok(Json(TimelineResponse {
        date,
        day_of_week,
        schedules,
        timeline,
    }))
}

/// GET /api/schedules/stats
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let all = state.db.list_schedules(user.id()).await?;
    Ok(Json(StatsResponse {
        stats: planner::schedule_stats(&all),
    }))
}
