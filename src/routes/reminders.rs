//! Reminder Endpoints
//!
//! 요일 목록(0 = Sunday)과 시각을 가진 리마인더.
//! 요일 목록이 비어 있으면 매일 적용된다. 실제 알림 발송은 하지 않는다.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    active_flag, days_of_week,
    extract::{AppJson, AppPath, AuthUser},
    now_utc_time, time_field, today_utc,
};
use crate::{
    db::{Reminder, ReminderInput, ReminderUpdate},
    error::ApiError,
    services::planner::{self, UpcomingReminder},
    types::{nullable, FieldErrors, MessageResponse},
    AppState,
};

// ============ Request/Response Types ============

const TIME_MESSAGE: &str = "Invalid time format (HH:MM)";
const DESCRIPTION_MESSAGE: &str = "Description must be less than 1000 characters";

fn check_description(raw: Option<String>, errors: &mut FieldErrors) -> Option<String> {
    let description = raw?;
    if description.chars().count() > 1000 {
        errors.push("description", DESCRIPTION_MESSAGE);
        return None;
    }
    Some(description)
}

fn check_title(raw: &str, message: &str, errors: &mut FieldErrors) -> Option<String> {
    let title = raw.trim();
    if title.is_empty() || title.chars().count() > 255 {
        errors.push("title", message);
        return None;
    }
    Some(title.to_string())
}

/// 리마인더 생성 요청
#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reminder_time: Option<String>,
    pub days_of_week: Option<Value>,
}

impl CreateReminderRequest {
    pub fn validate(self) -> Result<ReminderInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = check_title(
            self.title.as_deref().unwrap_or_default(),
            "Reminder title is required",
            &mut errors,
        );
        let description = check_description(self.description, &mut errors);
        let reminder_time = time_field(
            "reminder_time",
            self.reminder_time.as_deref().unwrap_or_default(),
            TIME_MESSAGE,
            &mut errors,
        );
        let days = days_of_week(self.days_of_week, &mut errors);

        match (title, reminder_time) {
            (Some(title), Some(reminder_time)) if errors.is_empty() => Ok(ReminderInput {
                title,
                description,
                reminder_time,
                days_of_week: days.unwrap_or_default(),
            }),
            _ => Err(errors),
        }
    }
}

/// 리마인더 수정 요청
#[derive(Debug, Deserialize)]
pub struct UpdateReminderRequest {
    pub title: Option<String>,
    /// `null`이면 설명 삭제
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub reminder_time: Option<String>,
    pub days_of_week: Option<Value>,
    pub is_active: Option<Value>,
}

impl UpdateReminderRequest {
    pub fn validate(self) -> Result<ReminderUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();

        let update = ReminderUpdate {
            title: self.title.as_deref().and_then(|t| {
                check_title(t, "Reminder title must be between 1-255 characters", &mut errors)
            }),
            description: self
                .description
                .map(|d| check_description(d, &mut errors)),
            reminder_time: self
                .reminder_time
                .as_deref()
                .and_then(|t| time_field("reminder_time", t, TIME_MESSAGE, &mut errors)),
            days_of_week: days_of_week(self.days_of_week, &mut errors),
            is_active: active_flag(self.is_active, &mut errors),
        };

        errors.finish(update)
    }
}

fn is_empty_update(update: &ReminderUpdate) -> bool {
    update.title.is_none()
        && update.description.is_none()
        && update.reminder_time.is_none()
        && update.days_of_week.is_none()
        && update.is_active.is_none()
}

#[derive(Debug, Serialize)]
pub struct ReminderListResponse {
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Serialize)]
pub struct UpcomingResponse {
    pub reminders: Vec<UpcomingReminder>,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub message: String,
    pub reminder: Reminder,
}

#[derive(Debug, Serialize)]
pub struct ToggleReminderResponse {
    pub message: String,
    pub is_active: bool,
}

fn reminder_not_found() -> ApiError {
    ApiError::NotFound("Reminder".to_string())
}

// ============ Handlers ============

/// GET /api/reminders
pub async fn list_reminders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ReminderListResponse>, ApiError> {
    let reminders = state.db.list_reminders(user.id()).await?;
    Ok(Json(ReminderListResponse { reminders }))
}

/// POST /api/reminders
pub async fn create_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateReminderRequest>,
) -> Result<(StatusCode, Json<ReminderResponse>), ApiError> {
    let input = req.validate()?;
    let reminder = state.db.create_reminder(user.id(), &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReminderResponse {
            message: "Reminder created successfully".to_string(),
            reminder,
        }),
    ))
}

/// PUT /api/reminders/:id
pub async fn update_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(reminder_id): AppPath<i64>,
    AppJson(req): AppJson<UpdateReminderRequest>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let update = req.validate()?;
    if is_empty_update(&update) {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let reminder = state
        .db
        .update_reminder(reminder_id, user.id(), &update)
        .await?
        .ok_or_else(reminder_not_found)?;

    Ok(Json(ReminderResponse {
        message: "Reminder updated successfully".to_string(),
        reminder,
    }))
}

/// DELETE /api/reminders/:id
pub async fn delete_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(reminder_id): AppPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.db.delete_reminder(reminder_id, user.id()).await? {
        return Err(reminder_not_found());
    }
    Ok(Json(MessageResponse::new("Reminder deleted successfully")))
}

/// PATCH /api/reminders/:id/toggle
pub async fn toggle_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(reminder_id): AppPath<i64>,
) -> Result<Json<ToggleReminderResponse>, ApiError> {
    let is_active = state
        .db
        .toggle_reminder(reminder_id, user.id())
        .await?
        .ok_or_else(reminder_not_found)?;

    let verb = if is_active { "activated" } else { "deactivated" };
    Ok(Json(ToggleReminderResponse {
        message: format!("Reminder {} successfully", verb),
        is_active,
    }))
}

/// GET /api/reminders/today
///
/// 오늘 요일에 적용되는 활성 리마인더 (시각 순)
pub async fn today_reminders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ReminderListResponse>, ApiError> {
    let weekday = planner::weekday_index(today_utc());
    let reminders = state
        .db
        .active_reminders(user.id())
        .await?
        .into_iter()
        .filter(|r| planner::applies_on(&r.days_of_week, weekday))
        .collect();

    Ok(Json(ReminderListResponse { reminders }))
}

/// GET /api/reminders/upcoming
///
/// 다음 7일 안의 리마인더를 가까운 순으로 최대 10개
pub async fn upcoming(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UpcomingResponse>, ApiError> {
    let reminders = state.db.active_reminders(user.id()).await?;
    let weekday = planner::weekday_index(today_utc());

    Ok(Json(UpcomingResponse {
        reminders: planner::upcoming_reminders(reminders, weekday, now_utc_time()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serde_json::json;

    #[test]
    fn test_create_normalizes_days() {
        let req: CreateReminderRequest = serde_json::from_value(json!({
            "title": "Stretch",
            "reminder_time": "7:30",
            "days_of_week": [5, 1, 3, 1]
        }))
        .unwrap();
        let input = req.validate().unwrap();
        assert_eq!(input.reminder_time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(input.days_of_week, vec![1, 3, 5]);
    }

    #[test]
    fn test_create_without_days_means_every_day() {
        let req: CreateReminderRequest =
            serde_json::from_value(json!({ "title": "Water", "reminder_time": "10:00" })).unwrap();
        assert!(req.validate().unwrap().days_of_week.is_empty());
    }

    #[test]
    fn test_create_reports_missing_fields() {
        let req: CreateReminderRequest =
            serde_json::from_value(json!({ "days_of_week": "weekdays" })).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["title", "reminder_time", "days_of_week"]
        );
    }

    #[test]
    fn test_update_validation() {
        let req: UpdateReminderRequest =
            serde_json::from_value(json!({ "is_active": 1, "title": "" })).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["title", "is_active"]);

        let req: UpdateReminderRequest = serde_json::from_value(json!({})).unwrap();
        assert!(is_empty_update(&req.validate().unwrap()));
    }

    #[test]
    fn test_update_can_clear_description() {
        let req: UpdateReminderRequest =
            serde_json::from_value(json!({ "description": null })).unwrap();
        let update = req.validate().unwrap();
        assert_eq!(update.description, Some(None));
        assert!(!is_empty_update(&update));

        let req: UpdateReminderRequest =
            serde_json::from_value(json!({ "description": "x".repeat(1001) })).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["description"]);
    }
}
