//! Habit Endpoints
//!
//! 습관 CRUD, 날짜별 완료 토글, 이력과 통계.
//! 다른 사용자의 습관은 존재하지 않는 것처럼 404로 응답한다.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    active_flag,
    extract::{AppJson, AppPath, AppQuery, AuthUser, OptionalJson},
    time_field, today_utc, DateRangeQuery,
};
use crate::{
    db::{Completion, Habit, HabitInput, HabitUpdate, HabitWithStatus},
    error::ApiError,
    services::{analytics, tracking},
    types::{nullable, parse_date, FieldErrors, Frequency, MessageResponse},
    AppState,
};

// ============ Request/Response Types ============

/// 습관 생성 요청
#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub frequency: Option<String>,
    pub reminder_time: Option<String>,
}

fn check_name(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > 255 {
        errors.push("name", "Habit name is required");
        return None;
    }
    Some(name.to_string())
}

fn check_icon(raw: String, errors: &mut FieldErrors) -> Option<String> {
    if raw.chars().count() > 100 {
        errors.push("icon", "Icon must be less than 100 characters");
        return None;
    }
    Some(raw)
}

fn check_frequency(raw: &str, errors: &mut FieldErrors) -> Option<Frequency> {
    let frequency = raw.parse().ok();
    if frequency.is_none() {
        errors.push("frequency", "Invalid frequency");
    }
    frequency
}

fn check_reminder_time(raw: &str, errors: &mut FieldErrors) -> Option<chrono::NaiveTime> {
    time_field("reminder_time", raw, "Invalid time format (HH:MM)", errors)
}

impl CreateHabitRequest {
    pub fn validate(self) -> Result<HabitInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = check_name(self.name.as_deref().unwrap_or_default(), &mut errors);
        let icon = self.icon.and_then(|i| check_icon(i, &mut errors));
        let frequency = match self.frequency.as_deref() {
            Some(raw) => check_frequency(raw, &mut errors),
            None => Some(Frequency::Daily),
        };
        let reminder_time = self
            .reminder_time
            .as_deref()
            .and_then(|raw| check_reminder_time(raw, &mut errors));

        match (name, frequency) {
            (Some(name), Some(frequency)) if errors.is_empty() => Ok(HabitInput {
                name,
                icon,
                frequency,
                reminder_time,
            }),
            _ => Err(errors),
        }
    }
}

/// 습관 수정 요청 (모든 필드 선택)
#[derive(Debug, Deserialize)]
pub struct UpdateHabitRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub frequency: Option<String>,
    /// `null`이면 알림 시각 삭제
    #[serde(default, deserialize_with = "nullable")]
    pub reminder_time: Option<Option<String>>,
    /// 불리언이 아니면 필드 에러 (원본 JSON 값으로 받음)
    pub is_active: Option<Value>,
}

impl UpdateHabitRequest {
    pub fn validate(self) -> Result<HabitUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();

        let update = HabitUpdate {
            name: self.name.as_deref().and_then(|n| check_name(n, &mut errors)),
            icon: self.icon.and_then(|i| check_icon(i, &mut errors)),
            frequency: self
                .frequency
                .as_deref()
                .and_then(|f| check_frequency(f, &mut errors)),
            reminder_time: self.reminder_time.map(|t| {
                t.as_deref()
                    .and_then(|t| check_reminder_time(t, &mut errors))
            }),
            is_active: active_flag(self.is_active, &mut errors),
        };

        errors.finish(update)
    }
}

fn is_empty_update(update: &HabitUpdate) -> bool {
    update.name.is_none()
        && update.icon.is_none()
        && update.frequency.is_none()
        && update.reminder_time.is_none()
        && update.is_active.is_none()
}

/// 완료 토글 요청. 날짜가 없으면 오늘(UTC)
#[derive(Debug, Default, Deserialize)]
pub struct ToggleRequest {
    pub completed_date: Option<String>,
    pub notes: Option<String>,
}

impl ToggleRequest {
    pub fn validate(self, today: NaiveDate) -> Result<(NaiveDate, Option<String>), FieldErrors> {
        let mut errors = FieldErrors::default();

        let date = match self.completed_date.as_deref() {
            Some(raw) => parse_date(raw).unwrap_or_else(|| {
                errors.push("completed_date", "Invalid date format");
                today
            }),
            None => today,
        };

        if self.notes.as_deref().is_some_and(|n| n.chars().count() > 1000) {
            errors.push("notes", "Notes must be less than 1000 characters");
        }

        errors.finish((date, self.notes))
    }
}

#[derive(Debug, Serialize)]
pub struct HabitListResponse {
    pub habits: Vec<HabitWithStatus>,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub message: String,
    pub habit: Habit,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub message: String,
    pub completed: bool,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub completions: Vec<Completion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStatsResponse {
    pub total_completions: u32,
    pub current_streak: u32,
    pub monthly_completions: u32,
    pub weekly_completions: u32,
}

impl HabitStatsResponse {
    pub fn from_dates(dates: &[NaiveDate], today: NaiveDate) -> Self {
        Self {
            total_completions: dates.len() as u32,
            current_streak: analytics::current_streak(dates),
            monthly_completions: analytics::count_in_window(dates, analytics::Window::Month, today),
            weekly_completions: analytics::count_in_window(dates, analytics::Window::Week, today),
        }
    }
}

// ============ Handlers ============

async fn owned_habit(state: &AppState, habit_id: i64, user_id: i64) -> Result<Habit, ApiError> {
    state
        .db
        .find_habit(habit_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit".to_string()))
}

/// GET /api/habits
///
/// 활성 습관과 오늘 완료 여부
pub async fn list_habits(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<HabitListResponse>, ApiError> {
    let habits = state
        .db
        .list_habits_with_status(user.id(), today_utc())
        .await?;
    Ok(Json(HabitListResponse { habits }))
}

/// POST /api/habits
pub async fn create_habit(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>), ApiError> {
    let input = req.validate()?;
    let habit = state.db.create_habit(user.id(), &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(HabitResponse {
            message: "Habit created successfully".to_string(),
            habit,
        }),
    ))
}

/// PUT /api/habits/:id
pub async fn update_habit(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(habit_id): AppPath<i64>,
    AppJson(req): AppJson<UpdateHabitRequest>,
) -> Result<Json<HabitResponse>, ApiError> {
    let update = req.validate()?;
    if is_empty_update(&update) {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let habit = state
        .db
        .update_habit(habit_id, user.id(), &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit".to_string()))?;

    Ok(Json(HabitResponse {
        message: "Habit updated successfully".to_string(),
        habit,
    }))
}

/// DELETE /api/habits/:id
pub async fn delete_habit(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(habit_id): AppPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.db.delete_habit(habit_id, user.id()).await? {
        return Err(ApiError::NotFound("Habit".to_string()));
    }
    Ok(Json(MessageResponse::new("Habit deleted successfully")))
}

/// POST /api/habits/:id/toggle
///
/// 비활성 습관은 토글할 수 없다 (404)
pub async fn toggle_habit(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(habit_id): AppPath<i64>,
    OptionalJson(req): OptionalJson<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let (date, notes) = req.validate(today_utc())?;

    let habit = owned_habit(&state, habit_id, user.id()).await?;
    if !habit.is_active {
        return Err(ApiError::NotFound("Habit".to_string()));
    }

    let completed =
        tracking::toggle_completion(&*state.db, habit.id, user.id(), date, notes.as_deref())
            .await?;

    let message = if completed {
        "Habit completed successfully"
    } else {
        "Habit completion removed"
    };

    Ok(Json(ToggleResponse {
        message: message.to_string(),
        completed,
        date,
    }))
}

/// GET /api/habits/:id/history?start_date=&end_date=
pub async fn habit_history(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(habit_id): AppPath<i64>,
    AppQuery(range): AppQuery<DateRangeQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let (start, end) = range.validate()?;
    let habit = owned_habit(&state, habit_id, user.id()).await?;

    let completions = state
        .db
        .completion_history(habit.id, user.id(), start, end)
        .await?;

    Ok(Json(HistoryResponse { completions }))
}

/// GET /api/habits/:id/stats
pub async fn habit_stats(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(habit_id): AppPath<i64>,
) -> Result<Json<HabitStatsResponse>, ApiError> {
    let habit = owned_habit(&state, habit_id, user.id()).await?;
    let dates = state.db.completion_dates(user.id(), Some(habit.id)).await?;

    Ok(Json(HabitStatsResponse::from_dates(&dates, today_utc())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_create_defaults_to_daily() {
        let req: CreateHabitRequest =
            serde_json::from_value(json!({ "name": " Drink water ", "icon": "💧" })).unwrap();
        let input = req.validate().unwrap();
        assert_eq!(input.name, "Drink water");
        assert_eq!(input.frequency, Frequency::Daily);
        assert!(input.reminder_time.is_none());
    }

    #[test]
    fn test_create_reports_each_invalid_field() {
        let req: CreateHabitRequest = serde_json::from_value(json!({
            "name": "   ",
            "frequency": "hourly",
            "reminder_time": "25:00"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["name", "frequency", "reminder_time"]
        );
    }

    #[test]
    fn test_update_rejects_non_boolean_active_flag() {
        let req: UpdateHabitRequest =
            serde_json::from_value(json!({ "is_active": "yes" })).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["is_active"]);

        let req: UpdateHabitRequest =
            serde_json::from_value(json!({ "is_active": false })).unwrap();
        assert_eq!(req.validate().unwrap().is_active, Some(false));
    }

    #[test]
    fn test_update_can_clear_reminder_time() {
        let req: UpdateHabitRequest =
            serde_json::from_value(json!({ "reminder_time": null })).unwrap();
        let update = req.validate().unwrap();
        assert_eq!(update.reminder_time, Some(None));
        assert!(!is_empty_update(&update));

        let req: UpdateHabitRequest =
            serde_json::from_value(json!({ "reminder_time": "07:30" })).unwrap();
        assert_eq!(
            req.validate().unwrap().reminder_time,
            Some(chrono::NaiveTime::from_hms_opt(7, 30, 0))
        );

        let req: UpdateHabitRequest = serde_json::from_value(json!({ "name": "Read" })).unwrap();
        assert_eq!(req.validate().unwrap().reminder_time, None);
    }

    #[test]
    fn test_empty_update_is_detected() {
        let req: UpdateHabitRequest = serde_json::from_value(json!({})).unwrap();
        assert!(is_empty_update(&req.validate().unwrap()));
    }

    #[test]
    fn test_toggle_defaults_to_today() {
        let (date, notes) = ToggleRequest::default().validate(day(9)).unwrap();
        assert_eq!(date, day(9));
        assert!(notes.is_none());

        let req = ToggleRequest {
            completed_date: Some("2024-03-02".to_string()),
            notes: Some("after lunch".to_string()),
        };
        assert_eq!(req.validate(day(9)).unwrap().0, day(2));

        let req = ToggleRequest {
            completed_date: Some("03/02/2024".to_string()),
            notes: None,
        };
        assert!(req.validate(day(9)).is_err());
    }

    async fn toggle_body(body: &'static str) -> Result<ToggleRequest, ApiError> {
        use axum::{body::Body, extract::FromRequest, http::Request};

        let request = Request::builder()
            .method("POST")
            .uri("/api/habits/1/toggle")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        OptionalJson::<ToggleRequest>::from_request(request, &())
            .await
            .map(|OptionalJson(req)| req)
    }

    #[tokio::test]
    async fn test_toggle_body_is_optional_but_must_parse() {
        let req = toggle_body("").await.unwrap();
        assert!(req.completed_date.is_none());

        let req = toggle_body(r#"{"completed_date": "2024-03-02"}"#).await.unwrap();
        assert_eq!(req.validate(day(9)).unwrap().0, day(2));

        // 잘못된 본문은 오늘로 대체되지 않고 400
        for body in [
            r#"{"completed_date": 20240302, "notes": 5}"#,
            r#"{"notes": 5}"#,
            r#"{"completed_date": "2024-03-02""#,
        ] {
            let err = toggle_body(body).await.unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "{body}");
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_stats_from_completion_dates() {
        // 2024-03-09 is a Saturday; ISO week runs Mon 03-04 .. Sun 03-10
        let dates = vec![day(9), day(8), day(7), day(3), NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()];
        let stats = HabitStatsResponse::from_dates(&dates, day(9));

        assert_eq!(stats.total_completions, 5);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.monthly_completions, 4);
        assert_eq!(stats.weekly_completions, 3);
    }
}
