//! Yoga Endpoints
//!
//! 자세/루틴 카탈로그는 정적 데이터이며 인증 없이 조회된다.
//! 세션 기록과 통계는 사용자별.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    extract::{AppJson, AppPath, AppQuery, AuthUser},
    today_utc, DateRangeQuery,
};
use crate::{
    db::{PosePopularity, SessionInput, YogaSession, YogaTotals},
    error::ApiError,
    services::yoga::{self, PoseFilter, Routine, YogaPose},
    types::FieldErrors,
    AppState,
};

/// 통계에 포함할 인기 자세 수
const POPULAR_POSE_LIMIT: i64 = 5;

// ============ Request/Response Types ============

/// 세션 기록 요청
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub pose_name: Option<String>,
    pub duration_minutes: Option<Value>,
    pub notes: Option<String>,
}

impl CreateSessionRequest {
    pub fn validate(self) -> Result<SessionInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let pose_name = self
            .pose_name
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && p.chars().count() <= 255);
        if pose_name.is_none() {
            errors.push("pose_name", "Pose name is required");
        }

        let duration_minutes = self
            .duration_minutes
            .as_ref()
            .and_then(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .filter(|d| (1..=180).contains(d))
            .and_then(|d| i32::try_from(d).ok());
        if duration_minutes.is_none() {
            errors.push("duration_minutes", "Duration must be between 1-180 minutes");
        }

        if self.notes.as_deref().is_some_and(|n| n.chars().count() > 1000) {
            errors.push("notes", "Notes must be less than 1000 characters");
        }

        match (pose_name, duration_minutes) {
            (Some(pose_name), Some(duration_minutes)) if errors.is_empty() => Ok(SessionInput {
                pose_name,
                duration_minutes,
                notes: self.notes,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PoseListResponse {
    pub poses: Vec<&'static YogaPose>,
}

#[derive(Debug, Serialize)]
pub struct PoseResponse {
    pub pose: &'static YogaPose,
}

#[derive(Debug, Serialize)]
pub struct RoutineListResponse {
    pub routines: &'static [Routine],
}

#[derive(Debug, Serialize)]
pub struct RoutineResponse {
    pub routine: &'static Routine,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<YogaSession>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub session: YogaSession,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YogaStats {
    #[serde(flatten)]
    pub totals: YogaTotals,
    pub popular_poses: Vec<PosePopularity>,
}

#[derive(Debug, Serialize)]
pub struct YogaStatsResponse {
    pub stats: YogaStats,
}

// ============ Catalog Handlers ============

/// GET /api/yoga/poses?category=&difficulty=&limit=
pub async fn list_poses(AppQuery(filter): AppQuery<PoseFilter>) -> Json<PoseListResponse> {
    Json(PoseListResponse {
        poses: yoga::poses(&filter),
    })
}

/// GET /api/yoga/poses/:id
pub async fn get_pose(AppPath(pose_id): AppPath<u32>) -> Result<Json<PoseResponse>, ApiError> {
    let pose = yoga::find_pose(pose_id).ok_or_else(|| ApiError::NotFound("Yoga pose".to_string()))?;
    Ok(Json(PoseResponse { pose }))
}

/// GET /api/yoga/routines
pub async fn list_routines() -> Json<RoutineListResponse> {
    Json(RoutineListResponse {
        routines: yoga::routines(),
    })
}

/// GET /api/yoga/routines/:id
pub async fn get_routine(
    AppPath(routine_id): AppPath<u32>,
) -> Result<Json<RoutineResponse>, ApiError> {
    let routine = yoga::find_routine(routine_id)
        .ok_or_else(|| ApiError::NotFound("Yoga routine".to_string()))?;
    Ok(Json(RoutineResponse { routine }))
}

// ============ Session Handlers ============

/// GET /api/yoga/sessions?start_date=&end_date=
pub async fn list_sessions(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(range): AppQuery<DateRangeQuery>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let (start, end) = range.validate()?;
    let sessions = state.db.list_yoga_sessions(user.id(), start, end).await?;
    Ok(Json(SessionListResponse { sessions }))
}

/// POST /api/yoga/sessions
pub async fn create_session(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let input = req.validate()?;
    let session = state.db.create_yoga_session(user.id(), &input).await?;

    tracing::debug!(user_id = user.id(), pose = %session.pose_name, "Yoga session recorded");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "Yoga session recorded successfully".to_string(),
            session,
        }),
    ))
}

/// GET /api/yoga/stats
///
/// weekly = 최근 7일, monthly = 최근 30일
pub async fn session_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<YogaStatsResponse>, ApiError> {
    let today = today_utc();
    let totals = state
        .db
        .yoga_totals(
            user.id(),
            today - Duration::days(7),
            today - Duration::days(30),
        )
        .await?;
    let popular_poses = state.db.popular_poses(user.id(), POPULAR_POSE_LIMIT).await?;

    Ok(Json(YogaStatsResponse {
        stats: YogaStats {
            totals,
            popular_poses,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_validation() {
        let req: CreateSessionRequest = serde_json::from_value(json!({
            "pose_name": " Tree Pose ",
            "duration_minutes": 15,
        }))
        .unwrap();
        let input = req.validate().unwrap();
        assert_eq!(input.pose_name, "Tree Pose");
        assert_eq!(input.duration_minutes, 15);

        let req: CreateSessionRequest = serde_json::from_value(json!({
            "pose_name": "",
            "duration_minutes": 181,
            "notes": "x".repeat(1001),
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["pose_name", "duration_minutes", "notes"]
        );
    }

    #[test]
    fn test_fractional_duration_is_rejected() {
        let req: CreateSessionRequest = serde_json::from_value(json!({
            "pose_name": "Child's Pose",
            "duration_minutes": 2.5,
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[tokio::test]
    async fn test_catalog_handlers() {
        let Json(body) = list_routines().await;
        assert_eq!(body.routines.len(), 3);

        let err = get_routine(AppPath(42)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let Json(body) = get_pose(AppPath(1)).await.unwrap();
        assert_eq!(body.pose.id, 1);
    }
}
