//! Error Handling Module
//!
//! Provides type-safe error handling with proper HTTP status code mapping.
//! Uses thiserror for domain errors and integrates with tracing for structured logging.

use std::sync::OnceLock;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::types::{FieldError, FieldErrors};

/// 5xx 응답에 내부 메시지를 포함할지 여부 (시작 시 한 번 설정)
static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// 서버 에러 상세 노출 설정. 프로덕션이 아닐 때만 `true`로 호출한다.
pub fn expose_internal_details(enabled: bool) {
    let _ = EXPOSE_DETAILS.set(enabled);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.get().copied().unwrap_or(false)
}

/// API 에러 타입
///
/// # Design Decision
///
/// 각 에러 variant는 적절한 HTTP 상태 코드에 매핑됨
/// - 소유권 검사 실패는 403이 아니라 404 (다른 사용자 데이터의 존재를 숨김)
/// - 토큰 누락은 401, 잘못된 토큰은 403
/// - 서버 에러의 상세 내용은 프로덕션에서 노출하지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    ValidationError(FieldErrors),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ============ 401 Unauthorized ============
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // ============ 403 Forbidden ============
    #[error("Invalid token")]
    InvalidToken,

    // ============ 404 Not Found ============
    #[error("Resource not found: {0}")]
    NotFound(String),

    // ============ 500 Internal Server Error ============
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("OTP delivery failed")]
    OtpDeliveryFailed,

    // ============ 503 Service Unavailable ============
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn validation(field: &str, message: &str) -> Self {
        ApiError::ValidationError(FieldErrors::single(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) | ApiError::AlreadyExists(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::OtpDeliveryFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            // 4xx 클라이언트 에러
            ApiError::BadRequest(msg) => ErrorResponse {
                error: msg,
                code: "BAD_REQUEST".to_string(),
                fields: None,
                details: None,
            },
            ApiError::ValidationError(errors) => ErrorResponse {
                error: "Validation failed".to_string(),
                code: "VALIDATION_ERROR".to_string(),
                fields: Some(errors.into_inner()),
                details: None,
            },
            ApiError::AlreadyExists(msg) => ErrorResponse {
                error: msg,
                code: "ALREADY_EXISTS".to_string(),
                fields: None,
                details: None,
            },
            ApiError::Unauthorized(msg) => ErrorResponse {
                error: msg,
                code: "UNAUTHORIZED".to_string(),
                fields: None,
                details: None,
            },
            ApiError::InvalidToken => ErrorResponse {
                error: "Invalid token".to_string(),
                code: "INVALID_TOKEN".to_string(),
                fields: None,
                details: None,
            },
            ApiError::NotFound(resource) => ErrorResponse {
                error: format!("{} not found", resource),
                code: "NOT_FOUND".to_string(),
                fields: None,
                details: None,
            },

            // 5xx 서버 에러
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                ErrorResponse {
                    error: "Database error occurred".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    fields: None,
                    details: details_exposed().then_some(msg),
                }
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    code: "INTERNAL_ERROR".to_string(),
                    fields: None,
                    details: details_exposed().then_some(msg),
                }
            }
            ApiError::OtpDeliveryFailed => ErrorResponse {
                error: "Failed to send OTP".to_string(),
                code: "OTP_DELIVERY_FAILED".to_string(),
                fields: None,
                details: None,
            },
            ApiError::ServiceUnavailable(service) => ErrorResponse {
                error: format!("{} is currently unavailable", service),
                code: "SERVICE_UNAVAILABLE".to_string(),
                fields: None,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

/// SQLx 에러를 ApiError로 변환
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

/// anyhow 에러를 ApiError로 변환
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{:#}", err))
    }
}

/// JSON 본문 파싱 실패
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// 쿼리 문자열 파싱 실패
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// 경로 파라미터 파싱 실패 (숫자가 아닌 id 등)
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let mut errors = FieldErrors::default();
        errors.push("name", "Habit name is required");
        errors.push("frequency", "Invalid frequency");

        let (status, body) = body_json(ApiError::ValidationError(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"][0]["field"], "name");
        assert_eq!(body["fields"][1]["message"], "Invalid frequency");
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let (status, body) = body_json(ApiError::NotFound("Habit".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Habit not found");
    }

    #[tokio::test]
    async fn test_token_errors_status() {
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Unauthorized("Access token required".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let (status, body) =
            body_json(ApiError::InternalError("pool timed out".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
