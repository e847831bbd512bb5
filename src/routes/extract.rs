//! Request Extractors
//!
//! axum 기본 extractor의 rejection을 `ApiError` JSON 응답으로 바꾼 래퍼와
//! JWT 인증 extractor.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::de::DeserializeOwned;

use crate::{db::User, error::ApiError, AppState};

/// JSON 본문. 파싱 실패는 400 `BAD_REQUEST`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// 쿼리 문자열
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// 경로 파라미터
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// 본문을 생략할 수 있는 JSON
///
/// - 빈 본문 → `T::default()`
/// - 그 외에는 반드시 `T`로 파싱되어야 함 (실패 시 400 `BAD_REQUEST`)
#[derive(Debug)]
pub struct OptionalJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(T::default()));
        }

        serde_json::from_slice(&body)
            .map(OptionalJson)
            .map_err(|e| ApiError::BadRequest(format!("Failed to parse the request body as JSON: {e}")))
    }
}

/// 인증된 사용자
///
/// - `Authorization` 헤더 없음 → 401 "Access token required"
/// - 서명/만료 검증 실패 → 403 "Invalid token"
/// - 토큰은 유효하지만 사용자가 삭제됨 → 401 "Invalid token"
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

        let user_id = state.auth.verify_token(token).ok_or(ApiError::InvalidToken)?;

        let user = state
            .db
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

        Ok(AuthUser(user))
    }
}
