//! Auth Endpoints
//!
//! 회원가입, OTP 발송/검증, 로그인, 프로필.
//! 가입 직후에는 미인증 상태이며 OTP 검증으로 `is_verified`가 켜진다.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::extract::{AppJson, AuthUser};
use crate::{
    db::{is_unique_violation, User},
    error::ApiError,
    types::{
        is_valid_email, is_valid_mobile, is_valid_url, trimmed_len_between, FieldErrors,
        MessageResponse, OtpChannel,
    },
    AppState,
};

// ============ Request/Response Types ============

/// 회원가입 요청
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
}

/// 검증된 회원가입 입력
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: String,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self
            .name
            .as_deref()
            .and_then(|n| trimmed_len_between(n, 2, 255));
        if name.is_none() {
            errors.push("name", "Name must be at least 2 characters");
        }

        let email = present(self.email).map(|e| e.to_lowercase());
        if email.as_deref().is_some_and(|e| !is_valid_email(e)) {
            errors.push("email", "Invalid email format");
        }

        let mobile = present(self.mobile);
        if mobile.as_deref().is_some_and(|m| !is_valid_mobile(m)) {
            errors.push("mobile", "Invalid mobile number");
        }

        if email.is_none() && mobile.is_none() {
            errors.push("email", "Email or mobile is required");
        }

        let password = self.password.filter(|p| p.chars().count() >= 6);
        if password.is_none() {
            errors.push("password", "Password must be at least 6 characters");
        }

        match (name, password) {
            (Some(name), Some(password)) if errors.is_empty() => Ok(Registration {
                name,
                email,
                mobile,
                password,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
    pub otp_sent: bool,
    pub verification_required: bool,
}

/// OTP 발송 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub user_id: Option<i64>,
    #[serde(rename = "type")]
    pub channel: Option<String>,
}

fn parse_user_id(user_id: Option<i64>, errors: &mut FieldErrors) -> i64 {
    match user_id {
        Some(id) if id > 0 => id,
        _ => {
            errors.push("userId", "Valid user ID required");
            0
        }
    }
}

fn parse_channel(channel: Option<&str>, errors: &mut FieldErrors) -> Option<OtpChannel> {
    let parsed = channel.and_then(|c| c.parse::<OtpChannel>().ok());
    if parsed.is_none() {
        errors.push("type", "Type must be email or mobile");
    }
    parsed
}

impl SendOtpRequest {
    pub fn validate(self) -> Result<(i64, OtpChannel), FieldErrors> {
        let mut errors = FieldErrors::default();
        let user_id = parse_user_id(self.user_id, &mut errors);
        let channel = parse_channel(self.channel.as_deref(), &mut errors);

        match channel {
            Some(channel) if errors.is_empty() => Ok((user_id, channel)),
            _ => Err(errors),
        }
    }
}

/// OTP 검증 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_id: Option<i64>,
    pub otp: Option<String>,
    #[serde(rename = "type")]
    pub channel: Option<String>,
}

#[derive(Debug)]
pub struct OtpCheck {
    pub user_id: i64,
    pub code: String,
    pub channel: OtpChannel,
}

impl VerifyOtpRequest {
    pub fn validate(self) -> Result<OtpCheck, FieldErrors> {
        let mut errors = FieldErrors::default();
        let user_id = parse_user_id(self.user_id, &mut errors);

        let code = self
            .otp
            .map(|c| c.trim().to_string())
            .filter(|c| c.len() == 6 && c.chars().all(|ch| ch.is_ascii_digit()));
        if code.is_none() {
            errors.push("otp", "OTP must be 6 digits");
        }

        let channel = parse_channel(self.channel.as_deref(), &mut errors);

        match (code, channel) {
            (Some(code), Some(channel)) if errors.is_empty() => Ok(OtpCheck {
                user_id,
                code,
                channel,
            }),
            _ => Err(errors),
        }
    }
}

/// 로그인 요청 (identifier = 이메일 또는 휴대폰 번호)
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::default();

        let identifier = present(self.identifier);
        if identifier.is_none() {
            errors.push("identifier", "Email or mobile required");
        }

        let password = self.password.filter(|p| !p.is_empty());
        if password.is_none() {
            errors.push("password", "Password required");
        }

        match (identifier, password) {
            (Some(identifier), Some(password)) => Ok((identifier, password)),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: User,
    pub is_verified: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: User,
}

/// 프로필 수정 요청
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<(Option<String>, Option<String>), FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = match self.name.as_deref() {
            Some(raw) => {
                let name = trimmed_len_between(raw, 2, 255);
                if name.is_none() {
                    errors.push("name", "Name must be at least 2 characters");
                }
                name
            }
            None => None,
        };

        let avatar = present(self.avatar);
        if avatar.as_deref().is_some_and(|a| !is_valid_url(a)) {
            errors.push("avatar", "Invalid avatar URL");
        }

        errors.finish((name, avatar))
    }
}

// ============ Handlers ============

/// POST /api/auth/register
///
/// 사용자 생성 후 OTP 발송 (이메일 우선, 없으면 휴대폰).
/// 발송 실패는 가입 자체를 실패시키지 않고 `otpSent: false`로 알린다.
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let input = req.validate()?;
    let duplicate =
        || ApiError::AlreadyExists("User already exists with this email or mobile".to_string());

    if state
        .db
        .user_exists(input.email.as_deref(), input.mobile.as_deref())
        .await?
    {
        return Err(duplicate());
    }

    let password_hash = state.auth.hash_password(&input.password).await?;
    let user = state
        .db
        .create_user(
            &input.name,
            input.email.as_deref(),
            input.mobile.as_deref(),
            &password_hash,
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate()
            } else {
                ApiError::from(e)
            }
        })?;

    tracing::info!(user_id = user.id, "User registered");

    let otp_sent = match (&input.email, &input.mobile) {
        (Some(email), _) => state.otp.send(user.id, OtpChannel::Email, email).await,
        (None, Some(mobile)) => state.otp.send(user.id, OtpChannel::Mobile, mobile).await,
        (None, None) => false,
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: user.id,
            otp_sent,
            verification_required: true,
        }),
    ))
}

/// POST /api/auth/send-otp
pub async fn send_otp(
    State(state): State<AppState>,
    AppJson(req): AppJson<SendOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user_id, channel) = req.validate()?;

    let user = state
        .db
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    let destination = match channel {
        OtpChannel::Email => user.email,
        OtpChannel::Mobile => user.mobile,
    }
    .ok_or_else(|| ApiError::BadRequest(format!("{} not found for user", channel)))?;

    if !state.otp.send(user.id, channel, &destination).await {
        return Err(ApiError::OtpDeliveryFailed);
    }

    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

/// POST /api/auth/verify-otp
///
/// 코드는 한 번만 사용할 수 있다. 성공하면 사용자를 인증 상태로 바꾼다.
pub async fn verify_otp(
    State(state): State<AppState>,
    AppJson(req): AppJson<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let check = req.validate()?;

    if !state
        .otp
        .verify(check.user_id, &check.code, check.channel)
        .await?
    {
        return Err(ApiError::BadRequest("Invalid OTP".to_string()));
    }

    state.db.mark_user_verified(check.user_id).await?;
    tracing::info!(user_id = check.user_id, "User verified");

    Ok(Json(MessageResponse::new("OTP verified successfully")))
}

/// POST /api/auth/login
///
/// 사용자 없음과 비밀번호 불일치는 같은 401 응답
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (identifier, password) = req.validate()?;
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .db
        .find_user_by_identifier(&identifier)
        .await?
        .ok_or_else(invalid)?;

    if !state.auth.verify_password(&password, &user.password_hash).await {
        return Err(invalid());
    }

    let token = state.auth.issue_token(user.id)?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        is_verified: user.is_verified,
        user,
    }))
}

/// GET /api/auth/profile
pub async fn get_profile(AuthUser(user): AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        message: None,
        user,
    })
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let (name, avatar) = req.validate()?;
    if name.is_none() && avatar.is_none() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let updated = state
        .db
        .update_profile(user.id(), name.as_deref(), avatar.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    Ok(Json(ProfileResponse {
        message: Some("Profile updated successfully".to_string()),
        user: updated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(email: Option<&str>, mobile: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: Some("  Asha Rao ".to_string()),
            email: email.map(str::to_string),
            mobile: mobile.map(str::to_string),
            password: Some("secret1".to_string()),
        }
    }

    #[test]
    fn test_register_normalizes_input() {
        let input = register_request(Some("Asha@Example.com"), None)
            .validate()
            .unwrap();
        assert_eq!(input.name, "Asha Rao");
        assert_eq!(input.email.as_deref(), Some("asha@example.com"));
        assert!(input.mobile.is_none());
    }

    #[test]
    fn test_register_requires_email_or_mobile() {
        let errors = register_request(None, Some("")).validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email"]);

        assert!(register_request(None, Some("+919876543210")).validate().is_ok());
    }

    #[test]
    fn test_register_collects_every_field_error() {
        let req = RegisterRequest {
            name: Some("A".to_string()),
            email: Some("not-an-email".to_string()),
            mobile: Some("12ab".to_string()),
            password: Some("123".to_string()),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["name", "email", "mobile", "password"]
        );
    }

    #[test]
    fn test_verify_otp_requires_six_digits() {
        let req = VerifyOtpRequest {
            user_id: Some(4),
            otp: Some("12345".to_string()),
            channel: Some("sms".to_string()),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["otp", "type"]);

        let req = VerifyOtpRequest {
            user_id: Some(4),
            otp: Some("042917".to_string()),
            channel: Some("mobile".to_string()),
        };
        let check = req.validate().unwrap();
        assert_eq!(check.code, "042917");
        assert_eq!(check.channel, OtpChannel::Mobile);
    }

    #[test]
    fn test_send_otp_rejects_missing_user() {
        let req = SendOtpRequest {
            user_id: None,
            channel: Some("email".to_string()),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["userId"]);
    }

    #[test]
    fn test_profile_update_validation() {
        let req = UpdateProfileRequest {
            name: None,
            avatar: Some("ftp://files/avatar.png".to_string()),
        };
        assert!(req.validate().is_err());

        let req = UpdateProfileRequest {
            name: Some("Ravi".to_string()),
            avatar: Some("https://cdn.example.com/a.png".to_string()),
        };
        let (name, avatar) = req.validate().unwrap();
        assert_eq!(name.as_deref(), Some("Ravi"));
        assert!(avatar.is_some());
    }
}
