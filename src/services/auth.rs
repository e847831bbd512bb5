//! Authentication Service
//!
//! - 비밀번호: Argon2id 해시 (PHC 문자열로 저장)
//! - 세션: HS256 JWT, custom claim에 `user_id`

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jwt_simple::prelude::*;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// HMAC 키 최소 길이 (96 bit)
pub const MIN_SECRET_BYTES: usize = 12;

/// JWT custom claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
}

/// 비밀번호 해싱/검증 + 토큰 발급/검증
pub struct AuthService {
    key: HS256Key,
    token_ttl: Duration,
}

impl AuthService {
    /// HS256 키는 최소 12바이트 (jwt-simple이 더 짧은 키로는 서명/검증을 거부)
    pub fn new(secret: &str, token_ttl: Duration) -> Result<Self> {
        if secret.len() < MIN_SECRET_BYTES {
            bail!("JWT secret must be at least {MIN_SECRET_BYTES} bytes");
        }

        Ok(Self {
            key: HS256Key::from_bytes(secret.as_bytes()),
            token_ttl,
        })
    }

    /// Argon2id 해시 생성 (blocking pool에서 실행)
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .context("password hashing task failed")?
    }

    /// 저장된 해시와 비교. 해시 형식이 깨졌으면 false.
    pub async fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        match tokio::task::spawn_blocking(move || verify_blocking(&password, &stored_hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }

    /// 로그인 토큰 발급
    pub fn issue_token(&self, user_id: i64) -> Result<String> {
        let claims = Claims::with_custom_claims(
            SessionClaims { user_id },
            jwt_simple::prelude::Duration::from_secs(self.token_ttl.as_secs()),
        );
        self.key
            .authenticate(claims)
            .map_err(|e| anyhow!("token signing failed: {e}"))
    }

    /// 토큰 검증 후 user id 반환
    pub fn verify_token(&self, token: &str) -> Option<i64> {
        self.key
            .verify_token::<SessionClaims>(token, None)
            .map(|claims| claims.custom.user_id)
            .ok()
    }
}

fn hash_blocking(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!("salt: {e}"))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;

    Ok(hash.to_string())
}

fn verify_blocking(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}
