//! OTP code queries

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Database, OtpStore};
use crate::types::OtpChannel;

#[async_trait]
impl OtpStore for Database {
    async fn insert_otp(
        &self,
        user_id: i64,
        code: &str,
        channel: OtpChannel,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO otp_codes (user_id, otp, channel, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(channel.as_str())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_otp(
        &self,
        user_id: i64,
        code: &str,
        channel: OtpChannel,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        // 조회와 사용 처리를 한 문장으로 (같은 코드의 동시 검증 방지)
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE otp_codes SET is_used = TRUE
            WHERE id = (
                SELECT id FROM otp_codes
                WHERE user_id = $1 AND otp = $2 AND channel = $3
                  AND expires_at > $4 AND is_used = FALSE
                ORDER BY created_at DESC, id DESC
                LIMIT 1
                FOR UPDATE
            )
            AND is_used = FALSE
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(channel.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn purge_otps(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE expires_at < $1 OR is_used = TRUE")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
