//! OTP Delivery
//!
//! Email은 HTTP JSON API (Bearer 인증), SMS는 Twilio REST API (Basic 인증)로 보낸다.
//! 설정되지 않은 채널로 보내면 에러를 돌려준다. 재시도는 하지 않는다.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::config::{EmailConfig, SmsConfig};
use crate::types::OtpChannel;

/// OTP 전달 수단
#[async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn deliver(&self, channel: OtpChannel, destination: &str, code: &str) -> Result<()>;
}

/// Email API 요청 본문
#[derive(Debug, Serialize)]
struct EmailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: String,
}

/// Email / SMS 발송기
pub struct Notifier {
    http: reqwest::Client,
    email: Option<EmailConfig>,
    sms: Option<SmsConfig>,
    ttl_minutes: u64,
}

impl Notifier {
    /// 외부 API 호출 타임아웃
    const REQUEST_TIMEOUT_SECS: u64 = 10;

    pub fn new(email: Option<EmailConfig>, sms: Option<SmsConfig>, otp_ttl: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http,
            email,
            sms,
            ttl_minutes: otp_ttl.as_secs() / 60,
        }
    }

    async fn send_email(&self, to: &str, code: &str) -> Result<()> {
        let config = self
            .email
            .as_ref()
            .ok_or_else(|| anyhow!("email delivery is not configured"))?;

        let message = EmailMessage {
            from: &config.from,
            to,
            subject: "Wellness Tracker - OTP Verification",
            html: email_body(code, self.ttl_minutes),
        };

        self.http
            .post(&config.api_url)
            .bearer_auth(&config.api_key)
            .json(&message)
            .send()
            .await
            .context("email provider request failed")?
            .error_for_status()
            .context("email provider rejected the message")?;

        Ok(())
    }

    async fn send_sms(&self, to: &str, code: &str) -> Result<()> {
        let config = self
            .sms
            .as_ref()
            .ok_or_else(|| anyhow!("sms delivery is not configured"))?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base.trim_end_matches('/'),
            config.account_sid
        );
        let body = format!(
            "Your Wellness Tracker OTP is: {}. Valid for {} minutes.",
            code, self.ttl_minutes
        );

        self.http
            .post(url)
            .basic_auth(&config.account_sid, Some(&config.auth_token))
            .form(&[
                ("To", to),
                ("From", config.from_number.as_str()),
                ("Body", body.as_str()),
            ])
            .send()
            .await
            .context("sms provider request failed")?
            .error_for_status()
            .context("sms provider rejected the message")?;

        Ok(())
    }
}

#[async_trait]
impl OtpDelivery for Notifier {
    async fn deliver(&self, channel: OtpChannel, destination: &str, code: &str) -> Result<()> {
        match channel {
            OtpChannel::Email => self.send_email(destination, code).await,
            OtpChannel::Mobile => self.send_sms(destination, code).await,
        }
    }
}

fn email_body(code: &str, ttl_minutes: u64) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #4CAF50; text-align: center;">Wellness &amp; Habit Tracker</h2>
  <p>Your verification code is:</p>
  <div style="background-color: #4CAF50; color: white; padding: 15px; text-align: center; font-size: 24px; letter-spacing: 5px;">{code}</div>
  <p>This code will expire in {ttl_minutes} minutes.</p>
  <p style="color: #999; font-size: 12px;">If you didn't request this code, please ignore this email.</p>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TTL: Duration = Duration::from_secs(600);

    fn sms_config(api_base: String) -> SmsConfig {
        SmsConfig {
            api_base,
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_number: "+15550000000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sms_goes_to_twilio_messages_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(body_string_contains("483920"))
            .and(body_string_contains("Valid+for+10+minutes"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Notifier::new(None, Some(sms_config(server.uri())), TTL);
        notifier
            .deliver(OtpChannel::Mobile, "+15551234567", "483920")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_email_posts_json_with_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("authorization", "Bearer email-key"))
            .and(body_partial_json(serde_json::json!({
                "to": "jane@example.com",
                "from": "no-reply@wellness.local",
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let email = EmailConfig {
            api_url: format!("{}/send", server.uri()),
            api_key: "email-key".to_string(),
            from: "no-reply@wellness.local".to_string(),
        };
        let notifier = Notifier::new(Some(email), None, TTL);
        notifier
            .deliver(OtpChannel::Email, "jane@example.com", "111222")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = Notifier::new(None, Some(sms_config(server.uri())), TTL);
        let result = notifier.deliver(OtpChannel::Mobile, "+15551234567", "000111").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_channel_fails() {
        let notifier = Notifier::new(None, None, TTL);
        assert!(notifier
            .deliver(OtpChannel::Email, "jane@example.com", "123456")
            .await
            .is_err());
    }

    #[test]
    fn test_email_body_contains_code() {
        let html = email_body("987654", 10);
        assert!(html.contains("987654"));
        assert!(html.contains("10 minutes"));
    }
}
