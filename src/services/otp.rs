//! OTP Service
//!
//! 발급 → 저장 (만료 시각 포함) → 전달 → 검증 (1회용) → 주기적 정리.
//!
//! 정리 작업은 `OtpSweeper`가 소유하는 tokio task에서 돌며,
//! `main`에서 서버 시작 전에 `start`, graceful shutdown 후에 `stop`한다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::notifier::OtpDelivery;
use crate::db::OtpStore;
use crate::types::OtpChannel;

/// 6자리 숫자 코드 (100000 ~ 999999, 균등 분포)
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}

/// OTP 발급/검증
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    delivery: Arc<dyn OtpDelivery>,
    ttl: chrono::Duration,
}

impl OtpService {
    pub fn new(store: Arc<dyn OtpStore>, delivery: Arc<dyn OtpDelivery>, ttl: Duration) -> Self {
        Self {
            store,
            delivery,
            ttl: chrono::Duration::seconds(ttl.as_secs() as i64),
        }
    }

    /// 코드를 만들어 저장하고 전달한다.
    ///
    /// 저장이나 전달이 실패하면 `false`. 재시도는 하지 않는다.
    pub async fn send(&self, user_id: i64, channel: OtpChannel, destination: &str) -> bool {
        match self.issue(user_id, channel, destination).await {
            Ok(()) => {
                tracing::info!(user_id, %channel, "OTP sent");
                true
            }
            Err(e) => {
                tracing::warn!(user_id, %channel, "OTP delivery failed: {:#}", e);
                false
            }
        }
    }

    async fn issue(&self, user_id: i64, channel: OtpChannel, destination: &str) -> Result<()> {
        let code = generate_code();
        let expires_at = Utc::now() + self.ttl;

        self.store
            .insert_otp(user_id, &code, channel, expires_at)
            .await?;
        self.delivery.deliver(channel, destination, &code).await
    }

    /// 코드 검증. 일치하면 사용 처리되어 다시 쓸 수 없다.
    pub async fn verify(&self, user_id: i64, code: &str, channel: OtpChannel) -> Result<bool> {
        self.store
            .consume_otp(user_id, code, channel, Utc::now())
            .await
    }
}

// ============ Sweeper ============

/// 만료/사용된 코드 1회 정리. 실패는 로그만 남긴다.
pub async fn sweep_once(store: &dyn OtpStore) -> u64 {
    match store.purge_otps(Utc::now()).await {
        Ok(removed) => {
            tracing::debug!(removed, "OTP sweep finished");
            removed
        }
        Err(e) => {
            tracing::warn!("OTP sweep failed: {:#}", e);
            0
        }
    }
}

/// 주기적 OTP 정리 task 핸들
pub struct OtpSweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl OtpSweeper {
    /// 첫 정리는 `period` 후에 실행된다.
    pub fn start(store: Arc<dyn OtpStore>, period: Duration) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sweep_once(store.as_ref()).await;
                    }
                    _ = stopped.changed() => break,
                }
            }

            tracing::info!("OTP sweeper stopped");
        });

        tracing::info!(interval_secs = period.as_secs(), "OTP sweeper started");
        Self { shutdown, handle }
    }

    /// 종료 신호를 보내고 task가 끝날 때까지 기다린다.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!("OTP sweeper task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock::MockOtpStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 마지막으로 보낸 코드를 기억하는 전달 수단
    struct RecordingDelivery {
        sent: Mutex<Vec<(OtpChannel, String, String)>>,
        fail: bool,
    }

    impl RecordingDelivery {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn last_code(&self) -> String {
            self.sent.lock().unwrap().last().unwrap().2.clone()
        }
    }

    #[async_trait]
    impl OtpDelivery for RecordingDelivery {
        async fn deliver(&self, channel: OtpChannel, destination: &str, code: &str) -> Result<()> {
            if self.fail {
                anyhow::bail!("provider down");
            }
            self.sent
                .lock()
                .unwrap()
                .push((channel, destination.to_string(), code.to_string()));
            Ok(())
        }
    }

    fn service(
        store: Arc<MockOtpStore>,
        delivery: Arc<RecordingDelivery>,
    ) -> OtpService {
        OtpService::new(store, delivery, Duration::from_secs(600))
    }

    #[test]
    fn test_generated_code_is_six_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[tokio::test]
    async fn test_send_stores_code_with_expiry() {
        let store = Arc::new(MockOtpStore::new());
        let delivery = RecordingDelivery::new(false);
        let otp = service(store.clone(), delivery.clone());

        assert!(otp.send(1, OtpChannel::Email, "jane@example.com").await);

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, delivery.last_code());
        let remaining = records[0].expires_at - Utc::now();
        assert!(remaining > chrono::Duration::minutes(9));
        assert!(remaining <= chrono::Duration::minutes(10));
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let store = Arc::new(MockOtpStore::new());
        let delivery = RecordingDelivery::new(false);
        let otp = service(store.clone(), delivery.clone());

        otp.send(1, OtpChannel::Mobile, "+15551234567").await;
        let code = delivery.last_code();

        assert!(otp.verify(1, &code, OtpChannel::Mobile).await.unwrap());
        assert!(!otp.verify(1, &code, OtpChannel::Mobile).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_checks_user_and_channel() {
        let store = Arc::new(MockOtpStore::new());
        let delivery = RecordingDelivery::new(false);
        let otp = service(store.clone(), delivery.clone());

        otp.send(1, OtpChannel::Email, "jane@example.com").await;
        let code = delivery.last_code();

        assert!(!otp.verify(2, &code, OtpChannel::Email).await.unwrap());
        assert!(!otp.verify(1, &code, OtpChannel::Mobile).await.unwrap());
        assert!(otp.verify(1, &code, OtpChannel::Email).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let store = Arc::new(MockOtpStore::new());
        let otp = service(store.clone(), RecordingDelivery::new(false));

        store
            .insert_otp(1, "123456", OtpChannel::Email, Utc::now() - chrono::Duration::seconds(1))
            .await
            .unwrap();

        assert!(!otp.verify(1, "123456", OtpChannel::Email).await.unwrap());
    }

    #[tokio::test]
    async fn test_delivery_failure_reports_false() {
        let store = Arc::new(MockOtpStore::new());
        let otp = service(store, RecordingDelivery::new(true));

        assert!(!otp.send(1, OtpChannel::Email, "jane@example.com").await);
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_and_used() {
        let store = Arc::new(MockOtpStore::new());
        let now = Utc::now();
        store
            .insert_otp(1, "111111", OtpChannel::Email, now - chrono::Duration::minutes(1))
            .await
            .unwrap();
        store
            .insert_otp(1, "222222", OtpChannel::Email, now + chrono::Duration::minutes(5))
            .await
            .unwrap();
        store
            .insert_otp(1, "333333", OtpChannel::Email, now + chrono::Duration::minutes(5))
            .await
            .unwrap();
        store
            .consume_otp(1, "333333", OtpChannel::Email, now)
            .await
            .unwrap();

        assert_eq!(sweep_once(store.as_ref()).await, 2);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].code, "222222");

        // 두 번째 실행은 지울 것이 없다
        assert_eq!(sweep_once(store.as_ref()).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_interval_and_stops() {
        let store = Arc::new(MockOtpStore::new());
        let sweeper = OtpSweeper::start(store.clone(), Duration::from_secs(3600));

        // 즉시 실행되지 않음
        tokio::task::yield_now().await;
        assert_eq!(store.purge_runs(), 0);

        // paused clock은 idle 상태에서 다음 tick까지 자동으로 진행된다
        store.purged.notified().await;
        assert_eq!(store.purge_runs(), 1);

        sweeper.stop().await;
        let runs = store.purge_runs();
        tokio::time::sleep(Duration::from_secs(7200)).await;
        assert_eq!(store.purge_runs(), runs);
    }
}
