//! Habit / Metric Tracking
//!
//! 저장소 trait 위에서 동작하는 쓰기 로직. 소유권 확인은 호출 측(route)에서 한다.

use chrono::NaiveDate;

use crate::db::{is_unique_violation, HabitStore, MetricStore, NewMetric, ProgressMetric};
use crate::error::ApiError;

/// 완료 기록 토글. 완료 상태가 되면 `true`.
///
/// 같은 (habit, date)에 두 번 호출하면 원래 상태로 돌아온다.
pub async fn toggle_completion(
    store: &dyn HabitStore,
    habit_id: i64,
    user_id: i64,
    date: NaiveDate,
    notes: Option<&str>,
) -> Result<bool, ApiError> {
    match store.find_completion(habit_id, date).await? {
        Some(completion_id) => {
            store.delete_completion(completion_id).await?;
            Ok(false)
        }
        None => {
            store
                .insert_completion(habit_id, user_id, date, notes)
                .await?;
            Ok(true)
        }
    }
}

/// 지표 추가. 같은 (user, type, date)가 이미 있으면 거부한다.
pub async fn record_metric(
    store: &dyn MetricStore,
    user_id: i64,
    metric: &NewMetric,
) -> Result<ProgressMetric, ApiError> {
    let duplicate = || ApiError::AlreadyExists("Metric already exists for this date".to_string());

    if store
        .metric_exists(user_id, metric.metric_type, metric.date)
        .await?
    {
        return Err(duplicate());
    }

    // 확인과 삽입 사이에 같은 row가 들어오면 UNIQUE 제약이 막는다
    store.insert_metric(user_id, metric).await.map_err(|e| {
        if is_unique_violation(&e) {
            duplicate()
        } else {
            ApiError::from(e)
        }
    })
}
