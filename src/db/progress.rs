//! Progress metric queries

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::{Database, MetricStore, NewMetric, ProgressMetric};
use crate::types::MetricType;

const METRIC_COLUMNS: &str = "id, user_id, metric_type, value, target_value, date, created_at";

/// 목록 조회 조건
#[derive(Debug, Clone, Default)]
pub struct MetricFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub metric_type: Option<MetricType>,
}

/// 값 / 목표 수정. `None`이면 그대로
#[derive(Debug, Clone, Default)]
pub struct MetricUpdate {
    pub value: Option<f64>,
    pub target_value: Option<f64>,
}

impl Database {
    /// 조건에 맞는 지표 (최근 날짜 순)
    pub async fn list_metrics(
        &self,
        user_id: i64,
        filter: &MetricFilter,
    ) -> Result<Vec<ProgressMetric>> {
        let metrics = sqlx::query_as::<_, ProgressMetric>(&format!(
            r#"
            SELECT {METRIC_COLUMNS}
            FROM progress_metrics
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR date >= $2)
              AND ($3::DATE IS NULL OR date <= $3)
              AND ($4::VARCHAR IS NULL OR metric_type = $4)
            ORDER BY date DESC
            "#
        ))
        .bind(user_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.metric_type.map(|m| m.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(metrics)
    }

    /// 최근 지표 N개 (대시보드)
    pub async fn recent_metrics(&self, user_id: i64, limit: i64) -> Result<Vec<ProgressMetric>> {
        let metrics = sqlx::query_as::<_, ProgressMetric>(&format!(
            "SELECT {METRIC_COLUMNS} FROM progress_metrics WHERE user_id = $1 ORDER BY date DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(metrics)
    }

    pub async fn update_metric(
        &self,
        metric_id: i64,
        user_id: i64,
        update: &MetricUpdate,
    ) -> Result<Option<ProgressMetric>> {
        let metric = sqlx::query_as::<_, ProgressMetric>(&format!(
            r#"
            UPDATE progress_metrics
            SET value = COALESCE($3, value),
                target_value = COALESCE($4, target_value)
            WHERE id = $1 AND user_id = $2
            RETURNING {METRIC_COLUMNS}
            "#
        ))
        .bind(metric_id)
        .bind(user_id)
        .bind(update.value)
        .bind(update.target_value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(metric)
    }

    pub async fn delete_metric(&self, metric_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM progress_metrics WHERE id = $1 AND user_id = $2")
            .bind(metric_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MetricStore for Database {
    async fn metric_exists(
        &self,
        user_id: i64,
        metric_type: MetricType,
        date: NaiveDate,
    ) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM progress_metrics
                WHERE user_id = $1 AND metric_type = $2 AND date = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(metric_type.as_str())
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_metric(&self, user_id: i64, metric: &NewMetric) -> Result<ProgressMetric> {
        let row = sqlx::query_as::<_, ProgressMetric>(&format!(
            r#"
            INSERT INTO progress_metrics (user_id, metric_type, value, target_value, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {METRIC_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(metric.metric_type.as_str())
        .bind(metric.value)
        .bind(metric.target_value)
        .bind(metric.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
