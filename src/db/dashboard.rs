//! Dashboard catalog queries (quotes, badges)

use anyhow::Result;

use super::{Database, EarnedBadge, Quote};

impl Database {
    /// 활성 명언 중 하나를 무작위로
    pub async fn random_quote(&self) -> Result<Option<Quote>> {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            SELECT id, quote, author
            FROM motivational_quotes
            WHERE is_active = TRUE
            ORDER BY RANDOM()
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(quote)
    }

    /// 획득한 배지 (최근 순)
    pub async fn earned_badges(&self, user_id: i64) -> Result<Vec<EarnedBadge>> {
        let badges = sqlx::query_as::<_, EarnedBadge>(
            r#"
            SELECT b.id, b.name, b.description, b.icon, ub.earned_at
            FROM badges b
            INNER JOIN user_badges ub ON ub.badge_id = b.id
            WHERE ub.user_id = $1
            ORDER BY ub.earned_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }
}
