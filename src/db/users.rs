//! User queries

use anyhow::Result;

use super::{Database, User};

const USER_COLUMNS: &str =
    "id, name, email, mobile, password_hash, avatar, is_verified, created_at";

impl Database {
    pub async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// email 또는 mobile 중 하나로 로그인 대상 조회
    pub async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR mobile = $1 ORDER BY id LIMIT 1"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// 같은 email 또는 mobile을 쓰는 사용자가 있는지
    pub async fn user_exists(&self, email: Option<&str>, mobile: Option<&str>) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 OR mobile = $2)",
        )
        .bind(email)
        .bind(mobile)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: Option<&str>,
        mobile: Option<&str>,
        password_hash: &str,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, mobile, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(mobile)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn mark_user_verified(&self, user_id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET is_verified = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// 주어진 값만 변경
    pub async fn update_profile(
        &self,
        user_id: i64,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                avatar = COALESCE($3, avatar)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
