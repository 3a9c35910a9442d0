//! Key/value app settings. Holds the subscription flag that gates insights.

use sqlx::SqlitePool;

use super::StoreError;

const SUBSCRIBED_KEY: &str = "is_subscribed";

/// Subscription flag access. Enables mocking in tests.
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// `false` until explicitly set.
    async fn is_subscribed(&self) -> Result<bool, StoreError>;
    async fn set_subscribed(&self, subscribed: bool) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteSettings {
    pool: SqlitePool,
}

impl SqliteSettings {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SettingsStore for SqliteSettings {
    async fn is_subscribed(&self) -> Result<bool, StoreError> {
        match self.get(SUBSCRIBED_KEY).await?.as_deref() {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(StoreError::InvalidValue { key: SUBSCRIBED_KEY.into(), value: other.into() }),
        }
    }

    async fn set_subscribed(&self, subscribed: bool) -> Result<(), StoreError> {
        self.set(SUBSCRIBED_KEY, if subscribed { "true" } else { "false" }).await
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
