use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::warn;

use crate::config::Config;
use crate::models::Theme;

const THEME_KEY: &str = "theme";

/// Key-value preference store
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the store at `database_url`
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // A single connection keeps `sqlite::memory:` stores coherent
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(value)
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    /// Stored theme; a missing or unrecognised value means light.
    pub async fn load_theme(&self) -> Result<Theme> {
        let stored = self.get_setting(THEME_KEY).await?;
        let theme = match stored.as_deref() {
            Some(value) => value.parse::<Theme>().unwrap_or_else(|_| {
                warn!(value, "ignoring unknown stored theme");
                Theme::Light
            }),
            None => Theme::Light,
        };

        Ok(theme)
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<()> {
        self.set_setting(THEME_KEY, theme.as_str()).await
    }
}

/// Open the preference store. A store that cannot be opened is logged and
/// the session carries on without one.
pub async fn init(config: &Config) -> Option<Database> {
    match Database::new(&config.database_url).await {
        Ok(db) => Some(db),
        Err(err) => {
            warn!(error = %err, url = %config.database_url, "preference store unavailable, using defaults");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Database {
        Database::new("sqlite::memory:").await.expect("db")
    }

    #[tokio::test]
    async fn missing_theme_defaults_to_light() {
        let db = memory_db().await;
        assert_eq!(db.load_theme().await.expect("theme"), Theme::Light);
    }

    #[tokio::test]
    async fn theme_round_trips() {
        let db = memory_db().await;
        db.save_theme(Theme::Dark).await.expect("save");
        assert_eq!(db.load_theme().await.expect("theme"), Theme::Dark);
        assert_eq!(db.get_setting("theme").await.expect("get").as_deref(), Some("dark"));

        db.save_theme(Theme::Light).await.expect("save");
        assert_eq!(db.load_theme().await.expect("theme"), Theme::Light);
    }

    #[tokio::test]
    async fn unknown_theme_value_falls_back_to_light() {
        let db = memory_db().await;
        db.set_setting("theme", "sepia").await.expect("set");
        assert_eq!(db.load_theme().await.expect("theme"), Theme::Light);
    }

    #[tokio::test]
    async fn theme_survives_reopening_file_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.db");
        let url = format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"));

        let db = Database::new(&url).await.expect("db");
        db.save_theme(Theme::Dark).await.expect("save");
        db.get_pool().close().await;
        drop(db);

        let reopened = Database::new(&url).await.expect("db");
        assert_eq!(reopened.load_theme().await.expect("theme"), Theme::Dark);
    }

    #[tokio::test]
    async fn unreachable_store_degrades_to_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").expect("write");
        let config = Config {
            database_url: format!("sqlite://{}", blocker.join("prefs.db").to_string_lossy()),
            ..Config::default()
        };
        assert!(init(&config).await.is_none());
    }
}
