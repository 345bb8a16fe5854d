//! Typed accessors over the `settings` key-value table.
//!
//! Each enforcement knob lives under its own key so a counter flush only
//! rewrites the rows it touches. Missing keys fall back to defaults, which is
//! also the first-run behavior. Unparseable stored values are treated as
//! missing rather than failing the read.

use chrono::Utc;
use tracing::warn;

use playtime_common::types::{AccessSchedule, ScreenTimeConfig};

use crate::connection::Database;
use crate::error::Result;

pub const KEY_QUOTA_ENABLED: &str = "screen_time.enabled";
pub const KEY_DAILY_LIMIT_MINUTES: &str = "screen_time.daily_limit_minutes";
pub const KEY_USED_TODAY_MINUTES: &str = "screen_time.used_today_minutes";
pub const KEY_LAST_RESET_DATE: &str = "screen_time.last_reset_date";
pub const KEY_SCHEDULE_ENABLED: &str = "schedule.enabled";
pub const KEY_SCHEDULE_START: &str = "schedule.start";
pub const KEY_SCHEDULE_END: &str = "schedule.end";
pub const KEY_PIN_HASH: &str = "security.pin_hash";

pub struct SettingsQueries;

impl SettingsQueries {
    pub async fn get(db: &Database, key: &str) -> Result<Option<String>> {
        let pool = db.pool()?;

        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(key)
                .fetch_optional(pool)
                .await?;

        Ok(value)
    }

    pub async fn set(db: &Database, key: &str, value: &str) -> Result<()> {
        let pool = db.pool()?;
        upsert(pool, key, value).await
    }

    /// Load the quota state, substituting defaults for missing keys.
    pub async fn screen_time(db: &Database) -> Result<ScreenTimeConfig> {
        let defaults = ScreenTimeConfig::default();

        Ok(ScreenTimeConfig {
            enabled: parse_or(Self::get(db, KEY_QUOTA_ENABLED).await?, defaults.enabled),
            daily_limit_minutes: parse_or(
                Self::get(db, KEY_DAILY_LIMIT_MINUTES).await?,
                defaults.daily_limit_minutes,
            ),
            used_today_minutes: parse_or(
                Self::get(db, KEY_USED_TODAY_MINUTES).await?,
                defaults.used_today_minutes,
            ),
            last_reset_date: parse_or(
                Self::get(db, KEY_LAST_RESET_DATE).await?,
                defaults.last_reset_date,
            ),
        })
    }

    /// Persist the quota state. The counter and its reset-date stamp land in
    /// one transaction so a day rollover is never half-applied.
    pub async fn save_screen_time(db: &Database, config: &ScreenTimeConfig) -> Result<()> {
        let pool = db.pool()?;
        let mut tx = pool.begin().await?;

        upsert(&mut *tx, KEY_QUOTA_ENABLED, &config.enabled.to_string()).await?;
        upsert(&mut *tx, KEY_DAILY_LIMIT_MINUTES, &config.daily_limit_minutes.to_string()).await?;
        upsert(&mut *tx, KEY_USED_TODAY_MINUTES, &config.used_today_minutes.to_string()).await?;
        upsert(&mut *tx, KEY_LAST_RESET_DATE, &config.last_reset_date.to_string()).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn access_schedule(db: &Database) -> Result<AccessSchedule> {
        let defaults = AccessSchedule::default();

        Ok(AccessSchedule {
            enabled: parse_or(Self::get(db, KEY_SCHEDULE_ENABLED).await?, defaults.enabled),
            start: Self::get(db, KEY_SCHEDULE_START).await?.unwrap_or(defaults.start),
            end: Self::get(db, KEY_SCHEDULE_END).await?.unwrap_or(defaults.end),
        })
    }

    pub async fn save_access_schedule(db: &Database, schedule: &AccessSchedule) -> Result<()> {
        let pool = db.pool()?;
        let mut tx = pool.begin().await?;

        upsert(&mut *tx, KEY_SCHEDULE_ENABLED, &schedule.enabled.to_string()).await?;
        upsert(&mut *tx, KEY_SCHEDULE_START, &schedule.start).await?;
        upsert(&mut *tx, KEY_SCHEDULE_END, &schedule.end).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn pin_hash(db: &Database) -> Result<Option<String>> {
        Self::get(db, KEY_PIN_HASH).await
    }

    /// Store the parent PIN hash. The write is awaited to completion before
    /// returning, so a confirmed PIN change is durable.
    pub async fn set_pin_hash(db: &Database, hash: &str) -> Result<()> {
        Self::set(db, KEY_PIN_HASH, hash).await
    }
}

async fn upsert(
    executor: impl sqlx::SqliteExecutor<'_>,
    key: &str,
    value: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => match raw.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(value = %raw, "Unparseable settings value, using default");
                default
            }
        },
        None => default,
    }
}
