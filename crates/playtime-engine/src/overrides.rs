//! Override authority: the PIN-gated actions a parent can take to adjust or
//! bypass current restrictions. Every mutating operation demands a
//! `ParentToken`, which only a successful `verify_pin` can produce.

use std::sync::Arc;

use anyhow::{ensure, Result};
use secrecy::SecretString;
use tracing::{info, warn};

use playtime_common::clock::Clock;
use playtime_common::limits::ensure_current_day;
use playtime_common::security::{check_pin, PinManager};
use playtime_common::types::{ParentToken, PinVerification};
use playtime_store::{Database, SettingsQueries};

use crate::coordinator::PlaybackCoordinator;

pub struct OverrideAuthority {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    coordinator: Option<Arc<PlaybackCoordinator>>,
}

impl OverrideAuthority {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock, coordinator: None }
    }

    /// Wire overrides to the coordinator so each one pushes a fresh
    /// evaluation immediately instead of waiting for the next tick.
    pub fn with_coordinator(mut self, coordinator: Arc<PlaybackCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    async fn push_refresh(&self) {
        if let Some(coordinator) = &self.coordinator {
            if let Err(e) = coordinator.refresh().await {
                warn!("Post-override re-evaluation failed: {}", e);
            }
        }
    }

    /// Check an entered PIN. `NotSet` means no PIN has been configured yet
    /// and the caller should offer the setup flow instead of an error.
    pub async fn verify_pin(&self, pin: &SecretString) -> Result<PinVerification> {
        let stored = SettingsQueries::pin_hash(&self.db).await?;
        Ok(check_pin(pin, stored.as_deref())?)
    }

    /// Set or replace the parent PIN. The hash write completes before this
    /// returns.
    pub async fn set_pin(&self, pin: &SecretString) -> Result<()> {
        let hash = PinManager::hash_pin(pin)?;
        SettingsQueries::set_pin_hash(&self.db, &hash).await?;
        info!("Parent PIN updated");
        Ok(())
    }

    /// Grant extra minutes today by lowering the used counter, so the next
    /// evaluation sees remaining time increased by exactly this amount.
    pub async fn extend_screen_time(
        &self,
        _token: &ParentToken,
        additional_minutes: u32,
    ) -> Result<()> {
        ensure!(additional_minutes > 0, "extension must be a positive number of minutes");

        let config = SettingsQueries::screen_time(&self.db).await?;
        let mut config = ensure_current_day(&config, self.clock.today());
        config.used_today_minutes = config.used_today_minutes.saturating_sub(additional_minutes);
        SettingsQueries::save_screen_time(&self.db, &config).await?;

        info!(minutes = additional_minutes, "Screen time extended");
        self.push_refresh().await;
        Ok(())
    }

    /// Zero today's counter unconditionally and re-stamp the reset date.
    pub async fn reset_daily_counter(&self, _token: &ParentToken) -> Result<()> {
        let mut config = SettingsQueries::screen_time(&self.db).await?;
        config.used_today_minutes = 0;
        config.last_reset_date = self.clock.today();
        SettingsQueries::save_screen_time(&self.db, &config).await?;

        info!("Daily usage counter reset");
        self.push_refresh().await;
        Ok(())
    }

    /// Settings path for turning quota enforcement off (or back on).
    pub async fn set_enforcement_enabled(&self, _token: &ParentToken, enabled: bool) -> Result<()> {
        let config = SettingsQueries::screen_time(&self.db).await?;
        let config = ensure_current_day(&config, self.clock.today());
        let config = playtime_common::types::ScreenTimeConfig { enabled, ..config };
        SettingsQueries::save_screen_time(&self.db, &config).await?;

        info!(enabled, "Quota enforcement toggled");
        self.push_refresh().await;
        Ok(())
    }
}
