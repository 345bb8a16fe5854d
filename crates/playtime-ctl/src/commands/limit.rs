use std::sync::Arc;

use anyhow::Result;

use playtime_common::clock::{Clock, SystemClock};
use playtime_common::limits::ensure_current_day;
use playtime_engine::OverrideAuthority;
use playtime_store::SettingsQueries;

pub async fn set(minutes: u32) -> Result<()> {
    let db = super::open_database().await?;
    let authority = OverrideAuthority::new(db.clone(), Arc::new(SystemClock));
    super::authorize_settings(&db, &authority).await?;

    let config = SettingsQueries::screen_time(&db).await?;
    let mut config = ensure_current_day(&config, SystemClock.today());
    config.daily_limit_minutes = minutes;
    config.enabled = true;
    SettingsQueries::save_screen_time(&db, &config).await?;

    println!("Daily limit set to {} minutes (enforcement enabled)", minutes);
    Ok(())
}

pub async fn set_enabled(enabled: bool) -> Result<()> {
    let db = super::open_database().await?;
    let authority = OverrideAuthority::new(db.clone(), Arc::new(SystemClock));
    super::authorize_settings(&db, &authority).await?;

    let config = SettingsQueries::screen_time(&db).await?;
    let mut config = ensure_current_day(&config, SystemClock.today());
    config.enabled = enabled;
    SettingsQueries::save_screen_time(&db, &config).await?;

    println!("Daily limit enforcement {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
