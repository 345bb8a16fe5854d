use std::sync::Arc;

use anyhow::Result;

use playtime_common::clock::SystemClock;
use playtime_engine::OverrideAuthority;
use playtime_store::SettingsQueries;

pub async fn extend(minutes: u32) -> Result<()> {
    let db = super::open_database().await?;
    let authority = OverrideAuthority::new(db.clone(), Arc::new(SystemClock));

    let token = super::authorize(&authority).await?;
    authority.extend_screen_time(&token, minutes).await?;

    let config = SettingsQueries::screen_time(&db).await?;
    let remaining = config.daily_limit_minutes.saturating_sub(config.used_today_minutes);
    println!("Granted {} extra minutes ({} minutes remaining today)", minutes, remaining);
    Ok(())
}

pub async fn reset() -> Result<()> {
    let db = super::open_database().await?;
    let authority = OverrideAuthority::new(db.clone(), Arc::new(SystemClock));

    let token = super::authorize(&authority).await?;
    authority.reset_daily_counter(&token).await?;

    println!("Today's usage counter reset to zero");
    Ok(())
}

pub async fn disable() -> Result<()> {
    let db = super::open_database().await?;
    let authority = OverrideAuthority::new(db.clone(), Arc::new(SystemClock));

    let token = super::authorize(&authority).await?;
    authority.set_enforcement_enabled(&token, false).await?;

    println!("Quota enforcement disabled");
    Ok(())
}
