use std::sync::Arc;

use anyhow::{bail, Result};

use playtime_common::clock::SystemClock;
use playtime_common::schedule::parse_time;
use playtime_engine::OverrideAuthority;
use playtime_store::SettingsQueries;

pub async fn set(start: &str, end: &str) -> Result<()> {
    let start_time = parse_time(start)?;
    let end_time = parse_time(end)?;
    if start_time >= end_time {
        bail!("Schedule start must be earlier than end (overnight windows are not supported)");
    }

    let db = super::open_database().await?;
    let authority = OverrideAuthority::new(db.clone(), Arc::new(SystemClock));
    super::authorize_settings(&db, &authority).await?;

    let mut schedule = SettingsQueries::access_schedule(&db).await?;
    schedule.start = start.to_string();
    schedule.end = end.to_string();
    schedule.enabled = true;
    SettingsQueries::save_access_schedule(&db, &schedule).await?;

    println!("Schedule set to {} - {} (enforcement enabled)", start, end);
    Ok(())
}

pub async fn set_enabled(enabled: bool) -> Result<()> {
    let db = super::open_database().await?;
    let authority = OverrideAuthority::new(db.clone(), Arc::new(SystemClock));
    super::authorize_settings(&db, &authority).await?;

    let mut schedule = SettingsQueries::access_schedule(&db).await?;
    schedule.enabled = enabled;
    SettingsQueries::save_access_schedule(&db, &schedule).await?;

    println!("Schedule enforcement {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
