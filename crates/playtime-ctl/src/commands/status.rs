use anyhow::Result;

use playtime_common::clock::{Clock, SystemClock};
use playtime_common::limits::{ensure_current_day, evaluate};
use playtime_store::SettingsQueries;

pub async fn show() -> Result<()> {
    let db = super::open_database().await?;
    let clock = SystemClock;

    let config = SettingsQueries::screen_time(&db).await?;
    let config = ensure_current_day(&config, clock.today());
    let schedule = SettingsQueries::access_schedule(&db).await?;
    let result = evaluate(&config, &schedule, clock.now());

    println!("Playtime Status");
    println!("===============");
    println!();
    println!(
        "Daily limit:     {} ({} minutes)",
        if config.enabled { "enabled" } else { "disabled" },
        config.daily_limit_minutes
    );
    println!("Used today:      {} minutes", config.used_today_minutes);
    match result.remaining_minutes {
        Some(minutes) => println!("Remaining:       {} minutes", minutes),
        None => println!("Remaining:       unbounded"),
    }
    println!();
    println!(
        "Schedule:        {} ({} - {})",
        if schedule.enabled { "enabled" } else { "disabled" },
        schedule.start,
        schedule.end
    );
    println!(
        "Within schedule: {}",
        if result.within_schedule { "yes" } else { "no" }
    );
    println!();
    println!(
        "Playback access: {}",
        if result.limit_reached { "BLOCKED" } else { "allowed" }
    );

    let pin_set = SettingsQueries::pin_hash(&db).await?.is_some();
    if !pin_set {
        println!();
        println!("Note: no parent PIN is set. Run `playtime-ctl pin set`.");
    }

    Ok(())
}
