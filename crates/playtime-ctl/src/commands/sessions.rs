use anyhow::Result;

use playtime_store::SessionQueries;

pub async fn list() -> Result<()> {
    let db = super::open_database().await?;

    let sessions = SessionQueries::recent(&db, 20).await?;

    if sessions.is_empty() {
        println!("No playback sessions recorded");
        return Ok(());
    }

    println!("Recent playback sessions");
    println!("========================");
    for session in sessions {
        let ended = session
            .ended_at
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "(active)".to_string());
        let started =
            session.started_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M");

        println!(
            "{}  ->  {}   {} min   {}",
            started,
            ended,
            session.minutes_accrued,
            session.end_reason.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
