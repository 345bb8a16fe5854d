use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::connection::Database;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DbPlaybackSession {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub minutes_accrued: i64,
    pub end_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPlaybackSession {
    pub id: String,
    pub started_at: DateTime<Utc>,
}

impl NewPlaybackSession {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4().to_string(), started_at }
    }
}

pub struct SessionQueries;

impl SessionQueries {
    pub async fn create(db: &Database, session: NewPlaybackSession) -> Result<()> {
        let pool = db.pool()?;

        sqlx::query("INSERT INTO playback_sessions (id, started_at) VALUES (?, ?)")
            .bind(&session.id)
            .bind(session.started_at)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn end_session(
        db: &Database,
        id: &str,
        ended_at: DateTime<Utc>,
        minutes_accrued: u32,
        end_reason: &str,
    ) -> Result<()> {
        let pool = db.pool()?;

        let result = sqlx::query(
            r#"
            UPDATE playback_sessions
            SET ended_at = ?, minutes_accrued = ?, end_reason = ?
            WHERE id = ?
            "#,
        )
        .bind(ended_at)
        .bind(minutes_accrued as i64)
        .bind(end_reason)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Playback session {}", id)));
        }

        Ok(())
    }

    pub async fn recent(db: &Database, limit: u32) -> Result<Vec<DbPlaybackSession>> {
        let pool = db.pool()?;

        let sessions = sqlx::query_as::<_, DbPlaybackSession>(
            "SELECT * FROM playback_sessions ORDER BY started_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }
}
