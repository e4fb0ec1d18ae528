//! Persistence service: archive finished ceremonies to Postgres.
//!
//! DESIGN
//! ======
//! A ceremony is handed to a bounded queue the moment it completes. A
//! background worker drains the queue in batches on a short ticker, so turn
//! handling never waits on database I/O.
//!
//! ERROR HANDLING
//! ==============
//! A failed batch is retried with linear back-off, then dropped with a
//! warning. Live sessions are unaffected either way; only the archive row
//! is lost.

use std::time::Duration;

use ceremony::{Format, MapState, SequenceStrategy, Step, Summary, Team, TeamNames, TossResult};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PersistConfig;
use crate::state::AppState;

/// Archive row for one completed ceremony. A session that is reset and
/// run again produces one row per completion, all sharing `session_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedCeremony {
    pub id: Uuid,
    pub session_id: Uuid,
    pub format: Format,
    pub strategy: SequenceStrategy,
    pub teams: TeamNames,
    pub toss: TossResult,
    pub first: Team,
    pub sequence: Vec<Step>,
    pub maps: Vec<MapState>,
    pub summary: Summary,
    /// Milliseconds since Unix epoch.
    pub finished_at: i64,
}

/// Spawn the archive worker and return its queue sender.
#[must_use]
pub fn spawn_ceremony_persistence_worker(pool: PgPool, config: PersistConfig) -> mpsc::Sender<FinishedCeremony> {
    let (tx, mut rx) = mpsc::channel::<FinishedCeremony>(config.queue_capacity);

    info!(
        queue_capacity = config.queue_capacity,
        batch_size = config.batch_size,
        flush_ms = config.flush_ms,
        retries = config.retries,
        retry_base_ms = config.retry_base_ms,
        "ceremony persistence worker configured"
    );

    tokio::spawn(async move {
        let mut batch: Vec<FinishedCeremony> = Vec::with_capacity(config.batch_size);
        let mut ticker = tokio::time::interval(Duration::from_millis(config.flush_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_row = rx.recv() => {
                    if let Some(row) = maybe_row {
                        batch.push(row);
                        if batch.len() >= config.batch_size {
                            flush_with_retry(&pool, &mut batch, config).await;
                        }
                    } else {
                        flush_with_retry(&pool, &mut batch, config).await;
                        break;
                    }
                }
                _ = ticker.tick() => {
                    flush_with_retry(&pool, &mut batch, config).await;
                }
            }
        }
    });

    tx
}

/// Best-effort, non-blocking enqueue. Returns whether the row was queued.
pub fn enqueue_finished(state: &AppState, row: FinishedCeremony) -> bool {
    let Some(tx) = &state.persist_tx else {
        return false;
    };

    let (id, session_id) = (row.id, row.session_id);
    match tx.try_send(row) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(%id, %session_id, "ceremony persist queue full; dropping archive row");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            warn!(%id, %session_id, "ceremony persist queue closed; dropping archive row");
            false
        }
    }
}

/// Linear back-off: `attempt * retry_base_ms`.
pub(crate) fn retry_delay(config: PersistConfig, attempt: usize) -> Duration {
    Duration::from_millis((attempt as u64).saturating_mul(config.retry_base_ms))
}

async fn flush_with_retry(pool: &PgPool, batch: &mut Vec<FinishedCeremony>, config: PersistConfig) {
    if batch.is_empty() {
        return;
    }

    let drained = std::mem::take(batch);
    for attempt in 1..=config.retries {
        match persist_batch(pool, &drained).await {
            Ok(()) => return,
            Err(e) if attempt < config.retries => {
                warn!(error = %e, attempt, total = config.retries, count = drained.len(), "ceremony batch persist failed; retrying");
                tokio::time::sleep(retry_delay(config, attempt)).await;
            }
            Err(e) => {
                warn!(error = %e, count = drained.len(), "ceremony batch persist failed after retries; dropping rows");
                return;
            }
        }
    }
}

/// Insert a batch of archive rows in one transaction.
///
/// # Errors
///
/// Returns the first database error; the transaction is rolled back.
pub async fn persist_batch(pool: &PgPool, rows: &[FinishedCeremony]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for row in rows {
        let to_json = |value: serde_json::Result<serde_json::Value>| value.unwrap_or_default();
        sqlx::query(
            "INSERT INTO ceremonies
                (id, session_id, format, strategy, team_a, team_b, first_team, toss, sequence, maps, summary, finished_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(row.id)
        .bind(row.session_id)
        .bind(row.format.as_str())
        .bind(row.strategy.to_string())
        .bind(&row.teams.a)
        .bind(&row.teams.b)
        .bind(i16::from(u8::from(row.first)))
        .bind(to_json(serde_json::to_value(row.toss)))
        .bind(to_json(serde_json::to_value(&row.sequence)))
        .bind(to_json(serde_json::to_value(&row.maps)))
        .bind(to_json(serde_json::to_value(&row.summary)))
        .bind(row.finished_at)
        .execute(tx.as_mut())
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
