//! Database layer: migrations, event log, application projection, cursor.

use sqlx::{sqlite::SqlitePoolOptions, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::errors::{IndexerError, Result};
use crate::events::{ApplicationRecord, EventKind, EventRecord, HelpCryptEvent};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    // Create the file on first run.
    let url = if url.contains('?') || url.contains(":memory:") {
        url
    } else {
        format!("{url}?mode=rwc")
    };
    open(&url, 5).await
}

async fn open(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger and the RPC pagination cursor.
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events and fold each new one into the
/// `applications` projection.
///
/// Events whose RPC id is already stored are ignored, along with their
/// projection update, so replaying a page is harmless. Returns the number of
/// new rows.
pub async fn insert_events(pool: &SqlitePool, events: &[HelpCryptEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, application_id, actor, amount, total, ledger,
                 timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ev.event_id)
        .bind(ev.kind.as_str())
        .bind(ev.application_id)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.total)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected > 0 {
            apply_to_projection(&mut tx, ev).await?;
            count += rows_affected as usize;
        }
    }

    tx.commit().await?;
    Ok(count)
}

async fn apply_to_projection(tx: &mut Transaction<'_, Sqlite>, ev: &HelpCryptEvent) -> Result<()> {
    let Some(id) = ev.application_id else {
        return Ok(());
    };

    match ev.kind {
        EventKind::ApplicationSubmitted => {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO applications
                    (application_id, applicant, public_amount, status, submitted_at, updated_ledger)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(id)
            .bind(ev.actor.as_deref().unwrap_or_default())
            .bind(ev.amount.as_deref().unwrap_or("0"))
            .bind(EventKind::ApplicationSubmitted.target_status().map(|s| s.code()))
            .bind(ev.timestamp)
            .bind(ev.ledger)
            .execute(&mut **tx)
            .await?;
        }
        EventKind::ApplicationVerified | EventKind::ApplicationRejected => {
            sqlx::query(
                "UPDATE applications SET status = ?1, verifier = ?2, updated_ledger = ?3 \
                 WHERE application_id = ?4",
            )
            .bind(ev.kind.target_status().map(|s| s.code()))
            .bind(&ev.actor)
            .bind(ev.ledger)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        }
        EventKind::DonationReceived => {
            if let Some(total) = &ev.total {
                sqlx::query(
                    "UPDATE applications SET donated_amount = ?1, updated_ledger = ?2 \
                     WHERE application_id = ?3",
                )
                .bind(total)
                .bind(ev.ledger)
                .bind(id)
                .execute(&mut **tx)
                .await?;
            }
        }
        EventKind::ApplicationFunded => {
            sqlx::query(
                "UPDATE applications \
                 SET status = ?1, donated_amount = COALESCE(?2, donated_amount), updated_ledger = ?3 \
                 WHERE application_id = ?4",
            )
            .bind(ev.kind.target_status().map(|s| s.code()))
            .bind(&ev.amount)
            .bind(ev.ledger)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        }
        EventKind::ApplicationCancelled => {
            sqlx::query(
                "UPDATE applications SET status = ?1, updated_ledger = ?2 WHERE application_id = ?3",
            )
            .bind(ev.kind.target_status().map(|s| s.code()))
            .bind(ev.ledger)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        }
        EventKind::DecryptGranted | EventKind::GrantIssued | EventKind::Unknown => {
            debug!(kind = ev.kind.as_str(), application_id = id, "No projection change");
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────

const EVENT_COLUMNS: &str = "id, event_id, event_type, application_id, actor, amount, total, ledger, \
                             timestamp, contract_id, tx_hash, created_at";

/// Fetch all events for one application, ordered by ledger ascending.
pub async fn get_events_for_application(
    pool: &SqlitePool,
    application_id: i64,
) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE application_id = ?1 ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(application_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Every known application, oldest first.
pub async fn list_applications(pool: &SqlitePool) -> Result<Vec<ApplicationRecord>> {
    let rows = sqlx::query_as::<_, ApplicationRecord>(
        r#"
        SELECT application_id, applicant, public_amount, status, verifier,
               donated_amount, submitted_at, updated_ledger
        FROM   applications
        ORDER  BY application_id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_application(pool: &SqlitePool, application_id: i64) -> Result<ApplicationRecord> {
    sqlx::query_as::<_, ApplicationRecord>(
        r#"
        SELECT application_id, applicant, public_amount, status, verifier,
               donated_amount, submitted_at, updated_ledger
        FROM   applications
        WHERE  application_id = ?1
        "#,
    )
    .bind(application_id)
    .fetch_optional(pool)
    .await?
    .ok_or(IndexerError::NotFound(application_id))
}

// ─────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────
