//! Long-running background task that polls the Soroban RPC and writes
//! decoded HelpCrypt events to the database.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc::{self, RpcClient};

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub rpc: RpcClient,
}

/// Poll until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting, contract: {}", state.rpc.contract_id());

    let last_ledger = match db::get_last_ledger(&state.pool).await {
        Ok(l) => l,
        Err(e) => {
            error!("Could not read ledger cursor, starting from config: {e}");
            0
        }
    };
    let mut cursor = match db::get_cursor_string(&state.pool).await {
        Ok(c) => c,
        Err(e) => {
            error!("Could not read pagination cursor: {e}");
            None
        }
    };

    let mut current_ledger = if last_ledger > 0 {
        last_ledger as u32
    } else {
        state.config.start_ledger
    };

    info!("Resuming from ledger {current_ledger}");

    let interval = Duration::from_secs(state.config.poll_interval_secs);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = poll_once(&state, current_ledger, cursor.as_deref()) => match polled {
                Ok((next_ledger, next_cursor)) => {
                    current_ledger = next_ledger;
                    cursor = next_cursor;
                }
                Err(e) => error!("Indexer poll error: {e}"),
            },
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("Indexer stopped at ledger {current_ledger}");
}

/// Perform a single poll iteration.
///
/// Returns `(next_start_ledger, next_cursor)`.
async fn poll_once(
    state: &IndexerState,
    start_ledger: u32,
    cursor: Option<&str>,
) -> Result<(u32, Option<String>)> {
    let page = state
        .rpc
        .fetch_events(start_ledger, cursor, state.config.events_per_page)
        .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, state.rpc.contract_id());
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            page.events.len(),
            inserted
        );
    }

    // The cursor carries the scan position; the ledger is only the fallback
    // when no cursor has been issued yet.
    let next_ledger = page
        .latest_ledger
        .map(|l| (l as u32).max(start_ledger))
        .unwrap_or(start_ledger);
    let next_cursor = page.cursor.or_else(|| cursor.map(str::to_string));

    db::save_cursor(&state.pool, next_ledger as i64, next_cursor.as_deref()).await?;

    Ok((next_ledger, next_cursor))
}
