//! Soroban RPC client: pages through `getEvents` for the HelpCrypt contract
//! and decodes the results into [`HelpCryptEvent`]s.
//!
//! Events are requested with `xdrFormat: "json"`, so topics and data arrive as
//! JSON-encoded `ScVal`s (`{"symbol":"donated"}`, `{"u64":"42"}`, and a
//! `{"map":[{"key":..,"val":..}]}` for the event structs).
//!
//! Transport failures, HTTP 429 and non-fatal JSON-RPC errors are retried
//! with exponential back-off (2s doubling up to 60s). Malformed-request errors
//! are returned to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, HelpCryptEvent};

const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

/// JSON-RPC codes that retrying cannot fix.
const FATAL_RPC_CODES: [i64; 3] = [-32600, -32601, -32602];

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<EventsResult>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsResult {
    events: Vec<RawEvent>,
    cursor: Option<String>,
    latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// RPC-assigned event id, unique across the ledger history
    pub id: String,
    /// Topics as JSON `ScVal`s
    #[serde(default)]
    pub topic_json: Vec<Value>,
    /// Event data as a JSON `ScVal`
    #[serde(default)]
    pub value_json: Value,
    pub contract_id: Option<String>,
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    pub ledger_closed_at: Option<String>,
    pub in_successful_contract_call: Option<bool>,
}

/// One page of `getEvents` results.
#[derive(Debug)]
pub struct EventsPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

pub struct RpcClient {
    http: Client,
    url: String,
    contract_id: String,
}

impl RpcClient {
    pub fn new(http: Client, url: impl Into<String>, contract_id: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            contract_id: contract_id.into(),
        }
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Fetch one page of contract events.
    ///
    /// With a `cursor` the scan continues from it; otherwise it starts at
    /// `start_ledger` (inclusive).
    pub async fn fetch_events(
        &self,
        start_ledger: u32,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<EventsPage> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getEvents",
            "params": build_params(&self.contract_id, start_ledger, cursor, limit),
        });
        let mut backoff = Backoff::new();

        loop {
            let resp = match self.http.post(&self.url).json(&body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    let wait = backoff.next_delay();
                    warn!("RPC request failed (retry in {}s): {e}", wait.as_secs());
                    tokio::time::sleep(wait).await;
                    continue;
                }
            };

            if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let wait = backoff.next_delay();
                warn!("Rate-limited by RPC (retry in {}s)", wait.as_secs());
                tokio::time::sleep(wait).await;
                continue;
            }

            let parsed: RpcResponse = resp.json().await?;

            if let Some(err) = parsed.error {
                if FATAL_RPC_CODES.contains(&err.code) {
                    return Err(IndexerError::Rpc {
                        code: err.code,
                        message: err.message,
                    });
                }
                let wait = backoff.next_delay();
                warn!(
                    "RPC error {} (retry in {}s): {}",
                    err.code,
                    wait.as_secs(),
                    err.message
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let result = parsed.result.ok_or_else(|| {
                IndexerError::EventParse("getEvents returned neither result nor error".to_string())
            })?;

            debug!(
                events = result.events.len(),
                latest_ledger = ?result.latest_ledger,
                "Fetched events page"
            );

            return Ok(EventsPage {
                events: result.events,
                cursor: result.cursor,
                latest_ledger: result.latest_ledger,
            });
        }
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [{ "type": "contract", "contractIds": [contract_id] }],
        "pagination": { "limit": limit },
        "xdrFormat": "json",
    });
    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }
    params
}

/// Exponential back-off schedule.
struct Backoff {
    next_secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            next_secs: INITIAL_BACKOFF_SECS,
        }
    }

    fn next_delay(&mut self) -> Duration {
        let current = self.next_secs;
        self.next_secs = (current * 2).min(MAX_BACKOFF_SECS);
        Duration::from_secs(current)
    }
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events. Events from failed invocations and events without
/// a topic are dropped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<HelpCryptEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<HelpCryptEvent> {
    let kind = EventKind::from_topic(&scalar(raw.topic_json.first()?)?);
    let application_id = raw
        .topic_json
        .get(1)
        .and_then(scalar)
        .and_then(|id| id.parse::<i64>().ok());

    let data = &raw.value_json;
    let (actor, amount, total) = match kind {
        EventKind::ApplicationSubmitted => {
            (field(data, "applicant"), field(data, "public_amount"), None)
        }
        EventKind::ApplicationVerified | EventKind::ApplicationRejected => {
            (field(data, "verifier"), None, None)
        }
        EventKind::DonationReceived => (
            field(data, "donor"),
            field(data, "amount"),
            field(data, "donated_amount"),
        ),
        EventKind::ApplicationFunded => (None, field(data, "donated_amount"), None),
        EventKind::ApplicationCancelled => (field(data, "admin"), None, None),
        EventKind::DecryptGranted | EventKind::GrantIssued => (field(data, "viewer"), None, None),
        EventKind::Unknown => (None, None, None),
    };

    Some(HelpCryptEvent {
        event_id: raw.id.clone(),
        kind,
        application_id,
        actor,
        amount,
        total,
        ledger: raw.ledger.unwrap_or(0) as i64,
        timestamp: raw
            .ledger_closed_at
            .as_deref()
            .and_then(parse_rfc3339)
            .unwrap_or(0),
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Render a single-variant JSON `ScVal` as a string:
/// `{"symbol":"funded"}` → `funded`, `{"i128":"5000"}` → `5000`,
/// `{"address":"G..."}` → `G...`. Containers and `void` yield `None`.
fn scalar(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    match object.values().next()? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Look up a struct field in a JSON `ScVal` map keyed by symbols.
fn field(value: &Value, key: &str) -> Option<String> {
    value
        .get("map")?
        .as_array()?
        .iter()
        .find(|entry| entry.get("key").and_then(scalar).as_deref() == Some(key))
        .and_then(|entry| entry.get("val"))
        .and_then(scalar)
}

fn parse_rfc3339(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
