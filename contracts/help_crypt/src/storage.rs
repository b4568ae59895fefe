//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by HelpCrypt.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key             | Type      | Description                          |
//! |-----------------|-----------|--------------------------------------|
//! | `Admin`         | `Address` | Administrator allowed to cancel      |
//! | `CipherService` | `Address` | Confidential-computation backend     |
//! | `Token`         | `Address` | Asset donations are settled in       |
//! | `AppCount`      | `u64`     | Next application id                  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                      | Type                 | Description                 |
//! |--------------------------|----------------------|-----------------------------|
//! | `AppConfig(id)`          | `ApplicationConfig`  | Immutable application data  |
//! | `AppState(id)`           | `ApplicationState`   | Status, verifier, totals    |
//! | `Grant(id, viewer)`      | `u32`                | Position in grant order     |
//! | `GrantAt(id, index)`     | `Address`            | Viewer granted at `index`   |
//! | `GrantCount(id)`         | `u32`                | Size of the grant set       |
//! | `ApplicantApps(address)` | `Vec<u64>`           | Ids submitted by an address |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{ApplicationConfig, ApplicationState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Administrator address (Instance).
    Admin,
    /// Ciphertext backend contract (Instance).
    CipherService,
    /// Settlement asset contract (Instance).
    Token,
    /// Auto-increment counter for application ids (Instance).
    AppCount,
    /// Immutable application data keyed by id (Persistent).
    AppConfig(u64),
    /// Mutable application data keyed by id (Persistent).
    AppState(u64),
    /// One decrypt grant, valued with its grant position (Persistent).
    Grant(u64, Address),
    /// Viewer holding the grant at a position (Persistent).
    GrantAt(u64, u32),
    /// Number of grants on an application (Persistent).
    GrantCount(u64),
    /// Application ids submitted by an applicant (Persistent).
    ApplicantApps(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

/// Store the bootstrap configuration. Callers check [`is_initialized`] first.
pub fn set_config(env: &Env, admin: &Address, cipher_service: &Address, token: &Address) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Admin, admin);
    instance.set(&DataKey::CipherService, cipher_service);
    instance.set(&DataKey::Token, token);
    instance.set(&DataKey::AppCount, &0u64);
    bump_instance(env);
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn get_cipher_service(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::CipherService)
        .ok_or(Error::NotInitialized)
}

pub fn get_token(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

/// Number of applications ever submitted (also the next id).
pub fn get_app_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::AppCount)
        .unwrap_or(0)
}

/// Reads, increments, and stores the application counter.
/// Returns the id to use for the *current* application (pre-increment value).
pub fn get_and_increment_app_id(env: &Env) -> Result<u64, Error> {
    bump_instance(env);
    let current = get_app_count(env);
    let next = current.checked_add(1).ok_or(Error::Overflow)?;
    env.storage().instance().set(&DataKey::AppCount, &next);
    Ok(current)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Persist both entries of a newly submitted application.
pub fn save_application(env: &Env, config: &ApplicationConfig, state: &ApplicationState) {
    let config_key = DataKey::AppConfig(config.id);
    env.storage().persistent().set(&config_key, config);
    bump_persistent(env, &config_key);
    save_application_state(env, config.id, state);
}

pub fn load_application_config(env: &Env, id: u64) -> Result<ApplicationConfig, Error> {
    let key = DataKey::AppConfig(id);
    let config: ApplicationConfig = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::NotFound)?;
    bump_persistent(env, &key);
    Ok(config)
}

pub fn load_application_state(env: &Env, id: u64) -> Result<ApplicationState, Error> {
    let key = DataKey::AppState(id);
    let state: ApplicationState = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::NotFound)?;
    bump_persistent(env, &key);
    Ok(state)
}

/// Load config and state together; every state-changing entry point needs both.
pub fn load_application_pair(
    env: &Env,
    id: u64,
) -> Result<(ApplicationConfig, ApplicationState), Error> {
    let config = load_application_config(env, id)?;
    let state = load_application_state(env, id)?;
    Ok((config, state))
}

/// Save only the mutable half of an application.
pub fn save_application_state(env: &Env, id: u64, state: &ApplicationState) {
    let key = DataKey::AppState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

pub fn has_grant(env: &Env, id: u64, viewer: &Address) -> bool {
    let key = DataKey::Grant(id, viewer.clone());
    let present = env.storage().persistent().has(&key);
    if present {
        bump_persistent(env, &key);
    }
    present
}

pub fn get_grant_count(env: &Env, id: u64) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::GrantCount(id))
        .unwrap_or(0)
}

/// Record a grant for `viewer`. Each grant is its own entry, so the cost of
/// adding one does not depend on how many already exist.
///
/// Returns `false` when the viewer already held a grant.
pub fn add_grant(env: &Env, id: u64, viewer: &Address) -> Result<bool, Error> {
    if has_grant(env, id, viewer) {
        return Ok(false);
    }
    let index = get_grant_count(env, id);
    let next = index.checked_add(1).ok_or(Error::Overflow)?;

    let persistent = env.storage().persistent();
    let grant_key = DataKey::Grant(id, viewer.clone());
    let at_key = DataKey::GrantAt(id, index);
    let count_key = DataKey::GrantCount(id);
    persistent.set(&grant_key, &index);
    persistent.set(&at_key, viewer);
    persistent.set(&count_key, &next);
    bump_persistent(env, &grant_key);
    bump_persistent(env, &at_key);
    bump_persistent(env, &count_key);
    Ok(true)
}

/// Up to `limit` viewers starting at grant position `start`.
pub fn load_grants_page(env: &Env, id: u64, start: u32, limit: u32) -> Vec<Address> {
    let end = get_grant_count(env, id).min(start.saturating_add(limit));
    let mut page = Vec::new(env);
    for index in start..end {
        let key = DataKey::GrantAt(id, index);
        if let Some(viewer) = env.storage().persistent().get::<_, Address>(&key) {
            bump_persistent(env, &key);
            page.push_back(viewer);
        }
    }
    page
}

pub fn load_applicant_apps(env: &Env, applicant: &Address) -> Vec<u64> {
    let key = DataKey::ApplicantApps(applicant.clone());
    match env.storage().persistent().get(&key) {
        Some(ids) => {
            bump_persistent(env, &key);
            ids
        }
        None => Vec::new(env),
    }
}

/// Append `id` to the applicant's submission list.
pub fn push_applicant_app(env: &Env, applicant: &Address, id: u64) {
    let key = DataKey::ApplicantApps(applicant.clone());
    let mut ids = load_applicant_apps(env, applicant);
    ids.push_back(id);
    env.storage().persistent().set(&key, &ids);
    bump_persistent(env, &key);
}
