//! # Access
//!
//! Decrypt-permission bookkeeping. An application's grant set holds the
//! applicant (from submission), the verifier (on approval) and every donor
//! (on a successful donation). Entries are appended, never removed, and
//! each grant is stored under its own key.
//!
//! The contract does not decrypt anything itself. A new grant is mirrored to
//! the ciphertext backend through [`cipher::allow_fields`], and
//! [`issue_grant`] hands a viewer the record the backend expects when it is
//! asked for plaintext.

use soroban_sdk::{Address, Env, Vec};

use crate::cipher;
use crate::events;
use crate::storage;
use crate::types::{ApplicationConfig, DecryptGrant};
use crate::Error;

/// Add `viewer` to the grant set of `config.id`.
///
/// Returns `false` when the viewer already held a grant; nothing is written
/// or forwarded in that case.
pub(crate) fn grant_decrypt(
    env: &Env,
    config: &ApplicationConfig,
    viewer: &Address,
) -> Result<bool, Error> {
    if !storage::add_grant(env, config.id, viewer)? {
        return Ok(false);
    }

    let service = storage::get_cipher_service(env)?;
    cipher::allow_fields(env, &service, config, viewer);

    events::emit_decrypt_granted(env, config.id, viewer.clone());
    Ok(true)
}

/// `true` if `viewer` may decrypt application `id`. Unknown ids yield `false`.
pub fn can_decrypt(env: &Env, id: u64, viewer: &Address) -> bool {
    storage::has_grant(env, id, viewer)
}

/// Viewers of application `id` in the order they were granted.
pub fn grants_of(env: &Env, id: u64) -> Result<Vec<Address>, Error> {
    grants_page(env, id, 0, u32::MAX)
}

/// Up to `limit` viewers of application `id`, from grant position `start`.
pub fn grants_page(env: &Env, id: u64, start: u32, limit: u32) -> Result<Vec<Address>, Error> {
    // Distinguish "no such application" from "empty set".
    storage::load_application_config(env, id)?;
    Ok(storage::load_grants_page(env, id, start, limit))
}

/// Number of viewers holding a grant on application `id`.
pub fn grant_count(env: &Env, id: u64) -> Result<u32, Error> {
    storage::load_application_config(env, id)?;
    Ok(storage::get_grant_count(env, id))
}

/// Build the decrypt authorization for `viewer`.
pub fn issue_grant(env: &Env, id: u64, viewer: &Address) -> Result<DecryptGrant, Error> {
    let config = storage::load_application_config(env, id)?;
    if !can_decrypt(env, id, viewer) {
        return Err(Error::AccessDenied);
    }

    events::emit_grant_issued(env, id, viewer.clone());

    Ok(DecryptGrant {
        application_id: id,
        viewer: viewer.clone(),
        identity: config.encrypted_identity,
        reason: config.encrypted_reason,
        amount: config.encrypted_amount,
        issued_at: env.ledger().timestamp(),
    })
}
