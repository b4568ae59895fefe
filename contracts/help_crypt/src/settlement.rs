//! # Settlement
//!
//! Push-payment donations: value moves from the donor straight to the
//! applicant, the contract never holds a balance.
//!
//! Ordering inside [`settle`]:
//!
//! 1. refuse the applicant as donor, then validate against the state observed
//!    at call time ([`lifecycle::apply_donation`]);
//! 2. commit the new state and the donor's decrypt grant;
//! 3. perform the single token transfer.
//!
//! A failed transfer aborts the invocation with [`Error::TransferFailed`] and
//! the host discards the writes from step 2.

use soroban_sdk::{panic_with_error, token, Address, Env};

use crate::access;
use crate::lifecycle;
use crate::storage;
use crate::types::ApplicationState;
use crate::Error;

/// Outcome of a successful donation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub applicant: Address,
    pub state: ApplicationState,
    /// `true` when this donation moved the application to `Funded`.
    pub funded: bool,
}

pub fn settle(env: &Env, id: u64, donor: &Address, amount: i128) -> Result<Settlement, Error> {
    let asset = storage::get_token(env)?;
    let (config, state) = storage::load_application_pair(env, id)?;
    if *donor == config.applicant {
        return Err(Error::SelfDonationForbidden);
    }
    let next = lifecycle::apply_donation(&state, config.public_amount, amount)?;

    storage::save_application_state(env, id, &next);
    access::grant_decrypt(env, &config, donor)?;

    let token_client = token::Client::new(env, &asset);
    let transferred = token_client.try_transfer(donor, &config.applicant, &amount);
    if !matches!(transferred, Ok(Ok(()))) {
        panic_with_error!(env, Error::TransferFailed);
    }

    let funded = next.status != state.status;
    Ok(Settlement {
        applicant: config.applicant,
        state: next,
        funded,
    })
}
