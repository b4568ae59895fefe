//! # Events
//!
//! Every event is published with the topic `(symbol, application_id)` and a
//! `#[contracttype]` struct as data, which is what the indexer decodes.
//!
//! | Topic       | Data                   |
//! |-------------|------------------------|
//! | `submitted` | [`ApplicationSubmitted`] |
//! | `verified`  | [`ApplicationResolved`]  |
//! | `rejected`  | [`ApplicationResolved`]  |
//! | `donated`   | [`DonationReceived`]     |
//! | `funded`    | [`ApplicationFunded`]    |
//! | `cancelled` | [`ApplicationCancelled`] |
//! | `granted`   | [`DecryptGranted`]       |
//! | `issued`    | [`DecryptGranted`]       |
//!
//! No event ever carries a ciphertext handle or any confidential field.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationSubmitted {
    pub application_id: u64,
    pub applicant: Address,
    pub public_amount: i128,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationResolved {
    pub application_id: u64,
    pub verifier: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonationReceived {
    pub application_id: u64,
    pub donor: Address,
    pub amount: i128,
    /// Running total after this donation.
    pub donated_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationFunded {
    pub application_id: u64,
    pub donated_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationCancelled {
    pub application_id: u64,
    pub admin: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptGranted {
    pub application_id: u64,
    pub viewer: Address,
}

pub fn emit_application_submitted(
    env: &Env,
    application_id: u64,
    applicant: Address,
    public_amount: i128,
    timestamp: u64,
) {
    env.events().publish(
        (symbol_short!("submitted"), application_id),
        ApplicationSubmitted {
            application_id,
            applicant,
            public_amount,
            timestamp,
        },
    );
}

/// Emits `verified` when `approved`, `rejected` otherwise.
pub fn emit_application_resolved(env: &Env, application_id: u64, verifier: Address, approved: bool) {
    let topic = if approved {
        symbol_short!("verified")
    } else {
        symbol_short!("rejected")
    };
    env.events().publish(
        (topic, application_id),
        ApplicationResolved {
            application_id,
            verifier,
        },
    );
}

pub fn emit_donation_received(
    env: &Env,
    application_id: u64,
    donor: Address,
    amount: i128,
    donated_amount: i128,
) {
    env.events().publish(
        (symbol_short!("donated"), application_id),
        DonationReceived {
            application_id,
            donor,
            amount,
            donated_amount,
        },
    );
}

pub fn emit_application_funded(env: &Env, application_id: u64, donated_amount: i128) {
    env.events().publish(
        (symbol_short!("funded"), application_id),
        ApplicationFunded {
            application_id,
            donated_amount,
        },
    );
}

pub fn emit_application_cancelled(env: &Env, application_id: u64, admin: Address) {
    env.events().publish(
        (symbol_short!("cancelled"), application_id),
        ApplicationCancelled {
            application_id,
            admin,
        },
    );
}

pub fn emit_decrypt_granted(env: &Env, application_id: u64, viewer: Address) {
    env.events().publish(
        (symbol_short!("granted"), application_id),
        DecryptGranted {
            application_id,
            viewer,
        },
    );
}

pub fn emit_grant_issued(env: &Env, application_id: u64, viewer: Address) {
    env.events().publish(
        (symbol_short!("issued"), application_id),
        DecryptGranted {
            application_id,
            viewer,
        },
    );
}
