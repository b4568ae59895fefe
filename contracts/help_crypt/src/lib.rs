//! # HelpCrypt Contract
//!
//! Confidential aid requests on a public ledger. An applicant submits an
//! encrypted identity, an encrypted reason and an amount (encrypted and in
//! cleartext); a third party reviews it; donors fund it by paying the applicant
//! directly. The encrypted fields are only ever readable by the applicant, the
//! approving verifier and the donors.
//!
//! | Phase        | Entry Point(s)                                            |
//! |--------------|-----------------------------------------------------------|
//! | Bootstrap    | [`HelpCrypt::init`]                                       |
//! | Submission   | [`HelpCrypt::submit`]                                     |
//! | Review       | [`HelpCrypt::verify`], [`HelpCrypt::cancel`]              |
//! | Funding      | [`HelpCrypt::donate`]                                     |
//! | Decryption   | `can_decrypt`, `decrypt_grants[_page]`, `issue_grant`     |
//! | Queries      | `get_application`, `get_application_info`, `count`, ...   |
//!
//! ## Architecture
//!
//! Transitions are pure functions in [`lifecycle`]; grants live in [`access`];
//! the payment path is [`settlement`]; the ciphertext backend is reached
//! through [`cipher`]. Storage access is delegated to `storage`. This file
//! wires those together behind the public entry points.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, BytesN, Env, Vec};

pub mod access;
pub mod cipher;
pub mod events;
pub mod lifecycle;
pub mod settlement;
mod storage;
mod types;

#[cfg(test)]
mod mock_cipher;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_settlement;

pub use cipher::{CipherService, CipherServiceClient};
pub use types::{
    Application, ApplicationConfig, ApplicationInfo, ApplicationState, ApplicationStatus,
    DecryptGrant, EncryptedInput,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotFound = 1,
    InvalidAmount = 2,
    InvalidCiphertextProof = 3,
    InvalidStateTransition = 4,
    SelfVerificationForbidden = 5,
    ApplicationNotVerified = 6,
    ZeroDonation = 7,
    TransferFailed = 8,
    AlreadyInitialized = 9,
    NotInitialized = 10,
    NotAuthorized = 11,
    AccessDenied = 12,
    Overflow = 13,
    SelfDonationForbidden = 14,
}

#[contract]
pub struct HelpCrypt;

#[contractimpl]
impl HelpCrypt {
    // ─────────────────────────────────────────────────────────
    // Bootstrap
    // ─────────────────────────────────────────────────────────

    /// Configure the contract. Must be called exactly once after deployment.
    ///
    /// - `admin` may cancel open applications and must sign.
    /// - `cipher_service` is the ciphertext backend (see [`CipherService`]).
    /// - `token` is the asset donations are paid in.
    pub fn init(env: Env, admin: Address, cipher_service: Address, token: Address) -> Result<(), Error> {
        admin.require_auth();
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        storage::set_config(&env, &admin, &cipher_service, &token);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────

    /// Register a new aid application and return its id.
    ///
    /// Each encrypted input must carry a proof the backend accepts for this
    /// contract and `applicant`. `public_amount` must be positive. The
    /// applicant is granted decrypt access to their own submission.
    pub fn submit(
        env: Env,
        applicant: Address,
        identity: EncryptedInput,
        reason: EncryptedInput,
        amount: EncryptedInput,
        public_amount: i128,
    ) -> Result<u64, Error> {
        applicant.require_auth();
        let service = storage::get_cipher_service(&env)?;

        if public_amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let encrypted_identity = cipher::ingest(&env, &service, &identity, &applicant)?;
        let encrypted_reason = cipher::ingest(&env, &service, &reason, &applicant)?;
        let encrypted_amount = cipher::ingest(&env, &service, &amount, &applicant)?;

        let id = storage::get_and_increment_app_id(&env)?;
        let timestamp = env.ledger().timestamp();

        let config = ApplicationConfig {
            id,
            applicant: applicant.clone(),
            encrypted_identity,
            encrypted_reason,
            encrypted_amount,
            public_amount,
            timestamp,
        };
        storage::save_application(&env, &config, &ApplicationState::pending());
        storage::push_applicant_app(&env, &applicant, id);
        access::grant_decrypt(&env, &config, &applicant)?;

        events::emit_application_submitted(&env, id, applicant, public_amount, timestamp);
        Ok(id)
    }

    /// Approve or reject a pending application.
    ///
    /// `verifier` must sign and must not be the applicant. On approval the
    /// verifier gains decrypt access.
    pub fn verify(env: Env, verifier: Address, id: u64, approved: bool) -> Result<(), Error> {
        verifier.require_auth();

        let (config, state) = storage::load_application_pair(&env, id)?;
        let next = lifecycle::resolve(&state, &config.applicant, &verifier, approved)?;
        storage::save_application_state(&env, id, &next);

        if approved {
            access::grant_decrypt(&env, &config, &verifier)?;
        }

        events::emit_application_resolved(&env, id, verifier, approved);
        Ok(())
    }

    /// Donate `amount` of the configured asset to a verified application.
    ///
    /// The applicant may not donate to their own application.
    /// The value is paid to the applicant within this call. The donor gains
    /// decrypt access, and the application becomes `Funded` once the running
    /// total reaches its public amount.
    pub fn donate(env: Env, id: u64, donor: Address, amount: i128) -> Result<(), Error> {
        donor.require_auth();

        let settled = settlement::settle(&env, id, &donor, amount)?;

        events::emit_donation_received(&env, id, donor, amount, settled.state.donated_amount);
        if settled.funded {
            events::emit_application_funded(&env, id, settled.state.donated_amount);
        }
        Ok(())
    }

    /// Withdraw an application that is still `Pending` or `Verified`.
    ///
    /// Only the administrator set in [`HelpCrypt::init`] may cancel. Existing
    /// decrypt grants are kept.
    pub fn cancel(env: Env, admin: Address, id: u64) -> Result<(), Error> {
        admin.require_auth();
        if admin != storage::get_admin(&env)? {
            return Err(Error::NotAuthorized);
        }

        let state = storage::load_application_state(&env, id)?;
        let next = lifecycle::cancel(&state)?;
        storage::save_application_state(&env, id, &next);

        events::emit_application_cancelled(&env, id, admin);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Decrypt access
    // ─────────────────────────────────────────────────────────

    /// Return `true` if `viewer` may decrypt the encrypted fields of `id`.
    pub fn can_decrypt(env: Env, id: u64, viewer: Address) -> bool {
        access::can_decrypt(&env, id, &viewer)
    }

    /// Every address holding a decrypt grant on `id`, oldest first.
    pub fn decrypt_grants(env: Env, id: u64) -> Result<Vec<Address>, Error> {
        access::grants_of(&env, id)
    }

    /// At most `limit` grant holders of `id`, starting at grant position `start`.
    pub fn decrypt_grants_page(env: Env, id: u64, start: u32, limit: u32) -> Result<Vec<Address>, Error> {
        access::grants_page(&env, id, start, limit)
    }

    pub fn grant_count(env: Env, id: u64) -> Result<u32, Error> {
        access::grant_count(&env, id)
    }

    /// Issue the decrypt authorization `viewer` presents to the ciphertext
    /// backend. `viewer` must sign and hold a grant.
    pub fn issue_grant(env: Env, id: u64, viewer: Address) -> Result<DecryptGrant, Error> {
        viewer.require_auth();
        access::issue_grant(&env, id, &viewer)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_application(env: Env, id: u64) -> Result<Application, Error> {
        let (config, state) = storage::load_application_pair(&env, id)?;
        Ok(Application::from_parts(config, state))
    }

    /// Public summary: applicant, amount, timestamp, status and donated total.
    pub fn get_application_info(env: Env, id: u64) -> Result<ApplicationInfo, Error> {
        let (config, state) = storage::load_application_pair(&env, id)?;
        Ok(ApplicationInfo {
            applicant: config.applicant,
            public_amount: config.public_amount,
            timestamp: config.timestamp,
            status: state.status,
            donated_amount: state.donated_amount,
        })
    }

    pub fn get_verifier(env: Env, id: u64) -> Result<Option<Address>, Error> {
        Ok(storage::load_application_state(&env, id)?.verifier)
    }

    /// Handles are returned to any caller; they are useless without a grant.
    pub fn get_encrypted_identity(env: Env, id: u64) -> Result<BytesN<32>, Error> {
        Ok(storage::load_application_config(&env, id)?.encrypted_identity)
    }

    pub fn get_encrypted_reason(env: Env, id: u64) -> Result<BytesN<32>, Error> {
        Ok(storage::load_application_config(&env, id)?.encrypted_reason)
    }

    pub fn get_encrypted_amount(env: Env, id: u64) -> Result<BytesN<32>, Error> {
        Ok(storage::load_application_config(&env, id)?.encrypted_amount)
    }

    /// Ids submitted by `applicant`, in submission order.
    pub fn applications_of(env: Env, applicant: Address) -> Vec<u64> {
        storage::load_applicant_apps(&env, &applicant)
    }

    /// Total number of applications ever submitted.
    pub fn count(env: Env) -> u64 {
        storage::get_app_count(&env)
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        storage::get_admin(&env)
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        storage::get_token(&env)
    }

    pub fn cipher_service(env: Env) -> Result<Address, Error> {
        storage::get_cipher_service(&env)
    }
}
