//! # Types
//!
//! Shared data structures used across all modules of the HelpCrypt contract.
//!
//! ## Config / State split
//!
//! An [`Application`] is stored as two ledger entries:
//!
//! - [`ApplicationConfig`]: written once at submission; never mutated.
//! - [`ApplicationState`]: written on resolution, donation and cancellation.
//!
//! Queries return the reconstructed [`Application`] (or the slimmer
//! [`ApplicationInfo`] used by dashboards).
//!
//! ## Status
//!
//! [`ApplicationStatus`] is an integer enum so that off-chain callers see the
//! stable codes `0..=4`:
//!
//! ```text
//! Pending ──► Verified ──► Funded
//!    │           │
//!    │           └──► Cancelled
//!    ├──► Rejected
//!    └──► Cancelled
//! ```
//!
//! `Rejected`, `Funded` and `Cancelled` are terminal. Nothing re-enters
//! `Pending`.

use soroban_sdk::{contracttype, Address, Bytes, BytesN};

/// Lifecycle status of an application.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ApplicationStatus {
    /// Awaiting review by a third party.
    Pending = 0,
    /// Approved by a verifier; accepting donations.
    Verified = 1,
    /// Turned down by a verifier.
    Rejected = 2,
    /// Donations reached the requested amount.
    Funded = 3,
    /// Withdrawn by the contract administrator.
    Cancelled = 4,
}

impl ApplicationStatus {
    /// `true` when no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Funded | ApplicationStatus::Cancelled
        )
    }
}

/// A ciphertext handle together with the proof that it was honestly
/// encrypted for this contract and this submitter.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedInput {
    pub handle: BytesN<32>,
    pub proof: Bytes,
}

/// Immutable application data, written once at submission.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationConfig {
    pub id: u64,
    pub applicant: Address,
    pub encrypted_identity: BytesN<32>,
    pub encrypted_reason: BytesN<32>,
    pub encrypted_amount: BytesN<32>,
    pub public_amount: i128,
    pub timestamp: u64,
}

/// Mutable application data, updated by verification, donation and
/// cancellation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationState {
    pub status: ApplicationStatus,
    pub verifier: Option<Address>,
    pub donated_amount: i128,
}

impl ApplicationState {
    /// State of a freshly submitted application.
    pub fn pending() -> Self {
        ApplicationState {
            status: ApplicationStatus::Pending,
            verifier: None,
            donated_amount: 0,
        }
    }
}

/// Full on-chain representation of an aid application.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Application {
    /// Sequential identifier, starting at zero.
    pub id: u64,
    /// Submitter and recipient of donations.
    pub applicant: Address,
    pub encrypted_identity: BytesN<32>,
    pub encrypted_reason: BytesN<32>,
    pub encrypted_amount: BytesN<32>,
    /// Cleartext mirror of the requested amount; the settlement target.
    pub public_amount: i128,
    /// Ledger timestamp at submission.
    pub timestamp: u64,
    pub status: ApplicationStatus,
    /// Account that resolved the application, once resolved.
    pub verifier: Option<Address>,
    /// Total value transferred to the applicant through this application.
    pub donated_amount: i128,
}

impl Application {
    pub fn from_parts(config: ApplicationConfig, state: ApplicationState) -> Self {
        Application {
            id: config.id,
            applicant: config.applicant,
            encrypted_identity: config.encrypted_identity,
            encrypted_reason: config.encrypted_reason,
            encrypted_amount: config.encrypted_amount,
            public_amount: config.public_amount,
            timestamp: config.timestamp,
            status: state.status,
            verifier: state.verifier,
            donated_amount: state.donated_amount,
        }
    }
}

/// Public summary returned by `get_application_info`. Carries no handles.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationInfo {
    pub applicant: Address,
    pub public_amount: i128,
    pub timestamp: u64,
    pub status: ApplicationStatus,
    pub donated_amount: i128,
}

/// Authorization record presented to the encryption service when a viewer
/// asks for plaintext.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptGrant {
    pub application_id: u64,
    pub viewer: Address,
    pub identity: BytesN<32>,
    pub reason: BytesN<32>,
    pub amount: BytesN<32>,
    pub issued_at: u64,
}
