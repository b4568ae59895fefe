//! Event types emitted by the HelpCrypt contract, plus the database rows the
//! indexer derives from them.
//!
//! These mirror `contracts/help_crypt/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the HelpCrypt contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `submitted`: a new application was registered.
    ApplicationSubmitted,
    /// `verified`: a verifier approved an application.
    ApplicationVerified,
    /// `rejected`: a verifier turned an application down.
    ApplicationRejected,
    /// `donated`: a donor paid the applicant.
    DonationReceived,
    /// `funded`: donations reached the requested amount.
    ApplicationFunded,
    /// `cancelled`: the administrator withdrew an application.
    ApplicationCancelled,
    /// `granted`: an address gained decrypt access.
    DecryptGranted,
    /// `issued`: a decrypt authorization was handed to a viewer.
    GrantIssued,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "submitted" => Self::ApplicationSubmitted,
            "verified" => Self::ApplicationVerified,
            "rejected" => Self::ApplicationRejected,
            "donated" => Self::DonationReceived,
            "funded" => Self::ApplicationFunded,
            "cancelled" => Self::ApplicationCancelled,
            "granted" => Self::DecryptGranted,
            "issued" => Self::GrantIssued,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationSubmitted => "application_submitted",
            Self::ApplicationVerified => "application_verified",
            Self::ApplicationRejected => "application_rejected",
            Self::DonationReceived => "donation_received",
            Self::ApplicationFunded => "application_funded",
            Self::ApplicationCancelled => "application_cancelled",
            Self::DecryptGranted => "decrypt_granted",
            Self::GrantIssued => "grant_issued",
            Self::Unknown => "unknown",
        }
    }

    /// Status code the application moves to, for kinds that change it.
    pub fn target_status(&self) -> Option<ApplicationStatus> {
        match self {
            Self::ApplicationSubmitted => Some(ApplicationStatus::Pending),
            Self::ApplicationVerified => Some(ApplicationStatus::Verified),
            Self::ApplicationRejected => Some(ApplicationStatus::Rejected),
            Self::ApplicationFunded => Some(ApplicationStatus::Funded),
            Self::ApplicationCancelled => Some(ApplicationStatus::Cancelled),
            _ => None,
        }
    }
}

/// Application status as stored on-chain (`0..=4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending = 0,
    Verified = 1,
    Rejected = 2,
    Funded = 3,
    Cancelled = 4,
}

impl ApplicationStatus {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Verified),
            2 => Some(Self::Rejected),
            3 => Some(Self::Funded),
            4 => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A decoded HelpCrypt event, ready to be stored.
///
/// `amount` is the event's headline figure: the requested amount for
/// `submitted`, the donation for `donated`, the final total for `funded`.
/// `total` is the running donated total carried by `donated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpCryptEvent {
    /// RPC event id; the deduplication key.
    pub event_id: String,
    pub kind: EventKind,
    pub application_id: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub total: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub application_id: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub total: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// A row of the `applications` projection.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApplicationRecord {
    pub application_id: i64,
    pub applicant: String,
    pub public_amount: String,
    pub status: i64,
    pub verifier: Option<String>,
    pub donated_amount: String,
    pub submitted_at: i64,
    pub updated_ledger: i64,
}

impl ApplicationRecord {
    /// Funding progress in whole percent, capped at 100.
    pub fn progress_percent(&self) -> u8 {
        let target: i128 = self.public_amount.parse().unwrap_or(0);
        let donated: i128 = self.donated_amount.parse().unwrap_or(0);
        if target <= 0 {
            return 0;
        }
        (donated.saturating_mul(100) / target).clamp(0, 100) as u8
    }
}
