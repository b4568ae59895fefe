//! # Lifecycle
//!
//! Pure transition functions over [`ApplicationState`]. Each takes the state
//! observed at call time and returns the next state or the reason the
//! transition is illegal. Nothing here touches storage, so the entry points
//! can validate fully before writing anything.

use soroban_sdk::Address;

use crate::types::{ApplicationStatus, ApplicationState};
use crate::Error;

/// Legal edges of the status graph.
pub fn can_transition(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    use ApplicationStatus::*;
    matches!(
        (from, to),
        (Pending, Verified)
            | (Pending, Rejected)
            | (Pending, Cancelled)
            | (Verified, Funded)
            | (Verified, Cancelled)
    )
}

/// Resolve a pending application on behalf of `verifier`.
pub fn resolve(
    state: &ApplicationState,
    applicant: &Address,
    verifier: &Address,
    approved: bool,
) -> Result<ApplicationState, Error> {
    if verifier == applicant {
        return Err(Error::SelfVerificationForbidden);
    }
    let target = if approved {
        ApplicationStatus::Verified
    } else {
        ApplicationStatus::Rejected
    };
    if !can_transition(state.status, target) {
        return Err(Error::InvalidStateTransition);
    }
    Ok(ApplicationState {
        status: target,
        verifier: Some(verifier.clone()),
        donated_amount: state.donated_amount,
    })
}

/// Account for a donation of `amount` towards `public_amount`.
///
/// The donation that reaches or passes the target moves the application to
/// `Funded`; the overshoot is still counted.
pub fn apply_donation(
    state: &ApplicationState,
    public_amount: i128,
    amount: i128,
) -> Result<ApplicationState, Error> {
    if state.status != ApplicationStatus::Verified {
        return Err(Error::ApplicationNotVerified);
    }
    if amount <= 0 {
        return Err(Error::ZeroDonation);
    }
    let donated_amount = state
        .donated_amount
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    let status = if donated_amount >= public_amount {
        ApplicationStatus::Funded
    } else {
        ApplicationStatus::Verified
    };
    Ok(ApplicationState {
        status,
        verifier: state.verifier.clone(),
        donated_amount,
    })
}

/// Administrative withdrawal of an application that is still open.
pub fn cancel(state: &ApplicationState) -> Result<ApplicationState, Error> {
    if !can_transition(state.status, ApplicationStatus::Cancelled) {
        return Err(Error::InvalidStateTransition);
    }
    Ok(ApplicationState {
        status: ApplicationStatus::Cancelled,
        verifier: state.verifier.clone(),
        donated_amount: state.donated_amount,
    })
}
