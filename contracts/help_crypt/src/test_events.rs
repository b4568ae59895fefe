extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, Env, IntoVal, Symbol, TryIntoVal, Val,
};

use crate::events::{
    ApplicationCancelled, ApplicationFunded, ApplicationResolved, ApplicationSubmitted,
    DecryptGranted, DonationReceived,
};
use crate::mock_cipher::{encrypt, MockCipherService};
use crate::{HelpCrypt, HelpCryptClient};

fn setup() -> (Env, HelpCryptClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let cipher = env.register(MockCipherService, ());
    let token = env.register_stellar_asset_contract_v2(admin.clone());
    let contract_id = env.register(HelpCrypt, ());
    let client = HelpCryptClient::new(&env, &contract_id);
    client.init(&admin, &cipher, &token.address());
    (env, client, admin)
}

fn submit(env: &Env, client: &HelpCryptClient, applicant: &Address, amount: i128) -> u64 {
    let contract = client.address.clone();
    client.submit(
        applicant,
        &encrypt(env, &contract, applicant, 1),
        &encrypt(env, &contract, applicant, 2),
        &encrypt(env, &contract, applicant, amount as u64),
        &amount,
    )
}

/// Data of the event published by `client` under `(topic, id)` during the
/// last invocation.
fn find_event(env: &Env, client: &HelpCryptClient, topic: Symbol, id: u64) -> Val {
    let expected = vec![env, topic.into_val(env), id.into_val(env)];
    env.events()
        .all()
        .iter()
        .find(|(contract, topics, _)| *contract == client.address && *topics == expected)
        .map(|(_, _, data)| data)
        .expect("event not found")
}

#[test]
fn test_application_submitted_event() {
    let (env, client, _admin) = setup();
    env.ledger().set_timestamp(1_700_000_000);
    let applicant = Address::generate(&env);

    let id = submit(&env, &client, &applicant, 5000);

    let data: ApplicationSubmitted = find_event(&env, &client, symbol_short!("submitted"), id)
        .try_into_val(&env)
        .unwrap();
    assert_eq!(
        data,
        ApplicationSubmitted {
            application_id: id,
            applicant,
            public_amount: 5000,
            timestamp: 1_700_000_000,
        }
    );
}

#[test]
fn test_submission_grants_applicant_event() {
    let (env, client, _admin) = setup();
    let applicant = Address::generate(&env);

    let id = submit(&env, &client, &applicant, 5000);

    let data: DecryptGranted = find_event(&env, &client, symbol_short!("granted"), id)
        .try_into_val(&env)
        .unwrap();
    assert_eq!(
        data,
        DecryptGranted {
            application_id: id,
            viewer: applicant,
        }
    );
}

#[test]
fn test_verified_and_rejected_events() {
    let (env, client, _admin) = setup();
    let applicant = Address::generate(&env);
    let verifier = Address::generate(&env);
    let approved = submit(&env, &client, &applicant, 1000);
    let declined = submit(&env, &client, &applicant, 1000);

    client.verify(&verifier, &approved, &true);
    let data: ApplicationResolved = find_event(&env, &client, symbol_short!("verified"), approved)
        .try_into_val(&env)
        .unwrap();
    assert_eq!(
        data,
        ApplicationResolved {
            application_id: approved,
            verifier: verifier.clone(),
        }
    );

    client.verify(&verifier, &declined, &false);
    let data: ApplicationResolved = find_event(&env, &client, symbol_short!("rejected"), declined)
        .try_into_val(&env)
        .unwrap();
    assert_eq!(
        data,
        ApplicationResolved {
            application_id: declined,
            verifier,
        }
    );
}

#[test]
fn test_donated_and_funded_events() {
    let (env, client, _admin) = setup();
    let applicant = Address::generate(&env);
    let verifier = Address::generate(&env);
    let donor = Address::generate(&env);
    token::StellarAssetClient::new(&env, &client.token()).mint(&donor, &5000);
    let id = submit(&env, &client, &applicant, 5000);
    client.verify(&verifier, &id, &true);

    client.donate(&id, &donor, &5000);

    let donated: DonationReceived = find_event(&env, &client, symbol_short!("donated"), id)
        .try_into_val(&env)
        .unwrap();
    assert_eq!(
        donated,
        DonationReceived {
            application_id: id,
            donor,
            amount: 5000,
            donated_amount: 5000,
        }
    );

    let funded: ApplicationFunded = find_event(&env, &client, symbol_short!("funded"), id)
        .try_into_val(&env)
        .unwrap();
    assert_eq!(
        funded,
        ApplicationFunded {
            application_id: id,
            donated_amount: 5000,
        }
    );
}

#[test]
fn test_partial_donation_emits_no_funded_event() {
    let (env, client, _admin) = setup();
    let applicant = Address::generate(&env);
    let verifier = Address::generate(&env);
    let donor = Address::generate(&env);
    token::StellarAssetClient::new(&env, &client.token()).mint(&donor, &100);
    let id = submit(&env, &client, &applicant, 5000);
    client.verify(&verifier, &id, &true);

    client.donate(&id, &donor, &100);

    let funded_topics = vec![
        &env,
        symbol_short!("funded").into_val(&env),
        id.into_val(&env),
    ];
    let funded_seen = env
        .events()
        .all()
        .iter()
        .any(|(contract, topics, _)| contract == client.address && topics == funded_topics);
    assert!(!funded_seen);
}

#[test]
fn test_application_cancelled_event() {
    let (env, client, admin) = setup();
    let applicant = Address::generate(&env);
    let id = submit(&env, &client, &applicant, 1000);

    client.cancel(&admin, &id);

    let data: ApplicationCancelled = find_event(&env, &client, symbol_short!("cancelled"), id)
        .try_into_val(&env)
        .unwrap();
    assert_eq!(
        data,
        ApplicationCancelled {
            application_id: id,
            admin,
        }
    );
}

#[test]
fn test_grant_issued_event() {
    let (env, client, _admin) = setup();
    let applicant = Address::generate(&env);
    let id = submit(&env, &client, &applicant, 1000);

    client.issue_grant(&id, &applicant);

    let data: DecryptGranted = find_event(&env, &client, symbol_short!("issued"), id)
        .try_into_val(&env)
        .unwrap();
    assert_eq!(data.viewer, applicant);
}
