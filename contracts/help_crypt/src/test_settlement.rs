extern crate std;

use soroban_sdk::{testutils::Address as _, token, Address, Env};

use crate::invariants;
use crate::mock_cipher::{encrypt, MockCipherService};
use crate::{ApplicationStatus, Error, HelpCrypt, HelpCryptClient};

fn setup() -> (Env, HelpCryptClient<'static>, token::Client<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let cipher = env.register(MockCipherService, ());
    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    let token = token::Client::new(&env, &sac.address());
    let contract_id = env.register(HelpCrypt, ());
    let client = HelpCryptClient::new(&env, &contract_id);
    client.init(&admin, &cipher, &token.address);
    (env, client, token, admin)
}

fn mint(env: &Env, token: &token::Client, to: &Address, amount: i128) {
    token::StellarAssetClient::new(env, &token.address).mint(to, &amount);
}

fn submit(env: &Env, client: &HelpCryptClient, applicant: &Address, amount: i128) -> u64 {
    let contract = client.address.clone();
    client.submit(
        applicant,
        &encrypt(env, &contract, applicant, 77_777_777_777_777),
        &encrypt(env, &contract, applicant, 88_888_888_888_888),
        &encrypt(env, &contract, applicant, amount as u64),
        &amount,
    )
}

fn verified_application(env: &Env, client: &HelpCryptClient, amount: i128) -> (u64, Address) {
    let applicant = Address::generate(env);
    let verifier = Address::generate(env);
    let id = submit(env, client, &applicant, amount);
    client.verify(&verifier, &id, &true);
    (id, applicant)
}

#[test]
fn test_full_funding_scenario() {
    let (env, client, token, _admin) = setup();
    let applicant = Address::generate(&env);
    let verifier = Address::generate(&env);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 5000);

    let id = submit(&env, &client, &applicant, 5000);
    assert_eq!(id, 0);
    assert_eq!(client.get_application_info(&id).status, ApplicationStatus::Pending);
    assert_eq!(client.get_application_info(&id).donated_amount, 0);

    client.verify(&verifier, &id, &true);
    assert_eq!(client.get_application_info(&id).status, ApplicationStatus::Verified);
    assert_eq!(client.get_verifier(&id), Some(verifier));

    let balance_before = token.balance(&applicant);
    client.donate(&id, &donor, &5000);

    assert_eq!(token.balance(&applicant) - balance_before, 5000);
    assert_eq!(token.balance(&donor), 0);
    let info = client.get_application_info(&id);
    assert_eq!(info.donated_amount, 5000);
    assert_eq!(info.status, ApplicationStatus::Funded);
}

#[test]
fn test_donations_accumulate_across_donors() {
    let (env, client, token, _admin) = setup();
    let (id, applicant) = verified_application(&env, &client, 1000);
    let donors = [
        (Address::generate(&env), 300i128),
        (Address::generate(&env), 450i128),
        (Address::generate(&env), 100i128),
    ];

    for (donor, amount) in donors.iter() {
        mint(&env, &token, donor, *amount);
        let before = client.get_application_info(&id).donated_amount;
        let applicant_before = token.balance(&applicant);

        client.donate(&id, donor, amount);

        let after = client.get_application_info(&id).donated_amount;
        invariants::assert_donation_invariant(before, after, *amount);
        assert_eq!(token.balance(&applicant) - applicant_before, *amount);
    }

    let info = client.get_application_info(&id);
    assert_eq!(info.donated_amount, 850);
    assert_eq!(info.status, ApplicationStatus::Verified);
}

#[test]
fn test_donation_reaching_target_funds_application() {
    let (env, client, token, _admin) = setup();
    let (id, _applicant) = verified_application(&env, &client, 1000);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 1000);

    client.donate(&id, &donor, &600);
    assert_eq!(client.get_application_info(&id).status, ApplicationStatus::Verified);

    client.donate(&id, &donor, &400);
    let application = client.get_application(&id);
    assert_eq!(application.status, ApplicationStatus::Funded);
    assert_eq!(application.donated_amount, 1000);
    invariants::assert_all_application_invariants(&application);
}

#[test]
fn test_overshoot_is_transferred_and_counted() {
    let (env, client, token, _admin) = setup();
    let (id, applicant) = verified_application(&env, &client, 2000);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 1_000_000);

    client.donate(&id, &donor, &1_000_000);

    let info = client.get_application_info(&id);
    assert_eq!(info.donated_amount, 1_000_000);
    assert_eq!(info.status, ApplicationStatus::Funded);
    assert_eq!(token.balance(&applicant), 1_000_000);
}

#[test]
fn test_funded_application_stays_funded() {
    let (env, client, token, _admin) = setup();
    let (id, _applicant) = verified_application(&env, &client, 500);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 1000);

    client.donate(&id, &donor, &500);
    assert_eq!(
        client.try_donate(&id, &donor, &100),
        Err(Ok(Error::ApplicationNotVerified))
    );

    let info = client.get_application_info(&id);
    assert_eq!(info.status, ApplicationStatus::Funded);
    assert_eq!(info.donated_amount, 500);
    assert_eq!(token.balance(&donor), 500);
}

#[test]
fn test_donate_before_verification_fails() {
    let (env, client, token, _admin) = setup();
    let applicant = Address::generate(&env);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 100);
    let id = submit(&env, &client, &applicant, 1000);

    assert_eq!(
        client.try_donate(&id, &donor, &100),
        Err(Ok(Error::ApplicationNotVerified))
    );
    assert_eq!(client.get_application_info(&id).donated_amount, 0);
    assert_eq!(token.balance(&donor), 100);
    assert_eq!(token.balance(&applicant), 0);
}

#[test]
fn test_donate_to_rejected_application_fails() {
    let (env, client, token, _admin) = setup();
    let applicant = Address::generate(&env);
    let verifier = Address::generate(&env);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 100);
    let id = submit(&env, &client, &applicant, 3000);

    client.verify(&verifier, &id, &false);
    assert_eq!(client.get_application_info(&id).status, ApplicationStatus::Rejected);

    assert_eq!(
        client.try_donate(&id, &donor, &100),
        Err(Ok(Error::ApplicationNotVerified))
    );
}

#[test]
fn test_donate_to_cancelled_application_fails() {
    let (env, client, token, admin) = setup();
    let (id, _applicant) = verified_application(&env, &client, 3000);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 100);

    client.cancel(&admin, &id);

    assert_eq!(
        client.try_donate(&id, &donor, &100),
        Err(Ok(Error::ApplicationNotVerified))
    );
}

#[test]
fn test_zero_donation_fails() {
    let (env, client, _token, _admin) = setup();
    let (id, _applicant) = verified_application(&env, &client, 1000);
    let donor = Address::generate(&env);

    assert_eq!(client.try_donate(&id, &donor, &0), Err(Ok(Error::ZeroDonation)));
    assert_eq!(client.try_donate(&id, &donor, &-10), Err(Ok(Error::ZeroDonation)));
    assert!(!client.can_decrypt(&id, &donor));
}

#[test]
fn test_donate_unknown_application_fails() {
    let (env, client, _token, _admin) = setup();
    let donor = Address::generate(&env);
    assert_eq!(client.try_donate(&3, &donor, &10), Err(Ok(Error::NotFound)));
}

#[test]
fn test_applicant_cannot_fund_own_application() {
    let (env, client, token, _admin) = setup();
    let (id, applicant) = verified_application(&env, &client, 1000);
    mint(&env, &token, &applicant, 1000);

    assert_eq!(
        client.try_donate(&id, &applicant, &1000),
        Err(Ok(Error::SelfDonationForbidden))
    );

    let info = client.get_application_info(&id);
    assert_eq!(info.status, ApplicationStatus::Verified);
    assert_eq!(info.donated_amount, 0);
    assert_eq!(token.balance(&applicant), 1000);

    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 1000);
    client.donate(&id, &donor, &1000);
    assert_eq!(client.get_application_info(&id).status, ApplicationStatus::Funded);
}

#[test]
fn test_failed_transfer_reverts_donation() {
    let (env, client, token, _admin) = setup();
    let (id, applicant) = verified_application(&env, &client, 1000);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 50);

    assert_eq!(
        client.try_donate(&id, &donor, &500),
        Err(Ok(Error::TransferFailed))
    );

    let info = client.get_application_info(&id);
    assert_eq!(info.donated_amount, 0);
    assert_eq!(info.status, ApplicationStatus::Verified);
    assert!(!client.can_decrypt(&id, &donor));
    assert_eq!(token.balance(&donor), 50);
    assert_eq!(token.balance(&applicant), 0);
}

#[test]
fn test_contract_never_holds_funds() {
    let (env, client, token, _admin) = setup();
    let (id, _applicant) = verified_application(&env, &client, 1000);
    let donor = Address::generate(&env);
    mint(&env, &token, &donor, 700);

    client.donate(&id, &donor, &700);

    assert_eq!(token.balance(&client.address), 0);
}
