//! # Cipher
//!
//! Boundary to the confidential-computation backend. HelpCrypt never sees
//! plaintext: it stores handles, asks the backend to check input proofs, and
//! tells the backend who may decrypt. Any contract exposing the
//! [`CipherService`] interface can sit behind the configured address, whether
//! a real FHE coprocessor or a test double.

use soroban_sdk::{contractclient, Address, Bytes, BytesN, Env};

use crate::types::{ApplicationConfig, EncryptedInput};
use crate::Error;

/// Interface of the ciphertext backend contract.
#[contractclient(name = "CipherServiceClient")]
pub trait CipherService {
    /// Return `true` when `proof` attests that `handle` was encrypted by
    /// `owner` for use by `contract`.
    fn verify_input(
        env: Env,
        handle: BytesN<32>,
        proof: Bytes,
        contract: Address,
        owner: Address,
    ) -> bool;

    /// Record that `account` may request decryption of `handle`.
    fn allow(env: Env, handle: BytesN<32>, account: Address);
}

/// Accept an encrypted input submitted by `owner`, returning its handle once
/// the backend has validated the proof.
pub fn ingest(
    env: &Env,
    service: &Address,
    input: &EncryptedInput,
    owner: &Address,
) -> Result<BytesN<32>, Error> {
    let client = CipherServiceClient::new(env, service);
    let valid = client.verify_input(
        &input.handle,
        &input.proof,
        &env.current_contract_address(),
        owner,
    );
    if !valid {
        return Err(Error::InvalidCiphertextProof);
    }
    Ok(input.handle.clone())
}

/// Forward a decrypt permission for all three encrypted fields of an
/// application to the backend.
pub fn allow_fields(env: &Env, service: &Address, config: &ApplicationConfig, viewer: &Address) {
    let client = CipherServiceClient::new(env, service);
    client.allow(&config.encrypted_identity, viewer);
    client.allow(&config.encrypted_reason, viewer);
    client.allow(&config.encrypted_amount, viewer);
}
