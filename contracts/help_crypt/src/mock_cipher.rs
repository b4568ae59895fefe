//! Test double for the ciphertext backend.
//!
//! Handles are `sha256(plaintext || owner)` and a proof is
//! `sha256(handle || contract || owner)`, so a proof only verifies for the
//! contract and submitter it was produced for.

use soroban_sdk::{
    contract, contractimpl, contracttype, xdr::ToXdr, Address, Bytes, BytesN, Env,
};

use crate::EncryptedInput;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum MockKey {
    Allowed(BytesN<32>, Address),
}

#[contract]
pub struct MockCipherService;

#[contractimpl]
impl MockCipherService {
    pub fn verify_input(
        env: Env,
        handle: BytesN<32>,
        proof: Bytes,
        contract: Address,
        owner: Address,
    ) -> bool {
        proof == input_proof(&env, &handle, &contract, &owner)
    }

    pub fn allow(env: Env, handle: BytesN<32>, account: Address) {
        env.storage()
            .persistent()
            .set(&MockKey::Allowed(handle, account), &true);
    }

    pub fn is_allowed(env: Env, handle: BytesN<32>, account: Address) -> bool {
        env.storage()
            .persistent()
            .has(&MockKey::Allowed(handle, account))
    }
}

fn input_proof(env: &Env, handle: &BytesN<32>, contract: &Address, owner: &Address) -> Bytes {
    let mut preimage = Bytes::from(handle.clone());
    preimage.append(&contract.clone().to_xdr(env));
    preimage.append(&owner.clone().to_xdr(env));
    Bytes::from(env.crypto().sha256(&preimage).to_bytes())
}

/// Client-side encryption of `plaintext` by `owner` for `contract`.
pub fn encrypt(env: &Env, contract: &Address, owner: &Address, plaintext: u64) -> EncryptedInput {
    let mut seed = Bytes::from_array(env, &plaintext.to_be_bytes());
    seed.append(&owner.clone().to_xdr(env));
    let handle = env.crypto().sha256(&seed).to_bytes();
    let proof = input_proof(env, &handle, contract, owner);
    EncryptedInput { handle, proof }
}
