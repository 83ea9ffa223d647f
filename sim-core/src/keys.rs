//! Signer key derivation
//!
//! Signer keys are a stable contract with the VM runner: the key for an
//! account is a pure function of its identifier and must be reproduced
//! bit-exactly on both sides.

/// Derive the deterministic signer public key for an account identifier.
///
/// The key is the base-58 encoding of the first 32 bytes of the identifier,
/// right-padded with ASCII spaces to exactly 32 bytes.
pub fn signer_public_key(account_id: &str) -> String {
    let mut bytes = [b' '; 32];
    for (slot, byte) in bytes.iter_mut().zip(account_id.bytes()) {
        *slot = byte;
    }
    bs58::encode(bytes).into_string()
}
