//! BLS12-381 signing primitives for threshold validators.
//!
//! All types are compressed serialized representations; points are only
//! decompressed at the blst boundary. Signatures use the Ethereum
//! `min_pk` ciphersuite: 48-byte public keys in G1, 96-byte signatures
//! in G2.

use blst::min_pk::{PublicKey as BlstPublicKey, SecretKey, Signature as BlstSignature};
use blst::BLST_ERROR;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Compressed BLS12-381 public key. Works for both root validator keys and
/// key shares.
pub type PublicKey = [u8; 48];

/// Compressed BLS12-381 private key. Works for both full private keys and
/// private key shares.
pub type PrivateKey = [u8; 32];

/// Compressed BLS12-381 signature, partial or aggregate.
pub type Signature = [u8; 96];

/// Domain separation tag of the Ethereum proof-of-possession ciphersuite.
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[derive(Debug, Clone)]
pub enum BlsError {
    KeyGeneration(String),
    InvalidKey(String),
    InvalidSignature(String),
    VerificationFailed,
}

impl std::error::Error for BlsError {}

impl fmt::Display for BlsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyGeneration(msg) => write!(f, "key generation failed: {msg}"),
            Self::InvalidKey(msg) => write!(f, "invalid BLS key: {msg}"),
            Self::InvalidSignature(msg) => write!(f, "invalid BLS signature: {msg}"),
            Self::VerificationFailed => write!(f, "BLS signature verification failed"),
        }
    }
}

/// Generates a secret key and returns its compressed serialized
/// representation.
pub fn generate_secret_key() -> Result<PrivateKey, BlsError> {
    let mut ikm = [0u8; 32];
    OsRng.fill_bytes(&mut ikm);
    let secret = SecretKey::key_gen(&ikm, &[])
        .map_err(|e| BlsError::KeyGeneration(format!("{e:?}")))?;
    Ok(secret.to_bytes())
}

/// Extracts the public key associated with the secret passed in input.
pub fn secret_to_public_key(secret: &PrivateKey) -> Result<PublicKey, BlsError> {
    let secret =
        SecretKey::from_bytes(secret).map_err(|e| BlsError::InvalidKey(format!("{e:?}")))?;
    Ok(secret.sk_to_pk().compress())
}

/// Signs `message` with the provided private key. Works on both shares of
/// private keys and complete private keys.
pub fn sign(secret: &PrivateKey, message: &[u8]) -> Result<Signature, BlsError> {
    let secret =
        SecretKey::from_bytes(secret).map_err(|e| BlsError::InvalidKey(format!("{e:?}")))?;
    Ok(secret.sign(message, DST, &[]).compress())
}

/// Verifies that `signature` was produced over `message` by the private key
/// associated with `pubkey`.
pub fn verify(pubkey: &PublicKey, message: &[u8], signature: &Signature) -> Result<(), BlsError> {
    let pubkey =
        BlstPublicKey::from_bytes(pubkey).map_err(|e| BlsError::InvalidKey(format!("{e:?}")))?;
    let signature = BlstSignature::from_bytes(signature)
        .map_err(|e| BlsError::InvalidSignature(format!("{e:?}")))?;

    match signature.verify(true, message, DST, &[], &pubkey, true) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        _ => Err(BlsError::VerificationFailed),
    }
}

/// A BLS verification capability.
///
/// Components take this at construction instead of calling into a global
/// implementation, so tests can swap the backend per instance.
pub trait Verifier: Send + Sync {
    fn verify(
        &self,
        pubkey: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), BlsError>;
}

/// The production [`Verifier`] backed by blst.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlstVerifier;

impl Verifier for BlstVerifier {
    fn verify(
        &self,
        pubkey: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), BlsError> {
        verify(pubkey, message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let secret = generate_secret_key().unwrap();
        let pubkey = secret_to_public_key(&secret).unwrap();
        let message = b"duty signing root";

        let signature = sign(&secret, message).unwrap();
        verify(&pubkey, message, &signature).unwrap();
    }

    #[test]
    fn tampered_signature_fails() {
        let secret = generate_secret_key().unwrap();
        let pubkey = secret_to_public_key(&secret).unwrap();

        let mut signature = sign(&secret, b"some message").unwrap();
        signature[90] ^= 0xff;
        assert!(matches!(
            verify(&pubkey, b"some message", &signature),
            Err(BlsError::InvalidSignature(_)) | Err(BlsError::VerificationFailed),
        ));
    }

    #[test]
    fn wrong_message_fails() {
        let secret = generate_secret_key().unwrap();
        let pubkey = secret_to_public_key(&secret).unwrap();

        let signature = sign(&secret, b"signed message").unwrap();
        assert!(matches!(
            verify(&pubkey, b"other message", &signature),
            Err(BlsError::VerificationFailed),
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let secret = generate_secret_key().unwrap();
        let other = generate_secret_key().unwrap();
        let other_pubkey = secret_to_public_key(&other).unwrap();

        let signature = sign(&secret, b"message").unwrap();
        assert!(verify(&other_pubkey, b"message", &signature).is_err());
    }
}
