//! # Message signing with a wallet's payment key.
//!
//! The worker runtime signs exactly one challenge message per run; the `sign`
//! operator tool does the same by hand. Both go through [`Signer`].

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier, VerifyingKey};

use crate::error::KeyError;
use crate::wallets::factory::{KEY_LEN, decode_key};
use crate::wallets::record::WalletRecord;

/// Signs UTF-8 messages and exposes the matching public key.
pub trait Signer {
    /// Returns the hex-encoded signature of `message`.
    fn sign(&self, message: &str) -> String;

    /// Returns the hex-encoded public key a verifier needs.
    fn public_key_hex(&self) -> String;
}

/// [`Signer`] over the wallet's ed25519 payment key.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Loads the payment key from a wallet record.
    pub fn from_record(record: &WalletRecord) -> Result<Self, KeyError> {
        let secret = decode_key("payment_private_key_hex", &record.payment_private_key_hex)?;
        Ok(Self {
            key: SigningKey::from_bytes(&secret),
        })
    }

    /// Verifies a hex signature against a hex public key.
    ///
    /// Any decoding problem counts as a failed verification.
    pub fn verify(public_key_hex: &str, message: &str, signature_hex: &str) -> bool {
        let Ok(public) = decode_key("public_key_hex", public_key_hex) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(&public) else {
            return false;
        };
        let Ok(sig) = hex::decode(signature_hex.trim()) else {
            return false;
        };
        let Ok(sig) = <[u8; KEY_LEN * 2]>::try_from(sig.as_slice()) else {
            return false;
        };
        key.verify(message.as_bytes(), &Signature::from_bytes(&sig))
            .is_ok()
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &str) -> String {
        hex::encode(self.key.sign(message.as_bytes()).to_bytes())
    }

    fn public_key_hex(&self) -> String {
        hex::encode(self.key.verifying_key().as_bytes())
    }
}
