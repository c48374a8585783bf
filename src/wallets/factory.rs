//! # Wallet factory: produces key material for new wallets.
//!
//! [`WalletFactory`] is the seam between the repository and key derivation.
//! The repository decides *which* identity a new wallet gets and persists it;
//! the factory only produces the record contents.
//!
//! [`Ed25519Factory`] draws a 32-byte seed from the OS random source and
//! derives two ed25519 keys from it:
//! ```text
//! seed ──► sha256("slotvisor/payment" ‖ seed) ──► payment signing key
//!      └─► sha256("slotvisor/stake"   ‖ seed) ──► stake signing key
//!
//! address = "addr_" ‖ hex(sha256(payment_pub ‖ stake_pub)[..28])
//! ```
//! The same seed always yields the same record (see [`derive_from_seed`]).

use ed25519_dalek::SigningKey;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::KeyError;
use crate::wallets::record::WalletRecord;

const PAYMENT_DOMAIN: &[u8] = b"slotvisor/payment";
const STAKE_DOMAIN: &[u8] = b"slotvisor/stake";
const ADDRESS_HASH_LEN: usize = 28;

/// Length of a seed, private key or public key in bytes.
pub const KEY_LEN: usize = 32;

/// Produces the contents of a brand-new wallet.
pub trait WalletFactory: Send + Sync + 'static {
    /// Creates fresh key material.
    fn create(&self) -> Result<WalletRecord, KeyError>;
}

/// Default factory backed by `ed25519-dalek` and the OS random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Factory;

impl WalletFactory for Ed25519Factory {
    fn create(&self) -> Result<WalletRecord, KeyError> {
        let mut seed = [0u8; KEY_LEN];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| KeyError::Entropy(e.to_string()))?;
        Ok(DerivedKeys::from_seed(&seed).into_record(&seed))
    }
}

/// Payment and stake keys derived from one seed.
pub struct DerivedKeys {
    /// Key used for message signing.
    pub payment: SigningKey,
    /// Key bound into the address.
    pub stake: SigningKey,
}

impl DerivedKeys {
    /// Derives both keys from raw seed bytes.
    pub fn from_seed(seed: &[u8; KEY_LEN]) -> Self {
        Self {
            payment: SigningKey::from_bytes(&domain_hash(PAYMENT_DOMAIN, seed)),
            stake: SigningKey::from_bytes(&domain_hash(STAKE_DOMAIN, seed)),
        }
    }

    /// Returns the address bound to both public keys.
    pub fn address(&self) -> String {
        let digest = Sha256::new()
            .chain_update(self.payment.verifying_key().as_bytes())
            .chain_update(self.stake.verifying_key().as_bytes())
            .finalize();
        format!("addr_{}", hex::encode(&digest[..ADDRESS_HASH_LEN]))
    }

    fn into_record(self, seed: &[u8; KEY_LEN]) -> WalletRecord {
        WalletRecord {
            seed_phrase: hex::encode(seed),
            address: self.address(),
            public_key_hex: hex::encode(self.payment.verifying_key().as_bytes()),
            payment_private_key_hex: hex::encode(self.payment.to_bytes()),
            stake_private_key_hex: hex::encode(self.stake.to_bytes()),
            generated_signature: None,
        }
    }
}

/// Rebuilds the full wallet record from a hex seed.
pub fn derive_from_seed(seed_hex: &str) -> Result<WalletRecord, KeyError> {
    let seed = decode_key("seed_phrase", seed_hex)?;
    Ok(DerivedKeys::from_seed(&seed).into_record(&seed))
}

/// Decodes a 32-byte hex field.
pub(crate) fn decode_key(field: &'static str, value: &str) -> Result<[u8; KEY_LEN], KeyError> {
    let bytes = hex::decode(value.trim()).map_err(|source| KeyError::Hex { field, source })?;
    <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| KeyError::Length {
        field,
        expected: KEY_LEN,
        found: bytes.len(),
    })
}

fn domain_hash(domain: &[u8], seed: &[u8; KEY_LEN]) -> [u8; KEY_LEN] {
    let digest = Sha256::new().chain_update(domain).chain_update(seed).finalize();
    let mut out = [0u8; KEY_LEN];
    out.copy_from_slice(&digest);
    out
}
