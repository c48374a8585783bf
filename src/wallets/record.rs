//! # Wallet identities and on-disk records.
//!
//! - [`WalletId`] stable numeric identity, also embedded in the file name
//! - [`WalletRef`] opaque token the supervisor passes around (identity + locator)
//! - [`WalletRecord`] the JSON document stored in `wallet_<id>.json`
//!
//! The supervisor only ever handles [`WalletRef`]; key material stays inside
//! [`WalletRecord`] and is read by the signer and the worker runtime.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const FILE_PREFIX: &str = "wallet_";
const FILE_SUFFIX: &str = ".json";

/// Stable numeric wallet identity (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletId(pub u64);

impl WalletId {
    /// Returns the file name holding this wallet (`wallet_<id>.json`).
    pub fn file_name(self) -> String {
        format!("{FILE_PREFIX}{}{FILE_SUFFIX}", self.0)
    }

    /// Parses a repository file name back into an identity.
    ///
    /// Returns `None` for anything not shaped like `wallet_<positive int>.json`,
    /// including non-canonical spellings such as `wallet_01.json`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let digits = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        match digits.parse::<u64>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(Self(n)),
        }
    }

    /// Returns the next identity.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to one wallet in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRef {
    id: WalletId,
    path: PathBuf,
}

impl WalletRef {
    /// Builds a reference for `id` inside `dir`.
    pub fn new(dir: &Path, id: WalletId) -> Self {
        Self {
            id,
            path: dir.join(id.file_name()),
        }
    }

    /// Returns the wallet identity.
    #[inline]
    pub fn id(&self) -> WalletId {
        self.id
    }

    /// Returns the file locator handed to the worker runtime.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for WalletRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{FILE_PREFIX}{}", self.id.0)
    }
}

/// Persisted wallet document.
///
/// `generated_signature` is written after the fact by whoever signs with the
/// wallet; the supervisor never touches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Hex-encoded 32-byte seed all keys are derived from.
    pub seed_phrase: String,
    /// Address derived from the payment and stake public keys.
    pub address: String,
    /// Payment public key (hex).
    pub public_key_hex: String,
    /// Payment private key (hex), used for message signing.
    pub payment_private_key_hex: String,
    /// Stake private key (hex), kept for completeness.
    pub stake_private_key_hex: String,
    /// Last signature produced with this wallet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_signature: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_round_trip() {
        assert_eq!(WalletId(12).file_name(), "wallet_12.json");
        assert_eq!(WalletId::from_file_name("wallet_12.json"), Some(WalletId(12)));
    }

    #[test]
    fn test_foreign_file_names_are_ignored() {
        for name in [
            "wallet_.json",
            "wallet_0.json",
            "wallet_01.json",
            "wallet_007.json",
            "wallet_-3.json",
            "wallet_+3.json",
            "wallet_3.json.tmp",
            "wallet_3.txt",
            "notes.json",
            "wallet_x1.json",
        ] {
            assert_eq!(WalletId::from_file_name(name), None, "{name}");
        }
    }

    #[test]
    fn test_ref_display_and_path() {
        let r = WalletRef::new(Path::new("/pool"), WalletId(4));
        assert_eq!(r.to_string(), "wallet_4");
        assert_eq!(r.path(), Path::new("/pool/wallet_4.json"));
    }

    #[test]
    fn test_record_without_signature_decodes() {
        let json = r#"{
            "seed_phrase": "00",
            "address": "addr_00",
            "public_key_hex": "aa",
            "payment_private_key_hex": "bb",
            "stake_private_key_hex": "cc"
        }"#;
        let rec: WalletRecord = serde_json::from_str(json).unwrap();
        assert!(rec.generated_signature.is_none());
        assert!(!serde_json::to_string(&rec).unwrap().contains("generated_signature"));
    }
}
