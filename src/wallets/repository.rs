//! # Directory-backed wallet repository.
//!
//! One pretty-printed JSON file per identity:
//! ```text
//! <dir>/
//!   wallet_1.json
//!   wallet_2.json
//!   ...
//! ```
//!
//! ## Rules
//! - The directory is created on [`WalletRepository::open`] if absent.
//! - Files not named `wallet_<id>.json` are ignored by the listing.
//! - Creating a wallet never overwrites an existing file, and never leaves a
//!   partial one behind: the record is written to a hidden temp file, synced,
//!   then hard-linked into place.
//! - Identities are canonical: `wallet_01.json` is not wallet 1.
//! - The repository never deletes a wallet.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::RepositoryError;
use crate::wallets::factory::WalletFactory;
use crate::wallets::record::{WalletId, WalletRecord, WalletRef};

/// Durable store of wallet records keyed by [`WalletId`].
pub struct WalletRepository {
    dir: PathBuf,
    factory: Arc<dyn WalletFactory>,
}

impl WalletRepository {
    /// Opens (and creates if needed) the repository rooted at `dir`.
    pub fn open(
        dir: impl Into<PathBuf>,
        factory: Arc<dyn WalletFactory>,
    ) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| RepositoryError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, factory })
    }

    /// Returns the repository directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns every wallet in ascending identity order.
    pub fn list(&self) -> Result<Vec<WalletRef>, RepositoryError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| self.io_err(&self.dir, source))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| self.io_err(&self.dir, source))?;
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(WalletId::from_file_name) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        ids.dedup();
        Ok(ids.into_iter().map(|id| WalletRef::new(&self.dir, id)).collect())
    }

    /// Returns a reference to `id` without touching the filesystem.
    pub fn locate(&self, id: WalletId) -> WalletRef {
        WalletRef::new(&self.dir, id)
    }

    /// Loads and decodes the record of `id`.
    pub fn load(&self, id: WalletId) -> Result<WalletRecord, RepositoryError> {
        let wallet = self.locate(id);
        let raw = fs::read(wallet.path()).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RepositoryError::NotFound { id },
            _ => self.io_err(wallet.path(), source),
        })?;
        serde_json::from_slice(&raw).map_err(|source| RepositoryError::Decode {
            path: wallet.path().to_path_buf(),
            source,
        })
    }

    /// Generates a wallet through the factory and persists it as `id`.
    ///
    /// Fails with [`RepositoryError::Exists`] if `id` is already taken. On any
    /// failure the directory is left as it was.
    pub fn create(&self, id: WalletId) -> Result<WalletRef, RepositoryError> {
        let wallet = self.locate(id);
        if wallet.path().exists() {
            return Err(RepositoryError::Exists { id });
        }

        let record = self.factory.create()?;
        let body = encode(id, &record)?;

        let tmp = self.dir.join(format!(".{}.tmp", id.file_name()));
        let res = self.link_new(id, &tmp, wallet.path(), &body);
        let _ = fs::remove_file(&tmp);
        res.map(|()| wallet)
    }

    /// Writes `body` to `tmp`, then links it at `path` unless `path` exists.
    fn link_new(
        &self,
        id: WalletId,
        tmp: &Path,
        path: &Path,
        body: &[u8],
    ) -> Result<(), RepositoryError> {
        let mut file = File::create(tmp).map_err(|source| self.io_err(tmp, source))?;
        file.write_all(body)
            .and_then(|()| file.sync_all())
            .map_err(|source| self.io_err(tmp, source))?;

        fs::hard_link(tmp, path).map_err(|source| match source.kind() {
            io::ErrorKind::AlreadyExists => RepositoryError::Exists { id },
            _ => self.io_err(path, source),
        })
    }

    /// Records `signature` as the wallet's last generated signature.
    pub fn store_signature(&self, id: WalletId, signature: &str) -> Result<(), RepositoryError> {
        let mut record = self.load(id)?;
        record.generated_signature = Some(signature.to_string());
        let body = encode(id, &record)?;

        let wallet = self.locate(id);
        let tmp = wallet.path().with_extension("json.tmp");
        fs::write(&tmp, &body).map_err(|source| self.io_err(&tmp, source))?;
        fs::rename(&tmp, wallet.path()).map_err(|source| self.io_err(wallet.path(), source))
    }

    fn io_err(&self, path: &Path, source: io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn encode(id: WalletId, record: &WalletRecord) -> Result<Vec<u8>, RepositoryError> {
    serde_json::to_vec_pretty(record).map_err(|source| RepositoryError::Encode { id, source })
}
