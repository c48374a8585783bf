//! # Wallet identities, storage and allocation.
//!
//! - [`WalletRepository`] directory of `wallet_<id>.json` files
//! - [`WalletFactory`] / [`Ed25519Factory`] key material for new wallets
//! - [`WalletAllocator`] principals, replacement queue, fresh generation
//! - [`Signer`] / [`Ed25519Signer`] message signing with the payment key
//!
//! The supervisor only sees [`WalletRef`]; key material never leaves
//! [`WalletRecord`].

mod allocator;
mod factory;
mod record;
mod repository;
mod signer;

pub use allocator::{Partition, Source, WalletAllocator};
pub use factory::{DerivedKeys, Ed25519Factory, KEY_LEN, WalletFactory, derive_from_seed};
pub use record::{WalletId, WalletRecord, WalletRef};
pub use repository::WalletRepository;
pub use signer::{Ed25519Signer, Signer};
