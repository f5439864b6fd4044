//! # Chains - Adapters Between the Vault and Target Chains
//!
//! The vault derives raw secp256k1 scalars; everything chain-specific
//! (canonical public key form, display addresses, exported private key
//! strings, signature shaping) goes through a [`ChainAdapter`].
//!
//! Adapters are stateless: they are borrowed for the duration of a single
//! call and must not retain any key material handed to them.
//!
//! Two reference adapters ship here: [`EthAdapter`] for Ethereum-style
//! chains (keccak addresses, hex key export) and [`BtcAdapter`] for
//! Bitcoin (P2PKH addresses and WIF export; transaction assembly is out of
//! scope).
//!
//! ## Quick Start
//!
//! ```rust
//! use keyvault_chains::{ChainAdapter, EthAdapter, NetworkKind};
//!
//! let adapter = EthAdapter::new(NetworkKind::Mainnet);
//! let private_key = [1u8; 32];
//!
//! let public_key = adapter.public_key(&private_key)?;
//! let address = adapter.address(&public_key)?;
//! assert!(address.starts_with("0x"));
//!
//! let signature = adapter.sign(&private_key, &[7u8; 32])?;
//! assert_eq!(signature.v_right().len(), 65);
//! # Ok::<(), keyvault_chains::Error>(())
//! ```

mod adapter;
mod btc;
mod eth;
mod network;
mod secp;
mod signature;

pub use adapter::{ChainAdapter, ChainInfo, CHAIN_INFO_BTC, CHAIN_INFO_ETH};
pub use btc::BtcAdapter;
pub use eth::EthAdapter;
pub use network::NetworkKind;
pub use signature::Signature;

/// Errors produced by chain adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The private key is not a usable secp256k1 scalar.
    #[error("invalid private key: {reason}")]
    InvalidPrivateKey {
        /// Why the key was rejected.
        reason: &'static str,
    },

    /// The public key bytes are empty or not in the adapter's canonical
    /// form.
    #[error("invalid public key: {reason}")]
    InvalidPublicKey {
        /// Why the key was rejected.
        reason: &'static str,
    },

    /// The digest to sign has the wrong length (32 bytes expected).
    #[error("digest must be 32 bytes, got {length}")]
    InvalidDigest {
        /// The rejected digest length.
        length: usize,
    },

    /// The ECDSA signing operation itself failed.
    #[error("signing failed")]
    SigningFailed,
}

/// Convenience alias for `Result<T, keyvault_chains::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
