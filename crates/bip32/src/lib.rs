//! # BIP32 - Hierarchical Deterministic Wallets
//!
//! Extended keys and child derivation over secp256k1, following the BIP32
//! standard: a single seed expands into a tree of key pairs, any subtree of
//! which can be recovered from its root.
//!
//! ## Overview
//!
//! The two central types are [`ExtendedPrivateKey`] and
//! [`ExtendedPublicKey`]: a key plus the chain code and tree metadata
//! (depth, parent fingerprint, child number) that hierarchical derivation
//! needs. Private keys derive both hardened and normal children; public
//! keys derive normal children only. Both serialize to the 78-byte wire
//! form wrapped in base58check (`xprv...`/`xpub...`).
//!
//! ## Quick Start
//!
//! ```rust
//! use keyvault_bip32::{DerivationPath, ExtendedPrivateKey, Network};
//! use std::str::FromStr;
//!
//! // Master key from a seed (normally produced by a BIP39 mnemonic).
//! let master = ExtendedPrivateKey::from_seed(&[42u8; 64], Network::Mainnet)?;
//!
//! // Walk a BIP44-style path.
//! let path = DerivationPath::from_str("m/44'/0'/0'/0/0")?;
//! let leaf = master.derive_path(&path)?;
//! assert_eq!(leaf.depth(), 5);
//!
//! // Serialize for backup; watch-only side can be shared.
//! let xprv = leaf.to_string();
//! let xpub = leaf.to_extended_public_key().to_string();
//! assert!(xprv.starts_with("xprv"));
//! assert!(xpub.starts_with("xpub"));
//! # Ok::<(), keyvault_bip32::Error>(())
//! ```

mod chain_code;
mod child_number;
mod derivation_path;
mod error;
mod extended_private_key;
mod extended_public_key;
mod network;
mod private_key;
mod public_key;

pub use chain_code::ChainCode;
pub use child_number::ChildNumber;
pub use derivation_path::DerivationPath;
pub use error::{Error, Result};
pub use extended_private_key::ExtendedPrivateKey;
pub use extended_public_key::ExtendedPublicKey;
pub use network::{KeyType, Network};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
