//! # KeyVault Core - the Encrypted HD Key Vault
//!
//! The [`Vault`] owns a BIP32 master key (born from a BIP39 mnemonic or an
//! imported extended key), derives per-chain leaf keys along BIP44-style
//! paths, and keeps everything encrypted at rest: the vault file is a
//! base64-wrapped scrypt envelope, and each cached leaf key sits in its own
//! envelope whose password binds the vault password to the leaf's exact
//! derivation path.
//!
//! Chain specifics (addresses, key export text, signature shaping) are
//! delegated to a borrowed
//! [`ChainAdapter`](keyvault_chains::ChainAdapter).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyvault_chains::EthAdapter;
//! use keyvault_core::Vault;
//!
//! let vault = Vault::create("wallet.dat", "hunter2")?;
//! vault.set_save_sub_key(true);
//!
//! let adapter = EthAdapter::new(Default::default());
//! let (address, key_path) = vault.create_account(44, 60, 0, 0, 0, 0, &adapter)?;
//!
//! let signature = vault.sign(&address, &key_path, &[0u8; 32], &adapter)?;
//! assert_eq!(signature.v_right().len(), 65);
//! # Ok::<(), keyvault_core::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! A `Vault` is a shared value: read-only operations (`sign`, the
//! `export_*` family, `accounts`) take a read lock, while mutations
//! (`create_account`, `del_mnemonic`) serialize behind a write lock and a
//! persist gate. The scrypt KDF, seconds of CPU at production strength,
//! always runs outside the reader/writer lock so it never starves readers.
//! Persistence replaces the vault file atomically; a crash mid-write
//! leaves the previous snapshot intact.

mod record;
mod store;
mod vault;

pub use keyvault_keystore::ScryptParams;
pub use record::{AccountSummary, LeafRecord};
pub use vault::{Vault, VaultOptions};

/// Errors surfaced by vault operations.
///
/// Lower-layer failures (derivation, mnemonic validation, envelope
/// decryption, adapter calls) pass through unchanged; the variants below
/// are the vault's own failure modes. No variant ever carries key
/// material.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Extended-key derivation or serialization failed.
    #[error(transparent)]
    Bip32(#[from] keyvault_bip32::Error),

    /// Mnemonic validation or generation failed.
    #[error(transparent)]
    Bip39(#[from] keyvault_bip39::Error),

    /// Account-path validation or the derivation walk failed.
    #[error(transparent)]
    Path(#[from] keyvault_bip44::Error),

    /// Envelope encryption or decryption failed (including the
    /// wrong-password MAC mismatch).
    #[error(transparent)]
    Keystore(#[from] keyvault_keystore::Error),

    /// A chain adapter rejected its input or failed to sign.
    #[error(transparent)]
    Chain(#[from] keyvault_chains::Error),

    /// The vault document could not be serialized or parsed.
    #[error("vault document error: {0}")]
    Json(#[from] serde_json::Error),

    /// The address is not in the leaf cache and no key path was supplied
    /// to re-derive it.
    #[error("address `{address}` is not cached and no key path was supplied")]
    NotFound {
        /// The address that could not be resolved.
        address: String,
    },

    /// Re-derivation produced a different address than the caller
    /// supplied.
    #[error("address mismatch: supplied `{supplied}`, derived `{derived}`")]
    AddressMismatch {
        /// The address the caller asked for.
        supplied: String,
        /// The address the supplied path actually derives.
        derived: String,
    },

    /// The operation is recognized but not implemented.
    #[error("operation `{operation}` is not supported")]
    Unsupported {
        /// The rejected operation.
        operation: &'static str,
    },

    /// Reading the vault file failed.
    #[error("failed to read vault file")]
    Load {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the vault file failed. The previous on-disk snapshot is
    /// still intact.
    #[error("failed to write vault file")]
    Persist {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The vault file exists but is not a well-formed base64 envelope, or
    /// a cached record has an impossible shape.
    #[error("vault file is malformed: {reason}")]
    InvalidVaultFile {
        /// What was wrong with the file.
        reason: &'static str,
    },
}

/// Convenience alias for `Result<T, keyvault_core::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
