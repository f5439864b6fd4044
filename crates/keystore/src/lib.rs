//! # Keystore - Password Envelope for Secrets at Rest
//!
//! Symmetric, password-based encryption of arbitrary byte blobs in the
//! version-3 keystore format: scrypt stretches the password into a 32-byte
//! key, AES-128-CTR encrypts under the first half, and a keccak-256 MAC
//! over the second half plus the ciphertext authenticates the result. The
//! whole envelope serializes to a small JSON document.
//!
//! The vault uses this envelope twice: once around the wallet file itself
//! and once around each cached leaf key.
//!
//! ## Quick Start
//!
//! ```rust
//! use keyvault_keystore::{decrypt, encrypt, ScryptParams};
//!
//! let envelope = encrypt(b"secret bytes", "correct horse", ScryptParams::LIGHT)?;
//! let plaintext = decrypt(&envelope, "correct horse")?;
//! assert_eq!(&*plaintext, b"secret bytes");
//!
//! assert!(decrypt(&envelope, "wrong").is_err());
//! # Ok::<(), keyvault_keystore::Error>(())
//! ```

mod envelope;

pub use envelope::{
    decrypt, encrypt, keccak256, CipherParams, CryptoJson, EncryptedKey, KdfParams, ScryptParams,
};

/// Errors produced by envelope encryption and decryption.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The MAC did not verify: wrong password or tampered ciphertext.
    #[error("could not decrypt: password mismatch or corrupted data")]
    InvalidPassword,

    /// The envelope's `version` field is not the supported version 3.
    #[error("unsupported keystore version {0}")]
    UnsupportedVersion(u32),

    /// The envelope names a cipher other than aes-128-ctr.
    #[error("unsupported cipher `{0}`")]
    UnsupportedCipher(String),

    /// The envelope names a KDF other than scrypt.
    #[error("unsupported kdf `{0}`")]
    UnsupportedKdf(String),

    /// The scrypt parameters are unusable (n not a power of two, zero
    /// parallelism, wrong derived-key length).
    #[error("invalid kdf parameters: {reason}")]
    InvalidKdfParams {
        /// Why the parameters were rejected.
        reason: String,
    },

    /// A hex field (ciphertext, salt, iv, mac) failed to decode or has the
    /// wrong length.
    #[error("malformed envelope field `{field}`")]
    MalformedField {
        /// The JSON field at fault.
        field: &'static str,
    },

    /// The envelope JSON could not be serialized or parsed.
    #[error("keystore json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, keyvault_keystore::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
