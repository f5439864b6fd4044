//! # BIP39 - Mnemonic Code for Deterministic Keys
//!
//! Entropy/mnemonic/seed conversions following the BIP39 standard, together
//! with a process-wide wordlist registry covering eight languages.
//!
//! ## Overview
//!
//! A mnemonic encodes 128-256 bits of entropy as 12-24 words from a
//! 2048-word list, with a SHA-256 checksum folded into the word indices.
//! The mnemonic (plus an optional passphrase) stretches into a 64-byte seed
//! via PBKDF2-HMAC-SHA512, which in turn feeds BIP32 master key derivation.
//!
//! Word tables are taken from the upstream `bip39` crate and treated as
//! opaque data; all encoding, checksum and validation logic lives here.
//!
//! ## Quick Start
//!
//! ```rust
//! use keyvault_bip39::{entropy_from_mnemonic, new_entropy, new_mnemonic, new_seed};
//!
//! let entropy = new_entropy(128)?;
//! let mnemonic = new_mnemonic(&entropy)?;
//!
//! // The mnemonic round-trips to the entropy that produced it.
//! assert_eq!(entropy_from_mnemonic(&mnemonic)?, entropy);
//!
//! // And stretches into a 64-byte seed.
//! let seed = new_seed(&mnemonic, "");
//! assert_eq!(seed.as_bytes().len(), 64);
//! # Ok::<(), keyvault_bip39::Error>(())
//! ```

mod language;
mod mnemonic;
mod seed;

pub use language::{
    active_language, set_active_language, wordlist, Language, Wordlist, WORDLIST_SIZE,
};
pub use mnemonic::{
    entropy_from_mnemonic, entropy_from_mnemonic_in, is_valid_mnemonic, is_valid_mnemonic_in,
    new_entropy, new_mnemonic, new_mnemonic_in, VALID_WORD_COUNTS,
};
pub use seed::{new_seed, new_seed_checked, new_seed_checked_in, Seed, SEED_LENGTH};

/// Errors produced by the mnemonic codec.
///
/// Mnemonics and entropy are secret material; error values deliberately
/// carry no fragment of the offending input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Entropy is not 128, 160, 192, 224 or 256 bits.
    #[error("entropy length must be 128-256 bits and a multiple of 32, got {bits}")]
    EntropyLengthInvalid {
        /// The rejected bit length.
        bits: usize,
    },

    /// The mnemonic is malformed: wrong word count or a word that is not in
    /// the wordlist.
    #[error("invalid mnemonic: {reason}")]
    InvalidMnemonic {
        /// Why the mnemonic was rejected. Never contains mnemonic words.
        reason: &'static str,
    },

    /// The words decode, but the embedded checksum does not match the
    /// entropy they encode.
    #[error("mnemonic checksum incorrect")]
    ChecksumIncorrect,
}

/// Convenience alias for `Result<T, keyvault_bip39::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
