//! # BIP44 - Multi-Account Hierarchy for Deterministic Wallets
//!
//! Account coordinates and the derivation walk from a master key to a leaf,
//! following `m / purpose' / coin_type' / account' / change / address_index`
//! with one extension: purposes other than 44' insert a hardened
//! organization level between coin type and account,
//! `m / purpose' / coin_type' / org' / account' / change / address_index`.
//!
//! Coin type constants follow SLIP-0044.
//!
//! ## Quick Start
//!
//! ```rust
//! use keyvault_bip32::{ExtendedPrivateKey, Network};
//! use keyvault_bip44::{derive_account, harden, AccountPath, COIN_TYPE_ETH};
//!
//! let master = ExtendedPrivateKey::from_seed(&[1u8; 64], Network::Mainnet)?;
//!
//! let path = AccountPath::new(keyvault_bip44::PURPOSE, COIN_TYPE_ETH, None, harden(0), 0, 0)?;
//! assert_eq!(path.to_string(), "/44/60/0/0/0");
//!
//! let leaf = derive_account(&master, &path)?;
//! assert_eq!(leaf.depth(), 5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod path;

pub use path::AccountPath;

use keyvault_bip32::{ExtendedPrivateKey, Network};
use keyvault_bip39::new_seed_checked;

/// The hardened-index bit, 2^31.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// The standard BIP44 purpose, 44'.
pub const PURPOSE: u32 = 0x8000_002C;

/// The extended purpose that carries an organization level, 45'.
pub const PURPOSE_ORG: u32 = 0x8000_002D;

/// SLIP-0044 coin type for Bitcoin, 0'.
pub const COIN_TYPE_BTC: u32 = 0x8000_0000;

/// SLIP-0044 coin type for Ethereum, 60'.
pub const COIN_TYPE_ETH: u32 = 0x8000_003C;

/// Sets the hardened bit on an index.
///
/// Idempotent: hardening an already-hardened value is a no-op.
pub const fn harden(index: u32) -> u32 {
    index | HARDENED_OFFSET
}

/// Errors produced by path validation and account derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A coordinate violates the path scheme (hardening rules, org
    /// placement, segment count).
    #[error("invalid path parameter: {reason}")]
    InvalidPathParameter {
        /// Why the coordinates were rejected.
        reason: String,
    },

    /// Key derivation below the master failed.
    #[error(transparent)]
    Bip32(#[from] keyvault_bip32::Error),

    /// The mnemonic feeding [`derive_from_mnemonic`] was rejected.
    #[error(transparent)]
    Bip39(#[from] keyvault_bip39::Error),
}

/// Convenience alias for `Result<T, keyvault_bip44::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Derives the leaf key for `path`, one child step at a time.
///
/// The walk is an iterative fold over the path's child numbers; no
/// intermediate key is retained.
pub fn derive_account(
    master: &ExtendedPrivateKey,
    path: &AccountPath,
) -> Result<ExtendedPrivateKey> {
    let mut key = master.clone();
    for child in path.child_numbers() {
        key = key.derive_child(child)?;
    }
    Ok(key)
}

/// Validates `mnemonic`, stretches it into a seed with `passphrase`, and
/// derives the leaf key for `path`.
///
/// # Errors
///
/// Propagates mnemonic validation failures and any derivation error.
pub fn derive_from_mnemonic(
    mnemonic: &str,
    passphrase: &str,
    path: &AccountPath,
    network: Network,
) -> Result<ExtendedPrivateKey> {
    let seed = new_seed_checked(mnemonic, passphrase)?;
    let master = ExtendedPrivateKey::from_seed(seed.as_bytes(), network)?;
    derive_account(&master, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyvault_bip32::DerivationPath;
    use std::str::FromStr;

    const ABANDON_12: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn master() -> ExtendedPrivateKey {
        ExtendedPrivateKey::from_seed(&[1u8; 64], Network::Mainnet).unwrap()
    }

    #[test]
    fn test_harden() {
        assert_eq!(harden(0), 0x80000000);
        assert_eq!(harden(44), PURPOSE);
        assert_eq!(harden(PURPOSE), PURPOSE);
    }

    #[test]
    fn test_derive_account_matches_plain_bip32_walk() {
        let path = AccountPath::new(PURPOSE, COIN_TYPE_BTC, None, harden(0), 0, 0).unwrap();
        let via_account = derive_account(&master(), &path).unwrap();

        let plain = DerivationPath::from_str("m/44'/0'/0'/0/0").unwrap();
        let via_bip32 = master().derive_path(&plain).unwrap();

        assert_eq!(via_account, via_bip32);
    }

    #[test]
    fn test_derive_account_with_org_level() {
        let path =
            AccountPath::new(PURPOSE_ORG, COIN_TYPE_ETH, Some(harden(7)), harden(0), 0, 3).unwrap();
        let via_account = derive_account(&master(), &path).unwrap();

        let plain = DerivationPath::from_str("m/45'/60'/7'/0'/0/3").unwrap();
        let via_bip32 = master().derive_path(&plain).unwrap();

        assert_eq!(via_account, via_bip32);
        assert_eq!(via_account.depth(), 6);
    }

    #[test]
    fn test_derive_account_deterministic() {
        let path = AccountPath::new(PURPOSE, COIN_TYPE_ETH, None, harden(2), 1, 9).unwrap();
        let a = derive_account(&master(), &path).unwrap();
        let b = derive_account(&master(), &path).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_from_mnemonic() {
        let path = AccountPath::new(PURPOSE, COIN_TYPE_BTC, None, harden(0), 0, 0).unwrap();
        let leaf = derive_from_mnemonic(ABANDON_12, "", &path, Network::Mainnet).unwrap();
        assert_eq!(leaf.depth(), 5);

        // Same walk by hand.
        let seed = keyvault_bip39::new_seed(ABANDON_12, "");
        let master = ExtendedPrivateKey::from_seed(seed.as_bytes(), Network::Mainnet).unwrap();
        assert_eq!(leaf, derive_account(&master, &path).unwrap());
    }

    #[test]
    fn test_derive_from_mnemonic_rejects_invalid() {
        let path = AccountPath::new(PURPOSE, COIN_TYPE_BTC, None, harden(0), 0, 0).unwrap();
        let result = derive_from_mnemonic("twelve bogus words", "", &path, Network::Mainnet);
        assert!(matches!(result, Err(Error::Bip39(_))));
    }
}
