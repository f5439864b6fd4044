//! Mnemonic to seed stretching.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::language::{active_language, Language};
use crate::mnemonic::entropy_from_mnemonic_in;
use crate::Result;

/// Length of a BIP39 seed in bytes.
pub const SEED_LENGTH: usize = 64;

const PBKDF2_ROUNDS: u32 = 2048;

/// A 64-byte wallet seed.
///
/// Seeds are secret key material: the master extended key is derived
/// directly from them. The buffer is zeroed when the value is dropped and
/// the `Debug` representation is redacted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LENGTH]);

impl Seed {
    /// Returns the seed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seed([REDACTED])")
    }
}

/// Stretches a mnemonic and passphrase into a 64-byte seed.
///
/// The seed is `PBKDF2-HMAC-SHA512(password = mnemonic, salt = "mnemonic" ‖
/// passphrase, rounds = 2048, dkLen = 64)`. The mnemonic is **not**
/// validated; any string produces a seed. Use [`new_seed_checked`] when the
/// input must be a well-formed mnemonic.
///
/// # Examples
///
/// ```rust
/// let seed = keyvault_bip39::new_seed("any words at all", "");
/// assert_eq!(seed.as_bytes().len(), 64);
/// ```
pub fn new_seed(mnemonic: &str, passphrase: &str) -> Seed {
    let salt = Zeroizing::new(format!("mnemonic{passphrase}"));
    let mut seed = [0u8; SEED_LENGTH];
    pbkdf2_hmac::<Sha512>(
        mnemonic.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut seed,
    );
    Seed(seed)
}

/// Like [`new_seed`], but first validates the mnemonic (including its
/// checksum) against the active wordlist.
pub fn new_seed_checked(mnemonic: &str, passphrase: &str) -> Result<Seed> {
    new_seed_checked_in(mnemonic, passphrase, active_language())
}

/// Like [`new_seed`], but first validates the mnemonic against `language`.
///
/// # Errors
///
/// Propagates [`crate::Error::InvalidMnemonic`] and
/// [`crate::Error::ChecksumIncorrect`] from full mnemonic validation.
pub fn new_seed_checked_in(mnemonic: &str, passphrase: &str, language: Language) -> Result<Seed> {
    let mut entropy = entropy_from_mnemonic_in(mnemonic, language)?;
    entropy.zeroize();
    Ok(new_seed(mnemonic, passphrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const ABANDON_12: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_seed_length_and_determinism() {
        let a = new_seed(ABANDON_12, "");
        let b = new_seed(ABANDON_12, "");
        assert_eq!(a.as_bytes().len(), SEED_LENGTH);
        assert_eq!(a, b);
    }

    #[test]
    fn test_abandon_vector_empty_passphrase() {
        let seed = new_seed(ABANDON_12, "");
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_abandon_vector_trezor_passphrase() {
        // Reference vector with the "TREZOR" passphrase.
        let seed = new_seed(ABANDON_12, "TREZOR");
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e5349553\
             1f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn test_passphrase_changes_seed() {
        assert_ne!(new_seed(ABANDON_12, ""), new_seed(ABANDON_12, "pw"));
    }

    #[test]
    fn test_new_seed_does_not_validate() {
        // Arbitrary strings are accepted; validation is the checked
        // variant's job.
        let seed = new_seed("definitely not a mnemonic", "");
        assert_eq!(seed.as_bytes().len(), SEED_LENGTH);
    }

    #[test]
    fn test_new_seed_checked_accepts_valid() {
        let checked = new_seed_checked_in(ABANDON_12, "", crate::Language::English).unwrap();
        assert_eq!(checked, new_seed(ABANDON_12, ""));
    }

    #[test]
    fn test_new_seed_checked_rejects_invalid() {
        let result = new_seed_checked_in("not a mnemonic", "", crate::Language::English);
        assert!(matches!(result, Err(Error::InvalidMnemonic { .. })));

        let bad_checksum = ABANDON_12.replace("about", "abandon");
        let result = new_seed_checked_in(&bad_checksum, "", crate::Language::English);
        assert_eq!(result, Err(Error::ChecksumIncorrect));
    }

    #[test]
    fn test_seed_debug_redacted() {
        let seed = new_seed(ABANDON_12, "");
        assert_eq!(format!("{seed:?}"), "Seed([REDACTED])");
    }
}
