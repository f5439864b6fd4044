//! Entropy/mnemonic conversions.
//!
//! A mnemonic sentence encodes `ENT` bits of entropy plus a `CS = ENT/32`
//! bit checksum (the leading bits of `SHA-256(entropy)`), split into 11-bit
//! groups that index into the active wordlist.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::language::{active_language, wordlist, Language};
use crate::{Error, Result};

/// The word counts a valid mnemonic may have.
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

fn validate_entropy_bits(bits: usize) -> Result<()> {
    if bits % 32 != 0 || !(128..=256).contains(&bits) {
        return Err(Error::EntropyLengthInvalid { bits });
    }
    Ok(())
}

/// Fills `bits/8` bytes of fresh entropy from the operating system RNG.
///
/// `bits` must be a multiple of 32 in the inclusive range 128..=256.
///
/// # Errors
///
/// Returns [`Error::EntropyLengthInvalid`] for any other bit count.
///
/// # Examples
///
/// ```rust
/// let entropy = keyvault_bip39::new_entropy(256)?;
/// assert_eq!(entropy.len(), 32);
///
/// assert!(keyvault_bip39::new_entropy(100).is_err());
/// # Ok::<(), keyvault_bip39::Error>(())
/// ```
pub fn new_entropy(bits: usize) -> Result<Vec<u8>> {
    validate_entropy_bits(bits)?;
    let mut entropy = vec![0u8; bits / 8];
    OsRng.fill_bytes(&mut entropy);
    Ok(entropy)
}

/// Encodes entropy as a mnemonic in the active language.
///
/// See [`new_mnemonic_in`] for the language-explicit variant.
pub fn new_mnemonic(entropy: &[u8]) -> Result<String> {
    new_mnemonic_in(entropy, active_language())
}

/// Encodes entropy as a mnemonic sentence in `language`.
///
/// The checksum bits are appended to the entropy, the concatenation is cut
/// into 11-bit groups, and each group selects one word. Words are joined by
/// a single ASCII space.
///
/// # Errors
///
/// Returns [`Error::EntropyLengthInvalid`] if the entropy is not 16, 20,
/// 24, 28 or 32 bytes.
///
/// # Examples
///
/// ```rust
/// use keyvault_bip39::{new_mnemonic_in, Language};
///
/// let mnemonic = new_mnemonic_in(&[0u8; 16], Language::English)?;
/// assert_eq!(
///     mnemonic,
///     "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
/// );
/// # Ok::<(), keyvault_bip39::Error>(())
/// ```
pub fn new_mnemonic_in(entropy: &[u8], language: Language) -> Result<String> {
    validate_entropy_bits(entropy.len() * 8)?;

    let checksum_bits = entropy.len() / 4;
    let hash = Sha256::digest(entropy);

    let mut bits = Vec::with_capacity(entropy.len() * 8 + checksum_bits);
    for byte in entropy {
        for shift in (0..8).rev() {
            bits.push(byte >> shift & 1 == 1);
        }
    }
    for i in 0..checksum_bits {
        bits.push(hash[i / 8] >> (7 - i % 8) & 1 == 1);
    }

    let list = wordlist(language);
    let words: Vec<&str> = bits
        .chunks(11)
        .map(|chunk| {
            let index = chunk.iter().fold(0u16, |acc, &bit| acc << 1 | bit as u16);
            list.word(index)
        })
        .collect();

    Ok(words.join(" "))
}

/// Decodes a mnemonic back to its entropy, using the active language.
///
/// See [`entropy_from_mnemonic_in`].
pub fn entropy_from_mnemonic(mnemonic: &str) -> Result<Vec<u8>> {
    entropy_from_mnemonic_in(mnemonic, active_language())
}

/// Decodes a mnemonic back to the entropy that produced it.
///
/// The sentence is split on whitespace (one or more characters), every word
/// is resolved through the reverse index, and the embedded checksum is
/// recomputed and compared bit-exactly.
///
/// # Errors
///
/// - [`Error::InvalidMnemonic`] on a word count outside
///   {12, 15, 18, 21, 24} or a word missing from the wordlist
/// - [`Error::ChecksumIncorrect`] if the checksum bits do not match
///
/// # Examples
///
/// ```rust
/// use keyvault_bip39::{entropy_from_mnemonic_in, Language};
///
/// let mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
/// assert_eq!(entropy_from_mnemonic_in(mnemonic, Language::English)?, vec![0u8; 16]);
/// # Ok::<(), keyvault_bip39::Error>(())
/// ```
pub fn entropy_from_mnemonic_in(mnemonic: &str, language: Language) -> Result<Vec<u8>> {
    let words: Vec<&str> = mnemonic.split_whitespace().collect();
    if !VALID_WORD_COUNTS.contains(&words.len()) {
        return Err(Error::InvalidMnemonic {
            reason: "word count must be 12, 15, 18, 21 or 24",
        });
    }

    let list = wordlist(language);
    let mut bits = Vec::with_capacity(words.len() * 11);
    for word in &words {
        let index = list.index_of(word).ok_or(Error::InvalidMnemonic {
            reason: "word is not in the wordlist",
        })?;
        for shift in (0..11).rev() {
            bits.push(index >> shift & 1 == 1);
        }
    }

    let checksum_bits = words.len() / 3;
    let entropy_bits = bits.len() - checksum_bits;

    let mut entropy = vec![0u8; entropy_bits / 8];
    for (i, &bit) in bits[..entropy_bits].iter().enumerate() {
        if bit {
            entropy[i / 8] |= 1 << (7 - i % 8);
        }
    }

    let hash = Sha256::digest(&entropy);
    for i in 0..checksum_bits {
        let expected = hash[i / 8] >> (7 - i % 8) & 1 == 1;
        if bits[entropy_bits + i] != expected {
            return Err(Error::ChecksumIncorrect);
        }
    }

    Ok(entropy)
}

/// Reports whether `mnemonic` is well-formed under the active language.
pub fn is_valid_mnemonic(mnemonic: &str) -> bool {
    is_valid_mnemonic_in(mnemonic, active_language())
}

/// Reports whether `mnemonic` has a valid word count and only known words.
///
/// This is the cheap structural check: it does not verify the checksum and
/// never fails. Use [`entropy_from_mnemonic_in`] for full validation.
pub fn is_valid_mnemonic_in(mnemonic: &str, language: Language) -> bool {
    let words: Vec<&str> = mnemonic.split_whitespace().collect();
    if !VALID_WORD_COUNTS.contains(&words.len()) {
        return false;
    }
    let list = wordlist(language);
    words.iter().all(|word| list.index_of(word).is_some())
}
