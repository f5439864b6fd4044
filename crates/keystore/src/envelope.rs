//! The version-3 envelope: scrypt KDF, AES-128-CTR cipher, keccak MAC.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use subtle::ConstantTimeEq;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::{Error, Result};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

const CIPHER_AES_128_CTR: &str = "aes-128-ctr";
const KDF_SCRYPT: &str = "scrypt";
const VERSION: u32 = 3;

const SALT_LENGTH: usize = 32;
const IV_LENGTH: usize = 16;
const DERIVED_KEY_LENGTH: u32 = 32;
const SCRYPT_R: u32 = 8;

/// Scrypt cost parameters for the envelope KDF.
///
/// `r` is fixed at 8 and the derived key length at 32 bytes; only the CPU
/// cost `n` and parallelism `p` vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    /// CPU/memory cost. Must be a power of two greater than one.
    pub n: u32,
    /// Parallelism.
    pub p: u32,
}

impl ScryptParams {
    /// Production strength: N = 2^18, p = 1. Roughly a second of key
    /// stretching on current hardware.
    pub const STANDARD: ScryptParams = ScryptParams { n: 1 << 18, p: 1 };

    /// Minimal cost preset for tests. Never use for real secrets.
    pub const LIGHT: ScryptParams = ScryptParams { n: 2, p: 1 };
}

/// The `cipherparams` JSON object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    /// Hex-encoded 16-byte AES-CTR initialization vector.
    pub iv: String,
}

/// The `kdfparams` JSON object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    /// Scrypt CPU/memory cost.
    pub n: u32,
    /// Scrypt block size.
    pub r: u32,
    /// Scrypt parallelism.
    pub p: u32,
    /// Derived key length in bytes.
    pub dklen: u32,
    /// Hex-encoded 32-byte salt.
    pub salt: String,
}

/// The `crypto` JSON object: everything needed to decrypt given the
/// password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoJson {
    /// Cipher name, always `aes-128-ctr`.
    pub cipher: String,
    /// Hex-encoded ciphertext, same length as the plaintext.
    pub ciphertext: String,
    /// Cipher parameters.
    pub cipherparams: CipherParams,
    /// KDF name, always `scrypt`.
    pub kdf: String,
    /// KDF parameters.
    pub kdfparams: KdfParams,
    /// Hex-encoded keccak-256 MAC over `dk[16..32] ‖ ciphertext`.
    pub mac: String,
}

/// A complete version-3 envelope.
///
/// `address` and `path` are optional plaintext metadata used when the
/// envelope is exported as a standalone keystore record; the vault's own
/// file omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedKey {
    /// Random UUID identifying this envelope (not derived from the key).
    pub id: String,
    /// Format version, always 3.
    pub version: u32,
    /// Optional display address of the wrapped key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Optional derivation path of the wrapped key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// The encrypted payload.
    pub crypto: CryptoJson,
}

impl EncryptedKey {
    /// Serializes the envelope to its JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an envelope from its JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Computes the keccak-256 hash of `data`.
///
/// Exposed because the vault derives per-leaf envelope passwords from a
/// keccak digest of the vault password and the leaf path.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn scrypt_key(password: &str, salt: &[u8], n: u32, p: u32) -> Result<Zeroizing<[u8; 32]>> {
    if !n.is_power_of_two() || n < 2 {
        return Err(Error::InvalidKdfParams {
            reason: format!("n must be a power of two > 1, got {n}"),
        });
    }
    let log_n = n.trailing_zeros() as u8;
    let params = scrypt::Params::new(log_n, SCRYPT_R, p, DERIVED_KEY_LENGTH as usize).map_err(
        |e| Error::InvalidKdfParams {
            reason: e.to_string(),
        },
    )?;

    let mut derived = Zeroizing::new([0u8; 32]);
    scrypt::scrypt(password.as_bytes(), salt, &params, derived.as_mut_slice()).map_err(|e| {
        Error::InvalidKdfParams {
            reason: e.to_string(),
        }
    })?;
    Ok(derived)
}

fn compute_mac(derived: &[u8; 32], ciphertext: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(&derived[16..32]);
    hasher.update(ciphertext);
    hasher.finalize().into()
}

/// Encrypts `plaintext` under `password`.
///
/// A fresh 32-byte salt and 16-byte IV are drawn from the OS RNG for every
/// call, so encrypting the same payload twice yields unrelated envelopes.
///
/// # Errors
///
/// Returns [`Error::InvalidKdfParams`] if `params` is unusable.
pub fn encrypt(plaintext: &[u8], password: &str, params: ScryptParams) -> Result<EncryptedKey> {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LENGTH];
    OsRng.fill_bytes(&mut iv);

    let derived = scrypt_key(password, &salt, params.n, params.p)?;

    let mut ciphertext = plaintext.to_vec();
    apply_ctr(&derived, &iv, &mut ciphertext);

    let mac = compute_mac(&derived, &ciphertext);

    Ok(EncryptedKey {
        id: Uuid::new_v4().to_string(),
        version: VERSION,
        address: None,
        path: None,
        crypto: CryptoJson {
            cipher: CIPHER_AES_128_CTR.to_string(),
            ciphertext: hex::encode(ciphertext),
            cipherparams: CipherParams {
                iv: hex::encode(iv),
            },
            kdf: KDF_SCRYPT.to_string(),
            kdfparams: KdfParams {
                n: params.n,
                r: SCRYPT_R,
                p: params.p,
                dklen: DERIVED_KEY_LENGTH,
                salt: hex::encode(salt),
            },
            mac: hex::encode(mac),
        },
    })
}

fn hex_field(value: &str, field: &'static str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|_| Error::MalformedField { field })
}

/// Verifies and decrypts an envelope.
///
/// The MAC is checked in constant time *before* any decryption happens; a
/// mismatch (wrong password, flipped ciphertext byte, truncated envelope)
/// fails with [`Error::InvalidPassword`] and nothing is decrypted.
///
/// The returned buffer zeroizes itself on drop.
///
/// # Errors
///
/// - [`Error::UnsupportedVersion`] / [`Error::UnsupportedCipher`] /
///   [`Error::UnsupportedKdf`] for foreign envelopes
/// - [`Error::MalformedField`] for undecodable hex fields
/// - [`Error::InvalidKdfParams`] for unusable scrypt parameters
/// - [`Error::InvalidPassword`] on MAC mismatch
pub fn decrypt(key: &EncryptedKey, password: &str) -> Result<Zeroizing<Vec<u8>>> {
    if key.version != VERSION {
        return Err(Error::UnsupportedVersion(key.version));
    }
    if key.crypto.cipher != CIPHER_AES_128_CTR {
        return Err(Error::UnsupportedCipher(key.crypto.cipher.clone()));
    }
    if key.crypto.kdf != KDF_SCRYPT {
        return Err(Error::UnsupportedKdf(key.crypto.kdf.clone()));
    }
    if key.crypto.kdfparams.dklen != DERIVED_KEY_LENGTH {
        return Err(Error::InvalidKdfParams {
            reason: format!("dklen must be 32, got {}", key.crypto.kdfparams.dklen),
        });
    }
    if key.crypto.kdfparams.r != SCRYPT_R {
        return Err(Error::InvalidKdfParams {
            reason: format!("r must be 8, got {}", key.crypto.kdfparams.r),
        });
    }

    let salt = hex_field(&key.crypto.kdfparams.salt, "kdfparams.salt")?;
    let iv = hex_field(&key.crypto.cipherparams.iv, "cipherparams.iv")?;
    if iv.len() != IV_LENGTH {
        return Err(Error::MalformedField {
            field: "cipherparams.iv",
        });
    }
    let mac = hex_field(&key.crypto.mac, "mac")?;
    let ciphertext = hex_field(&key.crypto.ciphertext, "ciphertext")?;

    let derived = scrypt_key(
        password,
        &salt,
        key.crypto.kdfparams.n,
        key.crypto.kdfparams.p,
    )?;

    let computed = compute_mac(&derived, &ciphertext);
    if !bool::from(computed.as_slice().ct_eq(mac.as_slice())) {
        return Err(Error::InvalidPassword);
    }

    let mut iv_bytes = [0u8; IV_LENGTH];
    iv_bytes.copy_from_slice(&iv);

    let mut plaintext = Zeroizing::new(ciphertext);
    apply_ctr(&derived, &iv_bytes, &mut plaintext);
    Ok(plaintext)
}

/// Runs AES-128-CTR over `data` in place, keyed with the first half of the
/// derived key. CTR is symmetric, so this both encrypts and decrypts.
fn apply_ctr(derived: &[u8; 32], iv: &[u8; IV_LENGTH], data: &mut [u8]) {
    let mut key_half = Zeroizing::new([0u8; 16]);
    key_half.copy_from_slice(&derived[..16]);
    let mut cipher = Aes128Ctr::new((&*key_half).into(), iv.into());
    cipher.apply_keystream(data);
}
