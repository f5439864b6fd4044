//! Private key wrapper used by extended key derivation.

use secp256k1::{scalar::Scalar, PublicKey as Secp256k1PublicKey, SecretKey, SECP256K1};
use zeroize::Zeroize;

use crate::{Error, Result};

/// A 32-byte secp256k1 private key.
///
/// Private keys are scalar values on the secp256k1 curve: non-zero and
/// below the group order. Anyone holding a private key can spend funds and
/// derive every non-hardened descendant, so the type never appears in
/// `Debug` output and zeroizes its bytes on drop.
///
/// # Examples
///
/// ```rust
/// use keyvault_bip32::PrivateKey;
///
/// let private_key = PrivateKey::from_bytes(&[1u8; 32])?;
/// assert_eq!(private_key.to_bytes().len(), 32);
/// # Ok::<(), keyvault_bip32::Error>(())
/// ```
#[derive(Clone)]
pub struct PrivateKey {
    inner: SecretKey,
}

impl PrivateKey {
    /// The length of a private key in bytes.
    pub const LENGTH: usize = 32;

    /// Wraps an existing secp256k1 `SecretKey`.
    pub fn new(secret_key: SecretKey) -> Self {
        PrivateKey { inner: secret_key }
    }

    /// Creates a `PrivateKey` from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPrivateKey`] if the slice is not exactly 32
    /// bytes, or encodes zero or a value at or above the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(Error::InvalidPrivateKey {
                reason: format!("expected {} bytes, got {}", Self::LENGTH, bytes.len()),
            });
        }
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| Error::InvalidPrivateKey {
            reason: format!("not a valid secp256k1 scalar: {e}"),
        })?;
        Ok(PrivateKey { inner: secret_key })
    }

    /// Returns the private key as a 32-byte array.
    ///
    /// The returned bytes are secret key material; callers are responsible
    /// for wiping their copies.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.inner.secret_bytes()
    }

    /// Returns the underlying secp256k1 `SecretKey`.
    pub fn secret_key(&self) -> &SecretKey {
        &self.inner
    }

    /// Derives the corresponding public key.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey::from_secret_key(SECP256K1, &self.inner)
    }

    /// Adds a scalar to this key modulo the curve order: `(self + tweak)
    /// mod n`. This is the core step of child derivation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPrivateKey`] if the tweak is not a 32-byte scalar
    ///   below the curve order
    /// - [`Error::KeyOverflow`] if the sum is zero (the resulting key would
    ///   be invalid)
    pub fn tweak_add(&self, tweak: &[u8]) -> Result<Self> {
        let tweak: [u8; 32] = tweak.try_into().map_err(|_| Error::InvalidPrivateKey {
            reason: format!("tweak must be 32 bytes, got {}", tweak.len()),
        })?;
        let scalar = Scalar::from_be_bytes(tweak).map_err(|_| Error::InvalidPrivateKey {
            reason: "tweak is not below the curve order".to_string(),
        })?;
        let tweaked = self
            .inner
            .add_tweak(&scalar)
            .map_err(|_| Error::KeyOverflow)?;
        Ok(PrivateKey { inner: tweaked })
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner.secret_bytes() == other.inner.secret_bytes()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

impl From<SecretKey> for PrivateKey {
    fn from(secret_key: SecretKey) -> Self {
        PrivateKey::new(secret_key)
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        PrivateKey::from_bytes(bytes)
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        let mut bytes = self.inner.secret_bytes();
        bytes.zeroize();
    }
}
