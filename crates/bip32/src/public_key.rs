//! Public key wrapper used by extended key derivation.

use ripemd::Ripemd160;
use secp256k1::{scalar::Scalar, PublicKey as Secp256k1PublicKey, SECP256K1};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// A 33-byte compressed secp256k1 public key.
///
/// # Examples
///
/// ```rust
/// use keyvault_bip32::{PrivateKey, PublicKey};
///
/// let private_key = PrivateKey::from_bytes(&[1u8; 32])?;
/// let public_key = PublicKey::from(private_key.public_key());
/// assert_eq!(public_key.to_bytes().len(), 33);
/// # Ok::<(), keyvault_bip32::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: Secp256k1PublicKey,
}

impl PublicKey {
    /// The length of a compressed public key in bytes.
    pub const LENGTH: usize = 33;

    /// Creates a `PublicKey` from its 33-byte compressed encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPublicKey`] if the bytes are not a valid
    /// compressed curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(Error::InvalidPublicKey {
                reason: format!("expected {} bytes, got {}", Self::LENGTH, bytes.len()),
            });
        }
        let inner = Secp256k1PublicKey::from_slice(bytes).map_err(|e| Error::InvalidPublicKey {
            reason: format!("not a valid curve point: {e}"),
        })?;
        Ok(PublicKey { inner })
    }

    /// Returns the compressed 33-byte encoding.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.inner.serialize()
    }

    /// Returns the uncompressed 65-byte SEC1 encoding (`0x04 ‖ x ‖ y`).
    pub fn to_bytes_uncompressed(&self) -> [u8; 65] {
        self.inner.serialize_uncompressed()
    }

    /// Returns the underlying secp256k1 public key.
    pub fn public_key(&self) -> &Secp256k1PublicKey {
        &self.inner
    }

    /// Computes the BIP32 key identifier, `RIPEMD160(SHA256(compressed))`.
    pub fn identifier(&self) -> [u8; 20] {
        let sha = Sha256::digest(self.inner.serialize());
        Ripemd160::digest(sha).into()
    }

    /// Computes the 4-byte fingerprint (the identifier's first bytes).
    pub fn fingerprint(&self) -> [u8; 4] {
        let identifier = self.identifier();
        [identifier[0], identifier[1], identifier[2], identifier[3]]
    }

    /// Adds `tweak·G` to this point: the public-key half of non-hardened
    /// child derivation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPublicKey`] if the tweak is not a 32-byte scalar
    ///   below the curve order
    /// - [`Error::KeyOverflow`] if the sum is the point at infinity
    pub fn tweak_add(&self, tweak: &[u8]) -> Result<Self> {
        let tweak: [u8; 32] = tweak.try_into().map_err(|_| Error::InvalidPublicKey {
            reason: format!("tweak must be 32 bytes, got {}", tweak.len()),
        })?;
        let scalar = Scalar::from_be_bytes(tweak).map_err(|_| Error::InvalidPublicKey {
            reason: "tweak is not below the curve order".to_string(),
        })?;
        let tweaked = self
            .inner
            .add_exp_tweak(SECP256K1, &scalar)
            .map_err(|_| Error::KeyOverflow)?;
        Ok(PublicKey { inner: tweaked })
    }
}

impl From<Secp256k1PublicKey> for PublicKey {
    fn from(inner: Secp256k1PublicKey) -> Self {
        PublicKey { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrivateKey;

    fn generator() -> PublicKey {
        let mut one = [0u8; 32];
        one[31] = 1;
        PrivateKey::from_bytes(&one).unwrap().public_key().into()
    }

    #[test]
    fn test_round_trip() {
        let public_key = generator();
        let decoded = PublicKey::from_bytes(&public_key.to_bytes()).unwrap();
        assert_eq!(decoded, public_key);
    }

    #[test]
    fn test_uncompressed_form() {
        let bytes = generator().to_bytes_uncompressed();
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[0], 0x04);
        assert_eq!(
            hex::encode(&bytes[1..33]),
            "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_from_bytes_rejects_bad_input() {
        assert!(PublicKey::from_bytes(&[0u8; 33]).is_err());
        assert!(PublicKey::from_bytes(&[2u8; 10]).is_err());
        // Uncompressed form is not accepted here.
        assert!(PublicKey::from_bytes(&generator().to_bytes_uncompressed()).is_err());
    }

    #[test]
    fn test_fingerprint_is_identifier_prefix() {
        let public_key = generator();
        let identifier = public_key.identifier();
        assert_eq!(public_key.fingerprint(), identifier[..4]);
    }

    #[test]
    fn test_tweak_add_matches_private_tweak() {
        // (k + t)·G == k·G + t·G for a couple of arbitrary values.
        let private_key = PrivateKey::from_bytes(&[3u8; 32]).unwrap();
        let tweak = [9u8; 32];

        let tweaked_private = private_key.tweak_add(&tweak).unwrap();
        let expected: PublicKey = tweaked_private.public_key().into();

        let tweaked_public = PublicKey::from(private_key.public_key())
            .tweak_add(&tweak)
            .unwrap();
        assert_eq!(tweaked_public, expected);
    }
}
