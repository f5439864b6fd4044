//! Recoverable ECDSA over secp256k1, shared by the reference adapters.

use k256::ecdsa::{SigningKey, VerifyingKey};

use crate::{Error, Result, Signature};

/// Parses a 32-byte scalar into a signing key.
///
/// The guard runs before any signing: an empty slice, a wrong length, or
/// an out-of-range scalar is rejected up front.
fn signing_key(private_key: &[u8]) -> Result<SigningKey> {
    if private_key.is_empty() {
        return Err(Error::InvalidPrivateKey {
            reason: "private key is empty",
        });
    }
    if private_key.len() != 32 {
        return Err(Error::InvalidPrivateKey {
            reason: "private key must be 32 bytes",
        });
    }
    SigningKey::from_slice(private_key).map_err(|_| Error::InvalidPrivateKey {
        reason: "not a valid secp256k1 scalar",
    })
}

/// Returns the uncompressed (65-byte) or compressed (33-byte) SEC1 public
/// key for a private scalar.
pub(crate) fn public_key(private_key: &[u8], compressed: bool) -> Result<Vec<u8>> {
    let signing_key = signing_key(private_key)?;
    let verifying_key = VerifyingKey::from(&signing_key);
    Ok(verifying_key.to_encoded_point(compressed).as_bytes().to_vec())
}

/// Signs a 32-byte digest with RFC 6979 deterministic nonces.
///
/// The signature is low-S normalized; `v` is the recovery id (0 or 1) and
/// `pubkey` the signer's uncompressed SEC1 key.
pub(crate) fn sign_recoverable(private_key: &[u8], hash: &[u8]) -> Result<Signature> {
    if hash.len() != 32 {
        return Err(Error::InvalidDigest { length: hash.len() });
    }

    let signing_key = signing_key(private_key)?;
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(hash)
        .map_err(|_| Error::SigningFailed)?;

    let verifying_key = VerifyingKey::from(&signing_key);
    Ok(Signature {
        sign_bytes: signature.to_bytes().to_vec(),
        v: recovery_id.to_byte(),
        pubkey: verifying_key.to_encoded_point(false).as_bytes().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_one() -> [u8; 32] {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    }

    #[test]
    fn test_public_key_of_one_is_generator() {
        let uncompressed = public_key(&key_one(), false).unwrap();
        assert_eq!(
            hex::encode(uncompressed),
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
        let compressed = public_key(&key_one(), true).unwrap();
        assert_eq!(
            hex::encode(compressed),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_sign_shape() {
        let signature = sign_recoverable(&key_one(), &[7u8; 32]).unwrap();
        assert_eq!(signature.sign_bytes.len(), 64);
        assert!(signature.v <= 1);
        assert_eq!(signature.pubkey.len(), 65);
        assert_eq!(signature.pubkey[0], 0x04);
    }

    #[test]
    fn test_sign_deterministic() {
        // RFC 6979 nonces: identical inputs, identical signatures.
        let a = sign_recoverable(&key_one(), &[7u8; 32]).unwrap();
        let b = sign_recoverable(&key_one(), &[7u8; 32]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_rejects_bad_inputs() {
        assert!(matches!(
            sign_recoverable(&[], &[7u8; 32]),
            Err(Error::InvalidPrivateKey { .. })
        ));
        assert!(matches!(
            sign_recoverable(&[0u8; 32], &[7u8; 32]),
            Err(Error::InvalidPrivateKey { .. })
        ));
        assert!(matches!(
            sign_recoverable(&key_one(), &[7u8; 31]),
            Err(Error::InvalidDigest { length: 31 })
        ));
    }
}
