//! Extended private key: the private node of the BIP32 derivation tree.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::{
    ChainCode, ChildNumber, DerivationPath, Error, ExtendedPublicKey, KeyType, Network,
    PrivateKey, PublicKey, Result,
};

type HmacSha512 = Hmac<Sha512>;

/// HMAC key for master key generation, fixed by the BIP32 specification.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// An extended private key.
///
/// Combines a [`PrivateKey`] with the chain code and tree metadata needed
/// for hierarchical derivation. Extended private keys can derive both
/// normal and hardened children, and project to the matching
/// [`ExtendedPublicKey`].
///
/// # Serialization
///
/// The wire form is 78 bytes,
///
/// ```text
/// [4]  version            (0x0488ADE4 mainnet / 0x04358394 testnet)
/// [1]  depth              (0x00 for the master key)
/// [4]  parent fingerprint (0x00000000 for the master key)
/// [4]  child number       (big-endian, bit 31 = hardened)
/// [32] chain code
/// [33] key data           (0x00 ‖ 32-byte scalar)
/// ```
///
/// followed by a 4-byte double-SHA256 checksum and base58 encoding, giving
/// the familiar 111-character `xprv...` string.
///
/// # Examples
///
/// ```rust
/// use keyvault_bip32::{ChildNumber, ExtendedPrivateKey, Network};
///
/// let master = ExtendedPrivateKey::from_seed(&[1u8; 64], Network::Mainnet)?;
/// assert_eq!(master.depth(), 0);
///
/// let child = master.derive_child(ChildNumber::Hardened(44))?;
/// assert_eq!(child.depth(), 1);
///
/// // Round-trips through the base58 form.
/// let encoded = master.to_string();
/// assert!(encoded.starts_with("xprv"));
/// assert_eq!(encoded.parse::<ExtendedPrivateKey>()?, master);
/// # Ok::<(), keyvault_bip32::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedPrivateKey {
    network: Network,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
    chain_code: ChainCode,
    private_key: PrivateKey,
}

impl ExtendedPrivateKey {
    /// Length of the serialized payload, checksum excluded.
    pub const SERIALIZED_LENGTH: usize = 78;

    /// Creates an extended private key from its parts.
    pub fn new(
        network: Network,
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: ChildNumber,
        chain_code: ChainCode,
        private_key: PrivateKey,
    ) -> Self {
        ExtendedPrivateKey {
            network,
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            private_key,
        }
    }

    /// Derives the master key from a seed.
    ///
    /// Computes `HMAC-SHA512(key = "Bitcoin seed", msg = seed)`; the left
    /// half becomes the master scalar, the right half the chain code.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSeedLength`] if the seed is outside 16..=64 bytes
    /// - [`Error::InvalidMasterKey`] if the left half is zero or at/above
    ///   the curve order
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self> {
        if !(16..=64).contains(&seed.len()) {
            return Err(Error::InvalidSeedLength { length: seed.len() });
        }

        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY)
            .map_err(|_| Error::InvalidMasterKey)?;
        mac.update(seed);
        let mut i = Zeroizing::new([0u8; 64]);
        i.copy_from_slice(&mac.finalize().into_bytes());
        let (il, ir) = i.split_at(32);

        let private_key =
            PrivateKey::from_bytes(il).map_err(|_| Error::InvalidMasterKey)?;
        let chain_code = ChainCode::from_bytes(ir)?;

        Ok(ExtendedPrivateKey {
            network,
            depth: 0,
            parent_fingerprint: [0; 4],
            child_number: ChildNumber::Normal(0),
            chain_code,
            private_key,
        })
    }

    /// Returns the network this key serializes for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the depth in the derivation tree (0 for the master key).
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Returns the parent key's fingerprint ([0, 0, 0, 0] for the master).
    pub fn parent_fingerprint(&self) -> &[u8; 4] {
        &self.parent_fingerprint
    }

    /// Returns the index this key was derived at.
    pub fn child_number(&self) -> ChildNumber {
        self.child_number
    }

    /// Returns the chain code.
    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    /// Returns the private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Returns this key's own 4-byte fingerprint.
    pub fn fingerprint(&self) -> [u8; 4] {
        PublicKey::from(self.private_key.public_key()).fingerprint()
    }

    /// Projects to the corresponding extended public key.
    pub fn to_extended_public_key(&self) -> ExtendedPublicKey {
        ExtendedPublicKey::new(
            self.network,
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            self.chain_code,
            PublicKey::from(self.private_key.public_key()),
        )
    }

    /// Derives one child key (CKDpriv).
    ///
    /// Hardened indexes feed `0x00 ‖ parent scalar ‖ index` into the HMAC;
    /// normal indexes feed `parent compressed public key ‖ index`. The
    /// child scalar is `(I_L + parent) mod n`.
    ///
    /// # Errors
    ///
    /// - [`Error::DepthExceeded`] at depth 255
    /// - [`Error::InvalidChildKey`] if `I_L` is at/above the curve order or
    ///   the child scalar is zero; the caller may retry with the next index
    pub fn derive_child(&self, child_number: ChildNumber) -> Result<ExtendedPrivateKey> {
        if self.depth == u8::MAX {
            return Err(Error::DepthExceeded);
        }

        let index = child_number.to_u32();
        let parent_public = PublicKey::from(self.private_key.public_key());

        let mut mac = HmacSha512::new_from_slice(self.chain_code.as_bytes())
            .map_err(|_| Error::InvalidChildKey { index })?;
        if child_number.is_hardened() {
            let key_bytes = Zeroizing::new(self.private_key.to_bytes());
            mac.update(&[0x00]);
            mac.update(key_bytes.as_ref());
        } else {
            mac.update(&parent_public.to_bytes());
        }
        mac.update(&index.to_be_bytes());

        let mut i = Zeroizing::new([0u8; 64]);
        i.copy_from_slice(&mac.finalize().into_bytes());
        let (il, ir) = i.split_at(32);

        let private_key = self
            .private_key
            .tweak_add(il)
            .map_err(|_| Error::InvalidChildKey { index })?;
        let chain_code = ChainCode::from_bytes(ir)?;

        Ok(ExtendedPrivateKey {
            network: self.network,
            depth: self.depth + 1,
            parent_fingerprint: parent_public.fingerprint(),
            child_number,
            chain_code,
            private_key,
        })
    }

    /// Derives along a full path, one child at a time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvault_bip32::{DerivationPath, ExtendedPrivateKey, Network};
    /// use std::str::FromStr;
    ///
    /// let master = ExtendedPrivateKey::from_seed(&[1u8; 64], Network::Mainnet)?;
    /// let path = DerivationPath::from_str("m/44'/0'/0'/0/0")?;
    /// let leaf = master.derive_path(&path)?;
    /// assert_eq!(leaf.depth(), 5);
    /// # Ok::<(), keyvault_bip32::Error>(())
    /// ```
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedPrivateKey> {
        path.iter()
            .try_fold(self.clone(), |key, &child| key.derive_child(child))
    }

    /// Serializes to the 78-byte wire form (no checksum).
    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_LENGTH] {
        let mut out = [0u8; Self::SERIALIZED_LENGTH];
        out[0..4].copy_from_slice(&self.network.version(KeyType::Private).to_be_bytes());
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.child_number.to_u32().to_be_bytes());
        out[13..45].copy_from_slice(self.chain_code.as_bytes());
        out[45] = 0x00;
        out[46..78].copy_from_slice(&self.private_key.to_bytes());
        out
    }

    /// Deserializes from the 78-byte wire form.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLength`] on a payload that is not 78 bytes
    /// - [`Error::UnknownVersion`] on unrecognized version bytes
    /// - [`Error::KeyTypeMismatch`] if the version bytes belong to a public
    ///   key
    /// - [`Error::InvalidPrivateKey`] if the key data does not start with
    ///   0x00 or the scalar is out of range
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SERIALIZED_LENGTH {
            return Err(Error::InvalidLength {
                expected: Self::SERIALIZED_LENGTH,
                actual: bytes.len(),
            });
        }

        let version = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let (network, key_type) = Network::from_version(version)?;
        if key_type != KeyType::Private {
            return Err(Error::KeyTypeMismatch {
                reason: "version bytes encode a public key",
            });
        }

        if bytes[45] != 0x00 {
            return Err(Error::InvalidPrivateKey {
                reason: "private key data must start with a 0x00 pad byte".to_string(),
            });
        }

        let depth = bytes[4];
        let parent_fingerprint = [bytes[5], bytes[6], bytes[7], bytes[8]];
        let child_number = ChildNumber::from_u32(u32::from_be_bytes([
            bytes[9], bytes[10], bytes[11], bytes[12],
        ]));
        if depth == 0 && parent_fingerprint != [0; 4] {
            return Err(Error::InvalidMetadata {
                reason: "zero depth with non-zero parent fingerprint",
            });
        }
        if depth == 0 && child_number.to_u32() != 0 {
            return Err(Error::InvalidMetadata {
                reason: "zero depth with non-zero child number",
            });
        }
        let chain_code = ChainCode::from_bytes(&bytes[13..45])?;
        let private_key = PrivateKey::from_bytes(&bytes[46..78])?;

        Ok(ExtendedPrivateKey {
            network,
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            private_key,
        })
    }
}

impl fmt::Display for ExtendedPrivateKey {
    /// Formats as the base58check string (`xprv...`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = Zeroizing::new(self.to_bytes());
        let encoded = Zeroizing::new(bs58::encode(payload.as_ref()).with_check().into_string());
        f.write_str(&encoded)
    }
}

impl FromStr for ExtendedPrivateKey {
    type Err = Error;

    /// Parses a base58check extended private key string.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidChecksum`] on a checksum mismatch,
    /// [`Error::InvalidBase58`] on malformed base58, plus everything
    /// [`ExtendedPrivateKey::from_bytes`] rejects.
    fn from_str(s: &str) -> Result<Self> {
        let payload = Zeroizing::new(bs58::decode(s).with_check(None).into_vec().map_err(
            |e| match e {
                bs58::decode::Error::InvalidChecksum { .. } => Error::InvalidChecksum,
                _ => Error::InvalidBase58,
            },
        )?);
        Self::from_bytes(&payload)
    }
}

impl fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivateKey")
            .field("network", &self.network)
            .field("depth", &self.depth)
            .field("parent_fingerprint", &self.parent_fingerprint)
            .field("child_number", &self.child_number)
            .field("chain_code", &"[REDACTED]")
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> ExtendedPrivateKey {
        ExtendedPrivateKey::from_seed(&[1u8; 64], Network::Mainnet).unwrap()
    }

    #[test]
    fn test_from_seed_master_shape() {
        let key = master();
        assert_eq!(key.depth(), 0);
        assert_eq!(key.parent_fingerprint(), &[0, 0, 0, 0]);
        assert_eq!(key.child_number(), ChildNumber::Normal(0));
    }

    #[test]
    fn test_from_seed_length_bounds() {
        assert!(ExtendedPrivateKey::from_seed(&[0u8; 16], Network::Mainnet).is_ok());
        assert!(ExtendedPrivateKey::from_seed(&[0u8; 64], Network::Mainnet).is_ok());
        assert_eq!(
            ExtendedPrivateKey::from_seed(&[0u8; 15], Network::Mainnet),
            Err(Error::InvalidSeedLength { length: 15 })
        );
        assert_eq!(
            ExtendedPrivateKey::from_seed(&[0u8; 65], Network::Mainnet),
            Err(Error::InvalidSeedLength { length: 65 })
        );
    }

    #[test]
    fn test_from_seed_deterministic() {
        let a = ExtendedPrivateKey::from_seed(&[7u8; 32], Network::Mainnet).unwrap();
        let b = ExtendedPrivateKey::from_seed(&[7u8; 32], Network::Mainnet).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_child_metadata() {
        let parent = master();
        let child = parent.derive_child(ChildNumber::Hardened(0)).unwrap();
        assert_eq!(child.depth(), 1);
        assert_eq!(child.child_number(), ChildNumber::Hardened(0));
        assert_eq!(child.parent_fingerprint(), &parent.fingerprint());
        assert_ne!(child.private_key(), parent.private_key());
    }

    #[test]
    fn test_derive_child_deterministic() {
        let parent = master();
        let a = parent.derive_child(ChildNumber::Normal(7)).unwrap();
        let b = parent.derive_child(ChildNumber::Normal(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hardened_and_normal_children_differ() {
        let parent = master();
        let hardened = parent.derive_child(ChildNumber::Hardened(0)).unwrap();
        let normal = parent.derive_child(ChildNumber::Normal(0)).unwrap();
        assert_ne!(hardened, normal);
    }

    #[test]
    fn test_serialization_length_and_prefix() {
        let key = master();
        let bytes = key.to_bytes();
        assert_eq!(bytes.len(), 78);
        assert_eq!(bytes[45], 0x00);

        let encoded = key.to_string();
        assert_eq!(encoded.len(), 111);
        assert!(encoded.starts_with("xprv"));
    }

    #[test]
    fn test_testnet_prefix() {
        let key = ExtendedPrivateKey::from_seed(&[1u8; 64], Network::Testnet).unwrap();
        assert!(key.to_string().starts_with("tprv"));
    }

    #[test]
    fn test_round_trip_bytes() {
        let key = master().derive_child(ChildNumber::Hardened(9)).unwrap();
        let decoded = ExtendedPrivateKey::from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_round_trip_string() {
        let key = master();
        let encoded = key.to_string();
        let decoded: ExtendedPrivateKey = encoded.parse().unwrap();
        assert_eq!(decoded, key);
        // Serializing again yields the identical characters.
        assert_eq!(decoded.to_string(), encoded);
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let mut encoded = master().to_string();
        // Flip the final character to break the checksum.
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert_eq!(
            encoded.parse::<ExtendedPrivateKey>(),
            Err(Error::InvalidChecksum)
        );
    }

    #[test]
    fn test_non_base58_rejected() {
        assert_eq!(
            "not base58 0OIl".parse::<ExtendedPrivateKey>(),
            Err(Error::InvalidBase58)
        );
    }

    #[test]
    fn test_xpub_string_rejected() {
        let xpub = master().to_extended_public_key().to_string();
        assert!(matches!(
            xpub.parse::<ExtendedPrivateKey>(),
            Err(Error::KeyTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_pad_byte_rejected() {
        let mut bytes = master().to_bytes();
        bytes[45] = 0x01;
        assert!(matches!(
            ExtendedPrivateKey::from_bytes(&bytes),
            Err(Error::InvalidPrivateKey { .. })
        ));
    }

    #[test]
    fn test_public_projection_shares_metadata() {
        let key = master().derive_child(ChildNumber::Hardened(3)).unwrap();
        let public = key.to_extended_public_key();
        assert_eq!(public.depth(), key.depth());
        assert_eq!(public.chain_code(), key.chain_code());
        assert_eq!(public.child_number(), key.child_number());
        assert_eq!(public.fingerprint(), key.fingerprint());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", master());
        assert!(debug.contains("REDACTED"));
    }
}
