//! Extended public key: the watch-only node of the BIP32 derivation tree.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::{ChainCode, ChildNumber, Error, KeyType, Network, PublicKey, Result};

type HmacSha512 = Hmac<Sha512>;

/// An extended public key.
///
/// Pairs a compressed public key with the chain code and tree metadata of
/// its private counterpart. Extended public keys derive **normal** children
/// only; hardened derivation mixes the parent private key into the HMAC and
/// is structurally impossible from public material, so requesting it fails
/// with [`Error::HardenedFromPublic`].
///
/// The serialized form mirrors [`crate::ExtendedPrivateKey`], with the
/// public version bytes and the 33-byte compressed point as key data,
/// yielding `xpub...`/`tpub...` strings.
///
/// # Examples
///
/// ```rust
/// use keyvault_bip32::{ChildNumber, Error, ExtendedPrivateKey, Network};
///
/// let master = ExtendedPrivateKey::from_seed(&[1u8; 64], Network::Mainnet)?;
/// let watch_only = master.to_extended_public_key();
///
/// // Normal derivation matches the private side.
/// let child_pub = watch_only.derive_child(ChildNumber::Normal(0))?;
/// let child_prv = master.derive_child(ChildNumber::Normal(0))?;
/// assert_eq!(child_pub, child_prv.to_extended_public_key());
///
/// // Hardened derivation is rejected.
/// assert_eq!(
///     watch_only.derive_child(ChildNumber::Hardened(0)),
///     Err(Error::HardenedFromPublic)
/// );
/// # Ok::<(), keyvault_bip32::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    network: Network,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
    chain_code: ChainCode,
    public_key: PublicKey,
}

impl ExtendedPublicKey {
    /// Length of the serialized payload, checksum excluded.
    pub const SERIALIZED_LENGTH: usize = 78;

    /// Creates an extended public key from its parts.
    pub fn new(
        network: Network,
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: ChildNumber,
        chain_code: ChainCode,
        public_key: PublicKey,
    ) -> Self {
        ExtendedPublicKey {
            network,
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            public_key,
        }
    }

    /// Returns the network this key serializes for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the depth in the derivation tree.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Returns the parent key's fingerprint.
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

    /// Returns the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns this key's own 4-byte fingerprint.
    pub fn fingerprint(&self) -> [u8; 4] {
        self.public_key.fingerprint()
    }

    /// Derives one normal child key (CKDpub).
    ///
    /// # Errors
    ///
    /// - [`Error::HardenedFromPublic`] for hardened indexes
    /// - [`Error::DepthExceeded`] at depth 255
    /// - [`Error::InvalidChildKey`] if `I_L` is at/above the curve order or
    ///   the child point is at infinity
    pub fn derive_child(&self, child_number: ChildNumber) -> Result<ExtendedPublicKey> {
        if child_number.is_hardened() {
            return Err(Error::HardenedFromPublic);
        }
        if self.depth == u8::MAX {
            return Err(Error::DepthExceeded);
        }

        let index = child_number.to_u32();
        let mut mac = HmacSha512::new_from_slice(self.chain_code.as_bytes())
            .map_err(|_| Error::InvalidChildKey { index })?;
        mac.update(&self.public_key.to_bytes());
        mac.update(&index.to_be_bytes());

        let i = mac.finalize().into_bytes();
        let (il, ir) = i.split_at(32);

        let public_key = self
            .public_key
            .tweak_add(il)
            .map_err(|_| Error::InvalidChildKey { index })?;
        let chain_code = ChainCode::from_bytes(ir)?;

        Ok(ExtendedPublicKey {
            network: self.network,
            depth: self.depth + 1,
            parent_fingerprint: self.public_key.fingerprint(),
            child_number,
            chain_code,
            public_key,
        })
    }

    /// Serializes to the 78-byte wire form (no checksum).
    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_LENGTH] {
        let mut out = [0u8; Self::SERIALIZED_LENGTH];
        out[0..4].copy_from_slice(&self.network.version(KeyType::Public).to_be_bytes());
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.child_number.to_u32().to_be_bytes());
        out[13..45].copy_from_slice(self.chain_code.as_bytes());
        out[45..78].copy_from_slice(&self.public_key.to_bytes());
        out
    }

    /// Deserializes from the 78-byte wire form.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLength`] on a payload that is not 78 bytes
    /// - [`Error::UnknownVersion`] on unrecognized version bytes
    /// - [`Error::KeyTypeMismatch`] if the version bytes belong to a
    ///   private key
    /// - [`Error::InvalidPublicKey`] if the key data is not a compressed
    ///   curve point
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SERIALIZED_LENGTH {
            return Err(Error::InvalidLength {
                expected: Self::SERIALIZED_LENGTH,
                actual: bytes.len(),
            });
        }

        let version = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let (network, key_type) = Network::from_version(version)?;
        if key_type != KeyType::Public {
            return Err(Error::KeyTypeMismatch {
                reason: "version bytes encode a private key",
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
        let public_key = PublicKey::from_bytes(&bytes[45..78])?;

        Ok(ExtendedPublicKey {
            network,
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            public_key,
        })
    }
}

impl fmt::Display for ExtendedPublicKey {
    /// Formats as the base58check string (`xpub...`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.to_bytes()).with_check().into_string())
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let payload = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|e| match e {
                bs58::decode::Error::InvalidChecksum { .. } => Error::InvalidChecksum,
                _ => Error::InvalidBase58,
            })?;
        Self::from_bytes(&payload)
    }
}
