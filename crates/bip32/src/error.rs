//! Error types for BIP32 key derivation and serialization.

/// Errors produced by extended-key construction, derivation and
/// serialization.
///
/// Error values never carry key material; at most they name the child index
/// or byte length involved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The seed handed to master derivation is outside 16..=64 bytes.
    #[error("seed must be 16..=64 bytes, got {length}")]
    InvalidSeedLength {
        /// The rejected seed length.
        length: usize,
    },

    /// HMAC-SHA512("Bitcoin seed", seed) produced a left half that is zero
    /// or not below the secp256k1 group order. Astronomically unlikely for
    /// random seeds; surfaced rather than papered over.
    #[error("seed produces an invalid master key")]
    InvalidMasterKey,

    /// Child derivation at this index produced an out-of-range scalar or
    /// the point at infinity. The caller may retry with the next index.
    #[error("derivation at child index {index} produced an invalid key")]
    InvalidChildKey {
        /// The child index (hardened bit included) that failed.
        index: u32,
    },

    /// Hardened derivation was requested on an extended public key.
    /// Hardened children mix the parent *private* key into the HMAC and
    /// cannot be computed from public material.
    #[error("cannot derive a hardened child from an extended public key")]
    HardenedFromPublic,

    /// A private key was rejected (wrong length, zero, or not below the
    /// group order).
    #[error("invalid private key: {reason}")]
    InvalidPrivateKey {
        /// Why the key was rejected.
        reason: String,
    },

    /// A public key was rejected (wrong length or not a curve point).
    #[error("invalid public key: {reason}")]
    InvalidPublicKey {
        /// Why the key was rejected.
        reason: String,
    },

    /// A scalar addition during derivation overflowed the group order.
    #[error("key tweak overflowed the curve order")]
    KeyOverflow,

    /// A serialized extended key failed its base58check checksum.
    #[error("extended key checksum mismatch")]
    InvalidChecksum,

    /// A serialized extended key is not a valid base58 string.
    #[error("extended key is not valid base58")]
    InvalidBase58,

    /// A serialized extended key payload has the wrong length.
    #[error("extended key payload must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// The required payload length.
        expected: usize,
        /// The length actually seen.
        actual: usize,
    },

    /// The four version bytes of a serialized extended key are not one of
    /// the known mainnet/testnet private/public prefixes.
    #[error("unknown extended key version {0:#010x}")]
    UnknownVersion(u32),

    /// A private extended key was expected but the payload encodes a public
    /// one, or vice versa.
    #[error("extended key type mismatch: {reason}")]
    KeyTypeMismatch {
        /// Which mismatch was seen.
        reason: &'static str,
    },

    /// Serialized tree metadata is internally inconsistent, e.g. depth 0
    /// with a non-zero parent fingerprint or child number.
    #[error("inconsistent extended key metadata: {reason}")]
    InvalidMetadata {
        /// Which inconsistency was seen.
        reason: &'static str,
    },

    /// Derivation would exceed the maximum tree depth of 255.
    #[error("maximum derivation depth (255) exceeded")]
    DepthExceeded,

    /// A derivation path string could not be parsed.
    #[error("invalid derivation path: {reason}")]
    InvalidPath {
        /// Why the path was rejected.
        reason: String,
    },
}

/// Convenience alias for `Result<T, keyvault_bip32::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
