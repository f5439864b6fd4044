//! The signature record and its packing views.

use serde::{Deserialize, Serialize};

/// An ECDSA signature with its recovery byte and signer public key.
///
/// Different transaction encoders want the recovery byte in different
/// places, so the record keeps the parts separate and offers three packed
/// views: [`v_none`](Signature::v_none) (64 bytes, `r ‖ s`),
/// [`v_left`](Signature::v_left) (65 bytes, `v ‖ r ‖ s`) and
/// [`v_right`](Signature::v_right) (65 bytes, `r ‖ s ‖ v`).
///
/// Adapters that cannot produce a recovery byte set `v` to 0; clients of
/// such chains verify against the `pubkey` field instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// The 64-byte `r ‖ s` signature data.
    #[serde(rename = "signBytes")]
    pub sign_bytes: Vec<u8>,
    /// The recovery byte.
    pub v: u8,
    /// The signer's public key in the adapter's canonical serialization.
    pub pubkey: Vec<u8>,
}

impl Signature {
    /// The bare signature data, no recovery byte.
    pub fn v_none(&self) -> Vec<u8> {
        self.sign_bytes.clone()
    }

    /// The recovery byte followed by the signature data.
    pub fn v_left(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.sign_bytes.len() + 1);
        out.push(self.v);
        out.extend_from_slice(&self.sign_bytes);
        out
    }

    /// The signature data followed by the recovery byte. This is the
    /// Ethereum `r ‖ s ‖ v` wire layout.
    pub fn v_right(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.sign_bytes.len() + 1);
        out.extend_from_slice(&self.sign_bytes);
        out.push(self.v);
        out
    }

    /// The signature data followed by the signer public key, for verifiers
    /// without recovery support.
    pub fn with_pubkey(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.sign_bytes.len() + self.pubkey.len());
        out.extend_from_slice(&self.sign_bytes);
        out.extend_from_slice(&self.pubkey);
        out
    }
}
