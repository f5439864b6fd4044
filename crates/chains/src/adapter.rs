//! The adapter contract the vault consumes.

use crate::{Result, Signature};

/// Static description of a target chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    /// Short chain name ("ETH", "BTC").
    pub name: &'static str,
    /// SLIP-0044 coin type, hardened bit included.
    pub coin_type: u32,
    /// The signature curve the chain uses.
    pub curve: &'static str,
}

/// Chain description for Ethereum-style targets.
pub const CHAIN_INFO_ETH: ChainInfo = ChainInfo {
    name: "ETH",
    coin_type: 0x8000_003C,
    curve: "secp256k1",
};

/// Chain description for Bitcoin.
pub const CHAIN_INFO_BTC: ChainInfo = ChainInfo {
    name: "BTC",
    coin_type: 0x8000_0000,
    curve: "secp256k1",
};

/// Everything the vault needs from a target chain.
///
/// Implementations are stateless value objects: the vault borrows an
/// adapter for one call at a time, and adapters must not retain the key
/// material passed to them.
pub trait ChainAdapter {
    /// Returns the static chain description.
    fn chain_info(&self) -> &ChainInfo;

    /// Converts a 32-byte private scalar to the chain's canonical public
    /// key serialization (uncompressed SEC1 for secp256k1 chains).
    fn public_key(&self, private_key: &[u8]) -> Result<Vec<u8>>;

    /// Converts a canonical public key to the chain's display address.
    fn address(&self, public_key: &[u8]) -> Result<String>;

    /// Exports a private key in the chain's conventional text form (hex
    /// for Ethereum, WIF for Bitcoin). `compress_public` selects the
    /// compressed-public-key flavor where the format distinguishes one.
    fn export_private_key(&self, private_key: &[u8], compress_public: bool) -> Result<String>;

    /// Signs a 32-byte digest, returning the signature with its recovery
    /// byte and the signer public key.
    fn sign(&self, private_key: &[u8], hash: &[u8]) -> Result<Signature>;
}
