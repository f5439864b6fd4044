//! Network and version-byte handling for extended key serialization.

use crate::{Error, Result};

/// Whether an extended key carries private or public material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Extended private key (`xprv...` / `tprv...`).
    Private,
    /// Extended public key (`xpub...` / `tpub...`).
    Public,
}

/// The network an extended key belongs to.
///
/// Together with [`KeyType`], the network selects the four version bytes
/// that lead a serialized extended key and give the familiar `xprv`/`xpub`
/// (mainnet) and `tprv`/`tpub` (testnet) prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// Bitcoin mainnet (0x0488ADE4 / 0x0488B21E).
    Mainnet,
    /// Bitcoin testnet (0x04358394 / 0x043587CF).
    Testnet,
}

const MAINNET_PRIVATE: u32 = 0x0488ADE4;
const MAINNET_PUBLIC: u32 = 0x0488B21E;
const TESTNET_PRIVATE: u32 = 0x04358394;
const TESTNET_PUBLIC: u32 = 0x043587CF;

impl Network {
    /// Returns the serialization version bytes for this network and key
    /// type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvault_bip32::{KeyType, Network};
    ///
    /// assert_eq!(Network::Mainnet.version(KeyType::Private), 0x0488ADE4);
    /// assert_eq!(Network::Testnet.version(KeyType::Public), 0x043587CF);
    /// ```
    pub fn version(&self, key_type: KeyType) -> u32 {
        match (self, key_type) {
            (Network::Mainnet, KeyType::Private) => MAINNET_PRIVATE,
            (Network::Mainnet, KeyType::Public) => MAINNET_PUBLIC,
            (Network::Testnet, KeyType::Private) => TESTNET_PRIVATE,
            (Network::Testnet, KeyType::Public) => TESTNET_PUBLIC,
        }
    }

    /// Resolves four version bytes back to a network and key type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVersion`] for anything that is not one of
    /// the four known prefixes.
    pub fn from_version(version: u32) -> Result<(Network, KeyType)> {
        match version {
            MAINNET_PRIVATE => Ok((Network::Mainnet, KeyType::Private)),
            MAINNET_PUBLIC => Ok((Network::Mainnet, KeyType::Public)),
            TESTNET_PRIVATE => Ok((Network::Testnet, KeyType::Private)),
            TESTNET_PUBLIC => Ok((Network::Testnet, KeyType::Public)),
            other => Err(Error::UnknownVersion(other)),
        }
    }
}
