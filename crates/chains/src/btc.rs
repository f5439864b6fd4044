//! Bitcoin chain adapter: addresses, WIF export and digest signing.
//!
//! Transaction assembly and script signing are deliberately not here; this
//! adapter covers the key-management surface only.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::adapter::{ChainAdapter, ChainInfo, CHAIN_INFO_BTC};
use crate::{secp, Error, NetworkKind, Result, Signature};

/// P2PKH address version byte, mainnet.
const ADDRESS_VERSION_MAINNET: u8 = 0x00;
/// P2PKH address version byte, testnet (and devnet).
const ADDRESS_VERSION_TESTNET: u8 = 0x6f;
/// WIF prefix, mainnet.
const WIF_PREFIX_MAINNET: u8 = 0x80;
/// WIF prefix, testnet (and devnet).
const WIF_PREFIX_TESTNET: u8 = 0xef;
/// WIF suffix marking a compressed public key.
const WIF_COMPRESS_MAGIC: u8 = 0x01;

/// Adapter for Bitcoin.
///
/// - Canonical public key: uncompressed 65-byte SEC1.
/// - Address: base58check over `version ‖ RIPEMD160(SHA256(pubkey))`.
/// - Private key export: WIF, with the optional compression suffix.
/// - Signature: the same recoverable ECDSA shape as the eth adapter.
#[derive(Debug, Clone, Copy)]
pub struct BtcAdapter {
    network: NetworkKind,
    info: ChainInfo,
    address_version: u8,
    wif_prefix: u8,
}

impl BtcAdapter {
    /// Creates an adapter for `network`. Devnet uses testnet parameters.
    pub fn new(network: NetworkKind) -> Self {
        let (address_version, wif_prefix) = match network {
            NetworkKind::Mainnet => (ADDRESS_VERSION_MAINNET, WIF_PREFIX_MAINNET),
            NetworkKind::Testnet | NetworkKind::Devnet => {
                (ADDRESS_VERSION_TESTNET, WIF_PREFIX_TESTNET)
            }
        };
        BtcAdapter {
            network,
            info: CHAIN_INFO_BTC,
            address_version,
            wif_prefix,
        }
    }

    /// The network this adapter was created for.
    pub fn network(&self) -> NetworkKind {
        self.network
    }
}

/// `RIPEMD160(SHA256(data))`, the public key hash inside P2PKH addresses.
fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

impl ChainAdapter for BtcAdapter {
    fn chain_info(&self) -> &ChainInfo {
        &self.info
    }

    fn public_key(&self, private_key: &[u8]) -> Result<Vec<u8>> {
        secp::public_key(private_key, false)
    }

    fn address(&self, public_key: &[u8]) -> Result<String> {
        if public_key.is_empty() {
            return Err(Error::InvalidPublicKey {
                reason: "public key is empty",
            });
        }

        let mut payload = Vec::with_capacity(21);
        payload.push(self.address_version);
        payload.extend_from_slice(&hash160(public_key));
        Ok(bs58::encode(payload).with_check().into_string())
    }

    fn export_private_key(&self, private_key: &[u8], compress_public: bool) -> Result<String> {
        if private_key.len() != 32 {
            return Err(Error::InvalidPrivateKey {
                reason: "private key must be 32 bytes",
            });
        }

        let mut payload = Vec::with_capacity(34);
        payload.push(self.wif_prefix);
        payload.extend_from_slice(private_key);
        if compress_public {
            payload.push(WIF_COMPRESS_MAGIC);
        }
        Ok(bs58::encode(payload).with_check().into_string())
    }

    fn sign(&self, private_key: &[u8], hash: &[u8]) -> Result<Signature> {
        secp::sign_recoverable(private_key, hash)
    }
}
