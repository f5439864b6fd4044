//! Ethereum-style chain adapter.

use sha3::{Digest, Keccak256};

use crate::adapter::{ChainAdapter, ChainInfo, CHAIN_INFO_ETH};
use crate::{secp, Error, NetworkKind, Result, Signature};

/// Adapter for Ethereum and compatible chains.
///
/// - Canonical public key: uncompressed 65-byte SEC1.
/// - Address: `0x` plus the last 20 bytes of `keccak256(pubkey[1..])`,
///   checksum-cased per EIP-55.
/// - Private key export: `0x`-prefixed hex.
/// - Signature: 64-byte `r ‖ s` with the recovery id in `v`.
#[derive(Debug, Clone, Copy)]
pub struct EthAdapter {
    network: NetworkKind,
    info: ChainInfo,
}

impl EthAdapter {
    /// Creates an adapter for `network`.
    ///
    /// Ethereum addresses and key exports are network-independent; the
    /// network is kept for symmetry with other adapters.
    pub fn new(network: NetworkKind) -> Self {
        EthAdapter {
            network,
            info: CHAIN_INFO_ETH,
        }
    }

    /// The network this adapter was created for.
    pub fn network(&self) -> NetworkKind {
        self.network
    }
}

/// Applies the EIP-55 mixed-case checksum to a 20-byte address.
fn checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let digest = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

impl ChainAdapter for EthAdapter {
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
        if public_key.len() != 65 || public_key[0] != 0x04 {
            return Err(Error::InvalidPublicKey {
                reason: "expected a 65-byte uncompressed SEC1 public key",
            });
        }

        let digest = Keccak256::digest(&public_key[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&digest[12..]);
        Ok(checksum_address(&address))
    }

    fn export_private_key(&self, private_key: &[u8], _compress_public: bool) -> Result<String> {
        if private_key.len() != 32 {
            return Err(Error::InvalidPrivateKey {
                reason: "private key must be 32 bytes",
            });
        }
        Ok(format!("0x{}", hex::encode(private_key)))
    }

    fn sign(&self, private_key: &[u8], hash: &[u8]) -> Result<Signature> {
        secp::sign_recoverable(private_key, hash)
    }
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
    fn test_address_of_key_one() {
        // Well-known fixture: the address of private key 1.
        let adapter = EthAdapter::new(NetworkKind::Mainnet);
        let public_key = adapter.public_key(&key_one()).unwrap();
        assert_eq!(
            adapter.address(&public_key).unwrap(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_address_rejects_bad_input() {
        let adapter = EthAdapter::new(NetworkKind::Mainnet);
        assert!(adapter.address(&[]).is_err());
        assert!(adapter.address(&[0x04; 33]).is_err());
        // Compressed keys are not the canonical eth form.
        let compressed = crate::secp::public_key(&key_one(), true).unwrap();
        assert!(adapter.address(&compressed).is_err());
    }

    #[test]
    fn test_eip55_checksum_casing() {
        // EIP-55 reference string.
        let mut address = [0u8; 20];
        address.copy_from_slice(&hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap());
        assert_eq!(
            checksum_address(&address),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_export_private_key_hex() {
        let adapter = EthAdapter::new(NetworkKind::Mainnet);
        let exported = adapter.export_private_key(&key_one(), false).unwrap();
        assert_eq!(
            exported,
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
        // The compression flag has no effect on hex export.
        assert_eq!(adapter.export_private_key(&key_one(), true).unwrap(), exported);
    }

    #[test]
    fn test_sign_produces_recoverable_signature() {
        let adapter = EthAdapter::new(NetworkKind::Mainnet);
        let hash = Keccak256::digest(b"message");
        let signature = adapter.sign(&key_one(), &hash).unwrap();
        assert_eq!(signature.v_right().len(), 65);
        assert!(signature.v == 0 || signature.v == 1);
        assert_eq!(signature.pubkey, adapter.public_key(&key_one()).unwrap());
    }
}
