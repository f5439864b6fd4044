//! Cached leaf records and the serialized vault document.

use std::collections::BTreeMap;
use std::path::Path;

use keyvault_bip32::ExtendedPrivateKey;
use keyvault_bip44::{AccountPath, PURPOSE};
use keyvault_keystore::EncryptedKey;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::Result;

/// One cached account leaf.
///
/// Stores the full derivation coordinates (hardened bits retained) plus
/// the leaf key wrapped in its own envelope. The envelope payload is
/// either the 32-byte raw scalar or the 78-byte serialized extended key,
/// depending on the vault's `save_extended_key` flag at creation time;
/// readers tell the two apart by length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafRecord {
    /// Purpose level, hardened.
    pub purpose: u32,
    /// Coin type level, hardened.
    #[serde(rename = "coinType")]
    pub coin_type: u32,
    /// Org level (hardened) for non-44 purposes; 0 otherwise.
    pub org: u32,
    /// Account level, hardened.
    pub account: u32,
    /// Change level.
    pub change: u32,
    /// Address index.
    #[serde(rename = "addressIndex")]
    pub address_index: u32,
    /// Creation time, seconds since the epoch.
    #[serde(rename = "time")]
    pub created_at: u32,
    /// The enveloped leaf key.
    #[serde(rename = "key")]
    pub encrypted_key: EncryptedKey,
}

impl LeafRecord {
    /// Rebuilds the account path these coordinates describe.
    pub fn account_path(&self) -> Result<AccountPath> {
        let org = if self.purpose == PURPOSE {
            None
        } else {
            Some(self.org)
        };
        Ok(AccountPath::new(
            self.purpose,
            self.coin_type,
            org,
            self.account,
            self.change,
            self.address_index,
        )?)
    }

    /// The textual key path of this record.
    pub fn key_path(&self) -> Result<String> {
        Ok(self.account_path()?.to_string())
    }
}

/// A read-only listing entry for one cached account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    /// The chain display address.
    pub address: String,
    /// Lowercase hex of the adapter-serialized public key.
    pub public_key: String,
    /// The textual key path.
    pub key_path: String,
}

/// The plaintext JSON document sealed inside the vault file envelope.
///
/// Field names are part of the on-disk format and must not change. The
/// `password` field lets a freshly loaded vault re-seal itself after
/// mutation; both it and the mnemonic are wiped when the document is
/// dropped.
#[derive(Serialize, Deserialize)]
pub(crate) struct VaultDocument {
    pub path: String,
    pub mnemonic: String,
    pub password: String,
    #[serde(with = "xprv_string")]
    pub key: ExtendedPrivateKey,
    pub time: u32,
    #[serde(rename = "addrLinkPubkey")]
    pub addr_link_pubkey: BTreeMap<String, String>,
    #[serde(rename = "childKeyInfo")]
    pub child_key_info: BTreeMap<String, LeafRecord>,
    #[serde(rename = "isSaveSubKey")]
    pub save_sub_key: bool,
    #[serde(rename = "isSaveExtendedKey")]
    pub save_extended_key: bool,
}

impl VaultDocument {
    pub(crate) fn display_path(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }
}

impl Drop for VaultDocument {
    fn drop(&mut self) {
        self.mnemonic.zeroize();
        self.password.zeroize();
    }
}

/// Serializes the master key as its base58check `xprv` string.
mod xprv_string {
    use keyvault_bip32::ExtendedPrivateKey;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use zeroize::Zeroizing;

    pub fn serialize<S: Serializer>(
        key: &ExtendedPrivateKey,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let encoded = Zeroizing::new(key.to_string());
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ExtendedPrivateKey, D::Error> {
        let encoded = Zeroizing::new(String::deserialize(deserializer)?);
        encoded.parse().map_err(de::Error::custom)
    }
}
