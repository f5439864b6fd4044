//! The vault: master-key ownership, leaf cache, and the creation state
//! machine.

use std::collections::BTreeMap;
use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use keyvault_bip32::{ExtendedPrivateKey, Network};
use keyvault_bip39::{entropy_from_mnemonic, new_entropy, new_mnemonic, new_seed};
use keyvault_bip44::{derive_account, harden, AccountPath, PURPOSE};
use keyvault_chains::{ChainAdapter, Signature};
use keyvault_keystore::{decrypt, encrypt, keccak256, ScryptParams};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use zeroize::{Zeroize, Zeroizing};

use crate::record::{AccountSummary, LeafRecord, VaultDocument};
use crate::{store, Error, Result};

/// Tunables for a vault instance.
#[derive(Debug, Clone, Copy)]
pub struct VaultOptions {
    /// Scrypt cost for the vault file and leaf envelopes. Tests use
    /// [`ScryptParams::LIGHT`]; everything else should keep the default.
    pub scrypt: ScryptParams,
}

impl Default for VaultOptions {
    fn default() -> Self {
        VaultOptions {
            scrypt: ScryptParams::STANDARD,
        }
    }
}

/// Mutable vault state, guarded by the vault's reader/writer lock.
struct VaultState {
    mnemonic: String,
    password: String,
    master: ExtendedPrivateKey,
    created_at: u32,
    addr_link_pubkey: BTreeMap<String, String>,
    child_key_info: BTreeMap<String, LeafRecord>,
    save_sub_key: bool,
    save_extended_key: bool,
}

impl VaultState {
    fn document(&self, path: &Path) -> VaultDocument {
        VaultDocument {
            path: VaultDocument::display_path(path),
            mnemonic: self.mnemonic.clone(),
            password: self.password.clone(),
            key: self.master.clone(),
            time: self.created_at,
            addr_link_pubkey: self.addr_link_pubkey.clone(),
            child_key_info: self.child_key_info.clone(),
            save_sub_key: self.save_sub_key,
            save_extended_key: self.save_extended_key,
        }
    }
}

impl Drop for VaultState {
    fn drop(&mut self) {
        self.mnemonic.zeroize();
        self.password.zeroize();
    }
}

/// A leaf key as resolved for one operation: either the raw scalar from
/// the cache or a full extended key.
enum LeafKey {
    Raw(Zeroizing<Vec<u8>>),
    Extended(ExtendedPrivateKey),
}

struct ResolvedLeaf {
    key_path: String,
    key: LeafKey,
}

impl ResolvedLeaf {
    fn private_bytes(&self) -> Zeroizing<Vec<u8>> {
        match &self.key {
            LeafKey::Raw(bytes) => Zeroizing::new(bytes.to_vec()),
            LeafKey::Extended(key) => Zeroizing::new(key.private_key().to_bytes().to_vec()),
        }
    }
}

/// The HD multi-chain key vault.
///
/// A vault exclusively owns its master extended key, the optional mnemonic
/// it was born from, and two indexes over cached leaves: display address →
/// public-key fingerprint and fingerprint → [`LeafRecord`]. All state is
/// persisted as an encrypted, atomically-replaced file; see the crate docs
/// for the on-disk layout.
///
/// Construction follows a load-or-create state machine: every constructor
/// first opens an existing file at `path` (the extra inputs are ignored in
/// that case), and only bootstraps a fresh vault when no file exists.
pub struct Vault {
    file_path: PathBuf,
    options: VaultOptions,
    state: RwLock<VaultState>,
    /// Serializes snapshot-and-write sequences so a slow KDF can never
    /// publish a snapshot older than an already-acknowledged write.
    persist_gate: Mutex<()>,
}

impl Vault {
    // ----- construction ---------------------------------------------------

    /// Opens an existing vault file.
    ///
    /// # Errors
    ///
    /// [`Error::Load`] if the file cannot be read, the envelope's
    /// MAC-mismatch error if `password` is wrong.
    pub fn open<P: AsRef<Path>>(path: P, password: &str) -> Result<Vault> {
        Self::open_with_options(path, password, VaultOptions::default())
    }

    /// [`Vault::open`] with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        password: &str,
        options: VaultOptions,
    ) -> Result<Vault> {
        let path = path.as_ref().to_path_buf();
        let mut document = store::load(&path, password)?;
        let state = VaultState {
            mnemonic: mem::take(&mut document.mnemonic),
            password: mem::take(&mut document.password),
            master: document.key.clone(),
            created_at: document.time,
            addr_link_pubkey: mem::take(&mut document.addr_link_pubkey),
            child_key_info: mem::take(&mut document.child_key_info),
            save_sub_key: document.save_sub_key,
            save_extended_key: document.save_extended_key,
        };
        Ok(Vault {
            file_path: path,
            options,
            state: RwLock::new(state),
            persist_gate: Mutex::new(()),
        })
    }

    /// Opens the vault at `path`, creating it with a freshly generated
    /// 128-bit mnemonic when no file exists. For a fresh vault the
    /// password doubles as the seed passphrase.
    pub fn create<P: AsRef<Path>>(path: P, password: &str) -> Result<Vault> {
        Self::create_with_options(path, password, VaultOptions::default())
    }

    /// [`Vault::create`] with explicit options.
    pub fn create_with_options<P: AsRef<Path>>(
        path: P,
        password: &str,
        options: VaultOptions,
    ) -> Result<Vault> {
        if path.as_ref().exists() {
            return Self::open_with_options(path, password, options);
        }
        let entropy = Zeroizing::new(new_entropy(128)?);
        let mnemonic = Zeroizing::new(new_mnemonic(&entropy)?);
        info!("no vault file found, bootstrapping from a fresh mnemonic");
        Self::bootstrap(path.as_ref(), password, &mnemonic, password, options)
    }

    /// Opens the vault at `path`, restoring it from `mnemonic` when no
    /// file exists.
    ///
    /// `use_password_blur` controls whether the vault password is mixed
    /// into the seed as the BIP39 passphrase. Most ecosystems restore with
    /// an empty passphrase (`false`); the flag exists as a compatibility
    /// contract with wallets created either way.
    ///
    /// # Errors
    ///
    /// Mnemonic validation errors when bootstrapping; open errors when the
    /// file already exists.
    pub fn from_mnemonic<P: AsRef<Path>>(
        path: P,
        password: &str,
        mnemonic: &str,
        use_password_blur: bool,
    ) -> Result<Vault> {
        Self::from_mnemonic_with_options(
            path,
            password,
            mnemonic,
            use_password_blur,
            VaultOptions::default(),
        )
    }

    /// [`Vault::from_mnemonic`] with explicit options.
    pub fn from_mnemonic_with_options<P: AsRef<Path>>(
        path: P,
        password: &str,
        mnemonic: &str,
        use_password_blur: bool,
        options: VaultOptions,
    ) -> Result<Vault> {
        if path.as_ref().exists() {
            return Self::open_with_options(path, password, options);
        }
        let mut entropy = entropy_from_mnemonic(mnemonic)?;
        entropy.zeroize();

        let passphrase = if use_password_blur { password } else { "" };
        Self::bootstrap(path.as_ref(), password, mnemonic, passphrase, options)
    }

    /// Opens the vault at `path`, importing `extended_key` (a base58
    /// `xprv...` string) as the master when no file exists. The restored
    /// vault has no mnemonic.
    pub fn from_extended_key<P: AsRef<Path>>(
        path: P,
        password: &str,
        extended_key: &str,
    ) -> Result<Vault> {
        Self::from_extended_key_with_options(path, password, extended_key, VaultOptions::default())
    }

    /// [`Vault::from_extended_key`] with explicit options.
    pub fn from_extended_key_with_options<P: AsRef<Path>>(
        path: P,
        password: &str,
        extended_key: &str,
        options: VaultOptions,
    ) -> Result<Vault> {
        if path.as_ref().exists() {
            return Self::open_with_options(path, password, options);
        }
        let master: ExtendedPrivateKey = extended_key.parse()?;
        let vault = Self::assemble(path.as_ref(), password, String::new(), master, options);
        vault.persist()?;
        Ok(vault)
    }

    fn bootstrap(
        path: &Path,
        password: &str,
        mnemonic: &str,
        passphrase: &str,
        options: VaultOptions,
    ) -> Result<Vault> {
        let seed = new_seed(mnemonic, passphrase);
        let master = ExtendedPrivateKey::from_seed(seed.as_bytes(), Network::Mainnet)?;
        let vault = Self::assemble(path, password, mnemonic.to_string(), master, options);
        vault.persist()?;
        Ok(vault)
    }

    fn assemble(
        path: &Path,
        password: &str,
        mnemonic: String,
        master: ExtendedPrivateKey,
        options: VaultOptions,
    ) -> Vault {
        let state = VaultState {
            mnemonic,
            password: password.to_string(),
            master,
            created_at: chrono::Utc::now().timestamp() as u32,
            addr_link_pubkey: BTreeMap::new(),
            child_key_info: BTreeMap::new(),
            save_sub_key: false,
            save_extended_key: false,
        };
        Vault {
            file_path: path.to_path_buf(),
            options,
            state: RwLock::new(state),
            persist_gate: Mutex::new(()),
        }
    }

    // ----- policy flags ---------------------------------------------------

    /// Whether newly created accounts are cached as encrypted leaf
    /// records.
    pub fn save_sub_key(&self) -> bool {
        self.state.read().save_sub_key
    }

    /// Sets the leaf-caching policy. Takes effect for subsequent
    /// `create_account` calls; persisted with the next write.
    pub fn set_save_sub_key(&self, save: bool) {
        self.state.write().save_sub_key = save;
    }

    /// Whether cached leaf records hold the 78-byte extended key instead
    /// of the raw 32-byte scalar.
    pub fn save_extended_key(&self) -> bool {
        self.state.read().save_extended_key
    }

    /// Sets the extended-key caching policy.
    pub fn set_save_extended_key(&self, save: bool) {
        self.state.write().save_extended_key = save;
    }

    /// The on-disk location of this vault.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Creation time of the vault, seconds since the epoch.
    pub fn created_at(&self) -> u32 {
        self.state.read().created_at
    }

    // ----- master exports -------------------------------------------------

    /// Returns the mnemonic, or `None` once it has been wiped (or when the
    /// vault was imported from an extended key).
    pub fn export_master_mnemonic(&self) -> Option<String> {
        let state = self.state.read();
        if state.mnemonic.is_empty() {
            None
        } else {
            Some(state.mnemonic.clone())
        }
    }

    /// Returns the master private scalar as `0x`-prefixed hex.
    pub fn export_master_raw_key(&self) -> String {
        let state = self.state.read();
        let bytes = Zeroizing::new(state.master.private_key().to_bytes());
        format!("0x{}", hex::encode(bytes.as_ref()))
    }

    /// Returns the master key in base58 `xprv` form.
    pub fn export_master_extended_key(&self) -> String {
        self.state.read().master.to_string()
    }

    // ----- accounts -------------------------------------------------------

    /// Derives the account leaf at the given coordinates and produces its
    /// display address via `adapter`. When `save_sub_key` is on, the leaf
    /// key is cached under an envelope whose password binds the vault
    /// password to the leaf's path.
    ///
    /// Hardened levels (`purpose`, `coin_type`, `org`, `account`) may be
    /// passed raw or with the hardened bit already set; `change` and
    /// `address_index` must be plain. `org` is ignored for purpose 44.
    ///
    /// Returns the address and the textual key path. A successful call is
    /// durable before it returns.
    pub fn create_account(
        &self,
        purpose: u32,
        coin_type: u32,
        org: u32,
        account: u32,
        change: u32,
        address_index: u32,
        adapter: &dyn ChainAdapter,
    ) -> Result<(String, String)> {
        let purpose = harden(purpose);
        let org = if purpose == PURPOSE {
            None
        } else {
            Some(harden(org))
        };
        let path = AccountPath::new(
            purpose,
            harden(coin_type),
            org,
            harden(account),
            change,
            address_index,
        )?;
        let key_path = path.to_string();

        let (master, password, save_sub_key, save_extended_key) = {
            let state = self.state.read();
            (
                state.master.clone(),
                Zeroizing::new(state.password.clone()),
                state.save_sub_key,
                state.save_extended_key,
            )
        };

        let leaf = derive_account(&master, &path)?;
        let private_bytes = Zeroizing::new(leaf.private_key().to_bytes());
        let public_key = adapter.public_key(private_bytes.as_ref())?;
        let address = adapter.address(&public_key)?;
        let fingerprint = hex::encode(&public_key);

        if save_sub_key {
            let blob: Zeroizing<Vec<u8>> = if save_extended_key {
                Zeroizing::new(leaf.to_bytes().to_vec())
            } else {
                Zeroizing::new(private_bytes.to_vec())
            };
            // KDF work happens before the write lock is taken.
            let leaf_password = leaf_envelope_password(&password, &key_path);
            let envelope = encrypt(&blob, &leaf_password, self.options.scrypt)?;

            let record = LeafRecord {
                purpose: path.purpose(),
                coin_type: path.coin_type(),
                org: path.org().unwrap_or(0),
                account: path.account(),
                change: path.change(),
                address_index: path.address_index(),
                created_at: chrono::Utc::now().timestamp() as u32,
                encrypted_key: envelope,
            };

            {
                let mut state = self.state.write();
                state
                    .addr_link_pubkey
                    .insert(address.clone(), fingerprint.clone());
                state.child_key_info.insert(fingerprint, record);
            }
            self.persist()?;
            debug!(%key_path, "cached new account leaf");
        }

        Ok((address, key_path))
    }

    /// Lists the cached accounts: address, public key hex, key path.
    pub fn accounts(&self) -> Result<Vec<AccountSummary>> {
        let state = self.state.read();
        let mut summaries = Vec::with_capacity(state.addr_link_pubkey.len());
        for (address, fingerprint) in &state.addr_link_pubkey {
            if let Some(record) = state.child_key_info.get(fingerprint) {
                summaries.push(AccountSummary {
                    address: address.clone(),
                    public_key: fingerprint.clone(),
                    key_path: record.key_path()?,
                });
            }
        }
        Ok(summaries)
    }

    // ----- leaf resolution ------------------------------------------------

    /// Finds the leaf key for an operation. The cache is consulted first
    /// when an address is given; otherwise (or on a cache miss with a path
    /// in hand) the leaf is re-derived from the master, and a supplied
    /// address must match the recomputed one.
    fn resolve_leaf(
        &self,
        address: &str,
        key_path: &str,
        adapter: &dyn ChainAdapter,
    ) -> Result<ResolvedLeaf> {
        if !address.is_empty() {
            let cached = {
                let state = self.state.read();
                state
                    .addr_link_pubkey
                    .get(address)
                    .and_then(|fp| state.child_key_info.get(fp))
                    .map(|record| (record.clone(), Zeroizing::new(state.password.clone())))
            };

            if let Some((record, password)) = cached {
                let record_path = record.key_path()?;
                let leaf_password = leaf_envelope_password(&password, &record_path);
                let blob = decrypt(&record.encrypted_key, &leaf_password)?;
                let key = match blob.len() {
                    32 => LeafKey::Raw(Zeroizing::new(blob.to_vec())),
                    78 => LeafKey::Extended(ExtendedPrivateKey::from_bytes(&blob)?),
                    _ => {
                        return Err(Error::InvalidVaultFile {
                            reason: "cached leaf key has an impossible length",
                        })
                    }
                };
                return Ok(ResolvedLeaf {
                    key_path: record_path,
                    key,
                });
            }

            if key_path.is_empty() {
                return Err(Error::NotFound {
                    address: address.to_string(),
                });
            }

            let (leaf, resolved_path) = self.derive_by_path(key_path)?;
            let private_bytes = Zeroizing::new(leaf.private_key().to_bytes());
            let public_key = adapter.public_key(private_bytes.as_ref())?;
            let derived = adapter.address(&public_key)?;
            if derived != address {
                return Err(Error::AddressMismatch {
                    supplied: address.to_string(),
                    derived,
                });
            }
            return Ok(ResolvedLeaf {
                key_path: resolved_path,
                key: LeafKey::Extended(leaf),
            });
        }

        if key_path.is_empty() {
            return Err(Error::NotFound {
                address: String::new(),
            });
        }
        let (leaf, resolved_path) = self.derive_by_path(key_path)?;
        Ok(ResolvedLeaf {
            key_path: resolved_path,
            key: LeafKey::Extended(leaf),
        })
    }

    /// Parses `key_path` and walks it from the master key.
    fn derive_by_path(&self, key_path: &str) -> Result<(ExtendedPrivateKey, String)> {
        let path: AccountPath = key_path.parse()?;
        let master = self.state.read().master.clone();
        let leaf = derive_account(&master, &path)?;
        Ok((leaf, path.to_string()))
    }

    // ----- leaf operations ------------------------------------------------

    /// Signs a 32-byte digest with the leaf key at `address` or
    /// `key_path`.
    pub fn sign(
        &self,
        address: &str,
        key_path: &str,
        hash: &[u8],
        adapter: &dyn ChainAdapter,
    ) -> Result<Signature> {
        let resolved = self.resolve_leaf(address, key_path, adapter)?;
        let private_bytes = resolved.private_bytes();
        Ok(adapter.sign(&private_bytes, hash)?)
    }

    /// Exports the leaf private key in the adapter's text form (hex, WIF).
    pub fn export_raw_key(
        &self,
        address: &str,
        key_path: &str,
        adapter: &dyn ChainAdapter,
    ) -> Result<String> {
        let resolved = self.resolve_leaf(address, key_path, adapter)?;
        let private_bytes = resolved.private_bytes();
        Ok(adapter.export_private_key(&private_bytes, false)?)
    }

    /// Exports the leaf as a base58 extended private key.
    ///
    /// When the cache holds only the raw scalar, the extended form is
    /// recovered by re-deriving along the record's own path.
    pub fn export_extended_key(
        &self,
        address: &str,
        key_path: &str,
        adapter: &dyn ChainAdapter,
    ) -> Result<String> {
        let resolved = self.resolve_leaf(address, key_path, adapter)?;
        match resolved.key {
            LeafKey::Extended(key) => Ok(key.to_string()),
            LeafKey::Raw(_) => {
                let (leaf, _) = self.derive_by_path(&resolved.key_path)?;
                Ok(leaf.to_string())
            }
        }
    }

    /// Re-wraps the leaf private key in a standalone keystore envelope
    /// under `keystore_password` and returns its JSON document. The record
    /// carries the address and path as metadata; the vault password is
    /// never part of it.
    pub fn export_keystore(
        &self,
        address: &str,
        key_path: &str,
        keystore_password: &str,
        adapter: &dyn ChainAdapter,
    ) -> Result<String> {
        let resolved = self.resolve_leaf(address, key_path, adapter)?;
        let private_bytes = resolved.private_bytes();

        let export_address = if address.is_empty() {
            let public_key = adapter.public_key(&private_bytes)?;
            adapter.address(&public_key)?
        } else {
            address.to_string()
        };

        let mut envelope = encrypt(&private_bytes, keystore_password, self.options.scrypt)?;
        envelope.address = Some(export_address);
        envelope.path = Some(resolved.key_path.clone());
        Ok(envelope.to_json()?)
    }

    /// Imports a foreign private key into the vault.
    ///
    /// Not supported: the vault only manages keys derived from its own
    /// master.
    pub fn import_raw_key(
        &self,
        _private_key: &[u8],
        _adapter: &dyn ChainAdapter,
    ) -> Result<String> {
        Err(Error::Unsupported {
            operation: "import_raw_key",
        })
    }

    // ----- mutation -------------------------------------------------------

    /// Wipes the mnemonic from memory and from the on-disk document.
    /// Nothing else changes; the master key remains usable.
    pub fn del_mnemonic(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            state.mnemonic.zeroize();
            state.mnemonic = String::new();
        }
        self.persist()
    }

    /// Deletes the vault file and consumes the in-memory vault.
    pub fn destroy(self) -> Result<()> {
        fs::remove_file(&self.file_path).map_err(|source| Error::Persist { source })
    }

    // ----- persistence ----------------------------------------------------

    /// Seals the current state and atomically replaces the vault file.
    ///
    /// The snapshot is taken under the persist gate so concurrent writers
    /// serialize, and the scrypt KDF runs outside the reader/writer lock.
    fn persist(&self) -> Result<()> {
        let _gate = self.persist_gate.lock();
        let (document, password) = {
            let state = self.state.read();
            (
                state.document(&self.file_path),
                Zeroizing::new(state.password.clone()),
            )
        };
        store::save(&self.file_path, &document, &password, self.options.scrypt)
    }
}

/// The envelope password for one leaf record:
/// `hex(keccak256(vault_password ‖ key_path))`.
///
/// Binding the path into the password means a leaked leaf ciphertext is
/// undecryptable without both the vault secret and the exact path context.
fn leaf_envelope_password(vault_password: &str, key_path: &str) -> Zeroizing<String> {
    let mut preimage = Zeroizing::new(Vec::with_capacity(
        vault_password.len() + key_path.len(),
    ));
    preimage.extend_from_slice(vault_password.as_bytes());
    preimage.extend_from_slice(key_path.as_bytes());
    Zeroizing::new(hex::encode(keccak256(&preimage)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_envelope_password_binds_path_and_secret() {
        let a = leaf_envelope_password("pw", "/44/60/0/0/0");
        let b = leaf_envelope_password("pw", "/44/60/0/0/1");
        let c = leaf_envelope_password("other", "/44/60/0/0/0");
        assert_ne!(*a, *b);
        assert_ne!(*a, *c);
        assert_eq!(a.len(), 64);
        assert_eq!(*a, *leaf_envelope_password("pw", "/44/60/0/0/0"));
    }
}
