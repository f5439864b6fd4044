//! Vault file I/O: base64 ‖ envelope ‖ document, replaced atomically.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use keyvault_keystore::{decrypt, encrypt, EncryptedKey, ScryptParams};
use tracing::debug;
use zeroize::Zeroizing;

use crate::record::VaultDocument;
use crate::{Error, Result};

/// Reads and unseals the vault file at `path`.
///
/// A wrong password surfaces as the envelope's MAC-mismatch error before
/// any plaintext exists.
pub(crate) fn load(path: &Path, password: &str) -> Result<VaultDocument> {
    let raw = fs::read_to_string(path).map_err(|source| Error::Load { source })?;
    let decoded = BASE64
        .decode(raw.trim())
        .map_err(|_| Error::InvalidVaultFile {
            reason: "not valid base64",
        })?;
    let envelope_json = std::str::from_utf8(&decoded).map_err(|_| Error::InvalidVaultFile {
        reason: "envelope is not utf-8",
    })?;
    let envelope = EncryptedKey::from_json(envelope_json)?;

    let started = Instant::now();
    let plaintext = decrypt(&envelope, password)?;
    debug!(elapsed = ?started.elapsed(), "unsealed vault document");

    Ok(serde_json::from_slice(&plaintext)?)
}

/// Seals `document` under `password` and writes it to `path` atomically.
pub(crate) fn save(
    path: &Path,
    document: &VaultDocument,
    password: &str,
    params: ScryptParams,
) -> Result<()> {
    let plaintext = Zeroizing::new(serde_json::to_vec(document)?);

    let started = Instant::now();
    let envelope = encrypt(&plaintext, password, params)?;
    debug!(elapsed = ?started.elapsed(), "sealed vault document");

    let encoded = BASE64.encode(envelope.to_json()?);
    atomic_write(path, encoded.as_bytes()).map_err(|source| Error::Persist { source })
}

/// Writes via a sibling temporary file and renames it into place, so
/// readers only ever observe a complete snapshot.
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}
