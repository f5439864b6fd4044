//! Chain code wrapper.

use crate::{Error, Result};

/// The 32-byte chain code of an extended key.
///
/// The chain code extends a key pair with additional entropy so that child
/// derivation does not depend on the key bytes alone. Chain codes are
/// shared between an extended private key and its corresponding extended
/// public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainCode([u8; ChainCode::LENGTH]);

impl ChainCode {
    /// The length of a chain code in bytes.
    pub const LENGTH: usize = 32;

    /// Creates a chain code from a 32-byte array.
    pub fn new(bytes: [u8; Self::LENGTH]) -> Self {
        ChainCode(bytes)
    }

    /// Creates a chain code from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] if the slice is not 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; Self::LENGTH] =
            bytes.try_into().map_err(|_| Error::InvalidLength {
                expected: Self::LENGTH,
                actual: bytes.len(),
            })?;
        Ok(ChainCode(bytes))
    }

    /// Returns the chain code bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl AsRef<[u8]> for ChainCode {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_code_round_trip() {
        let bytes = [7u8; 32];
        let code = ChainCode::from_bytes(&bytes).unwrap();
        assert_eq!(code.as_bytes(), &bytes);
        assert_eq!(code, ChainCode::new(bytes));
    }

    #[test]
    fn test_chain_code_wrong_length() {
        assert_eq!(
            ChainCode::from_bytes(&[0u8; 31]),
            Err(Error::InvalidLength {
                expected: 32,
                actual: 31
            })
        );
    }
}
