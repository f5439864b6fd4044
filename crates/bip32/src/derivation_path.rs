//! Derivation path parsing and formatting.

use std::fmt;
use std::slice;
use std::str::FromStr;

use crate::{ChildNumber, Error, Result};

/// A sequence of child indexes rooted at the master key.
///
/// The textual form follows the common wallet convention: a leading `m`,
/// one segment per level, apostrophe (or `h`/`H`) marking hardened
/// indexes.
///
/// # Examples
///
/// ```rust
/// use keyvault_bip32::{ChildNumber, DerivationPath};
/// use std::str::FromStr;
///
/// let path = DerivationPath::from_str("m/44'/0'/0'/0/0")?;
/// assert_eq!(path.len(), 5);
/// assert_eq!(path.to_string(), "m/44'/0'/0'/0/0");
///
/// let root = DerivationPath::from_str("m")?;
/// assert!(root.is_empty());
/// # Ok::<(), keyvault_bip32::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivationPath {
    segments: Vec<ChildNumber>,
}

impl DerivationPath {
    /// Creates a path from child numbers.
    pub fn new(segments: Vec<ChildNumber>) -> Self {
        DerivationPath { segments }
    }

    /// The number of levels below the master key.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Reports whether this is the empty path `m`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterates over the child numbers, outermost first.
    pub fn iter(&self) -> slice::Iter<'_, ChildNumber> {
        self.segments.iter()
    }

    /// The child numbers as a slice.
    pub fn as_slice(&self) -> &[ChildNumber] {
        &self.segments
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('/');
        match parts.next() {
            Some("m") | Some("M") => {}
            _ => {
                return Err(Error::InvalidPath {
                    reason: "path must start with `m`".to_string(),
                })
            }
        }
        let segments = parts
            .map(ChildNumber::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(DerivationPath { segments })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(segments: Vec<ChildNumber>) -> Self {
        DerivationPath::new(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typical_path() {
        let path = DerivationPath::from_str("m/44'/0'/0'/0/0").unwrap();
        assert_eq!(
            path.as_slice(),
            &[
                ChildNumber::Hardened(44),
                ChildNumber::Hardened(0),
                ChildNumber::Hardened(0),
                ChildNumber::Normal(0),
                ChildNumber::Normal(0),
            ]
        );
    }

    #[test]
    fn test_parse_h_markers() {
        let a = DerivationPath::from_str("m/0H/1/2H").unwrap();
        let b = DerivationPath::from_str("m/0'/1/2'").unwrap();
        let c = DerivationPath::from_str("m/0h/1/2h").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_parse_master_only() {
        assert!(DerivationPath::from_str("m").unwrap().is_empty());
        assert!(DerivationPath::from_str("M").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(DerivationPath::from_str("").is_err());
        assert!(DerivationPath::from_str("44'/0'").is_err());
        assert!(DerivationPath::from_str("m/").is_err());
        assert!(DerivationPath::from_str("m/abc").is_err());
        assert!(DerivationPath::from_str("m/0''").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["m", "m/0", "m/44'/0'/0'/0/0", "m/0'/2147483647'"] {
            let path = DerivationPath::from_str(text).unwrap();
            assert_eq!(path.to_string(), text);
            assert_eq!(DerivationPath::from_str(&path.to_string()).unwrap(), path);
        }
    }
}
