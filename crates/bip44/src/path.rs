//! Account path coordinates and their textual codec.

use std::fmt;
use std::str::FromStr;

use keyvault_bip32::ChildNumber;

use crate::{Error, Result, HARDENED_OFFSET, PURPOSE};

/// The logical coordinates of one wallet account leaf.
///
/// Coordinates are stored raw, hardened bit included. The first levels
/// (purpose, coin type, org when present, account) must be hardened; change
/// and address index must not be. An organization level is present exactly
/// when the purpose is not the standard 44'.
///
/// # Textual form
///
/// Rendered as `/purpose/coin/[org/]account/change/index` with the hardened
/// bit stripped, so paths stay free of apostrophes in logs and URLs:
/// `/44/60/0/0/0`. Parsing re-applies the hardened bit at the positions the
/// scheme expects; a leading `m` and apostrophe/`h` markers are accepted on
/// input.
///
/// # Examples
///
/// ```rust
/// use keyvault_bip44::{harden, AccountPath, COIN_TYPE_ETH, PURPOSE};
///
/// let path = AccountPath::new(PURPOSE, COIN_TYPE_ETH, None, harden(0), 0, 5)?;
/// assert_eq!(path.to_string(), "/44/60/0/0/5");
///
/// let parsed: AccountPath = "/44/60/0/0/5".parse()?;
/// assert_eq!(parsed, path);
/// # Ok::<(), keyvault_bip44::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPath {
    purpose: u32,
    coin_type: u32,
    org: Option<u32>,
    account: u32,
    change: u32,
    address_index: u32,
}

impl AccountPath {
    /// Builds and validates account coordinates.
    ///
    /// All hardened-level values must carry the hardened bit (use
    /// [`crate::harden`]). `org` must be `Some` exactly when `purpose` is
    /// not 44'.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPathParameter`] when a hardening rule or the
    /// org placement is violated.
    pub fn new(
        purpose: u32,
        coin_type: u32,
        org: Option<u32>,
        account: u32,
        change: u32,
        address_index: u32,
    ) -> Result<Self> {
        let hardened = |name: &str, value: u32| -> Result<()> {
            if value & HARDENED_OFFSET == 0 {
                return Err(Error::InvalidPathParameter {
                    reason: format!("{name} level must be hardened"),
                });
            }
            Ok(())
        };
        let normal = |name: &str, value: u32| -> Result<()> {
            if value & HARDENED_OFFSET != 0 {
                return Err(Error::InvalidPathParameter {
                    reason: format!("{name} level must not be hardened"),
                });
            }
            Ok(())
        };

        hardened("purpose", purpose)?;
        hardened("coin type", coin_type)?;
        hardened("account", account)?;
        normal("change", change)?;
        normal("address index", address_index)?;

        match (purpose == PURPOSE, org) {
            (true, Some(_)) => {
                return Err(Error::InvalidPathParameter {
                    reason: "org level is not part of purpose 44 paths".to_string(),
                })
            }
            (false, None) => {
                return Err(Error::InvalidPathParameter {
                    reason: "org level is required when purpose is not 44".to_string(),
                })
            }
            (false, Some(org)) => hardened("org", org)?,
            (true, None) => {}
        }

        Ok(AccountPath {
            purpose,
            coin_type,
            org,
            account,
            change,
            address_index,
        })
    }

    /// The purpose level, hardened bit included.
    pub fn purpose(&self) -> u32 {
        self.purpose
    }

    /// The coin type level, hardened bit included.
    pub fn coin_type(&self) -> u32 {
        self.coin_type
    }

    /// The organization level, if the purpose carries one.
    pub fn org(&self) -> Option<u32> {
        self.org
    }

    /// The account level, hardened bit included.
    pub fn account(&self) -> u32 {
        self.account
    }

    /// The change level (external 0 / internal 1 by convention).
    pub fn change(&self) -> u32 {
        self.change
    }

    /// The address index.
    pub fn address_index(&self) -> u32 {
        self.address_index
    }

    /// The number of levels below the master key: 5, or 6 with an org.
    pub fn depth(&self) -> usize {
        if self.org.is_some() {
            6
        } else {
            5
        }
    }

    /// The derivation steps, outermost first.
    pub fn child_numbers(&self) -> Vec<ChildNumber> {
        let mut numbers = Vec::with_capacity(self.depth());
        numbers.push(ChildNumber::from_u32(self.purpose));
        numbers.push(ChildNumber::from_u32(self.coin_type));
        if let Some(org) = self.org {
            numbers.push(ChildNumber::from_u32(org));
        }
        numbers.push(ChildNumber::from_u32(self.account));
        numbers.push(ChildNumber::from_u32(self.change));
        numbers.push(ChildNumber::from_u32(self.address_index));
        numbers
    }
}

impl fmt::Display for AccountPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strip = |value: u32| value & !HARDENED_OFFSET;
        write!(f, "/{}/{}", strip(self.purpose), strip(self.coin_type))?;
        if let Some(org) = self.org {
            write!(f, "/{}", strip(org))?;
        }
        write!(
            f,
            "/{}/{}/{}",
            strip(self.account),
            self.change,
            self.address_index
        )
    }
}

impl FromStr for AccountPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix('m')
            .or_else(|| trimmed.strip_prefix('M'))
            .unwrap_or(trimmed);
        let trimmed = trimmed.strip_prefix('/').ok_or_else(|| {
            Error::InvalidPathParameter {
                reason: "path segments must be separated by `/`".to_string(),
            }
        })?;

        let segments: Vec<(u32, bool)> = trimmed
            .split('/')
            .map(parse_segment)
            .collect::<Result<_>>()?;

        let has_org = match segments.len() {
            5 => false,
            6 => true,
            other => {
                return Err(Error::InvalidPathParameter {
                    reason: format!("expected 5 or 6 path levels, got {other}"),
                })
            }
        };

        // Change and address index may not be written hardened.
        for (value, marked) in &segments[segments.len() - 2..] {
            if *marked || value & HARDENED_OFFSET != 0 {
                return Err(Error::InvalidPathParameter {
                    reason: "change and address index must not be hardened".to_string(),
                });
            }
        }

        let purpose = segments[0].0 | HARDENED_OFFSET;
        let coin_type = segments[1].0 | HARDENED_OFFSET;
        let (org, account_at) = if has_org {
            (Some(segments[2].0 | HARDENED_OFFSET), 3)
        } else {
            (None, 2)
        };
        let account = segments[account_at].0 | HARDENED_OFFSET;
        let change = segments[account_at + 1].0;
        let address_index = segments[account_at + 2].0;

        if has_org && purpose == PURPOSE {
            return Err(Error::InvalidPathParameter {
                reason: "purpose 44 paths have no org level".to_string(),
            });
        }
        if !has_org && purpose != PURPOSE {
            return Err(Error::InvalidPathParameter {
                reason: "org level is required when purpose is not 44".to_string(),
            });
        }

        AccountPath::new(purpose, coin_type, org, account, change, address_index)
    }
}

/// Parses one path segment into its value and whether it carried an
/// explicit hardened marker.
fn parse_segment(segment: &str) -> Result<(u32, bool)> {
    let (digits, marked) = match segment.strip_suffix(['\'', 'h', 'H']) {
        Some(rest) => (rest, true),
        None => (segment, false),
    };
    let value: u32 = digits.parse().map_err(|_| Error::InvalidPathParameter {
        reason: format!("invalid path segment `{segment}`"),
    })?;
    if marked && value & HARDENED_OFFSET != 0 {
        return Err(Error::InvalidPathParameter {
            reason: format!("segment `{segment}` is hardened twice"),
        });
    }
    Ok((if marked { value | HARDENED_OFFSET } else { value }, marked))
}
