//! Textual addresses.
//!
//! An address is a [`ShortId`] optionally prefixed by the alias of the chain
//! it is used on, `X-<cb58>`. The alias only affects presentation; two
//! addresses with the same short id belong to the same key.

use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;
use crate::types::ShortId;

/// Chain alias used when none is configured.
pub const DEFAULT_CHAIN_ALIAS: &str = "X";

/// A short id with an optional chain alias.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    chain_alias: Option<String>,
    short_id: ShortId,
}

impl Address {
    /// An address rendered with `chain_alias`.
    pub fn new(chain_alias: impl Into<String>, short_id: ShortId) -> Self {
        Self {
            chain_alias: Some(chain_alias.into()),
            short_id,
        }
    }

    /// An address with no alias prefix.
    pub fn bare(short_id: ShortId) -> Self {
        Self {
            chain_alias: None,
            short_id,
        }
    }

    pub fn short_id(&self) -> ShortId {
        self.short_id
    }

    pub fn chain_alias(&self) -> Option<&str> {
        self.chain_alias.as_deref()
    }

    /// Parse `alias-cb58` or bare `cb58`.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let (chain_alias, payload) = match s.split_once('-') {
            Some((alias, payload)) => {
                if alias.is_empty() || !alias.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(AddressError::InvalidChainAlias(alias.to_string()));
                }
                (Some(alias.to_string()), payload)
            }
            None => (None, s),
        };
        let short_id = payload.parse::<ShortId>()?;
        Ok(Self {
            chain_alias,
            short_id,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.chain_alias {
            Some(alias) => write!(f, "{alias}-{}", self.short_id),
            None => write!(f, "{}", self.short_id),
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
