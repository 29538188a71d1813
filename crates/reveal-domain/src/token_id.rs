use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenIdError {
    #[error("token id '{0}' is not a decimal integer")]
    NotNumeric(String),

    #[error("token id {id} is outside the collection range [1, {max_supply}]")]
    OutOfRange { id: u64, max_supply: u64 },
}

/// Identifier of one token in a fixed-size collection.
///
/// Valid ids are `1..=max_supply`; a `TokenId` value is only constructed
/// after that range has been checked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TokenId(u64);

impl TokenId {
    pub fn new(id: u64, max_supply: u64) -> Result<Self, TokenIdError> {
        if id == 0 || id > max_supply {
            return Err(TokenIdError::OutOfRange { id, max_supply });
        }
        Ok(Self(id))
    }

    /// Parse a path segment such as `"42"`.
    ///
    /// One leading `+` is allowed, so `"+42"` is token 42. `"-1"`, `" 42"`
    /// and `"4e1"` are rejected as non-numeric.
    pub fn parse(raw: &str, max_supply: u64) -> Result<Self, TokenIdError> {
        let digits = raw.strip_prefix('+').unwrap_or(raw);
        Self::parse_digits(digits, max_supply).map_err(|error| match error {
            TokenIdError::NotNumeric(_) => TokenIdError::NotNumeric(raw.to_string()),
            other => other,
        })
    }

    /// Parse a generated file name of the form `<id>.json`.
    ///
    /// `Ok(None)` means the file is not a token file at all. A numeric stem
    /// outside the collection is an error. Stems must be plain digits.
    pub fn from_file_name(
        file_name: &str,
        max_supply: u64,
    ) -> Result<Option<Self>, TokenIdError> {
        let Some(stem) = file_name.strip_suffix(".json") else {
            return Ok(None);
        };
        match Self::parse_digits(stem, max_supply) {
            Ok(id) => Ok(Some(id)),
            Err(TokenIdError::NotNumeric(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn parse_digits(digits: &str, max_supply: u64) -> Result<Self, TokenIdError> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenIdError::NotNumeric(digits.to_string()));
        }
        // All-digit strings that overflow u64 are necessarily out of range.
        let id = digits.parse::<u64>().map_err(|_| TokenIdError::OutOfRange {
            id: u64::MAX,
            max_supply,
        })?;
        Self::new(id, max_supply)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
