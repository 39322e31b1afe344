use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Issuing bank identifier, as used by the backend's provider codes
/// (e.g. "akbank", "garanti").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Display)]
#[serde(transparent)]
pub struct BankCode(String);

impl BankCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BankCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Payment provider record id on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(transparent)]
pub struct ProviderId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(transparent)]
pub struct ProductId(pub i64);
