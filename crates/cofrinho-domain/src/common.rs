//! Shared traits, identifiers, and policy enums for wallet entities.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in a wallet.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

pub type PlanId = Uuid;
pub type CardId = Uuid;

/// Identity of the authenticated owner a wallet is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Returns `None` when the identity is blank.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How parcel numbers outside a plan's range are surfaced to callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContractPolicy {
    /// Out-of-range parcels are reported as errors.
    Strict,
    /// Out-of-range parcels are logged and ignored.
    Lenient,
}

impl ContractPolicy {
    /// Strict in debug builds, lenient in release builds.
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            ContractPolicy::Strict
        } else {
            ContractPolicy::Lenient
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(ContractPolicy::Strict),
            "lenient" => Some(ContractPolicy::Lenient),
            _ => None,
        }
    }
}

impl Default for ContractPolicy {
    fn default() -> Self {
        Self::for_build()
    }
}

impl fmt::Display for ContractPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContractPolicy::Strict => "strict",
            ContractPolicy::Lenient => "lenient",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_rejects_blank_values() {
        assert!(OwnerId::new("   ").is_none());
        assert_eq!(OwnerId::new(" ana ").unwrap().as_str(), "ana");
    }

    #[test]
    fn contract_policy_parses_labels() {
        assert_eq!(ContractPolicy::parse("STRICT"), Some(ContractPolicy::Strict));
        assert_eq!(ContractPolicy::parse("lenient"), Some(ContractPolicy::Lenient));
        assert_eq!(ContractPolicy::parse("loud"), None);
    }
}
