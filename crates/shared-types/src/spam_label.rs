// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Spam/ham label types

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Binary classification label produced by the text classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpamLabel {
    /// Unsolicited or malicious message
    Spam,
    /// Legitimate message
    Ham,
}

/// Error returned when a class name cannot be mapped to a [`SpamLabel`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown spam label '{0}', expected 'spam' or 'ham'")]
pub struct UnknownLabel(pub String);

impl SpamLabel {
    /// Check if the label represents spam
    pub fn is_spam(self) -> bool {
        matches!(self, SpamLabel::Spam)
    }

    /// Check if the label represents a legitimate message
    pub fn is_ham(self) -> bool {
        matches!(self, SpamLabel::Ham)
    }

    /// Canonical lowercase name, as stored and as used by classifier artifacts
    pub fn as_str(self) -> &'static str {
        match self {
            SpamLabel::Spam => "spam",
            SpamLabel::Ham => "ham",
        }
    }
}

impl fmt::Display for SpamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpamLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spam" => Ok(SpamLabel::Spam),
            "ham" => Ok(SpamLabel::Ham),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_boolean_checks() {
        assert!(SpamLabel::Spam.is_spam());
        assert!(!SpamLabel::Spam.is_ham());
        assert!(SpamLabel::Ham.is_ham());
        assert!(!SpamLabel::Ham.is_spam());
    }

    #[test]
    fn parse_class_names() {
        assert_eq!("spam".parse::<SpamLabel>(), Ok(SpamLabel::Spam));
        assert_eq!("HAM".parse::<SpamLabel>(), Ok(SpamLabel::Ham));
        assert_eq!(" Spam ".parse::<SpamLabel>(), Ok(SpamLabel::Spam));
        assert_eq!(
            "legitimate".parse::<SpamLabel>(),
            Err(UnknownLabel("legitimate".to_string()))
        );
    }

    #[test]
    fn serde_serialization() {
        let serialized = serde_json::to_string(&SpamLabel::Spam).unwrap();
        assert_eq!(serialized, "\"spam\"");

        let deserialized: SpamLabel = serde_json::from_str("\"ham\"").unwrap();
        assert_eq!(deserialized, SpamLabel::Ham);
    }

    #[test]
    fn display_matches_storage_name() {
        assert_eq!(SpamLabel::Spam.to_string(), "spam");
        assert_eq!(SpamLabel::Ham.to_string(), SpamLabel::Ham.as_str());
    }
}
