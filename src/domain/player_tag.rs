//! Normalized external player tag.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AnalyticsError;

/// A player's external identifier, always `#`-prefixed and upper-case.
///
/// Tags arrive from users without the `#` (it is awkward in URLs) and in
/// mixed case; [`PlayerTag::parse`] folds both forms onto the canonical one
/// so that storage lookups and roster matching agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PlayerTag(String);

impl PlayerTag {
    /// Parses and normalizes user input.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidTag`] if the tag is empty or contains
    /// anything other than ASCII alphanumerics after the optional `#`.
    pub fn parse(raw: &str) -> Result<Self, AnalyticsError> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AnalyticsError::InvalidTag(raw.to_string()));
        }
        Ok(Self(format!("#{}", body.to_ascii_uppercase())))
    }

    /// Wraps a tag read back from storage or the external API without
    /// validation, applying the same case and prefix normalization.
    #[must_use]
    pub fn from_trusted(raw: &str) -> Self {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('#').unwrap_or(trimmed);
        Self(format!("#{}", body.to_ascii_uppercase()))
    }

    /// Returns the canonical `#TAG` form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `other` denotes the same player.
    ///
    /// Comparison ignores ASCII case and a missing `#`, which is how tags
    /// appear inconsistently across battle log rosters.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        let other = other.trim();
        let other = other.strip_prefix('#').unwrap_or(other);
        self.0
            .strip_prefix('#')
            .is_some_and(|body| body.eq_ignore_ascii_case(other))
    }
}

impl fmt::Display for PlayerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
