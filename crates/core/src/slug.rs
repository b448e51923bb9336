// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WordPress plugin slugs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest slug accepted. WordPress.org caps plugin slugs well below this.
pub const MAX_SLUG_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("plugin slug is empty")]
    Empty,
    #[error("plugin slug is longer than {MAX_SLUG_LEN} characters")]
    TooLong,
    #[error("plugin slug contains invalid character {0:?}")]
    InvalidChar(char),
    #[error("plugin slug may not start with '.'")]
    LeadingDot,
}

/// Identifier of a WordPress plugin (e.g. `akismet`).
///
/// The slug names the run, the argument handed to the fuzz tool, and the stem
/// of the archived artifact, so it is restricted to `[a-z0-9._-]` and may not
/// start with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PluginSlug(String);

impl PluginSlug {
    pub fn parse(raw: &str) -> Result<Self, SlugError> {
        if raw.is_empty() {
            return Err(SlugError::Empty);
        }
        if raw.len() > MAX_SLUG_LEN {
            return Err(SlugError::TooLong);
        }
        if raw.starts_with('.') {
            return Err(SlugError::LeadingDot);
        }
        if let Some(c) = raw
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')))
        {
            return Err(SlugError::InvalidChar(c));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the archived artifact for this slug
    pub fn artifact_file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for PluginSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PluginSlug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PluginSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PluginSlug {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PluginSlug {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for PluginSlug {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
