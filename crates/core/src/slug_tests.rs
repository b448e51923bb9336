// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[yare::parameterized(
    simple     = { "akismet" },
    dashed     = { "contact-form-7" },
    underscore = { "wp_super_cache" },
    dotted     = { "jetpack.beta" },
    digits     = { "404page" },
)]
fn accepts_valid_slugs(raw: &str) {
    assert_eq!(PluginSlug::parse(raw).unwrap().as_str(), raw);
}

#[yare::parameterized(
    empty       = { "",            SlugError::Empty },
    uppercase   = { "Akismet",     SlugError::InvalidChar('A') },
    slash       = { "../etc",      SlugError::LeadingDot },
    inner_slash = { "a/b",         SlugError::InvalidChar('/') },
    space       = { "hello world", SlugError::InvalidChar(' ') },
    hidden      = { ".git",        SlugError::LeadingDot },
)]
fn rejects_invalid_slugs(raw: &str, expected: SlugError) {
    assert_eq!(PluginSlug::parse(raw).unwrap_err(), expected);
}

#[test]
fn rejects_overlong_slug() {
    let raw = "a".repeat(MAX_SLUG_LEN + 1);
    assert_eq!(PluginSlug::parse(&raw).unwrap_err(), SlugError::TooLong);
}

#[test]
fn artifact_file_name_uses_slug_stem() {
    let slug = PluginSlug::parse("akismet").unwrap();
    assert_eq!(slug.artifact_file_name(), "akismet.json");
}

#[test]
fn deserialize_validates() {
    assert!(serde_json::from_str::<PluginSlug>("\"akismet\"").is_ok());
    assert!(serde_json::from_str::<PluginSlug>("\"a/b\"").is_err());
}

proptest! {
    #[test]
    fn parsed_slugs_never_escape_a_directory(raw in "\\PC{0,40}") {
        if let Ok(slug) = PluginSlug::parse(&raw) {
            prop_assert!(!slug.as_str().contains('/'));
            prop_assert!(!slug.as_str().starts_with('.'));
            prop_assert!(!slug.as_str().is_empty());
        }
    }
}
