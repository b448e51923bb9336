// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin catalog lookups (WordPress.org plugin information API).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wf_core::PluginSlug;

/// Default WordPress.org plugin information endpoint
pub const WORDPRESS_CATALOG_URL: &str = "https://api.wordpress.org/plugins/info/1.2/";

/// Errors from catalog lookups
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("plugin '{0}' not found in catalog")]
    NotFound(String),

    #[error("plugin catalog unavailable: {0}")]
    Unavailable(String),
}

/// Catalog metadata for a plugin. Only the fields the supervisor logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Adapter for resolving plugin slugs against an external catalog
#[async_trait]
pub trait CatalogAdapter: Clone + Send + Sync + 'static {
    /// Look up a plugin. `NotFound` means the catalog answered and does not
    /// know the slug; `Unavailable` means it could not answer.
    async fn lookup(&self, slug: &PluginSlug) -> Result<PluginInfo, CatalogError>;
}

/// Catalog backed by the WordPress.org plugin information API (v1.2)
#[derive(Clone)]
pub struct WordPressCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl WordPressCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("http client: {}", e)))?;
        Ok(Self { client, base_url: base_url.into() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogAdapter for WordPressCatalog {
    async fn lookup(&self, slug: &PluginSlug) -> Result<PluginInfo, CatalogError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("action", "plugin_information"), ("request[slug]", slug.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(slug.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Unavailable(format!("catalog returned HTTP {}", status)));
        }

        let body = response.text().await.map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        parse_plugin_info(slug, &body)
    }
}

/// Interpret a successful plugin information response body.
///
/// The API reports unknown plugins either with HTTP 404 or with a 200 body of
/// the form `{"error": "Plugin not found."}`; older deployments return `null`.
pub fn parse_plugin_info(slug: &PluginSlug, body: &str) -> Result<PluginInfo, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| CatalogError::Unavailable(format!("malformed catalog response: {}", e)))?;

    if value.is_null() || value.get("error").is_some() {
        return Err(CatalogError::NotFound(slug.to_string()));
    }
    if !value.is_object() {
        return Err(CatalogError::Unavailable("catalog response is not an object".to_string()));
    }

    let mut info: PluginInfo = serde_json::from_value(value).unwrap_or_else(|_| PluginInfo {
        slug: slug.to_string(),
        name: String::new(),
        version: None,
    });
    if info.slug.is_empty() {
        info.slug = slug.to_string();
    }
    Ok(info)
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CatalogAdapter, CatalogError, PluginInfo};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use wf_core::PluginSlug;

    struct FakeCatalogState {
        known: HashSet<String>,
        unavailable: bool,
        delay: Option<Duration>,
        lookups: Vec<String>,
    }

    /// Fake catalog for testing. Knows exactly the slugs it was given.
    #[derive(Clone)]
    pub struct FakeCatalog {
        inner: Arc<Mutex<FakeCatalogState>>,
    }

    impl FakeCatalog {
        pub fn with_plugins(slugs: &[&str]) -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeCatalogState {
                    known: slugs.iter().map(|s| s.to_string()).collect(),
                    unavailable: false,
                    delay: None,
                    lookups: Vec::new(),
                })),
            }
        }

        /// Make every lookup fail with `Unavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.inner.lock().unavailable = unavailable;
        }

        /// Delay every lookup, to widen race windows or trip timeouts
        pub fn set_delay(&self, delay: Duration) {
            self.inner.lock().delay = Some(delay);
        }

        /// Slugs looked up so far, in call order
        pub fn lookups(&self) -> Vec<String> {
            self.inner.lock().lookups.clone()
        }
    }

    #[async_trait]
    impl CatalogAdapter for FakeCatalog {
        async fn lookup(&self, slug: &PluginSlug) -> Result<PluginInfo, CatalogError> {
            let delay = {
                let mut inner = self.inner.lock();
                inner.lookups.push(slug.to_string());
                inner.delay
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let inner = self.inner.lock();
            if inner.unavailable {
                return Err(CatalogError::Unavailable("fake catalog offline".to_string()));
            }
            if inner.known.contains(slug.as_str()) {
                Ok(PluginInfo {
                    slug: slug.to_string(),
                    name: slug.to_string(),
                    version: Some("1.0.0".to_string()),
                })
            } else {
                Err(CatalogError::NotFound(slug.to_string()))
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeCatalog;

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
