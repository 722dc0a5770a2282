//! Package registry lookups.
//!
//! The packages plugin asks a [`RegistryClient`] for the published versions
//! of each public package. [`HttpRegistry`] talks to an npm-compatible
//! registry over HTTP; tests substitute their own client.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;

/// Registry data for one package.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryInfo {
    /// Version tagged `latest`.
    pub latest_version: Option<String>,
    /// Every published version, oldest first.
    pub published_versions: Vec<String>,
}

/// Registry lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("invalid registry response: {0}")]
    InvalidResponse(String),
}

/// Source of published package metadata.
pub trait RegistryClient: Send + Sync {
    /// Look up a package by name.
    fn lookup(&self, name: &str) -> Result<RegistryInfo, RegistryError>;
}

/// npm-compatible registry client.
///
/// Fetches `<base_url>/<name>` and reads the `dist-tags` and `versions`
/// fields of the packument.
#[derive(Debug)]
pub struct HttpRegistry {
    agent: Agent,
    base_url: String,
}

#[derive(Deserialize)]
struct Packument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
}

impl HttpRegistry {
    /// Create a client for `base_url` with a global request timeout.
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn package_url(&self, name: &str) -> String {
        // Scoped names keep the `@` but escape the separator.
        format!("{}/{}", self.base_url, name.replace('/', "%2F"))
    }
}

impl RegistryClient for HttpRegistry {
    fn lookup(&self, name: &str) -> Result<RegistryInfo, RegistryError> {
        let url = self.package_url(name);
        tracing::debug!(package = name, url = %url, "Registry lookup");

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| RegistryError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(RegistryError::Status { status, url });
        }

        let packument: Packument = response
            .into_body()
            .read_json()
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        Ok(packument.into_info())
    }
}

impl Packument {
    fn into_info(mut self) -> RegistryInfo {
        let mut published_versions: Vec<String> = self.versions.into_keys().collect();
        published_versions.sort_by(|a, b| compare_versions(a, b));

        RegistryInfo {
            latest_version: self.dist_tags.remove("latest"),
            published_versions,
        }
    }
}

/// Order versions by their numeric `major.minor.patch` parts, then by the
/// remaining text (pre-release suffixes sort before the release).
fn compare_versions(a: &str, b: &str) -> Ordering {
    fn split(version: &str) -> (Vec<u64>, &str) {
        let (core, suffix) = match version.find(['-', '+']) {
            Some(i) => version.split_at(i),
            None => (version, ""),
        };
        let numbers = core.split('.').map(|p| p.parse().unwrap_or(0)).collect();
        (numbers, suffix)
    }

    let (a_numbers, a_suffix) = split(a);
    let (b_numbers, b_suffix) = split(b);

    a_numbers.cmp(&b_numbers).then_with(|| match (a_suffix.is_empty(), b_suffix.is_empty()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a_suffix.cmp(b_suffix),
    })
}
