//! npm registry lookups.
//!
//! Resolves a package name and version to the tarball URL published in the
//! version's manifest. Only the `{name}/{version}` manifest endpoint is used,
//! so the registry does the version resolution (including `latest`).

use std::time::Duration;

use reqwest::{Client, StatusCode};
use url::Url;

/// Default npm registry endpoint.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Environment variable for overriding the registry URL.
pub const REGISTRY_ENV: &str = "DRAY_REGISTRY";

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid registry URL {url}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch manifest for {name}")]
    Request {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Package {name}@{version} not found in registry")]
    NotFound { name: String, version: String },

    #[error("Registry returned {status} for {name}")]
    Status {
        name: String,
        status: StatusCode,
    },

    #[error("Manifest for {name}@{version} has no tarball URL")]
    MissingTarball { name: String, version: String },
}

/// Client for the npm registry manifest endpoints.
#[derive(Debug)]
pub struct Registry {
    base_url: Url,
    http: Client,
}

impl Registry {
    /// Create a registry client for the given base URL.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be constructed.
    pub fn new(base_url: &str) -> Result<Self, RegistryError> {
        let base_url = Url::parse(base_url).map_err(|source| RegistryError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("dray/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RegistryError::Client)?;

        Ok(Self { base_url, http })
    }

    /// Resolve the tarball URL for a package version.
    ///
    /// # Errors
    /// Returns an error if the manifest request fails, the package or version
    /// is unknown, or the manifest carries no tarball URL.
    pub async fn tarball_url(
        &self,
        name: &str,
        version: &str,
    ) -> Result<String, RegistryError> {
        // Scoped names keep their slash percent-encoded in the manifest path
        let encoded_name = name.replace('/', "%2F");
        let manifest_url = self
            .base_url
            .join(&format!("{encoded_name}/{version}"))
            .map_err(|source| RegistryError::BaseUrl {
                url: self.base_url.to_string(),
                source,
            })?;

        tracing::debug!(url = %manifest_url, "fetching package manifest");

        let response = self
            .http
            .get(manifest_url)
            .send()
            .await
            .map_err(|source| RegistryError::Request {
                name: name.to_string(),
                source,
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
                version: version.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(RegistryError::Status {
                name: name.to_string(),
                status: response.status(),
            });
        }

        let manifest: serde_json::Value =
            response
                .json()
                .await
                .map_err(|source| RegistryError::Request {
                    name: name.to_string(),
                    source,
                })?;

        manifest_tarball(&manifest)
            .map(ToString::to_string)
            .ok_or_else(|| RegistryError::MissingTarball {
                name: name.to_string(),
                version: version.to_string(),
            })
    }
}

/// Extract the tarball URL from a version manifest, if present.
#[must_use]
pub fn manifest_tarball(manifest: &serde_json::Value) -> Option<&str> {
    manifest.get("dist")?.get("tarball")?.as_str()
}
