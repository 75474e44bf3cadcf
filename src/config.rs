// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider configuration and filtering.
//!
//! The Azure provider is configured by an `azure.json` document, either read
//! from disk or carried in the `azure.json` key of a Kubernetes `Secret`.
//! The document is parsed as YAML (a superset of JSON), so both hand-written
//! YAML and the JSON emitted by cluster tooling are accepted.
//!
//! Runtime knobs that never appear in the credentials document (domain
//! filters, zone ID filters, dry-run) are plain struct fields filled in by
//! the caller after parsing.

use crate::dns_errors::ConfigError;
use k8s_openapi::api::core::v1::Secret;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Secret data key under which the credentials document is stored.
pub const CREDENTIALS_SECRET_KEY: &str = "azure.json";

/// Azure provider configuration.
///
/// Serialized fields mirror the `azure.json` layout used by the cluster
/// credential tooling; everything else is runtime-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureConfig {
    /// Azure cloud environment; empty means the public cloud.
    pub cloud: String,

    /// Azure AD tenant ID.
    pub tenant_id: String,

    /// Subscription holding the DNS zones and traffic manager profiles.
    pub subscription_id: String,

    /// Resource group holding the DNS zones and traffic manager profiles.
    pub resource_group: String,

    /// Service principal client ID.
    pub aad_client_id: String,

    /// Service principal client secret.
    pub aad_client_secret: String,

    /// Domain filter applied to endpoint names on read and before every
    /// mutation.
    #[serde(skip)]
    pub domain_filter: DomainFilter,

    /// Zone-name filter; when configured, the record reader additionally
    /// drops endpoints whose names fail the domain filter.
    #[serde(skip)]
    pub zone_name_filter: DomainFilter,

    /// Zone ID filter applied when listing zones.
    #[serde(skip)]
    pub id_filter: ZoneIdFilter,

    /// When `true`, the applier logs intended mutations and performs none.
    #[serde(skip)]
    pub dry_run: bool,
}

impl AzureConfig {
    /// Parses a credentials document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCredentials`] for an empty document and
    /// [`ConfigError::Parse`] for a malformed one.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Err(ConfigError::EmptyCredentials);
        }
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Reads and parses a credentials file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// the errors of [`AzureConfig::from_str`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_str(&contents)
    }

    /// Extracts and parses the credentials document from a Kubernetes
    /// `Secret`, as mounted by the cluster credential tooling.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SecretKeyMissing`] when the `azure.json` key
    /// is absent, otherwise the errors of [`AzureConfig::from_str`].
    pub fn from_secret(secret: &Secret) -> Result<Self, ConfigError> {
        let data = secret
            .data
            .as_ref()
            .and_then(|d| d.get(CREDENTIALS_SECRET_KEY))
            .ok_or(ConfigError::SecretKeyMissing {
                key: CREDENTIALS_SECRET_KEY.to_string(),
            })?;
        let contents = std::str::from_utf8(&data.0).map_err(|e| ConfigError::Parse {
            reason: format!("credentials are not valid UTF-8: {e}"),
        })?;
        Self::from_str(contents)
    }
}

/// Suffix-matching filter over fully-qualified DNS names.
///
/// An empty filter matches everything. Matching is case-insensitive and
/// ignores a trailing dot on the candidate name.
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    filters: Vec<String>,
}

impl DomainFilter {
    /// Builds a filter from domain suffixes (leading dots are stripped).
    #[must_use]
    pub fn new<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DomainFilter {
            filters: filters
                .into_iter()
                .map(|f| f.into().trim_start_matches('.').to_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }

    /// `true` when at least one suffix is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Returns `true` when `name` matches the filter (or no filter is set).
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        let name = name.trim_end_matches('.').to_lowercase();
        self.filters
            .iter()
            .any(|f| name == *f || name.ends_with(&format!(".{f}")))
    }
}

/// Filter over Azure zone resource IDs.
///
/// Matches by ID suffix so both bare zone names and full ARM resource paths
/// can be configured.
#[derive(Debug, Clone, Default)]
pub struct ZoneIdFilter {
    zone_ids: Vec<String>,
}

impl ZoneIdFilter {
    /// Builds a filter from zone IDs or ID suffixes.
    #[must_use]
    pub fn new<I, S>(zone_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ZoneIdFilter {
            zone_ids: zone_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` when `zone_id` matches the filter (or no filter is set).
    #[must_use]
    pub fn matches(&self, zone_id: &str) -> bool {
        if self.zone_ids.is_empty() {
            return true;
        }
        self.zone_ids.iter().any(|id| zone_id.ends_with(id))
    }
}
