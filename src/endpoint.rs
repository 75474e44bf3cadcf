// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Normalized DNS endpoint model.
//!
//! An [`Endpoint`] is the provider-neutral representation of a DNS record:
//! a fully-qualified name, a record type, a TTL, an ordered list of target
//! values, and a flat string map of provider-specific metadata. Routing
//! policy information (weighted or geographic traffic distribution) travels
//! exclusively through the provider-specific map, keyed by the constants in
//! this module.
//!
//! The [`ChangeSet`] consumed by [`crate::azure::AzureProvider::apply_changes`]
//! is produced by an external planning component; this crate only iterates
//! it, never mutates it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Provider-specific key carrying the routing policy of a collapsed
/// endpoint (`"Geographic"` or `"weighted"`).
pub const ROUTING_POLICY_KEY: &str = "routingpolicy";

/// Provider-specific key carrying the weight of a weighted endpoint.
pub const PROVIDER_SPECIFIC_WEIGHT: &str = "weight";

/// Provider-specific key carrying the geo code of a geographic endpoint.
pub const PROVIDER_SPECIFIC_GEO_CODE: &str = "geo-code";

/// Routing policy value emitted for geographic groups.
pub const ROUTING_POLICY_GEOGRAPHIC: &str = "Geographic";

/// Routing policy value emitted for weighted groups.
///
/// Lowercase for historical compatibility with the values stored in
/// existing endpoint annotations; the read path may also produce the
/// capitalized Azure method name `"Weighted"`.
pub const ROUTING_POLICY_WEIGHTED: &str = "weighted";

/// Geo code meaning "no explicit geo"; targets carrying it are excluded
/// from routing-policy overlays.
pub const GEO_CODE_WILDCARD: &str = "*";

/// DNS record types supported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    TXT,
    MX,
    NS,
    SRV,
    PTR,
}

impl RecordType {
    /// Record type name as it appears in DNS and in the Azure API
    /// (e.g. `"A"`, `"CNAME"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::TXT => "TXT",
            RecordType::MX => "MX",
            RecordType::NS => "NS",
            RecordType::SRV => "SRV",
            RecordType::PTR => "PTR",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "CNAME" => Ok(RecordType::CNAME),
            "TXT" => Ok(RecordType::TXT),
            "MX" => Ok(RecordType::MX),
            "NS" => Ok(RecordType::NS),
            "SRV" => Ok(RecordType::SRV),
            "PTR" => Ok(RecordType::PTR),
            other => Err(format!("unsupported record type: {other}")),
        }
    }
}

/// Returns `true` if `record_type` names a type this provider manages.
///
/// Used by the record reader to drop SOA, CAA and other unmanaged record
/// sets before endpoint construction.
#[must_use]
pub fn supported_record_type(record_type: &str) -> bool {
    RecordType::from_str(record_type).is_ok()
}

/// Normalized DNS record abstraction.
///
/// Endpoints are ephemeral: they are constructed fresh on every read or
/// translation pass and never cached across reconciliation cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully-qualified DNS name, case preserved as the provider returned it.
    pub dns_name: String,

    /// Record type of every target in this endpoint.
    pub record_type: RecordType,

    /// TTL in seconds; `0` means "use the provider default".
    #[serde(default, rename = "recordTTL")]
    pub record_ttl: i64,

    /// Record values. Order is insignificant except where the provider
    /// mandates a canonical pointer (CNAME).
    #[serde(default)]
    pub targets: Vec<String>,

    /// Provider-specific metadata. The sole channel for routing-policy
    /// information: [`ROUTING_POLICY_KEY`] plus one entry per target keyed
    /// by the target value itself.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provider_specific: BTreeMap<String, String>,
}

impl Endpoint {
    /// Creates an endpoint with the provider-default TTL.
    #[must_use]
    pub fn new<S: Into<String>>(dns_name: S, record_type: RecordType, targets: Vec<String>) -> Self {
        Self::new_with_ttl(dns_name, record_type, 0, targets)
    }

    /// Creates an endpoint with an explicit TTL.
    #[must_use]
    pub fn new_with_ttl<S: Into<String>>(
        dns_name: S,
        record_type: RecordType,
        record_ttl: i64,
        targets: Vec<String>,
    ) -> Self {
        Endpoint {
            dns_name: dns_name.into(),
            record_type,
            record_ttl,
            targets,
            provider_specific: BTreeMap::new(),
        }
    }

    /// Sets a provider-specific property, replacing any previous value.
    pub fn set_provider_specific<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.provider_specific.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`Endpoint::set_provider_specific`].
    #[must_use]
    pub fn with_provider_specific<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_provider_specific(key, value);
        self
    }

    /// Looks up a provider-specific property.
    #[must_use]
    pub fn get_provider_specific(&self, key: &str) -> Option<&str> {
        self.provider_specific.get(key).map(String::as_str)
    }

    /// Returns the routing policy tag, if any.
    #[must_use]
    pub fn routing_policy(&self) -> Option<&str> {
        self.get_provider_specific(ROUTING_POLICY_KEY)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} -> [{}]",
            self.dns_name,
            self.record_ttl,
            self.record_type,
            self.targets.join(",")
        )
    }
}

/// Endpoints to delete and to update within a single zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneChanges {
    /// Endpoints whose records should be removed from the zone.
    #[serde(default)]
    pub to_delete: Vec<Endpoint>,

    /// Endpoints whose records should be created or updated.
    #[serde(default)]
    pub to_update: Vec<Endpoint>,
}

impl ZoneChanges {
    /// `true` when the zone has neither deletions nor updates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_update.is_empty()
    }
}

/// Per-zone partition of planned endpoint changes, produced by the external
/// change-planning component. Keys are zone names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Changes keyed by zone name.
    #[serde(flatten)]
    pub zones: BTreeMap<String, ZoneChanges>,
}

impl ChangeSet {
    /// Total number of endpoints across all zones and both phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones
            .values()
            .map(|z| z.to_delete.len() + z.to_update.len())
            .sum()
    }

    /// `true` when no zone has any planned change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.values().all(ZoneChanges::is_empty)
    }
}
