// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Azure Resource Manager wire types and API seams.
//!
//! The structs here mirror the JSON shapes of the ARM DNS
//! (`Microsoft.Network/dnszones`) and Traffic Manager
//! (`Microsoft.Network/trafficManagerProfiles`) resource APIs. Every field
//! the provider does not touch is optional and defaulted, so partial
//! responses deserialize cleanly.
//!
//! [`DnsApi`] and [`TrafficManagerApi`] are the seams between the provider
//! core and the HTTP client; tests substitute in-memory implementations.

use crate::dns_errors::AzureApiError;
use crate::endpoint::RecordType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type prefix ARM puts on DNS record-set resources.
pub const RECORD_SET_TYPE_PREFIX: &str = "Microsoft.Network/dnszones/";

/// Resource type of an external traffic manager endpoint.
pub const EXTERNAL_ENDPOINT_TYPE: &str = "Microsoft.Network/trafficManagerProfiles/externalEndpoints";

/// A DNS zone resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Zone {
    /// Full ARM resource ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Zone name (e.g. `example.com`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ZoneProperties>,
}

/// Zone metadata reported by ARM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_servers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_record_sets: Option<i64>,
}

/// A DNS record set resource.
///
/// `name` and `type` are optional because ARM has been observed to return
/// entries without them; the record reader treats those as invalid and
/// skips them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Relative record-set name (`@` for the zone apex).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Full ARM type, e.g. `Microsoft.Network/dnszones/A`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    pub properties: RecordSetProperties,
}

/// Record data for all supported record types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordSetProperties {
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    /// Fully-qualified name, as reported by ARM (with trailing dot).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    /// Alias target; set instead of inline values when the record points
    /// at another Azure resource such as a traffic manager profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_resource: Option<SubResource>,
    #[serde(rename = "ARecords", skip_serializing_if = "Option::is_none")]
    pub a_records: Option<Vec<ARecord>>,
    #[serde(rename = "AAAARecords", skip_serializing_if = "Option::is_none")]
    pub aaaa_records: Option<Vec<AaaaRecord>>,
    #[serde(rename = "CNAMERecord", skip_serializing_if = "Option::is_none")]
    pub cname_record: Option<CnameRecord>,
    #[serde(rename = "MXRecords", skip_serializing_if = "Option::is_none")]
    pub mx_records: Option<Vec<MxRecord>>,
    #[serde(rename = "NSRecords", skip_serializing_if = "Option::is_none")]
    pub ns_records: Option<Vec<NsRecord>>,
    #[serde(rename = "TXTRecords", skip_serializing_if = "Option::is_none")]
    pub txt_records: Option<Vec<TxtRecord>>,
    #[serde(rename = "SRVRecords", skip_serializing_if = "Option::is_none")]
    pub srv_records: Option<Vec<SrvRecord>>,
    #[serde(rename = "PTRRecords", skip_serializing_if = "Option::is_none")]
    pub ptr_records: Option<Vec<PtrRecord>>,
}

/// Reference to another ARM resource by ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ARecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AaaaRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CnameRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MxRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsdname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxtRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrvRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PtrRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptrdname: Option<String>,
}

/// Traffic routing method of a traffic manager profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficRoutingMethod {
    Geographic,
    Weighted,
}

impl TrafficRoutingMethod {
    /// Method name as ARM spells it.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficRoutingMethod::Geographic => "Geographic",
            TrafficRoutingMethod::Weighted => "Weighted",
        }
    }
}

impl fmt::Display for TrafficRoutingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A traffic manager profile resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficManagerProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Traffic manager profiles are global resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ProfileProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_routing_method: Option<TrafficRoutingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_config: Option<ProfileDnsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_config: Option<MonitorConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<ProfileEndpoint>>,
}

/// DNS exposure of a profile: relative name and TTL of the generated
/// `<relativeName>.trafficmanager.net` record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDnsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
}

/// Health-probe settings of a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// One physical target of a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileEndpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ProfileEndpointProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileEndpointProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Relative weight, used by weighted profiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    /// Geographic codes, used by geographic profiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_mapping: Option<Vec<String>>,
    /// `Enabled` keeps the endpoint serving even when probes fail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_serve: Option<String>,
}

/// DNS zone and record-set operations consumed by the provider core.
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// Lists all DNS zones in the configured resource group.
    async fn list_zones(&self) -> Result<Vec<Zone>, AzureApiError>;

    /// Lists every record set in a zone, following pagination to the end.
    async fn list_record_sets(&self, zone: &str) -> Result<Vec<RecordSet>, AzureApiError>;

    /// Creates or replaces a record set. Never an incremental patch.
    async fn create_or_update_record_set(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        record_set: RecordSet,
    ) -> Result<RecordSet, AzureApiError>;

    /// Deletes a record set.
    async fn delete_record_set(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<(), AzureApiError>;
}

/// Traffic manager profile operations consumed by the provider core.
#[async_trait]
pub trait TrafficManagerApi: Send + Sync {
    /// Fetches a profile by name within the configured resource group.
    async fn get_profile(&self, name: &str) -> Result<TrafficManagerProfile, AzureApiError>;

    /// Creates or replaces a profile. Never an incremental patch.
    async fn create_or_update_profile(
        &self,
        name: &str,
        profile: TrafficManagerProfile,
    ) -> Result<TrafficManagerProfile, AzureApiError>;
}
