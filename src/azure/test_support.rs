// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory implementations of the API seams for unit tests.
//!
//! The mocks record every mutating call so tests can assert on exactly
//! which vendor operations were (or were not) issued, and can be scripted
//! to fail specific record or profile names to exercise the best-effort
//! error policy.

use crate::azure::api::{
    DnsApi, RecordSet, TrafficManagerApi, TrafficManagerProfile, Zone, ZoneProperties,
};
use crate::dns_errors::AzureApiError;
use crate::endpoint::RecordType;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A recorded DNS mutation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DnsCall {
    Delete {
        zone: String,
        name: String,
        record_type: RecordType,
    },
    Update {
        zone: String,
        name: String,
        record_type: RecordType,
        record_set: RecordSet,
    },
}

/// A recorded traffic manager call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TmCall {
    Get { name: String },
    Update {
        name: String,
        profile: TrafficManagerProfile,
    },
}

#[derive(Default)]
pub(crate) struct MockDnsApi {
    pub zones: Vec<Zone>,
    pub record_sets: HashMap<String, Vec<RecordSet>>,
    /// Record names whose delete call fails.
    pub fail_delete: HashSet<String>,
    /// Record names whose update call fails.
    pub fail_update: HashSet<String>,
    pub calls: Mutex<Vec<DnsCall>>,
}

impl MockDnsApi {
    pub(crate) fn with_zone(zone_name: &str, record_sets: Vec<RecordSet>) -> Self {
        let mut mock = MockDnsApi::default();
        mock.zones.push(make_zone(zone_name));
        mock.record_sets.insert(zone_name.to_string(), record_sets);
        mock
    }

    pub(crate) fn recorded_calls(&self) -> Vec<DnsCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn failed(operation: &str) -> AzureApiError {
    AzureApiError::Api {
        operation: operation.to_string(),
        status: 500,
        message: "scripted failure".to_string(),
    }
}

#[async_trait]
impl DnsApi for MockDnsApi {
    async fn list_zones(&self) -> Result<Vec<Zone>, AzureApiError> {
        Ok(self.zones.clone())
    }

    async fn list_record_sets(&self, zone: &str) -> Result<Vec<RecordSet>, AzureApiError> {
        Ok(self.record_sets.get(zone).cloned().unwrap_or_default())
    }

    async fn create_or_update_record_set(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        record_set: RecordSet,
    ) -> Result<RecordSet, AzureApiError> {
        if self.fail_update.contains(name) {
            return Err(failed("CreateOrUpdateRecordSet"));
        }
        self.calls.lock().unwrap().push(DnsCall::Update {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type,
            record_set: record_set.clone(),
        });
        Ok(record_set)
    }

    async fn delete_record_set(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<(), AzureApiError> {
        if self.fail_delete.contains(name) {
            return Err(failed("DeleteRecordSet"));
        }
        self.calls.lock().unwrap().push(DnsCall::Delete {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type,
        });
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockTrafficManagerApi {
    pub profiles: HashMap<String, TrafficManagerProfile>,
    pub fail_get: bool,
    pub fail_update: bool,
    pub calls: Mutex<Vec<TmCall>>,
}

impl MockTrafficManagerApi {
    pub(crate) fn with_profile(name: &str, profile: TrafficManagerProfile) -> Self {
        let mut mock = MockTrafficManagerApi::default();
        mock.profiles.insert(name.to_string(), profile);
        mock
    }

    pub(crate) fn recorded_calls(&self) -> Vec<TmCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrafficManagerApi for MockTrafficManagerApi {
    async fn get_profile(&self, name: &str) -> Result<TrafficManagerProfile, AzureApiError> {
        if self.fail_get {
            return Err(failed("GetProfile"));
        }
        self.calls.lock().unwrap().push(TmCall::Get {
            name: name.to_string(),
        });
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| AzureApiError::Api {
                operation: "GetProfile".to_string(),
                status: 404,
                message: format!("profile {name} not found"),
            })
    }

    async fn create_or_update_profile(
        &self,
        name: &str,
        profile: TrafficManagerProfile,
    ) -> Result<TrafficManagerProfile, AzureApiError> {
        if self.fail_update {
            return Err(failed("CreateOrUpdateProfile"));
        }
        self.calls.lock().unwrap().push(TmCall::Update {
            name: name.to_string(),
            profile: profile.clone(),
        });
        let mut created = profile;
        created.id = Some(format!(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/trafficManagerProfiles/{name}"
        ));
        created.name = Some(name.to_string());
        Ok(created)
    }
}

/// Zone fixture with an ARM-shaped resource ID.
pub(crate) fn make_zone(name: &str) -> Zone {
    Zone {
        id: Some(format!(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/dnszones/{name}"
        )),
        name: Some(name.to_string()),
        properties: Some(ZoneProperties {
            name_servers: Some(vec!["ns1-01.azure-dns.com.".to_string()]),
            number_of_record_sets: Some(2),
        }),
    }
}
