// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Traffic manager profile expansion and construction.
//!
//! A DNS record using routing policy is stored in Azure as an alias record
//! whose target resource is a traffic manager profile; the profile holds
//! the physical targets and their routing values. This module translates
//! in both directions: [`expand_profile`] turns a fetched profile back into
//! a normalized endpoint (read path), [`build_profile`] constructs the
//! profile resource the applier writes (write path).

use crate::azure::api::{
    MonitorConfig, ProfileDnsConfig, ProfileEndpoint, ProfileEndpointProperties,
    ProfileProperties, RecordSet, TrafficManagerProfile, TrafficRoutingMethod,
    EXTERNAL_ENDPOINT_TYPE,
};
use crate::azure::records::record_type_suffix;
use crate::azure::translate::PolicyTarget;
use crate::endpoint::{Endpoint, RecordType, ROUTING_POLICY_KEY};
use std::str::FromStr;
use tracing::{debug, error};

/// Fixed configuration applied to every reconciled profile.
///
/// These values are not tunable per endpoint; alternate profile shapes are
/// added by constructing different defaults, not by touching the apply
/// logic.
#[derive(Debug, Clone)]
pub struct ProfileDefaults {
    /// TTL of the profile's own DNS config.
    pub dns_ttl: i64,
    /// Health-probe path.
    pub monitor_path: String,
    /// Health-probe port.
    pub monitor_port: i64,
    /// Health-probe protocol.
    pub monitor_protocol: String,
    /// ARM location; traffic manager profiles are global.
    pub location: String,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        ProfileDefaults {
            dns_ttl: 60,
            monitor_path: "/".to_string(),
            monitor_port: 80,
            monitor_protocol: "HTTP".to_string(),
            location: "global".to_string(),
        }
    }
}

/// Derives the deterministic profile name for a routing-policy DNS name.
///
/// The profile is scoped by resource group, with the dots of the DNS name
/// normalized to dashes.
#[must_use]
pub fn profile_name_for(resource_group: &str, dns_name: &str) -> String {
    format!("{resource_group}-{}", dns_name.replace('.', "-"))
}

/// Extracts the profile name from an alias record's target resource ID
/// (the trailing path segment).
#[must_use]
pub fn profile_name_from_target_resource(resource_id: &str) -> &str {
    resource_id.rsplit('/').next().unwrap_or(resource_id)
}

/// Expands a fetched profile into one endpoint per read pass.
///
/// The endpoint's name is the alias record set's FQDN, its type the record
/// set's vendor type suffix, and its targets the profile's endpoint
/// targets. `routingpolicy` is set once on the endpoint; each target is
/// additionally tagged (keyed by its own value) with its first geo-mapping
/// entry for geographic profiles or its weight for weighted ones.
///
/// Returns `None` when the record set carries no target resource or the
/// pieces needed to build an endpoint are absent.
#[must_use]
pub fn expand_profile(record_set: &RecordSet, profile: &TrafficManagerProfile) -> Option<Endpoint> {
    record_set.properties.target_resource.as_ref()?;

    let fqdn = record_set.properties.fqdn.as_ref()?;
    let full_type = record_set.record_type.as_ref()?;
    let record_type = RecordType::from_str(record_type_suffix(full_type)).ok()?;
    let ttl = record_set.properties.ttl.unwrap_or(0);

    let properties = profile.properties.as_ref()?;
    let method = properties.traffic_routing_method?;

    let mut ep = Endpoint::new_with_ttl(
        fqdn.trim_end_matches('.'),
        record_type,
        ttl,
        Vec::new(),
    );
    ep.set_provider_specific(ROUTING_POLICY_KEY, method.as_str());

    for profile_endpoint in properties.endpoints.iter().flatten() {
        let Some(target) = profile_endpoint
            .properties
            .as_ref()
            .and_then(|p| p.target.clone())
        else {
            continue;
        };
        let props = profile_endpoint.properties.as_ref();
        let routing_value = match method {
            TrafficRoutingMethod::Geographic => props
                .and_then(|p| p.geo_mapping.as_ref())
                .and_then(|g| g.first())
                .cloned(),
            TrafficRoutingMethod::Weighted => {
                props.and_then(|p| p.weight).map(|w| w.to_string())
            }
        };
        match routing_value {
            Some(value) => ep.set_provider_specific(target.clone(), value),
            None => debug!(
                target = %target,
                profile = profile.name.as_deref().unwrap_or_default(),
                "profile endpoint has no routing value for its method"
            ),
        }
        ep.targets.push(target);
    }

    debug!(endpoint = %ep, "built endpoint from traffic manager profile");
    Some(ep)
}

/// Constructs the profile resource for a routing-policy endpoint.
///
/// Weighted targets whose routing value is not a decimal weight are logged
/// and dropped, consistent with the per-target skip policy of the applier.
#[must_use]
pub fn build_profile(
    profile_name: &str,
    method: TrafficRoutingMethod,
    targets: &[PolicyTarget],
    defaults: &ProfileDefaults,
) -> TrafficManagerProfile {
    let mut endpoints = Vec::new();
    for target in targets {
        let mut properties = ProfileEndpointProperties {
            target: Some(target.value.clone()),
            always_serve: Some("Enabled".to_string()),
            ..ProfileEndpointProperties::default()
        };
        match method {
            TrafficRoutingMethod::Geographic => {
                properties.geo_mapping = Some(vec![target.routing_value.clone()]);
            }
            TrafficRoutingMethod::Weighted => match target.routing_value.parse::<i64>() {
                Ok(weight) => properties.weight = Some(weight),
                Err(_) => {
                    error!(
                        target = %target.value,
                        weight = %target.routing_value,
                        profile = %profile_name,
                        "weight is not a decimal integer, dropping target from profile"
                    );
                    continue;
                }
            },
        }
        endpoints.push(ProfileEndpoint {
            endpoint_type: Some(EXTERNAL_ENDPOINT_TYPE.to_string()),
            name: Some(target.value.replace('.', "-")),
            properties: Some(properties),
            ..ProfileEndpoint::default()
        });
    }

    TrafficManagerProfile {
        location: Some(defaults.location.clone()),
        properties: Some(ProfileProperties {
            traffic_routing_method: Some(method),
            endpoints: Some(endpoints),
            dns_config: Some(ProfileDnsConfig {
                relative_name: Some(profile_name.to_string()),
                ttl: Some(defaults.dns_ttl),
                fqdn: None,
            }),
            monitor_config: Some(MonitorConfig {
                path: Some(defaults.monitor_path.clone()),
                port: Some(defaults.monitor_port),
                protocol: Some(defaults.monitor_protocol.clone()),
            }),
        }),
        ..TrafficManagerProfile::default()
    }
}
