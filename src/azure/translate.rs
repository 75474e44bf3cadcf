// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Endpoint normalization for the Azure two-tier record model.
//!
//! Desired endpoints arrive one-per-target: a weighted or geographic DNS
//! name shows up as several endpoints sharing one `dns_name`, each carrying
//! its own `weight` or `geo-code` annotation. Azure represents the same
//! thing as a single record set aliased to one traffic manager profile, so
//! before diffing, [`adjust_endpoints`] collapses each annotated group into
//! one endpoint whose provider-specific map tags every target with its
//! routing value.
//!
//! [`PlannedRecord`] is the typed view of a collapsed endpoint, built from
//! the provider-specific tags only at this boundary; the apply path works
//! on the variant, not on raw string maps.

use crate::azure::api::TrafficRoutingMethod;
use crate::dns_errors::ProfileError;
use crate::endpoint::{
    Endpoint, RecordType, GEO_CODE_WILDCARD, PROVIDER_SPECIFIC_GEO_CODE,
    PROVIDER_SPECIFIC_WEIGHT, ROUTING_POLICY_GEOGRAPHIC, ROUTING_POLICY_KEY,
    ROUTING_POLICY_WEIGHTED,
};
use std::collections::BTreeMap;
use tracing::debug;

/// One physical target of a routing-policy record, with its geo code or
/// weight already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTarget {
    /// Target value (IP or hostname).
    pub value: String,
    /// Geo code for geographic profiles, decimal weight for weighted ones.
    pub routing_value: String,
}

/// Typed classification of an endpoint headed for the apply path.
#[derive(Debug, Clone)]
pub enum PlannedRecord {
    /// An ordinary record set, written directly to the zone.
    Plain,

    /// A record served through a traffic manager profile.
    Policy {
        /// Routing method of the profile to reconcile.
        method: TrafficRoutingMethod,
        /// Targets that carried a routing value.
        targets: Vec<PolicyTarget>,
        /// Per-target failures for targets missing their routing value;
        /// the applier logs these and proceeds with the rest.
        skipped: Vec<ProfileError>,
    },
}

/// Classifies an endpoint as plain or routing-policy backed.
///
/// TXT records never take the policy branch even when tagged: the
/// ownership TXT record of a policy group shares its tags but must remain
/// an ordinary record.
///
/// # Errors
///
/// Returns [`ProfileError::UnknownRoutingPolicy`] when the tag value names
/// neither the geographic nor the weighted method.
pub fn classify(endpoint: &Endpoint) -> Result<PlannedRecord, ProfileError> {
    let Some(policy) = endpoint.routing_policy() else {
        return Ok(PlannedRecord::Plain);
    };
    if endpoint.record_type == RecordType::TXT {
        return Ok(PlannedRecord::Plain);
    }

    // The write path historically stored "weighted" while the read path
    // reproduces the ARM method name, so both spellings are accepted.
    let method = match policy {
        ROUTING_POLICY_GEOGRAPHIC => TrafficRoutingMethod::Geographic,
        "weighted" | "Weighted" => TrafficRoutingMethod::Weighted,
        other => {
            return Err(ProfileError::UnknownRoutingPolicy {
                value: other.to_string(),
                dns_name: endpoint.dns_name.clone(),
            })
        }
    };

    let mut targets = Vec::new();
    let mut skipped = Vec::new();
    for target in &endpoint.targets {
        match endpoint.get_provider_specific(target) {
            Some(routing_value) => targets.push(PolicyTarget {
                value: target.clone(),
                routing_value: routing_value.to_string(),
            }),
            None => skipped.push(ProfileError::MissingRoutingValue {
                target: target.clone(),
                dns_name: endpoint.dns_name.clone(),
            }),
        }
    }

    Ok(PlannedRecord::Policy {
        method,
        targets,
        skipped,
    })
}

/// Collapses same-name endpoint groups carrying weight or geo annotations
/// into single routing-policy endpoints; all other groups pass through as
/// their first member.
///
/// A set of endpoints belonging to the same group (`dns_name`) must always
/// be of the same type and have the same TTL, so group-wide metadata is
/// taken from the first member without validation. Duplicate names in a
/// non-policy group beyond the first are dropped, and duplicate targets in
/// a policy group are not deduplicated; both are documented simplifications.
#[must_use]
pub fn adjust_endpoints(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    let mut groups: BTreeMap<String, Vec<Endpoint>> = BTreeMap::new();
    for ep in endpoints {
        groups.entry(ep.dns_name.clone()).or_default().push(ep);
    }

    let mut translated = Vec::new();
    for (dns_name, group) in groups {
        let first = &group[0];
        let is_weighted = first.get_provider_specific(PROVIDER_SPECIFIC_WEIGHT).is_some();
        let is_geo = first.get_provider_specific(PROVIDER_SPECIFIC_GEO_CODE).is_some();

        if !is_geo && !is_weighted {
            if group.len() > 1 {
                debug!(
                    dns_name = %dns_name,
                    dropped = group.len() - 1,
                    "multiple endpoints share a name without routing annotations, keeping the first"
                );
            }
            translated.extend(group.into_iter().next());
            continue;
        }

        let mut collapsed =
            Endpoint::new_with_ttl(dns_name, first.record_type, first.record_ttl, Vec::new());
        collapsed.set_provider_specific(
            ROUTING_POLICY_KEY,
            if is_geo {
                ROUTING_POLICY_GEOGRAPHIC
            } else {
                ROUTING_POLICY_WEIGHTED
            },
        );

        for ep in &group {
            for target in &ep.targets {
                if is_geo {
                    let geo = ep
                        .get_provider_specific(PROVIDER_SPECIFIC_GEO_CODE)
                        .unwrap_or_default();
                    // "*" means "no explicit geo"; such targets cannot be
                    // part of a geographic overlay.
                    if geo == GEO_CODE_WILDCARD {
                        continue;
                    }
                    collapsed.set_provider_specific(target.clone(), geo);
                } else {
                    let weight = ep
                        .get_provider_specific(PROVIDER_SPECIFIC_WEIGHT)
                        .unwrap_or_default();
                    collapsed.set_provider_specific(target.clone(), weight);
                }
                collapsed.targets.push(target.clone());
            }
        }

        translated.push(collapsed);
    }

    translated
}
