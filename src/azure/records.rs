// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record-set to endpoint translation (read path) and back (write path).
//!
//! The reader walks the raw record sets of a zone and produces normalized
//! [`Endpoint`]s for everything it can extract values from. Record sets
//! with no inline values are not an error: they are alias records pointing
//! at a traffic manager profile and are handed back to the caller for
//! expansion by [`super::traffic_manager`].

use crate::azure::api::{
    ARecord, AaaaRecord, CnameRecord, MxRecord, NsRecord, PtrRecord, RecordSet,
    RecordSetProperties, SrvRecord, TxtRecord, RECORD_SET_TYPE_PREFIX,
};
use crate::config::AzureConfig;
use crate::dns_errors::RecordError;
use crate::endpoint::{supported_record_type, Endpoint, RecordType};
use std::str::FromStr;
use tracing::{debug, error};

/// TTL written when an endpoint does not carry one.
pub const DEFAULT_RECORD_TTL: i64 = 300;

/// Builds the fully-qualified name of a record set within a zone.
///
/// ARM uses `@` for the zone apex.
#[must_use]
pub fn format_azure_dns_name(relative: &str, zone: &str) -> String {
    if relative == "@" {
        zone.to_string()
    } else {
        format!("{relative}.{zone}")
    }
}

/// Derives the relative record-set name for an endpoint within a zone.
///
/// The inverse of [`format_azure_dns_name`].
#[must_use]
pub fn record_set_name_for_zone(zone: &str, dns_name: &str) -> String {
    let name = dns_name.trim_end_matches('.');
    if name == zone {
        return "@".to_string();
    }
    name.strip_suffix(&format!(".{zone}"))
        .unwrap_or(name)
        .to_string()
}

/// Strips the ARM resource prefix from a record-set type, leaving the DNS
/// type (`Microsoft.Network/dnszones/A` -> `A`).
#[must_use]
pub fn record_type_suffix(full_type: &str) -> &str {
    full_type
        .strip_prefix(RECORD_SET_TYPE_PREFIX)
        .unwrap_or_else(|| full_type.rsplit('/').next().unwrap_or(full_type))
}

/// Extracts the record values of a record set, whatever its type.
///
/// An empty result is not an error: alias record sets carry a target
/// resource instead of inline values.
#[must_use]
pub fn extract_targets(record_set: &RecordSet) -> Vec<String> {
    let props = &record_set.properties;

    if let Some(a_records) = &props.a_records {
        return a_records
            .iter()
            .filter_map(|r| r.ipv4_address.clone())
            .collect();
    }
    if let Some(aaaa_records) = &props.aaaa_records {
        return aaaa_records
            .iter()
            .filter_map(|r| r.ipv6_address.clone())
            .collect();
    }
    if let Some(cname) = props.cname_record.as_ref().and_then(|r| r.cname.clone()) {
        return vec![cname];
    }
    if let Some(mx_records) = &props.mx_records {
        return mx_records
            .iter()
            .filter_map(|r| match (&r.preference, &r.exchange) {
                (Some(preference), Some(exchange)) => Some(format!("{preference} {exchange}")),
                _ => None,
            })
            .collect();
    }
    if let Some(ns_records) = &props.ns_records {
        return ns_records
            .iter()
            .filter_map(|r| r.nsdname.clone())
            .collect();
    }
    if let Some(txt_records) = &props.txt_records {
        // ARM models TXT as a list of value chunks; only the first chunk of
        // the first record is meaningful to the planner.
        if let Some(value) = txt_records
            .first()
            .and_then(|r| r.value.as_ref())
            .and_then(|v| v.first())
        {
            return vec![value.clone()];
        }
        return Vec::new();
    }
    if let Some(srv_records) = &props.srv_records {
        return srv_records
            .iter()
            .filter_map(|r| {
                match (&r.priority, &r.weight, &r.port, &r.target) {
                    (Some(priority), Some(weight), Some(port), Some(target)) => {
                        Some(format!("{priority} {weight} {port} {target}"))
                    }
                    _ => None,
                }
            })
            .collect();
    }
    if let Some(ptr_records) = &props.ptr_records {
        return ptr_records
            .iter()
            .filter_map(|r| r.ptrdname.clone())
            .collect();
    }
    Vec::new()
}

/// Walks the raw record sets of a zone, producing plain endpoints and the
/// alias record sets deferred for traffic manager expansion.
///
/// Invalid record sets (nil name or type) are logged and skipped, never
/// fatal. Unsupported types are dropped silently and names failing the
/// zone-name filter are debug-logged and dropped.
pub fn read_zone_records(
    zone: &str,
    record_sets: Vec<RecordSet>,
    config: &AzureConfig,
) -> (Vec<Endpoint>, Vec<RecordSet>) {
    let mut endpoints = Vec::new();
    let mut profile_candidates = Vec::new();

    for record_set in record_sets {
        let (Some(relative_name), Some(full_type)) = (&record_set.name, &record_set.record_type)
        else {
            error!(
                error = %RecordError::InvalidRecordSet { zone: zone.to_string() },
                "skipping invalid record set with nil name or type"
            );
            continue;
        };
        let record_type = record_type_suffix(full_type);
        if !supported_record_type(record_type) {
            continue;
        }
        let name = format_azure_dns_name(relative_name, zone);
        if config.zone_name_filter.is_configured() && !config.domain_filter.matches(&name) {
            debug!(record_name = %name, "skipping record filtered out by the domain filter");
            continue;
        }
        let targets = extract_targets(&record_set);
        if targets.is_empty() {
            debug!(
                record_name = %name,
                record_type,
                "record set has no inline values, queuing for traffic manager expansion"
            );
            profile_candidates.push(record_set);
            continue;
        }
        let ttl = record_set.properties.ttl.unwrap_or(0);
        let Ok(record_type) = RecordType::from_str(record_type) else {
            continue;
        };
        let ep = Endpoint::new_with_ttl(name, record_type, ttl, targets);
        debug!(
            record_type = %ep.record_type,
            dns_name = %ep.dns_name,
            targets = ?ep.targets,
            "found record set"
        );
        endpoints.push(ep);
    }

    (endpoints, profile_candidates)
}

/// Builds the ARM record-set representation of a plain endpoint.
///
/// The write-path inverse of [`extract_targets`]. Endpoints without a TTL
/// get [`DEFAULT_RECORD_TTL`].
///
/// # Errors
///
/// Returns [`RecordError::NoValues`] when the endpoint has no targets or
/// its targets cannot be encoded for the record type (malformed MX or SRV
/// values).
pub fn record_set_from_endpoint(endpoint: &Endpoint) -> Result<RecordSet, RecordError> {
    let no_values = || RecordError::NoValues {
        name: endpoint.dns_name.clone(),
        record_type: endpoint.record_type.to_string(),
    };
    if endpoint.targets.is_empty() {
        return Err(no_values());
    }

    let ttl = if endpoint.record_ttl > 0 {
        endpoint.record_ttl
    } else {
        DEFAULT_RECORD_TTL
    };
    let mut properties = RecordSetProperties {
        ttl: Some(ttl),
        ..RecordSetProperties::default()
    };

    match endpoint.record_type {
        RecordType::A => {
            properties.a_records = Some(
                endpoint
                    .targets
                    .iter()
                    .map(|t| ARecord {
                        ipv4_address: Some(t.clone()),
                    })
                    .collect(),
            );
        }
        RecordType::AAAA => {
            properties.aaaa_records = Some(
                endpoint
                    .targets
                    .iter()
                    .map(|t| AaaaRecord {
                        ipv6_address: Some(t.clone()),
                    })
                    .collect(),
            );
        }
        RecordType::CNAME => {
            properties.cname_record = Some(CnameRecord {
                cname: Some(endpoint.targets[0].clone()),
            });
        }
        RecordType::TXT => {
            properties.txt_records = Some(vec![TxtRecord {
                value: Some(vec![endpoint.targets[0].clone()]),
            }]);
        }
        RecordType::MX => {
            let records = endpoint
                .targets
                .iter()
                .map(|t| {
                    let mut parts = t.split_whitespace();
                    let preference = parts.next()?.parse::<i32>().ok()?;
                    let exchange = parts.next()?.to_string();
                    Some(MxRecord {
                        preference: Some(preference),
                        exchange: Some(exchange),
                    })
                })
                .collect::<Option<Vec<_>>>()
                .ok_or_else(no_values)?;
            properties.mx_records = Some(records);
        }
        RecordType::NS => {
            properties.ns_records = Some(
                endpoint
                    .targets
                    .iter()
                    .map(|t| NsRecord {
                        nsdname: Some(t.clone()),
                    })
                    .collect(),
            );
        }
        RecordType::SRV => {
            let records = endpoint
                .targets
                .iter()
                .map(|t| {
                    let mut parts = t.split_whitespace();
                    let priority = parts.next()?.parse::<i32>().ok()?;
                    let weight = parts.next()?.parse::<i32>().ok()?;
                    let port = parts.next()?.parse::<i32>().ok()?;
                    let target = parts.next()?.to_string();
                    Some(SrvRecord {
                        priority: Some(priority),
                        weight: Some(weight),
                        port: Some(port),
                        target: Some(target),
                    })
                })
                .collect::<Option<Vec<_>>>()
                .ok_or_else(no_values)?;
            properties.srv_records = Some(records);
        }
        RecordType::PTR => {
            properties.ptr_records = Some(
                endpoint
                    .targets
                    .iter()
                    .map(|t| PtrRecord {
                        ptrdname: Some(t.clone()),
                    })
                    .collect(),
            );
        }
    }

    Ok(RecordSet {
        properties,
        ..RecordSet::default()
    })
}
