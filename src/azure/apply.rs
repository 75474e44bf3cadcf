// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Best-effort application of planned endpoint changes.
//!
//! Two sequential phases per zone, deletions then updates, with no rollback
//! between them. Every vendor call is attempted exactly once; failures are
//! logged, recorded in the [`ApplyReport`], and never abort sibling
//! records. Dry-run mode produces the same decision trace through logs
//! without issuing a single mutation.

use crate::azure::api::{DnsApi, RecordSet, SubResource, TrafficManagerApi};
use crate::azure::records::{record_set_from_endpoint, record_set_name_for_zone};
use crate::azure::traffic_manager::{build_profile, profile_name_for, ProfileDefaults};
use crate::azure::translate::{classify, PlannedRecord};
use crate::config::AzureConfig;
use crate::dns_errors::{ProfileError, RecordError};
use crate::endpoint::{Endpoint, RecordType};
use tracing::{debug, error, info};

/// What the applier did (or would have done) to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Record-set deletion.
    Delete,
    /// Record-set create-or-update.
    UpdateRecord,
    /// Traffic manager profile create-or-update.
    UpdateProfile,
}

/// Outcome of one vendor operation.
#[derive(Debug, Clone)]
pub struct ChangeOutcome {
    /// Zone the operation targeted.
    pub zone: String,
    /// Fully-qualified endpoint name.
    pub dns_name: String,
    /// Operation kind.
    pub action: ChangeAction,
    /// Failure detail; `None` for successes (including dry-run traces).
    pub error: Option<String>,
}

/// Structured per-item result of an apply pass.
///
/// The public [`apply_changes`](super::AzureProvider::apply_changes)
/// contract still reports success on partial failure; the report exists so
/// callers and tests can observe what actually happened.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// Operations that completed (or were traced in dry-run mode).
    pub succeeded: Vec<ChangeOutcome>,
    /// Operations that failed and were skipped past.
    pub failed: Vec<ChangeOutcome>,
}

impl ApplyReport {
    fn success(&mut self, zone: &str, dns_name: &str, action: ChangeAction) {
        self.succeeded.push(ChangeOutcome {
            zone: zone.to_string(),
            dns_name: dns_name.to_string(),
            action,
            error: None,
        });
    }

    fn failure(&mut self, zone: &str, dns_name: &str, action: ChangeAction, error: String) {
        self.failed.push(ChangeOutcome {
            zone: zone.to_string(),
            dns_name: dns_name.to_string(),
            action,
            error: Some(error),
        });
    }
}

/// Phase 1: deletes the given endpoints' record sets from a zone.
///
/// Routing-policy endpoints (other than TXT ownership records) are not
/// deleted here: the record and its profile are left for the update phase
/// to reconcile, or for manual cleanup. The profile is never
/// garbage-collected automatically.
pub(super) async fn delete_records(
    dns: &dyn DnsApi,
    config: &AzureConfig,
    zone: &str,
    endpoints: &[Endpoint],
    report: &mut ApplyReport,
) {
    for ep in endpoints {
        if ep.routing_policy().is_some() && ep.record_type != RecordType::TXT {
            info!(endpoint = %ep, "leaving routing-policy endpoint for the update phase to reconcile");
            continue;
        }
        if !config.domain_filter.matches(&ep.dns_name) {
            debug!(record_name = %ep.dns_name, "skipping deletion of record filtered out by the domain filter");
            continue;
        }
        let name = record_set_name_for_zone(zone, &ep.dns_name);
        if config.dry_run {
            info!(record_type = %ep.record_type, record_name = %name, zone, "would delete record");
            report.success(zone, &ep.dns_name, ChangeAction::Delete);
            continue;
        }
        info!(record_type = %ep.record_type, record_name = %name, zone, "deleting record");
        match dns.delete_record_set(zone, &name, ep.record_type).await {
            Ok(()) => report.success(zone, &ep.dns_name, ChangeAction::Delete),
            Err(e) => {
                let err = RecordError::DeleteFailed {
                    name: name.clone(),
                    zone: zone.to_string(),
                    record_type: ep.record_type.to_string(),
                    reason: e.to_string(),
                };
                error!(error = %err, "failed to delete record");
                report.failure(zone, &ep.dns_name, ChangeAction::Delete, err.to_string());
            }
        }
    }
}

/// Phase 2: creates or updates the given endpoints' records in a zone.
///
/// Routing-policy endpoints are reconciled in two steps: the profile is
/// created or replaced, then a CNAME alias record is pointed at the
/// resulting profile ID. A failure at either step is logged and the loop
/// moves on to the next endpoint.
pub(super) async fn update_records(
    dns: &dyn DnsApi,
    traffic_manager: &dyn TrafficManagerApi,
    config: &AzureConfig,
    defaults: &ProfileDefaults,
    zone: &str,
    endpoints: &[Endpoint],
    report: &mut ApplyReport,
) {
    for ep in endpoints {
        if !config.domain_filter.matches(&ep.dns_name) {
            debug!(record_name = %ep.dns_name, "skipping update of record filtered out by the domain filter");
            continue;
        }
        match classify(ep) {
            Ok(PlannedRecord::Plain) => {
                update_plain_record(dns, config, zone, ep, report).await;
            }
            Ok(PlannedRecord::Policy {
                method,
                targets,
                skipped,
            }) => {
                for missing in &skipped {
                    error!(error = %missing, endpoint = %ep, "no routing value set for target");
                }
                let profile_name = profile_name_for(&config.resource_group, &ep.dns_name);
                if config.dry_run {
                    info!(
                        name = %profile_name,
                        method = %method,
                        targets = targets.len(),
                        "would update traffic manager profile"
                    );
                    report.success(zone, &ep.dns_name, ChangeAction::UpdateProfile);
                    continue;
                }

                info!(name = %profile_name, method = %method, endpoint = %ep, "updating traffic manager profile");
                let profile = build_profile(&profile_name, method, &targets, defaults);
                let created = match traffic_manager
                    .create_or_update_profile(&profile_name, profile)
                    .await
                {
                    Ok(created) => created,
                    Err(e) => {
                        let err = ProfileError::UpdateFailed {
                            profile: profile_name.clone(),
                            reason: e.to_string(),
                        };
                        error!(error = %err, "failed to update traffic manager profile");
                        report.failure(
                            zone,
                            &ep.dns_name,
                            ChangeAction::UpdateProfile,
                            err.to_string(),
                        );
                        continue;
                    }
                };
                report.success(zone, &ep.dns_name, ChangeAction::UpdateProfile);

                let name = record_set_name_for_zone(zone, &ep.dns_name);
                let record_set = RecordSet {
                    properties: crate::azure::api::RecordSetProperties {
                        ttl: Some(ep.record_ttl),
                        target_resource: Some(SubResource {
                            id: created.id.clone(),
                        }),
                        ..Default::default()
                    },
                    ..RecordSet::default()
                };
                info!(
                    record_name = %name,
                    profile_id = created.id.as_deref().unwrap_or_default(),
                    "updating record to use traffic manager profile"
                );
                match dns
                    .create_or_update_record_set(zone, &name, RecordType::CNAME, record_set)
                    .await
                {
                    Ok(_) => report.success(zone, &ep.dns_name, ChangeAction::UpdateRecord),
                    Err(e) => {
                        let err = RecordError::UpdateFailed {
                            name,
                            zone: zone.to_string(),
                            record_type: RecordType::CNAME.to_string(),
                            reason: e.to_string(),
                        };
                        error!(error = %err, "failed to update record");
                        report.failure(zone, &ep.dns_name, ChangeAction::UpdateRecord, err.to_string());
                    }
                }
            }
            Err(e) => {
                error!(error = %e, endpoint = %ep, "cannot classify endpoint for update");
                report.failure(zone, &ep.dns_name, ChangeAction::UpdateRecord, e.to_string());
            }
        }
    }
}

async fn update_plain_record(
    dns: &dyn DnsApi,
    config: &AzureConfig,
    zone: &str,
    ep: &Endpoint,
    report: &mut ApplyReport,
) {
    let name = record_set_name_for_zone(zone, &ep.dns_name);
    if config.dry_run {
        info!(
            record_type = %ep.record_type,
            record_name = %name,
            targets = ?ep.targets,
            zone,
            "would update record"
        );
        report.success(zone, &ep.dns_name, ChangeAction::UpdateRecord);
        return;
    }
    info!(
        record_type = %ep.record_type,
        record_name = %name,
        targets = ?ep.targets,
        zone,
        "updating record"
    );
    let record_set = match record_set_from_endpoint(ep) {
        Ok(record_set) => record_set,
        Err(e) => {
            error!(error = %e, "cannot encode endpoint as a record set");
            report.failure(zone, &ep.dns_name, ChangeAction::UpdateRecord, e.to_string());
            return;
        }
    };
    match dns
        .create_or_update_record_set(zone, &name, ep.record_type, record_set)
        .await
    {
        Ok(_) => report.success(zone, &ep.dns_name, ChangeAction::UpdateRecord),
        Err(e) => {
            let err = RecordError::UpdateFailed {
                name,
                zone: zone.to_string(),
                record_type: ep.record_type.to_string(),
                reason: e.to_string(),
            };
            error!(error = %err, "failed to update record");
            report.failure(zone, &ep.dns_name, ChangeAction::UpdateRecord, err.to_string());
        }
    }
}
