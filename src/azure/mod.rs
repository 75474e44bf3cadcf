// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Azure DNS provider with traffic manager routing-policy support.
//!
//! The provider reconciles normalized [`Endpoint`]s against Azure DNS
//! zones. Plain records map one-to-one onto record sets; records carrying
//! routing policy map onto a two-tier model: an alias CNAME record set in
//! the zone pointing at a traffic manager profile that fans out to the
//! physical targets.
//!
//! # Module layout
//!
//! - [`api`] - ARM wire types and the `DnsApi` / `TrafficManagerApi` seams
//! - [`client`] - reqwest-based ARM REST client
//! - [`records`] - record-set/endpoint translation (Record Reader)
//! - [`traffic_manager`] - profile expansion and construction
//! - [`translate`] - endpoint normalization (policy-group collapse)
//! - [`apply`] - best-effort change application

pub mod api;
pub mod apply;
pub mod client;
pub mod records;
pub mod traffic_manager;
pub mod translate;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod apply_tests;

use crate::config::{AzureConfig, DomainFilter};
use crate::dns_errors::{AzureApiError, ProfileError};
use crate::endpoint::{ChangeSet, Endpoint};
use crate::provider::{ManagedZoneOutput, Provider};
use anyhow::{bail, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use std::sync::Arc;
use tracing::{debug, error, info};

use api::{DnsApi, RecordSet, TrafficManagerApi, Zone};
pub use apply::{ApplyReport, ChangeAction, ChangeOutcome};
use client::ArmClient;
pub use traffic_manager::ProfileDefaults;

/// Azure DNS provider.
///
/// Construction wires the ARM client; tests inject in-memory
/// implementations of the two API seams instead.
pub struct AzureProvider {
    config: AzureConfig,
    dns: Arc<dyn DnsApi>,
    traffic_manager: Arc<dyn TrafficManagerApi>,
    profile_defaults: ProfileDefaults,
}

impl AzureProvider {
    /// Creates a provider over explicit API implementations.
    #[must_use]
    pub fn new(
        config: AzureConfig,
        dns: Arc<dyn DnsApi>,
        traffic_manager: Arc<dyn TrafficManagerApi>,
    ) -> Self {
        AzureProvider {
            config,
            dns,
            traffic_manager,
            profile_defaults: ProfileDefaults::default(),
        }
    }

    /// Creates a provider talking to the real ARM endpoints.
    ///
    /// # Errors
    ///
    /// Fails when the ARM client cannot be constructed from the
    /// configuration.
    pub fn from_config(config: AzureConfig) -> Result<Self> {
        let client = Arc::new(ArmClient::new(&config)?);
        Ok(Self::new(config, client.clone(), client))
    }

    /// Creates a provider from the `azure.json` credentials carried in a
    /// Kubernetes `Secret`.
    ///
    /// Runtime knobs (filters, dry-run) are not part of the credentials
    /// document; set them on `overrides` before calling.
    ///
    /// # Errors
    ///
    /// Fails when the Secret lacks credentials, the credentials cannot be
    /// parsed, or the ARM client cannot be constructed.
    pub fn from_secret(secret: &Secret, overrides: AzureConfig) -> Result<Self> {
        let mut config = AzureConfig::from_secret(secret)?;
        config.domain_filter = overrides.domain_filter;
        config.zone_name_filter = overrides.zone_name_filter;
        config.id_filter = overrides.id_filter;
        config.dry_run = overrides.dry_run;
        Self::from_config(config)
    }

    /// Replaces the fixed profile configuration.
    #[must_use]
    pub fn with_profile_defaults(mut self, profile_defaults: ProfileDefaults) -> Self {
        self.profile_defaults = profile_defaults;
        self
    }

    /// Provider configuration, including filters and dry-run mode.
    #[must_use]
    pub fn config(&self) -> &AzureConfig {
        &self.config
    }

    /// Lists the zones this provider manages, after domain and zone-ID
    /// filtering.
    ///
    /// # Errors
    ///
    /// Propagates zone-listing failures; these are terminal for the pass.
    pub async fn zones(&self) -> Result<Vec<Zone>, AzureApiError> {
        let zones = self.dns.list_zones().await?;
        let filtered: Vec<Zone> = zones
            .into_iter()
            .filter(|zone| {
                let name_ok = zone
                    .name
                    .as_deref()
                    .is_some_and(|name| self.config.domain_filter.matches(name));
                let id_ok = zone
                    .id
                    .as_deref()
                    .is_some_and(|id| self.config.id_filter.matches(id));
                name_ok && id_ok
            })
            .collect();
        debug!(zones = filtered.len(), "listed matching DNS zones");
        Ok(filtered)
    }

    /// Reads the current record state of every managed zone.
    ///
    /// Record sets without inline values are resolved through their
    /// traffic manager profile; a failed profile lookup is logged and only
    /// skips that record set.
    ///
    /// # Errors
    ///
    /// Propagates zone and record-set listing failures.
    pub async fn records(&self) -> Result<Vec<Endpoint>, AzureApiError> {
        let zones = self.zones().await?;
        info!("getting records from azure");

        let mut endpoints = Vec::new();
        for zone in zones {
            let Some(zone_name) = zone.name.as_deref() else {
                continue;
            };
            let record_sets = self.dns.list_record_sets(zone_name).await?;
            let (mut zone_endpoints, profile_candidates) =
                records::read_zone_records(zone_name, record_sets, &self.config);
            endpoints.append(&mut zone_endpoints);

            for record_set in profile_candidates {
                match self.expand_pointer_record(&record_set).await {
                    Ok(Some(ep)) => endpoints.push(ep),
                    Ok(None) => {}
                    Err(e) => {
                        error!(
                            error = %e,
                            record_name = record_set.name.as_deref().unwrap_or_default(),
                            "error expanding traffic manager profile for record set"
                        );
                    }
                }
            }
        }

        Ok(endpoints)
    }

    /// Resolves the profile referenced by an alias record set and expands
    /// it into an endpoint. `None` when the record set has no target
    /// resource or nothing expandable.
    async fn expand_pointer_record(
        &self,
        record_set: &RecordSet,
    ) -> Result<Option<Endpoint>, ProfileError> {
        let Some(resource_id) = record_set
            .properties
            .target_resource
            .as_ref()
            .and_then(|r| r.id.as_deref())
        else {
            return Ok(None);
        };
        let profile_name = traffic_manager::profile_name_from_target_resource(resource_id);
        let profile = self
            .traffic_manager
            .get_profile(profile_name)
            .await
            .map_err(|e| ProfileError::LookupFailed {
                profile: profile_name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(traffic_manager::expand_profile(record_set, &profile))
    }

    /// Applies a change set and returns the structured per-item report.
    pub async fn apply_changes_with_report(&self, changes: &ChangeSet) -> ApplyReport {
        let mut report = ApplyReport::default();
        info!(
            zones = changes.zones.len(),
            endpoints = changes.len(),
            dry_run = self.config.dry_run,
            "applying changes"
        );
        for (zone, zone_changes) in &changes.zones {
            apply::delete_records(
                self.dns.as_ref(),
                &self.config,
                zone,
                &zone_changes.to_delete,
                &mut report,
            )
            .await;
            apply::update_records(
                self.dns.as_ref(),
                self.traffic_manager.as_ref(),
                &self.config,
                &self.profile_defaults,
                zone,
                &zone_changes.to_update,
                &mut report,
            )
            .await;
        }
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "finished applying changes"
        );
        report
    }

    /// Looks up a zone by its full resource ID.
    ///
    /// # Errors
    ///
    /// Fails when listing fails or no zone matches.
    pub async fn get_managed_zone(&self, zone_id: &str) -> Result<ManagedZoneOutput> {
        let zones = self.zones().await?;
        for zone in zones {
            let Some(id) = zone.id.as_deref() else {
                continue;
            };
            debug!(found = id, wanted = zone_id, "comparing zone IDs");
            if id == zone_id {
                let properties = zone.properties.unwrap_or_default();
                return Ok(ManagedZoneOutput {
                    id: id.to_string(),
                    dns_name: zone.name.unwrap_or_default(),
                    name_servers: properties.name_servers.unwrap_or_default(),
                    record_count: properties.number_of_record_sets.unwrap_or_default(),
                });
            }
        }
        bail!("zone {zone_id} not found")
    }
}

#[async_trait]
impl Provider for AzureProvider {
    fn domain_filter(&self) -> &DomainFilter {
        &self.config.domain_filter
    }

    async fn records(&self) -> Result<Vec<Endpoint>> {
        Ok(AzureProvider::records(self).await?)
    }

    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        info!("adjusting endpoints to the azure two-tier model");
        translate::adjust_endpoints(endpoints)
    }

    /// Best-effort contract: per-record failures are logged and recorded
    /// in the apply report, never surfaced here.
    async fn apply_changes(&self, changes: &ChangeSet) -> Result<()> {
        let _report = self.apply_changes_with_report(changes).await;
        Ok(())
    }

    async fn ensure_managed_zone(&self, zone_id: Option<&str>) -> Result<ManagedZoneOutput> {
        match zone_id {
            Some(id) if !id.is_empty() => self.get_managed_zone(id).await,
            // Zone creation is not supported; report an empty zone.
            _ => Ok(ManagedZoneOutput::default()),
        }
    }
}
