// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider abstraction consumed by the reconciliation loop.
//!
//! A [`Provider`] exposes the current DNS state as normalized endpoints,
//! adjusts desired endpoints into provider shape before diffing, and applies
//! externally planned change sets. Zone lifecycle is intentionally thin:
//! zones are looked up, never created or deleted, and health-check
//! reconciliation is a no-op for this provider family.

use crate::config::DomainFilter;
use crate::endpoint::{ChangeSet, Endpoint};
use anyhow::Result;
use async_trait::async_trait;

/// Resolved state of a managed zone, reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedZoneOutput {
    /// Provider resource ID of the zone.
    pub id: String,
    /// DNS name of the zone.
    pub dns_name: String,
    /// Authoritative name servers for the zone.
    pub name_servers: Vec<String>,
    /// Number of record sets currently in the zone.
    pub record_count: i64,
}

/// A DNS provider capable of reading and applying endpoint state.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Domain filter restricting which names this provider manages.
    fn domain_filter(&self) -> &DomainFilter;

    /// Reads the full current record state as normalized endpoints.
    ///
    /// # Errors
    ///
    /// Fails only when zone or record-set listing fails; individual
    /// malformed or unexpandable records are logged and skipped.
    async fn records(&self) -> Result<Vec<Endpoint>>;

    /// Translates desired endpoints into provider shape before diffing.
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint>;

    /// Applies a planned change set, best-effort per record.
    ///
    /// # Errors
    ///
    /// Fails only on zone listing failure. Per-record failures are logged
    /// and do not surface here.
    async fn apply_changes(&self, changes: &ChangeSet) -> Result<()>;

    /// Resolves an existing zone ID to its current state.
    ///
    /// Zone creation is not supported by this provider family; a `None`
    /// zone ID yields an empty output rather than a new zone.
    ///
    /// # Errors
    ///
    /// Fails when zone listing fails or the given ID matches no zone.
    async fn ensure_managed_zone(&self, zone_id: Option<&str>) -> Result<ManagedZoneOutput>;

    /// Zone deletion is a no-op; zones are owned outside this system.
    async fn delete_managed_zone(&self, _zone_id: &str) -> Result<()> {
        Ok(())
    }
}
