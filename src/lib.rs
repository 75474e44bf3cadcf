// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Azdns - Azure DNS provider for Kubernetes DNS reconciliation
//!
//! Azdns reconciles a desired set of normalized DNS endpoints against the
//! live record sets of Azure DNS zones, including Azure's two-tier model
//! where a single DNS name is served through a traffic manager profile
//! (weighted or geographic) fanning out to multiple physical targets.
//!
//! ## Overview
//!
//! This library provides the core functionality of the provider:
//!
//! - Reading zone record sets back into normalized endpoints, expanding
//!   traffic-manager-backed alias records into one endpoint per target
//! - Collapsing same-name endpoint groups with weight/geo annotations into
//!   single routing-policy endpoints before diffing
//! - Best-effort application of externally planned change sets, with
//!   dry-run support and per-record failure isolation
//!
//! ## Modules
//!
//! - [`azure`] - the provider core: record reader, profile expander,
//!   normalizer, change applier, and the ARM REST client
//! - [`endpoint`] - the normalized endpoint and change-set model
//! - [`config`] - `azure.json` credentials and domain/zone filters
//! - [`provider`] - the provider trait consumed by the reconciliation loop
//! - [`dns_errors`] - typed errors for ARM calls, records and profiles
//!
//! ## Example
//!
//! ```rust,no_run
//! use azdns::azure::AzureProvider;
//! use azdns::config::{AzureConfig, DomainFilter};
//! use azdns::provider::Provider;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = AzureConfig::from_file("/etc/kubernetes/azure.json")?;
//! config.domain_filter = DomainFilter::new(["example.com"]);
//! config.dry_run = true;
//!
//! let provider = AzureProvider::from_config(config)?;
//! let endpoints = provider.records().await?;
//! for ep in &endpoints {
//!     println!("{ep}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error contract
//!
//! A reconciliation pass that encountered only per-record errors reports
//! success; failures of individual records are visible in logs and in the
//! [`azure::ApplyReport`]. Only listing-level failures surface as pass
//! failures, which the calling controller recovers from on its next
//! scheduled reconciliation.

pub mod azure;
pub mod config;
pub mod dns_errors;
pub mod endpoint;
pub mod provider;

#[cfg(test)]
mod config_tests;
