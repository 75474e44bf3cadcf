// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for Azure DNS and Traffic Manager operations.
//!
//! This module provides specialized error types for:
//! - Azure Resource Manager (ARM) REST calls (zones, record sets, profiles)
//! - Per-record apply failures (delete/update of a single record set)
//! - Routing-profile translation failures (lookup, missing routing tags)
//! - Provider configuration loading (`azure.json`, Kubernetes Secrets)
//!
//! Per-record and per-profile errors are logged and swallowed by the apply
//! loop (best-effort contract); only zone-listing and configuration errors
//! propagate out of the provider entry points.

use thiserror::Error;

/// Errors returned by the ARM REST client.
///
/// Every vendor call is attempted exactly once per reconciliation pass;
/// the next scheduled reconciliation is the sole recovery mechanism for
/// transient failures, so none of these carry retry hints.
#[derive(Error, Debug)]
pub enum AzureApiError {
    /// The HTTP request could not be sent or the response body could not
    /// be read (network failure, cancelled context, TLS error).
    #[error("Azure API request '{operation}' failed: {source}")]
    Transport {
        /// Short operation name (e.g. "ListZones", "DeleteRecordSet")
        operation: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status code.
    #[error("Azure API '{operation}' returned HTTP {status}: {message}")]
    Api {
        /// Short operation name
        operation: String,
        /// HTTP status code returned by ARM
        status: u16,
        /// Response body, as returned by ARM (usually a JSON error envelope)
        message: String,
    },

    /// The response body did not match the expected wire shape.
    #[error("failed to decode Azure API response for '{operation}': {reason}")]
    Decode {
        /// Short operation name
        operation: String,
        /// Decode failure detail
        reason: String,
    },

    /// Azure AD token acquisition failed; no ARM call was attempted.
    #[error("failed to acquire Azure AD access token: {reason}")]
    Auth {
        /// Token endpoint failure detail
        reason: String,
    },
}

/// Per-record failures during the read or apply paths.
///
/// These are always logged and never abort sibling records.
#[derive(Error, Debug, Clone)]
pub enum RecordError {
    /// A listed record set had a nil name or nil type and was skipped.
    #[error("record set in zone '{zone}' has nil name or type, skipping")]
    InvalidRecordSet {
        /// Zone the malformed record set was listed from
        zone: String,
    },

    /// Deleting a record set failed.
    #[error("failed to delete {record_type} record '{name}' in zone '{zone}': {reason}")]
    DeleteFailed {
        /// Relative record-set name
        name: String,
        /// Zone containing the record
        zone: String,
        /// Record type being deleted
        record_type: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// Creating or updating a record set failed.
    #[error("failed to update {record_type} record '{name}' in zone '{zone}': {reason}")]
    UpdateFailed {
        /// Relative record-set name
        name: String,
        /// Zone containing the record
        zone: String,
        /// Record type being updated
        record_type: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// An endpoint carried no encodable targets for its record type.
    #[error("no suitable values for {record_type} record '{name}'")]
    NoValues {
        /// Fully-qualified endpoint name
        name: String,
        /// Record type that could not be encoded
        record_type: String,
    },
}

/// Routing-profile translation and reconciliation failures.
#[derive(Error, Debug, Clone)]
pub enum ProfileError {
    /// The profile referenced by a pointer record could not be fetched.
    #[error("failed to look up traffic manager profile '{profile}': {reason}")]
    LookupFailed {
        /// Profile name, derived from the pointer record's target resource ID
        profile: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// A policy endpoint target had no per-target geo/weight tag; the
    /// target is dropped from the profile, the rest proceed.
    #[error("no routing value set for target '{target}' of '{dns_name}'")]
    MissingRoutingValue {
        /// Target that lacked a tag
        target: String,
        /// DNS name of the policy endpoint
        dns_name: String,
    },

    /// The endpoint's `routingpolicy` tag named an unknown method.
    #[error("unknown routing policy '{value}' on '{dns_name}'")]
    UnknownRoutingPolicy {
        /// The unrecognized tag value
        value: String,
        /// DNS name of the endpoint carrying it
        dns_name: String,
    },

    /// Creating or updating the profile resource failed.
    #[error("failed to update traffic manager profile '{profile}': {reason}")]
    UpdateFailed {
        /// Profile name
        profile: String,
        /// Specific reason for the failure
        reason: String,
    },
}

/// Provider configuration loading failures.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// The credentials document was present but empty.
    #[error("the Azure provider credentials is empty")]
    EmptyCredentials,

    /// The Kubernetes Secret lacked the expected data key.
    #[error("secret is missing required key '{key}'")]
    SecretKeyMissing {
        /// The data key that was expected (normally `azure.json`)
        key: String,
    },

    /// The credentials document could not be parsed.
    #[error("failed to parse Azure provider configuration: {reason}")]
    Parse {
        /// Parser failure detail
        reason: String,
    },

    /// The credentials file could not be read.
    #[error("failed to read Azure provider configuration from '{path}': {reason}")]
    Io {
        /// Path that was being read
        path: String,
        /// I/O failure detail
        reason: String,
    },
}
