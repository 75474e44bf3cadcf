// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Azure Resource Manager REST client.
//!
//! Thin reqwest wrapper implementing the [`DnsApi`] and
//! [`TrafficManagerApi`] seams against the ARM endpoints. Record-set
//! listing follows `nextLink` pagination sequentially to the end. No call
//! is ever retried here: transient failures surface to the apply loop's
//! per-record error policy and are recovered by the next reconciliation
//! pass.

use crate::azure::api::{
    DnsApi, RecordSet, TrafficManagerApi, TrafficManagerProfile, Zone,
};
use crate::config::AzureConfig;
use crate::dns_errors::AzureApiError;
use crate::endpoint::RecordType;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

/// Public-cloud ARM endpoint.
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com/";

/// Public-cloud Azure AD authority.
pub const DEFAULT_AUTHORITY_ENDPOINT: &str = "https://login.microsoftonline.com/";

const DNS_API_VERSION: &str = "2018-05-01";
const TRAFFIC_MANAGER_API_VERSION: &str = "2018-08-01";

/// Paged ARM list envelope.
#[derive(Debug, Deserialize)]
struct ListResult<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

/// AAD token endpoint response; only the token itself is used.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// ARM REST client scoped to one subscription and resource group.
pub struct ArmClient {
    http: HttpClient,
    management_url: Url,
    authority_url: Url,
    subscription_id: String,
    resource_group: String,
    tenant_id: String,
    aad_client_id: String,
    aad_client_secret: String,
    // Cached bearer token; refreshed lazily on first use.
    token: RwLock<Option<String>>,
}

impl ArmClient {
    /// Builds a client for the public cloud endpoints.
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be constructed.
    pub fn new(config: &AzureConfig) -> Result<Self> {
        Self::with_endpoints(
            config,
            Url::parse(DEFAULT_MANAGEMENT_ENDPOINT).context("invalid management endpoint")?,
            Url::parse(DEFAULT_AUTHORITY_ENDPOINT).context("invalid authority endpoint")?,
        )
    }

    /// Builds a client against explicit endpoints (sovereign clouds,
    /// tests).
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be constructed.
    pub fn with_endpoints(
        config: &AzureConfig,
        management_url: Url,
        authority_url: Url,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(ArmClient {
            http,
            management_url,
            authority_url,
            subscription_id: config.subscription_id.clone(),
            resource_group: config.resource_group.clone(),
            tenant_id: config.tenant_id.clone(),
            aad_client_id: config.aad_client_id.clone(),
            aad_client_secret: config.aad_client_secret.clone(),
            token: RwLock::new(None),
        })
    }

    /// Pre-seeds the bearer token, bypassing AAD (tests, workload
    /// identity handled elsewhere).
    #[must_use]
    pub fn with_static_token(self, token: &str) -> Self {
        ArmClient {
            token: RwLock::new(Some(token.to_string())),
            ..self
        }
    }

    /// Returns the cached bearer token, acquiring one from AAD with the
    /// client-credentials grant on first use.
    async fn bearer_token(&self) -> Result<String, AzureApiError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }

        let token_url = self
            .authority_url
            .join(&format!("{}/oauth2/token", self.tenant_id))
            .map_err(|e| AzureApiError::Auth {
                reason: format!("invalid token endpoint: {e}"),
            })?;
        debug!(url = %token_url, "acquiring Azure AD access token");
        let response = self
            .http
            .post(token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.aad_client_id.as_str()),
                ("client_secret", self.aad_client_secret.as_str()),
                ("resource", self.management_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AzureApiError::Auth {
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AzureApiError::Auth {
                reason: format!("token endpoint returned HTTP {status}: {body}"),
            });
        }
        let token_response: TokenResponse =
            response.json().await.map_err(|e| AzureApiError::Auth {
                reason: format!("malformed token response: {e}"),
            })?;

        let mut cached = self.token.write().await;
        *cached = Some(token_response.access_token.clone());
        Ok(token_response.access_token)
    }

    fn resource_url(&self, resource_path: &str, api_version: &str) -> Result<Url, AzureApiError> {
        let path = format!(
            "subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/{}?api-version={}",
            self.subscription_id, self.resource_group, resource_path, api_version
        );
        self.management_url
            .join(&path)
            .map_err(|e| AzureApiError::Decode {
                operation: "BuildUrl".to_string(),
                reason: e.to_string(),
            })
    }

    /// Sends one request and returns the raw response after status
    /// checking. Exactly one attempt, per the no-retry contract.
    async fn send(
        &self,
        method: Method,
        url: Url,
        operation: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, AzureApiError> {
        let token = self.bearer_token().await?;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| AzureApiError::Transport {
            operation: operation.to_string(),
            source: e,
        })?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AzureApiError::Api {
                operation: operation.to_string(),
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        operation: &str,
        body: Option<&B>,
    ) -> Result<T, AzureApiError> {
        let body = match body {
            Some(b) => Some(serde_json::to_value(b).map_err(|e| AzureApiError::Decode {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?),
            None => None,
        };
        let response = self.send(method, url, operation, body).await?;
        response.json().await.map_err(|e| AzureApiError::Decode {
            operation: operation.to_string(),
            reason: e.to_string(),
        })
    }

    /// Follows `nextLink` pagination sequentially until exhausted.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        first_url: Url,
        operation: &str,
    ) -> Result<Vec<T>, AzureApiError> {
        let mut results = Vec::new();
        let mut next = Some(first_url);
        while let Some(url) = next {
            let page: ListResult<T> = self
                .send_json::<(), _>(Method::GET, url, operation, None)
                .await?;
            results.extend(page.value);
            next = match page.next_link {
                Some(link) => Some(Url::parse(&link).map_err(|e| AzureApiError::Decode {
                    operation: operation.to_string(),
                    reason: format!("invalid nextLink '{link}': {e}"),
                })?),
                None => None,
            };
        }
        Ok(results)
    }
}

#[async_trait]
impl DnsApi for ArmClient {
    async fn list_zones(&self) -> Result<Vec<Zone>, AzureApiError> {
        let url = self.resource_url("dnsZones", DNS_API_VERSION)?;
        self.get_paginated(url, "ListZones").await
    }

    async fn list_record_sets(&self, zone: &str) -> Result<Vec<RecordSet>, AzureApiError> {
        let url = self.resource_url(&format!("dnsZones/{zone}/all"), DNS_API_VERSION)?;
        self.get_paginated(url, "ListRecordSets").await
    }

    async fn create_or_update_record_set(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
        record_set: RecordSet,
    ) -> Result<RecordSet, AzureApiError> {
        let url = self.resource_url(
            &format!("dnsZones/{zone}/{record_type}/{name}"),
            DNS_API_VERSION,
        )?;
        self.send_json(
            Method::PUT,
            url,
            "CreateOrUpdateRecordSet",
            Some(&record_set),
        )
        .await
    }

    async fn delete_record_set(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<(), AzureApiError> {
        let url = self.resource_url(
            &format!("dnsZones/{zone}/{record_type}/{name}"),
            DNS_API_VERSION,
        )?;
        let response = self
            .send(Method::DELETE, url, "DeleteRecordSet", None)
            .await?;
        // 200 with the deleted resource or 204 when already gone.
        debug_assert!(matches!(
            response.status(),
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::ACCEPTED
        ));
        Ok(())
    }
}

#[async_trait]
impl TrafficManagerApi for ArmClient {
    async fn get_profile(&self, name: &str) -> Result<TrafficManagerProfile, AzureApiError> {
        let url = self.resource_url(
            &format!("trafficManagerProfiles/{name}"),
            TRAFFIC_MANAGER_API_VERSION,
        )?;
        self.send_json::<(), _>(Method::GET, url, "GetProfile", None)
            .await
    }

    async fn create_or_update_profile(
        &self,
        name: &str,
        profile: TrafficManagerProfile,
    ) -> Result<TrafficManagerProfile, AzureApiError> {
        let url = self.resource_url(
            &format!("trafficManagerProfiles/{name}"),
            TRAFFIC_MANAGER_API_VERSION,
        )?;
        self.send_json(Method::PUT, url, "CreateOrUpdateProfile", Some(&profile))
            .await
    }
}
