// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for configuration loading and filters.

#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::dns_errors::ConfigError;
    use k8s_openapi::api::core::v1::Secret;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;
    use std::io::Write;

    const AZURE_JSON: &str = r#"{
  "cloud": "AzurePublicCloud",
  "tenantId": "11111111-2222-3333-4444-555555555555",
  "subscriptionId": "66666666-7777-8888-9999-000000000000",
  "resourceGroup": "external-dns",
  "aadClientId": "client-id",
  "aadClientSecret": "client-secret"
}"#;

    #[test]
    fn test_parse_azure_json() {
        let config = AzureConfig::from_str(AZURE_JSON).unwrap();
        assert_eq!(config.tenant_id, "11111111-2222-3333-4444-555555555555");
        assert_eq!(config.subscription_id, "66666666-7777-8888-9999-000000000000");
        assert_eq!(config.resource_group, "external-dns");
        assert_eq!(config.aad_client_id, "client-id");
        assert_eq!(config.aad_client_secret, "client-secret");
        assert!(!config.dry_run);
        assert!(!config.domain_filter.is_configured());
    }

    #[test]
    fn test_parse_yaml_form() {
        // azure.json is parsed as YAML, so plain YAML documents work too.
        let config = AzureConfig::from_str("resourceGroup: rg\ntenantId: tid\n").unwrap();
        assert_eq!(config.resource_group, "rg");
        assert_eq!(config.tenant_id, "tid");
        assert_eq!(config.subscription_id, "");
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(matches!(
            AzureConfig::from_str(""),
            Err(ConfigError::EmptyCredentials)
        ));
        assert!(matches!(
            AzureConfig::from_str("   \n"),
            Err(ConfigError::EmptyCredentials)
        ));
    }

    #[test]
    fn test_malformed_credentials_rejected() {
        assert!(matches!(
            AzureConfig::from_str("{not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(AZURE_JSON.as_bytes()).unwrap();
        let config = AzureConfig::from_file(file.path()).unwrap();
        assert_eq!(config.resource_group, "external-dns");
    }

    #[test]
    fn test_from_file_missing() {
        let err = AzureConfig::from_file("/nonexistent/azure.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_secret() {
        let mut data = BTreeMap::new();
        data.insert(
            CREDENTIALS_SECRET_KEY.to_string(),
            ByteString(AZURE_JSON.as_bytes().to_vec()),
        );
        let secret = Secret {
            data: Some(data),
            ..Secret::default()
        };
        let config = AzureConfig::from_secret(&secret).unwrap();
        assert_eq!(config.resource_group, "external-dns");
    }

    #[test]
    fn test_from_secret_missing_key() {
        let secret = Secret::default();
        let err = AzureConfig::from_secret(&secret).unwrap_err();
        assert!(matches!(err, ConfigError::SecretKeyMissing { .. }));
    }

    #[test]
    fn test_from_secret_empty_credentials() {
        let mut data = BTreeMap::new();
        data.insert(CREDENTIALS_SECRET_KEY.to_string(), ByteString(Vec::new()));
        let secret = Secret {
            data: Some(data),
            ..Secret::default()
        };
        assert!(matches!(
            AzureConfig::from_secret(&secret),
            Err(ConfigError::EmptyCredentials)
        ));
    }

    #[test]
    fn test_domain_filter_unconfigured_matches_all() {
        let filter = DomainFilter::default();
        assert!(!filter.is_configured());
        assert!(filter.matches("anything.example.com"));
    }

    #[test]
    fn test_domain_filter_suffix_match() {
        let filter = DomainFilter::new(["example.com"]);
        assert!(filter.is_configured());
        assert!(filter.matches("example.com"));
        assert!(filter.matches("www.example.com"));
        assert!(filter.matches("deep.sub.example.com"));
        assert!(!filter.matches("example.org"));
        // Suffix matching respects label boundaries.
        assert!(!filter.matches("notexample.com"));
    }

    #[test]
    fn test_domain_filter_case_and_trailing_dot() {
        let filter = DomainFilter::new(["Example.COM"]);
        assert!(filter.matches("WWW.EXAMPLE.com"));
        assert!(filter.matches("www.example.com."));
    }

    #[test]
    fn test_domain_filter_leading_dot_stripped() {
        let filter = DomainFilter::new([".example.com"]);
        assert!(filter.matches("www.example.com"));
        assert!(filter.matches("example.com"));
    }

    #[test]
    fn test_zone_id_filter() {
        let filter = ZoneIdFilter::default();
        assert!(filter.matches("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/dnszones/example.com"));

        let filter = ZoneIdFilter::new(["dnszones/example.com"]);
        assert!(filter.matches("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/dnszones/example.com"));
        assert!(!filter.matches("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/dnszones/example.org"));
    }
}
