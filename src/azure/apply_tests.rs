// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for best-effort change application.
//!
//! Driven through `AzureProvider` with in-memory API mocks, asserting on
//! exactly which vendor calls were issued and on the structured apply
//! report.

#[cfg(test)]
mod tests {
    use crate::azure::api::TrafficRoutingMethod;
    use crate::azure::test_support::{DnsCall, MockDnsApi, MockTrafficManagerApi, TmCall};
    use crate::azure::{AzureProvider, ChangeAction};
    use crate::config::{AzureConfig, DomainFilter};
    use crate::endpoint::{ChangeSet, Endpoint, RecordType, ZoneChanges, ROUTING_POLICY_KEY};
    use crate::provider::Provider;
    use std::sync::Arc;

    const ZONE: &str = "example.com";

    fn provider_with(
        dry_run: bool,
        dns: MockDnsApi,
        traffic_manager: MockTrafficManagerApi,
    ) -> (AzureProvider, Arc<MockDnsApi>, Arc<MockTrafficManagerApi>) {
        let dns = Arc::new(dns);
        let traffic_manager = Arc::new(traffic_manager);
        let config = AzureConfig {
            resource_group: "rg".to_string(),
            dry_run,
            ..AzureConfig::default()
        };
        let provider = AzureProvider::new(config, dns.clone(), traffic_manager.clone());
        (provider, dns, traffic_manager)
    }

    fn changes(to_delete: Vec<Endpoint>, to_update: Vec<Endpoint>) -> ChangeSet {
        let mut change_set = ChangeSet::default();
        change_set.zones.insert(
            ZONE.to_string(),
            ZoneChanges {
                to_delete,
                to_update,
            },
        );
        change_set
    }

    fn plain_a(name: &str) -> Endpoint {
        Endpoint::new_with_ttl(
            format!("{name}.{ZONE}"),
            RecordType::A,
            300,
            vec!["1.2.3.4".to_string()],
        )
    }

    fn geo_update() -> Endpoint {
        Endpoint::new_with_ttl(
            format!("geo.{ZONE}"),
            RecordType::A,
            300,
            vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()],
        )
        .with_provider_specific(ROUTING_POLICY_KEY, "Geographic")
        .with_provider_specific("1.1.1.1", "GEO-EU")
        .with_provider_specific("2.2.2.2", "GEO-NA")
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_vendor_calls() {
        let (provider, dns, tm) =
            provider_with(true, MockDnsApi::default(), MockTrafficManagerApi::default());
        let change_set = changes(
            vec![plain_a("old")],
            vec![plain_a("www"), geo_update()],
        );

        let report = provider.apply_changes_with_report(&change_set).await;

        assert!(dns.recorded_calls().is_empty());
        assert!(tm.recorded_calls().is_empty());
        assert_eq!(report.failed.len(), 0);
        assert_eq!(report.succeeded.len(), 3);
    }

    #[tokio::test]
    async fn test_apply_changes_returns_ok_in_dry_run() {
        // Scenario: one plain A-record update with dry-run on.
        let (provider, dns, _tm) =
            provider_with(true, MockDnsApi::default(), MockTrafficManagerApi::default());
        let change_set = changes(vec![], vec![plain_a("www")]);

        let result = provider.apply_changes(&change_set).await;

        assert!(result.is_ok());
        assert!(dns.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_policy_endpoint_issues_no_vendor_call() {
        let (provider, dns, _tm) =
            provider_with(false, MockDnsApi::default(), MockTrafficManagerApi::default());
        let policy = Endpoint::new(format!("geo.{ZONE}"), RecordType::A, vec![])
            .with_provider_specific(ROUTING_POLICY_KEY, "Geographic");
        let change_set = changes(vec![policy], vec![]);

        let report = provider.apply_changes_with_report(&change_set).await;

        assert!(dns.recorded_calls().is_empty());
        assert!(report.succeeded.is_empty());
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_delete_txt_ownership_record_is_deleted() {
        let (provider, dns, _tm) =
            provider_with(false, MockDnsApi::default(), MockTrafficManagerApi::default());
        let ownership = Endpoint::new(
            format!("geo.{ZONE}"),
            RecordType::TXT,
            vec!["\"heritage=external-dns\"".to_string()],
        )
        .with_provider_specific(ROUTING_POLICY_KEY, "Geographic");
        let change_set = changes(vec![ownership], vec![]);

        provider.apply_changes_with_report(&change_set).await;

        assert_eq!(
            dns.recorded_calls(),
            vec![DnsCall::Delete {
                zone: ZONE.to_string(),
                name: "geo".to_string(),
                record_type: RecordType::TXT,
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_respects_domain_filter() {
        let dns = MockDnsApi::default();
        let mut config = AzureConfig {
            resource_group: "rg".to_string(),
            ..AzureConfig::default()
        };
        config.domain_filter = DomainFilter::new(["other.org"]);
        let dns = Arc::new(dns);
        let provider = AzureProvider::new(
            config,
            dns.clone(),
            Arc::new(MockTrafficManagerApi::default()),
        );
        let change_set = changes(vec![plain_a("www")], vec![]);

        let report = provider.apply_changes_with_report(&change_set).await;

        assert!(dns.recorded_calls().is_empty());
        assert!(report.succeeded.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_does_not_abort_siblings() {
        let mut dns = MockDnsApi::default();
        dns.fail_delete.insert("bad".to_string());
        let (provider, dns, _tm) =
            provider_with(false, dns, MockTrafficManagerApi::default());
        let change_set = changes(vec![plain_a("bad"), plain_a("good")], vec![]);

        let report = provider.apply_changes_with_report(&change_set).await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].action, ChangeAction::Delete);
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(
            dns.recorded_calls(),
            vec![DnsCall::Delete {
                zone: ZONE.to_string(),
                name: "good".to_string(),
                record_type: RecordType::A,
            }]
        );
    }

    #[tokio::test]
    async fn test_plain_update_writes_record_set() {
        let (provider, dns, tm) =
            provider_with(false, MockDnsApi::default(), MockTrafficManagerApi::default());
        let change_set = changes(vec![], vec![plain_a("www")]);

        let report = provider.apply_changes_with_report(&change_set).await;

        assert!(report.failed.is_empty());
        assert!(tm.recorded_calls().is_empty());
        let calls = dns.recorded_calls();
        assert_eq!(calls.len(), 1);
        let DnsCall::Update {
            zone,
            name,
            record_type,
            record_set,
        } = &calls[0]
        else {
            panic!("expected an update call");
        };
        assert_eq!(zone, ZONE);
        assert_eq!(name, "www");
        assert_eq!(*record_type, RecordType::A);
        assert_eq!(record_set.properties.ttl, Some(300));
        assert_eq!(
            record_set.properties.a_records.as_ref().unwrap()[0]
                .ipv4_address
                .as_deref(),
            Some("1.2.3.4")
        );
    }

    #[tokio::test]
    async fn test_policy_update_creates_profile_then_cname() {
        let (provider, dns, tm) =
            provider_with(false, MockDnsApi::default(), MockTrafficManagerApi::default());
        let change_set = changes(vec![], vec![geo_update()]);

        let report = provider.apply_changes_with_report(&change_set).await;

        assert!(report.failed.is_empty());
        assert_eq!(report.succeeded.len(), 2);

        let tm_calls = tm.recorded_calls();
        assert_eq!(tm_calls.len(), 1);
        let TmCall::Update { name, profile } = &tm_calls[0] else {
            panic!("expected a profile update");
        };
        assert_eq!(name, "rg-geo-example-com");
        let properties = profile.properties.as_ref().unwrap();
        assert_eq!(
            properties.traffic_routing_method,
            Some(TrafficRoutingMethod::Geographic)
        );
        assert_eq!(properties.endpoints.as_ref().unwrap().len(), 2);

        let dns_calls = dns.recorded_calls();
        assert_eq!(dns_calls.len(), 1);
        let DnsCall::Update {
            name,
            record_type,
            record_set,
            ..
        } = &dns_calls[0]
        else {
            panic!("expected a record update");
        };
        assert_eq!(name, "geo");
        assert_eq!(*record_type, RecordType::CNAME);
        assert_eq!(record_set.properties.ttl, Some(300));
        let target = record_set.properties.target_resource.as_ref().unwrap();
        assert!(target
            .id
            .as_deref()
            .unwrap()
            .ends_with("trafficManagerProfiles/rg-geo-example-com"));
    }

    #[tokio::test]
    async fn test_weighted_update_omits_target_missing_weight() {
        // Scenario: routingpolicy=weighted with one target lacking its
        // weight tag; the target is dropped, the rest proceed, the call
        // still reports overall success.
        let (provider, dns, tm) =
            provider_with(false, MockDnsApi::default(), MockTrafficManagerApi::default());
        let ep = Endpoint::new_with_ttl(
            format!("w.{ZONE}"),
            RecordType::A,
            300,
            vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()],
        )
        .with_provider_specific(ROUTING_POLICY_KEY, "weighted")
        .with_provider_specific("1.1.1.1", "50");
        let change_set = changes(vec![], vec![ep]);

        let result = provider.apply_changes(&change_set).await;
        assert!(result.is_ok());

        let tm_calls = tm.recorded_calls();
        let TmCall::Update { profile, .. } = &tm_calls[0] else {
            panic!("expected a profile update");
        };
        let endpoints = profile
            .properties
            .as_ref()
            .unwrap()
            .endpoints
            .as_ref()
            .unwrap();
        assert_eq!(endpoints.len(), 1);
        let props = endpoints[0].properties.as_ref().unwrap();
        assert_eq!(props.target.as_deref(), Some("1.1.1.1"));
        assert_eq!(props.weight, Some(50));
        // The alias record is still written.
        assert_eq!(dns.recorded_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_failure_skips_cname_and_continues() {
        let mut tm = MockTrafficManagerApi::default();
        tm.fail_update = true;
        let (provider, dns, _tm) = provider_with(false, MockDnsApi::default(), tm);
        let change_set = changes(vec![], vec![geo_update(), plain_a("www")]);

        let report = provider.apply_changes_with_report(&change_set).await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].action, ChangeAction::UpdateProfile);
        // No CNAME for the failed profile; the plain sibling still lands.
        let calls = dns.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0],
            DnsCall::Update { name, .. } if name == "www"
        ));
    }

    #[tokio::test]
    async fn test_unknown_routing_policy_fails_only_that_item() {
        let (provider, dns, _tm) =
            provider_with(false, MockDnsApi::default(), MockTrafficManagerApi::default());
        let bad = Endpoint::new(format!("x.{ZONE}"), RecordType::A, vec![])
            .with_provider_specific(ROUTING_POLICY_KEY, "latency");
        let change_set = changes(vec![], vec![bad, plain_a("www")]);

        let report = provider.apply_changes_with_report(&change_set).await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(dns.recorded_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_update_respects_domain_filter() {
        let mut config = AzureConfig {
            resource_group: "rg".to_string(),
            ..AzureConfig::default()
        };
        config.domain_filter = DomainFilter::new(["other.org"]);
        let dns = Arc::new(MockDnsApi::default());
        let provider = AzureProvider::new(
            config,
            dns.clone(),
            Arc::new(MockTrafficManagerApi::default()),
        );
        let change_set = changes(vec![], vec![plain_a("www")]);

        let report = provider.apply_changes_with_report(&change_set).await;

        assert!(dns.recorded_calls().is_empty());
        assert!(report.succeeded.is_empty());
        assert!(report.failed.is_empty());
    }
}
