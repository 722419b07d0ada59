// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tests for the per-run session cache and derived broker operations

mod fixtures;

use pretty_assertions::assert_eq;

use fixtures::{base_server, Call, FakeBroker};
use wasaas_provisioner::domain::{ResourceListing, ServiceInstanceId, ServiceInstanceSpec};
use wasaas_provisioner::{ProvisionError, ProvisioningSession};

#[tokio::test]
async fn test_instance_exists_caches_first_id_only() {
    let broker = FakeBroker::new().with_instance("dev", "sid-1", "WASBase");
    let mut session = ProvisioningSession::new(&broker, "dev");

    assert!(session.instance_id().is_none());
    assert!(session.instance_exists().await.unwrap());
    assert_eq!(session.instance_id(), Some(&ServiceInstanceId::new("sid-1")));
}

/// A known ID is not replaced by whatever the listing matches later
#[tokio::test]
async fn test_instance_exists_keeps_known_id() {
    let broker = FakeBroker::new().with_instance("dev", "sid-old", "WASBase");
    let mut session = ProvisioningSession::new(&broker, "dev");

    let created = session
        .create_instance(&ServiceInstanceSpec::new("dev", base_server("m")))
        .await
        .unwrap();
    assert_eq!(created, ServiceInstanceId::new("sid-1"));

    // The listing returns the older "dev" entry first
    assert!(session.instance_exists().await.unwrap());
    assert_eq!(session.instance_id(), Some(&created));
}

#[tokio::test]
async fn test_entry_without_id_or_name_is_skipped() {
    let broker = FakeBroker::new()
        .with_anonymous_entry("WASNDServer")
        .with_instance("dev", "sid-3", "WASBase");
    let mut session = ProvisioningSession::new(&broker, "dev");

    session.valid_connection().await.unwrap();
    assert!(session.instance_exists().await.unwrap());
    assert_eq!(session.instance_id(), Some(&ServiceInstanceId::new("sid-3")));

    let mut other = ProvisioningSession::new(&broker, "ghost");
    assert!(!other.instance_exists().await.unwrap());
}

#[tokio::test]
async fn test_unnamed_entry_never_matches() {
    let broker = FakeBroker::new().with_unnamed_instance("sid-anon");
    let mut session = ProvisioningSession::new(&broker, "dev");

    assert!(!session.instance_exists().await.unwrap());
    assert!(session.instance_id().is_none());
}

#[tokio::test]
async fn test_resources_in_progress_is_not_empty_list() {
    let broker = FakeBroker::new().ready_after(1);
    let mut session = ProvisioningSession::new(&broker, "dev");
    let spec = ServiceInstanceSpec::new("dev", base_server("s"));

    session.create_instance(&spec).await.unwrap();

    let listing = session.resources_list().await.unwrap();
    assert_eq!(listing, ResourceListing::InProgress);
    assert_ne!(listing, ResourceListing::Available(vec![]));

    let listing = session.resources_list().await.unwrap();
    assert!(listing.is_ready());
}

#[tokio::test]
async fn test_resources_served_from_cache() {
    let broker = FakeBroker::new().with_instance("dev", "sid-1", "WASBase");
    let mut session = ProvisioningSession::new(&broker, "dev");

    session.resources_list().await.unwrap();
    session.resources_list().await.unwrap();

    let resource_calls = broker
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Resources(_)))
        .count();
    assert_eq!(resource_calls, 1);
}

#[tokio::test]
async fn test_delete_resolves_id_and_clears_it() {
    let broker = FakeBroker::new().with_instance("dev", "sid-9", "WASBase");
    let mut session = ProvisioningSession::new(&broker, "dev");

    session.delete_instance().await.unwrap();

    assert_eq!(broker.deletes(), vec!["sid-9".to_string()]);
    assert!(session.instance_id().is_none());
}

#[tokio::test]
async fn test_delete_unknown_instance() {
    let broker = FakeBroker::new();
    let mut session = ProvisioningSession::new(&broker, "ghost");

    let err = session.delete_instance().await.unwrap_err();
    assert!(matches!(err, ProvisionError::InstanceNotFound(name) if name == "ghost"));
}

#[tokio::test]
async fn test_instance_ready_after_create() {
    let broker = FakeBroker::new().ready_after(2);
    let mut session = ProvisioningSession::new(&broker, "dev");
    session
        .create_instance(&ServiceInstanceSpec::new("dev", base_server("m")))
        .await
        .unwrap();

    assert!(!session.instance_ready().await.unwrap());
    assert!(!session.instance_ready().await.unwrap());
    assert!(session.instance_ready().await.unwrap());
}

#[tokio::test]
async fn test_instance_details_for_base_server() {
    let broker = FakeBroker::new().with_instance("dev", "sid-1", "WASBase");
    let mut session = ProvisioningSession::new(&broker, "dev");

    let details = session.instance_details().await.unwrap();
    assert_eq!(details.instance_id, ServiceInstanceId::new("sid-1"));
    assert_eq!(details.admin_host.as_deref(), Some("dev.example.com"));
    assert_eq!(details.admin_user.as_deref(), Some("wsadmin"));
    assert_eq!(
        details.vpn_config_link.as_deref(),
        Some("https://broker/vpn/dev.example.com")
    );
}

#[tokio::test]
async fn test_instance_details_rejects_clustered_types() {
    let broker = FakeBroker::new().with_instance("cell", "sid-2", "WASCell");
    let mut session = ProvisioningSession::new(&broker, "cell");

    let err = session.instance_details().await.unwrap_err();
    assert!(matches!(err, ProvisionError::UnsupportedServiceType(t) if t == "WASCell"));
}

#[tokio::test]
async fn test_vpn_config_and_resource_detail_use_resolved_id() {
    let broker = FakeBroker::new().with_instance("dev", "sid-4", "WASBase");
    let mut session = ProvisioningSession::new(&broker, "dev");

    let vpn = session.vpn_config().await.unwrap();
    assert_eq!(vpn["ovpn"], "config-for-sid-4");

    let detail = session.resource_detail("vm-1").await.unwrap();
    assert_eq!(detail["instance"], "sid-4");

    let calls = broker.calls();
    assert_eq!(calls.iter().filter(|c| **c == Call::List).count(), 1);
    assert!(calls.contains(&Call::ResourceDetail("sid-4".to_string(), "vm-1".to_string())));
}

#[tokio::test]
async fn test_valid_connection_maps_broker_failure() {
    let broker = FakeBroker::new().failing_list(401, "not authorized");
    let session = ProvisioningSession::new(&broker, "dev");

    let err = session.valid_connection().await.unwrap_err();
    assert_eq!(err.to_string(), "not authorized");
    assert!(matches!(err, ProvisionError::Connectivity(_)));
}
