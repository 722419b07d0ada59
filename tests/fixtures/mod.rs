// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for wasaas-provisioner
//!
//! - [`FakeBroker`]: in-memory broker implementing `ServiceBroker`, recording
//!   every call so tests can assert on the exact sequence
//! - [`http`]: scripted loopback HTTP responder for the reqwest-backed clients
//!
//! All IDs are deterministic (`sid-1`, `sid-2`, ...).

#![allow(dead_code)]

pub mod http;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use wasaas_provisioner::domain::{
    ConfigurationFields, CreateInstancePayload, DesiredState, InstanceConfiguration,
    InstanceType, ResourceListing, ResourceRecord, ServiceInstance, ServiceInstanceEntry,
    ServiceInstanceId, TargetState,
};
use wasaas_provisioner::{PollPolicy, ProvisionError, ProvisionResult, ServiceBroker};

/// A broker call as observed by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(CreateInstancePayload),
    Delete(String),
    Resources(String),
    ResourceDetail(String, String),
    VpnConfig(String),
}

#[derive(Debug, Clone)]
struct FakeResources {
    pending_checks: u32,
    records: Vec<ResourceRecord>,
}

#[derive(Debug, Default)]
struct FakeState {
    instances: Vec<ServiceInstanceEntry>,
    lingering: Vec<(ServiceInstanceEntry, u32)>,
    resources: HashMap<String, FakeResources>,
    calls: Vec<Call>,
    next_id: u32,
    list_failure: Option<(u16, String)>,
    create_failure: Option<(u16, String)>,
    delete_failure: Option<(u16, String)>,
    resources_failure: Option<(u16, String)>,
    linger_lists: u32,
    ready_after: u32,
}

/// In-memory broker
#[derive(Debug, Default)]
pub struct FakeBroker {
    state: Mutex<FakeState>,
}

fn broker_error(operation: &'static str, failure: &(u16, String)) -> ProvisionError {
    ProvisionError::BrokerOperation {
        operation,
        status: failure.0,
        body: failure.1.clone(),
    }
}

pub fn entry(id: &str, name: Option<&str>, service_type: &str) -> ServiceInstanceEntry {
    ServiceInstanceEntry {
        service_instance: ServiceInstance {
            id: Some(ServiceInstanceId::new(id)),
            name: name.map(str::to_string),
            service_type: Some(service_type.to_string()),
            extra: Default::default(),
        },
    }
}

/// Resource record for one VM
pub fn vm_record(hostname: &str) -> ResourceRecord {
    serde_json::from_value(serde_json::json!({
        "osHostname": hostname,
        "osAdminPassword": "rootpw",
        "wasAdminUser": "wsadmin",
        "wasAdminPass": "wspw",
        "vpnConfigLink": format!("https://broker/vpn/{}", hostname),
    }))
    .expect("valid resource record")
}

impl FakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    /// Existing named instance with one VM
    pub fn with_instance(self, name: &str, id: &str, service_type: &str) -> Self {
        let (name, id, service_type) = (name.to_string(), id.to_string(), service_type.to_string());
        self.with_state(move |s| {
            s.instances.push(entry(&id, Some(&name), &service_type));
            s.resources.insert(
                id.clone(),
                FakeResources {
                    pending_checks: 0,
                    records: vec![vm_record(&format!("{}.example.com", name))],
                },
            );
        })
    }

    /// Listing entry without a `Name` field
    pub fn with_unnamed_instance(self, id: &str) -> Self {
        let id = id.to_string();
        self.with_state(move |s| s.instances.push(entry(&id, None, "WASCell")))
    }

    /// Listing entry with neither `Name` nor `ServiceInstanceID`
    pub fn with_anonymous_entry(self, service_type: &str) -> Self {
        let service_type = service_type.to_string();
        self.with_state(move |s| {
            s.instances.push(ServiceInstanceEntry {
                service_instance: ServiceInstance {
                    id: None,
                    name: None,
                    service_type: Some(service_type),
                    extra: Default::default(),
                },
            })
        })
    }

        /// Deleted instances stay listed for this many further listings
    pub fn lingering_after_delete(self, lists: u32) -> Self {
        self.with_state(move |s| s.linger_lists = lists)
    }

    /// Created instances answer 404 for this many resource checks
    pub fn ready_after(self, checks: u32) -> Self {
        self.with_state(move |s| s.ready_after = checks)
    }

    pub fn failing_list(self, status: u16, body: &str) -> Self {
        let body = body.to_string();
        self.with_state(move |s| s.list_failure = Some((status, body)))
    }

    pub fn failing_create(self, status: u16, body: &str) -> Self {
        let body = body.to_string();
        self.with_state(move |s| s.create_failure = Some((status, body)))
    }

    pub fn failing_delete(self, status: u16, body: &str) -> Self {
        let body = body.to_string();
        self.with_state(move |s| s.delete_failure = Some((status, body)))
    }

    pub fn failing_resources(self, status: u16, body: &str) -> Self {
        let body = body.to_string();
        self.with_state(move |s| s.resources_failure = Some((status, body)))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn creates(&self) -> Vec<CreateInstancePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn listed_names(&self) -> Vec<Option<String>> {
        self.state
            .lock()
            .unwrap()
            .instances
            .iter()
            .map(|e| e.service_instance.name.clone())
            .collect()
    }
}

#[async_trait]
impl ServiceBroker for FakeBroker {
    async fn list_instances(&self) -> ProvisionResult<Vec<ServiceInstanceEntry>> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::List);
        if let Some(failure) = &s.list_failure {
            return Err(broker_error("list instances", failure));
        }

        let mut listed = s.instances.clone();
        for (entry, remaining) in s.lingering.iter_mut() {
            if *remaining > 0 {
                listed.push(entry.clone());
                *remaining -= 1;
            }
        }
        s.lingering.retain(|(_, remaining)| *remaining > 0);
        Ok(listed)
    }

    async fn create_instance(
        &self,
        payload: &CreateInstancePayload,
    ) -> ProvisionResult<ServiceInstanceId> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Create(payload.clone()));
        if let Some(failure) = &s.create_failure {
            return Err(broker_error("create instance", failure));
        }

        s.next_id += 1;
        let id = format!("sid-{}", s.next_id);
        let created = entry(&id, Some(&payload.name), payload.instance_type.as_str());
        s.instances.push(created);
        let pending_checks = s.ready_after;
        s.resources.insert(
            id.clone(),
            FakeResources {
                pending_checks,
                records: vec![vm_record(&format!("{}.example.com", payload.name))],
            },
        );
        Ok(ServiceInstanceId::new(id))
    }

    async fn delete_instance(&self, id: &ServiceInstanceId) -> ProvisionResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Delete(id.to_string()));
        if let Some(failure) = &s.delete_failure {
            return Err(broker_error("delete instance", failure));
        }

        let position = s
            .instances
            .iter()
            .position(|e| e.service_instance.id.as_ref() == Some(id))
            .ok_or_else(|| broker_error("delete instance", &(404, "not found".to_string())))?;
        let removed = s.instances.remove(position);
        s.resources.remove(id.as_str());
        if s.linger_lists > 0 {
            let lists = s.linger_lists;
            s.lingering.push((removed, lists));
        }
        Ok(())
    }

    async fn resources(&self, id: &ServiceInstanceId) -> ProvisionResult<ResourceListing> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Resources(id.to_string()));
        if let Some(failure) = &s.resources_failure {
            return Err(broker_error("list resources", failure));
        }

        match s.resources.get_mut(id.as_str()) {
            Some(resources) if resources.pending_checks > 0 => {
                resources.pending_checks -= 1;
                Ok(ResourceListing::InProgress)
            }
            Some(resources) => Ok(ResourceListing::Available(resources.records.clone())),
            None => Ok(ResourceListing::InProgress),
        }
    }

    async fn resource_detail(
        &self,
        id: &ServiceInstanceId,
        resource_id: &str,
    ) -> ProvisionResult<serde_json::Value> {
        let mut s = self.state.lock().unwrap();
        s.calls
            .push(Call::ResourceDetail(id.to_string(), resource_id.to_string()));
        Ok(serde_json::json!({ "id": resource_id, "instance": id.as_str() }))
    }

    async fn vpn_config(&self, id: &ServiceInstanceId) -> ProvisionResult<serde_json::Value> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::VpnConfig(id.to_string()));
        Ok(serde_json::json!({ "ovpn": format!("config-for-{}", id) }))
    }
}

/// Poll policy fast enough for tests
pub fn fast_poll() -> PollPolicy {
    PollPolicy::new(Duration::from_millis(1), Duration::from_secs(5)).expect("valid poll policy")
}

pub fn base_server(size: &str) -> InstanceConfiguration {
    InstanceConfiguration::new(
        InstanceType::BaseServer,
        ConfigurationFields {
            size: Some(size),
            ..Default::default()
        },
    )
    .expect("valid base server configuration")
}

pub fn desired(name: &str, target: TargetState, wait: bool) -> DesiredState {
    let configuration = target.creates().then(|| base_server("m"));
    DesiredState::new(name, target, configuration, wait).expect("valid desired state")
}
