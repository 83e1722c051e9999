//! Shared data model for one correlation run
//!
//! `PodRef` is an immutable snapshot taken when the pod is resolved; nothing
//! here holds a live reference into the cluster.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{DaemonSet, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolumeClaim, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use serde::Serialize;

/// Snapshot of the resolved pod: identity, scheduling state, container
/// statuses and volume-referenced config sources.
#[derive(Debug, Clone, Serialize)]
pub struct PodRef {
    pub name: String,
    pub namespace: String,
    /// Empty when the pod has not been scheduled.
    pub node: String,
    pub phase: String,
    pub pod_ip: String,
    pub labels: BTreeMap<String, String>,
    pub init_containers: Vec<ContainerBrief>,
    pub containers: Vec<ContainerBrief>,
    pub volumes: Vec<VolumeRef>,
    #[serde(skip)]
    pub owners: Vec<OwnerRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerBrief {
    pub name: String,
    /// "Ready", "Not Ready", or a waiting/terminated reason.
    pub state: String,
    pub healthy: bool,
    pub restarts: i32,
}

/// A single pod volume and the config sources it references. Projected
/// volumes contribute their Secret/ConfigMap sources.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeRef {
    pub name: String,
    pub pvc: Option<String>,
    pub config_maps: Vec<String>,
    pub secrets: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
}

impl PodRef {
    pub fn from_pod(pod: &Pod) -> Self {
        let meta = &pod.metadata;
        let spec = pod.spec.as_ref();
        let status = pod.status.as_ref();

        let containers = status
            .and_then(|s| s.container_statuses.as_ref())
            .map(|list| list.iter().map(container_brief).collect())
            .unwrap_or_default();
        let init_containers = status
            .and_then(|s| s.init_container_statuses.as_ref())
            .map(|list| list.iter().map(init_container_brief).collect())
            .unwrap_or_default();
        let volumes = spec
            .and_then(|s| s.volumes.as_ref())
            .map(|vols| vols.iter().map(volume_ref).collect())
            .unwrap_or_default();

        PodRef {
            name: meta.name.clone().unwrap_or_default(),
            namespace: meta.namespace.clone().unwrap_or_default(),
            node: spec.and_then(|s| s.node_name.clone()).unwrap_or_default(),
            phase: status.and_then(|s| s.phase.clone()).unwrap_or_default(),
            pod_ip: status.and_then(|s| s.pod_ip.clone()).unwrap_or_default(),
            labels: meta.labels.clone().unwrap_or_default(),
            init_containers,
            containers,
            volumes,
            owners: meta
                .owner_references
                .iter()
                .flatten()
                .map(|o| OwnerRef {
                    kind: o.kind.clone(),
                    name: o.name.clone(),
                })
                .collect(),
        }
    }
}

fn container_brief(cs: &k8s_openapi::api::core::v1::ContainerStatus) -> ContainerBrief {
    let state = if cs.ready {
        "Ready".to_string()
    } else {
        state_reason(cs).unwrap_or_else(|| "Not Ready".to_string())
    };
    ContainerBrief {
        name: cs.name.clone(),
        healthy: cs.ready,
        state,
        restarts: cs.restart_count,
    }
}

fn init_container_brief(cs: &k8s_openapi::api::core::v1::ContainerStatus) -> ContainerBrief {
    let state = state_reason(cs).unwrap_or_else(|| "Pending".to_string());
    ContainerBrief {
        name: cs.name.clone(),
        healthy: state == "Completed",
        state,
        restarts: cs.restart_count,
    }
}

fn state_reason(cs: &k8s_openapi::api::core::v1::ContainerStatus) -> Option<String> {
    let state = cs.state.as_ref()?;
    if let Some(term) = &state.terminated {
        return term.reason.clone();
    }
    if let Some(waiting) = &state.waiting {
        return waiting.reason.clone();
    }
    None
}

fn volume_ref(vol: &k8s_openapi::api::core::v1::Volume) -> VolumeRef {
    let mut out = VolumeRef {
        name: vol.name.clone(),
        ..VolumeRef::default()
    };
    if let Some(pvc) = &vol.persistent_volume_claim {
        out.pvc = Some(pvc.claim_name.clone());
    }
    if let Some(cm) = &vol.config_map {
        if let Some(name) = &cm.name {
            out.config_maps.push(name.clone());
        }
    }
    if let Some(secret) = &vol.secret {
        if let Some(name) = &secret.secret_name {
            out.secrets.push(name.clone());
        }
    }
    if let Some(projected) = &vol.projected {
        for source in projected.sources.iter().flatten() {
            if let Some(name) = source.config_map.as_ref().and_then(|c| c.name.clone()) {
                out.config_maps.push(name);
            }
            if let Some(name) = source.secret.as_ref().and_then(|s| s.name.clone()) {
                out.secrets.push(name);
            }
        }
    }
    out
}

/// Top-level workload controller summary derived from the pod's owner chain.
/// An empty name means the pod has no controlling owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Workload {
    /// Lowercased kind ("deployment", "statefulset", ...).
    pub kind: String,
    pub name: String,
    pub ready: i32,
    pub desired: i32,
}

impl Workload {
    pub fn degraded(&self) -> bool {
        self.ready != self.desired
    }

    pub fn replicas(&self) -> String {
        format!("{}/{}", self.ready, self.desired)
    }

    pub fn is_resolved(&self) -> bool {
        !self.name.is_empty()
    }
}

impl From<&ReplicaSet> for Workload {
    fn from(rs: &ReplicaSet) -> Self {
        let status = rs.status.as_ref();
        Workload {
            kind: "replicaset".to_string(),
            name: rs.metadata.name.clone().unwrap_or_default(),
            ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
            desired: status.map(|s| s.replicas).unwrap_or(0),
        }
    }
}

impl From<&StatefulSet> for Workload {
    fn from(sts: &StatefulSet) -> Self {
        let status = sts.status.as_ref();
        Workload {
            kind: "statefulset".to_string(),
            name: sts.metadata.name.clone().unwrap_or_default(),
            ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
            desired: status.map(|s| s.replicas).unwrap_or(0),
        }
    }
}

impl From<&DaemonSet> for Workload {
    fn from(ds: &DaemonSet) -> Self {
        let status = ds.status.as_ref();
        Workload {
            kind: "daemonset".to_string(),
            name: ds.metadata.name.clone().unwrap_or_default(),
            ready: status.map(|s| s.number_ready).unwrap_or(0),
            desired: status.map(|s| s.desired_number_scheduled).unwrap_or(0),
        }
    }
}

/// Related resources assembled by the fan-out queries, one field per kind.
/// A kind coming back empty never blocks the others.
#[derive(Debug, Clone, Default)]
pub struct RelatedResourceSet {
    pub services: Vec<Service>,
    pub ingresses: Vec<Ingress>,
    pub pvcs: Vec<PersistentVolumeClaim>,
    pub config_maps: Vec<ConfigMap>,
    pub secrets: Vec<Secret>,
    pub hpas: Vec<HorizontalPodAutoscaler>,
    pub pdbs: Vec<PodDisruptionBudget>,
}

impl RelatedResourceSet {
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
            && self.ingresses.is_empty()
            && self.pvcs.is_empty()
            && self.config_maps.is_empty()
            && self.secrets.is_empty()
            && self.hpas.is_empty()
            && self.pdbs.is_empty()
    }
}

/// Everything the presentation layer needs for one run.
#[derive(Debug, Clone)]
pub struct CorrelationResult {
    pub pod: PodRef,
    pub workload: Workload,
    /// The derived or overridden `key=value` selector; empty when no
    /// correlation label was found and the lenient derivation was used.
    pub selector: String,
    pub related: RelatedResourceSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture_pod() -> Pod {
        serde_json::from_value(json!({
            "metadata": {
                "name": "web-0",
                "namespace": "prod",
                "labels": {"app": "web", "release": "blue"},
                "ownerReferences": [
                    {"apiVersion": "apps/v1", "kind": "StatefulSet", "name": "web", "uid": "u1"}
                ]
            },
            "spec": {
                "nodeName": "node-a",
                "containers": [{"name": "web", "image": "nginx"}],
                "volumes": [
                    {"name": "data", "persistentVolumeClaim": {"claimName": "data-web-0"}},
                    {"name": "conf", "configMap": {"name": "web-conf"}},
                    {"name": "creds", "secret": {"secretName": "web-creds"}},
                    {"name": "mixed", "projected": {"sources": [
                        {"configMap": {"name": "proj-conf"}},
                        {"secret": {"name": "proj-secret"}}
                    ]}}
                ]
            },
            "status": {
                "phase": "Running",
                "podIP": "10.0.0.5",
                "containerStatuses": [
                    {"name": "web", "ready": true, "restartCount": 2,
                     "image": "nginx", "imageID": "", "containerID": ""}
                ],
                "initContainerStatuses": [
                    {"name": "init-perms", "ready": false, "restartCount": 0,
                     "image": "busybox", "imageID": "", "containerID": "",
                     "state": {"terminated": {"exitCode": 0, "reason": "Completed"}}}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn pod_ref_snapshot() {
        let pod = fixture_pod();
        let pr = PodRef::from_pod(&pod);
        assert_eq!(pr.name, "web-0");
        assert_eq!(pr.namespace, "prod");
        assert_eq!(pr.node, "node-a");
        assert_eq!(pr.phase, "Running");
        assert_eq!(pr.pod_ip, "10.0.0.5");
        assert_eq!(pr.labels.get("release").map(String::as_str), Some("blue"));
        assert_eq!(pr.owners.len(), 1);
        assert_eq!(pr.owners[0].kind, "StatefulSet");
    }

    #[test]
    fn container_states() {
        let pr = PodRef::from_pod(&fixture_pod());
        assert_eq!(pr.containers.len(), 1);
        assert_eq!(pr.containers[0].state, "Ready");
        assert!(pr.containers[0].healthy);
        assert_eq!(pr.containers[0].restarts, 2);

        assert_eq!(pr.init_containers.len(), 1);
        assert_eq!(pr.init_containers[0].state, "Completed");
        assert!(pr.init_containers[0].healthy);
    }

    #[test]
    fn volume_sources_collected() {
        let pr = PodRef::from_pod(&fixture_pod());
        assert_eq!(pr.volumes.len(), 4);
        assert_eq!(pr.volumes[0].pvc.as_deref(), Some("data-web-0"));
        assert_eq!(pr.volumes[1].config_maps, vec!["web-conf"]);
        assert_eq!(pr.volumes[2].secrets, vec!["web-creds"]);
        // Projected volume contributes both source kinds
        assert_eq!(pr.volumes[3].config_maps, vec!["proj-conf"]);
        assert_eq!(pr.volumes[3].secrets, vec!["proj-secret"]);
    }

    #[test]
    fn workload_degraded() {
        let healthy = Workload {
            kind: "deployment".into(),
            name: "web".into(),
            ready: 3,
            desired: 3,
        };
        assert!(!healthy.degraded());
        assert_eq!(healthy.replicas(), "3/3");

        let degraded = Workload {
            ready: 2,
            desired: 3,
            ..healthy
        };
        assert!(degraded.degraded());
        assert_eq!(degraded.replicas(), "2/3");
    }

    #[test]
    fn empty_workload_unresolved() {
        let w = Workload::default();
        assert!(!w.is_resolved());
        assert_eq!(w.replicas(), "0/0");
    }
}
