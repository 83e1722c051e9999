mod client;

pub use client::KubeGateway;

use async_trait::async_trait;

use k8s_openapi::api::apps::v1::{DaemonSet, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolumeClaim, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;

use crate::error::LensError;

/// Read-only query surface over the cluster API.
///
/// The correlation engine only ever lists and gets; auth, timeouts and
/// transport live behind this seam. An empty `selector` means no label
/// filtering. Errors carry the kind and namespace for diagnostics.
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    /// List pods in one namespace, or cluster-wide when `namespace` is None.
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, LensError>;

    async fn get_replica_set(&self, namespace: &str, name: &str)
        -> Result<ReplicaSet, LensError>;
    async fn get_stateful_set(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<StatefulSet, LensError>;
    async fn get_daemon_set(&self, namespace: &str, name: &str) -> Result<DaemonSet, LensError>;

    async fn list_services(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Service>, LensError>;
    async fn list_ingresses(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Ingress>, LensError>;
    async fn list_pvcs(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, LensError>;
    async fn list_config_maps(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<ConfigMap>, LensError>;
    async fn list_secrets(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Secret>, LensError>;

    /// HPAs are not label-scoped to a workload; callers filter by scale
    /// target name.
    async fn list_hpas(&self, namespace: &str)
        -> Result<Vec<HorizontalPodAutoscaler>, LensError>;

    /// PDBs carry their own selector; callers evaluate it against the pod's
    /// labels.
    async fn list_pdbs(&self, namespace: &str) -> Result<Vec<PodDisruptionBudget>, LensError>;
}
