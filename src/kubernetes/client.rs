use std::fmt::Debug;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, Resource};
use serde::de::DeserializeOwned;
use tracing::debug;

use k8s_openapi::api::apps::v1::{DaemonSet, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolumeClaim, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;

use super::ClusterGateway;
use crate::error::LensError;

/// Timeout for connecting to the API server
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading API responses
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// `ClusterGateway` backed by a kube client built from the local kubeconfig.
pub struct KubeGateway {
    client: Client,
    default_namespace: String,
}

impl KubeGateway {
    /// Connect using the named kubeconfig context, or the kubeconfig's
    /// current context when none is given.
    pub async fn connect(context: Option<&str>) -> Result<Self> {
        let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;

        let context_name = context
            .map(String::from)
            .or_else(|| kubeconfig.current_context.clone())
            .ok_or_else(|| anyhow!("No context specified and no current context in kubeconfig"))?;

        if !kubeconfig.contexts.iter().any(|c| c.name == context_name) {
            return Err(anyhow!(
                "Context '{}' not found in kubeconfig",
                context_name
            ));
        }

        let mut config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: Some(context_name.clone()),
                ..Default::default()
            },
        )
        .await
        .with_context(|| format!("Failed to load kubeconfig for context '{}'", context_name))?;

        config.connect_timeout = Some(CONNECT_TIMEOUT);
        config.read_timeout = Some(READ_TIMEOUT);

        let default_namespace = config.default_namespace.clone();
        let client = Client::try_from(config)
            .with_context(|| format!("Failed to create client for context '{}'", context_name))?;

        debug!(context = %context_name, namespace = %default_namespace, "connected to cluster");
        Ok(Self {
            client,
            default_namespace,
        })
    }

    /// Namespace of the selected kubeconfig context ("default" when unset).
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// One list call, optionally label-filtered. All namespaced list
    /// queries funnel through here so each kind is just a type parameter.
    async fn list_in<K>(
        &self,
        kind: &'static str,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<K>, LensError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let mut params = ListParams::default();
        if !selector.is_empty() {
            params = params.labels(selector);
        }
        debug!(kind, namespace, selector, "listing resources");
        let list = api
            .list(&params)
            .await
            .map_err(|e| LensError::query(kind, namespace, e))?;
        Ok(list.items)
    }

    async fn get_in<K>(
        &self,
        kind: &'static str,
        namespace: &str,
        name: &str,
    ) -> Result<K, LensError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        debug!(kind, namespace, name, "fetching object");
        api.get(name)
            .await
            .map_err(|e| LensError::query(kind, namespace, e))
    }
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, LensError> {
        let api: Api<Pod> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        debug!(namespace = ?namespace, "listing pods");
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| LensError::query("Pod", namespace.unwrap_or("<all>"), e))?;
        Ok(list.items)
    }

    async fn get_replica_set(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReplicaSet, LensError> {
        self.get_in("ReplicaSet", namespace, name).await
    }

    async fn get_stateful_set(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<StatefulSet, LensError> {
        self.get_in("StatefulSet", namespace, name).await
    }

    async fn get_daemon_set(&self, namespace: &str, name: &str) -> Result<DaemonSet, LensError> {
        self.get_in("DaemonSet", namespace, name).await
    }

    async fn list_services(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Service>, LensError> {
        self.list_in("Service", namespace, selector).await
    }

    async fn list_ingresses(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Ingress>, LensError> {
        self.list_in("Ingress", namespace, selector).await
    }

    async fn list_pvcs(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, LensError> {
        self.list_in("PersistentVolumeClaim", namespace, selector)
            .await
    }

    async fn list_config_maps(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<ConfigMap>, LensError> {
        self.list_in("ConfigMap", namespace, selector).await
    }

    async fn list_secrets(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Secret>, LensError> {
        self.list_in("Secret", namespace, selector).await
    }

    async fn list_hpas(
        &self,
        namespace: &str,
    ) -> Result<Vec<HorizontalPodAutoscaler>, LensError> {
        self.list_in("HorizontalPodAutoscaler", namespace, "").await
    }

    async fn list_pdbs(&self, namespace: &str) -> Result<Vec<PodDisruptionBudget>, LensError> {
        self.list_in("PodDisruptionBudget", namespace, "").await
    }
}
