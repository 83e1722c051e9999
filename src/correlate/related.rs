use std::collections::BTreeMap;
use std::future::Future;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use tracing::{debug, warn};

use crate::error::LensError;
use crate::kubernetes::ClusterGateway;
use crate::model::{PodRef, RelatedResourceSet, Workload};

/// Fan the derived selector out across the related resource kinds.
///
/// The seven queries run concurrently and write into disjoint fields of the
/// result. Service, Ingress, PVC, ConfigMap and Secret are label-filtered
/// and mandatory: the first failure cancels the remaining queries. HPA and
/// PDB are namespace-wide lists filtered locally (by workload name and by
/// full selector evaluation respectively) and degrade to empty on failure.
pub async fn fetch_related<G: ClusterGateway + ?Sized>(
    gateway: &G,
    pod: &PodRef,
    selector: &str,
    workload: &Workload,
) -> Result<RelatedResourceSet, LensError> {
    let ns = pod.namespace.as_str();

    let (services, ingresses, pvcs, config_maps, secrets, hpas, pdbs) = futures::try_join!(
        gateway.list_services(ns, selector),
        gateway.list_ingresses(ns, selector),
        gateway.list_pvcs(ns, selector),
        gateway.list_config_maps(ns, selector),
        gateway.list_secrets(ns, selector),
        optional("HorizontalPodAutoscaler", gateway.list_hpas(ns)),
        optional("PodDisruptionBudget", gateway.list_pdbs(ns)),
    )?;

    let hpas = hpas
        .into_iter()
        .filter(|hpa| {
            workload.is_resolved()
                && hpa
                    .spec
                    .as_ref()
                    .map(|s| s.scale_target_ref.name == workload.name)
                    .unwrap_or(false)
        })
        .collect();

    let pdbs = pdbs
        .into_iter()
        .filter(|pdb| {
            let selector = pdb.spec.as_ref().and_then(|s| s.selector.as_ref());
            selector_matches(selector, &pod.labels)
        })
        .collect();

    let set = RelatedResourceSet {
        services,
        ingresses,
        pvcs,
        config_maps,
        secrets,
        hpas,
        pdbs,
    };
    debug!(
        namespace = ns,
        selector,
        services = set.services.len(),
        ingresses = set.ingresses.len(),
        pvcs = set.pvcs.len(),
        config_maps = set.config_maps.len(),
        secrets = set.secrets.len(),
        hpas = set.hpas.len(),
        pdbs = set.pdbs.len(),
        "assembled related resources"
    );
    Ok(set)
}

/// Optional kinds degrade to "not found" instead of aborting the run.
async fn optional<T>(
    kind: &'static str,
    fut: impl Future<Output = Result<Vec<T>, LensError>>,
) -> Result<Vec<T>, LensError> {
    match fut.await {
        Ok(items) => Ok(items),
        Err(e) => {
            warn!(kind, error = %e, "optional related-resource query failed");
            Ok(Vec::new())
        }
    }
}

/// Full evaluation of a Kubernetes label selector against a label set. An
/// absent or empty selector matches everything.
pub fn selector_matches(
    selector: Option<&LabelSelector>,
    labels: &BTreeMap<String, String>,
) -> bool {
    let Some(sel) = selector else {
        return true;
    };

    for (key, value) in sel.match_labels.iter().flatten() {
        if labels.get(key) != Some(value) {
            return false;
        }
    }

    for expr in sel.match_expressions.iter().flatten() {
        let current = labels.get(&expr.key);
        let wanted: &[String] = expr.values.as_deref().unwrap_or(&[]);
        let ok = match expr.operator.as_str() {
            "In" => current.map_or(false, |v| wanted.contains(v)),
            "NotIn" => current.map_or(true, |v| !wanted.contains(v)),
            "Exists" => current.is_some(),
            "DoesNotExist" => current.is_none(),
            _ => false,
        };
        if !ok {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{pod_with_labels, StubGateway};
    use super::*;
    use crate::error::LensError;
    use crate::model::{PodRef, RelatedResourceSet, Workload};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn web_pod() -> PodRef {
        let labels = [("app".to_string(), "web".to_string())].into_iter().collect();
        PodRef::from_pod(&pod_with_labels("web-0", "prod", &labels))
    }

    fn web_workload() -> Workload {
        Workload {
            kind: "deployment".into(),
            name: "web".into(),
            ready: 3,
            desired: 3,
        }
    }

    fn hpa(target: &str) -> k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler {
        serde_json::from_value(json!({
            "metadata": {"name": format!("{target}-hpa"), "namespace": "prod"},
            "spec": {
                "maxReplicas": 10,
                "minReplicas": 2,
                "scaleTargetRef": {"kind": "Deployment", "name": target}
            }
        }))
        .unwrap()
    }

    fn pdb(name: &str, selector: serde_json::Value) -> k8s_openapi::api::policy::v1::PodDisruptionBudget {
        serde_json::from_value(json!({
            "metadata": {"name": name, "namespace": "prod"},
            "spec": {"minAvailable": 1, "selector": selector}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn hpa_filtered_by_workload_name() {
        let gateway = StubGateway {
            hpas: vec![hpa("web"), hpa("api")],
            ..StubGateway::default()
        };
        let set = fetch_related(&gateway, &web_pod(), "app=web", &web_workload())
            .await
            .unwrap();
        assert_eq!(set.hpas.len(), 1);
        assert_eq!(set.hpas[0].metadata.name.as_deref(), Some("web-hpa"));
    }

    #[tokio::test]
    async fn hpa_dropped_when_workload_unresolved() {
        let gateway = StubGateway {
            hpas: vec![hpa("web")],
            ..StubGateway::default()
        };
        let set = fetch_related(&gateway, &web_pod(), "app=web", &Workload::default())
            .await
            .unwrap();
        assert!(set.hpas.is_empty());
    }

    #[tokio::test]
    async fn pdb_filtered_by_selector_evaluation() {
        let gateway = StubGateway {
            pdbs: vec![
                pdb("matches", json!({"matchLabels": {"app": "web"}})),
                pdb("other-app", json!({"matchLabels": {"app": "api"}})),
                pdb("match-all", json!({})),
            ],
            ..StubGateway::default()
        };
        let set = fetch_related(&gateway, &web_pod(), "app=web", &web_workload())
            .await
            .unwrap();
        let names: Vec<_> = set
            .pdbs
            .iter()
            .filter_map(|p| p.metadata.name.as_deref())
            .collect();
        assert_eq!(names, vec!["matches", "match-all"]);
    }

    #[tokio::test]
    async fn no_matching_pdb_is_empty_not_error() {
        let gateway = StubGateway {
            pdbs: vec![pdb("other", json!({"matchLabels": {"app": "api"}}))],
            ..StubGateway::default()
        };
        let set = fetch_related(&gateway, &web_pod(), "app=web", &web_workload())
            .await
            .unwrap();
        assert!(set.pdbs.is_empty());
    }

    #[tokio::test]
    async fn optional_kind_failure_degrades() {
        let gateway = StubGateway {
            hpas: vec![hpa("web")],
            fail: vec!["HorizontalPodAutoscaler", "PodDisruptionBudget"],
            ..StubGateway::default()
        };
        let set = fetch_related(&gateway, &web_pod(), "app=web", &web_workload())
            .await
            .unwrap();
        assert!(set.hpas.is_empty());
        assert!(set.pdbs.is_empty());
    }

    #[tokio::test]
    async fn mandatory_kind_failure_aborts() {
        let gateway = StubGateway {
            fail: vec!["Secret"],
            ..StubGateway::default()
        };
        let err = fetch_related(&gateway, &web_pod(), "app=web", &web_workload())
            .await
            .unwrap_err();
        match err {
            LensError::QueryFailed { kind, .. } => assert_eq!(kind, "Secret"),
            other => panic!("expected QueryFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_is_idempotent_against_unchanged_snapshot() {
        let gateway = StubGateway {
            services: vec![serde_json::from_value(json!({
                "metadata": {"name": "web", "namespace": "prod"}
            }))
            .unwrap()],
            pdbs: vec![pdb("web-pdb", json!({"matchLabels": {"app": "web"}}))],
            ..StubGateway::default()
        };
        let first = fetch_related(&gateway, &web_pod(), "app=web", &web_workload())
            .await
            .unwrap();
        let second = fetch_related(&gateway, &web_pod(), "app=web", &web_workload())
            .await
            .unwrap();

        let names = |set: &RelatedResourceSet| {
            (
                set.services
                    .iter()
                    .filter_map(|s| s.metadata.name.clone())
                    .collect::<Vec<_>>(),
                set.pdbs
                    .iter()
                    .filter_map(|p| p.metadata.name.clone())
                    .collect::<Vec<_>>(),
            )
        };
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn selector_expressions() {
        let labels: BTreeMap<String, String> = [
            ("app".to_string(), "web".to_string()),
            ("tier".to_string(), "frontend".to_string()),
        ]
        .into_iter()
        .collect();

        let sel = |v: serde_json::Value| -> LabelSelector { serde_json::from_value(v).unwrap() };

        assert!(selector_matches(None, &labels));
        assert!(selector_matches(Some(&sel(json!({}))), &labels));
        assert!(selector_matches(
            Some(&sel(json!({"matchLabels": {"app": "web"}}))),
            &labels
        ));
        assert!(!selector_matches(
            Some(&sel(json!({"matchLabels": {"app": "web", "tier": "backend"}}))),
            &labels
        ));
        assert!(selector_matches(
            Some(&sel(json!({"matchExpressions": [
                {"key": "app", "operator": "In", "values": ["web", "api"]}
            ]}))),
            &labels
        ));
        assert!(!selector_matches(
            Some(&sel(json!({"matchExpressions": [
                {"key": "app", "operator": "NotIn", "values": ["web"]}
            ]}))),
            &labels
        ));
        assert!(selector_matches(
            Some(&sel(json!({"matchExpressions": [
                {"key": "tier", "operator": "Exists"}
            ]}))),
            &labels
        ));
        assert!(!selector_matches(
            Some(&sel(json!({"matchExpressions": [
                {"key": "missing", "operator": "Exists"}
            ]}))),
            &labels
        ));
        assert!(selector_matches(
            Some(&sel(json!({"matchExpressions": [
                {"key": "missing", "operator": "DoesNotExist"}
            ]}))),
            &labels
        ));
    }
}
