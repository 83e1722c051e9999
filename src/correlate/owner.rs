use tracing::debug;

use crate::error::LensError;
use crate::kubernetes::ClusterGateway;
use crate::model::{OwnerRef, PodRef, Workload};

/// Walk the pod's owner references to the top-level workload controller.
///
/// Pods normally carry exactly one controlling owner; with several, the
/// last reference wins (the source data gives no ordering guarantee, so
/// multi-owner pods should be rare enough not to matter). A pod with no
/// owners yields an empty workload and no lookups are attempted.
pub async fn resolve_owner<G: ClusterGateway + ?Sized>(
    gateway: &G,
    pod: &PodRef,
) -> Result<Workload, LensError> {
    let mut workload = Workload::default();
    for owner in &pod.owners {
        workload = resolve_one(gateway, pod, owner).await?;
    }
    if workload.is_resolved() {
        debug!(
            kind = %workload.kind,
            name = %workload.name,
            replicas = %workload.replicas(),
            "resolved workload"
        );
    }
    Ok(workload)
}

async fn resolve_one<G: ClusterGateway + ?Sized>(
    gateway: &G,
    pod: &PodRef,
    owner: &OwnerRef,
) -> Result<Workload, LensError> {
    let kind = owner.kind.to_lowercase();
    match kind.as_str() {
        "replicaset" => {
            let rs = gateway
                .get_replica_set(&pod.namespace, &owner.name)
                .await
                .map_err(|e| owner_lookup_failed(owner, pod, e))?;
            // Replica counts come from the ReplicaSet status; name and kind
            // from the Deployment one hop further up. A ReplicaSet without
            // an owner of its own is the workload itself.
            let mut workload = Workload::from(&rs);
            for own in rs.metadata.owner_references.iter().flatten() {
                workload.kind = own.kind.to_lowercase();
                workload.name = own.name.clone();
            }
            Ok(workload)
        }
        "statefulset" => {
            let sts = gateway
                .get_stateful_set(&pod.namespace, &owner.name)
                .await
                .map_err(|e| owner_lookup_failed(owner, pod, e))?;
            Ok(Workload::from(&sts))
        }
        "daemonset" => {
            let ds = gateway
                .get_daemon_set(&pod.namespace, &owner.name)
                .await
                .map_err(|e| owner_lookup_failed(owner, pod, e))?;
            Ok(Workload::from(&ds))
        }
        // Anything else (Job, Node, a custom controller) is a leaf: no
        // further resolution, no replica counts.
        _ => Ok(Workload {
            kind,
            name: owner.name.clone(),
            ready: 0,
            desired: 0,
        }),
    }
}

fn owner_lookup_failed(owner: &OwnerRef, pod: &PodRef, source: LensError) -> LensError {
    LensError::OwnerLookupFailed {
        kind: owner.kind.clone(),
        name: owner.name.clone(),
        namespace: pod.namespace.clone(),
        source: Box::new(source),
    }
}
