use tracing::debug;

use crate::error::LensError;
use crate::kubernetes::ClusterGateway;
use crate::model::PodRef;

/// Interactive disambiguation capability: pick one of several candidate
/// pods. Returns the index into `candidates`.
pub trait PodPicker: Send + Sync {
    fn choose(&self, candidates: &[PodRef]) -> Result<usize, LensError>;
}

/// Resolve a pod name fragment to one concrete pod.
///
/// Matching is by substring, so partial names work; an empty pattern
/// matches every pod in scope. A single match is taken directly, several
/// go through the picker. The resolved pod must already be bound to a
/// node.
pub async fn resolve_pod<G: ClusterGateway + ?Sized>(
    gateway: &G,
    picker: &dyn PodPicker,
    pattern: &str,
    namespace: Option<&str>,
) -> Result<PodRef, LensError> {
    let pods = gateway.list_pods(namespace).await?;

    let mut candidates: Vec<PodRef> = pods
        .iter()
        .filter(|p| {
            p.metadata
                .name
                .as_deref()
                .map(|n| n.contains(pattern))
                .unwrap_or(false)
        })
        .map(PodRef::from_pod)
        .collect();

    debug!(
        pattern,
        namespace = ?namespace,
        candidates = candidates.len(),
        "matched pods"
    );

    if candidates.is_empty() {
        return Err(LensError::PodNotFound {
            pattern: pattern.to_string(),
            scope: namespace.unwrap_or("all namespaces").to_string(),
        });
    }

    let chosen = if candidates.len() == 1 {
        candidates.swap_remove(0)
    } else {
        let idx = picker.choose(&candidates)?;
        candidates.swap_remove(idx)
    };

    if chosen.node.is_empty() {
        return Err(LensError::PodUnscheduled { name: chosen.name });
    }

    debug!(pod = %chosen.name, namespace = %chosen.namespace, node = %chosen.node, "resolved pod");
    Ok(chosen)
}
