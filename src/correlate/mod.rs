//! Pod-to-resource correlation engine
//!
//! Resolves a name fragment to one pod, walks its owner chain to the
//! top-level workload, derives a label selector and fans it out across the
//! related resource kinds. Resolution failures are fatal to the run; only
//! the optional HPA/PDB queries degrade.

mod owner;
mod pod;
mod related;
mod selector;

pub use owner::resolve_owner;
pub use pod::{resolve_pod, PodPicker};
pub use related::fetch_related;
pub use selector::{derive_or_empty, derive_or_fail};

use crate::error::LensError;
use crate::kubernetes::ClusterGateway;
use crate::model::{CorrelationResult, PodRef, RelatedResourceSet};

#[derive(Debug, Clone, Default)]
pub struct CorrelateOptions {
    /// Substring to match against pod names; empty matches every pod.
    pub pattern: String,
    /// None searches all namespaces the credential can list.
    pub namespace: Option<String>,
    /// Explicit `key=value` selector, bypassing label derivation.
    pub selector_override: Option<String>,
    /// Fail when the pod has no recognized correlation label instead of
    /// reporting zero related resources.
    pub strict_labels: bool,
}

/// Run the whole engine: resolve, walk owners, derive, fan out.
#[allow(dead_code)]
pub async fn correlate<G: ClusterGateway + ?Sized>(
    gateway: &G,
    picker: &dyn PodPicker,
    opts: &CorrelateOptions,
) -> Result<CorrelationResult, LensError> {
    let pod = resolve_pod(gateway, picker, &opts.pattern, opts.namespace.as_deref()).await?;
    correlate_pod(gateway, pod, opts).await
}

/// Correlate an already-resolved pod. Split out so callers can drive the
/// resolution step (and its interactive prompt) themselves.
pub async fn correlate_pod<G: ClusterGateway + ?Sized>(
    gateway: &G,
    pod: PodRef,
    opts: &CorrelateOptions,
) -> Result<CorrelationResult, LensError> {
    let workload = resolve_owner(gateway, &pod).await?;

    let selector = if opts.strict_labels {
        derive_or_fail(&pod, opts.selector_override.as_deref())?
    } else {
        derive_or_empty(&pod, opts.selector_override.as_deref())?
    };

    // An empty selector means "no correlation", not "match everything":
    // skip the fan-out entirely rather than listing whole namespaces.
    let related = if selector.is_empty() {
        RelatedResourceSet::default()
    } else {
        fetch_related(gateway, &pod, &selector, &workload).await?
    };

    Ok(CorrelationResult {
        pod,
        workload,
        selector,
        related,
    })
}
