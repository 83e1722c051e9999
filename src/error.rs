//! Error taxonomy for the correlation engine
//!
//! Resolution failures (pod, owner, selector) are fatal to a run; related
//! resource queries for the optional kinds (HPA, PDB) degrade to empty
//! results at the call site instead of surfacing here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LensError {
    /// No pod name contained the requested pattern.
    #[error("no pod matching {pattern:?} found in {scope}")]
    PodNotFound { pattern: String, scope: String },

    /// The pod exists but has not been bound to a node yet.
    #[error("pod {name} is not scheduled to a node yet")]
    PodUnscheduled { name: String },

    /// Several pods matched and no interactive selection was possible.
    #[error("{count} pods match; narrow the name pattern or run on a terminal")]
    AmbiguousSelection { count: usize },

    /// The user aborted the interactive pod selection.
    #[error("pod selection cancelled")]
    SelectionCancelled,

    /// Fetching the controller object behind an owner reference failed.
    #[error("failed to look up owner {kind} {namespace}/{name}")]
    OwnerLookupFailed {
        kind: String,
        name: String,
        namespace: String,
        #[source]
        source: Box<LensError>,
    },

    /// The pod carries none of the recognized correlation labels.
    #[error(
        "pod {pod} has none of the labels release, app, k8s-app, app.kubernetes.io/name"
    )]
    NoCorrelationLabel { pod: String },

    /// An explicit selector override did not match the `key=value` shape.
    #[error("invalid selector {given:?}, expected lowercase key=value")]
    InvalidSelectorFormat { given: String },

    /// A mandatory related-resource list call failed.
    #[error("{kind} query failed in namespace {namespace:?}")]
    QueryFailed {
        kind: &'static str,
        namespace: String,
        #[source]
        source: kube::Error,
    },
}

impl LensError {
    pub fn query(kind: &'static str, namespace: &str, source: kube::Error) -> Self {
        LensError::QueryFailed {
            kind,
            namespace: namespace.to_string(),
            source,
        }
    }
}
