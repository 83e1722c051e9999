use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::LensError;
use crate::model::PodRef;

/// Label keys checked for a correlation key, highest priority first.
pub const LABEL_PRIORITY: &[&str] = &["release", "app", "k8s-app", "app.kubernetes.io/name"];

/// Shape required of an explicit override: a single lowercase `key=value`
/// equality clause.
fn override_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9./-]*=[a-z0-9][a-z0-9._-]*$").unwrap())
}

/// Derive the label selector, failing when the pod carries none of the
/// recognized correlation labels.
pub fn derive_or_fail(pod: &PodRef, explicit: Option<&str>) -> Result<String, LensError> {
    let selector = derive_or_empty(pod, explicit)?;
    if selector.is_empty() {
        return Err(LensError::NoCorrelationLabel {
            pod: pod.name.clone(),
        });
    }
    Ok(selector)
}

/// Derive the label selector, returning an empty string (meaning "no
/// correlation", not "match everything") when no recognized label is
/// present. An invalid explicit override is still an error.
pub fn derive_or_empty(pod: &PodRef, explicit: Option<&str>) -> Result<String, LensError> {
    if let Some(raw) = explicit {
        let raw = raw.trim();
        if !override_shape().is_match(raw) {
            return Err(LensError::InvalidSelectorFormat {
                given: raw.to_string(),
            });
        }
        return Ok(raw.to_string());
    }

    for key in LABEL_PRIORITY {
        if let Some(value) = pod.labels.get(*key) {
            let selector = format!("{}={}", key, value);
            debug!(pod = %pod.name, selector = %selector, "derived selector");
            return Ok(selector);
        }
    }
    Ok(String::new())
}
