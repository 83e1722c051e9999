use console::{style, Term};
use tracing::debug;

use crate::correlate::PodPicker;
use crate::error::LensError;
use crate::model::PodRef;

/// Interactive pod chooser on the controlling terminal. Candidates are
/// shown with namespace, node, phase and IP so same-named pods in
/// different namespaces stay distinguishable.
pub struct TermPicker;

impl PodPicker for TermPicker {
    fn choose(&self, candidates: &[PodRef]) -> Result<usize, LensError> {
        let term = Term::stderr();
        if !term.is_term() {
            // No terminal to prompt on: the caller has to narrow the name.
            return Err(LensError::AmbiguousSelection {
                count: candidates.len(),
            });
        }

        let width = candidates.iter().map(|p| p.name.len()).max().unwrap_or(0);
        let _ = term.write_line(&format!(
            "{}",
            style(format!("{} pods match:", candidates.len())).bold()
        ));
        for (i, pod) in candidates.iter().enumerate() {
            let _ = term.write_line(&format!(
                "  {} {:width$}  {}  node={} phase={} ip={}",
                style(format!("[{}]", i + 1)).cyan(),
                pod.name,
                style(&pod.namespace).dim(),
                pod.node,
                pod.phase,
                if pod.pod_ip.is_empty() {
                    "-"
                } else {
                    &pod.pod_ip
                },
            ));
        }

        loop {
            let _ = term.write_str(&format!("Select a pod [1-{}], empty to cancel: ", candidates.len()));
            let line = term.read_line().map_err(|_| LensError::SelectionCancelled)?;
            let input = line.trim();
            if input.is_empty() || input.eq_ignore_ascii_case("q") {
                return Err(LensError::SelectionCancelled);
            }
            match input.parse::<usize>() {
                Ok(n) if (1..=candidates.len()).contains(&n) => {
                    debug!(choice = n, pod = %candidates[n - 1].name, "pod selected");
                    return Ok(n - 1);
                }
                _ => {
                    let _ = term.write_line(&format!(
                        "{}",
                        style("not a valid choice").red()
                    ));
                }
            }
        }
    }
}
