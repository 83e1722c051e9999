mod json;
mod table;
mod tree;

pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use tree::TreeFormatter;

use console::Style;
use serde::Serialize;

use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::model::{CorrelationResult, RelatedResourceSet};

/// Semantic status of a rendered element; styling is a pure function of
/// this, never shared mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Degraded,
    Neutral,
}

pub fn health_style(health: Health) -> Style {
    match health {
        Health::Healthy => Style::new().green().bold(),
        Health::Degraded => Style::new().red().bold(),
        Health::Neutral => Style::new().dim(),
    }
}

pub fn restart_style(restarts: i32) -> Style {
    if restarts > 0 {
        Style::new().yellow().bold()
    } else {
        Style::new().green()
    }
}

/// One line of the flat detail table.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceRow {
    pub kind: &'static str,
    pub name: String,
    pub detail: String,
}

/// Flatten the related resource set into kind/name/detail rows. This is the
/// only place that digs into the raw API objects for display.
pub fn related_rows(related: &RelatedResourceSet) -> Vec<ResourceRow> {
    let mut rows = Vec::new();
    rows.extend(related.services.iter().map(service_row));
    rows.extend(related.ingresses.iter().map(ingress_row));
    rows.extend(related.pvcs.iter().map(pvc_row));
    rows.extend(related.config_maps.iter().map(|cm| ResourceRow {
        kind: "ConfigMap",
        name: cm.metadata.name.clone().unwrap_or_default(),
        detail: format!("{} keys", cm.data.as_ref().map_or(0, |d| d.len())),
    }));
    rows.extend(related.secrets.iter().map(|secret| ResourceRow {
        kind: "Secret",
        name: secret.metadata.name.clone().unwrap_or_default(),
        detail: secret.type_.clone().unwrap_or_default(),
    }));
    rows.extend(related.hpas.iter().map(hpa_row));
    rows.extend(related.pdbs.iter().map(pdb_row));
    rows
}

fn service_row(svc: &Service) -> ResourceRow {
    let mut parts = Vec::new();
    if let Some(spec) = &svc.spec {
        if let Some(ip) = &spec.cluster_ip {
            if ip != "None" {
                parts.push(format!("cluster IP {}", ip));
            }
        }
        for port in spec.ports.iter().flatten() {
            let target = match &port.target_port {
                Some(IntOrString::Int(n)) => n.to_string(),
                Some(IntOrString::String(s)) => s.clone(),
                None => port.port.to_string(),
            };
            parts.push(format!(
                "{}→{}/{}",
                port.port,
                target,
                port.protocol.as_deref().unwrap_or("TCP")
            ));
        }
    }
    for endpoint in svc
        .status
        .iter()
        .filter_map(|s| s.load_balancer.as_ref())
        .flat_map(|lb| lb.ingress.iter().flatten())
    {
        if let Some(ip) = &endpoint.ip {
            parts.push(format!("LB {}", ip));
        }
        if let Some(host) = &endpoint.hostname {
            parts.push(format!("LB {}", host));
        }
    }
    ResourceRow {
        kind: "Service",
        name: svc.metadata.name.clone().unwrap_or_default(),
        detail: parts.join(", "),
    }
}

fn ingress_row(ing: &Ingress) -> ResourceRow {
    let mut parts = Vec::new();
    for rule in ing.spec.iter().flat_map(|s| s.rules.iter().flatten()) {
        let host = rule.host.as_deref().unwrap_or("*");
        for path in rule.http.iter().flat_map(|h| h.paths.iter()) {
            let url = format!("https://{}{}", host, path.path.as_deref().unwrap_or("/"));
            match path.backend.service.as_ref() {
                Some(backend) => parts.push(format!("{} → {}", url, backend.name)),
                None => parts.push(url),
            }
        }
    }
    for endpoint in ing
        .status
        .iter()
        .filter_map(|s| s.load_balancer.as_ref())
        .flat_map(|lb| lb.ingress.iter().flatten())
    {
        if let Some(ip) = &endpoint.ip {
            parts.push(format!("LB {}", ip));
        }
        if let Some(host) = &endpoint.hostname {
            parts.push(format!("LB {}", host));
        }
    }
    ResourceRow {
        kind: "Ingress",
        name: ing.metadata.name.clone().unwrap_or_default(),
        detail: parts.join(", "),
    }
}

fn pvc_row(pvc: &PersistentVolumeClaim) -> ResourceRow {
    let mut parts = Vec::new();
    if let Some(spec) = &pvc.spec {
        if let Some(class) = &spec.storage_class_name {
            parts.push(format!("class {}", class));
        }
        if let Some(mode) = spec.access_modes.iter().flatten().next() {
            parts.push(mode.clone());
        }
        if let Some(size) = spec
            .resources
            .as_ref()
            .and_then(|r| r.requests.as_ref())
            .and_then(|req| req.get("storage"))
        {
            parts.push(size.0.clone());
        }
        if let Some(volume) = &spec.volume_name {
            parts.push(format!("PV {}", volume));
        }
    }
    ResourceRow {
        kind: "PersistentVolumeClaim",
        name: pvc.metadata.name.clone().unwrap_or_default(),
        detail: parts.join(", "),
    }
}

fn hpa_row(hpa: &HorizontalPodAutoscaler) -> ResourceRow {
    let detail = hpa
        .spec
        .as_ref()
        .map(|spec| {
            format!(
                "targets {}, replicas {}..{}",
                spec.scale_target_ref.name,
                spec.min_replicas.unwrap_or(1),
                spec.max_replicas
            )
        })
        .unwrap_or_default();
    ResourceRow {
        kind: "HorizontalPodAutoscaler",
        name: hpa.metadata.name.clone().unwrap_or_default(),
        detail,
    }
}

fn pdb_row(pdb: &PodDisruptionBudget) -> ResourceRow {
    let mut parts = Vec::new();
    if let Some(spec) = &pdb.spec {
        if let Some(min) = &spec.min_available {
            parts.push(format!("min available {}", int_or_string(min)));
        }
        if let Some(max) = &spec.max_unavailable {
            parts.push(format!("max unavailable {}", int_or_string(max)));
        }
    }
    ResourceRow {
        kind: "PodDisruptionBudget",
        name: pdb.metadata.name.clone().unwrap_or_default(),
        detail: parts.join(", "),
    }
}

fn int_or_string(value: &IntOrString) -> String {
    match value {
        IntOrString::Int(n) => n.to_string(),
        IntOrString::String(s) => s.clone(),
    }
}

/// Render the full report: tree first, then the related-resource table.
pub fn render_full(result: &CorrelationResult) -> String {
    let tree = TreeFormatter::format(result);
    let table = TableFormatter::format(result);
    format!("{}\n{}", tree, table)
}
