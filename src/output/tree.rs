use std::collections::BTreeSet;

use console::Style;

use super::{health_style, restart_style, Health};
use crate::model::{CorrelationResult, PodRef};

/// One line of the hierarchical view; `level` 0 is the root.
#[derive(Debug, Clone)]
pub struct LeveledItem {
    pub level: usize,
    pub text: String,
}

pub struct TreeFormatter;

impl TreeFormatter {
    pub fn format(result: &CorrelationResult) -> String {
        render(&leveled_items(result))
    }
}

/// Namespace → workload → node → pod → containers, with volume-derived
/// PVC/ConfigMap/Secret names attached beside the node.
fn leveled_items(result: &CorrelationResult) -> Vec<LeveledItem> {
    let pod = &result.pod;
    let workload = &result.workload;
    let mut items = Vec::new();

    items.push(LeveledItem {
        level: 0,
        text: format!(
            "{} {}",
            Style::new().cyan().bold().apply_to("[Namespace]"),
            pod.namespace
        ),
    });

    // A pod without a controlling owner hangs directly off the namespace.
    let base = if workload.is_resolved() {
        let health = if workload.degraded() {
            Health::Degraded
        } else {
            Health::Healthy
        };
        items.push(LeveledItem {
            level: 1,
            text: format!(
                "{} {} replicas {}",
                Style::new().blue().bold().apply_to(format!("[{}]", workload.kind)),
                workload.name,
                health_style(health).apply_to(workload.replicas())
            ),
        });
        2
    } else {
        1
    };

    items.push(LeveledItem {
        level: base,
        text: format!(
            "{} {}",
            Style::new().magenta().bold().apply_to("[Node]"),
            pod.node
        ),
    });

    let phase_health = if pod.phase == "Running" {
        Health::Healthy
    } else {
        Health::Degraded
    };
    items.push(LeveledItem {
        level: base + 1,
        text: format!(
            "{} {} {}",
            Style::new().blue().bold().apply_to("[Pod]"),
            pod.name,
            health_style(phase_health).apply_to(format!("[{}]", pod.phase))
        ),
    });

    for container in &pod.init_containers {
        items.push(LeveledItem {
            level: base + 2,
            text: container_line("[Init]", container, container.healthy),
        });
    }
    for container in &pod.containers {
        items.push(LeveledItem {
            level: base + 2,
            text: container_line("[Container]", container, container.healthy),
        });
    }

    for (label, names) in volume_sources(pod) {
        for name in names {
            items.push(LeveledItem {
                level: base,
                text: format!(
                    "{} {}",
                    Style::new().yellow().bold().apply_to(label),
                    name
                ),
            });
        }
    }

    items
}

fn container_line(label: &str, container: &crate::model::ContainerBrief, healthy: bool) -> String {
    let health = if healthy {
        Health::Healthy
    } else {
        Health::Degraded
    };
    format!(
        "{} {} {} restarts {}",
        Style::new().dim().bold().apply_to(label),
        container.name,
        health_style(health).apply_to(format!("[{}]", container.state)),
        restart_style(container.restarts).apply_to(container.restarts)
    )
}

/// Deduplicated volume-referenced names per source kind.
fn volume_sources(pod: &PodRef) -> [(&'static str, BTreeSet<String>); 3] {
    let mut pvcs = BTreeSet::new();
    let mut config_maps = BTreeSet::new();
    let mut secrets = BTreeSet::new();
    for volume in &pod.volumes {
        pvcs.extend(volume.pvc.iter().cloned());
        config_maps.extend(volume.config_maps.iter().cloned());
        secrets.extend(volume.secrets.iter().cloned());
    }
    [
        ("[PVC]", pvcs),
        ("[ConfigMap]", config_maps),
        ("[Secret]", secrets),
    ]
}

/// Render leveled items with box-drawing connectors.
pub fn render(items: &[LeveledItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if item.level == 0 {
            out.push_str(&item.text);
            out.push('\n');
            continue;
        }
        let mut prefix = String::new();
        for depth in 1..item.level {
            prefix.push_str(if sibling_follows(items, i, depth) {
                "│  "
            } else {
                "   "
            });
        }
        prefix.push_str(if sibling_follows(items, i, item.level) {
            "├─ "
        } else {
            "└─ "
        });
        out.push_str(&prefix);
        out.push_str(&item.text);
        out.push('\n');
    }
    out
}

/// True when another item at `depth` follows before the tree climbs back
/// above it.
fn sibling_follows(items: &[LeveledItem], i: usize, depth: usize) -> bool {
    for item in &items[i + 1..] {
        if item.level < depth {
            return false;
        }
        if item.level == depth {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrelationResult, PodRef, RelatedResourceSet, Workload};
    use serde_json::json;

    fn item(level: usize, text: &str) -> LeveledItem {
        LeveledItem {
            level,
            text: text.to_string(),
        }
    }

    #[test]
    fn render_connectors() {
        let items = vec![
            item(0, "root"),
            item(1, "a"),
            item(2, "a1"),
            item(2, "a2"),
            item(1, "b"),
        ];
        let out = render(&items);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "root");
        assert_eq!(lines[1], "├─ a");
        assert_eq!(lines[2], "│  ├─ a1");
        assert_eq!(lines[3], "│  └─ a2");
        assert_eq!(lines[4], "└─ b");
    }

    fn result_fixture() -> CorrelationResult {
        let pod: k8s_openapi::api::core::v1::Pod = serde_json::from_value(json!({
            "metadata": {"name": "web-0", "namespace": "prod"},
            "spec": {
                "nodeName": "node-a",
                "containers": [],
                "volumes": [
                    {"name": "data", "persistentVolumeClaim": {"claimName": "data-web-0"}},
                    {"name": "conf", "configMap": {"name": "web-conf"}}
                ]
            },
            "status": {
                "phase": "Running",
                "containerStatuses": [
                    {"name": "web", "ready": true, "restartCount": 0,
                     "image": "nginx", "imageID": ""}
                ]
            }
        }))
        .unwrap();
        CorrelationResult {
            pod: PodRef::from_pod(&pod),
            workload: Workload {
                kind: "statefulset".into(),
                name: "web".into(),
                ready: 2,
                desired: 3,
            },
            selector: "app=web".into(),
            related: RelatedResourceSet::default(),
        }
    }

    #[test]
    fn tree_levels() {
        let items = leveled_items(&result_fixture());
        let levels: Vec<_> = items.iter().map(|i| i.level).collect();
        // namespace, workload, node, pod, container, pvc, configmap
        assert_eq!(levels, vec![0, 1, 2, 3, 4, 2, 2]);
        assert!(items[1].text.contains("web"));
        assert!(items[1].text.contains("2/3"));
        assert!(items[5].text.contains("data-web-0"));
    }

    #[test]
    fn ownerless_pod_skips_workload_level() {
        let mut result = result_fixture();
        result.workload = Workload::default();
        let items = leveled_items(&result);
        assert_eq!(items[1].level, 1);
        assert!(items[1].text.contains("[Node]"));
    }

    #[test]
    fn full_tree_contains_pod_line() {
        let out = TreeFormatter::format(&result_fixture());
        assert!(out.contains("web-0"));
        assert!(out.contains("[Namespace]") || out.contains("Namespace"));
    }
}
