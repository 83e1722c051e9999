use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

use super::{related_rows, ResourceRow};
use crate::model::CorrelationResult;

/// Kind column colors, one fixed color per resource kind.
fn kind_color(kind: &str) -> Color {
    match kind {
        "Service" => Color::Yellow,
        "Ingress" => Color::Green,
        "PersistentVolumeClaim" => Color::Grey,
        "ConfigMap" => Color::Magenta,
        "Secret" => Color::Red,
        "HorizontalPodAutoscaler" => Color::Cyan,
        "PodDisruptionBudget" => Color::Blue,
        _ => Color::White,
    }
}

pub struct TableFormatter;

impl TableFormatter {
    pub fn format(result: &CorrelationResult) -> String {
        let rows = related_rows(&result.related);
        Self::format_rows(&rows)
    }

    pub fn format_rows(rows: &[ResourceRow]) -> String {
        if rows.is_empty() {
            return "no related resources found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Kind", "Name", "Detail"]);

        for row in rows {
            table.add_row(vec![
                Cell::new(row.kind).fg(kind_color(row.kind)),
                Cell::new(&row.name),
                Cell::new(&row.detail),
            ]);
        }

        format!("{}\n({} related resources)", table, rows.len())
    }
}
