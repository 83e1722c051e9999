use serde::Serialize;

use super::{related_rows, ResourceRow};
use crate::model::{CorrelationResult, PodRef, Workload};

#[derive(Serialize)]
struct JsonReport<'a> {
    pod: &'a PodRef,
    workload: &'a Workload,
    selector: &'a str,
    related: Vec<ResourceRow>,
}

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(result: &CorrelationResult) -> String {
        let report = JsonReport {
            pod: &result.pod,
            workload: &result.workload,
            selector: &result.selector,
            related: related_rows(&result.related),
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }
}
