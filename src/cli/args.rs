use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "podlens")]
#[command(
    author,
    version,
    about = "Show the workload, node, volumes and related resources behind a pod"
)]
pub struct Args {
    /// Pod name or name fragment; omit to choose from all pods in scope
    pub pod: Option<String>,

    /// Namespace to search (defaults to the kubeconfig context namespace)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Search pods across all namespaces
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,

    /// Kubernetes context to use
    #[arg(short, long)]
    pub context: Option<String>,

    /// Explicit key=value label selector, overriding label derivation
    #[arg(short = 'l', long, value_name = "KEY=VALUE")]
    pub selector: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Fail when the pod has none of the recognized correlation labels
    /// instead of reporting zero related resources
    #[arg(long)]
    pub strict_labels: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tree view followed by the detail table
    #[default]
    Full,
    Tree,
    Table,
    Json,
}
