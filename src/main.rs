mod cli;
mod correlate;
mod error;
mod kubernetes;
mod model;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::prelude::*;

use cli::{Args, OutputFormat, TermPicker};
use correlate::CorrelateOptions;
use kubernetes::KubeGateway;
use output::{JsonFormatter, TableFormatter, TreeFormatter};
use progress::create_spinner;

/// Logging goes to stderr so it never mixes with the rendered views.
fn init_logging(verbose: bool) {
    let filter = if verbose { "podlens=debug" } else { "podlens=warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let spinner = create_spinner("Connecting to cluster...");
    let gateway = KubeGateway::connect(args.context.as_deref()).await;
    spinner.finish_and_clear();
    let gateway = gateway?;

    let namespace = if args.all_namespaces {
        None
    } else {
        args.namespace
            .clone()
            .or_else(|| Some(gateway.default_namespace().to_string()))
    };
    let opts = CorrelateOptions {
        pattern: args.pod.clone().unwrap_or_default(),
        namespace,
        selector_override: args.selector.clone(),
        strict_labels: args.strict_labels,
    };

    // The picker may prompt, so pod resolution runs without a spinner.
    let pod = correlate::resolve_pod(
        &gateway,
        &TermPicker,
        &opts.pattern,
        opts.namespace.as_deref(),
    )
    .await?;

    let spinner = create_spinner("Correlating related resources...");
    let result = correlate::correlate_pod(&gateway, pod, &opts).await;
    spinner.finish_and_clear();
    let result = result?;

    match args.output {
        OutputFormat::Full => println!("{}", output::render_full(&result)),
        OutputFormat::Tree => print!("{}", TreeFormatter::format(&result)),
        OutputFormat::Table => println!("{}", TableFormatter::format(&result)),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&result)),
    }

    if result.selector.is_empty() && args.output != OutputFormat::Json {
        eprintln!(
            "{}",
            style("no correlation label found (release, app, k8s-app, app.kubernetes.io/name); related resources skipped")
                .yellow()
        );
    }

    Ok(())
}
