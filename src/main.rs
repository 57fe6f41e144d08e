use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use endpoint_generator::config::{load_config, merge_with_cli_args, CliOverrides};
use endpoint_generator::Generator;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the OpenAPI document (YAML or JSON)
    #[arg(short, long)]
    spec: Option<PathBuf>,

    /// Output directory for generated code
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to config file (overrides default location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every plugin step
    #[arg(short, long)]
    verbose: bool,

    /// Plugin to run, in order; repeat to run several (default: all standard plugins)
    #[arg(short, long = "plugin")]
    plugins: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let config = merge_with_cli_args(
        config,
        CliOverrides {
            spec: args.spec,
            output: args.output,
            verbose: args.verbose,
            plugins: args.plugins,
        },
    );
    init_tracing(config.verbose);

    let input = config
        .input
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("No input source specified. Use --spec or configure input in config file"))?;
    let output_dir = config
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("generated"));

    tracing::info!(source = ?input.source, "reading document");
    let document = fs::read_to_string(&input.source)
        .with_context(|| format!("Failed to read input: {:?}", input.source))?;

    let generator = Generator::from_paths(&config.plugins, config.generation_options(Some(output_dir.clone())))?
        .with_banner(config.banner.clone());
    let files = generator
        .process(&document)
        .with_context(|| format!("Failed to generate from {:?}", input.source))?;

    for file in &files {
        let path = output_dir.join(&file.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write output file: {:?}", path))?;
        tracing::debug!(path = ?path, "wrote file");
    }

    tracing::info!(count = files.len(), output = ?output_dir, "generated files");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}
