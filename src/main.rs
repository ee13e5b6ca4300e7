//! workshop-export - Steam Workshop collection exporter

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use workshop_export::config::{Config, Overrides, DEFAULT_CONFIG_PATH};
use workshop_export::output::OutputFormat;
use workshop_export::pipeline::Collector;
use workshop_export::resolve::{ConsoleResolver, FirstCandidate, Resolver};
use workshop_export::workshop::{build_source, SourceKind};

#[derive(Parser)]
#[command(name = "workshop-export")]
#[command(version)]
#[command(about = "Exporter for mods and maps from a Steam Workshop collection")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "WORKSHOP_EXPORT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Collection to export: a name from `collections` in the config, an id, or a URL.
    /// Repeat to export several collections into one file.
    #[arg(long = "collection", value_name = "NAME|ID|URL")]
    collections: Vec<String>,

    /// Output file (overrides output_path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output layout: ini or lines
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Where item descriptions come from: page or api
    #[arg(long)]
    source: Option<SourceKind>,

    /// Take the first candidate instead of prompting
    #[arg(long)]
    non_interactive: bool,

    /// Enable verbose logging (use RUST_LOG=debug for more detail)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Always on: warnings (empty collections, missing Mod IDs) go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(if cli.verbose {
            "workshop_export=debug".parse()?
        } else {
            "workshop_export=warn".parse()?
        }))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let overrides = Overrides {
        collections: cli.collections,
        output_path: cli.output,
        format: cli.format,
        source: cli.source,
        non_interactive: cli.non_interactive,
    };
    let config = Config::load(&cli.config, &overrides)?;

    println!("Collections: {}", config.collection_ids.join(", "));
    println!("Source:      {}", config.source);
    println!("Output:      {} ({})", config.output_path.display(), config.format);
    println!();

    let source = build_source(config.source, &config.base_url, &config.api_url)?;
    let mut resolver: Box<dyn Resolver> = if config.interactive {
        Box::new(ConsoleResolver::stdio())
    } else {
        Box::new(FirstCandidate)
    };

    let summary = Collector::new(&config, &*source, &mut *resolver).run()?;

    println!("\n=== Export Summary ===");
    println!("Items:       {}", summary.entries);
    println!("Choices:     {}", summary.prompts);
    if summary.missing_mod_ids > 0 {
        println!("No Mod ID:   {} (written blank)", summary.missing_mod_ids);
    }
    println!("\nFile '{}' successfully generated.", summary.output_path.display());

    Ok(())
}
