//! konggen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use konggen_core::config::parse_key_value_list;
use konggen_core::gateway::{GATEWAY_OPTIONS, GENERATOR_HELP, GENERATOR_KIND, GENERATOR_NAME};
use konggen_core::layout::DEFAULT_OUTPUT_DIR;
use konggen_core::{Config, GenerationReport, TemplateKind};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "konggen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate Kong route registration scripts from an OpenAPI spec
    Generate(GenerateArgs),
    /// Show the generator name, kind and options
    ConfigHelp,
}

#[derive(clap::Args, Debug, Default)]
pub struct GenerateArgs {
    /// Path or URL to the API description (YAML or JSON)
    ///
    /// Example: --schema-path path/to/swagger.yaml
    /// Example: --schema-path https://example.com/openapi.json
    #[arg(long)]
    schema_path: Option<String>,
    /// YAML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for generated scripts [default: generated-code/kongCodegen]
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Template to use (kong, custom)
    #[arg(long)]
    template_kind: Option<String>,
    /// Template directory (required with --template-kind=custom)
    #[arg(long)]
    template_dir: Option<PathBuf>,
    /// Hostname of the kong admin API [default: localhost]
    #[arg(long)]
    kong_host: Option<String>,
    /// Port of the kong admin API [default: 8001]
    #[arg(long)]
    kong_port: Option<String>,
    /// Kong service the routes belong to [default: myApi]
    #[arg(long)]
    target_api_name: Option<String>,
    /// Folder under the output directory holding the packages
    #[arg(long)]
    source_folder: Option<String>,
    /// Dotted package for API scripts
    #[arg(long)]
    api_package: Option<String>,
    /// Dotted package for model files
    #[arg(long)]
    model_package: Option<String>,
    /// Reserved word replacements, e.g. sample1=exampleOne,sample2=exampleTwo
    #[arg(long)]
    reserved_words_mappings: Option<String>,
    /// Extra template values, e.g. kongHost=kong.internal,team=payments
    #[arg(long)]
    additional_properties: Option<String>,
    /// Only generate these operation ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    include_operations: Vec<String>,
    /// Leave out these operation ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    exclude_operations: Vec<String>,
    /// Skip operations that fail to translate instead of aborting
    #[arg(long)]
    skip_invalid: bool,
    /// Do not ask before writing into a non-empty output directory
    #[arg(long, short = 'y')]
    yes: bool,
    /// Regenerate whenever the schema file changes
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => {
            let config = build_config(&args).await?;

            if !args.yes && !confirm_output_dir(Path::new(&config.output_dir)).await? {
                println!("Aborted; nothing was written.");
                return Ok(());
            }

            let report = konggen_core::generate(&config)
                .await
                .with_context(|| format!("Failed to generate from {}", config.schema_path))?;
            print_report(&config, &report);

            if args.watch {
                watch_schema(&config).await?;
            }
        }
        Commands::ConfigHelp => print_config_help(),
    }
    Ok(())
}

/// Config file (if any) with command-line flags layered on top
async fn build_config(args: &GenerateArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => {
            let schema_path = args
                .schema_path
                .clone()
                .context("--schema-path is required when no --config is given")?;
            Config::new(schema_path, DEFAULT_OUTPUT_DIR)
        }
    };

    if let Some(schema_path) = &args.schema_path {
        config.schema_path = schema_path.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.to_string_lossy().to_string();
    }
    if let Some(kind) = &args.template_kind {
        let kind: TemplateKind = kind
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid template '{kind}': {e}"))?;
        config.template_kind = kind.to_string();
    }
    if let Some(dir) = &args.template_dir {
        config.template_dir = Some(dir.to_string_lossy().to_string());
    }
    if let Some(host) = &args.kong_host {
        config.gateway.host = Some(host.clone());
    }
    if let Some(port) = &args.kong_port {
        config.gateway.port = Some(port.clone());
    }
    if let Some(name) = &args.target_api_name {
        config.gateway.target_service_name = Some(name.clone());
    }
    if let Some(folder) = &args.source_folder {
        config.source_folder = folder.clone();
    }
    if let Some(package) = &args.api_package {
        config.api_package = package.clone();
    }
    if let Some(package) = &args.model_package {
        config.model_package = package.clone();
    }
    if let Some(mappings) = &args.reserved_words_mappings {
        config
            .reserved_words_mappings
            .extend(parse_key_value_list(mappings).context("Invalid --reserved-words-mappings")?);
    }
    if let Some(properties) = &args.additional_properties {
        config
            .additional_properties
            .extend(parse_key_value_list(properties).context("Invalid --additional-properties")?);
    }
    if !args.include_operations.is_empty() {
        config.include_operations = args.include_operations.clone();
    }
    if !args.exclude_operations.is_empty() {
        config.exclude_operations = args.exclude_operations.clone();
    }
    config.skip_invalid |= args.skip_invalid;

    if config.template_kind == TemplateKind::Custom.as_str() && config.template_dir.is_none() {
        anyhow::bail!("--template-dir is required with --template-kind=custom");
    }
    Ok(config)
}

/// Ask before writing into a non-empty directory. Without a terminal there is
/// nobody to ask, so generation goes ahead.
async fn confirm_output_dir(output_dir: &Path) -> anyhow::Result<bool> {
    let non_empty = match tokio::fs::read_dir(output_dir).await {
        Ok(mut entries) => entries.next_entry().await?.is_some(),
        Err(_) => false,
    };
    if !non_empty {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        warn!(
            "Output directory {} is not empty; existing scripts will be overwritten",
            output_dir.display()
        );
        return Ok(true);
    }
    let prompt = format!(
        "{} is not empty. Overwrite generated files?",
        output_dir.display()
    );
    let proceed = tokio::task::spawn_blocking(move || {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
    })
    .await??;
    Ok(proceed)
}

fn print_report(config: &Config, report: &GenerationReport) {
    for file in &report.files {
        println!("Wrote {}", file.display());
    }
    for skipped in &report.skipped {
        println!("Skipped {} {}: {}", skipped.method, skipped.path, skipped.reason);
    }
    println!(
        "Generated {} route(s) in {} file(s) under {}",
        report.routes,
        report.files.len(),
        config.output_dir
    );
}

fn print_config_help() {
    println!("Generator: {}", GENERATOR_NAME);
    println!("Kind: {}", GENERATOR_KIND);
    println!("{}", GENERATOR_HELP);
    println!();
    println!("Options (--additional-properties key=value):");
    for option in GATEWAY_OPTIONS {
        println!(
            "  {:<14} {} (default: {})",
            option.name, option.description, option.default
        );
    }
}

/// Rerun generation each time the schema file is modified
async fn watch_schema(config: &Config) -> anyhow::Result<()> {
    let schema_path = PathBuf::from(&config.schema_path);
    if !schema_path.exists() {
        anyhow::bail!("--watch needs a local schema file, got {}", config.schema_path);
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    let _ = tx.send(());
                }
            }
            Err(e) => warn!("watch error: {e:?}"),
        },
        notify::Config::default(),
    )?;
    watcher.watch(&schema_path, RecursiveMode::NonRecursive)?;
    info!("Watching {} for changes (Ctrl-C to stop)", schema_path.display());

    while rx.recv().await.is_some() {
        // editors often emit several events per save
        while rx.try_recv().is_ok() {}
        match konggen_core::generate(config).await {
            Ok(report) => print_report(config, &report),
            Err(e) => warn!("Regeneration failed: {e}"),
        }
    }
    Ok(())
}
