//! ACK Generator CLI
//!
//! Command-line interface for deriving ACK resources from AWS API models.

use ack_generator_common::{GeneratorConfig, OpType, ServiceModel};
use ack_generator_generator::CrdGenerator;
use ack_generator_model::{Crd, PrimaryIdentifier, SchemaContext};
use ack_generator_parser::{parse_model_file, ModelFormat};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Environment variable holding the log filter
const LOG_ENV: &str = "ACK_GENERATE_LOG";
/// Per-service configuration file looked up under `--config-dir`
const CONFIG_FILE: &str = "generator.yaml";

#[derive(Parser)]
#[command(name = "ack-generate")]
#[command(version, about = "Generate ACK resources from AWS API models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a model file and display the shapes and operations it defines
    #[command(after_help = "EXAMPLES:\n  \
        # Parse an AWS JSON model\n  \
        ack-generate parse --model ecr/2015-09-21/api-2.json\n\n  \
        # Parse a Smithy JSON AST model\n  \
        ack-generate parse --model sqs.json --format smithy")]
    Parse {
        /// Path to the model file
        #[arg(short, long)]
        model: PathBuf,

        /// Model format (auto-detected if not specified)
        #[arg(short, long)]
        format: Option<FormatArg>,
    },

    /// Show the resources derived from a model
    #[command(after_help = "EXAMPLES:\n  \
        ack-generate crds --model sns/api-2.json --config sns/generator.yaml")]
    Crds {
        /// Path to the model file
        #[arg(short, long)]
        model: PathBuf,

        /// Generator configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Model format (auto-detected if not specified)
        #[arg(short, long)]
        format: Option<FormatArg>,
    },

    /// Generate Go sources for one service
    #[command(after_help = "EXAMPLES:\n  \
        ack-generate generate \\\n    \
        --model ecr/api-2.json \\\n    \
        --config ecr/generator.yaml \\\n    \
        --output ./ecr-controller")]
    Generate {
        /// Path to the model file
        #[arg(short, long)]
        model: PathBuf,

        /// Generator configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Model format (auto-detected if not specified)
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Generate Go sources for every model found in a directory
    #[command(after_help = "EXAMPLES:\n  \
        # Every model under ./models, one output directory per service\n  \
        ack-generate generate-all --models-dir ./models --output ./controllers\n\n  \
        # Only some services, with configs at <config-dir>/<service>/generator.yaml\n  \
        ack-generate generate-all \\\n    \
        --models-dir ./models \\\n    \
        --config-dir ./configs \\\n    \
        --filter ecr,sns \\\n    \
        --output ./controllers")]
    GenerateAll {
        /// Directory containing model files
        #[arg(long)]
        models_dir: PathBuf,

        /// Directory holding `<service>/generator.yaml` files
        #[arg(long)]
        config_dir: Option<PathBuf>,

        /// Comma-separated list of services to include
        #[arg(long, value_delimiter = ',')]
        filter: Option<Vec<String>>,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// AWS JSON service model (api-2.json)
    Api,
    /// Smithy JSON AST
    Smithy,
}

impl From<FormatArg> for ModelFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Api => ModelFormat::Api,
            FormatArg::Smithy => ModelFormat::Smithy,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse { model, format } => parse_command(&model, format),
        Commands::Crds {
            model,
            config,
            format,
        } => crds_command(&model, config.as_deref(), format),
        Commands::Generate {
            model,
            config,
            format,
            output,
        } => generate_command(&model, config.as_deref(), format, &output),
        Commands::GenerateAll {
            models_dir,
            config_dir,
            filter,
            output,
        } => generate_all_command(&models_dir, config_dir.as_deref(), filter.as_deref(), &output),
    }
}

fn init_tracing(verbose: bool) {
    let env = if verbose {
        "debug".to_string()
    } else {
        std::env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string())
    };
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_model(path: &Path, format: Option<FormatArg>) -> Result<ServiceModel> {
    parse_model_file(path, format.map(ModelFormat::from))
        .with_context(|| format!("Failed to load model: {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    GeneratorConfig::load_or_default(path).with_context(|| match path {
        Some(path) => format!("Failed to load config: {}", path.display()),
        None => "Failed to load default config".to_string(),
    })
}

fn parse_command(path: &Path, format: Option<FormatArg>) -> Result<()> {
    println!("{} Parsing model file: {}", "→".cyan(), path.display());
    let model = load_model(path, format)?;

    println!("\n{}", "✓ Parse successful!".green().bold());
    println!("\n{}", "Service Model:".bold());
    println!("  Service: {}", model.service_id.yellow());
    println!("  Package: {}", model.package_name);
    if let Some(version) = &model.api_version {
        println!("  API version: {}", version.yellow());
    }
    println!("  Shapes: {}", model.shape_count());
    println!("  Operations: {}", model.operation_count());

    if model.operation_count() > 0 {
        println!("\n{}", "Operations:".bold());
        for op in model.operations() {
            let input = op.input.as_ref().map_or("-", |r| r.shape_name.as_str());
            let output = op.output.as_ref().map_or("-", |r| r.shape_name.as_str());
            println!("  • {} ({} → {})", op.name.cyan(), input, output);
        }
    }

    Ok(())
}

fn crds_command(path: &Path, config: Option<&Path>, format: Option<FormatArg>) -> Result<()> {
    let model = load_model(path, format)?;
    let config = load_config(config)?;
    let context = SchemaContext::new(&model, &config);
    let crds = context.crds().context("Failed to derive resources")?;

    println!(
        "{} {} resources in {}",
        "✓".green().bold(),
        crds.len(),
        model.service_id.yellow()
    );
    for crd in crds {
        print_crd(crd);
    }
    Ok(())
}

fn print_crd(crd: &Crd<'_>) {
    let roles: Vec<&str> = OpType::RESOURCE_ROLES
        .iter()
        .filter(|op_type| crd.ops.get(**op_type).is_some())
        .map(OpType::short_label)
        .collect();

    println!("\n  • {} [{}]", crd.kind.cyan(), roles.join(" "));
    println!("    Spec: {}", crd.spec_field_names().join(", "));
    println!("    Status: {}", crd.status_field_names().join(", "));
    match &crd.primary_identifier {
        Some(PrimaryIdentifier::Member { operation, member }) => {
            println!("    ARN: {}.{}", operation, member)
        }
        Some(PrimaryIdentifier::AttributeKey { key }) => println!("    ARN: attribute {}", key),
        None => println!("    ARN: {}", "none".dimmed()),
    }
}

fn generate_command(
    path: &Path,
    config: Option<&Path>,
    format: Option<FormatArg>,
    output: &Path,
) -> Result<()> {
    println!("{} Parsing model: {}", "→".cyan(), path.display());
    let model = load_model(path, format)?;
    let config = load_config(config)?;

    println!("{} Generating {} resources...", "→".cyan(), model.service_id.yellow());
    let written = generate_service(&model, &config, output)?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    for file in &written {
        println!("  📄 {}", file.display());
    }
    Ok(())
}

fn generate_service(model: &ServiceModel, config: &GeneratorConfig, output: &Path) -> Result<Vec<PathBuf>> {
    let context = SchemaContext::new(model, config);
    let generator = CrdGenerator::new(&context).context("Failed to create generator")?;
    generator
        .generate_to_directory(output)
        .with_context(|| format!("Failed to generate {}", model.service_id))
}

fn generate_all_command(
    models_dir: &Path,
    config_dir: Option<&Path>,
    filter: Option<&[String]>,
    output: &Path,
) -> Result<()> {
    println!("{} Scanning directory for models: {}", "→".cyan(), models_dir.display());
    let models = discover_models(models_dir)?;
    if models.is_empty() {
        anyhow::bail!("No model files found in {}", models_dir.display());
    }

    let mut generated = 0;
    let mut skipped = 0;
    for (i, path) in models.iter().enumerate() {
        println!(
            "{} Parsing model {}/{}: {}",
            "→".cyan(),
            i + 1,
            models.len(),
            path.display()
        );

        let result: Result<Option<usize>> = (|| {
            let model = load_model(path, None)?;
            if !matches_filter(&model, filter) {
                debug!(service = %model.service_id, "filtered out");
                return Ok(None);
            }
            let config_path = config_dir
                .map(|dir| dir.join(&model.package_name).join(CONFIG_FILE))
                .filter(|p| p.is_file());
            let config = load_config(config_path.as_deref())?;
            let written = generate_service(&model, &config, &output.join(&model.package_name))?;
            Ok(Some(written.len()))
        })();

        match result {
            Ok(Some(files)) => {
                println!("{} Wrote {} files from {}", "✓".green(), files, path.display());
                generated += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(model = %path.display(), error = %e, "skipping model");
                eprintln!("{} Skipping {}: {:#}", "⚠".yellow(), path.display(), e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        println!("\n{} Skipped {} model(s) due to errors", "⚠".yellow(), skipped);
    }
    println!(
        "\n{} Generated {} services into {}",
        "✓".green().bold(),
        generated,
        output.display()
    );
    Ok(())
}

/// Every `*.json` file below `dir`, in path order
fn discover_models(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }
    let mut models: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .map(|e| e.into_path())
        .collect();
    models.sort();
    Ok(models)
}

fn matches_filter(model: &ServiceModel, filter: Option<&[String]>) -> bool {
    filter.map_or(true, |names| {
        names.iter().any(|name| {
            name.eq_ignore_ascii_case(&model.package_name) || name.eq_ignore_ascii_case(&model.service_id)
        })
    })
}
