use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wsgraph_core::{Config, FileStore, ModelDefinition, WorkspaceManager};

#[derive(Parser)]
#[command(name = "wsgraph")]
#[command(about = "Workspace artifact graph", long_about = None)]
struct Cli {
    /// Workspace root (overrides config)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the workspace and print a summary
    Load,
    /// Print the assembled definition of a model
    Show {
        /// Model id, e.g. rest.User
        model_id: String,
    },
    /// Create a model from a JSON definition
    AddModel {
        model_id: String,
        /// Model definition as JSON
        definition: String,
    },
    /// Add a property to a model
    AddProperty {
        model_id: String,
        name: String,
        /// Property definition as JSON
        definition: String,
    },
    /// Print the effective configuration
    Config,
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn parse_json(text: &str, what: &str) -> Result<Value> {
    serde_json::from_str(text).with_context(|| format!("{what} is not valid JSON"))
}

fn parse_object(text: &str, what: &str) -> Result<serde_json::Map<String, Value>> {
    match parse_json(text, what)? {
        Value::Object(object) => Ok(object),
        _ => bail!("{what} must be a JSON object"),
    }
}

async fn open_workspace(config: &Config) -> Result<WorkspaceManager<FileStore>> {
    let mut manager = WorkspaceManager::open(config.workspace.clone());
    manager
        .load_workspace()
        .await
        .with_context(|| format!("failed to load workspace at {}", config.workspace.root.display()))?;
    Ok(manager)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(root) = cli.root {
        config.workspace.root = root;
    }
    tracing::debug!(root = %config.workspace.root.display(), "using workspace");

    match cli.command {
        Commands::Load => {
            let mut manager = WorkspaceManager::open(config.workspace.clone());
            let summary = manager.load_workspace().await?;
            println!("Loaded workspace: {}", config.workspace.root.display());
            println!("  Facets: {}", summary.facets);
            println!("  Models: {}", summary.models);
            println!("  Model configs: {}", summary.model_configs);
            println!("  Datasource files: {}", summary.data_sources);
            println!("  Middleware files: {}", summary.middleware);
            println!("  Package definition: {}", if summary.package_definition { "yes" } else { "no" });
            for path in &summary.ignored {
                tracing::warn!(path = %path.display(), "artifact not attributed to a facet");
                println!("  Ignored: {}", path.display());
            }
        }
        Commands::Show { model_id } => {
            let manager = open_workspace(&config).await?;
            let definition = manager.get_model_definition(&model_id)?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        Commands::AddModel {
            model_id,
            definition,
        } => {
            let value = parse_json(&definition, "model definition")?;
            let definition = ModelDefinition::from_value(value).context("invalid model definition")?;
            let mut manager = open_workspace(&config).await?;
            manager.add_model(&model_id, definition).await?;
            tracing::info!(model = %model_id, "created model");
            println!("Created model: {model_id}");
        }
        Commands::AddProperty {
            model_id,
            name,
            definition,
        } => {
            let definition = parse_object(&definition, "property definition")?;
            let mut manager = open_workspace(&config).await?;
            manager.add_model_property(&model_id, &name, definition).await?;
            tracing::info!(model = %model_id, property = %name, "added property");
            println!("Added property {name} to {model_id}");
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
