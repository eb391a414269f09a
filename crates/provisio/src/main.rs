mod commands;

use clap::{Parser, Subcommand};
use provisio_databricks::{CloudBackend, DatabricksCapability, InMemoryBackend};
use provisio_engine::{Engine, EngineConfig};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "provisio")]
#[command(about = "Plan, approve and deploy cloud infrastructure through pluggable capabilities", long_about = None)]
struct Cli {
    /// Force the approval gate for plans above this monthly cost (USD)
    #[arg(long, env = "PROVISIO_APPROVAL_THRESHOLD", global = true)]
    threshold: Option<f64>,

    /// Attempt rollback when an execution fails
    #[arg(long, global = true)]
    rollback_on_failure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered capabilities
    List {
        /// Only capabilities carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show one capability's parameters and tags
    Show {
        /// Capability name
        name: String,
    },
    /// Produce and display a deployment plan without executing it
    Plan {
        /// Capability name
        name: String,
        /// Parameter as key=value; value is parsed as JSON when possible
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Free-text request recorded in the run context
        #[arg(short, long, default_value = "Provision infrastructure")]
        request: String,
    },
    /// Run the full lifecycle: plan, approval gate, execute
    Deploy {
        /// Capability name
        name: String,
        /// Parameter as key=value; value is parsed as JSON when possible
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Free-text request recorded in the run context
        #[arg(short, long, default_value = "Provision infrastructure")]
        request: String,
        /// Approve plans without asking
        #[arg(short, long)]
        yes: bool,
    },
}

fn build_engine(config: EngineConfig) -> anyhow::Result<Engine> {
    let backend = Arc::new(InMemoryBackend::new()) as Arc<dyn CloudBackend>;
    let engine = Engine::builder()
        .config(config)
        .register(
            DatabricksCapability::registry_entry(),
            Arc::new(DatabricksCapability::new(backend)),
        )?
        .build();
    Ok(engine)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let engine = build_engine(EngineConfig {
        approval_cost_threshold: cli.threshold,
        rollback_on_failure: cli.rollback_on_failure,
    })?;

    match cli.command {
        Commands::List { tag } => commands::list::handle(&engine, tag.as_deref()),
        Commands::Show { name } => commands::show::handle(&engine, &name),
        Commands::Plan {
            name,
            params,
            request,
        } => commands::plan::handle(&engine, &name, &params, &request).await,
        Commands::Deploy {
            name,
            params,
            request,
            yes,
        } => commands::deploy::handle(&engine, &name, &params, &request, yes).await,
    }
}
