use agentic_workflow::config::{self, WorkflowConfig};
use agentic_workflow::error::WorkflowError;
use agentic_workflow::logging;
use agentic_workflow::server;
use agentic_workflow::service::{InferenceRequest, WorkflowService};
use agentic_workflow::tools::{DynamicToolCompiler, ToolRegistry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "agentic-workflow", version)]
#[command(about = "Single-step reasoning agent with a runtime-extensible tool registry")]
struct Cli {
    /// Configuration file (default: ./agentic-workflow.toml, then the XDG config dir)
    #[arg(short, long, global = true, env = "AGENTIC_WORKFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address (overrides [server].bind)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Answer one query and print the result
    Ask {
        /// The query
        query: String,
        /// Username the conversation is recorded under
        #[arg(long)]
        username: Option<String>,
        /// Sampling temperature (overrides [provider].temperature)
        #[arg(long)]
        temperature: Option<f32>,
    },
    /// List registered tools
    Tools,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), WorkflowError> {
    let mut settings = match &cli.config {
        Some(path) => config::from_path(path)?,
        None => config::load()?,
    };

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.server.bind = bind;
            }
            logging::init(&settings.logging)?;
            let service = WorkflowService::from_config(&settings).await?;
            server::serve(service, &settings.server).await
        }
        Commands::Ask {
            query,
            username,
            temperature,
        } => {
            logging::init(&settings.logging)?;
            let service = WorkflowService::from_config(&settings).await?;
            let mut request = InferenceRequest::new(query);
            request.temperature = temperature;
            let username = username.unwrap_or_else(|| settings.default_username.clone());

            let response = service.infer(&username, request).await?;
            if !response.reasoning.is_empty() {
                println!("Reasoning: {}\n", response.reasoning);
            }
            println!("{}", response.answer);
            Ok(())
        }
        Commands::Tools => {
            print_tools(&settings).await;
            Ok(())
        }
    }
}

async fn print_tools(settings: &WorkflowConfig) {
    let registry = ToolRegistry::with_builtins(DynamicToolCompiler::new(settings.sandbox.clone()));
    if let Some(path) = &settings.storage.tool_snapshot {
        registry.load_snapshot(path).await;
    }

    for tool in registry.list() {
        println!(
            "{:<22} {:<8} {}",
            tool.name(),
            tool.definition().source.label(),
            tool.description()
        );
    }
}
