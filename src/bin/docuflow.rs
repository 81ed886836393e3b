//! CLI binary for docuflow.
//!
//! A thin shim over the library crate: maps flags to `WorkflowConfig`,
//! runs a workflow or a declarative pipeline, and prints the outcome.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docuflow::{
    run_workflow, LocalToolchain, PipelineDefinition, PipelineRunner, PipelineVariables,
    WorkflowConfig,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Plan and extract with the offline mock backend
  docuflow run "Process invoice.pdf" --backend mock

  # Same, against a local Ollama model
  OLLAMA_MODEL=llama3.2 docuflow run "Process invoice.pdf"

  # Run a declarative conversion pipeline
  docuflow pipeline graphs/pdf-ocr.json --var document=invoice.pdf

  # Machine-readable output
  docuflow run "Process invoice.pdf" --backend mock --json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY     OpenAI API key (auto-selects the openai backend)
  OPENAI_MODEL       OpenAI model ID (default: gpt-4o-mini)
  OLLAMA_HOST        Ollama endpoint (default: http://localhost:11434)
  OLLAMA_MODEL       Ollama model name (auto-selects the ollama backend)
  DOCUFLOW_BACKEND   Override backend (mock, openai, ollama)
  DOCUFLOW_MODEL     Override model ID for the chosen backend
  USE_MOCK           "true" selects the mock backend

SETUP:
  1. Set a key:   export OPENAI_API_KEY=sk-...
  2. Run:         docuflow run "Process document.pdf"

  The pipeline subcommand needs Poppler (pdftoppm) and Tesseract on PATH.
"#;

/// Orchestrate document-understanding work with LLM agents.
#[derive(Parser, Debug)]
#[command(
    name = "docuflow",
    version,
    about = "Plan and run document-extraction work with LLM agents",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCUFLOW_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true, env = "DOCUFLOW_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the plan→extract workflow for an input request.
    Run {
        /// The request, e.g. "Process invoice.pdf".
        input: String,

        /// Model backend: mock, openai, ollama.
        #[arg(long, env = "DOCUFLOW_BACKEND")]
        backend: Option<String>,

        /// Model ID for the chosen backend.
        #[arg(long, env = "DOCUFLOW_MODEL")]
        model: Option<String>,

        /// Ceiling on graph node executions.
        #[arg(long, default_value_t = 25)]
        max_steps: usize,

        /// Per-model-call timeout in seconds.
        #[arg(long, default_value_t = 60)]
        api_timeout: u64,

        /// Print the full final state as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Execute a declarative pipeline definition (JSON file).
    Pipeline {
        /// Path to the definition, e.g. graphs/pdf-ocr.json.
        definition: PathBuf,

        /// Seed variables as name=value pairs (repeatable).
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Directory for tool output when a step omits outDir.
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,

        /// Print the full final variable map as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{s}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Run {
            input,
            backend,
            model,
            max_steps,
            api_timeout,
            json,
        } => {
            let mut builder = WorkflowConfig::builder()
                .max_steps(max_steps)
                .api_timeout_secs(api_timeout);
            if let Some(backend) = backend {
                builder = builder.backend(backend);
            }
            if let Some(model) = model {
                builder = builder.model(model);
            }
            let config = builder.build().context("invalid configuration")?;

            let state = run_workflow(&input, &config)
                .await
                .context("workflow run failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("tasks: {}", state.tasks.len());
                for (input, result) in &state.results {
                    match result.extracted_text() {
                        Some(text) => println!("--- {input} ---\n{text}"),
                        None => println!("--- {input} ---\n{result:?}"),
                    }
                }
            }
        }

        Command::Pipeline {
            definition,
            vars,
            out_dir,
            json,
        } => {
            let definition = PipelineDefinition::from_json_file(&definition)
                .await
                .context("failed to load pipeline definition")?;

            let initial: PipelineVariables = vars
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();

            let runner = PipelineRunner::new(Arc::new(LocalToolchain::new()))
                .with_default_out_dir(out_dir);
            let finals = runner
                .run(&definition, initial)
                .await
                .context("pipeline run failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&finals)?);
            } else if let Some(text) = finals.get("text").and_then(|v| v.as_str()) {
                println!("{text}");
            } else {
                println!("{}", serde_json::to_string_pretty(&finals)?);
            }
        }
    }

    Ok(())
}
