//! CLI binary for researchbot.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use researchbot::llm::CompletionClient;
use researchbot::{BatchOutcome, ListInputs, Orchestrator, ResearchConfig, ResearchReport};
use tracing_subscriber::EnvFilter;

/// Researchbot: answers research questions from web, news and custom sources.
#[derive(Parser)]
#[command(name = "researchbot", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Research every prompt in the auto-prompt list (the default).
    Auto {
        /// Stop at the first failed prompt.
        #[arg(long)]
        fail_fast: bool,
    },

    /// Research a single prompt.
    Ask {
        /// The research question.
        #[arg(required = true)]
        prompt: Vec<String>,

        /// Extra context for synthesis, replacing the configured one.
        #[arg(long)]
        context: Option<String>,
    },

    /// Write a config file of defaults to `--config` or the default path.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Serve the research form over HTTP.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = researchbot::web::DEFAULT_BIND)]
        bind: String,
    },
}

const SEPARATOR_WIDTH: usize = 50;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Users can override with RUST_LOG=debug to see everything.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("researchbot=info,research_search=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Command::Init { force }) = cli.command {
        let path = cli
            .config
            .unwrap_or_else(ResearchConfig::default_config_path);
        ResearchConfig::init_file(&path, force)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let config = ResearchConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let lists = ListInputs::load(&config.lists);
    let client: Arc<dyn CompletionClient> = Arc::new(config.completion_client()?);
    let orchestrator = Orchestrator::from_config(&config, client, lists.custom_sources.clone());

    match cli.command.unwrap_or(Command::Auto { fail_fast: false }) {
        Command::Auto { fail_fast } => run_auto(&orchestrator, &lists, fail_fast, cli.json).await,
        Command::Ask { prompt, context } => {
            run_ask(&orchestrator, &prompt.join(" "), context.as_deref(), cli.json).await
        }
        Command::Serve { bind } => {
            researchbot::web::serve(Arc::new(orchestrator), &bind).await?;
            Ok(())
        }
        Command::Init { .. } => Ok(()),
    }
}

async fn run_auto(
    orchestrator: &Orchestrator,
    lists: &ListInputs,
    fail_fast: bool,
    json: bool,
) -> anyhow::Result<()> {
    let prompts = lists.prompts_or_default();
    tracing::info!(prompts = prompts.len(), "running automated research");

    if fail_fast {
        let reports: Vec<ResearchReport> = orchestrator
            .run_batch(&prompts)
            .await?
            .iter()
            .map(|r| r.report())
            .collect();
        if json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            for report in &reports {
                print_report(report);
            }
        }
        return Ok(());
    }

    let outcomes = orchestrator.run_batch_isolated(&prompts).await;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

    if json {
        let items: Vec<serde_json::Value> = outcomes.iter().map(outcome_json).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for outcome in &outcomes {
            match &outcome.result {
                Ok(request) => print_report(&request.report()),
                Err(err) => {
                    eprintln!("Prompt: {}", outcome.prompt);
                    eprintln!("Error: {err}");
                    eprintln!("{}\n", "=".repeat(SEPARATOR_WIDTH));
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} prompts failed", outcomes.len());
    }
    Ok(())
}

async fn run_ask(
    orchestrator: &Orchestrator,
    prompt: &str,
    context: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let request = match context {
        Some(context) => orchestrator.run_one_with_context(prompt, Some(context)).await?,
        None => orchestrator.run_one(prompt).await?,
    };
    let report = request.report();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ResearchReport) {
    println!("{report}");
    println!("{}\n", "=".repeat(SEPARATOR_WIDTH));
}

fn outcome_json(outcome: &BatchOutcome) -> serde_json::Value {
    match &outcome.result {
        Ok(request) => serde_json::json!(request.report()),
        Err(err) => serde_json::json!({
            "prompt": outcome.prompt,
            "error": err.to_string(),
        }),
    }
}
