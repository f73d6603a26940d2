//! Subcommand handlers.

use sleuth_core::config::{PageLayout, Secrets, SleuthConfig};
use sleuth_core::memory::{SnippetStore, format_recalled};
use sleuth_core::pipeline::ResearchPipeline;
use sleuth_tools::build_pipeline;
use sleuth_tools::export::export_pdf;
use sleuth_ui::AppState;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Serve the research page
    Serve {
        /// Bind host (overrides settings)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides settings)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Research a topic once and write the PDF report
    Run {
        /// Research topic
        topic: String,
        /// Output PDF path (defaults to the configured file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Run independent collaborators concurrently
        #[arg(long)]
        concurrent: bool,
    },
    /// Manage the snippet memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum MemoryAction {
    /// Store a snippet
    Add {
        /// Snippet text
        text: String,
    },
    /// Show the snippets most similar to a query
    Search {
        /// Query text
        query: String,
        /// Number of results (defaults to the configured k)
        #[arg(short)]
        k: Option<usize>,
    },
    /// List every stored snippet
    List,
}

impl Commands {
    /// Whether the command calls external services and so needs credentials.
    pub fn needs_secrets(&self) -> bool {
        matches!(self, Commands::Serve { .. } | Commands::Run { .. })
    }
}

pub async fn handle_command(
    command: Commands,
    mut config: SleuthConfig,
    secrets: Secrets,
) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let pipeline = build_pipeline(&config, &secrets)?;
            let state = Arc::new(
                AppState::new(pipeline, config.export.clone()).with_session_limits(
                    Duration::from_secs(config.server.session_ttl_secs),
                    config.server.max_sessions,
                ),
            );
            let addr = config.server.bind_address();
            println!("Serving on http://{}", addr);
            sleuth_ui::run(state, &addr).await?;
            Ok(())
        }
        Commands::Run {
            topic,
            output,
            concurrent,
        } => {
            config.pipeline.concurrent |= concurrent;
            let pipeline = build_pipeline(&config, &secrets)?;
            let output = output.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            run_topic(
                &pipeline,
                &topic,
                &config.export,
                &output,
                &mut std::io::stdout(),
            )
            .await
        }
        Commands::Memory { action } => handle_memory(action, &config),
    }
}

/// Research `topic`, print the recalled memory and the report to `out`, and
/// write the PDF to `output`.
pub async fn run_topic(
    pipeline: &ResearchPipeline,
    topic: &str,
    layout: &PageLayout,
    output: &Path,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    info!(topic = %topic, mode = ?pipeline.mode(), "Starting research run");
    let run = pipeline.run(topic).await?;

    writeln!(out, "Recalled Memory (for context only)")?;
    writeln!(out, "{}", format_recalled(&run.recalled_memory))?;
    let text = run.report.render();
    writeln!(out, "{}", text)?;

    export_pdf(&text, layout, output)?;
    info!(path = %output.display(), "Report exported");
    writeln!(out, "Report written to {}", output.display())?;
    Ok(())
}

fn handle_memory(action: MemoryAction, config: &SleuthConfig) -> anyhow::Result<()> {
    let mut store = SnippetStore::open(&config.memory.path, config.memory.dimensions)?;
    match action {
        MemoryAction::Add { text } => {
            if text.trim().is_empty() {
                anyhow::bail!("Snippet text must not be blank");
            }
            store.add(text.trim());
            store.save()?;
            println!(
                "Stored snippet ({} total in {})",
                store.len(),
                store.path().display()
            );
        }
        MemoryAction::Search { query, k } => {
            let results = store.search(&query, k.unwrap_or(config.memory.k));
            if results.is_empty() {
                println!("{}", sleuth_core::NO_MEMORY_MESSAGE);
            }
            for (text, score) in results {
                println!("{:.3}  {}", score, text);
            }
        }
        MemoryAction::List => {
            if store.is_empty() {
                println!("Memory is empty ({})", store.path().display());
            }
            for (i, text) in store.snippets().enumerate() {
                println!("{:>3}. {}", i + 1, text);
            }
        }
    }
    Ok(())
}
