use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tablecast::config::Config;
use tablecast::document::Document;
use tablecast::fetch::SourceFetcher;
use tablecast::markup::to_html;
use tablecast::page::{ClickOutcome, Page};
use tablecast::render::{RenderMode, SchemaPolicy};
use tablecast::source;

#[derive(Parser)]
#[command(name = "tablecast", version, about = "Render JSON records as an HTML table")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(long, global = true, env = "TABLECAST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch each target (URL or JSON file) and render it into the page's table
    Show {
        #[arg(required = true)]
        targets: Vec<String>,
        /// Clicks per target
        #[arg(long, default_value_t = 1)]
        clicks: usize,
        /// Drop existing rows before each render
        #[arg(long)]
        replace: bool,
        /// Align mismatched records by field name instead of failing
        #[arg(long)]
        lenient: bool,
        /// Base URL for relative targets
        #[arg(long)]
        base_url: Option<String>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render the result of a SQL query against a DuckDB database
    Query {
        sql: String,
        /// Database file; in-memory when omitted
        #[arg(long)]
        db: Option<PathBuf>,
        /// Statements to run before the query
        #[arg(long)]
        init: Option<String>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit(html: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    match out {
        Some(path) => std::fs::write(&path, html)
            .with_context(|| format!("cannot write {}", path.display())),
        None => {
            println!("{}", html);
            Ok(())
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Show {
            targets,
            clicks,
            replace,
            lenient,
            base_url,
            out,
        } => {
            if replace {
                config.render.mode = RenderMode::Replace;
            }
            if lenient {
                config.render.schema = SchemaPolicy::Lenient;
            }
            if base_url.is_some() {
                config.fetch.base_url = base_url;
            }

            let fetcher = SourceFetcher::new(&config.fetch)?;
            let mut page = Page::new(config.render.renderer(), Arc::new(fetcher));
            let mut ids = Vec::new();
            for (i, target) in targets.iter().enumerate() {
                let id = if i == 0 {
                    config.trigger.control_id.clone()
                } else {
                    format!("{}-{}", config.trigger.control_id, i)
                };
                page.add_control(&id, target).await?;
                ids.push(id);
            }
            for _ in 0..clicks {
                for id in &ids {
                    page.click(id).await?;
                }
            }

            let outcomes = page.settle().await;
            let failed = outcomes
                .iter()
                .filter(|o| matches!(o, ClickOutcome::Failed(_)))
                .count();
            info!(clicks = outcomes.len(), failed, "page settled");
            emit(&page.html().await, out)?;
            if failed > 0 {
                anyhow::bail!("{} of {} fetches failed", failed, outcomes.len());
            }
            Ok(())
        }
        Commands::Query { sql, db, init, out } => {
            let conn = source::open(db.as_deref())?;
            if let Some(init) = init {
                conn.execute_batch(&init).context("init statements failed")?;
            }
            let records = source::query_records(&conn, &sql)?;
            let mut document = Document::new();
            config.render.renderer().render(&mut document, None, &records)?;
            emit(&to_html(&document, document.body()), out)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
