use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client_core::{parse_bundled, ArticleListController, DurableStore, HttpArticleSource};
use shared::domain::{Article, SortColumn, SortDirection};
use storage::{clear_snapshot, MemoryStore, Storage};
use tracing::{info, warn};

mod config;
mod render;
mod session;

use config::{load_settings, prepare_database_url};
use render::TableRenderer;

const DEFAULT_BUNDLED_ARTICLES: &str = include_str!("../data/articles.json");

#[derive(Parser, Debug)]
#[command(about = "Browse and sort unpublished articles")]
struct Cli {
    /// Config file; defaults to ./reader.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    /// Page URL that ./more-articles.json is resolved against.
    #[arg(long)]
    base_url: Option<String>,
    /// JSON article array replacing the built-in collection.
    #[arg(long)]
    bundled: Option<PathBuf>,
    /// Keep sort state in memory only.
    #[arg(long)]
    ephemeral: bool,
    #[arg(long)]
    no_images: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current page.
    Show,
    /// Reveal more rows, fetching remote pages once local ones run out.
    LoadMore {
        #[arg(long, default_value_t = 1)]
        times: usize,
    },
    /// Sort by `words` or `submitted` (alias `publish_at`).
    Sort {
        column: SortColumn,
        #[arg(long)]
        direction: Option<SortDirection>,
    },
    /// Dump the stored snapshot as JSON.
    Snapshot,
    /// Forget the stored snapshot.
    Reset,
    /// Read gestures from stdin until `quit`.
    Interactive,
}

fn load_bundled(path: Option<&Path>) -> Result<Vec<Article>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read bundled articles '{}'", path.display()))?;
            parse_bundled(&raw)
        }
        None => parse_bundled(DEFAULT_BUNDLED_ARTICLES),
    }
}

async fn open_store(database_url: &str, ephemeral: bool) -> Result<Arc<dyn DurableStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let database_url = prepare_database_url(database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        tracing::error!(%database_url, ?error, "failed to open reader state database");
        error
    })?;
    storage.health_check().await?;
    info!(%database_url, "opened reader state");
    Ok(Arc::new(storage))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(v) = cli.database_url {
        settings.database_url = v;
    }
    if let Some(v) = cli.base_url {
        settings.base_url = v;
    }
    if let Some(v) = cli.bundled {
        settings.bundled_articles_path = Some(v);
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(io::stderr)
        .init();

    let bundled = load_bundled(settings.bundled_articles_path.as_deref())?;
    let source = Arc::new(HttpArticleSource::new(&settings.base_url, bundled)?);
    info!(url = %source.more_articles_url(), "remote articles endpoint");
    let store = open_store(&settings.database_url, cli.ephemeral).await?;

    let mut controller = ArticleListController::new(source, store.clone());
    if let Err(err) = controller.mount().await {
        warn!(error = %err, "stored snapshot is unreadable; showing bundled articles");
    }

    let renderer = TableRenderer {
        show_images: !cli.no_images,
    };
    let mut stdout = io::stdout();

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => renderer.render(&mut stdout, controller.state(), Utc::now())?,
        Command::LoadMore { times } => {
            for _ in 0..times {
                let outcome = controller.load_more().await;
                info!(?outcome, "load more");
            }
            renderer.render(&mut stdout, controller.state(), Utc::now())?;
        }
        Command::Sort { column, direction } => {
            let direction = direction.unwrap_or_else(|| controller.next_direction(column));
            controller.sort_by(direction, column).await?;
            renderer.render(&mut stdout, controller.state(), Utc::now())?;
        }
        Command::Snapshot => match controller.snapshot() {
            Some(snapshot) => writeln!(stdout, "{}", serde_json::to_string_pretty(snapshot)?)?,
            None => writeln!(stdout, "no snapshot stored")?,
        },
        Command::Reset => {
            clear_snapshot(store.as_ref()).await?;
            writeln!(stdout, "snapshot cleared")?;
        }
        Command::Interactive => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            session::run(&mut controller, &renderer, input, &mut stdout).await?;
        }
    }

    stdout.flush()?;
    Ok(())
}
