use anyhow::{Context, Result};
use clap::Parser;
use searching_tool::app::{self, SearchEvent, SearchSession};
use searching_tool::config::{self, AppConfig};
use searching_tool::core::{opener, PreviewRegistry, SearchType};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Search a directory tree for files or folders by name or content.
#[derive(Debug, Parser)]
#[command(name = "searching-tool", version)]
struct Cli {
    /// Directory to search (defaults to the configured one, then ~/Documents)
    directory: Option<PathBuf>,

    /// Search term; empty lists everything that passes the filters
    #[arg(short, long, default_value = "")]
    term: String,

    /// Match folder names instead of file names
    #[arg(short = 'd', long)]
    directories: bool,

    /// Category to filter by
    #[arg(short, long, default_value = "All")]
    category: String,

    /// Extension to switch off inside the selected category, or in every
    /// category when none is selected (repeatable)
    #[arg(long = "disable", value_name = "EXT")]
    disabled: Vec<String>,

    /// Alternative config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replace the stored config with the one in FILE before searching
    #[arg(long, value_name = "FILE")]
    import_config: Option<PathBuf>,

    /// Write the effective config to FILE and exit
    #[arg(long, value_name = "FILE", conflicts_with = "import_config")]
    export_config: Option<PathBuf>,

    /// Print the category table, disabled extensions in brackets, and exit
    #[arg(long)]
    list_categories: bool,

    /// Print a preview of the first result
    #[arg(long)]
    preview: bool,

    /// Open the first result with the default application
    #[arg(long)]
    open: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app_config = match (&cli.import_config, &cli.config) {
        (Some(source), target) => {
            let imported = config::settings::import_config(source)
                .with_context(|| format!("Failed to import {}", source.display()))?;
            config::settings::save_config(&imported, target.as_deref())?;
            imported
        }
        (None, Some(path)) => config::settings::load_config(Some(path.as_path()))?,
        (None, None) => AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {}", e);
            AppConfig::default()
        }),
    };

    if let Some(target) = &cli.export_config {
        config::settings::export_config(&app_config, target)
            .with_context(|| format!("Failed to export config to {}", target.display()))?;
        return Ok(());
    }

    let mut session = SearchSession::new(app_config);
    for ext in &cli.disabled {
        session.toggle_extension(&cli.category, ext, false)?;
    }

    if cli.list_categories {
        for category in session.catalog.categories() {
            let mut listed = Vec::new();
            for ext in session.catalog.extensions_of(category)? {
                if session.catalog.is_enabled(category, &ext)? {
                    listed.push(ext);
                } else {
                    listed.push(format!("[{}]", ext));
                }
            }
            println!("{}: {}", category, listed.join(" "));
        }
        return Ok(());
    }

    if let Some(dir) = &cli.directory {
        session.set_directory(dir)?;
    }
    session.set_search_term(cli.term.as_str());
    session.set_search_type(if cli.directories {
        SearchType::Directory
    } else {
        SearchType::File
    });
    session.select_category(&cli.category)?;
    // One-shot run: no keystrokes to debounce.
    session.config.debounce_ms = 0;
    let preview_lines = session.config.preview_max_lines;

    let state = Arc::new(Mutex::new(session));
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SearchEvent>();
    let generation = app::tasks::start_search(state, event_tx);

    let mut rows = Vec::new();
    while let Some(event) = event_rx.recv().await {
        match event {
            SearchEvent::Results {
                generation: g,
                rows: r,
            } if g == generation => {
                rows = r;
            }
            SearchEvent::Results { .. } => {}
            SearchEvent::ShowError(message) => {
                eprintln!("Error: {}", message);
            }
        }
    }

    for row in &rows {
        println!("{}\t{}", row.name, row.full_path.display());
    }

    if let Some(first) = rows.first() {
        if cli.preview {
            let preview = PreviewRegistry::with_defaults(preview_lines)
                .preview(&first.full_path)
                .with_context(|| format!("Failed to preview {}", first.full_path.display()))?;
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        if cli.open {
            opener::open_path(&first.full_path)?;
        }
    }

    Ok(())
}
