use anyhow::{Context, Result};
use clap::Parser;
use sheetreport_core::{sample_records, AppState, Config, Provider, ReportClient};
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "sheetreport")]
#[command(about = "Enter sales records and generate AI-written sales reports")]
#[command(version)]
struct Cli {
    /// AI provider (gemini, ollama, openai); overrides the config file
    #[arg(short, long, value_parser = parse_provider)]
    provider: Option<Provider>,

    /// Model name; defaults to the provider's default model
    #[arg(short, long)]
    model: Option<String>,

    /// Start with an empty data sheet instead of the sample records
    #[arg(long)]
    empty: bool,

    /// Directory printed reports are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_provider(s: &str) -> Result<Provider, String> {
    Provider::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Provider::all().iter().map(|p| p.as_str()).collect();
        format!("unknown provider '{}', expected one of: {}", s, names.join(", "))
    })
}

/// Logs go to a file since the terminal belongs to the UI
fn init_logging(verbose: bool) -> Result<PathBuf> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("sheetreport");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Could not create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("sheetreport.log");
    let log_file = File::options().create(true).append(true).open(&log_path)?;

    let default_filter = if verbose {
        "sheetreport=debug,sheetreport_core=debug,warn"
    } else {
        "sheetreport=info,sheetreport_core=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(log_path)
}

fn load_config(cli: &Cli) -> Config {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable config file");
            Config::new()
        }
    }
    .with_env();

    if let Some(provider) = cli.provider {
        config.provider = Some(provider.as_str().to_string());
        // A model saved for another provider would not exist on this one
        config.default_model = None;
    }
    if let Some(model) = &cli.model {
        config.default_model = Some(model.clone());
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_logging(cli.verbose)?;

    let config = load_config(&cli);
    let client = ReportClient::from_config(&config);
    info!(
        provider = client.provider().as_str(),
        model = client.model(),
        log = %log_path.display(),
        "starting sheetreport"
    );

    let records = if cli.empty { Vec::new() } else { sample_records() };

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(AppState::new(records), client, config.output_dir(), events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
