use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use rockon_manager::api::{create_service, RockonClient};
use rockon_manager::error::{Result, RockonError};
use rockon_manager::event::{Event, EventHandler};
use rockon_manager::manager::{ManagerAction, ManagerApp, ManagerConfig};
use std::io::stdout;
use std::panic;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rockon-manager")]
#[command(author, version, about = "Terminal manager for Rock-on add-ons")]
struct Args {
    /// Path to config file (default: ~/.config/rockon-manager/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Use an in-memory demo appliance instead of the REST API
    #[arg(long)]
    dryrun: bool,

    /// Appliance base URL, e.g. https://nas.local
    #[arg(long)]
    base_url: Option<String>,

    /// Log file path (logging disabled if not specified)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging only if log file is specified
    if let Some(ref log_path) = args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .ok();

        if let Some(file) = file {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .init();

            info!("Starting rockon-manager");
        }
    }

    // Load config from specified path, default path, or use defaults
    let mut config = match args.config.as_deref() {
        Some(path) => ManagerConfig::load_from(path).unwrap_or_default(),
        None => ManagerConfig::load().unwrap_or_default(),
    };

    // Flags override config
    if args.dryrun {
        config.general.dryrun = true;
    }
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }

    // Set up panic handler to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;

    let result = run_manager(&mut terminal, config).await;

    restore_terminal()?;

    if let Err(ref e) = result {
        error!("Manager error: {}", e);
    }

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode().map_err(|e| RockonError::Terminal(e.to_string()))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| RockonError::Terminal(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).map_err(|e| RockonError::Terminal(e.to_string()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().map_err(|e| RockonError::Terminal(e.to_string()))?;
    execute!(stdout(), LeaveAlternateScreen).map_err(|e| RockonError::Terminal(e.to_string()))?;
    Ok(())
}

async fn run_manager(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    config: ManagerConfig,
) -> Result<()> {
    let client = if config.general.dryrun {
        info!("Dryrun mode, using the demo appliance");
        None
    } else {
        let api = &config.api;
        Some(RockonClient::new(
            &api.base_url,
            api.request_timeout(),
            api.accept_invalid_certs,
            api.page_size,
        )?)
    };
    let service = create_service(config.general.dryrun, client);

    let mut events = EventHandler::new(Duration::from_millis(250));
    let (mut app, mut messages) = ManagerApp::new(config, service);
    app.perform(ManagerAction::Refresh);

    loop {
        terminal
            .draw(|frame| rockon_manager::ui::draw(frame, &app))
            .map_err(|e| RockonError::Terminal(e.to_string()))?;

        tokio::select! {
            Some(event) = events.next() => match event {
                Event::Key(key) => {
                    if let Some(action) = app.handle_key(key) {
                        app.perform(action);
                    }
                }
                Event::Resize => {}
                Event::Tick => app.tick(),
            },
            Some(message) = messages.recv() => app.handle_message(message),
            else => break,
        }

        if app.should_exit {
            break;
        }
    }

    info!("Exiting rockon-manager");
    Ok(())
}
