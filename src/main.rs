//! dexdash - DEX analytics in the terminal
//!
//! A terminal UI that shows liquidity, volume, fees and pool transactions for
//! decentralized exchanges across several chains.

mod app;
mod ui;

use std::error::Error;
use std::io::{self, Stdout};
use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use dexdash::cli::{Cli, StartupConfig};
use dexdash::config::Config;
use dexdash::data::{load_snapshot, CovalentClient};
use dexdash::logging::{self, LogTarget};
use dexdash::refresh::{self as background, RefreshConfig, RefreshHandle, RefreshMessage};

use app::{App, AppState};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match &app.state {
        AppState::Loading => {
            render_loading(frame, app);
        }
        AppState::Dashboard => {
            ui::render_dashboard(frame, app);
        }
        AppState::PoolTransactions => {
            ui::render_transactions(frame, app);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while the first market is fetched
fn render_loading(frame: &mut ratatui::Frame, app: &App) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new(format!("Loading {}...", app.market))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Picks the log destination: `--log-file`, else stderr for `--once`, else
/// the cache directory
fn log_target(startup: &StartupConfig) -> LogTarget {
    match (&startup.log_file, startup.once) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::File(logging::default_log_path()),
    }
}

/// Fetches the configured market once and prints it as JSON
async fn print_snapshot(config: &Config) -> Result<(), Box<dyn Error>> {
    let client = CovalentClient::new(config.api.clone())?;
    let snapshot = load_snapshot(&client, config.market).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Main event loop: draw, handle one key, run queued work, drain timers
async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    refresh: &mut RefreshHandle,
) -> Result<(), Box<dyn Error>> {
    // Initial render to show loading state
    terminal.draw(|f| render_ui(f, app))?;
    app.load_market().await;

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.pending.is_some() {
            // Show the loading status before blocking on the network
            terminal.draw(|f| render_ui(f, app))?;
            app.run_pending().await;
        }

        while let Some(message) = background::try_recv(refresh) {
            match message {
                RefreshMessage::RefreshDue => {
                    debug!(market = %app.market, "scheduled refresh");
                    app.load_market().await;
                }
                RefreshMessage::CleanupDue => {
                    let removed = app.cache().cleanup();
                    debug!(removed, "cache cleanup");
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn run_tui(config: Config) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(&config)?;
    let mut refresh = RefreshHandle::spawn(RefreshConfig {
        refresh_interval: config.refresh_interval,
        cleanup_interval: config.cache_ttl,
        enabled: true,
    });

    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &mut refresh).await;

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    refresh.shutdown().await;

    result
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let startup = StartupConfig::from_cli(&cli)?;

    logging::init(&log_target(&startup))?;

    let mut config = Config::load()?;
    startup.apply_to(&mut config);
    info!(
        market = %config.market,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        once = startup.once,
        "starting dexdash"
    );

    if startup.once {
        print_snapshot(&config).await
    } else {
        run_tui(config).await
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "exiting");
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
