use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use axion_host::app::{App, startup_diagnostic};
use axion_host::content::ContentSource;
use axion_host::headless;
use axion_host::logging;
use axion_host::model::config::AppConfig;
use axion_host::msg::Msg;

/// Native host window for the Axion editor.
#[derive(Parser, Debug)]
#[command(name = "axion", version, about, long_about = None)]
struct Cli {
    /// Run startup and the page's startup calls, print the outcomes, exit.
    #[arg(long)]
    headless: bool,

    /// Debug logging.
    #[arg(long, short)]
    dev: bool,

    /// Page manifest to load instead of the configured one.
    #[arg(long)]
    page: Option<PathBuf>,

    /// Config file to use instead of the user config.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let filter = if cli.dev {
        logging::DEV_FILTER
    } else {
        config.general.log_filter.as_str()
    };
    let _guard = logging::init(filter)?;

    tracing::info!("axion starting");

    let source = cli
        .page
        .map(ContentSource::File)
        .unwrap_or_else(|| config.content_source());

    if cli.headless {
        return Ok(match headless::run(&config, source, &mut io::stdout().lock()) {
            Ok(report) if report.failed() => ExitCode::FAILURE,
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => startup_failed(&err),
        });
    }

    let (tx, rx) = mpsc::channel::<Msg>();
    let tick_rate = config.tick_rate();

    // Startup runs before the terminal is taken over so a registration
    // conflict prints a readable diagnostic.
    let app = match App::new(config, source, tx.clone()) {
        Ok(app) => app,
        Err(err) => return Ok(startup_failed(&err)),
    };

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, app, tx, rx, tick_rate);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("axion error: {e:?}");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn startup_failed(err: &anyhow::Error) -> ExitCode {
    tracing::error!("startup failed: {err:#}");
    eprintln!("{}", startup_diagnostic(err));
    ExitCode::FAILURE
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    tx: mpsc::Sender<Msg>,
    rx: mpsc::Receiver<Msg>,
    tick_rate: Duration,
) -> Result<()> {
    // Input thread — reads terminal events and forwards as Msg
    let tx_input = tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event) = event::read() {
                let msg = match event {
                    Event::Key(k) => Msg::Key(k),
                    Event::Resize(w, h) => Msg::Resize(w, h),
                    _ => continue,
                };
                if tx_input.send(msg).is_err() {
                    break;
                }
            }
        }
    });

    // Tick thread
    let tx_tick = tx;
    thread::spawn(move || {
        loop {
            thread::sleep(tick_rate);
            if tx_tick.send(Msg::Tick).is_err() {
                break;
            }
        }
    });

    terminal.draw(|f| app.view(f))?;

    // ── Main event loop ──
    loop {
        // Batch-drain all pending messages
        let first = rx.recv()?;
        app.update(first)?;

        while let Ok(msg) = rx.try_recv() {
            app.update(msg)?;
        }

        if app.should_quit {
            break;
        }

        terminal.draw(|f| app.view(f))?;
    }

    tracing::info!("axion exiting");
    Ok(())
}
