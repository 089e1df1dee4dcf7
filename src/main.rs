use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quotawatch::config::Overrides;
use quotawatch::export::{fetch_all, write_report, Report};
use quotawatch::scheduler::ConsoleFetcher;
use quotawatch::{
    events, ui, App, ChannelSink, ChannelSource, MetricFetcher, RefreshScheduler, Settings,
    SnapshotStore, View, ViewGuard,
};
use quotawatch_adapters::ConsoleClient;

#[derive(Parser, Debug)]
#[command(name = "quotawatch")]
#[command(about = "Terminal console for storage quota and capacity monitoring")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Console backend base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Monitoring refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Quota and policy refresh interval in seconds
    #[arg(long)]
    quota_refresh: Option<u64>,

    /// Number of top consumers to rank
    #[arg(short, long)]
    top: Option<usize>,

    /// Fetch everything once, write a JSON report to this file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            monitoring_refresh_secs: self.refresh,
            quota_refresh_secs: self.quota_refresh,
            top_consumers: self.top,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    let _log_guard = init_logging(&settings)?;

    // One worker: fetches are I/O bound and the TUI owns the main thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    let client = ConsoleClient::builder()
        .endpoint(settings.endpoint.clone())
        .timeout(settings.request_timeout())
        .build()?;
    let fetcher: Arc<dyn MetricFetcher> =
        Arc::new(ConsoleFetcher::new(client, settings.top_consumers));
    let store = Arc::new(SnapshotStore::new());

    if let Some(export_path) = args.export {
        return runtime.block_on(export_to_file(fetcher, &store, &export_path));
    }

    info!(endpoint = %settings.endpoint, "starting console");
    let scheduler = RefreshScheduler::new(runtime.handle().clone(), fetcher, Arc::clone(&store));
    let result = run_tui(&settings, &scheduler, store);

    // Stop timers and in-flight fetches before the runtime goes away.
    drop(scheduler);
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Log to a file; stdout belongs to the TUI.
fn init_logging(settings: &Settings) -> Result<WorkerGuard> {
    let path = &settings.log_file;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    let file_name = path.file_name().context("log_file must name a file")?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    Ok(guard)
}

/// Run the TUI until the user quits.
fn run_tui(
    settings: &Settings,
    scheduler: &RefreshScheduler,
    store: Arc<SnapshotStore>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let (sink, source) = ChannelSource::create(&settings.endpoint);
    let mut app = App::new(Box::new(source), store);

    let result = run_app(&mut terminal, &mut app, settings, scheduler, sink);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn mount(
    scheduler: &RefreshScheduler,
    settings: &Settings,
    view: View,
    sink: &ChannelSink,
) -> ViewGuard {
    scheduler.mount(view.id(), view.cycle_config(settings), Box::new(sink.clone()))
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    settings: &Settings,
    scheduler: &RefreshScheduler,
    sink: ChannelSink,
) -> Result<()> {
    // Only the visible view refreshes.
    let mut mounted = app.current_view;
    let mut guard = mount(scheduler, settings, mounted, &sink);

    while app.running {
        app.process_events();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW)
                }
                // Resize is picked up by the next draw
                _ => {}
            }
        }

        if app.current_view != mounted {
            drop(guard);
            mounted = app.current_view;
            guard = mount(scheduler, settings, mounted, &sink);
        }

        if app.take_refresh_request() && !scheduler.refresh_now(guard.view()) {
            app.set_status_message("Refresh already in progress".to_string());
        }
    }

    Ok(())
}

/// Fetch every category once and write a JSON report.
async fn export_to_file(
    fetcher: Arc<dyn MetricFetcher>,
    store: &SnapshotStore,
    export_path: &Path,
) -> Result<()> {
    let failures = fetch_all(fetcher, store).await;
    for failure in &failures {
        warn!(category = %failure.category, error = %failure.message, "fetch failed during export");
        eprintln!("{}: {}", failure.category, failure.message);
    }

    let mut report = Report::from_store(store);
    report.failures = failures;
    write_report(&report, export_path)?;

    println!("Exported console state to: {}", export_path.display());
    Ok(())
}
