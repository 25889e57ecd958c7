//! `bhejo` - tray composer with a hot-reloaded view layer.
//!
//! Tray commands are read from stdin, one per line (`show`, `toggle`,
//! `reload`, `quit`, `post <text>`, ...). Edits to the view files are picked
//! up while the application runs.

use std::path::PathBuf;
use std::sync::Arc;

use bhejo::tray::spawn_stdin_reader;
use bhejo::{
    AppContext, Backend, HeadlessRuntime, NotifyBackend, ReloadOrchestrator, Settings,
    SettingsOverrides, WatchSet, logging,
};
use clap::Parser;
use tracing::{info, warn};

/// bhejo - post to every selected social account from the tray
#[derive(Parser, Debug)]
#[command(name = "bhejo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (default: ./bhejo.toml if present)
    #[arg(long, env = "BHEJO_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the .view files
    #[arg(long, env = "BHEJO_VIEW_ROOT", value_name = "DIR")]
    view_root: Option<PathBuf>,

    /// Entry view, relative to the view root
    #[arg(long, env = "BHEJO_ENTRY", value_name = "FILE")]
    entry: Option<PathBuf>,

    /// Quiet period before a reload, in milliseconds
    #[arg(long, env = "BHEJO_DEBOUNCE_MS", value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Show the composer at startup instead of starting in the tray
    #[arg(long)]
    show: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "BHEJO_LOG_JSON")]
    log_json: bool,
}

fn main() -> miette::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    logging::init(cli.log_json)?;

    let mut settings = Settings::load(cli.config.as_deref())?.with_overrides(SettingsOverrides {
        view_root: cli.view_root,
        entry: cli.entry,
        debounce_ms: cli.debounce_ms,
    });

    // notify reports absolute paths.
    if let Ok(root) = settings.view_root.canonicalize() {
        settings.view_root = root;
    }
    let entry = settings.entry_path();
    info!(root = %settings.view_root.display(), entry = %entry.display(), "starting bhejo");

    let (tx, rx) = crossbeam_channel::unbounded();
    let watch_set = WatchSet::new(NotifyBackend::new(tx.clone())?, settings.extension.clone());
    let mut ctx = AppContext::new(
        HeadlessRuntime::new(),
        watch_set,
        entry,
        Arc::new(Backend::default()),
    );

    let mut orchestrator = ReloadOrchestrator::new(settings.debounce());
    orchestrator.start(&mut ctx)?;

    if let Err(e) = ctx.watch_set_mut().add_watch(&settings.view_root) {
        warn!(error = %e, "view root is not watched, edits will not reload");
    }
    if cli.show {
        ctx.show_current();
    }

    spawn_stdin_reader(tx)?;
    orchestrator.run(&mut ctx, &rx)?;

    Ok(())
}
