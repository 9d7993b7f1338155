mod app;
mod components;
mod event;
mod handler;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use lazytree::config::{AppConfig, GeneralConfig, TreeConfig};
use lazytree::error::{self, AppError};
use lazytree::fs::controller::TreeController;
use lazytree::logging;

use crate::app::App;
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// A lazily loaded terminal directory tree.
#[derive(Parser, Debug)]
#[command(name = "lzt", version, about)]
struct Cli {
    /// Root path to display (defaults to the configured path, then the current directory)
    path: Option<PathBuf>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show hidden files on startup
    #[arg(long)]
    show_hidden: bool,

    /// Use ASCII tags instead of Nerd Font icons
    #[arg(long)]
    no_icons: bool,
}

impl Cli {
    /// Partial config holding only the flags that were actually passed.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                show_hidden: self.show_hidden.then_some(true),
                ..Default::default()
            },
            tree: TreeConfig {
                use_icons: self.no_icons.then_some(false),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    let _log_guard = logging::init(&config);

    let requested = cli
        .path
        .clone()
        .or_else(|| config.default_path().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let path = requested.canonicalize().map_err(|_| {
        AppError::InvalidPath(format!("{} does not exist", requested.display()))
    })?;
    info!(root = %path.display(), "starting");

    let controller = TreeController::with_fs(config.show_hidden())?;
    controller.load_directory(&path);

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut app = App::new(controller.clone(), config.use_icons());
    let mut events = EventHandler::new(Duration::from_millis(config.tick_rate_ms()));
    events.watch_tree(controller.subscribe());

    let result = run(&mut tui, &mut app, &mut events).await;
    tui.restore()?;
    info!("exiting");
    result
}

async fn run(tui: &mut Tui, app: &mut App, events: &mut EventHandler) -> error::Result<()> {
    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(app, key),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::TreeChanged => app.sync_from_controller(),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
