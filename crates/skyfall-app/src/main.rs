use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use skyfall_config::{config_dir, ConfigStore};
use skyfall_core::logging;

mod command;
mod host;
mod screens;
mod tps;

use host::Host;

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const POLL_TIMEOUT: Duration = Duration::from_millis(16);
const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(60);

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Route panic messages into the log instead of stderr.
///
/// Feature panics are caught and reported by the runtime, and writing them
/// to stderr would tear up the alternate screen.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(%info, "panic");
    }));
}

fn main() -> Result<()> {
    let log_buffer = logging::init();
    tracing::info!("SkyFall starting up");
    install_panic_hook();

    let dir = config_dir();
    let store = ConfigStore::load(&dir)
        .with_context(|| format!("failed to load config from {}", dir.display()))?;
    let mut host = Host::new(log_buffer, store).context("failed to start the feature runtime")?;

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, &mut host);
    restore_terminal(terminal)?;
    host.shutdown();
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, host: &mut Host) -> Result<()> {
    let mut last_tick = Instant::now();
    let mut last_save = Instant::now();

    loop {
        host.sync_logs();
        terminal.draw(|f| host.draw(f))?;

        if event::poll(POLL_TIMEOUT)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && host.handle_key(key) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= TICK_INTERVAL {
            last_tick = Instant::now();
            host.tick(last_tick);
        }

        if last_save.elapsed() >= AUTOSAVE_INTERVAL {
            last_save = Instant::now();
            host.save("autosave");
        }
    }
}
