//! Raw-mode terminal session for the dashboard.
//!
//! [`Session::start`] switches the terminal over and dropping the session
//! puts it back, including when a panic unwinds through the app.

use std::io::stdout;

use color_eyre::eyre::Result;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{DefaultTerminal, Terminal, backend::CrosstermBackend};
use tracing::debug;

/// The dashboard owns the alternate screen while this is alive.
pub struct Session {
    terminal: DefaultTerminal,
}

impl Session {
    /// Raw mode, alternate screen, mouse capture for chart hover, hidden
    /// cursor.
    pub fn start() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        enable_raw_mode()?;
        // from here on, dropping the session restores the terminal
        let mut session = Self { terminal };
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        session.terminal.clear()?;
        Ok(session)
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut ratatui::Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        restore();
    }
}

/// Undo everything `start` did. Raw mode is left even if the screen
/// commands fail.
fn restore() {
    if let Err(e) = execute!(stdout(), cursor::Show, DisableMouseCapture, LeaveAlternateScreen) {
        debug!(error = %e, "terminal restore incomplete");
    }
    if let Err(e) = disable_raw_mode() {
        debug!(error = %e, "failed to leave raw mode");
    }
}

/// Route panics and eyre reports through a terminal restore first, so they
/// print on the normal screen. Call before [`Session::start`].
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        panic_hook(info);
    }));
    Ok(())
}
