//! Application core: event loop, action dispatch and global key handling.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use powersense_config::PriceStore;
use powersense_core::MetricsOrchestrator;

use crate::action::Action;
use crate::component::Component;
use crate::event::{Cadence, Event, spawn_event_pump};
use crate::screens::dashboard::{DashboardScreen, DashboardSettings};
use crate::theme;
use crate::tui::Session;

/// Top-level application state.
pub struct App {
    orchestrator: MetricsOrchestrator,
    price_store: PriceStore,
    cadence: Cadence,
    dashboard: DashboardScreen,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(
        orchestrator: MetricsOrchestrator,
        price_store: PriceStore,
        cadence: Cadence,
        settings: DashboardSettings,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            orchestrator,
            price_store,
            cadence,
            dashboard: DashboardScreen::new(settings),
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut session = Session::start()?;

        let orchestrator = self.orchestrator.clone();
        let cancel = self.cancel.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(orchestrator, tx, cancel).await;
        });

        let (event_tx, mut events) = mpsc::unbounded_channel();
        let pump = spawn_event_pump(self.cadence, event_tx, self.cancel.child_token());

        info!(tick = ?self.cadence.tick, frame = ?self.cadence.frame, "TUI event loop started");

        while self.running {
            let Some(event) = events.recv().await else {
                break;
            };

            let action = match event {
                Event::Key(key) => self.handle_key_event(key)?,
                Event::Mouse(mouse) => self.handle_mouse_event(mouse)?,
                Event::Tick => Some(Action::Tick),
                Event::Render => Some(Action::Render),
            };
            if let Some(action) = action {
                self.action_tx.send(action)?;
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    session.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.cancel.cancel();
        self.orchestrator.shutdown();
        if let Err(e) = pump.await {
            debug!(error = %e, "event pump ended abnormally");
        }
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// everything else goes to the dashboard.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Price entry captures all other keys
        if self.dashboard.captures_input() {
            return self.dashboard.handle_key_event(key);
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('t')) => return Ok(Some(Action::ToggleTheme)),
            _ => {}
        }

        self.dashboard.handle_key_event(key)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        self.dashboard.handle_mouse_event(mouse)
    }

    /// Process a single action. Side effects first, then the dashboard.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }
            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }
            Action::RefreshSnapshot => {
                debug!("manual snapshot refresh");
                self.orchestrator.refresh_snapshot(None);
            }
            Action::SelectPeriod(period) => {
                info!(period = %period, "averaging period changed");
                self.orchestrator.refresh_period_average(Some(*period));
            }
            Action::SetPrice(price) => {
                if let Err(e) = self.price_store.save(*price) {
                    warn!(error = %e, path = %self.price_store.path().display(), "failed to save price");
                }
            }
            _ => {}
        }

        if let Some(follow_up) = self.dashboard.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [content, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        let p = self.dashboard.theme().palette();
        frame.render_widget(Block::default().style(theme::card(p)), area);
        self.dashboard.render(frame, content);
        self.render_status_bar(frame, status);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let p = self.dashboard.theme().palette();
        let hints = if self.dashboard.captures_input() {
            Line::from(vec![
                Span::styled(" price: ", theme::key_hint(p)),
                Span::styled("0-9 .", theme::key_hint_key(p)),
                Span::styled(" type  ", theme::key_hint(p)),
                Span::styled("Enter/Esc", theme::key_hint_key(p)),
                Span::styled(" done", theme::key_hint(p)),
            ])
        } else {
            let other = if self.dashboard.theme().is_dark() { "light" } else { "dark" };
            Line::from(vec![
                Span::styled(format!(" {} ", self.orchestrator.config().host), theme::dim(p)),
                Span::styled(
                    format!("│ ? help  r refresh  [ ] period  p price  t {other}  q quit"),
                    theme::key_hint(p),
                ),
            ])
        };
        frame.render_widget(Paragraph::new(hints), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let p = self.dashboard.theme().palette();
        let help_width = 52u16.min(area.width.saturating_sub(4));
        let help_height = 15u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style(p))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused(p))
            .style(theme::card(p));

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let row = |key: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key(p)),
                Span::styled(what, theme::key_hint(p)),
            ])
        };

        let help_text = vec![
            Line::from(""),
            row("r / F5", "Refresh main data"),
            row("[ / ]", "Previous / next averaging period"),
            row("1-4", "Avg 1 / 5 / 10 / 30 minutes"),
            row("p", "Edit price per kWh"),
            row("t", "Toggle dark / light theme"),
            row("mouse", "Hover a chart for readings"),
            row("?", "This help"),
            row("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled("                Esc or ? to close", theme::key_hint(p))),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}
