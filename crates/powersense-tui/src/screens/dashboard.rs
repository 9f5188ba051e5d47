//! Dashboard screen: six gauges, the cost panel and four history charts.
//!
//! Layout:
//! ┌─ Analytics Dashboard ───────────────────────────────────────────────┐
//! │ status                                                              │
//! │ period selector │ price per kWh                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ┌─ Current ─┐ ┌─ Avg Current ─┐ ┌─ Voltage ─┐
//! ┌─ Inst Power ─┐ ┌─ Avg Power ─┐ ┌─ Avg Consumption ─┐
//! Estimated cost line (+ error)
//! Data for: dd-mm-yyyy
//! ┌─ Current history ─┐ ┌─ Avg Current history ─┐
//! ┌─ Voltage history ─┐ ┌─ Power history ───────┐

use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use strum::IntoEnumIterator;
use throbber_widgets_tui::ThrobberState;

use powersense_core::cost;
use powersense_core::price::{format_price_input, parse_price_input};
use powersense_core::{AvgPeriod, HistoryPoint, MetricSnapshot, PeriodState, SnapshotState};

use crate::action::Action;
use crate::component::Component;
use crate::theme::{self, ColorToken, ThemeMode};
use crate::widgets::gauge::{GaugeCard, GaugeCardState, GaugeInputs};
use crate::widgets::sub_tabs::render_sub_tabs;
use crate::widgets::time_series::{TimeSeriesChart, TimeSeriesState, format_display_date};

// ── Metric catalogue ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Reading {
    Current,
    AvgCurrent,
    Voltage,
    InstPower,
    AvgPower,
}

impl Reading {
    fn of(self, s: &MetricSnapshot) -> f64 {
        match self {
            Self::Current => s.current,
            Self::AvgCurrent => s.avg_current,
            Self::Voltage => s.voltage,
            Self::InstPower => s.inst_power,
            Self::AvgPower => s.avg_power,
        }
    }
}

struct GaugeSpec {
    title: &'static str,
    unit: &'static str,
    bound: f64,
    accent: &'static str,
    reading: Reading,
}

const SNAPSHOT_GAUGES: [GaugeSpec; 5] = [
    GaugeSpec { title: "Current", unit: "A", bound: 4.0, accent: "primary", reading: Reading::Current },
    GaugeSpec { title: "Avg Current", unit: "A", bound: 4.0, accent: "secondary", reading: Reading::AvgCurrent },
    GaugeSpec { title: "Voltage", unit: "V", bound: 250.0, accent: "success", reading: Reading::Voltage },
    GaugeSpec { title: "Inst Power", unit: "W", bound: 200.0, accent: "warning", reading: Reading::InstPower },
    GaugeSpec { title: "Avg Power", unit: "W", bound: 200.0, accent: "warning", reading: Reading::AvgPower },
];

const CONSUMPTION_BOUND: f64 = 200.0;

#[derive(Debug, Clone, Copy)]
enum Series {
    Current,
    AvgCurrent,
    Voltage,
    Power,
}

impl Series {
    fn of(self, s: &MetricSnapshot) -> &[HistoryPoint] {
        match self {
            Self::Current => &s.current_history,
            Self::AvgCurrent => &s.avg_current_history,
            Self::Voltage => &s.voltage_history,
            Self::Power => &s.power_history,
        }
    }
}

struct GraphSpec {
    label: &'static str,
    unit: &'static str,
    accent: &'static str,
    series: Series,
}

const GRAPHS: [GraphSpec; 4] = [
    GraphSpec { label: "Current (A)", unit: "A", accent: "primary", series: Series::Current },
    GraphSpec { label: "Avg Current (A)", unit: "A", accent: "secondary", series: Series::AvgCurrent },
    GraphSpec { label: "Voltage (V)", unit: "V", accent: "danger", series: Series::Voltage },
    GraphSpec { label: "Power (W)", unit: "W", accent: "success", series: Series::Power },
];

/// Selector label for an averaging period.
fn period_label(period: AvgPeriod) -> &'static str {
    match period {
        AvgPeriod::One => "Avg 1 Min",
        AvgPeriod::Five => "Avg 5 Mins",
        AvgPeriod::Ten => "Avg 10 Mins",
        AvgPeriod::Thirty => "Avg 30 Mins",
    }
}

/// Two equal rows of `COLS` equal cells, row-major.
fn grid<const COLS: usize>(area: Rect) -> Vec<Rect> {
    let rows: [Rect; 2] = Layout::vertical([Constraint::Fill(1); 2]).areas(area);
    rows.into_iter()
        .flat_map(|row| Layout::horizontal([Constraint::Fill(1); COLS]).areas::<COLS>(row))
        .collect()
}

// ── Screen ────────────────────────────────────────────────────────────

/// Startup settings for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub window_hours: u32,
    pub period: AvgPeriod,
    pub price: f64,
    pub currency: String,
    pub theme: ThemeMode,
    pub scale: u8,
}

pub struct DashboardScreen {
    snapshot: Arc<SnapshotState>,
    period: Arc<PeriodState>,
    selected_period: AvgPeriod,
    price: f64,
    /// Text of the price field while it is being edited.
    price_input: Option<String>,
    currency: String,
    theme: ThemeMode,
    scale: u8,
    snapshot_gauges: [GaugeCardState; 5],
    consumption_gauge: GaugeCardState,
    charts: [TimeSeriesState; 4],
    spinner: ThrobberState,
}

impl DashboardScreen {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            snapshot: Arc::new(SnapshotState::new(settings.window_hours)),
            period: Arc::new(PeriodState::new(settings.period)),
            selected_period: settings.period,
            price: settings.price,
            price_input: None,
            currency: settings.currency,
            theme: settings.theme,
            scale: settings.scale,
            snapshot_gauges: Default::default(),
            consumption_gauge: GaugeCardState::default(),
            charts: Default::default(),
            spinner: ThrobberState::default(),
        }
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn selected_period(&self) -> AvgPeriod {
        self.selected_period
    }

    /// "Updating main data..." while the snapshot loop is in flight,
    /// otherwise the age of the last successful update.
    fn status_text(&self) -> String {
        if self.snapshot.loading {
            return "Updating main data...".into();
        }
        match self.snapshot.updated_at {
            Some(at) => {
                let secs = (Utc::now() - at).num_seconds().max(0).unsigned_abs();
                let age = humantime::format_duration(std::time::Duration::from_secs(secs));
                format!("Main data: updated {age} ago")
            }
            None => "Main data: waiting for first update".into(),
        }
    }

    /// Period the shown average was fetched for. Until the first fetch
    /// lands this is the selected one.
    fn averaged_period(&self) -> AvgPeriod {
        self.period.fetched_with.unwrap_or(self.selected_period)
    }

    /// Apply the edited price text. Invalid text is ignored.
    fn price_edited(&self) -> Option<Action> {
        let text = self.price_input.as_deref()?;
        parse_price_input(text).map(Action::SetPrice)
    }

    fn handle_price_key(&mut self, key: KeyEvent) -> Option<Action> {
        let input = self.price_input.as_mut()?;
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.price_input = None;
                None
            }
            KeyCode::Backspace => {
                input.pop();
                self.price_edited()
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                input.push(c);
                self.price_edited()
            }
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let p = self.theme.palette();
        let block = Block::default()
            .title(Span::styled(" Analytics Dashboard ", theme::title_style(p)))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default(p))
            .style(theme::card(p));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status_style = if self.snapshot.loading {
            theme::text(p).add_modifier(Modifier::ITALIC)
        } else {
            theme::dim(p)
        };
        let status = Line::from(vec![
            Span::styled(format!(" {}", self.status_text()), status_style),
            Span::styled("   r ", theme::key_hint_key(p)),
            Span::styled(
                "refresh",
                if self.snapshot.loading {
                    theme::dim(p).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    theme::key_hint(p)
                },
            ),
        ]);

        let labels: Vec<&str> = AvgPeriod::iter().map(period_label).collect();
        let mut controls = render_sub_tabs(&labels, self.selected_period.index(), p);
        controls.spans.insert(0, Span::styled(" ", theme::dim(p)));
        controls.spans.push(Span::styled("   │ ", theme::dim(p)));
        controls
            .spans
            .push(Span::styled(format!("Price/kWh: {} ", self.currency), theme::text(p)));
        match &self.price_input {
            Some(text) => {
                controls
                    .spans
                    .push(Span::styled(format!("{text}▏"), theme::border_focused(p).add_modifier(Modifier::BOLD)));
            }
            None => {
                controls
                    .spans
                    .push(Span::styled(format_price_input(self.price), theme::text(p)));
            }
        }

        frame.render_widget(Paragraph::new(vec![status, controls]), inner);
    }

    fn render_gauges(&mut self, frame: &mut Frame, area: Rect) {
        let cells = grid::<3>(area);

        let snap = &self.snapshot;
        for ((spec, state), cell) in SNAPSHOT_GAUGES
            .iter()
            .zip(self.snapshot_gauges.iter_mut())
            .zip(cells.iter().copied())
        {
            let card = GaugeCard {
                title: spec.title,
                inputs: GaugeInputs {
                    value: Some(spec.reading.of(&snap.value)),
                    bound: spec.bound,
                    unit: spec.unit,
                    accent: ColorToken::from_name(spec.accent),
                    loading: snap.is_initial_load(),
                    error: snap.error.as_deref(),
                },
                theme: self.theme,
                scale: self.scale,
                spinner: &self.spinner,
            };
            frame.render_stateful_widget(card, cell, state);
        }

        if let Some(cell) = cells.get(5).copied() {
            let title = format!("Avg Consumption ({} Min)", self.averaged_period().minutes());
            let card = GaugeCard {
                title: &title,
                inputs: GaugeInputs {
                    value: Some(self.period.value.watts),
                    bound: CONSUMPTION_BOUND,
                    unit: "W",
                    accent: ColorToken::Indigo,
                    loading: self.period.is_initial_load(),
                    error: self.period.error.as_deref(),
                },
                theme: self.theme,
                scale: self.scale,
                spinner: &self.spinner,
            };
            frame.render_stateful_widget(card, cell, &mut self.consumption_gauge);
        }
    }

    fn render_cost(&self, frame: &mut Frame, area: Rect) {
        let p = self.theme.palette();
        let minutes = self.averaged_period().minutes();
        let estimate = cost::estimate(self.period.value.watts, f64::from(minutes), self.price);
        let mut lines = vec![Line::from(vec![
            Span::styled(format!(" Estimated Cost for Last {minutes} Minutes: "), theme::text(p)),
            Span::styled(
                format!("{} {estimate}", self.currency),
                theme::title_style(p),
            ),
        ])];
        if let Some(err) = &self.period.error {
            lines.push(Line::from(Span::styled(
                format!(" Error calculating cost: {err}"),
                theme::error(p),
            )));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_date(&self, frame: &mut Frame, area: Rect) {
        let Some(date) = self.snapshot.value.first_timestamp().and_then(format_display_date) else {
            return;
        };
        let p = self.theme.palette();
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Data for: ", theme::dim(p)),
                Span::styled(date, theme::text(p)),
            ])),
            area,
        );
    }

    fn render_charts(&mut self, frame: &mut Frame, area: Rect) {
        let cells = grid::<2>(area);

        let snap = &self.snapshot;
        let hours = snap.parameter;
        for ((spec, state), cell) in GRAPHS.iter().zip(self.charts.iter_mut()).zip(cells.iter().copied()) {
            let chart = TimeSeriesChart {
                title: format!("{} History (Last {hours} Hrs)", spec.label),
                points: spec.series.of(&snap.value),
                unit: spec.unit,
                accent: ColorToken::from_name(spec.accent),
                theme: self.theme,
                window: snap.fetched_with,
                loading: snap.loading,
            };
            frame.render_stateful_widget(chart, cell, state);
        }
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.price_input.is_some() {
            return Ok(self.handle_price_key(key));
        }
        let action = match key.code {
            KeyCode::Char('r') | KeyCode::F(5) => {
                // disabled while the snapshot is in flight
                (!self.snapshot.loading).then_some(Action::RefreshSnapshot)
            }
            KeyCode::Char(']') | KeyCode::Right => Some(Action::SelectPeriod(self.selected_period.next())),
            KeyCode::Char('[') | KeyCode::Left => Some(Action::SelectPeriod(self.selected_period.prev())),
            KeyCode::Char(c @ '1'..='4') => AvgPeriod::iter()
                .zip('1'..='4')
                .find(|&(_, k)| k == c)
                .map(|(period, _)| period)
                .filter(|&period| period != self.selected_period)
                .map(Action::SelectPeriod),
            KeyCode::Char('p' | 'e') => {
                self.price_input = Some(format_price_input(self.price));
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
            let pointer = Position::new(mouse.column, mouse.row);
            for chart in &mut self.charts {
                let over = chart.plot_area().contains(pointer);
                chart.set_hover(over.then_some((mouse.column, mouse.row)));
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SnapshotUpdated(state) => {
                self.snapshot = Arc::clone(state);
            }
            Action::PeriodUpdated(state) => {
                self.selected_period = state.parameter;
                self.period = Arc::clone(state);
            }
            Action::SelectPeriod(period) => {
                self.selected_period = *period;
            }
            Action::SetPrice(price) => {
                self.price = *price;
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggle();
            }
            Action::Tick => {
                self.spinner.calc_next();
                for chart in self.charts.iter_mut().filter(|c| c.is_animating()) {
                    chart.tick();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [header, gauges, cost, date, charts] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Fill(3),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Fill(4),
        ])
        .areas(area);

        self.render_header(frame, header);
        self.render_gauges(frame, gauges);
        self.render_cost(frame, cost);
        self.render_date(frame, date);
        self.render_charts(frame, charts);
    }

    fn captures_input(&self) -> bool {
        self.price_input.is_some()
    }
}
