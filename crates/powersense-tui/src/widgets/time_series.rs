//! History line charts with a hover readout and a reveal animation.
//!
//! Points are drawn exactly as received, one x step per point. No sorting,
//! interpolation or gap filling.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use powersense_core::HistoryPoint;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, BorderType, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
        StatefulWidget, Widget,
    },
};

use crate::theme::{self, ColorToken, ThemeMode};

/// Reveal progress added per tick (4 Hz ticks, one second to draw).
const REVEAL_STEP: f64 = 0.25;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

// ── Timestamp formatting ──────────────────────────────────────────────

/// Parse a service timestamp into wall-clock time in `tz`.
///
/// Offset-carrying timestamps are converted; naive ones are taken as
/// already local. A bare date is midnight UTC.
fn local_time<Tz: TimeZone>(ts: &str, tz: &Tz) -> Option<NaiveDateTime> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(tz).naive_local());
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
    {
        return Some(naive);
    }
    let midnight = NaiveDate::parse_from_str(ts, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().with_timezone(tz).naive_local())
}

/// `hh:mmAM` / `hh:mmPM` in `tz`, or the raw string if it does not parse.
pub fn format_time_in<Tz: TimeZone>(ts: &str, tz: &Tz) -> String {
    local_time(ts, tz).map_or_else(|| ts.to_owned(), |t| t.format("%I:%M%p").to_string())
}

/// `hh:mmAM` / `hh:mmPM` in the local time zone.
pub fn format_time_only(ts: &str) -> String {
    format_time_in(ts, &Local)
}

/// `dd-mm-yyyy` in `tz`, `None` if the timestamp does not parse.
pub fn format_display_date_in<Tz: TimeZone>(ts: &str, tz: &Tz) -> Option<String> {
    local_time(ts, tz).map(|t| t.format("%d-%m-%Y").to_string())
}

pub fn format_display_date(ts: &str) -> Option<String> {
    format_display_date_in(ts, &Local)
}

/// Hover readout for one point: formatted time, then value with two
/// decimals and the unit.
pub fn tooltip_lines(point: &HistoryPoint, unit: &str) -> [String; 2] {
    [
        format_time_only(&point.timestamp),
        format!("{:.2} {unit}", point.value),
    ]
}

// ── State ─────────────────────────────────────────────────────────────

/// Per-chart animation and hover state.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesState {
    series: Vec<HistoryPoint>,
    /// History window the drawn series was fetched with.
    window: Option<u32>,
    reveal: f64,
    hover: Option<(u16, u16)>,
    plot: Rect,
}

impl TimeSeriesState {
    /// Record the series about to be drawn.
    ///
    /// The reveal restarts only when a series first appears or arrives for a
    /// different window. Refreshed data for the same window is shown in full,
    /// and so is everything drawn while the owning loop is loading.
    pub fn observe(&mut self, points: &[HistoryPoint], window: Option<u32>, loading: bool) {
        let appeared = self.series.is_empty() || self.window != window;
        if self.series != points {
            if !points.is_empty() && appeared {
                self.reveal = 0.0;
            }
            self.series = points.to_vec();
        }
        self.window = window;
        if loading {
            self.reveal = 1.0;
        }
    }

    /// Advance the reveal animation by one tick.
    pub fn tick(&mut self) {
        self.reveal = (self.reveal + REVEAL_STEP).min(1.0);
    }

    pub fn is_animating(&self) -> bool {
        self.reveal < 1.0
    }

    /// Number of leading points currently drawn.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::as_conversions
    )]
    pub fn visible_len(&self) -> usize {
        let n = self.series.len();
        ((n as f64 * self.reveal).ceil() as usize).min(n)
    }

    /// Pointer position in terminal cells, or `None` when it left.
    pub fn set_hover(&mut self, position: Option<(u16, u16)>) {
        self.hover = position;
    }

    /// Index of the point under the pointer, if it is over the plot.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::as_conversions
    )]
    pub fn hovered_index(&self) -> Option<usize> {
        let (col, row) = self.hover?;
        let plot = self.plot;
        let n = self.series.len();
        if n == 0 || !plot.contains((col, row).into()) {
            return None;
        }
        if n == 1 || plot.width <= 1 {
            return Some(0);
        }
        let t = f64::from(col - plot.x) / f64::from(plot.width - 1);
        Some(((t * (n - 1) as f64).round() as usize).min(n - 1))
    }

    pub fn plot_area(&self) -> Rect {
        self.plot
    }
}

// ── Widget ────────────────────────────────────────────────────────────

/// One history chart card.
pub struct TimeSeriesChart<'a> {
    pub title: String,
    pub points: &'a [HistoryPoint],
    pub unit: &'a str,
    pub accent: ColorToken,
    pub theme: ThemeMode,
    /// Window the points were fetched with.
    pub window: Option<u32>,
    pub loading: bool,
}

fn y_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let max = points.iter().map(|&(_, v)| v).fold(0.0_f64, f64::max);
    let min = points.iter().map(|&(_, v)| v).fold(0.0_f64, f64::min);
    [min * 1.1, (max * 1.1).max(1.0)]
}

impl StatefulWidget for TimeSeriesChart<'_> {
    type State = TimeSeriesState;

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let p = self.theme.palette();
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(theme::title_style(p))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default(p))
            .style(theme::card(p));

        state.observe(self.points, self.window, self.loading);

        if self.points.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            let message = if self.loading { "  Loading..." } else { "  No data yet" };
            Paragraph::new(message).style(theme::dim(p)).render(inner, buf);
            state.plot = Rect::default();
            return;
        }

        let data: Vec<(f64, f64)> = self.points[..state.visible_len()]
            .iter()
            .enumerate()
            .map(|(i, pt)| (i as f64, pt.value))
            .collect();
        let all: Vec<(f64, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, pt)| (i as f64, pt.value))
            .collect();
        let x_max = ((self.points.len() - 1) as f64).max(1.0);
        let [y_min, y_max] = y_bounds(&all);

        let axis_style = theme::dim(p);
        let mut label_at = vec![0, self.points.len() / 2, self.points.len() - 1];
        label_at.dedup();
        let x_labels: Vec<Span> = label_at
            .iter()
            .filter_map(|&i| self.points.get(i))
            .map(|pt| Span::styled(format_time_only(&pt.timestamp), axis_style))
            .collect();
        let y_labels: Vec<Span> = [y_min, (y_min + y_max) / 2.0, y_max]
            .iter()
            .map(|v| Span::styled(format!("{v:.1}"), axis_style))
            .collect();
        let label_width = y_labels.iter().map(Span::width).max().unwrap_or(0);

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.accent.color()))
            .data(&data);

        let inner = block.inner(area);
        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels).style(axis_style))
            .y_axis(Axis::default().bounds([y_min, y_max]).labels(y_labels).style(axis_style));
        chart.render(area, buf);

        // y labels plus the axis line on the left, x labels plus axis below
        let left = u16::try_from(label_width + 1).unwrap_or(u16::MAX);
        state.plot = Rect::new(
            inner.x.saturating_add(left),
            inner.y,
            inner.width.saturating_sub(left),
            inner.height.saturating_sub(2),
        );

        if let Some(point) = state.hovered_index().and_then(|i| self.points.get(i)) {
            render_tooltip(point, self.unit, self.theme, state.plot, buf);
        }
    }
}

fn render_tooltip(point: &HistoryPoint, unit: &str, mode: ThemeMode, plot: Rect, buf: &mut Buffer) {
    let p = mode.palette();
    let [time, value] = tooltip_lines(point, unit);
    let width = u16::try_from(time.len().max(value.len()) + 2).unwrap_or(u16::MAX);
    if plot.width < width || plot.height < 4 {
        return;
    }
    let area = Rect::new(plot.right() - width, plot.y, width, 4);
    Clear.render(area, buf);
    Paragraph::new(vec![
        Line::from(Span::styled(time, theme::dim(p))),
        Line::from(Span::styled(value, theme::text(p))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused(p))
            .style(theme::card(p)),
    )
    .render(area, buf);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn series(n: usize) -> Vec<HistoryPoint> {
        (0..n)
            .map(|i| HistoryPoint::new(format!("2024-03-01T{:02}:00:00", i % 24), f64::from(u32::try_from(i).unwrap())))
            .collect()
    }

    // ── Time formatting ──

    #[test]
    fn midnight_is_twelve_am() {
        assert_eq!(format_time_in("2024-03-01T00:05:00Z", &Utc), "12:05AM");
    }

    #[test]
    fn afternoon_is_zero_padded_pm() {
        assert_eq!(format_time_in("2024-03-01T13:45:00Z", &Utc), "01:45PM");
        assert_eq!(format_time_in("2024-03-01T12:00:00Z", &Utc), "12:00PM");
    }

    #[test]
    fn offsets_convert_to_the_target_zone() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(format_time_in("2024-03-01T18:30:00Z", &ist), "12:00AM");
        assert_eq!(format_time_in("2024-03-01T07:30:00.123+00:00", &ist), "01:00PM");
    }

    #[test]
    fn naive_timestamps_are_taken_as_local() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(format_time_in("2024-03-01T09:15:00", &ist), "09:15AM");
        assert_eq!(format_time_in("2024-03-01 21:15:00.5", &ist), "09:15PM");
    }

    #[test]
    fn unparseable_timestamps_display_raw() {
        assert_eq!(format_time_in("yesterday-ish", &Utc), "yesterday-ish");
        assert_eq!(format_time_in("", &Utc), "");
    }

    #[test]
    fn display_date_is_day_month_year() {
        assert_eq!(
            format_display_date_in("2024-03-01T10:00:00Z", &Utc).as_deref(),
            Some("01-03-2024")
        );
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(
            format_display_date_in("2024-03-01T20:00:00Z", &ist).as_deref(),
            Some("02-03-2024")
        );
        assert_eq!(format_display_date_in("garbage", &Utc), None);
    }

    #[test]
    fn tooltip_rounds_to_two_decimals() {
        let [_, value] = tooltip_lines(&HistoryPoint::new("x", 2.456), "A");
        assert_eq!(value, "2.46 A");
        let [time, _] = tooltip_lines(&HistoryPoint::new("x", 0.0), "W");
        assert_eq!(time, "x");
    }

    // ── Reveal animation ──

    #[test]
    fn first_data_reveals_gradually() {
        let mut state = TimeSeriesState::default();
        state.observe(&series(8), Some(24), false);
        assert_eq!(state.visible_len(), 0);
        state.tick();
        assert_eq!(state.visible_len(), 2);
        state.tick();
        state.tick();
        state.tick();
        assert_eq!(state.visible_len(), 8);
        assert!(!state.is_animating());

        // same data again: nothing restarts
        state.observe(&series(8), Some(24), false);
        assert!(!state.is_animating());
    }

    #[test]
    fn refreshed_data_is_shown_in_full() {
        let mut state = TimeSeriesState::default();
        state.observe(&series(8), Some(24), false);
        for _ in 0..4 {
            state.tick();
        }

        // poll in flight, then fresh points for the same window
        state.observe(&series(8), Some(24), true);
        state.observe(&series(9), Some(24), false);
        assert!(!state.is_animating());
        assert_eq!(state.visible_len(), 9);
    }

    #[test]
    fn new_window_restarts_reveal() {
        let mut state = TimeSeriesState::default();
        state.observe(&series(8), Some(24), false);
        for _ in 0..4 {
            state.tick();
        }
        state.observe(&series(8), Some(24), true);
        state.observe(&series(4), Some(12), false);
        assert!(state.is_animating());
        assert_eq!(state.visible_len(), 0);
    }

    #[test]
    fn data_after_a_failure_reveals_again() {
        let mut state = TimeSeriesState::default();
        state.observe(&series(8), Some(24), false);
        for _ in 0..4 {
            state.tick();
        }
        state.observe(&[], None, false);
        state.observe(&series(8), Some(24), false);
        assert!(state.is_animating());
    }

    #[test]
    fn loading_suppresses_reveal() {
        let mut state = TimeSeriesState::default();
        state.observe(&series(8), None, true);
        assert!(!state.is_animating());
        assert_eq!(state.visible_len(), 8);
    }

    // ── Rendering ──

    fn render(points: &[HistoryPoint], state: &mut TimeSeriesState, loading: bool) -> Buffer {
        let area = Rect::new(0, 0, 60, 14);
        let mut buf = Buffer::empty(area);
        TimeSeriesChart {
            title: "Current (A) History (Last 24 Hrs)".into(),
            points,
            unit: "A",
            accent: ColorToken::Primary,
            theme: ThemeMode::Dark,
            window: Some(24),
            loading,
        }
        .render(area, &mut buf, state);
        buf
    }

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_owned())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_series_shows_placeholder() {
        let mut state = TimeSeriesState::default();
        let out = text(&render(&[], &mut state, false));
        assert!(out.contains("Current (A) History (Last 24 Hrs)"));
        assert!(out.contains("No data yet"));
        assert_eq!(state.plot_area(), Rect::default());
    }

    #[test]
    fn hover_maps_columns_to_points() {
        let points = series(5);
        let mut state = TimeSeriesState::default();
        render(&points, &mut state, true);
        let plot = state.plot_area();
        assert!(plot.width > 1);

        state.set_hover(Some((plot.x, plot.y)));
        assert_eq!(state.hovered_index(), Some(0));
        state.set_hover(Some((plot.right() - 1, plot.y)));
        assert_eq!(state.hovered_index(), Some(4));
        state.set_hover(Some((0, 0)));
        assert_eq!(state.hovered_index(), None);
        state.set_hover(None);
        assert_eq!(state.hovered_index(), None);
    }

    #[test]
    fn hovering_renders_tooltip() {
        let points = vec![HistoryPoint::new("not-a-time", 3.14159)];
        let mut state = TimeSeriesState::default();
        render(&points, &mut state, true);
        let plot = state.plot_area();
        state.set_hover(Some((plot.x, plot.y + 1)));
        let out = text(&render(&points, &mut state, true));
        assert!(out.contains("3.14 A"), "{out}");
        assert!(out.contains("not-a-time"));
    }
}
