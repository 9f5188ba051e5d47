//! Half-circle gauge card.
//!
//! A card is in exactly one of three states: loading (spinner), error
//! (message) or normal (painted dial plus readout). The dial lives on a
//! `DrawingSurface` that is repainted only when something it depends on
//! changes.

use std::f64::consts::PI;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget, Wrap},
};
use throbber_widgets_tui::{Throbber, ThrobberState};

use crate::theme::{self, ColorToken, Palette, ThemeMode};
use crate::widgets::surface::{DrawingSurface, Paint};

const SHUTDOWN_HINT: &str = "Backend Process is in Shutdown State";
const LOADING_LABEL: &str = "Loading...";
/// Spinner glyph, a space, and the label.
const LOADING_WIDTH: u16 = 12;

/// Share of the bound covered by `value`, clamped to `0..=100`.
///
/// NaN values and non-positive or NaN bounds read as 0.
pub fn percentage(value: f64, bound: f64) -> f64 {
    if value.is_nan() || bound.is_nan() || bound <= 0.0 {
        return 0.0;
    }
    (value / bound * 100.0).clamp(0.0, 100.0)
}

// ── Inputs ────────────────────────────────────────────────────────────

/// Everything a gauge card displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeInputs<'a> {
    pub value: Option<f64>,
    pub bound: f64,
    pub unit: &'a str,
    pub accent: ColorToken,
    pub loading: bool,
    pub error: Option<&'a str>,
}

/// The one state a card is in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeView<'a> {
    Loading,
    Error(&'a str),
    Normal { value: f64, percentage: f64 },
}

impl<'a> GaugeInputs<'a> {
    pub fn view(&self) -> GaugeView<'a> {
        if self.loading {
            return GaugeView::Loading;
        }
        if let Some(message) = self.error {
            return GaugeView::Error(message);
        }
        let value = self.value.unwrap_or(0.0);
        GaugeView::Normal {
            value,
            percentage: percentage(value, self.bound),
        }
    }
}

// ── Painting ──────────────────────────────────────────────────────────

/// Paint the dial for `percentage` over the whole surface.
///
/// Track first, then the gradient value arc, then the disk under the
/// readout. The arc's center sits near the bottom edge.
pub fn paint_dial(surface: &mut DrawingSurface, percentage: f64, accent: ColorToken, palette: &Palette) {
    let (w, h) = surface.size();
    let (w, h) = (f64::from(w), f64::from(h));
    let margin = (h * 0.06).max(1.0);
    let center = (w / 2.0, h - margin);
    let radius = center.0.min(center.1) - margin;
    if radius <= 0.0 {
        return;
    }
    let line_width = (radius * 0.15).max(1.0);

    surface.stroke_arc(center, radius, PI, 0.0, line_width, &Paint::Solid(palette.gauge_track));

    let end = PI - percentage.clamp(0.0, 100.0) / 100.0 * PI;
    let gradient = Paint::LinearGradient {
        x0: center.0 - radius,
        x1: center.0 + radius,
        start: theme::with_alpha(accent, 128.0 / 255.0),
        end: accent.rgba(),
    };
    surface.stroke_arc(center, radius, PI, end, line_width, &gradient);

    surface.fill_circle(center, radius - line_width * 1.5, &Paint::Solid(palette.gauge_disk));
}

// ── Card state ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct RedrawKey {
    value: u64,
    bound: u64,
    accent: ColorToken,
    percentage: u64,
    loading: bool,
    error: Option<String>,
    theme: ThemeMode,
    scale: u8,
    size: (u16, u16),
}

/// Per-card drawing surface and redraw bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct GaugeCardState {
    surface: DrawingSurface,
    key: Option<RedrawKey>,
    redraws: u64,
}

impl GaugeCardState {
    /// Bring the surface up to date. Returns `true` if it was repainted.
    ///
    /// `scale` and `size` are read on every call, so a resize or a changed
    /// supersampling factor repaints even when the inputs are the same.
    pub fn sync(&mut self, inputs: &GaugeInputs<'_>, theme: ThemeMode, scale: u8, size: (u16, u16)) -> bool {
        let view = inputs.view();
        let key = RedrawKey {
            value: inputs.value.unwrap_or(0.0).to_bits(),
            bound: inputs.bound.to_bits(),
            accent: inputs.accent,
            percentage: match view {
                GaugeView::Normal { percentage, .. } => percentage.to_bits(),
                _ => 0,
            },
            loading: inputs.loading,
            error: inputs.error.map(str::to_owned),
            theme,
            scale,
            size,
        };
        if self.key.as_ref() == Some(&key) {
            return false;
        }

        if self.surface.size() == size && self.surface.scale() == scale.max(1) {
            self.surface.clear();
        } else {
            self.surface.resize(size.0, size.1, scale);
        }
        if let GaugeView::Normal { percentage, .. } = view {
            paint_dial(&mut self.surface, percentage, inputs.accent, theme.palette());
        }

        self.key = Some(key);
        self.redraws += 1;
        true
    }

    /// How many times the surface has been repainted.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }
}

// ── Widget ────────────────────────────────────────────────────────────

/// A titled gauge card.
pub struct GaugeCard<'a> {
    pub title: &'a str,
    pub inputs: GaugeInputs<'a>,
    pub theme: ThemeMode,
    pub scale: u8,
    pub spinner: &'a ThrobberState,
}

impl StatefulWidget for GaugeCard<'_> {
    type State = GaugeCardState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let p = self.theme.palette();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default(p))
            .title(Span::styled(format!(" {} ", self.title), theme::title_style(p)))
            .style(theme::card(p));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.is_empty() {
            return;
        }

        let size = (inner.width, inner.height.saturating_mul(2));
        state.sync(&self.inputs, self.theme, self.scale, size);

        match self.inputs.view() {
            GaugeView::Loading => {
                let row = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
                let throbber = Throbber::default()
                    .label(LOADING_LABEL)
                    .style(theme::dim(p))
                    .throbber_style(theme::text(p).fg(self.inputs.accent.color()));
                let width = LOADING_WIDTH.min(row.width);
                let centered = Rect::new(row.x + (row.width - width) / 2, row.y, width, 1);
                StatefulWidget::render(throbber, centered, buf, &mut self.spinner.clone());
            }
            GaugeView::Error(message) => {
                let lines = vec![
                    Line::from(Span::styled("Error:", theme::error(p))),
                    Line::from(Span::styled(message.to_owned(), theme::error(p).remove_modifier(Modifier::BOLD))),
                    Line::from(Span::styled(SHUTDOWN_HINT, theme::dim(p))),
                ];
                let top = inner.height.saturating_sub(4) / 2;
                let text_area = Rect::new(inner.x, inner.y + top, inner.width, inner.height - top);
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(text_area, buf);
            }
            GaugeView::Normal { value, .. } => {
                if !state.surface.is_blank() {
                    state.surface.blit(inner, buf, p.card_bg);
                }
                let readout = format!("{value:.1} {}", self.inputs.unit);
                let row = (inner.y + inner.height * 3 / 4).min(inner.bottom() - 1);
                Paragraph::new(Line::from(Span::styled(
                    readout,
                    theme::text(p).add_modifier(Modifier::BOLD),
                )))
                .alignment(Alignment::Center)
                .render(Rect::new(inner.x, row, inner.width, 1), buf);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::style::Color;

    use super::*;
    use crate::widgets::surface::Rgba;

    fn inputs(value: f64) -> GaugeInputs<'static> {
        GaugeInputs {
            value: Some(value),
            bound: 4.0,
            unit: "A",
            accent: ColorToken::Primary,
            loading: false,
            error: None,
        }
    }

    // ── percentage ──

    #[test]
    fn percentage_is_monotonic_and_saturates() {
        let mut last = -1.0;
        for step in 0..=100 {
            let value = f64::from(step) * 0.1;
            let pct = percentage(value, 4.0);
            assert!(pct >= last, "{pct} < {last} at {value}");
            assert!((0.0..=100.0).contains(&pct));
            last = pct;
        }
        assert!((percentage(4.0, 4.0) - 100.0).abs() < f64::EPSILON);
        assert!((percentage(9.0, 4.0) - 100.0).abs() < f64::EPSILON);
        assert!((percentage(2.0, 4.0) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_guards_bad_inputs() {
        for (value, bound) in [(f64::NAN, 4.0), (1.0, 0.0), (1.0, -3.0), (1.0, f64::NAN), (-1.0, 4.0)] {
            assert!(percentage(value, bound).abs() < f64::EPSILON, "{value}/{bound}");
        }
    }

    // ── view ──

    #[test]
    fn loading_wins_over_error() {
        let mut i = inputs(1.0);
        i.loading = true;
        i.error = Some("boom");
        assert_eq!(i.view(), GaugeView::Loading);
        i.loading = false;
        assert_eq!(i.view(), GaugeView::Error("boom"));
    }

    #[test]
    fn missing_value_reads_zero() {
        let mut i = inputs(1.0);
        i.value = None;
        assert_eq!(i.view(), GaugeView::Normal { value: 0.0, percentage: 0.0 });
    }

    // ── dial geometry ──

    // 40x20 logical: center (20, 18.8), radius 17.6, line width 2.64.
    const LEFT: (u16, u16) = (3, 17);
    const RIGHT: (u16, u16) = (36, 17);

    fn painted(pct: f64, theme: ThemeMode) -> DrawingSurface {
        let mut s = DrawingSurface::new(40, 20, 1);
        paint_dial(&mut s, pct, ColorToken::Primary, theme.palette());
        s
    }

    #[test]
    fn empty_dial_is_symmetric_track() {
        let s = painted(0.0, ThemeMode::Dark);
        assert!(!s.is_blank());
        assert_eq!(s.logical_pixel(LEFT.0, LEFT.1), s.logical_pixel(RIGHT.0, RIGHT.1));
    }

    #[test]
    fn half_dial_fills_from_the_left() {
        let s = painted(50.0, ThemeMode::Dark);
        let left = s.logical_pixel(LEFT.0, LEFT.1);
        let right = s.logical_pixel(RIGHT.0, RIGHT.1);
        assert_ne!(left, right);
        assert!(left.a > right.a);
        assert_eq!(right, painted(0.0, ThemeMode::Dark).logical_pixel(RIGHT.0, RIGHT.1));
    }

    #[test]
    fn full_dial_reaches_the_right_end() {
        let s = painted(100.0, ThemeMode::Dark);
        let empty = painted(0.0, ThemeMode::Dark);
        assert_ne!(s.logical_pixel(RIGHT.0, RIGHT.1), empty.logical_pixel(RIGHT.0, RIGHT.1));
    }

    #[test]
    fn lower_half_stays_clear() {
        let s = painted(100.0, ThemeMode::Dark);
        // below the center line, outside the disk
        assert_eq!(s.logical_pixel(0, 19), Rgba::TRANSPARENT);
        assert_eq!(s.logical_pixel(39, 19), Rgba::TRANSPARENT);
    }

    // ── redraw bookkeeping ──

    #[test]
    fn unchanged_inputs_do_not_redraw() {
        let mut state = GaugeCardState::default();
        assert!(state.sync(&inputs(2.0), ThemeMode::Dark, 2, (40, 20)));
        assert!(!state.sync(&inputs(2.0), ThemeMode::Dark, 2, (40, 20)));
        assert_eq!(state.redraws(), 1);
    }

    #[test]
    fn value_size_and_scale_changes_redraw() {
        let mut state = GaugeCardState::default();
        state.sync(&inputs(2.0), ThemeMode::Dark, 2, (40, 20));
        assert!(state.sync(&inputs(2.5), ThemeMode::Dark, 2, (40, 20)));
        assert!(state.sync(&inputs(2.5), ThemeMode::Dark, 2, (30, 20)));
        assert!(state.sync(&inputs(2.5), ThemeMode::Dark, 3, (30, 20)));
        assert_eq!(state.surface().scale(), 3);
        assert_eq!(state.redraws(), 4);
    }

    #[test]
    fn theme_flip_swaps_track_and_keeps_accent() {
        let mut state = GaugeCardState::default();
        let i = inputs(2.0);
        state.sync(&i, ThemeMode::Dark, 1, (40, 20));
        let dark_track = state.surface().logical_pixel(RIGHT.0, RIGHT.1);
        let dark_value = state.surface().logical_pixel(LEFT.0, LEFT.1);

        assert!(state.sync(&i, ThemeMode::Light, 1, (40, 20)));
        let light_track = state.surface().logical_pixel(RIGHT.0, RIGHT.1);
        let light_value = state.surface().logical_pixel(LEFT.0, LEFT.1);

        assert_eq!(dark_track.to_color(), Color::Rgb(44, 62, 80));
        assert_eq!(light_track.to_color(), Color::Rgb(203, 213, 225));
        // the translucent start of the stroke lets the new track show through
        assert_ne!(dark_value, light_value);
        assert_eq!(state.redraws(), 2);
    }

    #[test]
    fn theme_flip_keeps_the_accent_stroke() {
        // near the end of a full dial the gradient is almost opaque and the
        // disk does not reach this far out
        const ARC_END: (u16, u16) = (37, 17);
        let accent = ColorToken::Primary.rgba();
        let full = inputs(4.0);

        let mut state = GaugeCardState::default();
        state.sync(&full, ThemeMode::Dark, 1, (40, 20));
        let dark = state.surface().logical_pixel(ARC_END.0, ARC_END.1);
        assert!(state.sync(&full, ThemeMode::Light, 1, (40, 20)));
        let light = state.surface().logical_pixel(ARC_END.0, ARC_END.1);

        for px in [dark, light] {
            for (got, want) in [(px.r, accent.r), (px.g, accent.g), (px.b, accent.b)] {
                assert!(got.abs_diff(want) <= 1, "{px:?} vs accent {accent:?}");
            }
            assert!(px.a > 0.99);
        }
    }

    #[test]
    fn loading_and_error_clear_the_surface() {
        let mut state = GaugeCardState::default();
        state.sync(&inputs(2.0), ThemeMode::Dark, 1, (40, 20));
        assert!(!state.surface().is_blank());

        let mut loading = inputs(2.0);
        loading.loading = true;
        assert!(state.sync(&loading, ThemeMode::Dark, 1, (40, 20)));
        assert!(state.surface().is_blank());

        let mut failed = inputs(0.0);
        failed.error = Some("Failed to fetch sensor data: timed out");
        assert!(state.sync(&failed, ThemeMode::Dark, 1, (40, 20)));
        assert!(state.surface().is_blank());
    }

    // ── rendering ──

    fn render(i: GaugeInputs<'_>) -> Buffer {
        let area = Rect::new(0, 0, 24, 10);
        let mut buf = Buffer::empty(area);
        let mut state = GaugeCardState::default();
        let spinner = ThrobberState::default();
        GaugeCard {
            title: "Current",
            inputs: i,
            theme: ThemeMode::Dark,
            scale: 2,
            spinner: &spinner,
        }
        .render(area, &mut buf, &mut state);
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
    fn normal_card_shows_readout_with_one_decimal() {
        let out = text(&render(inputs(2.345)));
        assert!(out.contains("Current"));
        assert!(out.contains("2.3 A"), "{out}");
        assert!(out.contains('▀'));
    }

    #[test]
    fn error_card_shows_message_and_hint() {
        let mut i = inputs(0.0);
        i.error = Some("boom");
        let out = text(&render(i));
        assert!(out.contains("Error:"));
        assert!(out.contains("boom"));
        assert!(out.contains("Shutdown"));
        assert!(!out.contains('▀'));
    }

    #[test]
    fn loading_card_shows_spinner_label() {
        let mut i = inputs(0.0);
        i.loading = true;
        let out = text(&render(i));
        assert!(out.contains("Loading..."), "{out}");
    }
}
