//! Dark and light palettes, accent tokens, and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::widgets::surface::Rgba;

// ── Accent tokens ─────────────────────────────────────────────────────

/// Named accent colors used by gauges and history graphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColorToken {
    #[default]
    Primary,
    Secondary,
    Success,
    Warning,
    Danger,
    Indigo,
}

impl ColorToken {
    /// Look a token up by name. Unknown names fall back to `Primary`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "secondary" => Self::Secondary,
            "success" => Self::Success,
            "warning" => Self::Warning,
            "danger" => Self::Danger,
            "indigo" => Self::Indigo,
            _ => Self::Primary,
        }
    }

    pub const fn rgba(self) -> Rgba {
        match self {
            Self::Primary => Rgba::rgb(0x3b, 0x82, 0xf6),
            Self::Secondary | Self::Indigo => Rgba::rgb(0x63, 0x66, 0xf1),
            Self::Success => Rgba::rgb(0x10, 0xb9, 0x81),
            Self::Warning => Rgba::rgb(0xf5, 0x9e, 0x0b),
            Self::Danger => Rgba::rgb(0xef, 0x44, 0x44),
        }
    }

    pub const fn color(self) -> Color {
        self.rgba().to_color()
    }
}

/// Accent `token` at opacity `alpha` (0.0..=1.0).
pub fn with_alpha(token: ColorToken, alpha: f32) -> Rgba {
    token.rgba().with_alpha(alpha)
}

// ── Theme mode ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Dark => &DARK,
            Self::Light => &LIGHT,
        }
    }
}

impl From<powersense_config::ThemeSetting> for ThemeMode {
    fn from(setting: powersense_config::ThemeSetting) -> Self {
        match setting {
            powersense_config::ThemeSetting::Dark => Self::Dark,
            powersense_config::ThemeSetting::Light => Self::Light,
        }
    }
}

// ── Palettes ──────────────────────────────────────────────────────────

/// Every color the dashboard paints with, for one theme mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focused: Color,
    pub title: Color,
    pub error: Color,
    /// Background behind cards and overlays.
    pub card_bg: Rgba,
    /// Unfilled part of a gauge arc.
    pub gauge_track: Rgba,
    /// Disk under a gauge readout.
    pub gauge_disk: Rgba,
}

pub static DARK: Palette = Palette {
    text: Color::Rgb(229, 231, 235),  // #e5e7eb
    text_dim: Color::Rgb(156, 163, 175), // #9ca3af
    border: Color::Rgb(75, 85, 99),   // #4b5563
    border_focused: Color::Rgb(59, 130, 246),
    title: Color::Rgb(147, 197, 253), // #93c5fd
    error: Color::Rgb(248, 113, 113), // #f87171
    card_bg: Rgba::rgb(0x1f, 0x29, 0x37),
    gauge_track: Rgba::rgba(44, 62, 80, 0.3),
    gauge_disk: Rgba::rgba(30, 41, 59, 0.6),
};

pub static LIGHT: Palette = Palette {
    text: Color::Rgb(17, 24, 39),     // #111827
    text_dim: Color::Rgb(75, 85, 99), // #4b5563
    border: Color::Rgb(203, 213, 225), // #cbd5e1
    border_focused: Color::Rgb(37, 99, 235),
    title: Color::Rgb(30, 64, 175), // #1e40af
    error: Color::Rgb(220, 38, 38), // #dc2626
    card_bg: Rgba::rgb(0xff, 0xff, 0xff),
    gauge_track: Rgba::rgba(203, 213, 225, 0.6),
    gauge_disk: Rgba::rgba(241, 245, 249, 0.8),
};

// ── Semantic styles ───────────────────────────────────────────────────

/// Base style for a card: text on the card background.
pub fn card(p: &Palette) -> Style {
    Style::default().fg(p.text).bg(p.card_bg.to_color())
}

/// Title text for blocks/panels.
pub fn title_style(p: &Palette) -> Style {
    Style::default().fg(p.title).add_modifier(Modifier::BOLD)
}

pub fn border_default(p: &Palette) -> Style {
    Style::default().fg(p.border)
}

/// Border of the panel that currently owns keyboard input.
pub fn border_focused(p: &Palette) -> Style {
    Style::default().fg(p.border_focused)
}

pub fn text(p: &Palette) -> Style {
    Style::default().fg(p.text)
}

pub fn dim(p: &Palette) -> Style {
    Style::default().fg(p.text_dim)
}

pub fn error(p: &Palette) -> Style {
    Style::default().fg(p.error).add_modifier(Modifier::BOLD)
}

/// Selected entry of the period selector.
pub fn tab_active(p: &Palette) -> Style {
    Style::default()
        .fg(p.border_focused)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive(p: &Palette) -> Style {
    Style::default().fg(p.text_dim)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint(p: &Palette) -> Style {
    Style::default().fg(p.text_dim)
}

/// Key hint key character.
pub fn key_hint_key(p: &Palette) -> Style {
    Style::default()
        .fg(p.border_focused)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tokens_fall_back_to_primary() {
        assert_eq!(ColorToken::from_name("warning"), ColorToken::Warning);
        assert_eq!(ColorToken::from_name("Danger"), ColorToken::Danger);
        assert_eq!(ColorToken::from_name("chartreuse"), ColorToken::Primary);
        assert_eq!(ColorToken::from_name(""), ColorToken::Primary);
    }

    #[test]
    fn token_hex_values() {
        assert_eq!(ColorToken::Primary.color(), Color::Rgb(0x3b, 0x82, 0xf6));
        assert_eq!(ColorToken::Success.color(), Color::Rgb(0x10, 0xb9, 0x81));
        assert_eq!(ColorToken::Indigo.color(), ColorToken::Secondary.color());
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = with_alpha(ColorToken::Warning, 0.5);
        assert_eq!(c.to_color(), ColorToken::Warning.color());
        assert!((c.a - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn toggle_swaps_gauge_palette() {
        let dark = ThemeMode::Dark.palette();
        let light = ThemeMode::Dark.toggle().palette();
        assert_ne!(dark.gauge_track, light.gauge_track);
        assert_ne!(dark.gauge_disk, light.gauge_disk);
        assert_eq!(ThemeMode::Light.toggle(), ThemeMode::Dark);
    }
}
