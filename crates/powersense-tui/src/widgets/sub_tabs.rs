//! Inline selector row, e.g. the averaging-period choices.

use ratatui::text::{Line, Span};

use crate::theme::{self, Palette};

/// Render a selector line with the active option highlighted.
pub fn render_sub_tabs<'a>(labels: &[&'a str], active_index: usize, p: &Palette) -> Line<'a> {
    let mut spans = Vec::with_capacity(labels.len() * 2);

    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", theme::key_hint(p)));
        }

        if i == active_index {
            spans.push(Span::styled(format!("[{label}]"), theme::tab_active(p)));
        } else {
            spans.push(Span::styled(*label, theme::tab_inactive(p)));
        }
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeMode;

    #[test]
    fn active_label_is_highlighted() {
        let p = ThemeMode::Dark.palette();
        let line = render_sub_tabs(&["a", "b", "c"], 1, p);
        assert_eq!(line.spans.len(), 5);
        assert_eq!(line.spans[2].style, theme::tab_active(p));
        assert_eq!(line.spans[2].content, "[b]");
        assert_eq!(line.spans[0].style, theme::tab_inactive(p));
    }
}
