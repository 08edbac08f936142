//! src/view/components/toast.rs
//! ============================================================================
//! # ToastOverlay: Transient Notifications
//!
//! Renders the newest toasts stacked in the bottom-right corner. Expiry is
//! driven by the event loop tick calling `GalleryState::expire_toasts`.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::model::state::{Toast, ToastLevel};
use crate::view::theme;

pub struct ToastOverlay;

impl ToastOverlay {
    pub fn render(frame: &mut Frame<'_>, toasts: &[Toast], max_visible: usize, area: Rect) {
        let visible = toasts.iter().rev().take(max_visible);
        for (row, toast) in visible.enumerate() {
            let style = match toast.level {
                ToastLevel::Info => theme::info(),
                ToastLevel::Success => theme::success(),
                ToastLevel::Error => theme::error(),
            };
            let text = format!(" {} ", toast.message);
            let width = (text.width() as u16).min(area.width);
            let y = area.bottom().saturating_sub(2 + row as u16);
            if y < area.y {
                break;
            }
            let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, 1);
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(text, style))),
                rect,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Instant;

    #[test]
    fn newest_toasts_render_within_the_cap() {
        let toasts: Vec<Toast> = (0..5)
            .map(|i| Toast {
                message: format!("toast-{i}").into(),
                level: ToastLevel::Info,
                created_at: Instant::now(),
            })
            .collect();

        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| ToastOverlay::render(frame, &toasts, 3, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
        }
        assert!(text.contains("toast-4"));
        assert!(text.contains("toast-2"));
        assert!(!text.contains("toast-1"));
    }
}
