//! src/view/theme.rs
//! ============================================================================
//! # Theme: Shared Styles for the Gallery Widgets

use ratatui::style::{Color, Modifier, Style};

pub fn title() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

pub fn border() -> Style {
    Style::default().fg(Color::LightBlue)
}

pub fn border_active() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub fn cursor() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

pub fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn error() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub fn success() -> Style {
    Style::default().fg(Color::Green)
}

pub fn info() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn button() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

pub fn button_focused() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}
