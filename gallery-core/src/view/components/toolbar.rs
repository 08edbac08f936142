//! src/view/components/toolbar.rs
//! ============================================================================
//! # Toolbar: Action Bar with Overflow
//!
//! Renders a single-line toolbar of configurable items. Each item's cell
//! width is measured with `unicode-width`; buttons that do not fit move
//! into a "more actions" overflow menu, non-button items that overflow are
//! hidden entirely. The toolbar owns only rendering state (focus cursor,
//! overflow split, search buffer); the item list is rebuilt by the
//! orchestrator after every selection change.

use compact_str::CompactString;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::config::ToolbarConfig;
use crate::controller::actions::ToolbarActionId;
use crate::controller::events::ToolbarEvent;
use crate::view::theme;

/// One configurable toolbar entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarItem {
    Button {
        id: ToolbarActionId,
        label: CompactString,
    },
    Separator,
    Spacer,
    Search,
    Label(CompactString),
}

impl ToolbarItem {
    pub fn button(id: impl Into<ToolbarActionId>, label: impl Into<CompactString>) -> Self {
        Self::Button {
            id: id.into(),
            label: label.into(),
        }
    }

    fn is_button(&self) -> bool {
        matches!(self, Self::Button { .. })
    }
}

/// Focusable slots in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Index into `items` for a visible button.
    Item(usize),
    Search,
    OverflowToggle,
}

/// Result of the width-driven split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolbarLayout {
    pub visible: Vec<usize>,
    pub overflow: Vec<usize>,
}

pub struct Toolbar {
    items: Vec<ToolbarItem>,
    config: ToolbarConfig,
    layout: ToolbarLayout,
    slots: Vec<Slot>,
    cursor: usize,
    overflow_open: bool,
    overflow_cursor: usize,
    search_query: String,
}

impl Toolbar {
    pub fn new(config: ToolbarConfig) -> Self {
        Self {
            items: Vec::new(),
            config,
            layout: ToolbarLayout::default(),
            slots: Vec::new(),
            cursor: 0,
            overflow_open: false,
            overflow_cursor: 0,
            search_query: String::new(),
        }
    }

    /// Replace the item list. Closes the overflow menu and clamps the
    /// focus cursor; the search buffer survives rebuilds.
    pub fn set_items(&mut self, items: Vec<ToolbarItem>) {
        self.items = items;
        self.overflow_open = false;
        self.overflow_cursor = 0;
        self.layout = ToolbarLayout::default();
        self.slots.clear();
    }

    pub fn items(&self) -> &[ToolbarItem] {
        &self.items
    }

    pub fn layout_for_width(&self, width: u16) -> ToolbarLayout {
        let mut layout = ToolbarLayout::default();
        let gap = self.config.item_gap as usize;
        let budget = width.saturating_sub(self.config.overflow_button_width) as usize;
        let mut used = 0usize;
        let mut overflowing = false;

        for (idx, item) in self.items.iter().enumerate() {
            let w = Self::item_width(item, &self.search_query) + gap;
            if !overflowing && used + w <= budget {
                used += w;
                layout.visible.push(idx);
            } else {
                overflowing = true;
                // Only buttons survive the move into the overflow menu.
                if item.is_button() {
                    layout.overflow.push(idx);
                }
            }
        }
        layout
    }

    fn item_width(item: &ToolbarItem, query: &str) -> usize {
        match item {
            ToolbarItem::Button { label, .. } => label.width() + 2,
            ToolbarItem::Separator => 1,
            ToolbarItem::Spacer => 2,
            ToolbarItem::Search => query.width().max(8) + 3,
            ToolbarItem::Label(text) => text.width(),
        }
    }

    fn rebuild_slots(&mut self) {
        self.slots.clear();
        for &idx in &self.layout.visible {
            match self.items[idx] {
                ToolbarItem::Button { .. } => self.slots.push(Slot::Item(idx)),
                ToolbarItem::Search => self.slots.push(Slot::Search),
                _ => {}
            }
        }
        if !self.layout.overflow.is_empty() {
            self.slots.push(Slot::OverflowToggle);
        }
        if self.cursor >= self.slots.len() {
            self.cursor = self.slots.len().saturating_sub(1);
        }
    }

    pub fn focus_next(&mut self) {
        if self.overflow_open {
            let len = self.layout.overflow.len();
            if len > 0 {
                self.overflow_cursor = (self.overflow_cursor + 1) % len;
            }
        } else if !self.slots.is_empty() {
            self.cursor = (self.cursor + 1) % self.slots.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if self.overflow_open {
            let len = self.layout.overflow.len();
            if len > 0 {
                self.overflow_cursor = (self.overflow_cursor + len - 1) % len;
            }
        } else if !self.slots.is_empty() {
            self.cursor = (self.cursor + self.slots.len() - 1) % self.slots.len();
        }
    }

    /// Activate the focused slot. Pressing a button in the overflow menu
    /// closes the menu.
    pub fn press(&mut self) -> Option<ToolbarEvent> {
        if self.overflow_open {
            let idx = *self.layout.overflow.get(self.overflow_cursor)?;
            self.overflow_open = false;
            if let ToolbarItem::Button { id, .. } = &self.items[idx] {
                return Some(ToolbarEvent::Pressed(id.clone()));
            }
            return None;
        }

        match self.slots.get(self.cursor)? {
            Slot::Item(idx) => {
                if let ToolbarItem::Button { id, .. } = &self.items[*idx] {
                    Some(ToolbarEvent::Pressed(id.clone()))
                } else {
                    None
                }
            }
            Slot::Search => Some(ToolbarEvent::SearchSubmitted(
                CompactString::from(self.search_query.as_str()),
            )),
            Slot::OverflowToggle => {
                self.overflow_open = true;
                self.overflow_cursor = 0;
                None
            }
        }
    }

    pub fn overflow_open(&self) -> bool {
        self.overflow_open
    }

    pub fn close_overflow(&mut self) {
        self.overflow_open = false;
    }

    pub fn search_focused(&self) -> bool {
        matches!(self.slots.get(self.cursor), Some(Slot::Search)) && !self.overflow_open
    }

    pub fn search_insert(&mut self, ch: char) {
        self.search_query.push(ch);
    }

    pub fn search_backspace(&mut self) {
        self.search_query.pop();
    }

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect) {
        self.layout = self.layout_for_width(area.width);
        self.rebuild_slots();

        let mut spans: Vec<Span<'_>> = Vec::new();
        let gap = " ".repeat(self.config.item_gap as usize);

        for &idx in &self.layout.visible {
            match &self.items[idx] {
                ToolbarItem::Button { label, .. } => {
                    let focused = !self.overflow_open
                        && self.slots.get(self.cursor) == Some(&Slot::Item(idx));
                    let style = if focused {
                        theme::button_focused()
                    } else {
                        theme::button()
                    };
                    spans.push(Span::styled(format!(" {label} "), style));
                }
                ToolbarItem::Separator => spans.push(Span::styled("│", theme::dim())),
                ToolbarItem::Spacer => spans.push(Span::raw("  ")),
                ToolbarItem::Search => {
                    let focused =
                        !self.overflow_open && matches!(self.slots.get(self.cursor), Some(Slot::Search));
                    let style = if focused {
                        theme::border_active()
                    } else {
                        theme::dim()
                    };
                    let text = if self.search_query.is_empty() {
                        "search…".to_string()
                    } else {
                        self.search_query.clone()
                    };
                    spans.push(Span::styled(format!("🔍 {text}"), style));
                }
                ToolbarItem::Label(text) => {
                    spans.push(Span::styled(text.to_string(), theme::dim()));
                }
            }
            spans.push(Span::raw(gap.clone()));
        }

        if !self.layout.overflow.is_empty() {
            let focused = !self.overflow_open
                && matches!(self.slots.get(self.cursor), Some(Slot::OverflowToggle));
            let style = if focused || self.overflow_open {
                theme::button_focused()
            } else {
                theme::button()
            };
            spans.push(Span::styled(" ⋯ ", style));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        if self.overflow_open {
            self.render_overflow_menu(frame, area);
        }
    }

    fn render_overflow_menu(&self, frame: &mut Frame<'_>, toolbar_area: Rect) {
        let labels: Vec<ListItem<'_>> = self
            .layout
            .overflow
            .iter()
            .enumerate()
            .filter_map(|(i, &idx)| match &self.items[idx] {
                ToolbarItem::Button { label, .. } => {
                    let style = if i == self.overflow_cursor {
                        theme::selected()
                    } else {
                        ratatui::style::Style::default()
                    };
                    Some(ListItem::new(Span::styled(label.to_string(), style)))
                }
                _ => None,
            })
            .collect();

        let width = self
            .layout
            .overflow
            .iter()
            .filter_map(|&idx| match &self.items[idx] {
                ToolbarItem::Button { label, .. } => Some(label.width() as u16),
                _ => None,
            })
            .max()
            .unwrap_or(10)
            + 4;
        let height = labels.len() as u16 + 2;
        let x = toolbar_area
            .right()
            .saturating_sub(width)
            .max(toolbar_area.x);
        let menu = Rect::new(x, toolbar_area.y + 1, width, height);

        frame.render_widget(Clear, menu);
        let list = List::new(labels).block(
            Block::default()
                .title("More actions")
                .borders(Borders::ALL)
                .border_style(theme::border()),
        );
        frame.render_widget(list, menu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_with(items: Vec<ToolbarItem>) -> Toolbar {
        let mut bar = Toolbar::new(ToolbarConfig::default());
        bar.set_items(items);
        bar
    }

    #[test]
    fn everything_fits_in_a_wide_bar() {
        let bar = bar_with(vec![
            ToolbarItem::button(ToolbarActionId::Refresh, "Refresh"),
            ToolbarItem::Separator,
            ToolbarItem::button(ToolbarActionId::SelectAll, "Select all"),
        ]);
        let layout = bar.layout_for_width(120);
        assert_eq!(layout.visible, vec![0, 1, 2]);
        assert!(layout.overflow.is_empty());
    }

    #[test]
    fn overflowing_buttons_move_to_menu_non_buttons_hide() {
        let bar = bar_with(vec![
            ToolbarItem::button(ToolbarActionId::Refresh, "Refresh"),
            ToolbarItem::Separator,
            ToolbarItem::button(ToolbarActionId::SelectAll, "Select all"),
            ToolbarItem::Label("status text".into()),
            ToolbarItem::button(ToolbarActionId::DeleteSelected, "Delete"),
        ]);
        // "Refresh" padded is 9 cells + gap; budget 20 - 5 = 15 fits the
        // first button and the separator only.
        let layout = bar.layout_for_width(20);
        assert_eq!(layout.visible, vec![0, 1]);
        assert_eq!(layout.overflow, vec![2, 4]);
    }

    #[test]
    fn press_in_overflow_menu_emits_and_closes() {
        let mut bar = bar_with(vec![
            ToolbarItem::button(ToolbarActionId::Refresh, "Refresh"),
            ToolbarItem::button(ToolbarActionId::SelectAll, "Select all"),
        ]);
        bar.layout = bar.layout_for_width(15);
        bar.rebuild_slots();

        // Focus the overflow toggle (last slot) and open the menu.
        while !matches!(bar.slots.get(bar.cursor), Some(Slot::OverflowToggle)) {
            bar.focus_next();
        }
        assert!(bar.press().is_none());
        assert!(bar.overflow_open);

        let event = bar.press();
        assert_eq!(
            event,
            Some(ToolbarEvent::Pressed(ToolbarActionId::SelectAll))
        );
        assert!(!bar.overflow_open);
    }

    #[test]
    fn search_submit_carries_the_query() {
        let mut bar = bar_with(vec![ToolbarItem::Search]);
        bar.layout = bar.layout_for_width(80);
        bar.rebuild_slots();
        for ch in "ocean".chars() {
            bar.search_insert(ch);
        }
        assert_eq!(
            bar.press(),
            Some(ToolbarEvent::SearchSubmitted("ocean".into()))
        );
    }
}
