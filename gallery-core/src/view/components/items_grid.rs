//! src/view/components/items_grid.rs
//! ============================================================================
//! # ItemsGrid: Responsive Card Grid
//!
//! Renders item cards (type icon, name, selected styling, per-item action
//! hints) in a responsive grid. Flow is vertical (row-major) or horizontal
//! (column-major); the column/row count is fixed by the options or derived
//! from the card size and the available area. The grid owns only its
//! cursor and scroll offset; the card list is handed in each frame by the
//! orchestrator as render-only [`GridEntry`] values.

use compact_str::CompactString;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use serde::{Deserialize, Serialize};

use crate::controller::events::GridEvent;
use crate::model::item::GridEntry;
use crate::view::theme;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridDirection {
    #[default]
    Vertical,
    Horizontal,
}

/// Grid tuning, part of the gallery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub direction: GridDirection,
    /// Fixed column count for vertical flow; auto when absent.
    pub columns: Option<u16>,
    /// Fixed row count for horizontal flow; auto when absent.
    pub rows: Option<u16>,
    /// Card size in cells (width, height).
    pub item_size: (u16, u16),
    pub gap: u16,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            direction: GridDirection::Vertical,
            columns: None,
            rows: None,
            item_size: (20, 4),
            gap: 1,
        }
    }
}

pub struct ItemsGrid {
    options: GridOptions,
    entries: Vec<GridEntry>,
    cursor: usize,
    /// First visible row (vertical flow) or column (horizontal flow).
    scroll: usize,
    loading: bool,
    loading_message: CompactString,
    error: Option<CompactString>,
    /// Lane count from the last render, used for cursor arithmetic.
    lanes: usize,
}

impl ItemsGrid {
    pub fn new(options: GridOptions) -> Self {
        Self {
            options,
            entries: Vec::new(),
            cursor: 0,
            scroll: 0,
            loading: false,
            loading_message: CompactString::new(""),
            error: None,
            lanes: 1,
        }
    }

    /// Wholesale replace the card list (items are never diffed).
    pub fn set_entries(&mut self, entries: Vec<GridEntry>) {
        self.entries = entries;
        if self.cursor >= self.entries.len() {
            self.cursor = self.entries.len().saturating_sub(1);
        }
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn set_loading(&mut self, loading: bool, message: impl Into<CompactString>) {
        self.loading = loading;
        self.loading_message = message.into();
    }

    pub fn set_error(&mut self, error: Option<CompactString>) {
        self.error = error;
    }

    pub fn entries(&self) -> &[GridEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<&GridEntry> {
        self.entries.get(self.cursor)
    }

    /// Number of lanes (columns for vertical flow, rows for horizontal)
    /// that fit the given cross-axis extent.
    pub fn lanes_for(&self, cross_extent: u16) -> usize {
        let fixed = match self.options.direction {
            GridDirection::Vertical => self.options.columns,
            GridDirection::Horizontal => self.options.rows,
        };
        if let Some(n) = fixed {
            return n.max(1) as usize;
        }
        let cell = match self.options.direction {
            GridDirection::Vertical => self.options.item_size.0 + self.options.gap,
            GridDirection::Horizontal => self.options.item_size.1 + self.options.gap,
        };
        (((cross_extent + self.options.gap) / cell.max(1)).max(1)) as usize
    }

    pub fn move_up(&mut self) {
        match self.options.direction {
            GridDirection::Vertical => self.step_back(self.lanes),
            GridDirection::Horizontal => self.step_back(1),
        }
    }

    pub fn move_down(&mut self) {
        match self.options.direction {
            GridDirection::Vertical => self.step_forward(self.lanes),
            GridDirection::Horizontal => self.step_forward(1),
        }
    }

    pub fn move_left(&mut self) {
        match self.options.direction {
            GridDirection::Vertical => self.step_back(1),
            GridDirection::Horizontal => self.step_back(self.lanes),
        }
    }

    pub fn move_right(&mut self) {
        match self.options.direction {
            GridDirection::Vertical => self.step_forward(1),
            GridDirection::Horizontal => self.step_forward(self.lanes),
        }
    }

    fn step_forward(&mut self, by: usize) {
        if self.entries.is_empty() {
            return;
        }
        self.cursor = (self.cursor + by).min(self.entries.len() - 1);
    }

    fn step_back(&mut self, by: usize) {
        self.cursor = self.cursor.saturating_sub(by);
    }

    /// Activation of the card under the cursor.
    pub fn click(&self, multi: bool) -> Option<GridEvent> {
        self.current().map(|e| GridEvent::Click {
            id: e.item.id.clone(),
            multi,
        })
    }

    /// Open gesture (preview) on the card under the cursor.
    pub fn open(&self) -> Option<GridEvent> {
        self.current().map(|e| GridEvent::Open {
            id: e.item.id.clone(),
        })
    }

    /// Press the n-th action hint of the card under the cursor.
    pub fn action(&self, index: usize) -> Option<GridEvent> {
        let entry = self.current()?;
        let button = entry.actions.get(index)?;
        Some(GridEvent::Action {
            id: entry.item.id.clone(),
            action: button.action,
        })
    }

    fn max_scroll(&self) -> usize {
        let lanes = self.lanes.max(1);
        self.entries.len().div_ceil(lanes).saturating_sub(1)
    }

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let mut body = area;
        if let Some(error) = &self.error {
            let line = Paragraph::new(Line::from(Span::styled(
                format!("⚠ {error}"),
                theme::error(),
            )));
            frame.render_widget(line, Rect { height: 1, ..area });
            body = Rect {
                y: area.y + 1,
                height: area.height.saturating_sub(1),
                ..area
            };
        }

        let (cell_w, cell_h) = self.options.item_size;
        let gap = self.options.gap;
        let cross = match self.options.direction {
            GridDirection::Vertical => body.width,
            GridDirection::Horizontal => body.height,
        };
        self.lanes = self.lanes_for(cross);

        let main_cell = match self.options.direction {
            GridDirection::Vertical => cell_h + gap,
            GridDirection::Horizontal => cell_w + gap,
        };
        let main_extent = match self.options.direction {
            GridDirection::Vertical => body.height,
            GridDirection::Horizontal => body.width,
        };
        let visible_main = ((main_extent + gap) / main_cell.max(1)).max(1) as usize;

        // Keep the cursor's row/column inside the viewport.
        let cursor_main = self.cursor / self.lanes.max(1);
        if cursor_main < self.scroll {
            self.scroll = cursor_main;
        } else if cursor_main >= self.scroll + visible_main {
            self.scroll = cursor_main + 1 - visible_main;
        }

        let first = self.scroll * self.lanes;
        let last = (first + visible_main * self.lanes).min(self.entries.len());
        for (offset, entry) in self.entries[first..last].iter().enumerate() {
            let index = first + offset;
            let lane = offset % self.lanes.max(1);
            let main = offset / self.lanes.max(1);
            let (x, y) = match self.options.direction {
                GridDirection::Vertical => (
                    body.x + lane as u16 * (cell_w + gap),
                    body.y + main as u16 * (cell_h + gap),
                ),
                GridDirection::Horizontal => (
                    body.x + main as u16 * (cell_w + gap),
                    body.y + lane as u16 * (cell_h + gap),
                ),
            };
            if x + cell_w > body.right() + gap || y + cell_h > body.bottom() + gap {
                continue;
            }
            let cell = Rect::new(
                x,
                y,
                cell_w.min(body.right().saturating_sub(x)),
                cell_h.min(body.bottom().saturating_sub(y)),
            );
            self.render_card(frame, cell, entry, index == self.cursor);
        }

        if self.loading {
            let overlay = Paragraph::new(Line::from(Span::styled(
                format!("⠿ {}", self.loading_message),
                theme::title(),
            )))
            .alignment(Alignment::Center);
            let y = body.y + body.height / 2;
            frame.render_widget(overlay, Rect { y, height: 1, ..body });
        }
    }

    fn render_card(&self, frame: &mut Frame<'_>, cell: Rect, entry: &GridEntry, focused: bool) {
        let border = if focused {
            theme::border_active()
        } else if entry.is_selected {
            theme::selected()
        } else {
            theme::border()
        };
        let name_style = if entry.is_selected {
            theme::selected()
        } else {
            ratatui::style::Style::default()
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(entry.item.kind.icon(), theme::info()),
            Span::raw(" "),
            Span::styled(entry.item.name.to_string(), name_style),
        ])];
        if !entry.actions.is_empty() {
            let hints: Vec<Span<'_>> = entry
                .actions
                .iter()
                .flat_map(|a| [Span::styled(a.icon, theme::dim()), Span::raw(" ")])
                .collect();
            lines.push(Line::from(hints));
        }

        let block = Block::default().borders(Borders::ALL).border_style(border);
        frame.render_widget(Paragraph::new(lines).block(block), cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{Item, MediaKind};

    fn entries(n: usize) -> Vec<GridEntry> {
        (0..n)
            .map(|i| GridEntry {
                item: Item::new(i as i64, format!("item-{i}"), MediaKind::Image),
                is_selected: false,
                actions: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn lane_count_auto_derives_from_card_width() {
        let grid = ItemsGrid::new(GridOptions::default());
        // card 20 + gap 1 per lane
        assert_eq!(grid.lanes_for(63), 3);
        assert_eq!(grid.lanes_for(10), 1);
    }

    #[test]
    fn fixed_columns_override_auto() {
        let grid = ItemsGrid::new(GridOptions {
            columns: Some(2),
            ..GridOptions::default()
        });
        assert_eq!(grid.lanes_for(200), 2);
    }

    #[test]
    fn vertical_cursor_moves_by_lane() {
        let mut grid = ItemsGrid::new(GridOptions {
            columns: Some(3),
            ..GridOptions::default()
        });
        grid.lanes = 3;
        grid.set_entries(entries(7));
        grid.move_down();
        assert_eq!(grid.cursor, 3);
        grid.move_right();
        assert_eq!(grid.cursor, 4);
        grid.move_up();
        assert_eq!(grid.cursor, 1);
    }

    #[test]
    fn cursor_clamps_to_the_list() {
        let mut grid = ItemsGrid::new(GridOptions::default());
        grid.lanes = 2;
        grid.set_entries(entries(3));
        for _ in 0..10 {
            grid.move_down();
        }
        assert_eq!(grid.cursor, 2);
        grid.set_entries(entries(1));
        assert_eq!(grid.cursor, 0);
    }

    #[test]
    fn click_events_carry_the_cursor_item() {
        let mut grid = ItemsGrid::new(GridOptions::default());
        grid.set_entries(entries(2));
        grid.move_right();
        assert_eq!(
            grid.click(true),
            Some(GridEvent::Click {
                id: crate::model::item::Id::from(1),
                multi: true
            })
        );
    }
}
