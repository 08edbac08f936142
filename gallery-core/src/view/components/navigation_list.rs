//! src/view/components/navigation_list.rs
//! ============================================================================
//! # NavigationList: Folder Panel
//!
//! Selectable list of flat folders with an active marker. Owns only its
//! cursor; the folder list and the active id are pushed in by the
//! orchestrator after every folder mutation.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::controller::events::NavEvent;
use crate::model::item::{Folder, Id};
use crate::view::theme;

pub struct NavigationList {
    folders: Vec<Folder>,
    active: Option<Id>,
    cursor: usize,
}

impl Default for NavigationList {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationList {
    pub fn new() -> Self {
        Self {
            folders: Vec::new(),
            active: None,
            cursor: 0,
        }
    }

    pub fn set_folders(&mut self, folders: Vec<Folder>, active: Option<Id>) {
        self.folders = folders;
        self.active = active;
        // Park the cursor on the active folder when it is still present.
        if let Some(active) = &self.active {
            if let Some(pos) = self.folders.iter().position(|f| &f.id == active) {
                self.cursor = pos;
            }
        }
        if self.cursor >= self.folders.len() {
            self.cursor = self.folders.len().saturating_sub(1);
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if !self.folders.is_empty() {
            self.cursor = (self.cursor + 1).min(self.folders.len() - 1);
        }
    }

    pub fn current(&self) -> Option<&Folder> {
        self.folders.get(self.cursor)
    }

    /// Activate the folder under the cursor.
    pub fn select(&self) -> Option<NavEvent> {
        self.current()
            .map(|f| NavEvent::FolderSelected(f.id.clone()))
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let rows: Vec<ListItem<'_>> = self
            .folders
            .iter()
            .enumerate()
            .map(|(i, folder)| {
                let is_active = self.active.as_ref() == Some(&folder.id);
                let marker = if is_active { "▸ " } else { "  " };
                let style = if i == self.cursor {
                    theme::selected()
                } else if is_active {
                    theme::border_active()
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{marker}{}", folder.name),
                    style,
                )))
            })
            .collect();

        let list = List::new(rows).block(
            Block::default()
                .title("Folders")
                .borders(Borders::ALL)
                .border_style(theme::border()),
        );
        frame.render_widget(list, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folders() -> Vec<Folder> {
        vec![
            Folder::new(1, "A"),
            Folder::new(2, "B"),
            Folder::new(3, "C"),
        ]
    }

    #[test]
    fn cursor_parks_on_the_active_folder() {
        let mut nav = NavigationList::new();
        nav.set_folders(folders(), Some(Id::from(2)));
        assert_eq!(nav.current().map(|f| f.name.as_str()), Some("B"));
    }

    #[test]
    fn select_emits_the_cursor_folder() {
        let mut nav = NavigationList::new();
        nav.set_folders(folders(), None);
        nav.move_down();
        assert_eq!(nav.select(), Some(NavEvent::FolderSelected(Id::from(2))));
    }

    #[test]
    fn cursor_clamps_when_folders_shrink() {
        let mut nav = NavigationList::new();
        nav.set_folders(folders(), Some(Id::from(3)));
        nav.set_folders(vec![Folder::new(1, "A")], Some(Id::from(1)));
        assert_eq!(nav.current().map(|f| f.name.as_str()), Some("A"));
    }
}
