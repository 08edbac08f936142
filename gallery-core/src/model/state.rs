//! src/model/state.rs
//! ============================================================================
//! # Gallery State
//!
//! The single source of truth owned by the orchestrator: items, folders,
//! selection, current folder, capability snapshot, the modal workflow slot,
//! generation tracking and transient toasts. Widgets hold none of this;
//! they are views driven by `set_items`/`set_options` calls.

use std::time::{Duration, Instant};

use compact_str::CompactString;

use crate::model::capabilities::Capabilities;
use crate::model::generation::GenerationTracker;
use crate::model::item::{Folder, Id, Item};
use crate::model::selection::Selection;
use crate::model::workflow::WorkflowSlot;

/// Toast severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A short-lived user-facing notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: CompactString,
    pub level: ToastLevel,
    pub created_at: Instant,
}

#[derive(Debug)]
pub struct GalleryState {
    pub items: Vec<Item>,
    pub folders: Vec<Folder>,
    pub selection: Selection,
    pub current_folder: Option<Folder>,
    pub capabilities: Capabilities,
    pub workflow: WorkflowSlot,
    pub generations: GenerationTracker,

    /// In-flight guard for `load`; a second call while set is dropped.
    pub loading: bool,
    /// Message shown while a load is in flight.
    pub loading_message: CompactString,
    /// Inline error from the last failed load, shown in the grid area.
    pub load_error: Option<CompactString>,

    pub title: CompactString,
    pub toasts: Vec<Toast>,
}

impl GalleryState {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            items: Vec::new(),
            folders: Vec::new(),
            selection: Selection::new(),
            current_folder: None,
            capabilities,
            workflow: WorkflowSlot::default(),
            generations: GenerationTracker::default(),
            loading: false,
            loading_message: CompactString::new(""),
            load_error: None,
            title: CompactString::const_new("Gallery"),
            toasts: Vec::new(),
        }
    }

    pub fn current_folder_id(&self) -> Option<Id> {
        self.current_folder.as_ref().map(|f| f.id.clone())
    }

    pub fn find_item(&self, id: &Id) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn find_folder(&self, id: &Id) -> Option<&Folder> {
        self.folders.iter().find(|f| &f.id == id)
    }

    /// Selected items in item-list order, cloned for handing to workflows
    /// and plugins.
    pub fn selected_items(&self) -> Vec<Item> {
        self.selection
            .selected_items(&self.items)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn push_toast(&mut self, message: impl Into<CompactString>, level: ToastLevel) {
        self.toasts.push(Toast {
            message: message.into(),
            level,
            created_at: Instant::now(),
        });
    }

    /// Drop toasts older than `ttl`. Returns `true` when anything expired.
    pub fn expire_toasts(&mut self, ttl: Duration) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.created_at.elapsed() < ttl);
        before != self.toasts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::MediaKind;

    #[test]
    fn selected_items_are_cloned_in_list_order() {
        let mut state = GalleryState::new(Capabilities::default());
        state.items = vec![
            Item::new(1, "a", MediaKind::Image),
            Item::new(2, "b", MediaKind::Image),
        ];
        state.selection.toggle(Id::from(2), true);
        state.selection.toggle(Id::from(1), true);
        let picked = state.selected_items();
        assert_eq!(picked[0].id, Id::from(1));
        assert_eq!(picked[1].id, Id::from(2));
    }

    #[test]
    fn toast_expiry() {
        let mut state = GalleryState::new(Capabilities::default());
        state.push_toast("hello", ToastLevel::Info);
        assert!(!state.expire_toasts(Duration::from_secs(60)));
        assert!(state.expire_toasts(Duration::ZERO));
        assert!(state.toasts.is_empty());
    }
}
