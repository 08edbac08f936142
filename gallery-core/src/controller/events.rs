//! src/controller/events.rs
//! ============================================================================
//! # Events: Typed Widget and Host Messages
//!
//! Widgets never call back into the orchestrator; they emit typed event
//! values which the event loop feeds to the matching `Gallery::handle_*`
//! method. Outbound state changes go to subscribers over a channel as
//! [`GalleryEvent`]s, and external systems push [`GalleryNotification`]s in.

use compact_str::CompactString;

use crate::controller::actions::{ItemAction, PanelAction, ToolbarActionId};
use crate::model::item::{Id, Item};

/// Events emitted by the items grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Item activated. `multi` carries the multi-select modifier.
    Click { id: Id, multi: bool },
    /// Item opened (preview gesture).
    Open { id: Id },
    /// One of the per-item action buttons pressed.
    Action { id: Id, action: ItemAction },
}

/// Events emitted by the folder navigation list.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    FolderSelected(Id),
    Panel(PanelAction),
}

/// Events emitted by the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarEvent {
    Pressed(ToolbarActionId),
    SearchSubmitted(CompactString),
}

/// Footer buttons of the modal dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalButton {
    Cancel,
    Confirm,
}

/// Events emitted by the modal dialog. Dismissal always resolves the
/// pending workflow as a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Button(ModalButton),
    Dismiss,
    Insert(char),
    Backspace,
    FocusNext,
    FocusPrev,
    CursorUp,
    CursorDown,
}

/// Outbound events delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    SelectionChanged { selected: Vec<Item> },
    ItemPreview { item: Item },
    ActionComplete { action: ItemAction, items: Vec<Item> },
}

/// Status carried by a legacy single-item task update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Complete,
    Failed,
}

/// Inbound notifications from external systems (batch generation jobs,
/// processing pipelines). Fed to [`Gallery::notify`].
///
/// [`Gallery::notify`]: crate::controller::orchestrator::Gallery::notify
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryNotification {
    TaskStart {
        generation_id: CompactString,
        total_items: usize,
        target_folder_id: Option<Id>,
    },
    TaskProgress {
        generation_id: CompactString,
        item: Item,
    },
    TaskEnd {
        generation_id: CompactString,
    },
    TaskError {
        generation_id: CompactString,
    },
    /// Legacy single-item progress update. A `Complete` status triggers a
    /// reconciling reload.
    TaskUpdate {
        id: Id,
        status: TaskStatus,
        progress: Option<u8>,
        message: Option<CompactString>,
    },
}
