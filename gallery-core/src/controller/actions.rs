//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Gallery Commands
//!
//! Defines the action vocabulary the orchestrator dispatches on: per-item
//! actions, folder-panel actions, and toolbar action identifiers. Raw
//! terminal events are mapped into these by the event loop; widgets and
//! plugins speak only this vocabulary.

use compact_str::CompactString;

use crate::model::capabilities::Capabilities;

/// The fixed set of per-item actions. Every dispatch entry point re-checks
/// the matching capability flag, so a direct call for a disabled action is
/// a no-op rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Preview,
    Rename,
    Delete,
    Move,
    Copy,
}

impl ItemAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preview => "Preview",
            Self::Rename => "Rename",
            Self::Delete => "Delete",
            Self::Move => "Move",
            Self::Copy => "Copy",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Preview => "👁",
            Self::Rename => "✎",
            Self::Delete => "✕",
            Self::Move => "➜",
            Self::Copy => "⧉",
        }
    }

    /// Whether the derived capability snapshot allows this action.
    pub fn allowed(self, caps: &Capabilities) -> bool {
        match self {
            Self::Preview => caps.preview,
            Self::Rename => caps.rename_item,
            Self::Delete => caps.delete_item,
            Self::Move => caps.move_item,
            Self::Copy => caps.copy_item,
        }
    }
}

/// Folder-panel management actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    CreateFolder,
    RenameFolder,
    DeleteFolder,
}

/// Identifier carried by a toolbar button press. Built-ins are routed by
/// the orchestrator itself; anything else is offered to plugins in
/// registration order, first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarActionId {
    TogglePanel,
    Refresh,
    SelectAll,
    ClearSelection,
    DeleteSelected,
    MoveSelected,
    CopySelected,
    Plugin(CompactString),
}

impl ToolbarActionId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::TogglePanel => "toggle-panel",
            Self::Refresh => "refresh",
            Self::SelectAll => "select-all",
            Self::ClearSelection => "clear-selection",
            Self::DeleteSelected => "delete-selected",
            Self::MoveSelected => "move-selected",
            Self::CopySelected => "copy-selected",
            Self::Plugin(id) => id.as_str(),
        }
    }
}

impl From<&str> for ToolbarActionId {
    fn from(id: &str) -> Self {
        match id {
            "toggle-panel" => Self::TogglePanel,
            "refresh" => Self::Refresh,
            "select-all" => Self::SelectAll,
            "clear-selection" => Self::ClearSelection,
            "delete-selected" => Self::DeleteSelected,
            "move-selected" => Self::MoveSelected,
            "copy-selected" => Self::CopySelected,
            other => Self::Plugin(CompactString::from(other)),
        }
    }
}
