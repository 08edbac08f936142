//! src/model/item.rs
//! ============================================================================
//! # Items and Folders
//!
//! Core data model for the gallery: media items, flat folders, and the
//! render-only card data handed to the grid each frame.

use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::controller::actions::ItemAction;

/// Identifier for items and folders. Backends may use numeric or string
/// keys; comparisons are exact (a numeric 100 never matches a textual
/// "100").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(CompactString),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self::Text(CompactString::from(s))
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self::Text(s.into())
    }
}

/// Media classification; drives the preview surface and the card icon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
    Audio,
    Other,
}

impl MediaKind {
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Image => "IMG",
            Self::Video => "VID",
            Self::Audio => "AUD",
            Self::Other => "DOC",
        }
    }
}

/// A single gallery item. `folder_id` is absent when folders are disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Id,
    pub name: CompactString,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub thumb_url: CompactString,
    pub media_url: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Id>,
}

impl Item {
    pub fn new(id: impl Into<Id>, name: impl Into<CompactString>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            thumb_url: CompactString::new(""),
            media_url: CompactString::new(""),
            folder_id: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<Id>) -> Self {
        self.folder_id = Some(folder.into());
        self
    }

    pub fn with_urls(
        mut self,
        thumb: impl Into<CompactString>,
        media: impl Into<CompactString>,
    ) -> Self {
        self.thumb_url = thumb.into();
        self.media_url = media.into();
        self
    }
}

/// A flat (non-hierarchical) folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Id,
    pub name: CompactString,
}

impl Folder {
    pub fn new(id: impl Into<Id>, name: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Per-card action affordance, computed each render from capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemActionButton {
    pub action: ItemAction,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Render-only card data handed to the items grid. Never persisted.
#[derive(Debug, Clone)]
pub struct GridEntry {
    pub item: Item,
    pub is_selected: bool,
    pub actions: Vec<ItemActionButton>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_comparisons_are_exact() {
        assert_ne!(Id::from(100), Id::from("100"));
        assert_eq!(Id::from(100), Id::Number(100));
    }

    #[test]
    fn item_json_shape_matches_backend_payloads() {
        let json = r#"{
            "id": 1,
            "name": "Mountain.jpg",
            "type": "image",
            "thumb_url": "thumb://1",
            "media_url": "media://1",
            "folder_id": "nature"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, Id::Number(1));
        assert_eq!(item.kind, MediaKind::Image);
        assert_eq!(item.folder_id, Some(Id::from("nature")));
    }
}
