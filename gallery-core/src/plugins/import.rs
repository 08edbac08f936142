//! src/plugins/import.rs
//! ============================================================================
//! # Import Plugin
//!
//! Contributes an "Import" toolbar button that queues media files from a
//! configured directory and hands them to the host as an upload command.
//! The host shows a progress modal (one row per file), uploads sequentially
//! through `upload_item`, then reloads the current folder. The button is
//! withheld entirely when the source does not declare the upload
//! capability.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::item::Item;
use crate::plugins::contract::{GalleryPlugin, PluginCommand, PluginHooks, PluginHost};
use crate::view::components::toolbar::ToolbarItem;

const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "mp4", "mov", "mkv", "avi", "webm", "mp3", "wav",
    "ogg", "flac",
];

/// One queued file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    pub id: Uuid,
    pub file_name: CompactString,
    pub path: PathBuf,
}

pub struct ImportPlugin {
    directory: PathBuf,
    enabled: bool,
}

impl ImportPlugin {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            enabled: false,
        }
    }

    fn is_media(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Scan the configured directory for media files, sorted by name.
    fn scan(&self) -> Vec<ImportFile> {
        let entries = match std::fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %self.directory.display(), %err, "Import directory unreadable");
                return Vec::new();
            }
        };

        let mut files: Vec<ImportFile> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && Self::is_media(p))
            .filter_map(|path| {
                let file_name = path.file_name()?.to_str()?.into();
                Some(ImportFile {
                    id: Uuid::new_v4(),
                    file_name,
                    path,
                })
            })
            .collect();
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!(count = files.len(), "Import scan");
        files
    }
}

impl GalleryPlugin for ImportPlugin {
    fn name(&self) -> &str {
        "import"
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks {
            toolbar_buttons: true,
            toolbar_actions: true,
            selection: false,
        }
    }

    fn on_init(&mut self, host: &PluginHost<'_>) {
        self.enabled = host.capabilities.upload_item;
    }

    fn toolbar_buttons(&self, _selected: &[&Item]) -> Vec<ToolbarItem> {
        if self.enabled {
            vec![ToolbarItem::button("import", "Import")]
        } else {
            Vec::new()
        }
    }

    fn handle_toolbar_action(&mut self, action_id: &str, _selected: &[Item]) -> Option<PluginCommand> {
        if action_id != "import" || !self.enabled {
            return None;
        }
        let files = self.scan();
        if files.is_empty() {
            debug!("Nothing to import");
            return None;
        }
        Some(PluginCommand::Upload(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::source::data_source::SourceCapabilities;

    #[test]
    fn scan_keeps_media_files_only_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let plugin = ImportPlugin::new(dir.path());
        let files = plugin.scan();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn button_withheld_without_upload_capability() {
        let mut plugin = ImportPlugin::new("/nonexistent");
        let config = GalleryConfig::default();
        plugin.on_init(&PluginHost {
            capabilities: &SourceCapabilities::default(),
            config: &config,
        });
        assert!(plugin.toolbar_buttons(&[]).is_empty());
        assert!(plugin.handle_toolbar_action("import", &[]).is_none());

        plugin.on_init(&PluginHost {
            capabilities: &SourceCapabilities {
                upload_item: true,
                ..SourceCapabilities::default()
            },
            config: &config,
        });
        assert_eq!(plugin.toolbar_buttons(&[]).len(), 1);
    }
}
