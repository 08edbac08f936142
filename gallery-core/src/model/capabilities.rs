//! src/model/capabilities.rs
//! ============================================================================
//! # Capabilities
//!
//! A read-only snapshot of what the attached data source supports, computed
//! once at construction and treated as immutable configuration afterwards.
//! The UI never offers an action whose flag is false, and the action
//! dispatcher re-checks the flags as a second line of defence.

use crate::source::data_source::SourceCapabilities;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub rename_item: bool,
    pub delete_item: bool,
    pub move_item: bool,
    pub copy_item: bool,
    pub preview: bool,
    pub create_folder: bool,
    pub rename_folder: bool,
    pub delete_folder: bool,
}

impl Capabilities {
    /// Combine the source's declared operation set with the static
    /// `preview_allowed` flag.
    pub fn derive(declared: SourceCapabilities, preview_allowed: bool) -> Self {
        Self {
            rename_item: declared.rename_item,
            delete_item: declared.delete_item,
            move_item: declared.move_item,
            copy_item: declared.copy_item,
            preview: preview_allowed,
            create_folder: declared.create_folder,
            rename_folder: declared.rename_folder,
            delete_folder: declared.delete_folder,
        }
    }

    /// True when any folder management affordance should exist.
    pub fn any_folder_op(&self) -> bool {
        self.create_folder || self.rename_folder || self.delete_folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_only_source_yields_delete_only_capabilities() {
        let declared = SourceCapabilities {
            delete_item: true,
            ..SourceCapabilities::default()
        };
        let caps = Capabilities::derive(declared, false);
        assert!(caps.delete_item);
        assert!(!caps.rename_item);
        assert!(!caps.move_item);
        assert!(!caps.copy_item);
        assert!(!caps.preview);
        assert!(!caps.any_folder_op());
    }

    #[test]
    fn preview_comes_from_static_flag_not_source() {
        let caps = Capabilities::derive(SourceCapabilities::default(), true);
        assert!(caps.preview);
    }
}
