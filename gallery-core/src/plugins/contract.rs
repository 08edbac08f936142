//! src/plugins/contract.rs
//! ============================================================================
//! # Plugin Contract
//!
//! Plugins extend the gallery without owning any of its lifecycle. Each
//! plugin declares its hook set up front through [`PluginHooks`]; the host
//! records the declaration once at registration and only ever calls the
//! declared hooks. Plugins never call back into the orchestrator: a handled
//! toolbar action returns a [`PluginCommand`] which the orchestrator
//! executes, keeping the modal lifecycle in one place.

use crate::config::GalleryConfig;
use crate::model::item::Item;
use crate::model::workflow::PluginMode;
use crate::plugins::import::ImportFile;
use crate::source::data_source::SourceCapabilities;
use crate::view::components::toolbar::ToolbarItem;

/// Up-front hook declaration. The host skips undeclared hooks entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginHooks {
    /// Contributes toolbar buttons on every rebuild.
    pub toolbar_buttons: bool,
    /// Handles unmatched toolbar action ids.
    pub toolbar_actions: bool,
    /// Wants selection-change callbacks.
    pub selection: bool,
}

/// What the host should do on behalf of a plugin.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginCommand {
    /// Open the plugin-form workflow for the given mode.
    ShowForm(PluginMode),
    /// Upload the given files sequentially with a progress modal, then
    /// reload the current folder.
    Upload(Vec<ImportFile>),
}

/// Read-only view of the gallery handed to `on_init`.
pub struct PluginHost<'a> {
    pub capabilities: &'a SourceCapabilities,
    pub config: &'a GalleryConfig,
}

pub trait GalleryPlugin: Send {
    fn name(&self) -> &str;

    /// Declared hook set; checked once at registration, never probed again.
    fn hooks(&self) -> PluginHooks;

    /// Called once, synchronously, in registration order.
    fn on_init(&mut self, host: &PluginHost<'_>) {
        let _ = host;
    }

    /// Buttons contributed to the toolbar for the current selection. Pure;
    /// called on every toolbar rebuild.
    fn toolbar_buttons(&self, selected: &[&Item]) -> Vec<ToolbarItem> {
        let _ = selected;
        Vec::new()
    }

    /// Offered unmatched toolbar action ids in registration order; the
    /// first plugin returning a command wins.
    fn handle_toolbar_action(&mut self, action_id: &str, selected: &[Item]) -> Option<PluginCommand> {
        let _ = (action_id, selected);
        None
    }

    fn on_selection_changed(&mut self, selected: &[Item]) {
        let _ = selected;
    }
}
