//! src/plugins/generate.rs
//! ============================================================================
//! # Generation Plugin
//!
//! Contributes one toolbar button per configured mode whose selection rule
//! matches the current selection. Pressing a button opens the plugin-form
//! workflow for that mode; on confirm the orchestrator forwards the
//! collected field values to the data-source method the mode names.

use compact_str::format_compact;
use tracing::debug;

use crate::model::item::Item;
use crate::model::workflow::{
    FieldKind, FieldOption, FieldSchema, PluginMode, SelectionRule,
};
use crate::plugins::contract::{GalleryPlugin, PluginCommand, PluginHooks, PluginHost};
use crate::source::data_source::SourceCapabilities;
use crate::view::components::toolbar::ToolbarItem;

pub struct GenerationPlugin {
    modes: Vec<PluginMode>,
    /// Modes whose data-source method the source actually declares; filled
    /// in `on_init`.
    enabled: Vec<bool>,
}

impl GenerationPlugin {
    pub fn new(modes: Vec<PluginMode>) -> Self {
        let enabled = vec![true; modes.len()];
        Self { modes, enabled }
    }

    /// A single "Generate" mode with prompt, count and style fields.
    pub fn with_default_mode() -> Self {
        Self::new(vec![PluginMode {
            name: "generate".into(),
            button_text: "Generate".into(),
            confirm_text: "Start".into(),
            data_source_method: "generate_items".into(),
            selection_rule: SelectionRule::Any,
            fields: vec![
                FieldSchema {
                    name: "prompt".into(),
                    label: "Prompt".into(),
                    kind: FieldKind::Textarea,
                    ..FieldSchema::default()
                },
                FieldSchema {
                    name: "count".into(),
                    label: "Count".into(),
                    kind: FieldKind::Number,
                    default_value: "4".into(),
                    min: Some(1),
                    max: Some(16),
                    ..FieldSchema::default()
                },
                FieldSchema {
                    name: "style".into(),
                    label: "Style".into(),
                    kind: FieldKind::Select,
                    default_value: "photo".into(),
                    options: vec![
                        FieldOption {
                            value: "photo".into(),
                            label: "Photo".into(),
                        },
                        FieldOption {
                            value: "sketch".into(),
                            label: "Sketch".into(),
                        },
                    ],
                    ..FieldSchema::default()
                },
            ],
        }])
    }

    fn action_id(mode: &PluginMode) -> compact_str::CompactString {
        format_compact!("generate:{}", mode.name)
    }

    fn mode_for(&self, action_id: &str) -> Option<(usize, &PluginMode)> {
        self.modes
            .iter()
            .enumerate()
            .find(|(_, m)| Self::action_id(m) == action_id)
    }

    fn check_declared(&mut self, declared: &SourceCapabilities) {
        for (i, mode) in self.modes.iter().enumerate() {
            let ok = declared.supports_method(&mode.data_source_method);
            if !ok {
                debug!(
                    mode = %mode.name,
                    method = %mode.data_source_method,
                    "Generation mode disabled, source does not declare its method"
                );
            }
            self.enabled[i] = ok;
        }
    }
}

impl GalleryPlugin for GenerationPlugin {
    fn name(&self) -> &str {
        "generate"
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks {
            toolbar_buttons: true,
            toolbar_actions: true,
            selection: false,
        }
    }

    fn on_init(&mut self, host: &PluginHost<'_>) {
        self.check_declared(host.capabilities);
    }

    fn toolbar_buttons(&self, selected: &[&Item]) -> Vec<ToolbarItem> {
        self.modes
            .iter()
            .zip(&self.enabled)
            .filter(|&(mode, &enabled)| enabled && mode.selection_rule.matches(selected))
            .map(|(mode, _)| {
                ToolbarItem::button(Self::action_id(mode).as_str(), mode.button_text.clone())
            })
            .collect()
    }

    fn handle_toolbar_action(&mut self, action_id: &str, _selected: &[Item]) -> Option<PluginCommand> {
        let (idx, mode) = self.mode_for(action_id)?;
        if !self.enabled[idx] {
            return None;
        }
        Some(PluginCommand::ShowForm(mode.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::MediaKind;

    fn single_image_mode() -> PluginMode {
        PluginMode {
            name: "upscale".into(),
            button_text: "Upscale".into(),
            data_source_method: "upscale".into(),
            selection_rule: SelectionRule::SingleImage,
            ..PluginMode::default()
        }
    }

    #[test]
    fn buttons_follow_the_selection_rule() {
        let plugin = GenerationPlugin::new(vec![single_image_mode()]);
        let img = Item::new(1, "a.jpg", MediaKind::Image);
        let other = Item::new(2, "b.jpg", MediaKind::Image);

        assert_eq!(plugin.toolbar_buttons(&[&img]).len(), 1);
        // Second selected item breaks the single-image rule.
        assert!(plugin.toolbar_buttons(&[&img, &other]).is_empty());
        assert!(plugin.toolbar_buttons(&[]).is_empty());
    }

    #[test]
    fn handled_action_opens_the_matching_form() {
        let mut plugin = GenerationPlugin::with_default_mode();
        plugin.check_declared(&SourceCapabilities {
            custom_methods: vec!["generate_items".into()],
            ..SourceCapabilities::default()
        });

        let command = plugin.handle_toolbar_action("generate:generate", &[]);
        assert!(matches!(command, Some(PluginCommand::ShowForm(mode)) if mode.name == "generate"));
        assert!(plugin.handle_toolbar_action("unrelated", &[]).is_none());
    }

    #[test]
    fn undeclared_method_disables_the_mode() {
        let mut plugin = GenerationPlugin::with_default_mode();
        plugin.check_declared(&SourceCapabilities::default());
        let img = Item::new(1, "a.jpg", MediaKind::Image);
        assert!(plugin.toolbar_buttons(&[&img]).is_empty());
        assert!(plugin.handle_toolbar_action("generate:generate", &[]).is_none());
    }
}
