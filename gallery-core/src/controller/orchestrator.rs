//! src/controller/orchestrator.rs
//! ============================================================================
//! # Gallery: Action and Workflow Orchestrator
//!
//! The core of the widget set. Owns all business state (items, folders,
//! selection, capabilities, the modal workflow slot, generation tracking),
//! dispatches capability-gated actions, routes toolbar presses (built-ins
//! first, then plugins in registration order, first match wins), and drives
//! every modal-mediated workflow in two phases: opening installs a
//! [`Workflow`] record, and the resolving modal event *takes* the record
//! before any derived work begins, so a rapid double press can never
//! re-enter the same resolution path.
//!
//! Mutating flows never update the UI optimistically: on success and on
//! failure alike, state is reconciled by a reload from the data source.
//! Data-source rejections are caught here and surfaced as toasts; they
//! never propagate to the host.

use std::sync::Arc;

use compact_str::{CompactString, ToCompactString, format_compact};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::config::GalleryConfig;
use crate::controller::actions::{ItemAction, PanelAction, ToolbarActionId};
use crate::controller::events::{
    GalleryEvent, GalleryNotification, GridEvent, ModalButton, ModalEvent, NavEvent, TaskStatus,
    ToolbarEvent,
};
use crate::error::GalleryError;
use crate::model::capabilities::Capabilities;
use crate::model::item::{Folder, GridEntry, Id, Item, ItemActionButton};
use crate::model::state::{GalleryState, ToastLevel};
use crate::model::workflow::{
    FormState, PendingAction, PluginMode, ProgressEntry, ProgressStatus, SelectOption, Workflow,
};
use crate::plugins::contract::{GalleryPlugin, PluginCommand, PluginHooks, PluginHost};
use crate::plugins::import::ImportFile;
use crate::source::data_source::{DataSource, SourceCapabilities, SourceContext, UploadRequest};
use crate::view::components::toolbar::ToolbarItem;

/// Construction-time options.
pub struct GalleryOptions {
    pub config: GalleryConfig,
    pub title: CompactString,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            config: GalleryConfig::default(),
            title: CompactString::const_new("Gallery"),
        }
    }
}

struct RegisteredPlugin {
    plugin: Box<dyn GalleryPlugin>,
    hooks: PluginHooks,
}

pub struct Gallery {
    state: GalleryState,
    source: Arc<dyn DataSource>,
    declared: SourceCapabilities,
    config: GalleryConfig,
    plugins: Vec<RegisteredPlugin>,
    events_tx: Option<mpsc::UnboundedSender<GalleryEvent>>,
    base_title: CompactString,
    panel_visible: bool,
    search_filter: CompactString,
}

impl Gallery {
    /// Snapshots the source's declared capabilities once; they are treated
    /// as immutable afterwards. Folder mode without a folder-capable source
    /// is a setup error.
    pub fn new(source: Arc<dyn DataSource>, options: GalleryOptions) -> Result<Self, GalleryError> {
        let declared = source.capabilities();
        if options.config.folders_allowed && !declared.load_folders {
            return Err(GalleryError::setup(
                "folders_allowed requires a data source that declares load_folders",
            ));
        }

        let capabilities = Capabilities::derive(declared.clone(), options.config.preview_allowed);
        let mut state = GalleryState::new(capabilities);
        state.title = options.title.clone();
        let panel_visible = options.config.folders_allowed;

        Ok(Self {
            state,
            source,
            declared,
            config: options.config,
            plugins: Vec::new(),
            events_tx: None,
            base_title: options.title,
            panel_visible,
            search_filter: CompactString::new(""),
        })
    }

    /// Register a plugin. Its hook declaration is recorded once here and
    /// `on_init` runs immediately, in registration order.
    pub fn register_plugin(&mut self, mut plugin: Box<dyn GalleryPlugin>) {
        let hooks = plugin.hooks();
        info!(plugin = plugin.name(), ?hooks, "Registering plugin");
        plugin.on_init(&PluginHost {
            capabilities: &self.declared,
            config: &self.config,
        });
        self.plugins.push(RegisteredPlugin { plugin, hooks });
    }

    /// Subscribe to outbound gallery events. Replaces any prior subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<GalleryEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events_tx = Some(tx);
        rx
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible && self.config.folders_allowed
    }

    /// Initial population: folders (selecting the first when none is
    /// active) followed by the first item load.
    pub async fn init(&mut self) {
        if self.config.folders_allowed {
            self.refresh_folders().await;
            if self.state.current_folder.is_none() {
                if let Some(first) = self.state.folders.first().cloned() {
                    self.set_current_folder(Some(first));
                }
            }
        }
        self.load().await;
    }

    async fn refresh_folders(&mut self) {
        match self.source.load_folders().await {
            Ok(folders) => self.state.folders = folders,
            Err(err) => {
                warn!(%err, "Folder load failed");
                self.toast_error(err.to_string());
            }
        }
        // The active folder may have vanished underneath us.
        if let Some(current) = self.state.current_folder_id() {
            if self.state.find_folder(&current).is_none() {
                let next = self.state.folders.first().cloned();
                self.set_current_folder(next);
            } else if let Some(updated) = self.state.find_folder(&current).cloned() {
                self.set_current_folder(Some(updated));
            }
        }
    }

    fn set_current_folder(&mut self, folder: Option<Folder>) {
        self.state.title = folder
            .as_ref()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| self.base_title.clone());
        self.state.current_folder = folder;
    }

    pub async fn select_folder(&mut self, id: &Id) {
        let Some(folder) = self.state.find_folder(id).cloned() else {
            debug!(%id, "Folder selection for unknown id ignored");
            return;
        };
        self.set_current_folder(Some(folder));
        self.load().await;
    }

    /// Load items for the current folder. A second call while one is in
    /// flight is dropped, not queued. Clears the selection up front; on
    /// failure the prior items stay in place for retry.
    #[instrument(skip(self), fields(folder = ?self.state.current_folder_id()))]
    pub async fn load(&mut self) {
        if self.state.loading {
            debug!("Load dropped, one already in flight");
            return;
        }
        self.state.loading = true;
        self.state.loading_message = CompactString::const_new("Loading…");
        if !self.state.selection.is_empty() {
            self.state.selection.clear();
            self.selection_changed();
        }

        let folder = self.state.current_folder_id();
        let result = self.source.load_items(folder.as_ref()).await;
        self.state.loading = false;

        match result {
            Ok(items) => {
                debug!(count = items.len(), "Items loaded");
                self.state.items = items;
                self.state.load_error = None;
            }
            Err(err) => {
                warn!(%err, "Item load failed, keeping prior items");
                self.state.load_error = Some(err.to_compact_string());
            }
        }
    }

    // ------------------------------------------------------------------
    // Widget event handling
    // ------------------------------------------------------------------

    pub async fn handle_grid_event(&mut self, event: GridEvent) -> Result<(), GalleryError> {
        match event {
            GridEvent::Click { id, multi } => {
                if self.state.find_item(&id).is_none() {
                    debug!(%id, "Click on vanished item ignored");
                    return Ok(());
                }
                self.state.selection.toggle(id, multi);
                self.selection_changed();
                Ok(())
            }
            GridEvent::Open { id } => match self.state.find_item(&id).cloned() {
                Some(item) => self.execute_item_action(ItemAction::Preview, vec![item]),
                None => Ok(()),
            },
            GridEvent::Action { id, action } => match self.state.find_item(&id).cloned() {
                Some(item) => self.execute_item_action(action, vec![item]),
                None => Ok(()),
            },
        }
    }

    pub async fn handle_nav_event(&mut self, event: NavEvent) -> Result<(), GalleryError> {
        match event {
            NavEvent::FolderSelected(id) => {
                self.select_folder(&id).await;
                Ok(())
            }
            NavEvent::Panel(PanelAction::CreateFolder) => {
                if !self.state.capabilities.create_folder {
                    return Ok(());
                }
                self.state.workflow.begin(Workflow::Prompt {
                    title: "New folder".into(),
                    prompt: "Folder name".into(),
                    input: String::new(),
                    action: PendingAction::CreateFolder,
                })
            }
            NavEvent::Panel(PanelAction::RenameFolder) => {
                if !self.state.capabilities.rename_folder {
                    return Ok(());
                }
                let Some(folder) = self.state.current_folder.clone() else {
                    return Ok(());
                };
                self.state.workflow.begin(Workflow::Prompt {
                    title: "Rename folder".into(),
                    prompt: format!("New name for {}", folder.name),
                    input: folder.name.to_string(),
                    action: PendingAction::RenameFolder { folder },
                })
            }
            NavEvent::Panel(PanelAction::DeleteFolder) => {
                if !self.state.capabilities.delete_folder {
                    return Ok(());
                }
                let Some(folder) = self.state.current_folder.clone() else {
                    return Ok(());
                };
                self.state.workflow.begin(Workflow::Confirm {
                    title: "Delete folder".into(),
                    prompt: format!("Delete folder {} and all its items?", folder.name),
                    action: PendingAction::DeleteFolder { folder },
                })
            }
        }
    }

    pub async fn handle_toolbar_event(&mut self, event: ToolbarEvent) -> Result<(), GalleryError> {
        match event {
            ToolbarEvent::SearchSubmitted(query) => {
                self.search_filter = query;
                Ok(())
            }
            ToolbarEvent::Pressed(id) => match id {
                ToolbarActionId::TogglePanel => {
                    self.panel_visible = !self.panel_visible;
                    Ok(())
                }
                ToolbarActionId::Refresh => {
                    self.load().await;
                    Ok(())
                }
                ToolbarActionId::SelectAll => {
                    self.state.selection.select_all(&self.state.items);
                    self.selection_changed();
                    Ok(())
                }
                ToolbarActionId::ClearSelection => {
                    self.state.selection.clear();
                    self.selection_changed();
                    Ok(())
                }
                ToolbarActionId::DeleteSelected => {
                    let items = self.state.selected_items();
                    self.execute_item_action(ItemAction::Delete, items)
                }
                ToolbarActionId::MoveSelected => {
                    let items = self.state.selected_items();
                    self.execute_item_action(ItemAction::Move, items)
                }
                ToolbarActionId::CopySelected => {
                    let items = self.state.selected_items();
                    self.execute_item_action(ItemAction::Copy, items)
                }
                ToolbarActionId::Plugin(action_id) => {
                    self.dispatch_plugin_action(&action_id).await
                }
            },
        }
    }

    /// Offer an unmatched toolbar action id to plugins in registration
    /// order; the first plugin returning a command wins.
    async fn dispatch_plugin_action(&mut self, action_id: &str) -> Result<(), GalleryError> {
        let selected = self.state.selected_items();
        let mut command = None;
        for reg in &mut self.plugins {
            if !reg.hooks.toolbar_actions {
                continue;
            }
            if let Some(cmd) = reg.plugin.handle_toolbar_action(action_id, &selected) {
                debug!(plugin = reg.plugin.name(), action_id, "Plugin handled toolbar action");
                command = Some(cmd);
                break;
            }
        }
        match command {
            Some(cmd) => self.run_plugin_command(cmd).await,
            None => {
                debug!(action_id, "Unhandled toolbar action");
                Ok(())
            }
        }
    }

    async fn run_plugin_command(&mut self, command: PluginCommand) -> Result<(), GalleryError> {
        match command {
            PluginCommand::ShowForm(mode) => self.open_plugin_form(mode),
            PluginCommand::Upload(files) => self.run_upload(files).await,
        }
    }

    fn open_plugin_form(&mut self, mode: PluginMode) -> Result<(), GalleryError> {
        let items = self.state.selected_items();
        let form = FormState::from_schema(mode.fields.clone());
        self.state.workflow.begin(Workflow::PluginForm { mode, form, items })
    }

    async fn run_upload(&mut self, files: Vec<ImportFile>) -> Result<(), GalleryError> {
        let entries = files
            .iter()
            .map(|f| ProgressEntry {
                label: f.file_name.clone(),
                status: ProgressStatus::Queued,
            })
            .collect();
        self.state.workflow.begin(Workflow::Progress {
            title: "Import".into(),
            entries,
        })?;

        for (index, file) in files.iter().enumerate() {
            self.set_progress(index, ProgressStatus::Running);
            let status = match tokio::fs::read(&file.path).await {
                Err(err) => ProgressStatus::Failed(err.to_compact_string()),
                Ok(data) => {
                    let upload = UploadRequest {
                        file_name: file.file_name.clone(),
                        data,
                    };
                    let folder = self.state.current_folder_id();
                    let ctx = self.source_context();
                    match self.source.upload_item(upload, folder.as_ref(), &ctx).await {
                        Ok(()) => ProgressStatus::Done,
                        Err(err) => ProgressStatus::Failed(err.to_compact_string()),
                    }
                }
            };
            self.set_progress(index, status);
        }

        self.load().await;
        Ok(())
    }

    fn set_progress(&mut self, index: usize, status: ProgressStatus) {
        if let Some(Workflow::Progress { entries, .. }) = self.state.workflow.active_mut() {
            if let Some(entry) = entries.get_mut(index) {
                entry.status = status;
            }
        }
    }

    // ------------------------------------------------------------------
    // Item actions and workflows
    // ------------------------------------------------------------------

    /// Dispatch a per-item action. No-op on an empty item list and for any
    /// action whose capability flag is false, even when invoked directly.
    pub fn execute_item_action(
        &mut self,
        action: ItemAction,
        items: Vec<Item>,
    ) -> Result<(), GalleryError> {
        if items.is_empty() {
            return Ok(());
        }
        if !action.allowed(&self.state.capabilities) {
            debug!(?action, "Action suppressed by capabilities");
            return Ok(());
        }

        match action {
            ItemAction::Preview => {
                let item = items[0].clone();
                self.state.workflow.begin(Workflow::Preview { item: item.clone() })?;
                self.emit(GalleryEvent::ItemPreview { item });
                // Preview completes on open; everything else completes when
                // its workflow resolves.
                self.emit(GalleryEvent::ActionComplete { action, items });
            }
            ItemAction::Rename => {
                let item = items[0].clone();
                self.state.workflow.begin(Workflow::Prompt {
                    title: "Rename".into(),
                    prompt: format!("New name for {}", item.name),
                    input: item.name.to_string(),
                    action: PendingAction::RenameItem { item },
                })?;
            }
            ItemAction::Delete => {
                let prompt = if items.len() == 1 {
                    format!("Delete {}?", items[0].name)
                } else {
                    format!("Delete {} items?", items.len())
                };
                self.state.workflow.begin(Workflow::Confirm {
                    title: "Delete".into(),
                    prompt,
                    action: PendingAction::DeleteItems { items: items.clone() },
                })?;
            }
            ItemAction::Move => {
                let current = self.state.current_folder_id();
                let options = self.folder_options(|id| Some(id) != current.as_ref());
                if options.is_empty() {
                    self.state
                        .push_toast("No destination folders available.", ToastLevel::Info);
                    return Ok(());
                }
                self.state.workflow.begin(Workflow::Select {
                    title: "Move".into(),
                    prompt: format!("Move {} item(s) to:", items.len()),
                    options,
                    cursor: 0,
                    action: PendingAction::MoveItems { items: items.clone() },
                })?;
            }
            ItemAction::Copy => {
                let options = self.folder_options(|_| true);
                if options.is_empty() {
                    self.state
                        .push_toast("No destination folders available.", ToastLevel::Info);
                    return Ok(());
                }
                self.state.workflow.begin(Workflow::Select {
                    title: "Copy".into(),
                    prompt: format!("Copy {} item(s) to:", items.len()),
                    options,
                    cursor: 0,
                    action: PendingAction::CopyItems { items: items.clone() },
                })?;
            }
        }

        Ok(())
    }

    fn folder_options(&self, keep: impl Fn(&Id) -> bool) -> Vec<SelectOption> {
        self.state
            .folders
            .iter()
            .filter(|f| keep(&f.id))
            .map(|f| SelectOption {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Modal resolution
    // ------------------------------------------------------------------

    /// Feed a modal event. Editing events mutate the pending workflow in
    /// place; a resolving press or a dismissal takes the workflow record
    /// exactly once before any derived work. Dismissal always resolves as
    /// a cancellation.
    pub async fn handle_modal_event(&mut self, event: ModalEvent) -> Result<(), GalleryError> {
        match event {
            ModalEvent::Insert(ch) => {
                match self.state.workflow.active_mut() {
                    Some(Workflow::Prompt { input, .. }) => input.push(ch),
                    Some(Workflow::PluginForm { form, .. }) => form.insert_char(ch),
                    _ => {}
                }
                Ok(())
            }
            ModalEvent::Backspace => {
                match self.state.workflow.active_mut() {
                    Some(Workflow::Prompt { input, .. }) => {
                        input.pop();
                    }
                    Some(Workflow::PluginForm { form, .. }) => form.backspace(),
                    _ => {}
                }
                Ok(())
            }
            ModalEvent::FocusNext => {
                if let Some(Workflow::PluginForm { form, .. }) = self.state.workflow.active_mut() {
                    form.focus_next();
                }
                Ok(())
            }
            ModalEvent::FocusPrev => {
                if let Some(Workflow::PluginForm { form, .. }) = self.state.workflow.active_mut() {
                    form.focus_prev();
                }
                Ok(())
            }
            ModalEvent::CursorUp => {
                match self.state.workflow.active_mut() {
                    Some(Workflow::Select { cursor, .. }) => *cursor = cursor.saturating_sub(1),
                    Some(Workflow::PluginForm { form, .. }) => form.cycle_option(-1),
                    _ => {}
                }
                Ok(())
            }
            ModalEvent::CursorDown => {
                match self.state.workflow.active_mut() {
                    Some(Workflow::Select { cursor, options, .. }) => {
                        *cursor = (*cursor + 1).min(options.len().saturating_sub(1));
                    }
                    Some(Workflow::PluginForm { form, .. }) => form.cycle_option(1),
                    _ => {}
                }
                Ok(())
            }
            ModalEvent::Dismiss | ModalEvent::Button(ModalButton::Cancel) => {
                if let Some(workflow) = self.state.workflow.take() {
                    debug!(kind = ?workflow.kind(), "Workflow cancelled");
                }
                Ok(())
            }
            ModalEvent::Button(ModalButton::Confirm) => {
                let Some(workflow) = self.state.workflow.take() else {
                    return Ok(());
                };
                match workflow {
                    Workflow::Confirm { action, .. } => {
                        self.resolve_and_complete(action, None, None).await
                    }
                    Workflow::Prompt { input, action, .. } => {
                        self.resolve_and_complete(action, Some(input), None).await
                    }
                    Workflow::Select {
                        options,
                        cursor,
                        action,
                        ..
                    } => {
                        let dest = options.get(cursor).map(|o| o.id.clone());
                        self.resolve_and_complete(action, None, dest).await
                    }
                    Workflow::PluginForm { mode, form, items } => {
                        self.submit_plugin_form(mode, form, items).await
                    }
                    // Footerless workflows close only through dismissal; a
                    // stray confirm counts as one.
                    Workflow::Preview { .. } | Workflow::Progress { .. } => {}
                }
                Ok(())
            }
        }
    }

    /// Run a resolved action, then report completion to the host. The
    /// original completion notice fires only after the data-source call
    /// and the reconciling reload, and only for per-item actions.
    async fn resolve_and_complete(
        &mut self,
        action: PendingAction,
        text: Option<String>,
        dest: Option<Id>,
    ) {
        let completion = Self::completion_of(&action);
        if self.resolve(action, text, dest).await {
            if let Some((action, items)) = completion {
                self.emit(GalleryEvent::ActionComplete { action, items });
            }
        }
    }

    fn completion_of(action: &PendingAction) -> Option<(ItemAction, Vec<Item>)> {
        match action {
            PendingAction::RenameItem { item } => Some((ItemAction::Rename, vec![item.clone()])),
            PendingAction::DeleteItems { items } => Some((ItemAction::Delete, items.clone())),
            PendingAction::MoveItems { items } => Some((ItemAction::Move, items.clone())),
            PendingAction::CopyItems { items } => Some((ItemAction::Copy, items.clone())),
            PendingAction::CreateFolder
            | PendingAction::RenameFolder { .. }
            | PendingAction::DeleteFolder { .. } => None,
        }
    }

    /// Execute a resolved pending action against the data source.
    /// Rejections become error toasts; every mutating path reconciles by
    /// reloading rather than patching state optimistically. Returns `false`
    /// when the action degraded to a cancellation (blank input, no
    /// destination) and never reached the source.
    async fn resolve(&mut self, action: PendingAction, text: Option<String>, dest: Option<Id>) -> bool {
        let ctx = self.source_context();
        match action {
            PendingAction::RenameItem { item } => {
                let Some(name) = Self::cleaned(text) else {
                    return false;
                };
                if let Err(err) = self.source.rename_item(&item.id, &name, &ctx).await {
                    self.toast_error(err.to_string());
                }
                self.load().await;
            }
            PendingAction::DeleteItems { items } => {
                let ids: Vec<Id> = items.iter().map(|i| i.id.clone()).collect();
                if let Err(err) = self.source.delete_items(&ids, &ctx).await {
                    self.toast_error(err.to_string());
                }
                self.load().await;
            }
            PendingAction::MoveItems { items } => {
                let Some(dest) = dest else { return false };
                let ids: Vec<Id> = items.iter().map(|i| i.id.clone()).collect();
                if let Err(err) = self.source.move_items(&ids, &dest, &ctx).await {
                    self.toast_error(err.to_string());
                }
                self.load().await;
            }
            PendingAction::CopyItems { items } => {
                let Some(dest) = dest else { return false };
                let ids: Vec<Id> = items.iter().map(|i| i.id.clone()).collect();
                match self.source.copy_items(&ids, &dest, &ctx).await {
                    Ok(()) => {
                        // Copies into another folder are invisible here, so
                        // only a same-folder copy needs the reload.
                        if self.state.current_folder.is_none()
                            || self.state.current_folder_id() == Some(dest)
                        {
                            self.load().await;
                        }
                    }
                    Err(err) => {
                        self.toast_error(err.to_string());
                        self.load().await;
                    }
                }
            }
            PendingAction::CreateFolder => {
                let Some(name) = Self::cleaned(text) else {
                    return false;
                };
                if let Err(err) = self.source.create_folder(&name).await {
                    self.toast_error(err.to_string());
                    return true;
                }
                self.refresh_folders().await;
                let created = self
                    .state
                    .folders
                    .iter()
                    .rev()
                    .find(|f| f.name == name.as_str())
                    .map(|f| f.id.clone());
                if let Some(id) = created {
                    self.select_folder(&id).await;
                }
            }
            PendingAction::RenameFolder { folder } => {
                let Some(name) = Self::cleaned(text) else {
                    return false;
                };
                if let Err(err) = self.source.rename_folder(&folder.id, &name, &ctx).await {
                    self.toast_error(err.to_string());
                }
                self.refresh_folders().await;
                // Re-select to refresh the title.
                if self.state.current_folder_id().as_ref() == Some(&folder.id) {
                    self.select_folder(&folder.id).await;
                }
            }
            PendingAction::DeleteFolder { folder } => {
                if let Err(err) = self.source.delete_folder(&folder.id, &ctx).await {
                    self.toast_error(err.to_string());
                }
                let was_current = self.state.current_folder_id().as_ref() == Some(&folder.id);
                self.refresh_folders().await;
                if was_current {
                    // refresh_folders already fell back to the first
                    // remaining folder (or none); load whatever is active.
                    self.load().await;
                }
            }
        }
        true
    }

    async fn submit_plugin_form(&mut self, mode: PluginMode, form: FormState, items: Vec<Item>) {
        if !self.declared.supports_method(&mode.data_source_method) {
            self.toast_error(format_compact!(
                "Source does not support '{}'.",
                mode.data_source_method
            ));
            return;
        }
        let values = form.values();
        let ctx = self.source_context();
        info!(mode = %mode.name, method = %mode.data_source_method, "Submitting plugin form");
        if let Err(err) = self
            .source
            .invoke(&mode.data_source_method, &items, &values, &ctx)
            .await
        {
            self.toast_error(err.to_string());
        }
        self.load().await;
    }

    fn cleaned(text: Option<String>) -> Option<String> {
        let text = text?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    // ------------------------------------------------------------------
    // Inbound notifications
    // ------------------------------------------------------------------

    pub async fn notify(&mut self, notification: GalleryNotification) {
        match notification {
            GalleryNotification::TaskStart {
                generation_id,
                total_items,
                target_folder_id,
            } => {
                self.state
                    .generations
                    .start(generation_id, total_items, target_folder_id);
            }
            GalleryNotification::TaskProgress {
                generation_id,
                item,
            } => {
                if !self.state.generations.progress(&generation_id, item.id.clone()) {
                    return;
                }
                let visible = self.state.current_folder.is_none()
                    || item.folder_id == self.state.current_folder_id();
                if visible {
                    // Freshly generated items surface at the top.
                    self.state.items.insert(0, item);
                }
            }
            GalleryNotification::TaskEnd { generation_id }
            | GalleryNotification::TaskError { generation_id } => {
                self.state.generations.end(&generation_id);
                self.load().await;
            }
            GalleryNotification::TaskUpdate { id, status, .. } => {
                if status == TaskStatus::Complete {
                    self.load().await;
                } else {
                    debug!(%id, ?status, "Task update");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Render feeds
    // ------------------------------------------------------------------

    /// Rebuild the toolbar item list for the current selection: built-ins
    /// in fixed order, then plugin-contributed buttons.
    pub fn toolbar_items(&self) -> Vec<ToolbarItem> {
        let caps = &self.state.capabilities;
        let selected = self.state.selection.selected_items(&self.state.items);
        let has_selection = !selected.is_empty();

        let mut items = Vec::new();
        if self.config.folders_allowed {
            items.push(ToolbarItem::button(ToolbarActionId::TogglePanel, "Folders"));
        }
        items.push(ToolbarItem::button(ToolbarActionId::Refresh, "Refresh"));
        items.push(ToolbarItem::Separator);
        items.push(ToolbarItem::button(ToolbarActionId::SelectAll, "Select all"));
        if has_selection {
            items.push(ToolbarItem::button(ToolbarActionId::ClearSelection, "Clear"));
            if caps.delete_item {
                items.push(ToolbarItem::button(ToolbarActionId::DeleteSelected, "Delete"));
            }
            if caps.move_item && self.config.folders_allowed {
                items.push(ToolbarItem::button(ToolbarActionId::MoveSelected, "Move"));
            }
            if caps.copy_item && self.config.folders_allowed {
                items.push(ToolbarItem::button(ToolbarActionId::CopySelected, "Copy"));
            }
        }
        items.push(ToolbarItem::Spacer);
        items.push(ToolbarItem::Search);

        for reg in &self.plugins {
            if reg.hooks.toolbar_buttons {
                items.extend(reg.plugin.toolbar_buttons(&selected));
            }
        }
        items
    }

    /// Render-only card list for the grid, honoring the search filter.
    pub fn grid_entries(&self) -> Vec<GridEntry> {
        let filter = self.search_filter.to_lowercase();
        self.state
            .items
            .iter()
            .filter(|item| filter.is_empty() || item.name.to_lowercase().contains(filter.as_str()))
            .map(|item| GridEntry {
                item: item.clone(),
                is_selected: self.state.selection.contains(&item.id),
                actions: self.item_actions(),
            })
            .collect()
    }

    fn item_actions(&self) -> Vec<ItemActionButton> {
        let caps = &self.state.capabilities;
        let mut actions = Vec::new();
        for action in [
            ItemAction::Preview,
            ItemAction::Rename,
            ItemAction::Delete,
            ItemAction::Move,
            ItemAction::Copy,
        ] {
            if !action.allowed(caps) {
                continue;
            }
            if matches!(action, ItemAction::Move | ItemAction::Copy)
                && !self.config.folders_allowed
            {
                continue;
            }
            actions.push(ItemActionButton {
                action,
                label: action.label(),
                icon: action.icon(),
            });
        }
        actions
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn source_context(&self) -> SourceContext {
        SourceContext {
            current_folder: self.state.current_folder.clone(),
        }
    }

    fn selection_changed(&mut self) {
        let selected = self.state.selected_items();
        for reg in &mut self.plugins {
            if reg.hooks.selection {
                reg.plugin.on_selection_changed(&selected);
            }
        }
        self.emit(GalleryEvent::SelectionChanged { selected });
    }

    fn emit(&self, event: GalleryEvent) {
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(event);
        }
    }

    fn toast_error(&mut self, message: impl Into<CompactString>) {
        self.state.push_toast(message, ToastLevel::Error);
    }

    pub fn toast_info(&mut self, message: impl Into<CompactString>) {
        self.state.push_toast(message, ToastLevel::Info);
    }

    /// Drop expired toasts. Returns `true` when anything expired.
    pub fn expire_toasts(&mut self, ttl: std::time::Duration) -> bool {
        self.state.expire_toasts(ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Map, Value};

    use crate::model::item::MediaKind;
    use crate::model::workflow::{SelectionRule, WorkflowKind};
    use crate::plugins::generate::GenerationPlugin;
    use crate::source::data_source::SourceError;
    use crate::source::memory::MemoryDataSource;

    fn folder_options() -> GalleryOptions {
        GalleryOptions {
            config: GalleryConfig {
                folders_allowed: true,
                ..GalleryConfig::default()
            },
            ..GalleryOptions::default()
        }
    }

    async fn seeded_gallery() -> (Arc<MemoryDataSource>, Gallery) {
        let source = Arc::new(MemoryDataSource::seeded());
        let mut gallery = Gallery::new(source.clone(), folder_options()).unwrap();
        gallery.init().await;
        (source, gallery)
    }

    fn confirm() -> ModalEvent {
        ModalEvent::Button(ModalButton::Confirm)
    }

    #[tokio::test]
    async fn init_selects_the_first_folder() {
        let (_, gallery) = seeded_gallery().await;
        assert_eq!(gallery.state().current_folder_id(), Some(Id::from(100)));
        assert_eq!(gallery.state().items.len(), 2);
        assert_eq!(gallery.state().title, "Nature");
    }

    #[tokio::test]
    async fn folder_mode_without_folder_source_fails_setup() {
        struct Flat;
        #[async_trait]
        impl DataSource for Flat {
            fn capabilities(&self) -> SourceCapabilities {
                SourceCapabilities::default()
            }
            async fn load_items(&self, _: Option<&Id>) -> Result<Vec<Item>, SourceError> {
                Ok(Vec::new())
            }
        }

        let err = Gallery::new(Arc::new(Flat), folder_options()).err().unwrap();
        assert!(matches!(err, GalleryError::Setup(_)));
    }

    #[tokio::test]
    async fn disabled_action_is_a_noop_even_when_invoked_directly() {
        struct DeleteOnly;
        #[async_trait]
        impl DataSource for DeleteOnly {
            fn capabilities(&self) -> SourceCapabilities {
                SourceCapabilities {
                    delete_item: true,
                    ..SourceCapabilities::default()
                }
            }
            async fn load_items(&self, _: Option<&Id>) -> Result<Vec<Item>, SourceError> {
                Ok(vec![Item::new(1, "a.jpg", MediaKind::Image)])
            }
        }

        let mut gallery = Gallery::new(
            Arc::new(DeleteOnly),
            GalleryOptions {
                config: GalleryConfig {
                    preview_allowed: false,
                    ..GalleryConfig::default()
                },
                ..GalleryOptions::default()
            },
        )
        .unwrap();
        gallery.init().await;

        let caps = gallery.state().capabilities;
        assert!(caps.delete_item);
        assert!(!caps.rename_item && !caps.move_item && !caps.copy_item && !caps.preview);

        let item = gallery.state().items[0].clone();
        gallery
            .execute_item_action(ItemAction::Rename, vec![item.clone()])
            .unwrap();
        assert!(!gallery.state().workflow.is_active());

        gallery.execute_item_action(ItemAction::Delete, vec![item]).unwrap();
        assert_eq!(
            gallery.state().workflow.active().map(Workflow::kind),
            Some(WorkflowKind::Confirm)
        );
    }

    #[tokio::test]
    async fn deleting_the_active_folder_activates_the_first_remaining() {
        let (_, mut gallery) = seeded_gallery().await;
        gallery.select_folder(&Id::from(101)).await;
        assert_eq!(gallery.state().title, "Cities");

        gallery
            .handle_nav_event(NavEvent::Panel(PanelAction::DeleteFolder))
            .await
            .unwrap();
        gallery.handle_modal_event(confirm()).await.unwrap();

        assert_eq!(gallery.state().current_folder_id(), Some(Id::from(100)));
        assert_eq!(gallery.state().title, "Nature");
        assert_eq!(gallery.state().items.len(), 2);
    }

    #[tokio::test]
    async fn move_relocates_the_item_between_folder_loads() {
        let (_, mut gallery) = seeded_gallery().await;
        let item = gallery.state().find_item(&Id::from(1)).cloned().unwrap();

        gallery.execute_item_action(ItemAction::Move, vec![item]).unwrap();
        // Destination list excludes the current folder, so the first
        // option is Cities (101).
        let Some(Workflow::Select { options, .. }) = gallery.state().workflow.active() else {
            panic!("expected select workflow");
        };
        assert_eq!(options[0].id, Id::from(101));
        gallery.handle_modal_event(confirm()).await.unwrap();

        assert!(gallery.state().find_item(&Id::from(1)).is_none());
        gallery.select_folder(&Id::from(101)).await;
        let moved = gallery.state().find_item(&Id::from(1)).unwrap();
        assert_eq!(moved.folder_id, Some(Id::from(101)));
    }

    #[tokio::test]
    async fn copy_into_own_folder_adds_a_named_copy() {
        let (_, mut gallery) = seeded_gallery().await;
        let item = gallery.state().find_item(&Id::from(1)).cloned().unwrap();

        gallery.execute_item_action(ItemAction::Copy, vec![item]).unwrap();
        // Copy offers every folder including the current one (option 0).
        gallery.handle_modal_event(confirm()).await.unwrap();

        assert_eq!(gallery.state().items.len(), 3);
        let copy = gallery
            .state()
            .items
            .iter()
            .find(|i| i.name == "Copy of Mountain.jpg")
            .unwrap();
        assert_ne!(copy.id, Id::from(1));
        assert!(gallery.state().find_item(&Id::from(1)).is_some());
    }

    #[tokio::test]
    async fn rejected_delete_reconciles_to_a_fresh_reload() {
        let (source, mut gallery) = seeded_gallery().await;
        source.fail_next("delete_items", "Cannot delete right now.");

        let item = gallery.state().find_item(&Id::from(1)).cloned().unwrap();
        gallery.execute_item_action(ItemAction::Delete, vec![item]).unwrap();
        gallery.handle_modal_event(confirm()).await.unwrap();

        assert!(gallery
            .state()
            .toasts
            .iter()
            .any(|t| t.level == ToastLevel::Error));
        let shown: Vec<Id> = gallery.state().items.iter().map(|i| i.id.clone()).collect();
        let fresh = source.load_items(Some(&Id::from(100))).await.unwrap();
        let fresh_ids: Vec<Id> = fresh.iter().map(|i| i.id.clone()).collect();
        assert_eq!(shown, fresh_ids);
    }

    #[tokio::test]
    async fn duplicate_load_is_dropped_and_failed_load_keeps_items() {
        let (source, mut gallery) = seeded_gallery().await;
        assert_eq!(gallery.state().items.len(), 2);

        // Simulate an in-flight load; the armed failure must survive the
        // dropped call untouched.
        gallery.state.loading = true;
        source.fail_next("load_items", "backend down");
        gallery.load().await;
        assert!(gallery.state().load_error.is_none());

        gallery.state.loading = false;
        gallery.load().await;
        assert!(gallery.state().load_error.is_some());
        assert_eq!(gallery.state().items.len(), 2);

        gallery.load().await;
        assert!(gallery.state().load_error.is_none());
    }

    #[tokio::test]
    async fn second_workflow_is_rejected_while_one_is_active() {
        let (_, mut gallery) = seeded_gallery().await;
        let item = gallery.state().items[0].clone();

        gallery
            .execute_item_action(ItemAction::Preview, vec![item.clone()])
            .unwrap();
        let err = gallery
            .execute_item_action(ItemAction::Rename, vec![item])
            .unwrap_err();
        assert!(matches!(err, GalleryError::WorkflowActive { .. }));
    }

    #[tokio::test]
    async fn dismissal_cancels_without_side_effects() {
        let (_, mut gallery) = seeded_gallery().await;
        let item = gallery.state().items[0].clone();

        gallery.execute_item_action(ItemAction::Delete, vec![item.clone()]).unwrap();
        gallery.handle_modal_event(ModalEvent::Dismiss).await.unwrap();

        assert!(!gallery.state().workflow.is_active());
        assert_eq!(gallery.state().items.len(), 2);

        // The slot is free again.
        gallery.execute_item_action(ItemAction::Delete, vec![item]).unwrap();
        assert!(gallery.state().workflow.is_active());
    }

    #[tokio::test]
    async fn action_complete_waits_for_confirmed_resolution() {
        let (_, mut gallery) = seeded_gallery().await;
        let mut events = gallery.subscribe();
        let item = gallery.state().items[0].clone();

        // Opening the confirm modal completes nothing yet.
        gallery.execute_item_action(ItemAction::Delete, vec![item.clone()]).unwrap();
        assert!(events.try_recv().is_err());

        // Neither does cancelling it.
        gallery.handle_modal_event(ModalEvent::Dismiss).await.unwrap();
        assert!(events.try_recv().is_err());
        assert_eq!(gallery.state().items.len(), 2);

        gallery.execute_item_action(ItemAction::Delete, vec![item]).unwrap();
        gallery.handle_modal_event(confirm()).await.unwrap();
        let Ok(GalleryEvent::ActionComplete { action, items }) = events.try_recv() else {
            panic!("expected completion after the confirmed delete");
        };
        assert_eq!(action, ItemAction::Delete);
        assert_eq!(items.len(), 1);
        assert_eq!(gallery.state().items.len(), 1);
    }

    #[tokio::test]
    async fn selection_toggle_drives_events_and_toolbar() {
        let (_, mut gallery) = seeded_gallery().await;
        let mut events = gallery.subscribe();

        gallery
            .handle_grid_event(GridEvent::Click {
                id: Id::from(1),
                multi: false,
            })
            .await
            .unwrap();
        let Some(GalleryEvent::SelectionChanged { selected }) = events.recv().await else {
            panic!("expected selection event");
        };
        assert_eq!(selected.len(), 1);

        let labels: Vec<String> = gallery
            .toolbar_items()
            .iter()
            .filter_map(|i| match i {
                ToolbarItem::Button { label, .. } => Some(label.to_string()),
                _ => None,
            })
            .collect();
        assert!(labels.contains(&"Delete".to_string()));
        assert!(labels.contains(&"Clear".to_string()));

        // Plain click on the sole selected item deselects it.
        gallery
            .handle_grid_event(GridEvent::Click {
                id: Id::from(1),
                multi: false,
            })
            .await
            .unwrap();
        assert!(gallery.state().selection.is_empty());
        let labels: Vec<String> = gallery
            .toolbar_items()
            .iter()
            .filter_map(|i| match i {
                ToolbarItem::Button { label, .. } => Some(label.to_string()),
                _ => None,
            })
            .collect();
        assert!(!labels.contains(&"Delete".to_string()));
    }

    #[tokio::test]
    async fn single_selection_plugin_button_disappears_on_second_select() {
        let (_, mut gallery) = seeded_gallery().await;
        let plugin = GenerationPlugin::new(vec![PluginMode {
            name: "enhance".into(),
            button_text: "Enhance".into(),
            data_source_method: "generate_items".into(),
            selection_rule: SelectionRule::Single,
            ..PluginMode::default()
        }]);
        gallery.register_plugin(Box::new(plugin));

        let has_button = |g: &Gallery| {
            g.toolbar_items().iter().any(|i| {
                matches!(i, ToolbarItem::Button { label, .. } if label == "Enhance")
            })
        };

        assert!(!has_button(&gallery));
        gallery
            .handle_grid_event(GridEvent::Click {
                id: Id::from(1),
                multi: true,
            })
            .await
            .unwrap();
        assert!(has_button(&gallery));
        gallery
            .handle_grid_event(GridEvent::Click {
                id: Id::from(2),
                multi: true,
            })
            .await
            .unwrap();
        assert!(!has_button(&gallery));
    }

    #[tokio::test]
    async fn plugin_form_submission_invokes_the_named_method() {
        let (_, mut gallery) = seeded_gallery().await;
        gallery.register_plugin(Box::new(GenerationPlugin::with_default_mode()));

        gallery
            .handle_toolbar_event(ToolbarEvent::Pressed(ToolbarActionId::Plugin(
                "generate:generate".into(),
            )))
            .await
            .unwrap();
        assert_eq!(
            gallery.state().workflow.active().map(Workflow::kind),
            Some(WorkflowKind::PluginForm)
        );

        gallery.handle_modal_event(confirm()).await.unwrap();
        assert!(!gallery.state().workflow.is_active());
        // Default count is 4; the reload after invoke surfaces the batch.
        assert_eq!(gallery.state().items.len(), 6);
    }

    #[tokio::test]
    async fn first_matching_plugin_wins_toolbar_dispatch() {
        struct Claimer {
            id: &'static str,
            called: Arc<std::sync::atomic::AtomicBool>,
        }
        impl GalleryPlugin for Claimer {
            fn name(&self) -> &str {
                self.id
            }
            fn hooks(&self) -> PluginHooks {
                PluginHooks {
                    toolbar_actions: true,
                    ..PluginHooks::default()
                }
            }
            fn handle_toolbar_action(&mut self, action_id: &str, _: &[Item]) -> Option<PluginCommand> {
                self.called.store(true, std::sync::atomic::Ordering::SeqCst);
                (action_id == "shared").then(|| {
                    PluginCommand::ShowForm(PluginMode {
                        name: self.id.into(),
                        data_source_method: "generate_items".into(),
                        ..PluginMode::default()
                    })
                })
            }
        }

        let (_, mut gallery) = seeded_gallery().await;
        let first = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let second = Arc::new(std::sync::atomic::AtomicBool::new(false));
        gallery.register_plugin(Box::new(Claimer {
            id: "first",
            called: first.clone(),
        }));
        gallery.register_plugin(Box::new(Claimer {
            id: "second",
            called: second.clone(),
        }));

        gallery
            .handle_toolbar_event(ToolbarEvent::Pressed(ToolbarActionId::Plugin("shared".into())))
            .await
            .unwrap();

        assert!(first.load(std::sync::atomic::Ordering::SeqCst));
        assert!(!second.load(std::sync::atomic::Ordering::SeqCst));
        let Some(Workflow::PluginForm { mode, .. }) = gallery.state().workflow.active() else {
            panic!("expected plugin form");
        };
        assert_eq!(mode.name, "first");
    }

    #[tokio::test]
    async fn generation_notifications_surface_items_then_reconcile() {
        let (source, mut gallery) = seeded_gallery().await;
        source
            .invoke(
                "generate_items",
                &[],
                &{
                    let mut m = Map::new();
                    m.insert("count".into(), Value::from(2));
                    m.insert("prompt".into(), Value::from("Sunset"));
                    m
                },
                &SourceContext {
                    current_folder: gallery.state().current_folder.clone(),
                },
            )
            .await
            .unwrap();

        gallery
            .notify(GalleryNotification::TaskStart {
                generation_id: "gen-1".into(),
                total_items: 2,
                target_folder_id: Some(Id::from(100)),
            })
            .await;
        gallery
            .notify(GalleryNotification::TaskProgress {
                generation_id: "gen-1".into(),
                item: Item::new(5, "Sunset #1", MediaKind::Image).with_folder(100),
            })
            .await;
        assert_eq!(gallery.state().items[0].name, "Sunset #1");
        assert_eq!(gallery.state().generations.active_count(), 1);

        gallery
            .notify(GalleryNotification::TaskEnd {
                generation_id: "gen-1".into(),
            })
            .await;
        assert_eq!(gallery.state().generations.active_count(), 0);
        // Reconciled from the source: 2 seeded + 2 generated.
        assert_eq!(gallery.state().items.len(), 4);
    }

    #[tokio::test]
    async fn create_folder_selects_the_new_folder() {
        let (_, mut gallery) = seeded_gallery().await;
        gallery
            .handle_nav_event(NavEvent::Panel(PanelAction::CreateFolder))
            .await
            .unwrap();
        for ch in "Trips".chars() {
            gallery.handle_modal_event(ModalEvent::Insert(ch)).await.unwrap();
        }
        gallery.handle_modal_event(confirm()).await.unwrap();

        assert_eq!(gallery.state().title, "Trips");
        assert!(gallery.state().items.is_empty());
    }

    #[tokio::test]
    async fn search_filter_narrows_grid_entries() {
        let (_, mut gallery) = seeded_gallery().await;
        gallery
            .handle_toolbar_event(ToolbarEvent::SearchSubmitted("ocean".into()))
            .await
            .unwrap();
        let entries = gallery.grid_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item.name, "Ocean.png");

        // Matching is case-insensitive on both sides.
        gallery
            .handle_toolbar_event(ToolbarEvent::SearchSubmitted("OCEAN".into()))
            .await
            .unwrap();
        assert_eq!(gallery.grid_entries().len(), 1);
    }

    #[tokio::test]
    async fn upload_command_runs_sequentially_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("new.png"), b"png").unwrap();

        let (_, mut gallery) = seeded_gallery().await;
        let files = vec![ImportFile {
            id: uuid::Uuid::new_v4(),
            file_name: "new.png".into(),
            path: dir.path().join("new.png"),
        }];
        gallery
            .run_plugin_command(PluginCommand::Upload(files))
            .await
            .unwrap();

        let Some(Workflow::Progress { entries, .. }) = gallery.state().workflow.active() else {
            panic!("expected progress workflow");
        };
        assert_eq!(entries[0].status, ProgressStatus::Done);
        assert!(gallery.state().items.iter().any(|i| i.name == "new.png"));
    }
}
