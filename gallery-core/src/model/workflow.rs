//! src/model/workflow.rs
//! ============================================================================
//! # Modal Workflow State Machine
//!
//! The gallery mediates every user decision through one shared modal
//! surface. The in-flight workflow is an explicit tagged union held in a
//! [`WorkflowSlot`]; at most one workflow may be active, and starting a
//! second one is rejected with [`GalleryError::WorkflowActive`] instead of
//! silently racing. The slot is *taken* exactly once: at the moment its
//! resolving button press is processed, or when the modal is dismissed
//! without a resolution (which always counts as a cancellation, never a
//! hang).

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GalleryError;
use crate::model::item::{Folder, Id, Item};

/// Discriminant for error reporting and guard checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Confirm,
    Prompt,
    Select,
    PluginForm,
    Preview,
    Progress,
}

/// What a resolved confirm/prompt/select workflow should go on to do.
#[derive(Debug, Clone)]
pub enum PendingAction {
    RenameItem { item: Item },
    DeleteItems { items: Vec<Item> },
    MoveItems { items: Vec<Item> },
    CopyItems { items: Vec<Item> },
    CreateFolder,
    RenameFolder { folder: Folder },
    DeleteFolder { folder: Folder },
}

/// One choice in a select workflow (a destination folder).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub id: Id,
    pub name: CompactString,
}

/// When a plugin mode's toolbar button should be offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionRule {
    #[default]
    Any,
    None,
    Single,
    Multiple,
    SingleImage,
    SingleVideo,
}

impl SelectionRule {
    pub fn matches(self, selected: &[&Item]) -> bool {
        use crate::model::item::MediaKind;
        match self {
            Self::Any => true,
            Self::None => selected.is_empty(),
            Self::Single => selected.len() == 1,
            Self::Multiple => selected.len() > 1,
            Self::SingleImage => selected.len() == 1 && selected[0].kind == MediaKind::Image,
            Self::SingleVideo => selected.len() == 1 && selected[0].kind == MediaKind::Video,
        }
    }
}

/// Input surface of one plugin-form field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Textarea,
    Select,
    Hidden,
}

/// One option of a select-kind field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: CompactString,
    pub label: CompactString,
}

/// Plugin-supplied schema for one form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: CompactString,
    pub label: CompactString,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub default_value: CompactString,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

/// A plugin-declared modal workflow: button text, confirm text, the
/// data-source method invoked on confirm, and the field schema the
/// orchestrator builds the form from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginMode {
    pub name: CompactString,
    pub button_text: CompactString,
    #[serde(default)]
    pub confirm_text: CompactString,
    pub data_source_method: CompactString,
    #[serde(default)]
    pub selection_rule: SelectionRule,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// Live editing state of one form field.
#[derive(Debug, Clone)]
pub struct FieldState {
    pub schema: FieldSchema,
    pub value: String,
    pub option_index: usize,
}

impl FieldState {
    fn new(schema: FieldSchema) -> Self {
        let value = schema.default_value.to_string();
        let option_index = match schema.kind {
            FieldKind::Select => schema
                .options
                .iter()
                .position(|o| o.value == schema.default_value)
                .unwrap_or(0),
            _ => 0,
        };
        Self {
            schema,
            value,
            option_index,
        }
    }

    fn current_value(&self) -> Value {
        match self.schema.kind {
            FieldKind::Number => {
                let parsed = self.value.trim().parse::<i64>().ok();
                match parsed {
                    Some(mut n) => {
                        if let Some(min) = self.schema.min {
                            n = n.max(min);
                        }
                        if let Some(max) = self.schema.max {
                            n = n.min(max);
                        }
                        Value::from(n)
                    }
                    None => Value::Null,
                }
            }
            FieldKind::Select => self
                .schema
                .options
                .get(self.option_index)
                .map(|o| Value::from(o.value.as_str()))
                .unwrap_or(Value::Null),
            _ => Value::from(self.value.as_str()),
        }
    }
}

/// Live editing state of a plugin form: field values plus a focus cursor
/// that skips hidden fields.
#[derive(Debug, Clone)]
pub struct FormState {
    pub fields: Vec<FieldState>,
    pub focus: usize,
}

impl FormState {
    pub fn from_schema(fields: Vec<FieldSchema>) -> Self {
        let fields: Vec<FieldState> = fields.into_iter().map(FieldState::new).collect();
        let focus = fields
            .iter()
            .position(|f| f.schema.kind != FieldKind::Hidden)
            .unwrap_or(0);
        Self { fields, focus }
    }

    pub fn focused(&self) -> Option<&FieldState> {
        self.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        self.shift_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, dir: isize) {
        let len = self.fields.len();
        if len == 0 {
            return;
        }
        let mut idx = self.focus;
        for _ in 0..len {
            idx = (idx as isize + dir).rem_euclid(len as isize) as usize;
            if self.fields[idx].schema.kind != FieldKind::Hidden {
                self.focus = idx;
                return;
            }
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            match field.schema.kind {
                FieldKind::Select | FieldKind::Hidden => {}
                FieldKind::Number => {
                    if ch.is_ascii_digit() || (ch == '-' && field.value.is_empty()) {
                        field.value.push(ch);
                    }
                }
                _ => field.value.push(ch),
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    /// Cycle the options of the focused select field.
    pub fn cycle_option(&mut self, dir: isize) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.schema.kind == FieldKind::Select && !field.schema.options.is_empty() {
                let len = field.schema.options.len() as isize;
                field.option_index =
                    ((field.option_index as isize + dir).rem_euclid(len)) as usize;
            }
        }
    }

    /// Collect all field values keyed by field name. Number fields are
    /// parsed as integers (clamped to min/max); hidden fields contribute
    /// their default value.
    pub fn values(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for field in &self.fields {
            map.insert(field.schema.name.to_string(), field.current_value());
        }
        map
    }
}

/// A row in a progress workflow (bulk import).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressStatus {
    Queued,
    Running,
    Done,
    Failed(CompactString),
}

#[derive(Debug, Clone)]
pub struct ProgressEntry {
    pub label: CompactString,
    pub status: ProgressStatus,
}

/// The tagged union of every modal-mediated workflow.
#[derive(Debug, Clone)]
pub enum Workflow {
    Confirm {
        title: String,
        prompt: String,
        action: PendingAction,
    },
    Prompt {
        title: String,
        prompt: String,
        input: String,
        action: PendingAction,
    },
    Select {
        title: String,
        prompt: String,
        options: Vec<SelectOption>,
        cursor: usize,
        action: PendingAction,
    },
    PluginForm {
        mode: PluginMode,
        form: FormState,
        /// Snapshot of the items the plugin action applies to, captured when
        /// the workflow opened.
        items: Vec<Item>,
    },
    Preview {
        item: Item,
    },
    Progress {
        title: String,
        entries: Vec<ProgressEntry>,
    },
}

impl Workflow {
    pub fn kind(&self) -> WorkflowKind {
        match self {
            Self::Confirm { .. } => WorkflowKind::Confirm,
            Self::Prompt { .. } => WorkflowKind::Prompt,
            Self::Select { .. } => WorkflowKind::Select,
            Self::PluginForm { .. } => WorkflowKind::PluginForm,
            Self::Preview { .. } => WorkflowKind::Preview,
            Self::Progress { .. } => WorkflowKind::Progress,
        }
    }

    /// Preview and progress modals have no footer buttons; they close only
    /// through the dismiss affordance.
    pub fn has_footer(&self) -> bool {
        !matches!(self, Self::Preview { .. } | Self::Progress { .. })
    }
}

/// Holder enforcing the at-most-one-active invariant.
#[derive(Debug, Default)]
pub struct WorkflowSlot {
    active: Option<Workflow>,
}

impl WorkflowSlot {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Workflow> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Workflow> {
        self.active.as_mut()
    }

    /// Install a new workflow, rejecting when one is already pending.
    pub fn begin(&mut self, workflow: Workflow) -> Result<(), GalleryError> {
        if let Some(active) = &self.active {
            return Err(GalleryError::WorkflowActive {
                active: active.kind(),
                requested: workflow.kind(),
            });
        }
        self.active = Some(workflow);
        Ok(())
    }

    /// Capture and clear the pending workflow. Called exactly once per
    /// workflow, *before* any derived work begins, so a rapid double press
    /// cannot re-enter the same resolution path.
    pub fn take(&mut self) -> Option<Workflow> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::MediaKind;

    fn field(name: &str, kind: FieldKind, default: &str) -> FieldSchema {
        FieldSchema {
            name: name.into(),
            label: name.into(),
            kind,
            default_value: default.into(),
            ..FieldSchema::default()
        }
    }

    #[test]
    fn slot_rejects_second_workflow() {
        let mut slot = WorkflowSlot::default();
        slot.begin(Workflow::Confirm {
            title: "Delete".into(),
            prompt: "Sure?".into(),
            action: PendingAction::DeleteItems { items: vec![] },
        })
        .unwrap();

        let err = slot
            .begin(Workflow::Preview {
                item: Item::new(1, "a", MediaKind::Image),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            GalleryError::WorkflowActive {
                active: WorkflowKind::Confirm,
                requested: WorkflowKind::Preview,
            }
        ));
    }

    #[test]
    fn take_clears_exactly_once() {
        let mut slot = WorkflowSlot::default();
        slot.begin(Workflow::Preview {
            item: Item::new(1, "a", MediaKind::Image),
        })
        .unwrap();
        assert!(slot.take().is_some());
        assert!(slot.take().is_none());
        assert!(!slot.is_active());
    }

    #[test]
    fn number_fields_parse_as_integers_with_clamping() {
        let mut schema = field("count", FieldKind::Number, "4");
        schema.min = Some(1);
        schema.max = Some(10);
        let mut form = FormState::from_schema(vec![schema]);
        form.backspace();
        for ch in "25".chars() {
            form.insert_char(ch);
        }
        let values = form.values();
        assert_eq!(values["count"], serde_json::json!(10));
    }

    #[test]
    fn hidden_fields_keep_defaults_and_never_take_focus() {
        let form = FormState::from_schema(vec![
            field("token", FieldKind::Hidden, "abc"),
            field("prompt", FieldKind::Text, ""),
        ]);
        assert_eq!(form.focus, 1);
        assert_eq!(form.values()["token"], serde_json::json!("abc"));
    }

    #[test]
    fn select_fields_resolve_to_the_cycled_option() {
        let mut schema = field("style", FieldKind::Select, "a");
        schema.options = vec![
            FieldOption {
                value: "a".into(),
                label: "A".into(),
            },
            FieldOption {
                value: "b".into(),
                label: "B".into(),
            },
        ];
        let mut form = FormState::from_schema(vec![schema]);
        form.cycle_option(1);
        assert_eq!(form.values()["style"], serde_json::json!("b"));
    }

    #[test]
    fn selection_rules() {
        let img = Item::new(1, "a.jpg", MediaKind::Image);
        let vid = Item::new(2, "b.mp4", MediaKind::Video);
        let one_img = vec![&img];
        let one_vid = vec![&vid];
        let both = vec![&img, &vid];
        assert!(SelectionRule::Any.matches(&[]));
        assert!(SelectionRule::None.matches(&[]));
        assert!(!SelectionRule::None.matches(&one_img));
        assert!(SelectionRule::Single.matches(&one_img));
        assert!(SelectionRule::Multiple.matches(&both));
        assert!(SelectionRule::SingleImage.matches(&one_img));
        assert!(!SelectionRule::SingleImage.matches(&one_vid));
        assert!(SelectionRule::SingleVideo.matches(&one_vid));
    }
}
