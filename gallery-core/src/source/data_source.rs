//! src/source/data_source.rs
//! ============================================================================
//! # Data Source Contract
//!
//! The gallery is presentation glue over a caller-supplied data source. The
//! source declares its supported operation set up front through
//! [`SourceCapabilities`]; the orchestrator snapshots that declaration once
//! at construction and never offers an action the source did not declare.
//! Undeclared operations keep their default `Unsupported` implementation.

use async_trait::async_trait;
use compact_str::CompactString;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::item::{Folder, Id, Item};

/// Error returned by data-source operations; the message is shown to the
/// user in a toast.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("operation '{0}' is not supported by this data source")]
    Unsupported(&'static str),

    #[error("{0}")]
    Rejected(String),
}

impl SourceError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// The operation set a data source declares up front. Everything defaults
/// to `false`; `load_items` is always required and has no flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCapabilities {
    pub load_folders: bool,
    pub create_folder: bool,
    pub rename_folder: bool,
    pub delete_folder: bool,
    pub rename_item: bool,
    pub delete_item: bool,
    pub move_item: bool,
    pub copy_item: bool,
    pub upload_item: bool,
    /// Names accepted by [`DataSource::invoke`] (plugin-declared methods).
    pub custom_methods: Vec<CompactString>,
}

impl SourceCapabilities {
    pub fn supports_method(&self, name: &str) -> bool {
        self.custom_methods.iter().any(|m| m == name)
    }
}

/// Context passed to every mutating call.
#[derive(Debug, Clone, Default)]
pub struct SourceContext {
    pub current_folder: Option<Folder>,
}

/// One file handed to `upload_item` by the import plugin.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: CompactString,
    pub data: Vec<u8>,
}

/// Asynchronous CRUD-like supplier of items and folders. All methods apart
/// from `capabilities` and `load_items` default to `Unsupported`; an
/// implementation overrides exactly the set it declares.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Declared operation set, snapshotted once at gallery construction.
    fn capabilities(&self) -> SourceCapabilities;

    /// Load items for the given folder, or all items when folders are
    /// disabled.
    async fn load_items(&self, folder: Option<&Id>) -> Result<Vec<Item>, SourceError>;

    async fn load_folders(&self) -> Result<Vec<Folder>, SourceError> {
        Err(SourceError::Unsupported("load_folders"))
    }

    async fn create_folder(&self, _name: &str) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("create_folder"))
    }

    async fn rename_folder(
        &self,
        _id: &Id,
        _new_name: &str,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("rename_folder"))
    }

    async fn delete_folder(&self, _id: &Id, _ctx: &SourceContext) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("delete_folder"))
    }

    async fn rename_item(
        &self,
        _id: &Id,
        _new_name: &str,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("rename_item"))
    }

    async fn delete_items(&self, _ids: &[Id], _ctx: &SourceContext) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("delete_items"))
    }

    async fn move_items(
        &self,
        _ids: &[Id],
        _dest: &Id,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("move_items"))
    }

    async fn copy_items(
        &self,
        _ids: &[Id],
        _dest: &Id,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("copy_items"))
    }

    async fn upload_item(
        &self,
        _upload: UploadRequest,
        _folder: Option<&Id>,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("upload_item"))
    }

    /// Bridge for plugin-declared methods, invoked by name from plugin-form
    /// submissions with the collected field values and the selection
    /// snapshot.
    async fn invoke(
        &self,
        method: &str,
        _items: &[Item],
        _values: &Map<String, Value>,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        let _ = method;
        Err(SourceError::Unsupported("invoke"))
    }
}
