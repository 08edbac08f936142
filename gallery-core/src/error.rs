//! src/error.rs
//! ============================================================================
//! # `GalleryError`: Unified Error Type for the Gallery Widget Set
//!
//! The crate-level error enum. Data-source rejections never appear here:
//! they are caught at the orchestrator boundary and surfaced as toasts, so
//! the host only ever sees hard failures (terminal I/O, setup mistakes) and
//! the workflow guard.

use std::io;

use thiserror::Error;

use crate::model::workflow::WorkflowKind;

/// Unified error type for all gallery operations.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid construction-time configuration; fatal.
    #[error("Setup error: {0}")]
    Setup(String),

    /// A new modal workflow was requested while another is still pending.
    #[error("A {active:?} workflow is already active; cannot start {requested:?}")]
    WorkflowActive {
        active: WorkflowKind,
        requested: WorkflowKind,
    },
}

impl GalleryError {
    /// Create a setup error.
    pub fn setup<S: Into<String>>(message: S) -> Self {
        Self::Setup(message.into())
    }

    /// The short, human-readable message shown in toasts.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
