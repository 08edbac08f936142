//! src/model/generation.rs
//! ============================================================================
//! # Generation Tracking
//!
//! An external system (e.g. a long-running batch job) pushes "item was
//! created" notifications over time. Each batch is tracked from its start
//! notification until its terminal one.

use std::collections::HashMap;

use compact_str::CompactString;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::model::item::Id;

/// Progress of one in-flight generation batch.
#[derive(Debug, Clone)]
pub struct GenerationState {
    pub total: usize,
    pub completed: usize,
    pub target_folder: Option<Id>,
    /// Ids of items already delivered by this generation, newest first.
    pub placeholders: SmallVec<[Id; 8]>,
}

#[derive(Debug, Default)]
pub struct GenerationTracker {
    active: HashMap<CompactString, GenerationState>,
}

impl GenerationTracker {
    pub fn start(
        &mut self,
        generation_id: impl Into<CompactString>,
        total: usize,
        target_folder: Option<Id>,
    ) {
        let id = generation_id.into();
        debug!(generation = %id, total, "Generation started");
        self.active.insert(
            id,
            GenerationState {
                total,
                completed: 0,
                target_folder,
                placeholders: SmallVec::new(),
            },
        );
    }

    /// Record one delivered item. Returns `false` when the generation is
    /// unknown (already ended, or never started).
    pub fn progress(&mut self, generation_id: &str, item_id: Id) -> bool {
        match self.active.get_mut(generation_id) {
            Some(state) => {
                state.completed += 1;
                state.placeholders.insert(0, item_id);
                true
            }
            None => {
                warn!(generation = generation_id, "Progress for unknown generation");
                false
            }
        }
    }

    pub fn end(&mut self, generation_id: &str) -> Option<GenerationState> {
        debug!(generation = generation_id, "Generation ended");
        self.active.remove(generation_id)
    }

    pub fn get(&self, generation_id: &str) -> Option<&GenerationState> {
        self.active.get(generation_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
