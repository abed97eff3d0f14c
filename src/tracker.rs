//! Tracking of the most recent completed backup per generation kind.
//!
//! A full backup is a superset baseline, so it also counts as the latest
//! differential when it is newer than the tracked one. Until a full backup
//! is seen, differential backups stand in for the full baseline.

use crate::model::{BackupRecord, GenerationKind};

/// Last completed backup of one generation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub kind: GenerationKind,
    pub started: i64,
    pub finished: i64,
    pub size: i64,
    pub num_objects: i64,
}

impl GenerationSummary {
    fn empty(kind: GenerationKind) -> Self {
        Self {
            kind,
            started: 0,
            finished: 0,
            size: 0,
            num_objects: 0,
        }
    }

    // The kind label is kept even when the values come from another kind.
    fn assign(&mut self, record: &BackupRecord) {
        self.started = record.started;
        self.finished = record.finished;
        self.size = record.size;
        self.num_objects = record.num_objects;
    }
}

/// Per-cycle state of the latest full and differential backups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTracker {
    full: GenerationSummary,
    incremental: GenerationSummary,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self {
            full: GenerationSummary::empty(GenerationKind::Full),
            incremental: GenerationSummary::empty(GenerationKind::Incremental),
        }
    }

    /// Fold one backup record into the tracked state.
    ///
    /// Unfinished records and unknown generation kinds are ignored. Only a
    /// strictly newer `started` replaces a tracked summary.
    pub fn update(&mut self, record: &BackupRecord) {
        if !record.is_complete() {
            return;
        }

        match record.generation_kind() {
            Some(GenerationKind::Full) => {
                if record.started > self.full.started {
                    self.full.assign(record);
                }
                if record.started > self.incremental.started {
                    self.incremental.assign(record);
                }
            }
            Some(GenerationKind::Incremental) => {
                if record.started > self.incremental.started {
                    self.incremental.assign(record);
                }
                if self.full.started == 0 {
                    self.full.assign(record);
                }
            }
            None => {}
        }
    }

    /// Whether any completed backup has been folded in.
    pub fn has_any_completion(&self) -> bool {
        self.full.started > 0
    }

    pub fn full(&self) -> &GenerationSummary {
        &self.full
    }

    pub fn incremental(&self) -> &GenerationSummary {
        &self.incremental
    }

    pub fn summaries(&self) -> [&GenerationSummary; 2] {
        [&self.full, &self.incremental]
    }
}

impl Default for GenerationTracker {
    fn default() -> Self {
        Self::new()
    }
}
