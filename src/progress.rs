//! Per-module progress bookkeeping.
//!
//! [`Progress`] is an explicitly owned value, created by the application and
//! passed into every session, never a process-wide global. Mutations are
//! monotonic and idempotent: a completed count never decreases within a run
//! and re-recording a step or challenge is a no-op, so revisiting a step via
//! `prev`/`next` can never double-count.
//!
//! The tracker is serde-serializable so a surrounding collaborator may
//! choose to persist it; the engine itself keeps it in memory only.

use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::lesson::Module;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct ModuleProgress {
    /// Ids of the steps completed so far.
    completed: BTreeSet<String>,
    /// Total number of steps in the module.
    total: usize,
}

/// In-memory progress record: steps completed per module plus the set of
/// completed challenge scenarios.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    modules: BTreeMap<String, ModuleProgress>,
    challenges: BTreeSet<String>,
}

impl Progress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module so `progress_for` can report its step total.
    /// Idempotent; completed steps survive re-registration.
    pub fn register_module(&mut self, module: &Module) {
        let entry = self.modules.entry(module.id.clone()).or_default();
        entry.total = module.steps.len();
    }

    /// Record one completed step. A no-op when the step was already
    /// recorded.
    pub fn record_step_complete(&mut self, module_id: &str, step_id: &str) {
        let entry = self.modules.entry(module_id.to_string()).or_default();
        if entry.completed.insert(step_id.to_string()) {
            debug!(module = module_id, step = step_id, "step completed");
        }
    }

    /// Record one completed challenge scenario. Idempotent.
    pub fn record_challenge_complete(&mut self, challenge_id: &str) {
        if self.challenges.insert(challenge_id.to_string()) {
            debug!(challenge = challenge_id, "challenge completed");
        }
    }

    /// Whether the given challenge has been solved in this run.
    #[must_use]
    pub fn is_challenge_complete(&self, challenge_id: &str) -> bool {
        self.challenges.contains(challenge_id)
    }

    /// Number of completed challenges.
    #[must_use]
    pub fn challenges_completed(&self) -> usize {
        self.challenges.len()
    }

    /// `(completed, total)` for the given module, `(0, 0)` when the module
    /// was never registered.
    #[must_use]
    pub fn progress_for(&self, module_id: &str) -> (usize, usize) {
        self.modules
            .get(module_id)
            .map_or((0, 0), |m| (m.completed.len(), m.total))
    }
}
