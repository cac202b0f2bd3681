//! Active-task registry shared by the simulator and the order actor.

use crate::model::TrackingId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub use crate::model::RunId;

/// A registered simulation task.
#[derive(Debug)]
pub struct ActiveRun {
    pub run_id: RunId,
    pub handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct RegistryState {
    runs: HashMap<TrackingId, ActiveRun>,
    next_run_id: RunId,
}

/// Map of tracking id to running simulation, guarded by one mutex.
///
/// Every read and write (start, stop, self-deregistration) goes through the
/// same lock, and no lock is held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SimulationRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl SimulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the task produced by `spawn` unless a run is already
    /// registered for `id`. Returns the new run id, or `None` when the call
    /// was a no-op.
    ///
    /// `spawn` runs while the lock is held, so the task cannot deregister
    /// itself before it has been inserted.
    pub fn start_with(
        &self,
        id: &TrackingId,
        spawn: impl FnOnce(RunId) -> JoinHandle<()>,
    ) -> Option<RunId> {
        let mut state = self.state.lock();
        if state.runs.contains_key(id) {
            return None;
        }
        state.next_run_id += 1;
        let run_id = state.next_run_id;
        let handle = spawn(run_id);
        state.runs.insert(id.clone(), ActiveRun { run_id, handle });
        Some(run_id)
    }

    /// Whether `run_id` is the run currently registered for `id`.
    pub fn is_current(&self, id: &TrackingId, run_id: RunId) -> bool {
        self.state
            .lock()
            .runs
            .get(id)
            .is_some_and(|run| run.run_id == run_id)
    }

    pub fn is_active(&self, id: &TrackingId) -> bool {
        self.state.lock().runs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.state.lock().runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns the run registered for `id`.
    pub fn take(&self, id: &TrackingId) -> Option<ActiveRun> {
        self.state.lock().runs.remove(id)
    }

    /// Self-deregistration on completion. Only removes the entry if it still
    /// belongs to `run_id`.
    pub fn finish(&self, id: &TrackingId, run_id: RunId) -> bool {
        let mut state = self.state.lock();
        if state.runs.get(id).is_some_and(|run| run.run_id == run_id) {
            state.runs.remove(id);
            true
        } else {
            false
        }
    }

    /// Removes every run.
    pub fn drain(&self) -> Vec<(TrackingId, ActiveRun)> {
        self.state.lock().runs.drain().collect()
    }
}
