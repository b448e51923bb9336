// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fuzz-run supervisor.
//!
//! Owns the single active-run slot and the history of archived targets.
//! Starting a run reserves the slot under a mutex before anything slow
//! happens, so concurrent starts can never both pass the check. Completion
//! messages from watchers are handled by one background loop which archives
//! the results and frees the slot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use wf_adapters::{
    CatalogAdapter, CatalogError, FuzzerAdapter, PluginInfo, PostProcessAdapter, TeardownAdapter,
};
use wf_core::{
    ActiveRun, Clock, HistoryEntry, PluginSlug, RunFailure, RunId, RunState, SystemClock,
};

use crate::archiver::Archiver;
use crate::error::SupervisorError;
use crate::history::History;
use crate::watcher::{RunFinished, Watcher};

/// Depth of the completion channel. Only one run is active at a time, so
/// this never fills in practice.
const COMPLETION_CHANNEL_DEPTH: usize = 16;

/// Paths and limits the supervisor runs with
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Where the fuzz tool writes raw results
    pub results_dir: PathBuf,
    /// Where archived `<slug>.json` artifacts live
    pub archive_dir: PathBuf,
    pub catalog_timeout: Duration,
    pub max_run_duration: Duration,
}

/// External collaborators of the supervisor
pub struct SupervisorDeps<C, F, P, T> {
    pub catalog: C,
    pub fuzzer: F,
    pub postprocess: P,
    pub teardown: T,
}

/// A run that was accepted and is now in flight
#[derive(Debug, Clone)]
pub struct StartAccepted {
    pub run: ActiveRun,
    pub plugin: PluginInfo,
}

#[derive(Debug, Clone)]
enum Slot {
    Idle,
    /// A start is in progress (catalog lookup, spawn)
    Reserved { target: PluginSlug },
    Running(ActiveRun),
}

impl Slot {
    fn target(&self) -> Option<&PluginSlug> {
        match self {
            Slot::Idle => None,
            Slot::Reserved { target } => Some(target),
            Slot::Running(run) => Some(&run.target),
        }
    }
}

struct Shared<C, F, P, T, K> {
    catalog: C,
    fuzzer: F,
    archiver: Archiver<P, T>,
    clock: K,
    catalog_timeout: Duration,
    max_run_duration: Duration,
    // Lock order: slot before history
    slot: Mutex<Slot>,
    history: Mutex<History>,
    last_failure: Mutex<Option<RunFailure>>,
    state_tx: watch::Sender<RunState>,
}

/// Supervises at most one fuzz run at a time. Cheap to clone.
pub struct Supervisor<C, F, P, T, K = SystemClock> {
    shared: Arc<Shared<C, F, P, T, K>>,
    done_tx: mpsc::Sender<RunFinished>,
}

impl<C, F, P, T, K> Clone for Supervisor<C, F, P, T, K> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared), done_tx: self.done_tx.clone() }
    }
}

impl<C, F, P, T, K> Supervisor<C, F, P, T, K>
where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
    K: Clock,
{
    /// Build the supervisor and start its completion loop. Must be called
    /// from within a tokio runtime.
    pub fn spawn(
        deps: SupervisorDeps<C, F, P, T>,
        config: SupervisorConfig,
        clock: K,
        history: History,
    ) -> Self {
        let archiver =
            Archiver::new(deps.postprocess, deps.teardown, config.results_dir, config.archive_dir);
        let (state_tx, _) = watch::channel(RunState::NotStarted);
        let shared = Arc::new(Shared {
            catalog: deps.catalog,
            fuzzer: deps.fuzzer,
            archiver,
            clock,
            catalog_timeout: config.catalog_timeout,
            max_run_duration: config.max_run_duration,
            slot: Mutex::new(Slot::Idle),
            history: Mutex::new(history),
            last_failure: Mutex::new(None),
            state_tx,
        });

        let (done_tx, done_rx) = mpsc::channel(COMPLETION_CHANNEL_DEPTH);
        tokio::spawn(completion_loop(Arc::clone(&shared), done_rx));

        Self { shared, done_tx }
    }

    /// Start fuzzing `target`. Returns once the fuzz process is running.
    pub async fn start(&self, target: PluginSlug) -> Result<StartAccepted, SupervisorError> {
        let reservation = self.reserve(&target)?;

        let lookup = self.shared.catalog.lookup(&target);
        let plugin = match tokio::time::timeout(self.shared.catalog_timeout, lookup).await {
            Ok(Ok(plugin)) => plugin,
            Ok(Err(CatalogError::NotFound(_))) => {
                return Err(SupervisorError::NotFound(target.to_string()))
            }
            Ok(Err(CatalogError::Unavailable(reason))) => {
                tracing::warn!(plugin = %target, reason = %reason, "plugin catalog unavailable");
                return Err(SupervisorError::UpstreamUnavailable(reason));
            }
            Err(_) => {
                let reason = format!(
                    "lookup timed out after {}ms",
                    self.shared.catalog_timeout.as_millis()
                );
                tracing::warn!(plugin = %target, reason = %reason, "plugin catalog unavailable");
                return Err(SupervisorError::UpstreamUnavailable(reason));
            }
        };

        let process = self.shared.fuzzer.spawn(&target).await.inspect_err(|e| {
            tracing::error!(plugin = %target, error = %e, "failed to start fuzzer");
        })?;

        let run = ActiveRun {
            id: RunId::new(),
            target,
            pid: process.id(),
            started_at_ms: self.shared.clock.epoch_ms(),
        };
        reservation.commit(run.clone());

        Watcher::new(run.clone(), process, self.shared.max_run_duration, self.done_tx.clone())
            .spawn();
        tracing::info!(
            run_id = %run.id,
            plugin = %run.target,
            pid = ?run.pid,
            version = ?plugin.version,
            "fuzz run started"
        );
        Ok(StartAccepted { run, plugin })
    }

    /// Check-and-set the slot for `target`
    fn reserve(&self, target: &PluginSlug) -> Result<Reservation<'_>, SupervisorError> {
        let mut slot = self.shared.slot.lock();
        if self.shared.history.lock().contains(target) {
            return Err(SupervisorError::AlreadyProcessed(target.clone()));
        }
        if let Some(active) = slot.target() {
            return Err(SupervisorError::Conflict { active: active.clone() });
        }
        *slot = Slot::Reserved { target: target.clone() };
        self.shared.state_tx.send_replace(RunState::Fuzzing);
        Ok(Reservation {
            slot: &self.shared.slot,
            state_tx: &self.shared.state_tx,
            committed: false,
        })
    }

    pub fn state(&self) -> RunState {
        match *self.shared.slot.lock() {
            Slot::Idle => RunState::NotStarted,
            Slot::Reserved { .. } | Slot::Running(_) => RunState::Fuzzing,
        }
    }

    /// The run in flight, once its process has started
    pub fn active(&self) -> Option<ActiveRun> {
        match &*self.shared.slot.lock() {
            Slot::Running(run) => Some(run.clone()),
            Slot::Idle | Slot::Reserved { .. } => None,
        }
    }

    /// Target holding the slot, including one still being started
    pub fn active_target(&self) -> Option<PluginSlug> {
        self.shared.slot.lock().target().cloned()
    }

    /// Archived targets, sorted
    pub fn history(&self) -> Vec<PluginSlug> {
        self.shared.history.lock().targets()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.shared.history.lock().entries().cloned().collect()
    }

    /// Read the archived findings for `target`
    pub async fn result(&self, target: &PluginSlug) -> Result<serde_json::Value, SupervisorError> {
        let location = self
            .shared
            .history
            .lock()
            .get(target)
            .map(|entry| entry.location.clone())
            .ok_or_else(|| SupervisorError::NotFound(target.to_string()))?;

        let raw = match tokio::fs::read_to_string(&location).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    plugin = %target,
                    path = %location.display(),
                    "archived artifact disappeared"
                );
                return Err(SupervisorError::NotFound(target.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|e| SupervisorError::Artifact {
            target: target.clone(),
            reason: e.to_string(),
        })
    }

    /// Why the most recent run failed to archive, if it did
    pub fn last_failure(&self) -> Option<RunFailure> {
        self.shared.last_failure.lock().clone()
    }

    /// Follow state changes
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.shared.state_tx.subscribe()
    }

    /// Resolve once no run is active
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `shared`, which we hold, so this cannot close
        let _ = rx.wait_for(|state| *state == RunState::NotStarted).await;
    }
}

/// Holds the slot while a start is in progress. Dropping it uncommitted
/// (on error, or when the start future is cancelled) frees the slot.
struct Reservation<'a> {
    slot: &'a Mutex<Slot>,
    state_tx: &'a watch::Sender<RunState>,
    committed: bool,
}

impl Reservation<'_> {
    fn commit(mut self, run: ActiveRun) {
        *self.slot.lock() = Slot::Running(run);
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Reserved { .. }) {
            *slot = Slot::Idle;
            self.state_tx.send_replace(RunState::NotStarted);
        }
    }
}

async fn completion_loop<C, F, P, T, K>(
    shared: Arc<Shared<C, F, P, T, K>>,
    mut done_rx: mpsc::Receiver<RunFinished>,
) where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
    K: Clock,
{
    while let Some(finished) = done_rx.recv().await {
        shared.complete(finished).await;
    }
    tracing::debug!("completion loop stopped");
}

impl<C, F, P, T, K> Shared<C, F, P, T, K>
where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
    K: Clock,
{
    async fn complete(&self, finished: RunFinished) {
        let RunFinished { run, outcome } = finished;
        if !outcome.is_success() {
            tracing::warn!(
                run_id = %run.id,
                plugin = %run.target,
                outcome = %outcome,
                "fuzz process did not exit cleanly, archiving anyway"
            );
        }

        let started_at = UNIX_EPOCH + Duration::from_millis(run.started_at_ms);
        let result = self.archiver.archive(&run.target, started_at).await;
        let now = self.clock.epoch_ms();

        let mut slot = self.slot.lock();
        match result {
            Ok(location) => {
                let entry = HistoryEntry { target: run.target.clone(), location, archived_at_ms: now };
                if !self.history.lock().insert(entry) {
                    tracing::warn!(plugin = %run.target, "target was already in history");
                }
                *self.last_failure.lock() = None;
                tracing::info!(run_id = %run.id, plugin = %run.target, "fuzz run archived");
            }
            Err(e) => {
                tracing::error!(
                    run_id = %run.id,
                    plugin = %run.target,
                    outcome = %outcome,
                    error = %e,
                    "failed to archive fuzz run"
                );
                *self.last_failure.lock() = Some(RunFailure {
                    run_id: run.id.clone(),
                    target: run.target.clone(),
                    outcome,
                    error: e.to_string(),
                    at_ms: now,
                });
            }
        }

        if matches!(&*slot, Slot::Running(active) if active.id == run.id) {
            *slot = Slot::Idle;
            self.state_tx.send_replace(RunState::NotStarted);
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
