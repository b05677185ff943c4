//! Shared progress record for an indexing run.
//!
//! One writer (the orchestrator) and any number of pollers share a
//! [`ProgressTracker`] through an `Arc`. Every field lives behind a
//! single mutex; pollers only ever see [`ProgressSnapshot`] copies.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;

use crate::core::types::ErrorMessage;

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Counting,
    Processing,
    Done,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Counting => "counting",
            RunPhase::Processing => "processing",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct ProgressState {
    total_files: usize,
    processed_files: usize,
    started_at: DateTime<Utc>,
    started: Instant,
    is_running: bool,
    current_file: String,
    phase: RunPhase,
    errors: Vec<ErrorMessage>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            total_files: 0,
            processed_files: 0,
            started_at: Utc::now(),
            started: Instant::now(),
            is_running: false,
            current_file: String::new(),
            phase: RunPhase::Idle,
            errors: Vec::new(),
        }
    }
}

/// Point-in-time copy of the progress record plus derived fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub total_files: usize,
    pub processed_files: usize,
    pub current_file: String,
    pub phase: RunPhase,
    pub started_at: DateTime<Utc>,
    pub errors: Vec<ErrorMessage>,
    /// 0.0 ..= 100.0
    pub percentage: f64,
    pub elapsed_secs: f64,
    pub estimated_remaining_secs: f64,
    /// `None` until at least one file has been processed
    pub estimated_completion: Option<DateTime<Utc>>,
}

/// Thread-safe progress record
#[derive(Debug, Default)]
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock is recovered after a panic in another holder: every
    /// mutation below leaves the record consistent, so a poisoned
    /// guard still holds valid data.
    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the record for a new run
    pub fn start(&self, total_files: usize) {
        let mut state = self.lock();
        *state = ProgressState {
            total_files,
            is_running: true,
            phase: RunPhase::Counting,
            ..ProgressState::default()
        };
    }

    /// Start a run and return a guard that finishes it when dropped
    pub fn begin_run(&self, total_files: usize) -> RunGuard<'_> {
        self.start(total_files);
        RunGuard { tracker: self }
    }

    pub fn set_total(&self, total_files: usize) {
        let mut state = self.lock();
        state.total_files = total_files;
        state.processed_files = state.processed_files.min(total_files);
    }

    pub fn set_phase(&self, phase: RunPhase) {
        self.lock().phase = phase;
    }

    pub fn set_current(&self, file: impl Into<String>) {
        let file = file.into();
        self.lock().current_file = file;
    }

    /// Count one more processed file, never past the total
    pub fn increment(&self) {
        let mut state = self.lock();
        if state.processed_files < state.total_files {
            state.processed_files += 1;
        }
    }

    pub fn append_error(&self, message: ErrorMessage) {
        self.lock().errors.push(message);
    }

    pub fn extend_errors(&self, messages: impl IntoIterator<Item = ErrorMessage>) {
        let messages: Vec<_> = messages.into_iter().collect();
        if !messages.is_empty() {
            self.lock().errors.extend(messages);
        }
    }

    /// Mark the run as no longer running. Idempotent.
    pub fn finish(&self) {
        let mut state = self.lock();
        state.is_running = false;
        state.phase = RunPhase::Done;
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_running
    }

    /// Copy of the error log
    pub fn errors(&self) -> Vec<ErrorMessage> {
        self.lock().errors.clone()
    }

    /// Snapshot of the active run, or `None` when nothing is running
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        let (total, processed, current_file, phase, started_at, started, errors) = {
            let state = self.lock();
            if !state.is_running {
                return None;
            }
            (
                state.total_files,
                state.processed_files,
                state.current_file.clone(),
                state.phase,
                state.started_at,
                state.started,
                state.errors.clone(),
            )
        };

        let now = Utc::now();
        let elapsed_secs = started.elapsed().as_secs_f64();
        let percentage = if total == 0 {
            0.0
        } else {
            processed as f64 * 100.0 / total as f64
        };

        let (estimated_remaining_secs, estimated_completion) = if processed > 0 {
            let rate = elapsed_secs / processed as f64;
            let remaining = rate * total.saturating_sub(processed) as f64;
            let completion = now + ChronoDuration::milliseconds((remaining * 1000.0) as i64);
            (remaining, Some(completion))
        } else {
            (0.0, None)
        };

        Some(ProgressSnapshot {
            total_files: total,
            processed_files: processed,
            current_file,
            phase,
            started_at,
            errors,
            percentage,
            elapsed_secs,
            estimated_remaining_secs,
            estimated_completion,
        })
    }
}

/// Finishes the run it was created for when dropped, on every exit path
#[must_use = "the run finishes as soon as the guard is dropped"]
pub struct RunGuard<'a> {
    tracker: &'a ProgressTracker,
}

impl RunGuard<'_> {
    pub fn tracker(&self) -> &ProgressTracker {
        self.tracker
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}
