//! Background filesystem jobs with a four-way completion callback.
//!
//! A job runs on the rayon pool. When it finishes, exactly one listener method fires:
//! success with the value, failure with the error, cancelled (the job was cancelled
//! before it started, or returned [`FsGuardError::Cancelled`]), or interrupted (the job
//! panicked, or returned [`FsGuardError::Interrupted`]).

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};
use tracing::{debug, warn};

use super::walk::{copy_tree, delete_tree, total_size};
use crate::errors::FsGuardError;

/// Receives the outcome of a background job.
pub trait JobListener<T>: Send + 'static {
    fn on_success(&self, value: T);
    fn on_failure(&self, error: anyhow::Error);
    fn on_cancelled(&self);
    fn on_interrupted(&self);
}

/// An outcome as a value; lets a channel act as a listener.
#[derive(Debug)]
pub enum JobOutcome<T> {
    Success(T),
    Failure(anyhow::Error),
    Cancelled,
    Interrupted,
}

impl<T: Send + 'static> JobListener<T> for Sender<JobOutcome<T>> {
    fn on_success(&self, value: T) {
        let _ = self.send(JobOutcome::Success(value));
    }
    fn on_failure(&self, error: anyhow::Error) {
        let _ = self.send(JobOutcome::Failure(error));
    }
    fn on_cancelled(&self) {
        let _ = self.send(JobOutcome::Cancelled);
    }
    fn on_interrupted(&self) {
        let _ = self.send(JobOutcome::Interrupted);
    }
}

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const CANCELLED: u8 = 2;

#[derive(Debug, Default)]
struct Shared {
    state: AtomicU8,
    done: Mutex<bool>,
    done_cv: Condvar,
}

impl Shared {
    fn finish(&self) {
        let mut done = self.done.lock().unwrap_or_else(|p| p.into_inner());
        *done = true;
        self.done_cv.notify_all();
    }
}

/// Handle to a spawned job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    shared: Arc<Shared>,
}

impl JobHandle {
    /// Cancel the job if it has not started yet. Returns true if this call cancelled it.
    pub fn cancel(&self) -> bool {
        self.shared
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// True once the listener has been notified.
    pub fn is_finished(&self) -> bool {
        *self.shared.done.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Block until the listener has been notified.
    pub fn wait(&self) {
        let mut done = self.shared.done.lock().unwrap_or_else(|p| p.into_inner());
        while !*done {
            done = self
                .shared
                .done_cv
                .wait(done)
                .unwrap_or_else(|p| p.into_inner());
        }
    }
}

/// Run `op` on the rayon pool and report its outcome to `listener`.
pub fn spawn_job<T, F, L>(op: F, listener: L) -> JobHandle
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    L: JobListener<T>,
{
    let shared = Arc::new(Shared::default());
    let handle = JobHandle {
        shared: Arc::clone(&shared),
    };

    rayon::spawn(move || {
        let started = shared
            .state
            .compare_exchange(PENDING, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if !started {
            debug!("job cancelled before start");
            listener.on_cancelled();
            shared.finish();
            return;
        }

        match catch_unwind(AssertUnwindSafe(op)) {
            Ok(Ok(value)) => listener.on_success(value),
            Ok(Err(err)) => match err.downcast_ref::<FsGuardError>() {
                Some(FsGuardError::Cancelled) => listener.on_cancelled(),
                Some(FsGuardError::Interrupted) => listener.on_interrupted(),
                _ => {
                    debug!(error = %err, "job failed");
                    listener.on_failure(err);
                }
            },
            Err(_) => {
                warn!("job panicked; reporting as interrupted");
                listener.on_interrupted();
            }
        }
        shared.finish();
    });

    handle
}

/// [`copy_tree`] in the background.
pub fn spawn_copy_tree<L: JobListener<()>>(src: PathBuf, dst: PathBuf, listener: L) -> JobHandle {
    spawn_job(move || copy_tree(&src, &dst), listener)
}

/// [`delete_tree`] in the background; the value is its success flag.
pub fn spawn_delete_tree<L: JobListener<bool>>(root: PathBuf, listener: L) -> JobHandle {
    spawn_job(move || Ok(delete_tree(&root)), listener)
}

/// [`total_size`] in the background.
pub fn spawn_total_size<L: JobListener<u64>>(root: PathBuf, listener: L) -> JobHandle {
    spawn_job(move || Ok(total_size(&root)), listener)
}
