//! Motion tasks
//!
//! A drivetrain runs at most one motion at a time. Starting an async motion
//! first stops the one in flight; blocking motions run on the caller's thread.
//! Both kinds watch the same drivetrain-owned cancel flag, so a `StopHandle`
//! held by another thread can end either.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::error::DriveError;
use crate::motion::MotionOutcome;

/// Cloneable, thread-safe way to cancel whatever motion is in flight
///
/// The loop notices the request at its next iteration, brakes the groups and
/// returns `MotionOutcome::Stopped`. A request made while nothing runs is
/// cleared by the next command.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

/// Handle to a motion running on its own thread
pub struct MotionTask {
    name: String,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<MotionOutcome>,
}

impl MotionTask {
    /// Spawn `body` on a named thread. The body receives `cancel` and must
    /// return once it is raised.
    pub fn spawn<F>(name: &str, cancel: Arc<AtomicBool>, body: F) -> Result<Self, DriveError>
    where
        F: FnOnce(&AtomicBool) -> MotionOutcome + Send + 'static,
    {
        let flag = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name(format!("motion-{name}"))
            .spawn(move || body(&flag))?;
        Ok(Self {
            name: name.to_string(),
            cancel,
            handle,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the loop to exit at its next iteration
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to exit. A panicked loop reports `Stopped`.
    pub fn join(self) -> MotionOutcome {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("motion task {} panicked", self.name);
                MotionOutcome::Stopped
            }
        }
    }
}

/// Owner of the single in-flight motion
#[derive(Default)]
pub struct Scheduler {
    cancel: Arc<AtomicBool>,
    active: Option<MotionTask>,
    last: Option<MotionOutcome>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: Arc::clone(&self.cancel),
        }
    }

    /// Run `body` on the calling thread after stopping any background motion
    pub fn run_blocking<F>(&mut self, body: F) -> MotionOutcome
    where
        F: FnOnce(&AtomicBool) -> MotionOutcome,
    {
        self.preempt();
        self.cancel.store(false, Ordering::SeqCst);
        let cancel = Arc::clone(&self.cancel);
        let outcome = body(&cancel);
        self.last = Some(outcome);
        outcome
    }

    /// Replace the in-flight motion with `body` running in the background
    pub fn run_async<F>(&mut self, name: &str, body: F) -> Result<(), DriveError>
    where
        F: FnOnce(&AtomicBool) -> MotionOutcome + Send + 'static,
    {
        self.preempt();
        self.cancel.store(false, Ordering::SeqCst);
        self.active = Some(MotionTask::spawn(name, Arc::clone(&self.cancel), body)?);
        Ok(())
    }

    /// True while a background motion is still running
    pub fn is_busy(&self) -> bool {
        self.active.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// How the most recent motion ended, once it has been joined
    pub fn last_outcome(&self) -> Option<MotionOutcome> {
        self.last
    }

    /// Block until the background motion exits on its own.
    ///
    /// With nothing in flight this reports how the last motion ended, or
    /// `Settled` if there never was one.
    pub fn wait(&mut self) -> MotionOutcome {
        if let Some(task) = self.active.take() {
            self.last = Some(task.join());
        }
        self.last.unwrap_or(MotionOutcome::Settled)
    }

    /// Cancel and join the background motion, if any
    pub fn stop(&mut self) -> Option<MotionOutcome> {
        let task = self.active.take()?;
        task.cancel();
        let outcome = task.join();
        self.last = Some(outcome);
        Some(outcome)
    }

    fn preempt(&mut self) {
        if let Some(task) = self.active.as_ref() {
            if !task.is_finished() {
                debug!("preempting motion {}", task.name());
            }
        }
        self.stop();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
