//! Sequential task runner bounded by a deadline and an interrupt.
//!
//! Tasks run in insertion order on one background thread. [`Runner::start`]
//! races that thread's completion against the deadline. Interrupts are
//! checked between tasks only: a task that runs long cannot be preempted,
//! so an interrupt or timeout takes effect at the next task boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use concurrency_patterns::core::{Runner, RunnerError};
//!
//! let mut runner = Runner::new(Duration::from_secs(3));
//! runner.add(|id| tracing::info!(id, "processor"));
//! runner.add(|id| tracing::info!(id, "processor"));
//!
//! match runner.start() {
//!     Ok(()) => {}
//!     Err(RunnerError::Timeout) => std::process::exit(1),
//!     Err(RunnerError::Interrupted) => std::process::exit(2),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{at, bounded, never, select};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RunnerConfig;
use crate::core::{Interrupt, RunnerError};

type Task = Box<dyn FnOnce(usize) + Send + 'static>;

/// Runs an ordered list of tasks once, under a deadline.
pub struct Runner {
    tasks: Vec<Task>,
    /// `None` when the timeout is too large to represent.
    deadline: Option<Instant>,
    interrupt: Interrupt,
}

impl Runner {
    /// Create a runner whose deadline is `timeout` from now.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_interrupt(timeout, Interrupt::new())
    }

    /// Create a runner observing an existing interrupt source.
    #[must_use]
    pub fn with_interrupt(timeout: Duration, interrupt: Interrupt) -> Self {
        Self {
            tasks: Vec::new(),
            deadline: Instant::now().checked_add(timeout),
            interrupt,
        }
    }

    /// Create a runner from configuration.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidConfig` if the configuration is invalid.
    pub fn with_config(config: &RunnerConfig) -> Result<Self, RunnerError> {
        config.validate().map_err(RunnerError::InvalidConfig)?;
        Ok(Self::new(config.timeout()))
    }

    /// Append a task. It receives its zero-based position when run.
    pub fn add<F>(&mut self, task: F) -> &mut Self
    where
        F: FnOnce(usize) + Send + 'static,
    {
        self.tasks.push(Box::new(task));
        self
    }

    /// Append several tasks in order.
    pub fn add_all<I, F>(&mut self, tasks: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(usize) + Send + 'static,
    {
        self.tasks
            .extend(tasks.into_iter().map(|task| Box::new(task) as Task));
        self
    }

    /// Handle that interrupts this runner when triggered.
    #[must_use]
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Point in time after which the run is aborted.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Number of tasks added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task and wait for completion, the deadline or an interrupt.
    ///
    /// On timeout this returns immediately; the background thread stops at
    /// its next task boundary. A panicking task is propagated to the caller.
    ///
    /// # Errors
    ///
    /// - `RunnerError::Timeout` if the deadline elapsed first
    /// - `RunnerError::Interrupted` if an interrupt was seen between tasks
    /// - `RunnerError::Spawn` if the background thread cannot be started
    pub fn start(self) -> Result<(), RunnerError> {
        let Self {
            tasks,
            deadline,
            interrupt,
        } = self;

        let run_id = Uuid::new_v4();
        let task_count = tasks.len();
        // Capacity 1 so the background thread never blocks on a caller that
        // already returned with a timeout.
        let (done_tx, done_rx) = bounded::<Result<(), RunnerError>>(1);
        let abandoned = Arc::new(AtomicBool::new(false));

        info!(%run_id, task_count, "runner starting");

        let worker_abandoned = Arc::clone(&abandoned);
        let handle = thread::Builder::new()
            .name("deadline-runner".into())
            .spawn(move || {
                let outcome = run_tasks(run_id, tasks, &interrupt, &worker_abandoned);
                let _ = done_tx.send(outcome);
            })
            .map_err(RunnerError::Spawn)?;

        let timeout = deadline.map_or_else(never::<Instant>, at);

        select! {
            recv(done_rx) -> outcome => {
                let joined = handle.join();
                match (outcome, joined) {
                    (Ok(result), _) => {
                        match &result {
                            Ok(()) => info!(%run_id, task_count, "runner completed"),
                            Err(e) => info!(%run_id, error = %e, "runner stopped"),
                        }
                        result
                    }
                    (Err(_), Err(payload)) => panic::resume_unwind(payload),
                    (Err(_), Ok(())) => unreachable!("runner thread exited without an outcome"),
                }
            }
            recv(timeout) -> _ => {
                abandoned.store(true, Ordering::Release);
                warn!(%run_id, task_count, "runner deadline elapsed before tasks completed");
                Err(RunnerError::Timeout)
            }
        }
    }
}

fn run_tasks(
    run_id: Uuid,
    tasks: Vec<Task>,
    interrupt: &Interrupt,
    abandoned: &AtomicBool,
) -> Result<(), RunnerError> {
    for (index, task) in tasks.into_iter().enumerate() {
        if interrupt.take() {
            info!(%run_id, task_index = index, "interrupt received, stopping");
            return Err(RunnerError::Interrupted);
        }
        if abandoned.load(Ordering::Acquire) {
            debug!(%run_id, task_index = index, "deadline passed, abandoning remaining tasks");
            return Err(RunnerError::Timeout);
        }

        debug!(%run_id, task_index = index, "running task");
        task(index);
    }
    Ok(())
}
