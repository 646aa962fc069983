//! Close lifecycle: close tasks and the once-only discharge of them.
//!
//! A context discharges its tasks exactly once, either because the caller
//! closed it (`is_finalize = false`) or because it was dropped while still
//! open (`is_finalize = true`). Both paths race on one atomic flag.

use crate::store::NamingStore;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Cleanup work run once when a context's lifetime ends.
pub trait CloseTask: Send + Sync {
    fn close(&self, is_finalize: bool) -> anyhow::Result<()>;
}

impl<F> CloseTask for F
where
    F: Fn(bool) -> anyhow::Result<()> + Send + Sync,
{
    fn close(&self, is_finalize: bool) -> anyhow::Result<()> {
        self(is_finalize)
    }
}

/// Open/closed state plus the tasks owned by one context
pub struct Lifecycle {
    closed: AtomicBool,
    tasks: Mutex<Vec<Box<dyn CloseTask>>>,
}

impl Lifecycle {
    pub fn new(tasks: Vec<Box<dyn CloseTask>>) -> Self {
        Self {
            closed: AtomicBool::new(false),
            tasks: Mutex::new(tasks),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Register a task. On an already-closed lifecycle the task runs at once
    /// as an explicit close, and `false` is returned.
    pub fn register(&self, task: Box<dyn CloseTask>, label: &str) -> bool {
        let mut tasks = self.tasks.lock();
        if self.is_closed() {
            drop(tasks);
            debug!(context = label, "Close task registered after close; running now");
            run_task(0, task.as_ref(), false, label);
            return false;
        }
        tasks.push(task);
        true
    }

    /// Move OPEN -> CLOSED and run every task in registration order.
    ///
    /// Returns `true` for the single caller that won the transition.
    pub fn discharge(&self, is_finalize: bool, label: &str) -> bool {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let tasks = std::mem::take(&mut *self.tasks.lock());
        debug!(
            context = label,
            is_finalize,
            task_count = tasks.len(),
            "Discharging close tasks"
        );
        for (index, task) in tasks.iter().enumerate() {
            run_task(index, task.as_ref(), is_finalize, label);
        }
        true
    }
}

/// Run one task; its failure or panic never reaches the caller.
fn run_task(index: usize, task: &dyn CloseTask, is_finalize: bool, label: &str) {
    match panic::catch_unwind(AssertUnwindSafe(|| task.close(is_finalize))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(context = label, task = index, error = %err, "Close task failed");
        }
        Err(_) => {
            error!(context = label, task = index, "Close task panicked");
        }
    }
}

/// Logs a warning when a context is dropped without being closed.
pub struct LeakWarning {
    label: String,
}

impl LeakWarning {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl CloseTask for LeakWarning {
    fn close(&self, is_finalize: bool) -> anyhow::Result<()> {
        if is_finalize {
            warn!(
                context = %self.label,
                "Naming context dropped without close(); close it explicitly to release the store promptly"
            );
        }
        Ok(())
    }
}

struct LeaseState {
    store: Arc<dyn NamingStore>,
    holders: AtomicUsize,
}

/// A counted hold on a shared store.
///
/// Cloning takes another hold. Releasing the last hold closes the store.
/// A lease releases itself when dropped if it was never released.
pub struct StoreLease {
    state: Arc<LeaseState>,
    released: AtomicBool,
}

impl StoreLease {
    pub fn acquire(store: Arc<dyn NamingStore>) -> Self {
        Self {
            state: Arc::new(LeaseState {
                store,
                holders: AtomicUsize::new(1),
            }),
            released: AtomicBool::new(false),
        }
    }

    /// Holds outstanding across every clone of this lease
    pub fn holders(&self) -> usize {
        self.state.holders.load(Ordering::Acquire)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    pub fn release(&self) -> anyhow::Result<()> {
        if self.released.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if self.state.holders.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!("Last store lease released; closing store");
            self.state.store.close()?;
        }
        Ok(())
    }
}

/// Cloning a lease whose store was already closed yields a released lease;
/// the holder count never climbs back from zero.
impl Clone for StoreLease {
    fn clone(&self) -> Self {
        let held = self
            .state
            .holders
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |holders| {
                (holders > 0).then(|| holders + 1)
            })
            .is_ok();
        if !held {
            debug!("Store lease cloned after the store was closed");
        }
        Self {
            state: Arc::clone(&self.state),
            released: AtomicBool::new(!held),
        }
    }
}

impl CloseTask for StoreLease {
    fn close(&self, _is_finalize: bool) -> anyhow::Result<()> {
        self.release()
    }
}

impl Drop for StoreLease {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!(error = %err, "Failed to close store on lease drop");
        }
    }
}
