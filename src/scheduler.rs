use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send>;

/// Schedules one unit of work after a delay and cancels pending ones.
///
/// This is the only coupling between the epoch loop and an event loop:
/// production code runs on tokio timers, tests drive ticks by hand.
pub trait Scheduler: Send + Sync + 'static {
    type Handle: Send;

    /// Schedules `work` to run once after `delay`.
    fn schedule(&self, delay: Duration, work: Task) -> Self::Handle;

    /// Cancels a previously scheduled task. Cancelling one that already ran
    /// is a no-op.
    fn cancel(&self, handle: Self::Handle);
}

/// Scheduler backed by tokio timers.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime of the calling context.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    type Handle = JoinHandle<()>;

    fn schedule(&self, delay: Duration, work: Task) -> Self::Handle {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            work();
        })
    }

    fn cancel(&self, handle: Self::Handle) {
        handle.abort();
    }
}

/// Deterministic scheduler: queues tasks in schedule order and fires them on
/// demand, ignoring delays. Meant for tests and other synchronous harnesses.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Arc<Mutex<ManualQueue>>,
}

#[derive(Default)]
struct ManualQueue {
    next_id: u64,
    tasks: VecDeque<(u64, Task)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.lock().tasks.len()
    }

    /// Fires the oldest pending task, or returns false when the queue is
    /// empty. The queue lock is released before the task runs, so tasks may
    /// schedule more work.
    pub fn fire_next(&self) -> bool {
        let task = self.queue.lock().tasks.pop_front();
        match task {
            Some((_, task)) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Fires tasks until the queue stays empty.
    ///
    /// # Returns
    /// How many tasks ran, counting ones scheduled along the way.
    pub fn run_to_idle(&self) -> usize {
        let mut fired = 0;
        while self.fire_next() {
            fired += 1;
        }
        fired
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u64;

    fn schedule(&self, _delay: Duration, work: Task) -> Self::Handle {
        let mut queue = self.queue.lock();
        let id = queue.next_id;
        queue.next_id += 1;
        queue.tasks.push_back((id, work));
        id
    }

    fn cancel(&self, handle: Self::Handle) {
        self.queue.lock().tasks.retain(|(id, _)| *id != handle);
    }
}
