//! Deferred, fire-and-forget callbacks
//!
//! Used to delay a slide's activation so a class change produces a
//! transition. Callbacks are idempotent and never cancelled.

use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;

/// A callback to run once after a delay
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a task after a delay
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: DeferredTask);
}

/// Scheduler backed by a tokio runtime
#[derive(Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on, if any
    pub fn try_current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

struct Pending {
    due: Duration,
    seq: u64,
    task: DeferredTask,
}

#[derive(Default)]
struct ManualQueue {
    now: Duration,
    seq: u64,
    pending: Vec<Pending>,
}

/// Virtual-clock scheduler. Nothing runs until [`ManualScheduler::advance`].
#[derive(Default, Clone)]
pub struct ManualScheduler {
    queue: Arc<Mutex<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, running every task that becomes due.
    ///
    /// Tasks run in due order, ties broken by scheduling order. Tasks
    /// scheduled while advancing run too if they fall inside the window.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.queue.lock().now + by;
        let mut ran = 0;

        loop {
            let next = {
                let mut queue = self.queue.lock();
                let earliest = queue
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(idx, _)| idx);

                match earliest {
                    Some(idx) => {
                        let pending = queue.pending.swap_remove(idx);
                        queue.now = pending.due;
                        Some(pending.task)
                    }
                    None => {
                        queue.now = target;
                        None
                    }
                }
            };

            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }

        ran
    }

    /// Number of tasks not yet run
    pub fn pending(&self) -> usize {
        self.queue.lock().pending.len()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.queue.lock().now
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        let mut queue = self.queue.lock();
        let due = queue.now + delay;
        let seq = queue.seq;
        queue.seq += 1;
        queue.pending.push(Pending { due, seq, task });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_runs_in_due_order() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for (delay, label) in [(150, "c"), (50, "a"), (50, "b")] {
            let log = log.clone();
            scheduler.schedule(Duration::from_millis(delay), Box::new(move || log.lock().push(label)));
        }

        assert_eq!(scheduler.advance(Duration::from_millis(49)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 2);
        assert_eq!(*log.lock(), vec!["a", "b"]);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.now(), Duration::from_millis(150));
    }

    #[test]
    fn test_manual_runs_tasks_scheduled_during_advance() {
        let scheduler = ManualScheduler::new();
        let hits = Arc::new(Mutex::new(0));

        let inner_scheduler = scheduler.clone();
        let inner_hits = hits.clone();
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                *inner_hits.lock() += 1;
                let hits = inner_hits.clone();
                inner_scheduler.schedule(Duration::from_millis(10), Box::new(move || *hits.lock() += 1));
            }),
        );

        scheduler.advance(Duration::from_millis(25));
        assert_eq!(*hits.lock(), 2);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_tokio_scheduler_fires() {
        let scheduler = TokioScheduler::try_current().expect("inside runtime");
        let (tx, rx) = tokio::sync::oneshot::channel();

        scheduler.schedule(Duration::from_millis(5), Box::new(move || {
            let _ = tx.send(42);
        }));

        let value = tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .expect("task fired in time")
            .expect("sender kept alive");
        assert_eq!(value, 42);
    }
}
