//! Notification dispatch.
//!
//! Gate decisions are handed off the capture callback as queued tasks so
//! observer work never runs on the real-time audio thread. Production code
//! uses [`SerialDispatcher`]; tests can substitute [`InlineDispatcher`] for
//! synchronous, deterministic delivery.

use crossbeam_channel::{unbounded, Sender};
use std::thread;

pub type Task = Box<dyn FnOnce() + Send>;

/// Fire-and-forget task submission onto a fixed notification context.
///
/// Implementations must preserve submission order but never make the caller
/// wait for a task to finish.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, task: Task);
}

/// Dedicated notification thread draining a FIFO queue.
///
/// Dropping the dispatcher closes the queue and joins the thread; tasks
/// already queued still run before the join completes. If a task panics the
/// thread exits and later dispatches become no-ops.
pub struct SerialDispatcher {
    sender: Option<Sender<Task>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SerialDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded::<Task>();
        let handle = thread::spawn(move || {
            for task in receiver {
                task();
            }
        });
        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }
}

impl Dispatcher for SerialDispatcher {
    fn dispatch(&self, task: Task) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(task);
        }
    }
}

impl Default for SerialDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialDispatcher {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Runs each task on the submitting thread before `dispatch` returns.
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, task: Task) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn inline_dispatcher_runs_immediately() {
        let count = Arc::new(AtomicUsize::new(0));
        let dispatcher = InlineDispatcher;
        let count_in_task = count.clone();
        dispatcher.dispatch(Box::new(move || {
            count_in_task.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn serial_dispatcher_preserves_submission_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = SerialDispatcher::new();
        for i in 0..32 {
            let seen = seen.clone();
            dispatcher.dispatch(Box::new(move || {
                seen.lock().unwrap().push(i);
            }));
        }
        drop(dispatcher);
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn dropping_dispatcher_drains_queued_tasks() {
        let count = Arc::new(AtomicUsize::new(0));
        let dispatcher = SerialDispatcher::new();
        for _ in 0..8 {
            let count = count.clone();
            dispatcher.dispatch(Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }
        drop(dispatcher);
        assert_eq!(count.load(Ordering::SeqCst), 8);
    }
}
