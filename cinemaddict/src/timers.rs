//! Virtual timer queue standing in for the event loop's `setTimeout`.
//!
//! Time only moves when `advance` is called, which keeps timed view effects
//! deterministic under test and in the one-shot binary.

use std::cell::RefCell;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    due: Duration,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

#[derive(Default)]
pub struct Timers {
    queue: RefCell<Queue>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the queue was created
    pub fn now(&self) -> Duration {
        self.queue.borrow().now
    }

    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        let id = TimerId(queue.next_id);
        let due = queue.now + delay;
        queue.timers.push(Timer {
            id,
            due,
            callback: Box::new(callback),
        });
        id
    }

    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut queue = self.queue.borrow_mut();
        let before = queue.timers.len();
        queue.timers.retain(|timer| timer.id != id);
        queue.timers.len() != before
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().timers.len()
    }

    /// Move the clock forward, firing due timers in deadline order. Callbacks
    /// may schedule new timers; those fire too if they fall inside the window.
    pub fn advance(&self, by: Duration) {
        let deadline = self.now() + by;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let index = queue
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= deadline)
                    .min_by_key(|(_, timer)| (timer.due, timer.id))
                    .map(|(index, _)| index);
                index.map(|index| {
                    let timer = queue.timers.remove(index);
                    queue.now = timer.due;
                    timer
                })
            };
            match next {
                Some(timer) => {
                    tracing::trace!("Firing timer {:?} at {:?}", timer.id, timer.due);
                    (timer.callback)();
                }
                None => break,
            }
        }
        self.queue.borrow_mut().now = deadline;
    }
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("Timers")
            .field("now", &queue.now)
            .field("pending", &queue.timers.len())
            .finish()
    }
}
