use super::{Event, Io, Runtime};
use std::collections::VecDeque;
use tracing::warn;

const SLICE: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Pending,
    Ready,
}

/// A unit of host work. A pending task goes to the back of the queue.
pub trait Task {
    fn poll(&mut self) -> Poll;
}

impl<I: Io> Task for Runtime<I> {
    fn poll(&mut self) -> Poll {
        match self.execute(SLICE) {
            Event::Running => Poll::Pending,
            Event::Stopped => Poll::Ready,
            Event::Error(e) => {
                warn!(error = %e, "program stopped");
                Poll::Ready
            }
        }
    }
}

impl<T: Task + ?Sized> Task for &mut T {
    fn poll(&mut self) -> Poll {
        (**self).poll()
    }
}

struct Once<F>(Option<F>);

impl<F: FnOnce()> Task for Once<F> {
    fn poll(&mut self) -> Poll {
        if let Some(f) = self.0.take() {
            f();
        }
        Poll::Ready
    }
}

/// ## Cooperative scheduler
///
/// A FIFO of tasks. A program that yields is queued behind whatever was
/// scheduled before it, so continuations keep their order relative to each
/// other and to host work.

#[derive(Default)]
pub struct Scheduler<'a> {
    queue: VecDeque<Box<dyn Task + 'a>>,
}

impl<'a> Scheduler<'a> {
    pub fn new() -> Scheduler<'a> {
        Scheduler {
            queue: VecDeque::new(),
        }
    }

    pub fn spawn<T: Task + 'a>(&mut self, task: T) {
        self.queue.push_back(Box::new(task));
    }

    /// Queue a closure to run once.
    pub fn defer<F: FnOnce() + 'a>(&mut self, f: F) {
        self.spawn(Once(Some(f)));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Poll the task at the head of the queue. False when there was none.
    pub fn tick(&mut self) -> bool {
        let mut task = match self.queue.pop_front() {
            Some(task) => task,
            None => return false,
        };
        if task.poll() == Poll::Pending {
            self.queue.push_back(task);
        }
        true
    }

    /// Drain the queue.
    pub fn run(&mut self) {
        while self.tick() {}
    }

    /// Drain the queue, checking `stop` before every tick. Returns false if
    /// stopped early.
    pub fn run_until<F: FnMut() -> bool>(&mut self, mut stop: F) -> bool {
        while !self.queue.is_empty() {
            if stop() {
                return false;
            }
            self.tick();
        }
        true
    }
}
