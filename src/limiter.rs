//! Creation rate and concurrency limiting
//!
//! Object creation is usually the most expensive and most failure-prone thing
//! a pool does. A [`CreateLimiter`] decides when a submitted [`CreateTask`]
//! actually runs: [`SimpleCreateLimiter`] caps how many tasks run at once and
//! keeps an adaptive minimum delay between dispatches, while
//! [`NoopCreateLimiter`] runs everything immediately.

use crate::config::LimiterConfiguration;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Signals that a running task has finished
///
/// The signal is sent by [`DoneCallback::done`] or, failing that, when the
/// callback is dropped, so a task that forgets to report still frees its
/// running slot.
pub struct DoneCallback {
    on_done: Option<Box<dyn FnOnce() + Send>>,
}

impl DoneCallback {
    fn new(on_done: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_done: Some(Box::new(on_done)),
        }
    }

    /// A callback that signals nothing
    pub fn noop() -> Self {
        Self { on_done: None }
    }

    /// Report completion
    pub fn done(self) {}
}

impl Drop for DoneCallback {
    fn drop(&mut self) {
        if let Some(on_done) = self.on_done.take() {
            on_done();
        }
    }
}

impl fmt::Debug for DoneCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoneCallback")
            .field("armed", &self.on_done.is_some())
            .finish()
    }
}

/// Unit of work scheduled by a [`CreateLimiter`]
pub trait CreateTask: Send {
    fn run(self: Box<Self>, done: DoneCallback);
}

impl<F> CreateTask for F
where
    F: FnOnce(DoneCallback) + Send,
{
    fn run(self: Box<Self>, done: DoneCallback) {
        (*self)(done)
    }
}

/// Controls when creation tasks run
pub trait CreateLimiter: Send + Sync {
    /// Run `task` now or queue it for a later dispatch
    fn submit(&self, task: Box<dyn CreateTask>);

    /// Change the delay between dispatches, clamped into the configured bounds
    fn set_period(&self, period: Duration);

    /// Back off after a failure signal
    fn increment_period(&self);

    /// Drain every task that has not been dispatched yet
    fn cancel_pending_tasks(&self) -> Vec<Box<dyn CreateTask>>;
}

/// Limiter that runs every task immediately on the submitting thread
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCreateLimiter;

impl CreateLimiter for NoopCreateLimiter {
    fn submit(&self, task: Box<dyn CreateTask>) {
        task.run(DoneCallback::noop());
    }

    fn set_period(&self, _period: Duration) {}

    fn increment_period(&self) {}

    fn cancel_pending_tasks(&self) -> Vec<Box<dyn CreateTask>> {
        Vec::new()
    }
}

struct Scheduled {
    ticket: u64,
    armed_at: Instant,
    handle: JoinHandle<()>,
}

struct LimiterState {
    pending: VecDeque<Box<dyn CreateTask>>,
    running: usize,
    period: Duration,
    scheduled: Option<Scheduled>,
    next_ticket: u64,
}

struct LimiterShared {
    config: LimiterConfiguration,
    runtime: Handle,
    state: Mutex<LimiterState>,
}

impl Drop for LimiterShared {
    fn drop(&mut self) {
        if let Some(scheduled) = self.state.get_mut().scheduled.take() {
            scheduled.handle.abort();
        }
    }
}

impl LimiterShared {
    fn clamp(&self, period: Duration) -> Duration {
        period.clamp(self.config.min_period, self.config.max_period)
    }

    /// Arm a dispatch after `delay` if there is queued work, spare capacity
    /// and nothing armed yet. Caller holds the state lock.
    fn schedule(self: &Arc<Self>, state: &mut LimiterState, delay: Duration) {
        if state.scheduled.is_some()
            || state.pending.is_empty()
            || state.running >= self.config.max_concurrent_creations
        {
            return;
        }

        let ticket = state.next_ticket;
        state.next_ticket = state.next_ticket.wrapping_add(1);
        let shared = Arc::downgrade(self);
        let handle = self.runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Some(shared) = shared.upgrade() {
                shared.dispatch(ticket);
            }
        });
        state.scheduled = Some(Scheduled {
            ticket,
            armed_at: Instant::now(),
            handle,
        });
    }

    fn dispatch(self: &Arc<Self>, ticket: u64) {
        let task = {
            let mut state = self.state.lock();
            match &state.scheduled {
                Some(scheduled) if scheduled.ticket == ticket => {}
                // Superseded by a reschedule.
                _ => return,
            }
            state.scheduled = None;

            let task = if state.running < self.config.max_concurrent_creations {
                state.pending.pop_front()
            } else {
                None
            };
            if task.is_some() {
                state.running += 1;
            }
            let period = state.period;
            self.schedule(&mut state, period);
            task
        };

        if let Some(task) = task {
            task.run(self.done_callback());
        }
    }

    fn done_callback(self: &Arc<Self>) -> DoneCallback {
        let shared = Arc::downgrade(self);
        DoneCallback::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.task_finished();
            }
        })
    }

    fn task_finished(self: &Arc<Self>) {
        let mut state = self.state.lock();
        state.running = state.running.saturating_sub(1);
        let period = state.period;
        self.schedule(&mut state, period);
    }
}

/// Limiter bounding concurrent creations with an adaptive dispatch delay
///
/// While the period is zero and capacity remains, submitted tasks run
/// immediately on the submitting thread. Otherwise they queue and are
/// dispatched one at a time, `period` apart, on the tokio runtime.
///
/// # Examples
///
/// ```
/// use async_objectpool::{CreateLimiter, DoneCallback, LimiterConfiguration, SimpleCreateLimiter};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let limiter = SimpleCreateLimiter::new(
///     LimiterConfiguration::new().with_max_concurrent_creations(1),
///     tokio::runtime::Handle::current(),
/// );
///
/// limiter.submit(Box::new(|done: DoneCallback| done.done()));
/// assert_eq!(limiter.running_tasks(), 0);
///
/// limiter.increment_period();
/// assert_eq!(limiter.period(), Duration::from_millis(10));
/// # }
/// ```
pub struct SimpleCreateLimiter {
    shared: Arc<LimiterShared>,
}

impl fmt::Debug for SimpleCreateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("SimpleCreateLimiter")
            .field("pending", &state.pending.len())
            .field("running", &state.running)
            .field("period", &state.period)
            .field("scheduled", &state.scheduled.is_some())
            .finish()
    }
}

impl SimpleCreateLimiter {
    /// Create a limiter whose delayed dispatches run on `runtime`
    pub fn new(config: LimiterConfiguration, runtime: Handle) -> Self {
        let period = config.min_period;
        Self {
            shared: Arc::new(LimiterShared {
                config,
                runtime,
                state: Mutex::new(LimiterState {
                    pending: VecDeque::new(),
                    running: 0,
                    period,
                    scheduled: None,
                    next_ticket: 0,
                }),
            }),
        }
    }

    /// Current delay between dispatches
    pub fn period(&self) -> Duration {
        self.shared.state.lock().period
    }

    /// Tasks dispatched and not yet done
    pub fn running_tasks(&self) -> usize {
        self.shared.state.lock().running
    }

    /// Tasks waiting for a dispatch
    pub fn pending_tasks(&self) -> usize {
        self.shared.state.lock().pending.len()
    }
}

impl CreateLimiter for SimpleCreateLimiter {
    fn submit(&self, task: Box<dyn CreateTask>) {
        let shared = &self.shared;
        let run_now = {
            let mut state = shared.state.lock();
            if state.period.is_zero()
                && state.pending.is_empty()
                && state.running < shared.config.max_concurrent_creations
            {
                state.running += 1;
                Some(task)
            } else {
                state.pending.push_back(task);
                let period = state.period;
                shared.schedule(&mut state, period);
                None
            }
        };

        if let Some(task) = run_now {
            task.run(shared.done_callback());
        }
    }

    fn set_period(&self, period: Duration) {
        let shared = &self.shared;
        let period = shared.clamp(period);
        let mut state = shared.state.lock();
        if period == state.period {
            return;
        }
        state.period = period;
        if state.pending.is_empty() {
            return;
        }

        // Keep the time already waited instead of restarting the full delay.
        let delay = match state.scheduled.take() {
            Some(scheduled) => {
                scheduled.handle.abort();
                period.saturating_sub(scheduled.armed_at.elapsed())
            }
            None => period,
        };
        shared.schedule(&mut state, delay);
    }

    fn increment_period(&self) {
        let shared = &self.shared;
        let current = shared.state.lock().period;
        let next = if current.is_zero() {
            shared.config.initial_backoff
        } else {
            current.saturating_mul(2)
        };
        self.set_period(next);
    }

    fn cancel_pending_tasks(&self) -> Vec<Box<dyn CreateTask>> {
        let mut state = self.shared.state.lock();
        if let Some(scheduled) = state.scheduled.take() {
            scheduled.handle.abort();
        }
        state.pending.drain(..).collect()
    }
}
