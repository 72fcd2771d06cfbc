/*!
# Compute Scheduler

A pool of worker threads executing the shared compute kernel over serialized
graph payloads. Tasks flow through a FIFO crossbeam channel to the next free
worker; each task owns an event channel carrying an ordered progress stream
followed by exactly one terminal event.

Cancellation is cooperative: algorithms check their task context at every
outer-loop boundary. When a deadline elapses the submitter sets the cancel
flag; a task that does not stop within the grace period is abandoned, a
replacement worker is spawned, and the abandonment counts toward the pool's
failure budget. Too many failures within the window put the pool into a
degraded state that refuses new tasks until an operator resets it.

Small graphs run inline on the caller's thread with the identical external
contract (buffered progress events, terminal event last).
*/

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use tracing::{debug, warn};

use crate::core::error::Error;
use crate::core::kernel::{Algorithm, TaskOutput, execute};
use crate::core::serialization::GraphPayload;

/// Unique identifier of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Events delivered to the submitter, ordered within a task; the terminal
/// event (`Completed` or `Failed`) is always last.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    Progress(f64),
    Completed(TaskOutput),
    Failed(Error),
}

/// Execution context handed to every algorithm: cancellation flag, deadline,
/// and the progress sink. Algorithms call [`TaskContext::checkpoint`] at each
/// outer-loop boundary and [`TaskContext::progress`] at their own cadence.
pub struct TaskContext {
    cancel: Arc<AtomicBool>,
    deadline: Option<Instant>,
    started: Instant,
    events: Option<Sender<TaskEvent>>,
    // Bit pattern of the highest fraction reported so far; keeps the
    // delivered stream monotonically non-decreasing.
    last_progress: AtomicU64,
}

impl TaskContext {
    fn new(cancel: Arc<AtomicBool>, deadline: Option<Instant>, events: Option<Sender<TaskEvent>>) -> Self {
        Self {
            cancel,
            deadline,
            started: Instant::now(),
            events,
            last_progress: AtomicU64::new(0.0f64.to_bits()),
        }
    }

    /// A context that is never cancelled, has no deadline, and drops
    /// progress. Useful for direct library calls and tests.
    pub fn detached() -> Self {
        Self::new(Arc::new(AtomicBool::new(false)), None, None)
    }

    /// Returns `Err` when the deadline has elapsed or cancellation was
    /// requested. Algorithms propagate the error to stop cooperatively.
    pub fn checkpoint(&self) -> Result<(), Error> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::TimedOut {
                    elapsed_ms: self.started.elapsed().as_millis() as u64,
                });
            }
        }
        if self.cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Reports completion fraction in `[0, 1]`. Regressions are dropped so
    /// the stream stays monotone; values above 1 are clamped.
    pub fn progress(&self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        let last = f64::from_bits(self.last_progress.load(Ordering::Relaxed));
        if fraction < last {
            return;
        }
        self.last_progress.store(fraction.to_bits(), Ordering::Relaxed);
        if let Some(events) = &self.events {
            let _ = events.send(TaskEvent::Progress(fraction));
        }
    }
}

struct QueuedTask {
    id: TaskId,
    algorithm: Algorithm,
    payload: GraphPayload,
    events: Sender<TaskEvent>,
    cancel: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

struct PoolShared {
    queue_rx: Receiver<QueuedTask>,
    failures: Mutex<VecDeque<Instant>>,
    degraded: AtomicBool,
    failure_limit: usize,
    failure_window: Duration,
    worker_seq: AtomicU64,
}

impl PoolShared {
    /// Records a worker failure; trips the degraded state when the budget
    /// for the sliding window is exhausted.
    fn record_failure(&self) {
        let now = Instant::now();
        let mut failures = self.failures.lock().unwrap();
        failures.push_back(now);
        while let Some(&front) = failures.front() {
            if now.duration_since(front) > self.failure_window {
                failures.pop_front();
            } else {
                break;
            }
        }
        if failures.len() > self.failure_limit {
            self.degraded.store(true, Ordering::Relaxed);
            warn!(
                failures = failures.len(),
                "worker failure budget exhausted, pool degraded"
            );
        }
    }

    fn spawn_worker(self: &Arc<Self>) -> bool {
        let shared = Arc::clone(self);
        let id = self.worker_seq.fetch_add(1, Ordering::Relaxed);
        thread::Builder::new()
            .name(format!("netrics-worker-{}", id))
            .spawn(move || worker_loop(shared, id))
            .is_ok()
    }
}

fn run_task(algorithm: &Algorithm, payload: &GraphPayload, ctx: &TaskContext) -> Result<TaskOutput, Error> {
    let graph = payload.into_graph()?;
    execute(algorithm, &graph, ctx)
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

fn worker_loop(shared: Arc<PoolShared>, worker_id: u64) {
    while let Ok(task) = shared.queue_rx.recv() {
        let QueuedTask {
            id,
            algorithm,
            payload,
            events,
            cancel,
            deadline,
        } = task;

        if cancel.load(Ordering::Relaxed) {
            let _ = events.send(TaskEvent::Failed(Error::Cancelled));
            continue;
        }

        debug!(worker = worker_id, task = %id, algorithm = algorithm.label(), "task started");
        let ctx = TaskContext::new(cancel, deadline, Some(events.clone()));
        ctx.progress(0.0);
        match catch_unwind(AssertUnwindSafe(|| run_task(&algorithm, &payload, &ctx))) {
            Ok(Ok(output)) => {
                ctx.progress(1.0);
                let _ = events.send(TaskEvent::Completed(output));
            }
            Ok(Err(err)) => {
                debug!(worker = worker_id, task = %id, error = %err, "task failed");
                let _ = events.send(TaskEvent::Failed(err));
            }
            Err(panic) => {
                let message = panic_message(panic);
                warn!(worker = worker_id, task = %id, cause = %message, "worker crashed, spawning replacement");
                shared.record_failure();
                let _ = events.send(TaskEvent::Failed(Error::worker_crash(message)));
                // The crashed worker retires; a replacement takes its slot.
                shared.spawn_worker();
                return;
            }
        }
    }
}

/// Pool configuration. Defaults follow the engine-wide conventions: one
/// worker per logical CPU, a 500-node inline threshold, a 60-second task
/// deadline with a 2-second cancellation grace, and a restart budget of
/// 5 failures per minute.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub max_workers: Option<usize>,
    pub small_threshold: usize,
    pub default_timeout: Option<Duration>,
    pub grace: Duration,
    pub failure_limit: usize,
    pub failure_window: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            small_threshold: 500,
            default_timeout: Some(Duration::from_millis(60_000)),
            grace: Duration::from_secs(2),
            failure_limit: 5,
            failure_window: Duration::from_secs(60),
        }
    }
}

/// Handle to a submitted task: an ordered event stream plus cancellation.
pub struct TaskHandle {
    id: TaskId,
    events: Receiver<TaskEvent>,
    cancel: Arc<AtomicBool>,
    deadline: Option<Instant>,
    grace: Duration,
    submitted: Instant,
    shared: Option<Arc<PoolShared>>,
    terminal: Option<Result<TaskOutput, Error>>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Requests cooperative cancellation. A task that already produced its
    /// result still completes successfully.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Receives the next event, blocking up to `timeout`. Terminal events
    /// are also cached so a later [`TaskHandle::join`] returns them again.
    pub fn recv_event(&mut self, timeout: Duration) -> Option<TaskEvent> {
        if self.terminal.is_some() {
            return None;
        }
        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                match &event {
                    TaskEvent::Completed(output) => self.terminal = Some(Ok(output.clone())),
                    TaskEvent::Failed(err) => self.terminal = Some(Err(err.clone())),
                    TaskEvent::Progress(_) => {}
                }
                Some(event)
            }
            Err(_) => None,
        }
    }

    /// Waits for the terminal event, enforcing the task deadline and the
    /// cancellation grace period. An unresponsive task is abandoned: its
    /// worker slot is replaced and the abandonment counts as a failure.
    pub fn join(mut self) -> Result<TaskOutput, Error> {
        if let Some(terminal) = self.terminal.take() {
            return terminal;
        }

        // Until the deadline (or forever, by heartbeat, when there is none).
        loop {
            let timeout = match self.deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(left) => left,
                    None => break,
                },
                None => Duration::from_secs(60),
            };
            match self.events.recv_timeout(timeout) {
                Ok(TaskEvent::Progress(_)) => {}
                Ok(TaskEvent::Completed(output)) => return Ok(output),
                Ok(TaskEvent::Failed(err)) => return Err(err),
                Err(RecvTimeoutError::Timeout) => {
                    if self.deadline.is_some() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::worker_crash("event channel closed before terminal event"));
                }
            }
        }

        // Deadline elapsed: request a cooperative stop and grant the grace
        // period for the terminal event to arrive.
        self.cancel.store(true, Ordering::Relaxed);
        let grace_end = Instant::now() + self.grace;
        loop {
            let left = match grace_end.checked_duration_since(Instant::now()) {
                Some(left) => left,
                None => break,
            };
            match self.events.recv_timeout(left) {
                Ok(TaskEvent::Progress(_)) => {}
                // Terminal within grace: the kernel observed the deadline or
                // flag itself, or finished right at the wire.
                Ok(TaskEvent::Completed(output)) => return Ok(output),
                Ok(TaskEvent::Failed(err)) => return Err(err),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::worker_crash("event channel closed before terminal event"));
                }
            }
        }

        if let Some(shared) = &self.shared {
            warn!(task = %self.id, "task unresponsive past grace period, abandoning worker");
            shared.record_failure();
            if !shared.degraded.load(Ordering::Relaxed) {
                shared.spawn_worker();
            }
        }
        Err(Error::TimedOut {
            elapsed_ms: self.submitted.elapsed().as_millis() as u64,
        })
    }
}

/// The worker pool. Submitting returns a [`TaskHandle`]; dropping the
/// scheduler closes the queue and lets idle workers exit.
pub struct Scheduler {
    queue_tx: Sender<QueuedTask>,
    shared: Arc<PoolShared>,
    config: SchedulerConfig,
    next_task: AtomicU64,
    pool_size: usize,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let (queue_tx, queue_rx) = unbounded();
        let shared = Arc::new(PoolShared {
            queue_rx,
            failures: Mutex::new(VecDeque::new()),
            degraded: AtomicBool::new(false),
            failure_limit: config.failure_limit,
            failure_window: config.failure_window,
            worker_seq: AtomicU64::new(0),
        });

        let requested = config.max_workers.unwrap_or_else(|| {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        });
        let requested = requested.max(1);

        let mut pool_size = 0;
        for _ in 0..requested {
            if shared.spawn_worker() {
                pool_size += 1;
            }
        }
        debug!(workers = pool_size, "scheduler started");

        Self {
            queue_tx,
            shared,
            config,
            next_task: AtomicU64::new(0),
            pool_size,
        }
    }

    /// Submits a task with the pool's default deadline.
    pub fn submit(&self, algorithm: Algorithm, payload: GraphPayload) -> Result<TaskHandle, Error> {
        self.submit_with(algorithm, payload, self.config.default_timeout)
    }

    /// Submits a task with an explicit deadline (`None` disables it).
    ///
    /// Graphs below the small threshold (and every graph when no worker
    /// could be spawned) execute synchronously on the caller's thread; the
    /// returned handle behaves identically, with all events buffered.
    pub fn submit_with(
        &self,
        algorithm: Algorithm,
        payload: GraphPayload,
        timeout: Option<Duration>,
    ) -> Result<TaskHandle, Error> {
        if self.shared.degraded.load(Ordering::Relaxed) {
            return Err(Error::pool_exhausted(
                "pool degraded after repeated worker failures; reset required",
            ));
        }

        let id = TaskId(self.next_task.fetch_add(1, Ordering::Relaxed));
        let (events_tx, events_rx) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let deadline = timeout.map(|t| Instant::now() + t);
        let submitted = Instant::now();

        let inline = payload.node_count() < self.config.small_threshold || self.pool_size == 0;
        if inline {
            debug!(task = %id, algorithm = algorithm.label(), "executing inline");
            let terminal_tx = events_tx.clone();
            let ctx = TaskContext::new(Arc::clone(&cancel), deadline, Some(events_tx));
            ctx.progress(0.0);
            match catch_unwind(AssertUnwindSafe(|| run_task(&algorithm, &payload, &ctx))) {
                Ok(Ok(output)) => {
                    ctx.progress(1.0);
                    let _ = terminal_tx.send(TaskEvent::Completed(output));
                }
                Ok(Err(err)) => {
                    let _ = terminal_tx.send(TaskEvent::Failed(err));
                }
                Err(panic) => {
                    let message = panic_message(panic);
                    let _ = terminal_tx.send(TaskEvent::Failed(Error::worker_crash(message)));
                }
            }
            return Ok(TaskHandle {
                id,
                events: events_rx,
                cancel,
                deadline,
                grace: self.config.grace,
                submitted,
                shared: None,
                terminal: None,
            });
        }

        self.queue_tx
            .send(QueuedTask {
                id,
                algorithm,
                payload,
                events: events_tx,
                cancel: Arc::clone(&cancel),
                deadline,
            })
            .map_err(|_| Error::pool_exhausted("task queue closed"))?;

        Ok(TaskHandle {
            id,
            events: events_rx,
            cancel,
            deadline,
            grace: self.config.grace,
            submitted,
            shared: Some(Arc::clone(&self.shared)),
            terminal: None,
        })
    }

    /// True once the failure budget is exhausted and submissions are refused.
    pub fn is_degraded(&self) -> bool {
        self.shared.degraded.load(Ordering::Relaxed)
    }

    /// Operator reset: clears the failure history and accepts tasks again.
    pub fn reset(&self) {
        self.shared.failures.lock().unwrap().clear();
        self.shared.degraded.store(false, Ordering::Relaxed);
    }

    /// Number of workers that actually started.
    pub fn workers(&self) -> usize {
        self.pool_size
    }
}
