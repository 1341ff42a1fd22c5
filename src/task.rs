//! Background execution for digest and comparison jobs.
//!
//! Every job runs on its own blocking worker. Progress and the final result
//! travel back over one unbounded channel and are drained by the interactive
//! loop with [`Executor::poll`], so the loop never waits on a worker and a
//! worker never waits on the loop.
//!
//! Each job is tagged with a [`TaskId`] and aimed at a [`Sink`]. Starting a new
//! job for a sink supersedes the previous one: anything the old job still sends
//! is dropped on arrival.

use std::collections::HashMap;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::digest::{DigestResult, Verdict};

/// Display targets that receive progress and results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sink {
    Digest,
    Compare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Lifecycle of the latest invocation for a sink. There is no cancelled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Job output that can tell whether it represents a failure
pub trait Outcome: Send + 'static {
    fn is_failure(&self) -> bool;
}

impl<T: Send + 'static, E: Send + 'static> Outcome for Result<T, E> {
    fn is_failure(&self) -> bool {
        self.is_err()
    }
}

impl Outcome for Verdict {
    fn is_failure(&self) -> bool {
        matches!(self, Verdict::Aborted(_) | Verdict::InvalidInput(_))
    }
}

/// Output of any job the frontends run
#[derive(Debug)]
pub enum JobOutput {
    Digest(DigestResult),
    Verdict(Verdict),
}

impl Outcome for JobOutput {
    fn is_failure(&self) -> bool {
        match self {
            JobOutput::Digest(result) => result.is_failure(),
            JobOutput::Verdict(verdict) => verdict.is_failure(),
        }
    }
}

#[derive(Debug)]
pub enum Update<T> {
    Progress(f64),
    Finished(T),
    /// The worker panicked before producing an output
    Failed(String),
}

#[derive(Debug)]
pub struct Delivery<T> {
    pub sink: Sink,
    pub task: TaskId,
    pub update: Update<T>,
}

/// Handed to a job so it can post progress without blocking
pub struct ProgressReporter<T> {
    sink: Sink,
    task: TaskId,
    tx: UnboundedSender<Delivery<T>>,
    last: Option<f64>,
}

impl<T> ProgressReporter<T> {
    /// Post a progress value. Values lower than the last one posted are
    /// dropped so the receiver only ever sees a non-decreasing sequence.
    pub fn report(&mut self, percent: f64) {
        if matches!(self.last, Some(last) if percent <= last) {
            return;
        }
        self.last = Some(percent);
        // Receiver gone means the app is shutting down
        let _ = self.tx.send(Delivery {
            sink: self.sink,
            task: self.task,
            update: Update::Progress(percent),
        });
    }
}

pub struct Executor<T> {
    tx: UnboundedSender<Delivery<T>>,
    rx: UnboundedReceiver<Delivery<T>>,
    next_id: u64,
    latest: HashMap<Sink, TaskId>,
    states: HashMap<Sink, TaskState>,
}

impl<T: Outcome> Executor<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            next_id: 0,
            latest: HashMap::new(),
            states: HashMap::new(),
        }
    }

    /// Run `job` on a fresh blocking worker and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&mut self, sink: Sink, job: F) -> TaskId
    where
        F: FnOnce(&mut ProgressReporter<T>) -> T + Send + 'static,
    {
        self.next_id += 1;
        let task = TaskId(self.next_id);
        if let Some(previous) = self.latest.insert(sink, task) {
            tracing::debug!(?sink, superseded = previous.0, "replacing in-flight task");
        }
        self.states.insert(sink, TaskState::Running);

        let mut reporter = ProgressReporter {
            sink,
            task,
            tx: self.tx.clone(),
            last: None,
        };
        let worker = tokio::task::spawn_blocking(move || job(&mut reporter));

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let update = match worker.await {
                Ok(output) => Update::Finished(output),
                Err(e) => Update::Failed(e.to_string()),
            };
            let _ = tx.send(Delivery { sink, task, update });
        });

        tracing::debug!(?sink, task = task.0, "task spawned");
        task
    }

    /// Drain everything that has arrived so far without waiting.
    /// Deliveries from superseded tasks are discarded.
    pub fn poll(&mut self) -> Vec<Delivery<T>> {
        let mut delivered = Vec::new();
        while let Ok(delivery) = self.rx.try_recv() {
            if let Some(delivery) = self.accept(delivery) {
                delivered.push(delivery);
            }
        }
        delivered
    }

    /// Wait for the next current delivery. Only useful while a task is
    /// running; the executor holds a sender, so this never returns `None`
    /// on its own.
    pub async fn next(&mut self) -> Option<Delivery<T>> {
        loop {
            let delivery = self.rx.recv().await?;
            if let Some(delivery) = self.accept(delivery) {
                return Some(delivery);
            }
        }
    }

    /// Forget the latest task for `sink` and return it to `Idle`. Anything the
    /// task still sends is dropped like any other stale delivery.
    pub fn discard(&mut self, sink: Sink) {
        if let Some(task) = self.latest.remove(&sink) {
            tracing::debug!(?sink, task = task.0, "discarding task");
        }
        self.states.remove(&sink);
    }

    pub fn state(&self, sink: Sink) -> TaskState {
        self.states.get(&sink).copied().unwrap_or_default()
    }

    pub fn is_running(&self, sink: Sink) -> bool {
        self.state(sink) == TaskState::Running
    }

    pub fn latest(&self, sink: Sink) -> Option<TaskId> {
        self.latest.get(&sink).copied()
    }

    fn accept(&mut self, delivery: Delivery<T>) -> Option<Delivery<T>> {
        if self.latest.get(&delivery.sink) != Some(&delivery.task) {
            tracing::debug!(sink = ?delivery.sink, task = delivery.task.0, "dropping stale delivery");
            return None;
        }
        let finished = match &delivery.update {
            Update::Progress(_) => None,
            Update::Finished(output) if output.is_failure() => Some(TaskState::Failed),
            Update::Finished(_) => Some(TaskState::Completed),
            Update::Failed(reason) => {
                tracing::error!(sink = ?delivery.sink, task = delivery.task.0, %reason, "worker panicked");
                Some(TaskState::Failed)
            }
        };
        if let Some(state) = finished {
            self.states.insert(delivery.sink, state);
        }
        Some(delivery)
    }
}

impl<T: Outcome> Default for Executor<T> {
    fn default() -> Self {
        Self::new()
    }
}
