//! In-process FIFO executor with single-flight semantics.
//!
//! Every computation handed to [`SequentialQueue::enqueue`] runs alone: the
//! drain task pops the head, runs it to completion (or failure) and only then
//! looks at the next entry. Callers from any number of concurrent requests
//! get their own result back through a [`Ticket`].
//!
//! # Invariants
//! - Tasks start in submission order.
//! - At most one task runs at any instant.
//! - A failing or panicking task only affects its own caller.
mod error;
pub use error::QueueError;

mod id;
pub use id::make_task_id;

use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
    time::Instant,
};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Entry waiting in the FIFO.
struct Envelope {
    task: String,
    enqueued_at: Instant,
    job: Job,
}

/// Handle to the process-wide sequential queue.
///
/// Cheap to clone; all clones feed the same drain task. The drain task stops
/// once every handle is dropped.
#[derive(Clone)]
pub struct SequentialQueue {
    tx: mpsc::UnboundedSender<Envelope>,
    pending: Arc<AtomicUsize>,
}

impl SequentialQueue {
    /// Create the queue and start its drain task on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(drain(rx, Arc::clone(&pending)));
        Self { tx, pending }
    }

    /// Append a computation to the FIFO and return immediately.
    ///
    /// The computation is not polled until every task submitted before it
    /// has finished. The returned [`Ticket`] resolves to its output.
    pub fn enqueue<F, Fut, T>(&self, task: impl Into<String>, f: F) -> Ticket<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let task = task.into();
        let (result_tx, result_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let out = f().await;
            // Caller may have stopped waiting; the result is simply dropped then.
            let _ = result_tx.send(out);
        });

        self.pending.fetch_add(1, Ordering::SeqCst);
        let envelope = Envelope {
            task: task.clone(),
            enqueued_at: Instant::now(),
            job,
        };

        if self.tx.send(envelope).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!(task = %task, "sequential queue is closed");
            return Ticket {
                task,
                rx: result_rx,
                closed: true,
            };
        }

        trace!(task = %task, pending = self.len(), "task enqueued");
        Ticket {
            task,
            rx: result_rx,
            closed: false,
        }
    }

    /// Number of tasks waiting to start.
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Returns `true` when no task is waiting to start.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SequentialQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SequentialQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialQueue")
            .field("pending", &self.len())
            .finish()
    }
}

/// Single drain loop: pop head, run to completion, repeat.
async fn drain(mut rx: mpsc::UnboundedReceiver<Envelope>, pending: Arc<AtomicUsize>) {
    while let Some(Envelope {
        task,
        enqueued_at,
        job,
    }) = rx.recv().await
    {
        pending.fetch_sub(1, Ordering::SeqCst);
        trace!(
            task = %task,
            waited_ms = enqueued_at.elapsed().as_millis() as u64,
            "task starting"
        );

        // Own tokio task so a panic is contained and reported to the caller only.
        match tokio::spawn(job).await {
            Ok(()) => trace!(task = %task, "task finished"),
            Err(e) => warn!(task = %task, error = %e, "task aborted"),
        }
    }
    debug!("sequential queue drained and closed");
}

/// Pending result of an enqueued computation.
#[must_use = "a ticket does nothing unless awaited"]
pub struct Ticket<T> {
    task: String,
    rx: oneshot::Receiver<T>,
    closed: bool,
}

impl<T> Ticket<T> {
    /// Identifier of the queued task.
    pub fn task(&self) -> &str {
        &self.task
    }
}

impl<T> Future for Ticket<T> {
    type Output = Result<T, QueueError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.closed {
            return Poll::Ready(Err(QueueError::Closed {
                task: self.task.clone(),
            }));
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(out)) => Poll::Ready(Ok(out)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(QueueError::Aborted {
                task: self.task.clone(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}
