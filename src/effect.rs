//! Effects boundary: declared commands and the executor that runs them.
//!
//! Pure transitions never perform I/O. They return [`Command`]s describing
//! what should happen; the executor runs each [`EffectRequest`] on its own
//! worker thread and hands exactly one result back to the control loop
//! through the inbound channel.
//!
//! Delivery is guarded twice:
//! - the worker only enqueues while the handle is still pending, under the
//!   handle's lock, so a cancel that wins the lock means nothing is enqueued;
//! - the control loop admits a dequeued result through [`EffectExecutor::settle`],
//!   which refuses results cancelled after they were enqueued.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use crate::fetch::{fetch, FetchError, HttpResponse};

// ============================================================================
// HANDLES
// ============================================================================

static NEXT_EFFECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one issued effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u64);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an effect is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// Work is running (or about to).
    Pending,
    /// Result sits in the inbound queue, not yet admitted.
    Enqueued,
    /// Cancelled before admission. Terminal.
    Cancelled,
    /// Result admitted by the control loop. Terminal.
    Settled,
}

/// Token referencing an in-flight effect.
///
/// Clones share state: the module keeps one, the executor another, the
/// worker a third. Cancelling through any of them is seen by all.
#[derive(Clone)]
pub struct EffectHandle {
    id: EffectId,
    state: Arc<Mutex<Resolution>>,
}

impl EffectHandle {
    pub(crate) fn new() -> Self {
        EffectHandle {
            id: EffectId(NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed)),
            state: Arc::new(Mutex::new(Resolution::Pending)),
        }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Cancel the effect. Returns true only for the call that actually
    /// cancelled it; later calls, or calls after settlement, are no-ops.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        match *state {
            Resolution::Pending | Resolution::Enqueued => {
                *state = Resolution::Cancelled;
                true
            }
            Resolution::Cancelled | Resolution::Settled => false,
        }
    }

    /// Cooperative checkpoint for long-running work.
    pub fn is_cancelled(&self) -> bool {
        *self.lock() == Resolution::Cancelled
    }

    /// True until the result is admitted or the effect is cancelled.
    pub fn is_live(&self) -> bool {
        matches!(*self.lock(), Resolution::Pending | Resolution::Enqueued)
    }

    /// Run `send` while holding the lock, only if still pending.
    fn enqueue_with(&self, send: impl FnOnce() -> bool) -> bool {
        let mut state = self.lock();
        if *state != Resolution::Pending {
            return false;
        }
        if send() {
            *state = Resolution::Enqueued;
            true
        } else {
            false
        }
    }

    fn settle(&self) -> bool {
        let mut state = self.lock();
        if *state == Resolution::Enqueued {
            *state = Resolution::Settled;
            true
        } else {
            false
        }
    }

    fn lock(&self) -> MutexGuard<'_, Resolution> {
        // The guarded value is a plain enum; a poisoned lock still holds a valid one.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PartialEq for EffectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EffectHandle {}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHandle")
            .field("id", &self.id)
            .field("state", &*self.lock())
            .finish()
    }
}

// ============================================================================
// REQUESTS
// ============================================================================

/// What an effect does, for logging and for tests to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectKind {
    /// Unparameterized GET against one URL.
    HttpGet { url: String },
    /// Arbitrary blocking work.
    Task { name: &'static str },
}

type Work<M> = Box<dyn FnOnce(&EffectHandle) -> M + Send>;

/// A described, not yet running, asynchronous operation.
///
/// The work closure already contains the completion constructor, so running
/// it yields the message to deliver.
pub struct EffectRequest<M> {
    kind: EffectKind,
    handle: EffectHandle,
    work: Work<M>,
}

impl<M: Send + 'static> EffectRequest<M> {
    /// A GET whose response (or failure) is turned into a message by `on_complete`.
    pub fn http_get(
        url: impl Into<String>,
        on_complete: fn(Result<HttpResponse, FetchError>) -> M,
    ) -> Self {
        let url = url.into();
        let target = url.clone();
        EffectRequest {
            kind: EffectKind::HttpGet { url },
            handle: EffectHandle::new(),
            work: Box::new(move |handle| on_complete(fetch(&target, handle))),
        }
    }

    /// Arbitrary blocking work. It may poll `is_cancelled` on the handle it
    /// receives to stop early.
    pub fn task(name: &'static str, work: impl FnOnce(&EffectHandle) -> M + Send + 'static) -> Self {
        EffectRequest {
            kind: EffectKind::Task { name },
            handle: EffectHandle::new(),
            work: Box::new(work),
        }
    }

    /// Lift the completion message into a parent message space.
    pub fn map<N: Send + 'static>(self, adapter: fn(M) -> N) -> EffectRequest<N> {
        let work = self.work;
        EffectRequest {
            kind: self.kind,
            handle: self.handle,
            work: Box::new(move |handle| adapter(work(handle))),
        }
    }
}

impl<M> EffectRequest<M> {
    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// The handle the issuing module keeps to cancel this effect later.
    pub fn handle(&self) -> EffectHandle {
        self.handle.clone()
    }
}

impl<M> fmt::Debug for EffectRequest<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRequest")
            .field("kind", &self.kind)
            .field("id", &self.handle.id)
            .finish()
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Side effect requested by a pure transition.
pub enum Command<M> {
    /// Start an effect off the control loop.
    Issue(EffectRequest<M>),
    /// Cancel a previously issued effect.
    Cancel(EffectHandle),
    /// Enqueue a message behind whatever is already pending.
    Post(M),
    /// Append a line to the shared activity log.
    Log(String),
}

impl<M: Send + 'static> Command<M> {
    /// Re-tag the command's messages with an explicit adapter.
    pub fn map<N: Send + 'static>(self, adapter: fn(M) -> N) -> Command<N> {
        match self {
            Command::Issue(request) => Command::Issue(request.map(adapter)),
            Command::Cancel(handle) => Command::Cancel(handle),
            Command::Post(message) => Command::Post(adapter(message)),
            Command::Log(line) => Command::Log(line),
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for Command<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Issue(request) => f.debug_tuple("Issue").field(request).finish(),
            Command::Cancel(handle) => f.debug_tuple("Cancel").field(&handle.id).finish(),
            Command::Post(message) => f.debug_tuple("Post").field(message).finish(),
            Command::Log(line) => f.debug_tuple("Log").field(line).finish(),
        }
    }
}

// ============================================================================
// EXECUTOR
// ============================================================================

/// What the executor puts on the inbound queue.
#[derive(Debug)]
pub enum Completion<M> {
    /// A message posted by a command; delivered unconditionally.
    Post(M),
    /// An effect result; admit through [`EffectExecutor::settle`] first.
    Settled { id: EffectId, message: M },
}

/// Runs effects on worker threads and tracks the ones still live.
///
/// `E` is the control loop's inbound event type.
pub struct EffectExecutor<M, E> {
    inbox: Sender<E>,
    live: HashMap<EffectId, EffectHandle>,
    _message: std::marker::PhantomData<fn(M)>,
}

impl<M, E> EffectExecutor<M, E>
where
    M: Send + 'static,
    E: From<Completion<M>> + Send + 'static,
{
    pub fn new(inbox: Sender<E>) -> Self {
        EffectExecutor {
            inbox,
            live: HashMap::new(),
            _message: std::marker::PhantomData,
        }
    }

    /// Start the effect on a worker thread and return its handle at once.
    pub fn issue(&mut self, request: EffectRequest<M>) -> EffectHandle {
        let EffectRequest { kind, handle, work } = request;
        let id = handle.id;
        tracing::debug!(id = %id, ?kind, "issuing effect");
        self.live.insert(id, handle.clone());

        let worker_handle = handle.clone();
        let inbox = self.inbox.clone();
        thread::spawn(move || {
            let message = work(&worker_handle);
            let enqueued = worker_handle.enqueue_with(|| {
                inbox
                    .send(E::from(Completion::Settled { id, message }))
                    .is_ok()
            });
            if !enqueued {
                tracing::debug!(id = %id, "effect result discarded");
            }
        });

        handle
    }

    /// Cancel an effect. Cancelling twice, or after its result was admitted,
    /// does nothing.
    pub fn cancel(&mut self, handle: &EffectHandle) -> bool {
        self.live.remove(&handle.id);
        let cancelled = handle.cancel();
        if cancelled {
            tracing::debug!(id = %handle.id, "effect cancelled");
        }
        cancelled
    }

    /// Admit a dequeued result. False means it was cancelled (or already
    /// admitted) and must be dropped.
    pub fn settle(&mut self, id: EffectId) -> bool {
        let admitted = self
            .live
            .remove(&id)
            .is_some_and(|handle| handle.settle());
        if !admitted {
            tracing::debug!(id = %id, "dropping stale effect result");
        }
        admitted
    }

    /// Carry out one command.
    pub fn perform(&mut self, command: Command<M>) {
        match command {
            Command::Issue(request) => {
                self.issue(request);
            }
            Command::Cancel(handle) => {
                self.cancel(&handle);
            }
            Command::Post(message) => {
                // Receiver gone means the loop is shutting down.
                let _ = self.inbox.send(E::from(Completion::Post(message)));
            }
            Command::Log(line) => {
                tracing::info!(%line, "unrouted log command");
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Cancel everything still in flight.
    pub fn shutdown(&mut self) {
        for (_, handle) in self.live.drain() {
            handle.cancel();
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
