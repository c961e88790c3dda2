//! Fix acquisition state machine.
//!
//! Resolves the device position through a layered fallback: the provider's
//! cached fix first, then a live subscription raced against a deadline.
//!
//! # State Transitions
//!
//! ```text
//! Idle
//!     ↓ (acquire)
//! CheckingPermission ──(denied)──→ Failed(PermissionDenied)
//!     ↓
//! FetchingCached ──(cached fix)──→ Resolved(Cached)
//!     ↓ (nothing cached)
//! RequestingLive ──(first update)──→ Resolved(Live)
//!                ──(deadline)──────→ Failed(Timeout)
//!                ──(provider fault)→ Failed(SecurityError | ProviderUnavailable)
//! ```
//!
//! `cancel()` returns any state to `Idle` without invoking the callback.
//!
//! # Single in-flight request
//!
//! The resolver owns at most one [`AcquisitionRequest`] holding the caller's
//! callback, the live subscription and the deadline timer. Starting a new
//! acquisition releases the previous request first. Every provider and timer
//! callback carries the generation of the request that armed it; events for
//! any other generation are dropped.
//!
//! Collaborators are always called with the internal lock released, so a
//! provider or timer may call back synchronously.
//!
//! # Cancellation
//!
//! A resolution being delivered on another thread holds off `cancel()` and
//! `destroy()` until its callback has returned. Once either returns, no
//! callback fires. A cancel issued from inside a callback does not wait.

use crate::error::{AcquisitionError, FailureReason};
use crate::permission::PermissionStore;
use crate::provider::{LocationProvider, SubscriptionId, UpdateCallback};
use crate::timer::{Timer, TimerHandle};
use geofix_core::{AcquisitionConfig, Fix, FixSource};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

/// Maximum number of state transitions to track in history.
const MAX_HISTORY_SIZE: usize = 64;

/// Caller-supplied completion for one acquisition.
pub type FixCallback = Box<dyn FnOnce(Result<Fix, AcquisitionError>) + Send>;

/// Acquisition state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolverState {
    /// No acquisition in progress
    Idle,
    /// Evaluating the permission gate
    CheckingPermission,
    /// Waiting for the provider's cached-fix completion
    FetchingCached,
    /// Subscribed to live updates with the deadline armed
    RequestingLive,
    /// Last acquisition produced a fix
    Resolved(Fix),
    /// Last acquisition failed
    Failed(FailureReason),
}

impl ResolverState {
    /// Whether an acquisition is waiting on an external event.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ResolverState::CheckingPermission
                | ResolverState::FetchingCached
                | ResolverState::RequestingLive
        )
    }

    /// Whether the state is terminal for an acquisition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolverState::Resolved(_) | ResolverState::Failed(_))
    }
}

/// Record of a state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Request generation that caused the transition (0 for none)
    pub generation: u64,
    /// Previous state
    pub from: ResolverState,
    /// New state
    pub to: ResolverState,
}

/// The single outstanding acquisition.
struct AcquisitionRequest {
    generation: u64,
    callback: FixCallback,
    subscription: Option<SubscriptionId>,
    timer: Option<TimerHandle>,
}

struct Inner {
    state: ResolverState,
    generation: u64,
    request: Option<AcquisitionRequest>,
    destroyed: bool,
    history: VecDeque<StateTransition>,
    /// Threads currently running teardown and a callback for a taken request
    delivering: Vec<ThreadId>,
}

impl Inner {
    fn set_state(&mut self, generation: u64, to: ResolverState) {
        if self.state == to {
            return;
        }
        debug!(generation, from = ?self.state, to = ?to, "fix resolver transition");
        if self.history.len() == MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        let from = std::mem::replace(&mut self.state, to.clone());
        self.history.push_back(StateTransition {
            generation,
            from,
            to,
        });
    }

    fn delivering_elsewhere(&self, thread: ThreadId) -> bool {
        !self.delivering.is_empty() && !self.delivering.contains(&thread)
    }

    fn current_mut(&mut self, generation: u64) -> Option<&mut AcquisitionRequest> {
        self.request
            .as_mut()
            .filter(|request| request.generation == generation)
    }
}

struct Shared {
    provider: Arc<dyn LocationProvider>,
    timer: Arc<dyn Timer>,
    permissions: Arc<dyn PermissionStore>,
    config: AcquisitionConfig,
    inner: Mutex<Inner>,
    delivered: Condvar,
}

/// Marks the current thread as delivering until dropped.
struct Delivery<'a> {
    shared: &'a Shared,
    thread: ThreadId,
}

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if let Some(pos) = inner.delivering.iter().position(|t| *t == self.thread) {
            inner.delivering.swap_remove(pos);
        }
        drop(inner);
        self.shared.delivered.notify_all();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a new request, releasing any previous one. Returns its generation.
    fn acquire(self: &Arc<Self>, callback: FixCallback) -> Option<u64> {
        let (previous, generation) = {
            let mut inner = self.lock();
            if inner.destroyed {
                drop(inner);
                warn!("acquire called on destroyed fix resolver");
                callback(Err(AcquisitionError::unavailable("fix resolver destroyed")));
                return None;
            }
            inner.generation += 1;
            let generation = inner.generation;
            let previous = inner.request.replace(AcquisitionRequest {
                generation,
                callback,
                subscription: None,
                timer: None,
            });
            inner.set_state(generation, ResolverState::CheckingPermission);
            (previous, generation)
        };

        if let Some(previous) = previous {
            debug!(
                generation = previous.generation,
                "replacing in-flight acquisition"
            );
            self.release(previous);
        }

        if !self.permissions.is_authorized() {
            self.finish(generation, Err(AcquisitionError::permission_denied()));
            return Some(generation);
        }

        if !self.advance(generation, ResolverState::FetchingCached) {
            return Some(generation);
        }

        let weak = Arc::downgrade(self);
        let lookup = self.provider.last_known_fix(Box::new(move |outcome| {
            if let Some(shared) = weak.upgrade() {
                match outcome {
                    Ok(Some(fix)) => {
                        shared.finish(generation, Ok(fix.with_source(FixSource::Cached)))
                    }
                    Ok(None) => {
                        debug!(generation, "no cached fix, requesting live updates");
                        shared.request_live(generation);
                    }
                    Err(err) => {
                        warn!(generation, error = %err, "cached fix lookup failed, requesting live updates");
                        shared.request_live(generation);
                    }
                }
            }
        }));

        if let Err(err) = lookup {
            self.finish(generation, Err(err.into()));
        }
        Some(generation)
    }

    fn request_live(self: &Arc<Self>, generation: u64) {
        if !self.advance(generation, ResolverState::RequestingLive) {
            return;
        }

        // Grants may have changed while the cached lookup was pending.
        if !self.permissions.is_authorized() {
            self.finish(generation, Err(AcquisitionError::permission_denied()));
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let on_update: UpdateCallback = Arc::new(move |fix: Fix| {
            if let Some(shared) = weak.upgrade() {
                shared.finish(generation, Ok(fix.with_source(FixSource::Live)));
            }
        });

        let subscription = match self.provider.subscribe(&self.config.live, on_update) {
            Ok(subscription) => subscription,
            Err(err) => {
                self.finish(generation, Err(err.into()));
                return;
            }
        };

        let attached = self.attach(generation, |request| {
            request.subscription = Some(subscription)
        });
        if !attached {
            // Resolved or cancelled while subscribing.
            self.provider.unsubscribe(subscription);
            return;
        }

        let weak = Arc::downgrade(self);
        let deadline = self.config.timeout();
        let handle = self.timer.schedule(
            deadline,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.on_deadline(generation);
                }
            }),
        );

        if !self.attach(generation, |request| request.timer = Some(handle)) {
            self.timer.cancel(handle);
        }
    }

    fn on_deadline(&self, generation: u64) {
        let expired = self.attach(generation, |request| {
            // Fired timers need no cancel.
            request.timer = None;
        });
        if expired {
            self.finish(
                generation,
                Err(AcquisitionError::timeout(self.config.timeout())),
            );
        }
    }

    /// Move the request of `generation` to `state`; false if it is no longer current.
    fn advance(&self, generation: u64, state: ResolverState) -> bool {
        let mut inner = self.lock();
        if inner.current_mut(generation).is_none() {
            trace!(generation, "dropping transition for stale request");
            return false;
        }
        inner.set_state(generation, state);
        true
    }

    fn attach<F>(&self, generation: u64, f: F) -> bool
    where
        F: FnOnce(&mut AcquisitionRequest),
    {
        let mut inner = self.lock();
        match inner.current_mut(generation) {
            Some(request) => {
                f(request);
                true
            }
            None => false,
        }
    }

    /// Resolve the request of `generation` exactly once.
    fn finish(&self, generation: u64, outcome: Result<Fix, AcquisitionError>) {
        let thread = thread::current().id();
        let (request, _delivery) = {
            let mut inner = self.lock();
            if inner.current_mut(generation).is_none() {
                trace!(generation, "dropping event for stale request");
                return;
            }
            let state = match &outcome {
                Ok(fix) => ResolverState::Resolved(*fix),
                Err(err) => ResolverState::Failed(err.reason),
            };
            inner.set_state(generation, state);
            inner.delivering.push(thread);
            let delivery = Delivery {
                shared: self,
                thread,
            };
            (inner.request.take(), delivery)
        };

        let Some(request) = request else {
            return;
        };

        if let Some(subscription) = request.subscription {
            self.provider.unsubscribe(subscription);
        }
        if let Some(timer) = request.timer {
            self.timer.cancel(timer);
        }

        match &outcome {
            Ok(fix) => info!(
                generation,
                source = ?fix.source,
                latitude = fix.coordinate.latitude(),
                longitude = fix.coordinate.longitude(),
                accuracy_m = fix.accuracy_m,
                "location fix resolved"
            ),
            Err(err) => warn!(
                generation,
                reason = %err.reason,
                code = err.code(),
                message = %err.message,
                "location fix failed"
            ),
        }

        (request.callback)(outcome);
    }

    /// Tear down a request without invoking its callback.
    fn release(&self, request: AcquisitionRequest) {
        if let Some(subscription) = request.subscription {
            self.provider.unsubscribe(subscription);
        }
        if let Some(timer) = request.timer {
            self.timer.cancel(timer);
        }
        drop(request.callback);
    }

    fn cancel(&self, only_generation: Option<u64>, destroy: bool) {
        let request = {
            let mut inner = self.lock();
            if destroy {
                inner.destroyed = true;
            }
            if only_generation.is_none() {
                let me = thread::current().id();
                inner = self
                    .delivered
                    .wait_while(inner, |inner| inner.delivering_elsewhere(me))
                    .unwrap_or_else(PoisonError::into_inner);
            }
            let matches = match (only_generation, inner.request.as_ref()) {
                (Some(generation), Some(request)) => request.generation == generation,
                (Some(_), None) => false,
                (None, _) => true,
            };
            if !matches {
                return;
            }
            let generation = inner.generation;
            inner.set_state(generation, ResolverState::Idle);
            inner.request.take()
        };

        if let Some(request) = request {
            debug!(generation = request.generation, "cancelling acquisition");
            self.release(request);
        }
    }
}

/// Resolves the current position, cached fix first then live updates.
///
/// # Example
/// ```no_run
/// use geofix_acquisition::{FixResolver, StaticPermissionStore, TokioTimer};
/// # use geofix_acquisition::LocationProvider;
/// # use std::sync::Arc;
/// # async fn run(provider: Arc<dyn LocationProvider>) {
/// let timer = Arc::new(TokioTimer::try_current().expect("inside a tokio runtime"));
/// let resolver = FixResolver::with_default_config(
///     provider,
///     timer,
///     Arc::new(StaticPermissionStore::granted_all()),
/// );
/// match resolver.acquire_async().await {
///     Ok(fix) => println!("{}", fix.coordinate),
///     Err(err) => eprintln!("{} ({})", err.message, err.code()),
/// }
/// # }
/// ```
pub struct FixResolver {
    shared: Arc<Shared>,
}

impl FixResolver {
    /// Create a resolver over the given collaborators
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        timer: Arc<dyn Timer>,
        permissions: Arc<dyn PermissionStore>,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                provider,
                timer,
                permissions,
                config,
                inner: Mutex::new(Inner {
                    state: ResolverState::Idle,
                    generation: 0,
                    request: None,
                    destroyed: false,
                    history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
                    delivering: Vec::new(),
                }),
                delivered: Condvar::new(),
            }),
        }
    }

    /// Create a resolver with the default 30 second deadline
    pub fn with_default_config(
        provider: Arc<dyn LocationProvider>,
        timer: Arc<dyn Timer>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        Self::new(provider, timer, permissions, AcquisitionConfig::default())
    }

    /// Acquisition configuration in use
    pub fn config(&self) -> &AcquisitionConfig {
        &self.shared.config
    }

    /// Current state
    pub fn state(&self) -> ResolverState {
        self.shared.lock().state.clone()
    }

    /// Whether an acquisition is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.shared.lock().request.is_some()
    }

    /// Whether `destroy()` has been called
    pub fn is_destroyed(&self) -> bool {
        self.shared.lock().destroyed
    }

    /// Recorded state transitions, oldest first
    pub fn history(&self) -> Vec<StateTransition> {
        self.shared.lock().history.iter().cloned().collect()
    }

    /// Start an acquisition; `callback` runs at most once.
    ///
    /// An acquisition already in flight is cancelled first and its callback is
    /// never invoked. The callback may run before this method returns.
    pub fn acquire<F>(&self, callback: F)
    where
        F: FnOnce(Result<Fix, AcquisitionError>) + Send + 'static,
    {
        self.shared.acquire(Box::new(callback));
    }

    /// Future-based acquisition.
    ///
    /// Dropping the future before it completes cancels the acquisition it
    /// started. If the acquisition is cancelled or replaced by another call,
    /// the future yields a [`FailureReason::Cancelled`] error.
    pub async fn acquire_async(&self) -> Result<Fix, AcquisitionError> {
        let (tx, rx) = oneshot::channel();
        let generation = self.shared.acquire(Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }));

        let mut guard = CancelOnDrop {
            shared: &self.shared,
            generation,
        };
        let outcome = rx
            .await
            .unwrap_or_else(|_| Err(AcquisitionError::cancelled()));
        guard.generation = None;
        outcome
    }

    /// Abandon the current acquisition, if any. Idempotent.
    ///
    /// Waits for a resolution already being delivered on another thread, so
    /// no callback fires after this returns.
    pub fn cancel(&self) {
        self.shared.cancel(None, false);
    }

    /// Cancel and refuse all further acquisitions. Idempotent.
    pub fn destroy(&self) {
        self.shared.cancel(None, true);
    }
}

impl Drop for FixResolver {
    fn drop(&mut self) {
        self.shared.cancel(None, false);
    }
}

impl std::fmt::Debug for FixResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("FixResolver")
            .field("state", &inner.state)
            .field("generation", &inner.generation)
            .field("in_flight", &inner.request.is_some())
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}

struct CancelOnDrop<'a> {
    shared: &'a Arc<Shared>,
    generation: Option<u64>,
}

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(generation) = self.generation {
            self.shared.cancel(Some(generation), false);
        }
    }
}
