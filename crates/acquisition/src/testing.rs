//! Deterministic provider and timer doubles.
//!
//! Enabled for this crate's unit tests and, through the `testing` feature, for
//! downstream integration tests.

use crate::error::ProviderError;
use crate::provider::{CachedFixCallback, LocationProvider, SubscriptionId, UpdateCallback};
use crate::timer::{ExpiryCallback, Timer, TimerHandle};
use geofix_core::{Fix, LiveRequestConfig};
use std::collections::BTreeMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How [`ScriptedProvider`] answers cached-fix lookups.
#[derive(Debug, Clone)]
pub enum CachedBehavior {
    /// Complete immediately with this fix
    Fix(Fix),
    /// Complete immediately with no fix
    Empty,
    /// Complete immediately with a failed lookup
    Fail(String),
    /// Hold the completion until [`ScriptedProvider::complete_cached`]
    Deferred,
    /// Refuse the call synchronously
    Raise(ProviderError),
}

#[derive(Default)]
struct ProviderState {
    subscribers: BTreeMap<u64, UpdateCallback>,
    pending_cached: Option<CachedFixCallback>,
    subscribe_error: Option<ProviderError>,
    deliver_on_subscribe: Option<Fix>,
    next_id: u64,
    cached_calls: usize,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
    last_request: Option<LiveRequestConfig>,
}

#[derive(Default)]
struct UnsubscribeGate {
    held: bool,
    blocked: usize,
}

/// Scripted [`LocationProvider`] recording every call.
pub struct ScriptedProvider {
    cached: Mutex<CachedBehavior>,
    state: Mutex<ProviderState>,
    gate: Mutex<UnsubscribeGate>,
    gate_changed: Condvar,
}

impl ScriptedProvider {
    /// Create a provider answering lookups with `cached`
    pub fn new(cached: CachedBehavior) -> Self {
        Self {
            cached: Mutex::new(cached),
            state: Mutex::new(ProviderState::default()),
            gate: Mutex::new(UnsubscribeGate::default()),
            gate_changed: Condvar::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the answer to future cached lookups
    pub fn set_cached(&self, cached: CachedBehavior) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = cached;
    }

    /// Make the next subscribe calls fail
    pub fn fail_subscribe_with(&self, err: ProviderError) {
        self.state().subscribe_error = Some(err);
    }

    /// Deliver `fix` from inside the next subscribe call
    pub fn deliver_on_subscribe(&self, fix: Fix) {
        self.state().deliver_on_subscribe = Some(fix);
    }

    /// Complete a deferred cached lookup. Returns false if none was pending.
    pub fn complete_cached(&self, outcome: Result<Option<Fix>, ProviderError>) -> bool {
        let pending = self.state().pending_cached.take();
        match pending {
            Some(callback) => {
                callback(outcome);
                true
            }
            None => false,
        }
    }

    /// Deliver a live update to every active subscriber; returns how many received it.
    pub fn push_update(&self, fix: Fix) -> usize {
        let subscribers: Vec<UpdateCallback> = self.state().subscribers.values().cloned().collect();
        for subscriber in &subscribers {
            subscriber(fix);
        }
        subscribers.len()
    }

    /// Make unsubscribe calls block until [`Self::release_unsubscribe`]
    pub fn hold_unsubscribe(&self) {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner).held = true;
    }

    /// Let blocked and future unsubscribe calls return
    pub fn release_unsubscribe(&self) {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner).held = false;
        self.gate_changed.notify_all();
    }

    /// Wait until an unsubscribe call is blocked on the gate. False on timeout.
    pub fn wait_for_blocked_unsubscribe(&self, timeout: Duration) -> bool {
        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let (gate, _) = self
            .gate_changed
            .wait_timeout_while(gate, timeout, |gate| gate.blocked == 0)
            .unwrap_or_else(PoisonError::into_inner);
        gate.blocked > 0
    }

    /// Number of cached-fix lookups
    pub fn cached_calls(&self) -> usize {
        self.state().cached_calls
    }

    /// Number of subscribe calls, failed ones included
    pub fn subscribe_calls(&self) -> usize {
        self.state().subscribe_calls
    }

    /// Number of unsubscribe calls
    pub fn unsubscribe_calls(&self) -> usize {
        self.state().unsubscribe_calls
    }

    /// Subscriptions not yet removed
    pub fn active_subscriptions(&self) -> usize {
        self.state().subscribers.len()
    }

    /// Request parameters of the latest subscription
    pub fn last_request(&self) -> Option<LiveRequestConfig> {
        self.state().last_request.clone()
    }
}

impl LocationProvider for ScriptedProvider {
    fn last_known_fix(&self, on_complete: CachedFixCallback) -> Result<(), ProviderError> {
        self.state().cached_calls += 1;
        let behavior = self
            .cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match behavior {
            CachedBehavior::Fix(fix) => on_complete(Ok(Some(fix))),
            CachedBehavior::Empty => on_complete(Ok(None)),
            CachedBehavior::Fail(message) => on_complete(Err(ProviderError::Unavailable(message))),
            CachedBehavior::Deferred => self.state().pending_cached = Some(on_complete),
            CachedBehavior::Raise(err) => return Err(err),
        }
        Ok(())
    }

    fn subscribe(
        &self,
        request: &LiveRequestConfig,
        on_update: UpdateCallback,
    ) -> Result<SubscriptionId, ProviderError> {
        let (id, immediate) = {
            let mut state = self.state();
            state.subscribe_calls += 1;
            if let Some(err) = state.subscribe_error.clone() {
                return Err(err);
            }
            state.next_id += 1;
            let id = state.next_id;
            state.subscribers.insert(id, on_update.clone());
            state.last_request = Some(request.clone());
            (id, state.deliver_on_subscribe.take())
        };

        if let Some(fix) = immediate {
            on_update(fix);
        }
        Ok(SubscriptionId(id))
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        {
            let mut state = self.state();
            state.unsubscribe_calls += 1;
            state.subscribers.remove(&subscription.0);
        }

        let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if !gate.held {
            return;
        }
        gate.blocked += 1;
        self.gate_changed.notify_all();
        let mut gate = self
            .gate_changed
            .wait_while(gate, |gate| gate.held)
            .unwrap_or_else(PoisonError::into_inner);
        gate.blocked -= 1;
    }
}

#[derive(Default)]
struct TimerState {
    pending: BTreeMap<u64, ExpiryCallback>,
    next_id: u64,
    scheduled: usize,
    cancelled: usize,
    last_duration: Option<Duration>,
}

/// [`Timer`] that only fires when told to.
#[derive(Default)]
pub struct ManualTimer {
    state: Mutex<TimerState>,
}

impl ManualTimer {
    /// Create a timer with nothing scheduled
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fire every pending timer; returns how many fired.
    pub fn fire_all(&self) -> usize {
        let pending = std::mem::take(&mut self.state().pending);
        let fired = pending.len();
        for (_, on_expiry) in pending {
            on_expiry();
        }
        fired
    }

    /// Timers armed and not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.state().pending.len()
    }

    /// Total schedule calls
    pub fn scheduled_count(&self) -> usize {
        self.state().scheduled
    }

    /// Cancels that disarmed a pending timer
    pub fn cancelled_count(&self) -> usize {
        self.state().cancelled
    }

    /// Duration of the latest schedule call
    pub fn last_duration(&self) -> Option<Duration> {
        self.state().last_duration
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, after: Duration, on_expiry: ExpiryCallback) -> TimerHandle {
        let mut state = self.state();
        state.next_id += 1;
        state.scheduled += 1;
        state.last_duration = Some(after);
        let id = state.next_id;
        state.pending.insert(id, on_expiry);
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut state = self.state();
        if state.pending.remove(&handle.0).is_some() {
            state.cancelled += 1;
        }
    }
}
