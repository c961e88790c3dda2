//! Location fix acquisition for GeoFix.
//!
//! This crate resolves the device's current position through a layered
//! fallback:
//! - Permission gating (fine or coarse location, legacy platforms always pass)
//! - The provider's cached last-known fix (fast path, no subscription)
//! - A live update subscription raced against a configurable deadline
//!
//! # Resource Guarantees
//!
//! A [`FixResolver`] holds at most one provider subscription and one timer at
//! a time. Resolution, cancellation, replacement by a newer `acquire()` and
//! drop all release both. The caller's callback runs at most once and never
//! after `cancel()` / `destroy()` return.
//!
//! # Failure Codes
//!
//! | reason | code |
//! |---|---|
//! | `PermissionDenied` | 1 |
//! | `SecurityError` | 2 |
//! | `Timeout` | 3 |
//! | `ProviderUnavailable` | 4 |
//! | `Cancelled` | 5 |
//!
//! Failures are terminal for the attempt; retrying is the caller's decision.

#![warn(missing_docs)]

pub mod error;
pub mod permission;
pub mod provider;
pub mod resolver;
pub mod timer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{AcquisitionError, FailureReason, ProviderError};
pub use permission::{
    is_authorized, Permission, PermissionGate, PermissionModel, PermissionSet, PermissionStore,
    StaticPermissionStore,
};
pub use provider::{CachedFixCallback, LocationProvider, SubscriptionId, UpdateCallback};
pub use resolver::{FixCallback, FixResolver, ResolverState, StateTransition};
pub use timer::{ExpiryCallback, Timer, TimerHandle, TokioTimer};
