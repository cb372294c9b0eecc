//! Admission gate bounding how many units of work run at once.
//!
//! The gate wraps a fair `tokio::sync::Semaphore`. A slot is represented by a
//! [`GatePermit`]; dropping the permit returns the slot, so every successful
//! acquire is paired with exactly one release, including on error and panic
//! paths.
//!
//! # Accounting
//!
//! `in_use` is derived from the semaphore's available permits, which are
//! updated atomically with each grant and release. A [`GateStats`] snapshot
//! therefore never reports `in_use > capacity` or a negative availability.
//!
//! # Fairness
//!
//! Waiters are served in arrival order. A unit that is waiting is granted a
//! slot once the units queued ahead of it have been served.
//!
//! # Example
//!
//! ```rust,ignore
//! use gofed_domain::gate::AdmissionGate;
//! use tokio_util::sync::CancellationToken;
//!
//! let gate = AdmissionGate::new(3)?;
//! let token = CancellationToken::new();
//!
//! let permit = gate.acquire(&token).await?;
//! assert_eq!(gate.stats().in_use, 1);
//! drop(permit);
//! assert_eq!(gate.stats().in_use, 0);
//! ```

#[cfg(test)]
mod gate_proptest;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{GateError, GateResult};

/// Counting limiter bounding the number of concurrently admitted units.
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    /// Units currently suspended in `acquire`.
    waiting: AtomicUsize,
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("capacity", &self.capacity)
            .field("available", &self.semaphore.available_permits())
            .field("waiting", &self.waiting.load(Ordering::Relaxed))
            .finish()
    }
}

impl AdmissionGate {
    /// Creates a gate admitting at most `capacity` concurrent units.
    ///
    /// Returns [`GateError::InvalidCapacity`] for zero or for a capacity the
    /// semaphore cannot represent.
    pub fn new(capacity: usize) -> GateResult<Self> {
        if capacity == 0 || capacity > Semaphore::MAX_PERMITS {
            return Err(GateError::InvalidCapacity {
                capacity,
                max: Semaphore::MAX_PERMITS,
            });
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            waiting: AtomicUsize::new(0),
        })
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Waits for a free slot or for `cancel` to fire, whichever comes first.
    ///
    /// A token that is already cancelled never receives a slot. On
    /// cancellation no slot is consumed.
    pub async fn acquire(&self, cancel: &CancellationToken) -> GateResult<GatePermit> {
        if cancel.is_cancelled() {
            return Err(GateError::Cancelled);
        }

        let _waiting = WaitingGuard::enter(&self.waiting);

        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                trace!(capacity = self.capacity, "admission wait cancelled");
                Err(GateError::Cancelled)
            }
            permit = Arc::clone(&self.semaphore).acquire_owned() => {
                permit
                    .map(GatePermit::new)
                    .map_err(|_| GateError::Closed)
            }
        }
    }

    /// Takes a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<GatePermit> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(GatePermit::new)
    }

    /// Returns a consistent snapshot of the gate's occupancy.
    pub fn stats(&self) -> GateStats {
        let available = self.semaphore.available_permits().min(self.capacity);
        let in_use = self.capacity - available;
        GateStats {
            capacity: self.capacity,
            in_use,
            available,
            utilization_percent: in_use as f64 / self.capacity as f64 * 100.0,
            waiting: self.waiting.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of gate occupancy, for metrics collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateStats {
    pub capacity: usize,
    pub in_use: usize,
    pub available: usize,
    pub utilization_percent: f64,
    pub waiting: usize,
}

/// One admitted slot. The slot is returned when the permit is dropped.
#[derive(Debug)]
#[must_use = "dropping a GatePermit releases its slot immediately"]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl GatePermit {
    fn new(permit: OwnedSemaphorePermit) -> Self {
        Self { _permit: permit }
    }

    /// Returns the slot to the gate.
    pub fn release(self) {
        drop(self);
    }
}

/// Counts a unit as waiting until the acquire future completes or is dropped.
struct WaitingGuard<'a> {
    waiting: &'a AtomicUsize,
}

impl<'a> WaitingGuard<'a> {
    fn enter(waiting: &'a AtomicUsize) -> Self {
        waiting.fetch_add(1, Ordering::Relaxed);
        Self { waiting }
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.waiting.fetch_sub(1, Ordering::Relaxed);
    }
}
