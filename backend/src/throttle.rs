//! Frame admission control for the live endpoint.
//!
//! The classifier serves one frame at a time and the browser sends far more
//! than that. Late frames are dropped, never queued: a frame is admitted only
//! when the configured interval has elapsed since the last *processed* frame
//! and no other frame is currently in flight.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

/// Why a frame was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The interval since the last processed frame has not elapsed.
    TooSoon,
    /// Another frame currently holds the single-flight slot.
    InFlight,
}

/// Pure admission decision: given the clock and slot state, accept or reject.
pub fn decide(
    now_ms: i64,
    last_processed_ms: i64,
    interval_ms: i64,
    slot_free: bool,
) -> Result<(), RejectReason> {
    if now_ms - last_processed_ms < interval_ms {
        return Err(RejectReason::TooSoon);
    }
    if !slot_free {
        return Err(RejectReason::InFlight);
    }
    Ok(())
}

/// Single-slot admission controller: an atomic last-processed timestamp fused
/// with a try-acquire mutex.
///
/// The timestamp is read outside the slot's critical section; a race there
/// costs at most one extra processed frame.
pub struct AdmissionController {
    interval_ms: i64,
    last_processed_ms: AtomicI64,
    slot: Mutex<()>,
}

impl AdmissionController {
    pub fn new(interval: Duration) -> AdmissionController {
        AdmissionController {
            interval_ms: interval.as_millis() as i64,
            last_processed_ms: AtomicI64::new(0),
            slot: Mutex::new(()),
        }
    }

    /// Try to admit a frame at `now`. On success the returned permit holds
    /// the single-flight slot until dropped.
    pub fn try_admit(&self, now: DateTime<Utc>) -> Result<AdmissionPermit<'_>, RejectReason> {
        let now_ms = now.timestamp_millis();
        let last = self.last_processed_ms.load(Ordering::Relaxed);
        decide(now_ms, last, self.interval_ms, true)?;

        let guard = self
            .slot
            .try_lock()
            .map_err(|_| RejectReason::InFlight)?;

        Ok(AdmissionPermit {
            _guard: guard,
            controller: self,
            now_ms,
        })
    }
}

/// Holds the single-flight slot for one frame.
///
/// Call [`AdmissionPermit::mark_processed`] once the frame actually went
/// through the models; frames that fail payload validation do not advance
/// the interval.
pub struct AdmissionPermit<'a> {
    _guard: MutexGuard<'a, ()>,
    controller: &'a AdmissionController,
    now_ms: i64,
}

impl AdmissionPermit<'_> {
    pub fn mark_processed(&self) {
        self.controller
            .last_processed_ms
            .store(self.now_ms, Ordering::Relaxed);
    }
}
