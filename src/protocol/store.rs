//! Shared parameter store written by the receive loop, read on the host tick.

use std::array;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::{PARAMETER_COUNT, Parameter};

/// Freshness stamp value meaning "never updated".
const NEVER: u64 = 0;

/// Current raw values for every tracked channel plus per-channel freshness
/// stamps.
///
/// Single writer (the receive loop), many readers. Every field is an
/// individual atomic so the host's per-frame read never waits on the network
/// thread; readers tolerate seeing a value from the in-flight packet.
#[derive(Debug)]
pub struct ParameterStore {
    values: [AtomicU32; PARAMETER_COUNT],
    /// Reference point for freshness stamps.
    epoch: Instant,
    /// Nanoseconds since `epoch`, offset by one so `NEVER` stays reserved.
    last_eye: AtomicU64,
    last_face: AtomicU64,
}

impl ParameterStore {
    /// Create a store with every value at `0.0` and both channels stale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: array::from_fn(|_| AtomicU32::new(0.0_f32.to_bits())),
            epoch: Instant::now(),
            last_eye: AtomicU64::new(NEVER),
            last_face: AtomicU64::new(NEVER),
        }
    }

    /// Overwrite one channel. Called only by the receive loop.
    pub fn set(&self, parameter: Parameter, value: f32) {
        self.values[parameter.index()].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Current value of a channel; `0.0` if never written since construction
    /// or the last [`reset`](Self::reset).
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> f32 {
        f32::from_bits(self.values[parameter.index()].load(Ordering::Relaxed))
    }

    /// Record an eye-channel arrival at the current wall-clock time.
    pub fn mark_eye_update(&self) {
        self.mark_eye_update_at(Instant::now());
    }

    /// Record a face-channel arrival at the current wall-clock time.
    pub fn mark_face_update(&self) {
        self.mark_face_update_at(Instant::now());
    }

    /// Whether the eye channel received data within `timeout` of `now`.
    #[must_use]
    pub fn is_eye_fresh(&self, now: Instant, timeout: Duration) -> bool {
        self.is_fresh(&self.last_eye, now, timeout)
    }

    /// Whether the face channel received data within `timeout` of `now`.
    #[must_use]
    pub fn is_face_fresh(&self, now: Instant, timeout: Duration) -> bool {
        self.is_fresh(&self.last_face, now, timeout)
    }

    /// Zero every value and mark both channels stale.
    ///
    /// Called on teardown and before a reconnect, so values from a previous
    /// session never masquerade as live tracking data.
    pub fn reset(&self) {
        for value in &self.values {
            value.store(0.0_f32.to_bits(), Ordering::Relaxed);
        }
        self.last_eye.store(NEVER, Ordering::Relaxed);
        self.last_face.store(NEVER, Ordering::Relaxed);
    }

    fn mark_eye_update_at(&self, now: Instant) {
        self.last_eye.store(self.stamp(now), Ordering::Relaxed);
    }

    fn mark_face_update_at(&self, now: Instant) {
        self.last_face.store(self.stamp(now), Ordering::Relaxed);
    }

    fn stamp(&self, now: Instant) -> u64 {
        let nanos = now.saturating_duration_since(self.epoch).as_nanos();
        u64::try_from(nanos).unwrap_or(u64::MAX).saturating_add(1)
    }

    fn is_fresh(&self, stamp: &AtomicU64, now: Instant, timeout: Duration) -> bool {
        let recorded = stamp.load(Ordering::Relaxed);
        if recorded == NEVER {
            return false;
        }
        let elapsed = self.stamp(now).saturating_sub(recorded);
        u128::from(elapsed) <= timeout.as_nanos()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
