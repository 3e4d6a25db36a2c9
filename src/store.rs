//! Wait-free parameter store for embedding the equalizer outside a plugin host.
//!
//! A control thread publishes values with the setters and the audio thread picks up a
//! [`ParameterSnapshot`] once per block. Each field is its own atomic, so a snapshot taken while
//! the control thread is mid-update may mix old and new fields. That is fine: the next block
//! sees the rest.

use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::params::{clamp_frequency, clamp_gain_db, clamp_q, ParameterSnapshot};

#[derive(Debug)]
pub struct ParameterStore {
    frequency: AtomicI32,
    gain_db: AtomicF32,
    q: AtomicF32,
}

impl ParameterStore {
    pub fn new(initial: ParameterSnapshot) -> Self {
        let initial = sanitize(initial, ParameterSnapshot::default());
        Self {
            frequency: AtomicI32::new(initial.frequency),
            gain_db: AtomicF32::new(initial.gain_db),
            q: AtomicF32::new(initial.q),
        }
    }

    /// Sets the center frequency, clamped to the audible range. Returns the committed value.
    pub fn set_frequency(&self, frequency: i32) -> i32 {
        let committed = clamp_frequency(frequency);
        self.frequency.store(committed, Ordering::Relaxed);
        committed
    }

    /// Sets the gain in dB. Non-finite values are ignored and the current gain is returned.
    pub fn set_gain_db(&self, gain_db: f32) -> f32 {
        if !gain_db.is_finite() {
            return self.gain_db.load(Ordering::Relaxed);
        }

        let committed = clamp_gain_db(gain_db);
        self.gain_db.store(committed, Ordering::Relaxed);
        committed
    }

    /// Sets Q. Non-finite values are ignored and the current Q is returned.
    pub fn set_q(&self, q: f32) -> f32 {
        if !q.is_finite() {
            return self.q.load(Ordering::Relaxed);
        }

        let committed = clamp_q(q);
        self.q.store(committed, Ordering::Relaxed);
        committed
    }

    /// Publishes all three values. Fields that are not finite keep their current value.
    pub fn store(&self, snapshot: ParameterSnapshot) -> ParameterSnapshot {
        let committed = sanitize(snapshot, self.snapshot());
        self.frequency.store(committed.frequency, Ordering::Relaxed);
        self.gain_db.store(committed.gain_db, Ordering::Relaxed);
        self.q.store(committed.q, Ordering::Relaxed);
        committed
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            frequency: self.frequency.load(Ordering::Relaxed),
            gain_db: self.gain_db.load(Ordering::Relaxed),
            q: self.q.load(Ordering::Relaxed),
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(ParameterSnapshot::default())
    }
}

fn sanitize(snapshot: ParameterSnapshot, fallback: ParameterSnapshot) -> ParameterSnapshot {
    ParameterSnapshot {
        frequency: snapshot.frequency,
        gain_db: if snapshot.gain_db.is_finite() {
            snapshot.gain_db
        } else {
            fallback.gain_db
        },
        q: if snapshot.q.is_finite() {
            snapshot.q
        } else {
            fallback.q
        },
    }
    .clamped()
}
