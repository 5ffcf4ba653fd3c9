//! Minimal metrics primitives for the PCER routing stack.
//!
//! Provides [`Counter`], an atomic monotonic counter, and [`Summary`],
//! a running min/max/mean over observed values (route costs, latencies).
//! Both serialize with serde so the simulator can dump them as JSON.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A monotonically increasing counter backed by [`AtomicU64`].
///
/// Relaxed ordering throughout: these are statistics, not synchronization.
pub struct Counter(AtomicU64);

impl Counter {
    /// Create a counter starting at zero.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increment by one.
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment by `n`.
    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    /// Read the current value.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        Self(AtomicU64::new(self.get()))
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Counter({})", self.get())
    }
}

impl Serialize for Counter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Counter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        Ok(Self(AtomicU64::new(value)))
    }
}

// ── Summary ────────────────────────────────────────────────────────────

/// Running summary of observed values (count, min, max, mean).
///
/// Non-finite observations are ignored so a single degenerate sample
/// cannot poison the mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Summary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation.
    pub fn observe(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Number of finite observations recorded.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Arithmetic mean, `None` before the first observation.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: &Summary) {
        if other.count == 0 {
            return;
        }
        self.count += other.count;
        self.sum += other.sum;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_basic_operations() {
        let c = Counter::new();
        assert_eq!(c.get(), 0);
        c.inc();
        c.inc_by(4);
        assert_eq!(c.get(), 5);
    }

    #[test]
    fn counter_clone_is_independent() {
        let c = Counter::new();
        c.inc_by(7);
        let c2 = c.clone();
        c.inc();
        assert_eq!(c.get(), 8);
        assert_eq!(c2.get(), 7);
    }

    #[test]
    fn counter_serializes_as_number() {
        let c = Counter::new();
        c.inc_by(12);
        assert_eq!(serde_json::to_string(&c).unwrap(), "12");
        let back: Counter = serde_json::from_str("12").unwrap();
        assert_eq!(back.get(), 12);
    }

    #[test]
    fn empty_summary_has_no_mean() {
        let s = Summary::new();
        assert_eq!(s.count(), 0);
        assert_eq!(s.mean(), None);
        assert_eq!(s.min(), None);
    }

    #[test]
    fn summary_tracks_min_max_mean() {
        let mut s = Summary::new();
        s.observe(500.0);
        s.observe(111.0);
        s.observe(5000.0);
        assert_eq!(s.count(), 3);
        assert_eq!(s.min(), Some(111.0));
        assert_eq!(s.max(), Some(5000.0));
        assert_eq!(s.mean(), Some(5611.0 / 3.0));
    }

    #[test]
    fn summary_ignores_non_finite() {
        let mut s = Summary::new();
        s.observe(f64::NAN);
        s.observe(f64::INFINITY);
        s.observe(2.0);
        assert_eq!(s.count(), 1);
        assert_eq!(s.mean(), Some(2.0));
    }

    #[test]
    fn merge_combines_extremes() {
        let mut a = Summary::new();
        a.observe(3.0);
        let mut b = Summary::new();
        b.observe(1.0);
        b.observe(9.0);
        a.merge(&b);
        assert_eq!(a.count(), 3);
        assert_eq!(a.min(), Some(1.0));
        assert_eq!(a.max(), Some(9.0));

        let mut empty = Summary::new();
        empty.merge(&a);
        assert_eq!(empty, a);
    }
}
