//! Per-operation timing accumulators for reconciler backends.
//!
//! ```rust
//! use vitadeck_core::ReconcilerMetrics;
//!
//! let metrics = ReconcilerMetrics::new("mutation");
//! let n = metrics.time("mutation.createInstance", || 2 + 2);
//! assert_eq!(n, 4);
//! assert_eq!(metrics.summary_for("mutation.createInstance").unwrap().count, 1);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use web_time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricSummary {
    pub count: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
    pub last: Duration,
}

impl MetricSummary {
    fn first(d: Duration) -> Self {
        Self {
            count: 1,
            total: d,
            min: d,
            max: d,
            last: d,
        }
    }

    pub(crate) fn push(&mut self, d: Duration) {
        self.count = self.count.saturating_add(1);
        self.total += d;
        self.last = d;
        self.min = self.min.min(d);
        self.max = self.max.max(d);
    }

    pub fn average(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            let nanos = self.total.as_nanos() / u128::from(self.count);
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        }
    }
}

#[derive(Debug)]
pub struct ReconcilerMetrics {
    label: String,
    entries: RefCell<BTreeMap<String, MetricSummary>>,
}

impl ReconcilerMetrics {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn record(&self, name: &str, elapsed: Duration) {
        let mut entries = self.entries.borrow_mut();
        match entries.get_mut(name) {
            Some(entry) => entry.push(elapsed),
            None => {
                entries.insert(name.to_string(), MetricSummary::first(elapsed));
            }
        }
    }

    /// Runs `f` and records how long it took under `name`. A panic inside
    /// `f` is still recorded before it continues unwinding.
    pub fn time<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        let _watch = Stopwatch {
            metrics: self,
            name,
            start: Instant::now(),
        };
        f()
    }

    /// Like [`time`](Self::time), but the clock stops when `fut` resolves,
    /// not when it is created. A future dropped before completion records
    /// nothing.
    pub fn time_future<F: Future>(&self, name: impl Into<String>, fut: F) -> Timed<'_, F> {
        Timed {
            metrics: self,
            name: name.into(),
            start: Instant::now(),
            fut: Box::pin(fut),
        }
    }

    /// All accumulators, sorted by operation name.
    pub fn summary(&self) -> Vec<(String, MetricSummary)> {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    pub fn summary_for(&self, name: &str) -> Option<MetricSummary> {
        self.entries.borrow().get(name).copied()
    }

    pub fn method_names(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    pub fn reset(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn reset_method(&self, name: &str) {
        self.entries.borrow_mut().remove(name);
    }
}

struct Stopwatch<'a> {
    metrics: &'a ReconcilerMetrics,
    name: &'a str,
    start: Instant,
}

impl Drop for Stopwatch<'_> {
    fn drop(&mut self) {
        self.metrics.record(self.name, self.start.elapsed());
    }
}

/// Future returned by [`ReconcilerMetrics::time_future`].
pub struct Timed<'a, F: Future> {
    metrics: &'a ReconcilerMetrics,
    name: String,
    start: Instant,
    fut: Pin<Box<F>>,
}

impl<F: Future> Future for Timed<'_, F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
        let out = ready!(self.fut.as_mut().poll(cx));
        self.metrics.record(&self.name, self.start.elapsed());
        Poll::Ready(out)
    }
}
