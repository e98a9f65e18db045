//! Cooperative timers, polled once per tick.
//!
//! Callbacks may freely schedule or clear timers (including their own) through
//! a cloned [`Timers`] handle; no borrow is held while they run.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::isolate;
use crate::handlers::Callback;

new_key_type! {
    pub struct TimerHandle;
}

struct Entry {
    callback: Callback,
    interval: Option<Duration>,
    cancelled: bool,
}

struct Inner {
    queue: BinaryHeap<Reverse<(Instant, u64, TimerHandle)>>,
    entries: SlotMap<TimerHandle, Entry>,
    seq: u64,
}

impl Inner {
    fn schedule(&mut self, at: Instant, handle: TimerHandle) {
        self.seq += 1;
        self.queue.push(Reverse((at, self.seq, handle)));
    }

    fn live(&self, handle: TimerHandle) -> Option<&Entry> {
        self.entries.get(handle).filter(|e| !e.cancelled)
    }
}

#[derive(Clone)]
pub struct Timers {
    clock: Rc<dyn Clock>,
    inner: Rc<RefCell<Inner>>,
}

impl Timers {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Rc::new(RefCell::new(Inner {
                queue: BinaryHeap::new(),
                entries: SlotMap::with_key(),
                seq: 0,
            })),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn set_timeout(&self, delay: Duration, f: impl Fn() + 'static) -> TimerHandle {
        self.add(delay, None, Rc::new(f))
    }

    pub fn set_interval(&self, every: Duration, f: impl Fn() + 'static) -> TimerHandle {
        self.add(every, Some(every), Rc::new(f))
    }

    fn add(&self, delay: Duration, interval: Option<Duration>, callback: Callback) -> TimerHandle {
        let at = self.clock.now() + delay;
        let mut inner = self.inner.borrow_mut();
        let handle = inner.entries.insert(Entry {
            callback,
            interval,
            cancelled: false,
        });
        inner.schedule(at, handle);
        log::trace!(
            "scheduled {} {:?} in {:?} ({} pending)",
            if interval.is_some() { "interval" } else { "timeout" },
            handle,
            delay,
            inner.entries.len()
        );
        handle
    }

    /// Cancels `handle`. Unknown, fired or already cleared handles are
    /// ignored with a warning.
    pub fn clear(&self, handle: TimerHandle) {
        let mut inner = self.inner.borrow_mut();
        match inner.entries.get_mut(handle) {
            Some(entry) if !entry.cancelled => {
                entry.cancelled = true;
                log::trace!("cleared {:?}", handle);
            }
            _ => log::warn!("clear: timer {:?} not found, ignoring", handle),
        }
    }

    /// Live (not cancelled) timers.
    pub fn pending(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .values()
            .filter(|e| !e.cancelled)
            .count()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.inner.borrow().live(handle).is_some()
    }

    /// Fires everything due at the clock's current time.
    pub fn run_due(&self) -> usize {
        self.poll(self.clock.now())
    }

    /// Fires every timer due at or before `now`, in due order, and returns how
    /// many callbacks ran.
    ///
    /// The due set is fixed before the first callback runs, so timers created
    /// or rescheduled during this poll wait for the next one. Each entry's
    /// cancelled flag is checked again right before its call.
    pub fn poll(&self, now: Instant) -> usize {
        let due: Vec<TimerHandle> = {
            let mut inner = self.inner.borrow_mut();
            let mut due = Vec::new();
            while let Some(Reverse((at, _, handle))) = inner.queue.peek().copied() {
                if at > now {
                    break;
                }
                inner.queue.pop();
                due.push(handle);
            }
            due
        };

        let mut fired = 0;
        for handle in due {
            let (callback, interval) = {
                let mut inner = self.inner.borrow_mut();
                let Some(entry) = inner.live(handle) else {
                    inner.entries.remove(handle);
                    continue;
                };
                let picked = (entry.callback.clone(), entry.interval);
                if picked.1.is_none() {
                    inner.entries.remove(handle);
                }
                picked
            };

            if let Err(fault) = isolate(|| callback()) {
                log::error!("timer {:?} callback panicked: {}", handle, fault);
            }
            fired += 1;

            if let Some(every) = interval {
                let mut inner = self.inner.borrow_mut();
                if inner.live(handle).is_some() {
                    inner.schedule(now + every, handle);
                } else {
                    inner.entries.remove(handle);
                }
            }
        }
        fired
    }

    /// Drops every timer without firing it.
    pub fn clear_all(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.queue.clear();
        inner.entries.clear();
    }
}

impl fmt::Debug for Timers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timers")
            .field("pending", &self.pending())
            .finish()
    }
}
