//! Deterministic timer wheel
//!
//! Every mini-game owns one `Clock`. Repeating timers (countdown, game clock,
//! physics step) and one-shot delays (pair resolution, hit flash, penalty
//! window) are scheduled on it and addressed by handle. Nothing here sleeps:
//! the host advances time and the engine drains due timers one at a time, so
//! every state change made by one firing is complete before the next fires.

/// Simulation time in milliseconds
pub type Millis = u64;

/// Handle to a scheduled timer, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u32);

#[derive(Debug, Clone)]
struct Timer<K> {
    handle: TimerHandle,
    kind: K,
    due: Millis,
    /// `None` for one-shot delays
    period: Option<Millis>,
}

/// Per-engine scheduler of repeating and one-shot timers
#[derive(Debug, Clone)]
pub struct Clock<K> {
    now: Millis,
    timers: Vec<Timer<K>>,
    next_handle: u32,
}

impl<K: Copy> Default for Clock<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> Clock<K> {
    pub fn new() -> Self {
        Self {
            now: 0,
            timers: Vec::new(),
            next_handle: 1,
        }
    }

    /// Current simulation time
    #[inline]
    pub fn now(&self) -> Millis {
        self.now
    }

    fn allocate(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Schedule `kind` to fire every `period` ms, first firing one period from now
    pub fn every(&mut self, period: Millis, kind: K) -> TimerHandle {
        let period = period.max(1);
        let handle = self.allocate();
        self.timers.push(Timer {
            handle,
            kind,
            due: self.now + period,
            period: Some(period),
        });
        handle
    }

    /// Schedule `kind` to fire once after `delay` ms
    pub fn after(&mut self, delay: Millis, kind: K) -> TimerHandle {
        let handle = self.allocate();
        self.timers.push(Timer {
            handle,
            kind,
            due: self.now + delay,
            period: None,
        });
        handle
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Cancel the timer in `slot` (if any) and clear the slot
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `until`, moving `now` to its
    /// due time. Ties fire in scheduling order. Repeating timers are
    /// rescheduled before being returned.
    pub fn pop_due(&mut self, until: Millis) -> Option<K> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.handle))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[index];
        self.now = self.now.max(timer.due);
        let kind = timer.kind;
        match timer.period {
            Some(period) => timer.due += period,
            None => {
                self.timers.swap_remove(index);
            }
        }
        Some(kind)
    }

    /// Move `now` forward to `until` once every due timer has been drained
    pub fn settle(&mut self, until: Millis) {
        self.now = self.now.max(until);
    }
}
