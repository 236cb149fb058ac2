use foundation::time::Millis;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Key {
    due: Millis,
    id: TimerId,
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
struct Entry<T> {
    key: Key,
    every_ms: Option<u64>,
    payload: T,
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub at: Millis,
    pub payload: T,
}

/// Deterministic timer wheel driven by virtual time.
///
/// Key properties:
/// - Total ordering on `(due, id)`: timers due at the same instant fire in
///   scheduling order.
/// - Recurring timers keep their `TimerId` across firings, so a single
///   `cancel` stops them for good.
/// - Time only moves when the owner calls [`TimerWheel::pop_due`]; nothing
///   here reads the wall clock.
///
/// Vec-backed: the state machines using it hold a handful of timers at most.
#[derive(Debug)]
pub struct TimerWheel<T> {
    now: Millis,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerWheel<T> {
    fn default() -> Self {
        Self {
            now: Millis::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> TimerWheel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: Millis) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.key.id == id)
    }

    /// Fires once, `delay_ms` after the current time.
    pub fn schedule_once(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.insert(delay_ms, None, payload)
    }

    /// Fires every `every_ms` (at least 1ms), first after one full interval.
    pub fn schedule_every(&mut self, every_ms: u64, payload: T) -> TimerId {
        let every_ms = every_ms.max(1);
        self.insert(every_ms, Some(every_ms), payload)
    }

    fn insert(&mut self, delay_ms: u64, every_ms: Option<u64>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            key: Key {
                due: self.now.plus(delay_ms),
                id,
            },
            every_ms,
            payload,
        });
        id
    }

    /// Returns `true` if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Pops the earliest timer due at or before `until`.
    ///
    /// Time advances to the fired timer's due instant, so handlers that
    /// schedule new timers measure from the right origin. When nothing is
    /// due, time advances to `until` and `None` is returned. Callers drain
    /// with `while let` and may cancel or schedule between pops.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<T>> {
        let mut best_idx: Option<usize> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.key.due > until {
                continue;
            }
            match best_idx {
                None => best_idx = Some(idx),
                Some(best) => {
                    if entry.key < self.entries[best].key {
                        best_idx = Some(idx);
                    }
                }
            }
        }

        let Some(idx) = best_idx else {
            if until > self.now {
                self.now = until;
            }
            return None;
        };

        let key = self.entries[idx].key;
        if key.due > self.now {
            self.now = key.due;
        }

        let payload = match self.entries[idx].every_ms {
            Some(every_ms) => {
                let entry = &mut self.entries[idx];
                entry.key.due = key.due.plus(every_ms);
                entry.payload.clone()
            }
            None => self.entries.swap_remove(idx).payload,
        };

        Some(Fired {
            id: key.id,
            at: key.due,
            payload,
        })
    }
}
