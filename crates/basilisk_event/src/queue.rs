//! # Event Queue
//!
//! Bounded FIFO of normalized events with a double-buffer reentrancy
//! guard.
//!
//! The queue lives on the single UI thread. The guard is not a mutex: it
//! is a two-state machine (Idle / Draining). While a [`DrainGuard`] is
//! live, newly produced events are redirected to an overflow buffer so a
//! consumer iterating the primary buffer never observes structural
//! mutation mid-scan; when the guard drops, overflow events merge into the
//! primary buffer in arrival order, before any new direct appends.
//!
//! The queue is deliberately lossy under backpressure: the browser's
//! synchronous dispatch cannot be blocked, so once the live count reaches
//! the high-water mark the oldest block of events is silently dropped.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::event::{
    standard_name, Event, EventKind, NUMEVENTS, STANDARD_KINDS, USEREVENT,
};

/// Total queue capacity.
pub const QUEUE_CAPACITY: usize = 256;
/// Live count that triggers compaction.
pub const HIGH_WATER: usize = 250;
/// Number of oldest events dropped per compaction.
pub const COMPACT_DROP: usize = 50;

/// Bounded, reentrancy-safe FIFO of input events.
#[derive(Debug)]
pub struct EventQueue {
    /// Primary buffer - never mutated while a drain guard is live.
    events: VecDeque<Event>,
    /// Overflow buffer owned by the Draining state.
    overflow: VecDeque<Event>,
    /// Reentrancy state flag, not a lock.
    draining: bool,
    /// Currently allowed kinds; events outside it are dropped on post.
    allowed: HashSet<EventKind>,
    /// User kinds seen so far, with their registered names.
    registered: HashMap<EventKind, String>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    /// Creates a queue allowing every standard kind.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(QUEUE_CAPACITY),
            overflow: VecDeque::new(),
            draining: false,
            allowed: STANDARD_KINDS.iter().copied().collect(),
            registered: HashMap::new(),
        }
    }

    /// Number of queued events (primary buffer only).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when no events are queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Posts an event.
    ///
    /// A blocked kind is dropped silently - application code toggles
    /// blocking dynamically and depends on the no-op. User kinds register
    /// themselves on first post so the allowed set and the name table stay
    /// consistent.
    pub fn post(&mut self, event: Event) {
        self.produce(event);
    }

    /// Producer entry point shared by `post` and the input dispatcher.
    pub fn produce(&mut self, event: Event) {
        if (USEREVENT..NUMEVENTS).contains(&event.kind) {
            self.register_user_kind(event.kind);
        }
        if !self.allowed.contains(&event.kind) {
            tracing::trace!(kind = event.kind, "dropped blocked event");
            return;
        }
        if self.draining {
            if self.overflow.len() < QUEUE_CAPACITY {
                self.overflow.push_back(event);
            }
            return;
        }
        self.merge_overflow();
        self.compact_if_needed();
        self.events.push_back(event);
    }

    /// Drains and returns queued events.
    ///
    /// With a filter, only matching events are returned; the rest keep
    /// their relative order for a later call. Runs under the drain guard,
    /// so a reentrant post lands in a subsequent `get`, never this one.
    #[must_use]
    pub fn get(&mut self, kinds: Option<&[EventKind]>) -> Vec<Event> {
        let mut guard = self.drain_guard();
        guard.take_matching(kinds)
    }

    /// Pops one event FIFO, or returns the NOEVENT sentinel.
    #[must_use]
    pub fn poll(&mut self) -> Event {
        self.merge_overflow();
        self.events.pop_front().unwrap_or_else(Event::no_event)
    }

    /// Checks whether any queued event matches, without removal.
    #[must_use]
    pub fn peek(&self, kinds: Option<&[EventKind]>) -> bool {
        match kinds {
            None => !self.events.is_empty(),
            Some(ks) => self.events.iter().any(|e| ks.contains(&e.kind)),
        }
    }

    /// Removes matching events without returning them.
    pub fn clear(&mut self, kinds: Option<&[EventKind]>) {
        let mut guard = self.drain_guard();
        let _ = guard.take_matching(kinds);
    }

    /// Queue housekeeping: merges overflow and compacts.
    ///
    /// Unnecessary when draining with the other methods; kept for
    /// API parity with hosts that only pump.
    pub fn pump(&mut self) {
        self.merge_overflow();
        self.compact_if_needed();
    }

    /// Blocks the given kinds, or resets to the full allowed set when
    /// `None` (standard kinds plus every registered user kind).
    pub fn set_blocked(&mut self, kinds: Option<&[EventKind]>) {
        match kinds {
            Some(ks) => {
                for k in ks {
                    self.allowed.remove(k);
                }
            }
            None => {
                self.allowed = STANDARD_KINDS.iter().copied().collect();
                self.allowed.extend(self.registered.keys().copied());
            }
        }
    }

    /// Allows the given kinds, or blocks everything when `None`.
    pub fn set_allowed(&mut self, kinds: Option<&[EventKind]>) {
        match kinds {
            Some(ks) => self.allowed.extend(ks.iter().copied()),
            None => self.allowed.clear(),
        }
    }

    /// Checks whether a kind is currently blocked.
    #[must_use]
    pub fn get_blocked(&self, kind: EventKind) -> bool {
        !self.allowed.contains(&kind)
    }

    /// Returns the name of an event kind, including registered user kinds.
    #[must_use]
    pub fn event_name(&self, kind: EventKind) -> Option<&str> {
        standard_name(kind).or_else(|| self.registered.get(&kind).map(String::as_str))
    }

    /// Enters the Draining state.
    ///
    /// While the returned guard is live, `produce` redirects to the
    /// overflow buffer. Dropping the guard merges overflow in arrival
    /// order.
    pub fn drain_guard(&mut self) -> DrainGuard<'_> {
        self.draining = true;
        DrainGuard { queue: self }
    }

    fn register_user_kind(&mut self, kind: EventKind) {
        if !self.registered.contains_key(&kind) {
            tracing::debug!(kind, "registered user event kind");
            self.registered.insert(kind, String::from("UserEvent"));
            self.allowed.insert(kind);
        }
    }

    fn merge_overflow(&mut self) {
        debug_assert!(!self.draining, "merge while draining");
        while let Some(ev) = self.overflow.pop_front() {
            self.compact_if_needed();
            self.events.push_back(ev);
        }
    }

    fn compact_if_needed(&mut self) {
        if self.events.len() >= HIGH_WATER {
            self.events.drain(..COMPACT_DROP);
            tracing::debug!(dropped = COMPACT_DROP, "event queue compacted");
        }
    }
}

/// RAII handle owning the queue's Draining state.
///
/// Holding a guard means the primary buffer is being iterated; produced
/// events are redirected to the overflow buffer until the guard drops.
#[derive(Debug)]
pub struct DrainGuard<'a> {
    queue: &'a mut EventQueue,
}

impl DrainGuard<'_> {
    /// Produces an event while draining - it is redirected to the
    /// overflow buffer and surfaces in a later `get`.
    pub fn produce(&mut self, event: Event) {
        self.queue.produce(event);
    }

    /// Drains matching events from the primary buffer.
    ///
    /// `None` takes everything. Non-matching events are kept in their
    /// original relative order.
    pub fn take_matching(&mut self, kinds: Option<&[EventKind]>) -> Vec<Event> {
        match kinds {
            None => self.queue.events.drain(..).collect(),
            Some(ks) => {
                let mut matched = Vec::new();
                let mut kept = VecDeque::with_capacity(self.queue.events.len());
                for ev in self.queue.events.drain(..) {
                    if ks.contains(&ev.kind) {
                        matched.push(ev);
                    } else {
                        kept.push_back(ev);
                    }
                }
                self.queue.events = kept;
                matched
            }
        }
    }

    /// Iterates the primary buffer without removal.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.queue.events.iter()
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.queue.draining = false;
        self.queue.merge_overflow();
    }
}
