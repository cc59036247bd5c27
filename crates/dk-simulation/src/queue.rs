use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use dk_core::{ActorId, SimTime};

/// Raised when popping from a queue with no live entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// Nothing is scheduled.
    #[error("turn queue is empty")]
    Empty,
}

/// Heap entry. Ordered by time, then by the sequence number handed out at
/// scheduling, so equal times pop in the order they were last scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    time: SimTime,
    seq: u64,
    actor: ActorId,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Global ordering of live actors by next-action time.
///
/// Rescheduling and removal are lazy: the live map records the one valid
/// `(time, seq)` per actor and stale heap entries are skipped when popped.
/// The heap is rebuilt once stale entries dominate it.
#[derive(Debug, Clone, Default)]
pub struct TurnQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    live: HashMap<ActorId, (SimTime, u64)>,
    next_seq: u64,
}

impl TurnQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `actor` at `time`, replacing any earlier scheduling of it.
    pub fn schedule(&mut self, actor: ActorId, time: SimTime) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(actor, (time, seq));
        self.heap.push(Reverse(Entry { time, seq, actor }));
        self.maybe_compact();
    }

    /// Remove and return the actor with the smallest time.
    pub fn pop_next(&mut self) -> Result<(ActorId, SimTime), QueueError> {
        while let Some(Reverse(entry)) = self.heap.pop() {
            if self.is_current(&entry) {
                self.live.remove(&entry.actor);
                return Ok((entry.actor, entry.time));
            }
        }
        Err(QueueError::Empty)
    }

    /// The entry `pop_next` would return, without removing it.
    pub fn peek(&mut self) -> Option<(ActorId, SimTime)> {
        while let Some(Reverse(entry)) = self.heap.peek().copied() {
            if self.is_current(&entry) {
                return Some((entry.actor, entry.time));
            }
            self.heap.pop();
        }
        None
    }

    /// Forget `actor`. Returns whether it was scheduled; absent actors are a
    /// no-op.
    pub fn remove(&mut self, actor: ActorId) -> bool {
        let removed = self.live.remove(&actor).is_some();
        if removed {
            self.maybe_compact();
        }
        removed
    }

    /// Whether `actor` is scheduled.
    pub fn contains(&self, actor: ActorId) -> bool {
        self.live.contains_key(&actor)
    }

    /// Time `actor` is scheduled at.
    pub fn time_of(&self, actor: ActorId) -> Option<SimTime> {
        self.live.get(&actor).map(|&(time, _)| time)
    }

    /// Number of scheduled actors.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if nobody is scheduled.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn is_current(&self, entry: &Entry) -> bool {
        self.live.get(&entry.actor) == Some(&(entry.time, entry.seq))
    }

    fn maybe_compact(&mut self) {
        if self.heap.len() <= 2 * self.live.len() + 64 {
            return;
        }
        self.heap = self
            .live
            .iter()
            .map(|(&actor, &(time, seq))| Reverse(Entry { time, seq, actor }))
            .collect();
    }
}
