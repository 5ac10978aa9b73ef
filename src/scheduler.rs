use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

struct Entry<A> {
    due: Duration,
    seq: u64,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

// Reversed so the max-heap pops the earliest due time, then the earliest insertion.
impl<A> Ord for Entry<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deferred actions ordered by due time, drained once per frame.
pub struct Scheduler<A> {
    queue: BinaryHeap<Entry<A>>,
    next_seq: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self { Self { queue: BinaryHeap::new(), next_seq: 0 } }
}

impl<A> Scheduler<A> {
    pub fn schedule(&mut self, due: Duration, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { due, seq, action });
    }

    /// Pops the next action whose due time is not after `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<A> {
        if self.queue.peek().is_some_and(|entry| entry.due <= now) {
            self.queue.pop().map(|entry| entry.action)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_then_insertion_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(Duration::from_millis(200), "late");
        scheduler.schedule(Duration::from_millis(100), "first");
        scheduler.schedule(Duration::from_millis(100), "second");

        assert_eq!(scheduler.pop_due(Duration::from_millis(50)), None);
        assert_eq!(scheduler.pop_due(Duration::from_millis(150)), Some("first"));
        assert_eq!(scheduler.pop_due(Duration::from_millis(150)), Some("second"));
        assert_eq!(scheduler.pop_due(Duration::from_millis(150)), None);
        assert_eq!(scheduler.pop_due(Duration::from_millis(200)), Some("late"));
        assert_eq!(scheduler.pop_due(Duration::MAX), None);
    }
}
