//! One-shot deferred tasks for a single-threaded event loop.
//!
//! The loop owns a [`TimerQueue`] and calls [`TimerQueue::expire`] once per
//! iteration with the current time. Tasks never run on another thread; a
//! cancelled task simply never comes back out of `expire`.

use std::time::Instant;

/// Opaque handle for a scheduled task. Handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    handle:   TimerHandle,
    deadline: Instant,
    task:     T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    entries:     Vec<Entry<T>>,
    next_handle: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self { TimerQueue { entries: Vec::new(), next_handle: 0 } }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self { Self::default() }

    /// Queue `task` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: Instant, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry { handle, deadline, task });
        handle
    }

    /// Drop a pending task. Returns false if it already fired or was
    /// cancelled, which is not an error.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.entries.iter().position(|e| e.handle == handle) {
            Some(i) => {
                self.entries.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove and return every task whose deadline is at or before `now`,
    /// earliest first.
    pub fn expire(&mut self, now: Instant) -> Vec<(TimerHandle, T)> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].deadline <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| (e.deadline, e.handle));
        due.into_iter().map(|e| (e.handle, e.task)).collect()
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn clear(&mut self) { self.entries.clear(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fires_only_when_due() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0 + Duration::from_millis(500), "hide");
        assert!(q.expire(t0 + Duration::from_millis(499)).is_empty());
        let fired = q.expire(t0 + Duration::from_millis(500));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, "hide");
        assert!(q.is_empty());
    }

    #[test]
    fn cancelled_task_never_fires() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        let h = q.schedule(t0, 1);
        assert!(q.cancel(h));
        assert!(q.expire(t0 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn cancel_unknown_handle_is_benign() {
        let t0 = Instant::now();
        let mut q = TimerQueue::<()>::new();
        let h = q.schedule(t0, ());
        q.expire(t0);
        assert!(!q.cancel(h));
    }

    #[test]
    fn expire_returns_deadline_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0 + Duration::from_millis(30), 'c');
        q.schedule(t0 + Duration::from_millis(10), 'a');
        q.schedule(t0 + Duration::from_millis(20), 'b');
        let order: Vec<char> = q.expire(t0 + Duration::from_secs(1)).into_iter().map(|(_, c)| c).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
    }

    #[test]
    fn handles_are_unique() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        let a = q.schedule(t0, ());
        let b = q.schedule(t0, ());
        assert_ne!(a, b);
        assert_eq!(q.len(), 2);
        assert!(q.cancel(a));
        assert!(q.cancel(b));
    }
}
