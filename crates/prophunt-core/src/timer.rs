/// What one countdown tick reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStep<K> {
    pub key: K,
    /// Seconds left at the time of the tick, before decrementing.
    pub remaining: u32,
    /// The countdown reached zero and is now disarmed.
    pub completed: bool,
}

/// A single countdown labelled with the phase it belongs to.
///
/// Starting a new countdown replaces the armed one, so there is never more
/// than one.
#[derive(Debug, Clone, Default)]
pub struct Countdown<K> {
    key: Option<K>,
    remaining: u32,
    paused: bool,
}

impl<K: Copy + PartialEq> Countdown<K> {
    pub fn new() -> Self {
        Self {
            key: None,
            remaining: 0,
            paused: false,
        }
    }

    pub fn start(&mut self, key: K, seconds: u32) {
        self.key = Some(key);
        self.remaining = seconds;
        self.paused = false;
    }

    pub fn stop(&mut self) {
        self.key = None;
        self.remaining = 0;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        if self.key.is_some() {
            self.paused = true;
        }
    }

    /// Resume a paused countdown. Only possible while time remains.
    pub fn resume(&mut self) -> bool {
        if self.key.is_some() && self.paused && self.remaining > 0 {
            self.paused = false;
            return true;
        }
        false
    }

    /// Report the current second, then complete or decrement.
    pub fn tick(&mut self) -> Option<CountdownStep<K>> {
        if self.paused {
            return None;
        }
        let key = self.key?;
        let remaining = self.remaining;
        let completed = remaining == 0;
        if completed {
            self.key = None;
        } else {
            self.remaining -= 1;
        }
        Some(CountdownStep {
            key,
            remaining,
            completed,
        })
    }

    pub fn add_time(&mut self, seconds: u32) {
        self.remaining = self.remaining.saturating_add(seconds);
    }

    pub fn remove_time(&mut self, seconds: u32) {
        self.remaining = self.remaining.saturating_sub(seconds);
    }

    pub fn set_time(&mut self, seconds: u32) {
        self.remaining = seconds;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn key(&self) -> Option<K> {
        self.key
    }

    /// Whether the countdown labelled `key` is armed.
    pub fn is_armed(&self, key: K) -> bool {
        self.key == Some(key)
    }

    pub fn is_running(&self) -> bool {
        self.key.is_some() && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Remaining time as `m:ss`.
    pub fn formatted(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

/// Handle returned when scheduling, used to cancel.
pub type TaskId = u64;

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    due_at: u64,
    period: Option<u64>,
    task: T,
}

/// One-shot and repeating tasks keyed by session-clock milliseconds.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: TaskId,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_delayed(&mut self, now: u64, delay_ms: u64, task: T) -> TaskId {
        self.push(now + delay_ms, None, task)
    }

    /// First run after `delay_ms`, then every `period_ms`.
    pub fn run_repeating(&mut self, now: u64, delay_ms: u64, period_ms: u64, task: T) -> TaskId {
        self.push(now + delay_ms, Some(period_ms.max(1)), task)
    }

    fn push(&mut self, due_at: u64, period: Option<u64>, task: T) -> TaskId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(Entry {
            id,
            due_at,
            period,
            task,
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel every task matching `pred`; returns how many were dropped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.task));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.entries.iter().any(|e| pred(&e.task))
    }

    /// Pop every task due at `now`, ordered by due time then scheduling
    /// order. Repeating tasks are re-armed one period later.
    pub fn due(&mut self, now: u64) -> Vec<T> {
        let mut fired: Vec<(u64, TaskId, T)> = self
            .entries
            .iter()
            .filter(|e| e.due_at <= now)
            .map(|e| (e.due_at, e.id, e.task.clone()))
            .collect();
        if fired.is_empty() {
            return Vec::new();
        }
        fired.sort_by_key(|(due_at, id, _)| (*due_at, *id));

        self.entries.retain_mut(|e| {
            if e.due_at > now {
                return true;
            }
            match e.period {
                Some(period) => {
                    e.due_at += period;
                    true
                }
                None => false,
            }
        });
        fired.into_iter().map(|(_, _, task)| task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        Lobby,
        Hide,
    }

    // ================================================================
    // Countdown
    // ================================================================

    #[test]
    fn countdown_reports_then_completes() {
        let mut c = Countdown::new();
        c.start(Phase::Lobby, 2);
        let steps: Vec<_> = std::iter::from_fn(|| c.tick()).collect();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].remaining, 2);
        assert_eq!(steps[2].remaining, 0);
        assert!(steps[2].completed);
        assert!(!c.is_running());
        assert!(c.tick().is_none());
    }

    #[test]
    fn start_replaces_armed_countdown() {
        let mut c = Countdown::new();
        c.start(Phase::Lobby, 30);
        c.start(Phase::Hide, 10);
        assert!(c.is_armed(Phase::Hide));
        assert!(!c.is_armed(Phase::Lobby));
        assert_eq!(c.remaining(), 10);
    }

    #[test]
    fn stop_clears_remaining() {
        let mut c = Countdown::new();
        c.start(Phase::Lobby, 30);
        c.stop();
        assert_eq!(c.remaining(), 0);
        assert_eq!(c.key(), None);
        assert!(c.tick().is_none());
    }

    #[test]
    fn pause_and_resume() {
        let mut c = Countdown::new();
        c.start(Phase::Hide, 5);
        c.pause();
        assert!(c.tick().is_none());
        assert!(c.resume());
        assert_eq!(c.tick().map(|s| s.remaining), Some(5));
        c.set_time(0);
        c.pause();
        assert!(!c.resume());
    }

    #[test]
    fn time_adjustments_floor_at_zero() {
        let mut c = Countdown::new();
        c.start(Phase::Hide, 10);
        c.add_time(20);
        assert_eq!(c.remaining(), 30);
        c.remove_time(100);
        assert_eq!(c.remaining(), 0);
        c.set_time(125);
        assert_eq!(c.formatted(), "2:05");
    }

    // ================================================================
    // Scheduler
    // ================================================================

    #[test]
    fn delayed_tasks_fire_once_in_order() {
        let mut s = Scheduler::new();
        s.run_delayed(0, 200, "b");
        s.run_delayed(0, 100, "a");
        s.run_delayed(0, 200, "c");
        assert!(s.due(99).is_empty());
        assert_eq!(s.due(250), vec!["a", "b", "c"]);
        assert!(s.is_empty());
    }

    #[test]
    fn repeating_task_rearms() {
        let mut s = Scheduler::new();
        s.run_repeating(0, 1000, 1000, "taunt");
        assert!(s.due(999).is_empty());
        assert_eq!(s.due(1000), vec!["taunt"]);
        assert!(s.due(1500).is_empty());
        assert_eq!(s.due(2000), vec!["taunt"]);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn cancel_by_id_and_predicate() {
        let mut s = Scheduler::new();
        let a = s.run_delayed(0, 10, 1);
        s.run_delayed(0, 10, 2);
        s.run_delayed(0, 10, 3);
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(s.cancel_where(|t| *t == 2), 1);
        assert_eq!(s.due(10), vec![3]);
        s.run_delayed(0, 10, 4);
        s.clear();
        assert!(s.due(100).is_empty());
    }
}
