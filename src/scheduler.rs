//! Deferred actions on a virtual clock.
//!
//! The host feeds elapsed time in; nothing here sleeps or spawns. Every task
//! belongs to the scheduler that created it, so dropping or clearing the
//! scheduler cancels everything it still holds.

use std::time::Duration;

/// What a scheduled task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// One-second countdown step
    Countdown,
    /// Post-answer advance, only valid while question `serial` is current
    Advance { serial: u64 },
    /// Auto-dismiss of the level-up banner
    HideLevelUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Task {
    id: TaskId,
    kind: Deferred,
    due: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule_once(&mut self, kind: Deferred, delay: Duration) -> TaskId {
        self.push(kind, delay, None)
    }

    /// Fires every `period`, first after one full period
    pub fn schedule_repeating(&mut self, kind: Deferred, period: Duration) -> TaskId {
        // zero periods would fire forever within one advance
        let period = period.max(Duration::from_millis(1));
        self.push(kind, period, Some(period))
    }

    fn push(&mut self, kind: Deferred, delay: Duration, period: Option<Duration>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            kind,
            due: self.now + delay,
            period,
        });
        id
    }

    /// Returns false if the task already fired or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Pop the earliest task due at or before `deadline`, moving the clock to
    /// its due time. Repeating tasks are re-queued one period later. Returns
    /// `None` once nothing else is due; the clock is then moved to `deadline`.
    ///
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(TaskId, Deferred)> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            self.now = self.now.max(deadline);
            return None;
        };

        let task = &mut self.tasks[idx];
        self.now = self.now.max(task.due);
        let fired = (task.id, task.kind);
        match task.period {
            Some(period) => task.due += period,
            None => {
                self.tasks.swap_remove(idx);
            }
        }
        Some(fired)
    }
}
