//! Cancellable timers on a simulated millisecond clock
//!
//! Every periodic or delayed piece of work is a task owned by this scheduler
//! and tagged with a scope. Entering a new level drops all level-scoped
//! tasks, so a stale timer can never fire against the next level's state.
//! Tasks come due one at a time, in due order (ties by creation order).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskKind {
    /// Maze ghosts wander
    GhostStep,
    /// Shooter simulation step
    ShooterTick,
    ShooterSpawn,
    EnemyFire,
    /// Sabotage message and flipped controls wear off
    SabotageExpiry,
    /// Transition banner disappears
    BannerExpiry,
}

/// Lifetime of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Cancelled whenever a level or game starts or ends
    Level,
    /// Cancelled only when play stops
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Task {
    id: TaskId,
    kind: TaskKind,
    scope: Scope,
    /// None for one-shot tasks
    period: Option<u64>,
    due: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    fn add(&mut self, kind: TaskKind, delay: u64, period: Option<u64>, scope: Scope) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            kind,
            scope,
            period,
            due: self.now + delay,
        });
        id
    }

    /// Run `kind` every `period` ms, first firing one period from now
    pub fn every(&mut self, kind: TaskKind, period: u64, scope: Scope) -> TaskId {
        let period = period.max(1);
        self.add(kind, period, Some(period), scope)
    }

    /// Run `kind` once, `delay` ms from now
    pub fn once(&mut self, kind: TaskKind, delay: u64, scope: Scope) -> TaskId {
        self.add(kind, delay, None, scope)
    }

    pub fn cancel(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
    }

    pub fn cancel_kind(&mut self, kind: TaskKind) {
        self.tasks.retain(|t| t.kind != kind);
    }

    pub fn cancel_scope(&mut self, scope: Scope) {
        self.tasks.retain(|t| t.scope != scope);
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Pop the earliest task due at or before `until`, moving the clock to
    /// its due time. Periodic tasks are re-armed, one-shots removed.
    pub fn pop_due(&mut self, until: u64) -> Option<TaskKind> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id.0))
            .map(|(i, _)| i)?;

        let task = &mut self.tasks[idx];
        self.now = self.now.max(task.due);
        let kind = task.kind;
        match task.period {
            Some(period) => task.due += period,
            None => {
                self.tasks.remove(idx);
            }
        }
        Some(kind)
    }

    /// Move the clock forward once nothing else is due
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler, until: u64) -> Vec<(u64, TaskKind)> {
        let mut fired = Vec::new();
        while let Some(kind) = s.pop_due(until) {
            fired.push((s.now(), kind));
        }
        s.settle(until);
        fired
    }

    #[test]
    fn test_periodic_and_one_shot_order() {
        let mut s = Scheduler::new();
        s.every(TaskKind::ShooterTick, 150, Scope::Level);
        s.every(TaskKind::ShooterSpawn, 300, Scope::Level);
        s.once(TaskKind::SabotageExpiry, 300, Scope::Session);

        let fired = drain(&mut s, 450);
        assert_eq!(
            fired,
            vec![
                (150, TaskKind::ShooterTick),
                (300, TaskKind::ShooterTick),
                (300, TaskKind::ShooterSpawn),
                (300, TaskKind::SabotageExpiry),
                (450, TaskKind::ShooterTick),
            ]
        );
        assert_eq!(s.now(), 450);
        assert!(!s.is_pending(TaskKind::SabotageExpiry));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_cancel_scope_keeps_session_tasks() {
        let mut s = Scheduler::new();
        s.every(TaskKind::GhostStep, 400, Scope::Level);
        s.once(TaskKind::BannerExpiry, 3000, Scope::Session);
        s.cancel_scope(Scope::Level);
        assert!(!s.is_pending(TaskKind::GhostStep));
        assert!(s.is_pending(TaskKind::BannerExpiry));

        assert_eq!(drain(&mut s, 2999), vec![]);
        assert_eq!(drain(&mut s, 3000), vec![(3000, TaskKind::BannerExpiry)]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_rescheduling_restarts_delay() {
        let mut s = Scheduler::new();
        s.once(TaskKind::SabotageExpiry, 3000, Scope::Session);
        drain(&mut s, 2000);
        s.cancel_kind(TaskKind::SabotageExpiry);
        s.once(TaskKind::SabotageExpiry, 3000, Scope::Session);
        assert_eq!(drain(&mut s, 4999), vec![]);
        assert_eq!(drain(&mut s, 5000), vec![(5000, TaskKind::SabotageExpiry)]);
    }

    #[test]
    fn test_cancel_by_id() {
        let mut s = Scheduler::new();
        let a = s.every(TaskKind::ShooterTick, 10, Scope::Level);
        s.every(TaskKind::ShooterTick, 10, Scope::Level);
        s.cancel(a);
        assert_eq!(drain(&mut s, 10).len(), 1);
    }
}
