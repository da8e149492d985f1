//! Per-room scheduled-task queue, processed once per tick.
//!
//! Tasks carry ids, never references: when a task fires, the executor
//! re-validates its subject against current room state, so a task whose
//! subject has disappeared in the meantime is a no-op.

use trench_core::player::PlayerId;

/// A deferred room mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// One pulse of a health potion's over-time heal.
    PotionHealTick {
        player: PlayerId,
        remaining: u32,
        heal_per_tick: f32,
    },
    /// A revive channel reached its full duration.
    ReviveChannelComplete { target: PlayerId, by: PlayerId },
    /// The accept window after a completed channel ran out.
    ReviveWindowExpire { target: PlayerId },
    /// A previously looted chest becomes lootable again.
    ChestRespawn { chest_id: String },
}

#[derive(Debug, Clone)]
struct Entry {
    at: f64,
    task: Task,
}

/// Time-ordered task queue. Small per room, so a sorted drain over a Vec
/// beats a heap in practice.
#[derive(Debug, Default)]
pub struct Schedule {
    entries: Vec<Entry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_at(&mut self, at: f64, task: Task) {
        self.entries.push(Entry { at, task });
    }

    /// Remove and return every task due at or before `now`, in firing order.
    pub fn pop_due(&mut self, now: f64) -> Vec<Task> {
        let mut due: Vec<Entry> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].at <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.at.total_cmp(&b.at));
        due.into_iter().map(|e| e.task).collect()
    }

    /// Drop all revive-related tasks touching `player`, as either party.
    pub fn cancel_revive(&mut self, player: PlayerId) {
        self.entries.retain(|e| {
            !matches!(
                &e.task,
                Task::ReviveChannelComplete { target, by } if *target == player || *by == player
            ) && !matches!(&e.task, Task::ReviveWindowExpire { target } if *target == player)
        });
    }

    /// Drop pending potion pulses for `player`.
    pub fn cancel_potion(&mut self, player: PlayerId) {
        self.entries
            .retain(|e| !matches!(&e.task, Task::PotionHealTick { player: p, .. } if *p == player));
    }

    /// Drop every task referencing `player` in any role.
    pub fn cancel_player(&mut self, player: PlayerId) {
        self.cancel_revive(player);
        self.cancel_potion(player);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_due_is_time_ordered() {
        let mut s = Schedule::new();
        s.push_at(3.0, Task::ReviveWindowExpire { target: 3 });
        s.push_at(1.0, Task::ReviveWindowExpire { target: 1 });
        s.push_at(2.0, Task::ReviveWindowExpire { target: 2 });
        s.push_at(9.0, Task::ReviveWindowExpire { target: 9 });

        let due = s.pop_due(5.0);
        let targets: Vec<PlayerId> = due
            .iter()
            .map(|t| match t {
                Task::ReviveWindowExpire { target } => *target,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(targets, vec![1, 2, 3]);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn pop_due_empty_before_time() {
        let mut s = Schedule::new();
        s.push_at(10.0, Task::ChestRespawn {
            chest_id: "gold_1".into(),
        });
        assert!(s.pop_due(9.99).is_empty());
        assert_eq!(s.pop_due(10.0).len(), 1);
        assert!(s.is_empty());
    }

    #[test]
    fn cancel_revive_hits_both_roles() {
        let mut s = Schedule::new();
        s.push_at(1.0, Task::ReviveChannelComplete { target: 1, by: 2 });
        s.push_at(2.0, Task::ReviveChannelComplete { target: 3, by: 1 });
        s.push_at(3.0, Task::ReviveWindowExpire { target: 1 });
        s.push_at(4.0, Task::ReviveChannelComplete { target: 4, by: 5 });
        s.cancel_revive(1);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn cancel_potion_leaves_other_players() {
        let mut s = Schedule::new();
        s.push_at(1.0, Task::PotionHealTick {
            player: 1,
            remaining: 3,
            heal_per_tick: 5.0,
        });
        s.push_at(1.0, Task::PotionHealTick {
            player: 2,
            remaining: 3,
            heal_per_tick: 5.0,
        });
        s.cancel_potion(1);
        assert_eq!(s.len(), 1);
    }
}
