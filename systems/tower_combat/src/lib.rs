#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fire-rate gating for towers that hold a target.
//!
//! A tower that never fired is ready at once. Afterwards it must wait
//! `1000 / fire_rate` milliseconds of simulation time between shots, no
//! matter how that time is split across ticks.

use std::{cmp::Ordering, time::Duration};

use path_defence_core::{Command, TowerCooldownView, TowerTarget};

/// Pairs targeting output with tower cooldowns and queues the shots.
#[derive(Debug, Default)]
pub struct TowerCombat {
    assignments: Vec<TowerTarget>,
}

impl TowerCombat {
    /// Creates the system with an empty assignment buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes one `Command::FireProjectile` for every targeted tower whose
    /// cooldown has elapsed at `now`.
    ///
    /// Shots are emitted in tower order. A tower listed more than once keeps
    /// only its first assignment; towers missing from `cooldowns` are skipped.
    pub fn handle(
        &mut self,
        now: Duration,
        cooldowns: TowerCooldownView,
        targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        self.assignments.clear();
        self.assignments.extend_from_slice(targets);
        // Stable, so the first assignment of a tower stays in front.
        self.assignments.sort_by_key(|assignment| assignment.tower);
        self.assignments.dedup_by_key(|assignment| assignment.tower);

        let mut pending = self.assignments.iter().peekable();
        for cooldown in cooldowns.iter() {
            while let Some(assignment) = pending.peek() {
                match assignment.tower.cmp(&cooldown.tower) {
                    Ordering::Less => {
                        let _ = pending.next();
                    }
                    Ordering::Equal => {
                        if cooldown.is_ready(now) {
                            out.push(Command::FireProjectile {
                                tower: assignment.tower,
                                target: assignment.enemy,
                            });
                        }
                        let _ = pending.next();
                        break;
                    }
                    Ordering::Greater => break,
                }
            }
            if pending.peek().is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{EnemyId, TowerCooldownSnapshot, TowerId};

    fn cooldown(tower: u32, last_fired_ms: Option<u64>) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: TowerId::new(tower),
            last_fired: last_fired_ms.map(Duration::from_millis),
            fire_interval: Duration::from_millis(500),
        }
    }

    fn aim(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
        }
    }

    fn fire(tower: u32, enemy: u32) -> Command {
        Command::FireProjectile {
            tower: TowerId::new(tower),
            target: EnemyId::new(enemy),
        }
    }

    #[test]
    fn fresh_towers_fire_in_tower_order() {
        let view = TowerCooldownView::from_snapshots(vec![cooldown(5, None), cooldown(2, None)]);
        let mut out = Vec::new();

        TowerCombat::new().handle(Duration::ZERO, view, &[aim(5, 1), aim(2, 4)], &mut out);

        assert_eq!(out, vec![fire(2, 4), fire(5, 1)]);
    }

    #[test]
    fn cooling_towers_hold_fire_until_the_interval_passes() {
        let mut combat = TowerCombat::new();
        let targets = [aim(3, 9)];

        let mut out = Vec::new();
        let view = TowerCooldownView::from_snapshots(vec![cooldown(3, Some(600))]);
        combat.handle(Duration::from_millis(1_099), view, &targets, &mut out);
        assert!(out.is_empty());

        let view = TowerCooldownView::from_snapshots(vec![cooldown(3, Some(600))]);
        combat.handle(Duration::from_millis(1_100), view, &targets, &mut out);
        assert_eq!(out, vec![fire(3, 9)]);
    }

    #[test]
    fn unknown_and_duplicate_assignments_are_ignored() {
        let view = TowerCooldownView::from_snapshots(vec![cooldown(1, None), cooldown(8, None)]);
        let targets = [aim(8, 2), aim(42, 3), aim(8, 7), aim(0, 5)];
        let mut out = Vec::new();

        TowerCombat::new().handle(Duration::ZERO, view, &targets, &mut out);

        assert_eq!(out, vec![fire(8, 2)]);
    }

    #[test]
    fn idle_towers_stay_silent() {
        let view = TowerCooldownView::from_snapshots(vec![cooldown(1, None)]);
        let mut out = vec![fire(9, 9)];

        TowerCombat::new().handle(Duration::ZERO, view, &[], &mut out);

        assert_eq!(out, vec![fire(9, 9)]);
    }
}
