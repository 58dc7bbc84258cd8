use std::time::Duration;

use glam::Vec3;
use path_defence_core::{EnemyId, EnemyKind, EnemySnapshot, EnemyStats, SlowEffect};

/// Distance below which an enemy counts as having reached a path point.
const WAYPOINT_THRESHOLD: f32 = 0.1;

/// Outcome of advancing an enemy for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Traversal {
    Moving,
    ReachedEnd,
}

/// Outcome of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Wounded,
    Killed,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) speed: f32,
    pub(crate) reward: u32,
    pub(crate) flying: bool,
    pub(crate) path_index: usize,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) slow_factor: f32,
    pub(crate) slow_until: Option<Duration>,
    pub(crate) alive: bool,
}

impl Enemy {
    pub(crate) fn new(
        id: EnemyId,
        kind: EnemyKind,
        stats: EnemyStats,
        flying: bool,
        origin: Vec3,
    ) -> Self {
        Self {
            id,
            kind,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            reward: stats.reward,
            flying,
            path_index: 0,
            position: origin,
            velocity: Vec3::ZERO,
            slow_factor: 1.0,
            slow_until: None,
            alive: true,
        }
    }

    /// Clears an expired slow. The effect holds while `now <= expiry`.
    pub(crate) fn expire_slow(&mut self, now: Duration) {
        if let Some(until) = self.slow_until {
            if now > until {
                self.slow_factor = 1.0;
                self.slow_until = None;
            }
        }
    }

    /// Replaces any active slow with the new one.
    pub(crate) fn apply_slow(&mut self, effect: SlowEffect, now: Duration) {
        self.slow_factor = effect.factor;
        self.slow_until = Some(now.saturating_add(effect.duration()));
    }

    pub(crate) fn take_damage(&mut self, damage: u32) -> DamageOutcome {
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.alive = false;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Walks toward the next path point without overshooting it.
    ///
    /// Reaching a point only advances the index; movement resumes on the
    /// following tick.
    pub(crate) fn advance(&mut self, route: &[Vec3], dt: f32) -> Traversal {
        let Some(&next) = route.get(self.path_index + 1) else {
            self.alive = false;
            self.velocity = Vec3::ZERO;
            return Traversal::ReachedEnd;
        };

        let offset = next - self.position;
        let distance = offset.length();
        if distance < WAYPOINT_THRESHOLD {
            self.path_index += 1;
            return Traversal::Moving;
        }

        let speed = self.speed * self.slow_factor;
        let step = (speed * dt).min(distance);
        let direction = offset / distance;
        self.position += direction * step;
        self.velocity = direction * speed;
        Traversal::Moving
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            velocity: self.velocity,
            health: self.health,
            max_health: self.max_health,
            flying: self.flying,
            path_index: self.path_index,
            slow_factor: self.slow_factor,
        }
    }
}
