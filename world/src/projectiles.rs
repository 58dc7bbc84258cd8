use glam::Vec3;
use path_defence_core::{
    EnemyId, ProjectileId, ProjectileProfile, ProjectileSnapshot, SlowEffect, TowerConfig,
    TowerKind,
};

/// Three-dimensional distance at which a travelling projectile connects.
const HIT_THRESHOLD: f32 = 0.2;

/// Single-use shot carrying a copy of the firing tower's parameters.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) kind: TowerKind,
    pub(crate) position: Vec3,
    pub(crate) target: EnemyId,
    pub(crate) damage: u32,
    pub(crate) speed: f32,
    pub(crate) hitscan: bool,
    pub(crate) aoe_radius: Option<f32>,
    pub(crate) slow: Option<SlowEffect>,
    pub(crate) alive: bool,
}

impl Projectile {
    pub(crate) fn launch(
        id: ProjectileId,
        kind: TowerKind,
        origin: Vec3,
        target: EnemyId,
        config: &TowerConfig,
        profile: &ProjectileProfile,
    ) -> Self {
        Self {
            id,
            kind,
            position: origin,
            target,
            damage: config.damage,
            speed: profile.speed,
            hitscan: profile.hitscan,
            aoe_radius: profile.aoe_radius,
            slow: config.slow,
            alive: true,
        }
    }

    /// Flies toward a linearly predicted intercept point.
    ///
    /// The lead is recomputed each tick from the target's current position
    /// and velocity. Returns `true` once the projectile is close enough to
    /// the target's actual position to connect.
    pub(crate) fn steer(&mut self, target_position: Vec3, target_velocity: Vec3, dt: f32) -> bool {
        if self.speed > 0.0 {
            let time_to_reach = self.position.distance(target_position) / self.speed;
            let predicted = target_position + target_velocity * time_to_reach;
            let offset = predicted - self.position;
            let distance = offset.length();
            if distance > 0.0 {
                let step = (self.speed * dt).min(distance);
                self.position += offset / distance * step;
            }
        }

        self.position.distance(target_position) < HIT_THRESHOLD
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            target: self.target,
            damage: self.damage,
        }
    }
}
