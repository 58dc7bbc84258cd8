//! Hit resolution for projectiles that reached their target.

use std::{collections::BTreeMap, time::Duration};

use path_defence_core::{planar_distance, EnemyId, Event};

use crate::{
    defender::Defender,
    enemies::{DamageOutcome, Enemy},
    projectiles::Projectile,
    Tally,
};

/// Mutable state touched while resolving a hit.
pub(crate) struct HitContext<'a> {
    pub(crate) enemies: &'a mut BTreeMap<EnemyId, Enemy>,
    pub(crate) defender: &'a mut Defender,
    pub(crate) tally: &'a mut Tally,
    pub(crate) now: Duration,
}

/// Damage dealt at `distance` from the centre of a blast of `radius`.
///
/// Falls off linearly to half damage at the edge and is floored. Returns
/// `None` outside the blast.
pub(crate) fn falloff_damage(damage: u32, distance: f32, radius: f32) -> Option<u32> {
    if !(distance <= radius) || radius <= 0.0 {
        return None;
    }
    let factor = 1.0 - (f64::from(distance) / f64::from(radius)) * 0.5;
    Some(path_defence_core::floor_scaled(damage, factor))
}

/// Applies the projectile's payload and spends it.
pub(crate) fn resolve_hit(
    projectile: &mut Projectile,
    context: &mut HitContext<'_>,
    out_events: &mut Vec<Event>,
) {
    projectile.alive = false;

    let Some(target) = context.enemies.get(&projectile.target) else {
        return;
    };
    if !target.alive {
        return;
    }

    match projectile.aoe_radius {
        Some(radius) => {
            let centre = target.position;
            let victims: Vec<(EnemyId, u32)> = context
                .enemies
                .values()
                .filter(|enemy| enemy.alive)
                .filter_map(|enemy| {
                    falloff_damage(
                        projectile.damage,
                        planar_distance(centre, enemy.position),
                        radius,
                    )
                    .map(|damage| (enemy.id, damage))
                })
                .collect();

            for (enemy, damage) in victims {
                damage_enemy(context, enemy, damage, out_events);
            }
        }
        None => {
            if let (Some(slow), Some(enemy)) =
                (projectile.slow, context.enemies.get_mut(&projectile.target))
            {
                enemy.apply_slow(slow, context.now);
                out_events.push(Event::SlowApplied);
            }
            damage_enemy(context, projectile.target, projectile.damage, out_events);
        }
    }
}

fn damage_enemy(
    context: &mut HitContext<'_>,
    enemy_id: EnemyId,
    damage: u32,
    out_events: &mut Vec<Event>,
) {
    let Some(enemy) = context.enemies.get_mut(&enemy_id) else {
        return;
    };
    if !enemy.alive {
        return;
    }

    out_events.push(Event::EnemyHit { damage });
    if enemy.take_damage(damage) == DamageOutcome::Killed {
        context.defender.reward_kill(enemy.reward);
        context.tally.kills = context.tally.kills.saturating_add(1);
        tracing::debug!(enemy = enemy.id.get(), kind = %enemy.kind, "enemy killed");
        out_events.push(Event::EnemyKilled { kind: enemy.kind });
    }
}
