use std::time::Duration;

use glam::Vec3;
use path_defence_core::{
    CellCoord, EnemyId, TowerConfig, TowerCooldownSnapshot, TowerId, TowerKind, TowerSnapshot,
};

/// Tower instance holding its own configuration snapshot.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec3,
    pub(crate) config: TowerConfig,
    pub(crate) upgrades: u32,
    pub(crate) last_fired: Option<Duration>,
    pub(crate) target: Option<EnemyId>,
}

impl Tower {
    pub(crate) fn new(
        id: TowerId,
        kind: TowerKind,
        cell: CellCoord,
        position: Vec3,
        config: TowerConfig,
    ) -> Self {
        Self {
            id,
            kind,
            cell,
            position,
            config,
            upgrades: 0,
            last_fired: None,
            target: None,
        }
    }

    pub(crate) fn is_ready(&self, now: Duration) -> bool {
        self.cooldown().is_ready(now)
    }

    /// Stamps a shot fired during the tick that began at `tick_start`.
    ///
    /// A tower with a previous shot is stamped at the moment its cooldown
    /// ran out, clamped into the current tick, so the cadence does not drift
    /// with tick length.
    pub(crate) fn record_shot(&mut self, now: Duration, tick_start: Duration) {
        let stamp = match self.last_fired {
            None => now,
            Some(last) => last
                .saturating_add(self.config.fire_interval())
                .max(tick_start)
                .min(now),
        };
        self.last_fired = Some(stamp);
    }

    /// Applies one upgrade. Projectiles already in flight keep their own copy.
    pub(crate) fn upgrade(&mut self) {
        self.config = self.config.upgraded();
        self.upgrades = self.upgrades.saturating_add(1);
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            config: self.config,
            upgrades: self.upgrades,
            target: self.target,
        }
    }

    pub(crate) fn cooldown(&self) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: self.id,
            last_fired: self.last_fired,
            fire_interval: self.config.fire_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Tower;
    use glam::Vec3;
    use path_defence_core::{Catalog, CellCoord, TowerId, TowerKind};
    use std::time::Duration;

    fn laser() -> Tower {
        Tower::new(
            TowerId::new(0),
            TowerKind::Laser,
            CellCoord::new(1, 1),
            Vec3::new(1.5, 0.0, 1.5),
            *Catalog::default().tower(TowerKind::Laser),
        )
    }

    #[test]
    fn fresh_tower_fires_immediately_then_waits() {
        let mut tower = laser();
        assert!(tower.is_ready(Duration::ZERO));
        tower.record_shot(Duration::from_millis(100), Duration::from_millis(90));
        assert!(!tower.is_ready(Duration::from_millis(599)));
        assert!(tower.is_ready(Duration::from_millis(600)));
    }

    #[test]
    fn late_shots_keep_the_cadence() {
        let mut tower = laser();
        tower.record_shot(Duration::from_millis(10), Duration::ZERO);

        // Ready at 510 ms, fired on the tick spanning 500..533 ms.
        tower.record_shot(Duration::from_millis(533), Duration::from_millis(500));
        assert_eq!(tower.last_fired, Some(Duration::from_millis(510)));
        assert!(tower.is_ready(Duration::from_millis(1_010)));
    }

    #[test]
    fn idle_towers_restart_from_the_tick_start() {
        let mut tower = laser();
        tower.record_shot(Duration::from_millis(10), Duration::ZERO);

        tower.record_shot(Duration::from_millis(5_033), Duration::from_millis(5_000));
        assert_eq!(tower.last_fired, Some(Duration::from_millis(5_000)));
    }

    #[test]
    fn upgrades_mutate_only_the_instance() {
        let catalog = Catalog::default();
        let mut tower = laser();
        tower.upgrade();
        assert_eq!(tower.upgrades, 1);
        assert_eq!(tower.config.damage, 39);
        assert_eq!(catalog.tower(TowerKind::Laser).damage, 30);
        assert!(tower.cooldown().fire_interval < Duration::from_millis(500));
    }
}
