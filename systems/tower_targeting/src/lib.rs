#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec3;
use path_defence_core::{
    planar_distance, EnemyId, EnemyView, TowerId, TowerKind, TowerTarget, TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Every tower picks the nearest alive enemy strictly inside its range,
    /// measured on the ground plane. Flying enemies are only considered by
    /// towers able to hit them. The output buffer is cleared before
    /// populating it with the latest assignments.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        self.prepare_enemy_workspace(enemies);

        for tower in &self.tower_workspace {
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                if candidate.flying && !tower.kind.hits_flying() {
                    continue;
                }

                let distance = planar_distance(tower.position, candidate.position);
                if !(distance < tower.range) {
                    continue;
                }

                let current = BestCandidate {
                    distance,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        self.tower_workspace.reserve(towers.len());

        for snapshot in towers.iter() {
            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                kind: snapshot.kind,
                position: snapshot.position,
                range: snapshot.config.range,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                flying: snapshot.flying,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    kind: TowerKind,
    position: Vec3,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec3,
    flying: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    /// Strictly closer wins; equal distances keep the earlier spawn.
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::TowerTargeting;
    use glam::Vec3;
    use path_defence_core::{
        Catalog, CellCoord, EnemyId, EnemyKind, EnemySnapshot, EnemyView, TowerId, TowerKind,
        TowerSnapshot, TowerTarget, TowerView,
    };

    fn tower_snapshot(id: u32, kind: TowerKind, position: (f32, f32)) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            cell: CellCoord::new(position.0 as u32, position.1 as u32),
            position: Vec3::new(position.0, 0.0, position.1),
            config: *Catalog::default().tower(kind),
            upgrades: 0,
            target: None,
        }
    }

    fn enemy_snapshot(id: u32, kind: EnemyKind, position: (f32, f32)) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind,
            position: Vec3::new(position.0, 0.0, position.1),
            velocity: Vec3::ZERO,
            health: 100,
            max_health: 100,
            flying: kind == EnemyKind::Flying,
            path_index: 0,
            slow_factor: 1.0,
        }
    }

    fn run(towers: Vec<TowerSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn selects_nearest_enemy_in_range() {
        let out = run(
            vec![tower_snapshot(0, TowerKind::Basic, (5.0, 5.0))],
            vec![
                enemy_snapshot(1, EnemyKind::Basic, (7.0, 5.0)),
                enemy_snapshot(2, EnemyKind::Basic, (5.0, 6.0)),
            ],
        );
        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(0),
                enemy: EnemyId::new(2),
            }]
        );
    }

    #[test]
    fn range_boundary_is_exclusive() {
        let out = run(
            vec![tower_snapshot(0, TowerKind::Basic, (5.0, 5.0))],
            vec![enemy_snapshot(1, EnemyKind::Basic, (8.0, 5.0))],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn height_is_ignored() {
        let mut enemy = enemy_snapshot(1, EnemyKind::Basic, (6.0, 5.0));
        enemy.position.y = 10.0;
        let out = run(vec![tower_snapshot(0, TowerKind::Basic, (5.0, 5.0))], vec![enemy]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn only_lasers_target_flyers() {
        let towers = vec![
            tower_snapshot(0, TowerKind::Basic, (5.0, 5.0)),
            tower_snapshot(1, TowerKind::Cannon, (5.0, 5.0)),
            tower_snapshot(2, TowerKind::Laser, (5.0, 5.0)),
            tower_snapshot(3, TowerKind::Freeze, (5.0, 5.0)),
        ];
        let out = run(towers, vec![enemy_snapshot(7, EnemyKind::Flying, (6.0, 5.0))]);
        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(2),
                enemy: EnemyId::new(7),
            }]
        );
    }

    #[test]
    fn ground_enemy_behind_flyer_is_still_targeted() {
        let out = run(
            vec![tower_snapshot(0, TowerKind::Basic, (5.0, 5.0))],
            vec![
                enemy_snapshot(1, EnemyKind::Flying, (5.5, 5.0)),
                enemy_snapshot(2, EnemyKind::Tank, (7.0, 5.0)),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn equal_distances_prefer_earlier_spawn() {
        let out = run(
            vec![tower_snapshot(0, TowerKind::Basic, (5.0, 5.0))],
            vec![
                enemy_snapshot(9, EnemyKind::Basic, (6.0, 5.0)),
                enemy_snapshot(4, EnemyKind::Basic, (4.0, 5.0)),
            ],
        );
        assert_eq!(out[0].enemy, EnemyId::new(4));
    }

    #[test]
    fn closer_arrival_switches_target_immediately() {
        let mut system = TowerTargeting::new();
        let towers =
            TowerView::from_snapshots(vec![tower_snapshot(0, TowerKind::Laser, (5.0, 5.0))]);
        let mut out = Vec::new();

        let enemies =
            EnemyView::from_snapshots(vec![enemy_snapshot(1, EnemyKind::Basic, (8.0, 5.0))]);
        system.handle(&towers, &enemies, &mut out);
        assert_eq!(out[0].enemy, EnemyId::new(1));

        let enemies = EnemyView::from_snapshots(vec![
            enemy_snapshot(1, EnemyKind::Basic, (8.0, 5.0)),
            enemy_snapshot(2, EnemyKind::Basic, (6.0, 5.0)),
        ]);
        system.handle(&towers, &enemies, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn empty_collections_clear_output() {
        let mut system = TowerTargeting::new();
        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
        }];
        system.handle(
            &TowerView::from_snapshots(vec![tower_snapshot(0, TowerKind::Basic, (5.0, 5.0))]),
            &EnemyView::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
