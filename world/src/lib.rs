#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Path Defence.
//!
//! The world owns the map, every tower, enemy and projectile, and the
//! defender's resources. It only changes through [`apply`], and it is read
//! through the functions in [`query`].

mod combat;
mod defender;
mod enemies;
mod map;
pub mod occupancy;
pub mod pathfinding;
mod projectiles;
mod towers;

use std::{collections::BTreeMap, time::Duration};

use glam::Vec3;
use path_defence_core::{
    Catalog, CellCoord, Command, EnemyId, Event, PlacementRejection, ProjectileId, TowerId,
    TowerKind, TowerTarget, UpgradeRejection, WaveNumber, PROJECTILE_LAUNCH_HEIGHT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    combat::HitContext,
    defender::Defender,
    enemies::{Enemy, Traversal},
    map::GameMap,
    projectiles::Projectile,
    towers::Tower,
};

pub use occupancy::OccupancyGrid;
pub use pathfinding::Pathfinder;

/// Static configuration describing a new session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of grid columns (x axis).
    pub columns: u32,
    /// Number of grid rows (z axis).
    pub rows: u32,
    /// Side length of one cell in world units.
    pub cell_size: f32,
    /// Defender health at the start of the session.
    pub starting_health: u32,
    /// Defender money at the start of the session.
    pub starting_money: u32,
    /// Health lost whenever an enemy reaches the end of the path.
    pub end_penalty: u32,
    /// Tower, projectile and enemy tables.
    pub catalog: Catalog,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            columns: 20,
            rows: 15,
            cell_size: 1.0,
            starting_health: 100,
            starting_money: 500,
            end_penalty: 10,
            catalog: Catalog::default(),
        }
    }
}

/// Errors raised while constructing a world.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WorldError {
    /// The grid cannot hold the serpentine path.
    #[error("grid of {columns}x{rows} cells is too small for the path")]
    GridTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Cells must have a positive, finite size.
    #[error("cell size {0} must be positive and finite")]
    InvalidCellSize(f32),
}

/// Running totals of combat outcomes for the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tally {
    /// Enemies killed by towers.
    pub kills: u32,
    /// Enemies that reached the end of the path.
    pub leaks: u32,
    /// Projectiles fired.
    pub shots: u32,
}

/// Represents the authoritative Path Defence world state.
#[derive(Debug)]
pub struct World {
    catalog: Catalog,
    end_penalty: u32,
    clock: Duration,
    tick_started: Duration,
    map: GameMap,
    route: Vec<Vec3>,
    towers: BTreeMap<TowerId, Tower>,
    enemies: BTreeMap<EnemyId, Enemy>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    defender: Defender,
    next_tower: u32,
    next_enemy: u32,
    next_projectile: u32,
    wave: WaveNumber,
    tally: Tally,
    game_over: bool,
}

impl World {
    /// Creates a new world from the provided configuration.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        let map = GameMap::new(config.columns, config.rows, config.cell_size)?;
        let route = map.route();
        Ok(Self {
            catalog: config.catalog,
            end_penalty: config.end_penalty,
            clock: Duration::ZERO,
            tick_started: Duration::ZERO,
            map,
            route,
            towers: BTreeMap::new(),
            enemies: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            defender: Defender::new(config.starting_health, config.starting_money),
            next_tower: 0,
            next_enemy: 0,
            next_projectile: 0,
            wave: WaveNumber::default(),
            tally: Tally::default(),
            game_over: false,
        })
    }

    fn allocate_tower_id(&mut self) -> TowerId {
        let id = TowerId::new(self.next_tower);
        self.next_tower = self.next_tower.wrapping_add(1);
        id
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy);
        self.next_enemy = self.next_enemy.wrapping_add(1);
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        id
    }

    fn assign_targets(&mut self, targets: &[TowerTarget]) {
        for tower in self.towers.values_mut() {
            tower.target = targets
                .iter()
                .find(|target| target.tower == tower.id)
                .map(|target| target.enemy);
        }
    }

    fn fire(&mut self, tower_id: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let target_alive = self
            .enemies
            .get(&target)
            .is_some_and(|enemy| enemy.alive);
        if !target_alive {
            return;
        }
        let now = self.clock;
        let Some(tower) = self.towers.get_mut(&tower_id) else {
            return;
        };
        if !tower.is_ready(now) {
            return;
        }

        tower.record_shot(now, self.tick_started);
        let kind = tower.kind;
        let origin = tower.position + Vec3::new(0.0, PROJECTILE_LAUNCH_HEIGHT, 0.0);
        let config = tower.config;
        let profile = *self.catalog.projectile(kind);

        let id = self.allocate_projectile_id();
        let projectile = Projectile::launch(id, kind, origin, target, &config, &profile);
        let _ = self.projectiles.insert(id, projectile);
        self.tally.shots = self.tally.shots.saturating_add(1);
        out_events.push(Event::TowerFired { kind });
    }

    fn move_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();
        for enemy in self.enemies.values_mut().filter(|enemy| enemy.alive) {
            if enemy.advance(&self.route, seconds) != Traversal::ReachedEnd {
                continue;
            }

            self.tally.leaks = self.tally.leaks.saturating_add(1);
            tracing::debug!(enemy = enemy.id.get(), kind = %enemy.kind, "enemy reached the end");
            out_events.push(Event::EnemyReachedEnd);

            let exhausted = self.defender.take_damage(self.end_penalty);
            if exhausted && !self.game_over {
                self.game_over = true;
                let score = self.defender.score();
                tracing::info!(score, "defender overrun");
                out_events.push(Event::GameOver { score });
            }
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();
        let Self {
            projectiles,
            enemies,
            defender,
            tally,
            clock,
            ..
        } = self;
        let mut context = HitContext {
            enemies,
            defender,
            tally,
            now: *clock,
        };

        for projectile in projectiles.values_mut().filter(|shot| shot.alive) {
            let Some((position, velocity)) = context
                .enemies
                .get(&projectile.target)
                .filter(|enemy| enemy.alive)
                .map(|enemy| (enemy.position, enemy.velocity))
            else {
                projectile.alive = false;
                continue;
            };

            if projectile.hitscan || projectile.steer(position, velocity, seconds) {
                combat::resolve_hit(projectile, &mut context, out_events);
            }
        }
    }

    fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec3,
    ) -> Result<TowerId, PlacementRejection> {
        let cell = self.map.check_placement(position)?;
        let config = *self.catalog.tower(kind);
        if !self.defender.spend(config.cost) {
            return Err(PlacementRejection::InsufficientFunds);
        }

        let id = self.allocate_tower_id();
        let centre = self.map.cell_center(cell);
        let _ = self
            .towers
            .insert(id, Tower::new(id, kind, cell, centre, config));
        self.map.occupy(cell, id);
        tracing::debug!(tower = id.get(), %kind, %cell, "tower placed");
        Ok(id)
    }

    fn upgrade_tower(&mut self, tower_id: TowerId) -> Result<(), UpgradeRejection> {
        let Some(tower) = self.towers.get_mut(&tower_id) else {
            return Err(UpgradeRejection::UnknownTower);
        };
        if !self.defender.spend(tower.config.upgrade_cost()) {
            return Err(UpgradeRejection::InsufficientFunds);
        }
        tower.upgrade();
        tracing::debug!(tower = tower_id.get(), level = tower.upgrades, "tower upgraded");
        Ok(())
    }

    fn detach_tower(&mut self, tower_id: TowerId) -> Option<Tower> {
        let tower = self.towers.remove(&tower_id)?;
        let _ = self.map.vacate(tower.cell);
        Some(tower)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_started = world.clock;
            world.clock = world.clock.saturating_add(dt);
            let now = world.clock;
            for enemy in world.enemies.values_mut() {
                enemy.expire_slow(now);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::BeginWave { wave, bonus } => {
            world.wave = wave;
            world.defender.credit(bonus);
            tracing::info!(%wave, bonus, "wave started");
            out_events.push(Event::WaveStarted { wave });
        }
        Command::SpawnEnemy { kind, stats } => {
            let Some(&origin) = world.route.first() else {
                return;
            };
            let flying = world.catalog.enemy(kind).flying;
            let id = world.allocate_enemy_id();
            let _ = world
                .enemies
                .insert(id, Enemy::new(id, kind, stats, flying, origin));
            tracing::debug!(enemy = id.get(), %kind, health = stats.health, "enemy spawned");
            out_events.push(Event::EnemySpawned { enemy: id, kind });
        }
        Command::CompleteWave {
            wave,
            money_bonus,
            score_bonus,
        } => {
            world.defender.credit(money_bonus);
            world.defender.add_score(score_bonus);
            tracing::info!(%wave, money_bonus, score_bonus, "wave completed");
            out_events.push(Event::WaveCompleted { wave });
        }
        Command::AssignTargets { targets } => world.assign_targets(&targets),
        Command::FireProjectile { tower, target } => world.fire(tower, target, out_events),
        Command::MoveEnemies { dt } => world.move_enemies(dt, out_events),
        Command::AdvanceProjectiles { dt } => world.advance_projectiles(dt, out_events),
        Command::SweepDead => {
            world.enemies.retain(|_, enemy| enemy.alive);
            world.projectiles.retain(|_, projectile| projectile.alive);
        }
        Command::PlaceTower { kind, position } => match world.place_tower(kind, position) {
            Ok(_) => out_events.push(Event::TowerPlaced),
            Err(reason) => {
                tracing::debug!(%kind, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, reason });
            }
        },
        Command::RemoveTower { position } => {
            let removed = world
                .map
                .world_to_cell(position)
                .and_then(|cell| world.map.tower_at(cell))
                .and_then(|tower| world.detach_tower(tower));
            if let Some(tower) = removed {
                out_events.push(Event::TowerRemoved { tower: tower.id });
            }
        }
        Command::UpgradeTower { tower } => match world.upgrade_tower(tower) {
            Ok(()) => out_events.push(Event::TowerUpgraded),
            Err(reason) => out_events.push(Event::TowerUpgradeRejected { reason }),
        },
        Command::SellTower { tower } => {
            if let Some(sold) = world.detach_tower(tower) {
                let refund = sold.config.sale_value();
                world.defender.credit(refund);
                tracing::debug!(tower = tower.get(), refund, "tower sold");
                out_events.push(Event::TowerSold);
            }
        }
    }
}

/// Checks whether a tower could be built at the position, ignoring funds.
///
/// The check temporarily blocks the cell to test connectivity and always
/// restores the grid before returning.
pub fn validate_placement(
    world: &mut World,
    position: Vec3,
) -> Result<CellCoord, PlacementRejection> {
    world.map.check_placement(position)
}

/// Reports whether the path start is still connected to the path end.
pub fn route_is_open(world: &mut World) -> bool {
    world.map.is_route_open()
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec3;
    use path_defence_core::{
        Catalog, CellCoord, DefenderSnapshot, EnemyView, ProjectileSnapshot, TowerCooldownView,
        TowerId, TowerSnapshot, TowerView, WaveNumber,
    };

    use super::{OccupancyGrid, Tally, World};

    /// Simulation time accumulated by `Tick` commands.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Current defender resources.
    #[must_use]
    pub fn defender(world: &World) -> DefenderSnapshot {
        world.defender.snapshot()
    }

    /// Most recently started wave; zero before the first wave.
    #[must_use]
    pub fn wave(world: &World) -> WaveNumber {
        world.wave
    }

    /// Reports whether the defender ran out of health.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Combat totals for the session.
    #[must_use]
    pub fn tally(world: &World) -> Tally {
        world.tally
    }

    /// Catalog the world was configured with.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.map.columns(), world.map.rows())
    }

    /// Cell where enemies enter.
    #[must_use]
    pub fn start_cell(world: &World) -> CellCoord {
        world.map.start()
    }

    /// Cell where enemies leave and damage the defender.
    #[must_use]
    pub fn end_cell(world: &World) -> CellCoord {
        world.map.end()
    }

    /// Fixed enemy route expressed in cells.
    #[must_use]
    pub fn path_cells(world: &World) -> &[CellCoord] {
        world.map.path()
    }

    /// Fixed enemy route expressed as world-space cell centres.
    #[must_use]
    pub fn route(world: &World) -> &[Vec3] {
        &world.route
    }

    /// Walkability grid consulted by the pathfinder.
    #[must_use]
    pub fn occupancy(world: &World) -> &OccupancyGrid {
        world.map.occupancy()
    }

    /// Cell containing the world position, if inside the grid.
    #[must_use]
    pub fn cell_at(world: &World, position: Vec3) -> Option<CellCoord> {
        world.map.world_to_cell(position)
    }

    /// World position of the cell centre.
    #[must_use]
    pub fn cell_center(world: &World, cell: CellCoord) -> Vec3 {
        world.map.cell_center(cell)
    }

    /// Tower occupying the cell that contains the position.
    #[must_use]
    pub fn tower_at(world: &World, position: Vec3) -> Option<TowerId> {
        world
            .map
            .world_to_cell(position)
            .and_then(|cell| world.map.tower_at(cell))
    }

    /// Snapshot of a single tower.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<TowerSnapshot> {
        world.towers.get(&tower).map(|tower| tower.snapshot())
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.values().map(|tower| tower.snapshot()).collect())
    }

    /// Captures the firing cadence of every placed tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world.towers.values().map(|tower| tower.cooldown()).collect(),
        )
    }

    /// Captures a read-only view of the alive enemies in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .values()
                .filter(|enemy| enemy.alive)
                .map(|enemy| enemy.snapshot())
                .collect(),
        )
    }

    /// Projectiles still in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .values()
            .filter(|projectile| projectile.alive)
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Number of alive enemies.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.values().filter(|enemy| enemy.alive).count()
    }

    /// Number of placed towers.
    #[must_use]
    pub fn tower_count(world: &World) -> usize {
        world.towers.len()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn projectile_count(world: &World) -> usize {
        world
            .projectiles
            .values()
            .filter(|projectile| projectile.alive)
            .count()
    }
}
