#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation loop that drives the world and every system in a fixed order.
//!
//! A [`Simulation`] owns one session: the authoritative world, the wave
//! scheduler and the pure systems. Presentation layers feed it player inputs
//! and wall-clock deltas, and drain the resulting events.

use std::time::Duration;

use glam::Vec3;
use path_defence_core::{
    Command, DefenderSnapshot, Event, TowerId, TowerKind, TowerTarget, WaveNumber,
};
use path_defence_system_builder::{Builder, BuilderInput};
use path_defence_system_spawning::WaveScheduler;
use path_defence_system_tower_combat::TowerCombat;
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{self as world, query, World, WorldConfig, WorldError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use path_defence_system_spawning::{SchedulerConfig, WavePhase};

/// Configuration for a whole session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid, defender and catalog settings.
    pub world: WorldConfig,
    /// Wave seed and auto-chain delay.
    pub scheduler: SchedulerConfig,
    /// Upper bound applied to every tick's delta time, in seconds.
    pub max_tick_seconds: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            scheduler: SchedulerConfig::default(),
            max_tick_seconds: 1.0 / 30.0,
        }
    }
}

/// Errors raised while constructing a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The world configuration was rejected.
    #[error(transparent)]
    World(#[from] WorldError),
    /// The delta-time clamp must be positive and finite.
    #[error("tick clamp {0} must be a positive number of seconds")]
    InvalidTickClamp(f64),
}

/// Discrete commands accepted from an input layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerInput {
    /// Builds a tower of `kind` at the world position.
    PlaceTower {
        /// Tower type to build.
        kind: TowerKind,
        /// World position inside the target cell.
        position: Vec3,
    },
    /// Removes the tower at the world position without refund.
    RemoveTower {
        /// World position inside the tower's cell.
        position: Vec3,
    },
    /// Chooses the tower type for click-to-build, or clears it.
    SelectTowerType(Option<TowerKind>),
    /// Clicks the map: builds the selected type or inspects a tower.
    Click {
        /// World position under the pointer.
        position: Vec3,
    },
    /// Starts the next wave if none is running.
    StartWave,
    /// Pauses or resumes the simulation.
    TogglePause,
    /// Upgrades the tower.
    UpgradeTower(TowerId),
    /// Sells the tower.
    SellTower(TowerId),
}

/// One tower-defence session.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    combat: TowerCombat,
    builder: Builder,
    max_tick: Duration,
    paused: bool,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    step_events: Vec<Event>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a new session from the provided configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let max_tick = Duration::try_from_secs_f64(config.max_tick_seconds)
            .ok()
            .filter(|clamp| !clamp.is_zero())
            .ok_or(SimulationError::InvalidTickClamp(config.max_tick_seconds))?;
        let catalog = config.world.catalog;
        let world = World::new(config.world)?;

        Ok(Self {
            world,
            scheduler: WaveScheduler::new(config.scheduler, catalog),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            builder: Builder::new(),
            max_tick,
            paused: false,
            targets: Vec::new(),
            commands: Vec::new(),
            step_events: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Advances the session by `dt`, clamped to the configured bound.
    ///
    /// Returns `false` without touching any state while paused or after the
    /// game ended.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.paused || query::is_game_over(&self.world) {
            return false;
        }

        let dt = dt.min(self.max_tick);
        self.step_events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.step_events);

        self.commands.clear();
        self.scheduler.handle(
            &self.step_events,
            query::enemy_count(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.targeting.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        world::apply(
            &mut self.world,
            Command::AssignTargets {
                targets: self.targets.clone(),
            },
            &mut self.step_events,
        );

        self.combat.handle(
            query::clock(&self.world),
            query::tower_cooldowns(&self.world),
            &self.targets,
            &mut self.commands,
        );
        self.flush_commands();

        world::apply(&mut self.world, Command::MoveEnemies { dt }, &mut self.step_events);
        world::apply(
            &mut self.world,
            Command::AdvanceProjectiles { dt },
            &mut self.step_events,
        );
        world::apply(&mut self.world, Command::SweepDead, &mut self.step_events);

        self.publish();
        true
    }

    /// Applies a player input, returning whether it took effect.
    pub fn submit(&mut self, input: PlayerInput) -> bool {
        match input {
            PlayerInput::PlaceTower { kind, position } => {
                self.place_tower(kind, position).is_some()
            }
            PlayerInput::RemoveTower { position } => self.remove_tower(position),
            PlayerInput::SelectTowerType(kind) => self.select_tower_type(kind),
            PlayerInput::Click { position } => self.click(position),
            PlayerInput::StartWave => self.start_wave(),
            PlayerInput::TogglePause => {
                if query::is_game_over(&self.world) {
                    return false;
                }
                let _ = self.toggle_pause();
                true
            }
            PlayerInput::UpgradeTower(tower) => self.upgrade_tower(tower),
            PlayerInput::SellTower(tower) => self.sell_tower(tower),
        }
    }

    /// Builds a tower, returning its identifier when the placement succeeded.
    pub fn place_tower(&mut self, kind: TowerKind, position: Vec3) -> Option<TowerId> {
        if query::is_game_over(&self.world) {
            return None;
        }
        self.dispatch(Command::PlaceTower { kind, position });
        if !self.step_events.contains(&Event::TowerPlaced) {
            return None;
        }
        query::tower_at(&self.world, position)
    }

    /// Removes the tower at the position without refund.
    pub fn remove_tower(&mut self, position: Vec3) -> bool {
        if query::is_game_over(&self.world) {
            return false;
        }
        self.dispatch(Command::RemoveTower { position });
        self.step_events
            .iter()
            .any(|event| matches!(event, Event::TowerRemoved { .. }))
    }

    /// Chooses the tower type the next click builds; `None` clears it.
    pub fn select_tower_type(&mut self, kind: Option<TowerKind>) -> bool {
        if query::is_game_over(&self.world) {
            return false;
        }
        self.builder.select_tower_type(kind);
        true
    }

    /// Clicks the map at the position.
    ///
    /// With a tower type selected the click builds it; otherwise it selects
    /// the tower under the pointer for upgrade or sale.
    pub fn click(&mut self, position: Vec3) -> bool {
        if query::is_game_over(&self.world) {
            return false;
        }
        self.commands.clear();
        let world = &self.world;
        self.builder.handle(
            &[],
            BuilderInput::click(position),
            |point| query::tower_at(world, point),
            &mut self.commands,
        );
        self.step_events.clear();
        self.flush_commands();
        self.publish();
        true
    }

    /// Starts the next wave if none is running.
    pub fn start_wave(&mut self) -> bool {
        if query::is_game_over(&self.world) {
            return false;
        }
        self.commands.clear();
        if !self.scheduler.start_wave(&mut self.commands) {
            return false;
        }
        self.step_events.clear();
        self.flush_commands();
        self.publish();
        true
    }

    /// Pauses or resumes the session, returning the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        if !query::is_game_over(&self.world) {
            self.paused = !self.paused;
            tracing::info!(paused = self.paused, "pause toggled");
        }
        self.paused
    }

    /// Upgrades the tower if it exists and is affordable.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> bool {
        if query::is_game_over(&self.world) {
            return false;
        }
        self.dispatch(Command::UpgradeTower { tower });
        self.step_events.contains(&Event::TowerUpgraded)
    }

    /// Sells the tower for part of its cost.
    pub fn sell_tower(&mut self, tower: TowerId) -> bool {
        if query::is_game_over(&self.world) {
            return false;
        }
        self.dispatch(Command::SellTower { tower });
        self.step_events.contains(&Event::TowerSold)
    }

    /// Upgrades the tower selected by the last click.
    pub fn upgrade_inspected(&mut self) -> bool {
        self.commands.clear();
        self.builder.upgrade_inspected(&mut self.commands);
        self.flush_inspected(&Event::TowerUpgraded)
    }

    /// Sells the tower selected by the last click.
    pub fn sell_inspected(&mut self) -> bool {
        self.commands.clear();
        self.builder.sell_inspected(&mut self.commands);
        self.flush_inspected(&Event::TowerSold)
    }

    /// Removes and returns every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Events produced since the last drain.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Read-only access to the world for presentation queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Reports whether ticks are currently skipped.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether the defender has been overrun.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        query::is_game_over(&self.world)
    }

    /// Current defender resources.
    #[must_use]
    pub fn defender(&self) -> DefenderSnapshot {
        query::defender(&self.world)
    }

    /// Most recently started wave.
    #[must_use]
    pub const fn wave(&self) -> WaveNumber {
        self.scheduler.wave()
    }

    /// Lifecycle phase of the current wave.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.scheduler.phase()
    }

    /// Reports whether the next wave is scheduled to start on its own.
    #[must_use]
    pub const fn auto_start_pending(&self) -> bool {
        self.scheduler.auto_start_at().is_some()
    }

    /// Enemies of the current wave still to be dealt with: unreleased plus alive.
    #[must_use]
    pub fn enemies_remaining(&self) -> usize {
        self.scheduler.pending_spawns() + query::enemy_count(&self.world)
    }

    /// Tower type the next click builds.
    #[must_use]
    pub const fn selected_tower_type(&self) -> Option<TowerKind> {
        self.builder.selected_kind()
    }

    /// Tower selected for upgrade or sale.
    #[must_use]
    pub const fn inspected_tower(&self) -> Option<TowerId> {
        self.builder.inspected()
    }

    fn dispatch(&mut self, command: Command) {
        self.step_events.clear();
        world::apply(&mut self.world, command, &mut self.step_events);
        self.publish();
    }

    fn flush_inspected(&mut self, success: &Event) -> bool {
        if self.commands.is_empty() || query::is_game_over(&self.world) {
            self.commands.clear();
            return false;
        }
        self.step_events.clear();
        self.flush_commands();
        self.publish();
        self.step_events.contains(success)
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.step_events);
        }
    }

    /// Lets the builder observe the latest events and queues them for presentation.
    fn publish(&mut self) {
        let mut ignored = Vec::new();
        self.builder.handle(
            &self.step_events,
            BuilderInput::default(),
            |_| None,
            &mut ignored,
        );
        self.events.extend(self.step_events.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::{Simulation, SimulationConfig, SimulationError};

    #[test]
    fn rejects_non_positive_tick_clamp() {
        for clamp in [0.0, -1.0, f64::NAN] {
            let config = SimulationConfig {
                max_tick_seconds: clamp,
                ..SimulationConfig::default()
            };
            assert!(matches!(
                Simulation::new(config),
                Err(SimulationError::InvalidTickClamp(_))
            ));
        }
    }

    #[test]
    fn rejects_tiny_grids() {
        let mut config = SimulationConfig::default();
        config.world.columns = 3;
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::World(_))
        ));
    }
}
