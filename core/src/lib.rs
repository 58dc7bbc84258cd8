#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation collaborators to react to. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Height above the ground plane at which towers release projectiles.
pub const PROJECTILE_LAUNCH_HEIGHT: f32 = 0.6;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Opens a new wave and credits its starting bonus.
    BeginWave {
        /// Number of the wave that is starting.
        wave: WaveNumber,
        /// Money granted to the defender when the wave starts.
        bonus: u32,
    },
    /// Releases a single enemy at the start of the path.
    SpawnEnemy {
        /// Kind of enemy to release.
        kind: EnemyKind,
        /// Wave-scaled statistics applied to the new enemy.
        stats: EnemyStats,
    },
    /// Closes the active wave and credits its completion bonuses.
    CompleteWave {
        /// Number of the wave that completed.
        wave: WaveNumber,
        /// Money granted for clearing the wave.
        money_bonus: u32,
        /// Score granted for clearing the wave.
        score_bonus: u64,
    },
    /// Records the targets acquired by towers during the current tick.
    AssignTargets {
        /// Tower to enemy assignments; towers absent from the list lose their target.
        targets: Vec<TowerTarget>,
    },
    /// Requests that a tower fire a projectile at the provided enemy.
    FireProjectile {
        /// Identifier of the tower that fires.
        tower: TowerId,
        /// Identifier of the enemy the projectile homes on.
        target: EnemyId,
    },
    /// Advances every live enemy along the path.
    MoveEnemies {
        /// Duration of simulated time to integrate.
        dt: Duration,
    },
    /// Advances every live projectile and resolves hits.
    AdvanceProjectiles {
        /// Duration of simulated time to integrate.
        dt: Duration,
    },
    /// Removes dead enemies and spent projectiles from the live sets.
    SweepDead,
    /// Requests placement of a tower at the cell containing the position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// World position inside the requested cell.
        position: Vec3,
    },
    /// Removes the tower occupying the cell containing the position, without refund.
    RemoveTower {
        /// World position inside the cell to clear.
        position: Vec3,
    },
    /// Upgrades an existing tower if the defender can afford it.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Sells an existing tower, refunding part of its cost.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A tower released a projectile.
    TowerFired {
        /// Kind of tower that fired.
        kind: TowerKind,
    },
    /// An enemy took damage.
    EnemyHit {
        /// Amount of damage applied.
        damage: u32,
    },
    /// An enemy's health dropped to zero.
    EnemyKilled {
        /// Kind of enemy that died.
        kind: EnemyKind,
    },
    /// An enemy walked off the final path point and damaged the defender.
    EnemyReachedEnd,
    /// A new enemy entered the path.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
    },
    /// A tower was constructed.
    TowerPlaced,
    /// A placement request was refused.
    TowerPlacementRejected {
        /// Kind of tower that was requested.
        kind: TowerKind,
        /// Reason the request failed.
        reason: PlacementRejection,
    },
    /// A tower was removed without refund.
    TowerRemoved {
        /// Identifier of the removed tower.
        tower: TowerId,
    },
    /// A tower was sold.
    TowerSold,
    /// A tower was upgraded.
    TowerUpgraded,
    /// An upgrade request was refused.
    TowerUpgradeRejected {
        /// Reason the request failed.
        reason: UpgradeRejection,
    },
    /// A wave began.
    WaveStarted {
        /// Number of the wave that began.
        wave: WaveNumber,
    },
    /// A wave was cleared.
    WaveCompleted {
        /// Number of the wave that was cleared.
        wave: WaveNumber,
    },
    /// A slowing projectile hit its target.
    SlowApplied,
    /// The defender ran out of health.
    GameOver {
        /// Final score at the moment the game ended.
        score: u64,
    },
}

/// Unique identifier assigned to a tower. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers increase monotonically with spawn order, so comparing two
/// identifiers tells which enemy entered the path first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the enemy identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column (x) and row (z) coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Octile step cost between two cells using weights 10 (straight) and 14 (diagonal).
    #[must_use]
    pub fn octile_distance(self, other: CellCoord) -> u32 {
        let dx = self.column.abs_diff(other.column);
        let dz = self.row.abs_diff(other.row);
        let diagonal = dx.min(dz);
        let straight = dx.max(dz) - diagonal;
        14 * diagonal + 10 * straight
    }

    /// Reports whether two distinct cells touch orthogonally or diagonally.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        let dx = self.column.abs_diff(other.column);
        let dz = self.row.abs_diff(other.row);
        dx <= 1 && dz <= 1 && (dx, dz) != (0, 0)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// One-based wave counter.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// Creates a new wave number wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric wave index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for WaveNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Cheap single-target tower.
    Basic,
    /// Slow-firing tower whose shells damage an area.
    Cannon,
    /// Hitscan tower and the only one able to hit flying enemies.
    Laser,
    /// Tower whose shots slow their target.
    Freeze,
}

impl TowerKind {
    /// Every tower kind in catalog order.
    pub const ALL: [TowerKind; 4] = [Self::Basic, Self::Cannon, Self::Laser, Self::Freeze];

    /// Lowercase tag used in configuration files and command lines.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Cannon => "cannon",
            Self::Laser => "laser",
            Self::Freeze => "freeze",
        }
    }

    /// Reports whether towers of this kind may acquire flying enemies.
    #[must_use]
    pub const fn hits_flying(self) -> bool {
        matches!(self, Self::Laser)
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TowerKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownKind(value.to_owned()))
    }
}

/// Types of enemies released by waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline enemy.
    Basic,
    /// Fragile, quick enemy.
    Fast,
    /// Slow enemy with a large health pool.
    Tank,
    /// Enemy that only lasers can target.
    Flying,
}

impl EnemyKind {
    /// Every enemy kind in catalog order.
    pub const ALL: [EnemyKind; 4] = [Self::Basic, Self::Fast, Self::Tank, Self::Flying];

    /// Lowercase tag used in configuration files and logs.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Fast => "fast",
            Self::Tank => "tank",
            Self::Flying => "flying",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EnemyKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownKind(value.to_owned()))
    }
}

/// Error returned when parsing an unrecognised tower or enemy tag.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown kind `{0}`")]
pub struct UnknownKind(String);

/// Temporary multiplicative speed reduction carried by a tower's shots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Multiplier applied to the victim's movement speed.
    pub factor: f32,
    /// Length of the effect in milliseconds.
    pub duration_ms: u64,
}

impl SlowEffect {
    /// Length of the effect as a [`Duration`].
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Per-instance tower parameters. Towers own a copy that upgrades mutate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    /// Purchase price. Upgrades leave it unchanged.
    pub cost: u32,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Acquisition radius in world units.
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Slow applied to single targets on hit.
    #[serde(default)]
    pub slow: Option<SlowEffect>,
}

impl TowerConfig {
    /// Minimum simulated time between two shots.
    ///
    /// Non-positive fire rates never become ready.
    #[must_use]
    pub fn fire_interval(&self) -> Duration {
        if self.fire_rate.is_nan() || self.fire_rate <= 0.0 {
            return Duration::MAX;
        }
        Duration::try_from_secs_f64(1.0 / f64::from(self.fire_rate)).unwrap_or(Duration::MAX)
    }

    /// Money charged for one upgrade.
    #[must_use]
    pub fn upgrade_cost(&self) -> u32 {
        floor_scaled(self.cost, 0.7)
    }

    /// Money refunded when the tower is sold.
    #[must_use]
    pub fn sale_value(&self) -> u32 {
        floor_scaled(self.cost, 0.7)
    }

    /// Returns the configuration produced by one upgrade.
    #[must_use]
    pub fn upgraded(&self) -> Self {
        Self {
            damage: floor_scaled(self.damage, 1.3),
            range: self.range + 0.5,
            fire_rate: self.fire_rate * 1.2,
            ..*self
        }
    }
}

/// Flight parameters shared by every projectile fired by one tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileProfile {
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Resolves on the first update instead of travelling.
    #[serde(default)]
    pub hitscan: bool,
    /// Radius of the blast for area-damage shells.
    #[serde(default)]
    pub aoe_radius: Option<f32>,
}

/// Catalog entry describing an enemy kind before wave scaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Base health pool.
    pub health: u32,
    /// Base movement speed in world units per second.
    pub speed: f32,
    /// Base money awarded on death.
    pub reward: u32,
    /// Flying enemies are only targetable by towers that hit flyers.
    #[serde(default)]
    pub flying: bool,
}

impl EnemyConfig {
    /// Unscaled statistics for this kind.
    #[must_use]
    pub const fn base_stats(&self) -> EnemyStats {
        EnemyStats {
            health: self.health,
            speed: self.speed,
            reward: self.reward,
        }
    }
}

/// Wave-scaled statistics attached to a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: u32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Money awarded on death; score is twice this value.
    pub reward: u32,
}

/// Table holding one value per tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerTable<T> {
    /// Entry for [`TowerKind::Basic`].
    pub basic: T,
    /// Entry for [`TowerKind::Cannon`].
    pub cannon: T,
    /// Entry for [`TowerKind::Laser`].
    pub laser: T,
    /// Entry for [`TowerKind::Freeze`].
    pub freeze: T,
}

impl<T> TowerTable<T> {
    /// Looks up the entry for a tower kind.
    #[must_use]
    pub const fn get(&self, kind: TowerKind) -> &T {
        match kind {
            TowerKind::Basic => &self.basic,
            TowerKind::Cannon => &self.cannon,
            TowerKind::Laser => &self.laser,
            TowerKind::Freeze => &self.freeze,
        }
    }
}

/// Table holding one value per enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTable<T> {
    /// Entry for [`EnemyKind::Basic`].
    pub basic: T,
    /// Entry for [`EnemyKind::Fast`].
    pub fast: T,
    /// Entry for [`EnemyKind::Tank`].
    pub tank: T,
    /// Entry for [`EnemyKind::Flying`].
    pub flying: T,
}

impl<T> EnemyTable<T> {
    /// Looks up the entry for an enemy kind.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> &T {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Flying => &self.flying,
        }
    }
}

/// Immutable configuration tables loaded once per session.
///
/// Towers copy their entry on construction; nothing mutates the catalog
/// afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Tower parameters keyed by kind.
    pub towers: TowerTable<TowerConfig>,
    /// Projectile flight parameters keyed by the firing tower kind.
    pub projectiles: TowerTable<ProjectileProfile>,
    /// Enemy parameters keyed by kind.
    pub enemies: EnemyTable<EnemyConfig>,
}

impl Catalog {
    /// Tower configuration for the provided kind.
    #[must_use]
    pub const fn tower(&self, kind: TowerKind) -> &TowerConfig {
        self.towers.get(kind)
    }

    /// Projectile profile for shots fired by the provided tower kind.
    #[must_use]
    pub const fn projectile(&self, kind: TowerKind) -> &ProjectileProfile {
        self.projectiles.get(kind)
    }

    /// Enemy configuration for the provided kind.
    #[must_use]
    pub const fn enemy(&self, kind: EnemyKind) -> &EnemyConfig {
        self.enemies.get(kind)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            towers: TowerTable {
                basic: TowerConfig {
                    cost: 50,
                    damage: 25,
                    range: 3.0,
                    fire_rate: 1.0,
                    slow: None,
                },
                cannon: TowerConfig {
                    cost: 100,
                    damage: 50,
                    range: 4.0,
                    fire_rate: 0.5,
                    slow: None,
                },
                laser: TowerConfig {
                    cost: 150,
                    damage: 30,
                    range: 5.0,
                    fire_rate: 2.0,
                    slow: None,
                },
                freeze: TowerConfig {
                    cost: 120,
                    damage: 15,
                    range: 3.0,
                    fire_rate: 1.5,
                    slow: Some(SlowEffect {
                        factor: 0.5,
                        duration_ms: 3000,
                    }),
                },
            },
            projectiles: TowerTable {
                basic: ProjectileProfile {
                    speed: 8.0,
                    hitscan: false,
                    aoe_radius: None,
                },
                cannon: ProjectileProfile {
                    speed: 6.0,
                    hitscan: false,
                    aoe_radius: Some(1.5),
                },
                laser: ProjectileProfile {
                    speed: 15.0,
                    hitscan: true,
                    aoe_radius: None,
                },
                freeze: ProjectileProfile {
                    speed: 7.0,
                    hitscan: false,
                    aoe_radius: None,
                },
            },
            enemies: EnemyTable {
                basic: EnemyConfig {
                    health: 200,
                    speed: 1.0,
                    reward: 10,
                    flying: false,
                },
                fast: EnemyConfig {
                    health: 100,
                    speed: 2.0,
                    reward: 15,
                    flying: false,
                },
                tank: EnemyConfig {
                    health: 500,
                    speed: 0.5,
                    reward: 25,
                    flying: false,
                },
                flying: EnemyConfig {
                    health: 300,
                    speed: 1.5,
                    reward: 20,
                    flying: true,
                },
            },
        }
    }
}

/// Scales an integer quantity in double precision and floors the result.
///
/// Balance formulas are evaluated in `f64` so that constants such as `0.7`
/// round exactly as they always have (`floor(150 * 0.7) == 104`).
#[must_use]
pub fn floor_scaled(value: u32, factor: f64) -> u32 {
    let scaled = (f64::from(value) * factor).floor();
    if scaled <= 0.0 {
        0
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Distance between two points on the ground plane, ignoring height.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementRejection {
    /// The requested position lies outside the grid.
    #[error("position lies outside the grid")]
    OutOfBounds,
    /// The requested cell belongs to the enemy path.
    #[error("cell belongs to the enemy path")]
    OnPath,
    /// The requested cell already holds a tower.
    #[error("cell already holds a tower")]
    Occupied,
    /// A tower on the requested cell would disconnect start from end.
    #[error("tower would sever the path")]
    SeversPath,
    /// The defender cannot afford the tower.
    #[error("insufficient funds")]
    InsufficientFunds,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeRejection {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    UnknownTower,
    /// The defender cannot afford the upgrade.
    #[error("insufficient funds")]
    InsufficientFunds,
}

/// Defender resources read and written by the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DefenderSnapshot {
    /// Remaining health; the game ends at zero.
    pub health: u32,
    /// Spendable currency.
    pub money: u32,
    /// Accumulated score.
    pub score: u64,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Continuous world position.
    pub position: Vec3,
    /// Velocity observed during the last movement step, in units per second.
    pub velocity: Vec3,
    /// Remaining health.
    pub health: u32,
    /// Health at spawn.
    pub max_health: u32,
    /// Whether only flyer-capable towers may target the enemy.
    pub flying: bool,
    /// Index of the last path point the enemy passed.
    pub path_index: usize,
    /// Current speed multiplier; `1.0` when not slowed.
    pub slow_factor: f32,
}

/// Read-only snapshot describing all alive enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// World position of the cell centre.
    pub position: Vec3,
    /// Current configuration including upgrades.
    pub config: TowerConfig,
    /// Number of upgrades applied.
    pub upgrades: u32,
    /// Enemy targeted during the most recent tick.
    pub target: Option<EnemyId>,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Snapshot describing the firing cadence of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Simulation time of the last shot, if the tower ever fired.
    pub last_fired: Option<Duration>,
    /// Minimum time between shots.
    pub fire_interval: Duration,
}

impl TowerCooldownSnapshot {
    /// Reports whether the tower may fire at the provided simulation time.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.fire_interval,
        }
    }
}

/// Read-only view over the cooldown state of every tower.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new view, sorting snapshots by tower identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in tower order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Tower to enemy assignment produced by targeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy chosen as the target.
    pub enemy: EnemyId,
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Kind of tower that fired it.
    pub kind: TowerKind,
    /// Continuous world position.
    pub position: Vec3,
    /// Enemy the projectile homes on.
    pub target: EnemyId,
    /// Damage carried by the projectile.
    pub damage: u32,
}
