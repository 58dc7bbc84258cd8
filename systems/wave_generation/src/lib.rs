#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave generation: composition, spawn order and per-wave scaling.
//!
//! Every formula here works on the 1-based wave number. Arithmetic is done in
//! `f64` and floored so that balance constants such as `1.2` and `0.18`
//! produce the same integers on every platform.

use std::time::Duration;

use path_defence_core::{floor_scaled, EnemyConfig, EnemyKind, EnemyStats, WaveNumber};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const BASE_ENEMY_COUNT: u32 = 5;
const ENEMIES_PER_WAVE: f64 = 1.2;
const HEALTH_STEP: f64 = 0.25;
const LATE_HEALTH_STEP: f64 = 0.18;
const LATE_WAVE_THRESHOLD: u32 = 10;
const SPEED_STEP: f64 = 0.045;
const MAX_SPEED_MULTIPLIER: f64 = 4.0;
const REWARD_STEP: f64 = 0.03;
const START_BONUS_PER_WAVE: u32 = 10;
const COMPLETION_MONEY_PER_WAVE: u32 = 25;
const COMPLETION_SCORE_PER_WAVE: u64 = 100;

/// Number of enemies of each kind released during one wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WaveComposition {
    /// Basic enemies; whatever remains after the other kinds are allotted.
    pub basic: u32,
    /// Fast enemies.
    pub fast: u32,
    /// Tank enemies.
    pub tank: u32,
    /// Flying enemies.
    pub flying: u32,
}

impl WaveComposition {
    /// Computes the composition for the provided wave.
    #[must_use]
    pub fn for_wave(wave: WaveNumber) -> Self {
        let total = base_enemy_count(wave);
        let (fast, tank, flying) = match wave.get() {
            0..=3 => (0, 0, 0),
            4..=5 => (floor_scaled(total, 0.3), floor_scaled(total, 0.12).max(1), 0),
            6..=7 => (floor_scaled(total, 0.4), floor_scaled(total, 0.18).max(1), 0),
            _ => (
                floor_scaled(total, 0.3),
                floor_scaled(total, 0.2).max(2),
                floor_scaled(total, 0.15).max(1),
            ),
        };

        Self {
            basic: total.saturating_sub(fast + tank + flying),
            fast,
            tank,
            flying,
        }
    }

    /// Number of enemies of the provided kind.
    #[must_use]
    pub const fn count(&self, kind: EnemyKind) -> u32 {
        match kind {
            EnemyKind::Basic => self.basic,
            EnemyKind::Fast => self.fast,
            EnemyKind::Tank => self.tank,
            EnemyKind::Flying => self.flying,
        }
    }

    /// Total number of enemies in the wave.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.basic + self.fast + self.tank + self.flying
    }

    fn tokens(&self) -> Vec<EnemyKind> {
        let mut tokens = Vec::with_capacity(self.total() as usize);
        for kind in EnemyKind::ALL {
            tokens.extend(std::iter::repeat(kind).take(self.count(kind) as usize));
        }
        tokens
    }
}

/// Everything the scheduler needs to run one wave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WavePlan {
    wave: WaveNumber,
    composition: WaveComposition,
    order: Vec<EnemyKind>,
    spawn_delay: Duration,
    start_bonus: u32,
}

impl WavePlan {
    /// Wave this plan belongs to.
    #[must_use]
    pub const fn wave(&self) -> WaveNumber {
        self.wave
    }

    /// Pre-shuffle composition of the wave.
    #[must_use]
    pub const fn composition(&self) -> WaveComposition {
        self.composition
    }

    /// Shuffled spawn order.
    #[must_use]
    pub fn order(&self) -> &[EnemyKind] {
        &self.order
    }

    /// Kind of the enemy released at `cursor`, if any remain.
    #[must_use]
    pub fn kind_at(&self, cursor: usize) -> Option<EnemyKind> {
        self.order.get(cursor).copied()
    }

    /// Number of enemies in the wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Reports whether the wave releases no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Time between consecutive spawns.
    #[must_use]
    pub const fn spawn_delay(&self) -> Duration {
        self.spawn_delay
    }

    /// Money granted when the wave starts.
    #[must_use]
    pub const fn start_bonus(&self) -> u32 {
        self.start_bonus
    }
}

/// Produces wave plans whose spawn order depends only on the seed and wave number.
#[derive(Clone, Copy, Debug, Default)]
pub struct WaveGeneration {
    seed: u64,
}

impl WaveGeneration {
    /// Creates a generator for the provided session seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Builds the plan for the provided wave.
    #[must_use]
    pub fn plan(&self, wave: WaveNumber) -> WavePlan {
        let composition = WaveComposition::for_wave(wave);
        let mut order = composition.tokens();
        let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.seed, wave));
        order.shuffle(&mut rng);

        WavePlan {
            wave,
            composition,
            order,
            spawn_delay: spawn_delay(wave),
            start_bonus: start_bonus(wave),
        }
    }
}

/// Number of enemies in the wave before it is split by kind.
#[must_use]
pub fn base_enemy_count(wave: WaveNumber) -> u32 {
    BASE_ENEMY_COUNT.saturating_add(floor_scaled(wave.get(), ENEMIES_PER_WAVE))
}

/// Applies per-wave scaling to the catalog entry without touching the catalog.
#[must_use]
pub fn scaled_stats(config: &EnemyConfig, wave: WaveNumber) -> EnemyStats {
    let level = f64::from(wave.get().saturating_sub(1));
    let mut health_scale = 1.0 + level * HEALTH_STEP;
    if wave.get() > LATE_WAVE_THRESHOLD {
        health_scale += f64::from(wave.get() - LATE_WAVE_THRESHOLD) * LATE_HEALTH_STEP;
    }
    let speed_scale = (1.0 + level * SPEED_STEP).min(MAX_SPEED_MULTIPLIER);
    let reward_scale = 1.0 + level * REWARD_STEP;

    EnemyStats {
        health: floor_scaled(config.health, health_scale),
        speed: (f64::from(config.speed) * speed_scale) as f32,
        reward: floor_scaled(config.reward, reward_scale),
    }
}

/// Time between consecutive spawns; shrinks with the wave number down to a floor.
#[must_use]
pub fn spawn_delay(wave: WaveNumber) -> Duration {
    let wave = i64::from(wave.get());
    let millis = if wave <= 50 {
        (900 - wave * 18).max(250)
    } else {
        (1_000 - wave * 10).max(200)
    };
    Duration::from_millis(millis.unsigned_abs())
}

/// Money granted when the wave starts.
#[must_use]
pub fn start_bonus(wave: WaveNumber) -> u32 {
    wave.get().saturating_mul(START_BONUS_PER_WAVE)
}

/// Money granted when the wave completes.
#[must_use]
pub fn completion_money(wave: WaveNumber) -> u32 {
    wave.get().saturating_mul(COMPLETION_MONEY_PER_WAVE)
}

/// Score granted when the wave completes.
#[must_use]
pub fn completion_score(wave: WaveNumber) -> u64 {
    u64::from(wave.get()).saturating_mul(COMPLETION_SCORE_PER_WAVE)
}

fn derive_wave_seed(seed: u64, wave: WaveNumber) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(wave.get().to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::Catalog;

    fn wave(value: u32) -> WaveNumber {
        WaveNumber::new(value)
    }

    #[test]
    fn early_waves_are_all_basic() {
        for number in 1..=3 {
            let composition = WaveComposition::for_wave(wave(number));
            assert_eq!(composition.total(), composition.basic);
        }
        assert_eq!(WaveComposition::for_wave(wave(1)).basic, 6);
    }

    #[test]
    fn wave_six_composition_matches_brackets() {
        assert_eq!(base_enemy_count(wave(6)), 12);
        assert_eq!(
            WaveComposition::for_wave(wave(6)),
            WaveComposition {
                basic: 6,
                fast: 4,
                tank: 2,
                flying: 0,
            }
        );
    }

    #[test]
    fn middle_and_late_brackets() {
        assert_eq!(
            WaveComposition::for_wave(wave(4)),
            WaveComposition {
                basic: 6,
                fast: 2,
                tank: 1,
                flying: 0,
            }
        );
        assert_eq!(
            WaveComposition::for_wave(wave(8)),
            WaveComposition {
                basic: 6,
                fast: 4,
                tank: 2,
                flying: 2,
            }
        );
    }

    #[test]
    fn shuffle_preserves_the_multiset() {
        let plan = WaveGeneration::new(7).plan(wave(8));
        let composition = plan.composition();
        assert_eq!(plan.len(), composition.total() as usize);
        for kind in EnemyKind::ALL {
            let count = plan.order().iter().filter(|token| **token == kind).count();
            assert_eq!(count, composition.count(kind) as usize);
        }
    }

    #[test]
    fn spawn_order_depends_only_on_seed_and_wave() {
        let first = WaveGeneration::new(42).plan(wave(9));
        let second = WaveGeneration::new(42).plan(wave(9));
        assert_eq!(first, second);

        let differs = (0..16_u64)
            .map(|seed| WaveGeneration::new(seed).plan(wave(9)))
            .any(|plan| plan.order() != first.order());
        assert!(differs, "seed has no influence on spawn order");
    }

    #[test]
    fn stats_scale_with_wave() {
        let catalog = Catalog::default();
        let basic = catalog.enemy(EnemyKind::Basic);

        assert_eq!(scaled_stats(basic, wave(1)), basic.base_stats());

        let fifth = scaled_stats(basic, wave(5));
        assert_eq!(fifth.health, 400);
        assert_eq!(fifth.reward, 11);
        assert!((fifth.speed - 1.18).abs() < 1e-6);

        assert_eq!(scaled_stats(basic, wave(10)).health, 650);
        let eleventh = scaled_stats(basic, wave(11)).health;
        assert!((735..=736).contains(&eleventh));
    }

    #[test]
    fn speed_multiplier_is_capped() {
        let catalog = Catalog::default();
        let fast = catalog.enemy(EnemyKind::Fast);
        assert!((scaled_stats(fast, wave(100)).speed - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn spawn_delay_shrinks_to_a_floor() {
        assert_eq!(spawn_delay(wave(1)), Duration::from_millis(882));
        assert_eq!(spawn_delay(wave(36)), Duration::from_millis(252));
        assert_eq!(spawn_delay(wave(40)), Duration::from_millis(250));
        assert_eq!(spawn_delay(wave(51)), Duration::from_millis(490));
        assert_eq!(spawn_delay(wave(90)), Duration::from_millis(200));
    }

    #[test]
    fn bonuses_grow_linearly() {
        assert_eq!(start_bonus(wave(3)), 30);
        assert_eq!(completion_money(wave(3)), 75);
        assert_eq!(completion_score(wave(3)), 300);
    }
}
