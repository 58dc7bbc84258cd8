#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that releases enemies on a timer and chains waves together.
//!
//! The scheduler keeps its own clock, advanced only by `Event::TimeAdvanced`.
//! Pausing the simulation therefore freezes spawn timers and the pending
//! auto-start together.

use std::time::Duration;

use path_defence_core::{Catalog, Command, Event, WaveNumber};
use path_defence_system_wave_generation::{
    completion_money, completion_score, scaled_stats, WaveGeneration, WavePlan,
};
use serde::{Deserialize, Serialize};

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seed that fixes the spawn order of every wave.
    pub seed: u64,
    /// Delay between completing a wave and automatically starting the next.
    pub auto_chain_delay_ms: u64,
}

impl SchedulerConfig {
    /// Creates a configuration with the provided seed and auto-chain delay.
    #[must_use]
    pub const fn new(seed: u64, auto_chain_delay_ms: u64) -> Self {
        Self {
            seed,
            auto_chain_delay_ms,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(0x5eed_0f_da7a, 5_000)
    }
}

/// Lifecycle of the active wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// No wave is running.
    #[default]
    Idle,
    /// Enemies are being released on the spawn timer.
    Spawning,
    /// Every enemy was released; waiting for the last ones to die or leak.
    Draining,
}

/// Deterministic wave state machine.
#[derive(Debug)]
pub struct WaveScheduler {
    generation: WaveGeneration,
    catalog: Catalog,
    auto_chain_delay: Duration,
    clock: Duration,
    wave: WaveNumber,
    phase: WavePhase,
    plan: Option<WavePlan>,
    cursor: usize,
    last_spawn: Duration,
    resume_at: Option<Duration>,
}

impl WaveScheduler {
    /// Creates an idle scheduler that scales enemies from the provided catalog.
    #[must_use]
    pub fn new(config: SchedulerConfig, catalog: Catalog) -> Self {
        Self {
            generation: WaveGeneration::new(config.seed),
            catalog,
            auto_chain_delay: Duration::from_millis(config.auto_chain_delay_ms),
            clock: Duration::ZERO,
            wave: WaveNumber::default(),
            phase: WavePhase::Idle,
            plan: None,
            cursor: 0,
            last_spawn: Duration::ZERO,
            resume_at: None,
        }
    }

    /// Current phase of the wave lifecycle.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Most recently started wave; zero before the first one.
    #[must_use]
    pub const fn wave(&self) -> WaveNumber {
        self.wave
    }

    /// Enemies of the active wave that have not been released yet.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.plan
            .as_ref()
            .map_or(0, |plan| plan.len().saturating_sub(self.cursor))
    }

    /// Scheduler time at which the next wave starts on its own, if any.
    #[must_use]
    pub const fn auto_start_at(&self) -> Option<Duration> {
        self.resume_at
    }

    /// Starts the next wave if none is running.
    ///
    /// Returns `false` without emitting anything while a wave is active.
    pub fn start_wave(&mut self, out: &mut Vec<Command>) -> bool {
        if self.phase != WavePhase::Idle {
            return false;
        }

        let wave = self.wave.next();
        let plan = self.generation.plan(wave);
        tracing::info!(
            %wave,
            enemies = plan.len(),
            delay_ms = plan.spawn_delay().as_millis() as u64,
            "scheduling wave"
        );

        out.push(Command::BeginWave {
            wave,
            bonus: plan.start_bonus(),
        });

        self.wave = wave;
        self.phase = WavePhase::Spawning;
        self.plan = Some(plan);
        self.cursor = 0;
        self.last_spawn = self.clock;
        self.resume_at = None;
        true
    }

    /// Consumes the latest events and emits spawn and wave lifecycle commands.
    ///
    /// `alive_enemies` is the number of enemies alive before this tick's
    /// spawns are applied.
    pub fn handle(&mut self, events: &[Event], alive_enemies: usize, out: &mut Vec<Command>) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.clock = self.clock.saturating_add(*dt);
            }
        }

        match self.phase {
            WavePhase::Idle => {
                if self.resume_at.is_some_and(|at| self.clock >= at) {
                    self.resume_at = None;
                    let _ = self.start_wave(out);
                }
            }
            WavePhase::Spawning => self.release_next(out),
            WavePhase::Draining => {
                if alive_enemies == 0 {
                    self.complete(out);
                }
            }
        }
    }

    fn release_next(&mut self, out: &mut Vec<Command>) {
        let Some(plan) = self.plan.as_ref() else {
            self.phase = WavePhase::Idle;
            return;
        };

        if self.clock.saturating_sub(self.last_spawn) >= plan.spawn_delay() {
            if let Some(kind) = plan.kind_at(self.cursor) {
                let stats = scaled_stats(self.catalog.enemy(kind), self.wave);
                out.push(Command::SpawnEnemy { kind, stats });
                self.cursor += 1;
                self.last_spawn = self.clock;
            }
        }

        if self.cursor >= plan.len() {
            tracing::debug!(wave = %self.wave, "all enemies released");
            self.phase = WavePhase::Draining;
        }
    }

    fn complete(&mut self, out: &mut Vec<Command>) {
        let wave = self.wave;
        out.push(Command::CompleteWave {
            wave,
            money_bonus: completion_money(wave),
            score_bonus: completion_score(wave),
        });

        self.phase = WavePhase::Idle;
        self.plan = None;
        self.cursor = 0;
        if wave.get() > 1 {
            self.resume_at = Some(self.clock.saturating_add(self.auto_chain_delay));
        }
        tracing::info!(%wave, auto_start = self.resume_at.is_some(), "wave cleared");
    }
}
