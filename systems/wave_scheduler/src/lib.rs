#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler that emits enemy spawn commands.
//!
//! The scheduler walks a wave through `Idle → Spawning → AllSpawned →
//! WaveComplete → Idle`. Spawning is driven by `TimeAdvanced` events and
//! completion by the `EnemyKilled` and `EnemyLeaked` events of the current
//! wave. Every wave draws from its own `ChaCha8Rng` stream derived from the
//! global seed, so replays are reproducible wave by wave.

use std::{collections::VecDeque, f32::consts::TAU, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ring_defence_core::{
    BossKind, Command, EnemyKind, Event, MicrobeConfig, Position, SimulationConfig,
    SpawningConfig, WaveCompositionTable,
};
use sha2::{Digest, Sha256};
use tracing::info;

mod composition;

pub use composition::WaveComposition;

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    seed: u64,
    spawn_radius: f32,
    spawning: SpawningConfig,
    microbe: MicrobeConfig,
    waves: WaveCompositionTable,
}

impl Config {
    /// Extracts the scheduler parameters from the simulation configuration.
    #[must_use]
    pub fn from_simulation(config: &SimulationConfig) -> Self {
        Self {
            seed: config.seed,
            spawn_radius: config.arena.radius,
            spawning: config.spawning,
            microbe: config.microbe,
            waves: config.waves.clone(),
        }
    }
}

/// Lifecycle of the current wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// Waiting for the next wave to start.
    #[default]
    Idle,
    /// Enemies of the current wave are still queued.
    Spawning,
    /// Every enemy was spawned; waiting for kills and leaks.
    AllSpawned,
    /// The wave was cleared this tick.
    WaveComplete,
}

#[derive(Clone, Copy, Debug)]
struct PendingSpawn {
    kind: EnemyKind,
    boss: Option<BossKind>,
    delay: Duration,
}

/// Wave scheduler system.
#[derive(Debug)]
pub struct WaveScheduler {
    config: Config,
    phase: WavePhase,
    wave: u32,
    queue: VecDeque<PendingSpawn>,
    spawn_clock: Duration,
    idle_clock: Duration,
    required: u32,
    removed: u32,
    leaked: u32,
    health_multiplier: f32,
    rng: ChaCha8Rng,
}

impl WaveScheduler {
    /// Creates an idle scheduler before the first wave.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(config.seed, 0));
        Self {
            config,
            phase: WavePhase::Idle,
            wave: 0,
            queue: VecDeque::new(),
            spawn_clock: Duration::ZERO,
            idle_clock: Duration::ZERO,
            required: 0,
            removed: 0,
            leaked: 0,
            health_multiplier: 1.0,
            rng,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Number of the current or most recent wave; `0` before the first wave.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Removals required to finish the current wave.
    #[must_use]
    pub const fn required(&self) -> u32 {
        self.required
    }

    /// Kills and leaks observed for the current wave.
    #[must_use]
    pub const fn removed(&self) -> u32 {
        self.removed
    }

    /// Enemies of the current wave still waiting to spawn.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Starts the next wave if the scheduler is idle.
    ///
    /// Returns the number of the started wave.
    pub fn start_next_wave(&mut self, out_events: &mut Vec<Event>) -> Option<u32> {
        if !matches!(self.phase, WavePhase::Idle | WavePhase::WaveComplete) {
            return None;
        }
        let wave = self.wave + 1;
        let composition = WaveComposition::resolve(&self.config.waves, &self.config.spawning, wave);
        self.begin_wave(wave, composition, out_events);
        Some(wave)
    }

    /// Starts the next wave with an explicit composition if the scheduler is idle.
    pub fn start_wave_with(
        &mut self,
        composition: WaveComposition,
        out_events: &mut Vec<Event>,
    ) -> Option<u32> {
        if !matches!(self.phase, WavePhase::Idle | WavePhase::WaveComplete) {
            return None;
        }
        let wave = self.wave + 1;
        self.begin_wave(wave, composition, out_events);
        Some(wave)
    }

    fn begin_wave(&mut self, wave: u32, composition: WaveComposition, out_events: &mut Vec<Event>) {
        self.wave = wave;
        self.rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.config.seed, wave));
        self.required = composition.required();
        self.removed = 0;
        self.leaked = 0;
        self.spawn_clock = Duration::ZERO;
        self.idle_clock = Duration::ZERO;
        self.health_multiplier =
            1.0 + self.config.spawning.health_growth * wave.saturating_sub(1) as f32;

        self.queue.clear();
        let default_delay = self.config.spawning.spawn_interval();
        for entry in composition.entries() {
            let delay = entry
                .spawn_delay_ms
                .map_or(default_delay, Duration::from_millis);
            for _ in 0..entry.count {
                let delay = if self.queue.is_empty() {
                    Duration::ZERO
                } else {
                    delay
                };
                self.queue.push_back(PendingSpawn {
                    kind: entry.enemy_type,
                    boss: entry.boss,
                    delay,
                });
            }
        }

        info!(wave, required = self.required, "wave started");
        self.phase = WavePhase::Spawning;
        out_events.push(Event::WaveStarted {
            wave,
            required: self.required,
        });
        if self.queue.is_empty() {
            self.finish_spawning(out_events);
        }
    }

    /// Advances spawn and intermission timers from `TimeAdvanced` events and
    /// emits `Command::SpawnEnemy` for every enemy that is due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }

        if self.phase == WavePhase::WaveComplete {
            self.phase = WavePhase::Idle;
        }

        match self.phase {
            WavePhase::Idle => {
                if !self.config.spawning.auto_start {
                    return;
                }
                self.idle_clock = self.idle_clock.saturating_add(elapsed);
                if self.idle_clock < self.config.spawning.intermission() {
                    return;
                }
                let _ = self.start_next_wave(out_events);
                self.release_due_spawns(out);
                if self.queue.is_empty() && self.phase == WavePhase::Spawning {
                    self.finish_spawning(out_events);
                }
            }
            WavePhase::Spawning => {
                self.spawn_clock = self.spawn_clock.saturating_add(elapsed);
                self.release_due_spawns(out);
                if self.queue.is_empty() {
                    self.finish_spawning(out_events);
                }
            }
            WavePhase::AllSpawned | WavePhase::WaveComplete => {}
        }
    }

    /// Counts kills and leaks of the current wave and completes it once the
    /// required number of enemies has been removed.
    pub fn observe(&mut self, events: &[Event], out_events: &mut Vec<Event>) {
        for event in events {
            match event {
                Event::EnemyKilled { wave, .. } if *wave == self.wave => {
                    self.removed += 1;
                }
                Event::EnemyLeaked { wave, .. } if *wave == self.wave => {
                    self.removed += 1;
                    self.leaked += 1;
                }
                _ => {}
            }
        }
        self.try_complete(out_events);
    }

    fn release_due_spawns(&mut self, out: &mut Vec<Command>) {
        while let Some(next) = self.queue.front().copied() {
            if next.delay > self.spawn_clock {
                break;
            }
            self.spawn_clock -= next.delay;
            let _ = self.queue.pop_front();
            out.push(self.spawn_command(next));
        }
    }

    fn spawn_command(&mut self, spawn: PendingSpawn) -> Command {
        let angle = self.rng.gen_range(0.0..TAU);
        let radius = self.config.spawn_radius;
        let chance = self.config.microbe.spawn_chance.clamp(0.0, 1.0);
        let special = spawn.boss.is_none() && self.rng.gen_bool(chance);
        Command::SpawnEnemy {
            kind: spawn.kind,
            boss: spawn.boss,
            special,
            position: Position::new(angle.cos() * radius, angle.sin() * radius),
            wave: self.wave,
            health_multiplier: self.health_multiplier,
        }
    }

    fn finish_spawning(&mut self, out_events: &mut Vec<Event>) {
        self.phase = WavePhase::AllSpawned;
        self.spawn_clock = Duration::ZERO;
        out_events.push(Event::WaveAllSpawned { wave: self.wave });
        self.try_complete(out_events);
    }

    fn try_complete(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != WavePhase::AllSpawned || self.removed < self.required {
            return;
        }
        let perfect = self.leaked == 0;
        info!(wave = self.wave, perfect, "wave completed");
        self.phase = WavePhase::WaveComplete;
        self.idle_clock = Duration::ZERO;
        out_events.push(Event::WaveCompleted {
            wave: self.wave,
            perfect,
        });
    }
}

/// Derives the seed of the random stream used by `wave`.
#[must_use]
pub fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
