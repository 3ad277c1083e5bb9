#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game loop that owns the world and every combat system.
//!
//! A tick advances the clock, releases due spawns, moves enemies, rebuilds the
//! spatial index, fires towers, resolves bullets, enemy fire, mines and
//! support auras, pays income, ages effects, reaps casualties, lets the wave
//! scheduler observe removals, and finally hands the committed events to the
//! attached listeners. Every system sees the same `dt`.

use std::time::Duration;

use ring_defence_core::{Command, ConfigError, Event, SimulationConfig};
use ring_defence_system_collision::CollisionDetector;
use ring_defence_system_defense_support::DefenseSupport;
use ring_defence_system_mines::MineField;
use ring_defence_system_movement::Movement;
use ring_defence_system_projectiles::{BulletUpdate, EnemyFire, EnemyProjectiles};
use ring_defence_system_tower_combat::TowerFiring;
use ring_defence_system_wave_scheduler::{self as wave_scheduler, WaveScheduler};
use ring_defence_world::{self as world, query, World};
use tracing::{info, warn};

mod driver;
mod economy;
mod listener;

pub use driver::FixedStepDriver;
pub use listener::{ListenerError, RewardLedger, SimulationListener};

use economy::Income;

/// Headless combat simulation.
pub struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    movement: Movement,
    detector: CollisionDetector,
    firing: TowerFiring,
    bullets: BulletUpdate,
    enemy_fire: EnemyFire,
    enemy_projectiles: EnemyProjectiles,
    mines: MineField,
    support: DefenseSupport,
    income: Income,
    ledger: RewardLedger,
    listeners: Vec<Box<dyn SimulationListener>>,
    events: Vec<Event>,
    wave_events: Vec<Event>,
    commands: Vec<Command>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("now", &query::now(&self.world))
            .field("wave", &self.scheduler.wave())
            .field("phase", &self.scheduler.phase())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Validates `config` and builds the world together with every system.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scheduler: WaveScheduler::new(wave_scheduler::Config::from_simulation(&config)),
            detector: CollisionDetector::new(config.spatial.cell_size),
            world: World::new(&config),
            movement: Movement::new(),
            firing: TowerFiring::new(),
            bullets: BulletUpdate::new(),
            enemy_fire: EnemyFire::new(),
            enemy_projectiles: EnemyProjectiles::new(),
            mines: MineField::new(),
            support: DefenseSupport::new(),
            income: Income::default(),
            ledger: RewardLedger::new(),
            listeners: Vec::new(),
            events: Vec::new(),
            wave_events: Vec::new(),
            commands: Vec::new(),
        })
    }

    /// Read-only access to the authoritative state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Wave scheduler state.
    #[must_use]
    pub const fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    /// Reward events counted since construction.
    #[must_use]
    pub const fn rewards(&self) -> &RewardLedger {
        &self.ledger
    }

    /// Events committed by the most recent tick.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Reports whether the base has fallen.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::is_over(&self.world)
    }

    /// Attaches a listener that receives every committed event.
    pub fn add_listener(&mut self, listener: Box<dyn SimulationListener>) {
        self.listeners.push(listener);
    }

    /// Applies a player command and returns the events it produced.
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.dispatch(&events);
        events
    }

    /// Starts the next wave unless one is already running.
    pub fn start_next_wave(&mut self) -> Option<u32> {
        let mut events = Vec::new();
        let wave = self.scheduler.start_next_wave(&mut events);
        self.dispatch(&events);
        wave
    }

    /// Runs one simulation pass of `dt` and returns the committed events.
    ///
    /// Once the game is over ticks are ignored and no events are produced.
    pub fn tick(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();
        if self.is_over() {
            return &self.events;
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        self.commands.clear();
        self.wave_events.clear();
        self.scheduler
            .handle(&self.events, &mut self.commands, &mut self.wave_events);
        self.events.append(&mut self.wave_events);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        self.movement.handle(&mut self.world, dt, &mut self.events);
        self.detector.rebuild(query::enemies(&self.world));
        self.firing.handle(&mut self.world, &mut self.events);
        self.bullets
            .handle(&mut self.world, &mut self.detector, dt, &mut self.events);
        self.enemy_fire.handle(&mut self.world);
        self.enemy_projectiles
            .handle(&mut self.world, dt, &mut self.events);
        self.mines
            .handle(&mut self.world, &mut self.detector, &mut self.events);
        self.support.handle(&mut self.world, dt, &mut self.events);
        self.income.handle(&mut self.world, dt, &mut self.events);
        self.world.age_effects(dt);
        self.world.reap_casualties();

        self.scheduler.observe(&self.events, &mut self.wave_events);
        self.events.append(&mut self.wave_events);

        if self.is_over() {
            info!(
                wave = self.scheduler.wave(),
                now_ms = query::now(&self.world).as_millis() as u64,
                "base destroyed"
            );
        }

        let events = std::mem::take(&mut self.events);
        self.dispatch(&events);
        self.events = events;
        &self.events
    }

    fn dispatch(&mut self, events: &[Event]) {
        for event in events {
            let _ = self.ledger.on_event(event);
            for listener in &mut self.listeners {
                if let Err(error) = listener.on_event(event) {
                    warn!(listener = listener.name(), %error, "listener failed");
                }
            }
        }
    }
}
