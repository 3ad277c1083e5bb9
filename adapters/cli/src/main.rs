#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Ring Defence combat simulation headlessly.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use ring_defence_core::{Event, RewardKind, SimulationConfig};
use ring_defence_simulation::{FixedStepDriver, Simulation};
use ring_defence_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod defence;

use defence::DemoDefence;

/// Runs a scripted defence against the configured waves and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "ring-defence", version, about)]
struct Cli {
    /// TOML configuration; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of simulation ticks.
    #[arg(long, default_value_t = 20_000)]
    ticks: u32,
    /// Overrides the configured step length in milliseconds.
    #[arg(long)]
    step_ms: Option<u64>,
    /// Frame length fed to the fixed-step driver; defaults to one step.
    #[arg(long)]
    frame_ms: Option<u64>,
    /// Stops after this many completed waves.
    #[arg(long, default_value_t = 5)]
    waves: u32,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Summary {
    frames: u32,
    ticks: u32,
    waves_completed: u32,
    kills: u32,
    leaks: u32,
    towers_lost: u32,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveCompleted { .. } => self.waves_completed += 1,
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyLeaked { .. } => self.leaks += 1,
                Event::TowerDestroyed { .. } => self.towers_lost += 1,
                _ => {}
            }
        }
    }
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SimulationConfig::from_toml_str(&source)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(step_ms) = cli.step_ms {
        config.game_loop.step_ms = step_ms;
    }
    config
        .validate()
        .context("command-line overrides produced an invalid configuration")?;
    Ok(config)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

fn run(cli: &Cli, config: SimulationConfig) -> Result<(Simulation, Summary)> {
    let mut driver = FixedStepDriver::from_config(&config.game_loop);
    let frame = Duration::from_millis(cli.frame_ms.unwrap_or(config.game_loop.step_ms).max(1));
    let mut simulation = Simulation::new(config).context("failed to start the simulation")?;
    let mut defence = DemoDefence::new();
    let mut summary = Summary::default();

    let _ = defence.spend(&mut simulation);
    if simulation.start_next_wave().is_none() {
        anyhow::bail!("the first wave could not be started");
    }

    'frames: while summary.ticks < cli.ticks && summary.waves_completed < cli.waves {
        summary.frames += 1;
        for _ in 0..driver.accumulate(frame) {
            if summary.ticks >= cli.ticks || summary.waves_completed >= cli.waves {
                break 'frames;
            }
            let events = simulation.tick(driver.step());
            summary.ticks += 1;
            let cleared = events
                .iter()
                .any(|event| matches!(event, Event::WaveCompleted { .. }));
            summary.record(events);
            if simulation.is_over() {
                break 'frames;
            }
            if cleared {
                let spending = defence.spend(&mut simulation);
                info!(
                    bought = spending.bought,
                    queued = defence.remaining(),
                    gold = query::gold(simulation.world()),
                    "between waves"
                );
            }
        }
    }
    Ok((simulation, summary))
}

fn print_summary(simulation: &Simulation, summary: &Summary) {
    let world = simulation.world();
    let pool = query::bullet_pool_stats(world);
    println!("frames driven:     {}", summary.frames);
    println!("ticks run:         {}", summary.ticks);
    println!("simulated time:    {:.1}s", query::now(world).as_secs_f64());
    println!("waves completed:   {}", summary.waves_completed);
    println!("perfect waves:     {}", simulation.rewards().perfect_waves());
    println!("enemies killed:    {}", summary.kills);
    println!("enemies leaked:    {}", summary.leaks);
    println!("towers lost:       {}", summary.towers_lost);
    println!("towers standing:   {}", query::towers(world).count());
    println!("gold:              {}", query::gold(world));
    println!("gold earned:       {}", simulation.rewards().gold_earned());
    println!(
        "upgrades bought:   {}",
        simulation.rewards().count(RewardKind::UpgradePurchased)
    );
    println!("base integrity:    {}", query::base_integrity(world));
    println!("bullet pool reuse: {:.0}%", pool.reuse_rate() * 100.0);
    if simulation.is_over() {
        println!("outcome:           base destroyed");
    }
}

/// Entry point for the Ring Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = load_config(&cli)?;
    info!(seed = config.seed, "starting simulation");
    let (simulation, summary) = run(&cli, config)?;
    print_summary(&simulation, &summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ring-defence").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn overrides_replace_configured_values() {
        let cli = parse(&["--seed", "99", "--step-ms", "20"]);
        let config = load_config(&cli).expect("defaults are valid");
        assert_eq!(config.seed, 99);
        assert_eq!(config.game_loop.step_ms, 20);
    }

    #[test]
    fn zero_step_override_is_rejected() {
        let cli = parse(&["--step-ms", "0"]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn missing_config_file_reports_the_path() {
        let cli = parse(&["--config", "/nonexistent/ring.toml"]);
        let error = load_config(&cli).expect_err("file does not exist");
        assert!(format!("{error:#}").contains("/nonexistent/ring.toml"));
    }

    #[test]
    fn bundled_skirmish_config_is_valid() {
        let config = SimulationConfig::from_toml_str(include_str!("../configs/skirmish.toml"))
            .expect("bundled config parses");
        assert_eq!(config.seed, 2024);
        assert_eq!(config.waves.len(), 2);
    }

    #[test]
    fn short_run_stops_at_the_tick_limit() {
        let cli = parse(&["--ticks", "50", "--waves", "1"]);
        let config = load_config(&cli).expect("defaults are valid");
        let (simulation, summary) = run(&cli, config).expect("run succeeds");
        assert_eq!(summary.ticks, 50);
        assert_eq!(query::now(simulation.world()), Duration::from_millis(16 * 50));
        assert_eq!(summary.frames, 50);
    }

    #[test]
    fn long_frames_are_capped_by_the_driver() {
        // 100 ms frames owe six 16 ms steps but the default cap is five
        let cli = parse(&["--ticks", "20", "--waves", "9", "--frame-ms", "100"]);
        let config = load_config(&cli).expect("defaults are valid");
        let (simulation, summary) = run(&cli, config).expect("run succeeds");
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.ticks, 20);
        assert_eq!(query::now(simulation.world()), Duration::from_millis(16 * 20));
    }
}
