// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

mod config;
mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use spin_app::{init_logging, ConfigFile};
use spin_core::presentation::WheelView;
use spin_core::reward::{HttpRewardClient, SimulatedRewardSource};
use spin_core::wheel::controller::{SpinEventEmitter, SpinMachine};
use spin_core::{spawn_spin_task, DynResult, RewardCatalog, RewardSource, SpinHandle, SpinPhase};

use config::SpinwheelConfig;
use render::RewardPrinter;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - spin-to-win reward wheel");

#[derive(Debug, Parser)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print example configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Player id the rewards are credited to
    #[arg(short = 'p', long = "player")]
    player: Option<Uuid>,
    /// Reward API base URL
    #[arg(short = 'u', long = "api-url")]
    api_url: Option<String>,
    /// Play with simulated rewards instead of the API
    #[arg(long = "offline")]
    offline: bool,
}

/// One line typed by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    /// Start when idle, stop when spinning.
    Toggle,
    Acknowledge,
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "s" | "spin" | "stop" => Self::Toggle,
            "a" | "ok" | "collect" => Self::Acknowledge,
            "q" | "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

fn main() -> DynResult<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_main())
}

async fn async_main() -> DynResult<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", SpinwheelConfig::example_toml());
        return Ok(());
    }

    let (cfg, config_path) = SpinwheelConfig::load(cli.config.as_deref())?;
    init_logging(cfg.general.log_level.as_deref());

    if let Some(ref path) = config_path {
        info!("Loaded configuration from {}", path.display());
    }

    // Resolve player: CLI > config > fresh id
    let player_id = cli.player.or(cfg.general.player_id).unwrap_or_else(|| {
        let id = Uuid::new_v4();
        info!("No player id configured, playing as {}", id);
        id
    });

    let source = build_source(&cli, &cfg)?;

    let mut emitter = SpinEventEmitter::new();
    emitter.register(RewardPrinter::shared());

    let machine = SpinMachine::new(cfg.machine_config());
    let (handle, spin_task) = spawn_spin_task(cfg.task_config(player_id), machine, source, emitter);

    let renderer = tokio::spawn(render_loop(
        handle.clone(),
        cfg.catalog.clone(),
        cfg.wheel.pointer_angle,
        cfg.frame_interval(),
    ));

    println!("s = spin/stop, a = collect, q = quit (each followed by Enter)");

    let result = tokio::select! {
        res = input_loop(&handle) => res,
        res = signal::ctrl_c() => {
            info!("Ctrl+C received, shutting down");
            res.map_err(Into::into)
        }
    };

    renderer.abort();
    let _ = renderer.await;
    drop(handle);
    let _ = spin_task.await;
    println!();
    result
}

/// Pick the reward source: simulated when offline, the HTTP API otherwise.
fn build_source(cli: &Cli, cfg: &SpinwheelConfig) -> DynResult<Arc<dyn RewardSource>> {
    if cli.offline || cfg.simulation.enabled {
        let sim = &cfg.simulation;
        let mut source = SimulatedRewardSource::from_catalog(
            &cfg.catalog,
            Duration::from_millis(sim.min_latency_ms),
            Duration::from_millis(sim.max_latency_ms),
            sim.failure_rate,
        )?
        .with_starting_points(sim.starting_points);
        if let Some(seed) = sim.seed {
            source = source.with_seed(seed);
        }
        info!("Playing offline with simulated rewards");
        return Ok(Arc::new(source));
    }

    // Resolve API URL: CLI > config [api] section > error
    let url = cli
        .api_url
        .clone()
        .or_else(|| cfg.api.url.clone())
        .ok_or("API URL not specified. Use --api-url, set [spinwheel.api].url in config, or pass --offline.")?;

    let client = HttpRewardClient::new(&url, cfg.request_timeout())?;
    info!("Requesting rewards from {}", client.endpoint());
    Ok(Arc::new(client))
}

async fn input_loop(handle: &SpinHandle) -> DynResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Toggle => {
                if handle.latest().phase == SpinPhase::Spinning {
                    handle.stop_spin().await?;
                } else {
                    handle.start_spin().await?;
                }
            }
            Input::Acknowledge => {
                handle.acknowledge_result().await?;
            }
            Input::Quit => break,
            Input::Unknown(other) => {
                warn!("Unknown command '{}'", other);
            }
        }
    }
    Ok(())
}

async fn render_loop(
    handle: SpinHandle,
    catalog: RewardCatalog,
    pointer_angle: f64,
    frame_interval: Duration,
) {
    let mut view = WheelView::new();
    let mut ticker = time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = String::new();

    loop {
        ticker.tick().await;
        let snapshot = handle.latest();
        let now = Instant::now();
        view.observe(&snapshot, now);
        let line = render::render_line(&snapshot, &catalog, view.visual_angle(now), pointer_angle);
        if line != last {
            render::draw(&line);
            last = line;
        }
    }
}
