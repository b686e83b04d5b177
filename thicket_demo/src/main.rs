use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use thicket_common::TreeSupport;
use thicket_core::prelude::*;
use thicket_core::variable::{EntityId, Vec3};
use thicket_std::capability::{Health, Mover, Weapon};
use thicket_std::sim::{SimAgent, SimTarget};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod guard;

/// Run a guard behaviour tree against a simulated agent.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of ticks to run.
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Simulated seconds between ticks.
    #[arg(long, default_value_t = 0.25)]
    dt: f64,

    /// Tick at which an enemy becomes visible.
    #[arg(long, default_value_t = 30)]
    enemy_at: u64,

    /// Load the tree from a json file instead of using the built-in guard.
    #[arg(long)]
    tree: Option<PathBuf>,

    /// Print the tree as json and exit.
    #[arg(long)]
    dump: bool,

    /// Print the state of every node after each tick.
    #[arg(long)]
    snapshot: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    let mut support = TreeSupport::new();
    thicket_std::add_tree_support(&mut support);

    let asset = match &args.tree {
        Some(path) => support.load_json(&std::fs::read_to_string(path)?)?,
        None => Arc::new(guard::guard()?),
    };

    if args.dump {
        println!("{}", support.to_json(&asset)?);
        return Ok(());
    }

    let sim = Arc::new(SimAgent::new(Vec3::ZERO));
    let enemy = EntityId(1);
    sim.add_target(SimTarget {
        id: enemy,
        position: Vec3::new(6.0, 0.0, 4.0),
        visible: false,
    });

    let clock = Arc::new(ManualClock::new(0.0));
    let env = Environment::new(
        Arc::new(SimAgent::agent("guard", &sim)),
        GlobalStore::default(),
        clock.clone(),
    );
    let mut instance = TreeInstance::new(asset, env)?;

    for tick in 0..args.ticks {
        if tick == args.enemy_at {
            info!(tick, "enemy appears");
            sim.set_visible(enemy, true);
        }
        clock.set(tick as f64 * args.dt);
        let status = instance.tick();
        sim.step(args.dt as f32);
        info!(
            tick,
            ?status,
            position = ?sim.position(),
            health = sim.health(),
            ammo = sim.ammo(),
            "ticked"
        );
        if args.snapshot {
            println!("{}", serde_json::to_string(&instance.snapshot())?);
        }
    }
    instance.halt();
    info!(shots = sim.shots().len(), "done");
    Ok(())
}
