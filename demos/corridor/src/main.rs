//! corridor: two groups of pedestrians crossing in a 20 m × 4 m corridor.
//!
//! ```text
//! cargo run -p corridor --release -- [cfs|velocity|gcfm|sfm|avm]
//! RUST_LOG=debug cargo run -p corridor -- avm
//! ```
//!
//! Twelve agents start at the west end heading east and twelve at the east
//! end heading west.  Agents are removed once they reach their destination;
//! the run ends when the corridor is empty or after `MAX_ITERATIONS`.  In the
//! latter case every agent left behind is logged at `warn`.

use anyhow::{Result, bail};
use pd_agent::{AgentBuilder, GenericAgent, ModelType};
use pd_core::{AgentId, ParametersId, Point, Tick};
use pd_model::{
    AnticipationVelocityModel, AnticipationVelocityParameters, CollisionFreeSpeedModel,
    CollisionFreeSpeedParameters, GeneralizedCentrifugalForceModel, GeneralizedCentrifugalForceParameters,
    Model, SocialForceModel, SocialForceParameters, VelocityModel, VelocityParameters,
};
use pd_sim::{SimBuilder, SimConfig, SimObserver, Simulation};
use pd_spatial::SegmentGeometry;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

// ── Constants ─────────────────────────────────────────────────────────────────

const LENGTH:         f64 = 20.0;
const WIDTH:          f64 = 4.0;
const DT:             f64 = 0.01;
/// Tie-break seed for the anticipation model.
const SEED:           u64 = 42;
const MAX_ITERATIONS: u64 = 6_000;
const LOG_EVERY:      u64 = 200;
/// Agents closer than this to their destination leave the corridor.
const EXIT_RADIUS:    f64 = 0.5;

const ROWS:    [f64; 3] = [0.8, 2.0, 3.2];
const WEST_XS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
const EAST_XS: [f64; 4] = [16.0, 17.0, 18.0, 19.0];

// ── Model selection ───────────────────────────────────────────────────────────

fn build_model(name: &str, seed: u64) -> Result<(ModelType, Model)> {
    let profile = ParametersId(0);
    let picked = match name {
        "cfs" => (
            ModelType::CollisionFreeSpeed,
            CollisionFreeSpeedModel::builder()
                .add_profile(profile, CollisionFreeSpeedParameters::default())
                .build()?
                .into(),
        ),
        "velocity" => (
            ModelType::Velocity,
            VelocityModel::builder().add_profile(profile, VelocityParameters::default()).build()?.into(),
        ),
        "gcfm" => (
            ModelType::GeneralizedCentrifugalForce,
            GeneralizedCentrifugalForceModel::builder()
                .add_profile(profile, GeneralizedCentrifugalForceParameters::default())
                .build()?
                .into(),
        ),
        "sfm" => (
            ModelType::SocialForce,
            SocialForceModel::builder().add_profile(profile, SocialForceParameters::default()).build()?.into(),
        ),
        "avm" => (
            ModelType::AnticipationVelocity,
            AnticipationVelocityModel::builder()
                .seed(seed)
                .add_profile(profile, AnticipationVelocityParameters::default())
                .build()?
                .into(),
        ),
        other => bail!("unknown model {other:?}; expected one of cfs, velocity, gcfm, sfm, avm"),
    };
    Ok(picked)
}

// ── Observer ──────────────────────────────────────────────────────────────────

struct ProgressLogger {
    every: u64,
}

impl SimObserver for ProgressLogger {
    fn on_iteration_end(&mut self, tick: Tick, agents: &[GenericAgent]) {
        if !tick.0.is_multiple_of(self.every) {
            return;
        }
        let eastbound = agents.iter().filter(|a| a.destination.x > LENGTH / 2.0).count();
        info!(%tick, agents = agents.len(), eastbound, westbound = agents.len() - eastbound, "progress");
        for a in agents {
            debug!(%tick, agent = %a.id, x = a.pos.x, y = a.pos.y, "position");
        }
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn populate(sim: &mut Simulation, model: ModelType) -> Result<()> {
    let mut next_id = 0;
    for (xs, dest_x) in [(WEST_XS, LENGTH - EXIT_RADIUS / 2.0), (EAST_XS, EXIT_RADIUS / 2.0)] {
        for &y in &ROWS {
            for &x in &xs {
                let agent = AgentBuilder::new(AgentId(next_id), model)
                    .position(Point::new(x, y))
                    .destination(Point::new(dest_x, y))
                    .parameters(ParametersId(0))
                    .build();
                sim.add_agent(agent)?;
                next_id += 1;
            }
        }
    }
    Ok(())
}

/// Remove every agent within [`EXIT_RADIUS`] of its destination.
fn remove_arrived(sim: &mut Simulation) -> Result<usize> {
    let arrived: Vec<AgentId> = sim
        .agents()
        .iter()
        .filter(|a| (a.destination - a.pos).norm() < EXIT_RADIUS)
        .map(|a| a.id)
        .collect();
    for &id in &arrived {
        sim.remove_agent(id)?;
    }
    Ok(arrived.len())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "cfs".to_owned());
    let config = SimConfig { dt: DT, num_threads: None };
    let (model_type, model) = build_model(&name, SEED)?;

    let walls = SegmentGeometry::from_polyline(
        &[Point::new(0.0, 0.0), Point::new(LENGTH, 0.0), Point::new(LENGTH, WIDTH), Point::new(0.0, WIDTH)],
        true,
    )?;
    let mut sim = SimBuilder::new(config, model).geometry(walls).build()?;
    populate(&mut sim, model_type)?;
    info!(model = %model_type, agents = sim.agent_count(), "corridor populated");

    let mut logger = ProgressLogger { every: LOG_EVERY };
    let mut exited = 0;
    while sim.agent_count() > 0 && sim.iteration_count().0 < MAX_ITERATIONS {
        sim.iterate(&mut logger);
        exited += remove_arrived(&mut sim)?;
    }

    let remaining = sim.agent_count();
    if remaining == 0 {
        info!(iterations = sim.iteration_count().0, seconds = sim.elapsed_time(), exited, "corridor cleared");
    } else {
        // Counter-flow can jam the force-based models; name who is stuck.
        warn!(
            iterations = sim.iteration_count().0,
            seconds = sim.elapsed_time(),
            exited,
            remaining,
            "iteration cap reached with agents still in the corridor"
        );
        report_stuck(&sim);
    }
    Ok(())
}

/// An agent that did not reach its exit.
struct Stuck {
    id:      AgentId,
    pos:     Point,
    heading: &'static str,
    to_go:   f64,
}

fn stuck_agents(sim: &Simulation) -> Vec<Stuck> {
    sim.agents()
        .iter()
        .map(|a| Stuck {
            id:      a.id,
            pos:     a.pos,
            heading: if a.destination.x > a.pos.x { "east" } else { "west" },
            to_go:   (a.destination - a.pos).norm(),
        })
        .collect()
}

fn report_stuck(sim: &Simulation) {
    for s in stuck_agents(sim) {
        warn!(agent = %s.id, heading = s.heading, x = s.pos.x, y = s.pos.y, to_go = s.to_go, "still in corridor");
    }
}
