//! Fluent builder for constructing a [`Simulation`].

use pd_core::SimClock;
use pd_model::Model;
use pd_spatial::SegmentGeometry;

use crate::{OperationalDecisionSystem, SimConfig, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// # Required inputs
///
/// - [`SimConfig`]: iteration length and thread count
/// - a model: any of the `pd_model` models, or a [`Model`] directly
///
/// # Optional inputs
///
/// | Method          | Default                   |
/// |-----------------|---------------------------|
/// | `.geometry(g)`  | `SegmentGeometry::empty()` |
///
/// Agents are admitted afterwards with
/// [`Simulation::add_agent`], which checks each against the ones before it.
///
/// # Example
///
/// ```rust,ignore
/// let model = CollisionFreeSpeedModel::builder()
///     .add_profile(ParametersId(0), CollisionFreeSpeedParameters::default())
///     .build()?;
/// let mut sim = SimBuilder::new(SimConfig::default(), model)
///     .geometry(walls)
///     .build()?;
/// sim.add_agent(agent)?;
/// sim.run_iterations(100, &mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:    SimConfig,
    model:    Model,
    geometry:  Option<SegmentGeometry>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, model: impl Into<Model>) -> Self {
        Self { config, model: model.into(), geometry: None }
    }

    /// Walls of the walkable area.  Without them agents move in open space.
    pub fn geometry(mut self, geometry: SegmentGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Validate the configuration and return an empty [`Simulation`].
    pub fn build(self) -> SimResult<Simulation> {
        self.config.validate()?;

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| crate::SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        Ok(Simulation {
            clock:     SimClock::new(self.config.dt),
            config:    self.config,
            decision:  OperationalDecisionSystem::new(self.model),
            geometry:  self.geometry.unwrap_or_else(SegmentGeometry::empty),
            agents:    Vec::new(),
            index:     Default::default(),
            positions: None,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
