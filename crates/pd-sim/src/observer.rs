//! Simulation observer trait for progress reporting and data collection.

use pd_agent::GenericAgent;
use pd_core::Tick;

/// Callbacks invoked by [`Simulation::iterate`][crate::Simulation::iterate].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: trajectory recorder
///
/// ```rust,ignore
/// struct Trajectories(Vec<(Tick, AgentId, Point)>);
///
/// impl SimObserver for Trajectories {
///     fn on_iteration_end(&mut self, tick: Tick, agents: &[GenericAgent]) {
///         self.0.extend(agents.iter().map(|a| (tick, a.id, a.pos)));
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before the neighborhood index is rebuilt.
    fn on_iteration_start(&mut self, _tick: Tick) {}

    /// Called once every agent holds its post-iteration state.  `tick` is the
    /// iteration that just ran.
    fn on_iteration_end(&mut self, _tick: Tick, _agents: &[GenericAgent]) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
