//! Agent neighborhood queries.
//!
//! # Snapshot semantics
//!
//! [`RTreeNeighborhood`] owns a copy of the agents it was built from.  Query
//! results borrow from that copy, never from the live population, so phase 2
//! of an iteration can mutate the live agents while phase 1 results remain a
//! consistent pre-iteration view.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use pd_agent::GenericAgent;
use pd_core::Point;

// ── Contract ──────────────────────────────────────────────────────────────────

/// Agents near a point.
pub trait NeighborhoodSearch: Sync {
    /// All agents whose position lies within `radius` of `pos`, including any
    /// agent located exactly at `pos`.  Order is unspecified.
    fn neighbors_within(&self, pos: Point, radius: f64) -> Vec<&GenericAgent>;
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct AgentEntry {
    point: [f64; 2],
    /// Index into `RTreeNeighborhood::agents`.
    slot:  usize,
}

impl RTreeObject for AgentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── PositionIndex ─────────────────────────────────────────────────────────────

/// R-tree over agent positions that stores slots into an agent slice kept
/// elsewhere.
///
/// The slots are only meaningful for the slice the index was built from (plus
/// any [`insert`](Self::insert)ed tail).  Moving, removing or reordering
/// agents invalidates it.
#[derive(Clone)]
pub struct PositionIndex {
    tree: RTree<AgentEntry>,
}

impl PositionIndex {
    pub fn build(agents: &[GenericAgent]) -> Self {
        let entries: Vec<AgentEntry> = agents
            .iter()
            .enumerate()
            .map(|(slot, a)| AgentEntry { point: [a.pos.x, a.pos.y], slot })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    /// Register the agent at `slot`, located at `pos`.
    pub fn insert(&mut self, slot: usize, pos: Point) {
        self.tree.insert(AgentEntry { point: [pos.x, pos.y], slot });
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Pair the index with the slice its slots refer to.
    pub fn over<'a>(&'a self, agents: &'a [GenericAgent]) -> IndexedAgents<'a> {
        IndexedAgents { agents, index: self }
    }

    fn within<'a>(&self, agents: &'a [GenericAgent], pos: Point, radius: f64) -> Vec<&'a GenericAgent> {
        self.tree
            .locate_within_distance([pos.x, pos.y], radius * radius)
            .map(move |e| &agents[e.slot])
            .collect()
    }
}

/// A [`PositionIndex`] borrowed together with the live agents it indexes.
pub struct IndexedAgents<'a> {
    agents: &'a [GenericAgent],
    index:  &'a PositionIndex,
}

impl NeighborhoodSearch for IndexedAgents<'_> {
    fn neighbors_within(&self, pos: Point, radius: f64) -> Vec<&GenericAgent> {
        self.index.within(self.agents, pos, radius)
    }
}

// ── RTreeNeighborhood ─────────────────────────────────────────────────────────

/// Frozen snapshot of a population with an R-tree over agent positions.
pub struct RTreeNeighborhood {
    agents: Vec<GenericAgent>,
    index:  PositionIndex,
}

impl RTreeNeighborhood {
    /// Snapshot `agents` and bulk-load the index.
    pub fn build(agents: &[GenericAgent]) -> Self {
        Self { index: PositionIndex::build(agents), agents: agents.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The snapshot, in the order it was built from.
    pub fn agents(&self) -> &[GenericAgent] {
        &self.agents
    }
}

impl NeighborhoodSearch for RTreeNeighborhood {
    fn neighbors_within(&self, pos: Point, radius: f64) -> Vec<&GenericAgent> {
        self.index.within(&self.agents, pos, radius)
    }
}
