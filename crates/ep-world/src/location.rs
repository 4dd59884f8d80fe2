//! Structure-of-Arrays storage for locations and the occupancy index.

use std::collections::BTreeSet;

use ep_core::{AgentId, LocationId, LocationTypeId};

/// Planar coordinate.  Only carried through to outputs; nothing in the
/// engine depends on distances.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug)]
pub struct LocationStore {
    pub count: usize,

    pub kind: Vec<LocationTypeId>,

    pub coord: Vec<Coord>,

    /// Stored for capacity-weighted location choice; never enforced.
    pub capacity: Vec<Option<u32>>,

    /// Live agents currently at each location, in ascending id order.
    occupants: Vec<BTreeSet<AgentId>>,
}

impl LocationStore {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn location_ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        (0..self.count as u32).map(LocationId)
    }

    #[inline]
    pub fn contains(&self, location: LocationId) -> bool {
        location.index() < self.count
    }

    /// Live occupants of `location`.
    pub fn occupants(&self, location: LocationId) -> &BTreeSet<AgentId> {
        &self.occupants[location.index()]
    }

    pub(crate) fn new() -> Self {
        Self {
            count:     0,
            kind:      Vec::new(),
            coord:     Vec::new(),
            capacity:  Vec::new(),
            occupants: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, kind: LocationTypeId, coord: Coord, capacity: Option<u32>) -> LocationId {
        let id = LocationId(self.count as u32);
        self.kind.push(kind);
        self.coord.push(coord);
        self.capacity.push(capacity);
        self.occupants.push(BTreeSet::new());
        self.count += 1;
        id
    }

    pub(crate) fn enter(&mut self, location: LocationId, agent: AgentId) {
        self.occupants[location.index()].insert(agent);
    }

    pub(crate) fn leave(&mut self, location: LocationId, agent: AgentId) {
        self.occupants[location.index()].remove(&agent);
    }
}
