//! Unit tests for ep-world.

#[cfg(test)]
mod fixtures {
    use ep_core::{ActivityId, AgeClassId, Labels, LocationId, LocationTypeId};

    use crate::{AgentSpec, Coord, HealthModel, HealthState, WorldBuilder, WorldState};

    pub const HOUSE: ActivityId = ActivityId(0);
    pub const WORK: ActivityId = ActivityId(1);

    pub fn seir() -> HealthModel {
        HealthModel::new(
            vec![
                HealthState::new("S").susceptible(),
                HealthState::new("E"),
                HealthState::new("I").infectious(1.0),
                HealthState::new("R").terminal(),
                HealthState::new("D").dead(),
            ],
            &[("S", "E"), ("E", "I"), ("I", "R"), ("I", "D")],
        )
        .unwrap()
    }

    pub fn builder() -> WorldBuilder {
        WorldBuilder::new(
            Labels::new("activity", ["house", "work"]).unwrap(),
            Labels::new("location type", ["house", "work"]).unwrap(),
            Labels::new("age class", ["adult"]).unwrap(),
            seir(),
        )
    }

    /// Two houses and one workplace; agent 0 lives in house 0, agent 1 in
    /// house 1, both may work at location 2.
    pub fn small_world() -> WorldState {
        let mut b = builder();
        let h0 = b.add_location(LocationTypeId(0), Coord::new(0.0, 0.0), None);
        let h1 = b.add_location(LocationTypeId(0), Coord::new(1.0, 0.0), None);
        let w = b.add_location(LocationTypeId(1), Coord::new(5.0, 5.0), Some(10));
        for home in [h0, h1] {
            b.add_agent(
                AgentSpec::new(AgeClassId(0), HOUSE, home)
                    .permit(HOUSE, [home])
                    .permit(WORK, [w]),
            );
        }
        b.build().unwrap()
    }

    pub fn loc(n: u32) -> LocationId {
        LocationId(n)
    }
}

#[cfg(test)]
mod health {
    use super::fixtures::seir;
    use crate::{HealthModel, HealthState, WorldError};
    use ep_core::HealthId;

    #[test]
    fn edges_are_legal_only_forward() {
        let m = seir();
        let s = m.require("S").unwrap();
        let e = m.require("E").unwrap();
        assert!(m.is_legal(s, e));
        assert!(!m.is_legal(e, s));
        assert!(m.is_dead(m.require("D").unwrap()));
        assert!(m.is_terminal(m.require("R").unwrap()));
        assert_eq!(m.initial_state(), HealthId(0));
    }

    #[test]
    fn terminal_state_cannot_have_edges() {
        let err = HealthModel::new(
            vec![HealthState::new("S"), HealthState::new("R").terminal()],
            &[("R", "S")],
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::Config(_)));
    }

    #[test]
    fn unknown_edge_endpoint_is_error() {
        let err = HealthModel::new(vec![HealthState::new("S")], &[("S", "X")]).unwrap_err();
        assert!(matches!(err, WorldError::Core(_)));
    }

    #[test]
    fn negative_infectiousness_rejected() {
        let err = HealthModel::new(vec![HealthState::new("I").infectious(-1.0)], &[] as &[(&str, &str)])
            .unwrap_err();
        assert!(matches!(err, WorldError::Config(_)));
    }
}

#[cfg(test)]
mod builder {
    use super::fixtures::*;
    use crate::{AgentSpec, Coord, WorldError};
    use ep_core::{AgeClassId, LocationId, LocationTypeId};

    #[test]
    fn occupancy_built_from_initial_locations() {
        let w = small_world();
        assert_eq!(w.agent_count(), 2);
        assert_eq!(w.locations.occupants(loc(0)).len(), 1);
        assert_eq!(w.locations.occupants(loc(2)).len(), 0);
        assert!(w.occupancy_consistent());
        assert_eq!(w.health_count(w.health.require("S").unwrap()), 2);
    }

    #[test]
    fn nonexistent_location_rejected() {
        let mut b = builder();
        b.add_location(LocationTypeId(0), Coord::default(), None);
        b.add_agent(AgentSpec::new(AgeClassId(0), HOUSE, LocationId(7)).permit(HOUSE, [LocationId(7)]));
        assert!(matches!(b.build(), Err(WorldError::Config(_))));
    }

    #[test]
    fn initial_location_must_be_permitted() {
        let mut b = builder();
        let h = b.add_location(LocationTypeId(0), Coord::default(), None);
        let w = b.add_location(LocationTypeId(1), Coord::default(), None);
        b.add_agent(AgentSpec::new(AgeClassId(0), HOUSE, w).permit(HOUSE, [h]));
        assert!(matches!(b.build(), Err(WorldError::NotPermitted { .. })));
    }

    #[test]
    fn unknown_location_type_rejected() {
        let mut b = builder();
        b.add_location(LocationTypeId(9), Coord::default(), None);
        assert!(matches!(b.build(), Err(WorldError::Config(_))));
    }

    #[test]
    fn permitted_sets_are_sorted_and_deduplicated() {
        let mut b = builder();
        let a = b.add_location(LocationTypeId(0), Coord::default(), None);
        let c = b.add_location(LocationTypeId(0), Coord::default(), None);
        b.add_agent(AgentSpec::new(AgeClassId(0), HOUSE, a).permit(HOUSE, [c, a]).permit(HOUSE, [a]));
        let w = b.build().unwrap();
        assert_eq!(w.agents.permitted(ep_core::AgentId(0), HOUSE), &[a, c]);
        assert!(w.agents.permitted(ep_core::AgentId(0), WORK).is_empty());
    }
}

#[cfg(test)]
mod apply {
    use super::fixtures::*;
    use crate::{FieldValue, TestStatus, WorldError};
    use ep_core::{AgentId, Tick};

    #[test]
    fn location_move_updates_occupancy_and_returns_previous() {
        let mut w = small_world();
        let prev = w.apply(Tick(1), AgentId(0), FieldValue::Location(loc(2))).unwrap();
        assert_eq!(prev, FieldValue::Location(loc(0)));
        assert!(w.locations.occupants(loc(2)).contains(&AgentId(0)));
        assert!(w.locations.occupants(loc(0)).is_empty());
        assert!(w.occupancy_consistent());
    }

    #[test]
    fn health_edge_sets_timer_and_counts() {
        let mut w = small_world();
        let e = w.health.require("E").unwrap();
        w.apply(Tick(3), AgentId(1), FieldValue::Health(e)).unwrap();
        assert_eq!(w.health_of(AgentId(1)), e);
        assert_eq!(w.agents.health_since[1], Tick(3));
        assert_eq!(w.health_count(e), 1);
    }

    #[test]
    fn illegal_health_edge_is_error() {
        let mut w = small_world();
        let r = w.health.require("R").unwrap();
        let err = w.apply(Tick(1), AgentId(0), FieldValue::Health(r)).unwrap_err();
        assert!(matches!(err, WorldError::IllegalTransition { .. }));
        assert_eq!(w.health_of(AgentId(0)), w.health.require("S").unwrap());
    }

    #[test]
    fn dead_agent_leaves_occupancy_but_keeps_location() {
        let mut w = small_world();
        for name in ["E", "I", "D"] {
            let h = w.health.require(name).unwrap();
            w.apply(Tick(1), AgentId(0), FieldValue::Health(h)).unwrap();
        }
        assert!(w.is_dead(AgentId(0)));
        assert_eq!(w.location_of(AgentId(0)), loc(0));
        assert!(w.locations.occupants(loc(0)).is_empty());
        assert!(w.occupancy_consistent());
        let snap = w.get_state(AgentId(0)).unwrap();
        assert!(snap.dead);
    }

    #[test]
    fn testing_and_quarantine_fields() {
        let mut w = small_world();
        let prev = w.apply(Tick(2), AgentId(0), FieldValue::Testing(TestStatus::Booked { since: Tick(2) }));
        assert_eq!(prev.unwrap(), FieldValue::Testing(TestStatus::Untested));
        w.apply(Tick(2), AgentId(0), FieldValue::Quarantine(true)).unwrap();
        assert!(w.is_quarantined(AgentId(0)));
        assert!(w.testing_of(AgentId(0)).is_booked());
    }

    #[test]
    fn unknown_ids_rejected() {
        let mut w = small_world();
        assert!(matches!(
            w.apply(Tick(0), AgentId(99), FieldValue::Quarantine(true)),
            Err(WorldError::UnknownAgent(_))
        ));
        assert!(matches!(
            w.apply(Tick(0), AgentId(0), FieldValue::Location(loc(99))),
            Err(WorldError::UnknownLocation(_))
        ));
        assert!(w.get_state(loc(99)).is_err());
    }

    #[test]
    fn location_snapshot_lists_occupants() {
        let w = small_world();
        let snap = w.get_state(loc(1)).unwrap();
        assert_eq!(snap.occupants, vec![AgentId(1)]);
        assert_eq!(w.get_state(loc(2)).unwrap().capacity, Some(10));
    }
}

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use super::fixtures::builder;
    use crate::{load_network_readers, WorldError};
    use ep_core::{AgentId, LocationId};

    const LOCATIONS: &str = "location_id,type,x,y,capacity\n0,house,0,0,\n1,work,3,4,25\n";
    const AGENTS: &str = "agent_id,age_class,activity,location_id,health\n0,adult,house,0,\n1,adult,work,1,E\n";
    const PERMITTED: &str = "agent_id,activity,location_id\n0,house,0\n0,work,1\n1,work,1\n1,house,0\n";

    #[test]
    fn loads_three_file_network() {
        let w = load_network_readers(
            Cursor::new(LOCATIONS),
            Cursor::new(AGENTS),
            Cursor::new(PERMITTED),
            builder(),
        )
        .unwrap();
        assert_eq!(w.location_count(), 2);
        assert_eq!(w.locations.capacity[1], Some(25));
        assert_eq!(w.locations.capacity[0], None);
        assert_eq!(w.health_of(AgentId(1)), w.health.require("E").unwrap());
        assert_eq!(w.location_of(AgentId(1)), LocationId(1));
        assert!(w.occupancy_consistent());
    }

    #[test]
    fn unknown_activity_label_is_error() {
        let permitted = "agent_id,activity,location_id\n0,gym,0\n";
        let err = load_network_readers(
            Cursor::new(LOCATIONS),
            Cursor::new(AGENTS),
            Cursor::new(permitted),
            builder(),
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::Core(_)));
    }

    #[test]
    fn out_of_order_ids_rejected() {
        let locations = "location_id,type,x,y,capacity\n1,house,0,0,\n";
        let err = load_network_readers(
            Cursor::new(locations),
            Cursor::new(AGENTS),
            Cursor::new(PERMITTED),
            builder(),
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::Parse(_)));
    }

    #[test]
    fn permitted_row_for_missing_agent_rejected() {
        let permitted = "agent_id,activity,location_id\n0,house,0\n1,work,1\n7,house,0\n";
        let err = load_network_readers(
            Cursor::new(LOCATIONS),
            Cursor::new(AGENTS),
            Cursor::new(permitted),
            builder(),
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::Parse(_)));
    }
}

#[cfg(test)]
mod occupancy_props {
    use proptest::prelude::*;

    use super::fixtures::*;
    use crate::FieldValue;
    use ep_core::{AgentId, Tick};

    proptest! {
        /// Any sequence of location and health commits keeps the occupancy
        /// index in agreement with the per-agent location field.
        #[test]
        fn occupancy_tracks_location_field(
            ops in proptest::collection::vec((0u32..2, 0u32..3, any::<bool>()), 0..40)
        ) {
            let mut w = small_world();
            let chain: Vec<_> = ["E", "I", "D"].iter().map(|n| w.health.require(n).unwrap()).collect();
            let mut step = [0usize; 2];
            for (i, (agent, location, advance)) in ops.into_iter().enumerate() {
                let a = AgentId(agent);
                w.apply(Tick(i as u64), a, FieldValue::Location(loc(location))).unwrap();
                if advance && step[agent as usize] < chain.len() {
                    w.apply(Tick(i as u64), a, FieldValue::Health(chain[step[agent as usize]])).unwrap();
                    step[agent as usize] += 1;
                }
                prop_assert!(w.occupancy_consistent());
            }
        }
    }
}
