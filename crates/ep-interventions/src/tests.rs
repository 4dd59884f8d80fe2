//! Unit tests for ep-interventions.

#[cfg(test)]
mod fixtures {
    use ep_bus::{Envelope, Module, ModuleContext, ModuleId, ModuleKind, Notification, Request, RequestQueue};
    use ep_core::{ActivityId, AgeClassId, Labels, LocationId, LocationTypeId, SimClock, SimRng};
    use ep_world::{AgentSpec, Coord, HealthModel, HealthState, WorldBuilder, WorldState};

    pub const MONDAY: i64 = 1_704_067_200;
    pub const HOUSE: ActivityId = ActivityId(0);
    pub const WORK: ActivityId = ActivityId(1);

    pub fn health() -> HealthModel {
        HealthModel::new(
            vec![
                HealthState::new("S").susceptible(),
                HealthState::new("I").infectious(1.0),
                HealthState::new("R").terminal(),
                HealthState::new("D").dead(),
            ],
            &[("S", "I"), ("I", "R"), ("I", "D")],
        )
        .unwrap()
    }

    /// `n` agents, each with its own house (locations `0..n`), sharing one
    /// workplace (`n`) and one hospital (`n + 1`).  Agents start at work.
    pub fn world(n: usize) -> WorldState {
        let mut b = WorldBuilder::new(
            Labels::new("activity", ["house", "work"]).unwrap(),
            Labels::new("location type", ["house", "work", "hospital"]).unwrap(),
            Labels::new("age class", ["adult"]).unwrap(),
            health(),
        );
        let houses: Vec<LocationId> = (0..n)
            .map(|_| b.add_location(LocationTypeId(0), Coord::default(), None))
            .collect();
        let work = b.add_location(LocationTypeId(1), Coord::default(), None);
        let hospital = b.add_location(LocationTypeId(2), Coord::default(), None);
        for &h in &houses {
            b.add_agent(
                AgentSpec::new(AgeClassId(0), WORK, work)
                    .permit(HOUSE, [h])
                    .permit(WORK, [work, hospital]),
            );
        }
        b.build().unwrap()
    }

    /// An hourly clock positioned at tick `t`.
    pub fn clock_at(t: u64) -> SimClock {
        let mut clock = SimClock::new(MONDAY, 3600, 1_000).unwrap();
        for _ in 0..=t {
            clock.next();
        }
        clock
    }

    pub fn deliver<M: Module>(
        m: &mut M,
        world: &WorldState,
        clock: &SimClock,
        rng: &mut SimRng,
        enabled: bool,
        msg: Notification,
    ) -> Vec<Request> {
        let mut queue = RequestQueue::new();
        let mut ctx = ModuleContext::new(clock, world, rng, ModuleId(0), ModuleKind::Intervention, enabled, &mut queue);
        m.handle(&msg, &mut ctx).unwrap();
        queue.take().into_iter().map(|e| e.request).collect()
    }

    /// Run `m`'s review over `queued`; returns what it added.
    pub fn review<M: Module>(
        m: &mut M,
        world: &WorldState,
        clock: &SimClock,
        rng: &mut SimRng,
        enabled: bool,
        queued: &[Envelope],
    ) -> Vec<Request> {
        let mut queue = RequestQueue::new();
        let mut ctx = ModuleContext::new(clock, world, rng, ModuleId(9), ModuleKind::Intervention, enabled, &mut queue);
        m.review(queued, &mut ctx).unwrap();
        queue.take().into_iter().map(|e| e.request).collect()
    }

    /// Requests as queued during collect by a module of `kind`.
    pub fn collected(kind: ModuleKind, requests: &[Request]) -> Vec<Envelope> {
        let mut queue = RequestQueue::new();
        for &r in requests {
            queue.push(ModuleId(0), kind, r);
        }
        queue.take()
    }

    pub fn tick(t: u64) -> Notification {
        Notification::Tick { tick: ep_core::Tick(t) }
    }

    pub fn midnight(t: u64) -> Notification {
        Notification::Midnight { tick: ep_core::Tick(t), day: t / 24 }
    }
}

#[cfg(test)]
mod config {
    use crate::{InterventionParams, RandomTesting, RandomTestingConfig, SymptomaticTesting, SymptomaticTestingConfig};

    use super::fixtures::*;

    #[test]
    fn params_parse_with_absent_policies() {
        let p = InterventionParams::from_json_str(r#"{ "random_testing": { "tests_per_day": 5 } }"#).unwrap();
        assert_eq!(p.random_testing.unwrap().invitation_delay_days, 0.0);
        assert!(p.laboratory.is_none());
        assert!(p.quarantine.is_none());
    }

    #[test]
    fn negative_delay_rejected() {
        let cfg = RandomTestingConfig { tests_per_day: 1, invitation_delay_days: -1.0 };
        assert!(RandomTesting::new(cfg).is_err());
    }

    #[test]
    fn probability_out_of_range_rejected() {
        let cfg = SymptomaticTestingConfig {
            probability:           1.5,
            onset_to_booking_days: 0.0,
            symptomatic_states:    vec!["I".into()],
        };
        assert!(SymptomaticTesting::new(cfg, &health()).is_err());
    }

    #[test]
    fn unknown_state_rejected() {
        let cfg = SymptomaticTestingConfig {
            probability:           1.0,
            onset_to_booking_days: 0.0,
            symptomatic_states:    vec!["zombie".into()],
        };
        assert!(SymptomaticTesting::new(cfg, &health()).is_err());
    }
}

#[cfg(test)]
mod testing {
    use ep_bus::{Notification, Request};
    use ep_core::{AgentId, HealthId, SimRng, Tick};
    use ep_world::{FieldValue, TestStatus};

    use super::fixtures::*;
    use crate::{RandomTesting, RandomTestingConfig, SymptomaticTesting, SymptomaticTestingConfig};

    #[test]
    fn zero_delay_books_at_midnight() {
        let w = world(5);
        let mut m = RandomTesting::new(RandomTestingConfig { tests_per_day: 2, invitation_delay_days: 0.0 }).unwrap();
        let mut rng = SimRng::new(3);
        let clock = clock_at(24);
        let reqs = deliver(&mut m, &w, &clock, &mut rng, true, midnight(24));
        assert_eq!(reqs.len(), 2);
        assert!(reqs.iter().all(|r| matches!(r, Request::BookTest { .. })));
        assert_eq!(m.pending(), 0);
    }

    #[test]
    fn invitation_delay_defers_booking() {
        let w = world(5);
        let mut m = RandomTesting::new(RandomTestingConfig { tests_per_day: 3, invitation_delay_days: 1.0 }).unwrap();
        let mut rng = SimRng::new(3);
        assert!(deliver(&mut m, &w, &clock_at(24), &mut rng, true, midnight(24)).is_empty());
        assert_eq!(m.pending(), 3);
        assert!(deliver(&mut m, &w, &clock_at(47), &mut rng, true, tick(47)).is_empty());
        assert_eq!(deliver(&mut m, &w, &clock_at(48), &mut rng, true, tick(48)).len(), 3);
        assert_eq!(m.pending(), 0);
    }

    #[test]
    fn disabled_invites_nobody() {
        let w = world(5);
        let mut m = RandomTesting::new(RandomTestingConfig { tests_per_day: 2, invitation_delay_days: 0.0 }).unwrap();
        let mut rng = SimRng::new(3);
        assert!(deliver(&mut m, &w, &clock_at(24), &mut rng, false, midnight(24)).is_empty());
    }

    #[test]
    fn dead_and_booked_agents_not_invited() {
        let mut w = world(3);
        w.apply(Tick(0), AgentId(0), FieldValue::Health(HealthId(1))).unwrap();
        w.apply(Tick(1), AgentId(0), FieldValue::Health(HealthId(3))).unwrap();
        w.apply(Tick(1), AgentId(1), FieldValue::Testing(TestStatus::Booked { since: Tick(1) })).unwrap();
        let mut m = RandomTesting::new(RandomTestingConfig { tests_per_day: 10, invitation_delay_days: 0.0 }).unwrap();
        let mut rng = SimRng::new(3);
        let reqs = deliver(&mut m, &w, &clock_at(24), &mut rng, true, midnight(24));
        assert_eq!(reqs, vec![Request::BookTest { agent: AgentId(2) }]);
    }

    fn symptomatic(p: f64, days: f64) -> SymptomaticTesting {
        SymptomaticTesting::new(
            SymptomaticTestingConfig {
                probability:           p,
                onset_to_booking_days: days,
                symptomatic_states:    vec!["I".into()],
            },
            &health(),
        )
        .unwrap()
    }

    fn onset(agent: u32) -> Notification {
        Notification::Health { agent: AgentId(agent), from: HealthId(0), to: HealthId(1) }
    }

    #[test]
    fn symptom_onset_books_after_delay() {
        let w = world(2);
        let mut m = symptomatic(1.0, 0.5);
        let mut rng = SimRng::new(1);
        assert!(deliver(&mut m, &w, &clock_at(10), &mut rng, true, onset(1)).is_empty());
        assert!(deliver(&mut m, &w, &clock_at(21), &mut rng, true, tick(21)).is_empty());
        assert_eq!(
            deliver(&mut m, &w, &clock_at(22), &mut rng, true, tick(22)),
            vec![Request::BookTest { agent: AgentId(1) }]
        );
    }

    #[test]
    fn leaving_symptomatic_state_books_nothing() {
        let w = world(1);
        let mut m = symptomatic(1.0, 0.0);
        let mut rng = SimRng::new(1);
        let recovery = Notification::Health { agent: AgentId(0), from: HealthId(1), to: HealthId(2) };
        deliver(&mut m, &w, &clock_at(3), &mut rng, true, recovery);
        assert_eq!(m.pending(), 0);
    }

    #[test]
    fn zero_probability_books_nothing() {
        let w = world(1);
        let mut m = symptomatic(0.0, 0.0);
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(3), &mut rng, true, onset(0));
        assert!(deliver(&mut m, &w, &clock_at(4), &mut rng, true, tick(4)).is_empty());
    }
}

#[cfg(test)]
mod laboratory {
    use ep_bus::{Notification, Request};
    use ep_core::{AgentId, HealthId, SimRng, Tick};
    use ep_world::{FieldValue, WorldState};

    use super::fixtures::*;
    use crate::{Laboratory, LaboratoryConfig};

    fn lab(fpr: f64, fnr: f64) -> Laboratory {
        Laboratory::new(
            LaboratoryConfig {
                prob_false_positive:             fpr,
                prob_false_negative:             fnr,
                detectable_states:               vec!["I".into()],
                symptomatic_states:              vec!["I".into()],
                sampling_delay_days_symptomatic: 0.25,
                sampling_delay_days_no_symptoms: 1.0,
                result_delay_days:               0.5,
            },
            &health(),
        )
        .unwrap()
    }

    fn infected_world() -> WorldState {
        let mut w = world(2);
        w.apply(Tick(0), AgentId(0), FieldValue::Health(HealthId(1))).unwrap();
        w
    }

    /// Book at tick 10, then tick forward; returns (tick, request) pairs.
    fn run(m: &mut Laboratory, w: &WorldState, agent: AgentId, enabled_after_booking: bool) -> Vec<(u64, Request)> {
        let mut rng = SimRng::new(9);
        deliver(m, w, &clock_at(10), &mut rng, true, Notification::TestBooked { agent });
        let mut out = Vec::new();
        for t in 11..80 {
            for r in deliver(m, w, &clock_at(t), &mut rng, enabled_after_booking, tick(t)) {
                out.push((t, r));
            }
        }
        out
    }

    #[test]
    fn symptomatic_detectable_agent_tests_positive() {
        let w = infected_world();
        let mut m = lab(0.0, 0.0);
        let out = run(&mut m, &w, AgentId(0), true);
        // sampled at 10 + 6, reported 12 ticks later
        assert_eq!(out, vec![(28, Request::TestResult { agent: AgentId(0), positive: true })]);
        assert_eq!(m.in_progress(), 0);
    }

    #[test]
    fn healthy_agent_uses_slow_slot_and_tests_negative() {
        let w = infected_world();
        let mut m = lab(0.0, 0.0);
        let out = run(&mut m, &w, AgentId(1), true);
        assert_eq!(out, vec![(46, Request::TestResult { agent: AgentId(1), positive: false })]);
    }

    #[test]
    fn certain_false_negative() {
        let w = infected_world();
        let mut m = lab(0.0, 1.0);
        let out = run(&mut m, &w, AgentId(0), true);
        assert_eq!(out[0].1, Request::TestResult { agent: AgentId(0), positive: false });
    }

    #[test]
    fn disabled_laboratory_refuses_bookings() {
        let w = infected_world();
        let mut m = lab(0.0, 0.0);
        let mut rng = SimRng::new(9);
        deliver(&mut m, &w, &clock_at(10), &mut rng, false, Notification::TestBooked { agent: AgentId(0) });
        assert_eq!(m.in_progress(), 0);
    }

    #[test]
    fn tests_under_way_complete_after_disable() {
        let w = infected_world();
        let mut m = lab(0.0, 0.0);
        let out = run(&mut m, &w, AgentId(0), false);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn duplicate_booking_ignored() {
        let w = infected_world();
        let mut m = lab(0.0, 0.0);
        let mut rng = SimRng::new(9);
        deliver(&mut m, &w, &clock_at(10), &mut rng, true, Notification::TestBooked { agent: AgentId(0) });
        deliver(&mut m, &w, &clock_at(11), &mut rng, true, Notification::TestBooked { agent: AgentId(0) });
        assert_eq!(m.in_progress(), 1);
    }
}

#[cfg(test)]
mod quarantine {
    use ep_bus::{ModuleKind, Notification, Request};
    use ep_core::{AgentId, LocationId, SimRng, Tick};
    use ep_world::{FieldValue, WorldState};

    use super::fixtures::*;
    use crate::{Quarantine, QuarantineConfig};

    fn config() -> QuarantineConfig {
        QuarantineConfig {
            default_duration_days: 2.0,
            early_release_days:    0.5,
            home_activity:         "house".into(),
            exempt_location_types: vec!["hospital".into()],
            release_when_disabled: true,
        }
    }

    fn quarantined(w: &mut WorldState, agent: AgentId) {
        w.apply(Tick(0), agent, FieldValue::Quarantine(true)).unwrap();
    }

    #[test]
    fn unknown_home_activity_rejected() {
        let mut cfg = config();
        cfg.home_activity = "bunker".into();
        assert!(Quarantine::new(cfg, &world(1)).is_err());
    }

    #[test]
    fn positive_result_requests_start() {
        let w = world(2);
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        let reqs = deliver(&mut m, &w, &clock_at(5), &mut rng, true, Notification::TestResult {
            agent:    AgentId(1),
            positive: true,
        });
        assert_eq!(reqs, vec![Request::StartQuarantine { agent: AgentId(1) }]);
    }

    #[test]
    fn positive_result_ignored_while_disabled() {
        let w = world(1);
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        let msg = Notification::TestResult { agent: AgentId(0), positive: true };
        assert!(deliver(&mut m, &w, &clock_at(5), &mut rng, false, msg).is_empty());
    }

    #[test]
    fn quarantined_agent_is_sent_home_each_tick() {
        let mut w = world(2);
        quarantined(&mut w, AgentId(1));
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        assert!(deliver(&mut m, &w, &clock_at(5), &mut rng, true, tick(5)).is_empty());
        let reqs = review(&mut m, &w, &clock_at(5), &mut rng, true, &[]);
        assert_eq!(reqs, vec![
            Request::Activity { agent: AgentId(1), to: HOUSE },
            Request::Location { agent: AgentId(1), to: LocationId(1) },
        ]);
    }

    #[test]
    fn move_to_ordinary_location_is_overridden() {
        let mut w = world(1);
        quarantined(&mut w, AgentId(0));
        w.apply(Tick(0), AgentId(0), FieldValue::Activity(HOUSE)).unwrap();
        w.apply(Tick(0), AgentId(0), FieldValue::Location(LocationId(0))).unwrap();
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        let queued = collected(ModuleKind::Behavior, &[
            Request::Activity { agent: AgentId(0), to: WORK },
            Request::Location { agent: AgentId(0), to: LocationId(1) },
        ]);
        let reqs = review(&mut m, &w, &clock_at(5), &mut rng, true, &queued);
        assert_eq!(reqs, vec![
            Request::Activity { agent: AgentId(0), to: HOUSE },
            Request::Location { agent: AgentId(0), to: LocationId(0) },
        ]);
    }

    #[test]
    fn agent_at_home_may_head_to_exempt_location() {
        let mut w = world(1);
        quarantined(&mut w, AgentId(0));
        w.apply(Tick(0), AgentId(0), FieldValue::Activity(HOUSE)).unwrap();
        w.apply(Tick(0), AgentId(0), FieldValue::Location(LocationId(0))).unwrap();
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        let queued = collected(ModuleKind::Behavior, &[
            Request::Activity { agent: AgentId(0), to: WORK },
            Request::Location { agent: AgentId(0), to: LocationId(2) },
        ]);
        assert!(review(&mut m, &w, &clock_at(5), &mut rng, true, &queued).is_empty());
    }

    #[test]
    fn exempt_location_type_is_left_alone() {
        let mut w = world(1);
        quarantined(&mut w, AgentId(0));
        w.apply(Tick(0), AgentId(0), FieldValue::Location(LocationId(2))).unwrap();
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        assert!(review(&mut m, &w, &clock_at(5), &mut rng, true, &[]).is_empty());
    }

    #[test]
    fn leaving_exempt_location_is_pulled_home() {
        let mut w = world(1);
        quarantined(&mut w, AgentId(0));
        w.apply(Tick(0), AgentId(0), FieldValue::Location(LocationId(2))).unwrap();
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        let queued = collected(ModuleKind::Behavior, &[Request::Location { agent: AgentId(0), to: LocationId(1) }]);
        let reqs = review(&mut m, &w, &clock_at(5), &mut rng, true, &queued);
        assert!(reqs.contains(&Request::Location { agent: AgentId(0), to: LocationId(0) }));
    }

    #[test]
    fn another_intervention_moving_the_agent_wins() {
        let mut w = world(1);
        quarantined(&mut w, AgentId(0));
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        let queued = collected(ModuleKind::Intervention, &[Request::Location { agent: AgentId(0), to: LocationId(1) }]);
        assert!(review(&mut m, &w, &clock_at(5), &mut rng, true, &queued).is_empty());
    }

    #[test]
    fn disabled_policy_releases_hold_when_configured() {
        let mut w = world(1);
        quarantined(&mut w, AgentId(0));
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        assert!(review(&mut m, &w, &clock_at(5), &mut rng, false, &[]).is_empty());
    }

    #[test]
    fn default_duration_release() {
        let mut w = world(1);
        quarantined(&mut w, AgentId(0));
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(10), &mut rng, true, Notification::QuarantineStarted { agent: AgentId(0) });
        assert_eq!(m.isolated(), 1);
        let stops = |reqs: Vec<Request>| reqs.into_iter().filter(|r| matches!(r, Request::StopQuarantine { .. })).count();
        assert_eq!(stops(deliver(&mut m, &w, &clock_at(57), &mut rng, true, tick(57))), 0);
        assert_eq!(stops(deliver(&mut m, &w, &clock_at(58), &mut rng, true, tick(58))), 1);
    }

    #[test]
    fn negative_result_releases_early_once() {
        let mut w = world(1);
        quarantined(&mut w, AgentId(0));
        let mut m = Quarantine::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(10), &mut rng, true, Notification::QuarantineStarted { agent: AgentId(0) });
        deliver(&mut m, &w, &clock_at(12), &mut rng, true, Notification::TestResult {
            agent:    AgentId(0),
            positive: false,
        });
        let reqs = deliver(&mut m, &w, &clock_at(24), &mut rng, true, tick(24));
        assert!(reqs.contains(&Request::StopQuarantine { agent: AgentId(0) }));

        deliver(&mut m, &w, &clock_at(25), &mut rng, true, Notification::QuarantineStopped { agent: AgentId(0) });
        assert_eq!(m.isolated(), 0);
        assert_eq!(m.pending_releases(), 0);
        let later = deliver(&mut m, &w, &clock_at(58), &mut rng, true, tick(58));
        assert!(!later.contains(&Request::StopQuarantine { agent: AgentId(0) }));
    }
}

#[cfg(test)]
mod restrictions {
    use ep_bus::{ModuleKind, Notification, Request};
    use ep_core::{AgentId, LocationId, SimRng};

    use super::fixtures::*;
    use crate::{
        Curfew, CurfewConfig, InterventionParams, LocationClosure, LocationClosureConfig, WorkFromHome,
        WorkFromHomeConfig,
    };

    fn closure(types: &[&str]) -> LocationClosureConfig {
        LocationClosureConfig {
            location_types: types.iter().map(|t| t.to_string()).collect(),
            home_activity:  "house".into(),
        }
    }

    fn curfew(start: u32, end: u32) -> CurfewConfig {
        CurfewConfig {
            start_hour:     start,
            end_hour:       end,
            location_types: vec!["work".into()],
            home_activity:  "house".into(),
        }
    }

    fn to_work(kind: ModuleKind, agent: u32, n: u32) -> Vec<ep_bus::Envelope> {
        collected(kind, &[
            Request::Activity { agent: AgentId(agent), to: WORK },
            Request::Location { agent: AgentId(agent), to: LocationId(n) },
        ])
    }

    #[test]
    fn params_parse_restrictions() {
        let p = InterventionParams::from_json_str(
            r#"{ "curfew": { "start_hour": 21, "end_hour": 5, "location_types": ["work"], "home_activity": "house" },
                 "location_closure": { "location_types": ["work"], "home_activity": "house" } }"#,
        )
        .unwrap();
        assert_eq!(p.curfew.unwrap().start_hour, 21);
        assert!(p.location_closure.is_some());
        assert!(p.work_from_home.is_none());
    }

    #[test]
    fn closed_location_sends_agent_home() {
        let w = world(2);
        let mut m = LocationClosure::new(closure(&["work"]), &w).unwrap();
        let mut rng = SimRng::new(1);
        let mut queued = to_work(ModuleKind::Behavior, 0, 2);
        queued.extend(collected(ModuleKind::Behavior, &[Request::Location { agent: AgentId(1), to: LocationId(3) }]));
        let reqs = review(&mut m, &w, &clock_at(5), &mut rng, true, &queued);
        assert_eq!(reqs, vec![
            Request::Activity { agent: AgentId(0), to: HOUSE },
            Request::Location { agent: AgentId(0), to: LocationId(0) },
        ]);
    }

    #[test]
    fn closure_leaves_intervention_moves_alone() {
        let w = world(1);
        let mut m = LocationClosure::new(closure(&["work"]), &w).unwrap();
        let mut rng = SimRng::new(1);
        let queued = to_work(ModuleKind::Intervention, 0, 1);
        assert!(review(&mut m, &w, &clock_at(5), &mut rng, true, &queued).is_empty());
    }

    #[test]
    fn going_home_is_never_refused() {
        let w = world(1);
        let mut m = LocationClosure::new(closure(&["house"]), &w).unwrap();
        let mut rng = SimRng::new(1);
        let queued = collected(ModuleKind::Behavior, &[Request::Location { agent: AgentId(0), to: LocationId(0) }]);
        assert!(review(&mut m, &w, &clock_at(5), &mut rng, true, &queued).is_empty());
    }

    #[test]
    fn disabled_closure_refuses_nothing() {
        let w = world(1);
        let mut m = LocationClosure::new(closure(&["work"]), &w).unwrap();
        let mut rng = SimRng::new(1);
        assert!(review(&mut m, &w, &clock_at(5), &mut rng, false, &to_work(ModuleKind::Behavior, 0, 1)).is_empty());
    }

    #[test]
    fn closure_needs_location_types() {
        assert!(LocationClosure::new(closure(&[]), &world(1)).is_err());
        assert!(LocationClosure::new(closure(&["stadium"]), &world(1)).is_err());
    }

    #[test]
    fn curfew_window_wraps_midnight() {
        let m = Curfew::new(curfew(21, 5), &world(1)).unwrap();
        assert!(m.in_force(21));
        assert!(m.in_force(23));
        assert!(m.in_force(0));
        assert!(m.in_force(4));
        assert!(!m.in_force(5));
        assert!(!m.in_force(12));

        let day = Curfew::new(curfew(9, 17), &world(1)).unwrap();
        assert!(day.in_force(9));
        assert!(!day.in_force(17));
        assert!(!day.in_force(3));
    }

    #[test]
    fn curfew_only_refuses_inside_window() {
        let w = world(1);
        let mut m = Curfew::new(curfew(21, 5), &w).unwrap();
        let mut rng = SimRng::new(1);
        let queued = to_work(ModuleKind::Behavior, 0, 1);
        // hourly clock from Monday midnight: tick t is hour t % 24
        assert_eq!(review(&mut m, &w, &clock_at(26), &mut rng, true, &queued).len(), 2);
        assert!(review(&mut m, &w, &clock_at(36), &mut rng, true, &queued).is_empty());
    }

    #[test]
    fn curfew_hours_validated() {
        assert!(Curfew::new(curfew(8, 8), &world(1)).is_err());
        assert!(Curfew::new(curfew(24, 5), &world(1)).is_err());
    }

    fn wfh(p: f64) -> WorkFromHomeConfig {
        WorkFromHomeConfig {
            probability:    p,
            work_activity:  "work".into(),
            location_types: vec!["work".into()],
            home_activity:  "house".into(),
        }
    }

    #[test]
    fn home_workers_redirected_from_workplace_only() {
        let w = world(2);
        let mut m = WorkFromHome::new(wfh(1.0), &w).unwrap();
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(0), &mut rng, true, Notification::StartSimulation);
        assert_eq!(m.staying_home(), 2);

        let reqs = review(&mut m, &w, &clock_at(5), &mut rng, true, &to_work(ModuleKind::Behavior, 1, 2));
        assert_eq!(reqs, vec![
            Request::Activity { agent: AgentId(1), to: HOUSE },
            Request::Location { agent: AgentId(1), to: LocationId(1) },
        ]);

        let hospital = collected(ModuleKind::Behavior, &[Request::Location { agent: AgentId(1), to: LocationId(3) }]);
        assert!(review(&mut m, &w, &clock_at(5), &mut rng, true, &hospital).is_empty());
    }

    #[test]
    fn zero_probability_keeps_everyone_at_work() {
        let w = world(3);
        let mut m = WorkFromHome::new(wfh(0.0), &w).unwrap();
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(24), &mut rng, true, midnight(24));
        assert_eq!(m.staying_home(), 0);
        assert!(review(&mut m, &w, &clock_at(25), &mut rng, true, &to_work(ModuleKind::Behavior, 0, 3)).is_empty());
    }

    #[test]
    fn uncovered_workplaces_are_unaffected() {
        let w = world(2);
        let mut cfg = wfh(1.0);
        cfg.location_types = vec!["hospital".into()];
        let mut m = WorkFromHome::new(cfg, &w).unwrap();
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(0), &mut rng, true, Notification::StartSimulation);
        assert_eq!(m.staying_home(), 0);
    }
}

#[cfg(test)]
mod hospitalisation {
    use ep_bus::{Module, ModuleError, Notification, Request};
    use ep_core::{AgentId, HealthId, LocationId, SimRng};

    use super::fixtures::*;
    use crate::{Hospitalisation, HospitalisationConfig};

    const S: HealthId = HealthId(0);
    const I: HealthId = HealthId(1);
    const R: HealthId = HealthId(2);
    const D: HealthId = HealthId(3);

    fn config() -> HospitalisationConfig {
        HospitalisationConfig {
            hospital_states:        vec!["I".into()],
            hospital_activity:      "work".into(),
            hospital_location_type: "hospital".into(),
            home_activity:          "house".into(),
        }
    }

    fn health(agent: u32, from: HealthId, to: HealthId) -> Notification {
        Notification::Health { agent: AgentId(agent), from, to }
    }

    #[test]
    fn onset_admits_and_holds_each_tick() {
        let w = world(1);
        let mut m = Hospitalisation::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        assert!(deliver(&mut m, &w, &clock_at(3), &mut rng, true, health(0, S, I)).is_empty());
        assert_eq!(m.ward_of(AgentId(0)), Some(LocationId(2)));
        for t in [4, 5] {
            assert_eq!(deliver(&mut m, &w, &clock_at(t), &mut rng, true, tick(t)), vec![
                Request::Activity { agent: AgentId(0), to: WORK },
                Request::Location { agent: AgentId(0), to: LocationId(2) },
            ]);
        }
    }

    #[test]
    fn recovery_discharges_home_once() {
        let w = world(1);
        let mut m = Hospitalisation::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(3), &mut rng, true, health(0, S, I));
        deliver(&mut m, &w, &clock_at(8), &mut rng, true, health(0, I, R));
        assert_eq!(m.admitted(), 0);
        assert_eq!(deliver(&mut m, &w, &clock_at(9), &mut rng, true, tick(9)), vec![
            Request::Activity { agent: AgentId(0), to: HOUSE },
            Request::Location { agent: AgentId(0), to: LocationId(0) },
        ]);
        assert!(deliver(&mut m, &w, &clock_at(10), &mut rng, true, tick(10)).is_empty());
    }

    #[test]
    fn death_ends_the_stay_silently() {
        let w = world(1);
        let mut m = Hospitalisation::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(3), &mut rng, true, health(0, S, I));
        deliver(&mut m, &w, &clock_at(8), &mut rng, true, health(0, I, D));
        assert_eq!(m.admitted(), 0);
        assert!(deliver(&mut m, &w, &clock_at(9), &mut rng, true, tick(9)).is_empty());
    }

    #[test]
    fn disabled_policy_admits_nobody_but_keeps_patients() {
        let w = world(2);
        let mut m = Hospitalisation::new(config(), &w).unwrap();
        let mut rng = SimRng::new(1);
        deliver(&mut m, &w, &clock_at(3), &mut rng, true, health(0, S, I));
        deliver(&mut m, &w, &clock_at(4), &mut rng, false, health(1, S, I));
        assert_eq!(m.admitted(), 1);
        assert_eq!(deliver(&mut m, &w, &clock_at(5), &mut rng, false, tick(5)).len(), 2);
    }

    #[test]
    fn agents_without_a_ward_fail_validation() {
        let w = world(1);
        assert!(Hospitalisation::new(config(), &w).unwrap().validate(&w).is_ok());
        let mut cfg = config();
        cfg.hospital_activity = "house".into();
        let m = Hospitalisation::new(cfg, &w).unwrap();
        assert!(matches!(m.validate(&w), Err(ModuleError::Config(_))));
    }
}
