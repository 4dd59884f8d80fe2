//! Synthetic town: households, workplaces, schools and leisure venues, plus
//! a weekly activity rhythm for adults and children.

use ep_behavior::{BehaviorResult, TransitionMatrices, TransitionMatricesBuilder};
use ep_core::{ActivityId, AgeClassId, Labels, LocationId, LocationTypeId, SimRng};
use ep_world::{AgentSpec, Coord, HealthModel, WorldBuilder, WorldResult, WorldState};

pub const HOUSE:   ActivityId = ActivityId(0);
pub const WORK:    ActivityId = ActivityId(1);
pub const SCHOOL:  ActivityId = ActivityId(2);
pub const LEISURE: ActivityId = ActivityId(3);

const ADULT: AgeClassId = AgeClassId(0);
const CHILD: AgeClassId = AgeClassId(1);

/// Six-hour behaviour buckets: 28 per week, Monday 00:00 first.
pub const BUCKET_SECS: u32 = 6 * 3_600;

pub struct TownSize {
    pub households: usize,
    pub workplaces: usize,
    pub schools:    usize,
    pub venues:     usize,
}

/// Build the town.  Every household holds two adults and one child.
pub fn build_town(size: &TownSize, health: HealthModel, rng: &mut SimRng) -> WorldResult<WorldState> {
    let mut b = WorldBuilder::new(
        Labels::new("activity", ["house", "work", "school", "leisure"])?,
        Labels::new("location type", ["house", "work", "school", "leisure"])?,
        Labels::new("age class", ["adult", "child"])?,
        health,
    );

    let houses = add(&mut b, 0, size.households, Some(3));
    let workplaces = add(&mut b, 1, size.workplaces, Some(40));
    let schools = add(&mut b, 2, size.schools, Some(200));
    let venues = add(&mut b, 3, size.venues, Some(60));

    for &home in &houses {
        for age_class in [ADULT, ADULT, CHILD] {
            let (daytime, places) = if age_class == ADULT { (WORK, &workplaces) } else { (SCHOOL, &schools) };
            let mut spec = AgentSpec::new(age_class, HOUSE, home).permit(HOUSE, [home]);
            if let Some(&place) = rng.choose(places) {
                spec = spec.permit(daytime, [place]);
            }
            let picks = rng.sample_indices(venues.len(), 2);
            spec = spec.permit(LEISURE, picks.into_iter().map(|i| venues[i]));
            b.add_agent(spec);
        }
    }

    b.build()
}

fn add(b: &mut WorldBuilder, kind: u16, n: usize, capacity: Option<u32>) -> Vec<LocationId> {
    (0..n)
        .map(|i| b.add_location(LocationTypeId(kind), Coord::new(i as f64, kind as f64), capacity))
        .collect()
}

// Rows and columns follow the activity order: house, work, school, leisure.
// Schools are never entered by adults; the school row only leads home.
const NIGHT: [[f64; 4]; 4] = [
    [0.97, 0.00, 0.00, 0.03],
    [0.60, 0.40, 0.00, 0.00],
    [1.00, 0.00, 0.00, 0.00],
    [0.70, 0.00, 0.00, 0.30],
];

const WEEKDAY: [[f64; 4]; 4] = [
    [0.60, 0.35, 0.00, 0.05],
    [0.05, 0.93, 0.00, 0.02],
    [1.00, 0.00, 0.00, 0.00],
    [0.30, 0.20, 0.00, 0.50],
];

const WEEKEND: [[f64; 4]; 4] = [
    [0.85, 0.00, 0.00, 0.15],
    [0.70, 0.30, 0.00, 0.00],
    [1.00, 0.00, 0.00, 0.00],
    [0.40, 0.00, 0.00, 0.60],
];

/// The adult matrix with work and school exchanged.
fn for_children(m: &[[f64; 4]; 4]) -> Vec<Vec<f64>> {
    let swap = |i: usize| match i {
        1 => 2,
        2 => 1,
        i => i,
    };
    (0..4).map(|r| (0..4).map(|c| m[swap(r)][swap(c)]).collect()).collect()
}

fn rows(m: &[[f64; 4]; 4]) -> Vec<Vec<f64>> {
    m.iter().map(|r| r.to_vec()).collect()
}

pub fn weekly_matrices() -> BehaviorResult<TransitionMatrices> {
    let mut b = TransitionMatricesBuilder::new(4, 2, BUCKET_SECS)?;
    for bucket in 0..b.bucket_count() {
        let (day, quarter) = (bucket / 4, bucket % 4);
        let m = match (day, quarter) {
            (_, 0 | 3) => &NIGHT,
            (0..=4, _) => &WEEKDAY,
            _ => &WEEKEND,
        };
        b.set(ADULT, bucket, rows(m))?;
        b.set(CHILD, bucket, for_children(m))?;
    }
    b.build()
}
