use std::sync::Arc;

use chrono::NaiveDate;

use agroclim_climate::{Acd, InMemorySource, ScenarioSpec, Simulation, Station};
use agroclim_common::LatLng;

fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

fn build_sim(coord: LatLng, values: (NaiveDate, NaiveDate, f64)) -> Simulation {
    let (from, to, value) = values;
    let mut source = InMemorySource::new((1990, 2020));
    source.fill_constant(&coord, Acd::Tmin, from, to, value);
    let station = Station::new(1, "Test", "t1", coord, 10.0);
    Simulation::build(
        "test-sim",
        "Test Simulation",
        vec![station],
        vec![ScenarioSpec { id: "s1".into(), name: "Scenario1".into(), realizations: vec![("r1".into(), "Real1".into())] }],
        Arc::new(source),
        None,
        None,
    )
}

/// S3 end-to-end: two overlapping `data_accessor_for` calls through the public
/// `Simulation`/`RealizationRef` API only extend the realization's cache by the
/// non-overlapping remainder, and both accessors see the full requested range.
#[test]
fn overlapping_requests_through_public_api_share_one_minimal_cache() {
    let coord = LatLng::new(48.0, 11.0);
    let sim = build_sim(coord, (d(2000, 1, 1), d(2000, 12, 31), 3.0));
    let real = sim.scenarios()[0].realizations()[0];

    let first = real.data_accessor_for(&[Acd::Tmin], &coord, d(2000, 3, 1), d(2000, 3, 31));
    assert_eq!(first.get(Acd::Tmin).unwrap().len(), 31);

    let second = real.data_accessor_for(&[Acd::Tmin], &coord, d(2000, 3, 15), d(2000, 4, 15));
    assert_eq!(second.get(Acd::Tmin).unwrap().len(), 32);
    assert!(second.get(Acd::Tmin).unwrap().iter().all(|&v| v == 3.0));
}

/// closest-station resolution (§4.2) plumbed end-to-end: a request at a coordinate
/// near, but not equal to, the only station still resolves through to its data.
#[test]
fn nearest_station_resolution_feeds_the_realization_cache() {
    let station_coord = LatLng::new(50.0, 8.0);
    let sim = build_sim(station_coord, (d(1995, 1, 1), d(1995, 1, 31), 7.5));
    let real = sim.scenarios()[0].realizations()[0];

    let nearby = LatLng::new(50.01, 8.01);
    let da = real.data_accessor_for(&[Acd::Tmin], &nearby, d(1995, 1, 10), d(1995, 1, 20));
    assert_eq!(da.get(Acd::Tmin).unwrap().len(), 11);
    assert!(da.get(Acd::Tmin).unwrap().iter().all(|&v| v == 7.5));
}
