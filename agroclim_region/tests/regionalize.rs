use std::sync::Arc;

use chrono::NaiveDate;

use agroclim_climate::{Acd, InMemorySource, ScenarioSpec, Simulation, Station};
use agroclim_common::{CoordSystem, LatLng, RcPoint};
use agroclim_raster::Grid;
use agroclim_region::{CacheInfo, Env, Projector};

fn projector() -> Projector {
    Arc::new(|ll: &LatLng| RcPoint::new(ll.lng * 100_000.0, ll.lat * 100_000.0, CoordSystem::Utm32N))
}

fn filled_dem(rows: usize, cols: usize, cell: f64, xll: f64, yll: f64, value: f64) -> Grid {
    let mut g = Grid::new(rows, cols, cell, xll, yll, -9999.0, CoordSystem::Utm32N);
    for r in 0..rows {
        for c in 0..cols {
            g.set(r, c, value);
        }
    }
    g
}

fn reducer() -> agroclim_region::Reducer {
    Arc::new(|da: &agroclim_climate::DataAccessor| {
        let tavg = da.get(Acd::Tavg).cloned().unwrap_or_default();
        let avg = if tavg.is_empty() { 0.0 } else { tavg.iter().sum::<f64>() / tavg.len() as f64 };
        let mut m = std::collections::BTreeMap::new();
        m.insert(0, avg);
        m
    })
}

fn sim_with_stations(stations: Vec<(Station, f64)>) -> Simulation {
    let mut source = InMemorySource::new((1990, 2010));
    let from = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2010, 12, 31).unwrap();
    let mut station_list = Vec::new();
    for (st, value) in stations {
        source.fill_constant(&st.lat_lng, Acd::Tavg, from, to, value);
        station_list.push(st);
    }
    Simulation::build(
        "test-sim",
        "Test Simulation",
        station_list,
        vec![ScenarioSpec { id: "s1".into(), name: "Scenario1".into(), realizations: vec![("r1".into(), "Real1".into())] }],
        Arc::new(source),
        None,
        None,
    )
}

/// S2: two stations straddling the DEM produce a distance-weighted blend where the
/// *closer* station dominates — station A (value 5) at lng 9.0, station B (value 15)
/// at lng 9.01, 1000m apart once projected. A row of three DEM cells sits exactly on
/// A, the midpoint, and B, and must read back 5, 10, 15 (testable property 8).
#[test]
fn two_station_regionalization_blends_by_distance() {
    let a = Station::new(1, "A", "a", LatLng::new(50.0, 9.0), 100.0);
    let b = Station::new(2, "B", "b", LatLng::new(50.0, 9.01), 100.0);
    let sim = sim_with_stations(vec![(a, 5.0), (b, 15.0)]);
    let real = sim.scenarios()[0].realizations()[0];

    // a_x = 9.0*100_000 = 900_000; b_x = 9.01*100_000 = 901_000, 1000m apart.
    // cell centers at col+0.5 land on a_x, the midpoint, and b_x respectively.
    let dem = filled_dem(1, 3, 500.0, 899_750.0, 4_999_750.0, 50.0);
    let mut env = Env::new(dem, vec![Acd::Tavg], 2000, 2000, vec![real], 10, reducer(), projector());
    env.cache_info = CacheInfo { persist: false, result_ids: vec![0], ..CacheInfo::default() };

    let results = agroclim_region::regionalize(&env);
    let grid = &results[&0][&2000][0];
    assert!((grid.get(0, 0) - 5.0).abs() < 1e-6, "at station A, value should be A's own value: {}", grid.get(0, 0));
    assert!((grid.get(0, 1) - 10.0).abs() < 1e-6, "at the midpoint, value should be the plain average: {}", grid.get(0, 1));
    assert!((grid.get(0, 2) - 15.0).abs() < 1e-6, "at station B, value should be B's own value: {}", grid.get(0, 2));
}

/// S5: a second call with a DEM strictly contained in a previously-regionalized
/// extent is served from the in-memory cache via sub-grid clone, without needing a
/// station anywhere near the smaller DEM's nominal extent.
#[test]
fn sub_region_query_reuses_cached_extent() {
    let st = Station::new(3, "Mid", "m", LatLng::new(50.0, 10.0), 100.0);
    let sim = sim_with_stations(vec![(st, 15.0)]);
    let real = sim.scenarios()[0].realizations()[0];

    let big = filled_dem(4, 4, 1000.0, 996_000.0, 4_996_000.0, 50.0);
    let mut env = Env::new(big, vec![Acd::Tavg], 2001, 2001, vec![real], 11, reducer(), projector());
    env.cache_info = CacheInfo { persist: false, result_ids: vec![0], ..CacheInfo::default() };
    let first = agroclim_region::regionalize(&env);
    assert_eq!(first[&0][&2001][0].get(0, 0), 15.0);

    // a 2x2 sub-rectangle of the same extent, far from any real station coverage;
    // this must be served by sub-grid clone, not a fresh (empty) computation.
    let small = filled_dem(2, 2, 1000.0, 996_000.0, 4_998_000.0, 50.0);
    env.dem = small;
    let second = agroclim_region::regionalize(&env);
    assert_eq!(second[&0][&2001][0].rows, 2);
    assert_eq!(second[&0][&2001][0].get(0, 0), 15.0);
}
