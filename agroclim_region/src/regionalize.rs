/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! the regionalization core (§4.4): elevation-regression + inverse-distance-weighted
//! residual interpolation of per-station yearly reductions onto a DEM grid, with a
//! two-level (in-memory, then on-disk) result cache consulted before anything is
//! computed.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;

use agroclim_climate::RealizationRef;
use agroclim_raster::Grid;

use crate::env::{Env, ResultId};
use crate::memcache::{DemExtentKey, GLOBAL_MEM_CACHE};
use crate::stations::filter_climate_stations;
use crate::{diskcache, errors::RegionError};

/// `ResultId -> Year -> Grid[]` (one grid per realization contributing a value for
/// that year; §3 `Results`).
pub type Results = BTreeMap<ResultId, BTreeMap<i32, Vec<Arc<Grid>>>>;

/// `ResultId -> Year -> Grid` (realization-averaged; §3 `AvgRealizationsResults`).
pub type AvgResults = BTreeMap<ResultId, BTreeMap<i32, Grid>>;

struct StationSample {
    rc: agroclim_common::RcPoint,
    elevation: f64,
    values: Vec<f64>,
}

struct RegressionResult {
    m: Vec<f64>,
    n: Vec<f64>,
}

/// vectorized linear regression of each result dimension's values on station
/// elevation, grounded verbatim in the original's `regression()` (moment-based slope
/// and intercept per dimension, one pass over the station set).
fn regression(samples: &[StationSample]) -> RegressionResult {
    let dims = samples[0].values.len();
    let n = samples.len() as f64;

    let elev_mean = samples.iter().map(|s| s.elevation).sum::<f64>() / n;
    let mut values_mean = vec![0.0; dims];
    for s in samples {
        for k in 0..dims { values_mean[k] += s.values[k]; }
    }
    for v in values_mean.iter_mut() { *v /= n; }

    let mut var_elev = 0.0;
    let mut var_elev_values = vec![0.0; dims];
    for s in samples {
        let ed = s.elevation - elev_mean;
        var_elev += ed * ed;
        for k in 0..dims { var_elev_values[k] += (s.values[k] - values_mean[k]) * ed; }
    }

    let m: Vec<f64> = var_elev_values.iter().map(|v| v / var_elev).collect();
    let n_coef: Vec<f64> = (0..dims).map(|k| values_mean[k] - m[k] * elev_mean).collect();
    RegressionResult { m, n: n_coef }
}

/// `regionalize(env) -> Results` (§3, §4.4). Consults the in-memory cache, then the
/// persisted cache when `env.cache_info.persist`, before computing anything; any
/// years/realizations served from cache are dropped from the work set.
pub fn regionalize(env: &Env<'_>) -> Results {
    let mut res: Results = BTreeMap::new();

    if env.realizations.is_empty() {
        return res;
    }

    let scen = env.realizations[0].scenario();
    let sim = scen.simulation();
    let ext = DemExtentKey::of(&env.dem);
    let mut acd_ids: Vec<i32> = env.acds.iter().map(|a| a.id()).collect();
    acd_ids.sort_unstable();
    acd_ids.dedup();

    let years: Vec<i32> = (env.from_year..=env.to_year).collect();

    // realization -> years still needing computation
    let mut pending: Vec<(RealizationRef<'_>, Vec<i32>)> = env.realizations.iter()
        .map(|r| (*r, years.clone()))
        .collect();

    for (real, remaining) in pending.iter_mut() {
        remaining.retain(|&year| {
            let mut found_any = false;
            for &rid in &env.cache_info.result_ids {
                if let Some(g) = GLOBAL_MEM_CACHE.get(&env.dem, &sim.id, scen.id(), real.id(), &acd_ids, env.reducer_id, rid, year) {
                    res.entry(rid).or_default().entry(year).or_default().push(g);
                    found_any = true;
                }
            }
            !found_any
        });
    }
    pending.retain(|(_, years)| !years.is_empty());
    if pending.is_empty() {
        return res;
    }

    if env.cache_info.persist {
        for (real, remaining) in pending.iter_mut() {
            remaining.retain(|&year| {
                let mut found_any = false;
                for &rid in &env.cache_info.result_ids {
                    if let Some(g) = diskcache::load(&env.cache_info.root_path, &ext, &sim.id, scen.id(), real.id(), &acd_ids, &env.cache_info.reducer_label, rid, year, &sim.name) {
                        let g = Arc::new(g);
                        GLOBAL_MEM_CACHE.put(&env.dem, &sim.id, scen.id(), real.id(), acd_ids.clone(), env.reducer_id, rid, year, g.clone());
                        res.entry(rid).or_default().entry(year).or_default().push(g);
                        found_any = true;
                    }
                }
                !found_any
            });
        }
        pending.retain(|(_, years)| !years.is_empty());
        if pending.is_empty() {
            return res;
        }
    }

    let station_ids = filter_climate_stations(sim, &env.dem, env.border_km, &env.project);
    if station_ids.is_empty() {
        tracing::warn!(sim = %sim.id, "no climate stations selected for this region");
        return res;
    }
    let stations: Vec<&agroclim_climate::Station> = sim.stations().iter()
        .filter(|s| station_ids.contains(&s.id))
        .collect();

    for (real, remaining) in pending {
        let mut year_samples: BTreeMap<i32, Vec<StationSample>> = BTreeMap::new();

        for station in &stations {
            let Some(from) = NaiveDate::from_ymd_opt(env.from_year, 1, 1) else { continue };
            let Some(to) = NaiveDate::from_ymd_opt(env.to_year, 12, 31) else { continue };
            let da = real.data_accessor_for(&env.acds, &station.lat_lng, from, to);
            if da.is_empty() { continue; }

            for &year in &remaining {
                let yda = da.sub_year(year, env.year_slice);
                if yda.is_empty() { continue; }
                let vals = (env.reducer)(&yda);
                let values: Vec<f64> = vals.values().copied().collect();
                year_samples.entry(year).or_default().push(StationSample {
                    rc: (env.project)(&station.lat_lng),
                    elevation: station.elevation,
                    values,
                });
            }
        }

        let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0);

        for (year, samples) in year_samples {
            if samples.is_empty() { continue; }
            let mut grids: Vec<Grid> = (0..samples[0].values.len())
                .map(|_| Grid::new(env.dem.rows, env.dem.cols, env.dem.cell_size, env.dem.xll_corner, env.dem.yll_corner, env.dem.no_data, env.dem.cs))
                .collect();

            let more_than_two = samples.len() > 2;
            let rr = if more_than_two { Some(regression(&samples)) } else { None };
            let residua: Vec<Vec<f64>> = if let Some(rr) = &rr {
                samples.iter().map(|s| {
                    (0..s.values.len()).map(|k| s.values[k] - (rr.m[k] * s.elevation + rr.n[k])).collect()
                }).collect()
            } else {
                Vec::new()
            };

            for row in 0..env.dem.rows {
                for col in 0..env.dem.cols {
                    if env.dem.is_no_data(row, col) { continue; }
                    let (r, h) = env.dem.cell_center(row, col);
                    let cell = agroclim_common::RcPoint::new(r, h, env.dem.cs);
                    let dem_val = env.dem.get(row, col);

                    if more_than_two {
                        let rr = rr.as_ref().unwrap();
                        let dims = samples[0].values.len();
                        let mut sum = 0.0;
                        let mut sumz = vec![0.0; dims];
                        for (s, res_s) in samples.iter().zip(&residua) {
                            let dist = s.rc.planar_distance(&cell);
                            if dist > 1.0 {
                                let w = 1.0 / (dist * dist);
                                sum += w;
                                for k in 0..dims { sumz[k] += res_s[k] * w; }
                            }
                        }
                        if sum == 0.0 {
                            // every station within 1m of the cell: leave the grid at
                            // its initialized no-data value rather than fabricating a
                            // residual from zero nearby weight (§4.4 step 2).
                            continue;
                        }
                        for k in 0..dims {
                            let v = dem_val * rr.m[k] + rr.n[k] + sumz[k] / sum;
                            grids[k].set(row, col, v);
                        }
                    } else if samples.len() == 2 {
                        let f = &samples[0];
                        let s = &samples[1];
                        let df = f.rc.planar_distance(&cell);
                        let ds = s.rc.planar_distance(&cell);
                        let denom = df + ds;
                        for k in 0..f.values.len() {
                            let v = if denom > 0.0 {
                                (ds / denom) * f.values[k] + (df / denom) * s.values[k]
                            } else {
                                f.values[k]
                            };
                            grids[k].set(row, col, v);
                        }
                    } else {
                        let only = &samples[0];
                        for k in 0..only.values.len() {
                            grids[k].set(row, col, only.values[k]);
                        }
                    }
                }
            }

            for (k, grid) in grids.into_iter().enumerate() {
                let rid = *env.cache_info.result_ids.get(k).unwrap_or(&(k as i64));
                let g = Arc::new(grid);
                GLOBAL_MEM_CACHE.put(&env.dem, &sim.id, scen.id(), real.id(), acd_ids.clone(), env.reducer_id, rid, year, g.clone());
                if env.cache_info.persist {
                    diskcache::store(&env.cache_info.root_path, &ext, &sim.id, scen.id(), real.id(), &acd_ids, &env.cache_info.reducer_label, rid, year, &sim.name, &g, now);
                }
                res.entry(rid).or_default().entry(year).or_default().push(g);
            }
        }
    }

    res
}

/// `regionalizeAndAvgRealizations(env) -> AvgResults` (§3, §4.4): element-wise mean
/// across realizations per `(resultId, year)`, a cell is no-data in the average if it
/// is no-data in any contributing input.
pub fn regionalize_and_avg_realizations(env: &Env<'_>) -> AvgResults {
    let rs = regionalize(env);
    let mut out: AvgResults = BTreeMap::new();
    for (rid, by_year) in rs {
        for (year, grids) in by_year {
            if let Some(avg) = average_grids(&grids) {
                out.entry(rid).or_default().insert(year, avg);
            }
        }
    }
    out
}

fn average_grids(grids: &[Arc<Grid>]) -> Option<Grid> {
    let first = grids.first()?;
    let mut out = Grid::new(first.rows, first.cols, first.cell_size, first.xll_corner, first.yll_corner, first.no_data, first.cs);
    for row in 0..first.rows {
        for col in 0..first.cols {
            let mut any_no_data = false;
            let mut sum = 0.0;
            for g in grids {
                if g.is_no_data(row, col) { any_no_data = true; break; }
                sum += g.get(row, col);
            }
            out.set(row, col, if any_no_data { first.no_data } else { sum / grids.len() as f64 });
        }
    }
    Some(out)
}

/// resolves a `CacheInfo`'s root path against the shared cache directory when the
/// caller left it empty, matching `agroclim_build::cache_dir()`'s convention.
pub fn resolve_cache_root(cache_info: &crate::env::CacheInfo) -> Result<std::path::PathBuf, RegionError> {
    if cache_info.root_path.as_os_str().is_empty() {
        Ok(agroclim_build::cache_dir()?)
    } else {
        Ok(cache_info.root_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agroclim_common::{CoordSystem, LatLng};
    use agroclim_climate::{Acd, InMemorySource, Simulation, Station};
    use std::sync::Arc as StdArc;

    fn reducer() -> crate::env::Reducer {
        StdArc::new(|da: &agroclim_climate::DataAccessor| {
            let tavg = da.get(Acd::Tavg).cloned().unwrap_or_default();
            let avg = if tavg.is_empty() { 0.0 } else { tavg.iter().sum::<f64>() / tavg.len() as f64 };
            let mut m = BTreeMap::new();
            m.insert(0, avg);
            m
        })
    }

    fn projector() -> crate::env::Projector {
        StdArc::new(|ll: &LatLng| agroclim_common::RcPoint::new(ll.lng * 100_000.0, ll.lat * 100_000.0, CoordSystem::Utm32N))
    }

    fn with_result_ids(mut env: Env<'_>) -> Env<'_> {
        env.cache_info.result_ids = vec![0];
        env
    }

    fn filled_dem(rows: usize, cols: usize, cell: f64, xll: f64, yll: f64) -> Grid {
        let mut g = Grid::new(rows, cols, cell, xll, yll, -9999.0, CoordSystem::Utm32N);
        for r in 0..rows { for c in 0..cols { g.set(r, c, 50.0); } }
        g
    }

    fn build_sim(stations: Vec<Station>) -> Simulation {
        use chrono::NaiveDate;
        let mut source = InMemorySource::new((1990, 2010));
        for st in &stations {
            source.fill_constant(&st.lat_lng, Acd::Tavg, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(), NaiveDate::from_ymd_opt(2010, 12, 31).unwrap(), 10.0);
        }
        Simulation::build("t1", "Test1", stations, vec![agroclim_climate::ScenarioSpec {
            id: "s1".into(), name: "Scenario1".into(), realizations: vec![("r1".into(), "Real1".into())],
        }], StdArc::new(source), None, None)
    }

    #[test]
    fn single_station_uses_its_value_directly_s1() {
        let st = Station::new(1, "A", "a", LatLng::new(50.0, 10.0), 100.0);
        let sim = build_sim(vec![st]);
        let real = sim.scenarios()[0].realizations()[0];
        let dem = filled_dem(2, 2, 1000.0, 950_000.0, 4_950_000.0);
        let env = with_result_ids(Env::new(dem, vec![Acd::Tavg], 2000, 2000, vec![real], 0, reducer(), projector()));
        let results = regionalize(&env);
        let grid = &results[&0][&2000][0];
        assert_eq!(grid.get(0, 0), 10.0);
    }

    #[test]
    fn in_memory_cache_serves_repeat_call_without_recompute() {
        let st = Station::new(1, "A", "a", LatLng::new(50.0, 10.0), 100.0);
        let sim = build_sim(vec![st]);
        let real = sim.scenarios()[0].realizations()[0];
        let dem = filled_dem(2, 2, 1000.0, 950_000.0, 4_950_000.0);
        let env = with_result_ids(Env::new(dem, vec![Acd::Tavg], 2000, 2000, vec![real], 1, reducer(), projector()));
        let first = regionalize(&env);
        let second = regionalize(&env);
        assert_eq!(first[&0][&2000][0].get(0, 0), second[&0][&2000][0].get(0, 0));
        assert!(std::sync::Arc::ptr_eq(&first[&0][&2000][0], &second[&0][&2000][0]));
    }

    #[test]
    fn no_stations_in_region_returns_empty() {
        let st = Station::new(1, "A", "a", LatLng::new(50.0, 10.0), 100.0);
        let sim = build_sim(vec![st]);
        let real = sim.scenarios()[0].realizations()[0];
        // DEM far away from the station and a zero border, nothing should match
        let dem = Grid::new(2, 2, 1000.0, 9_000_000.0, 9_000_000.0, -9999.0, CoordSystem::Utm32N);
        let mut env = Env::new(dem, vec![Acd::Tavg], 2000, 2000, vec![real], 2, reducer(), projector());
        env.border_km = 0.0;
        let results = regionalize(&env);
        assert!(results.is_empty());
    }
}
