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

//! the Simulation/Scenario/Realization tree (§4.2) and the process-wide simulation
//! registry (§4.1). The C++ original ties these together with raw back-pointers
//! (`ClimateScenario::simulation()`, `ClimateRealization::scenario()`); here the
//! `Simulation` is the sole owner of its stations/scenarios/realizations and children
//! are reached through borrowed ref-handles (`ScenarioRef`/`RealizationRef`) carrying
//! an index plus a `&Simulation`, per the arena-ownership re-expression in DESIGN.md.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use tracing::{info, warn};

use agroclim_common::LatLng;
use crate::acd::Acd;
use crate::cache::{DataAccessor, RealizationCache};
use crate::source::StationSource;
use crate::station::{closest_station, find_station_by_name_substr, Station};

struct RealizationData {
    id: String,
    name: String,
    scenario_idx: usize,
    source: Arc<dyn StationSource>,
    cache: RealizationCache,
}

/// one forcing assumption grouping a set of realizations (§3: `Scenario{id, name, realizations[]}`)
pub struct ScenarioData {
    pub id: String,
    pub name: String,
    realization_idxs: Vec<usize>,
}

/// a named climate product: STAR, STAR2, CLM20, REMO, WettReg2006/2010, WEREX4, ... (§3: `Simulation`)
pub struct Simulation {
    pub id: String,
    pub name: String,
    stations: Vec<Station>,
    scenarios: Vec<ScenarioData>,
    realizations: Vec<RealizationData>,
    default_scenario_id: Option<String>,
    static_year_range: Option<(i32, i32)>,
    year_range: Mutex<Option<(i32, i32)>>,
}

/// one scenario's realizations, as handed to `Simulation::build`.
pub struct ScenarioSpec {
    pub id: String,
    pub name: String,
    pub realizations: Vec<(String, String)>,
}

impl Simulation {
    /// builds a simulation tree from a flat spec. `source` backs every realization
    /// (the original clones the simulation's master db connection per-realization;
    /// `StationSource` implementors are expected to be cheaply cloneable/shared, hence `Arc`).
    pub fn build(
        id: impl Into<String>,
        name: impl Into<String>,
        stations: Vec<Station>,
        scenarios: Vec<ScenarioSpec>,
        source: Arc<dyn StationSource>,
        default_scenario_id: Option<String>,
        static_year_range: Option<(i32, i32)>,
    ) -> Self {
        let mut scenario_data = Vec::with_capacity(scenarios.len());
        let mut realizations = Vec::new();
        for (scenario_idx, spec) in scenarios.into_iter().enumerate() {
            let mut realization_idxs = Vec::with_capacity(spec.realizations.len());
            for (rid, rname) in spec.realizations {
                realization_idxs.push(realizations.len());
                realizations.push(RealizationData {
                    id: rid,
                    name: rname,
                    scenario_idx,
                    source: source.clone(),
                    cache: RealizationCache::new(),
                });
            }
            scenario_data.push(ScenarioData { id: spec.id, name: spec.name, realization_idxs });
        }
        Simulation {
            id: id.into(),
            name: name.into(),
            stations,
            scenarios: scenario_data,
            realizations,
            default_scenario_id,
            static_year_range,
            year_range: Mutex::new(None),
        }
    }

    pub fn scenarios(&self) -> Vec<ScenarioRef<'_>> {
        (0..self.scenarios.len()).map(|idx| ScenarioRef { sim: self, idx }).collect()
    }

    pub fn scenario(&self, name: &str) -> Option<ScenarioRef<'_>> {
        self.scenarios.iter().position(|s| s.name == name).map(|idx| ScenarioRef { sim: self, idx })
    }

    pub fn scenario_by_id(&self, id: &str) -> Option<ScenarioRef<'_>> {
        self.scenarios.iter().position(|s| s.id == id).map(|idx| ScenarioRef { sim: self, idx })
    }

    /// last in the list, unless a named default id was set at construction (e.g. `"2k"`
    /// for star2, `"A1B"` for CLM/WettReg) — §4.2.
    pub fn default_scenario(&self) -> Option<ScenarioRef<'_>> {
        if let Some(id) = &self.default_scenario_id {
            if let Some(s) = self.scenario_by_id(id) {
                return Some(s);
            }
        }
        if self.scenarios.is_empty() { None } else { Some(ScenarioRef { sim: self, idx: self.scenarios.len() - 1 }) }
    }

    pub fn stations(&self) -> &[Station] { &self.stations }

    /// case-insensitive substring search, first match by display order (S4)
    pub fn station(&self, name_substr: &str) -> Option<&Station> {
        find_station_by_name_substr(&self.stations, name_substr)
    }

    pub fn geo_coords(&self) -> Vec<LatLng> { self.stations.iter().map(|s| s.lat_lng).collect() }

    pub fn station2coord(&self, name_substr: &str) -> Option<LatLng> {
        self.station(name_substr).map(|s| s.lat_lng)
    }

    /// exact lat-lng match (within `COORD_EPS`), not nearest-neighbor
    pub fn coord2station(&self, coord: &LatLng) -> Option<&Station> {
        self.stations.iter().find(|s| &s.lat_lng == coord)
    }

    /// nearest station's coordinate, minimum Euclidean distance in lat-lng
    pub fn closest_station_coord(&self, coord: &LatLng) -> Option<LatLng> {
        closest_station(&self.stations, coord).map(|s| s.lat_lng)
    }

    /// statically known for most products; otherwise computed once from the first
    /// realization's first station and memoized under the simulation's mutex (§4.2, §5).
    pub fn available_year_range(&self) -> (i32, i32) {
        if let Some(r) = self.static_year_range { return r; }

        if let Some(r) = *self.year_range.lock().unwrap() {
            return r;
        }
        let mut guard = self.year_range.lock().unwrap();
        if let Some(r) = *guard { return r; }

        let computed = self.realizations.first()
            .map(|r| r.source.year_range())
            .unwrap_or((0, 0));
        *guard = Some(computed);
        computed
    }
}

/// a borrowed handle to one of a simulation's scenarios; non-owning, mirrors the
/// original's `ClimateScenario::simulation()` back-pointer as a lifetime-checked borrow.
#[derive(Clone, Copy)]
pub struct ScenarioRef<'s> {
    sim: &'s Simulation,
    idx: usize,
}

impl<'s> ScenarioRef<'s> {
    fn data(&self) -> &'s ScenarioData { &self.sim.scenarios[self.idx] }

    pub fn id(&self) -> &'s str { &self.data().id }
    pub fn name(&self) -> &'s str { &self.data().name }
    pub fn simulation(&self) -> &'s Simulation { self.sim }

    pub fn realizations(&self) -> Vec<RealizationRef<'s>> {
        self.data().realization_idxs.iter()
            .map(|&idx| RealizationRef { sim: self.sim, idx })
            .collect()
    }

    pub fn realization(&self, name: &str) -> Option<RealizationRef<'s>> {
        self.data().realization_idxs.iter()
            .map(|&idx| RealizationRef { sim: self.sim, idx })
            .find(|r| r.name() == name)
    }
}

/// a borrowed handle to one realization. Owns no state directly; the realization's
/// cache and backing source live in the owning `Simulation`'s arena.
#[derive(Clone, Copy)]
pub struct RealizationRef<'s> {
    sim: &'s Simulation,
    idx: usize,
}

impl<'s> RealizationRef<'s> {
    fn data(&self) -> &'s RealizationData { &self.sim.realizations[self.idx] }

    pub fn id(&self) -> &'s str { &self.data().id }
    pub fn name(&self) -> &'s str { &self.data().name }
    pub fn simulation(&self) -> &'s Simulation { self.sim }
    pub fn scenario(&self) -> ScenarioRef<'s> { ScenarioRef { sim: self.sim, idx: self.data().scenario_idx } }

    /// fills the cache but returns no data (§4.2/§4.3)
    pub fn fill_cache_for(&self, acds: &[Acd], coord: &LatLng, start_date: NaiveDate, end_date: NaiveDate) {
        let data = self.data();
        let nearest = self.sim.closest_station_coord(coord).unwrap_or(*coord);
        data.cache.fill_cache_for(data.source.as_ref(), acds, &nearest, start_date, end_date);
    }

    /// `dataAccessorFor(acds, coord, startDate, endDate) -> DataAccessor` (§4.2). Returns
    /// an empty accessor without touching the cache when the request falls outside
    /// `simulation.availableYearRange()` (§4.3 edge case, §7 "out-of-range request").
    pub fn data_accessor_for(&self, acds: &[Acd], coord: &LatLng, start_date: NaiveDate, end_date: NaiveDate) -> DataAccessor {
        use chrono::Datelike;
        let (min_year, max_year) = self.sim.available_year_range();
        if start_date.year() < min_year || end_date.year() > max_year {
            return DataAccessor::empty();
        }
        let data = self.data();
        let nearest = self.sim.closest_station_coord(coord).unwrap_or(*coord);
        data.cache.fill_cache_for(data.source.as_ref(), acds, &nearest, start_date, end_date);
        data.cache.data_accessor_for(acds, &nearest, start_date, end_date)
    }

    /// convenience overload resolving a station name substring to a coordinate first (§4.2)
    pub fn data_accessor_for_station(&self, acds: &[Acd], station_name: &str, start_date: NaiveDate, end_date: NaiveDate) -> DataAccessor {
        match self.sim.station2coord(station_name) {
            Some(coord) => self.data_accessor_for(acds, &coord, start_date, end_date),
            None => DataAccessor::empty(),
        }
    }
}

/// factory for one simulation product, keyed by the product id used in
/// `active_schemas` (e.g. `"clm20"`, `"star"`, `"wettreg2006"`). Returns `None` if
/// the backing-store connection could not be opened (§4.1, §7).
pub type SimulationFactory = dyn Fn() -> Option<Simulation> + Send + Sync;

/// `[active-climate-db-schemas]` config section (§6): which products to enable.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RegistryConfig {
    pub active_schemas: Vec<String>,
}

/// the set of active simulations, built once from configuration (§4.1). The first
/// successfully constructed entry is the "default" simulation.
pub struct SimulationRegistry {
    simulations: Vec<Simulation>,
}

impl SimulationRegistry {
    pub fn all_simulations(&self) -> &[Simulation] { &self.simulations }

    pub fn default_simulation(&self) -> Option<&Simulation> { self.simulations.first() }
}

/// builds a registry from a config and a map of per-product factories. Unknown ids in
/// `active_schemas` and factories that fail to construct a simulation are each skipped
/// with a `tracing::warn!` diagnostic — never an error (§7 "configuration inconsistency").
pub fn load_registry(config: &RegistryConfig, factories: &HashMap<String, Box<SimulationFactory>>) -> SimulationRegistry {
    let mut simulations = Vec::new();
    for schema in &config.active_schemas {
        match factories.get(schema) {
            Some(factory) => match factory() {
                Some(sim) => {
                    info!(id = %sim.id, name = %sim.name, "enabled climate simulation");
                    simulations.push(sim);
                }
                None => warn!(%schema, "failed to open backing-store connection; simulation skipped"),
            },
            None => warn!(%schema, "unknown simulation id in active set; skipped"),
        }
    }
    SimulationRegistry { simulations }
}

lazy_static! {
    static ref MANAGER: Mutex<Option<Arc<SimulationRegistry>>> = Mutex::new(None);
}

/// lazily initializes the process-wide climate-data manager singleton on first call,
/// guarded so concurrent first access yields exactly one instance (§4.1, §5). Subsequent
/// calls (with any arguments) return the already-built registry.
pub fn init_climate_data_manager(config: &RegistryConfig, factories: HashMap<String, Box<SimulationFactory>>) -> Arc<SimulationRegistry> {
    {
        let guard = MANAGER.lock().unwrap();
        if let Some(existing) = guard.as_ref() {
            return existing.clone();
        }
    }
    let built = Arc::new(load_registry(config, &factories));
    let mut guard = MANAGER.lock().unwrap();
    if guard.is_none() {
        *guard = Some(built.clone());
    }
    guard.as_ref().unwrap().clone()
}

/// `climateDataManager()` (§6): must be initialized via `init_climate_data_manager` first.
pub fn climate_data_manager() -> Option<Arc<SimulationRegistry>> {
    MANAGER.lock().unwrap().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;
    use crate::station::LocationClass;

    fn sample_simulation() -> Simulation {
        let stations = vec![
            {
                let mut s = Station::new(1, "Müncheberg", "MB1", LatLng::new(52.5, 14.1), 60.0);
                s.location_class = LocationClass::Flat;
                s
            },
            Station::new(2, "Berlin-Dahlem", "BD1", LatLng::new(52.45, 13.3), 50.0),
        ];
        let source: Arc<dyn StationSource> = Arc::new(InMemorySource::new((1990, 2020)));
        Simulation::build(
            "star2",
            "STAR2",
            stations,
            vec![
                ScenarioSpec { id: "1k".into(), name: "1k".into(), realizations: vec![("r1".into(), "Realization1".into())] },
                ScenarioSpec { id: "2k".into(), name: "2k".into(), realizations: vec![("r1".into(), "Realization1".into())] },
            ],
            source,
            Some("2k".into()),
            Some((1951, 2060)),
        )
    }

    #[test]
    fn default_scenario_resolves_named_id() {
        let sim = sample_simulation();
        assert_eq!(sim.default_scenario().unwrap().id(), "2k");
    }

    #[test]
    fn default_scenario_falls_back_to_last() {
        let mut sim = sample_simulation();
        sim.default_scenario_id = None;
        assert_eq!(sim.default_scenario().unwrap().id(), "2k"); // last in list
    }

    #[test]
    fn station_lookup_case_insensitive_substring_s4() {
        let sim = sample_simulation();
        assert_eq!(sim.station("münch").unwrap().name, "Müncheberg");
    }

    #[test]
    fn scenario_realization_lookup_roundtrips() {
        let sim = sample_simulation();
        let scen = sim.scenario_by_id("1k").unwrap();
        let real = scen.realization("Realization1").unwrap();
        assert_eq!(real.scenario().id(), "1k");
        assert_eq!(real.simulation().id, "star2");
    }

    #[test]
    fn out_of_range_request_returns_empty_accessor() {
        let sim = sample_simulation();
        let real = sim.default_scenario().unwrap().realization("Realization1").unwrap();
        let coord = LatLng::new(52.5, 14.1);
        let sd = chrono::NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let ed = chrono::NaiveDate::from_ymd_opt(1900, 1, 31).unwrap();
        let da = real.data_accessor_for(&[Acd::Tmin], &coord, sd, ed);
        assert!(da.is_empty());
    }
}
