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

//! station selection for one regionalization call (§4.4 "Station selection"):
//! stations whose projected coordinate falls inside the DEM's bounding rectangle
//! expanded by `borderKm`, memoized per `(simulation, demMetadata)` pair.

use std::collections::HashMap;
use std::sync::Mutex;

use agroclim_climate::Simulation;
use agroclim_raster::Grid;
use lazy_static::lazy_static;

use crate::env::Projector;
use crate::memcache::DemExtentKey;

lazy_static! {
    static ref STATION_FILTER_MEMO: Mutex<HashMap<(String, DemExtentKey), Vec<i64>>> = Mutex::new(HashMap::new());
}

/// ids of the stations of `sim` contained in `dem`'s bounding rectangle expanded by
/// `border_km` kilometers on each side, memoized per `(simulation id, dem metadata)`.
pub fn filter_climate_stations(sim: &Simulation, dem: &Grid, border_km: f64, project: &Projector) -> Vec<i64> {
    let key = (sim.id.clone(), DemExtentKey::of(dem));

    {
        let memo = STATION_FILTER_MEMO.lock().unwrap();
        if let Some(ids) = memo.get(&key) {
            return ids.clone();
        }
    }

    let extended = dem.bounding_rect().expanded_by_km(border_km);
    let ids: Vec<i64> = sim.stations().iter()
        .filter(|s| extended.contains(&project(&s.lat_lng)))
        .map(|s| s.id)
        .collect();

    tracing::debug!(sim = %sim.id, count = ids.len(), border_km, "filtered climate stations for regionalization");

    let mut memo = STATION_FILTER_MEMO.lock().unwrap();
    memo.entry(key).or_insert_with(|| ids.clone());
    ids
}
