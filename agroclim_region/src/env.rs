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

//! `Env`/`CacheInfo` (§3, §4.4): the regionalizer's input. The user-supplied reducer and
//! the lat-lng -> projected-coordinate conversion are both treated as black-box
//! collaborators (§1: "coordinate-system conversions" are out of scope for this core).

use std::path::PathBuf;
use std::sync::Arc;
use std::collections::BTreeMap;

use agroclim_common::{LatLng, RcPoint};
use agroclim_climate::{Acd, DataAccessor, RealizationRef};
use agroclim_raster::Grid;

pub type ResultId = i64;

/// ordered map `ResultId -> value`, preserving the original's `map<ResultId, double>` order.
pub type FuncResult = BTreeMap<ResultId, f64>;

/// collapses a time slice to one or more scalars per station per year (§4.4 step 1).
pub type Reducer = Arc<dyn Fn(&DataAccessor) -> FuncResult + Send + Sync>;

/// the one coordinate-system conversion this core needs — lat-lng to the DEM's
/// projected (rectangular) system — supplied by the caller (§1 scope boundary).
pub type Projector = Arc<dyn Fn(&LatLng) -> RcPoint + Send + Sync>;

/// persisted-cache settings (§4.4, §6).
#[derive(Clone)]
pub struct CacheInfo {
    pub persist: bool,
    pub root_path: PathBuf,
    /// human label for the reducer, used as the `<reducerLabel>` path segment
    pub reducer_label: String,
    /// the set of result ids this reducer is known to produce, in order
    pub result_ids: Vec<ResultId>,
}

impl Default for CacheInfo {
    fn default() -> Self {
        CacheInfo { persist: false, root_path: PathBuf::new(), reducer_label: "default".into(), result_ids: Vec::new() }
    }
}

/// `Env{dem, acds[], fromYear, toYear, yearSlice, borderKm, realizations[], reducerId, reducer, cacheInfo}` (§3).
#[derive(Clone)]
pub struct Env<'s> {
    pub dem: Grid,
    pub acds: Vec<Acd>,
    pub from_year: i32,
    pub to_year: i32,
    /// how many years of continuous climate data the reducer needs per invocation
    pub year_slice: i32,
    pub border_km: f64,
    pub realizations: Vec<RealizationRef<'s>>,
    pub reducer_id: i64,
    pub reducer: Reducer,
    pub project: Projector,
    pub cache_info: CacheInfo,
}

impl<'s> Env<'s> {
    pub fn new(dem: Grid, acds: Vec<Acd>, from_year: i32, to_year: i32, realizations: Vec<RealizationRef<'s>>, reducer_id: i64, reducer: Reducer, project: Projector) -> Self {
        Env {
            dem, acds, from_year, to_year,
            year_slice: 1,
            border_km: 100.0, // defaultBorderSize (km) from the original
            realizations,
            reducer_id, reducer, project,
            cache_info: CacheInfo::default(),
        }
    }
}
