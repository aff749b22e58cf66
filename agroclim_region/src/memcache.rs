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

//! the regionalizer's in-memory result cache (§4.4): a nested map mirroring the
//! original's `GMD2Res -> Sim2Res -> Scen2Res -> Real2Res -> ACD2Res -> FuncId2Res ->
//! ResId2Res -> Year2Res` chain, keyed on a grid-extent fingerprint rather than on the
//! `Grid` value itself so lookups don't require comparing cell data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agroclim_common::{CoordSystem, RcRect};
use agroclim_raster::Grid;
use lazy_static::lazy_static;

/// a grid's geometry, used as a hashable cache key (values are not part of the key).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DemExtentKey {
    rows: usize,
    cols: usize,
    cell_size_bits: u64,
    xll_bits: u64,
    yll_bits: u64,
    cs: CoordSystem,
}

impl DemExtentKey {
    pub fn of(grid: &Grid) -> Self {
        DemExtentKey {
            rows: grid.rows,
            cols: grid.cols,
            cell_size_bits: grid.cell_size.to_bits(),
            xll_bits: grid.xll_corner.to_bits(),
            yll_bits: grid.yll_corner.to_bits(),
            cs: grid.cs,
        }
    }

    /// `<extentCanonical>` path segment used by the on-disk cache (§6)
    pub fn canonical_label(&self) -> String {
        format!("{}x{}_{}_{}_{:?}", self.rows, self.cols, f64::from_bits(self.cell_size_bits) as i64, f64::from_bits(self.xll_bits) as i64, self.cs)
    }
}

type YearMap = HashMap<i32, Arc<Grid>>;
type ResultMap = HashMap<i64 /* ResultId */, YearMap>;
type FuncMap = HashMap<i64 /* reducerId */, ResultMap>;
type AcdSetMap = HashMap<Vec<i32> /* sorted ACD ids */, FuncMap>;
type RealMap = HashMap<String /* realization id */, AcdSetMap>;
type ScenMap = HashMap<String /* scenario id */, RealMap>;
type SimMap = HashMap<String /* simulation id */, ScenMap>;

struct ExtentRow {
    rect: RcRect,
    cell_size: f64,
    cs: CoordSystem,
    sims: SimMap,
}

/// the process-wide in-memory result cache, one row per distinct DEM extent ever seen.
#[derive(Default)]
pub struct MemCache {
    rows: Mutex<HashMap<DemExtentKey, ExtentRow>>,
}

impl MemCache {
    pub fn new() -> Self { MemCache::default() }

    /// looks up a cached grid, cloning a sub-grid when the request is a strict
    /// sub-rectangle of a larger cached extent with identical cell size (§4.4 step 1).
    pub fn get(&self, dem: &Grid, sim_id: &str, scen_id: &str, real_id: &str, acd_set: &[i32], reducer_id: i64, result_id: i64, year: i32) -> Option<Arc<Grid>> {
        let rows = self.rows.lock().unwrap();
        let key = DemExtentKey::of(dem);
        let requested_rect = dem.bounding_rect();

        let row = if let Some(r) = rows.get(&key) {
            Some(r)
        } else {
            rows.values().find(|r| {
                r.cell_size == dem.cell_size && r.cs == dem.cs && r.rect.contains_rect(&requested_rect) && r.rect != requested_rect
            })
        }?;

        let is_sub_region = row.rect != requested_rect;
        let g = row.sims.get(sim_id)?.get(scen_id)?.get(real_id)?.get(acd_set)?.get(&reducer_id)?.get(&result_id)?.get(&year)?;

        if is_sub_region {
            let row0 = ((row.rect.tl.h - requested_rect.tl.h) / dem.cell_size).round().max(0.0) as usize;
            let col0 = ((requested_rect.tl.r - row.rect.tl.r) / dem.cell_size).round().max(0.0) as usize;
            Some(Arc::new(g.sub_grid(row0, col0, dem.rows, dem.cols)))
        } else {
            Some(g.clone())
        }
    }

    /// stores one year's result grid. Holds the row's slot long enough that an entire
    /// year's results become visible atomically (§5).
    pub fn put(&self, dem: &Grid, sim_id: &str, scen_id: &str, real_id: &str, acd_set: Vec<i32>, reducer_id: i64, result_id: i64, year: i32, grid: Arc<Grid>) {
        let mut rows = self.rows.lock().unwrap();
        let key = DemExtentKey::of(dem);
        let row = rows.entry(key).or_insert_with(|| ExtentRow {
            rect: dem.bounding_rect(),
            cell_size: dem.cell_size,
            cs: dem.cs,
            sims: HashMap::new(),
        });
        row.sims.entry(sim_id.to_string()).or_default()
            .entry(scen_id.to_string()).or_default()
            .entry(real_id.to_string()).or_default()
            .entry(acd_set).or_default()
            .entry(reducer_id).or_default()
            .entry(result_id).or_default()
            .insert(year, grid);
    }
}

lazy_static! {
    pub static ref GLOBAL_MEM_CACHE: MemCache = MemCache::new();
}

#[cfg(test)]
mod tests {
    use super::*;
    use agroclim_common::CoordSystem;

    fn grid(rows: usize, cols: usize, cell: f64, xll: f64, yll: f64) -> Grid {
        Grid::new(rows, cols, cell, xll, yll, -9999.0, CoordSystem::Utm32N)
    }

    #[test]
    fn put_then_get_roundtrips_same_extent() {
        let cache = MemCache::new();
        let g = grid(3, 3, 100.0, 0.0, 0.0);
        let mut stored = g.clone();
        stored.set(0, 0, 42.0);
        cache.put(&g, "sim", "scen", "real", vec![0], 1, 0, 2000, Arc::new(stored));
        let got = cache.get(&g, "sim", "scen", "real", &[0], 1, 0, 2000).unwrap();
        assert_eq!(got.get(0, 0), 42.0);
    }

    #[test]
    fn sub_rectangle_clones_from_larger_cached_extent_s5() {
        let cache = MemCache::new();
        let big = grid(4, 4, 100.0, 0.0, 0.0);
        let mut stored = big.clone();
        for i in 0..4 { for j in 0..4 { stored.set(i, j, (i * 4 + j) as f64); } }
        cache.put(&big, "sim", "scen", "real", vec![0], 1, 0, 2000, Arc::new(stored));

        // a 2x2 sub-grid in the top-left corner
        let small = grid(2, 2, 100.0, 0.0, 200.0);
        let got = cache.get(&small, "sim", "scen", "real", &[0], 1, 0, 2000).unwrap();
        assert_eq!(got.rows, 2);
        assert_eq!(got.get(0, 0), 0.0);
        assert_eq!(got.get(1, 1), 5.0);
    }
}
