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

//! on-disk regionalization result cache (§4.4, §6): directory layout
//! `<root>/<ext>/<sim>/<scen>/<real>/<acdSet>/<reducerLabel>/<resultId>/<year>.grid.ron`.
//! A format substitution for the distilled spec's HDF5 blob (see DESIGN.md): same
//! layout and keying, RON-encoded sidecar instead of an HDF5 dataset. Missing reads
//! are not errors; missing writes are diagnostics only (§7).

use std::fs;
use std::path::PathBuf;

use agroclim_raster::Grid;
use serde::{Deserialize, Serialize};

use crate::memcache::DemExtentKey;

#[derive(Serialize, Deserialize)]
struct GridSidecar {
    ncols: usize,
    nrows: usize,
    xllcorner: f64,
    yllcorner: f64,
    cell_size: f64,
    nodata: f64,
    coordinate_system: agroclim_common::CoordSystem,
    region_name: String,
    time: i64,
    values: Vec<f64>,
}

fn acd_set_path_label(acd_ids: &[i32]) -> String {
    acd_ids.iter().map(|a| a.to_string()).collect::<Vec<_>>().join("_")
}

fn entry_dir(root: &std::path::Path, ext: &DemExtentKey, sim_id: &str, scen_id: &str, real_id: &str, acd_ids: &[i32], reducer_label: &str, result_id: i64) -> PathBuf {
    root.join(ext.canonical_label())
        .join(sim_id)
        .join(scen_id)
        .join(real_id)
        .join(acd_set_path_label(acd_ids))
        .join(reducer_label)
        .join(result_id.to_string())
}

/// loads one year's cached grid, or `None` on any miss/read error (no error surfaced).
pub fn load(root: &std::path::Path, ext: &DemExtentKey, sim_id: &str, scen_id: &str, real_id: &str, acd_ids: &[i32], reducer_label: &str, result_id: i64, year: i32, region_name: &str) -> Option<Grid> {
    let path = entry_dir(root, ext, sim_id, scen_id, real_id, acd_ids, reducer_label, result_id).join(format!("{year}.grid.ron"));
    let data = fs::read_to_string(&path).ok()?;
    let sidecar: GridSidecar = match ron::de::from_str(&data) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "persisted-cache read failed, treating as cache miss");
            return None;
        }
    };
    if sidecar.region_name != region_name {
        tracing::debug!(path = %path.display(), "persisted-cache region-name mismatch, ignoring");
    }
    let mut grid = Grid::new(sidecar.nrows, sidecar.ncols, sidecar.cell_size, sidecar.xllcorner, sidecar.yllcorner, sidecar.nodata, sidecar.coordinate_system);
    for row in 0..sidecar.nrows {
        for col in 0..sidecar.ncols {
            grid.set(row, col, sidecar.values[row * sidecar.ncols + col]);
        }
    }
    Some(grid)
}

/// persists one year's grid. Failure is logged via `tracing::warn!` and otherwise
/// swallowed (§7 "persisted-cache I/O failure").
pub fn store(root: &std::path::Path, ext: &DemExtentKey, sim_id: &str, scen_id: &str, real_id: &str, acd_ids: &[i32], reducer_label: &str, result_id: i64, year: i32, region_name: &str, grid: &Grid, unix_time: i64) {
    let dir = entry_dir(root, ext, sim_id, scen_id, real_id, acd_ids, reducer_label, result_id);
    if let Err(e) = fs::create_dir_all(&dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "persisted-cache write failed (mkdir)");
        return;
    }
    let sidecar = GridSidecar {
        ncols: grid.cols, nrows: grid.rows,
        xllcorner: grid.xll_corner, yllcorner: grid.yll_corner,
        cell_size: grid.cell_size, nodata: grid.no_data,
        coordinate_system: grid.cs, region_name: region_name.to_string(),
        time: unix_time,
        values: grid.values().to_vec(),
    };
    let path = dir.join(format!("{year}.grid.ron"));
    match ron::ser::to_string(&sidecar) {
        Ok(text) => {
            if let Err(e) = fs::write(&path, text) {
                tracing::warn!(path = %path.display(), error = %e, "persisted-cache write failed");
            }
        }
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "persisted-cache serialize failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agroclim_common::CoordSystem;

    #[test]
    fn store_then_load_roundtrips() {
        let tmp = std::env::temp_dir().join(format!("agroclim_diskcache_test_{}", std::process::id()));
        let _ = fs::remove_dir_all(&tmp);
        let ext = DemExtentKey::of(&Grid::new(2, 2, 100.0, 0.0, 0.0, -9999.0, CoordSystem::Utm32N));
        let mut g = Grid::new(2, 2, 100.0, 0.0, 0.0, -9999.0, CoordSystem::Utm32N);
        g.set(0, 0, 7.5);

        store(&tmp, &ext, "sim", "scen", "real", &[0, 1], "default", 0, 2000, "region", &g, 0);
        let loaded = load(&tmp, &ext, "sim", "scen", "real", &[0, 1], "default", 0, 2000, "region").unwrap();
        assert_eq!(loaded.get(0, 0), 7.5);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_entry_is_none_not_error() {
        let tmp = std::env::temp_dir().join("agroclim_diskcache_test_missing");
        let ext = DemExtentKey::of(&Grid::new(2, 2, 100.0, 0.0, 0.0, -9999.0, CoordSystem::Utm32N));
        assert!(load(&tmp, &ext, "sim", "scen", "real", &[0], "default", 0, 1999, "region").is_none());
    }
}
