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

//! reader/writer for the Esri ASCII-grid (`.asc`) format, one of the two raster file
//! formats this core references only by semantics (header keys, row-major cell order).

use std::io::{BufRead, BufReader, Write, Read};
use std::fs::File;
use std::path::Path;
use agroclim_common::CoordSystem;
use crate::errors::{RasterError, Result};
use crate::grid::Grid;

pub fn read_ascii_grid(path: impl AsRef<Path>, cs: CoordSystem) -> Result<Grid> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut lines = reader.lines();

    let mut ncols = None;
    let mut nrows = None;
    let mut xll = None;
    let mut yll = None;
    let mut cell_size = None;
    let mut no_data = -9999.0_f64;

    let mut line_buf = String::new();
    loop {
        let line = match lines.next() {
            Some(l) => l?,
            None => return Err(RasterError::HeaderError("unexpected end of header".into())),
        };
        let mut parts = line.split_whitespace();
        let key = parts.next().unwrap_or("").to_ascii_lowercase();
        let val = parts.next();
        match key.as_str() {
            "ncols" => ncols = val.and_then(|v| v.parse().ok()),
            "nrows" => nrows = val.and_then(|v| v.parse().ok()),
            "xllcorner" | "xllcenter" => xll = val.and_then(|v| v.parse().ok()),
            "yllcorner" | "yllcenter" => yll = val.and_then(|v| v.parse().ok()),
            "cellsize" => cell_size = val.and_then(|v| v.parse().ok()),
            "nodata_value" => no_data = val.and_then(|v| v.parse().ok()).unwrap_or(-9999.0),
            _ => { line_buf = line; break; }
        }
    }

    let cols: usize = ncols.ok_or_else(|| RasterError::HeaderError("missing ncols".into()))?;
    let rows: usize = nrows.ok_or_else(|| RasterError::HeaderError("missing nrows".into()))?;
    let xll_corner = xll.ok_or_else(|| RasterError::HeaderError("missing xllcorner".into()))?;
    let yll_corner = yll.ok_or_else(|| RasterError::HeaderError("missing yllcorner".into()))?;
    let cell_size = cell_size.ok_or_else(|| RasterError::HeaderError("missing cellsize".into()))?;

    let mut grid = Grid::new(rows, cols, cell_size, xll_corner, yll_corner, no_data, cs);

    let mut row_idx = 0;
    let mut current = line_buf;
    loop {
        if row_idx >= rows { break; }
        for (col_idx, tok) in current.split_whitespace().enumerate() {
            let v: f64 = tok.parse().map_err(|_| RasterError::DataError(row_idx))?;
            if col_idx >= cols { return Err(RasterError::DataError(row_idx)); }
            grid.set(row_idx, col_idx, v);
        }
        row_idx += 1;
        current = match lines.next() {
            Some(l) => l?,
            None => break,
        };
    }
    if row_idx != rows {
        return Err(RasterError::DataError(row_idx));
    }

    Ok(grid)
}

pub fn write_ascii_grid(path: impl AsRef<Path>, grid: &Grid) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "ncols {}", grid.cols)?;
    writeln!(file, "nrows {}", grid.rows)?;
    writeln!(file, "xllcorner {}", grid.xll_corner)?;
    writeln!(file, "yllcorner {}", grid.yll_corner)?;
    writeln!(file, "cellsize {}", grid.cell_size)?;
    writeln!(file, "NODATA_value {}", grid.no_data)?;
    for row in 0..grid.rows {
        let mut line = String::with_capacity(grid.cols * 8);
        for col in 0..grid.cols {
            if col > 0 { line.push(' '); }
            line.push_str(&grid.get(row, col).to_string());
        }
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn roundtrips_through_disk() {
        let mut g = Grid::new(2, 2, 50.0, 100.0, 200.0, -9999.0, CoordSystem::Utm32N);
        g.set(0, 0, 1.0);
        g.set(0, 1, 2.0);
        g.set(1, 0, 3.0);
        g.set(1, 1, -9999.0);

        let dir = std::env::temp_dir().join(format!("agroclim_ascii_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("grid.asc");
        write_ascii_grid(&path, &g).unwrap();
        let g2 = read_ascii_grid(&path, CoordSystem::Utm32N).unwrap();

        assert_eq!(g2.rows, 2);
        assert_eq!(g2.cols, 2);
        assert_eq!(g2.get(0, 0), 1.0);
        assert_eq!(g2.get(1, 1), -9999.0);
        assert!(g2.is_no_data(1, 1));

        std::fs::remove_dir_all(&dir).ok();
    }
}
