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

//! a raster grid of `f64` cells, addressed by (row, col) with row 0 at the top (north).
//! Geometry follows the ESRI ASCII-grid convention: `xllCorner`/`yllCorner` name the
//! *lower-left* corner, even though row 0 is the top row.

use serde::{Serialize, Deserialize};
use agroclim_common::{CoordSystem, RcPoint, RcRect};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f64,
    pub xll_corner: f64,
    pub yll_corner: f64,
    pub no_data: f64,
    pub cs: CoordSystem,
    values: Vec<f64>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, cell_size: f64, xll_corner: f64, yll_corner: f64, no_data: f64, cs: CoordSystem) -> Self {
        assert!(cell_size > 0.0, "cellSize must be > 0");
        Grid { rows, cols, cell_size, xll_corner, yll_corner, no_data, cs, values: vec![no_data; rows * cols] }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 { self.values[row * self.cols + col] }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: f64) { self.values[row * self.cols + col] = v; }

    #[inline]
    pub fn is_no_data(&self, row: usize, col: usize) -> bool { self.get(row, col) == self.no_data }

    /// top (north) edge, i.e. `yllCorner + rows*cellSize`
    pub fn y_top(&self) -> f64 { self.yll_corner + (self.rows as f64) * self.cell_size }

    /// right edge, i.e. `xllCorner + cols*cellSize`
    pub fn x_right(&self) -> f64 { self.xll_corner + (self.cols as f64) * self.cell_size }

    /// this grid's extent as a projected rectangle, in its own coordinate system —
    /// used by the regionalizer for station-filter and result-cache extent keys.
    pub fn bounding_rect(&self) -> RcRect {
        RcRect::new(
            RcPoint::new(self.xll_corner, self.y_top(), self.cs),
            RcPoint::new(self.x_right(), self.yll_corner, self.cs),
        )
    }

    /// map a projected (r, h) coordinate to the (row, col) cell containing it, clamped to the
    /// grid's bounds (border values snap to the last valid row/col per the data-model invariant).
    pub fn row_col_of(&self, r: f64, h: f64) -> (usize, usize) {
        let row_f = (self.y_top() - h) / self.cell_size;
        let col_f = (r - self.xll_corner) / self.cell_size;
        let row = row_f.floor().max(0.0) as usize;
        let col = col_f.floor().max(0.0) as usize;
        (row.min(self.rows - 1), col.min(self.cols - 1))
    }

    /// center coordinate (r, h) of a given cell, in the grid's own coordinate system
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let r = self.xll_corner + (col as f64 + 0.5) * self.cell_size;
        let h = self.y_top() - (row as f64 + 0.5) * self.cell_size;
        (r, h)
    }

    /// clone a strict sub-rectangle of this grid given in (row,col) bounds [row0,row1) x [col0,col1)
    pub fn sub_grid(&self, row0: usize, col0: usize, rows: usize, cols: usize) -> Grid {
        let mut out = Grid::new(
            rows, cols, self.cell_size,
            self.xll_corner + (col0 as f64) * self.cell_size,
            self.yll_corner + ((self.rows - row0 - rows) as f64) * self.cell_size,
            self.no_data, self.cs,
        );
        for i in 0..rows {
            for j in 0..cols {
                out.set(i, j, self.get(row0 + i, col0 + j));
            }
        }
        out
    }

    pub fn values(&self) -> &[f64] { &self.values }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_col_roundtrips_center() {
        let g = Grid::new(3, 3, 100.0, 0.0, 0.0, -9999.0, CoordSystem::Utm32N);
        let (r, h) = g.cell_center(1, 1);
        let (row, col) = g.row_col_of(r, h);
        assert_eq!((row, col), (1, 1));
    }

    #[test]
    fn border_snaps_to_last_valid_cell() {
        let g = Grid::new(2, 2, 10.0, 0.0, 0.0, -9999.0, CoordSystem::Utm32N);
        let (row, col) = g.row_col_of(1000.0, -1000.0);
        assert_eq!((row, col), (1, 1));
    }
}
