/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! geodetic and projected coordinate primitives, following odin-rs design principles of
//! wrapping the `geo` crate rather than reinventing point/rect geometry.

use std::fmt;
use serde::{Serialize, Deserialize};
use geo::{Point, Rect as GeoRectInner, Coord};

pub const COORD_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordSystem {
    LatLngWgs84,
    Utm21S,
    Gk5,
    Utm32N,
}

/// a lat/lng point on the WGS84 ellipsoid, stored as plain f64 degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self { LatLng { lat, lng } }

    pub fn point(&self) -> Point<f64> { Point::new(self.lng, self.lat) }

    /// plain euclidean distance in lat-lng degree space, as used by `closestStationCoord`
    /// (the original does not use geodesic distance for station lookup, just nearest in degrees).
    pub fn distance(&self, other: &LatLng) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }
}

impl PartialEq for LatLng {
    fn eq(&self, other: &Self) -> bool {
        (self.lat - other.lat).abs() < COORD_EPS && (self.lng - other.lng).abs() < COORD_EPS
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6},{:.6})", self.lat, self.lng)
    }
}

/// a point in a projected (rectangular) coordinate system, e.g. UTM/GK northing-easting in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RcPoint {
    pub r: f64,
    pub h: f64,
    pub cs: CoordSystem,
}

impl RcPoint {
    pub fn new(r: f64, h: f64, cs: CoordSystem) -> Self { RcPoint { r, h, cs } }

    pub fn planar_distance(&self, other: &RcPoint) -> f64 {
        let dr = self.r - other.r;
        let dh = self.h - other.h;
        (dr * dr + dh * dh).sqrt()
    }
}

/// an axis-aligned rectangle in a projected coordinate system, top-left/bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RcRect {
    pub tl: RcPoint,
    pub br: RcPoint,
}

impl RcRect {
    pub fn new(tl: RcPoint, br: RcPoint) -> Self { RcRect { tl, br } }

    pub fn width(&self) -> f64 { self.br.r - self.tl.r }
    pub fn height(&self) -> f64 { self.tl.h - self.br.h }

    pub fn is_empty(&self) -> bool { self.width() <= 0.0 || self.height() <= 0.0 }

    /// inclusive of top-left, exclusive of bottom-right
    pub fn contains(&self, p: &RcPoint) -> bool {
        p.r >= self.tl.r && p.r < self.br.r && p.h <= self.tl.h && p.h > self.br.h
    }

    pub fn intersects(&self, other: &RcRect) -> bool {
        self.tl.r < other.br.r && other.tl.r < self.br.r &&
        self.br.h < other.tl.h && other.br.h < self.tl.h
    }

    /// true if `other` is a sub-rectangle of `self` (used by the regionalizer's sub-grid clone path)
    pub fn contains_rect(&self, other: &RcRect) -> bool {
        other.tl.r >= self.tl.r && other.br.r <= self.br.r &&
        other.tl.h <= self.tl.h && other.br.h >= self.br.h
    }

    /// expand on each side by `km` kilometers (coordinates are assumed to be in meters)
    pub fn expanded_by_km(&self, km: f64) -> RcRect {
        let m = km * 1000.0;
        RcRect {
            tl: RcPoint::new(self.tl.r - m, self.tl.h + m, self.tl.cs),
            br: RcPoint::new(self.br.r + m, self.br.h - m, self.br.cs),
        }
    }

    /// ordered TL, TR, BR, BL vertices
    pub fn vertices(&self) -> [RcPoint; 4] {
        [
            self.tl,
            RcPoint::new(self.br.r, self.tl.h, self.tl.cs),
            self.br,
            RcPoint::new(self.tl.r, self.br.h, self.tl.cs),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latlng_epsilon_equality() {
        let a = LatLng::new(52.5, 13.4);
        let b = LatLng::new(52.5 + 1e-7, 13.4 - 1e-7);
        assert_eq!(a, b);
    }

    #[test]
    fn rect_contains_rect() {
        let outer = RcRect::new(RcPoint::new(0.0, 100.0, CoordSystem::Utm32N), RcPoint::new(100.0, 0.0, CoordSystem::Utm32N));
        let inner = RcRect::new(RcPoint::new(10.0, 90.0, CoordSystem::Utm32N), RcPoint::new(90.0, 10.0, CoordSystem::Utm32N));
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
    }

    #[test]
    fn expanded_by_km_grows_each_side() {
        let r = RcRect::new(RcPoint::new(0.0, 0.0, CoordSystem::Utm32N), RcPoint::new(10.0, -10.0, CoordSystem::Utm32N));
        let e = r.expanded_by_km(1.0);
        assert_eq!(e.tl.r, -1000.0);
        assert_eq!(e.br.r, 1010.0);
    }
}
