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

//! the backing-store adapter seam (§6): "a table query engine returning ordered rows".
//! This repository ships one concrete in-memory/CSV-backed implementation, sufficient to
//! drive the §8 test scenarios, without claiming to be a full database client.

use std::collections::HashMap;
use chrono::NaiveDate;
use agroclim_common::LatLng;
use crate::acd::Acd;
use crate::derive::{DerivationContext, FunctorTable};
use crate::station::{LocationClass, Station};

/// builds and issues a single read for `(coord, variables, date-range)`, returning columns
/// of doubles in calendar order with Feb-29 already removed. Implementors apply the §4.5
/// row-derivation pipeline (precipitation correction, radiation reconstruction, unit
/// normalization) before returning — the cache and realization layers never see raw columns.
/// `InMemorySource` does this via an `ACD -> rowFunc` functor table (`derive::FunctorTable`,
/// `set_functors`/`register_station`); a source with no functors installed passes raw
/// columns through unchanged.
pub trait StationSource: Send + Sync {
    fn query(&self, acds: &[Acd], coord: &LatLng, start: NaiveDate, end: NaiveDate) -> HashMap<Acd, Vec<f64>>;

    /// queried min/max year available at this source, used to seed `availableYearRange`
    fn year_range(&self) -> (i32, i32);
}

/// a plain in-memory source keyed by nearest station coordinate; rows are supplied
/// up-front (e.g. parsed from a CSV export of a tabular archive) and Feb-29 is dropped
/// on construction to mirror the backing store's `not (month=2 and day=29)` filter (§6).
pub struct InMemorySource {
    year_range: (i32, i32),
    series: HashMap<(i64, i64), HashMap<Acd, Vec<(NaiveDate, f64)>>>,
    station_ctx: HashMap<(i64, i64), DerivationContext>,
    functors: FunctorTable,
}

fn coord_key(coord: &LatLng) -> (i64, i64) {
    ((coord.lat * 1_000_000.0).round() as i64, (coord.lng * 1_000_000.0).round() as i64)
}

impl InMemorySource {
    pub fn new(year_range: (i32, i32)) -> Self {
        InMemorySource { year_range, series: HashMap::new(), station_ctx: HashMap::new(), functors: HashMap::new() }
    }

    /// register one `(date, value)` row for `acd` at `coord`. Feb-29 rows are silently dropped.
    pub fn insert_row(&mut self, coord: &LatLng, acd: Acd, date: NaiveDate, value: f64) {
        use chrono::Datelike;
        if date.month() == 2 && date.day() == 29 { return; }
        self.series.entry(coord_key(coord)).or_default().entry(acd).or_default().push((date, value));
    }

    /// convenience bulk-loader: a constant daily value for `acd` at `coord` over `[start, end]`.
    pub fn fill_constant(&mut self, coord: &LatLng, acd: Acd, start: NaiveDate, end: NaiveDate, value: f64) {
        let mut d = start;
        while d <= end {
            self.insert_row(coord, acd, d, value);
            d = d.succ_opt().unwrap();
        }
    }

    /// installs the `ACD -> rowFunc` table (§4.5) this source applies on every `query()`.
    /// An empty table (the default) makes `query()` pass raw columns through unchanged.
    pub fn set_functors(&mut self, functors: FunctorTable) {
        self.functors = functors;
    }

    /// records a station's location class, latitude and elevation so the derivation
    /// functors have the context they need; without this a station's coordinate still
    /// resolves but falls back to `LocationClass::default()` and zero elevation.
    pub fn register_station(&mut self, station: &Station) {
        self.station_ctx.insert(coord_key(&station.lat_lng), DerivationContext {
            location_class: station.location_class,
            latitude: station.lat_lng.lat,
            elevation: station.elevation,
        });
    }
}

impl StationSource for InMemorySource {
    fn query(&self, acds: &[Acd], coord: &LatLng, start: NaiveDate, end: NaiveDate) -> HashMap<Acd, Vec<f64>> {
        let mut out = HashMap::new();
        if end < start { return out; }
        let key = coord_key(coord);
        let Some(rows_by_acd) = self.series.get(&key) else { return out; };
        let raw_maps: HashMap<Acd, HashMap<NaiveDate, f64>> = rows_by_acd.iter()
            .map(|(&acd, rows)| (acd, rows.iter().cloned().collect()))
            .collect();
        let ctx = self.station_ctx.get(&key).copied().unwrap_or(DerivationContext {
            location_class: LocationClass::default(),
            latitude: coord.lat,
            elevation: 0.0,
        });
        for &acd in acds {
            let mut col = Vec::new();
            let functor = self.functors.get(&acd);
            let mut d = start;
            while d <= end {
                use chrono::Datelike;
                if !(d.month() == 2 && d.day() == 29) {
                    let v = if let Some(functor) = functor {
                        let raw_row: HashMap<Acd, f64> = raw_maps.iter()
                            .filter_map(|(&a, m)| m.get(&d).map(|&v| (a, v)))
                            .collect();
                        functor(&raw_row, d, &ctx)
                    } else {
                        raw_maps.get(&acd).and_then(|m| m.get(&d)).copied().unwrap_or(0.0)
                    };
                    col.push(v);
                }
                d = d.succ_opt().unwrap();
            }
            out.insert(acd, col);
        }
        out
    }

    fn year_range(&self) -> (i32, i32) { self.year_range }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{functor_table_for_simulation, ThresholdVariant};

    #[test]
    fn no_functors_passes_raw_columns_through() {
        let coord = LatLng::new(50.0, 10.0);
        let mut source = InMemorySource::new((2000, 2000));
        let d = NaiveDate::from_ymd_opt(2000, 6, 1).unwrap();
        source.insert_row(&coord, Acd::Precip, d, 10.0);
        let cols = source.query(&[Acd::Precip], &coord, d, d);
        assert_eq!(cols[&Acd::Precip][0], 10.0);
    }

    #[test]
    fn wettreg_functor_table_corrects_precip_on_the_query_path() {
        let coord = LatLng::new(50.0, 10.0);
        let mut source = InMemorySource::new((2000, 2000));
        let d = NaiveDate::from_ymd_opt(2000, 6, 1).unwrap();
        source.insert_row(&coord, Acd::Precip, d, 10.0);
        source.insert_row(&coord, Acd::Tavg, d, 5.0);
        source.set_functors(functor_table_for_simulation("wettreg2006"));
        let mut station = Station::new(1, "S", "s", coord, 100.0);
        station.location_class = LocationClass::Flat;
        source.register_station(&station);

        let raw_cols = {
            let mut raw_source = InMemorySource::new((2000, 2000));
            raw_source.insert_row(&coord, Acd::Precip, d, 10.0);
            raw_source.query(&[Acd::Precip], &coord, d, d)
        };
        let corrected_cols = source.query(&[Acd::Precip], &coord, d, d);

        assert_eq!(raw_cols[&Acd::Precip][0], 10.0);
        assert!(corrected_cols[&Acd::Precip][0] > 10.0, "precip correction functor must run on the query path");
        assert_eq!(
            corrected_cols[&Acd::Precip][0],
            crate::derive::correct_precipitation(10.0, 5.0, 6, LocationClass::Flat, ThresholdVariant::General),
        );
    }
}
