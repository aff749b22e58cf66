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

//! the per-realization time-series cache (§4.3) — the sharp edge of the design.
//! One mutex per realization guards a `Map[closestStationCoord -> PerVarCache[]]`;
//! `fill_cache_for` extends each variable's contiguous window by the minimal amount
//! needed to cover a requested range, grouping variables that share an identical
//! existing window into a single backing-store query.

use std::collections::HashMap;
use std::sync::Mutex;
use chrono::NaiveDate;
use agroclim_common::LatLng;
use tracing::debug;

use crate::acd::Acd;
use crate::caldate::{days_between_no_leap, days_in_range_no_leap};
use crate::source::StationSource;

/// one variable's contiguous cached window at one location.
#[derive(Debug, Clone, Default)]
pub struct PerVarCacheEntry {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    values: Vec<f64>,
    /// stable anchor indices previously handed out via `offset_for`; adjusted in place
    /// whenever the cache is extended to the left.
    offsets: Vec<i64>,
}

impl PerVarCacheEntry {
    pub fn is_initialized(&self) -> bool { self.start_date.is_some() }

    /// index of `date` relative to `start_date`, or `None` if uninitialized.
    pub fn offset_for(&self, date: NaiveDate) -> Option<i64> {
        self.start_date.map(|s| days_between_no_leap(s, date))
    }

    /// registers a new stable offset handle for `date`, returning its index into `offsets`.
    pub fn new_offset_index_for(&mut self, date: NaiveDate) -> usize {
        let delta = self.offset_for(date).unwrap_or(0).max(0);
        self.offsets.push(delta);
        self.offsets.len() - 1
    }

    pub fn offset_at(&self, handle: usize) -> i64 { self.offsets[handle] }

    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> Vec<f64> {
        let Some(s) = self.start_date else { return Vec::new(); };
        let from = days_between_no_leap(s, start).max(0) as usize;
        let n = days_in_range_no_leap(start, end).max(0) as usize;
        self.values[from..(from + n).min(self.values.len())].to_vec()
    }
}

/// a value-type view over a requested `[startDate, endDate]` slice of one or more
/// variables. Safe to outlive the cache mutation that produced it (§3: DataAccessor).
#[derive(Debug, Clone)]
pub struct DataAccessor {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    data: HashMap<Acd, Vec<f64>>,
}

impl DataAccessor {
    pub fn empty() -> Self { DataAccessor { start_date: None, end_date: None, data: HashMap::new() } }

    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        DataAccessor { start_date: Some(start_date), end_date: Some(end_date), data: HashMap::new() }
    }

    pub fn add(&mut self, acd: Acd, values: Vec<f64>) { self.data.insert(acd, values); }

    pub fn get(&self, acd: Acd) -> Option<&Vec<f64>> { self.data.get(&acd) }

    pub fn is_empty(&self) -> bool { self.start_date.is_none() }

    pub fn len(&self) -> usize {
        match (self.start_date, self.end_date) {
            (Some(s), Some(e)) => days_in_range_no_leap(s, e).max(0) as usize,
            _ => 0,
        }
    }

    /// a `yearSlice`-wide sub-accessor beginning at `year` (§4.4 step 1)
    pub fn sub_year(&self, year: i32, year_slice: i32) -> DataAccessor {
        let Some(from) = NaiveDate::from_ymd_opt(year, 1, 1) else { return DataAccessor::empty(); };
        let Some(to) = NaiveDate::from_ymd_opt(year + year_slice - 1, 12, 31) else { return DataAccessor::empty(); };
        let (Some(s), Some(e)) = (self.start_date, self.end_date) else { return DataAccessor::empty(); };
        if from < s || to > e { return DataAccessor::empty(); }
        let mut out = DataAccessor::new(from, to);
        for (acd, _) in self.data.iter() {
            let start_off = days_between_no_leap(s, from).max(0) as usize;
            let n = days_in_range_no_leap(from, to).max(0) as usize;
            if let Some(v) = self.data.get(acd) {
                out.add(*acd, v[start_off..(start_off + n).min(v.len())].to_vec());
            }
        }
        out
    }
}

fn station_key(coord: &LatLng) -> (i64, i64) {
    ((coord.lat * 1_000_000.0).round() as i64, (coord.lng * 1_000_000.0).round() as i64)
}

/// `Map[closestStationCoord -> array-per-ACD of cache-entry]`, owned exclusively by
/// one `Realization`'s `(scenario, realization)` tuple.
#[derive(Default)]
pub struct RealizationCache {
    rows: Mutex<HashMap<(i64, i64), HashMap<Acd, PerVarCacheEntry>>>,
}

impl RealizationCache {
    pub fn new() -> Self { RealizationCache { rows: Mutex::new(HashMap::new()) } }

    /// after this returns, every variable in `acds` has a contiguous cache window
    /// covering `[sd, ed]` at `coord` (§4.3 invariant). Holds the realization's mutex
    /// for the duration of the merge.
    pub fn fill_cache_for(&self, source: &dyn StationSource, acds: &[Acd], coord: &LatLng, sd: NaiveDate, ed: NaiveDate) {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(station_key(coord)).or_default();

        // 1. partition into covered / not-covered
        let not_covered: Vec<Acd> = acds.iter().copied().filter(|acd| {
            match row.get(acd) {
                Some(e) if e.is_initialized() => !(e.start_date.unwrap() <= sd && ed <= e.end_date.unwrap()),
                _ => true,
            }
        }).collect();
        if not_covered.is_empty() { return; }

        // 2. group by current (start,end); uninitialized entries group under `None`
        let mut groups: HashMap<Option<(NaiveDate, NaiveDate)>, Vec<Acd>> = HashMap::new();
        for acd in not_covered {
            let key = row.get(&acd).and_then(|e| match (e.start_date, e.end_date) {
                (Some(s), Some(e2)) => Some((s, e2)),
                _ => None,
            });
            groups.entry(key).or_default().push(acd);
        }

        // 3+4. compute the minimal extension window(s) per group and issue one query per
        // side actually needed — growing on both sides of an existing window issues a
        // left query and a right query rather than one spanning query that would
        // re-fetch the already-cached middle (§8 property 2).
        for (key, group_acds) in groups {
            if key.is_none() {
                debug!(?group_acds, %sd, %ed, "filling new per-realization cache window");
                let cols = source.query(&group_acds, coord, sd, ed);
                for acd in &group_acds {
                    let entry = row.entry(*acd).or_default();
                    entry.values = cols.get(acd).cloned().unwrap_or_default();
                    entry.start_date = Some(sd);
                    entry.end_date = Some(ed);
                }
                continue;
            }
            let (existing_start, existing_end) = key.unwrap();

            if sd < existing_start {
                let query_sd = sd;
                let query_ed = existing_start - chrono::Duration::days(1);
                debug!(?group_acds, %query_sd, %query_ed, "extending per-realization cache to the left");
                let cols = source.query(&group_acds, coord, query_sd, query_ed);
                for acd in &group_acds {
                    let entry = row.entry(*acd).or_default();
                    let ds = cols.get(acd).cloned().unwrap_or_default();
                    let shift = ds.len() as i64;
                    for o in entry.offsets.iter_mut() { *o += shift; }
                    let mut new_values = ds;
                    new_values.extend_from_slice(&entry.values);
                    entry.values = new_values;
                    entry.start_date = Some(query_sd);
                }
            }
            if ed > existing_end {
                let query_sd = existing_end + chrono::Duration::days(1);
                let query_ed = ed;
                debug!(?group_acds, %query_sd, %query_ed, "extending per-realization cache to the right");
                let cols = source.query(&group_acds, coord, query_sd, query_ed);
                for acd in &group_acds {
                    let entry = row.entry(*acd).or_default();
                    let ds = cols.get(acd).cloned().unwrap_or_default();
                    entry.values.extend_from_slice(&ds);
                    entry.end_date = Some(query_ed);
                }
            }
        }
    }

    /// slice the cache for `acds` at `coord` over `[sd, ed]` into a fresh `DataAccessor`.
    /// Callers must have already ensured coverage via `fill_cache_for`.
    pub fn data_accessor_for(&self, acds: &[Acd], coord: &LatLng, sd: NaiveDate, ed: NaiveDate) -> DataAccessor {
        let rows = self.rows.lock().unwrap();
        let mut out = DataAccessor::new(sd, ed);
        if let Some(row) = rows.get(&station_key(coord)) {
            for acd in acds {
                if let Some(entry) = row.get(acd) {
                    out.add(*acd, entry.slice(sd, ed));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

    /// wraps a `StationSource`, counting the no-leap days actually queried, to verify
    /// `fill_cache_for` never re-fetches an already-cached range (§8 property 2).
    struct CountingSource {
        inner: InMemorySource,
        fetched_days: AtomicI64,
    }

    impl StationSource for CountingSource {
        fn query(&self, acds: &[Acd], coord: &LatLng, start: NaiveDate, end: NaiveDate) -> HashMap<Acd, Vec<f64>> {
            self.fetched_days.fetch_add(days_in_range_no_leap(start, end).max(0), Ordering::SeqCst);
            self.inner.query(acds, coord, start, end)
        }
        fn year_range(&self) -> (i32, i32) { self.inner.year_range() }
    }

    #[test]
    fn cache_contiguity_and_minimality_s3() {
        let coord = LatLng::new(52.5, 13.4);
        let mut source = InMemorySource::new((1990, 2020));
        source.fill_constant(&coord, Acd::Tmin, d(1999, 1, 1), d(2000, 12, 31), 1.0);
        let cache = RealizationCache::new();

        cache.fill_cache_for(&source, &[Acd::Tmin], &coord, d(2000, 1, 1), d(2000, 1, 31));
        {
            let rows = cache.rows.lock().unwrap();
            let entry = rows.get(&station_key(&coord)).unwrap().get(&Acd::Tmin).unwrap();
            assert_eq!(entry.start_date, Some(d(2000, 1, 1)));
            assert_eq!(entry.end_date, Some(d(2000, 1, 31)));
            assert_eq!(entry.values.len(), 31);
        }

        cache.fill_cache_for(&source, &[Acd::Tmin], &coord, d(2000, 1, 10), d(2000, 2, 15));
        {
            let rows = cache.rows.lock().unwrap();
            let entry = rows.get(&station_key(&coord)).unwrap().get(&Acd::Tmin).unwrap();
            assert_eq!(entry.start_date, Some(d(2000, 1, 1)));
            assert_eq!(entry.end_date, Some(d(2000, 2, 15)));
            // contiguity: size matches the no-leap day count of the full window
            assert_eq!(entry.values.len() as i64, days_in_range_no_leap(d(2000, 1, 1), d(2000, 2, 15)));
        }
    }

    #[test]
    fn offset_stability_across_left_extension() {
        let coord = LatLng::new(10.0, 10.0);
        let mut source = InMemorySource::new((1990, 2020));
        source.fill_constant(&coord, Acd::Tmax, d(2000, 1, 1), d(2000, 3, 1), 5.0);
        let cache = RealizationCache::new();

        cache.fill_cache_for(&source, &[Acd::Tmax], &coord, d(2000, 1, 20), d(2000, 1, 31));
        let handle;
        {
            let mut rows = cache.rows.lock().unwrap();
            let entry = rows.get_mut(&station_key(&coord)).unwrap().get_mut(&Acd::Tmax).unwrap();
            handle = entry.new_offset_index_for(d(2000, 1, 25));
        }

        // extend to the left
        cache.fill_cache_for(&source, &[Acd::Tmax], &coord, d(2000, 1, 1), d(2000, 1, 31));

        let rows = cache.rows.lock().unwrap();
        let entry = rows.get(&station_key(&coord)).unwrap().get(&Acd::Tmax).unwrap();
        let new_offset = entry.offset_at(handle);
        let expected = days_between_no_leap(entry.start_date.unwrap(), d(2000, 1, 25));
        assert_eq!(new_offset, expected);
    }

    #[test]
    fn growing_both_sides_never_refetches_the_cached_middle_s3() {
        let coord = LatLng::new(48.0, 11.0);
        let mut inner = InMemorySource::new((1999, 2001));
        inner.fill_constant(&coord, Acd::Tmax, d(1999, 1, 1), d(2001, 12, 31), 7.0);
        let source = CountingSource { inner, fetched_days: AtomicI64::new(0) };
        let cache = RealizationCache::new();

        cache.fill_cache_for(&source, &[Acd::Tmax], &coord, d(2000, 2, 1), d(2000, 2, 10));
        assert_eq!(source.fetched_days.load(Ordering::SeqCst), days_in_range_no_leap(d(2000, 2, 1), d(2000, 2, 10)));

        // grow on both sides at once; the already-cached Feb 1-10 window must not be re-fetched.
        cache.fill_cache_for(&source, &[Acd::Tmax], &coord, d(2000, 1, 1), d(2000, 3, 1));

        let total_union_days = days_in_range_no_leap(d(2000, 1, 1), d(2000, 3, 1));
        assert_eq!(source.fetched_days.load(Ordering::SeqCst), total_union_days, "total fetched must equal the union of requested ranges, never more");

        let rows = cache.rows.lock().unwrap();
        let entry = rows.get(&station_key(&coord)).unwrap().get(&Acd::Tmax).unwrap();
        assert_eq!(entry.start_date, Some(d(2000, 1, 1)));
        assert_eq!(entry.end_date, Some(d(2000, 3, 1)));
        assert_eq!(entry.values.len() as i64, total_union_days);
    }

    #[test]
    fn accessor_independence() {
        let coord = LatLng::new(1.0, 1.0);
        let mut source = InMemorySource::new((1990, 2020));
        source.fill_constant(&coord, Acd::Precip, d(2000, 1, 1), d(2000, 1, 31), 2.0);
        let cache = RealizationCache::new();
        cache.fill_cache_for(&source, &[Acd::Precip], &coord, d(2000, 1, 1), d(2000, 1, 31));
        let accessor = cache.data_accessor_for(&[Acd::Precip], &coord, d(2000, 1, 1), d(2000, 1, 31));

        // mutate the cache after the accessor was handed out
        cache.fill_cache_for(&source, &[Acd::Precip], &coord, d(2000, 2, 1), d(2000, 2, 28));

        assert_eq!(accessor.get(Acd::Precip).unwrap().len(), 31);
        assert!(accessor.get(Acd::Precip).unwrap().iter().all(|&v| v == 2.0));
    }
}
