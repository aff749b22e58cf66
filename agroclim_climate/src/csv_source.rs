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

//! a flat-file `StationSource` implementor for the CLI (§10.4): one CSV of station
//! metadata and one CSV of daily observations, which is as close as this repository
//! gets to a concrete "backing-store adapter" (§6) without a real database client.
//! Grounded in the DD-server row loader (`station::load_dd_stations`) for the station
//! file shape; the series file is this repository's own simplification since the
//! distilled spec leaves the tabular archive's exact column layout unspecified.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::acd::Acd;
use crate::errors::Result;
use crate::simulation::{ScenarioSpec, Simulation};
use crate::source::InMemorySource;
use crate::station::Station;
use agroclim_common::LatLng;

fn parse_acd(name: &str) -> Option<Acd> {
    match name.to_ascii_lowercase().as_str() {
        "tmin" => Some(Acd::Tmin),
        "tmax" => Some(Acd::Tmax),
        "tavg" => Some(Acd::Tavg),
        "precip" => Some(Acd::Precip),
        "preciporig" | "precip_orig" => Some(Acd::PrecipOrig),
        "globrad" => Some(Acd::Globrad),
        "relhumid" => Some(Acd::Relhumid),
        "wind" => Some(Acd::Wind),
        "sunhours" => Some(Acd::Sunhours),
        "cloudamount" | "cloud_amount" => Some(Acd::CloudAmount),
        _ => None,
    }
}

/// reads `id,name,db_key,lat,lng,elevation` rows (header required) into `Station`s.
pub fn load_stations_csv(path: &Path) -> Result<Vec<Station>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for record in reader.deserialize() {
        let row: StationRow = record?;
        out.push(Station::new(row.id, row.name, row.db_key, LatLng::new(row.lat, row.lng), row.elevation.unwrap_or(0.0)));
    }
    Ok(out)
}

#[derive(serde::Deserialize)]
struct StationRow {
    id: i64,
    name: String,
    db_key: String,
    lat: f64,
    lng: f64,
    elevation: Option<f64>,
}

#[derive(serde::Deserialize)]
struct SeriesRow {
    station_id: i64,
    date: String,
    acd: String,
    value: f64,
}

/// reads `station_id,date,acd,value` rows (header required; `date` is `YYYY-MM-DD`) and
/// assembles an `InMemorySource` keyed by each referenced station's coordinate.
pub fn load_series_csv(path: &Path, stations: &[Station], year_range: (i32, i32)) -> Result<InMemorySource> {
    let coord_by_id: HashMap<i64, LatLng> = stations.iter().map(|s| (s.id, s.lat_lng)).collect();
    let mut reader = csv::Reader::from_path(path)?;
    let mut source = InMemorySource::new(year_range);
    for record in reader.deserialize() {
        let row: SeriesRow = record?;
        let Some(&coord) = coord_by_id.get(&row.station_id) else {
            tracing::warn!(station_id = row.station_id, "series row references unknown station, skipping");
            continue;
        };
        let Some(acd) = parse_acd(&row.acd) else {
            tracing::warn!(acd = %row.acd, "unrecognized ACD column in series file, skipping row");
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d") else {
            tracing::warn!(date = %row.date, "unparseable date in series file, skipping row");
            continue;
        };
        source.insert_row(&coord, acd, date, row.value);
    }
    Ok(source)
}

/// builds a single-scenario, single-realization `Simulation` from a station file and a
/// series file (§4.1/§4.5's "opens a backing-store connection", flattened to two CSVs).
/// Wires up the §4.5 derivation functor table for `id` (the per-simulation-id switch) and
/// registers every station's location class/elevation so the functors have context.
pub fn build_simulation_from_csv(id: impl Into<String>, name: impl Into<String>, stations_path: &Path, series_path: &Path, year_range: (i32, i32)) -> Result<Simulation> {
    let id = id.into();
    let stations = load_stations_csv(stations_path)?;
    let mut source = load_series_csv(series_path, &stations, year_range)?;
    source.set_functors(crate::derive::functor_table_for_simulation(&id));
    for station in &stations {
        source.register_station(station);
    }
    Ok(Simulation::build(
        id,
        name,
        stations,
        vec![ScenarioSpec { id: "observed".into(), name: "Observed".into(), realizations: vec![("r1".into(), "Realization 1".into())] }],
        Arc::new(source),
        Some("observed".to_string()),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("agroclim_csv_test_{}_{name}", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn builds_simulation_from_station_and_series_files() {
        let stations_path = write_temp("stations.csv", "id,name,db_key,lat,lng,elevation\n1,Potsdam,potsdam,52.38,13.06,81.0\n");
        let series_path = write_temp("series.csv", "station_id,date,acd,value\n1,2000-01-01,tavg,3.5\n1,2000-01-02,tavg,4.0\n");

        let sim = build_simulation_from_csv("demo", "Demo", &stations_path, &series_path, (2000, 2000)).unwrap();
        assert_eq!(sim.stations().len(), 1);

        let real = sim.scenarios()[0].realizations()[0];
        let da = real.data_accessor_for(&[Acd::Tavg], &LatLng::new(52.38, 13.06), NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), NaiveDate::from_ymd_opt(2000, 1, 2).unwrap());
        assert_eq!(da.get(Acd::Tavg).unwrap(), &vec![3.5, 4.0]);

        let _ = std::fs::remove_file(&stations_path);
        let _ = std::fs::remove_file(&series_path);
    }

    #[test]
    fn wettreg2006_simulation_id_corrects_precip_through_the_full_csv_pipeline() {
        let stations_path = write_temp("wr_stations.csv", "id,name,db_key,lat,lng,elevation\n1,Potsdam,potsdam,52.38,13.06,81.0\n");
        let series_path = write_temp("wr_series.csv", "station_id,date,acd,value\n1,2000-06-01,precip,10.0\n1,2000-06-01,tavg,5.0\n");

        let sim = build_simulation_from_csv("wettreg2006", "WettReg 2006", &stations_path, &series_path, (2000, 2000)).unwrap();
        let real = sim.scenarios()[0].realizations()[0];
        let da = real.data_accessor_for(
            &[Acd::Precip],
            &LatLng::new(52.38, 13.06),
            NaiveDate::from_ymd_opt(2000, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2000, 6, 1).unwrap(),
        );
        let corrected = da.get(Acd::Precip).unwrap()[0];
        assert!(corrected > 10.0, "wettreg2006 simulations must run precip correction, got {corrected}");

        let _ = std::fs::remove_file(&stations_path);
        let _ = std::fs::remove_file(&series_path);
    }
}
