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

//! command-line front-end over the climate-data access and regionalization cores (§10.4).

mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use agroclim_climate::{init_climate_data_manager, Acd, DataAccessor, Simulation};
use agroclim_common::{CoordSystem, LatLng, RcPoint};
use agroclim_raster::ascii::write_ascii_grid;
use agroclim_region::{CacheInfo, Env};

#[derive(Parser)]
#[command(name = "agroclim", about = "agro-ecological climate-data access and regionalization")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// list enabled simulations
    Simulations,
    /// list a simulation's stations
    Stations { simulation: String },
    /// print a realization's data accessor as CSV rows
    Series {
        simulation: String,
        scenario: String,
        realization: String,
        station: String,
        /// comma-separated ACD names, e.g. "tmin,tmax,tavg"
        acds: String,
        from: NaiveDate,
        to: NaiveDate,
    },
    /// run the regionalizer over a DEM and write one ASCII grid per year
    Regionalize {
        simulation: String,
        scenario: String,
        dem_path: PathBuf,
        from_year: i32,
        to_year: i32,
        /// directory ASCII grid outputs are written to, one per year/realization
        #[arg(long, default_value = "regionalized")]
        out_dir: PathBuf,
    },
}

fn parse_acds(csv_list: &str) -> Result<Vec<Acd>> {
    csv_list
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| acd_from_str(s).ok_or_else(|| anyhow!("unrecognized ACD: {s}")))
        .collect()
}

fn acd_from_str(name: &str) -> Option<Acd> {
    match name.to_ascii_lowercase().as_str() {
        "tmin" => Some(Acd::Tmin),
        "tmax" => Some(Acd::Tmax),
        "tavg" => Some(Acd::Tavg),
        "precip" => Some(Acd::Precip),
        "preciporig" => Some(Acd::PrecipOrig),
        "globrad" => Some(Acd::Globrad),
        "relhumid" => Some(Acd::Relhumid),
        "wind" => Some(Acd::Wind),
        "sunhours" => Some(Acd::Sunhours),
        "cloudamount" => Some(Acd::CloudAmount),
        _ => None,
    }
}

/// the one lat-lng -> projected-coordinate conversion this binary needs (§1 scope
/// boundary leaves the real conversion to the caller); a flat degrees-to-meters
/// scaling is enough to drive the regionalizer end-to-end against a DEM in the same
/// made-up planar system, without pulling in a full projection library.
fn simple_projector() -> agroclim_region::Projector {
    Arc::new(|ll: &LatLng| RcPoint::new(ll.lng * 100_000.0, ll.lat * 100_000.0, CoordSystem::Utm32N))
}

fn print_data_accessor(acds: &[Acd], da: &DataAccessor, from: NaiveDate, to: NaiveDate) {
    println!("date,{}", acds.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(","));
    let days = (to - from).num_days();
    for offset in 0..=days {
        let date = from + chrono::Duration::days(offset);
        let idx = offset as usize;
        let row: Vec<String> = acds
            .iter()
            .map(|acd| {
                da.get(*acd)
                    .and_then(|v| v.get(idx))
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        println!("{date},{}", row.join(","));
    }
}

fn load_simulations() -> Result<Arc<agroclim_climate::SimulationRegistry>> {
    let cli_config = config::load_cli_config().context("loading agroclim.ron")?;
    let (registry_config, factories) = config::registry_inputs(&cli_config);
    Ok(init_climate_data_manager(&registry_config, factories))
}

fn find_simulation<'r>(registry: &'r agroclim_climate::SimulationRegistry, id: &str) -> Result<&'r Simulation> {
    registry
        .all_simulations()
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| anyhow!("unknown simulation: {id}"))
}

fn annual_mean_reducer(acds: Vec<Acd>) -> agroclim_region::Reducer {
    Arc::new(move |da: &DataAccessor| {
        let mut out = BTreeMap::new();
        for (idx, acd) in acds.iter().enumerate() {
            let values = da.get(*acd).cloned().unwrap_or_default();
            let mean = if values.is_empty() { 0.0 } else { values.iter().sum::<f64>() / values.len() as f64 };
            out.insert(idx as i64, mean);
        }
        out
    })
}

fn run_regionalize(registry: &agroclim_climate::SimulationRegistry, simulation: &str, scenario: &str, dem_path: &PathBuf, from_year: i32, to_year: i32, out_dir: &PathBuf) -> Result<()> {
    let sim = find_simulation(registry, simulation)?;
    let scen = sim
        .scenario_by_id(scenario)
        .or_else(|| sim.scenario(scenario))
        .ok_or_else(|| anyhow!("unknown scenario: {scenario}"))?;
    let realizations = scen.realizations();
    if realizations.is_empty() {
        return Err(anyhow!("scenario {scenario} has no realizations"));
    }

    let dem = agroclim_raster::ascii::read_ascii_grid(dem_path, CoordSystem::Utm32N)
        .with_context(|| format!("reading DEM {}", dem_path.display()))?;

    let acds = vec![Acd::Tavg];
    let reducer = annual_mean_reducer(acds.clone());
    let mut env = Env::new(dem, acds, from_year, to_year, realizations, 0, reducer, simple_projector());
    env.cache_info = CacheInfo { persist: true, result_ids: vec![0], ..CacheInfo::default() };
    if let Ok(root) = agroclim_region::regionalize::resolve_cache_root(&env.cache_info) {
        env.cache_info.root_path = root;
    }

    let results = agroclim_region::regionalize(&env);
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    for (result_id, by_year) in &results {
        for (year, grids) in by_year {
            for (real_idx, grid) in grids.iter().enumerate() {
                let path = out_dir.join(format!("{simulation}_{scenario}_{result_id}_{real_idx}_{year}.asc"));
                write_ascii_grid(&path, grid).with_context(|| format!("writing {}", path.display()))?;
                println!("wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let registry = load_simulations()?;

    match cli.command {
        Command::Simulations => {
            for sim in registry.all_simulations() {
                println!("{}\t{}", sim.id, sim.name);
            }
        }
        Command::Stations { simulation } => {
            let sim = find_simulation(&registry, &simulation)?;
            for station in sim.stations() {
                println!("{}\t{}\t{}\t{:.3}", station.id, station.name, station.lat_lng, station.elevation);
            }
        }
        Command::Series { simulation, scenario, realization, station, acds, from, to } => {
            let sim = find_simulation(&registry, &simulation)?;
            let scen = sim.scenario_by_id(&scenario).or_else(|| sim.scenario(&scenario)).ok_or_else(|| anyhow!("unknown scenario: {scenario}"))?;
            let real = scen.realization(&realization).ok_or_else(|| anyhow!("unknown realization: {realization}"))?;
            let acd_list = parse_acds(&acds)?;
            let da = real.data_accessor_for_station(&acd_list, &station, from, to);
            print_data_accessor(&acd_list, &da, from, to);
        }
        Command::Regionalize { simulation, scenario, dem_path, from_year, to_year, out_dir } => {
            run_regionalize(&registry, &simulation, &scenario, &dem_path, from_year, to_year, &out_dir)?;
        }
    }
    Ok(())
}
