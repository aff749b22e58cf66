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

//! `[active-climate-db-schemas]`-equivalent RON config (§6, §10.3): which CSV-backed
//! simulations this CLI invocation enables, and where their flat files live.

use std::collections::HashMap;

use agroclim_build::Result;
use agroclim_climate::{build_simulation_from_csv, RegistryConfig, SimulationFactory};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = "(simulations: [])";

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationEntry {
    pub id: String,
    pub name: String,
    pub stations_csv: String,
    pub series_csv: String,
    pub from_year: i32,
    pub to_year: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    pub simulations: Vec<SimulationEntry>,
}

pub fn load_cli_config() -> Result<CliConfig> {
    agroclim_build::load_config("agroclim.ron", DEFAULT_CONFIG)
}

/// builds the `(RegistryConfig, factories)` pair `init_climate_data_manager` expects,
/// one factory per configured entry, each reading its CSVs lazily on first use.
pub fn registry_inputs(config: &CliConfig) -> (RegistryConfig, HashMap<String, Box<SimulationFactory>>) {
    let mut factories: HashMap<String, Box<SimulationFactory>> = HashMap::new();
    let mut active_schemas = Vec::new();
    for entry in &config.simulations {
        active_schemas.push(entry.id.clone());
        let entry = entry.clone();
        factories.insert(entry.id.clone(), Box::new(move || {
            let stations_path = std::path::Path::new(&entry.stations_csv);
            let series_path = std::path::Path::new(&entry.series_csv);
            match build_simulation_from_csv(entry.id.clone(), entry.name.clone(), stations_path, series_path, (entry.from_year, entry.to_year)) {
                Ok(sim) => Some(sim),
                Err(e) => {
                    tracing::warn!(id = %entry.id, error = %e, "failed to build simulation from csv");
                    None
                }
            }
        }));
    }
    (RegistryConfig { active_schemas }, factories)
}
