#![allow(unused)]
pub mod errors;
pub mod acd;
pub mod station;
pub mod caldate;
pub mod source;
pub mod cache;
pub mod derive;
pub mod simulation;
pub mod csv_source;

pub use acd::{Acd, acd_set_label};
pub use station::{Station, LocationClass, WETTREG_2006_EXCLUDED_IDS, RawStationRow, find_station_by_name_substr, closest_station, load_dd_stations};
pub use cache::{DataAccessor, RealizationCache};
pub use source::{StationSource, InMemorySource};
pub use simulation::{
    Simulation, ScenarioSpec, ScenarioRef, RealizationRef, SimulationRegistry,
    RegistryConfig, SimulationFactory, load_registry, init_climate_data_manager, climate_data_manager,
};
pub use csv_source::{load_stations_csv, load_series_csv, build_simulation_from_csv};
