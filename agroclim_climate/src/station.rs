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

use serde::{Serialize, Deserialize};
use agroclim_common::LatLng;

/// precipitation-correction "location class", named `SL` (flat/lightHills/mediumHills/
/// strongHills) in the original WettReg/CLM source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocationClass {
    Flat,
    LightHills,
    #[default]
    MediumHills,
    StrongHills,
}

/// a climate station: a point with an id, a human-readable name, a backend row key,
/// a position, an elevation, and a precipitation location class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub db_key: String,
    pub location_class: LocationClass,
    pub lat_lng: LatLng,
    /// height above NN in meters; missing elevation in the backing store is treated as 0.0
    pub elevation: f64,
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}
impl Eq for Station {}

impl Station {
    pub fn new(id: i64, name: impl Into<String>, db_key: impl Into<String>, lat_lng: LatLng, elevation: f64) -> Self {
        Station { id, name: name.into(), db_key: db_key.into(), location_class: LocationClass::default(), lat_lng, elevation }
    }
}

/// the five corrupt WettReg-2006 station ids that are excluded unconditionally (S6).
pub const WETTREG_2006_EXCLUDED_IDS: [i64; 5] = [283, 385, 1120, 1623, 1861];

/// one row as it comes back from the "DD climate-data server" header/stationlist join,
/// before the station-filter rules in §4.2 are applied. Lat/lng/elevation are kept as
/// raw strings because the backing store may encode decimals with a comma.
#[derive(Debug, Clone)]
pub struct RawStationRow {
    pub id: i64,
    pub name: String,
    pub db_key: String,
    pub lat: String,
    pub lng: String,
    /// missing elevation in the backing store is treated as 0.0 (§4.2)
    pub elevation: Option<String>,
    pub climate_capable: bool,
}

/// parses a decimal that may use a comma as the fractional separator; detection of
/// which convention is in force happens once, on the first row, by the caller.
fn parse_decimal(raw: &str, comma_decimal: bool) -> f64 {
    if comma_decimal {
        raw.replace(',', ".").parse().unwrap_or(0.0)
    } else {
        raw.parse().unwrap_or(0.0)
    }
}

/// the DD climate-data server station loader (§4.2): filters by climate-capable flag,
/// excludes station ids present in an error-table, and — for WettReg-2006 — additionally
/// excludes the hardcoded `WETTREG_2006_EXCLUDED_IDS` (S6). Comma-decimal lat/lng encoding
/// is detected once on the first row and applied uniformly to the whole batch.
pub fn load_dd_stations(rows: &[RawStationRow], error_table_ids: &[i64], is_wettreg_2006: bool) -> Vec<Station> {
    let comma_decimal = rows.first().map(|r| r.lat.contains(',')).unwrap_or(false);

    rows.iter()
        .filter(|r| r.climate_capable)
        .filter(|r| !error_table_ids.contains(&r.id))
        .filter(|r| !(is_wettreg_2006 && WETTREG_2006_EXCLUDED_IDS.contains(&r.id)))
        .map(|r| {
            let lat = parse_decimal(&r.lat, comma_decimal);
            let lng = parse_decimal(&r.lng, comma_decimal);
            let elevation = r.elevation.as_deref()
                .map(|s| parse_decimal(s, comma_decimal))
                .unwrap_or(0.0);
            Station::new(r.id, r.name.clone(), r.db_key.clone(), LatLng::new(lat, lng), elevation)
        })
        .collect()
}

/// case-insensitive substring search over a list of stations, first match by display order.
pub fn find_station_by_name_substr<'a>(stations: &'a [Station], needle: &str) -> Option<&'a Station> {
    let needle_lc = needle.to_lowercase();
    stations.iter().find(|s| s.name.to_lowercase().contains(&needle_lc))
}

/// nearest station to `coord` by euclidean distance in lat-lng degree space (exact match
/// is the degenerate case where distance is zero).
pub fn closest_station<'a>(stations: &'a [Station], coord: &LatLng) -> Option<&'a Station> {
    stations.iter().min_by(|a, b| {
        a.lat_lng.distance(coord).partial_cmp(&b.lat_lng.distance(coord)).unwrap()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stations() -> Vec<Station> {
        vec![
            Station::new(1, "Müncheberg", "MB1", LatLng::new(52.5, 14.1), 60.0),
            Station::new(2, "Berlin-Dahlem", "BD1", LatLng::new(52.45, 13.3), 50.0),
        ]
    }

    #[test]
    fn case_insensitive_substring_search_s4() {
        let stations = sample_stations();
        let found = find_station_by_name_substr(&stations, "münch").unwrap();
        assert_eq!(found.name, "Müncheberg");
    }

    #[test]
    fn closest_station_picks_nearest() {
        let stations = sample_stations();
        let found = closest_station(&stations, &LatLng::new(52.46, 13.31)).unwrap();
        assert_eq!(found.id, 2);
    }

    fn wettreg_rows() -> Vec<RawStationRow> {
        let mut rows: Vec<RawStationRow> = (1..=6).map(|id| RawStationRow {
            id,
            name: format!("Station {id}"),
            db_key: format!("S{id}"),
            lat: "52,5".to_string(),
            lng: "13,4".to_string(),
            elevation: Some("50,0".to_string()),
            climate_capable: true,
        }).collect();
        rows.push(RawStationRow {
            id: 283,
            name: "Corrupt".to_string(),
            db_key: "S283".to_string(),
            lat: "50,0".to_string(),
            lng: "10,0".to_string(),
            elevation: None,
            climate_capable: true,
        });
        rows
    }

    #[test]
    fn wettreg_2006_excludes_hardcoded_ids_s6() {
        let stations = load_dd_stations(&wettreg_rows(), &[], true);
        assert!(stations.iter().all(|s| !WETTREG_2006_EXCLUDED_IDS.contains(&s.id)));
        assert!(stations.iter().any(|s| s.id == 1));
    }

    #[test]
    fn other_products_keep_non_excluded_ids() {
        let stations = load_dd_stations(&wettreg_rows(), &[], false);
        assert!(stations.iter().any(|s| s.id == 283));
    }

    #[test]
    fn comma_decimal_lat_lng_detected_and_parsed() {
        let stations = load_dd_stations(&wettreg_rows(), &[], false);
        let s = stations.iter().find(|s| s.id == 1).unwrap();
        assert!((s.lat_lng.lat - 52.5).abs() < 1e-9);
        assert!((s.lat_lng.lng - 13.4).abs() < 1e-9);
        assert!((s.elevation - 50.0).abs() < 1e-9);
    }

    #[test]
    fn missing_elevation_treated_as_zero() {
        let stations = load_dd_stations(&wettreg_rows(), &[], false);
        let s = stations.iter().find(|s| s.id == 283).unwrap();
        assert_eq!(s.elevation, 0.0);
    }

    #[test]
    fn error_table_ids_excluded() {
        let stations = load_dd_stations(&wettreg_rows(), &[1, 2], false);
        assert!(!stations.iter().any(|s| s.id == 1 || s.id == 2));
    }
}
