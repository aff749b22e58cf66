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

//! row-level variable-derivation pipeline (§4.5): precipitation correction by location
//! class, global-radiation reconstruction, and the Turc-Wendling agronomic helpers.

use lazy_static::lazy_static;
use std::collections::HashMap;
use chrono::{Datelike, NaiveDate};
use crate::station::LocationClass;
use crate::cache::DataAccessor;
use crate::acd::Acd;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecipType { RainSummer, RainWinter, Mixed, Snow }

/// Saxony uses a -0.4 mixed/snow threshold instead of the general -0.7 one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdVariant { General, Saxony }

pub fn classify_precip_type(tavg: f64, month: u32, variant: ThresholdVariant) -> PrecipType {
    let mixed_threshold = match variant { ThresholdVariant::General => -0.7, ThresholdVariant::Saxony => -0.4 };
    if tavg > 3.0 {
        if (4..=9).contains(&month) { PrecipType::RainSummer } else { PrecipType::RainWinter }
    } else if tavg >= mixed_threshold {
        PrecipType::Mixed
    } else {
        PrecipType::Snow
    }
}

lazy_static! {
    /// b coefficients keyed by (LocationClass, PrecipType), literal values from the
    /// original WettReg/CLM precipitation-correction tables.
    static ref B_KOEFF: HashMap<(LocationClass, PrecipType), f64> = {
        use LocationClass::*;
        use PrecipType::*;
        let mut m = HashMap::new();
        m.insert((Flat, RainSummer), 0.345); m.insert((Flat, RainWinter), 0.340); m.insert((Flat, Mixed), 0.535); m.insert((Flat, Snow), 0.720);
        m.insert((LightHills, RainSummer), 0.310); m.insert((LightHills, RainWinter), 0.280); m.insert((LightHills, Mixed), 0.390); m.insert((LightHills, Snow), 0.510);
        m.insert((MediumHills, RainSummer), 0.280); m.insert((MediumHills, RainWinter), 0.240); m.insert((MediumHills, Mixed), 0.305); m.insert((MediumHills, Snow), 0.330);
        m.insert((StrongHills, RainSummer), 0.245); m.insert((StrongHills, RainWinter), 0.190); m.insert((StrongHills, Mixed), 0.185); m.insert((StrongHills, Snow), 0.210);
        m
    };

    /// epsilon coefficients, independent of location class.
    static ref EPSILON_KOEFF: HashMap<PrecipType, f64> = {
        use PrecipType::*;
        let mut m = HashMap::new();
        m.insert(RainSummer, 0.38);
        m.insert(RainWinter, 0.46);
        m.insert(Mixed, 0.55);
        m.insert(Snow, 0.82);
        m
    };
}

/// `P' = P + b*P^epsilon`
pub fn correct_precipitation(precip: f64, tavg: f64, month: u32, location_class: LocationClass, variant: ThresholdVariant) -> f64 {
    if precip <= 0.0 { return precip; }
    let ptype = classify_precip_type(tavg, month, variant);
    let b = *B_KOEFF.get(&(location_class, ptype)).unwrap_or(&0.0);
    let epsilon = *EPSILON_KOEFF.get(&ptype).unwrap_or(&0.0);
    precip + b * precip.powf(epsilon)
}

/// Angstrom-Prescott reconstruction of daily global radiation from sunshine-hours.
/// Approximate form (original `algorithms.cpp` with the exact coefficients was not
/// among the retrieved source files — see DESIGN.md open-question log).
pub fn sunshine_to_global_radiation(day_of_year: u32, sun_hours: f64, latitude_deg: f64) -> f64 {
    let lat_rad = latitude_deg.to_radians();
    let decl = 0.4093 * (2.0 * std::f64::consts::PI * (284.0 + day_of_year as f64) / 365.0).sin();
    let ws = (-lat_rad.tan() * decl.tan()).clamp(-1.0, 1.0).acos();
    let daylength_hours = 24.0 / std::f64::consts::PI * ws;
    let extraterrestrial = 37.6 * (ws * lat_rad.sin() * decl.sin() + lat_rad.cos() * decl.cos() * ws.sin());
    let a = 0.25;
    let b = 0.50;
    let frac = if daylength_hours > 0.0 { (sun_hours / daylength_hours).clamp(0.0, 1.0) } else { 0.0 };
    extraterrestrial * (a + b * frac)
}

/// cloud-amount based reconstruction (REMO product), eighths of sky cover.
pub fn cloud_amount_to_global_radiation(day_of_year: u32, cloud_amount_eighths: f64, latitude_deg: f64, elevation: f64) -> f64 {
    let clear_sky = sunshine_to_global_radiation(day_of_year, 12.0, latitude_deg);
    let cloud_fraction = (cloud_amount_eighths / 8.0).clamp(0.0, 1.0);
    let attenuation = 1.0 - 0.75 * cloud_fraction.powf(3.4);
    let elevation_factor = 1.0 + elevation / 10_000.0;
    clear_sky * attenuation * elevation_factor
}

/// STAR's native global-radiation column is J/cm^2; divide by 100 to get MJ/m^2/d.
pub fn star_native_to_global_radiation(value_j_per_cm2: f64) -> f64 {
    value_j_per_cm2 / 100.0
}

/// Turc-Wendling potential evapotranspiration (mm/d) from tavg [C], globrad [MJ/m^2/d],
/// relhumid [%].
pub fn potential_evaporation_tw(data: &DataAccessor) -> Vec<f64> {
    let tavg = data.get(Acd::Tavg);
    let globrad = data.get(Acd::Globrad);
    let relhumid = data.get(Acd::Relhumid);
    let n = data.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let t = tavg.map(|v| v[i]).unwrap_or(0.0);
        let rg = globrad.map(|v| v[i]).unwrap_or(0.0);
        let rh = relhumid.map(|v| v[i]).unwrap_or(70.0);
        let rh_corr = 1.0 + (50.0 - rh) / 70.0;
        let corr = if rh < 50.0 { rh_corr.max(1.0) } else { 1.0 };
        let pet = (rg * (t + 22.0) / (150.0 * (t + 123.0))) * corr;
        out.push(pet.max(0.0));
    }
    out
}

/// daily climatic water balance: precip - potential evaporation (Turc-Wendling)
pub fn climatic_water_balance_tw(data: &DataAccessor) -> Vec<f64> {
    let precip = data.get(Acd::Precip);
    let pet = potential_evaporation_tw(data);
    let n = data.len();
    (0..n).map(|i| precip.map(|v| v[i]).unwrap_or(0.0) - pet[i]).collect()
}

/// per-station context a row functor needs beyond the raw same-date backing-store columns.
#[derive(Debug, Clone, Copy)]
pub struct DerivationContext {
    pub location_class: LocationClass,
    pub latitude: f64,
    pub elevation: f64,
}

/// one derived ACD's row-level functor (§4.5): the raw columns available for that date,
/// the date itself, and the station context in; the derived value out.
pub type RowFunc = Box<dyn Fn(&HashMap<Acd, f64>, NaiveDate, &DerivationContext) -> f64 + Send + Sync>;

/// the `ACD -> rowFunc` table a realization subtype wires up (§4.5).
pub type FunctorTable = HashMap<Acd, RowFunc>;

/// wraps `correct_precipitation` as a row functor reading `Precip`/`Tavg` from the raw row.
pub fn precip_correction_functor(variant: ThresholdVariant) -> RowFunc {
    Box::new(move |raw, date, ctx| {
        let precip = raw.get(&Acd::Precip).copied().unwrap_or(0.0);
        let tavg = raw.get(&Acd::Tavg).copied().unwrap_or(0.0);
        correct_precipitation(precip, tavg, date.month(), ctx.location_class, variant)
    })
}

/// which raw backing-store column a product's global-radiation reconstruction reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobradSource { SunHours, CloudAmount, StarNative }

/// wraps the matching `*_to_global_radiation` function as a row functor.
pub fn globrad_functor(source: GlobradSource) -> RowFunc {
    Box::new(move |raw, date, ctx| {
        let doy = date.ordinal();
        match source {
            GlobradSource::SunHours => {
                let sun = raw.get(&Acd::Sunhours).copied().unwrap_or(0.0);
                sunshine_to_global_radiation(doy, sun, ctx.latitude)
            }
            GlobradSource::CloudAmount => {
                let cloud = raw.get(&Acd::CloudAmount).copied().unwrap_or(0.0);
                cloud_amount_to_global_radiation(doy, cloud, ctx.latitude, ctx.elevation)
            }
            GlobradSource::StarNative => {
                let native = raw.get(&Acd::Globrad).copied().unwrap_or(0.0);
                star_native_to_global_radiation(native)
            }
        }
    })
}

/// the per-simulation-id switch (§4.5): which functor table a named product wires up.
/// Unrecognized ids get an empty table, so the backing-store adapter passes raw columns
/// through unchanged.
pub fn functor_table_for_simulation(sim_id: &str) -> FunctorTable {
    let mut table: FunctorTable = HashMap::new();
    match sim_id {
        "wettreg2006" | "wettreg2010" => {
            table.insert(Acd::Precip, precip_correction_functor(ThresholdVariant::General));
        }
        "clm20" => {
            table.insert(Acd::Precip, precip_correction_functor(ThresholdVariant::Saxony));
            table.insert(Acd::Globrad, globrad_functor(GlobradSource::SunHours));
        }
        "remo" => {
            table.insert(Acd::Globrad, globrad_functor(GlobradSource::CloudAmount));
        }
        "star" => {
            table.insert(Acd::Globrad, globrad_functor(GlobradSource::StarNative));
        }
        _ => {}
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precip_type_thresholds_general() {
        assert_eq!(classify_precip_type(5.0, 6, ThresholdVariant::General), PrecipType::RainSummer);
        assert_eq!(classify_precip_type(5.0, 12, ThresholdVariant::General), PrecipType::RainWinter);
        assert_eq!(classify_precip_type(0.0, 1, ThresholdVariant::General), PrecipType::Mixed);
        assert_eq!(classify_precip_type(-2.0, 1, ThresholdVariant::General), PrecipType::Snow);
    }

    #[test]
    fn saxony_variant_shifts_mixed_snow_threshold() {
        // -0.5 is snow under General (threshold -0.7 means Mixed only down to -0.7)
        // actually -0.5 >= -0.7 so general => Mixed. Under Saxony (-0.4) -0.5 < -0.4 => Snow.
        assert_eq!(classify_precip_type(-0.5, 1, ThresholdVariant::General), PrecipType::Mixed);
        assert_eq!(classify_precip_type(-0.5, 1, ThresholdVariant::Saxony), PrecipType::Snow);
    }

    #[test]
    fn correction_is_noop_for_zero_precip() {
        assert_eq!(correct_precipitation(0.0, 5.0, 6, LocationClass::Flat, ThresholdVariant::General), 0.0);
    }

    #[test]
    fn correction_increases_positive_precip() {
        let corrected = correct_precipitation(10.0, 5.0, 6, LocationClass::Flat, ThresholdVariant::General);
        assert!(corrected > 10.0);
    }

    #[test]
    fn wettreg_functor_table_corrects_precip_from_raw_row() {
        let table = functor_table_for_simulation("wettreg2006");
        let functor = table.get(&Acd::Precip).expect("wettreg2006 wires up a Precip functor");
        let mut raw = HashMap::new();
        raw.insert(Acd::Precip, 10.0);
        raw.insert(Acd::Tavg, 5.0);
        let ctx = DerivationContext { location_class: LocationClass::Flat, latitude: 50.0, elevation: 100.0 };
        let corrected = functor(&raw, NaiveDate::from_ymd_opt(2000, 6, 1).unwrap(), &ctx);
        assert!(corrected > 10.0);
        assert_eq!(corrected, correct_precipitation(10.0, 5.0, 6, LocationClass::Flat, ThresholdVariant::General));
    }

    #[test]
    fn star_functor_table_has_no_precip_entry() {
        let table = functor_table_for_simulation("star");
        assert!(!table.contains_key(&Acd::Precip));
        assert!(table.contains_key(&Acd::Globrad));
    }
}
