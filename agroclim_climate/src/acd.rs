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

//! ACD - Available Climate Datum. A small, closed enumeration of observed or derived
//! daily climate variables. Ids are stable and are what the disk-cache "acdSet" label
//! (underscore-joined ascending ids) is built from (§6).

use std::fmt;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Acd {
    Tmin = 0,
    Tmax = 1,
    Tavg = 2,
    Precip = 3,
    PrecipOrig = 4,
    Globrad = 5,
    Relhumid = 6,
    Wind = 7,
    Sunhours = 8,
    CloudAmount = 9,
    Day = 10,
    Month = 11,
    Year = 12,
}

impl Acd {
    pub fn id(&self) -> i32 { *self as i32 }
}

impl fmt::Display for Acd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// underscore-joined ascending ACD ids, used both as the in-memory result-cache key
/// component and as the `<acdSet>` path segment of the persisted cache (§6).
pub fn acd_set_label(acds: &[Acd]) -> String {
    let mut ids: Vec<i32> = acds.iter().map(|a| a.id()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_ascending_and_deduped() {
        let label = acd_set_label(&[Acd::Tmax, Acd::Tmin, Acd::Tmin]);
        assert_eq!(label, "0_1");
    }
}
