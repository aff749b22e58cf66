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

//! calendar-date helpers using a 365-day (no-leap) year for index math inside the
//! per-realization cache, since Feb-29 never appears in a backing-store result (§4.3).

use chrono::{NaiveDate, Datelike};

fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// a day index over a 365-day calendar: every year contributes exactly 365 slots,
/// Feb-29 is folded into Feb-28's slot.
fn no_leap_index(date: NaiveDate) -> i64 {
    let year = date.year() as i64;
    let mut ord = date.ordinal() as i64;
    if is_leap(date.year()) && ord > 59 {
        ord -= 1;
    }
    year * 365 + ord
}

/// number of no-leap calendar days from `a` to `b` (can be negative)
pub fn days_between_no_leap(a: NaiveDate, b: NaiveDate) -> i64 {
    no_leap_index(b) - no_leap_index(a)
}

/// number of no-leap calendar days in the closed range `[a, b]`
pub fn days_in_range_no_leap(a: NaiveDate, b: NaiveDate) -> i64 {
    days_between_no_leap(a, b) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feb29_does_not_add_a_slot() {
        let jan1 = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let mar1 = NaiveDate::from_ymd_opt(2000, 3, 1).unwrap();
        // non-leap equivalent: Jan1 -> Mar1 is 31+29=60 real days, but no-leap index should be 59
        assert_eq!(days_between_no_leap(jan1, mar1), 59);
    }

    #[test]
    fn non_leap_year_unaffected() {
        let jan1 = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let feb15 = NaiveDate::from_ymd_opt(2001, 2, 15).unwrap();
        assert_eq!(days_between_no_leap(jan1, feb15), 45);
    }
}
