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

#![allow(unused)]

pub mod errors;

use std::{env, fs, path::{Path, PathBuf}};
pub use errors::{AgroBuildError, Result};

/// ordered list of directories searched for a named config file, cheapest/most-specific first
fn config_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd.join("config"));
        dirs.push(cwd);
    }
    if let Ok(p) = env::var("AGROCLIM_CONFIG_DIR") {
        dirs.push(PathBuf::from(p));
    }
    dirs
}

fn find_config_file(filename: &str) -> Option<PathBuf> {
    config_search_dirs().into_iter()
        .map(|d| d.join(filename))
        .find(|p| p.is_file())
}

/// load a RON config of type `C` by filename, falling back to `default_ron` (an embedded
/// default literal) when no file is found on the search path. Never panics.
pub fn load_config<C>(filename: &str, default_ron: &str) -> Result<C>
where
    C: for<'a> serde::Deserialize<'a>,
{
    if let Some(path) = find_config_file(filename) {
        let data = fs::read_to_string(&path)?;
        return Ok(ron::de::from_str(&data)?);
    }
    Ok(ron::de::from_str(default_ron)?)
}

/// root directory for the persisted regionalization result cache (§6), created if missing.
/// Overridable via `AGROCLIM_CACHE_DIR`, otherwise `<home>/.agroclim/cache`.
pub fn cache_dir() -> Result<PathBuf> {
    let root = if let Ok(p) = env::var("AGROCLIM_CACHE_DIR") {
        PathBuf::from(p)
    } else {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Path::new(&home).join(".agroclim").join("cache")
    };
    fs::create_dir_all(&root)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, PartialEq, Debug)]
    struct Sample { value: i32 }

    #[test]
    fn falls_back_to_embedded_default() {
        let c: Sample = load_config("does-not-exist-anywhere.ron", "(value: 42)").unwrap();
        assert_eq!(c, Sample { value: 42 });
    }
}
