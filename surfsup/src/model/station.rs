// SurfsUp
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! The `StationId` data type.

use crate::model::{ModelError, ModelResult};
use serde::Serialize;

/// Identifier of a weather station, such as `USC00519281`.
///
/// Station identifiers are opaque to us: they come from the dataset and we only make sure they
/// can be safely passed around and rendered.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Creates a new station identifier from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ModelError("Station identifier cannot be empty".to_owned()));
        }
        if let Some(ch) = s.chars().find(|ch| ch.is_whitespace() || ch.is_control()) {
            return Err(ModelError(format!(
                "Unsupported character {:?} in station identifier '{}'",
                ch, s
            )));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the station identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&'static str> for StationId {
    /// Creates a new station identifier from a hardcoded string, which must be valid.
    fn from(id: &'static str) -> Self {
        StationId::new(id).expect("Hardcoded station identifiers must be valid")
    }
}
