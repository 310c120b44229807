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

//! High-level data types.
//!
//! The types in this module carry no logic beyond validating their own contents and knowing how
//! to render themselves as JSON.  The JSON shape of every API response is defined here, not in
//! the REST layer.

mod date;
mod observations;
mod station;

pub use date::{DateRange, IsoDate};
pub use observations::{PrecipitationReading, TemperatureSummary};
pub use station::StationId;

/// Model errors.  These represent invalid values given to the constructors of the types in this
/// module.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;
