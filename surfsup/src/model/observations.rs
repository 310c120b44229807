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

//! Observations returned by the API.

use crate::model::IsoDate;
use derive_getters::Getters;
use derive_more::Constructor;
use serde::ser::SerializeMap;
#[cfg(test)]
use serde::Deserialize;
use serde::{Serialize, Serializer};

/// Rainfall recorded on a given date by one station.
///
/// Serializes as a single-entry map from the date to the precipitation, which is `null` when the
/// station did not record any rainfall that day.
#[derive(Constructor, Debug, Getters, PartialEq)]
pub struct PrecipitationReading {
    /// Date of the measurement.
    date: IsoDate,

    /// Precipitation in the dataset's units, if recorded.
    precipitation: Option<f64>,
}

impl Serialize for PrecipitationReading {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.date, &self.precipitation)?;
        map.end()
    }
}

/// Minimum, average and maximum of a set of temperature observations.
///
/// All three values are `None` when the set is empty.
#[derive(Constructor, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct TemperatureSummary {
    /// Lowest observed temperature.
    #[serde(rename = "Minimum Temperature")]
    minimum: Option<f64>,

    /// Mean of all observed temperatures.
    #[serde(rename = "Average Temperature")]
    average: Option<f64>,

    /// Highest observed temperature.
    #[serde(rename = "Maximum Temperature")]
    maximum: Option<f64>,
}

impl TemperatureSummary {
    /// Returns the summary of an empty set of observations.
    pub fn empty() -> Self {
        Self { minimum: None, average: None, maximum: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{Token, assert_ser_tokens};

    #[test]
    fn test_precipitation_reading_ser_value() {
        let reading = PrecipitationReading::new(IsoDate::parse("2016-08-23").unwrap(), Some(0.5));
        assert_ser_tokens(
            &reading,
            &[
                Token::Map { len: Some(1) },
                Token::Str("2016-08-23"),
                Token::Some,
                Token::F64(0.5),
                Token::MapEnd,
            ],
        );
    }

    #[test]
    fn test_precipitation_reading_ser_missing() {
        let reading = PrecipitationReading::new(IsoDate::parse("2016-08-24").unwrap(), None);
        assert_eq!(r#"{"2016-08-24":null}"#, serde_json::to_string(&reading).unwrap());
    }

    #[test]
    fn test_temperature_summary_ser() {
        let summary = TemperatureSummary::new(Some(54.0), Some(71.5), Some(85.0));
        assert_eq!(
            r#"{"Minimum Temperature":54.0,"Average Temperature":71.5,"Maximum Temperature":85.0}"#,
            serde_json::to_string(&summary).unwrap()
        );
    }

    #[test]
    fn test_temperature_summary_empty_ser() {
        assert_eq!(
            r#"{"Minimum Temperature":null,"Average Temperature":null,"Maximum Temperature":null}"#,
            serde_json::to_string(&TemperatureSummary::empty()).unwrap()
        );
    }

    #[test]
    fn test_temperature_summary_de() {
        let summary: TemperatureSummary = serde_json::from_str(
            r#"{"Maximum Temperature":3.0,"Minimum Temperature":1.0,"Average Temperature":null}"#,
        )
        .unwrap();
        assert_eq!(TemperatureSummary::new(Some(1.0), None, Some(3.0)), summary);
    }
}
