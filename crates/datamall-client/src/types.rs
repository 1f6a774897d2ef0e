//! Bus arrival response model.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Arrival estimates for every service calling at one stop.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BusArrival {
    #[serde(rename = "BusStopCode", default)]
    pub bus_stop_code: String,
    #[serde(rename = "Services", default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Service {
    #[serde(rename = "ServiceNo")]
    pub service_no: String,
    #[serde(rename = "Operator", default)]
    pub operator: String,
    #[serde(rename = "NextBus", default)]
    pub next_bus: ArrivingBus,
    #[serde(rename = "NextBus2", default)]
    pub next_bus_2: ArrivingBus,
    #[serde(rename = "NextBus3", default)]
    pub next_bus_3: ArrivingBus,
}

impl Service {
    /// The three upcoming buses, soonest first.
    pub fn upcoming(&self) -> [&ArrivingBus; 3] {
        [&self.next_bus, &self.next_bus_2, &self.next_bus_3]
    }
}

/// One upcoming bus. DataMall sends empty strings for buses it has no
/// estimate for.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArrivingBus {
    #[serde(
        rename = "EstimatedArrival",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub estimated_arrival: Option<DateTime<FixedOffset>>,
    #[serde(rename = "Load", default)]
    pub load: String,
    #[serde(rename = "Feature", default)]
    pub feature: String,
    #[serde(rename = "Type", default)]
    pub bus_type: String,
}

impl ArrivingBus {
    /// Whole minutes from `now` until arrival, truncated toward zero.
    /// Negative when the estimate is already in the past.
    pub fn minutes_until<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<i64> {
        self.estimated_arrival
            .map(|arrival| arrival.signed_duration_since(now.clone()).num_minutes())
    }

    pub fn is_wheelchair_accessible(&self) -> bool {
        self.feature == "WAB"
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
