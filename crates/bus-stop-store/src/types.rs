//! Bus stop records.

use serde::{Deserialize, Serialize};

/// One bus stop, in DataMall's `BusStops` field naming.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BusStop {
    #[serde(rename = "BusStopCode")]
    pub code: String,
    #[serde(rename = "RoadName", default)]
    pub road: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

/// A stop found by a radius search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStop {
    pub stop: BusStop,
    /// Great-circle distance in metres.
    pub distance: f64,
}
