//! In-memory bus stop lookup.

use crate::error::BusStopError;
use crate::geo;
use crate::types::{BusStop, NearbyStop};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Default cap on autocomplete results.
pub const DEFAULT_COMPLETION_LIMIT: usize = 50;

struct Inner {
    stops: Vec<BusStop>,
    by_code: HashMap<String, usize>,
}

/// Read-only bus stop directory.
///
/// Loaded once at startup. Cloning is cheap and shares the data.
#[derive(Clone)]
pub struct BusStopStore {
    inner: Arc<Inner>,
}

impl BusStopStore {
    /// Build a store from stops in source order. Later duplicates of a
    /// code are skipped.
    pub fn from_stops(stops: Vec<BusStop>) -> Self {
        let mut by_code = HashMap::with_capacity(stops.len());
        let mut kept = Vec::with_capacity(stops.len());

        for stop in stops {
            if by_code.contains_key(&stop.code) {
                warn!("Skipping duplicate bus stop {}", stop.code);
                continue;
            }
            by_code.insert(stop.code.clone(), kept.len());
            kept.push(stop);
        }

        Self {
            inner: Arc::new(Inner {
                stops: kept,
                by_code,
            }),
        }
    }

    /// Parse a JSON array of DataMall bus stop records.
    pub fn from_json(json: &str) -> Result<Self, BusStopError> {
        let stops: Vec<BusStop> = serde_json::from_str(json)?;
        Ok(Self::from_stops(stops))
    }

    /// Load stops from a JSON file.
    #[instrument]
    pub async fn load(path: &Path) -> Result<Self, BusStopError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| BusStopError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let store = Self::from_json(&json)?;
        info!("Loaded {} bus stops", store.len());
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.inner.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.stops.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&BusStop> {
        self.inner
            .by_code
            .get(code)
            .map(|&index| &self.inner.stops[index])
    }

    /// Stops whose code starts with `query`, or whose description or road
    /// contains it, ignoring case. Source order, at most `limit` results.
    pub fn completions(&self, query: &str, limit: usize) -> Vec<&BusStop> {
        let needle = query.trim().to_uppercase();

        self.inner
            .stops
            .iter()
            .filter(|stop| {
                stop.code.starts_with(&needle)
                    || stop.description.to_uppercase().contains(&needle)
                    || stop.road.to_uppercase().contains(&needle)
            })
            .take(limit)
            .collect()
    }

    /// Stops within `radius` metres of a point, nearest first.
    pub fn nearby(&self, latitude: f64, longitude: f64, radius: f64, limit: usize) -> Vec<NearbyStop> {
        let mut found: Vec<NearbyStop> = self
            .inner
            .stops
            .iter()
            .filter_map(|stop| {
                let distance = geo::distance(latitude, longitude, stop.latitude, stop.longitude);
                (distance <= radius).then(|| NearbyStop {
                    stop: stop.clone(),
                    distance,
                })
            })
            .collect();

        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found.truncate(limit);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(code: &str, description: &str, road: &str, latitude: f64, longitude: f64) -> BusStop {
        BusStop {
            code: code.into(),
            road: road.into(),
            description: description.into(),
            latitude,
            longitude,
        }
    }

    fn store() -> BusStopStore {
        BusStopStore::from_stops(vec![
            stop("96049", "Upp Changi Stn", "Upp Changi Rd East", 1.3416, 103.9614),
            stop("96041", "Bef Upp Changi Stn", "Upp Changi Rd East", 1.3410, 103.9620),
            stop("09048", "Orchard Stn", "Orchard Rd", 1.3039, 103.8320),
            stop("09047", "Opp Orchard Stn", "Orchard Blvd", 1.3030, 103.8315),
        ])
    }

    #[test]
    fn test_get_by_code() {
        let store = store();
        assert_eq!(store.get("09048").map(|s| s.description.as_str()), Some("Orchard Stn"));
        assert!(store.get("99999").is_none());
    }

    #[test]
    fn test_completions_match_code_prefix() {
        let store = store();
        let codes: Vec<_> = store.completions("960", 50).iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["96049", "96041"]);
    }

    #[test]
    fn test_completions_ignore_case() {
        let store = store();
        let codes: Vec<_> = store
            .completions("orchard", 50)
            .iter()
            .map(|s| s.code.as_str())
            .collect();
        assert_eq!(codes, vec!["09048", "09047"]);

        let by_road: Vec<_> = store
            .completions("blvd", 50)
            .iter()
            .map(|s| s.code.as_str())
            .collect();
        assert_eq!(by_road, vec!["09047"]);
    }

    #[test]
    fn test_completions_respect_limit() {
        assert_eq!(store().completions("", 3).len(), 3);
    }

    #[test]
    fn test_nearby_sorted_by_distance() {
        let store = store();
        let found = store.nearby(1.3411, 103.9619, 500.0, 5);

        let codes: Vec<_> = found.iter().map(|n| n.stop.code.as_str()).collect();
        assert_eq!(codes, vec!["96041", "96049"]);
        assert!(found[0].distance < found[1].distance);
    }

    #[test]
    fn test_nearby_outside_radius() {
        assert!(store().nearby(1.29, 103.85, 500.0, 5).is_empty());
    }

    #[test]
    fn test_duplicates_keep_first() {
        let store = BusStopStore::from_stops(vec![
            stop("96049", "First", "Road", 1.0, 103.0),
            stop("96049", "Second", "Road", 1.0, 103.0),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("96049").map(|s| s.description.as_str()), Some("First"));
    }

    #[test]
    fn test_from_json() {
        let store = BusStopStore::from_json(
            r#"[{"BusStopCode":"01012","RoadName":"Victoria St","Description":"Hotel Grand Pacific","Latitude":1.29684825487647,"Longitude":103.85253591654006}]"#,
        )
        .unwrap();
        assert_eq!(store.get("01012").map(|s| s.road.as_str()), Some("Victoria St"));
    }

    #[test]
    fn test_load_missing_file() {
        let result =
            tokio_test::block_on(BusStopStore::load(Path::new("/nonexistent/bus-stops.json")));
        assert!(matches!(result, Err(BusStopError::Io { .. })));
    }
}
