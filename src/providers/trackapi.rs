// src/providers/trackapi.rs
//
// Client for the track data service: topology (waypoints with
// trackmarkers) and live train position reports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{FetchError, PositionReport, Topology, TrackDataProvider};

#[derive(Debug, Deserialize)]
struct TrainsResponse {
    trains: HashMap<String, TrainRecord>,
}

#[derive(Debug, Deserialize)]
struct TrainRecord {
    trackmarker: f64,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct TrackApiClient {
    client: Client,
    base_url: String,
}

impl TrackApiClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(TrackApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TrackDataProvider for TrackApiClient {
    async fn get_topology(&self) -> Result<Topology, FetchError> {
        let url = format!("{}/tracks.json", self.base_url);
        let topology = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Topology>()
            .await?;
        Ok(topology)
    }

    async fn get_position_reports(&self) -> Result<Vec<PositionReport>, FetchError> {
        let url = format!("{}/trains.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<TrainsResponse>()
            .await?;

        let now = Utc::now();
        let reports = response
            .trains
            .into_iter()
            .map(|(name, record)| PositionReport {
                object_id: name,
                position: record.trackmarker,
                // Some deployments omit the fix timestamp; fall back to
                // receipt time.
                observed_at: record.timestamp.unwrap_or(now),
            })
            .collect();
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trains_response_parses_with_and_without_timestamp() {
        let json = r#"{"trains": {
            "gigi": {"trackmarker": 150.0, "timestamp": "2023-08-15T12:00:00Z"},
            "erwin": {"trackmarker": 877.2}
        }}"#;
        let response: TrainsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.trains["gigi"].trackmarker, 150.0);
        assert!(response.trains["gigi"].timestamp.is_some());
        assert!(response.trains["erwin"].timestamp.is_none());
    }
}
