// src/providers/mod.rs
//
// Upstream data providers, consumed behind traits so the cycle
// controller can run against canned data in tests.

pub mod pretalx;
pub mod trackapi;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::schedule::ScheduleEntry;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Waypoint {
    pub trackmarker: f64,
}

/// Track topology as reported by the track data service.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Topology {
    pub waypoints: HashMap<String, Waypoint>,
}

impl Topology {
    /// Loop length: the highest waypoint trackmarker on the track.
    pub fn track_length(&self) -> Option<f64> {
        self.waypoints
            .values()
            .map(|w| w.trackmarker)
            .fold(None, |acc, m| Some(acc.map_or(m, |a: f64| a.max(m))))
    }
}

/// One raw position report for one train.
#[derive(Debug, Clone)]
pub struct PositionReport {
    pub object_id: String,
    pub position: f64,
    pub observed_at: DateTime<Utc>,
}

#[async_trait]
pub trait TrackDataProvider: Send {
    async fn get_topology(&self) -> Result<Topology, FetchError>;
    async fn get_position_reports(&self) -> Result<Vec<PositionReport>, FetchError>;
}

#[async_trait]
pub trait ScheduleProvider: Send {
    async fn get_all_entries(&self) -> Result<Vec<ScheduleEntry>, FetchError>;
}
