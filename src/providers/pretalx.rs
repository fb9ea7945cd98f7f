// src/providers/pretalx.rs
//
// Client for the pretalx schedule export. The feed nests events as
// schedule -> conference -> days -> rooms -> [events]; we flatten that
// into plain ScheduleEntry records.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use log::warn;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration as StdDuration;

use super::{FetchError, ScheduleProvider};
use crate::schedule::ScheduleEntry;

#[derive(Debug, Deserialize)]
struct ScheduleDoc {
    schedule: ScheduleBody,
}

#[derive(Debug, Deserialize)]
struct ScheduleBody {
    conference: Conference,
}

#[derive(Debug, Deserialize)]
struct Conference {
    days: Vec<Day>,
}

#[derive(Debug, Deserialize)]
struct Day {
    rooms: HashMap<String, Vec<Event>>,
}

#[derive(Debug, Deserialize)]
struct Event {
    title: String,
    #[serde(default)]
    track: Option<String>,
    room: String,
    /// Event start with timezone offset, ISO 8601.
    date: DateTime<FixedOffset>,
    /// "HH:MM"
    duration: String,
}

#[derive(Debug)]
pub struct PretalxClient {
    client: Client,
    url: String,
}

impl PretalxClient {
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(15))
            .build()?;
        Ok(PretalxClient {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ScheduleProvider for PretalxClient {
    async fn get_all_entries(&self) -> Result<Vec<ScheduleEntry>, FetchError> {
        let doc = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<ScheduleDoc>()
            .await?;
        Ok(flatten(doc))
    }
}

fn flatten(doc: ScheduleDoc) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for day in doc.schedule.conference.days {
        for events in day.rooms.into_values() {
            for event in events {
                let duration = match parse_duration(&event.duration) {
                    Some(d) => d,
                    None => {
                        warn!(
                            "skipping '{}': unparseable duration '{}'",
                            event.title, event.duration
                        );
                        continue;
                    }
                };
                entries.push(ScheduleEntry {
                    title: event.title,
                    track: event.track.unwrap_or_default(),
                    room: event.room,
                    start: event.date.with_timezone(&Utc),
                    duration,
                });
            }
        }
    }
    entries
}

/// Parse the feed's "HH:MM" duration field.
fn parse_duration(s: &str) -> Option<Duration> {
    let (hours, minutes) = s.split_once(':')?;
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(Duration::minutes(hours * 60 + minutes))
}
