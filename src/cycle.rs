/*
 *  cycle.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  Page cycle controller: one tick per page interval. Each tick
 *  refreshes upstream data, renders the active page into a fresh draw
 *  queue, flushes it atomically and advances the rotation. A failed
 *  frame is still closed before the error propagates so the panel is
 *  never left half drawn.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, info, warn};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::eta::{self, ArrivalEstimate, EstimatorConfig, EtaContext};
use crate::layout::RenderError;
use crate::pages::{PageMode, PageRotation};
use crate::providers::{ScheduleProvider, TrackDataProvider};
use crate::render;
use crate::samples::SampleStore;
use crate::schedule::{ScheduleEntry, ScheduleFilter};
use crate::sink::{DisplaySink, SinkError};

/// Faults that abort the current run. Fetch failures are absent by
/// design: they degrade to empty data for the tick.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("render fault: {0}")]
    Render(#[from] RenderError),
    #[error("sink fault: {0}")]
    Sink(#[from] SinkError),
}

#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub page_interval: Duration,
    pub brightness: u8,
    pub display_trackmarker: f64,
    pub lookback: ChronoDuration,
    pub max_jump_secs: i64,
    pub arrival_zone: f64,
    pub max_duration: ChronoDuration,
    pub max_ongoing: ChronoDuration,
}

impl From<&Config> for CycleSettings {
    fn from(cfg: &Config) -> Self {
        CycleSettings {
            page_interval: cfg.page_interval(),
            brightness: cfg.brightness(),
            display_trackmarker: cfg.display_trackmarker(),
            lookback: ChronoDuration::minutes(cfg.lookback_mins()),
            max_jump_secs: cfg.max_jump_secs(),
            arrival_zone: cfg.arrival_zone(),
            max_duration: ChronoDuration::minutes(cfg.max_duration_mins()),
            max_ongoing: ChronoDuration::minutes(cfg.max_ongoing_mins()),
        }
    }
}

pub struct CycleController<S, T, P> {
    sink: S,
    trains: T,
    schedule: P,
    store: SampleStore,
    ctx: EtaContext,
    rotation: PageRotation,
    filter: ScheduleFilter,
    est_cfg: EstimatorConfig,
    settings: CycleSettings,
}

impl<S, T, P> CycleController<S, T, P>
where
    S: DisplaySink,
    T: TrackDataProvider,
    P: ScheduleProvider,
{
    pub fn new(sink: S, trains: T, schedule: P, settings: CycleSettings) -> Self {
        CycleController {
            sink,
            trains,
            schedule,
            store: SampleStore::new(settings.lookback),
            ctx: EtaContext::new(),
            rotation: PageRotation::new(),
            filter: ScheduleFilter {
                max_duration: settings.max_duration,
                max_ongoing: settings.max_ongoing,
            },
            est_cfg: EstimatorConfig {
                query_position: settings.display_trackmarker,
                // filled in from topology on the first successful fetch;
                // the estimator fails closed to Unknown until then
                track_length: 0.0,
                arrival_zone: settings.arrival_zone,
                max_jump_secs: settings.max_jump_secs,
            },
            settings,
        }
    }

    /// One-time panel setup at the start of a run.
    pub async fn init(&mut self) -> Result<(), CycleError> {
        self.sink.clear().await?;
        self.sink.set_brightness(self.settings.brightness).await?;
        Ok(())
    }

    /// Run ticks until something fails. Only the supervisor above ever
    /// sees the error.
    pub async fn run(&mut self) -> Result<(), CycleError> {
        self.init().await?;
        loop {
            self.tick(Utc::now()).await?;
            tokio::time::sleep(self.settings.page_interval).await;
        }
    }

    /// One refresh cycle: fetch, estimate, render, flush, advance.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<(), CycleError> {
        let mode = self.rotation.current();
        debug!("handling page mode {:?}", mode);

        // Positions are refreshed every tick, not just when the arrivals
        // page is showing, to keep the smoothed ETAs accurate.
        self.refresh_positions().await;
        // Evict trains that stopped reporting, so the estimator never
        // sees samples outside the lookback window.
        self.store.prune(now);
        let estimates = eta::estimate_all(&self.est_cfg, &self.store, &mut self.ctx, now);

        let entries = if mode == PageMode::Schedule {
            self.refresh_schedule(now).await
        } else {
            Vec::new()
        };

        self.sink.begin_frame().await?;
        let outcome = self.draw(mode, &estimates, &entries, now).await;
        if let Err(error) = outcome {
            // close the queue so no half-drawn frame lingers, then let
            // the supervisor handle the fault
            let _ = self.sink.clear().await;
            let _ = self.sink.end_frame().await;
            return Err(error);
        }
        self.sink.end_frame().await?;

        self.rotation.advance();
        Ok(())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    async fn draw(
        &mut self,
        mode: PageMode,
        estimates: &[ArrivalEstimate],
        entries: &[ScheduleEntry],
        now: DateTime<Utc>,
    ) -> Result<(), CycleError> {
        let commands = render::render_page(mode, estimates, entries, now)?;
        for command in &commands {
            self.sink.submit(command).await?;
        }
        Ok(())
    }

    async fn refresh_positions(&mut self) {
        // Topology is fetched lazily so a provider outage at startup
        // only delays ETAs instead of aborting the run.
        if self.est_cfg.track_length <= 0.0 {
            match self.trains.get_topology().await {
                Ok(topology) => match topology.track_length() {
                    Some(length) if length > 0.0 => {
                        info!("track length: {length}");
                        self.est_cfg.track_length = length;
                    }
                    _ => warn!("topology has no usable waypoints"),
                },
                Err(error) => warn!("topology fetch failed: {error}"),
            }
        }

        match self.trains.get_position_reports().await {
            Ok(reports) => {
                for report in reports {
                    self.store
                        .record(&report.object_id, report.position, report.observed_at);
                }
            }
            Err(error) => warn!("position fetch failed, estimating from stale data: {error}"),
        }
    }

    async fn refresh_schedule(&mut self, now: DateTime<Utc>) -> Vec<ScheduleEntry> {
        match self.schedule.get_all_entries().await {
            Ok(entries) => self.filter.apply(entries, now),
            Err(error) => {
                warn!("schedule fetch failed, showing empty list: {error}");
                Vec::new()
            }
        }
    }
}
