/*
 *  supervisor.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  Run loop supervisor: restarts the cycle controller from scratch on
 *  any unhandled failure, with exponential backoff while the runs stay
 *  short-lived. The process never exits on a non-cancellation failure.
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

use log::{error, info, warn};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::cycle::{CycleController, CycleSettings};
use crate::providers::pretalx::PretalxClient;
use crate::providers::trackapi::TrackApiClient;
use crate::sink::tcp::TcpSink;
use crate::sink::DisplaySink;

/// Restart delay state. Doubles after every short-lived run up to the
/// ceiling; a run that stays up past `stable_run` resets the delay.
#[derive(Debug)]
pub struct Backoff {
    current_secs: u64,
    ceiling_secs: u64,
    stable_run: Duration,
}

impl Backoff {
    pub fn new(ceiling_secs: u64, stable_run: Duration) -> Self {
        Backoff {
            current_secs: 1,
            ceiling_secs,
            stable_run,
        }
    }

    /// Delay to sleep before the next restart, given how long the failed
    /// run lasted.
    pub fn next_delay(&mut self, run_duration: Duration) -> Duration {
        let delay = Duration::from_secs(self.current_secs);
        if run_duration < self.stable_run {
            self.current_secs = (self.current_secs * 2).min(self.ceiling_secs);
        } else {
            self.current_secs = 1;
        }
        delay
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::new(256, Duration::from_secs(60))
    }
}

/// Supervise the display until the surrounding select is cancelled by a
/// signal. All in-memory state is rebuilt on every restart.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let mut backoff = Backoff::default();
    loop {
        let started = Instant::now();
        match run_once(cfg).await {
            Ok(()) => return Ok(()),
            Err(e) => error!("display run failed: {e:#}"),
        }
        let delay = backoff.next_delay(started.elapsed());
        warn!("restarting in {}s", delay.as_secs());
        tokio::time::sleep(delay).await;
    }
}

/// One full run: connect, cycle until failure, then release the panel
/// connection whatever happened.
async fn run_once(cfg: &Config) -> anyhow::Result<()> {
    let sink = TcpSink::connect(cfg.host(), cfg.port()).await?;
    let trains = TrackApiClient::new(cfg.track_api_url())?;
    let schedule = PretalxClient::new(cfg.schedule_url())?;

    let mut controller = CycleController::new(sink, trains, schedule, CycleSettings::from(cfg));
    info!("cycle controller up");
    let result = controller.run().await;

    if let Err(close_error) = controller.sink_mut().close().await {
        warn!("panel close after failure also failed: {close_error}");
    }
    result.map_err(Into::into)
}
