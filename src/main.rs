/*
 *  main.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
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

use env_logger::Env;
use log::info;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use trackside::{config, supervisor};

/// Wait for SIGINT, SIGTERM or SIGHUP. Cancellation is the only way the
/// process exits; every other failure goes through the supervisor.
#[cfg(unix)]
async fn signal_handler() -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;
    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level())).init();

    info!(
        "trackside starting, panel at {}:{}, page interval {}s",
        cfg.host(),
        cfg.port(),
        cfg.page_interval().as_secs()
    );

    tokio::select! {
        result = supervisor::run(&cfg) => result,
        result = signal_handler() => {
            result?;
            info!("shutdown complete");
            Ok(())
        }
    }
}
