// src/config.rs
//
// Startup configuration: YAML file layered under CLI overrides, then
// validated. Every field is optional so the layers can merge
// Option-by-Option; accessors apply the defaults.

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Page switch interval in seconds.
    pub page_interval_secs: Option<u64>,
    pub panel: Option<PanelConfig>,
    pub eta: Option<EtaConfig>,
    pub schedule: Option<ScheduleConfig>,
    pub providers: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PanelConfig {
    /// Panel controller host. Required.
    pub host: Option<String>,
    pub port: Option<u16>,
    pub brightness: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EtaConfig {
    /// Physical trackmarker position of the display.
    pub display_trackmarker: Option<f64>,
    /// Minutes of position history considered for the velocity estimate.
    pub lookback_mins: Option<i64>,
    /// Maximum plausible ETA jump between cycles, seconds.
    pub max_jump_secs: Option<i64>,
    /// "Station zone" radius around the display, trackmarker units.
    pub arrival_zone: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    /// Events longer than this are dropped as placeholders, minutes.
    pub max_duration_mins: Option<i64>,
    /// Grace window for already-started events, minutes.
    pub max_ongoing_mins: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub track_api_url: Option<String>,
    pub schedule_url: Option<String>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "trackside", about = "Trackside arrival & event schedule panel")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Panel controller host
    #[arg(long)]
    pub host: Option<String>,
    /// Panel controller port
    #[arg(long)]
    pub port: Option<u16>,
    /// Panel brightness, 0-255
    #[arg(long)]
    pub brightness: Option<u8>,
    #[arg(long)]
    pub page_interval_secs: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    load_with(cli)
}

pub fn load_with(cli: Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/trackside/config.yaml");
        if p.exists() {
            return Some(p);
        }
        let p = home.join(".config/trackside.yaml");
        if p.exists() {
            return Some(p);
        }
    }
    for candidate in &["trackside.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() {
        dst.log_level = src.log_level;
    }
    if src.page_interval_secs.is_some() {
        dst.page_interval_secs = src.page_interval_secs;
    }
    merge_group(&mut dst.panel, src.panel, |d, s| {
        if s.host.is_some() {
            d.host = s.host;
        }
        if s.port.is_some() {
            d.port = s.port;
        }
        if s.brightness.is_some() {
            d.brightness = s.brightness;
        }
    });
    merge_group(&mut dst.eta, src.eta, |d, s| {
        if s.display_trackmarker.is_some() {
            d.display_trackmarker = s.display_trackmarker;
        }
        if s.lookback_mins.is_some() {
            d.lookback_mins = s.lookback_mins;
        }
        if s.max_jump_secs.is_some() {
            d.max_jump_secs = s.max_jump_secs;
        }
        if s.arrival_zone.is_some() {
            d.arrival_zone = s.arrival_zone;
        }
    });
    merge_group(&mut dst.schedule, src.schedule, |d, s| {
        if s.max_duration_mins.is_some() {
            d.max_duration_mins = s.max_duration_mins;
        }
        if s.max_ongoing_mins.is_some() {
            d.max_ongoing_mins = s.max_ongoing_mins;
        }
    });
    merge_group(&mut dst.providers, src.providers, |d, s| {
        if s.track_api_url.is_some() {
            d.track_api_url = s.track_api_url;
        }
        if s.schedule_url.is_some() {
            d.schedule_url = s.schedule_url;
        }
    });
}

fn merge_group<T>(dst: &mut Option<T>, src: Option<T>, f: impl FnOnce(&mut T, T)) {
    match (dst.as_mut(), src) {
        (None, Some(s)) => *dst = Some(s),
        (Some(d), Some(s)) => f(d, s),
        _ => {}
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }
    if cli.page_interval_secs.is_some() {
        cfg.page_interval_secs = cli.page_interval_secs;
    }
    let any_panel = cli.host.is_some() || cli.port.is_some() || cli.brightness.is_some();
    if any_panel && cfg.panel.is_none() {
        cfg.panel = Some(PanelConfig::default());
    }
    if let Some(panel) = cfg.panel.as_mut() {
        if cli.host.is_some() {
            panel.host = cli.host.clone();
        }
        if cli.port.is_some() {
            panel.port = cli.port;
        }
        if cli.brightness.is_some() {
            panel.brightness = cli.brightness;
        }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let host_set = cfg
        .panel
        .as_ref()
        .and_then(|p| p.host.as_ref())
        .map(|h| !h.is_empty())
        .unwrap_or(false);
    if !host_set {
        return Err(ConfigError::Validation(
            "panel host is required (YAML panel.host or --host)".into(),
        ));
    }
    if let Some(secs) = cfg.page_interval_secs {
        if secs == 0 {
            return Err(ConfigError::Validation(
                "page_interval_secs must be > 0".into(),
            ));
        }
    }
    if let Some(eta) = cfg.eta.as_ref() {
        if let Some(lookback) = eta.lookback_mins {
            if lookback <= 0 {
                return Err(ConfigError::Validation(
                    "eta.lookback_mins must be > 0".into(),
                ));
            }
        }
        if let Some(zone) = eta.arrival_zone {
            if zone < 0.0 {
                return Err(ConfigError::Validation(
                    "eta.arrival_zone must be >= 0".into(),
                ));
            }
        }
    }
    Ok(())
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn page_interval(&self) -> Duration {
        Duration::from_secs(self.page_interval_secs.unwrap_or(20))
    }

    pub fn host(&self) -> &str {
        self.panel
            .as_ref()
            .and_then(|p| p.host.as_deref())
            .unwrap_or("")
    }

    pub fn port(&self) -> u16 {
        self.panel.as_ref().and_then(|p| p.port).unwrap_or(5001)
    }

    pub fn brightness(&self) -> u8 {
        self.panel
            .as_ref()
            .and_then(|p| p.brightness)
            .unwrap_or(128)
    }

    pub fn display_trackmarker(&self) -> f64 {
        self.eta
            .as_ref()
            .and_then(|e| e.display_trackmarker)
            .unwrap_or(163.0)
    }

    pub fn lookback_mins(&self) -> i64 {
        self.eta.as_ref().and_then(|e| e.lookback_mins).unwrap_or(10)
    }

    pub fn max_jump_secs(&self) -> i64 {
        self.eta.as_ref().and_then(|e| e.max_jump_secs).unwrap_or(30)
    }

    pub fn arrival_zone(&self) -> f64 {
        self.eta.as_ref().and_then(|e| e.arrival_zone).unwrap_or(20.0)
    }

    pub fn max_duration_mins(&self) -> i64 {
        self.schedule
            .as_ref()
            .and_then(|s| s.max_duration_mins)
            .unwrap_or(120)
    }

    pub fn max_ongoing_mins(&self) -> i64 {
        self.schedule
            .as_ref()
            .and_then(|s| s.max_ongoing_mins)
            .unwrap_or(9)
    }

    pub fn track_api_url(&self) -> &str {
        self.providers
            .as_ref()
            .and_then(|p| p.track_api_url.as_deref())
            .unwrap_or("https://api.c3toc.de")
    }

    pub fn schedule_url(&self) -> &str {
        self.providers
            .as_ref()
            .and_then(|p| p.schedule_url.as_deref())
            .unwrap_or("https://pretalx.c3voc.de/camp2023/schedule/export/schedule.json")
    }
}
