// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use anyhow::{Context, Result};
use clap::Parser;
use iiomon::device::Platform;
use iiomon::VolumeConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseDurationError {
    #[error("'{0}' unknown units - use 's', 'ms' or 'us'.")]
    Units(String),
    #[error("'{0}' must start with a digit")]
    NoDigits(String),
    #[error("'{0}' {1}")]
    ParseDigits(String, std::num::ParseIntError),
    #[error("'{0}' is too large")]
    Overflow(String),
}

pub fn parse_duration(s: &str) -> std::result::Result<Duration, ParseDurationError> {
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    let (num, scale) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(0) => return Err(ParseDurationError::NoDigits(s.into())),
        Some(n) => {
            let (num, units) = s.split_at(n);
            let scale = match units {
                "us" => 1000,
                "ms" => 1000000,
                "s" => 1000000000,
                _ => return Err(ParseDurationError::Units(s.into())),
            };
            (num, scale)
        }
        None => (s, 1000000),
    };
    let t = num
        .parse::<u64>()
        .map_err(|e| ParseDurationError::ParseDigits(num.into(), e))?
        .checked_mul(scale)
        .ok_or_else(|| ParseDurationError::Overflow(s.into()))?;
    Ok(Duration::from_nanos(t))
}

/// Parse a threshold level, in decimal or `0x` prefixed hex.
pub fn parse_level(s: &str) -> std::result::Result<i64, String> {
    iiomon::config::parse_int(s).ok_or_else(|| format!("'{s}' is not a number"))
}

/// Parse a channel index, in decimal or `0x` prefixed hex.
pub fn parse_channel(s: &str) -> std::result::Result<u32, String> {
    iiomon::config::parse_int(s)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("'{s}' is not a valid channel"))
}

// common command line parser options

/// The platform roots, set by the global options.
#[derive(Clone, Debug, Parser)]
pub struct PlatformOpts {
    #[arg(from_global)]
    pub sysfs_root: PathBuf,

    #[arg(from_global)]
    pub dev_root: PathBuf,
}

impl PlatformOpts {
    pub fn platform(&self) -> Platform {
        Platform::new(&self.sysfs_root, &self.dev_root)
    }
}

#[derive(Clone, Debug, Default, Parser)]
/// Options to select the channel and its thresholds.
pub struct ConfigOpts {
    /// The configuration file
    ///
    /// The file contains the channel, min, max and step, either as positional
    /// values in that order, or as key=value pairs.
    /// Values may be decimal or 0x prefixed hex, and # starts a comment.
    ///
    /// If the file cannot be opened then the defaults are used.
    #[arg(short = 'c', long, value_name = "file", env = "IIOMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the monitored channel
    #[arg(long, value_name = "channel", value_parser = parse_channel)]
    pub channel: Option<u32>,

    /// Override the lowest threshold level
    #[arg(long, value_name = "level", value_parser = parse_level, allow_negative_numbers = true)]
    pub min: Option<i64>,

    /// Override the highest threshold level
    #[arg(long, value_name = "level", value_parser = parse_level, allow_negative_numbers = true)]
    pub max: Option<i64>,

    /// Override the distance from the value to each threshold
    #[arg(long, value_name = "level", value_parser = parse_level, allow_negative_numbers = true)]
    pub step: Option<i64>,
}

impl ConfigOpts {
    /// Load the config file, if any, and apply the overrides.
    pub fn load(&self) -> Result<VolumeConfig> {
        let base = match &self.config {
            Some(p) => VolumeConfig::from_file(p)
                .with_context(|| format!("invalid config file '{}'", p.display()))?,
            None => VolumeConfig::default(),
        };
        let cfg = VolumeConfig::new(
            self.channel.unwrap_or(base.channel),
            self.min.unwrap_or(base.min),
            self.max.unwrap_or(base.max),
            self.step.unwrap_or(base.step),
        )
        .context("invalid configuration")?;
        Ok(cfg)
    }
}

#[derive(Clone, Copy, Debug, Default, Parser)]
pub struct EmitOpts {
    #[arg(from_global)]
    pub verbose: bool,

    /// Emit output in JSON format
    #[cfg(feature = "json")]
    #[arg(long, group = "emit")]
    pub json: bool,
}

pub fn emit_error(opts: &EmitOpts, e: &anyhow::Error) {
    let e_str = format_error(opts, e);
    #[cfg(feature = "json")]
    if opts.json {
        println!("{}", serde_json::json!({ "error": e_str }));
        return;
    }
    eprintln!("{e_str}");
}

pub fn format_error(opts: &EmitOpts, e: &anyhow::Error) -> String {
    if opts.verbose {
        format!("{e:#}")
    } else {
        format!("{e}")
    }
}

pub enum TimeFmt {
    Seconds,
    Localtime,
    Utc,
}

pub fn format_time(evtime: i64, timefmt: &TimeFmt) -> String {
    use chrono::{Local, TimeZone, Utc};

    let ts_sec = evtime.div_euclid(1000000000);
    let ts_nsec = evtime.rem_euclid(1000000000) as u32;
    let secs = || format!("{ts_sec}.{ts_nsec:09}");
    match timefmt {
        TimeFmt::Seconds => secs(),
        TimeFmt::Localtime => match Local.timestamp_opt(ts_sec, ts_nsec).single() {
            Some(t) => format!("{}", t.format("%FT%T%.9f")),
            None => secs(),
        },
        TimeFmt::Utc => match Utc.timestamp_opt(ts_sec, ts_nsec).single() {
            Some(t) => format!("{}", t.format("%FT%T%.9fZ")),
            None => secs(),
        },
    }
}
