// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::common::{
    self, emit_error, format_error, format_time, ConfigOpts, EmitOpts, PlatformOpts, TimeFmt,
};
use anyhow::{anyhow, Context};
use clap::Parser;
use iiomon::event::{Direction, Event};
use iiomon::{EventHandle, VolumeConfig};
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
#[cfg(feature = "serde")]
use serde_derive::Serialize;
use std::os::unix::prelude::AsRawFd;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(aliases(["m", "mon"]))]
pub struct Opts {
    /// The name of the IIO device to monitor
    #[arg(
        short,
        long,
        value_name = "name",
        env = "IIOMON_DEVICE",
        default_value = "palmas-gpadc"
    )]
    device: String,

    #[command(flatten)]
    config: ConfigOpts,

    /// Display a banner on successful startup
    #[arg(long)]
    banner: bool,

    /// Exit if no events are received for the specified period.
    ///
    /// The period is taken as milliseconds unless otherwise specified.
    #[arg(long, value_name = "period", value_parser = common::parse_duration)]
    idle_timeout: Option<Duration>,

    /// Exit after the specified number of events
    ///
    /// If not specified then monitoring will continue indefinitely.
    #[arg(short, long, value_name = "num")]
    num_events: Option<u32>,

    /// Format event timestamps as local time
    #[arg(long, group = "timefmt")]
    localtime: bool,

    /// Format event timestamps as UTC
    #[arg(long, group = "timefmt")]
    utc: bool,

    /// Don't generate any output
    #[arg(short = 'q', long, groups = ["emit", "timefmt"], alias = "silent")]
    quiet: bool,

    #[command(flatten)]
    platform: PlatformOpts,

    #[command(flatten)]
    emit: EmitOpts,
}

impl Opts {
    fn timefmt(&self) -> TimeFmt {
        if self.localtime {
            TimeFmt::Localtime
        } else if self.utc {
            TimeFmt::Utc
        } else {
            TimeFmt::Seconds
        }
    }
}

pub fn cmd(opts: &Opts) -> bool {
    let res = do_cmd(opts);
    res.emit();
    res.errors.is_empty()
}

fn do_cmd(opts: &Opts) -> CmdResults {
    use std::io::Write;

    let mut res = CmdResults {
        opts: opts.emit,
        ..Default::default()
    };
    let cfg = match opts.config.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            res.push_error(&e);
            return res;
        }
    };
    let platform = opts.platform.platform();
    let handle = match EventHandle::open(&platform, &opts.device, cfg.channel) {
        Ok(h) => h,
        Err(e) => {
            res.push_error(&anyhow!(e).context(format!(
                "failed to open channel {} on '{}'",
                cfg.channel, opts.device
            )));
            return res;
        }
    };
    let mut poll = match Poll::new() {
        Ok(p) => p,
        Err(e) => {
            res.push_error(&anyhow!(e).context("failed to create poll"));
            return res;
        }
    };
    if let Err(e) = poll.registry().register(
        &mut SourceFd(&handle.as_raw_fd()),
        Token(0),
        Interest::READABLE,
    ) {
        res.push_error(&anyhow!(e).context(format!(
            "failed to register {} with poll",
            handle.device().dir.display()
        )));
        return res;
    }

    let timefmt = opts.timefmt();
    emit_banner(opts, &handle, &cfg);
    // arm the initial bracket
    update(opts, &handle, &cfg, None, &timefmt);

    let mut count = 0;
    let mut events = Events::with_capacity(1);
    loop {
        match poll.poll(&mut events, opts.idle_timeout) {
            Err(e) => {
                if e.kind() != std::io::ErrorKind::Interrupted {
                    res.push_error(&anyhow!(e));
                    return res;
                }
            }
            Ok(()) => {
                if events.is_empty() {
                    tracing::debug!("idle timeout");
                    return res;
                }
                // edge triggered, so drain everything pending
                let (n, last) = drain(
                    || handle.has_event(),
                    || handle.read_event(),
                    &opts.emit,
                );
                count += n;
                update(opts, &handle, &cfg, last.as_ref(), &timefmt);
                if let Some(limit) = opts.num_events {
                    if count >= limit {
                        return res;
                    }
                }
                _ = std::io::stdout().flush();
            }
        }
    }
}

// Read all the pending events.
//
// Returns the number of events read and the last of them.
// A record that fails to decode has still been consumed, so draining continues
// past it. Only system call failures stop the drain.
fn drain<H, R>(mut has_event: H, mut read_event: R, emit: &EmitOpts) -> (u32, Option<Event>)
where
    H: FnMut() -> iiomon::Result<bool>,
    R: FnMut() -> iiomon::Result<Event>,
{
    let mut count = 0;
    let mut last = None;
    loop {
        match has_event() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                emit_error(emit, &anyhow!(e).context("failed to poll for events"));
                break;
            }
        }
        match read_event() {
            Ok(evt) => {
                tracing::debug!(
                    direction = ?evt.direction,
                    timestamp = evt.timestamp_ns,
                    "threshold event"
                );
                count += 1;
                last = Some(evt);
            }
            Err(e) => {
                let fatal = matches!(
                    &e,
                    iiomon::Error::Uapi(_, _, source) if source.raw_os_error().is_some()
                );
                emit_error(emit, &anyhow!(e).context("failed to read event"));
                if fatal {
                    break;
                }
            }
        }
    }
    (count, last)
}

// Recenter the thresholds and report the new value.
//
// Failures are reported and the monitor continues.
fn update(
    opts: &Opts,
    handle: &EventHandle,
    cfg: &VolumeConfig,
    evt: Option<&Event>,
    timefmt: &TimeFmt,
) {
    match handle
        .update(cfg)
        .with_context(|| format!("failed to update channel {}", cfg.channel))
    {
        Ok(value) => emit_update(evt, value, opts, timefmt),
        Err(e) => emit_error(&opts.emit, &e),
    }
}

#[derive(Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct CmdResults {
    #[cfg_attr(feature = "serde", serde(skip))]
    opts: EmitOpts,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    errors: Vec<String>,
}

impl CmdResults {
    fn emit(&self) {
        #[cfg(feature = "json")]
        if self.opts.json {
            if !self.errors.is_empty() {
                match serde_json::to_string(self) {
                    Ok(s) => println!("{s}"),
                    Err(e) => eprintln!("{e}"),
                }
            }
            return;
        }
        for e in &self.errors {
            eprintln!("{}", e);
        }
    }

    fn push_error(&mut self, e: &anyhow::Error) {
        self.errors.push(format_error(&self.opts, e))
    }
}

fn emit_banner(opts: &Opts, handle: &EventHandle, cfg: &VolumeConfig) {
    use std::io::Write;

    if !opts.banner {
        return;
    }
    let dev = handle.device();
    println!(
        "Monitoring channel {} of '{}' (iio:device{})...",
        cfg.channel, dev.name, dev.number
    );
    _ = std::io::stdout().flush();
}

fn emit_update(evt: Option<&Event>, value: i64, opts: &Opts, timefmt: &TimeFmt) {
    if opts.quiet {
        return;
    }
    let update = Update {
        timestamp: evt.map(|e| format_time(e.timestamp_ns, timefmt)),
        direction: evt.map(|e| direction_name(e.direction)),
        value,
    };

    #[cfg(feature = "json")]
    if opts.emit.json {
        match serde_json::to_string(&update) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{e}"),
        }
        return;
    }
    println!("{}", update);
}

#[cfg_attr(feature = "serde", derive(Serialize))]
struct Update {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    timestamp: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    direction: Option<&'static str>,
    value: i64,
}

impl std::fmt::Display for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.timestamp, self.direction) {
            (Some(ts), Some(dirn)) => write!(f, "{}\t{}\t{}", ts, dirn, self.value),
            _ => write!(f, "initial\t{}", self.value),
        }
    }
}

fn direction_name(dirn: Direction) -> &'static str {
    match dirn {
        Direction::Rising => "rising",
        Direction::Falling => "falling",
        Direction::Either => "either",
        Direction::Other => "other",
    }
}
