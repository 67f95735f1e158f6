// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A command line tool for tracking an IIO ADC channel using threshold events.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod common;
mod config;
mod devices;
mod monitor;

fn main() -> ExitCode {
    match Opts::try_parse() {
        Ok(opt) => {
            init_tracing(opt.verbose);
            let res = match opt.cmd {
                Command::Config(cfg) => config::cmd(&cfg),
                Command::Devices(cfg) => devices::cmd(&cfg),
                Command::Monitor(cfg) => monitor::cmd(&cfg),
            };
            return if res {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
        Err(e) => {
            // help and version are not failures
            if !e.use_stderr() {
                _ = e.print();
                return ExitCode::SUCCESS;
            }
            eprintln!("{e}")
        }
    }
    ExitCode::FAILURE
}

// Log to stderr, filtered by RUST_LOG if set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[derive(Parser)]
#[command(
    name = "iio-volmon",
    about = "A utility to track an IIO ADC channel on Linux using threshold events.",
    version,
    propagate_version = true
)]
struct Opts {
    /// Provide more detailed error messages and logging.
    #[arg(short = 'v', long, global = true, display_order = 800)]
    pub verbose: bool,

    /// The directory containing the IIO devices in sysfs.
    #[arg(
        long,
        global = true,
        value_name = "dir",
        env = "IIO_SYSFS_ROOT",
        default_value = iiomon::device::SYSFS_ROOT,
        display_order = 801
    )]
    pub sysfs_root: std::path::PathBuf,

    /// The directory containing the IIO character devices.
    #[arg(
        long,
        global = true,
        value_name = "dir",
        env = "IIO_DEV_ROOT",
        default_value = iiomon::device::DEV_ROOT,
        display_order = 802
    )]
    pub dev_root: std::path::PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
enum Command {
    /// Report the effective threshold configuration.
    Config(config::Opts),

    /// List the IIO devices on the platform.
    Devices(devices::Opts),

    /// Track a channel, recentering the thresholds on each event.
    Monitor(monitor::Opts),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[test]
    fn global_roots() {
        let opts =
            Opts::try_parse_from(["iio-volmon", "devices", "--sysfs-root", "/tmp/sys"]).unwrap();
        assert_eq!(opts.sysfs_root, std::path::PathBuf::from("/tmp/sys"));
        match opts.cmd {
            Command::Devices(d) => {
                assert_eq!(d.platform.sysfs_root, std::path::PathBuf::from("/tmp/sys"));
            }
            _ => panic!("unexpected command"),
        }
    }
}
