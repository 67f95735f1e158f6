// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::common::{emit_error, EmitOpts, PlatformOpts};
use anyhow::Context;
use clap::Parser;
use iiomon::device::{self, device_name, Device};

#[derive(Debug, Parser)]
#[command(aliases(["d", "ls"]))]
pub struct Opts {
    /// Only report devices with this name
    #[arg(value_name = "name")]
    name: Option<String>,

    #[command(flatten)]
    pub platform: PlatformOpts,

    #[command(flatten)]
    emit: EmitOpts,
}

pub fn cmd(opts: &Opts) -> bool {
    let platform = opts.platform.platform();
    let devs = match device::devices(&platform).with_context(|| {
        format!(
            "unable to list IIO devices in '{}'",
            platform.sysfs_root().display()
        )
    }) {
        Ok(devs) => devs,
        Err(e) => {
            emit_error(&opts.emit, &e);
            return false;
        }
    };
    let devs: Vec<Device> = devs
        .into_iter()
        .filter(|d| opts.name.as_ref().map_or(true, |n| &d.name == n))
        .collect();
    if let Some(name) = &opts.name {
        if devs.is_empty() {
            emit_error(
                &opts.emit,
                &anyhow::Error::new(iiomon::Error::NotFound(name.clone())),
            );
            return false;
        }
    }
    emit_devices(&devs, &opts.emit);
    true
}

fn emit_devices(devs: &[Device], opts: &EmitOpts) {
    #[cfg(feature = "json")]
    if opts.json {
        match serde_json::to_string(devs) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{e}"),
        }
        return;
    }
    #[cfg(not(feature = "json"))]
    let _ = opts;
    for d in devs {
        println!("{}", format_device(d));
    }
}

fn format_device(d: &Device) -> String {
    format!("{}\t{}\t{}", device_name(d.number), d.name, d.dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format() {
        let d = Device {
            number: 1,
            name: "palmas-gpadc".into(),
            dir: "/sys/bus/iio/devices/iio:device1".into(),
        };
        assert_eq!(
            format_device(&d),
            "iio:device1\tpalmas-gpadc\t/sys/bus/iio/devices/iio:device1"
        );
    }
}
