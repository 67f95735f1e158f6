// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The sysfs attributes used to monitor a voltage channel.
///
/// The paths are relative to the device directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributePaths {
    channel: u32,
    input: String,
    upper_enable: String,
    upper_value: String,
    lower_enable: String,
    lower_value: String,
}

impl AttributePaths {
    /// Build the attribute paths for the voltage channel.
    pub fn new(channel: u32) -> AttributePaths {
        let thresh = |dir: &str, attr: &str| {
            format!("events/in_voltage{}_thresh_{}_{}", channel, dir, attr)
        };
        AttributePaths {
            channel,
            input: format!("in_voltage{}_input", channel),
            upper_enable: thresh("rising", "en"),
            upper_value: thresh("rising", "value"),
            lower_enable: thresh("falling", "en"),
            lower_value: thresh("falling", "value"),
        }
    }

    /// The channel the paths were built for.
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// The processed value of the channel.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Enables the rising threshold event.
    pub fn upper_enable(&self) -> &str {
        &self.upper_enable
    }

    /// The value of the rising threshold.
    pub fn upper_value(&self) -> &str {
        &self.upper_value
    }

    /// Enables the falling threshold event.
    pub fn lower_enable(&self) -> &str {
        &self.lower_enable
    }

    /// The value of the falling threshold.
    pub fn lower_value(&self) -> &str {
        &self.lower_value
    }
}

/// Read and write access to the integer attributes of a device.
///
/// Attributes are identified by their path relative to the device.
pub trait AttrIo {
    /// Read an integer attribute.
    fn read_attr(&self, attr: &str) -> io::Result<i64>;

    /// Write a value to an attribute.
    fn write_attr(&self, attr: &str, value: &str) -> io::Result<()>;
}

/// The sysfs directory of a device.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SysfsDir {
    dir: PathBuf,
}

impl SysfsDir {
    /// Access the attributes of the device directory.
    pub fn new<P: Into<PathBuf>>(dir: P) -> SysfsDir {
        SysfsDir { dir: dir.into() }
    }

    /// The device directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// The absolute path of an attribute.
    pub fn attr_path(&self, attr: &str) -> PathBuf {
        self.dir.join(attr)
    }
}

impl AttrIo for SysfsDir {
    fn read_attr(&self, attr: &str) -> io::Result<i64> {
        let s = fs::read_to_string(self.attr_path(attr))?;
        s.trim()
            .parse::<i64>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("'{}' {}", s.trim(), e)))
    }

    fn write_attr(&self, attr: &str, value: &str) -> io::Result<()> {
        // sysfs attributes exist or they don't - never create them.
        let mut f = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.attr_path(attr))?;
        f.write_all(value.as_bytes())
    }
}
