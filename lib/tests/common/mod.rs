// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(dead_code)]

use iiomon::device::{device_name, Platform};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const THRESH_ATTRS: [&str; 4] = [
    "thresh_rising_en",
    "thresh_rising_value",
    "thresh_falling_en",
    "thresh_falling_value",
];

// A fake IIO platform, with sysfs and dev trees in a temporary directory.
pub struct FakeIio {
    root: TempDir,
    platform: Platform,
}

impl FakeIio {
    pub fn new() -> FakeIio {
        let root = tempfile::tempdir().unwrap();
        let sysfs = root.path().join("sys/bus/iio/devices");
        let dev = root.path().join("dev");
        fs::create_dir_all(&sysfs).unwrap();
        fs::create_dir_all(&dev).unwrap();
        FakeIio {
            platform: Platform::new(sysfs, dev),
            root,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    // Add a named device with a voltage channel supporting threshold events.
    pub fn with_device(self, number: u32, name: &str, channel: u32, value: i64) -> FakeIio {
        let dir = self.platform.device_dir(number);
        fs::create_dir_all(dir.join("events")).unwrap();
        fs::write(dir.join("name"), format!("{}\n", name)).unwrap();
        fs::write(
            dir.join(format!("in_voltage{}_input", channel)),
            format!("{}\n", value),
        )
        .unwrap();
        for attr in THRESH_ATTRS {
            fs::write(
                dir.join(format!("events/in_voltage{}_{}", channel, attr)),
                "0\n",
            )
            .unwrap();
        }
        self
    }

    // Add a character device standing in for the real one.
    //
    // Being a regular file it rejects the event descriptor request.
    pub fn with_chardev(self, number: u32) -> FakeIio {
        fs::write(self.chardev(number), "").unwrap();
        self
    }

    pub fn chardev(&self, number: u32) -> PathBuf {
        self.platform.chardev_path(number)
    }

    pub fn set_value(&self, number: u32, channel: u32, value: i64) {
        fs::write(
            self.platform
                .device_dir(number)
                .join(format!("in_voltage{}_input", channel)),
            format!("{}\n", value),
        )
        .unwrap();
    }

    // Read a threshold attribute, e.g. "rising_en".
    pub fn thresh(&self, number: u32, channel: u32, attr: &str) -> String {
        fs::read_to_string(
            self.platform
                .device_dir(number)
                .join(format!("events/in_voltage{}_thresh_{}", channel, attr)),
        )
        .unwrap()
        .trim()
        .to_string()
    }

    pub fn device_dir(&self, number: u32) -> PathBuf {
        self.platform.sysfs_root().join(device_name(number))
    }
}
