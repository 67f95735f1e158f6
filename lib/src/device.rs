// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The directory containing the IIO devices in sysfs.
pub const SYSFS_ROOT: &str = "/sys/bus/iio/devices";

/// The directory containing the IIO character devices.
pub const DEV_ROOT: &str = "/dev";

const DEVICE_PREFIX: &str = "iio:device";

/// The locations of the IIO device trees on the platform.
///
/// Both sysfs and the character devices live in well known locations, but the
/// roots can be relocated for containers, chroots and testing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Platform {
    sysfs_root: PathBuf,
    dev_root: PathBuf,
}

impl Default for Platform {
    fn default() -> Self {
        Platform {
            sysfs_root: PathBuf::from(SYSFS_ROOT),
            dev_root: PathBuf::from(DEV_ROOT),
        }
    }
}

impl Platform {
    /// Construct a Platform with the given sysfs and character device roots.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(sysfs_root: P, dev_root: Q) -> Platform {
        Platform {
            sysfs_root: sysfs_root.into(),
            dev_root: dev_root.into(),
        }
    }

    /// The directory containing the IIO device directories.
    pub fn sysfs_root(&self) -> &Path {
        &self.sysfs_root
    }

    /// The directory containing the IIO character devices.
    pub fn dev_root(&self) -> &Path {
        &self.dev_root
    }

    /// The sysfs directory of the numbered device, e.g. `/sys/bus/iio/devices/iio:device0`.
    pub fn device_dir(&self, number: u32) -> PathBuf {
        self.sysfs_root.join(device_name(number))
    }

    /// The character device of the numbered device, e.g. `/dev/iio:device0`.
    pub fn chardev_path(&self, number: u32) -> PathBuf {
        self.dev_root.join(device_name(number))
    }
}

/// The system name of the numbered device, e.g. `iio:device0`.
pub fn device_name(number: u32) -> String {
    format!("{}{}", DEVICE_PREFIX, number)
}

/// Extract the device number from an IIO device file name.
///
/// Returns None if the name is not of the form `iio:deviceN`.
pub fn device_number<S: AsRef<OsStr>>(file_name: S) -> Option<u32> {
    let num = file_name.as_ref().to_str()?.strip_prefix(DEVICE_PREFIX)?;
    if num.is_empty() || !num.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    num.parse().ok()
}

/// An IIO device located in sysfs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Device {
    /// The number of the device, the N in `iio:deviceN`.
    pub number: u32,

    /// The name of the device, as reported by its `name` attribute.
    ///
    /// This typically identifies the driver, such as "*palmas-gpadc*".
    pub name: String,

    /// The sysfs directory of the device.
    pub dir: PathBuf,
}

/// Returns all the IIO devices on the platform.
///
/// The devices are sorted by number.
/// Devices without a readable name are skipped.
/// A platform without an IIO sysfs tree has no devices.
pub fn devices(platform: &Platform) -> Result<Vec<Device>> {
    let root = platform.sysfs_root();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io(root.to_path_buf(), e)),
    };
    let mut devs = entries
        .filter_map(|x| x.ok())
        .filter_map(|de| device_number(de.file_name()))
        .filter_map(|number| read_device(platform, number))
        .collect::<Vec<Device>>();
    devs.sort_unstable_by_key(|d| d.number);
    Ok(devs)
}

fn read_device(platform: &Platform, number: u32) -> Option<Device> {
    let dir = platform.device_dir(number);
    let name = fs::read_to_string(dir.join("name")).ok()?;
    Some(Device {
        number,
        name: name.trim_end().to_string(),
        dir,
    })
}

/// Find the IIO device with the given name.
///
/// Returns the lowest numbered matching device.
pub fn resolve(platform: &Platform, name: &str) -> Result<Device> {
    let dev = devices(platform)?
        .into_iter()
        .find(|d| d.name == name)
        .ok_or_else(|| Error::NotFound(name.to_string()))?;
    tracing::info!(
        name,
        number = dev.number,
        dir = %dev.dir.display(),
        "found IIO device"
    );
    Ok(dev)
}
