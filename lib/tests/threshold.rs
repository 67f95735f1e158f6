// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Drive the threshold controller against a fake sysfs tree.

mod common;

use common::FakeIio;
use iiomon::attr::{AttributePaths, SysfsDir};
use iiomon::device;
use iiomon::threshold::update;
use iiomon::VolumeConfig;

fn setup(value: i64) -> (FakeIio, SysfsDir, AttributePaths) {
    let iio = FakeIio::new().with_device(1, "palmas-gpadc", 2, value);
    let dev = device::resolve(iio.platform(), "palmas-gpadc").unwrap();
    (iio, SysfsDir::new(dev.dir), AttributePaths::new(2))
}

#[test]
fn brackets_value() {
    let (iio, sysfs, paths) = setup(100);
    let v = update(&VolumeConfig::default(), &paths, &sysfs).unwrap();
    assert_eq!(v, 100);
    assert_eq!(iio.thresh(1, 2, "rising_value"), "125");
    assert_eq!(iio.thresh(1, 2, "rising_en"), "1");
    assert_eq!(iio.thresh(1, 2, "falling_value"), "75");
    assert_eq!(iio.thresh(1, 2, "falling_en"), "1");
}

#[test]
fn follows_value() {
    let (iio, sysfs, paths) = setup(100);
    let cfg = VolumeConfig::default();
    update(&cfg, &paths, &sysfs).unwrap();

    // falls near the bottom of the range
    iio.set_value(1, 2, 10);
    assert_eq!(update(&cfg, &paths, &sysfs).unwrap(), 10);
    assert_eq!(iio.thresh(1, 2, "rising_value"), "35");
    assert_eq!(iio.thresh(1, 2, "rising_en"), "1");
    assert_eq!(iio.thresh(1, 2, "falling_en"), "0");
    // a disarmed threshold keeps its stale value
    assert_eq!(iio.thresh(1, 2, "falling_value"), "75");

    // rises to the top of the range
    iio.set_value(1, 2, 2047);
    assert_eq!(update(&cfg, &paths, &sysfs).unwrap(), 2047);
    assert_eq!(iio.thresh(1, 2, "rising_en"), "0");
    assert_eq!(iio.thresh(1, 2, "rising_value"), "35");
    assert_eq!(iio.thresh(1, 2, "falling_value"), "2022");
    assert_eq!(iio.thresh(1, 2, "falling_en"), "1");
}

#[test]
fn custom_config() -> anyhow::Result<()> {
    let (iio, sysfs, paths) = setup(500);
    let cfg: VolumeConfig = "channel=2 min=0 max=0x3FF step=100".parse()?;
    assert_eq!(update(&cfg, &paths, &sysfs)?, 500);
    assert_eq!(iio.thresh(1, 2, "rising_value"), "600");
    assert_eq!(iio.thresh(1, 2, "falling_value"), "400");
    Ok(())
}

#[test]
fn missing_lower_attrs() {
    let (iio, sysfs, paths) = setup(100);
    let events = iio.device_dir(1).join("events");
    std::fs::remove_file(events.join("in_voltage2_thresh_falling_value")).unwrap();
    std::fs::remove_file(events.join("in_voltage2_thresh_falling_en")).unwrap();
    // upper is still armed and the value returned
    assert_eq!(
        update(&VolumeConfig::default(), &paths, &sysfs).unwrap(),
        100
    );
    assert_eq!(iio.thresh(1, 2, "rising_value"), "125");
    assert_eq!(iio.thresh(1, 2, "rising_en"), "1");
}

#[test]
fn unreadable_value() {
    let (iio, sysfs, paths) = setup(100);
    std::fs::write(iio.device_dir(1).join("in_voltage2_input"), "n/a\n").unwrap();
    match update(&VolumeConfig::default(), &paths, &sysfs) {
        Err(iiomon::Error::ReadFailed(attr, _)) => assert_eq!(attr, "in_voltage2_input"),
        x => panic!("unexpected result: {:?}", x),
    }
    assert_eq!(iio.thresh(1, 2, "rising_en"), "0");
    assert_eq!(iio.thresh(1, 2, "falling_en"), "0");
}

#[test]
fn unwritable_value_disables_event() {
    let (iio, sysfs, paths) = setup(100);
    let cfg = VolumeConfig::default();
    update(&cfg, &paths, &sysfs).unwrap();
    assert_eq!(iio.thresh(1, 2, "rising_en"), "1");

    // writes never create the attribute, so removing it makes it unwritable
    let events = iio.device_dir(1).join("events");
    std::fs::remove_file(events.join("in_voltage2_thresh_rising_value")).unwrap();
    iio.set_value(1, 2, 300);
    assert_eq!(update(&cfg, &paths, &sysfs).unwrap(), 300);
    // not left enabled at 125, below the current value
    assert_eq!(iio.thresh(1, 2, "rising_en"), "0");
    assert_eq!(iio.thresh(1, 2, "falling_value"), "275");
    assert_eq!(iio.thresh(1, 2, "falling_en"), "1");
}
