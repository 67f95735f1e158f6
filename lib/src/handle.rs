// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::attr::{AttributePaths, SysfsDir};
use crate::device::{self, Device, Platform};
use crate::event::{Event, EventChannel, EventIterator};
use crate::threshold;
use crate::{Result, VolumeConfig};
use std::os::unix::prelude::{AsFd, AsRawFd, BorrowedFd};
use std::time::Duration;

/// A monitored channel of a named IIO device.
///
/// Holds the event descriptor of the device and the attributes controlling
/// the threshold events of the channel.
/// The descriptor is closed when the handle is dropped.
#[derive(Debug)]
pub struct EventHandle {
    device: Device,
    paths: AttributePaths,
    sysfs: SysfsDir,
    events: EventChannel,
}

impl EventHandle {
    /// Locate the named device and open its event descriptor for the channel.
    pub fn open(platform: &Platform, name: &str, channel: u32) -> Result<EventHandle> {
        let device = device::resolve(platform, name)?;
        let paths = AttributePaths::new(channel);
        let events = EventChannel::open(platform, device.number)?;
        Ok(EventHandle {
            sysfs: SysfsDir::new(&device.dir),
            device,
            paths,
            events,
        })
    }

    /// The device being monitored.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The attributes of the monitored channel.
    pub fn paths(&self) -> &AttributePaths {
        &self.paths
    }

    /// The sysfs directory of the device.
    pub fn sysfs(&self) -> &SysfsDir {
        &self.sysfs
    }

    /// Read the current value of the channel and recenter the thresholds around it.
    ///
    /// Returns the value read.
    pub fn update(&self, cfg: &VolumeConfig) -> Result<i64> {
        threshold::update(cfg, &self.paths, &self.sysfs)
    }

    /// Returns true when the handle has events available to read.
    pub fn has_event(&self) -> Result<bool> {
        self.events.has_event()
    }

    /// Wait for an event to be available.
    pub fn wait_event(&self, timeout: Duration) -> Result<bool> {
        self.events.wait_event(timeout)
    }

    /// Read a single event, blocking until one is available.
    pub fn read_event(&self) -> Result<Event> {
        self.events.read_event()
    }

    /// An iterator over the events for the device.
    pub fn events(&self) -> EventIterator<'_> {
        self.events.events()
    }

    /// Release the handle, reporting any error closing the event descriptor.
    pub fn close(self) -> Result<()> {
        self.events.close()
    }
}

impl AsFd for EventHandle {
    #[inline]
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.events.as_fd()
    }
}

impl AsRawFd for EventHandle {
    #[inline]
    fn as_raw_fd(&self) -> i32 {
        self.events.as_raw_fd()
    }
}
