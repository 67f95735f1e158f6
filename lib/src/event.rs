// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::device::Platform;
use crate::{Error, Result, UapiCall};
use iio_uapi::{EventData, EventDirection, ValidationError};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::mem;
use std::os::unix::prelude::{AsFd, AsRawFd, BorrowedFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The event descriptor of an IIO device.
///
/// The descriptor is obtained from the character device, which is only held
/// open for the duration of the request.
#[derive(Debug)]
pub struct EventChannel {
    /// The path of the character device the descriptor was obtained from.
    path: PathBuf,

    /// The event descriptor.
    f: File,
}

impl EventChannel {
    /// Obtain the event descriptor of the numbered device on the platform.
    pub fn open(platform: &Platform, number: u32) -> Result<EventChannel> {
        EventChannel::from_path(platform.chardev_path(number))
    }

    /// Obtain the event descriptor from the character device at the path.
    pub fn from_path<P: AsRef<Path>>(p: P) -> Result<EventChannel> {
        let path = p.as_ref().to_path_buf();
        let cf = File::open(&path).map_err(|e| Error::Io(path.clone(), e))?;
        let f = iio_uapi::get_event_fd(&cf).map_err(|e| event_fd_error(path.clone(), e))?;
        // the event descriptor is independent of the character device
        iio_uapi::close(cf).map_err(|e| Error::Uapi(UapiCall::Close, path.clone(), e))?;
        tracing::debug!(path = %path.display(), "opened event descriptor");
        Ok(EventChannel { path, f })
    }

    /// The path of the character device.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true when the descriptor has events available to read.
    pub fn has_event(&self) -> Result<bool> {
        iio_uapi::has_event(&self.f).map_err(|e| self.uapi_error(UapiCall::HasEvent, e))
    }

    /// Wait for an event to be available.
    ///
    /// Returns true if [`read_event`] will return an event without blocking.
    ///
    /// [`read_event`]: #method.read_event
    pub fn wait_event(&self, timeout: Duration) -> Result<bool> {
        iio_uapi::wait_event(&self.f, timeout).map_err(|e| self.uapi_error(UapiCall::WaitEvent, e))
    }

    /// Read a single event.
    ///
    /// Blocks until an event is available.
    pub fn read_event(&self) -> Result<Event> {
        let mut buf = [0_u64; mem::size_of::<EventData>() / 8];
        self.read_into(&mut buf)
    }

    /// An iterator over the events from the descriptor.
    ///
    /// The iterator blocks waiting for events and never returns None.
    pub fn events(&self) -> EventIterator<'_> {
        EventIterator {
            ch: self,
            buf: vec![0_u64; EventData::u64_size()],
        }
    }

    /// Close the event descriptor, reporting any error returned by the kernel.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        iio_uapi::close(self.f).map_err(|e| Error::Uapi(UapiCall::Close, path, e))
    }

    fn read_into(&self, buf: &mut [u64]) -> Result<Event> {
        let n = iio_uapi::read_event(&self.f, buf)
            .map_err(|e| self.uapi_error(UapiCall::ReadEvent, e))?;
        let ed = EventData::from_slice(&buf[..n])
            .map_err(|e| self.uapi_error(UapiCall::EventFromBuf, e))?;
        Event::try_from(ed).map_err(|e| self.uapi_error(UapiCall::EventFromBuf, e.into()))
    }

    fn uapi_error(&self, call: UapiCall, e: iio_uapi::Error) -> Error {
        Error::Uapi(call, self.path.clone(), e)
    }
}

// Devices without event support reject the request with ENODEV.
fn event_fd_error(path: PathBuf, e: iio_uapi::Error) -> Error {
    if e.raw_os_error() == Some(libc::ENODEV) {
        Error::Unsupported(path)
    } else {
        Error::Uapi(UapiCall::GetEventFd, path, e)
    }
}

impl AsFd for EventChannel {
    #[inline]
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.f.as_fd()
    }
}

impl AsRawFd for EventChannel {
    #[inline]
    fn as_raw_fd(&self) -> i32 {
        self.f.as_raw_fd()
    }
}

/// An iterator for reading events from an [`EventChannel`].
///
/// Reads block until an event is available.
pub struct EventIterator<'a> {
    ch: &'a EventChannel,

    /// The buffer for uAPI events.
    buf: Vec<u64>,
}

impl<'a> Iterator for EventIterator<'a> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.ch.read_into(&mut self.buf))
    }
}

/// An event reported by an IIO device.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Event {
    /// The best estimate of time of event occurrence, in nanoseconds.
    ///
    /// The kernel uses **CLOCK_REALTIME** unless the device is configured otherwise.
    pub timestamp_ns: i64,

    /// The type of event.
    pub kind: EventKind,

    /// The direction of the crossing.
    pub direction: Direction,

    /// The type of the channel, e.g. [`iio_uapi::event::CHAN_TYPE_VOLTAGE`].
    pub chan_type: u8,

    /// The index of the channel that triggered the event.
    pub channel: i16,

    /// The raw event code.
    pub code: u64,
}

impl TryFrom<&EventData> for Event {
    type Error = ValidationError;

    fn try_from(ed: &EventData) -> std::result::Result<Self, Self::Error> {
        let kind = ed
            .kind()
            .ok_or_else(|| ValidationError::new("kind", format!("unknown in code {:#x}", ed.id)))?;
        let direction = ed.direction().ok_or_else(|| {
            ValidationError::new("direction", format!("unknown in code {:#x}", ed.id))
        })?;
        Ok(Event {
            timestamp_ns: ed.timestamp,
            kind: EventKind::from(kind),
            direction: Direction::from(direction),
            chan_type: ed.chan_type(),
            channel: ed.channel(),
            code: ed.id,
        })
    }
}

/// The type of an [`Event`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventKind {
    /// The value crossed a threshold.
    Threshold,
    Magnitude,
    RateOfChange,
    AdaptiveThreshold,
    AdaptiveMagnitude,
    Change,
    ReferencedMagnitude,
    Gesture,
}

impl From<iio_uapi::EventKind> for EventKind {
    fn from(kind: iio_uapi::EventKind) -> Self {
        use iio_uapi::EventKind as K;
        match kind {
            K::Thresh => EventKind::Threshold,
            K::Mag => EventKind::Magnitude,
            K::Roc => EventKind::RateOfChange,
            K::ThreshAdaptive => EventKind::AdaptiveThreshold,
            K::MagAdaptive => EventKind::AdaptiveMagnitude,
            K::Change => EventKind::Change,
            K::MagReferenced => EventKind::ReferencedMagnitude,
            K::Gesture => EventKind::Gesture,
        }
    }
}

/// The direction of an [`Event`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// The value rose above the upper threshold.
    Rising,

    /// The value fell below the lower threshold.
    Falling,

    /// The value crossed a threshold in either direction.
    Either,

    /// A direction that does not apply to thresholds.
    Other,
}

impl From<EventDirection> for Direction {
    fn from(dirn: EventDirection) -> Self {
        match dirn {
            EventDirection::Rising => Direction::Rising,
            EventDirection::Falling => Direction::Falling,
            EventDirection::Either => Direction::Either,
            _ => Direction::Other,
        }
    }
}
