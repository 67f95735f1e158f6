// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::common::{Error, Result, UnderReadError, ValidationError, ValidationResult};
use libc::c_int;
use std::fs::File;
use std::mem::size_of;
use std::os::unix::prelude::{AsRawFd, FromRawFd};

pub(crate) const IOCTL_MAGIC: u8 = b'i';

#[repr(u8)]
enum Ioctl {
    GetEventFd = 0x90,
}

/// The channel type of voltage channels, `IIO_VOLTAGE`.
pub const CHAN_TYPE_VOLTAGE: u8 = 0;

/// Request the event descriptor for an IIO device.
///
/// The returned file is independent of the character device, which may be
/// closed once the request has completed.
///
/// A device that does not support events fails the request with `ENODEV`.
///
/// * `cf` - The open IIO character device file.
pub fn get_event_fd(cf: &File) -> Result<File> {
    let mut fd: c_int = -1;
    // SAFETY: fd is only wrapped in a File once the kernel has populated it.
    unsafe {
        match libc::ioctl(
            cf.as_raw_fd(),
            nix::request_code_read!(IOCTL_MAGIC, Ioctl::GetEventFd, size_of::<c_int>()),
            &mut fd,
        ) {
            -1 => Err(Error::from_errno()),
            _ if fd < 0 => Err(Error::from(ValidationError::new(
                "fd",
                format!("invalid value: {}", fd),
            ))),
            _ => Ok(File::from_raw_fd(fd)),
        }
    }
}

/// The type of an IIO event, `enum iio_event_type`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    /// The value crossed a fixed threshold.
    Thresh = 0,
    /// The magnitude crossed a fixed threshold.
    Mag = 1,
    /// The rate of change crossed a threshold.
    Roc = 2,
    /// The value crossed an adaptive threshold.
    ThreshAdaptive = 3,
    /// The magnitude crossed an adaptive threshold.
    MagAdaptive = 4,
    /// The value changed.
    Change = 5,
    /// The magnitude relative to a reference crossed a threshold.
    MagReferenced = 6,
    /// A gesture was detected.
    Gesture = 7,
}

impl TryFrom<u8> for EventKind {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        use EventKind::*;
        Ok(match v {
            0 => Thresh,
            1 => Mag,
            2 => Roc,
            3 => ThreshAdaptive,
            4 => MagAdaptive,
            5 => Change,
            6 => MagReferenced,
            7 => Gesture,
            x => return Err(format!("invalid value: {}", x)),
        })
    }
}

/// The direction of an IIO event, `enum iio_event_direction`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventDirection {
    Either = 0,
    /// The value rose above the threshold.
    Rising = 1,
    /// The value fell below the threshold.
    Falling = 2,
    None = 3,
    SingleTap = 4,
    DoubleTap = 5,
}

impl TryFrom<u8> for EventDirection {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        use EventDirection::*;
        Ok(match v {
            0 => Either,
            1 => Rising,
            2 => Falling,
            3 => None,
            4 => SingleTap,
            5 => DoubleTap,
            x => return Err(format!("invalid value: {}", x)),
        })
    }
}

/// Build the event code for an event on an unmodified channel.
///
/// Equivalent to the kernel `IIO_UNMOD_EVENT_CODE` macro.
pub fn unmod_event_code(
    chan_type: u8,
    channel: i16,
    kind: EventKind,
    direction: EventDirection,
) -> u64 {
    (kind as u64) << 56 | (direction as u64) << 48 | (chan_type as u64) << 32 | channel as u16 as u64
}

/// An event read from the IIO event descriptor, `struct iio_event_data`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EventData {
    /// The event code, encoding the channel, type and direction of the event.
    pub id: u64,

    /// The best estimate of the time the event occurred, in nanoseconds.
    ///
    /// Uses **CLOCK_REALTIME** unless the device has been configured otherwise.
    pub timestamp: i64,
}

impl EventData {
    /// Read an event from a buffer.
    ///
    /// The buffer is assumed to have been populated by a read of the event File,
    /// so the content is validated before being returned.
    #[inline]
    pub fn from_slice(d: &[u64]) -> Result<&EventData> {
        debug_assert!(size_of::<EventData>() % 8 == 0);
        let len = d.len() * 8;
        if len < size_of::<EventData>() {
            return Err(Error::from(UnderReadError::new(
                "EventData",
                size_of::<EventData>(),
                len,
            )));
        }
        // SAFETY: EventData is plain data and the content is validated before being returned.
        let ed = unsafe { &*(d.as_ptr() as *const EventData) };
        ed.validate().map(|_| ed).map_err(Error::from)
    }

    /// Check that an EventData read from the kernel is valid in Rust.
    fn validate(&self) -> ValidationResult {
        EventKind::try_from(self.raw_kind()).map_err(|e| ValidationError::new("kind", e))?;
        EventDirection::try_from(self.raw_direction())
            .map_err(|e| ValidationError::new("direction", e))?;
        Ok(())
    }

    /// The number of u64 words required to store an EventData.
    pub fn u64_size() -> usize {
        size_of::<EventData>() / 8
    }

    fn raw_kind(&self) -> u8 {
        (self.id >> 56) as u8
    }

    fn raw_direction(&self) -> u8 {
        ((self.id >> 48) & 0x7f) as u8
    }

    /// The type of event.
    ///
    /// None if the kernel reports a type unknown to this library.
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::try_from(self.raw_kind()).ok()
    }

    /// The direction of the event.
    ///
    /// None if the kernel reports a direction unknown to this library.
    pub fn direction(&self) -> Option<EventDirection> {
        EventDirection::try_from(self.raw_direction()).ok()
    }

    /// The channel type, e.g. [`CHAN_TYPE_VOLTAGE`].
    pub fn chan_type(&self) -> u8 {
        (self.id >> 32) as u8
    }

    /// The channel modifier.
    pub fn modifier(&self) -> u8 {
        (self.id >> 40) as u8
    }

    /// The channel index.
    pub fn channel(&self) -> i16 {
        self.id as u16 as i16
    }

    /// The second channel of a differential channel pair.
    pub fn channel2(&self) -> i16 {
        (self.id >> 16) as u16 as i16
    }

    /// True if the event is on a differential channel.
    pub fn is_differential(&self) -> bool {
        (self.id >> 55) & 1 == 1
    }
}
