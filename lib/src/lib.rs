// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: MIT

//! A library for tracking an IIO ADC channel on Linux platforms
//! using hardware threshold events.
//!
//! Rather than polling the channel, a pair of rising and falling thresholds
//! bracket the last observed value.  The device signals an event when the value
//! leaves the bracket, at which point the value is read and the bracket is
//! recentered around it.
//!
//! The device is located by name using the [`device`] module.
//!
//! The event descriptor for the device is provided by the [`event`] module.
//!
//! The sysfs attributes controlling the thresholds are located and accessed
//! using the [`attr`] module, and the bracket is computed and applied by the
//! [`threshold`] module.
//!
//! The [`EventHandle`] ties these together for a single channel:
//! ```no_run
//! # fn example() -> iiomon::Result<()> {
//! use iiomon::{device::Platform, EventHandle, VolumeConfig};
//!
//! let cfg = VolumeConfig::default();
//! let handle = EventHandle::open(&Platform::default(), "palmas-gpadc", cfg.channel)?;
//! handle.update(&cfg)?;
//! loop {
//!     let evt = handle.read_event()?;
//!     let value = handle.update(&cfg)?;
//!     println!("{:?} -> {}", evt.direction, value);
//! }
//! # }
//! ```
//!
//! [`device`]: module@device
//! [`event`]: module@event
//! [`attr`]: module@attr
//! [`threshold`]: module@threshold

use std::fmt;
use std::path::PathBuf;

/// Types and functions for accessing the sysfs attributes of a channel.
pub mod attr;

/// The monitor configuration.
pub mod config;
pub use config::VolumeConfig;

/// Types and functions to locate IIO devices.
pub mod device;

/// Types and functions for the IIO event descriptor.
pub mod event;

mod handle;
pub use handle::EventHandle;

/// The threshold hysteresis controller.
pub mod threshold;

/// Errors returned by [`iiomon`] functions.
///
/// [`iiomon`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No IIO device has the requested name.
    #[error("cannot find IIO device \"{0}\"")]
    NotFound(String),

    /// The IIO device does not support events.
    #[error("\"{0}\" does not support events")]
    Unsupported(PathBuf),

    /// An error returned from an underlying uAPI call.
    #[error("uAPI {0} on \"{1}\" returned: {2}")]
    Uapi(UapiCall, PathBuf, #[source] iio_uapi::Error),

    /// An error accessing a file.
    #[error("\"{0}\": {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The value of the channel could not be read.
    #[error("failed to read \"{0}\": {1}")]
    ReadFailed(String, #[source] std::io::Error),

    /// A threshold attribute could not be written.
    #[error("failed to write \"{0}\": {1}")]
    WriteFailed(String, #[source] std::io::Error),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// Identifiers for the underlying uAPI calls.
#[doc(hidden)]
#[derive(Debug, Eq, PartialEq)]
pub enum UapiCall {
    Close,
    EventFromBuf,
    GetEventFd,
    HasEvent,
    ReadEvent,
    WaitEvent,
}

impl fmt::Display for UapiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UapiCall::Close => "close",
            UapiCall::EventFromBuf => "EventData::from_slice",
            UapiCall::GetEventFd => "get_event_fd",
            UapiCall::HasEvent => "has_event",
            UapiCall::ReadEvent => "read_event",
            UapiCall::WaitEvent => "wait_event",
        };
        write!(f, "{}", name)
    }
}

/// The result for [`iiomon`] functions.
///
/// [`iiomon`]: crate
pub type Result<T> = std::result::Result<T, Error>;
