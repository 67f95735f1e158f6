// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: MIT

//! A thin but safe Rust layer around the Linux IIO event uAPI.
//!
//! The IIO character device, `/dev/iio:deviceN`, is only used here to request a
//! dedicated event descriptor.  Threshold and other events are then read from
//! that descriptor as fixed size [`EventData`] records.

pub(crate) mod common;

pub use common::{
    close, has_event, read_event, wait_event, Error, Result, UnderReadError, ValidationError,
};

/// The IIO event ABI, as defined in `linux/iio/events.h`.
pub mod event;

pub use event::{get_event_fd, EventData, EventDirection, EventKind};
