// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: MIT

use core::ptr::null;
use libc::{c_long, c_void, pollfd, ppoll, sigset_t, time_t, timespec, POLLIN};
use std::fs::File;
use std::io::Error as IoError;
use std::mem::size_of;
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::time::Duration;

/// Check if the file has an event available to read.
pub fn has_event(f: &File) -> Result<bool> {
    wait_event(f, Duration::ZERO)
}

/// Wait for the file to have an event available to read.
///
/// Returns false if the timeout expires before an event is available.
pub fn wait_event(f: &File, d: Duration) -> Result<bool> {
    let mut pfd = pollfd {
        fd: f.as_raw_fd(),
        events: POLLIN,
        revents: 0,
    };
    let timeout = timespec {
        tv_sec: d.as_secs() as time_t,
        tv_nsec: d.subsec_nanos() as c_long,
    };
    // SAFETY: pfd and timeout outlive the call and the sigmask is null.
    unsafe {
        match ppoll(
            std::ptr::addr_of_mut!(pfd),
            1,
            std::ptr::addr_of!(timeout),
            null() as *const sigset_t,
        ) {
            -1 => Err(Error::from_errno()),
            0 => Ok(false),
            _ => Ok(true),
        }
    }
}

/// Read events from the file into a buffer.
///
/// Blocks until at least one event is available.
///
/// * `f` - The event file returned by [`get_event_fd`].
/// * `buf` - The buffer to read into, sized in u64 words.
///
/// Returns the number of u64 words read.
///
/// [`get_event_fd`]: crate::event::get_event_fd
pub fn read_event(f: &File, buf: &mut [u64]) -> Result<usize> {
    // SAFETY: the read is bounded by the size of buf.
    let n = unsafe {
        libc::read(
            f.as_raw_fd(),
            buf.as_mut_ptr() as *mut c_void,
            buf.len() * size_of::<u64>(),
        )
    };
    if n < 0 {
        return Err(Error::from_errno());
    }
    let n = n as usize;
    if n % size_of::<u64>() != 0 {
        return Err(Error::from(UnderReadError::new(
            "read_event",
            (n / size_of::<u64>() + 1) * size_of::<u64>(),
            n,
        )));
    }
    Ok(n / size_of::<u64>())
}

/// Close the file, reporting any error returned by the kernel.
///
/// Dropping a [`File`] silently discards close errors, which is not acceptable
/// when the caller needs to know if the descriptor was released cleanly.
pub fn close(f: File) -> Result<()> {
    let fd = f.into_raw_fd();
    // SAFETY: fd was owned by f and is not used again.
    match unsafe { libc::close(fd) } {
        0 => Ok(()),
        _ => Err(Error::from_errno()),
    }
}

/// The result returned by [`iio_uapi`] functions.
///
/// [`iio_uapi`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Result returned by struct validators.
pub type ValidationResult = std::result::Result<(), ValidationError>;

/// Errors returned by [`iio_uapi`] functions.
///
/// [`iio_uapi`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error returned from an underlying system call.
    #[error(transparent)]
    Os(#[from] std::io::Error),

    /// A read returned less than a complete object.
    #[error(transparent)]
    UnderRead(#[from] UnderReadError),

    /// A struct returned by the kernel failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    pub(crate) fn from_errno() -> Error {
        Error::Os(IoError::last_os_error())
    }

    /// The errno returned by the system call, if the error came from one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Os(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

/// A failure to validate a struct returned from a system call.
//
// Should only be seen if a kernel update adds an enum value we are unaware of.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("Kernel returned invalid {field}: {msg}")]
pub struct ValidationError {
    pub field: String,
    pub msg: String,
}

impl ValidationError {
    pub fn new<S: Into<String>, T: Into<String>>(field: S, msg: T) -> ValidationError {
        ValidationError {
            field: field.into(),
            msg: msg.into(),
        }
    }
}

/// A read returned fewer bytes than required for the object.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("Reading {obj} returned {found} bytes, expected {expected}.")]
pub struct UnderReadError {
    /// The object being read.
    pub obj: &'static str,
    /// The number of bytes expected.
    pub expected: usize,
    /// The number of bytes read.
    pub found: usize,
}

impl UnderReadError {
    pub fn new(obj: &'static str, expected: usize, found: usize) -> UnderReadError {
        UnderReadError {
            obj,
            expected,
            found,
        }
    }
}
