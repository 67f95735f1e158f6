// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs::File;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::time::Duration;

// max time to wait for an event - expected or not
pub const EVENT_WAIT_TIMEOUT: Duration = Duration::from_millis(25);

// A connected pair standing in for an IIO event descriptor.
//
// Events written to the first are read from the second.
pub fn event_pair() -> (File, File) {
    let (tx, rx) = UnixStream::pair().unwrap();
    (File::from(OwnedFd::from(tx)), File::from(OwnedFd::from(rx)))
}

pub fn event_bytes(id: u64, timestamp: i64) -> Vec<u8> {
    let mut b = id.to_ne_bytes().to_vec();
    b.extend_from_slice(&timestamp.to_ne_bytes());
    b
}
