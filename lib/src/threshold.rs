// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::attr::{AttrIo, AttributePaths};
use crate::config::VolumeConfig;
use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// The target state of a single threshold event.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Threshold {
    /// The event is enabled at the value.
    Armed(i64),

    /// The event is disabled.
    Disarmed,
}

impl Threshold {
    /// Returns true if the event is to be enabled.
    pub fn is_armed(&self) -> bool {
        matches!(self, Threshold::Armed(_))
    }

    /// The value the threshold is armed at, if any.
    pub fn value(&self) -> Option<i64> {
        match self {
            Threshold::Armed(v) => Some(*v),
            Threshold::Disarmed => None,
        }
    }
}

/// The pair of thresholds bracketing the current value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bracket {
    /// The rising threshold.
    pub upper: Threshold,

    /// The falling threshold.
    pub lower: Threshold,
}

impl Bracket {
    /// Compute the thresholds for the value `v`.
    ///
    /// The upper threshold sits `step` above `v`, clamped to `max`, and is
    /// only armed if it remains above `v`.
    ///
    /// The lower threshold sits `step` below `v`, clamped to `min`, and is
    /// only armed if it remains below `v` and is greater than `step`.
    pub fn around(cfg: &VolumeConfig, v: i64) -> Bracket {
        let up = v.saturating_add(cfg.step).min(cfg.max);
        let upper = if up > v {
            Threshold::Armed(up)
        } else {
            Threshold::Disarmed
        };
        let low = v.saturating_sub(cfg.step).max(cfg.min);
        // compared against the step, not the min
        let lower = if low < v && low > cfg.step {
            Threshold::Armed(low)
        } else {
            Threshold::Disarmed
        };
        Bracket { upper, lower }
    }
}

/// Write the bracket to the threshold attributes.
///
/// Arming a threshold writes the value and then enables the event.
/// If the value cannot be written the event is disabled instead.
/// Disarming only disables the event.
/// A failure on one threshold does not prevent the other being written.
///
/// Returns the number of writes that failed.
pub fn apply<A: AttrIo + ?Sized>(paths: &AttributePaths, io: &A, bracket: &Bracket) -> usize {
    let upper = set(
        io,
        "upper",
        paths.upper_value(),
        paths.upper_enable(),
        bracket.upper,
    );
    let lower = set(
        io,
        "lower",
        paths.lower_value(),
        paths.lower_enable(),
        bracket.lower,
    );
    upper + lower
}

fn set<A: AttrIo + ?Sized>(
    io: &A,
    name: &str,
    value_attr: &str,
    enable_attr: &str,
    t: Threshold,
) -> usize {
    match t {
        Threshold::Armed(value) => {
            match failed(name, write(io, value_attr, &value.to_string())) {
                0 => failed(name, write(io, enable_attr, "1")),
                // never leave the event enabled at a stale value
                n => n + failed(name, write(io, enable_attr, "0")),
            }
        }
        Threshold::Disarmed => failed(name, write(io, enable_attr, "0")),
    }
}

fn failed(name: &str, res: Result<()>) -> usize {
    match res {
        Ok(()) => 0,
        Err(e) => {
            tracing::warn!(threshold = name, error = %e, "failed to update threshold");
            1
        }
    }
}

fn write<A: AttrIo + ?Sized>(io: &A, attr: &str, value: &str) -> Result<()> {
    tracing::debug!(attr, value, "write");
    io.write_attr(attr, value)
        .map_err(|e| Error::WriteFailed(attr.to_string(), e))
}

/// Read the current value of the channel and recenter the thresholds around it.
///
/// Write failures are logged and do not fail the update.
///
/// Returns the value read.
pub fn update<A: AttrIo + ?Sized>(
    cfg: &VolumeConfig,
    paths: &AttributePaths,
    io: &A,
) -> Result<i64> {
    let v = io.read_attr(paths.input()).map_err(|e| {
        tracing::warn!(attr = paths.input(), error = %e, "failed to read value");
        Error::ReadFailed(paths.input().to_string(), e)
    })?;
    let bracket = Bracket::around(cfg, v);
    tracing::debug!(
        value = v,
        upper = ?bracket.upper,
        lower = ?bracket.lower,
        "recentering thresholds"
    );
    apply(paths, io, &bracket);
    Ok(v)
}
