// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The channel monitored by default.
pub const DEFAULT_CHANNEL: u32 = 2;

/// The default lower bound of the thresholds.
pub const DEFAULT_MIN: i64 = 0;

/// The default upper bound of the thresholds, the full scale of a 12-bit ADC.
pub const DEFAULT_MAX: i64 = 0x7FF;

/// The default distance from the current value to each threshold.
pub const DEFAULT_STEP: i64 = 25;

const FIELDS: [&str; 4] = ["channel", "min", "max", "step"];

/// The configuration of the monitored channel and its thresholds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeConfig {
    /// The index of the voltage channel.
    pub channel: u32,

    /// The lowest value a threshold may take.
    pub min: i64,

    /// The highest value a threshold may take.
    pub max: i64,

    /// The distance from the current value to each threshold.
    pub step: i64,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        VolumeConfig {
            channel: DEFAULT_CHANNEL,
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            step: DEFAULT_STEP,
        }
    }
}

impl VolumeConfig {
    /// Construct a validated configuration.
    pub fn new(channel: u32, min: i64, max: i64, step: i64) -> Result<VolumeConfig, ConfigError> {
        let cfg = VolumeConfig {
            channel,
            min,
            max,
            step,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that the bounds are ordered and the step is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::Range(self.min, self.max));
        }
        if self.step <= 0 {
            return Err(ConfigError::Step(self.step));
        }
        Ok(())
    }

    /// Load the configuration from a file.
    ///
    /// If the file cannot be opened the default configuration is returned.
    /// Fields not specified in the file keep their default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<VolumeConfig, ConfigError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if is_open_failure(&e) => {
                tracing::warn!(path = %path.display(), error = %e, "using default configuration");
                return Ok(VolumeConfig::default());
            }
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        };
        let cfg: VolumeConfig = text.parse()?;
        tracing::debug!(path = %path.display(), ?cfg, "loaded configuration");
        Ok(cfg)
    }

    fn set(&mut self, field: &str, token: &str) -> Result<(), ConfigError> {
        let parse_err = || ConfigError::Parse(field.to_string(), token.to_string());
        match field {
            "channel" => {
                self.channel = parse_int(token)
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(parse_err)?
            }
            "min" => self.min = parse_int(token).ok_or_else(parse_err)?,
            "max" => self.max = parse_int(token).ok_or_else(parse_err)?,
            "step" => self.step = parse_int(token).ok_or_else(parse_err)?,
            _ => return Err(ConfigError::UnknownKey(field.to_string())),
        }
        Ok(())
    }
}

fn is_open_failure(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    )
}

/// Parse a decimal or `0x` prefixed hexadecimal integer.
pub fn parse_int(s: &str) -> Option<i64> {
    let (neg, mag) = match s.strip_prefix('-') {
        Some(m) => (true, m),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits = mag.strip_prefix("0x").or_else(|| mag.strip_prefix("0X"));
    // only the leading sign is permitted
    if digits.unwrap_or(mag).starts_with(['+', '-']) {
        return None;
    }
    let v = match digits {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => mag.parse::<i64>().ok()?,
    };
    Some(if neg { -v } else { v })
}

impl FromStr for VolumeConfig {
    type Err = ConfigError;

    /// Parse the configuration file format.
    ///
    /// Tokens are separated by whitespace and `#` starts a comment.
    /// A token is either `key=value` or a positional value filling the
    /// channel, min, max and step in that order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cfg = VolumeConfig::default();
        let mut positional = 0;
        let tokens = s
            .lines()
            .map(|line| line.split_once('#').map_or(line, |(data, _)| data))
            .flat_map(str::split_whitespace);
        for token in tokens {
            match token.split_once('=') {
                Some((key, value)) => cfg.set(key.trim(), value.trim())?,
                None => {
                    let field = FIELDS
                        .get(positional)
                        .ok_or_else(|| ConfigError::Excess(token.to_string()))?;
                    cfg.set(field, token)?;
                    positional += 1;
                }
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

impl fmt::Display for VolumeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel={} min={} max={} step={}",
            self.channel, self.min, self.max, self.step
        )
    }
}

/// Errors detected while loading a [`VolumeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("cannot read config \"{0}\": {1}")]
    Io(PathBuf, #[source] io::Error),

    /// A value could not be parsed.
    #[error("invalid {0}: '{1}'")]
    Parse(String, String),

    /// A key is not a configuration field.
    #[error("unknown key: '{0}'")]
    UnknownKey(String),

    /// More positional values than fields.
    #[error("unexpected value: '{0}'")]
    Excess(String),

    /// The bounds are inverted.
    #[error("min {0} exceeds max {1}")]
    Range(i64, i64),

    /// The step is not positive.
    #[error("step must be positive: {0}")]
    Step(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        let cfg = VolumeConfig::default();
        assert_eq!(cfg.channel, 2);
        assert_eq!(cfg.min, 0);
        assert_eq!(cfg.max, 0x7FF);
        assert_eq!(cfg.step, 25);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn new() {
        let cfg = VolumeConfig::new(1, 10, 100, 5).unwrap();
        assert_eq!(cfg.channel, 1);
        assert_eq!(cfg.step, 5);
        assert!(matches!(
            VolumeConfig::new(1, 100, 10, 5),
            Err(ConfigError::Range(100, 10))
        ));
        assert!(matches!(
            VolumeConfig::new(1, 0, 10, 0),
            Err(ConfigError::Step(0))
        ));
        assert!(matches!(
            VolumeConfig::new(1, 0, 10, -1),
            Err(ConfigError::Step(-1))
        ));
        // degenerate but valid
        assert!(VolumeConfig::new(0, 7, 7, 1).is_ok());
    }

    #[test]
    fn display() {
        assert_eq!(
            VolumeConfig::default().to_string(),
            "channel=2 min=0 max=2047 step=25"
        );
    }

    #[test]
    fn parse_int() {
        use super::parse_int;

        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("2047"), Some(2047));
        assert_eq!(parse_int("0x7FF"), Some(2047));
        assert_eq!(parse_int("0X7ff"), Some(2047));
        assert_eq!(parse_int("-25"), Some(-25));
        assert_eq!(parse_int("+25"), Some(25));
        assert_eq!(parse_int("-0x10"), Some(-16));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("--5"), None);
        assert_eq!(parse_int("-+5"), None);
        assert_eq!(parse_int("0x-5"), None);
        assert_eq!(parse_int("12ab"), None);
        assert_eq!(parse_int("banana"), None);
    }

    mod from_str {
        use super::*;

        #[test]
        fn empty() {
            assert_eq!(
                "".parse::<VolumeConfig>().unwrap(),
                VolumeConfig::default()
            );
            assert_eq!(
                "# nothing but comments\n\n   \n".parse::<VolumeConfig>().unwrap(),
                VolumeConfig::default()
            );
        }

        #[test]
        fn positional() {
            let cfg: VolumeConfig = "3 10 0x3FF 16".parse().unwrap();
            assert_eq!(cfg, VolumeConfig::new(3, 10, 1023, 16).unwrap());
        }

        #[test]
        fn positional_partial() {
            let cfg: VolumeConfig = "4 100".parse().unwrap();
            assert_eq!(cfg.channel, 4);
            assert_eq!(cfg.min, 100);
            assert_eq!(cfg.max, DEFAULT_MAX);
            assert_eq!(cfg.step, DEFAULT_STEP);
        }

        #[test]
        fn keyed() {
            let cfg: VolumeConfig = "step=10\nchannel=0 # mic\nmax=1000\n"
                .parse()
                .unwrap();
            assert_eq!(cfg, VolumeConfig::new(0, DEFAULT_MIN, 1000, 10).unwrap());
        }

        #[test]
        fn mixed() {
            let cfg: VolumeConfig = "5 step=7 0x10".parse().unwrap();
            assert_eq!(cfg, VolumeConfig::new(5, 16, DEFAULT_MAX, 7).unwrap());
        }

        #[test]
        fn comments() {
            let text = "# volume wheel\n1 # channel\n# min and max\n0 100\n";
            let cfg: VolumeConfig = text.parse().unwrap();
            assert_eq!(cfg, VolumeConfig::new(1, 0, 100, DEFAULT_STEP).unwrap());
        }

        #[test]
        fn bad_value() {
            match "channel=two".parse::<VolumeConfig>() {
                Err(ConfigError::Parse(field, token)) => {
                    assert_eq!(field, "channel");
                    assert_eq!(token, "two");
                }
                x => panic!("unexpected result: {:?}", x),
            }
            match "2 0 max".parse::<VolumeConfig>() {
                Err(ConfigError::Parse(field, token)) => {
                    assert_eq!(field, "max");
                    assert_eq!(token, "max");
                }
                x => panic!("unexpected result: {:?}", x),
            }
        }

        #[test]
        fn bad_channel() {
            assert!(matches!(
                "-1".parse::<VolumeConfig>(),
                Err(ConfigError::Parse(_, _))
            ));
            assert!(matches!(
                "channel=0x100000000".parse::<VolumeConfig>(),
                Err(ConfigError::Parse(_, _))
            ));
        }

        #[test]
        fn unknown_key() {
            match "gain=3".parse::<VolumeConfig>() {
                Err(ConfigError::UnknownKey(k)) => assert_eq!(k, "gain"),
                x => panic!("unexpected result: {:?}", x),
            }
        }

        #[test]
        fn excess() {
            match "1 2 3 4 5".parse::<VolumeConfig>() {
                Err(ConfigError::Excess(t)) => assert_eq!(t, "5"),
                x => panic!("unexpected result: {:?}", x),
            }
        }

        #[test]
        fn invalid() {
            assert!(matches!(
                "min=100 max=10".parse::<VolumeConfig>(),
                Err(ConfigError::Range(100, 10))
            ));
            assert!(matches!(
                "step=0".parse::<VolumeConfig>(),
                Err(ConfigError::Step(0))
            ));
        }
    }

    mod from_file {
        use super::*;
        use std::io::Write;

        #[test]
        fn missing() {
            let td = tempfile::tempdir().unwrap();
            let cfg = VolumeConfig::from_file(td.path().join("volume.conf")).unwrap();
            assert_eq!(cfg, VolumeConfig::default());
        }

        #[test]
        fn present() {
            let mut f = tempfile::NamedTempFile::new().unwrap();
            writeln!(f, "# channel min max step").unwrap();
            writeln!(f, "1 0 0x3FF 8").unwrap();
            let cfg = VolumeConfig::from_file(f.path()).unwrap();
            assert_eq!(cfg, VolumeConfig::new(1, 0, 1023, 8).unwrap());
        }

        #[test]
        fn invalid() {
            let mut f = tempfile::NamedTempFile::new().unwrap();
            writeln!(f, "step=-3").unwrap();
            assert!(matches!(
                VolumeConfig::from_file(f.path()),
                Err(ConfigError::Step(-3))
            ));
        }

        #[test]
        fn directory() {
            let td = tempfile::tempdir().unwrap();
            match VolumeConfig::from_file(td.path()) {
                Err(ConfigError::Io(p, _)) => assert_eq!(p, td.path()),
                x => panic!("unexpected result: {:?}", x),
            }
        }
    }

    #[test]
    fn error_display() {
        assert_eq!(
            ConfigError::Parse("max".into(), "lots".into()).to_string(),
            "invalid max: 'lots'"
        );
        assert_eq!(
            ConfigError::Range(10, 5).to_string(),
            "min 10 exceeds max 5"
        );
        assert_eq!(
            ConfigError::Step(0).to_string(),
            "step must be positive: 0"
        );
    }
}
