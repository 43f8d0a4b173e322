// Copyright 2025 OPPO.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{err_box, CommonResult};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Human readable duration used by configuration files, e.g. "500ms", "10s", "24h".
/// A bare number is interpreted as seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationUnit {
    millis: u64,
}

impl DurationUnit {
    const UNITS: [(&'static str, u64); 5] = [
        ("ms", 1),
        ("s", 1000),
        ("m", 60 * 1000),
        ("h", 60 * 60 * 1000),
        ("d", 24 * 60 * 60 * 1000),
    ];

    pub fn new(millis: u64) -> Self {
        Self { millis }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> CommonResult<Self> {
        let s = s.trim().to_lowercase();
        if s.is_empty() {
            return err_box!("empty duration string");
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(s.len());
        let (num, unit) = s.split_at(split);
        let num: u64 = match num.parse() {
            Ok(v) => v,
            Err(e) => return err_box!("invalid duration {}: {}", s, e),
        };

        let unit = unit.trim();
        let factor = if unit.is_empty() {
            1000
        } else {
            match Self::UNITS.iter().find(|(name, _)| *name == unit) {
                Some((_, factor)) => *factor,
                None => return err_box!("invalid duration unit {} in {}", unit, s),
            }
        };

        Ok(Self::new(num * factor))
    }

    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    pub fn as_secs(&self) -> u64 {
        self.millis / 1000
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.millis)
    }
}

impl Display for DurationUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (name, factor) in Self::UNITS.iter().rev() {
            if self.millis != 0 && self.millis % factor == 0 {
                return write!(f, "{}{}", self.millis / factor, name);
            }
        }
        write!(f, "{}ms", self.millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units() {
        assert_eq!(DurationUnit::from_str("500ms").unwrap().as_millis(), 500);
        assert_eq!(DurationUnit::from_str("10s").unwrap().as_secs(), 10);
        assert_eq!(DurationUnit::from_str("10m").unwrap().as_secs(), 600);
        assert_eq!(DurationUnit::from_str("24h").unwrap().as_secs(), 86400);
        assert_eq!(DurationUnit::from_str("1d").unwrap().as_secs(), 86400);
        assert_eq!(DurationUnit::from_str("60").unwrap().as_secs(), 60);
    }

    #[test]
    fn reject_bad_input() {
        assert!(DurationUnit::from_str("").is_err());
        assert!(DurationUnit::from_str("ten").is_err());
        assert!(DurationUnit::from_str("10y").is_err());
    }

    #[test]
    fn display_picks_largest_unit() {
        assert_eq!(DurationUnit::new(3_600_000).to_string(), "1h");
        assert_eq!(DurationUnit::new(1500).to_string(), "1500ms");
        assert_eq!(DurationUnit::new(0).to_string(), "0ms");
    }
}
