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

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub struct LocalTime;

impl LocalTime {
    pub const TIME_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn mills() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn nanos() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    }

    /// Format unix seconds as "2006-01-02T15:04:05Z".
    pub fn secs_to_string(secs: u64) -> String {
        match DateTime::<Utc>::from_timestamp(secs as i64, 0) {
            Some(v) => v.format(Self::TIME_FORMAT).to_string(),
            None => "-".to_string(),
        }
    }
}

/// Elapsed time measured from creation.
pub struct TimeSpent(Instant);

impl TimeSpent {
    pub fn new() -> Self {
        Self(Instant::now())
    }

    pub fn used_ms(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }

    pub fn used_us(&self) -> u64 {
        self.0.elapsed().as_micros() as u64
    }

    pub fn used_ns(&self) -> u64 {
        self.0.elapsed().as_nanos() as u64
    }
}

impl Default for TimeSpent {
    fn default() -> Self {
        Self::new()
    }
}

/// Seconds clock that only moves when refreshed.
/// Hot paths read it with a single atomic load instead of a syscall.
#[derive(Debug)]
pub struct CoarseClock {
    secs: AtomicU64,
}

impl CoarseClock {
    pub fn new() -> Self {
        Self {
            secs: AtomicU64::new(LocalTime::secs()),
        }
    }

    pub fn with_secs(secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(secs),
        }
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.secs.load(Ordering::Relaxed)
    }

    pub fn refresh(&self) -> u64 {
        let now = LocalTime::secs();
        self.secs.store(now, Ordering::Relaxed);
        now
    }

    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::Relaxed)
    }
}

impl Default for CoarseClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_clock_moves_only_when_refreshed() {
        let clock = CoarseClock::with_secs(1000);
        assert_eq!(clock.now(), 1000);
        clock.set(1050);
        assert_eq!(clock.now(), 1050);
        let now = clock.refresh();
        assert!(now > 1050);
        assert_eq!(clock.now(), now);
    }

    #[test]
    fn format_secs() {
        assert_eq!(LocalTime::secs_to_string(0), "1970-01-01T00:00:00Z");
        assert_eq!(LocalTime::secs_to_string(86400), "1970-01-02T00:00:00Z");
    }
}
