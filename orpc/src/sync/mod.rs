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

use dashmap::{DashMap, DashSet};
use fxhash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};

pub type FastDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;

pub type FastDashSet<K> = DashSet<K, BuildHasherDefault<FxHasher>>;

/// Monotonic event counter that can be drained.
#[derive(Debug, Default)]
pub struct AtomicCounter(AtomicU64);

impl AtomicCounter {
    pub fn new(v: u64) -> Self {
        Self(AtomicU64::new(v))
    }

    #[inline]
    pub fn incr(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[inline]
    pub fn add(&self, v: u64) -> u64 {
        self.0.fetch_add(v, Ordering::Relaxed) + v
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, v: u64) {
        self.0.store(v, Ordering::Relaxed)
    }

    /// Return the current value and reset it to zero.
    pub fn take(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_take_resets() {
        let c = AtomicCounter::new(0);
        c.incr();
        c.add(4);
        assert_eq!(c.get(), 5);
        assert_eq!(c.take(), 5);
        assert_eq!(c.get(), 0);
    }

    #[test]
    fn fast_dash_map_borrowed_lookup() {
        let map: FastDashMap<String, u64> = FastDashMap::default();
        map.insert("up".to_string(), 1);
        assert_eq!(map.get("up").map(|v| *v), Some(1));
        assert!(map.get("down").is_none());
    }
}
