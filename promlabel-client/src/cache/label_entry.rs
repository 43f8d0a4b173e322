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

use std::fmt::{Debug, Formatter};

/// High 32 bits of a composite key hold the metric id (or label name id).
pub const METRIC_ID_OFFSET: u32 = 32;

const LOW_MASK: u64 = u32::MAX as u64;

/// Key of the column slot of a label name inside a metric's wide row.
#[inline]
pub const fn column_index_key(metric_id: u32, label_name_id: u32) -> u64 {
    (metric_id as u64) << METRIC_ID_OFFSET | label_name_id as u64
}

/// Returns (metric_id, label_name_id).
#[inline]
pub const fn split_column_index_key(key: u64) -> (u32, u32) {
    ((key >> METRIC_ID_OFFSET) as u32, (key & LOW_MASK) as u32)
}

#[inline]
pub const fn name_value_key(name_id: u32, value_id: u32) -> u64 {
    (name_id as u64) << 32 | value_id as u64
}

/// Returns (name_id, value_id).
#[inline]
pub const fn split_name_value_key(key: u64) -> (u32, u32) {
    ((key >> 32) as u32, (key & LOW_MASK) as u32)
}

/// An interned id and the second it was last refreshed, packed in one word:
/// id in the high 32 bits, truncated unix seconds in the low 32 bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelEntry(u64);

impl LabelEntry {
    /// Id 0 is never handed out by the authority.
    pub const UNKNOWN_ID: u32 = 0;

    #[inline]
    pub const fn new(id: u32, timestamp: u32) -> Self {
        Self((id as u64) << 32 | timestamp as u64)
    }

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn id(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub const fn timestamp(&self) -> u32 {
        (self.0 & LOW_MASK) as u32
    }

    #[inline]
    pub fn is_expired(&self, now: u64, expiration: u64) -> bool {
        (now as u32) as i64 - self.timestamp() as i64 > expiration as i64
    }

    /// Timestamp for an entry refreshed at `now`.
    /// Entries of a full refresh are backdated by `id % expiration` seconds so that the
    /// universe of entries expires spread over one expiration window instead of at once.
    #[inline]
    pub fn gen(is_full: bool, id: u32, now: u64, expiration: u64) -> Self {
        let now = now as u32;
        if is_full {
            let window = expiration.clamp(1, u32::MAX as u64) as u32;
            Self::new(id, now.wrapping_sub(id % window))
        } else {
            Self::new(id, now)
        }
    }
}

impl Debug for LabelEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelEntry")
            .field("id", &self.id())
            .field("timestamp", &self.timestamp())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn composite_keys_are_injective() {
        let mut rng = rand::thread_rng();
        let edges = [0u32, 1, u32::MAX - 1, u32::MAX];
        let mut pairs: Vec<(u32, u32)> = vec![];
        for a in edges {
            for b in edges {
                pairs.push((a, b));
            }
        }
        for _ in 0..1000 {
            pairs.push((rng.gen(), rng.gen()));
        }

        for (a, b) in pairs {
            assert_eq!(split_column_index_key(column_index_key(a, b)), (a, b));
            assert_eq!(split_name_value_key(name_value_key(a, b)), (a, b));
        }

        assert_ne!(column_index_key(1, 2), column_index_key(2, 1));
        assert_ne!(name_value_key(0, 1), name_value_key(1, 0));
    }

    #[test]
    fn entry_packs_id_and_timestamp() {
        let e = LabelEntry::new(5, 1000);
        assert_eq!(e.id(), 5);
        assert_eq!(e.timestamp(), 1000);
        assert_eq!(e.raw(), 5u64 << 32 | 1000);
        assert_eq!(LabelEntry::from_raw(e.raw()), e);
    }

    #[test]
    fn expiry_boundary() {
        let e = LabelEntry::new(5, 1000);
        assert!(!e.is_expired(1050, 60));
        assert!(!e.is_expired(1060, 60));
        assert!(e.is_expired(1061, 60));
        assert!(e.is_expired(1070, 60));
        // Timestamps ahead of the clock are fresh.
        assert!(!e.is_expired(900, 60));
    }

    #[test]
    fn full_refresh_spreads_timestamps() {
        let now = 100_000;
        let expiration = 60;

        let t1 = LabelEntry::gen(false, 7, now, expiration);
        let t2 = LabelEntry::gen(false, 8, now, expiration);
        assert_eq!(t1.timestamp(), t2.timestamp());
        assert_eq!(t1.timestamp(), now as u32);

        let f1 = LabelEntry::gen(true, 7, now, expiration);
        let f2 = LabelEntry::gen(true, 8, now, expiration);
        assert_ne!(f1, f2);
        assert_ne!(f1.timestamp(), f2.timestamp());
        assert_eq!(f1.timestamp(), now as u32 - 7);
        assert_eq!(f2.id(), 8);

        // Backdated entries are still fresh right after the refresh.
        for id in 1..500 {
            let e = LabelEntry::gen(true, id, now, expiration);
            assert!(!e.is_expired(now, expiration));
        }
    }
}
