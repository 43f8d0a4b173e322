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

/*!
# Label Cache

Per-org interning dictionaries with lazy expiry.

```text
 shards: Vec<ArcSwapOption<OrgShard>>   (index = org id, fixed length)
   ├── [0]  None                         never written or dropped
   ├── [1]  Some(Arc<OrgShard>)
   │          ├── metric_name_ids       String -> LabelEntry(id | ts)
   │          ├── label_name_ids        String -> LabelEntry(id | ts)
   │          ├── label_value_ids       String -> LabelEntry(id | ts)
   │          ├── label_name_values     {name_id << 32 | value_id}
   │          └── label_column_indexes  metric_id << 32 | name_id -> column
   └── ...
```

Readers load the shard pointer once per lookup, dropping an org swaps the whole
shard so a reader sees either all old dictionaries or all new ones.
Expired entries stay in place until the next refresh overwrites them.
*/

use crate::cache::{column_index_key, name_value_key, LabelEntry, OrgShard};
use crate::LabelMetrics;
use arc_swap::ArcSwapOption;
use orpc::common::CoarseClock;
use promlabel_common::state::LabelKind;
use promlabel_common::{LabelError, LabelResult};
use std::sync::Arc;

pub struct LabelCache {
    shards: Vec<ArcSwapOption<OrgShard>>,
    clock: Arc<CoarseClock>,
    expiration: u64,
    metrics: Arc<LabelMetrics>,
}

impl LabelCache {
    pub fn new(
        max_org_count: usize,
        expiration: u64,
        clock: Arc<CoarseClock>,
        metrics: Arc<LabelMetrics>,
    ) -> Self {
        let shards = (0..max_org_count)
            .map(|_| ArcSwapOption::empty())
            .collect();

        Self {
            shards,
            clock,
            expiration: expiration.max(1),
            metrics,
        }
    }

    pub fn max_org_count(&self) -> usize {
        self.shards.len()
    }

    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    pub fn clock(&self) -> &CoarseClock {
        &self.clock
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn is_valid_org(&self, org: u32) -> bool {
        (org as usize) < self.shards.len()
    }

    #[inline]
    pub fn shard(&self, org: u32) -> Option<Arc<OrgShard>> {
        self.shards.get(org as usize)?.load_full()
    }

    fn shard_or_create(&self, org: u32) -> Option<Arc<OrgShard>> {
        let slot = self.shards.get(org as usize)?;
        if let Some(shard) = slot.load_full() {
            return Some(shard);
        }

        let fresh = Arc::new(OrgShard::new());
        let prev = slot.compare_and_swap(&None::<Arc<OrgShard>>, Some(fresh.clone()));
        match &*prev {
            // Another writer created it first.
            Some(existing) => Some(existing.clone()),
            None => Some(fresh),
        }
    }

    /// Returns (id, valid). A missing, unknown (0) or expired entry is not valid,
    /// the id of an expired entry is still returned for diagnostics.
    #[inline]
    pub fn get(&self, org: u32, kind: LabelKind, key: &str) -> (u32, bool) {
        let slot = match self.shards.get(org as usize) {
            Some(v) => v.load(),
            None => return (LabelEntry::UNKNOWN_ID, false),
        };

        let entry = match &*slot {
            Some(shard) => shard.get(kind, key),
            None => None,
        };

        match entry {
            None => (LabelEntry::UNKNOWN_ID, false),
            Some(e) if e.id() == LabelEntry::UNKNOWN_ID => (LabelEntry::UNKNOWN_ID, false),
            Some(e) => {
                if e.is_expired(self.now(), self.expiration) {
                    self.metrics.on_expiration();
                    (e.id(), false)
                } else {
                    (e.id(), true)
                }
            }
        }
    }

    /// Raw entry, ignoring expiry.
    pub fn entry(&self, org: u32, kind: LabelKind, key: &str) -> Option<LabelEntry> {
        self.shard(org)?.get(kind, key)
    }

    /// Returns false when the org is out of range.
    pub fn set(&self, org: u32, kind: LabelKind, key: &str, id: u32, timestamp: u32) -> bool {
        self.set_entry(org, kind, key, LabelEntry::new(id, timestamp))
    }

    pub fn set_entry(&self, org: u32, kind: LabelKind, key: &str, entry: LabelEntry) -> bool {
        match self.shard_or_create(org) {
            Some(shard) => {
                shard.set(kind, key, entry);
                true
            }
            None => false,
        }
    }

    pub fn set_name_value(&self, org: u32, name_id: u32, value_id: u32) -> bool {
        match self.shard_or_create(org) {
            Some(shard) => {
                shard.name_values().insert(name_value_key(name_id, value_id));
                true
            }
            None => false,
        }
    }

    pub fn has_name_value(&self, org: u32, name_id: u32, value_id: u32) -> bool {
        match self.shard(org) {
            Some(shard) => shard
                .name_values()
                .contains(&name_value_key(name_id, value_id)),
            None => false,
        }
    }

    pub fn set_column_index(&self, org: u32, metric_id: u32, name_id: u32, index: u32) -> bool {
        match self.shard_or_create(org) {
            Some(shard) => {
                shard
                    .column_indexes()
                    .insert(column_index_key(metric_id, name_id), index);
                true
            }
            None => false,
        }
    }

    pub fn get_column_index(&self, org: u32, metric_id: u32, name_id: u32) -> Option<u32> {
        let shard = self.shard(org)?;
        let index = shard
            .column_indexes()
            .get(&column_index_key(metric_id, name_id))
            .map(|v| *v);
        index
    }

    /// Replace every dictionary of the org with empty ones.
    pub fn drop_org(&self, org: u32) -> LabelResult<()> {
        match self.shards.get(org as usize) {
            Some(slot) => {
                slot.store(None);
                Ok(())
            }
            None => Err(LabelError::InvalidOrg(org)),
        }
    }

    pub fn len(&self, org: u32, kind: LabelKind) -> usize {
        self.shard(org).map(|s| s.ids(kind).len()).unwrap_or(0)
    }

    pub fn column_len(&self, org: u32) -> usize {
        self.shard(org)
            .map(|s| s.column_indexes().len())
            .unwrap_or(0)
    }

    pub fn name_value_len(&self, org: u32) -> usize {
        self.shard(org).map(|s| s.name_values().len()).unwrap_or(0)
    }

    pub fn max_id(&self, org: u32, kind: LabelKind) -> u32 {
        match self.shard(org) {
            Some(shard) => shard
                .ids(kind)
                .iter()
                .map(|v| v.value().id())
                .max()
                .unwrap_or(0),
            None => 0,
        }
    }

    pub fn max_column_index(&self, org: u32) -> u32 {
        match self.shard(org) {
            Some(shard) => shard
                .column_indexes()
                .iter()
                .map(|v| *v.value())
                .max()
                .unwrap_or(0),
            None => 0,
        }
    }

    /// Largest column index over all orgs, sizes the wide rows of the writer.
    pub fn max_app_label_column_index(&self) -> u32 {
        (0..self.shards.len() as u32)
            .map(|org| self.max_column_index(org))
            .max()
            .unwrap_or(0)
    }

    /// Reverse lookup by linear scan, diagnostics only.
    pub fn find_key(&self, org: u32, kind: LabelKind, id: u32) -> Option<String> {
        let shard = self.shard(org)?;
        let key = shard
            .ids(kind)
            .iter()
            .find(|v| v.value().id() == id)
            .map(|v| v.key().clone());
        key
    }

    /// Copy of one dictionary, diagnostics only.
    pub fn entries(&self, org: u32, kind: LabelKind) -> Vec<(String, LabelEntry)> {
        match self.shard(org) {
            Some(shard) => shard
                .ids(kind)
                .iter()
                .map(|v| (v.key().clone(), *v.value()))
                .collect(),
            None => vec![],
        }
    }

    pub fn column_entries(&self, org: u32) -> Vec<(u64, u32)> {
        match self.shard(org) {
            Some(shard) => shard
                .column_indexes()
                .iter()
                .map(|v| (*v.key(), *v.value()))
                .collect(),
            None => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_cache(now: u64, expiration: u64) -> LabelCache {
        LabelCache::new(
            4,
            expiration,
            Arc::new(CoarseClock::with_secs(now)),
            Arc::new(LabelMetrics::new().unwrap()),
        )
    }

    #[test]
    fn get_respects_expiration() {
        let cache = new_cache(1050, 60);
        assert!(cache.set(0, LabelKind::Metric, "http_requests_total", 5, 1000));
        assert_eq!(
            cache.get(0, LabelKind::Metric, "http_requests_total"),
            (5, true)
        );

        cache.clock().set(1070);
        assert_eq!(
            cache.get(0, LabelKind::Metric, "http_requests_total"),
            (5, false)
        );
        assert_eq!(
            cache
                .entry(0, LabelKind::Metric, "http_requests_total")
                .map(|e| e.id()),
            Some(5)
        );
        assert_eq!(cache.metrics.take_counter().cache_expiration, 1);
    }

    #[test]
    fn unknown_id_is_never_valid() {
        let cache = new_cache(1000, 60);
        cache.set(1, LabelKind::Name, "job", 0, 1000);
        assert_eq!(cache.get(1, LabelKind::Name, "job"), (0, false));
        assert_eq!(cache.get(1, LabelKind::Name, "missing"), (0, false));
    }

    #[test]
    fn kinds_and_orgs_are_isolated() {
        let cache = new_cache(1000, 60);
        cache.set(1, LabelKind::Name, "job", 3, 1000);
        assert_eq!(cache.get(1, LabelKind::Value, "job"), (0, false));
        assert_eq!(cache.get(2, LabelKind::Name, "job"), (0, false));

        // Last write wins.
        cache.set(1, LabelKind::Name, "job", 4, 1000);
        assert_eq!(cache.get(1, LabelKind::Name, "job"), (4, true));
        assert_eq!(cache.len(1, LabelKind::Name), 1);
    }

    #[test]
    fn out_of_range_org() {
        let cache = new_cache(1000, 60);
        assert!(!cache.set(4, LabelKind::Name, "job", 3, 1000));
        assert!(!cache.set_name_value(4, 1, 2));
        assert!(!cache.set_column_index(4, 1, 2, 3));
        assert_eq!(cache.get(4, LabelKind::Name, "job"), (0, false));
        assert!(cache.drop_org(4).is_err());
        assert!(cache.drop_org(3).is_ok());
    }

    #[test]
    fn drop_org_clears_every_dictionary() {
        let cache = new_cache(1000, 60);
        cache.set(1, LabelKind::Metric, "up", 1, 1000);
        cache.set(1, LabelKind::Name, "job", 2, 1000);
        cache.set(1, LabelKind::Value, "node", 3, 1000);
        cache.set_name_value(1, 2, 3);
        cache.set_column_index(1, 1, 2, 1);
        cache.set(2, LabelKind::Metric, "up", 9, 1000);

        cache.drop_org(1).unwrap();
        assert_eq!(cache.get(1, LabelKind::Metric, "up"), (0, false));
        assert_eq!(cache.get(1, LabelKind::Name, "job"), (0, false));
        assert_eq!(cache.get(1, LabelKind::Value, "node"), (0, false));
        assert!(!cache.has_name_value(1, 2, 3));
        assert_eq!(cache.get_column_index(1, 1, 2), None);
        assert_eq!(cache.get(2, LabelKind::Metric, "up"), (9, true));

        // The org is usable again after the drop.
        cache.set(1, LabelKind::Metric, "up", 1, 1000);
        assert_eq!(cache.get(1, LabelKind::Metric, "up"), (1, true));
    }

    #[test]
    fn column_index_and_reverse_lookup() {
        let cache = new_cache(1000, 60);
        cache.set(0, LabelKind::Metric, "up", 7, 1000);
        cache.set_column_index(0, 7, 2, 1);
        cache.set_column_index(0, 7, 3, 2);
        cache.set_column_index(1, 8, 3, 5);

        assert_eq!(cache.get_column_index(0, 7, 3), Some(2));
        assert_eq!(cache.get_column_index(0, 3, 7), None);
        assert_eq!(cache.max_column_index(0), 2);
        assert_eq!(cache.max_app_label_column_index(), 5);
        assert_eq!(cache.find_key(0, LabelKind::Metric, 7), Some("up".to_string()));
        assert_eq!(cache.find_key(0, LabelKind::Metric, 8), None);
        assert_eq!(cache.max_id(0, LabelKind::Metric), 7);
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let cache = Arc::new(new_cache(1000, 60));
        let mut handles = vec![];
        for t in 0..4u32 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || {
                for i in 1..=1000u32 {
                    let key = format!("value-{}", i);
                    cache.set(0, LabelKind::Value, &key, i, 1000);
                    let (id, valid) = cache.get(0, LabelKind::Value, &key);
                    assert!(valid);
                    assert_eq!(id, i);
                    if t == 0 && i % 100 == 0 {
                        cache.set_name_value(0, t, i);
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(0, LabelKind::Value), 1000);
        assert_eq!(cache.name_value_len(0), 10);
    }

    #[test]
    fn drop_org_is_never_partial() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let cache = Arc::new(new_cache(1000, 60));
        let done = Arc::new(AtomicBool::new(false));

        // One writer republishes every dictionary per generation, metric last.
        let writer = {
            let cache = cache.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                for g in 1..=20_000u32 {
                    let shard = cache.shard_or_create(1).unwrap();
                    shard.column_indexes().insert(column_index_key(g, g), g);
                    shard.name_values().insert(name_value_key(g, g));
                    shard.set(LabelKind::Value, "node", LabelEntry::new(g, 1000));
                    shard.set(LabelKind::Name, "job", LabelEntry::new(g, 1000));
                    shard.set(LabelKind::Metric, "up", LabelEntry::new(g, 1000));
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let dropper = {
            let cache = cache.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                let mut drops = 0;
                while !done.load(Ordering::SeqCst) {
                    cache.drop_org(1).unwrap();
                    drops += 1;
                    std::thread::yield_now();
                }
                drops
            })
        };

        let mut readers = vec![];
        for _ in 0..2 {
            let cache = cache.clone();
            let done = done.clone();
            readers.push(std::thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    let shard = match cache.shard(1) {
                        Some(v) => v,
                        None => continue,
                    };
                    let g = match shard.get(LabelKind::Metric, "up") {
                        Some(e) => e.id(),
                        None => continue,
                    };

                    // Everything published before the metric is in the same snapshot.
                    let name = shard.get(LabelKind::Name, "job").map(|e| e.id());
                    let value = shard.get(LabelKind::Value, "node").map(|e| e.id());
                    assert!(name.is_some_and(|id| id >= g), "name {:?} for metric {}", name, g);
                    assert!(value.is_some_and(|id| id >= g), "value {:?} for metric {}", value, g);
                    assert!(shard.name_values().contains(&name_value_key(g, g)));
                    assert!(shard.column_indexes().contains_key(&column_index_key(g, g)));
                }
            }));
        }

        writer.join().unwrap();
        let drops = dropper.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert!(drops > 0);

        cache.drop_org(1).unwrap();
        assert_eq!(cache.get(1, LabelKind::Metric, "up"), (0, false));
        assert_eq!(cache.len(1, LabelKind::Name), 0);
        assert_eq!(cache.column_len(1), 0);
        assert_eq!(cache.name_value_len(1), 0);
    }
}
