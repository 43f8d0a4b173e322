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

use crate::cache::LabelEntry;
use orpc::sync::{FastDashMap, FastDashSet};
use promlabel_common::state::LabelKind;

/// The dictionaries of one org.
#[derive(Default)]
pub struct OrgShard {
    // metric name => metric id
    metric_name_ids: FastDashMap<String, LabelEntry>,
    // label name => label name id
    label_name_ids: FastDashMap<String, LabelEntry>,
    // label value => label value id
    label_value_ids: FastDashMap<String, LabelEntry>,
    // name_value_key(name id, value id)
    label_name_values: FastDashSet<u64>,
    // column_index_key(metric id, label name id) => column index
    label_column_indexes: FastDashMap<u64, u32>,
}

impl OrgShard {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn ids(&self, kind: LabelKind) -> &FastDashMap<String, LabelEntry> {
        match kind {
            LabelKind::Metric => &self.metric_name_ids,
            LabelKind::Name => &self.label_name_ids,
            LabelKind::Value => &self.label_value_ids,
        }
    }

    pub fn name_values(&self) -> &FastDashSet<u64> {
        &self.label_name_values
    }

    pub fn column_indexes(&self) -> &FastDashMap<u64, u32> {
        &self.label_column_indexes
    }

    #[inline]
    pub fn get(&self, kind: LabelKind, key: &str) -> Option<LabelEntry> {
        self.ids(kind).get(key).map(|v| *v)
    }

    pub fn set(&self, kind: LabelKind, key: &str, entry: LabelEntry) {
        let map = self.ids(kind);
        // Refreshes mostly hit existing keys, avoid allocating the key again.
        if let Some(mut v) = map.get_mut(key) {
            *v = entry;
            return;
        }
        map.insert(key.to_owned(), entry);
    }
}
