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

use crate::cache::{LabelCache, LabelEntry};
use crate::LabelMetrics;
use promlabel_common::proto::{LabelIdInfo, LabelResponse};
use promlabel_common::state::LabelKind;
use std::sync::Arc;

/// Query and ingest surface over the label cache.
/// Queries never touch the network, a miss is reported to the caller who decides
/// whether to fetch.
pub struct LabelResolver {
    cache: Arc<LabelCache>,
    metrics: Arc<LabelMetrics>,
}

impl LabelResolver {
    pub fn new(cache: Arc<LabelCache>, metrics: Arc<LabelMetrics>) -> Self {
        Self { cache, metrics }
    }

    pub fn cache(&self) -> &LabelCache {
        &self.cache
    }

    #[inline]
    pub fn query_metric_id(&self, org: u32, metric_name: &str) -> (u32, bool) {
        self.cache.get(org, LabelKind::Metric, metric_name)
    }

    #[inline]
    pub fn query_label_name_id(&self, org: u32, name: &str) -> (u32, bool) {
        self.cache.get(org, LabelKind::Name, name)
    }

    #[inline]
    pub fn query_label_value_id(&self, org: u32, value: &str) -> (u32, bool) {
        self.cache.get(org, LabelKind::Value, value)
    }

    #[inline]
    pub fn query_label_name_value(&self, org: u32, name_id: u32, value_id: u32) -> bool {
        self.cache.has_name_value(org, name_id, value_id)
    }

    #[inline]
    pub fn query_column_index(&self, org: u32, metric_id: u32, name_id: u32) -> Option<u32> {
        self.cache.get_column_index(org, metric_id, name_id)
    }

    pub fn max_app_label_column_index(&self) -> u32 {
        self.cache.max_app_label_column_index()
    }

    fn gen_id(&self, is_full: bool, id: u32, now: u64) -> LabelEntry {
        LabelEntry::gen(is_full, id, now, self.cache.expiration())
    }

    /// Publish the ids of an authority response.
    ///
    /// A full response carries the flat name/value universe of every org plus the
    /// metrics with their label names and columns only, so the per-metric value ids
    /// are ignored for it.
    pub fn update_from_response(&self, resp: &LabelResponse, is_full: bool) {
        let now = self.cache.now();

        if is_full {
            for org_labels in &resp.org_response_labels {
                let org = org_labels.org_id;
                if !self.cache.is_valid_org(org) {
                    self.metrics.on_invalid_org(org_labels.response_labels.len());
                    continue;
                }

                for info in &org_labels.response_labels {
                    let name_ok = self.set_name(org, info, is_full, now);
                    let value_ok = self.set_value(org, info, is_full, now);
                    if name_ok && value_ok {
                        self.cache.set_name_value(org, info.name_id, info.value_id);
                    }
                }
            }
        }

        for metric in &resp.response_label_ids {
            if metric.metric_name.is_empty() {
                self.metrics.on_unknown(LabelKind::Metric);
                continue;
            }

            let org = metric.org_id;
            if !self.cache.is_valid_org(org) {
                self.metrics.on_invalid_org(1);
                continue;
            }

            // Labels of a metric without id are still published, only its columns are unknown.
            let metric_known = metric.metric_id != LabelEntry::UNKNOWN_ID;
            if metric_known {
                let entry = self.gen_id(is_full, metric.metric_id, now);
                self.cache
                    .set_entry(org, LabelKind::Metric, &metric.metric_name, entry);
            } else {
                self.metrics.on_unknown(LabelKind::Metric);
            }

            for info in &metric.label_ids {
                let name_ok = self.set_name(org, info, is_full, now);

                if !is_full {
                    let value_ok = self.set_value(org, info, is_full, now);
                    if name_ok && value_ok {
                        self.cache.set_name_value(org, info.name_id, info.value_id);
                    }
                }

                if metric_known && info.name_id != LabelEntry::UNKNOWN_ID {
                    self.cache.set_column_index(
                        org,
                        metric.metric_id,
                        info.name_id,
                        info.app_label_column_index,
                    );
                }
            }
        }
    }

    fn set_name(&self, org: u32, info: &LabelIdInfo, is_full: bool, now: u64) -> bool {
        if info.name.is_empty() || info.name_id == LabelEntry::UNKNOWN_ID {
            self.metrics.on_unknown(LabelKind::Name);
            return false;
        }
        let entry = self.gen_id(is_full, info.name_id, now);
        self.cache.set_entry(org, LabelKind::Name, &info.name, entry)
    }

    // An empty value is a legal label value, only the id decides.
    fn set_value(&self, org: u32, info: &LabelIdInfo, is_full: bool, now: u64) -> bool {
        if info.value_id == LabelEntry::UNKNOWN_ID {
            self.metrics.on_unknown(LabelKind::Value);
            return false;
        }
        let entry = self.gen_id(is_full, info.value_id, now);
        self.cache.set_entry(org, LabelKind::Value, &info.value, entry)
    }
}
