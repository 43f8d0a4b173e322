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

use orpc::common::{Counter, CounterVec, Histogram, Metrics};
use orpc::sync::AtomicCounter;
use orpc::CommonResult;
use promlabel_common::state::{LabelKind, RequestCounter};

/// Label table telemetry.
/// Two views of the same events: drained counters for the periodic telemetry export,
/// and cumulative prometheus metrics.
pub struct LabelMetrics {
    request_count: AtomicCounter,
    request_total_delay_ns: AtomicCounter,
    response_failed: AtomicCounter,
    request_labels_count: AtomicCounter,
    response_labels_count: AtomicCounter,
    metric_unknown: AtomicCounter,
    label_name_unknown: AtomicCounter,
    label_value_unknown: AtomicCounter,
    cache_expiration: AtomicCounter,
    invalid_org: AtomicCounter,

    metrics: Metrics,
    pub request_total: Counter,
    pub request_failed_total: Counter,
    pub request_latency_ms: Histogram,
    pub unknown_total: CounterVec,
    pub cache_expiration_total: Counter,
}

impl LabelMetrics {
    pub const PREFIX: &'static str = "prometheus_label";

    pub fn new() -> CommonResult<Self> {
        let m = Metrics::new(Self::PREFIX)?;

        let request_total = m.new_counter("request_total", "label id requests sent")?;
        let request_failed_total =
            m.new_counter("request_failed_total", "label id requests without response")?;
        let request_latency_ms = m.new_histogram_with_buckets(
            "request_latency_ms",
            "label id request latency in milliseconds",
            &[1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0],
        )?;
        let unknown_total = m.new_counter_vec(
            "unknown_total",
            "response entries skipped for missing name or id",
            &["kind"],
        )?;
        let cache_expiration_total =
            m.new_counter("cache_expiration_total", "lookups that hit an expired entry")?;

        Ok(Self {
            request_count: AtomicCounter::default(),
            request_total_delay_ns: AtomicCounter::default(),
            response_failed: AtomicCounter::default(),
            request_labels_count: AtomicCounter::default(),
            response_labels_count: AtomicCounter::default(),
            metric_unknown: AtomicCounter::default(),
            label_name_unknown: AtomicCounter::default(),
            label_value_unknown: AtomicCounter::default(),
            cache_expiration: AtomicCounter::default(),
            invalid_org: AtomicCounter::default(),

            metrics: m,
            request_total,
            request_failed_total,
            request_latency_ms,
            unknown_total,
            cache_expiration_total,
        })
    }

    pub fn on_request(&self, labels: usize) {
        self.request_count.incr();
        self.request_labels_count.add(labels as u64);
        self.request_total.inc();
    }

    pub fn on_response(&self, labels: usize, delay_ns: u64) {
        self.response_labels_count.add(labels as u64);
        self.request_total_delay_ns.add(delay_ns);
        self.request_latency_ms
            .observe(delay_ns as f64 / 1_000_000.0);
    }

    pub fn on_failure(&self) {
        self.response_failed.incr();
        self.request_failed_total.inc();
    }

    pub fn on_unknown(&self, kind: LabelKind) {
        match kind {
            LabelKind::Metric => self.metric_unknown.incr(),
            LabelKind::Name => self.label_name_unknown.incr(),
            LabelKind::Value => self.label_value_unknown.incr(),
        };
        self.unknown_total.with_label_values(&[kind.as_str()]).inc();
    }

    #[inline]
    pub fn on_expiration(&self) {
        self.cache_expiration.incr();
        self.cache_expiration_total.inc();
    }

    pub fn on_invalid_org(&self, entries: usize) {
        self.invalid_org.add(entries as u64);
    }

    /// Snapshot the counters and reset them to zero.
    pub fn take_counter(&self) -> RequestCounter {
        RequestCounter {
            request_count: self.request_count.take(),
            request_total_delay_ns: self.request_total_delay_ns.take(),
            response_failed: self.response_failed.take(),
            request_labels_count: self.request_labels_count.take(),
            response_labels_count: self.response_labels_count.take(),
            metric_unknown: self.metric_unknown.take(),
            label_name_unknown: self.label_name_unknown.take(),
            label_value_unknown: self.label_value_unknown.take(),
            cache_expiration: self.cache_expiration.take(),
            invalid_org: self.invalid_org.take(),
        }
    }

    pub fn text_output(&self) -> CommonResult<String> {
        self.metrics.text_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_counter_resets_but_prometheus_keeps_totals() {
        let m = LabelMetrics::new().unwrap();
        m.on_request(3);
        m.on_response(2, 2_000_000);
        m.on_unknown(LabelKind::Value);
        m.on_expiration();
        m.on_expiration();

        let c = m.take_counter();
        assert_eq!(c.request_count, 1);
        assert_eq!(c.request_labels_count, 3);
        assert_eq!(c.response_labels_count, 2);
        assert_eq!(c.request_total_delay_ns, 2_000_000);
        assert_eq!(c.label_value_unknown, 1);
        assert_eq!(c.cache_expiration, 2);

        assert_eq!(m.take_counter(), RequestCounter::default());
        assert_eq!(m.cache_expiration_total.get(), 2);
        assert_eq!(m.unknown_total.with_label_values(&["value"]).get(), 1);
    }

    #[test]
    fn text_output_is_prefixed() {
        let m = LabelMetrics::new().unwrap();
        m.on_failure();
        let text = m.text_output().unwrap();
        assert!(text.contains("prometheus_label_request_failed_total 1"));
    }
}
