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

use crate::CommonResult;
use prometheus::{Encoder, HistogramOpts, Opts, Registry, TextEncoder};

pub type Counter = prometheus::IntCounter;
pub type CounterVec = prometheus::IntCounterVec;
pub type Gauge = prometheus::IntGauge;
pub type Histogram = prometheus::Histogram;
pub type HistogramVec = prometheus::HistogramVec;

/// A metrics registry owned by one component.
/// Keeping registries per instance lets several instances live in one process
/// (tests, multiple tables) without duplicate registration errors.
pub struct Metrics {
    registry: Registry,
}

impl Metrics {
    pub fn new(prefix: impl Into<String>) -> CommonResult<Self> {
        let registry = Registry::new_custom(Some(prefix.into()), None)?;
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn new_counter(&self, name: &str, help: &str) -> CommonResult<Counter> {
        let counter = Counter::new(name, help)?;
        self.registry.register(Box::new(counter.clone()))?;
        Ok(counter)
    }

    pub fn new_counter_vec(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
    ) -> CommonResult<CounterVec> {
        let counter = CounterVec::new(Opts::new(name, help), labels)?;
        self.registry.register(Box::new(counter.clone()))?;
        Ok(counter)
    }

    pub fn new_gauge(&self, name: &str, help: &str) -> CommonResult<Gauge> {
        let gauge = Gauge::new(name, help)?;
        self.registry.register(Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    pub fn new_histogram_with_buckets(
        &self,
        name: &str,
        help: &str,
        buckets: &[f64],
    ) -> CommonResult<Histogram> {
        let opts = HistogramOpts::new(name, help).buckets(buckets.to_vec());
        let histogram = Histogram::with_opts(opts)?;
        self.registry.register(Box::new(histogram.clone()))?;
        Ok(histogram)
    }

    /// Render every registered metric in the prometheus text format.
    pub fn text_output(&self) -> CommonResult<String> {
        let mut buf = vec![];
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registries_are_independent() {
        let m1 = Metrics::new("test").unwrap();
        let m2 = Metrics::new("test").unwrap();
        let c1 = m1.new_counter("requests", "request count").unwrap();
        let c2 = m2.new_counter("requests", "request count").unwrap();
        c1.inc();
        assert_eq!(c1.get(), 1);
        assert_eq!(c2.get(), 0);
        assert!(m1.new_counter("requests", "dup").is_err());
    }

    #[test]
    fn text_output_contains_prefix() {
        let m = Metrics::new("label").unwrap();
        let v = m.new_counter_vec("unknown", "unknown entries", &["kind"]).unwrap();
        v.with_label_values(&["metric"]).inc_by(3);
        let text = m.text_output().unwrap();
        assert!(text.contains("label_unknown{kind=\"metric\"} 3"));
    }
}
