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

use crate::cache::LabelCache;
use crate::rpc::{LabelAuthority, RequestCoordinator};
use crate::{LabelMetrics, LabelResolver};
use log::{info, warn};
use orpc::client::{Connector, FailoverSession, TcpConnector};
use orpc::common::CoarseClock;
use orpc::io::net::InetAddr;
use promlabel_common::conf::LabelConf;
use promlabel_common::proto::{LabelRequest, LabelResponse};
use promlabel_common::state::RequestCounter;
use promlabel_common::LabelResult;
use std::sync::Arc;

/// Prometheus label table of the ingester.
/// Ingestion workers resolve strings to ids through the query methods, a single
/// background task (or a debug command) refreshes the cache from the authority.
pub struct LabelTable<C = TcpConnector>
where
    C: Connector,
    C::Conn: LabelAuthority,
{
    conf: LabelConf,
    clock: Arc<CoarseClock>,
    metrics: Arc<LabelMetrics>,
    resolver: Arc<LabelResolver>,
    coordinator: RequestCoordinator<C>,
}

impl LabelTable<TcpConnector> {
    pub fn new(conf: LabelConf) -> LabelResult<Self> {
        let connector = TcpConnector::new(conf.rpc_timeout, conf.rpc_max_msg_size);
        Self::with_connector(conf, connector)
    }
}

impl<C> LabelTable<C>
where
    C: Connector,
    C::Conn: LabelAuthority,
{
    /// Org of single tenant deployments, its stats are logged after every full refresh.
    pub const DEFAULT_ORG_ID: u32 = 1;

    pub fn with_connector(conf: LabelConf, connector: C) -> LabelResult<Self> {
        let metrics = Arc::new(LabelMetrics::new()?);
        let clock = Arc::new(CoarseClock::new());
        let cache = Arc::new(LabelCache::new(
            conf.max_org_count,
            conf.cache_expiration_secs(),
            clock.clone(),
            metrics.clone(),
        ));
        let resolver = Arc::new(LabelResolver::new(cache, metrics.clone()));

        let session = FailoverSession::new(connector, conf.authority_nodes(), conf.rpc_timeout)?;
        let coordinator = RequestCoordinator::new(session, resolver.clone(), metrics.clone());

        info!(
            "New prometheus label table, authority: {:?}, port: {}, rpc_max_msg_size: {}, cache_expiration: {}",
            conf.authority_addrs, conf.port, conf.rpc_max_msg_size, conf.cache_expiration_str
        );

        Ok(Self {
            conf,
            clock,
            metrics,
            resolver,
            coordinator,
        })
    }

    pub fn conf(&self) -> &LabelConf {
        &self.conf
    }

    pub fn metrics(&self) -> &LabelMetrics {
        &self.metrics
    }

    pub fn clock(&self) -> &CoarseClock {
        &self.clock
    }

    pub fn resolver(&self) -> &LabelResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &LabelCache {
        self.resolver.cache()
    }

    pub fn session(&self) -> &FailoverSession<C> {
        self.coordinator.session()
    }

    pub fn query_metric_id(&self, org: u32, metric_name: &str) -> (u32, bool) {
        self.resolver.query_metric_id(org, metric_name)
    }

    pub fn query_label_name_id(&self, org: u32, name: &str) -> (u32, bool) {
        self.resolver.query_label_name_id(org, name)
    }

    pub fn query_label_value_id(&self, org: u32, value: &str) -> (u32, bool) {
        self.resolver.query_label_value_id(org, value)
    }

    pub fn query_label_name_value(&self, org: u32, name_id: u32, value_id: u32) -> bool {
        self.resolver.query_label_name_value(org, name_id, value_id)
    }

    pub fn query_column_index(&self, org: u32, metric_id: u32, name_id: u32) -> Option<u32> {
        self.resolver.query_column_index(org, metric_id, name_id)
    }

    pub fn max_app_label_column_index(&self) -> u32 {
        self.resolver.max_app_label_column_index()
    }

    pub async fn request_label_ids(&self, req: &LabelRequest) -> LabelResult<LabelResponse> {
        self.coordinator.fetch_labels(req).await
    }

    pub async fn request_all_label_ids(&self) -> LabelResult<()> {
        info!("prometheus request all label ids start");
        let res = self.coordinator.fetch_all().await;
        if let Err(e) = &res {
            warn!("request all prometheus label ids failed: {}", e);
        }
        info!(
            "prometheus request all label ids end. {}",
            self.stats_string(Self::DEFAULT_ORG_ID)
        );
        res.map(|_| ())
    }

    pub fn drop_org(&self, org: u32) -> LabelResult<()> {
        self.cache().drop_org(org)?;
        info!("drop prometheus labels of org {}", org);
        Ok(())
    }

    /// Counters since the previous call.
    pub fn get_counter(&self) -> RequestCounter {
        self.metrics.take_counter()
    }

    pub fn tick_clock(&self) -> u64 {
        self.clock.refresh()
    }

    /// Replace the authority hosts, the port and the number of hosts stay unchanged.
    pub async fn update_authority_addrs(&self, addrs: &[String]) -> LabelResult<()> {
        let replicas = addrs
            .iter()
            .map(|host| InetAddr::new(host.trim(), self.conf.port))
            .collect();
        self.session().update_replicas(replicas).await?;
        Ok(())
    }
}
