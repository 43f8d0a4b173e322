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

use crate::rpc::LabelAuthority;
use crate::LabelTable;
use log::{debug, info, warn};
use orpc::client::Connector;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Background task of the label table:
/// 1. Fetches the whole universe of labels once at start.
/// 2. Refreshes the coarse clock every `clock_tick`.
/// 3. Fetches the universe again every `full_refresh_interval`, a failed fetch is retried at the next tick.
pub struct LabelSyncer {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl LabelSyncer {
    pub fn start<C>(table: Arc<LabelTable<C>>) -> Self
    where
        C: Connector,
        C::Conn: LabelAuthority,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { Self::run(table, token).await });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    async fn run<C>(table: Arc<LabelTable<C>>, token: CancellationToken)
    where
        C: Connector,
        C::Conn: LabelAuthority,
    {
        let tick = table.conf().clock_tick;
        let refresh = table.conf().full_refresh_interval;
        info!(
            "prometheus label syncer started, clock_tick: {:?}, full_refresh_interval: {:?}",
            tick, refresh
        );

        table.tick_clock();
        let mut synced = tokio::select! {
            _ = token.cancelled() => return,
            res = table.request_all_label_ids() => res.is_ok(),
        };
        let mut last_refresh = Instant::now();

        let mut interval = time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => (),
            }

            let now = table.tick_clock();
            let due = !refresh.is_zero() && last_refresh.elapsed() >= refresh;
            if !synced || due {
                debug!("prometheus label refresh at {}, retry: {}", now, !synced);
                last_refresh = Instant::now();
                synced = tokio::select! {
                    _ = token.cancelled() => break,
                    res = table.request_all_label_ids() => res.is_ok(),
                };
            }
        }

        info!("prometheus label syncer stopped");
    }

    pub fn is_running(&self) -> bool {
        match &self.handle {
            Some(h) => !h.is_finished(),
            None => false,
        }
    }

    /// Cancel the task and wait for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("prometheus label syncer exited abnormally: {}", e);
            }
        }
    }
}

impl Drop for LabelSyncer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
