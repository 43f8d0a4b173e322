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

use crate::client::Connector;
use crate::io::net::InetAddr;
use crate::{CommonError, CommonResult};
use log::{debug, info, warn};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time;

enum ConnState<T> {
    Disconnected,
    Connected(T),
}

struct SessionInner<T> {
    replicas: Vec<InetAddr>,
    index: usize,
    state: ConnState<T>,
}

impl<T> SessionInner<T> {
    fn current_addr(&self) -> InetAddr {
        self.replicas[self.index].clone()
    }
}

// Session against a group of equivalent replicas.
// 1. Connects lazily to the current replica and sticks to it while calls succeed.
// 2. On any failure (connect or call) closes the connection and rotates to the next replica.
// 3. Gives up after one full pass over the replicas.
pub struct FailoverSession<C: Connector> {
    connector: C,
    inner: Mutex<SessionInner<C::Conn>>,
    // Only drives log verbosity, transitions are logged once.
    synchronized: AtomicBool,
    timeout: Duration,
}

impl<C: Connector> FailoverSession<C> {
    pub fn new(connector: C, replicas: Vec<InetAddr>, timeout: Duration) -> CommonResult<Self> {
        if replicas.is_empty() {
            return Err(CommonError::InvalidArgument(
                "replica list cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            connector,
            inner: Mutex::new(SessionInner {
                replicas,
                index: 0,
                state: ConnState::Disconnected,
            }),
            synchronized: AtomicBool::new(true),
            timeout,
        })
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_synchronized(&self) -> bool {
        self.synchronized.load(Ordering::SeqCst)
    }

    pub async fn current_addr(&self) -> InetAddr {
        self.inner.lock().await.current_addr()
    }

    pub async fn is_connected(&self) -> bool {
        matches!(self.inner.lock().await.state, ConnState::Connected(_))
    }

    pub async fn replicas(&self) -> Vec<InetAddr> {
        self.inner.lock().await.replicas.clone()
    }

    /// Replace the replica addresses, the number of replicas is fixed.
    /// A connection to an address that is no longer at its slot is closed.
    pub async fn update_replicas(&self, replicas: Vec<InetAddr>) -> CommonResult<()> {
        let mut inner = self.inner.lock().await;
        if replicas.len() != inner.replicas.len() {
            return Err(CommonError::InvalidArgument(format!(
                "replica count cannot change from {} to {}",
                inner.replicas.len(),
                replicas.len()
            )));
        }

        if replicas[inner.index] != inner.replicas[inner.index] {
            self.disconnect(&mut inner).await;
        }
        inner.replicas = replicas;
        Ok(())
    }

    /// Run `f` against the active connection, rotating replicas on failure.
    /// Every attempt, connect included, is bounded by the session timeout.
    pub async fn request<T, F, Fut>(&self, mut f: F) -> CommonResult<T>
    where
        F: FnMut(C::Conn, InetAddr) -> Fut,
        Fut: Future<Output = CommonResult<T>>,
    {
        let mut inner = self.inner.lock().await;
        let replicas = inner.replicas.len();
        let mut last_error: Option<CommonError> = None;

        for _ in 0..replicas {
            let addr = inner.current_addr();
            let res = time::timeout(self.timeout, self.attempt(&mut inner, &addr, &mut f)).await;

            let err = match res {
                Ok(Ok(v)) => {
                    if !self.synchronized.swap(true, Ordering::SeqCst) {
                        info!("Synchronized to server {}", addr);
                    }
                    return Ok(v);
                }
                Ok(Err(e)) => e,
                Err(_) => CommonError::Timeout(self.timeout),
            };

            if self.synchronized.swap(false, Ordering::SeqCst) {
                warn!("Sync from server {} failed, reason: {}", addr, err);
            } else {
                debug!("Request to server {} failed: {}", addr, err);
            }

            self.next_server(&mut inner).await;
            last_error = Some(err);
        }

        Err(CommonError::NoReachableServer {
            replicas,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "None".to_string()),
        })
    }

    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        self.disconnect(&mut inner).await;
    }

    async fn attempt<T, F, Fut>(
        &self,
        inner: &mut SessionInner<C::Conn>,
        addr: &InetAddr,
        f: &mut F,
    ) -> CommonResult<T>
    where
        F: FnMut(C::Conn, InetAddr) -> Fut,
        Fut: Future<Output = CommonResult<T>>,
    {
        let conn = match &inner.state {
            ConnState::Connected(conn) => conn.clone(),
            ConnState::Disconnected => {
                let conn = self.connector.connect(addr).await?;
                inner.state = ConnState::Connected(conn.clone());
                conn
            }
        };

        f(conn, addr.clone()).await
    }

    async fn disconnect(&self, inner: &mut SessionInner<C::Conn>) {
        let state = std::mem::replace(&mut inner.state, ConnState::Disconnected);
        if let ConnState::Connected(conn) = state {
            self.connector.close(conn).await;
        }
    }

    async fn next_server(&self, inner: &mut SessionInner<C::Conn>) {
        self.disconnect(inner).await;
        inner.index = (inner.index + 1) % inner.replicas.len();
    }
}
