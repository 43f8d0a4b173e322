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

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InetAddr {
    pub hostname: String,
    pub port: u16,
}

impl InetAddr {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    /// Address string accepted by `TcpStream::connect`, IPv6 literals are bracketed.
    pub fn connect_addr(&self) -> String {
        match self.hostname.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.hostname, self.port),
        }
    }
}

impl Display for InetAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.connect_addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_addr_brackets_ipv6() {
        assert_eq!(InetAddr::new("10.0.0.1", 20035).to_string(), "10.0.0.1:20035");
        assert_eq!(InetAddr::new("::1", 20035).to_string(), "[::1]:20035");
        assert_eq!(InetAddr::new("controller", 80).to_string(), "controller:80");
    }
}
