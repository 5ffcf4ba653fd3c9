use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PcerError;

/// Identity of a node or neighbor: its IPv4 address.
///
/// Ordering is numeric address order; the selector walks neighbors in
/// this order, so it also fixes which of two equal-cost neighbors wins.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddr(Ipv4Addr);

impl NodeAddr {
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(Ipv4Addr::new(a, b, c, d))
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }
}

impl From<Ipv4Addr> for NodeAddr {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeAddr({})", self.0)
    }
}

impl FromStr for NodeAddr {
    type Err = PcerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Ipv4Addr>()
            .map(Self)
            .map_err(|_| PcerError::InvalidAddress(s.to_string()))
    }
}

/// Tag value assumed when a packet carries no urgency tag.
pub const DEFAULT_URGENCY_TAG: u8 = 1;

/// Default hop limit for new packets.
pub const DEFAULT_TTL: u8 = 8;
