/// Neighbor table: observed link metrics per directly reachable node.
///
/// Populated by an external discovery or bootstrap collaborator. The
/// core never prunes it: entries live as long as the table does.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PcerError;
use crate::types::NodeAddr;

/// Metrics of the directed link from the local node to one neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkMetrics {
    /// Observed link delay in milliseconds.
    pub delay_ms: f64,
    /// Remaining energy estimate; 0 or below means exhausted.
    pub energy: f64,
}

impl LinkMetrics {
    pub const fn new(delay_ms: f64, energy: f64) -> Self {
        Self { delay_ms, energy }
    }

    /// Checks applied when validation is enabled.
    ///
    /// Delay must be finite and non-negative; a zero weight times an
    /// infinite delay is NaN. Energy may be zero or negative, it just
    /// may not be NaN.
    pub fn validate(&self, neighbor: NodeAddr) -> Result<(), PcerError> {
        if !self.delay_ms.is_finite() || self.delay_ms < 0.0 {
            return Err(PcerError::InvalidMetrics {
                neighbor,
                reason: format!("non-finite or negative delay {}", self.delay_ms),
            });
        }
        if self.energy.is_nan() {
            return Err(PcerError::InvalidMetrics {
                neighbor,
                reason: "NaN energy".into(),
            });
        }
        Ok(())
    }
}

/// Mapping from neighbor address to link metrics.
///
/// Backed by a `BTreeMap`, so iteration is in ascending address order
/// and stable for an unmutated table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborTable {
    neighbors: BTreeMap<NodeAddr, LinkMetrics>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `addr` after validating it.
    pub fn add_neighbor(
        &mut self,
        addr: NodeAddr,
        delay_ms: f64,
        energy: f64,
    ) -> Result<(), PcerError> {
        let metrics = LinkMetrics::new(delay_ms, energy);
        metrics.validate(addr)?;
        self.upsert(addr, metrics);
        Ok(())
    }

    /// Insert or overwrite without validation. Last write wins.
    pub fn upsert(&mut self, addr: NodeAddr, metrics: LinkMetrics) {
        if let Some(previous) = self.neighbors.insert(addr, metrics) {
            tracing::trace!(%addr, ?previous, ?metrics, "neighbor metrics replaced");
        }
    }

    pub fn get(&self, addr: &NodeAddr) -> Option<&LinkMetrics> {
        self.neighbors.get(addr)
    }

    /// All entries in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeAddr, &LinkMetrics)> {
        self.neighbors.iter()
    }

    /// Neighbor addresses in ascending order.
    pub fn addrs(&self) -> impl Iterator<Item = &NodeAddr> {
        self.neighbors.keys()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}
