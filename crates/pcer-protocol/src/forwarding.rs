/// Forwarding decision for PCER nodes.
///
/// Pure decision logic. Takes a packet's destination and urgency,
/// returns a `ForwardAction` telling the caller what to do (deliver
/// locally, transmit to a neighbor, or drop for lack of a route).
/// No I/O: transmission and delivery belong to the host.
use serde::{Deserialize, Serialize};

use crate::config::RoutingConfig;
use crate::cost::CostModel;
use crate::error::PcerError;
use crate::neighbor::{LinkMetrics, NeighborTable};
use crate::packet::PacketHeader;
use crate::selector::{NextHopSelector, PcerSelector, RouteDecision};
use crate::stats::ForwardingStats;
use crate::types::NodeAddr;
use crate::urgency::UrgencyClass;

// ── Forwarding actions ─────────────────────────────────────────────────

/// What to do with an inbound packet. Evaluated fresh for every packet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ForwardAction {
    /// Destination is one of our addresses, hand to local delivery.
    LocalDeliver,
    /// Transmit to `next_hop`.
    Forward { next_hop: NodeAddr, cost: f64 },
    /// No usable neighbor. The host decides the drop policy.
    NoRoute,
}

/// Decide between local delivery and forwarding for one packet.
pub fn decide<S: NextHopSelector + ?Sized>(
    destination: NodeAddr,
    local_addrs: &[NodeAddr],
    class: UrgencyClass,
    table: &NeighborTable,
    selector: &S,
) -> ForwardAction {
    if local_addrs.contains(&destination) {
        return ForwardAction::LocalDeliver;
    }

    match selector.select(class, table) {
        RouteDecision::Selected { next_hop, cost } => ForwardAction::Forward { next_hop, cost },
        RouteDecision::NoRoute => ForwardAction::NoRoute,
    }
}

// ── Forwarder ──────────────────────────────────────────────────────────

/// Routing state of one node: its own addresses, its neighbor table
/// and the selector it was built with.
///
/// Not internally synchronized. A multi-threaded host must give each
/// `Forwarder` a single owner or wrap it in a lock.
pub struct Forwarder<S = PcerSelector> {
    local_addrs: Vec<NodeAddr>,
    table: NeighborTable,
    selector: S,
    validate_metrics: bool,
    stats: ForwardingStats,
}

impl Forwarder<PcerSelector> {
    /// Forwarder with the default PCER policy.
    pub fn new(local_addr: NodeAddr) -> Self {
        Self::with_config(vec![local_addr], RoutingConfig::default())
    }

    pub fn with_config(local_addrs: Vec<NodeAddr>, config: RoutingConfig) -> Self {
        let validate = config.is_validating();
        Self::with_selector(local_addrs, PcerSelector::new(CostModel::new(config)))
            .validate_metrics(validate)
    }
}

impl<S: NextHopSelector> Forwarder<S> {
    /// Forwarder using an injected selector.
    pub fn with_selector(local_addrs: Vec<NodeAddr>, selector: S) -> Self {
        Self {
            local_addrs,
            table: NeighborTable::new(),
            selector,
            validate_metrics: true,
            stats: ForwardingStats::new(),
        }
    }

    /// Toggle metric validation in [`add_neighbor`](Self::add_neighbor).
    pub fn validate_metrics(mut self, enabled: bool) -> Self {
        self.validate_metrics = enabled;
        self
    }

    pub fn local_addrs(&self) -> &[NodeAddr] {
        &self.local_addrs
    }

    pub fn add_local_addr(&mut self, addr: NodeAddr) {
        if !self.local_addrs.contains(&addr) {
            self.local_addrs.push(addr);
        }
    }

    pub fn is_local(&self, addr: &NodeAddr) -> bool {
        self.local_addrs.contains(addr)
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.table
    }

    pub fn stats(&self) -> &ForwardingStats {
        &self.stats
    }

    /// Install or refresh a neighbor. Last write wins.
    pub fn add_neighbor(
        &mut self,
        addr: NodeAddr,
        delay_ms: f64,
        energy: f64,
    ) -> Result<(), PcerError> {
        if self.validate_metrics {
            self.table.add_neighbor(addr, delay_ms, energy)
        } else {
            self.table.upsert(addr, LinkMetrics::new(delay_ms, energy));
            Ok(())
        }
    }

    /// Next hop for a packet originated on this node.
    pub fn route_output(&mut self, urgency_tag: Option<u8>) -> RouteDecision {
        let class = UrgencyClass::from_tag_opt(urgency_tag);
        let decision = self.selector.select(class, &self.table);
        match decision {
            RouteDecision::Selected { cost, .. } => {
                self.stats.originated.inc();
                self.stats.record_selection(class, cost);
            }
            RouteDecision::NoRoute => self.stats.no_route.inc(),
        }
        decision
    }

    /// Decide what to do with an inbound packet.
    pub fn decide(&mut self, destination: NodeAddr, urgency_tag: Option<u8>) -> ForwardAction {
        let class = UrgencyClass::from_tag_opt(urgency_tag);
        let action = decide(
            destination,
            &self.local_addrs,
            class,
            &self.table,
            &self.selector,
        );

        match action {
            ForwardAction::LocalDeliver => self.stats.local_delivered.inc(),
            ForwardAction::Forward { next_hop, cost } => {
                self.stats.forwarded.inc();
                self.stats.record_selection(class, cost);
                tracing::trace!(%destination, %next_hop, %class, "forwarding");
            }
            ForwardAction::NoRoute => {
                self.stats.no_route.inc();
                tracing::debug!(%destination, %class, selector = self.selector.name(), "no route");
            }
        }
        action
    }

    /// [`decide`](Self::decide) for a full packet header.
    pub fn route_input(&mut self, header: &PacketHeader) -> ForwardAction {
        self.decide(header.destination, header.urgency)
    }
}
