//! Discrete-event simulation of PCER forwarding.
//!
//! Every node owns a [`Forwarder`]. Originated packets go through
//! `route_output`, packets arriving at a node through `route_input`.
//! A transmission takes the chosen link's delay and drains energy from
//! that link, which feeds back into later Bulk and Standard choices.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::io::Write;

use anyhow::Context;
use pcer_protocol::{
    ForwardAction, Forwarder, ForwardingStats, NodeAddr, PacketHeader, RouteDecision,
    UrgencyClass,
};

use crate::config::SimConfig;
use crate::events::{
    ClassLatency, DropReason, EventDelivered, EventDropped, EventForwarded, EventSent,
    EventSummary,
};
use crate::output::ResultSink;
use crate::topology::{node_addr, LinkSpec};
use crate::trace::TraceRecord;

/// A packet in flight.
#[derive(Debug, Clone)]
struct Flight {
    header: PacketHeader,
    sent_at: f64,
    hops: u8,
}

#[derive(Debug)]
enum EventKind {
    Originate { node: usize, flight: Flight },
    Arrive { node: usize, flight: Flight },
}

/// Queue entry. Ordered so the max-heap pops the earliest time first,
/// FIFO among equal times.
#[derive(Debug)]
struct Scheduled {
    at: f64,
    seq: u64,
    kind: EventKind,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct SimNode {
    addr: NodeAddr,
    forwarder: Forwarder,
    /// Energy of each link when installed, for the network-life figure.
    initial_energy: BTreeMap<NodeAddr, f64>,
}

#[derive(Default)]
struct Tally {
    trace_records: usize,
    skipped_records: usize,
    sent: u64,
    delivered: u64,
    dropped_no_route: u64,
    dropped_ttl: u64,
    dropped_unreachable: u64,
    latency: ClassLatency,
}

pub struct Simulation {
    config: SimConfig,
    nodes: Vec<SimNode>,
    index_by_addr: HashMap<NodeAddr, usize>,
    queue: BinaryHeap<Scheduled>,
    seq: u64,
    tally: Tally,
}

impl Simulation {
    /// Build the nodes and install `links` into their neighbor tables.
    pub fn new(config: SimConfig, links: &[LinkSpec]) -> anyhow::Result<Self> {
        let mut nodes = Vec::with_capacity(config.nodes);
        let mut index_by_addr = HashMap::new();

        for index in 0..config.nodes {
            let addr = node_addr(index)?;
            nodes.push(SimNode {
                addr,
                forwarder: Forwarder::with_config(
                    vec![addr],
                    config.method.routing(config.routing.clone()),
                ),
                initial_energy: BTreeMap::new(),
            });
            index_by_addr.insert(addr, index);
        }

        for link in links {
            let Some(node) = nodes.get_mut(link.node) else {
                tracing::warn!(node = link.node, "topology refers to unknown node, skipped");
                continue;
            };
            if link.neighbor == node.addr {
                tracing::warn!(addr = %node.addr, "self link skipped");
                continue;
            }
            node.forwarder
                .add_neighbor(link.neighbor, link.delay_ms, link.energy)
                .with_context(|| format!("installing {} on node {}", link.neighbor, link.node))?;
            node.initial_energy.insert(link.neighbor, link.energy);
        }

        Ok(Self {
            config,
            nodes,
            index_by_addr,
            queue: BinaryHeap::new(),
            seq: 0,
            tally: Tally::default(),
        })
    }

    /// Queue every trace record whose endpoints exist. Returns how many
    /// were skipped.
    pub fn schedule_trace(&mut self, records: &[TraceRecord]) -> usize {
        let mut skipped = 0;
        for (id, r) in records.iter().enumerate() {
            let (Some(src), Some(dst)) = (self.node_index(r.src), self.node_index(r.dst)) else {
                tracing::debug!(src = r.src, dst = r.dst, "trace record outside topology, skipped");
                skipped += 1;
                continue;
            };
            let header = PacketHeader::new(
                id as u64,
                self.nodes[src].addr,
                self.nodes[dst].addr,
                r.size,
            )
            .with_tag(r.tag)
            .with_ttl(self.config.ttl);
            let flight = Flight {
                header,
                sent_at: r.time_s,
                hops: 0,
            };
            self.schedule(r.time_s, EventKind::Originate { node: src, flight });
        }
        self.tally.trace_records += records.len();
        self.tally.skipped_records += skipped;
        skipped
    }

    /// Run until the queue drains or the stop time passes.
    pub fn run<W: Write>(&mut self, sink: &mut ResultSink<W>) -> anyhow::Result<EventSummary> {
        let mut in_flight = 0u64;
        sink.set_method(self.config.method);

        while let Some(item) = self.queue.pop() {
            if item.at > self.config.stop_time_s {
                in_flight = 1 + self.queue.len() as u64;
                break;
            }
            let now = item.at;
            match item.kind {
                EventKind::Originate { node, flight } => self.originate(node, flight, now, sink)?,
                EventKind::Arrive { node, flight } => self.arrive(node, flight, now, sink)?,
            }
        }

        sink.flush()?;

        let t = &self.tally;
        Ok(EventSummary {
            event: "summary",
            method: self.config.method.label(),
            trace_records: t.trace_records,
            skipped_records: t.skipped_records,
            sent: t.sent,
            delivered: t.delivered,
            dropped_no_route: t.dropped_no_route,
            dropped_ttl: t.dropped_ttl,
            dropped_unreachable: t.dropped_unreachable,
            in_flight,
            latency_ms: t.latency.clone(),
            network_life_pct: self.network_life_pct(),
            stop_time_s: self.config.stop_time_s,
        })
    }

    /// Per-node forwarding statistics.
    pub fn node_stats(&self) -> impl Iterator<Item = (NodeAddr, &ForwardingStats)> {
        self.nodes.iter().map(|n| (n.addr, n.forwarder.stats()))
    }

    /// Mean remaining link energy as a percentage of what was installed.
    pub fn network_life_pct(&self) -> f64 {
        let mut total = 0.0;
        let mut links = 0usize;
        for node in &self.nodes {
            for (addr, initial) in &node.initial_energy {
                if *initial <= 0.0 {
                    continue;
                }
                let current = node
                    .forwarder
                    .neighbors()
                    .get(addr)
                    .map_or(0.0, |m| m.energy.max(0.0));
                total += (current / initial).min(1.0);
                links += 1;
            }
        }
        if links == 0 {
            100.0
        } else {
            100.0 * total / links as f64
        }
    }

    // ── Internal ───────────────────────────────────────────────────────

    fn node_index(&self, raw: i64) -> Option<usize> {
        usize::try_from(raw).ok().filter(|i| *i < self.nodes.len())
    }

    fn schedule(&mut self, at: f64, kind: EventKind) {
        self.seq += 1;
        self.queue.push(Scheduled {
            at,
            seq: self.seq,
            kind,
        });
    }

    fn originate<W: Write>(
        &mut self,
        node: usize,
        flight: Flight,
        now: f64,
        sink: &mut ResultSink<W>,
    ) -> anyhow::Result<()> {
        if self.nodes[node].forwarder.is_local(&flight.header.destination) {
            return self.deliver(node, &flight, now, sink);
        }

        let class = flight.header.urgency();
        let decision = self.nodes[node].forwarder.route_output(flight.header.urgency);

        match decision {
            RouteDecision::Selected { next_hop, cost } => {
                self.tally.sent += 1;
                sink.emit(&EventSent {
                    event: "sent",
                    packet: flight.header.id,
                    time_s: now,
                    source: flight.header.source.to_string(),
                    destination: flight.header.destination.to_string(),
                    class: class.name(),
                    next_hop: next_hop.to_string(),
                    cost,
                })?;
                self.transmit(node, flight, next_hop, now, sink)
            }
            RouteDecision::NoRoute => self.drop_packet(node, &flight, now, DropReason::NoRoute, sink),
        }
    }

    fn arrive<W: Write>(
        &mut self,
        node: usize,
        flight: Flight,
        now: f64,
        sink: &mut ResultSink<W>,
    ) -> anyhow::Result<()> {
        match self.nodes[node].forwarder.route_input(&flight.header) {
            ForwardAction::LocalDeliver => self.deliver(node, &flight, now, sink),
            ForwardAction::Forward { next_hop, cost } => {
                sink.emit(&EventForwarded {
                    event: "forwarded",
                    packet: flight.header.id,
                    time_s: now,
                    at: self.nodes[node].addr.to_string(),
                    next_hop: next_hop.to_string(),
                    cost,
                    ttl: flight.header.ttl,
                })?;
                self.transmit(node, flight, next_hop, now, sink)
            }
            ForwardAction::NoRoute => self.drop_packet(node, &flight, now, DropReason::NoRoute, sink),
        }
    }

    fn transmit<W: Write>(
        &mut self,
        from: usize,
        mut flight: Flight,
        next_hop: NodeAddr,
        now: f64,
        sink: &mut ResultSink<W>,
    ) -> anyhow::Result<()> {
        let Some(&to) = self.index_by_addr.get(&next_hop) else {
            return self.drop_packet(from, &flight, now, DropReason::Unreachable, sink);
        };
        if flight.header.decrement_ttl().is_err() {
            return self.drop_packet(from, &flight, now, DropReason::TtlExpired, sink);
        }

        let forwarder = &mut self.nodes[from].forwarder;
        let metrics = *forwarder
            .neighbors()
            .get(&next_hop)
            .with_context(|| format!("selected neighbor {next_hop} missing from table"))?;

        if self.config.drain_per_kb > 0.0 {
            let spent = self.config.drain_per_kb * f64::from(flight.header.size) / 1024.0;
            let remaining = (metrics.energy - spent).max(0.0);
            forwarder.add_neighbor(next_hop, metrics.delay_ms, remaining)?;
        }

        flight.hops += 1;
        let arrival = now + metrics.delay_ms.max(0.0) / 1000.0;
        self.schedule(arrival, EventKind::Arrive { node: to, flight });
        Ok(())
    }

    fn deliver<W: Write>(
        &mut self,
        node: usize,
        flight: &Flight,
        now: f64,
        sink: &mut ResultSink<W>,
    ) -> anyhow::Result<()> {
        let class = flight.header.urgency();
        let latency_ms = (now - flight.sent_at) * 1000.0;

        self.tally.delivered += 1;
        match class {
            UrgencyClass::Critical => self.tally.latency.critical.observe(latency_ms),
            UrgencyClass::Standard => self.tally.latency.standard.observe(latency_ms),
            UrgencyClass::Bulk => self.tally.latency.bulk.observe(latency_ms),
        }

        let life = self.network_life_pct();
        sink.write_delivery(class.name(), latency_ms, life)?;
        sink.emit(&EventDelivered {
            event: "delivered",
            packet: flight.header.id,
            time_s: now,
            at: self.nodes[node].addr.to_string(),
            class: class.name(),
            latency_ms,
            hops: flight.hops,
        })?;
        Ok(())
    }

    fn drop_packet<W: Write>(
        &mut self,
        node: usize,
        flight: &Flight,
        now: f64,
        reason: DropReason,
        sink: &mut ResultSink<W>,
    ) -> anyhow::Result<()> {
        match reason {
            DropReason::NoRoute => self.tally.dropped_no_route += 1,
            DropReason::TtlExpired => self.tally.dropped_ttl += 1,
            DropReason::Unreachable => self.tally.dropped_unreachable += 1,
        }
        tracing::debug!(packet = flight.header.id, at = %self.nodes[node].addr, ?reason, "packet dropped");
        sink.emit(&EventDropped {
            event: "dropped",
            packet: flight.header.id,
            time_s: now,
            at: self.nodes[node].addr.to_string(),
            class: flight.header.urgency().name(),
            reason,
        })?;
        Ok(())
    }
}
