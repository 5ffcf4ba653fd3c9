use pcer_metrics::Summary;
use pcer_protocol::ForwardingStats;
use serde::Serialize;

// ── Packet events ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventSent {
    pub event: &'static str,
    pub packet: u64,
    pub time_s: f64,
    pub source: String,
    pub destination: String,
    pub class: &'static str,
    pub next_hop: String,
    pub cost: f64,
}

#[derive(Serialize)]
pub struct EventForwarded {
    pub event: &'static str,
    pub packet: u64,
    pub time_s: f64,
    pub at: String,
    pub next_hop: String,
    pub cost: f64,
    pub ttl: u8,
}

#[derive(Serialize)]
pub struct EventDelivered {
    pub event: &'static str,
    pub packet: u64,
    pub time_s: f64,
    pub at: String,
    pub class: &'static str,
    pub latency_ms: f64,
    pub hops: u8,
}

#[derive(Serialize)]
pub struct EventDropped {
    pub event: &'static str,
    pub packet: u64,
    pub time_s: f64,
    pub at: String,
    pub class: &'static str,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Selector found no usable neighbor.
    NoRoute,
    /// Hop limit exhausted before reaching the destination.
    TtlExpired,
    /// Chosen next hop is not a simulated node.
    Unreachable,
}

// ── Summary ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassLatency {
    pub critical: Summary,
    pub standard: Summary,
    pub bulk: Summary,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub event: &'static str,
    pub method: &'static str,
    pub trace_records: usize,
    pub skipped_records: usize,
    pub sent: u64,
    pub delivered: u64,
    pub dropped_no_route: u64,
    pub dropped_ttl: u64,
    pub dropped_unreachable: u64,
    /// Still queued when the stop time was reached.
    pub in_flight: u64,
    pub latency_ms: ClassLatency,
    pub network_life_pct: f64,
    pub stop_time_s: f64,
}

/// Final per-node forwarding counters.
#[derive(Serialize)]
pub struct EventNodeStats<'a> {
    pub event: &'static str,
    pub method: &'static str,
    pub node: String,
    pub stats: &'a ForwardingStats,
}
