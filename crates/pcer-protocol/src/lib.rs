//! PCER routing core (Priority-Coupled Elastic Routing).
//!
//! Picks a next hop among directly reachable neighbors by minimizing a
//! cost weighted by the packet's urgency class: Critical traffic chases
//! low delay, Bulk traffic chases remaining energy, Standard balances
//! the two.
//!
//! Purely synchronous decision logic. Neighbor discovery, transmission,
//! delivery and scheduling belong to the host.

pub mod config;
pub mod cost;
pub mod error;
pub mod forwarding;
pub mod neighbor;
pub mod packet;
pub mod selector;
pub mod stats;
pub mod types;
pub mod urgency;

pub use config::{ClassWeights, RoutingConfig, Weights};
pub use cost::CostModel;
pub use error::PcerError;
pub use forwarding::{decide, ForwardAction, Forwarder};
pub use neighbor::{LinkMetrics, NeighborTable};
pub use packet::PacketHeader;
pub use selector::{NextHopSelector, PcerSelector, RouteDecision, SelectorChain};
pub use stats::{ClassCounters, ForwardingStats};
pub use types::{NodeAddr, DEFAULT_TTL, DEFAULT_URGENCY_TAG};
pub use urgency::UrgencyClass;
