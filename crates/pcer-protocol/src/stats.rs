//! Forwarding statistics kept by a [`Forwarder`](crate::Forwarder).

use pcer_metrics::{Counter, Summary};
use serde::{Deserialize, Serialize};

use crate::urgency::UrgencyClass;

/// Per-class selection counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassCounters {
    pub critical: Counter,
    pub standard: Counter,
    pub bulk: Counter,
}

impl ClassCounters {
    pub fn get(&self, class: UrgencyClass) -> &Counter {
        match class {
            UrgencyClass::Critical => &self.critical,
            UrgencyClass::Standard => &self.standard,
            UrgencyClass::Bulk => &self.bulk,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwardingStats {
    /// Packets originated locally that found a next hop.
    pub originated: Counter,
    /// Packets handed to local delivery.
    pub local_delivered: Counter,
    /// Inbound packets forwarded to a neighbor.
    pub forwarded: Counter,
    /// Selections that found no usable neighbor.
    pub no_route: Counter,
    /// Successful selections, by class.
    pub selected_by_class: ClassCounters,
    /// Costs of every successful selection.
    pub selected_cost: Summary,
}

impl ForwardingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_selection(&mut self, class: UrgencyClass, cost: f64) {
        self.selected_by_class.get(class).inc();
        self.selected_cost.observe(cost);
    }

    /// Total selection attempts that reached the selector.
    pub fn selections(&self) -> u64 {
        self.originated.get() + self.forwarded.get() + self.no_route.get()
    }
}
