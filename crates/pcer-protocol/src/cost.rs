//! Class-weighted link cost.
//!
//! cost = w_delay * delay + w_energy * energy_cost, where energy_cost is
//! 1/energy above the exhausted floor and a fixed finite penalty at or
//! below it. Lower is better. Pure and total.

use crate::config::{RoutingConfig, Weights};
use crate::neighbor::LinkMetrics;
use crate::urgency::UrgencyClass;

/// Cost function parameterized by a [`RoutingConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    config: RoutingConfig,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl CostModel {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn weights(&self, class: UrgencyClass) -> Weights {
        self.config.weights.get(class)
    }

    /// Inverse remaining energy, or the exhausted penalty.
    pub fn energy_cost(&self, metrics: &LinkMetrics) -> f64 {
        if metrics.energy > self.config.energy_floor {
            1.0 / metrics.energy
        } else {
            self.config.exhausted_penalty
        }
    }

    pub fn cost(&self, class: UrgencyClass, metrics: &LinkMetrics) -> f64 {
        let w = self.weights(class);
        w.delay * metrics.delay_ms + w.energy * self.energy_cost(metrics)
    }
}
