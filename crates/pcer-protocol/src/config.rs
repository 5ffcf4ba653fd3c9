use serde::{Deserialize, Serialize};

use crate::urgency::UrgencyClass;

/// Delay/energy weights applied to one urgency class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub delay: f64,
    pub energy: f64,
}

impl Weights {
    pub const fn new(delay: f64, energy: f64) -> Self {
        Self { delay, energy }
    }
}

/// Weight table, one entry per urgency class.
///
/// The default is the PCER policy: Critical traffic ignores energy,
/// Bulk traffic ignores delay, Standard weighs both equally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    pub critical: Weights,
    pub standard: Weights,
    pub bulk: Weights,
}

impl ClassWeights {
    pub fn get(&self, class: UrgencyClass) -> Weights {
        match class {
            UrgencyClass::Critical => self.critical,
            UrgencyClass::Standard => self.standard,
            UrgencyClass::Bulk => self.bulk,
        }
    }
}

impl Default for ClassWeights {
    fn default() -> Self {
        Self {
            critical: Weights::new(100.0, 0.0),
            standard: Weights::new(1.0, 1.0),
            bulk: Weights::new(0.0, 100.0),
        }
    }
}

/// Energy at or below this is treated as exhausted.
pub const DEFAULT_ENERGY_FLOOR: f64 = 1e-4;

/// Energy cost charged for an exhausted neighbor. Finite, so an
/// exhausted neighbor still wins when it is the only one.
pub const DEFAULT_EXHAUSTED_PENALTY: f64 = 10_000.0;

/// Configuration for the routing core.
///
/// All fields have defaults matching the PCER policy. Builder style:
///
/// ```rust
/// use pcer_protocol::RoutingConfig;
///
/// let config = RoutingConfig::new()
///     .exhausted_penalty(50_000.0)
///     .validate_metrics(false);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub(crate) weights: ClassWeights,
    pub(crate) energy_floor: f64,
    pub(crate) exhausted_penalty: f64,
    /// Reject negative or non-finite delay (and NaN energy) at `add_neighbor`.
    ///
    /// Zero and negative energy are always accepted: they mean
    /// "exhausted" and are priced by the cost model.
    pub(crate) validate_metrics: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingConfig {
    pub fn new() -> Self {
        Self {
            weights: ClassWeights::default(),
            energy_floor: DEFAULT_ENERGY_FLOOR,
            exhausted_penalty: DEFAULT_EXHAUSTED_PENALTY,
            validate_metrics: true,
        }
    }

    /// Replace the whole weight table.
    pub fn weights(mut self, weights: ClassWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Override the weights of a single class.
    pub fn class_weights(mut self, class: UrgencyClass, weights: Weights) -> Self {
        match class {
            UrgencyClass::Critical => self.weights.critical = weights,
            UrgencyClass::Standard => self.weights.standard = weights,
            UrgencyClass::Bulk => self.weights.bulk = weights,
        }
        self
    }

    /// Set the exhausted-energy threshold (default: 1e-4).
    pub fn energy_floor(mut self, floor: f64) -> Self {
        self.energy_floor = floor;
        self
    }

    /// Set the penalty for exhausted neighbors (default: 10000).
    pub fn exhausted_penalty(mut self, penalty: f64) -> Self {
        self.exhausted_penalty = penalty;
        self
    }

    /// Enable or disable metric validation at insert time (default: on).
    pub fn validate_metrics(mut self, enabled: bool) -> Self {
        self.validate_metrics = enabled;
        self
    }

    pub fn get_weights(&self) -> &ClassWeights {
        &self.weights
    }

    pub fn is_validating(&self) -> bool {
        self.validate_metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = RoutingConfig::new();
        let w = config.get_weights();
        assert_eq!(w.get(UrgencyClass::Critical), Weights::new(100.0, 0.0));
        assert_eq!(w.get(UrgencyClass::Standard), Weights::new(1.0, 1.0));
        assert_eq!(w.get(UrgencyClass::Bulk), Weights::new(0.0, 100.0));
        assert_eq!(config.energy_floor, 1e-4);
        assert_eq!(config.exhausted_penalty, 10_000.0);
        assert!(config.is_validating());
    }

    #[test]
    fn builder_overrides_single_class() {
        let config =
            RoutingConfig::new().class_weights(UrgencyClass::Bulk, Weights::new(0.5, 10.0));
        assert_eq!(
            config.get_weights().get(UrgencyClass::Bulk),
            Weights::new(0.5, 10.0)
        );
        assert_eq!(
            config.get_weights().get(UrgencyClass::Critical),
            Weights::new(100.0, 0.0)
        );
    }
}
