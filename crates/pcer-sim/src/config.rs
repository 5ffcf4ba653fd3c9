use std::path::PathBuf;

use pcer_protocol::{ClassWeights, RoutingConfig, Weights, DEFAULT_TTL};

/// Routing method a run is evaluated with. Recorded in the CSV
/// `Method` column so runs can be compared side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Method {
    /// Class-weighted PCER selection.
    #[default]
    Pcer,
    /// Class-blind shortest-delay selection: every class uses the same
    /// delay-only weights and energy is ignored.
    Baseline,
}

impl Method {
    pub fn label(self) -> &'static str {
        match self {
            Method::Pcer => "PCER",
            Method::Baseline => "Baseline",
        }
    }

    /// Routing config this method runs with, derived from `base`.
    pub fn routing(self, base: RoutingConfig) -> RoutingConfig {
        match self {
            Method::Pcer => base,
            Method::Baseline => {
                let delay_only = Weights::new(1.0, 0.0);
                base.weights(ClassWeights {
                    critical: delay_only,
                    standard: delay_only,
                    bulk: delay_only,
                })
            }
        }
    }
}

/// Configuration for a simulation run.
///
/// Builder style, defaults mirror the reference experiment:
///
/// ```text
/// let config = SimConfig::new().nodes(5).stop_time(10.0).ttl(8);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of simulated nodes, addressed 10.1.1.1 upwards.
    pub(crate) nodes: usize,
    /// Simulated seconds after which no further events are processed.
    pub(crate) stop_time_s: f64,
    /// Hop limit stamped on every originated packet.
    pub(crate) ttl: u8,
    /// Energy drained from a link per KiB transmitted over it.
    pub(crate) drain_per_kb: f64,
    /// Directory for timestamped CSV/JSONL output, if any.
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) routing: RoutingConfig,
    pub(crate) method: Method,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConfig {
    /// Create a config with defaults.
    ///
    /// If `PCER_OUTPUT_DIR` is set it becomes the output directory; the
    /// `output_dir` setter overrides it.
    pub fn new() -> Self {
        let output_dir = std::env::var_os("PCER_OUTPUT_DIR").map(PathBuf::from);

        Self {
            nodes: 5,
            stop_time_s: 10.0,
            ttl: DEFAULT_TTL,
            drain_per_kb: 0.001,
            output_dir,
            routing: RoutingConfig::default(),
            method: Method::default(),
        }
    }

    pub fn nodes(mut self, nodes: usize) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn stop_time(mut self, seconds: f64) -> Self {
        self.stop_time_s = seconds;
        self
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    /// Energy drained per KiB sent (default: 0.001). Zero disables drain.
    pub fn drain_per_kb(mut self, drain: f64) -> Self {
        self.drain_per_kb = drain;
        self
    }

    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    /// Routing method (default: PCER). Applied on top of `routing`.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcer_protocol::UrgencyClass;

    #[test]
    fn baseline_ignores_class_and_energy() {
        let routing = Method::Baseline.routing(RoutingConfig::new().validate_metrics(false));
        for class in UrgencyClass::ALL {
            assert_eq!(routing.get_weights().get(class), Weights::new(1.0, 0.0));
        }
        assert!(!routing.is_validating());
    }

    #[test]
    fn pcer_keeps_policy() {
        let routing = Method::Pcer.routing(RoutingConfig::new());
        assert_eq!(routing, RoutingConfig::new());
        assert_eq!(Method::Pcer.label(), "PCER");
        assert_eq!(Method::Baseline.label(), "Baseline");
    }
}
