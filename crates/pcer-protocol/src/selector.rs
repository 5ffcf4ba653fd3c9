/// Next-hop selection for PCER.
///
/// Scans the neighbor table under a given urgency class and returns the
/// minimum-cost neighbor. Pure logic: reads the table, returns a
/// decision. No I/O, no caching between calls.
use serde::{Deserialize, Serialize};

use crate::cost::CostModel;
use crate::neighbor::NeighborTable;
use crate::types::NodeAddr;
use crate::urgency::UrgencyClass;

// ── Decisions ──────────────────────────────────────────────────────────

/// Outcome of a next-hop selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RouteDecision {
    /// Cheapest usable neighbor and its cost.
    Selected { next_hop: NodeAddr, cost: f64 },
    /// No usable neighbor. A normal outcome, not a failure of the selector.
    NoRoute,
}

impl RouteDecision {
    pub fn next_hop(&self) -> Option<NodeAddr> {
        match self {
            RouteDecision::Selected { next_hop, .. } => Some(*next_hop),
            RouteDecision::NoRoute => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, RouteDecision::Selected { .. })
    }
}

// ── Selector capability ────────────────────────────────────────────────

/// A next-hop selection algorithm.
///
/// Injected into the [`Forwarder`](crate::Forwarder); `PcerSelector` is
/// the only algorithm shipped, `SelectorChain` composes several.
pub trait NextHopSelector {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn select(&self, class: UrgencyClass, table: &NeighborTable) -> RouteDecision;
}

/// Class-weighted minimum-cost selector.
///
/// Ties go to the first minimal candidate in ascending address order.
/// Non-finite costs never win.
#[derive(Debug, Clone, Default)]
pub struct PcerSelector {
    model: CostModel,
}

impl PcerSelector {
    pub fn new(model: CostModel) -> Self {
        Self { model }
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.model
    }
}

impl NextHopSelector for PcerSelector {
    fn name(&self) -> &str {
        "pcer"
    }

    fn select(&self, class: UrgencyClass, table: &NeighborTable) -> RouteDecision {
        let mut best: Option<(NodeAddr, f64)> = None;

        for (addr, metrics) in table.iter() {
            let cost = self.model.cost(class, metrics);
            if !cost.is_finite() {
                tracing::trace!(%addr, cost, "skipping neighbor with non-finite cost");
                continue;
            }
            // Strict `<` keeps the earlier neighbor on ties.
            if best.is_none_or(|(_, min)| cost < min) {
                best = Some((*addr, cost));
            }
        }

        match best {
            Some((next_hop, cost)) => {
                tracing::debug!(%class, %next_hop, cost, candidates = table.len(), "next hop selected");
                RouteDecision::Selected { next_hop, cost }
            }
            None => {
                tracing::debug!(%class, candidates = table.len(), "no usable neighbor");
                RouteDecision::NoRoute
            }
        }
    }
}

// ── Chained selection ──────────────────────────────────────────────────

/// Ordered list of selectors, tried by ascending priority value.
///
/// The first `Selected` answer wins; `NoRoute` only if every member
/// declines. Equal priorities keep insertion order.
#[derive(Default)]
pub struct SelectorChain {
    selectors: Vec<(i16, Box<dyn NextHopSelector + Send + Sync>)>,
}

impl SelectorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selector. Lower `priority` is consulted first.
    pub fn push<S>(&mut self, priority: i16, selector: S)
    where
        S: NextHopSelector + Send + Sync + 'static,
    {
        let pos = self
            .selectors
            .iter()
            .position(|(p, _)| *p > priority)
            .unwrap_or(self.selectors.len());
        self.selectors.insert(pos, (priority, Box::new(selector)));
    }

    pub fn with<S>(mut self, priority: i16, selector: S) -> Self
    where
        S: NextHopSelector + Send + Sync + 'static,
    {
        self.push(priority, selector);
        self
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl NextHopSelector for SelectorChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn select(&self, class: UrgencyClass, table: &NeighborTable) -> RouteDecision {
        for (priority, selector) in &self.selectors {
            let decision = selector.select(class, table);
            if decision.is_selected() {
                tracing::trace!(selector = selector.name(), priority, "chain member answered");
                return decision;
            }
        }
        RouteDecision::NoRoute
    }
}

impl<S: NextHopSelector + ?Sized> NextHopSelector for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select(&self, class: UrgencyClass, table: &NeighborTable) -> RouteDecision {
        (**self).select(class, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::neighbor::LinkMetrics;

    fn addr(last: u8) -> NodeAddr {
        NodeAddr::new(10, 1, 1, last)
    }

    /// The two-neighbor table from the reference topology.
    fn reference_table() -> NeighborTable {
        let mut table = NeighborTable::new();
        table.add_neighbor(addr(2), 5.0, 0.9).unwrap();
        table.add_neighbor(addr(3), 50.0, 0.2).unwrap();
        table
    }

    /// Always answers with a fixed neighbor.
    struct Fixed(NodeAddr);

    impl NextHopSelector for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn select(&self, _: UrgencyClass, _: &NeighborTable) -> RouteDecision {
            RouteDecision::Selected {
                next_hop: self.0,
                cost: 0.0,
            }
        }
    }

    /// Never answers.
    struct Never;

    impl NextHopSelector for Never {
        fn name(&self) -> &str {
            "never"
        }
        fn select(&self, _: UrgencyClass, _: &NeighborTable) -> RouteDecision {
            RouteDecision::NoRoute
        }
    }

    // ── PcerSelector ───────────────────────────────────────────────────

    #[test]
    fn critical_picks_fast_link() {
        let selector = PcerSelector::default();
        match selector.select(UrgencyClass::Critical, &reference_table()) {
            RouteDecision::Selected { next_hop, cost } => {
                assert_eq!(next_hop, addr(2));
                assert!((cost - 500.0).abs() < 1e-9);
            }
            other => panic!("expected Selected, got {:?}", other),
        }
    }

    #[test]
    fn bulk_picks_high_energy_link() {
        let selector = PcerSelector::default();
        let decision = selector.select(UrgencyClass::Bulk, &reference_table());
        assert_eq!(decision.next_hop(), Some(addr(2)));
    }

    #[test]
    fn bulk_prefers_energy_over_delay() {
        let mut table = NeighborTable::new();
        table.add_neighbor(addr(2), 1.0, 0.1).unwrap();
        table.add_neighbor(addr(3), 900.0, 0.8).unwrap();

        let selector = PcerSelector::default();
        assert_eq!(
            selector.select(UrgencyClass::Bulk, &table).next_hop(),
            Some(addr(3))
        );
        assert_eq!(
            selector.select(UrgencyClass::Critical, &table).next_hop(),
            Some(addr(2))
        );
    }

    #[test]
    fn empty_table_is_no_route() {
        let selector = PcerSelector::default();
        let table = NeighborTable::new();
        for class in UrgencyClass::ALL {
            assert_eq!(selector.select(class, &table), RouteDecision::NoRoute);
        }
    }

    #[test]
    fn tie_goes_to_lowest_address() {
        let mut table = NeighborTable::new();
        table.add_neighbor(addr(9), 10.0, 0.5).unwrap();
        table.add_neighbor(addr(4), 10.0, 0.5).unwrap();
        table.add_neighbor(addr(7), 10.0, 0.5).unwrap();

        let selector = PcerSelector::default();
        for _ in 0..5 {
            assert_eq!(
                selector.select(UrgencyClass::Standard, &table).next_hop(),
                Some(addr(4))
            );
        }
    }

    #[test]
    fn exhausted_neighbor_still_selectable_alone() {
        let mut table = NeighborTable::new();
        table.add_neighbor(addr(2), 5.0, 0.0).unwrap();

        let selector = PcerSelector::default();
        match selector.select(UrgencyClass::Bulk, &table) {
            RouteDecision::Selected { next_hop, cost } => {
                assert_eq!(next_hop, addr(2));
                assert_eq!(cost, 1_000_000.0);
            }
            other => panic!("expected Selected, got {:?}", other),
        }
    }

    #[test]
    fn non_finite_costs_never_win() {
        let mut table = NeighborTable::new();
        table.upsert(addr(2), LinkMetrics::new(f64::INFINITY, 0.9));
        let selector = PcerSelector::default();
        assert_eq!(
            selector.select(UrgencyClass::Critical, &table),
            RouteDecision::NoRoute
        );

        table.add_neighbor(addr(3), 50.0, 0.2).unwrap();
        assert_eq!(
            selector.select(UrgencyClass::Critical, &table).next_hop(),
            Some(addr(3))
        );
    }

    #[test]
    fn mutation_reflected_on_next_call() {
        let mut table = reference_table();
        let selector = PcerSelector::default();
        assert_eq!(
            selector.select(UrgencyClass::Bulk, &table).next_hop(),
            Some(addr(2))
        );

        table.add_neighbor(addr(2), 5.0, 0.05).unwrap();
        assert_eq!(
            selector.select(UrgencyClass::Bulk, &table).next_hop(),
            Some(addr(3))
        );
    }

    #[test]
    fn custom_weights_change_choice() {
        let config = RoutingConfig::new().class_weights(
            UrgencyClass::Critical,
            crate::config::Weights::new(0.0, 1.0),
        );
        let selector = PcerSelector::new(CostModel::new(config));
        let mut table = NeighborTable::new();
        table.add_neighbor(addr(2), 1.0, 0.1).unwrap();
        table.add_neighbor(addr(3), 100.0, 0.9).unwrap();
        assert_eq!(
            selector.select(UrgencyClass::Critical, &table).next_hop(),
            Some(addr(3))
        );
    }

    // ── SelectorChain ──────────────────────────────────────────────────

    #[test]
    fn chain_consults_by_priority() {
        let chain = SelectorChain::new()
            .with(10, Fixed(addr(99)))
            .with(0, PcerSelector::default());

        let decision = chain.select(UrgencyClass::Critical, &reference_table());
        assert_eq!(decision.next_hop(), Some(addr(2)));
    }

    #[test]
    fn chain_falls_through_on_no_route() {
        let chain = SelectorChain::new()
            .with(0, PcerSelector::default())
            .with(5, Never)
            .with(10, Fixed(addr(99)));

        let decision = chain.select(UrgencyClass::Standard, &NeighborTable::new());
        assert_eq!(decision.next_hop(), Some(addr(99)));
    }

    #[test]
    fn empty_chain_is_no_route() {
        let chain = SelectorChain::new();
        assert!(chain.is_empty());
        assert_eq!(
            chain.select(UrgencyClass::Bulk, &reference_table()),
            RouteDecision::NoRoute
        );
    }

    #[test]
    fn equal_priority_keeps_insertion_order() {
        let chain = SelectorChain::new()
            .with(1, Fixed(addr(50)))
            .with(1, Fixed(addr(60)));
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.select(UrgencyClass::Bulk, &NeighborTable::new()).next_hop(),
            Some(addr(50))
        );
    }
}
