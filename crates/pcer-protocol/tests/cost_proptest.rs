use proptest::prelude::*;
use pcer_protocol::{
    CostModel, LinkMetrics, NeighborTable, NextHopSelector, NodeAddr, PcerSelector,
    RouteDecision, UrgencyClass,
};

fn energy_cost(energy: f64) -> f64 {
    if energy > 1e-4 {
        1.0 / energy
    } else {
        10_000.0
    }
}

fn arb_class() -> impl Strategy<Value = UrgencyClass> {
    prop_oneof![
        Just(UrgencyClass::Critical),
        Just(UrgencyClass::Standard),
        Just(UrgencyClass::Bulk),
    ]
}

/// Up to 16 neighbors with distinct addresses and arbitrary sane metrics.
fn arb_table() -> impl Strategy<Value = NeighborTable> {
    prop::collection::btree_map(any::<u8>(), (0.0..1000.0f64, -1.0..2.0f64), 0..16).prop_map(
        |entries| {
            let mut table = NeighborTable::new();
            for (last, (delay, energy)) in entries {
                table
                    .add_neighbor(NodeAddr::new(10, 0, 0, last), delay, energy)
                    .unwrap();
            }
            table
        },
    )
}

proptest! {
    /// Critical cost is delay alone, scaled by 100.
    #[test]
    fn critical_cost_is_scaled_delay(delay in 0.0..1e6f64, energy in 1.1e-4..1e3f64) {
        let m = LinkMetrics::new(delay, energy);
        prop_assert_eq!(CostModel::default().cost(UrgencyClass::Critical, &m), 100.0 * delay);
    }

    /// Bulk cost is energy cost alone, scaled by 100.
    #[test]
    fn bulk_cost_is_scaled_energy(delay in 0.0..1e6f64, energy in -10.0..1e3f64) {
        let m = LinkMetrics::new(delay, energy);
        prop_assert_eq!(
            CostModel::default().cost(UrgencyClass::Bulk, &m),
            100.0 * energy_cost(energy)
        );
    }

    /// Standard cost is the unweighted sum.
    #[test]
    fn standard_cost_is_sum(delay in 0.0..1e6f64, energy in -10.0..1e3f64) {
        let m = LinkMetrics::new(delay, energy);
        prop_assert_eq!(
            CostModel::default().cost(UrgencyClass::Standard, &m),
            delay + energy_cost(energy)
        );
    }

    /// The selected neighbor has the minimum cost, and it is the lowest
    /// address among those sharing that minimum.
    #[test]
    fn selection_is_minimal_and_stable(table in arb_table(), class in arb_class()) {
        let selector = PcerSelector::default();
        let model = CostModel::default();
        let decision = selector.select(class, &table);

        if table.is_empty() {
            prop_assert_eq!(decision, RouteDecision::NoRoute);
        } else {
            let RouteDecision::Selected { next_hop, cost } = decision else {
                return Err(TestCaseError::fail("non-empty table yielded NoRoute"));
            };
            let min = table
                .iter()
                .map(|(_, m)| model.cost(class, m))
                .fold(f64::INFINITY, f64::min);
            prop_assert_eq!(cost, min);
            let first_min = table
                .iter()
                .find(|(_, m)| model.cost(class, m) == min)
                .map(|(a, _)| *a);
            prop_assert_eq!(Some(next_hop), first_min);
        }

        // Idempotent on an unmutated table.
        prop_assert_eq!(selector.select(class, &table), decision);
    }

    /// Wire decoding never fails and only 0 and 2 escape Standard.
    #[test]
    fn any_tag_decodes(tag in any::<u8>()) {
        let class = UrgencyClass::from_tag(tag);
        match tag {
            0 => prop_assert_eq!(class, UrgencyClass::Critical),
            2 => prop_assert_eq!(class, UrgencyClass::Bulk),
            _ => prop_assert_eq!(class, UrgencyClass::Standard),
        }
    }
}
