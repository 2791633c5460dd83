//! Property-based tests for the routing table.

use conduit_core::Samples;
use conduit_routing::{AudioEndpoint, RouteRule, RouteType, RoutingConfig, RoutingError, RoutingTable};
use proptest::prelude::*;
use std::collections::HashSet;

fn route_type() -> impl Strategy<Value = RouteType> {
    prop_oneof![
        Just(RouteType::Direct),
        Just(RouteType::Mixed),
        Just(RouteType::Processed),
    ]
}

fn rule(source: u32, sink: u32, route_type: RouteType, priority: u8) -> RouteRule {
    RouteRule::new(
        AudioEndpoint::source(source, "src"),
        AudioEndpoint::sink(sink, "dst"),
        route_type,
    )
    .with_priority(priority)
}

proptest! {
    #[test]
    fn add_then_find_returns_equivalent_rule(
        source in 0u32..1000,
        sink in 0u32..1000,
        route_type in route_type(),
        priority in any::<u8>(),
    ) {
        let table = RoutingTable::new(RoutingConfig::default()).unwrap();
        let original = rule(source, sink, route_type, priority);
        let id = table.add_route(original.clone()).unwrap();

        let found = table.find_route(source, sink).unwrap();
        prop_assert_eq!(found.id, id);
        prop_assert_eq!(RouteRule { id: 0, ..found }, original.clone());

        let duplicate = table.add_route(original).unwrap_err();
        prop_assert_eq!(duplicate, RoutingError::AlreadyExists { source_id: source, sink_id: sink });
    }

    #[test]
    fn capacity_is_enforced(max_routes in 1usize..32, extra in 1usize..8) {
        let config = RoutingConfig { max_routes, ..Default::default() };
        let table = RoutingTable::new(config).unwrap();
        for sink in 0..max_routes {
            table.add_route(rule(1, sink as u32, RouteType::Direct, 0)).unwrap();
        }
        for sink in 0..extra {
            let err = table.add_route(rule(2, sink as u32, RouteType::Direct, 0)).unwrap_err();
            prop_assert_eq!(err, RoutingError::CapacityExceeded(max_routes));
        }
        prop_assert_eq!(table.len(), max_routes);

        // freeing one slot makes room again
        let first = table.routes()[0].id;
        table.remove_route(first).unwrap();
        prop_assert!(table.add_route(rule(2, 0, RouteType::Direct, 0)).is_ok());
    }

    #[test]
    fn dispatch_count_matches_enabled_routes(
        routes in prop::collection::vec((0u32..4, 0u32..16, route_type(), any::<bool>()), 0..24),
    ) {
        let table = RoutingTable::new(RoutingConfig::default()).unwrap();
        let mut pairs = HashSet::new();
        let mut expected = 0;
        for (source, sink, route_type, enabled) in routes {
            if !pairs.insert((source, sink)) {
                continue;
            }
            let mut r = rule(source, sink, route_type, 0);
            r.enabled = enabled;
            table.add_route(r).unwrap();
            if source == 0 && enabled {
                expected += 1;
            }
        }

        let period = vec![0.0f32; 128];
        let mut last_priority = 0;
        let n = table
            .route_buffer(0, Samples::F32(&period), 64, |rule, _| {
                assert!(rule.priority >= last_priority);
                last_priority = rule.priority;
            })
            .unwrap();
        prop_assert_eq!(n, expected);
    }
}
