//! End-to-end routing scenarios.

use conduit_chain::ChainSpec;
use conduit_core::{SampleFormat, Samples, SamplesMut};
use conduit_registry::{EffectKind, ProcessingParams};
use conduit_routing::{
    AudioEndpoint, RouteChange, RouteRule, RouteType, RoutedBuffer, RoutingConfig, RoutingError,
    RoutingTable,
};
use std::sync::{Arc, Mutex};
use std::thread;

fn direct(source: u32, sink: u32) -> RouteRule {
    RouteRule::new(
        AudioEndpoint::source(source, format!("source-{source}")),
        AudioEndpoint::sink(sink, format!("sink-{sink}")),
        RouteType::Direct,
    )
}

#[test]
fn single_route_table_dispatches_only_its_source() {
    let config = RoutingConfig {
        max_routes: 1,
        ..Default::default()
    };
    let table = RoutingTable::new(config).unwrap();
    table.add_route(direct(1, 2)).unwrap();

    let period = vec![0.1f32; 512];
    assert_eq!(
        table
            .route_buffer(1, Samples::F32(&period), 256, |_, _| {})
            .unwrap(),
        1
    );
    assert_eq!(
        table
            .route_buffer(7, Samples::F32(&period), 256, |_, _| {})
            .unwrap(),
        0
    );

    let err = table.add_route(direct(3, 4)).unwrap_err();
    assert_eq!(err, RoutingError::CapacityExceeded(1));
    assert_eq!(err.errno(), -libc::ENOSPC);
}

#[test]
fn add_find_remove() {
    let table = RoutingTable::new(RoutingConfig::default()).unwrap();
    let rule = direct(1, 2).with_priority(7);
    let id = table.add_route(rule.clone()).unwrap();

    let found = table.find_route(1, 2).unwrap();
    assert_eq!(found.id, id);
    assert_eq!(RouteRule { id: 0, ..found }, rule);

    let err = table.add_route(direct(1, 2)).unwrap_err();
    assert_eq!(err.errno(), -libc::EEXIST);

    table.remove_route(id).unwrap();
    assert!(table.find_route(1, 2).is_none());
    let err = table.remove_route(id).unwrap_err();
    assert_eq!(err, RoutingError::NotFound(id));
    assert_eq!(err.errno(), -libc::ENOENT);
}

#[test]
fn invalid_rules_are_rejected_before_mutation() {
    let table = RoutingTable::new(RoutingConfig::default()).unwrap();
    let backwards = RouteRule::new(
        AudioEndpoint::sink(2, "speaker"),
        AudioEndpoint::source(1, "mic"),
        RouteType::Direct,
    );
    assert_eq!(table.add_route(backwards).unwrap_err().errno(), -libc::EINVAL);

    let unnamed = RouteRule::new(
        AudioEndpoint::source(1, ""),
        AudioEndpoint::sink(2, "speaker"),
        RouteType::Direct,
    );
    assert!(table.add_route(unnamed).is_err());

    let mut bad = ProcessingParams::defaults(EffectKind::Compressor);
    bad.gain = 5.0;
    let bad_chain = direct(1, 2).with_chain(ChainSpec::new(48000, 2).with_node(bad));
    assert!(matches!(
        table.add_route(bad_chain),
        Err(RoutingError::Chain(_))
    ));
    assert!(table.is_empty());
}

#[test]
fn routes_dispatch_in_priority_order() {
    let table = RoutingTable::new(RoutingConfig::default()).unwrap();
    table.add_route(direct(1, 30).with_priority(200)).unwrap();
    table.add_route(direct(1, 10).with_priority(0)).unwrap();
    table.add_route(direct(1, 20).with_priority(100)).unwrap();
    table.add_route(direct(2, 40).with_priority(0)).unwrap();

    let period = [0i16; 32];
    let mut order = Vec::new();
    table
        .route_buffer(1, Samples::I16(&period), 16, |rule, buffer| {
            assert!(buffer.is_shared());
            order.push(rule.sink.id);
        })
        .unwrap();
    assert_eq!(order, [10, 20, 30]);
}

#[test]
fn processed_route_runs_its_chain() {
    let config = RoutingConfig {
        sample_format: SampleFormat::I16,
        processing_buffer_size: 256,
        ..Default::default()
    };
    let table = RoutingTable::new(config).unwrap();

    let mut half = ProcessingParams::defaults(EffectKind::Equalizer);
    half.gain = 0.5;
    let rule = RouteRule::new(
        AudioEndpoint::source(1, "line-in"),
        AudioEndpoint::sink(2, "monitor"),
        RouteType::Processed,
    )
    .with_chain(ChainSpec::new(48000, 2).with_node(half));
    table.add_route(rule).unwrap();
    table.add_route(direct(1, 3)).unwrap();

    let period = vec![16000i16; 256];
    let mut seen = Vec::new();
    let n = table
        .route_buffer(1, Samples::I16(&period), 128, |rule, buffer| {
            let Samples::I16(samples) = buffer.samples() else {
                panic!("format changed");
            };
            seen.push((rule.sink.id, samples.len(), samples[0]));
        })
        .unwrap();
    assert_eq!(n, 2);
    assert!(seen.contains(&(3, 256, 16000)));
    let (_, len, first) = *seen.iter().find(|(sink, _, _)| *sink == 2).unwrap();
    assert_eq!(len, 256);
    assert!((i32::from(first) - 8000).abs() <= 1);
}

#[test]
fn mixed_sink_can_mutate_its_copy() {
    let table = RoutingTable::new(RoutingConfig::default()).unwrap();
    for sink in [2, 3] {
        table
            .add_route(RouteRule::new(
                AudioEndpoint::source(1, "bus"),
                AudioEndpoint::sink(sink, "mix"),
                RouteType::Mixed,
            ))
            .unwrap();
    }
    let period = [0.25f32; 64];
    let mut firsts = Vec::new();
    table
        .route_buffer(1, Samples::F32(&period), 32, |_, buffer| {
            if let RoutedBuffer::Owned(SamplesMut::F32(samples)) = buffer {
                firsts.push(samples[0]);
                for s in samples.iter_mut() {
                    *s *= 2.0;
                }
            }
        })
        .unwrap();
    // the second sink sees a fresh copy, not the first sink's edit
    assert_eq!(firsts, [0.25, 0.25]);
}

#[test]
fn empty_period_is_rejected() {
    let table = RoutingTable::new(RoutingConfig::default()).unwrap();
    table.add_route(direct(1, 2)).unwrap();
    let err = table
        .route_buffer(1, Samples::F32(&[]), 0, |_, _| {})
        .unwrap_err();
    assert_eq!(err.errno(), -libc::EINVAL);
}

fn mixed(source: u32, sink: u32) -> RouteRule {
    RouteRule::new(
        AudioEndpoint::source(source, format!("source-{source}")),
        AudioEndpoint::sink(sink, format!("sink-{sink}")),
        RouteType::Mixed,
    )
}

#[test]
fn period_larger_than_frame_count_is_rejected() {
    let config = RoutingConfig {
        processing_buffer_size: 4,
        ..Default::default()
    };
    let table = RoutingTable::new(config).unwrap();
    table.add_route(direct(1, 2)).unwrap();
    table.add_route(mixed(1, 3)).unwrap();

    // a reused 128-sample buffer carrying a 2-frame period
    let stale = [0.1f32; 128];
    let mut delivered = 0;
    let err = table
        .route_buffer(1, Samples::F32(&stale), 2, |_, _| delivered += 1)
        .unwrap_err();
    assert!(matches!(err, RoutingError::InvalidArgument(_)));
    assert_eq!(delivered, 0);

    // 7 samples cannot be 2 whole frames
    let err = table
        .route_buffer(1, Samples::F32(&stale[..7]), 2, |_, _| {})
        .unwrap_err();
    assert_eq!(err.errno(), -libc::EINVAL);

    // the same buffer trimmed to the period reaches both sinks in full
    let mut lens = Vec::new();
    let n = table
        .route_buffer(1, Samples::F32(&stale[..4]), 2, |rule, buffer| {
            lens.push((rule.sink.id, buffer.samples().len()));
        })
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(lens, [(2, 4), (3, 4)]);
}

#[test]
fn processed_route_with_wrong_channel_count_is_skipped() {
    let table = RoutingTable::new(RoutingConfig::default()).unwrap();
    let mono = RouteRule::new(
        AudioEndpoint::source(1, "line-in"),
        AudioEndpoint::sink(2, "mono-fx"),
        RouteType::Processed,
    )
    .with_chain(
        ChainSpec::new(48000, 1).with_node(ProcessingParams::defaults(EffectKind::Equalizer)),
    );
    table.add_route(mono).unwrap();
    table.add_route(direct(1, 3)).unwrap();

    let stereo = [0.5f32; 64];
    let mut sinks = Vec::new();
    let n = table
        .route_buffer(1, Samples::F32(&stereo), 32, |rule, _| sinks.push(rule.sink.id))
        .unwrap();
    assert_eq!(n, 1);
    assert_eq!(sinks, [3]);

    // a mono period of the same length goes through the chain
    let n = table
        .route_buffer(1, Samples::F32(&stereo), 64, |_, _| {})
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(
        RoutingError::ChannelMismatch { chain: 1, period: 2 }.errno(),
        -libc::EINVAL
    );
}

#[test]
fn callback_receives_changes() {
    let table = RoutingTable::new(RoutingConfig::default()).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    table.set_callback(move |rule, change| sink.lock().unwrap().push((rule.id, change)));

    let a = table.add_route(direct(1, 2)).unwrap();
    let b = table.add_route(direct(1, 3)).unwrap();
    table.set_route_enabled(a, false).unwrap();
    table.remove_route(b).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        [
            (a, RouteChange::Added),
            (b, RouteChange::Added),
            (a, RouteChange::Updated),
            (b, RouteChange::Removed),
        ]
    );
}

#[test]
fn writers_do_not_disturb_routing_thread() {
    let table = Arc::new(RoutingTable::new(RoutingConfig::default()).unwrap());
    table.add_route(direct(1, 1000)).unwrap();

    let writer = {
        let table = Arc::clone(&table);
        thread::spawn(move || {
            for sink in 0..200 {
                let id = table.add_route(direct(1, sink)).unwrap();
                table.remove_route(id).unwrap();
            }
        })
    };

    let period = vec![0.0f32; 256];
    for _ in 0..500 {
        let n = table
            .route_buffer(1, Samples::F32(&period), 128, |_, _| {})
            .unwrap();
        // the permanent route is always present, at most one transient one
        assert!((1..=2).contains(&n));
    }
    writer.join().unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn config_from_toml() {
    let config: RoutingConfig = toml::from_str(
        r#"
        max_routes = 8
        enable_auto_routing = true
        sample_format = "i16"
        "#,
    )
    .unwrap();
    assert_eq!(config.max_routes, 8);
    assert_eq!(config.default_priority, 128);
    assert!(config.enable_auto_routing);
    assert_eq!(config.sample_format, SampleFormat::I16);
    RoutingTable::new(config).unwrap();
}
