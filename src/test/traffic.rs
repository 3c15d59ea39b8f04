use crate::topo::fat_tree::PodLayout;
use crate::workload::{
    FlowRequest, PORT_END, PORT_START, TimeWindow, TrafficGenerator, poisson_interval,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn generate(k: usize, rate: f64, seed: u64) -> Vec<FlowRequest> {
    let generator = TrafficGenerator::new(rate, 250, TimeWindow::default());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generator.generate(PodLayout::for_k(k), &mut rng)
}

#[test]
fn poisson_interval_is_zero_for_non_positive_rate() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert_eq!(poisson_interval(&mut rng, 0.0), 0.0);
    assert_eq!(poisson_interval(&mut rng, -3.0), 0.0);
}

#[test]
fn poisson_interval_mean_is_inverse_rate() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let rate = 50.0;
    let n = 20_000;
    let mean = (0..n).map(|_| poisson_interval(&mut rng, rate)).sum::<f64>() / n as f64;
    assert!((mean - 1.0 / rate).abs() < 0.1 / rate, "mean={mean}");
}

#[test]
fn destinations_are_always_in_another_pod() {
    for k in [2, 4, 6] {
        let layout = PodLayout::for_k(k);
        for seed in 1..20 {
            for f in generate(k, 500.0, seed) {
                assert_ne!(
                    layout.pod_of(f.source),
                    layout.pod_of(f.destination),
                    "k={k} seed={seed} flow={f:?}"
                );
                assert!(f.destination < layout.server_count());
            }
        }
    }
}

#[test]
fn flows_respect_time_window_ports_and_size() {
    let window = TimeWindow::default();
    let flows = generate(4, 1000.0, 42);
    assert!(!flows.is_empty());
    for f in &flows {
        assert!(f.start_time >= window.start && f.start_time < window.launch_end, "{f:?}");
        assert_eq!(f.stop_time, window.end);
        assert!((PORT_START..=PORT_END).contains(&f.port));
        assert_eq!(f.size_bytes, 250);
    }
}

#[test]
fn per_server_start_times_increase_and_ids_are_sequential() {
    let flows = generate(4, 1000.0, 3);
    for (i, f) in flows.iter().enumerate() {
        assert_eq!(f.flow_id, i as u64 + 1);
    }
    for pair in flows.windows(2) {
        if pair[0].source == pair[1].source {
            assert!(pair[1].start_time >= pair[0].start_time);
        } else {
            assert!(pair[1].source > pair[0].source, "servers are visited in order");
        }
    }
}

#[test]
fn fixed_seed_reproduces_schedule() {
    let a = generate(4, 200.0, 1234);
    let b = generate(4, 200.0, 1234);
    assert_eq!(a, b);

    let triples = |flows: &[FlowRequest]| {
        flows
            .iter()
            .map(|f| (f.start_time, f.destination, f.port))
            .collect::<Vec<_>>()
    };
    let c = generate(4, 200.0, 4321);
    assert_ne!(triples(&a), triples(&c));
}

#[test]
fn arrival_count_tracks_rate() {
    // 16 台服务器 * 0.2s * 500/s ≈ 1600
    let flows = generate(4, 500.0, 99);
    assert!((1300..1900).contains(&flows.len()), "got {}", flows.len());
}

#[test]
fn zero_rate_or_single_pod_generates_nothing() {
    assert!(generate(4, 0.0, 1).is_empty());

    let generator = TrafficGenerator::new(100.0, 250, TimeWindow::default());
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let layout = PodLayout {
        pods: 1,
        servers_per_pod: 4,
    };
    assert!(generator.generate(layout, &mut rng).is_empty());
}
