use crate::error::ConfigError;
use crate::experiment::{Experiment, ExperimentConfig, RunMode, format_load, output_filename};
use crate::net::NetWorld;
use crate::path::PathId;
use crate::sim::{SimTime, Simulator};
use crate::topo::fat_tree::PodLayout;
use crate::workload::TimeWindow;

fn config(mode: RunMode) -> ExperimentConfig {
    ExperimentConfig {
        run_mode: mode,
        random_seed: 42,
        load: 0.5,
        flow_size: 2800,
        ..ExperimentConfig::default()
    }
}

#[test]
fn output_filename_layout() {
    assert_eq!(
        output_filename(3, RunMode::Drb, 0.2, 8, 500),
        "3-fattree-8-0.2-drb-500.xml"
    );
    assert_eq!(
        output_filename(0, RunMode::Ecmp, 0.1, 4, 250),
        "0-fattree-4-0.1-ecmp-250.xml"
    );
    assert_eq!(
        output_filename(7, RunMode::Rr, 0.75, 16, 1000),
        "7-fattree-16-0.75-rr-1000.xml"
    );
    assert_eq!(
        ExperimentConfig::default().output_filename(),
        "0-fattree-4-0.1-ecmp-250.xml"
    );
}

#[test]
fn load_is_printed_with_six_significant_digits() {
    assert_eq!(format_load(0.2), "0.2");
    assert_eq!(format_load(0.5), "0.5");
    assert_eq!(format_load(0.1234567), "0.123457");
    assert_eq!(format_load(0.00001), "1e-05");
    assert_eq!(format_load(0.0001), "0.0001");
}

#[test]
fn run_mode_parses_upper_case_names_only() {
    assert_eq!("ECMP".parse::<RunMode>(), Ok(RunMode::Ecmp));
    assert_eq!("RR".parse::<RunMode>(), Ok(RunMode::Rr));
    assert_eq!("DRB".parse::<RunMode>(), Ok(RunMode::Drb));
    assert_eq!(
        "drb".parse::<RunMode>(),
        Err(ConfigError::UnknownRunMode("drb".to_string()))
    );
    assert_eq!(RunMode::Drb.to_string(), "DRB");
}

#[test]
fn validation_rejects_bad_parameters_before_building() {
    let cases = [
        ExperimentConfig {
            k: 5,
            ..ExperimentConfig::default()
        },
        ExperimentConfig {
            load: 1.0,
            ..ExperimentConfig::default()
        },
        ExperimentConfig {
            flow_size: 0,
            ..ExperimentConfig::default()
        },
        ExperimentConfig {
            window: TimeWindow {
                start: 0.3,
                launch_end: 0.2,
                end: 0.5,
            },
            ..ExperimentConfig::default()
        },
        ExperimentConfig {
            agg_core_bps: 0,
            ..ExperimentConfig::default()
        },
    ];
    for cfg in cases {
        let mut world = NetWorld::default();
        assert!(cfg.validate().is_err(), "{cfg:?}");
        assert!(Experiment::build(cfg, &mut world).is_err());
        assert_eq!(world.net.node_count(), 0, "no partial topology");
    }
    assert_eq!(ExperimentConfig::default().validate(), Ok(()));
}

#[test]
fn explicit_seed_is_kept_and_zero_seed_is_derived() {
    assert_eq!(config(RunMode::Ecmp).resolve_seed(), 42);
    assert_ne!(ExperimentConfig::default().resolve_seed(), 0);
}

#[test]
fn build_produces_plan_for_each_mode() {
    for mode in [RunMode::Ecmp, RunMode::Rr, RunMode::Drb] {
        let mut world = NetWorld::default();
        let exp = Experiment::build(config(mode), &mut world).expect("build");
        let plan = &exp.plan;

        assert_eq!(plan.seed, 42);
        assert_eq!(plan.topology.servers, 16);
        assert_eq!(plan.topology.cores, 4);
        assert_eq!(plan.topology.path_base, 10);
        assert!(!plan.flows.is_empty());

        let layout = PodLayout::for_k(4);
        for f in &plan.flows {
            assert_ne!(layout.pod_of(f.source), layout.pod_of(f.destination));
        }

        match mode {
            RunMode::Ecmp => {
                assert!(plan.paths.is_empty());
                assert!(world.drb.is_none());
            }
            RunMode::Rr => {
                assert_eq!(plan.paths.len(), 16);
                assert_eq!(plan.paths[0], [33, 43, 34, 44].map(PathId));
            }
            RunMode::Drb => {
                assert_eq!(plan.paths.len(), 16);
                assert_eq!(plan.paths[0], [33, 34, 43, 44].map(PathId));
                let drb = world.drb.as_ref().expect("drb installed");
                assert_eq!(drb.paths(exp.topo.servers[0]), plan.paths[0].as_slice());
            }
        }
    }
}

#[test]
fn same_seed_same_flows_across_modes_and_runs() {
    let build = |mode| {
        let mut world = NetWorld::default();
        Experiment::build(config(mode), &mut world)
            .expect("build")
            .plan
            .flows
    };
    let a = build(RunMode::Drb);
    assert_eq!(a, build(RunMode::Drb));
    assert_eq!(a, build(RunMode::Ecmp), "path installation consumes no randomness");
}

#[test]
fn execute_delivers_every_packet_in_every_mode() {
    for mode in [RunMode::Ecmp, RunMode::Rr, RunMode::Drb] {
        let mut sim = Simulator::default();
        let mut world = NetWorld::default();
        let exp = Experiment::build(config(mode), &mut world).expect("build");
        let summary = exp.execute(&mut sim, &mut world);

        let flows = exp.plan.flows.len();
        assert_eq!(summary.flows, flows, "{mode}");
        assert_eq!(summary.tx_packets, 2 * flows as u64, "{mode}");
        assert_eq!(summary.rx_packets, 2 * flows as u64, "{mode}");
        assert_eq!(summary.lost_packets, 0);
        assert!(summary.avg_fct > 0.0 && summary.fct_p99 >= summary.avg_fct / 2.0);
        assert_eq!(world.net.stats.dropped_pkts, 0);

        for (flow_id, s) in world.net.monitor.flows() {
            assert_eq!(s.rx_bytes, 2800, "{mode} flow {flow_id}");
            // 跨 pod：边缘、汇聚、核心、汇聚、边缘
            assert_eq!(s.times_forwarded, 5 * s.rx_packets);
            let key = world.net.monitor.key(flow_id).expect("classified");
            assert!(key.source_port >= 49153);
        }
    }
}

#[test]
fn send_times_follow_source_link_serialization() {
    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    let exp = Experiment::build(config(RunMode::Drb), &mut world).expect("build");
    exp.execute(&mut sim, &mut world);

    // 1400B 在 10 Gbps 上的串行化时间
    let tx_time = SimTime(1120);
    for (flow_id, s) in world.net.monitor.flows() {
        let first = s.time_first_tx.expect("first tx");
        let last = s.time_last_tx.expect("last tx");
        assert!(
            last.saturating_sub(first) >= tx_time,
            "flow {flow_id}: second packet leaves after the first one is on the wire"
        );
        assert!(s.time_last_rx > s.time_first_tx);
    }
}

#[test]
fn drb_spreads_consecutive_packets_of_a_flow() {
    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    let cfg = ExperimentConfig {
        flow_size: 1400 * 4,
        ..config(RunMode::Drb)
    };
    let exp = Experiment::build(cfg, &mut world).expect("build");
    exp.execute(&mut sim, &mut world);

    // 每台服务器的游标都回到了起点或前进了 4 的倍数：每条流恰好用完一轮路径
    let drb = world.drb.as_mut().expect("drb");
    for (i, &server) in exp.topo.servers.iter().enumerate() {
        if exp.plan.flows.iter().any(|f| f.source == i) {
            assert_eq!(drb.next_path(server), Some(exp.plan.paths[i][0]));
        }
    }
}

#[test]
fn plan_serializes_to_json() {
    let mut world = NetWorld::default();
    let exp = Experiment::build(config(RunMode::Rr), &mut world).expect("build");
    let raw = serde_json::to_string(&exp.plan).expect("serialize plan");
    let v: serde_json::Value = serde_json::from_str(&raw).expect("parse plan");
    assert_eq!(v["config"]["run_mode"], "RR");
    assert_eq!(v["seed"], 42);
    assert_eq!(v["paths"][0][0], 33);
    assert_eq!(v["topology"]["server_addresses"][0], "10.1.1.2");
    assert_eq!(
        v["flows"].as_array().map(Vec::len),
        Some(exp.plan.flows.len())
    );
}
