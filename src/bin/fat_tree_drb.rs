//! Fat-tree 多路径实验：ECMP / RR / DRB
//!
//! 构建 k 元胖树，按模式安装逐服务器路径表，按目标负载生成泊松流量，
//! 运行到结束时间后把流统计写入 `{ID}-fattree-{K}-{load}-{mode}{flowSize}.xml`。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use fattree_drb::error::ExperimentError;
use fattree_drb::experiment::{Experiment, ExperimentConfig, RunMode, TransportConfig};
use fattree_drb::net::NetWorld;
use fattree_drb::sim::Simulator;
use fattree_drb::workload::TimeWindow;
use tracing::{error, info};

const GBPS: u64 = 1_000_000_000;

#[derive(Debug, Parser)]
#[command(
    name = "fat_tree_drb",
    about = "Compare ECMP, round-robin and DRB multipath spreading on a k-ary fat-tree"
)]
struct Args {
    /// Simulation ID used to identify result output file
    #[arg(long = "ID", default_value_t = 0, allow_negative_numbers = true)]
    id: i64,

    /// Number of pods in fat-tree
    #[arg(long = "K", default_value_t = 4)]
    k: usize,

    /// Server to edge bandwidth (bps)
    #[arg(long = "bwServerEdge", default_value_t = 10 * GBPS)]
    bw_server_edge: u64,

    /// Edge to aggregation bandwidth (bps)
    #[arg(long = "bwEdgeAgg", default_value_t = 10 * GBPS)]
    bw_edge_agg: u64,

    /// Aggregation to core bandwidth (bps)
    #[arg(long = "bwAggCore", default_value_t = 10 * GBPS)]
    bw_agg_core: u64,

    /// Running mode of this simulation: ECMP, RR, or DRB
    #[arg(long = "runMode", default_value = "ECMP")]
    run_mode: String,

    /// Random seed, 0 for random generated
    #[arg(long = "randomSeed", default_value_t = 0)]
    random_seed: u64,

    /// Size of each flow (bytes)
    #[arg(long = "flowSize", default_value_t = 250)]
    flow_size: u64,

    /// Load of the network, between 0.0 - 1.0
    #[arg(long = "load", default_value_t = 0.1)]
    load: f64,

    /// Whether to enable DCTCP
    #[arg(
        long = "enableDcTcp",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    enable_dctcp: bool,

    /// Whether to enable resequence buffer
    #[arg(
        long = "resequenceBuffer",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    resequence_buffer: bool,

    /// Flow launch window start (s)
    #[arg(long = "startTime", default_value_t = 0.0)]
    start_time: f64,

    /// No new flows start at or after this time (s)
    #[arg(long = "flowLaunchEndTime", default_value_t = 0.2)]
    flow_launch_end_time: f64,

    /// Simulation stop time (s)
    #[arg(long = "endTime", default_value_t = 0.5)]
    end_time: f64,

    /// Directory for the flow statistics XML
    #[arg(long = "outputDir", default_value = ".")]
    output_dir: PathBuf,

    /// Also write the generated experiment plan as JSON
    #[arg(long = "planJson")]
    plan_json: Option<PathBuf>,

    /// Stop after building the plan, without running the simulation
    #[arg(long = "noRun")]
    no_run: bool,
}

impl Args {
    fn to_config(&self) -> Result<ExperimentConfig, ExperimentError> {
        let run_mode: RunMode = self.run_mode.parse()?;
        Ok(ExperimentConfig {
            id: self.id,
            k: self.k,
            server_edge_bps: self.bw_server_edge,
            edge_agg_bps: self.bw_edge_agg,
            agg_core_bps: self.bw_agg_core,
            run_mode,
            random_seed: self.random_seed,
            flow_size: self.flow_size,
            load: self.load,
            transport: TransportConfig {
                enable_dctcp: self.enable_dctcp,
                resequence_buffer: self.resequence_buffer,
            },
            window: TimeWindow {
                start: self.start_time,
                launch_end: self.flow_launch_end_time,
                end: self.end_time,
            },
            ..ExperimentConfig::default()
        })
    }
}

fn run(args: &Args) -> Result<(), ExperimentError> {
    let config = args.to_config()?;

    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    let experiment = Experiment::build(config, &mut world)?;

    if let Some(path) = &args.plan_json {
        experiment.write_plan_json(path)?;
        info!(path = %path.display(), "📝 实验计划已写入");
    }
    if args.no_run {
        println!("flows={}", experiment.plan.flows.len());
        return Ok(());
    }

    let summary = experiment.execute(&mut sim, &mut world);

    let output = experiment.output_path(&args.output_dir);
    world.net.monitor.write_xml_file(&output)?;
    info!(path = %output.display(), "📝 流统计已写入");

    println!(
        "flows={} avg_fct={:.6} avg_throughput={:.6} fct_p99={:.6} tx_packets={} rx_packets={} lost_packets={}",
        summary.flows,
        summary.avg_fct,
        summary.avg_throughput,
        summary.fct_p99,
        summary.tx_packets,
        summary.rx_packets,
        summary.lost_packets,
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
