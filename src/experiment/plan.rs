use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use super::config::ExperimentConfig;
use crate::error::{ConfigError, ExperimentError};
use crate::monitor::{FlowKey, FlowSummary, PROTOCOL_TCP};
use crate::net::{DrbRouting, Ipv4Allocator, NetWorld, StartFlow};
use crate::path::{PathEncoder, PathId, install_paths};
use crate::sim::{SimTime, Simulator};
use crate::topo::fat_tree::{FatTree, build_fat_tree};
use crate::workload::{FlowRequest, LoadParameters, TrafficGenerator, calibrate};

/// 发送端临时端口的起点
const EPHEMERAL_PORT_START: u16 = 49153;

#[derive(Debug, Clone, Serialize)]
pub struct TopologySummary {
    pub k: usize,
    pub servers: usize,
    pub edges: usize,
    pub aggregations: usize,
    pub cores: usize,
    pub max_if_index: u32,
    pub path_base: u64,
    pub server_addresses: Vec<Ipv4Addr>,
}

/// Build 阶段的完整产物：外部引擎据此即可复现整个实验
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentPlan {
    pub config: ExperimentConfig,
    pub seed: u64,
    pub load: LoadParameters,
    pub topology: TopologySummary,
    /// 按服务器编号排列的路径表；ECMP 模式为空
    pub paths: Vec<Vec<PathId>>,
    pub flows: Vec<FlowRequest>,
}

pub struct Experiment {
    pub plan: ExperimentPlan,
    pub topo: FatTree,
}

impl Experiment {
    /// Configure + Build：校验参数、构建拓扑、安装路径、校准负载并生成流量。
    #[tracing::instrument(skip_all, fields(k = config.k, mode = %config.run_mode))]
    pub fn build(config: ExperimentConfig, world: &mut NetWorld) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            id = config.id,
            load = config.load,
            flow_size = config.flow_size,
            dctcp = config.transport.enable_dctcp,
            resequence_buffer = config.transport.resequence_buffer,
            "参数校验通过"
        );

        let load = calibrate(
            config.load,
            config.k,
            config.server_edge_bps,
            config.agg_core_bps,
        )?;

        let mut addrs = Ipv4Allocator::default();
        let topo = build_fat_tree(world, &config.fat_tree_opts(), &mut addrs)?;

        let encoder = PathEncoder::new(&topo);
        let mut drb = DrbRouting::new(encoder.base());
        let paths = install_paths(&encoder, &topo.servers, config.run_mode, &mut drb)?;
        world.drb = config.run_mode.path_order().map(|_| drb);

        info!(
            oversubscription = load.oversubscription,
            request_rate = load.request_rate,
            "负载校准完成"
        );

        let seed = config.resolve_seed();
        info!(seed, "🎲 随机数生成器已设定种子");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let generator = TrafficGenerator::new(load.request_rate, config.flow_size, config.window);
        let flows = generator.generate(topo.layout(), &mut rng);

        let topology = TopologySummary {
            k: topo.k,
            servers: topo.servers.len(),
            edges: topo.edges.len(),
            aggregations: topo.aggregations.len(),
            cores: topo.cores.len(),
            max_if_index: topo.max_if_index.0,
            path_base: encoder.base().0,
            server_addresses: topo.server_addrs.clone(),
        };

        Ok(Self {
            plan: ExperimentPlan {
                config,
                seed,
                load,
                topology,
                paths,
                flows,
            },
            topo,
        })
    }

    /// Execute：按计划调度全部流，运行到结束时间，返回流统计汇总。
    pub fn execute(&self, sim: &mut Simulator, world: &mut NetWorld) -> FlowSummary {
        let mut ephemeral: HashMap<usize, u16> = HashMap::new();
        let mut scheduled = 0_usize;

        for flow in &self.plan.flows {
            let (Some(src), Some(dst)) = (
                self.topo.server(flow.source),
                self.topo.server(flow.destination),
            ) else {
                warn!(flow_id = flow.flow_id, "流的端点不在拓扑中，跳过");
                continue;
            };
            let port = ephemeral.entry(flow.source).or_insert(EPHEMERAL_PORT_START);
            let source_port = *port;
            *port = port.checked_add(1).unwrap_or(EPHEMERAL_PORT_START);

            let key = FlowKey {
                source_address: self
                    .topo
                    .server_address(flow.source)
                    .unwrap_or(Ipv4Addr::UNSPECIFIED),
                destination_address: self
                    .topo
                    .server_address(flow.destination)
                    .unwrap_or(Ipv4Addr::UNSPECIFIED),
                protocol: PROTOCOL_TCP,
                source_port,
                destination_port: flow.port,
            };
            sim.schedule(
                SimTime::from_secs_f64(flow.start_time),
                StartFlow {
                    flow_id: flow.flow_id,
                    src,
                    dst,
                    size_bytes: flow.size_bytes,
                    key,
                },
            );
            scheduled += 1;
        }

        info!(flows = scheduled, "▶️  开始执行实验");
        let end = SimTime::from_secs_f64(self.plan.config.window.end);
        sim.run_until(end, world);
        world.net.monitor.finalize();
        let summary = world.net.monitor.summary();
        info!(
            flows = summary.flows,
            avg_fct = summary.avg_fct,
            delivered_pkts = world.net.stats.delivered_pkts,
            "✅ 实验结束"
        );
        summary
    }

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.plan.config.output_filename())
    }

    pub fn write_plan_json(&self, path: &Path) -> Result<(), ExperimentError> {
        let raw = serde_json::to_string_pretty(&self.plan)?;
        fs::write(path, raw)?;
        Ok(())
    }
}
