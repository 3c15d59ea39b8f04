//! Fat-tree 拓扑构建
//!
//! k 个 pod，每个 pod 有 k/2 台边缘交换机和 k/2 台汇聚交换机，每台边缘交换机下挂 k/2 台服务器，
//! 共 (k/2)^2 台核心交换机。汇聚交换机 i 连接核心交换机 `(i mod k/2)*(k/2) + j`，
//! 保证每个 pod 都能到达每一台核心交换机。
//!
//! 构建过程同时记录 LinkIndex：边缘→汇聚链路在边缘侧的接口编号，以及
//! 汇聚→核心链路在汇聚侧的接口编号，供路径编码使用。

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::ops::Range;

use crate::error::ConfigError;
use crate::net::{IfIndex, Ipv4Allocator, NetWorld, NodeId, NodeTier};
use crate::sim::SimTime;
use tracing::{debug, info};

/// 1 Gbps
pub const LINK_CAPACITY_BASE: u64 = 1_000_000_000;

#[derive(Debug, Clone)]
pub struct FatTreeOpts {
    pub k: usize,
    pub server_edge_bps: u64,
    pub edge_agg_bps: u64,
    pub agg_core_bps: u64,
    pub link_latency: SimTime,
}

impl Default for FatTreeOpts {
    fn default() -> Self {
        Self {
            k: 4,
            server_edge_bps: 10 * LINK_CAPACITY_BASE,
            edge_agg_bps: 10 * LINK_CAPACITY_BASE,
            agg_core_bps: 10 * LINK_CAPACITY_BASE,
            link_latency: SimTime::from_micros(10),
        }
    }
}

/// 校验 pod 数：必须为偶数且 >= 2
pub fn validate_k(k: usize) -> Result<(), ConfigError> {
    if k < 2 || k % 2 != 0 {
        return Err(ConfigError::InvalidPodCount(k));
    }
    Ok(())
}

/// 交换机间链路的本地接口编号，构建完成后只读。
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    edge_agg: BTreeMap<(usize, usize), IfIndex>,
    agg_core: BTreeMap<(usize, usize), IfIndex>,
}

impl LinkIndex {
    /// 边缘交换机 `edge` 上通往汇聚交换机 `agg` 的接口
    pub fn edge_to_agg(&self, edge: usize, agg: usize) -> Option<IfIndex> {
        self.edge_agg.get(&(edge, agg)).copied()
    }

    /// 汇聚交换机 `agg` 上通往核心交换机 `core` 的接口
    pub fn agg_to_core(&self, agg: usize, core: usize) -> Option<IfIndex> {
        self.agg_core.get(&(agg, core)).copied()
    }

    pub fn edge_agg_len(&self) -> usize {
        self.edge_agg.len()
    }

    pub fn agg_core_len(&self) -> usize {
        self.agg_core.len()
    }

    /// 记录中出现过的最大接口编号
    pub fn max_if_index(&self) -> IfIndex {
        self.edge_agg
            .values()
            .chain(self.agg_core.values())
            .copied()
            .max()
            .unwrap_or(IfIndex::LOOPBACK)
    }
}

/// 服务器按 pod 连续编号时的布局：pod 内服务器编号的唯一来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PodLayout {
    pub pods: usize,
    pub servers_per_pod: usize,
}

impl PodLayout {
    /// k 个 pod，每 pod (k/2)^2 台服务器
    pub fn for_k(k: usize) -> Self {
        Self {
            pods: k,
            servers_per_pod: (k / 2) * (k / 2),
        }
    }

    pub fn server_count(&self) -> usize {
        self.pods * self.servers_per_pod
    }

    pub fn pod_of(&self, server: usize) -> usize {
        server / self.servers_per_pod
    }

    /// pod 内服务器的编号区间
    pub fn servers_in_pod(&self, pod: usize) -> Range<usize> {
        pod * self.servers_per_pod..(pod + 1) * self.servers_per_pod
    }
}

#[derive(Debug, Clone)]
pub struct FatTree {
    pub k: usize,
    pub servers: Vec<NodeId>,
    pub edges: Vec<NodeId>,
    pub aggregations: Vec<NodeId>,
    pub cores: Vec<NodeId>,
    pub server_addrs: Vec<Ipv4Addr>,
    pub link_index: LinkIndex,
    /// 全网（含服务器侧）最大的接口编号
    pub max_if_index: IfIndex,
}

impl FatTree {
    pub fn half(&self) -> usize {
        self.k / 2
    }

    /// 每台边缘交换机下的服务器数
    pub fn servers_per_edge(&self) -> usize {
        self.half()
    }

    pub fn layout(&self) -> PodLayout {
        PodLayout::for_k(self.k)
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn edge_of_server(&self, server: usize) -> usize {
        server / self.servers_per_edge()
    }

    pub fn pod_of_edge(&self, edge: usize) -> usize {
        edge / self.half()
    }

    pub fn server(&self, index: usize) -> Option<NodeId> {
        self.servers.get(index).copied()
    }

    pub fn server_address(&self, index: usize) -> Option<Ipv4Addr> {
        self.server_addrs.get(index).copied()
    }
}

/// 在 world 中构建 fat-tree。k 非法时在创建任何节点之前返回错误。
#[tracing::instrument(skip(world, opts, addrs), fields(k = opts.k))]
pub fn build_fat_tree(
    world: &mut NetWorld,
    opts: &FatTreeOpts,
    addrs: &mut Ipv4Allocator,
) -> Result<FatTree, ConfigError> {
    let k = opts.k;
    validate_k(k)?;
    if opts.server_edge_bps == 0 || opts.edge_agg_bps == 0 || opts.agg_core_bps == 0 {
        return Err(ConfigError::ZeroCapacity);
    }

    let half = k / 2;
    let edge_count = k * half;
    let aggregation_count = k * half;
    let core_count = half * half;
    let server_count = half * edge_count;
    let latency = opts.link_latency;
    let net = &mut world.net;

    info!(
        servers = server_count,
        edges = edge_count,
        aggregations = aggregation_count,
        cores = core_count,
        "🏗️  创建 fat-tree 拓扑"
    );

    let layout = PodLayout::for_k(k);
    let servers: Vec<NodeId> = (0..server_count)
        .map(|i| net.add_host(format!("server-{i}"), i, layout.pod_of(i)))
        .collect();
    let edges: Vec<NodeId> = (0..edge_count)
        .map(|i| net.add_switch(format!("edge-{i}"), NodeTier::Edge, i, Some(i / half)))
        .collect();
    let aggregations: Vec<NodeId> = (0..aggregation_count)
        .map(|i| {
            net.add_switch(
                format!("aggregation-{i}"),
                NodeTier::Aggregation,
                i,
                Some(i / half),
            )
        })
        .collect();
    let cores: Vec<NodeId> = (0..core_count)
        .map(|i| net.add_switch(format!("core-{i}"), NodeTier::Core, i, None))
        .collect();

    // 服务器 <-> 边缘：每台边缘交换机一个新子网
    let mut server_addrs = vec![Ipv4Addr::UNSPECIFIED; server_count];
    for (i, &edge) in edges.iter().enumerate() {
        addrs.new_network();
        for j in 0..half {
            let s = i * half + j;
            let (edge_if, server_if) =
                net.connect(edge, servers[s], latency, opts.server_edge_bps);
            net.set_address(edge, edge_if, addrs.assign());
            let server_addr = addrs.assign();
            net.set_address(servers[s], server_if, server_addr);
            server_addrs[s] = server_addr;
            debug!(
                "Server-{s} 连接到 Edge-{i} ({}<->{})",
                server_if.0, edge_if.0
            );
        }
    }

    let mut link_index = LinkIndex::default();

    // 边缘 <-> 汇聚：同 pod 内全连接
    for (i, &edge) in edges.iter().enumerate() {
        for j in 0..half {
            let a = (i / half) * half + j;
            let (edge_if, agg_if) = net.connect(edge, aggregations[a], latency, opts.edge_agg_bps);
            net.set_address(edge, edge_if, addrs.assign());
            net.set_address(aggregations[a], agg_if, addrs.assign());
            link_index.edge_agg.insert((i, a), edge_if);
            debug!(
                "Edge-{i} 连接到 Aggregation-{a} ({}<->{})",
                edge_if.0, agg_if.0
            );
        }
    }

    // 汇聚 <-> 核心
    for (i, &agg) in aggregations.iter().enumerate() {
        for j in 0..half {
            let c = (i % half) * half + j;
            let (agg_if, core_if) = net.connect(agg, cores[c], latency, opts.agg_core_bps);
            net.set_address(agg, agg_if, addrs.assign());
            net.set_address(cores[c], core_if, addrs.assign());
            link_index.agg_core.insert((i, c), agg_if);
            debug!(
                "Aggregation-{i} 连接到 Core-{c} ({}<->{})",
                agg_if.0, core_if.0
            );
        }
    }

    let max_if_index = net.max_if_index();
    info!(
        links = net.link_count() / 2,
        max_if_index = max_if_index.0,
        "✅ fat-tree 拓扑构建完成"
    );

    Ok(FatTree {
        k,
        servers,
        edges,
        aggregations,
        cores,
        server_addrs,
        link_index,
        max_if_index,
    })
}
