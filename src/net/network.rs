//! 网络拓扑管理
//!
//! 持有节点、单向链路、每个节点的接口表与地址，负责逐跳转发与送达统计。

use std::collections::HashMap;
use std::net::Ipv4Addr;

use super::deliver_packet::DeliverPacket;
use super::id::{IfIndex, LinkId, NodeId};
use super::link::Link;
use super::node::{Host, Node, NodeTier, Switch};
use super::packet::Packet;
use super::routing::RoutingTable;
use super::stats::Stats;
use crate::monitor::FlowMonitor;
use crate::sim::{SimTime, Simulator};
use tracing::{debug, trace, warn};

const ECMP_HASH_SALT: u64 = 0xC5A1_DA7A_5EED_1234;

/// 一个接口：出方向链路 + 分配到的地址
#[derive(Debug, Clone, Copy)]
struct Interface {
    link: LinkId,
    addr: Option<Ipv4Addr>,
}

pub struct Network {
    nodes: Vec<Option<Box<dyn Node>>>,
    links: Vec<Link>,
    /// interfaces[node][i] 对应接口编号 i + 1（0 号为回环）
    interfaces: Vec<Vec<Interface>>,
    edges: HashMap<(NodeId, NodeId), LinkId>,
    adj: Vec<Vec<NodeId>>,
    rev_adj: Vec<Vec<NodeId>>,
    routing: RoutingTable,
    next_pkt_id: u64,
    pub stats: Stats,
    pub monitor: FlowMonitor,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            interfaces: Vec::new(),
            edges: HashMap::new(),
            adj: Vec::new(),
            rev_adj: Vec::new(),
            routing: RoutingTable::new(ECMP_HASH_SALT),
            next_pkt_id: 0,
            stats: Stats::default(),
            monitor: FlowMonitor::default(),
        }
    }
}

impl Network {
    fn push_node(&mut self, node: Box<dyn Node>) -> NodeId {
        let id = node.id();
        self.nodes.push(Some(node));
        self.interfaces.push(Vec::new());
        self.adj.push(Vec::new());
        self.rev_adj.push(Vec::new());
        self.routing.invalidate();
        id
    }

    /// 添加服务器节点
    pub fn add_host(&mut self, name: impl Into<String>, index: usize, pod: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.push_node(Box::new(Host::new(id, name, index, pod)))
    }

    /// 添加交换机节点
    pub fn add_switch(
        &mut self,
        name: impl Into<String>,
        tier: NodeTier,
        index: usize,
        pod: Option<usize>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.push_node(Box::new(Switch::new(id, name, tier, index, pod)))
    }

    pub fn node(&self, id: NodeId) -> Option<&dyn Node> {
        self.nodes.get(id.0)?.as_deref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 单向链路数（每条双向链路计两条）
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// 用一条双向点到点链路连接 a 与 b，返回两端新分配的接口编号 (a 侧, b 侧)。
    pub fn connect(
        &mut self,
        a: NodeId,
        b: NodeId,
        latency: SimTime,
        bandwidth_bps: u64,
    ) -> (IfIndex, IfIndex) {
        let a_if = self.add_interface(a, b, latency, bandwidth_bps);
        let b_if = self.add_interface(b, a, latency, bandwidth_bps);
        (a_if, b_if)
    }

    fn add_interface(
        &mut self,
        from: NodeId,
        to: NodeId,
        latency: SimTime,
        bandwidth_bps: u64,
    ) -> IfIndex {
        let if_index = IfIndex(self.interfaces[from.0].len() as u32 + 1);
        let link = LinkId(self.links.len());
        self.links
            .push(Link::new(from, to, if_index, latency, bandwidth_bps));
        self.interfaces[from.0].push(Interface { link, addr: None });
        self.edges.insert((from, to), link);
        self.adj[from.0].push(to);
        self.rev_adj[to.0].push(from);
        self.routing.invalidate();
        if_index
    }

    fn interface(&self, node: NodeId, if_index: IfIndex) -> Option<&Interface> {
        let slot = (if_index.0 as usize).checked_sub(1)?;
        self.interfaces.get(node.0)?.get(slot)
    }

    /// 接口对端节点
    pub fn peer(&self, node: NodeId, if_index: IfIndex) -> Option<NodeId> {
        let iface = self.interface(node, if_index)?;
        Some(self.links[iface.link.0].to)
    }

    /// 节点上的链路接口数（不含回环）
    pub fn interface_count(&self, node: NodeId) -> usize {
        self.interfaces.get(node.0).map_or(0, Vec::len)
    }

    /// 全网最大的接口编号
    pub fn max_if_index(&self) -> IfIndex {
        let max = self.interfaces.iter().map(Vec::len).max().unwrap_or(0);
        IfIndex(max as u32)
    }

    pub fn set_address(&mut self, node: NodeId, if_index: IfIndex, addr: Ipv4Addr) -> bool {
        let Some(slot) = (if_index.0 as usize).checked_sub(1) else {
            return false;
        };
        match self.interfaces.get_mut(node.0).and_then(|ifs| ifs.get_mut(slot)) {
            Some(iface) => {
                iface.addr = Some(addr);
                true
            }
            None => false,
        }
    }

    pub fn address(&self, node: NodeId, if_index: IfIndex) -> Option<Ipv4Addr> {
        self.interface(node, if_index)?.addr
    }

    /// 创建数据包
    pub fn make_packet(
        &mut self,
        flow_id: u64,
        size_bytes: u32,
        route: Vec<NodeId>,
        sent_at: SimTime,
    ) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Packet {
            id,
            flow_id,
            size_bytes,
            route,
            hop: 0,
            sent_at,
        }
    }

    /// 按 flow 哈希逐跳选择 ECMP 下一跳，得到 src -> dst 的完整节点序列。
    pub fn route_ecmp_path(&mut self, src: NodeId, dst: NodeId, key: u64) -> Option<Vec<NodeId>> {
        let mut path = vec![src];
        self.extend_shortest(&mut path, dst, key)?;
        Some(path)
    }

    /// 先沿给定的出接口序列上行，再按最短路径下行到 dst。
    ///
    /// `uplinks[0]` 是 src 上的接口，`uplinks[i]` 是第 i 跳到达的节点上的接口。
    pub fn route_via_interfaces(
        &mut self,
        src: NodeId,
        uplinks: &[IfIndex],
        dst: NodeId,
        key: u64,
    ) -> Option<Vec<NodeId>> {
        let mut path = vec![src];
        let mut at = src;
        for &if_index in uplinks {
            if at == dst {
                break;
            }
            at = self.peer(at, if_index)?;
            path.push(at);
        }
        self.extend_shortest(&mut path, dst, key)?;
        Some(path)
    }

    fn extend_shortest(&mut self, path: &mut Vec<NodeId>, dst: NodeId, key: u64) -> Option<()> {
        let mut at = *path.last()?;
        // 最长路径不超过节点数，防止路由表异常导致死循环
        let limit = self.nodes.len();
        while at != dst {
            if path.len() > limit {
                return None;
            }
            let cands = self.routing.next_hops(at, dst, &self.adj, &self.rev_adj);
            if cands.is_empty() {
                return None;
            }
            at = self.routing.pick_ecmp(at, dst, key, &cands);
            path.push(at);
        }
        Some(())
    }

    /// 将数据包交付给节点处理
    pub fn deliver(&mut self, to: NodeId, pkt: Packet, sim: &mut Simulator) {
        // 暂时把节点取出来，避免 &mut self 与 &mut node 的重叠借用。
        let Some(mut node) = self.nodes.get_mut(to.0).and_then(Option::take) else {
            warn!(to = ?to, pkt_id = pkt.id, "目标节点不存在，丢弃数据包");
            self.stats.dropped_pkts += 1;
            return;
        };
        node.on_packet(pkt, sim, self);
        self.nodes[to.0] = Some(node);
    }

    /// 源端注入：以链路实际开始发送该包的时刻作为发送时间，记入流统计后发出。
    pub(crate) fn inject(&mut self, mut pkt: Packet, sim: &mut Simulator) {
        let src = pkt.src();
        let now = sim.now();
        let start = pkt
            .next()
            .and_then(|to| self.edges.get(&(src, to)))
            .map_or(now, |id| now.max(self.links[id.0].busy_until));
        pkt.sent_at = start;
        self.monitor.record_tx(&pkt, start);
        self.forward_from(src, pkt, sim);
    }

    /// 从指定节点沿 route 的下一跳发出数据包
    pub fn forward_from(&mut self, from: NodeId, pkt: Packet, sim: &mut Simulator) {
        let Some(to) = pkt.next() else {
            warn!(pkt_id = pkt.id, from = ?from, "数据包没有下一跳，丢弃");
            self.stats.dropped_pkts += 1;
            return;
        };
        let Some(&link_id) = self.edges.get(&(from, to)) else {
            warn!(pkt_id = pkt.id, from = ?from, to = ?to, "两节点间没有链路，丢弃");
            self.stats.dropped_pkts += 1;
            return;
        };
        let link = &mut self.links[link_id.0];

        let now = sim.now();
        let start = now.max(link.busy_until);
        let depart = start.saturating_add(link.tx_time(pkt.size_bytes));
        link.busy_until = depart;
        let arrive = depart.saturating_add(link.latency);
        trace!(
            pkt_id = pkt.id,
            from = ?from,
            to = ?to,
            queued_ns = start.0 - now.0,
            arrive = ?arrive,
            "链路发送"
        );

        sim.schedule(arrive, DeliverPacket { to, pkt: pkt.advance() });
    }

    /// 数据包送达目的地时的处理
    pub(crate) fn on_delivered(&mut self, pkt: Packet, now: SimTime) {
        self.stats.delivered_pkts += 1;
        self.stats.delivered_bytes += pkt.size_bytes as u64;
        debug!(pkt_id = pkt.id, flow_id = pkt.flow_id, now = ?now, "✅ 数据包送达目的地");
        self.monitor.record_rx(&pkt, now);
    }
}
