//! 节点类型
//!
//! 胖树中的四类节点：服务器与三层交换机。节点只负责“收到包后交付还是继续转发”，
//! 路由由数据包自身携带（源路由）。

use super::id::NodeId;
use super::network::Network;
use super::packet::Packet;
use crate::sim::Simulator;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// 节点所在层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTier {
    Server,
    Edge,
    Aggregation,
    Core,
}

/// 节点接口
pub trait Node: Send {
    fn id(&self) -> NodeId;

    fn name(&self) -> &str;

    fn tier(&self) -> NodeTier;

    /// 层内编号（例如第几个边缘交换机）
    fn tier_index(&self) -> usize;

    /// 所属 pod；核心交换机不属于任何 pod
    fn pod(&self) -> Option<usize>;

    fn on_packet(&mut self, pkt: Packet, sim: &mut Simulator, net: &mut Network);
}

/// 服务器节点
#[derive(Debug)]
pub struct Host {
    id: NodeId,
    name: String,
    index: usize,
    pod: usize,
}

impl Host {
    pub fn new(id: NodeId, name: impl Into<String>, index: usize, pod: usize) -> Self {
        Self {
            id,
            name: name.into(),
            index,
            pod,
        }
    }
}

impl Node for Host {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> NodeTier {
        NodeTier::Server
    }

    fn tier_index(&self) -> usize {
        self.index
    }

    fn pod(&self) -> Option<usize> {
        Some(self.pod)
    }

    fn on_packet(&mut self, pkt: Packet, sim: &mut Simulator, net: &mut Network) {
        if pkt.dst() == self.id {
            net.on_delivered(pkt, sim.now());
        } else {
            trace!(node = %self.name, pkt_id = pkt.id, "主机转发（非目的地）");
            net.forward_from(self.id, pkt, sim);
        }
    }
}

/// 交换机节点（边缘 / 汇聚 / 核心）
#[derive(Debug)]
pub struct Switch {
    id: NodeId,
    name: String,
    tier: NodeTier,
    index: usize,
    pod: Option<usize>,
}

impl Switch {
    pub fn new(
        id: NodeId,
        name: impl Into<String>,
        tier: NodeTier,
        index: usize,
        pod: Option<usize>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            tier,
            index,
            pod,
        }
    }
}

impl Node for Switch {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> NodeTier {
        self.tier
    }

    fn tier_index(&self) -> usize {
        self.index
    }

    fn pod(&self) -> Option<usize> {
        self.pod
    }

    fn on_packet(&mut self, pkt: Packet, sim: &mut Simulator, net: &mut Network) {
        trace!(node = %self.name, pkt_id = pkt.id, hop = pkt.hop, "交换机转发");
        net.forward_from(self.id, pkt, sim);
    }
}
