//! 数据包类型
//!
//! 数据包在注入时就携带完整的节点序列（源路由），交换机按 `hop` 逐跳前进。

use super::id::NodeId;
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub flow_id: u64,
    pub size_bytes: u32,
    pub route: Vec<NodeId>,
    /// 当前所在节点在 route 中的索引
    pub hop: usize,
    /// 源端发出时间，用于时延统计
    pub sent_at: SimTime,
}

impl Packet {
    pub fn src(&self) -> NodeId {
        self.route[0]
    }

    pub fn dst(&self) -> NodeId {
        self.route[self.route.len() - 1]
    }

    pub fn at(&self) -> NodeId {
        self.route[self.hop]
    }

    pub fn next(&self) -> Option<NodeId> {
        self.route.get(self.hop + 1).copied()
    }

    pub fn advance(mut self) -> Self {
        self.hop += 1;
        self
    }

    /// 途经的交换机数
    pub fn times_forwarded(&self) -> u64 {
        self.route.len().saturating_sub(2) as u64
    }
}
