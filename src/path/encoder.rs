//! PathId 编码与路径枚举
//!
//! `PathId = 汇聚→核心接口 * BASE + 边缘→汇聚接口`。BASE 取严格大于全网最大接口编号的
//! 最小 10 的幂，保证不同路径不会编码到同一个值。

use serde::{Deserialize, Serialize};

use crate::net::IfIndex;
use crate::topo::fat_tree::FatTree;

/// 一条 边缘→汇聚→核心 上行路径的整数编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(pub u64);

impl PathId {
    pub fn encode(base: PathBase, core_if: IfIndex, edge_if: IfIndex) -> PathId {
        PathId(core_if.0 as u64 * base.0 + edge_if.0 as u64)
    }

    /// 解码为 (汇聚→核心接口, 边缘→汇聚接口)
    pub fn decode(self, base: PathBase) -> (IfIndex, IfIndex) {
        (
            IfIndex((self.0 / base.0) as u32),
            IfIndex((self.0 % base.0) as u32),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathBase(pub u64);

impl PathBase {
    /// 严格大于 `max` 的最小 10 的幂
    pub fn exceeding(max: IfIndex) -> PathBase {
        let mut base = 10_u64;
        while base <= max.0 as u64 {
            base *= 10;
        }
        PathBase(base)
    }
}

/// 同一组路径的两种排列方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOrder {
    /// 先用完一台汇聚交换机的所有核心上行，再换下一台
    RoundRobin,
    /// 对角交错：相邻两条路径经过不同的汇聚交换机
    Interleaved,
}

pub struct PathEncoder<'a> {
    topo: &'a FatTree,
    base: PathBase,
}

impl<'a> PathEncoder<'a> {
    pub fn new(topo: &'a FatTree) -> Self {
        Self {
            topo,
            base: PathBase::exceeding(topo.max_if_index),
        }
    }

    pub fn base(&self) -> PathBase {
        self.base
    }

    /// 边缘 `edge` 经汇聚 `agg` 到核心 `core` 的 PathId；链路不存在时为 None。
    pub fn path_id(&self, edge: usize, agg: usize, core: usize) -> Option<PathId> {
        let index = &self.topo.link_index;
        let edge_if = index.edge_to_agg(edge, agg)?;
        let core_if = index.agg_to_core(agg, core)?;
        Some(PathId::encode(self.base, core_if, edge_if))
    }

    /// 枚举服务器所在边缘交换机的全部 (k/2)^2 条上行路径，按 `order` 排列。
    pub fn enumerate_paths(&self, server: usize, order: PathOrder) -> Option<Vec<PathId>> {
        if server >= self.topo.server_count() {
            return None;
        }
        let half = self.topo.half();
        let edge = self.topo.edge_of_server(server);
        let first_agg = self.topo.pod_of_edge(edge) * half;

        let mut paths = Vec::with_capacity(half * half);
        for outer in 0..half {
            for inner in 0..half {
                let (m, n) = match order {
                    PathOrder::RoundRobin => (outer, inner),
                    PathOrder::Interleaved => (inner, outer),
                };
                paths.push(self.path_id(edge, first_agg + m, m * half + n)?);
            }
        }
        Some(paths)
    }
}
