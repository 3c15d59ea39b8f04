//! DRB（逐包轮转）路由
//!
//! 每台服务器持有一张按安装顺序排列的 PathId 表，每发一个包取下一条路径。
//! PathId 解码为 (汇聚→核心 接口, 边缘→汇聚 接口)，上行沿这些接口走到核心，
//! 下行按最短路径到达目的服务器。RR 与 DRB 的区别只在于安装进来的顺序。

use std::collections::HashMap;

use super::id::{IfIndex, NodeId};
use super::network::Network;
use crate::path::{PathBase, PathId, PathRouter};
use tracing::trace;

/// 服务器只有一个链路接口，通往所属边缘交换机
const SERVER_UPLINK: IfIndex = IfIndex(1);

#[derive(Debug, Default, Clone)]
struct PathTable {
    paths: Vec<PathId>,
    cursor: usize,
}

#[derive(Debug, Clone)]
pub struct DrbRouting {
    base: PathBase,
    tables: HashMap<NodeId, PathTable>,
}

impl DrbRouting {
    pub fn new(base: PathBase) -> Self {
        Self {
            base,
            tables: HashMap::new(),
        }
    }

    pub fn base(&self) -> PathBase {
        self.base
    }

    /// 已安装到某服务器的路径（按安装顺序）
    pub fn paths(&self, server: NodeId) -> &[PathId] {
        self.tables
            .get(&server)
            .map_or(&[][..], |t| t.paths.as_slice())
    }

    /// 取下一条路径并推进游标
    pub fn next_path(&mut self, server: NodeId) -> Option<PathId> {
        let table = self.tables.get_mut(&server)?;
        if table.paths.is_empty() {
            return None;
        }
        let path = table.paths[table.cursor % table.paths.len()];
        table.cursor = (table.cursor + 1) % table.paths.len();
        Some(path)
    }

    /// 为一个数据包选择路径并解析成节点序列；没有安装路径时返回 None。
    pub fn route(
        &mut self,
        net: &mut Network,
        src: NodeId,
        dst: NodeId,
        key: u64,
    ) -> Option<Vec<NodeId>> {
        let path = self.next_path(src)?;
        let (core_if, edge_if) = path.decode(self.base);
        trace!(src = ?src, dst = ?dst, path = path.0, "DRB 选路");
        net.route_via_interfaces(src, &[SERVER_UPLINK, edge_if, core_if], dst, key)
    }
}

impl PathRouter for DrbRouting {
    fn add_path(&mut self, server: NodeId, path: PathId) {
        self.tables.entry(server).or_default().paths.push(path);
    }
}
