//! 最短路径路由（含 ECMP）
//!
//! 为每个目的节点在反向图上做一次 BFS，得到各节点到目的地的跳数；
//! 某节点的 ECMP 候选即所有满足 `dist[next] = dist[from] - 1` 的邻居。
//! 实验中只有服务器会作为目的地，因此按目的地惰性计算并缓存。

use std::collections::{HashMap, VecDeque};

use super::id::NodeId;

const UNREACHABLE: u32 = u32::MAX;

#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    /// dst -> 每个节点到 dst 的跳数
    dist: HashMap<NodeId, Vec<u32>>,
    /// 用于 ECMP hashing 的盐（保证稳定且可控）
    hash_salt: u64,
}

impl RoutingTable {
    pub fn new(hash_salt: u64) -> Self {
        Self {
            dist: HashMap::new(),
            hash_salt,
        }
    }

    /// 拓扑变化后清空缓存
    pub fn invalidate(&mut self) {
        self.dist.clear();
    }

    fn distances(&mut self, dst: NodeId, rev_adj: &[Vec<NodeId>]) -> &[u32] {
        self.dist.entry(dst).or_insert_with(|| {
            let mut dist = vec![UNREACHABLE; rev_adj.len()];
            let mut q = VecDeque::new();
            if dst.0 < dist.len() {
                dist[dst.0] = 0;
                q.push_back(dst);
            }
            while let Some(v) = q.pop_front() {
                let dv = dist[v.0];
                for &pred in &rev_adj[v.0] {
                    if dist[pred.0] == UNREACHABLE {
                        dist[pred.0] = dv + 1;
                        q.push_back(pred);
                    }
                }
            }
            dist
        })
    }

    /// 获取 (from, dst) 的 ECMP 下一跳候选集合；不可达或 from == dst 时为空。
    pub fn next_hops(
        &mut self,
        from: NodeId,
        dst: NodeId,
        adj: &[Vec<NodeId>],
        rev_adj: &[Vec<NodeId>],
    ) -> Vec<NodeId> {
        let dist = self.distances(dst, rev_adj);
        let Some(&df) = dist.get(from.0) else {
            return Vec::new();
        };
        if df == 0 || df == UNREACHABLE {
            return Vec::new();
        }
        adj[from.0]
            .iter()
            .copied()
            .filter(|nh| dist[nh.0] == df - 1)
            .collect()
    }

    /// 基于 key（通常是 flow_id）的稳定 ECMP 选择。
    pub fn pick_ecmp(&self, from: NodeId, dst: NodeId, key: u64, cands: &[NodeId]) -> NodeId {
        debug_assert!(!cands.is_empty());
        let h = mix64(
            key ^ (from.0 as u64).wrapping_mul(0x9E3779B97F4A7C15)
                ^ (dst.0 as u64)
                ^ self.hash_salt,
        );
        cands[(h as usize) % cands.len()]
    }
}

/// splitmix64，替代 RandomState，保证每次运行 hash 稳定。
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
