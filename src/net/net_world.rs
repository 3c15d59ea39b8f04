//! 网络世界实现
//!
//! 持有网络拓扑，以及（RR / DRB 模式下）安装了逐服务器路径表的 DRB 路由。

use super::drb::DrbRouting;
use super::network::Network;
use crate::sim::World;
use std::any::Any;

#[derive(Default)]
pub struct NetWorld {
    pub net: Network,
    /// ECMP 模式下为 None，流量走最短路径哈希
    pub drb: Option<DrbRouting>,
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
