//! 网络模拟模块
//!
//! 节点、链路、接口与地址、数据包、最短路径 / DRB 路由，以及流应用事件。

mod addr;
mod deliver_packet;
mod drb;
mod flow_app;
mod id;
mod link;
mod net_world;
mod network;
mod node;
mod packet;
mod routing;
mod stats;

pub use addr::Ipv4Allocator;
pub use deliver_packet::DeliverPacket;
pub use drb::DrbRouting;
pub use flow_app::{PACKET_SIZE, StartFlow};
pub use id::{IfIndex, LinkId, NodeId};
pub use link::Link;
pub use net_world::NetWorld;
pub use network::Network;
pub use node::{Host, Node, NodeTier, Switch};
pub use packet::Packet;
pub use routing::RoutingTable;
pub use stats::Stats;
