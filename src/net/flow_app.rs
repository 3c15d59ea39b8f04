//! 流应用（发送端 + 接收端）
//!
//! 每个 FlowRequest 在 `start` 时刻由 `StartFlow` 事件启动：按 1400B 切分成包，
//! 逐包选路后一次性注入；链路的串行化自然形成排队与间隔，发送时间按串行化后的时刻记录。
//! 接收端不需要显式建模，包到达目的服务器即计入流统计。

use super::id::NodeId;
use super::net_world::NetWorld;
use crate::monitor::FlowKey;
use crate::sim::{Event, Simulator, World};
use tracing::{debug, warn};

/// 单个数据包的最大字节数
pub const PACKET_SIZE: u32 = 1400;

#[derive(Debug, Clone)]
pub struct StartFlow {
    pub flow_id: u64,
    pub src: NodeId,
    pub dst: NodeId,
    pub size_bytes: u64,
    pub key: FlowKey,
}

impl Event for StartFlow {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let flow = *self;
        let Some(w) = world.as_any_mut().downcast_mut::<NetWorld>() else {
            warn!(flow_id = flow.flow_id, "world 不是 NetWorld，忽略 StartFlow");
            return;
        };
        let now = sim.now();
        w.net.monitor.register(flow.flow_id, flow.key);

        let mut remaining = flow.size_bytes;
        let mut sent = 0_u64;
        while remaining > 0 {
            let size = remaining.min(PACKET_SIZE as u64) as u32;
            remaining -= size as u64;

            let route = match w.drb.as_mut() {
                Some(drb) => drb.route(&mut w.net, flow.src, flow.dst, flow.flow_id),
                None => w.net.route_ecmp_path(flow.src, flow.dst, flow.flow_id),
            };
            let Some(route) = route else {
                warn!(flow_id = flow.flow_id, src = ?flow.src, dst = ?flow.dst, "无可用路径，放弃该流");
                break;
            };

            let pkt = w.net.make_packet(flow.flow_id, size, route, now);
            w.net.inject(pkt, sim);
            sent += 1;
        }
        debug!(flow_id = flow.flow_id, packets = sent, now = ?now, "流已启动");
    }
}
