//! 链路类型
//!
//! 单向点到点链路：容量、传播时延，以及用于 FIFO 串行化的 `busy_until`。

use super::id::{IfIndex, NodeId};
use crate::sim::SimTime;

#[derive(Debug)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    /// 发送端接口编号
    pub from_if: IfIndex,
    pub latency: SimTime,
    pub bandwidth_bps: u64,
    pub busy_until: SimTime,
}

impl Link {
    pub fn new(
        from: NodeId,
        to: NodeId,
        from_if: IfIndex,
        latency: SimTime,
        bandwidth_bps: u64,
    ) -> Self {
        Self {
            from,
            to,
            from_if,
            latency,
            bandwidth_bps,
            busy_until: SimTime::ZERO,
        }
    }

    /// 计算传输指定字节数所需的时间
    pub(crate) fn tx_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        if self.bandwidth_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bps = self.bandwidth_bps as u128;
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000) + (bps - 1)) / bps;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }
}
