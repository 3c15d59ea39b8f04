//! 流统计（flow monitor）
//!
//! 按 flow_id 累计收发字节 / 包数与首末时间，并记录五元组分类信息。
//! 结果可序列化为流统计 XML 文件，也可汇总为 FCT / 吞吐指标。

mod summary;
mod xml;

pub use summary::FlowSummary;

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::net::Packet;
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};

/// TCP 协议号
pub const PROTOCOL_TCP: u8 = 6;

/// 流的五元组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowKey {
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
    pub protocol: u8,
    pub source_port: u16,
    pub destination_port: u16,
}

/// 单条流的计数器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowStats {
    pub time_first_tx: Option<SimTime>,
    pub time_last_tx: Option<SimTime>,
    pub time_first_rx: Option<SimTime>,
    pub time_last_rx: Option<SimTime>,
    pub delay_sum: SimTime,
    /// 相邻两个到达包时延差的绝对值之和
    pub jitter_sum: SimTime,
    pub last_delay: SimTime,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub times_forwarded: u64,
}

impl FlowStats {
    /// 流完成时间：最后一个包到达 - 第一个包发出
    pub fn fct(&self) -> Option<SimTime> {
        let first_tx = self.time_first_tx?;
        let last_rx = self.time_last_rx?;
        Some(last_rx.saturating_sub(first_tx))
    }
}

#[derive(Debug, Default, Clone)]
pub struct FlowMonitor {
    stats: BTreeMap<u64, FlowStats>,
    keys: BTreeMap<u64, FlowKey>,
}

impl FlowMonitor {
    pub fn register(&mut self, flow_id: u64, key: FlowKey) {
        self.keys.insert(flow_id, key);
        self.stats.entry(flow_id).or_default();
    }

    pub(crate) fn record_tx(&mut self, pkt: &Packet, now: SimTime) {
        let s = self.stats.entry(pkt.flow_id).or_default();
        s.time_first_tx.get_or_insert(now);
        s.time_last_tx = Some(now);
        s.tx_bytes += pkt.size_bytes as u64;
        s.tx_packets += 1;
    }

    pub(crate) fn record_rx(&mut self, pkt: &Packet, now: SimTime) {
        let s = self.stats.entry(pkt.flow_id).or_default();
        let delay = now.saturating_sub(pkt.sent_at);
        if s.rx_packets > 0 {
            s.jitter_sum = s
                .jitter_sum
                .saturating_add(SimTime(delay.0.abs_diff(s.last_delay.0)));
        }
        s.time_first_rx.get_or_insert(now);
        s.time_last_rx = Some(now);
        s.delay_sum = s.delay_sum.saturating_add(delay);
        s.last_delay = delay;
        s.rx_bytes += pkt.size_bytes as u64;
        s.rx_packets += 1;
        s.times_forwarded += pkt.times_forwarded();
    }

    /// 仿真停止时调用：仍未到达的包计为丢失
    pub fn finalize(&mut self) {
        for s in self.stats.values_mut() {
            s.lost_packets = s.tx_packets.saturating_sub(s.rx_packets);
        }
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn get(&self, flow_id: u64) -> Option<&FlowStats> {
        self.stats.get(&flow_id)
    }

    pub fn key(&self, flow_id: u64) -> Option<&FlowKey> {
        self.keys.get(&flow_id)
    }

    pub fn flows(&self) -> impl Iterator<Item = (u64, &FlowStats)> {
        self.stats.iter().map(|(id, s)| (*id, s))
    }

    pub fn summary(&self) -> FlowSummary {
        FlowSummary::from_stats(self.stats.values())
    }
}
