//! 结果汇总：平均 FCT、平均吞吐、99 分位 FCT。
//!
//! 只统计 FCT 为正的流（尚未有包到达的流没有意义）。单包流的收发时长都为 0，
//! 但 FCT 为正，同样计入；只按收发速率过滤的离线脚本会把这类流全部跳过。

use super::FlowStats;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowSummary {
    pub flows: usize,
    /// 秒
    pub avg_fct: f64,
    /// Mbit/s（按 1024*1024 换算）
    pub avg_throughput: f64,
    /// 秒
    pub fct_p99: f64,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
}

impl FlowSummary {
    pub fn from_stats<'a>(stats: impl IntoIterator<Item = &'a FlowStats>) -> Self {
        let mut fcts = Vec::new();
        let mut summary = FlowSummary::default();
        let mut throughput_sum = 0.0;

        for s in stats {
            let Some(fct) = s.fct().map(|t| t.as_secs_f64()) else {
                continue;
            };
            if fct <= 0.0 {
                continue;
            }
            summary.tx_packets += s.tx_packets;
            summary.rx_packets += s.rx_packets;
            summary.lost_packets += s.lost_packets;
            throughput_sum += s.rx_bytes as f64 * 8.0 / fct / 1024.0 / 1024.0;
            fcts.push(fct);
        }

        if fcts.is_empty() {
            return summary;
        }
        summary.flows = fcts.len();
        summary.avg_fct = fcts.iter().sum::<f64>() / fcts.len() as f64;
        summary.avg_throughput = throughput_sum / fcts.len() as f64;
        fcts.sort_by(f64::total_cmp);
        let idx = ((fcts.len() as f64 * 0.99) as usize).min(fcts.len() - 1);
        summary.fct_p99 = fcts[idx];
        summary
    }
}
