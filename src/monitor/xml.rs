//! 流统计 XML 序列化
//!
//! 布局与常见的 FlowMonitor 输出一致：`FlowStats` 下每条流一个 `Flow` 元素，
//! `Ipv4FlowClassifier` 下给出五元组，时间统一写成 `+<ns>.0ns`。

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use super::FlowMonitor;
use crate::sim::SimTime;

fn time_attr(t: Option<SimTime>) -> SimTime {
    t.unwrap_or(SimTime::ZERO)
}

impl FlowMonitor {
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        // 写入 String 不会失败
        let _ = self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "<?xml version=\"1.0\" ?>")?;
        writeln!(out, "<FlowMonitor>")?;
        writeln!(out, "  <FlowStats>")?;
        for (flow_id, s) in &self.stats {
            writeln!(
                out,
                "    <Flow flowId=\"{}\" timeFirstTxPacket=\"{}\" timeFirstRxPacket=\"{}\" \
                 timeLastTxPacket=\"{}\" timeLastRxPacket=\"{}\" delaySum=\"{}\" \
                 jitterSum=\"{}\" lastDelay=\"{}\" txBytes=\"{}\" rxBytes=\"{}\" \
                 txPackets=\"{}\" rxPackets=\"{}\" lostPackets=\"{}\" timesForwarded=\"{}\">",
                flow_id,
                time_attr(s.time_first_tx),
                time_attr(s.time_first_rx),
                time_attr(s.time_last_tx),
                time_attr(s.time_last_rx),
                s.delay_sum,
                s.jitter_sum,
                s.last_delay,
                s.tx_bytes,
                s.rx_bytes,
                s.tx_packets,
                s.rx_packets,
                s.lost_packets,
                s.times_forwarded,
            )?;
            writeln!(out, "    </Flow>")?;
        }
        writeln!(out, "  </FlowStats>")?;
        writeln!(out, "  <Ipv4FlowClassifier>")?;
        for (flow_id, k) in &self.keys {
            writeln!(
                out,
                "    <Flow flowId=\"{}\" sourceAddress=\"{}\" destinationAddress=\"{}\" \
                 protocol=\"{}\" sourcePort=\"{}\" destinationPort=\"{}\" />",
                flow_id,
                k.source_address,
                k.destination_address,
                k.protocol,
                k.source_port,
                k.destination_port,
            )?;
        }
        writeln!(out, "  </Ipv4FlowClassifier>")?;
        writeln!(out, "  <FlowProbes>")?;
        writeln!(out, "  </FlowProbes>")?;
        writeln!(out, "</FlowMonitor>")
    }

    pub fn write_xml_file(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_xml())
    }
}
