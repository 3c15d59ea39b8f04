//! 泊松流量生成
//!
//! 每台服务器独立地用逆 CDF 采样指数分布的到达间隔，从 `start` 开始累加，
//! 到达时刻不早于 `launch_end` 时停止。每次到达：随机选端口，随机选一台不在本 pod 的目的服务器
//! （拒绝采样）。所有随机数都来自调用方传入的同一个生成器，固定种子即可复现。

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::topo::fat_tree::PodLayout;

pub const PORT_START: u16 = 10000;
pub const PORT_END: u16 = 50000;

/// 指数分布的到达间隔（秒）；`rate <= 0` 时为 0。
pub fn poisson_interval<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> f64 {
    if rate > 0.0 {
        let u: f64 = rng.random();
        -(1.0 - u).ln() / rate
    } else {
        0.0
    }
}

/// 流请求：调度到外部传输层，成对实例化发送端与接收端
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRequest {
    pub flow_id: u64,
    pub source: usize,
    pub destination: usize,
    /// 秒
    pub start_time: f64,
    /// 秒
    pub stop_time: f64,
    pub size_bytes: u64,
    pub port: u16,
}

/// 时间窗口（秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub launch_end: f64,
    pub end: f64,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start: 0.0,
            launch_end: 0.2,
            end: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrafficGenerator {
    pub request_rate: f64,
    pub flow_size: u64,
    pub window: TimeWindow,
}

impl TrafficGenerator {
    pub fn new(request_rate: f64, flow_size: u64, window: TimeWindow) -> Self {
        Self {
            request_rate,
            flow_size,
            window,
        }
    }

    /// 为单台服务器生成流请求。flow_id 从 `next_flow_id` 开始连续分配。
    pub fn generate_for_server<R: Rng + ?Sized>(
        &self,
        layout: PodLayout,
        source: usize,
        next_flow_id: &mut u64,
        rng: &mut R,
    ) -> Vec<FlowRequest> {
        let mut flows = Vec::new();
        // 速率非正时间隔恒为 0，不会越过窗口；只有一个 pod 时找不到跨 pod 目的地
        if self.request_rate.is_nan()
            || self.request_rate <= 0.0
            || layout.pods < 2
            || source >= layout.server_count()
        {
            return flows;
        }
        let own_pod = layout.servers_in_pod(layout.pod_of(source));
        let total = layout.server_count();

        let mut start_time = self.window.start + poisson_interval(rng, self.request_rate);
        while start_time < self.window.launch_end {
            let port = rng.random_range(PORT_START..=PORT_END);

            let mut destination = source;
            while own_pod.contains(&destination) {
                destination = rng.random_range(0..total);
            }

            flows.push(FlowRequest {
                flow_id: *next_flow_id,
                source,
                destination,
                start_time,
                stop_time: self.window.end,
                size_bytes: self.flow_size,
                port,
            });
            *next_flow_id += 1;

            start_time += poisson_interval(rng, self.request_rate);
        }
        flows
    }

    /// 按 pod、再按 pod 内服务器的顺序为全部服务器生成流请求。
    pub fn generate<R: Rng + ?Sized>(&self, layout: PodLayout, rng: &mut R) -> Vec<FlowRequest> {
        let mut next_flow_id = 1;
        let mut flows = Vec::new();
        for pod in 0..layout.pods {
            for server in layout.servers_in_pod(pod) {
                let batch = self.generate_for_server(layout, server, &mut next_flow_id, rng);
                debug!(server, flows = batch.len(), "生成服务器流请求");
                flows.extend(batch);
            }
        }
        info!(
            flows = flows.len(),
            request_rate = self.request_rate,
            flow_size = self.flow_size,
            "流量计划生成完成"
        );
        flows
    }
}
