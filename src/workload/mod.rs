//! 合成流量
//!
//! LoadCalibrator 把目标负载换算成每台服务器的泊松到达率；
//! TrafficGenerator 按该到达率为每台服务器生成跨 pod 的流请求。

mod load;
mod traffic;

pub use load::{FLOW_DIST_FACTOR, LoadParameters, calibrate, oversubscription_ratio};
pub use traffic::{
    FlowRequest, PORT_END, PORT_START, TimeWindow, TrafficGenerator, poisson_interval,
};
