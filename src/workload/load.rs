//! 负载校准
//!
//! 超售比 R = 服务器侧总下行容量 / 汇聚层总上行容量；
//! `request_rate = load * C_se / R / (8 * FLOW_DIST_FACTOR)`。
//! FLOW_DIST_FACTOR 是固定常数，与实际配置的流大小无关：改了流大小，实际负载就会偏离 `load`。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::topo::fat_tree::validate_k;

/// 平均流大小校准常数（字节）
pub const FLOW_DIST_FACTOR: f64 = 12_658_200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadParameters {
    pub load: f64,
    pub oversubscription: f64,
    /// 每台服务器每秒发起的流数
    pub request_rate: f64,
}

pub fn oversubscription_ratio(k: usize, server_edge_bps: u64, agg_core_bps: u64) -> f64 {
    let half = (k / 2) as f64;
    let servers_per_edge = half;
    let aggregation_count = k as f64 * half;
    let down = servers_per_edge * half * k as f64 * server_edge_bps as f64;
    let up = agg_core_bps as f64 * half * aggregation_count;
    down / up
}

pub fn calibrate(
    load: f64,
    k: usize,
    server_edge_bps: u64,
    agg_core_bps: u64,
) -> Result<LoadParameters, ConfigError> {
    if !(load > 0.0 && load < 1.0) {
        return Err(ConfigError::LoadOutOfRange(load));
    }
    validate_k(k)?;
    if server_edge_bps == 0 || agg_core_bps == 0 {
        return Err(ConfigError::ZeroCapacity);
    }
    let oversubscription = oversubscription_ratio(k, server_edge_bps, agg_core_bps);
    let request_rate = load * server_edge_bps as f64 / oversubscription / (8.0 * FLOW_DIST_FACTOR);
    Ok(LoadParameters {
        load,
        oversubscription,
        request_rate,
    })
}
