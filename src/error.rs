//! 错误类型
//!
//! 所有参数校验错误都归为 `ConfigError`，在构建任何拓扑之前报告。

use std::io;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for K: {0} (must be even and >= 2)")]
    InvalidPodCount(usize),
    #[error("the network load must be within 0.0 and 1.0 (exclusive), got {0}")]
    LoadOutOfRange(f64),
    #[error("run mode must be either ECMP, RR, or DRB, got {0:?}")]
    UnknownRunMode(String),
    #[error(
        "invalid time window: start={start}s, flow launch end={launch_end}s, end={end}s \
         (need 0 <= start < launch end <= end)"
    )]
    InvalidTimeWindow {
        start: f64,
        launch_end: f64,
        end: f64,
    },
    #[error("flow size must be positive")]
    ZeroFlowSize,
    #[error("link capacity must be positive")]
    ZeroCapacity,
    #[error("server {server} has links missing from the link index, cannot enumerate its paths")]
    IncompletePathSet { server: usize },
}

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize plan: {0}")]
    Json(#[from] serde_json::Error),
}
