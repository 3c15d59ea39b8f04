//! 实验驱动
//!
//! 三个阶段：Configure（参数校验）→ Build（拓扑、路径安装、负载校准、流量生成，
//! 产出可序列化的 ExperimentPlan）→ Execute（在仿真器中按计划运行并收集流统计）。

mod config;
mod plan;

pub use config::{ExperimentConfig, RunMode, TransportConfig, format_load, output_filename};
pub use plan::{Experiment, ExperimentPlan, TopologySummary};
