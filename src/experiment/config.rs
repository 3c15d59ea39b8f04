use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::path::PathOrder;
use crate::sim::SimTime;
use crate::topo::fat_tree::{FatTreeOpts, LINK_CAPACITY_BASE, validate_k};
use crate::workload::TimeWindow;

/// 多路径策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunMode {
    /// 等价最短路径（逐流哈希）
    Ecmp,
    /// 轮转路径表
    Rr,
    /// 对角交错路径表
    Drb,
}

impl RunMode {
    /// 需要安装的路径顺序；ECMP 不安装
    pub fn path_order(self) -> Option<PathOrder> {
        match self {
            RunMode::Ecmp => None,
            RunMode::Rr => Some(PathOrder::RoundRobin),
            RunMode::Drb => Some(PathOrder::Interleaved),
        }
    }

    /// 输出文件名中的模式标记
    pub fn file_token(self) -> &'static str {
        match self {
            RunMode::Ecmp => "ecmp-",
            RunMode::Rr => "rr-",
            RunMode::Drb => "drb-",
        }
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ECMP" => Ok(RunMode::Ecmp),
            "RR" => Ok(RunMode::Rr),
            "DRB" => Ok(RunMode::Drb),
            other => Err(ConfigError::UnknownRunMode(other.to_string())),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunMode::Ecmp => "ECMP",
            RunMode::Rr => "RR",
            RunMode::Drb => "DRB",
        };
        f.write_str(s)
    }
}

/// 传输层开关，由外部传输栈解释
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub enable_dctcp: bool,
    pub resequence_buffer: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            enable_dctcp: true,
            resequence_buffer: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// 运行编号，只用于输出文件名
    pub id: i64,
    pub k: usize,
    pub server_edge_bps: u64,
    pub edge_agg_bps: u64,
    pub agg_core_bps: u64,
    pub run_mode: RunMode,
    /// 0 表示由当前时间派生
    pub random_seed: u64,
    pub flow_size: u64,
    pub load: f64,
    pub transport: TransportConfig,
    pub window: TimeWindow,
    pub link_latency: SimTime,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            id: 0,
            k: 4,
            server_edge_bps: 10 * LINK_CAPACITY_BASE,
            edge_agg_bps: 10 * LINK_CAPACITY_BASE,
            agg_core_bps: 10 * LINK_CAPACITY_BASE,
            run_mode: RunMode::Ecmp,
            random_seed: 0,
            flow_size: 250,
            load: 0.1,
            transport: TransportConfig::default(),
            window: TimeWindow::default(),
            link_latency: SimTime::from_micros(10),
        }
    }
}

impl ExperimentConfig {
    /// 在构建任何拓扑之前完成全部校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_k(self.k)?;
        if !(self.load > 0.0 && self.load < 1.0) {
            return Err(ConfigError::LoadOutOfRange(self.load));
        }
        let w = self.window;
        if !(w.start >= 0.0 && w.start < w.launch_end && w.launch_end <= w.end) {
            return Err(ConfigError::InvalidTimeWindow {
                start: w.start,
                launch_end: w.launch_end,
                end: w.end,
            });
        }
        if self.flow_size == 0 {
            return Err(ConfigError::ZeroFlowSize);
        }
        if self.server_edge_bps == 0 || self.edge_agg_bps == 0 || self.agg_core_bps == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn fat_tree_opts(&self) -> FatTreeOpts {
        FatTreeOpts {
            k: self.k,
            server_edge_bps: self.server_edge_bps,
            edge_agg_bps: self.edge_agg_bps,
            agg_core_bps: self.agg_core_bps,
            link_latency: self.link_latency,
        }
    }

    /// 显式种子原样返回；0 时用当前时间的纳秒数
    pub fn resolve_seed(&self) -> u64 {
        if self.random_seed != 0 {
            return self.random_seed;
        }
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    }

    pub fn output_filename(&self) -> String {
        output_filename(self.id, self.run_mode, self.load, self.k, self.flow_size)
    }
}

/// `{id}-fattree-{k}-{load}-{mode}{flow_size}.xml`
pub fn output_filename(id: i64, mode: RunMode, load: f64, k: usize, flow_size: u64) -> String {
    format!(
        "{id}-fattree-{k}-{}-{}{flow_size}.xml",
        format_load(load),
        mode.file_token()
    )
}

/// 按 6 位有效数字输出浮点数并去掉多余的 0（与 `%g` 一致），例如 `0.2`、`0.123457`、`1e-05`。
pub fn format_load(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if !v.is_finite() {
        return v.to_string();
    }
    let sci = format!("{v:.5e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return v.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return v.to_string();
    };
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs());
    }
    let precision = (5 - exp) as usize;
    trim_zeros(&format!("{v:.precision$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
