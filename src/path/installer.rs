//! 路径安装
//!
//! ECMP 模式不安装任何东西，依赖最短路径路由；RR / DRB 模式为每台服务器
//! 按序安装一次完整的路径列表。如何从列表中选路由路由子系统决定。

use crate::error::ConfigError;
use crate::experiment::RunMode;
use crate::net::NodeId;
use tracing::{debug, info};

use super::encoder::{PathEncoder, PathId};

/// 接收逐服务器路径表的路由子系统
pub trait PathRouter {
    fn add_path(&mut self, server: NodeId, path: PathId);
}

/// 为所有服务器安装路径，返回按服务器编号排列的已安装列表（ECMP 模式为空）。
///
/// 任何一台服务器枚举失败（LinkIndex 缺项）都会在安装之前返回错误，路由子系统保持不变。
pub fn install_paths(
    encoder: &PathEncoder<'_>,
    servers: &[NodeId],
    mode: RunMode,
    router: &mut dyn PathRouter,
) -> Result<Vec<Vec<PathId>>, ConfigError> {
    let Some(order) = mode.path_order() else {
        info!(mode = %mode, "最短路径模式，不安装逐服务器路径");
        return Ok(Vec::new());
    };

    let installed = (0..servers.len())
        .map(|index| {
            encoder
                .enumerate_paths(index, order)
                .ok_or(ConfigError::IncompletePathSet { server: index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (index, (&server, paths)) in servers.iter().zip(&installed).enumerate() {
        for &path in paths {
            router.add_path(server, path);
        }
        debug!(server = index, paths = ?paths, "安装路径表");
    }
    info!(
        mode = %mode,
        servers = installed.len(),
        base = encoder.base().0,
        "逐服务器路径表安装完成"
    );
    Ok(installed)
}
