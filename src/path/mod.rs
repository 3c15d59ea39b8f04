//! 多路径编码与安装
//!
//! PathEncoder 把 边缘→汇聚→核心 的上行路径打包成一个整数 PathId；
//! RoutingInstaller 把每台服务器的有序 PathId 列表交给路由子系统。

mod encoder;
mod installer;

pub use encoder::{PathBase, PathEncoder, PathId, PathOrder};
pub use installer::{PathRouter, install_paths};
