//! 标识符类型
//!
//! 节点、链路与节点本地接口的标识符。

use serde::{Deserialize, Serialize};

/// 节点标识符（全局，按创建顺序分配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// 单向链路标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub usize);

/// 节点本地接口编号。0 号为回环接口，点到点链路从 1 开始按安装顺序编号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IfIndex(pub u32);

impl IfIndex {
    pub const LOOPBACK: IfIndex = IfIndex(0);
}
