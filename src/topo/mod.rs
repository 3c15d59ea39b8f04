//! 拓扑构建

pub mod fat_tree;
