//! 网络层聚合计数

#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    /// 找不到出链路而被丢弃的包
    pub dropped_pkts: u64,
}
