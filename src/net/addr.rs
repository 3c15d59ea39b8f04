//! IPv4 地址分配
//!
//! 按 /24 子网顺序分配：`new_network()` 前进到下一个子网，`assign()` 依次分配 `.1`、`.2`……
//! 一个子网的 254 个主机地址用尽后自动前进到下一个子网。

use std::net::Ipv4Addr;

const HOSTS_PER_NETWORK: u32 = 254;

#[derive(Debug, Clone)]
pub struct Ipv4Allocator {
    network: u32,
    next_host: u32,
}

impl Ipv4Allocator {
    pub fn new(base: Ipv4Addr) -> Self {
        Self {
            network: u32::from(base) & 0xFFFF_FF00,
            next_host: 1,
        }
    }

    /// 当前子网的网络地址
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    pub fn new_network(&mut self) -> Ipv4Addr {
        self.network = self.network.wrapping_add(0x100);
        self.next_host = 1;
        self.network()
    }

    pub fn assign(&mut self) -> Ipv4Addr {
        if self.next_host > HOSTS_PER_NETWORK {
            self.new_network();
        }
        let addr = Ipv4Addr::from(self.network | self.next_host);
        self.next_host += 1;
        addr
    }
}

impl Default for Ipv4Allocator {
    fn default() -> Self {
        Self::new(Ipv4Addr::new(10, 1, 0, 0))
    }
}
