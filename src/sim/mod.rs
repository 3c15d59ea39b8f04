//! 仿真核心模块
//!
//! 事件驱动内核：时间、事件、世界与仿真器。拓扑、路径与流量都只是在这里调度的事件。

mod event;
mod simulator;
mod time;

pub use event::{Event, World};
pub use simulator::Simulator;
pub use time::SimTime;
