//! 仿真器
//!
//! 单线程事件驱动内核：维护当前时间与最小堆事件队列。

use super::event::{Event, ScheduledEvent, World};
use super::time::SimTime;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    executed: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 已执行的事件总数
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 调度事件在指定时间执行；早于当前时间的请求会被钳到 `now`。
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        trace!(now = ?self.now, at = ?at, seq, event_type = std::any::type_name::<E>(), "调度事件");
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    /// 运行直到事件队列为空或下一个事件晚于 `until`，返回本次执行的事件数。
    #[tracing::instrument(skip(self, world), fields(until = ?until))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) -> u64 {
        info!(queue_size = self.q.len(), "▶️  开始运行仿真");
        let mut count = 0_u64;
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            let Some(item) = self.q.pop() else {
                break;
            };
            self.now = item.at;
            item.ev.execute(self, world);
            world.on_tick(self);
            count += 1;
        }
        self.now = self.now.max(until);
        self.executed += count;
        debug!(remaining = self.q.len(), "丢弃晚于停止时间的事件");
        info!(events = count, final_time = ?self.now, "✅ 仿真停止");
        count
    }

    /// 运行所有事件直到队列为空。
    pub fn run(&mut self, world: &mut dyn World) -> u64 {
        let mut count = 0_u64;
        while let Some(item) = self.q.pop() {
            self.now = item.at;
            item.ev.execute(self, world);
            world.on_tick(self);
            count += 1;
        }
        self.executed += count;
        debug!(events = count, final_time = ?self.now, "事件队列已清空");
        count
    }
}
