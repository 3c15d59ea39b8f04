use crate::sim::{Event, SimTime, Simulator, World};
use std::any::Any;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct DummyWorld {
    ticks: usize,
}

impl World for DummyWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _sim: &mut Simulator) {
        self.ticks += 1;
    }
}

type Log = Arc<Mutex<Vec<(u32, SimTime)>>>;

struct Push {
    id: u32,
    log: Log,
}

impl Event for Push {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) {
        self.log.lock().expect("log lock").push((self.id, sim.now()));
    }
}

/// 执行时再调度一个过去时刻的事件
struct ScheduleInPast {
    log: Log,
}

impl Event for ScheduleInPast {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) {
        sim.schedule(SimTime(1), Push { id: 99, log: self.log });
    }
}

fn push(sim: &mut Simulator, at: u64, id: u32, log: &Log) {
    sim.schedule(
        SimTime(at),
        Push {
            id,
            log: Arc::clone(log),
        },
    );
}

fn ids(log: &Log) -> Vec<u32> {
    log.lock().expect("log lock").iter().map(|(id, _)| *id).collect()
}

#[test]
fn scheduled_events_order_by_time_then_seq() {
    let log = Log::default();
    let mut sim = Simulator::default();
    push(&mut sim, 10, 1, &log);
    push(&mut sim, 5, 2, &log);
    push(&mut sim, 10, 3, &log);

    let mut world = DummyWorld::default();
    assert_eq!(sim.run(&mut world), 3);

    assert_eq!(ids(&log), vec![2, 1, 3]);
    assert_eq!(world.ticks, 3);
    assert_eq!(sim.now(), SimTime(10));
    assert_eq!(sim.executed(), 3);
}

#[test]
fn run_until_stops_at_until_and_keeps_later_events() {
    let log = Log::default();
    let mut sim = Simulator::default();
    push(&mut sim, 0, 1, &log);
    push(&mut sim, 5, 2, &log);
    push(&mut sim, 10, 3, &log);

    let mut world = DummyWorld::default();
    assert_eq!(sim.run_until(SimTime(5), &mut world), 2);
    assert_eq!(ids(&log), vec![1, 2]);
    assert_eq!(sim.now(), SimTime(5));
    assert_eq!(sim.pending(), 1);

    sim.run(&mut world);
    assert_eq!(ids(&log), vec![1, 2, 3]);
    assert_eq!(sim.executed(), 3);
}

#[test]
fn run_until_advances_time_even_if_there_are_no_events() {
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();

    sim.run_until(SimTime(7), &mut world);
    assert_eq!(sim.now(), SimTime(7));
    assert_eq!(world.ticks, 0);
}

#[test]
fn scheduling_in_the_past_runs_at_current_time() {
    let log = Log::default();
    let mut sim = Simulator::default();
    sim.schedule(
        SimTime(20),
        ScheduleInPast {
            log: Arc::clone(&log),
        },
    );

    let mut world = DummyWorld::default();
    sim.run(&mut world);

    let entries = log.lock().expect("log lock").clone();
    assert_eq!(entries, vec![(99, SimTime(20))]);
}
