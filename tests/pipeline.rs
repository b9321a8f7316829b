mod common;

use chanlog::channel::names;
use chanlog::pipeline::WorkerPool;
use chanlog::{Facility, Level, MemorySink, PipelineState};
use common::{GateSink, wait_for};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn full_queue_blocks_producer_until_drained() {
    let gate = Arc::new(GateSink::default());
    let facility = Arc::new(
        Facility::builder()
            .queue_capacity(2)
            .flush_interval(None)
            .sink("gate", gate.clone())
            .channel(names::PACKET, Level::Info, &["gate"])
            .build()
            .unwrap(),
    );
    facility.initialize().unwrap();

    let sent = Arc::new(AtomicUsize::new(0));
    let producer = {
        let facility = Arc::clone(&facility);
        let sent = Arc::clone(&sent);
        thread::spawn(move || {
            for i in 0..4 {
                assert!(facility.sys_packet(format!("r{i}")));
                sent.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    // One record held by the worker, two queued, the fourth must wait
    assert!(wait_for(|| sent.load(Ordering::SeqCst) == 3 && gate.entered() == 1));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(sent.load(Ordering::SeqCst), 3);

    gate.open();
    producer.join().unwrap();
    facility.teardown();

    assert_eq!(gate.lines(), vec!["r0", "r1", "r2", "r3"]);
}

#[test]
fn records_queued_before_teardown_are_written() {
    let gate = Arc::new(GateSink::default());
    let facility = Facility::builder()
        .queue_capacity(1024)
        .flush_interval(None)
        .sink("gate", gate.clone())
        .channel(names::INSTANCE, Level::Info, &["gate"])
        .build()
        .unwrap();
    facility.initialize().unwrap();

    for i in 0..500 {
        assert!(facility.sys_instance(format!("dungeon {i}")));
    }
    let channel = facility.channel(names::INSTANCE).unwrap();
    assert!(wait_for(|| gate.entered() == 1));

    gate.open();
    facility.teardown();

    let lines = gate.lines();
    assert_eq!(lines.len(), 500);
    assert_eq!(lines[0], "dungeon 0");
    assert_eq!(lines[499], "dungeon 499");

    let stats = channel.stats();
    assert_eq!(stats.state, PipelineState::Stopped);
    assert_eq!(stats.submitted, 500);
    assert_eq!(stats.delivered, 500);
}

#[test]
fn several_workers_deliver_everything() {
    let mem = Arc::new(MemorySink::new("mem"));
    let facility = Facility::builder()
        .worker_threads(4)
        .flush_interval(None)
        .sink("mem", mem.clone())
        .channel(names::PACKET, Level::Info, &["mem"])
        .build()
        .unwrap();
    facility.initialize().unwrap();

    for i in 0..1000 {
        facility.sys_packet(i.to_string());
    }
    facility.teardown();

    let mut seen: Vec<u32> = mem.lines().iter().map(|l| l.parse().unwrap()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..1000).collect::<Vec<_>>());
}

#[test]
fn pool_reports_its_shape() {
    let pool = WorkerPool::start(32, 2).unwrap();
    assert_eq!(pool.capacity(), 32);
    assert_eq!(pool.worker_count(), 2);
    assert!(pool.is_open());

    pool.close();
    pool.close();
    assert!(!pool.is_open());
    assert_eq!(pool.worker_count(), 0);
}
