mod common;

use chanlog::channel::names;
use chanlog::config::Config;
use chanlog::{Error, Facility, FacilityState, Level, MemorySink, Pattern};
use common::{BrokenSink, FlushCounter, FlushPanicSink, GateSink, PanickingSink, wait_for};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn memory_facility(mem: &Arc<MemorySink>, level: Level) -> Facility {
    Facility::builder()
        .flush_interval(None)
        .sink("mem", mem.clone())
        .channel(names::SYSLOG, level, &["mem"])
        .build()
        .unwrap()
}

#[test]
fn level_filter_drops_below_minimum() {
    let mem = Arc::new(MemorySink::new("mem"));
    let facility = memory_facility(&mem, Level::Info);
    facility.initialize().unwrap();

    assert!(facility.sys_log(Level::Info, "kept"));
    assert!(!facility.sys_log(Level::Debug, "dropped"));
    assert!(!facility.enabled(names::SYSLOG, Level::Trace));
    facility.teardown();

    assert_eq!(mem.lines(), vec!["kept"]);
}

#[test]
fn legacy_verbosity_goes_through_level_filter() {
    let mem = Arc::new(MemorySink::new("mem"));
    let facility = memory_facility(&mem, Level::Debug);
    facility.initialize().unwrap();

    facility.sys_log_legacy(0, "normal");
    facility.sys_log_legacy(1, "debug");
    facility.sys_log_legacy(2, "trace");
    facility.teardown();

    assert_eq!(mem.lines(), vec!["normal", "debug"]);
}

#[test]
fn per_thread_order_is_preserved() {
    let mem = Arc::new(MemorySink::new("mem"));
    let facility = Arc::new(memory_facility(&mem, Level::Info));
    facility.initialize().unwrap();

    let handles: Vec<_> = (0..2)
        .map(|t| {
            let facility = Arc::clone(&facility);
            thread::spawn(move || {
                for i in 0..1000 {
                    assert!(facility.sys_log(Level::Info, format!("{t}:{i}")));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    facility.teardown();

    let lines = mem.lines();
    assert_eq!(lines.len(), 2000);
    for t in 0..2 {
        let seq: Vec<u32> = lines
            .iter()
            .filter_map(|l| l.split_once(':'))
            .filter(|(thread, _)| *thread == t.to_string())
            .map(|(_, i)| i.parse().unwrap())
            .collect();
        assert_eq!(seq, (0..1000).collect::<Vec<_>>());
    }
}

#[test]
fn drop_drains_like_teardown() {
    let mem = Arc::new(MemorySink::new("mem"));
    {
        let facility = memory_facility(&mem, Level::Info);
        facility.initialize().unwrap();
        for i in 0..300 {
            facility.sys_log(Level::Warn, i.to_string());
        }
    }
    assert_eq!(mem.len(), 300);
}

#[test]
fn lifecycle_transitions_are_idempotent() {
    let mem = Arc::new(MemorySink::new("mem"));
    let facility = memory_facility(&mem, Level::Info);

    assert!(!facility.sys_log(Level::Error, "before"));
    assert!(facility.channel(names::SYSLOG).is_none());

    facility.initialize().unwrap();
    facility.initialize().unwrap();
    assert_eq!(facility.state(), FacilityState::Initialized);
    assert!(facility.sys_log(Level::Error, "during"));

    facility.teardown();
    facility.teardown();
    facility.initialize().unwrap();
    assert_eq!(facility.state(), FacilityState::ShutDown);
    assert!(!facility.sys_log(Level::Error, "after"));
    assert!(facility.stats().is_empty());
    assert!(!facility.flush());

    assert_eq!(mem.lines(), vec!["during"]);
}

#[test]
fn channels_tee_into_shared_combined_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let plain = || Pattern::parse("[{level}] {msg}");

    let facility = Facility::builder()
        .flush_interval(None)
        .file_sink("combined", dir.join("log.txt"), Pattern::parse("[{channel}] {msg}"), true)
        .file_sink("packet", dir.join("packets.txt"), plain(), true)
        .file_sink(
            "syserr",
            dir.join("syserr.txt"),
            Pattern::parse("[{level}] [{file}:{line} {func}] {msg}"),
            true,
        )
        .channel(names::PACKET, Level::Info, &["packet", "combined"])
        .channel(names::SYSERR, Level::Info, &["syserr", "combined"])
        .build()
        .unwrap();
    facility.initialize().unwrap();

    facility.sys_packet("HEADER 0x12");
    let location = chanlog::source_location!();
    facility.sys_err("checksum mismatch", location);
    facility.sys_packet("HEADER 0x13");
    facility.teardown();

    let combined = fs::read_to_string(dir.join("log.txt")).unwrap();
    assert_eq!(
        combined,
        "[packet] HEADER 0x12\n[syserr] checksum mismatch\n[packet] HEADER 0x13\n"
    );

    let packets = fs::read_to_string(dir.join("packets.txt")).unwrap();
    assert_eq!(packets, "[info] HEADER 0x12\n[info] HEADER 0x13\n");

    let syserr = fs::read_to_string(dir.join("syserr.txt")).unwrap();
    assert_eq!(
        syserr,
        format!(
            "[error] [{}:{} {}] checksum mismatch\n",
            location.file, location.line, location.function
        )
    );
}

#[test]
fn failing_sink_is_counted_and_others_still_write() {
    let mem = Arc::new(MemorySink::new("mem"));
    let facility = Facility::builder()
        .flush_interval(None)
        .sink("broken", Arc::new(BrokenSink))
        .sink("panicking", Arc::new(PanickingSink))
        .sink("mem", mem.clone())
        .channel(names::INSTANCE, Level::Info, &["broken", "panicking", "mem"])
        .build()
        .unwrap();
    facility.initialize().unwrap();

    for i in 0..10 {
        assert!(facility.sys_instance(format!("run {i}")));
    }
    let channel = facility.channel(names::INSTANCE).unwrap();
    facility.teardown();

    assert_eq!(mem.len(), 10);
    let stats = channel.stats();
    assert_eq!(stats.delivered, 10);
    assert_eq!(stats.failed_writes, 20);
}

#[test]
fn panicking_flush_loses_no_accepted_record() {
    let gate = Arc::new(GateSink::default());
    let flaky = Arc::new(FlushPanicSink::default());
    let facility = Arc::new(
        Facility::builder()
            .flush_interval(None)
            .sink("gate", gate.clone())
            .sink("flaky", flaky.clone())
            .channel(names::SYSLOG, Level::Info, &["gate"])
            .channel(names::PACKET, Level::Info, &["flaky"])
            .build()
            .unwrap(),
    );
    facility.initialize().unwrap();

    // Park the worker so the flush and the records behind it queue up
    assert!(facility.sys_log(Level::Info, "hold"));
    assert!(wait_for(|| gate.entered() == 1));
    for i in 0..2 {
        assert!(facility.sys_packet(format!("r{i}")));
    }
    let flusher = {
        let facility = Arc::clone(&facility);
        thread::spawn(move || facility.flush())
    };
    thread::sleep(Duration::from_millis(50));
    for i in 2..10 {
        assert!(facility.sys_packet(format!("r{i}")));
    }

    gate.open();
    assert!(flusher.join().unwrap());
    let channel = facility.channel(names::PACKET).unwrap();
    facility.teardown();

    let expected: Vec<String> = (0..10).map(|i| format!("r{i}")).collect();
    assert_eq!(flaky.lines(), expected);
    assert_eq!(gate.lines(), vec!["hold"]);
    // Only the final flush at teardown is charged to the channel
    assert_eq!(channel.stats().failed_writes, 1);
}

#[test]
fn periodic_flush_reaches_every_sink() {
    let counter = Arc::new(FlushCounter::default());
    let facility = Facility::builder()
        .flush_interval(Some(Duration::from_millis(10)))
        .sink("counter", counter.clone())
        .channel(names::PACKET, Level::Info, &["counter"])
        .build()
        .unwrap();
    facility.initialize().unwrap();

    assert!(wait_for(|| counter.flushes.load(Ordering::SeqCst) >= 3));
    facility.teardown();
}

#[test]
fn failed_initialize_leaves_facility_uninitialized() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();

    let facility = Facility::builder()
        .flush_interval(None)
        .file_sink("file", blocker.join("log.txt"), Pattern::default(), true)
        .channel(names::SYSLOG, Level::Info, &["file"])
        .build()
        .unwrap();

    assert!(matches!(facility.initialize(), Err(Error::Io(_))));
    assert_eq!(facility.state(), FacilityState::Uninitialized);
}

#[test]
fn default_layout_writes_every_file() {
    let tmp = TempDir::new().unwrap();
    let config = Config::parse(&format!(
        "[general]\nbase_dir = \"{}\"\nflush_interval_ms = 0\n",
        tmp.path().display()
    ))
    .unwrap();

    let facility = Facility::from_config_with(&config).unwrap();
    facility.initialize().unwrap();
    facility.sys_log(Level::Info, "world loaded");
    facility.sys_err("missing item 1042", chanlog::source_location!());
    facility.sys_packet("login");
    facility.sys_instance("dungeon opened");
    assert!(facility.flush());
    facility.teardown();

    let read = |name: &str| fs::read_to_string(tmp.path().join(name)).unwrap();

    let combined = read("log.txt");
    assert_eq!(combined.lines().count(), 5);
    assert!(combined.lines().next().unwrap().contains("] [info] [syslog] log facility started"));
    assert!(combined.contains("] [error] [syserr] missing item 1042\n"));
    assert!(combined.contains("] [info] [instance] dungeon opened\n"));

    let syslog = read("syslog.txt");
    assert_eq!(syslog.lines().count(), 2);
    assert!(syslog.ends_with("] [info] world loaded\n"));

    assert!(read("syserr.txt").contains("facility.rs:"));
    assert!(read("packets.txt").ends_with("] [info] login\n"));
    assert!(read("instance.txt").ends_with("] [info] dungeon opened\n"));
}
