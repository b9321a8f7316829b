//! The global facility lives for the whole test binary, so everything runs in one test.

use chanlog::channel::names;
use chanlog::{Error, Facility, FacilityState, Level, MemorySink, Pattern};
use std::sync::Arc;

#[test]
fn macros_route_through_installed_facility() {
    // Nothing installed yet: macros are silent no-ops
    assert!(!chanlog::sys_log!(Level::Info, "too early {}", 1));
    assert!(!chanlog::global::sys_packet("too early".to_string()));

    let mem = Arc::new(MemorySink::with_pattern("mem", Pattern::parse("{channel}|{level}|{msg}")));
    let facility = Facility::builder()
        .flush_interval(None)
        .sink("mem", mem.clone())
        .channel(names::SYSLOG, Level::Info, &["mem"])
        .channel(names::SYSERR, Level::Info, &["mem"])
        .channel(names::PACKET, Level::Info, &["mem"])
        .channel(names::INSTANCE, Level::Info, &["mem"])
        .build()
        .unwrap();
    let guard = chanlog::install(facility).unwrap();

    let second = Facility::builder().build().unwrap();
    assert!(matches!(chanlog::install(second), Err(Error::AlreadyInstalled)));

    assert!(chanlog::sys_log!(Level::Warn, "{} players online", 12));
    assert!(!chanlog::sys_log!(Level::Debug, "filtered {}", 0));
    assert!(chanlog::sys_err!("bad opcode {:#x}", 0x2a));
    assert!(chanlog::sys_packet!("recv {} bytes", 64));
    assert!(chanlog::sys_instance!("instance {} closed", 7));
    let long = "q".repeat(10_000);
    assert!(chanlog::sys_packet!("{long}"));

    // Function forms for callers that already hold a String
    assert!(chanlog::global::sys_packet("direct packet".to_string()));
    assert!(chanlog::global::sys_err("direct error".to_string(), chanlog::source_location!()));
    assert!(chanlog::global::sys_instance("direct instance".to_string()));
    assert!(!chanlog::global::sys_log(Level::Trace, "direct filtered".to_string()));
    assert!(chanlog::global::sys_log(Level::Error, "direct log".to_string()));

    drop(guard);
    let facility = chanlog::global::facility().unwrap();
    assert_eq!(facility.state(), FacilityState::ShutDown);
    assert!(!chanlog::sys_log!(Level::Error, "too late"));
    assert!(!chanlog::global::sys_instance("too late".to_string()));

    let lines = mem.lines();
    assert_eq!(
        &lines[..4],
        &[
            "syslog|warn|12 players online",
            "syserr|error|bad opcode 0x2a",
            "packet|info|recv 64 bytes",
            "instance|info|instance 7 closed",
        ]
    );
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[4].len(), "packet|info|".len() + chanlog::FORMAT_CAPACITY);
    assert_eq!(
        &lines[5..],
        &[
            "packet|info|direct packet",
            "syserr|error|direct error",
            "instance|info|direct instance",
            "syslog|error|direct log",
        ]
    );
}
