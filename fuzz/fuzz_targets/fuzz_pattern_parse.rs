#![no_main]
use chanlog::{Level, LogRecord, Pattern, SourceLocation};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Must not panic on any pattern string
    let pattern = Pattern::parse(data);

    let record = LogRecord::new(
        Level::Warn,
        "syserr".into(),
        data.to_string(),
        Some(SourceLocation::new("src/fuzz.rs", 1, "fuzz")),
    );
    let _ = pattern.render(&record);
    // Arbitrary strftime input must not panic either
    let _ = Pattern::parse("{timestamp}").timestamp_format(data).render(&record);
});
