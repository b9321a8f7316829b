#![no_main]
use chanlog::FORMAT_CAPACITY;
use chanlog::fmt::format_template;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (template, arg) = data;
    let out = format_template(template, &[&arg, &42, &arg]);
    assert!(out.len() <= FORMAT_CAPACITY);
});
