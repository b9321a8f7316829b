#![no_main]
use chanlog::{Config, Facility};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Validation must reject bad layouts with an error, never a panic
    if let Ok(config) = Config::parse(data) {
        let _ = Facility::from_config_with(&config);
    }
});
