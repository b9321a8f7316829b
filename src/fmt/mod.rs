//! Text production: bounded message formatting at the call site and per-sink
//! record layout on the worker side.

mod bounded;
mod pattern;

pub use bounded::{
    BoundedBuf, FORMAT_CAPACITY, format_bounded, format_bounded_with, format_template,
};
pub use pattern::{DEFAULT_TIMESTAMP_FORMAT, Pattern, Placeholder, Segment};
