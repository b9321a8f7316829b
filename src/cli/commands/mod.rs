//! One file per subcommand; each handler reports its own errors and picks the exit code.

mod channels;
mod check;
mod emit;
mod stats;

pub use channels::cmd_channels;
pub use check::cmd_check;
pub use emit::cmd_emit;
pub use stats::cmd_stats;
