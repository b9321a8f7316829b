//! Call-site macros for the process-wide facility.
//!
//! Every macro formats with [`format_bounded`](crate::fmt::format_bounded), so
//! a message never exceeds [`FORMAT_CAPACITY`](crate::fmt::FORMAT_CAPACITY)
//! bytes. Arguments are only formatted when the target channel accepts the
//! level. Before the global facility is installed, or after it shuts down,
//! they do nothing and return `false`.

/// `format!` with the 4 KiB cap and the per-thread scratch buffer.
#[macro_export]
macro_rules! format_bounded {
    ($($arg:tt)+) => {
        $crate::fmt::format_bounded(::std::format_args!($($arg)+))
    };
}

/// The current file, line and module as a [`SourceLocation`](crate::SourceLocation).
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation::new(::std::file!(), ::std::line!(), ::std::module_path!())
    };
}

/// Logs to the error channel with the caller's location.
///
/// ```no_run
/// chanlog::sys_err!("failed to load {}: {}", "item_proto", 2);
/// ```
#[macro_export]
macro_rules! sys_err {
    ($($arg:tt)+) => {
        $crate::global::emit_with(
            ::std::option::Option::Some($crate::channel::names::SYSERR),
            $crate::Level::Error,
            ::std::option::Option::Some($crate::source_location!()),
            || $crate::format_bounded!($($arg)+),
        )
    };
}

/// Logs to the primary channel at the given [`Level`](crate::Level).
///
/// ```no_run
/// use chanlog::Level;
/// chanlog::sys_log!(Level::Info, "{} players online", 42);
/// ```
#[macro_export]
macro_rules! sys_log {
    ($level:expr, $($arg:tt)+) => {
        $crate::global::emit_with(
            ::std::option::Option::None,
            $level,
            ::std::option::Option::None,
            || $crate::format_bounded!($($arg)+),
        )
    };
}

/// Logs to the packet channel at info.
#[macro_export]
macro_rules! sys_packet {
    ($($arg:tt)+) => {
        $crate::global::emit_with(
            ::std::option::Option::Some($crate::channel::names::PACKET),
            $crate::Level::Info,
            ::std::option::Option::None,
            || $crate::format_bounded!($($arg)+),
        )
    };
}

/// Logs to the instance channel at info.
#[macro_export]
macro_rules! sys_instance {
    ($($arg:tt)+) => {
        $crate::global::emit_with(
            ::std::option::Option::Some($crate::channel::names::INSTANCE),
            $crate::Level::Info,
            ::std::option::Option::None,
            || $crate::format_bounded!($($arg)+),
        )
    };
}
