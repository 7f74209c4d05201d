//! A trivial tracing facility.

use bitmask_enum::bitmask;

#[bitmask]
pub enum Trace {
    Unify,
    Inline,
    Rewrite,
    Search,
}

/// Print a message to standard error if any of the
/// given flags are set in `$trace`.
#[macro_export]
macro_rules! trace {
    ($trace:expr, $level:ident, $fmt:literal $(,)? $($arg:expr),* $(,)?) => {
        if $trace.intersects($crate::Trace::$level) {
            eprintln!($fmt, $($arg),*);
        }
    }
}
