//! # treetest — a tree-structured unit testing library
//!
//! A test is a function taking `&mut Context` that makes assertions and is
//! run with [`Context::run`]. A suite is a test that runs other tests — but
//! it can also make assertions of its own. When an assertion fails,
//! execution resumes from the parent call to `run`, and the test and its
//! parent suites are reported as failed; siblings keep running. An *error*
//! additionally cancels every test scheduled after it.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use treetest::Context;
//!
//! fn simple_test(t: &mut Context) {
//!     treetest::assert!(t, 34 == 45);
//! }
//!
//! fn main() {
//!     let mut t = Context::default();
//!     t.parse_args(std::env::args());
//!     treetest::test!(t, simple_test);
//!     std::process::exit(t.summary() as i32);
//! }
//! ```
//!
//! The macros capture the caller's file and line, so the failure above
//! prints `[FAIL src/main.rs:4] '34 == 45' is not true.` followed by
//! `simple_test failed.` and a summary. The macros are meant to be invoked
//! path-qualified (`treetest::assert!`), which keeps them from shadowing
//! the std macros of the same name.
//!
//! ## Features
//!
//! - `googletest` — re-exports `googletest` matchers via
//!   `treetest::matchers`. Matcher failures panic, and a panic inside a
//!   running test is caught and reported as an ordinary failure.

mod args;
mod context;
mod report;
mod runner;

pub use context::{ColorMode, Context, Verbosity};
pub use report::{BufferSink, Output};

/// Re-export of the [`googletest`] crate. Available with the `googletest`
/// feature.
#[cfg(feature = "googletest")]
pub use googletest;

/// Composable matchers re-exported from [`googletest::prelude`].
#[cfg(feature = "googletest")]
pub mod matchers {
    pub use googletest::prelude::*;
}

// ============================================================================
// Messaging macros
// ============================================================================

/// Prints a message for the current test, with the caller's file and line.
/// Same as [`Context::message_at`] with a `format!` message.
#[macro_export]
macro_rules! message {
    ($t:expr, $kind:expr, $($arg:tt)+) => {
        $t.message_at(
            $kind,
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            &::std::format!($($arg)+),
        )
    };
}

/// Prints an information message for the current test.
#[macro_export]
macro_rules! info {
    ($t:expr, $($arg:tt)+) => {
        $crate::message!($t, $crate::Verbosity::INFO, $($arg)+)
    };
}

/// Prints a warning message for the current test.
#[macro_export]
macro_rules! warn {
    ($t:expr, $($arg:tt)+) => {
        $crate::message!($t, $crate::Verbosity::WARN, $($arg)+)
    };
}

// ============================================================================
// Interruption macros
// ============================================================================

/// Interrupts the current test and marks it as failed. Never returns.
#[macro_export]
macro_rules! fail {
    ($t:expr, $($arg:tt)+) => {
        $t.fail_at(
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            &::std::format!($($arg)+),
        )
    };
}

/// Interrupts the current test, marks it as failed, and cancels the rest of
/// the test sequence. Never returns.
#[macro_export]
macro_rules! error {
    ($t:expr, $($arg:tt)+) => {
        $t.error_at(
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            &::std::format!($($arg)+),
        )
    };
}

/// Fails and interrupts the current test if the condition is false.
///
/// ```rust,no_run
/// # fn demo(t: &mut treetest::Context) {
/// treetest::assert!(t, 1 + 1 == 2);
/// treetest::assert!(t, t.children() > 0, "expected at least one test");
/// # }
/// ```
#[macro_export]
macro_rules! assert {
    ($t:expr, $cond:expr) => {
        $t.assert_at(
            $cond,
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            ::core::concat!("'", ::core::stringify!($cond), "' is not true."),
        )
    };
    ($t:expr, $cond:expr, $($arg:tt)+) => {
        $t.assert_at(
            $cond,
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            &::std::format!($($arg)+),
        )
    };
}

/// Fails and interrupts the current test if the two values are different.
#[macro_export]
macro_rules! assert_eq {
    ($t:expr, $left:expr, $right:expr) => {
        $t.assert_at(
            $left == $right,
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            ::core::concat!(
                "'",
                ::core::stringify!($left),
                "' and '",
                ::core::stringify!($right),
                "' are not equal."
            ),
        )
    };
}

/// Fails and cancels the test sequence if the condition is false. Meant for
/// invariant checks that make the rest of the run meaningless.
#[macro_export]
macro_rules! check {
    ($t:expr, $cond:expr, $($arg:tt)+) => {
        $t.check_at(
            $cond,
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            &::std::format!($($arg)+),
        )
    };
}

// ============================================================================
// Run macros
// ============================================================================

/// Runs a test function in a new test context, named after the function.
#[macro_export]
macro_rules! test {
    ($t:expr, $func:path) => {
        $t.run(::core::stringify!($func), $func)
    };
}

/// Runs a suite of tests in a new test context, named after the function.
///
/// This is exactly the same as [`test!`]: suites are indistinguishable from
/// regular tests when run, the only difference being that suites also call
/// [`Context::run`].
#[macro_export]
macro_rules! suite {
    ($t:expr, $func:path) => {
        $t.run(::core::stringify!($func), $func)
    };
}

/// Runs a test or suite anonymously.
#[macro_export]
macro_rules! anon {
    ($t:expr, $func:path) => {
        $t.run(::core::option::Option::<&str>::None, $func)
    };
}
