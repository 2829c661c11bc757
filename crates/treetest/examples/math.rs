//! A typical treetest integration: nested suites, a setup hook, and
//! command-line settings. Try it with `-v` or `-c on`.

use std::f64::consts::FRAC_PI_2;

use treetest::Context;

// ============================================================================
// Trigonometry tests
// ============================================================================

fn sin_test(t: &mut Context) {
    treetest::assert_eq!(t, (0.0f64).sin(), 0.0);
    treetest::assert!(t, (FRAC_PI_2.sin() - 1.0).abs() < 1e-12);
}

fn asin_test(t: &mut Context) {
    treetest::assert_eq!(t, (0.0f64).asin(), 0.0);
    treetest::assert!(t, ((1.0f64).asin() - FRAC_PI_2).abs() < 1e-12);
}

fn trig_suite(t: &mut Context) {
    treetest::test!(t, sin_test);
    treetest::test!(t, asin_test);
}

// ============================================================================
// Parsing tests
// ============================================================================

fn integer_test(t: &mut Context) {
    let parsed: i64 = "-42".parse().unwrap_or(0);
    treetest::assert_eq!(t, parsed, -42);
}

fn float_test(t: &mut Context) {
    let parsed: f64 = "2.5".parse().unwrap_or(f64::NAN);
    treetest::assert_eq!(t, parsed, 2.5);
}

fn parse_suite(t: &mut Context) {
    t.at_start(|t| treetest::info!(t, "parsing..."));

    treetest::test!(t, integer_test);
    treetest::test!(t, float_test);
}

// ============================================================================
// Test context
// ============================================================================

fn main() {
    let mut t = Context::new("Math tests");
    t.parse_args(std::env::args());

    treetest::suite!(t, trig_suite);
    treetest::suite!(t, parse_suite);

    std::process::exit(t.summary() as i32);
}
