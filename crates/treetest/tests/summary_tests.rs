//! The summary line: formats, verbosity gating, and cancellation.

mod common;

use common::fixture;
use pretty_assertions::assert_eq;
use treetest::{Context, Verbosity};

fn pass_test(t: &mut Context) {
    treetest::assert!(t, true);
}

fn fail_test(t: &mut Context) {
    t.message_at(Verbosity::FAIL, None, 0, "My failure");
}

fn error_test(t: &mut Context) {
    t.message_at(Verbosity::ERROR, None, 0, "My error");
}

// ============================================================================
// Passing runs
// ============================================================================

fn pass_subsuite(t: &mut Context) {
    t.run("test1", pass_test);
    t.run("test2", pass_test);
}

fn pass_suite(t: &mut Context) {
    t.run("subsuite1", pass_subsuite);
    t.run("subsuite2", pass_subsuite);
}

#[test]
fn passing_summary_counts_leaves() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SUMMARY);
    t.run("suite", pass_suite);

    let failed = t.summary();

    assert_eq!(out.contents(), "Unit tests summary: 0 failed, 4 passed.\n");
    assert_eq!(failed, t.failed());
    assert_eq!(failed, 0);
}

#[test]
fn silent_summary_prints_nothing() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SILENT);
    t.run("suite", pass_suite);

    let failed = t.summary();

    assert_eq!(out.contents(), "");
    assert_eq!(failed, t.failed());
    assert_eq!(failed, 0);
}

#[test]
fn empty_toplevel_summary() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SUMMARY);

    let failed = t.summary();

    assert_eq!(out.contents(), "Unit tests summary: 0 failed, 0 passed.\n");
    assert_eq!(failed, 0);
}

// ============================================================================
// Failing runs
// ============================================================================

fn fail_subsuite(t: &mut Context) {
    t.run("test1", fail_test);
    t.run("test2", pass_test);
}

fn fail_suite(t: &mut Context) {
    t.run("subsuite1", fail_subsuite);
    t.run("subsuite2", fail_subsuite);
}

#[test]
fn failing_summary_counts_failures() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SUMMARY);
    t.run("suite", fail_suite);

    let failed = t.summary();

    assert_eq!(out.contents(), "Unit tests summary: 2 failed, 2 passed.\n");
    assert_eq!(failed, t.failed());
    assert_eq!(failed, 2);
}

#[test]
fn silent_failing_summary_prints_nothing() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SILENT);
    t.run("suite", fail_suite);

    let failed = t.summary();

    assert_eq!(out.contents(), "");
    assert_eq!(failed, 2);
}

#[test]
fn toplevel_failure_summary_reports_one_failure() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SUMMARY);
    t.message_at(Verbosity::FAIL, None, 0, "Failure");

    let failed = t.summary();

    assert_eq!(out.contents(), "Unit tests summary: 1 failed, 0 passed.\n");
    assert_eq!(failed, t.failed());
    assert_eq!(failed, 1);
}

// ============================================================================
// Canceled runs
// ============================================================================

fn error_subsuite(t: &mut Context) {
    t.run("test1", fail_test);
    t.run("test2", pass_test);
    t.run("test3", error_test);
}

fn error_suite(t: &mut Context) {
    t.run("subsuite1", error_subsuite);
    t.run("subsuite2", error_subsuite);
}

#[test]
fn canceled_summary_hides_counts() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SUMMARY);
    t.run("suite", error_suite);

    let failed = t.summary();

    assert_eq!(out.contents(), "Unit tests summary: canceled.\n");
    assert_eq!(failed, t.failed());
    assert_eq!(failed, 2);
}

#[test]
fn silent_canceled_summary_prints_nothing() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SILENT);
    t.run("suite", error_suite);

    let failed = t.summary();

    assert_eq!(out.contents(), "");
    assert_eq!(failed, 2);
}

#[test]
fn toplevel_error_summary_is_canceled() {
    let (mut t, out) = fixture();
    t.set_verbosity(Verbosity::SUMMARY);
    t.message_at(Verbosity::ERROR, None, 0, "ERROR");

    let failed = t.summary();

    assert_eq!(out.contents(), "Unit tests summary: canceled.\n");
    assert_eq!(failed, t.failed());
    assert_eq!(failed, 1);
}

// ============================================================================
// Custom root name
// ============================================================================

#[test]
fn summary_uses_the_root_name() {
    let mut t = Context::new("Math tests");
    let out = treetest::BufferSink::new();
    t.set_output(treetest::Output::Buffer(out.clone()));
    t.set_verbosity(Verbosity::SUMMARY);
    t.run("test", pass_test);

    t.summary();

    assert_eq!(out.contents(), "Math tests summary: 0 failed, 1 passed.\n");
}
