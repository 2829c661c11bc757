//! Command-line settings parsing.

mod common;

use common::fixture;
use pretty_assertions::assert_eq;
use treetest::Verbosity;

// ============================================================================
// Verbosity options
// ============================================================================

#[test]
fn verbose_option() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-v"]);

    assert_eq!(t.verbosity(), Verbosity::VERBOSE);
}

#[test]
fn minimal_option() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-m"]);

    assert_eq!(t.verbosity(), Verbosity::MINIMAL);
}

#[test]
fn silent_option() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-s"]);

    assert_eq!(t.verbosity(), Verbosity::SILENT);
}

// ============================================================================
// Color option
// ============================================================================

#[test]
fn color_on() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-c", "on"]);

    assert!(t.color());
}

#[test]
fn color_off() {
    let (mut t, _out) = fixture();
    t.set_color(treetest::ColorMode::On);

    t.parse_args(["my_tests", "-c", "off"]);

    assert!(!t.color());
}

#[test]
fn color_auto_is_off_for_buffers() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-c", "auto"]);

    assert!(!t.color());
}

#[test]
fn color_with_bad_argument() {
    let (mut t, out) = fixture();

    t.parse_args(["my_tests", "-c", "bad"]);

    assert_eq!(
        out.contents(),
        "[ERROR parse_args()] Invalid argument for option 'c': 'bad'.\n"
    );
    assert!(t.error());
    assert!(!t.color());
}

#[test]
fn color_with_missing_argument() {
    let (mut t, out) = fixture();

    t.parse_args(["my_tests", "-c"]);

    assert_eq!(
        out.contents(),
        "[ERROR parse_args()] Missing argument for option 'c'.\n"
    );
    assert!(t.error());
    assert!(!t.color());
}

// ============================================================================
// Output option
// ============================================================================

#[test]
fn output_file_replaces_the_sink() {
    let (mut t, out) = fixture();
    let path = std::env::temp_dir().join(format!("treetest-args-{}.log", std::process::id()));
    let path = path.to_string_lossy().into_owned();

    t.parse_args(["my_tests", "-o", &path]);
    t.message_at(Verbosity::INFO, None, 0, "redirected");

    assert!(!t.error());
    // The message went to the file, not to the previous sink.
    assert_eq!(out.contents(), "");
    let written = std::fs::read_to_string(&path).expect("output file");
    assert_eq!(written, "[INFO] redirected\n");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn output_file_that_cannot_be_opened() {
    let (mut t, out) = fixture();

    t.parse_args(["my_tests", "-o", "/"]);
    t.message_at(Verbosity::INFO, None, 0, "still here");

    assert!(t.error());
    // The sink is unchanged, so both messages land in the buffer.
    assert_eq!(
        out.contents(),
        "[ERROR parse_args()] Could not open file: '/'.\n[INFO] still here\n"
    );
}

#[test]
fn output_with_missing_argument() {
    let (mut t, out) = fixture();

    t.parse_args(["my_tests", "-o"]);

    assert_eq!(
        out.contents(),
        "[ERROR parse_args()] Missing argument for option 'o'.\n"
    );
    assert!(t.error());
}

// ============================================================================
// Help option
// ============================================================================

#[test]
fn help_interrupts_the_test() {
    let (mut t, _out) = fixture();
    struct Escape;
    t.at_interrupt(|_| std::panic::resume_unwind(Box::new(Escape)));

    let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        t.parse_args(["my_tests", "-h"]);
    }));

    assert!(unwound.is_err());
    assert!(!t.error());
    assert_eq!(t.failed(), 0);
}

// ============================================================================
// Miscellaneous
// ============================================================================

#[test]
fn unknown_option_stops_parsing() {
    let (mut t, out) = fixture();

    t.parse_args(["my_tests", "-u", "-v"]);

    assert_eq!(out.contents(), "[ERROR parse_args()] Invalid option: 'u'.\n");
    assert!(t.error());
    assert_eq!(t.verbosity(), Verbosity::NORMAL);
}

#[test]
fn option_argument_can_be_inline() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-con"]);

    assert!(!t.error());
    assert!(t.color());
}

#[test]
fn later_options_override_earlier_ones() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-v", "-c", "on", "-s"]);

    assert!(!t.error());
    assert_eq!(t.verbosity(), Verbosity::SILENT);
    assert!(t.color());
}

#[test]
fn grouped_options_with_inline_argument() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-svcon"]);

    assert!(!t.error());
    assert_eq!(t.verbosity(), Verbosity::VERBOSE);
    assert!(t.color());
}

#[test]
fn parsing_stops_at_delimiter() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-v", "--", "-s"]);

    assert!(!t.error());
    assert_eq!(t.verbosity(), Verbosity::VERBOSE);
}

#[test]
fn parsing_stops_at_first_non_option() {
    let (mut t, _out) = fixture();

    t.parse_args(["my_tests", "-s", "nonoption", "-v"]);

    assert!(!t.error());
    assert_eq!(t.verbosity(), Verbosity::SILENT);
}
