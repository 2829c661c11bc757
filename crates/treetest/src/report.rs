//! Output sinks, message rendering, and the nested tree presentation.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

use crate::context::Context;
use crate::Verbosity;

pub(crate) const RED: &str = "\x1b[22;31m";
pub(crate) const GREEN: &str = "\x1b[22;32m";
pub(crate) const YELLOW: &str = "\x1b[22;33m";
pub(crate) const RESET: &str = "\x1b[0m";

// ============================================================================
// Output sinks
// ============================================================================

/// Where messages are printed. Cloning an `Output` yields a handle to the
/// same underlying sink.
#[derive(Clone)]
pub enum Output {
    /// The standard output. The default.
    Stdout,
    /// The standard error.
    Stderr,
    /// A file, shared between the contexts that inherited it.
    File(Rc<RefCell<File>>),
    /// An in-memory buffer, mainly useful to capture output in tests.
    Buffer(BufferSink),
}

impl Output {
    /// Wraps an open file into an output sink.
    pub fn file(file: File) -> Output {
        Output::File(Rc::new(RefCell::new(file)))
    }

    pub(crate) fn is_terminal(&self) -> bool {
        match self {
            Output::Stdout => io::stdout().is_terminal(),
            Output::Stderr => io::stderr().is_terminal(),
            Output::File(file) => file.borrow().is_terminal(),
            Output::Buffer(_) => false,
        }
    }

    // Write failures are deliberately ignored: reporting must never turn
    // into a test failure of its own.
    pub(crate) fn write_str(&self, text: &str) {
        let _ = match self {
            Output::Stdout => io::stdout().write_all(text.as_bytes()),
            Output::Stderr => io::stderr().write_all(text.as_bytes()),
            Output::File(file) => file.borrow_mut().write_all(text.as_bytes()),
            Output::Buffer(buffer) => buffer.bytes.borrow_mut().write_all(text.as_bytes()),
        };
    }
}

/// A shared in-memory output sink.
///
/// ```rust
/// use treetest::{BufferSink, Context, Output};
///
/// let sink = BufferSink::new();
/// let mut t = Context::new("demo");
/// t.set_output(Output::Buffer(sink.clone()));
/// treetest::info!(t, "hello");
/// assert!(sink.contents().contains("hello"));
/// ```
#[derive(Clone, Default)]
pub struct BufferSink {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl BufferSink {
    pub fn new() -> BufferSink {
        BufferSink::default()
    }

    /// Everything written to the sink so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.bytes.borrow_mut().clear();
    }
}

// ============================================================================
// Message rendering
// ============================================================================

fn label_for(kind: Verbosity) -> Option<&'static str> {
    // Combined kinds display as the most critical one.
    if kind.intersects(Verbosity::ERROR) {
        Some("ERROR")
    } else if kind.intersects(Verbosity::FAIL) {
        Some("FAIL")
    } else if kind.intersects(Verbosity::WARN) {
        Some("WARN")
    } else if kind.intersects(Verbosity::INFO) {
        Some("INFO")
    } else {
        None
    }
}

fn label_color(kind: Verbosity) -> Option<&'static str> {
    if kind.intersects(Verbosity::ERROR) || kind.intersects(Verbosity::FAIL) {
        Some(RED)
    } else if kind.intersects(Verbosity::WARN) {
        Some(YELLOW)
    } else {
        None
    }
}

impl Context {
    /// Prints a message for the current test, if the verbosity allows it.
    ///
    /// If `kind` is [`Verbosity::FAIL`], the test and its parents are marked
    /// as failed regardless of the verbosity setting, but not interrupted.
    /// If `kind` is [`Verbosity::ERROR`], the test and its parents are
    /// additionally marked as erroneous, which cancels following calls to
    /// [`Context::run`].
    ///
    /// If `file` is set, the file name — and the line number, when non-zero
    /// — appear in the message label.
    pub fn message_at(&mut self, kind: Verbosity, file: Option<&str>, line: u32, text: &str) {
        let idx = self.frames.len() - 1;

        // Flag updates happen whether or not the message is displayed.
        let frame = &mut self.frames[idx];
        if kind.intersects(Verbosity::ERROR) {
            frame.error = true;
            frame.failed = true;
        } else if kind.intersects(Verbosity::FAIL) {
            frame.failed = true;
        }

        if text.is_empty() {
            return;
        }
        if !self.frames[idx].settings.verbosity.intersects(kind) {
            return;
        }

        self.prefix(idx);
        self.infix(idx, ":");

        let frame = &self.frames[idx];
        let mut buf = self.indentation(idx);
        if frame.depth > 0 {
            buf.push_str(&frame.settings.indent);
        }
        if let Some(label) = label_for(kind) {
            let tag = match file {
                Some(file) if line > 0 => format!("[{label} {file}:{line}]"),
                Some(file) => format!("[{label} {file}]"),
                None => format!("[{label}]"),
            };
            match label_color(kind) {
                Some(color) if frame.has_color => {
                    buf.push_str(color);
                    buf.push_str(&tag);
                    buf.push_str(RESET);
                }
                _ => buf.push_str(&tag),
            }
            buf.push(' ');
        }
        buf.push_str(text);
        buf.push('\n');
        frame.settings.output.write_str(&buf);
    }

    // ---- Tree presentation ---------------------------------------------------
    //
    // Each named frame prints its name at most once as a header (prefix), a
    // ":" separator before its first nested line (infix), and one closing
    // status line (suffix). Operations on anonymous frames apply to the
    // nearest named ancestor, which makes them invisible in the output.

    fn named_idx(&self, mut idx: usize) -> usize {
        while idx > 0 && self.frames[idx].name.is_none() {
            idx -= 1;
        }
        idx
    }

    fn indentation(&self, idx: usize) -> String {
        let frame = &self.frames[idx];
        let mut buf = String::new();
        if frame.settings.verbosity.intersects(Verbosity::SUITES) {
            for _ in 1..frame.depth {
                buf.push_str(&frame.settings.indent);
            }
        }
        buf
    }

    pub(crate) fn prefix(&mut self, idx: usize) {
        let idx = self.named_idx(idx);
        let frame = &self.frames[idx];
        if frame.is_prefixed || frame.depth == 0 {
            return;
        }

        // Nested headers only appear when suites are displayed; otherwise
        // the hierarchy is flattened down to the current test.
        if frame.settings.verbosity.intersects(Verbosity::SUITES) {
            self.prefix(idx - 1);
        }
        self.infix(idx - 1, ":");

        let frame = &self.frames[idx];
        let mut buf = self.indentation(idx);
        buf.push_str(frame.name.as_deref().unwrap_or_default());
        frame.settings.output.write_str(&buf);
        self.frames[idx].is_prefixed = true;
    }

    pub(crate) fn infix(&mut self, idx: usize, separator: &str) {
        let idx = self.named_idx(idx);
        let frame = &self.frames[idx];
        if frame.is_infixed || !frame.is_prefixed || frame.depth == 0 {
            return;
        }
        frame.settings.output.write_str(&format!("{separator}\n"));
        self.frames[idx].is_infixed = true;
    }

    pub(crate) fn suffix(&mut self, idx: usize) {
        let frame = &self.frames[idx];
        if frame.depth == 0 || frame.name.is_none() {
            return;
        }

        let mut buf = String::new();
        if frame.is_infixed {
            // Messages were printed since the header: repeat the name so
            // the status is readable.
            buf = self.indentation(idx);
            buf.push_str(self.frames[idx].name.as_deref().unwrap_or_default());
        }

        let frame = &self.frames[idx];
        let status = if frame.error {
            "canceled"
        } else if frame.failed {
            "failed"
        } else {
            "passed"
        };
        buf.push_str(&format!(" {status}.\n"));
        frame.settings.output.write_str(&buf);
    }
}
