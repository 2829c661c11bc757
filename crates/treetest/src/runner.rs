//! The execution engine: `run`, the guarded-call protocol, and the
//! interrupt/assertion operations that unwind out of a running test.

use std::any::Any;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::process;
use std::rc::Rc;

use crate::context::{Context, Frame, DEFAULT_NAME};
use crate::report::{GREEN, RED, RESET};
use crate::Verbosity;

/// Unwind payload used to interrupt a running test. Each `run` guard
/// swallows exactly the payload aimed at its own child frame and re-raises
/// anything else, so an interruption resumes right after the guarded call
/// it escaped from.
struct Interrupt {
    tree: usize,
    id: u32,
}

#[derive(Clone, Copy)]
enum HookSlot {
    Start,
    End,
}

fn panic_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "unknown panic"
    }
}

impl Context {
    fn tree_token(&self) -> usize {
        Rc::as_ptr(&self.tree) as usize
    }

    /// Runs a guarded call for the current (innermost) frame: an
    /// interruption aimed at it is caught here, a foreign panic is reported
    /// as a failure, anything else keeps unwinding.
    fn guarded(&mut self, f: impl FnOnce(&mut Context)) {
        let tree = self.tree_token();
        let id = self.top().id;
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(&mut *self))) {
            match payload.downcast::<Interrupt>() {
                Ok(interrupt) if interrupt.tree == tree && interrupt.id == id => {}
                Ok(interrupt) => resume_unwind(interrupt),
                Err(payload) => {
                    let text = format!("panicked: {}", panic_text(payload.as_ref()));
                    self.message_at(Verbosity::FAIL, None, 0, &text);
                }
            }
        }
    }

    fn run_hook(&mut self, idx: usize, slot: HookSlot) {
        let taken = match slot {
            HookSlot::Start => self.frames[idx].at_start.take(),
            HookSlot::End => self.frames[idx].at_end.take(),
        };
        let Some(mut hook) = taken else { return };
        self.guarded(|t| hook(t));

        // Put the hook back unless it replaced itself while running.
        let slot = match slot {
            HookSlot::Start => &mut self.frames[idx].at_start,
            HookSlot::End => &mut self.frames[idx].at_end,
        };
        if slot.is_none() {
            *slot = Some(hook);
        }
    }

    /// Runs the test function in a new child context and returns its number
    /// of failed tests.
    ///
    /// The `at_start` and `at_end` hooks of the current context are called
    /// around the test function, and a failure anywhere in between unwinds
    /// back here. When the current context is already erroneous, the call is
    /// canceled: it returns 1 without running anything.
    ///
    /// A test run with `None` as name is *anonymous*: it behaves like a
    /// regular test except that it is transparent — messages display as if
    /// the parent printed them, it keeps the parent's depth, and it does not
    /// count towards the parent's number of children. Anonymous tests are
    /// useful to regroup suites split across files in an invisible one.
    ///
    /// ```rust,no_run
    /// use treetest::Context;
    ///
    /// fn one_test(t: &mut Context) {
    ///     treetest::assert!(t, 1 + 1 == 2);
    /// }
    ///
    /// fn main() {
    ///     let mut t = Context::new("my tests");
    ///     t.run("one_test", one_test);
    ///     t.run(None, |t| {
    ///         t.run("nested", one_test);
    ///     });
    ///     std::process::exit(t.summary() as i32);
    /// }
    /// ```
    pub fn run<'n>(
        &mut self,
        name: impl Into<Option<&'n str>>,
        test: impl FnOnce(&mut Context),
    ) -> usize {
        let name = name.into();

        // An erroneous ancestor cancels every following test.
        if self.top().error {
            return 1;
        }
        self.top_mut().is_suite = true;

        let parent_idx = self.frames.len() - 1;
        self.next_id += 1;
        let child = Frame::child(name, self.next_id, &self.frames[parent_idx]);
        self.frames.push(child);

        // The start hook runs first; if it fails the test function and the
        // end hook are skipped. An interruption without failure (a plain
        // `interrupt` in the hook) does not skip them.
        self.run_hook(parent_idx, HookSlot::Start);
        let start_failed = self.top().failed;
        if !start_failed {
            self.guarded(test);
        }
        if !start_failed {
            self.run_hook(parent_idx, HookSlot::End);
        }

        let child_idx = self.frames.len() - 1;
        let frame = &self.frames[child_idx];
        let verbosity = frame.settings.verbosity;
        let show = frame.name.is_some()
            && (frame.is_prefixed
                || (!frame.is_suite && verbosity.intersects(Verbosity::TESTS))
                || (frame.is_suite && verbosity.intersects(Verbosity::SUITES)));
        if show {
            self.prefix(child_idx);
            self.suffix(child_idx);
        }

        let child = self.frames.pop().expect("child frame");
        let failed_count = if child.nb_failed > 0 {
            child.nb_failed
        } else {
            usize::from(child.failed)
        };

        let parent = self.top_mut();
        if !child.is_suite && child.name.is_some() {
            parent.nb_children += 1;
            if child.failed {
                parent.nb_failed += 1;
            } else {
                parent.nb_passed += 1;
            }
        } else {
            // Suites and anonymous tests contribute their subtree counts.
            parent.nb_children += child.nb_children;
            parent.nb_passed += child.nb_passed;
            parent.nb_failed += child.nb_failed;
        }
        parent.failed |= child.failed;
        parent.error |= child.error;

        failed_count
    }

    // ---- Interruption --------------------------------------------------------

    /// Interrupts the current test without marking it as failed, resuming
    /// execution from the parent call to [`Context::run`]. On the top-level
    /// context the process exits instead, with the number of failed tests
    /// as status.
    ///
    /// If an `at_interrupt` hook is set, it is consumed and called first.
    pub fn interrupt(&mut self) -> ! {
        if let Some(mut hook) = self.top_mut().at_interrupt.take() {
            hook(self);
        }
        let id = self.top().id;
        if id > 0 {
            resume_unwind(Box::new(Interrupt {
                tree: self.tree_token(),
                id,
            }))
        } else {
            process::exit(self.failed() as i32)
        }
    }

    /// Prints a failure message and interrupts the current test.
    pub fn fail_at(&mut self, file: Option<&str>, line: u32, text: &str) -> ! {
        self.message_at(Verbosity::FAIL, file, line, text);
        self.interrupt()
    }

    /// Prints an error message, then interrupts the current test and cancels
    /// the rest of the test sequence.
    pub fn error_at(&mut self, file: Option<&str>, line: u32, text: &str) -> ! {
        self.message_at(Verbosity::ERROR, file, line, text);
        self.interrupt()
    }

    /// Fails and interrupts the current test if `condition` is false.
    pub fn assert_at(&mut self, condition: bool, file: Option<&str>, line: u32, text: &str) {
        if !condition {
            self.fail_at(file, line, text);
        }
    }

    /// Fails and cancels the test sequence if `condition` is false. Meant
    /// for invariant checks that make the rest of the run meaningless.
    pub fn check_at(&mut self, condition: bool, file: Option<&str>, line: u32, text: &str) {
        if !condition {
            self.error_at(file, line, text);
        }
    }

    // ---- Summary -------------------------------------------------------------

    /// Reports on the overall success of the test context, printing the
    /// total number of failed and passed tests if the verbosity allows it.
    /// Returns the number of failed tests, exactly as [`Context::failed`].
    pub fn summary(&mut self) -> usize {
        let failed = self.failed();
        let frame = self.top();
        if !frame.settings.verbosity.intersects(Verbosity::SUMMARY) {
            return failed;
        }

        let name = frame.name.as_deref().unwrap_or(DEFAULT_NAME);
        let text = if frame.error {
            format!("{name} summary: canceled.")
        } else {
            format!("{name} summary: {failed} failed, {} passed.", frame.nb_passed)
        };
        let text = if frame.has_color {
            let color = if frame.failed { RED } else { GREEN };
            format!("{color}{text}{RESET}")
        } else {
            text
        };
        self.message_at(Verbosity::SUMMARY, None, 0, &text);
        failed
    }
}
