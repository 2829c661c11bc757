//! The test context tree — frames, settings, verbosity, and hooks.

use std::rc::Rc;

use crate::report::Output;

/// Name given to root contexts created without a meaningful one.
pub(crate) const DEFAULT_NAME: &str = "Unit tests";

// ============================================================================
// Verbosity
// ============================================================================

/// Bitmask of message kinds enabled for display.
///
/// Individual kinds can be combined with `|`, and removed from a level with
/// `^`. Messages whose kind does not intersect the current verbosity are
/// discarded, but FAIL and ERROR messages still mark the context as failed.
///
/// ```rust
/// use treetest::Verbosity;
///
/// let verb = Verbosity::VERBOSE ^ Verbosity::INFO;
/// assert!(verb.intersects(Verbosity::FAIL));
/// assert!(!verb.intersects(Verbosity::INFO));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Verbosity(u32);

impl Verbosity {
    /// Programmer errors. A message of this kind marks the context and its
    /// parents as both erroneous and failed, and cancels the rest of the
    /// test sequence.
    pub const ERROR: Verbosity = Verbosity(1);

    /// Failed tests. A message of this kind marks the context and its
    /// parents as failed.
    pub const FAIL: Verbosity = Verbosity(1 << 1);

    /// User defined warnings.
    pub const WARN: Verbosity = Verbosity(1 << 2);

    /// User defined information.
    pub const INFO: Verbosity = Verbosity(1 << 3);

    /// Test summaries. Used by [`Context::summary`], but can be passed to
    /// [`Context::message_at`] for custom summaries that respect the
    /// verbosity setting.
    pub const SUMMARY: Verbosity = Verbosity(1 << 4);

    /// Successful tests. Used internally to report passing leaf tests.
    pub const TESTS: Verbosity = Verbosity(1 << 5);

    /// Suites of tests. Used internally to display the hierarchy of tests
    /// in a nested fashion.
    pub const SUITES: Verbosity = Verbosity(1 << 6);

    /// Display nothing.
    pub const SILENT: Verbosity = Verbosity(0);

    /// Display errors, failures, warnings and summaries.
    pub const MINIMAL: Verbosity =
        Verbosity(Self::ERROR.0 | Self::FAIL.0 | Self::WARN.0 | Self::SUMMARY.0);

    /// Display everything but test successes. The default.
    pub const NORMAL: Verbosity = Verbosity(Self::MINIMAL.0 | Self::INFO.0 | Self::SUITES.0);

    /// Display everything.
    pub const VERBOSE: Verbosity = Verbosity(Self::NORMAL.0 | Self::TESTS.0);

    /// Whether any message kind is shared between `self` and `other`.
    pub fn intersects(self, other: Verbosity) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::NORMAL
    }
}

impl std::ops::BitOr for Verbosity {
    type Output = Verbosity;
    fn bitor(self, rhs: Verbosity) -> Verbosity {
        Verbosity(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for Verbosity {
    type Output = Verbosity;
    fn bitand(self, rhs: Verbosity) -> Verbosity {
        Verbosity(self.0 & rhs.0)
    }
}

impl std::ops::BitXor for Verbosity {
    type Output = Verbosity;
    fn bitxor(self, rhs: Verbosity) -> Verbosity {
        Verbosity(self.0 ^ rhs.0)
    }
}

// ============================================================================
// Color
// ============================================================================

/// Whether messages are colored with ANSI escape sequences.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ColorMode {
    /// Color only when the output sink is a terminal and `TERM` is set.
    #[default]
    Auto,
    /// Always color.
    On,
    /// Never color.
    Off,
}

// ============================================================================
// Settings
// ============================================================================

/// Inherited display settings. Children copy their parent's settings at
/// creation, so overrides never leak back up the tree.
#[derive(Clone)]
pub(crate) struct Settings {
    pub(crate) output: Output,
    pub(crate) verbosity: Verbosity,
    pub(crate) color: ColorMode,
    pub(crate) indent: Rc<str>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output: Output::Stdout,
            verbosity: Verbosity::NORMAL,
            color: ColorMode::Auto,
            indent: Rc::from("\t"),
        }
    }
}

impl Settings {
    pub(crate) fn resolve_color(&self) -> bool {
        match self.color {
            ColorMode::On => true,
            ColorMode::Off => false,
            ColorMode::Auto => self.output.is_terminal() && std::env::var_os("TERM").is_some(),
        }
    }
}

// ============================================================================
// Frames
// ============================================================================

pub(crate) type Hook = Box<dyn FnMut(&mut Context)>;

/// One node on the current test call path. The root frame lives as long as
/// the [`Context`]; every other frame lives exactly for the duration of the
/// [`Context::run`] call that created it.
pub(crate) struct Frame {
    pub(crate) name: Option<String>,
    pub(crate) id: u32,
    pub(crate) depth: usize,

    pub(crate) settings: Settings,
    pub(crate) has_color: bool,

    pub(crate) failed: bool,
    pub(crate) error: bool,
    pub(crate) is_suite: bool,

    pub(crate) is_prefixed: bool,
    pub(crate) is_infixed: bool,

    pub(crate) nb_children: usize,
    pub(crate) nb_passed: usize,
    pub(crate) nb_failed: usize,

    pub(crate) at_start: Option<Hook>,
    pub(crate) at_end: Option<Hook>,
    pub(crate) at_interrupt: Option<Hook>,
}

impl Frame {
    fn blank(name: Option<String>, id: u32, depth: usize, settings: Settings, has_color: bool) -> Frame {
        Frame {
            name,
            id,
            depth,
            settings,
            has_color,
            failed: false,
            error: false,
            is_suite: false,
            is_prefixed: false,
            is_infixed: false,
            nb_children: 0,
            nb_passed: 0,
            nb_failed: 0,
            at_start: None,
            at_end: None,
            at_interrupt: None,
        }
    }

    fn root(name: &str) -> Frame {
        let settings = Settings::default();
        let has_color = settings.resolve_color();
        Frame::blank(Some(name.to_string()), 0, 0, settings, has_color)
    }

    pub(crate) fn child(name: Option<&str>, id: u32, parent: &Frame) -> Frame {
        // Anonymous children stay at their parent's depth.
        let depth = parent.depth + usize::from(name.is_some());
        Frame::blank(
            name.map(str::to_string),
            id,
            depth,
            parent.settings.clone(),
            parent.has_color,
        )
    }
}

// ============================================================================
// Context
// ============================================================================

/// The test context needed by most functions of this library.
///
/// The hierarchy of tests and suites forms a tree whose nodes are suites and
/// whose leaves are actual tests. The root of the tree is created with
/// [`Context::new`]; child contexts are created internally by
/// [`Context::run`] and only exist for the duration of the test, with all
/// operations applying to the innermost one.
///
/// A `Context` is single-threaded: it must not be shared or mutated across
/// threads, and the types inside it enforce that at compile time.
pub struct Context {
    pub(crate) frames: Vec<Frame>,
    pub(crate) next_id: u32,
    /// Identity of this tree, used to match interrupt payloads to the
    /// `run` guard they belong to.
    pub(crate) tree: Rc<()>,
}

impl Context {
    /// Creates a new top-level test context.
    pub fn new(name: &str) -> Context {
        Context {
            frames: vec![Frame::root(name)],
            next_id: 0,
            tree: Rc::new(()),
        }
    }

    pub(crate) fn top(&self) -> &Frame {
        self.frames.last().expect("context has no frames")
    }

    pub(crate) fn top_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("context has no frames")
    }

    // ---- Identity ------------------------------------------------------------

    /// The name of the current test context, or `None` inside an anonymous
    /// test.
    pub fn name(&self) -> Option<&str> {
        self.top().name.as_deref()
    }

    /// The unique identifier of the current test context. The top-level
    /// context has id 0; every call to [`Context::run`] (anonymous ones
    /// included) takes the next id.
    pub fn id(&self) -> u32 {
        self.top().id
    }

    /// The nesting depth of the current test context. The top-level context
    /// has depth 0; anonymous tests keep their parent's depth.
    pub fn depth(&self) -> usize {
        self.top().depth
    }

    // ---- Settings ------------------------------------------------------------

    /// Sets the output sink used when printing messages.
    ///
    /// Children tests inherit this setting.
    pub fn set_output(&mut self, output: Output) {
        let frame = self.top_mut();
        frame.settings.output = output;
        if frame.settings.color == ColorMode::Auto {
            frame.has_color = frame.settings.resolve_color();
        }
    }

    /// Sets the verbosity filter for messages.
    ///
    /// Children tests inherit this setting.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.top_mut().settings.verbosity = verbosity;
    }

    /// The current verbosity filter.
    pub fn verbosity(&self) -> Verbosity {
        self.top().settings.verbosity
    }

    /// Sets whether to color messages with ANSI escape sequences.
    ///
    /// Children tests inherit this setting.
    pub fn set_color(&mut self, color: ColorMode) {
        let frame = self.top_mut();
        frame.settings.color = color;
        frame.has_color = frame.settings.resolve_color();
    }

    /// The *actual* color setting: with [`ColorMode::Auto`], whether color
    /// output ended up enabled or not.
    pub fn color(&self) -> bool {
        self.top().has_color
    }

    /// Sets the indentation string used to prefix nested messages.
    ///
    /// Children tests inherit this setting.
    pub fn set_indent(&mut self, indent: &str) {
        self.top_mut().settings.indent = Rc::from(indent);
    }

    /// The current indentation string.
    pub fn indent(&self) -> &str {
        &self.top().settings.indent
    }

    // ---- Hooks ---------------------------------------------------------------

    /// Sets the function called before each test. Inside the current
    /// context, every following [`Context::run`] calls `hook` before the
    /// test function, with the child context as argument.
    ///
    /// If the hook fails, the test function and the `at_end` hook are not
    /// executed and the test is marked as failed — so a failing hook must do
    /// its own cleaning up. The hook replaces any previously set one.
    pub fn at_start(&mut self, hook: impl FnMut(&mut Context) + 'static) {
        self.top_mut().at_start = Some(Box::new(hook));
    }

    /// Sets the function called after each test, whether it succeeded or
    /// not. The hook is not called when the `at_start` hook failed. It
    /// replaces any previously set one.
    pub fn at_end(&mut self, hook: impl FnMut(&mut Context) + 'static) {
        self.top_mut().at_end = Some(Box::new(hook));
    }

    /// Sets the function called before the current test gets interrupted.
    ///
    /// The hook is consumed by the next [`Context::interrupt`]: it is
    /// cleared before being called, so interrupting again from inside the
    /// hook does not recurse. A hook that needs to divert control may panic
    /// with a payload of its own for the caller to catch; if it returns,
    /// the interruption proceeds normally.
    pub fn at_interrupt(&mut self, hook: impl FnMut(&mut Context) + 'static) {
        self.top_mut().at_interrupt = Some(Box::new(hook));
    }

    // ---- Accounting ----------------------------------------------------------

    /// The number of children tests run inside the current context.
    /// Recursively counts tests, but not suites and anonymous tests.
    pub fn children(&self) -> usize {
        self.top().nb_children
    }

    /// The number of passed tests inside the current context.
    pub fn passed(&self) -> usize {
        self.top().nb_passed
    }

    /// The number of failed tests inside the current context.
    ///
    /// Inside a context that is marked as failed but has not run any
    /// children, this returns 1.
    pub fn failed(&self) -> usize {
        let frame = self.top();
        if frame.nb_failed > 0 {
            frame.nb_failed
        } else if frame.failed {
            1
        } else {
            0
        }
    }

    /// Whether the current context is marked as erroneous.
    pub fn error(&self) -> bool {
        self.top().error
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(DEFAULT_NAME)
    }
}
