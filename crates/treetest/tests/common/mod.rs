//! Shared test fixture: a fresh root context writing into a buffer sink.

use treetest::{BufferSink, Context, Output};

pub fn fixture() -> (Context, BufferSink) {
    let mut t = Context::default();
    let sink = BufferSink::new();
    t.set_output(Output::Buffer(sink.clone()));
    (t, sink)
}
