/*!
A transcriber for DRAT proofs.

Each clause the engine commits while in search mode --- a synthesised
binary, a windfall, or a unit --- is sound only in the context of the
hypotheses pushed so far.
So, the transcribed clause is the committed clause prefixed with the
negations of the current hypotheses, which is how the addition is justified
to a DRAT checker.

The transcriber writes the plain text format: one clause per line as
integer literals, terminated by `0`.
Steps are buffered as strings and pushed to the sink when
[flush](Transcriber::flush) is called, which the engine does at the end of
every public operation.

No deletion steps are emitted.
Binaries removed on backtracking were only ever sound under the popped
hypotheses, and leaving the additions in place keeps the proof a valid
over-approximation.
*/

use std::fmt::Write as _;

use crate::structures::literal::{CLiteral, Literal};

/// A buffering writer of DRAT proof steps.
pub struct Transcriber {
    /// Where the proof is sent on a flush.
    sink: Box<dyn std::io::Write>,

    /// Steps taken since the last flush.
    step_buffer: Vec<String>,
}

impl Transcriber {
    /// A transcriber which writes to `sink`.
    pub fn new(sink: Box<dyn std::io::Write>) -> Self {
        Transcriber {
            sink,
            step_buffer: Vec::default(),
        }
    }

    /// Record the addition of a clause, given as the hypothesis context and
    /// the committed literals.
    ///
    /// The hypotheses are already stored negated by the engine, and so are
    /// written as given.
    pub fn transcribe_addition(&mut self, context: &[CLiteral], committed: &[CLiteral]) {
        let mut step = String::new();
        for literal in context.iter().chain(committed) {
            let _ = write!(step, "{} ", literal.as_int());
        }
        step.push_str("0\n");

        self.step_buffer.push(step);
    }

    /// Record that the formula was found unsatisfiable by writing the empty
    /// clause.
    pub fn transcribe_unsatisfiable(&mut self) {
        self.step_buffer.push("0\n".to_string());
    }

    /// Flushes any buffered steps to the proof sink.
    pub fn flush(&mut self) {
        for step in &self.step_buffer {
            let _ = std::io::Write::write(&mut self.sink, step.as_bytes());
        }
        let _ = std::io::Write::flush(&mut self.sink);
        self.step_buffer.clear();
    }
}

#[cfg(test)]
mod drat_tests {
    use super::*;
    use crate::structures::literal::{CLiteral, Literal};

    use std::{cell::RefCell, rc::Rc};

    /// A sink sharing its contents with the test.
    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<u8>>>);

    impl std::io::Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn additions_are_contextualised() {
        let sink = SharedSink::default();
        let mut transcriber = Transcriber::new(Box::new(sink.clone()));

        let context = vec![CLiteral::new(0, false)];
        let committed = vec![CLiteral::new(1, true), CLiteral::new(2, true)];

        transcriber.transcribe_addition(&context, &committed);
        assert!(sink.0.borrow().is_empty());

        transcriber.flush();
        assert_eq!(String::from_utf8(sink.0.borrow().clone()).unwrap(), "-1 2 3 0\n");
    }
}
