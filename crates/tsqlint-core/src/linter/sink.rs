//! Destinations for reported violations.
//!
//! Reporting is synchronous: a rule calls [`ViolationSink::report`] as soon as
//! it has a corroborated finding and never reads anything back.

use crate::types::Violation;

pub trait ViolationSink {
    fn report(&mut self, violation: Violation);
}

impl ViolationSink for Vec<Violation> {
    fn report(&mut self, violation: Violation) {
        self.push(violation);
    }
}

impl<S: ViolationSink + ?Sized> ViolationSink for &mut S {
    fn report(&mut self, violation: Violation) {
        (**self).report(violation);
    }
}

/// Forwards each violation to a `(rule_id, message, line, column)` callback.
pub struct CallbackSink<F>
where
    F: FnMut(&str, &str, usize, usize),
{
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: FnMut(&str, &str, usize, usize),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ViolationSink for CallbackSink<F>
where
    F: FnMut(&str, &str, usize, usize),
{
    fn report(&mut self, violation: Violation) {
        (self.callback)(
            &violation.rule_id,
            &violation.message,
            violation.line,
            violation.column,
        );
    }
}

/// Discards everything; for hosts that only introspect rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ViolationSink for NullSink {
    fn report(&mut self, _violation: Violation) {}
}
