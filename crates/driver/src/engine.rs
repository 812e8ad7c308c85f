use std::path::Path;

use crate::{EvalError, Reply, Request, Settings};

/// What the engine is asked to run: a written deck and the run settings.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub deck: &'a Path,
    pub settings: &'a Settings,
}

/// Answers evaluation requests during a run.
///
/// The driver hands the engine a callback that routes each request into the
/// model. Returning an error aborts the run.
pub trait Callback {
    /// Evaluates one request.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] if the request cannot be answered.
    fn evaluate(&mut self, request: &Request) -> Result<Reply, EvalError>;
}

/// An external study engine.
///
/// Implementations read the deck, issue evaluation requests through the
/// callback until the study completes, and write their own results.
pub trait Engine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs the study described by `invocation`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails or a callback evaluation fails.
    fn run(
        &mut self,
        invocation: &Invocation<'_>,
        callback: &mut dyn Callback,
    ) -> Result<(), Self::Error>;
}
