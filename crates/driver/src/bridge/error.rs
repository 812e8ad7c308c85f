use std::fmt;

use thiserror::Error;

/// A derivative order the engine can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivative {
    Gradient,
    Hessian,
}

impl fmt::Display for Derivative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gradient => "gradient",
            Self::Hessian => "Hessian",
        })
    }
}

/// Errors that abort a single evaluation.
///
/// None of these are recovered from: a misrouted or truncated value would
/// silently corrupt the study.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("no variable with label `{0}`")]
    UnknownLabel(String),

    #[error("variable `{0}` is assigned more than once")]
    DuplicateLabel(String),

    #[error("{order} requested for `{response}`, which the model does not provide")]
    Unsupported { order: Derivative, response: String },

    #[error("#{field} ({actual}) != {expected}")]
    DimensionMismatch {
        field: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("derivative variable {index} is outside 1..={variables}")]
    DerivativeVariable { index: usize, variables: usize },

    #[error("model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EvalError {
    pub(crate) fn model(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Model(Box::new(error))
    }

    pub(crate) fn check(field: &'static str, actual: usize, expected: usize) -> Result<(), Self> {
        if actual == expected {
            Ok(())
        } else {
            Err(Self::DimensionMismatch {
                field,
                actual,
                expected,
            })
        }
    }
}
