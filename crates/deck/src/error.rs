use thiserror::Error;

/// Errors that make a study impossible to compile.
///
/// Every variant is fatal: compilation stops at the first error and no partial
/// deck is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no parameters declared, run aborted")]
    NoParameters,

    #[error("no objectives declared, run aborted")]
    NoObjectives,

    #[error("declared but not defined: {}", .fields.join(", "))]
    Unassigned { fields: Vec<String> },

    #[error("#{field} ({actual}) != #{expected_of} ({expected})")]
    DimensionMismatch {
        field: String,
        actual: usize,
        expected_of: &'static str,
        expected: usize,
    },

    #[error("incomplete {family} definition for variable `{variable}`: missing {moment}")]
    IncompleteDistribution {
        variable: String,
        family: &'static str,
        moment: &'static str,
    },

    #[error("parameter component `{0}` is declared more than once")]
    DuplicateParameter(String),

    #[error("distribution given for unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("parameter `{0}` has more than one distribution")]
    DuplicateDistribution(String),

    #[error("`{variable}` needs lower and upper bounds in a {block} block")]
    MissingBounds {
        variable: String,
        block: &'static str,
    },

    #[error("{method} supports a single objective function, found {found}")]
    TooManyObjectives { method: &'static str, found: usize },

    #[error("incompatible configuration: {reason}")]
    Incompatible { reason: String },
}

impl ConfigError {
    pub(crate) fn mismatch(
        field: impl Into<String>,
        actual: usize,
        expected_of: &'static str,
        expected: usize,
    ) -> Self {
        Self::DimensionMismatch {
            field: field.into(),
            actual,
            expected_of,
            expected,
        }
    }

    pub(crate) fn incompatible(reason: impl Into<String>) -> Self {
        Self::Incompatible {
            reason: reason.into(),
        }
    }
}
