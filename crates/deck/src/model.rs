//! Model sections: a single flat model, or the nested pair used for
//! optimization under uncertainty.

use crate::{Entry, Nested, Value};

/// Block ids used by nested studies.
pub(crate) mod ids {
    pub const OUTER_METHOD: &str = "opt";
    pub const INNER_METHOD: &str = "inner";
    pub const OUTER_MODEL: &str = "outer_m";
    pub const INNER_MODEL: &str = "inner_m";
    pub const OUTER_VARIABLES: &str = "outer_v";
    pub const INNER_VARIABLES: &str = "inner_v";
    pub const OUTER_RESPONSES: &str = "outer_r";
    pub const INNER_RESPONSES: &str = "inner_r";
}

/// The model block of a flat study.
pub(crate) fn single() -> Vec<Entry> {
    vec![Entry::keyword("single")]
}

/// The inner model of a nested study, evaluated by the callback.
pub(crate) fn inner() -> Vec<Entry> {
    vec![
        Entry::id("id_model", ids::INNER_MODEL),
        Entry::keyword("single"),
        Entry::id("variables_pointer", ids::INNER_VARIABLES),
        Entry::id("responses_pointer", ids::INNER_RESPONSES),
    ]
}

/// The outer model of a nested study.
///
/// `design` are the outer design descriptors, mapped onto the inner state
/// variables of the same name. `inner_functions` counts the inner response
/// functions: the objective, then one per inequality constraint.
pub(crate) fn outer(nested: &Nested, design: Vec<String>, inner_functions: usize) -> Vec<Entry> {
    let mapping = ResponseMapping::new(nested, inner_functions);

    let mut entries = vec![
        Entry::id("id_model", ids::OUTER_MODEL),
        Entry::keyword("nested"),
        Entry::id("variables_pointer", ids::OUTER_VARIABLES),
        Entry::id("responses_pointer", ids::OUTER_RESPONSES),
        Entry::id("sub_method_pointer", ids::INNER_METHOD).nested(),
        Entry::directive("primary_variable_mapping", Value::Descriptors(design)).nested(),
        Entry::directive("primary_response_mapping", mapping.primary()).nested(),
    ];
    if inner_functions > 1 {
        entries.push(
            Entry::directive("secondary_response_mapping", mapping.secondary()).nested(),
        );
    }
    entries
}

/// Maps inner statistics onto outer response functions.
///
/// Each inner function contributes two statistics, its mean and its standard
/// deviation, so every row has `2 * inner_functions` columns. Rows are
/// flattened in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResponseMapping {
    columns: usize,
    primary: Vec<Vec<f64>>,
    secondary: Vec<Vec<f64>>,
}

impl ResponseMapping {
    pub(crate) fn new(nested: &Nested, inner_functions: usize) -> Self {
        let columns = 2 * inner_functions;
        let primary = if nested.compromise {
            vec![row(columns, &[(0, nested.mean_weight), (1, nested.std_dev_weight)])]
        } else {
            vec![
                row(columns, &[(0, nested.mean_weight)]),
                row(columns, &[(1, nested.std_dev_weight)]),
            ]
        };

        // constraint j reads the statistics of inner function j + 1
        let secondary = (1..inner_functions)
            .map(|function| {
                row(
                    columns,
                    &[
                        (2 * function, 1.0),
                        (2 * function + 1, nested.constraint_std_dev_weight),
                    ],
                )
            })
            .collect();

        Self {
            columns,
            primary,
            secondary,
        }
    }

    #[cfg(test)]
    fn columns(&self) -> usize {
        self.columns
    }

    #[cfg(test)]
    fn primary_rows(&self) -> &[Vec<f64>] {
        &self.primary
    }

    #[cfg(test)]
    fn secondary_rows(&self) -> &[Vec<f64>] {
        &self.secondary
    }

    fn primary(&self) -> Vec<f64> {
        self.primary.concat()
    }

    fn secondary(&self) -> Vec<f64> {
        self.secondary.concat()
    }
}

fn row(columns: usize, weights: &[(usize, f64)]) -> Vec<f64> {
    let mut row = vec![0.0; columns];
    for &(column, weight) in weights {
        row[column] = weight;
    }
    row
}
