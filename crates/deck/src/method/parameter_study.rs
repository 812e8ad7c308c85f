use serde::Deserialize;

use crate::{ConfigError, Deferred, Entry, Registry};

use super::Context;

/// Parameter studies: fixed sampling patterns over the design variables.
///
/// Every shape field is deferred and must be supplied. Per-variable shape
/// fields must have exactly one entry per scalar variable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ParameterStudy {
    Vector(VectorStudy),
    Multidim(MultidimStudy),
    List(ListStudy),
    Centered(CenteredStudy),
}

/// Steps from the initial point to `final_point` in `num_steps` increments.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VectorStudy {
    pub final_point: Deferred<Vec<f64>>,
    pub num_steps: Deferred<u32>,
}

impl VectorStudy {
    #[must_use]
    pub fn new(final_point: Vec<f64>, num_steps: u32) -> Self {
        Self {
            final_point: final_point.into(),
            num_steps: num_steps.into(),
        }
    }
}

/// A full-factorial grid with `partitions[i]` intervals along variable `i`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MultidimStudy {
    pub partitions: Deferred<Vec<u32>>,
}

impl MultidimStudy {
    #[must_use]
    pub fn new(partitions: Vec<u32>) -> Self {
        Self {
            partitions: partitions.into(),
        }
    }
}

/// An explicit list of points.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListStudy {
    pub list_of_points: Deferred<Vec<Vec<f64>>>,
}

impl ListStudy {
    #[must_use]
    pub fn new(points: Vec<Vec<f64>>) -> Self {
        Self {
            list_of_points: points.into(),
        }
    }
}

/// Steps along each variable axis around the initial point.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CenteredStudy {
    pub step_vector: Deferred<Vec<f64>>,
    pub steps_per_variable: Deferred<Vec<u32>>,
}

impl CenteredStudy {
    #[must_use]
    pub fn new(step_vector: Vec<f64>, steps_per_variable: Vec<u32>) -> Self {
        Self {
            step_vector: step_vector.into(),
            steps_per_variable: steps_per_variable.into(),
        }
    }
}

impl ParameterStudy {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vector(_) => "vector_parameter_study",
            Self::Multidim(_) => "multidim_parameter_study",
            Self::List(_) => "list_parameter_study",
            Self::Centered(_) => "centered_parameter_study",
        }
    }

    pub(crate) fn audit(&self, registry: &mut Registry) {
        match self {
            Self::Vector(s) => {
                registry.check("final_point", &s.final_point);
                registry.check("num_steps", &s.num_steps);
            }
            Self::Multidim(s) => registry.check("partitions", &s.partitions),
            Self::List(s) => registry.check("list_of_points", &s.list_of_points),
            Self::Centered(s) => {
                registry.check("step_vector", &s.step_vector);
                registry.check("steps_per_variable", &s.steps_per_variable);
            }
        }
    }

    pub(crate) fn entries(&self, ctx: &Context) -> Result<Vec<Entry>, ConfigError> {
        let mut entries = vec![Entry::keyword(self.name())];

        match self {
            Self::Vector(s) => {
                let final_point = s.final_point.resolve("final_point")?;
                check_len("final_point", final_point.len(), ctx)?;
                entries.push(Entry::assign("final_point", final_point.as_slice()));
                entries.push(Entry::assign("num_steps", *s.num_steps.resolve("num_steps")?));
            }
            Self::Multidim(s) => {
                let partitions = s.partitions.resolve("partitions")?;
                check_len("partitions", partitions.len(), ctx)?;
                entries.push(Entry::assign("partitions", partitions.as_slice()));
            }
            Self::List(s) => {
                let points = s.list_of_points.resolve("list_of_points")?;
                if points.is_empty() {
                    return Err(ConfigError::mismatch("list_of_points", 0, "points", 1));
                }
                for (i, point) in points.iter().enumerate() {
                    check_len(format!("list_of_points[{i}]"), point.len(), ctx)?;
                }
                let flat: Vec<f64> = points.iter().flatten().copied().collect();
                entries.push(Entry::assign("list_of_points", flat));
            }
            Self::Centered(s) => {
                let step_vector = s.step_vector.resolve("step_vector")?;
                check_len("step_vector", step_vector.len(), ctx)?;
                let steps = s.steps_per_variable.resolve("steps_per_variable")?;
                check_len("steps_per_variable", steps.len(), ctx)?;
                entries.push(Entry::assign("step_vector", step_vector.as_slice()));
                entries.push(Entry::assign("steps_per_variable", steps.as_slice()));
            }
        }

        Ok(entries)
    }
}

fn check_len(field: impl Into<String>, actual: usize, ctx: &Context) -> Result<(), ConfigError> {
    if actual == ctx.variables {
        Ok(())
    } else {
        Err(ConfigError::mismatch(field, actual, "parameters", ctx.variables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(variables: usize) -> Context {
        Context {
            variables,
            objectives: 1,
            eq_constraints: 0,
            ineq_constraints: 0,
        }
    }

    #[test]
    fn vector_study_emits_shape() {
        let study = ParameterStudy::Vector(VectorStudy::new(vec![1.0, 2.5], 10));
        let lines: Vec<String> = study
            .entries(&context(2))
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            lines,
            [
                "vector_parameter_study",
                "final_point = 1 2.5",
                "num_steps = 10",
            ]
        );
    }

    #[test]
    fn final_point_must_match_parameter_count() {
        let study = ParameterStudy::Vector(VectorStudy::new(vec![1.0, 2.0, 3.0], 4));
        let error = study.entries(&context(2)).unwrap_err();

        assert_eq!(
            error,
            ConfigError::DimensionMismatch {
                field: "final_point".into(),
                actual: 3,
                expected_of: "parameters",
                expected: 2,
            }
        );
        assert_eq!(error.to_string(), "#final_point (3) != #parameters (2)");
    }

    #[test]
    fn partitions_must_match_parameter_count() {
        let study = ParameterStudy::Multidim(MultidimStudy::new(vec![4]));
        assert!(matches!(
            study.entries(&context(2)),
            Err(ConfigError::DimensionMismatch { .. })
        ));

        let study = ParameterStudy::Multidim(MultidimStudy::new(vec![4, 2]));
        let entries = study.entries(&context(2)).unwrap();
        assert_eq!(entries[1].to_string(), "partitions = 4 2");
    }

    #[test]
    fn list_points_are_checked_individually() {
        let study = ParameterStudy::List(ListStudy::new(vec![vec![0.0, 1.0], vec![2.0]]));
        let error = study.entries(&context(2)).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::DimensionMismatch { ref field, .. } if field == "list_of_points[1]"
        ));
    }

    #[test]
    fn empty_point_lists_are_rejected() {
        let study = ParameterStudy::List(ListStudy::new(vec![]));
        assert_eq!(
            study.entries(&context(2)),
            Err(ConfigError::mismatch("list_of_points", 0, "points", 1))
        );
    }

    #[test]
    fn unset_shape_fields_are_reported_together() {
        let study = ParameterStudy::Vector(VectorStudy::default());
        let mut registry = Registry::new();
        study.audit(&mut registry);

        assert_eq!(
            registry.finish(),
            Err(ConfigError::Unassigned {
                fields: vec!["final_point".into(), "num_steps".into()]
            })
        );
    }
}
