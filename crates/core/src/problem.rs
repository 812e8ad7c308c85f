#[cfg(feature = "serde-derive")]
use serde::Deserialize;

use crate::ComponentId;

/// Whether a parameter is varied by the study or carried along as state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(rename_all = "snake_case"))]
pub enum ParameterKind {
    #[default]
    Design,
    State,
}

/// A snapshot of a named parameter declared by a model.
///
/// Scalars hold a single value. Vector parameters hold one value per element,
/// and bounds, when present, hold one value per element as well.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Deserialize))]
pub struct Parameter {
    pub name: String,

    #[cfg_attr(
        feature = "serde-derive",
        serde(alias = "value", deserialize_with = "scalar_or_vec")
    )]
    pub values: Vec<f64>,

    #[cfg_attr(
        feature = "serde-derive",
        serde(default, deserialize_with = "optional_scalar_or_vec")
    )]
    pub lower: Option<Vec<f64>>,

    #[cfg_attr(
        feature = "serde-derive",
        serde(default, deserialize_with = "optional_scalar_or_vec")
    )]
    pub upper: Option<Vec<f64>>,

    #[cfg_attr(feature = "serde-derive", serde(default))]
    pub kind: ParameterKind,
}

impl Parameter {
    /// Creates an unbounded scalar design parameter.
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self::vector(name, vec![value])
    }

    /// Creates an unbounded vector design parameter.
    pub fn vector(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            lower: None,
            upper: None,
            kind: ParameterKind::Design,
        }
    }

    /// Applies the same bounds to every element.
    #[must_use]
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        let size = self.size();
        self.lower = Some(vec![lower; size]);
        self.upper = Some(vec![upper; size]);
        self
    }

    /// Applies per-element bounds.
    #[must_use]
    pub fn with_element_bounds(mut self, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        self.lower = Some(lower);
        self.upper = Some(upper);
        self
    }

    /// Marks the parameter as state rather than design.
    #[must_use]
    pub fn as_state(mut self) -> Self {
        self.kind = ParameterKind::State;
        self
    }

    /// Returns the number of scalar elements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Returns the scalar components of this parameter, in element order.
    #[must_use]
    pub fn components(&self) -> Vec<ComponentId> {
        ComponentId::expand(&self.name, self.size())
    }
}

/// A named model response: an objective or a constraint.
///
/// `bound` is the upper bound of an inequality constraint or the target of an
/// equality constraint. It is unused for objectives.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Deserialize))]
pub struct Response {
    pub name: String,

    #[cfg_attr(feature = "serde-derive", serde(default = "one"))]
    pub size: usize,

    #[cfg_attr(feature = "serde-derive", serde(default))]
    pub bound: Option<f64>,
}

impl Response {
    /// Creates a scalar response.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::vector(name, 1)
    }

    /// Creates a response with `size` scalar components.
    pub fn vector(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            bound: None,
        }
    }

    /// Sets the constraint bound or target.
    #[must_use]
    pub fn with_bound(mut self, bound: f64) -> Self {
        self.bound = Some(bound);
        self
    }

    /// Returns the scalar components of this response.
    #[must_use]
    pub fn components(&self) -> Vec<ComponentId> {
        ComponentId::expand(&self.name, self.size)
    }
}

/// The parameters and responses a model declares, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(default))]
pub struct Problem {
    pub parameters: Vec<Parameter>,
    pub objectives: Vec<Response>,
    pub eq_constraints: Vec<Response>,
    pub ineq_constraints: Vec<Response>,
}

impl Problem {
    /// Creates an empty problem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Adds an objective.
    #[must_use]
    pub fn objective(mut self, response: Response) -> Self {
        self.objectives.push(response);
        self
    }

    /// Adds an equality constraint.
    #[must_use]
    pub fn eq_constraint(mut self, response: Response) -> Self {
        self.eq_constraints.push(response);
        self
    }

    /// Adds an inequality constraint.
    #[must_use]
    pub fn ineq_constraint(mut self, response: Response) -> Self {
        self.ineq_constraints.push(response);
        self
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn find_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns the total number of scalar parameter components.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.parameters.iter().map(Parameter::size).sum()
    }

    /// Returns the number of scalar objective functions.
    #[must_use]
    pub fn objective_count(&self) -> usize {
        count(&self.objectives)
    }

    /// Returns the number of scalar equality constraints.
    #[must_use]
    pub fn eq_constraint_count(&self) -> usize {
        count(&self.eq_constraints)
    }

    /// Returns the number of scalar inequality constraints.
    #[must_use]
    pub fn ineq_constraint_count(&self) -> usize {
        count(&self.ineq_constraints)
    }
}

fn count(responses: &[Response]) -> usize {
    responses.iter().map(|r| r.size).sum()
}

#[cfg(feature = "serde-derive")]
fn one() -> usize {
    1
}

#[cfg(feature = "serde-derive")]
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarOrVec {
    Scalar(f64),
    Vec(Vec<f64>),
}

#[cfg(feature = "serde-derive")]
impl From<ScalarOrVec> for Vec<f64> {
    fn from(value: ScalarOrVec) -> Self {
        match value {
            ScalarOrVec::Scalar(v) => vec![v],
            ScalarOrVec::Vec(v) => v,
        }
    }
}

#[cfg(feature = "serde-derive")]
fn scalar_or_vec<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    ScalarOrVec::deserialize(deserializer).map(Into::into)
}

#[cfg(feature = "serde-derive")]
fn optional_scalar_or_vec<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<ScalarOrVec>::deserialize(deserializer).map(|v| v.map(Into::into))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_scalar_components() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("x", 1.0))
            .parameter(Parameter::vector("z", vec![0.0, 0.0, 0.0]))
            .objective(Response::scalar("f"))
            .ineq_constraint(Response::vector("g", 2));

        assert_eq!(problem.variable_count(), 4);
        assert_eq!(problem.objective_count(), 1);
        assert_eq!(problem.ineq_constraint_count(), 2);
        assert_eq!(problem.eq_constraint_count(), 0);
    }

    #[test]
    fn scalar_bounds_cover_every_element() {
        let z = Parameter::vector("z", vec![1.0, 2.0]).with_bounds(-1.0, 1.0);
        assert_eq!(z.lower, Some(vec![-1.0, -1.0]));
        assert_eq!(z.upper, Some(vec![1.0, 1.0]));
    }

    #[test]
    fn finds_parameters_by_name() {
        let problem = Problem::new().parameter(Parameter::scalar("x", 1.0).as_state());
        assert_eq!(
            problem.find_parameter("x").map(|p| p.kind),
            Some(ParameterKind::State)
        );
        assert!(problem.find_parameter("y").is_none());
    }
}
