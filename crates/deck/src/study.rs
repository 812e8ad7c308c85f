use serde::Deserialize;

use crate::{
    ConfigError, Deferred, Entry, Registry, Uncertain,
    method::{Method, StudyKind, Uncertainty},
};

/// A complete study description: what to run and how to treat derivatives.
///
/// A study is mutated freely while it is being configured. Compiling it into
/// a deck never changes it, see [`Study::compile`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawStudy")]
pub struct Study {
    pub method: Method,
    pub gradients: Gradients,
    pub hessians: Hessians,
    pub output: Verbosity,
    pub distributions: Vec<Uncertain>,
    pub nested: Option<Nested>,
    pub tabular_data: bool,
}

impl Study {
    /// Creates a study with the derivative policies `method` defaults to.
    pub fn new(method: impl Into<Method>) -> Self {
        let method = method.into();
        Self {
            gradients: method.default_gradients(),
            hessians: method.default_hessians(),
            method,
            output: Verbosity::default(),
            distributions: Vec::new(),
            nested: None,
            tabular_data: true,
        }
    }

    #[must_use]
    pub fn kind(&self) -> StudyKind {
        self.method.kind()
    }

    #[must_use]
    pub fn with_gradients(mut self, gradients: Gradients) -> Self {
        self.gradients = gradients;
        self
    }

    #[must_use]
    pub fn with_hessians(mut self, hessians: Hessians) -> Self {
        self.hessians = hessians;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: Verbosity) -> Self {
        self.output = output;
        self
    }

    /// Tags a parameter with a probability distribution.
    #[must_use]
    pub fn with_distribution(mut self, uncertain: Uncertain) -> Self {
        self.distributions.push(uncertain);
        self
    }

    /// Wraps the optimizer around an inner uncertainty quantification loop.
    #[must_use]
    pub fn with_nested(mut self, nested: Nested) -> Self {
        self.nested = Some(nested);
        self
    }

    #[must_use]
    pub fn with_tabular_data(mut self, enabled: bool) -> Self {
        self.tabular_data = enabled;
        self
    }

    /// Records every deferred field this study would emit.
    ///
    /// Distribution moments are not deferred fields: a missing one is an
    /// incomplete distribution, see [`Uncertain`].
    pub(crate) fn audit(&self, ctx: &crate::method::Context, registry: &mut Registry) {
        self.method.audit(ctx, registry);
        if let Gradients::Numerical(numerical) = &self.gradients {
            registry.check("fd_gradient_step_size", &numerical.fd_step_size);
        }
        if let Some(nested) = &self.nested {
            nested.inner.audit(registry);
        }
    }
}

#[derive(Deserialize)]
struct RawStudy {
    method: Method,
    gradients: Option<Gradients>,
    hessians: Option<Hessians>,
    #[serde(default)]
    output: Verbosity,
    #[serde(default)]
    distributions: Vec<Uncertain>,
    nested: Option<Nested>,
    #[serde(default = "enabled")]
    tabular_data: bool,
}

fn enabled() -> bool {
    true
}

impl From<RawStudy> for Study {
    fn from(raw: RawStudy) -> Self {
        let mut study = Study::new(raw.method);
        if let Some(gradients) = raw.gradients {
            study.gradients = gradients;
        }
        if let Some(hessians) = raw.hessians {
            study.hessians = hessians;
        }
        study.output = raw.output;
        study.distributions = raw.distributions;
        study.nested = raw.nested;
        study.tabular_data = raw.tabular_data;
        study
    }
}

/// Where gradients of the response functions come from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gradients {
    None,
    Numerical(NumericalGradients),
    Analytic,
}

impl Gradients {
    /// Finite differences with the default settings.
    #[must_use]
    pub fn numerical() -> Self {
        Self::Numerical(NumericalGradients::default())
    }

    pub(crate) fn entries(&self) -> Result<Vec<Entry>, ConfigError> {
        Ok(match self {
            Self::None => vec![Entry::keyword("no_gradients")],
            Self::Analytic => vec![Entry::keyword("analytic_gradients")],
            Self::Numerical(n) => vec![
                Entry::keyword("numerical_gradients"),
                Entry::directive("method_source", n.method_source.keyword()).nested(),
                Entry::directive("interval_type", n.interval_type.keyword()).nested(),
                Entry::assign(
                    "fd_gradient_step_size",
                    *n.fd_step_size.resolve("fd_gradient_step_size")?,
                )
                .nested(),
            ],
        })
    }
}

/// Finite-difference gradient settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NumericalGradients {
    pub method_source: MethodSource,
    pub interval_type: IntervalType,
    #[serde(alias = "fd_gradient_step_size")]
    pub fd_step_size: Deferred<f64>,
}

impl Default for NumericalGradients {
    fn default() -> Self {
        Self {
            method_source: MethodSource::Dakota,
            interval_type: IntervalType::Forward,
            fd_step_size: Deferred::Set(1e-5),
        }
    }
}

/// Which finite-difference implementation the engine uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodSource {
    #[default]
    Dakota,
    Vendor,
}

impl MethodSource {
    fn keyword(self) -> &'static str {
        match self {
            Self::Dakota => "dakota",
            Self::Vendor => "vendor",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalType {
    #[default]
    Forward,
    Central,
}

impl IntervalType {
    fn keyword(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Central => "central",
        }
    }
}

/// Where Hessians come from. They are never computed by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hessians {
    #[default]
    None,
    Numerical,
}

impl Hessians {
    pub(crate) fn entry(self) -> Entry {
        match self {
            Self::None => Entry::keyword("no_hessians"),
            Self::Numerical => Entry::keyword("numerical_hessians"),
        }
    }
}

/// Engine output verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Silent,
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Quiet => "quiet",
            Self::Normal => "normal",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
        }
    }
}

/// Optimization under uncertainty.
///
/// The outer optimizer sees statistics of the inner loop's functions: the
/// objective is a weighted sum of its mean and standard deviation (or both
/// separately when `compromise` is off), and each inequality constraint is
/// bounded on its mean plus a weighted standard deviation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Nested {
    pub inner: Uncertainty,
    pub mean_weight: f64,
    pub std_dev_weight: f64,
    pub compromise: bool,
    pub constraint_std_dev_weight: f64,
}

impl Nested {
    #[must_use]
    pub fn new(inner: Uncertainty) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Number of objective functions the outer optimizer sees.
    #[must_use]
    pub fn outer_objectives(&self) -> usize {
        if self.compromise { 1 } else { 2 }
    }
}

impl Default for Nested {
    fn default() -> Self {
        Self {
            inner: Uncertainty::Sampling(crate::method::Sampling::default()),
            mean_weight: 1.0,
            std_dev_weight: 1.0,
            compromise: true,
            constraint_std_dev_weight: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{Conmin, Sampling, VectorStudy};

    #[test]
    fn new_study_takes_method_defaults() {
        let study = Study::new(Conmin::default());
        assert_eq!(study.gradients, Gradients::numerical());
        assert_eq!(study.hessians, Hessians::None);
        assert_eq!(study.kind(), StudyKind::Optimization);

        let study = Study::new(VectorStudy::default());
        assert_eq!(study.gradients, Gradients::None);
        assert_eq!(study.kind(), StudyKind::ParameterStudy);
    }

    #[test]
    fn numerical_gradient_entries() {
        let lines: Vec<String> = Gradients::numerical()
            .entries()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            lines,
            [
                "numerical_gradients",
                "method_source dakota",
                "interval_type forward",
                "fd_gradient_step_size = 1e-5",
            ]
        );
    }

    #[test]
    fn deserialized_study_keeps_method_defaults() {
        let study: Study = toml::from_str(
            r#"
            output = "quiet"

            [method]
            kind = "optimization"
            method = "npsol_sqp"
            "#,
        )
        .unwrap();

        assert_eq!(study.output, Verbosity::Quiet);
        assert_eq!(study.gradients, Gradients::numerical());
        assert!(study.tabular_data);
    }

    #[test]
    fn deserialized_gradients_override_defaults() {
        let study: Study = toml::from_str(
            r#"
            [method]
            kind = "optimization"
            method = "conmin"

            [gradients]
            type = "numerical"
            interval_type = "central"
            fd_step_size = 1e-6
            "#,
        )
        .unwrap();

        let Gradients::Numerical(numerical) = &study.gradients else {
            panic!("expected numerical gradients");
        };
        assert_eq!(numerical.interval_type, IntervalType::Central);
        assert_eq!(numerical.fd_step_size, Deferred::Set(1e-6));
    }

    #[test]
    fn nested_defaults_to_compromise() {
        let nested = Nested::new(Uncertainty::Sampling(Sampling::default()));
        assert!(nested.compromise);
        assert_eq!(nested.outer_objectives(), 1);
    }
}
