use serde::Deserialize;
use tracing::warn;

use crate::{ConfigError, Deferred};

/// A probability distribution family, one variables block each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Normal,
    Lognormal,
    Uniform,
    Exponential,
    Beta,
    Gamma,
    Weibull,
}

impl Family {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Lognormal => "lognormal",
            Self::Uniform => "uniform",
            Self::Exponential => "exponential",
            Self::Beta => "beta",
            Self::Gamma => "gamma",
            Self::Weibull => "weibull",
        }
    }

    /// Moments that must be supplied for every variable of this family.
    #[must_use]
    pub fn required(self) -> &'static [MomentKind] {
        use MomentKind::{Alpha, Beta, Lower, Mean, StdDev, Upper};
        match self {
            Self::Normal | Self::Lognormal => &[Mean, StdDev],
            Self::Uniform => &[],
            Self::Exponential => &[Beta],
            Self::Beta => &[Alpha, Beta, Lower, Upper],
            Self::Gamma | Self::Weibull => &[Alpha, Beta],
        }
    }

    /// Moments that may be supplied.
    ///
    /// Uniform bounds fall back to the parameter's own bounds when omitted.
    #[must_use]
    pub fn optional(self) -> &'static [MomentKind] {
        use MomentKind::{Lower, Upper};
        match self {
            Self::Normal | Self::Uniform => &[Lower, Upper],
            _ => &[],
        }
    }
}

/// A distribution moment or bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentKind {
    Mean,
    StdDev,
    Alpha,
    Beta,
    Lower,
    Upper,
}

impl MomentKind {
    /// The engine keyword for this moment in a distribution block.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Mean => "means",
            Self::StdDev => "std_deviations",
            Self::Alpha => "alphas",
            Self::Beta => "betas",
            Self::Lower => "lower_bounds",
            Self::Upper => "upper_bounds",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::StdDev => "std_dev",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Lower => "lower",
            Self::Upper => "upper",
        }
    }

    const ALL: [Self; 6] = [
        Self::Mean,
        Self::StdDev,
        Self::Alpha,
        Self::Beta,
        Self::Lower,
        Self::Upper,
    ];
}

/// One value shared by every element, or one value per element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Moment {
    Scalar(f64),
    PerElement(Vec<f64>),
}

impl From<f64> for Moment {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for Moment {
    fn from(values: Vec<f64>) -> Self {
        Self::PerElement(values)
    }
}

impl Moment {
    /// Expands to one value per element of a parameter of size `size`.
    pub(crate) fn expand(
        &self,
        size: usize,
        variable: &str,
        kind: MomentKind,
    ) -> Result<Vec<f64>, ConfigError> {
        match self {
            Self::Scalar(value) => Ok(vec![*value; size]),
            Self::PerElement(values) if values.len() == size => Ok(values.clone()),
            Self::PerElement(values) => Err(ConfigError::mismatch(
                format!("{variable}.{}", kind.name()),
                values.len(),
                "elements",
                size,
            )),
        }
    }
}

/// A distribution family and its moments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Distribution {
    pub family: Family,
    #[serde(default)]
    pub mean: Deferred<Moment>,
    #[serde(default)]
    pub std_dev: Deferred<Moment>,
    #[serde(default)]
    pub alpha: Deferred<Moment>,
    #[serde(default)]
    pub beta: Deferred<Moment>,
    #[serde(default)]
    pub lower: Deferred<Moment>,
    #[serde(default)]
    pub upper: Deferred<Moment>,
}

impl Distribution {
    /// A distribution of `family` with no moments supplied yet.
    #[must_use]
    pub fn new(family: Family) -> Self {
        Self {
            family,
            mean: Deferred::Unset,
            std_dev: Deferred::Unset,
            alpha: Deferred::Unset,
            beta: Deferred::Unset,
            lower: Deferred::Unset,
            upper: Deferred::Unset,
        }
    }

    pub fn normal(mean: impl Into<Moment>, std_dev: impl Into<Moment>) -> Self {
        let mut d = Self::new(Family::Normal);
        d.mean.set(mean);
        d.std_dev.set(std_dev);
        d
    }

    pub fn lognormal(mean: impl Into<Moment>, std_dev: impl Into<Moment>) -> Self {
        let mut d = Self::new(Family::Lognormal);
        d.mean.set(mean);
        d.std_dev.set(std_dev);
        d
    }

    /// A uniform distribution over the parameter's declared bounds.
    #[must_use]
    pub fn uniform() -> Self {
        Self::new(Family::Uniform)
    }

    pub fn exponential(beta: impl Into<Moment>) -> Self {
        let mut d = Self::new(Family::Exponential);
        d.beta.set(beta);
        d
    }

    pub fn beta(
        alpha: impl Into<Moment>,
        beta: impl Into<Moment>,
        lower: impl Into<Moment>,
        upper: impl Into<Moment>,
    ) -> Self {
        let mut d = Self::new(Family::Beta);
        d.alpha.set(alpha);
        d.beta.set(beta);
        d.lower.set(lower);
        d.upper.set(upper);
        d
    }

    pub fn gamma(alpha: impl Into<Moment>, beta: impl Into<Moment>) -> Self {
        let mut d = Self::new(Family::Gamma);
        d.alpha.set(alpha);
        d.beta.set(beta);
        d
    }

    pub fn weibull(alpha: impl Into<Moment>, beta: impl Into<Moment>) -> Self {
        let mut d = Self::new(Family::Weibull);
        d.alpha.set(alpha);
        d.beta.set(beta);
        d
    }

    /// Sets the lower and upper bounds.
    #[must_use]
    pub fn with_bounds(mut self, lower: impl Into<Moment>, upper: impl Into<Moment>) -> Self {
        self.lower.set(lower);
        self.upper.set(upper);
        self
    }

    #[must_use]
    pub fn moment(&self, kind: MomentKind) -> &Deferred<Moment> {
        match kind {
            MomentKind::Mean => &self.mean,
            MomentKind::StdDev => &self.std_dev,
            MomentKind::Alpha => &self.alpha,
            MomentKind::Beta => &self.beta,
            MomentKind::Lower => &self.lower,
            MomentKind::Upper => &self.upper,
        }
    }
}

/// A parameter tagged with a distribution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Uncertain {
    pub parameter: String,
    #[serde(flatten)]
    pub distribution: Distribution,
}

impl Uncertain {
    pub fn new(parameter: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            parameter: parameter.into(),
            distribution,
        }
    }

    #[must_use]
    pub fn family(&self) -> Family {
        self.distribution.family
    }

    /// Checks that every required moment is supplied.
    ///
    /// Moments the family does not use are ignored with a warning.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let family = self.family();
        if let Some(missing) = family
            .required()
            .iter()
            .find(|kind| !self.distribution.moment(**kind).is_set())
        {
            return Err(ConfigError::IncompleteDistribution {
                variable: self.parameter.clone(),
                family: family.name(),
                moment: missing.name(),
            });
        }

        for kind in MomentKind::ALL {
            let used = family.required().contains(&kind) || family.optional().contains(&kind);
            if !used && self.distribution.moment(kind).is_set() {
                warn!(
                    parameter = %self.parameter,
                    family = family.name(),
                    moment = kind.name(),
                    "ignoring moment not used by this distribution"
                );
            }
        }
        Ok(())
    }
}
