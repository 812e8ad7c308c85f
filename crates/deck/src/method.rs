mod optimization;
mod parameter_study;
mod uncertainty;

use serde::Deserialize;

pub use optimization::{Conmin, EfficientGlobal, Moga, NpsolSqp, OptppNewton, Optimizer, Soga};
pub use parameter_study::{CenteredStudy, ListStudy, MultidimStudy, ParameterStudy, VectorStudy};
pub use uncertainty::{
    FsuQuasiMc, PolynomialChaos, SampleType, Sampling, Sequence, StochCollocation, Uncertainty,
};

use crate::{ConfigError, Entry, Gradients, Hessians, Registry, Verbosity};

/// Problem counts the method builders need, in scalar components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Context {
    pub variables: usize,
    pub objectives: usize,
    pub eq_constraints: usize,
    pub ineq_constraints: usize,
}

/// The broad category of a study, derived from its method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyKind {
    Optimization,
    ParameterStudy,
    UncertaintyQuantification,
}

/// What the variables block must carry for a method to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableNeeds {
    pub initial_point: bool,
    pub bounds: bool,
}

/// How the responses block counts functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCount {
    /// `objective_functions`, with constraints counted separately.
    Objectives,
    /// `response_functions`, counting every function.
    Responses,
}

/// The selected method, one variant per study kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Method {
    Optimization(Optimizer),
    ParameterStudy(ParameterStudy),
    Uncertainty(Uncertainty),
}

impl Method {
    #[must_use]
    pub fn kind(&self) -> StudyKind {
        match self {
            Self::Optimization(_) => StudyKind::Optimization,
            Self::ParameterStudy(_) => StudyKind::ParameterStudy,
            Self::Uncertainty(_) => StudyKind::UncertaintyQuantification,
        }
    }

    /// Returns the method keyword as the user selected it.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Optimization(o) => o.name(),
            Self::ParameterStudy(s) => s.name(),
            Self::Uncertainty(u) => u.name(),
        }
    }

    /// Returns the gradient policy a study starts with for this method.
    #[must_use]
    pub fn default_gradients(&self) -> Gradients {
        match self {
            Self::Optimization(o) if o.gradient_based() => Gradients::numerical(),
            _ => Gradients::None,
        }
    }

    /// Returns the Hessian policy a study starts with for this method.
    #[must_use]
    pub fn default_hessians(&self) -> Hessians {
        match self {
            Self::Optimization(Optimizer::OptppNewton(_)) => Hessians::Numerical,
            _ => Hessians::None,
        }
    }

    #[must_use]
    pub fn needs(&self) -> VariableNeeds {
        let (initial_point, bounds) = match self {
            Self::Optimization(o) if o.gradient_based() => (true, true),
            Self::Optimization(_) => (false, true),
            Self::ParameterStudy(ParameterStudy::Vector(_) | ParameterStudy::Centered(_)) => {
                (true, false)
            }
            Self::ParameterStudy(ParameterStudy::Multidim(_)) => (false, true),
            Self::ParameterStudy(ParameterStudy::List(_)) => (false, false),
            Self::Uncertainty(_) => (false, true),
        };
        VariableNeeds {
            initial_point,
            bounds,
        }
    }

    #[must_use]
    pub fn function_count(&self) -> FunctionCount {
        match self {
            Self::ParameterStudy(ParameterStudy::List(_)) | Self::Uncertainty(_) => {
                FunctionCount::Responses
            }
            _ => FunctionCount::Objectives,
        }
    }

    /// Rejects combinations of method, problem and derivative policy that the
    /// engine cannot run.
    pub(crate) fn validate(
        &self,
        ctx: &Context,
        gradients: &Gradients,
        hessians: Hessians,
    ) -> Result<(), ConfigError> {
        let Self::Optimization(optimizer) = self else {
            return Ok(());
        };

        if !optimizer.multi_objective() && ctx.objectives > 1 {
            return Err(ConfigError::TooManyObjectives {
                method: optimizer.name(),
                found: ctx.objectives,
            });
        }
        if optimizer.gradient_based() && matches!(gradients, Gradients::None) {
            return Err(ConfigError::incompatible(format!(
                "{} needs gradients, but no_gradients was selected",
                optimizer.name()
            )));
        }
        if matches!(optimizer, Optimizer::OptppNewton(_)) && hessians != Hessians::Numerical {
            return Err(ConfigError::incompatible(
                "optpp_newton needs numerical_hessians",
            ));
        }
        Ok(())
    }

    pub(crate) fn audit(&self, ctx: &Context, registry: &mut Registry) {
        match self {
            Self::Optimization(o) => o.audit(ctx, registry),
            Self::ParameterStudy(s) => s.audit(registry),
            Self::Uncertainty(u) => u.audit(registry),
        }
    }

    /// Builds the method block: the algorithm entries, then `output`.
    pub(crate) fn entries(
        &self,
        ctx: &Context,
        output: Verbosity,
    ) -> Result<Vec<Entry>, ConfigError> {
        let mut entries = match self {
            Self::Optimization(o) => o.entries(ctx)?,
            Self::ParameterStudy(s) => s.entries(ctx)?,
            Self::Uncertainty(u) => u.entries()?,
        };
        entries.push(Entry::assign("output", output.keyword()));
        Ok(entries)
    }
}

macro_rules! impl_from_method {
    ($($option:ty => $family:ident :: $variant:ident),* $(,)?) => {
        $(
            impl From<$option> for Method {
                fn from(option: $option) -> Self {
                    Self::from($family::$variant(option))
                }
            }
        )*
    };
}

impl_from_method!(
    Conmin => Optimizer::Conmin,
    NpsolSqp => Optimizer::NpsolSqp,
    OptppNewton => Optimizer::OptppNewton,
    EfficientGlobal => Optimizer::EfficientGlobal,
    Moga => Optimizer::Moga,
    Soga => Optimizer::Soga,
    VectorStudy => ParameterStudy::Vector,
    MultidimStudy => ParameterStudy::Multidim,
    ListStudy => ParameterStudy::List,
    CenteredStudy => ParameterStudy::Centered,
    Sampling => Uncertainty::Sampling,
    PolynomialChaos => Uncertainty::PolynomialChaos,
    StochCollocation => Uncertainty::StochCollocation,
    FsuQuasiMc => Uncertainty::FsuQuasiMc,
);

impl From<Optimizer> for Method {
    fn from(optimizer: Optimizer) -> Self {
        Self::Optimization(optimizer)
    }
}

impl From<ParameterStudy> for Method {
    fn from(study: ParameterStudy) -> Self {
        Self::ParameterStudy(study)
    }
}

impl From<Uncertainty> for Method {
    fn from(method: Uncertainty) -> Self {
        Self::Uncertainty(method)
    }
}
