use serde::Deserialize;

use crate::{ConfigError, Deferred, Entry, Registry};

use super::Context;

/// Optimization algorithms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Optimizer {
    Conmin(Conmin),
    NpsolSqp(NpsolSqp),
    OptppNewton(OptppNewton),
    EfficientGlobal(EfficientGlobal),
    Moga(Moga),
    Soga(Soga),
}

/// CONMIN, either Fletcher-Reeves conjugate gradient or feasible directions.
///
/// The variant is picked at compile time: feasible directions when the
/// problem has constraints, conjugate gradient otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Conmin {
    pub max_iterations: Deferred<u32>,
    pub max_function_evaluations: Deferred<u32>,
    pub convergence_tolerance: Deferred<f64>,
    pub constraint_tolerance: Deferred<f64>,
}

impl Default for Conmin {
    fn default() -> Self {
        Self {
            max_iterations: Deferred::Set(100),
            max_function_evaluations: Deferred::Set(1000),
            convergence_tolerance: Deferred::Set(1e-7),
            constraint_tolerance: Deferred::Set(1e-7),
        }
    }
}

/// NPSOL sequential quadratic programming.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NpsolSqp {
    pub convergence_tolerance: Deferred<f64>,
    pub constraint_tolerance: Deferred<f64>,
}

impl Default for NpsolSqp {
    fn default() -> Self {
        Self {
            convergence_tolerance: Deferred::Set(1e-8),
            constraint_tolerance: Deferred::Set(1e-8),
        }
    }
}

/// OPT++ Newton method. Needs gradients and Hessians.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptppNewton {
    pub max_iterations: Deferred<u32>,
    pub convergence_tolerance: Deferred<f64>,
}

impl Default for OptppNewton {
    fn default() -> Self {
        Self {
            max_iterations: Deferred::Set(2000),
            convergence_tolerance: Deferred::Set(1e-8),
        }
    }
}

/// Efficient global optimization. The seed must be supplied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EfficientGlobal {
    pub seed: Deferred<u64>,
}

/// Multi-objective genetic algorithm.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Moga {
    pub final_solutions: Deferred<u32>,
    pub population_size: Deferred<u32>,
    pub max_iterations: Deferred<u32>,
    pub max_function_evaluations: Deferred<u32>,
}

impl Default for Moga {
    fn default() -> Self {
        Self {
            final_solutions: Deferred::Set(8),
            population_size: Deferred::Set(100),
            max_iterations: Deferred::Set(2000),
            max_function_evaluations: Deferred::Set(999_000),
        }
    }
}

/// Single-objective genetic algorithm.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Soga {
    pub population_size: Deferred<u32>,
    pub max_iterations: Deferred<u32>,
    pub max_function_evaluations: Deferred<u32>,
}

impl Default for Soga {
    fn default() -> Self {
        Self {
            population_size: Deferred::Set(100),
            max_iterations: Deferred::Set(2000),
            max_function_evaluations: Deferred::Set(999_000),
        }
    }
}

impl Optimizer {
    /// Returns the method keyword, before any compile-time variant selection.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Conmin(_) => "conmin",
            Self::NpsolSqp(_) => "npsol_sqp",
            Self::OptppNewton(_) => "optpp_newton",
            Self::EfficientGlobal(_) => "efficient_global",
            Self::Moga(_) => "moga",
            Self::Soga(_) => "soga",
        }
    }

    /// Returns `true` for algorithms that need gradients from somewhere.
    #[must_use]
    pub fn gradient_based(&self) -> bool {
        matches!(
            self,
            Self::Conmin(_) | Self::NpsolSqp(_) | Self::OptppNewton(_)
        )
    }

    /// Returns `true` if the algorithm accepts more than one objective function.
    #[must_use]
    pub fn multi_objective(&self) -> bool {
        matches!(self, Self::Moga(_))
    }

    /// Records the deferred fields this optimizer would emit for `ctx`.
    pub(crate) fn audit(&self, ctx: &Context, registry: &mut Registry) {
        let constrained = ctx.ineq_constraints > 0;
        match self {
            Self::Conmin(o) => {
                registry.check("max_iterations", &o.max_iterations);
                registry.check("max_function_evaluations", &o.max_function_evaluations);
                registry.check("convergence_tolerance", &o.convergence_tolerance);
                if constrained {
                    registry.check("constraint_tolerance", &o.constraint_tolerance);
                }
            }
            Self::NpsolSqp(o) => {
                registry.check("convergence_tolerance", &o.convergence_tolerance);
                if constrained {
                    registry.check("constraint_tolerance", &o.constraint_tolerance);
                }
            }
            Self::OptppNewton(o) => {
                registry.check("max_iterations", &o.max_iterations);
                registry.check("convergence_tolerance", &o.convergence_tolerance);
            }
            Self::EfficientGlobal(o) => registry.check("seed", &o.seed),
            Self::Moga(o) => {
                registry.check("final_solutions", &o.final_solutions);
                registry.check("population_size", &o.population_size);
                registry.check("max_iterations", &o.max_iterations);
                registry.check("max_function_evaluations", &o.max_function_evaluations);
            }
            Self::Soga(o) => {
                registry.check("population_size", &o.population_size);
                registry.check("max_iterations", &o.max_iterations);
                registry.check("max_function_evaluations", &o.max_function_evaluations);
            }
        }
    }

    pub(crate) fn entries(&self, ctx: &Context) -> Result<Vec<Entry>, ConfigError> {
        let constrained = ctx.ineq_constraints + ctx.eq_constraints > 0;
        let mut entries = Vec::new();

        match self {
            Self::Conmin(o) => {
                entries.push(Entry::keyword(if constrained {
                    "conmin_mfd"
                } else {
                    "conmin_frcg"
                }));
                entries.push(Entry::assign(
                    "max_iterations",
                    *o.max_iterations.resolve("max_iterations")?,
                ));
                entries.push(Entry::assign(
                    "max_function_evaluations",
                    *o.max_function_evaluations
                        .resolve("max_function_evaluations")?,
                ));
                entries.push(Entry::assign(
                    "convergence_tolerance",
                    *o.convergence_tolerance.resolve("convergence_tolerance")?,
                ));
                push_constraint_tolerance(&mut entries, ctx, &o.constraint_tolerance)?;
            }
            Self::NpsolSqp(o) => {
                entries.push(Entry::keyword("npsol_sqp"));
                entries.push(Entry::assign(
                    "convergence_tolerance",
                    *o.convergence_tolerance.resolve("convergence_tolerance")?,
                ));
                push_constraint_tolerance(&mut entries, ctx, &o.constraint_tolerance)?;
            }
            Self::OptppNewton(o) => {
                entries.push(Entry::keyword("optpp_newton"));
                entries.push(Entry::assign(
                    "max_iterations",
                    *o.max_iterations.resolve("max_iterations")?,
                ));
                entries.push(Entry::assign(
                    "convergence_tolerance",
                    *o.convergence_tolerance.resolve("convergence_tolerance")?,
                ));
            }
            Self::EfficientGlobal(o) => {
                entries.push(Entry::keyword("efficient_global"));
                entries.push(Entry::assign("seed", *o.seed.resolve("seed")?));
            }
            Self::Moga(o) => {
                entries.push(Entry::keyword("moga"));
                entries.push(Entry::assign(
                    "final_solutions",
                    *o.final_solutions.resolve("final_solutions")?,
                ));
                push_genetic(
                    &mut entries,
                    &o.population_size,
                    &o.max_iterations,
                    &o.max_function_evaluations,
                )?;
            }
            Self::Soga(o) => {
                entries.push(Entry::keyword("soga"));
                entries.push(Entry::directive(
                    "convergence_type",
                    "average_fitness_tracker",
                ));
                push_genetic(
                    &mut entries,
                    &o.population_size,
                    &o.max_iterations,
                    &o.max_function_evaluations,
                )?;
            }
        }

        Ok(entries)
    }
}

/// Emits `constraint_tolerance` only when inequality constraints exist.
fn push_constraint_tolerance(
    entries: &mut Vec<Entry>,
    ctx: &Context,
    tolerance: &Deferred<f64>,
) -> Result<(), ConfigError> {
    if ctx.ineq_constraints > 0 {
        entries.push(Entry::assign(
            "constraint_tolerance",
            *tolerance.resolve("constraint_tolerance")?,
        ));
    }
    Ok(())
}

fn push_genetic(
    entries: &mut Vec<Entry>,
    population_size: &Deferred<u32>,
    max_iterations: &Deferred<u32>,
    max_function_evaluations: &Deferred<u32>,
) -> Result<(), ConfigError> {
    entries.push(Entry::assign(
        "population_size",
        *population_size.resolve("population_size")?,
    ));
    entries.push(Entry::assign(
        "max_iterations",
        *max_iterations.resolve("max_iterations")?,
    ));
    entries.push(Entry::assign(
        "max_function_evaluations",
        *max_function_evaluations.resolve("max_function_evaluations")?,
    ));
    entries.push(Entry::directive("replacement_type", "unique_roulette_wheel"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(Entry::key).collect()
    }

    fn context(ineq_constraints: usize) -> Context {
        Context {
            variables: 2,
            objectives: 1,
            eq_constraints: 0,
            ineq_constraints,
        }
    }

    #[test]
    fn conmin_picks_variant_from_constraints() {
        let conmin = Optimizer::Conmin(Conmin::default());

        let free = conmin.entries(&context(0)).unwrap();
        assert_eq!(free[0].key(), "conmin_frcg");

        let constrained = conmin.entries(&context(2)).unwrap();
        assert_eq!(constrained[0].key(), "conmin_mfd");
    }

    #[test]
    fn constraint_tolerance_dropped_without_inequalities() {
        let conmin = Optimizer::Conmin(Conmin::default());

        let free = conmin.entries(&context(0)).unwrap();
        assert!(!keys(&free).contains(&"constraint_tolerance"));

        let constrained = conmin.entries(&context(1)).unwrap();
        assert!(keys(&constrained).contains(&"constraint_tolerance"));
    }

    #[test]
    fn unset_tolerance_is_ignored_when_dropped() {
        let npsol = Optimizer::NpsolSqp(NpsolSqp {
            constraint_tolerance: Deferred::Unset,
            ..NpsolSqp::default()
        });

        let mut registry = Registry::new();
        npsol.audit(&context(0), &mut registry);
        assert!(registry.finish().is_ok());
        assert!(npsol.entries(&context(0)).is_ok());
        assert!(matches!(
            npsol.entries(&context(1)),
            Err(ConfigError::Unassigned { .. })
        ));
    }

    #[test]
    fn efficient_global_requires_seed() {
        let mut ego = EfficientGlobal::default();
        let mut registry = Registry::new();
        Optimizer::EfficientGlobal(ego.clone()).audit(&context(0), &mut registry);
        assert_eq!(
            registry.finish(),
            Err(ConfigError::Unassigned {
                fields: vec!["seed".into()]
            })
        );

        ego.seed.set(52983_u64);
        let entries = Optimizer::EfficientGlobal(ego).entries(&context(0)).unwrap();
        assert_eq!(entries[1].to_string(), "seed = 52983");
    }

    #[test]
    fn genetic_algorithms_share_population_settings() {
        let soga = Optimizer::Soga(Soga::default()).entries(&context(0)).unwrap();
        assert_eq!(
            keys(&soga),
            [
                "soga",
                "convergence_type",
                "population_size",
                "max_iterations",
                "max_function_evaluations",
                "replacement_type",
            ]
        );
        assert_eq!(
            soga.last().map(ToString::to_string).as_deref(),
            Some("replacement_type unique_roulette_wheel")
        );
    }
}
