#[cfg(test)]
mod tests;

use tether_core::{ComponentId, Problem};
use tracing::{debug, info};

use crate::{
    ConfigError, Deck, Entry, Gradients, Hessians, Nested, Registry, ResponseLayout, ResponseRole,
    Study, VariableLayout, Verbosity,
    deck::{Block, SectionKind},
    environment,
    method::{Context, FunctionCount, Method, StudyKind},
    model::{self, ids},
    variables::{Role, classify},
};

/// A study frozen together with the deck compiled from it.
///
/// The layouts describe the variables and response functions the engine will
/// send and expect back during evaluation. For nested studies these are the
/// inner model's, since that is the model the callback evaluates.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    study: Study,
    deck: Deck,
    variables: VariableLayout,
    responses: ResponseLayout,
}

impl Compiled {
    #[must_use]
    pub fn study(&self) -> &Study {
        &self.study
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn variables(&self) -> &VariableLayout {
        &self.variables
    }

    #[must_use]
    pub fn responses(&self) -> &ResponseLayout {
        &self.responses
    }

    /// Renders the deck text.
    #[must_use]
    pub fn render(&self) -> String {
        self.deck.render()
    }
}

impl Study {
    /// Compiles this study against a problem snapshot.
    ///
    /// Every deferred field and distribution is checked before any section
    /// is built, so a study either compiles completely or not at all. The
    /// study itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn compile(&self, problem: &Problem) -> Result<Compiled, ConfigError> {
        if problem.variable_count() == 0 {
            return Err(ConfigError::NoParameters);
        }
        if problem.objective_count() == 0 {
            return Err(ConfigError::NoObjectives);
        }

        let compiled = match &self.nested {
            None => self.compile_single(problem)?,
            Some(nested) => self.compile_nested(problem, nested)?,
        };

        info!(
            method = self.method.name(),
            variables = compiled.variables.len(),
            functions = compiled.responses.len(),
            nested = self.nested.is_some(),
            "compiled study"
        );
        Ok(compiled)
    }

    fn check_deferred(&self, ctx: &Context) -> Result<(), ConfigError> {
        let mut registry = Registry::new();
        self.audit(ctx, &mut registry);
        registry.finish()?;
        for uncertain in &self.distributions {
            uncertain.validate()?;
        }
        Ok(())
    }

    fn compile_single(&self, problem: &Problem) -> Result<Compiled, ConfigError> {
        let uniform_default = self.kind() == StudyKind::UncertaintyQuantification;
        let variables = classify(problem, &self.distributions, Role::Single, uniform_default)?;
        let responses = ResponseLayout::from_problem(problem);
        let ctx = Context {
            variables: variables.layout().len(),
            objectives: problem.objective_count(),
            eq_constraints: problem.eq_constraint_count(),
            ineq_constraints: problem.ineq_constraint_count(),
        };

        self.check_deferred(&ctx)?;
        self.method.validate(&ctx, &self.gradients, self.hessians)?;

        let deck = Deck::new(vec![
            Block::new(
                SectionKind::Environment,
                environment::entries(self.tabular_data, false),
            ),
            Block::new(SectionKind::Method, self.method.entries(&ctx, self.output)?),
            Block::new(SectionKind::Model, model::single()),
            Block::new(
                SectionKind::Variables,
                variables.entries(self.method.needs())?,
            ),
            Block::new(
                SectionKind::Responses,
                responses.entries(
                    self.method.function_count(),
                    &self.gradients,
                    self.hessians,
                )?,
            ),
        ]);

        Ok(Compiled {
            study: self.clone(),
            deck,
            variables: variables.into_layout(),
            responses,
        })
    }

    fn compile_nested(&self, problem: &Problem, nested: &Nested) -> Result<Compiled, ConfigError> {
        if self.kind() != StudyKind::Optimization {
            return Err(ConfigError::incompatible(format!(
                "nested studies need an optimization method, found {}",
                self.method.name()
            )));
        }
        if problem.eq_constraint_count() > 0 {
            return Err(ConfigError::incompatible(
                "nested studies do not support equality constraints",
            ));
        }
        if problem.objective_count() != 1 {
            return Err(ConfigError::incompatible(format!(
                "nested studies need exactly one objective function, found {}",
                problem.objective_count()
            )));
        }
        if self.distributions.is_empty() {
            return Err(ConfigError::incompatible(
                "nested studies need at least one uncertain parameter",
            ));
        }

        let outer_variables = classify(problem, &self.distributions, Role::Outer, false)?;
        if outer_variables.layout().is_empty() {
            return Err(ConfigError::incompatible(
                "nested studies need at least one design parameter",
            ));
        }
        let inner_variables = classify(problem, &self.distributions, Role::Inner, false)?;

        let inner_responses = ResponseLayout::from_problem(problem);
        let outer_responses = outer_responses(problem, nested);

        let outer_ctx = Context {
            variables: outer_variables.layout().len(),
            objectives: nested.outer_objectives(),
            eq_constraints: 0,
            ineq_constraints: problem.ineq_constraint_count(),
        };
        let inner_ctx = Context {
            variables: inner_variables.layout().len(),
            objectives: problem.objective_count(),
            eq_constraints: 0,
            ineq_constraints: problem.ineq_constraint_count(),
        };

        self.check_deferred(&outer_ctx)?;
        self.method.validate(&outer_ctx, &self.gradients, self.hessians)?;

        let inner_method = Method::Uncertainty(nested.inner.clone());
        debug!(
            inner = inner_method.name(),
            inner_functions = inner_responses.len(),
            compromise = nested.compromise,
            "building nested model"
        );

        let deck = Deck::new(vec![
            Block::new(
                SectionKind::Environment,
                environment::entries(self.tabular_data, true),
            ),
            Block::new(
                SectionKind::Method,
                with_ids(
                    [("id_method", ids::OUTER_METHOD), ("model_pointer", ids::OUTER_MODEL)],
                    self.method.entries(&outer_ctx, self.output)?,
                ),
            ),
            Block::new(
                SectionKind::Method,
                with_ids(
                    [("id_method", ids::INNER_METHOD), ("model_pointer", ids::INNER_MODEL)],
                    inner_method.entries(&inner_ctx, Verbosity::Silent)?,
                ),
            ),
            Block::new(
                SectionKind::Model,
                model::outer(
                    nested,
                    outer_variables.layout().descriptors(),
                    inner_responses.len(),
                ),
            ),
            Block::new(SectionKind::Model, model::inner()),
            Block::new(
                SectionKind::Variables,
                with_ids(
                    [("id_variables", ids::OUTER_VARIABLES)],
                    outer_variables.entries(self.method.needs())?,
                ),
            ),
            Block::new(
                SectionKind::Variables,
                with_ids(
                    [("id_variables", ids::INNER_VARIABLES)],
                    inner_variables.entries(inner_method.needs())?,
                ),
            ),
            Block::new(
                SectionKind::Responses,
                with_ids(
                    [("id_responses", ids::OUTER_RESPONSES)],
                    outer_responses.entries(
                        FunctionCount::Objectives,
                        &self.gradients,
                        self.hessians,
                    )?,
                ),
            ),
            Block::new(
                SectionKind::Responses,
                with_ids(
                    [("id_responses", ids::INNER_RESPONSES)],
                    inner_responses.entries(
                        FunctionCount::Responses,
                        &Gradients::None,
                        Hessians::None,
                    )?,
                ),
            ),
        ]);

        Ok(Compiled {
            study: self.clone(),
            deck,
            variables: inner_variables.into_layout(),
            responses: inner_responses,
        })
    }
}

/// The functions the outer optimizer sees: the objective statistic (or the
/// mean and standard deviation separately), then the constraint statistics.
fn outer_responses(problem: &Problem, nested: &Nested) -> ResponseLayout {
    let mut layout = ResponseLayout::default();
    for objective in &problem.objectives {
        if nested.compromise {
            layout.push(
                ComponentId::scalar(objective.name.as_str()),
                ResponseRole::Objective,
                None,
            );
        } else {
            for statistic in ["mean", "std_dev"] {
                layout.push(
                    ComponentId::scalar(format!("{}_{statistic}", objective.name)),
                    ResponseRole::Objective,
                    None,
                );
            }
        }
    }
    for constraint in &problem.ineq_constraints {
        for component in constraint.components() {
            layout.push(component, ResponseRole::Inequality, constraint.bound);
        }
    }
    layout
}

fn with_ids<const N: usize>(ids: [(&str, &str); N], entries: Vec<Entry>) -> Vec<Entry> {
    ids.into_iter()
        .map(|(key, id)| Entry::id(key, id))
        .chain(entries)
        .collect()
}
