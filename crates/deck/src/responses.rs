use tether_core::{ComponentId, Problem, Response};

use crate::{ConfigError, Entry, Gradients, Hessians, Value, method::FunctionCount};

/// What a response function stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseRole {
    Objective,
    Equality,
    Inequality,
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    component: ComponentId,
    role: ResponseRole,
    bound: Option<f64>,
}

/// The ordered list of scalar response functions the engine sees.
///
/// Functions are ordered objectives first, then equality constraints, then
/// inequality constraints. Active-set vectors index into this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseLayout {
    slots: Vec<Slot>,
}

impl ResponseLayout {
    /// Lays out the responses a problem declares.
    #[must_use]
    pub fn from_problem(problem: &Problem) -> Self {
        let mut layout = Self::default();
        layout.extend(&problem.objectives, ResponseRole::Objective);
        layout.extend(&problem.eq_constraints, ResponseRole::Equality);
        layout.extend(&problem.ineq_constraints, ResponseRole::Inequality);
        layout
    }

    fn extend(&mut self, responses: &[Response], role: ResponseRole) {
        for response in responses {
            for component in response.components() {
                self.push(component, role, response.bound);
            }
        }
    }

    pub(crate) fn push(&mut self, component: ComponentId, role: ResponseRole, bound: Option<f64>) {
        self.slots.push(Slot {
            component,
            role,
            bound,
        });
    }

    /// Number of scalar response functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&ComponentId> {
        self.slots.get(position).map(|s| &s.component)
    }

    #[must_use]
    pub fn role(&self, position: usize) -> Option<ResponseRole> {
        self.slots.get(position).map(|s| s.role)
    }

    /// Iterates the response components in engine order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentId> {
        self.slots.iter().map(|s| &s.component)
    }

    /// Number of scalar functions with `role`.
    #[must_use]
    pub fn count(&self, role: ResponseRole) -> usize {
        self.slots.iter().filter(|s| s.role == role).count()
    }

    #[must_use]
    pub fn descriptors(&self) -> Vec<String> {
        self.components().map(ToString::to_string).collect()
    }

    /// Bounds of the constraints with `role`, or `None` if no constraint
    /// declares one. Undeclared bounds are zero.
    fn bounds(&self, role: ResponseRole) -> Option<Vec<f64>> {
        let slots = self.slots.iter().filter(|s| s.role == role);
        if slots.clone().all(|s| s.bound.is_none()) {
            return None;
        }
        Some(slots.map(|s| s.bound.unwrap_or(0.0)).collect())
    }

    /// Builds the responses block.
    pub(crate) fn entries(
        &self,
        count: FunctionCount,
        gradients: &Gradients,
        hessians: Hessians,
    ) -> Result<Vec<Entry>, ConfigError> {
        let mut entries = Vec::new();

        match count {
            FunctionCount::Responses => {
                entries.push(Entry::assign("response_functions", self.len()));
            }
            FunctionCount::Objectives => {
                entries.push(Entry::assign(
                    "objective_functions",
                    self.count(ResponseRole::Objective),
                ));
                // Keyword order only. Descriptors and active-set vectors
                // follow the layout, where equality constraints come first.
                self.push_constraints(
                    &mut entries,
                    ResponseRole::Inequality,
                    "nonlinear_inequality_constraints",
                    "nonlinear_inequality_upper_bounds",
                );
                self.push_constraints(
                    &mut entries,
                    ResponseRole::Equality,
                    "nonlinear_equality_constraints",
                    "nonlinear_equality_targets",
                );
            }
        }

        entries.push(Entry::directive(
            "descriptors",
            Value::Descriptors(self.descriptors()),
        ));
        entries.extend(gradients.entries()?);
        entries.push(hessians.entry());
        Ok(entries)
    }

    fn push_constraints(
        &self,
        entries: &mut Vec<Entry>,
        role: ResponseRole,
        count_key: &str,
        bounds_key: &str,
    ) {
        let count = self.count(role);
        if count == 0 {
            return;
        }
        entries.push(Entry::assign(count_key, count));
        if let Some(bounds) = self.bounds(role) {
            entries.push(Entry::directive(bounds_key, bounds).nested());
        }
    }
}
