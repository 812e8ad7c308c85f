//! Routes engine evaluation requests into a model.
//!
//! Each request is validated in full before the model is touched: counts,
//! labels, derivative variables and active-set bits. Only then are the values
//! written and the model solved, exactly once per request.

mod error;
mod reply;
mod request;

use std::collections::HashMap;

use tether_core::{ComponentId, Model};
use tether_deck::{Compiled, ResponseLayout, VariableLayout};
use tracing::{debug, trace};

pub use error::{Derivative, EvalError};
pub use reply::Reply;
pub use request::{GRADIENT, HESSIAN, Request, VALUE};

use crate::Callback;

/// Evaluates engine requests against a model using a compiled study's layouts.
pub struct Bridge<'a, M: Model> {
    model: &'a mut M,
    variables: &'a VariableLayout,
    responses: &'a ResponseLayout,
}

impl<'a, M: Model> Bridge<'a, M> {
    pub fn new(model: &'a mut M, compiled: &'a Compiled) -> Self {
        Self {
            model,
            variables: compiled.variables(),
            responses: compiled.responses(),
        }
    }

    /// Handles one evaluation request.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] if the request does not match the layouts, a
    /// label is unknown, a derivative is requested that the model cannot
    /// provide, or the model itself fails.
    pub fn evaluate(&mut self, request: &Request) -> Result<Reply, EvalError> {
        self.check_shape(request)?;
        self.reject_hessians(request)?;
        let assignments = self.resolve(request)?;
        let wrt = if request.requests(GRADIENT) {
            self.derivative_variables(&request.dvv)?
        } else {
            Vec::new()
        };

        for (component, value) in &assignments {
            self.model
                .set_value(component, *value)
                .map_err(EvalError::model)?;
        }
        self.model.solve().map_err(EvalError::model)?;

        let reply = self.collect(request, &wrt)?;
        debug!(
            eval_id = request.eval_id,
            values = reply.fns.len(),
            gradients = reply.fn_grads.len() / wrt.len().max(1),
            "evaluated"
        );
        Ok(reply)
    }

    fn check_shape(&self, request: &Request) -> Result<(), EvalError> {
        EvalError::check("functions", request.functions, self.responses.len())?;
        EvalError::check("asv", request.asv.len(), request.functions)?;
        EvalError::check(
            "variables",
            request.variables,
            request.cv.len() + request.div.len() + request.drv.len(),
        )?;
        EvalError::check("cv", request.cv.len(), self.variables.len())?;
        EvalError::check("div", request.div.len(), 0)?;
        EvalError::check("drv", request.drv.len(), 0)?;
        if !request.cv_labels.is_empty() {
            EvalError::check("cv_labels", request.cv_labels.len(), request.cv.len())?;
        }
        Ok(())
    }

    fn reject_hessians(&self, request: &Request) -> Result<(), EvalError> {
        match request.asv.iter().position(|mask| mask & HESSIAN != 0) {
            Some(i) => Err(EvalError::Unsupported {
                order: Derivative::Hessian,
                response: self.response_name(i),
            }),
            None => Ok(()),
        }
    }

    /// Pairs each incoming value with the component it belongs to.
    ///
    /// Every layout slot is assigned exactly once: the counts already match,
    /// so rejecting repeated labels leaves no slot unwritten.
    fn resolve(&self, request: &Request) -> Result<Vec<(ComponentId, f64)>, EvalError> {
        let mut assigned = vec![false; self.variables.len()];
        let mut assignments = Vec::with_capacity(request.cv.len());

        for (i, &value) in request.cv.iter().enumerate() {
            let position = match request.cv_labels.get(i) {
                Some(label) => self
                    .variables
                    .position(label)
                    .ok_or_else(|| EvalError::UnknownLabel(label.clone()))?,
                None => i,
            };
            let (Some(component), Some(seen)) =
                (self.variables.get(position), assigned.get_mut(position))
            else {
                return Err(EvalError::DimensionMismatch {
                    field: "cv",
                    actual: request.cv.len(),
                    expected: self.variables.len(),
                });
            };
            if *seen {
                return Err(EvalError::DuplicateLabel(component.to_string()));
            }
            *seen = true;

            trace!(%component, value, "assign");
            assignments.push((component.clone(), value));
        }

        Ok(assignments)
    }

    fn derivative_variables(&self, dvv: &[usize]) -> Result<Vec<ComponentId>, EvalError> {
        if dvv.is_empty() {
            return Ok(self.variables.components().cloned().collect());
        }
        dvv.iter()
            .map(|&index| {
                index
                    .checked_sub(1)
                    .and_then(|i| self.variables.get(i))
                    .cloned()
                    .ok_or(EvalError::DerivativeVariable {
                        index,
                        variables: self.variables.len(),
                    })
            })
            .collect()
    }

    /// Walks the response functions in layout order and packs what the
    /// active-set vector asks for.
    fn collect(&self, request: &Request, wrt: &[ComponentId]) -> Result<Reply, EvalError> {
        let mut values: HashMap<&str, Vec<f64>> = HashMap::new();
        let mut reply = Reply {
            gradient_width: wrt.len(),
            ..Reply::default()
        };

        for (i, (component, &mask)) in self.responses.components().zip(&request.asv).enumerate() {
            if mask & VALUE != 0 {
                let name = component.name();
                if !values.contains_key(name) {
                    values.insert(name, self.fetch(name)?);
                }
                let value = values
                    .get(name)
                    .and_then(|v| v.get(component.position()))
                    .copied()
                    .ok_or_else(|| EvalError::UnknownLabel(component.to_string()))?;
                reply.fns.push(value);
            }

            if mask & GRADIENT != 0 {
                let row = self
                    .model
                    .gradient(component, wrt)
                    .map_err(EvalError::model)?
                    .ok_or_else(|| EvalError::Unsupported {
                        order: Derivative::Gradient,
                        response: self.response_name(i),
                    })?;
                EvalError::check("gradient", row.len(), wrt.len())?;
                reply.fn_grads.extend(row);
            }
        }

        Ok(reply)
    }

    /// Reads a response and checks it has one value per declared component.
    fn fetch(&self, name: &str) -> Result<Vec<f64>, EvalError> {
        let values = self.model.response(name).map_err(EvalError::model)?;
        let declared = self
            .responses
            .components()
            .filter(|c| c.name() == name)
            .count();
        EvalError::check("response values", values.len(), declared)?;
        Ok(values)
    }

    fn response_name(&self, position: usize) -> String {
        self.responses
            .get(position)
            .map_or_else(|| format!("function {position}"), ToString::to_string)
    }
}

impl<M: Model> Callback for Bridge<'_, M> {
    fn evaluate(&mut self, request: &Request) -> Result<Reply, EvalError> {
        Bridge::evaluate(self, request)
    }
}
