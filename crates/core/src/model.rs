use crate::{ComponentId, Problem};

/// A model that an external study engine drives through named values.
///
/// The model owns its parameter and response bookkeeping. A study only reads
/// the declared [`Problem`], writes parameter values, triggers a forward solve,
/// and reads responses back.
pub trait Model {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns a snapshot of the declared parameters and responses.
    fn problem(&self) -> Problem;

    /// Writes one scalar parameter component.
    ///
    /// # Errors
    ///
    /// Returns an error if the component does not exist or the value is rejected.
    fn set_value(&mut self, component: &ComponentId, value: f64) -> Result<(), Self::Error>;

    /// Runs a single forward solve with the current parameter values.
    ///
    /// # Errors
    ///
    /// Returns an error if the solve fails.
    fn solve(&mut self) -> Result<(), Self::Error>;

    /// Reads the current values of a response, one per scalar component.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be evaluated.
    fn response(&self, name: &str) -> Result<Vec<f64>, Self::Error>;

    /// Computes the gradient of one response component with respect to `wrt`.
    ///
    /// Returns `Ok(None)` when the model has no gradient wiring, which is the
    /// default. Implementations that return `Some` must provide one partial
    /// derivative per entry of `wrt`, in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the gradient cannot be computed.
    fn gradient(
        &self,
        response: &ComponentId,
        wrt: &[ComponentId],
    ) -> Result<Option<Vec<f64>>, Self::Error> {
        let _ = (response, wrt);
        Ok(None)
    }
}
