/// Active-set bit requesting a function value.
pub const VALUE: u8 = 1;

/// Active-set bit requesting a gradient.
pub const GRADIENT: u8 = 2;

/// Active-set bit requesting a Hessian.
pub const HESSIAN: u8 = 4;

/// One evaluation request from the engine.
///
/// Values arrive as parallel value and label vectors per variable type. Only
/// continuous variables are supported; the discrete vectors must be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    /// Number of response functions the engine expects.
    pub functions: usize,
    /// Total number of variables across all vectors.
    pub variables: usize,
    pub cv: Vec<f64>,
    pub div: Vec<i64>,
    pub drv: Vec<f64>,
    /// Continuous variable labels. When empty, values are taken positionally.
    pub cv_labels: Vec<String>,
    pub div_labels: Vec<String>,
    pub drv_labels: Vec<String>,
    /// One active-set bitmask per response function.
    pub asv: Vec<u8>,
    /// One-based indices of the variables to differentiate with respect to.
    /// When empty, gradients are taken with respect to every continuous
    /// variable.
    pub dvv: Vec<usize>,
    pub eval_id: u64,
}

impl Request {
    /// Builds a request for continuous values in layout order.
    #[must_use]
    pub fn continuous(cv: Vec<f64>, asv: Vec<u8>) -> Self {
        Self {
            functions: asv.len(),
            variables: cv.len(),
            cv,
            asv,
            ..Self::default()
        }
    }

    /// Attaches labels to the continuous values.
    #[must_use]
    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.cv_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts gradients to the given one-based variable indices.
    #[must_use]
    pub fn with_dvv(mut self, dvv: Vec<usize>) -> Self {
        self.dvv = dvv;
        self
    }

    #[must_use]
    pub fn with_eval_id(mut self, eval_id: u64) -> Self {
        self.eval_id = eval_id;
        self
    }

    /// Returns `true` if any function has `bit` set.
    #[must_use]
    pub fn requests(&self, bit: u8) -> bool {
        self.asv.iter().any(|mask| mask & bit != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_request_counts_from_inputs() {
        let request = Request::continuous(vec![1.0, 2.0], vec![1, 3, 0]);
        assert_eq!(request.functions, 3);
        assert_eq!(request.variables, 2);
        assert!(request.requests(GRADIENT));
        assert!(!request.requests(HESSIAN));
    }
}
