/// The outputs of one evaluation.
///
/// `fns` holds one value per function whose value bit was set, in function
/// order. `fn_grads` holds one gradient row per function whose gradient bit
/// was set, in function order, each row with one entry per derivative
/// variable, concatenated into a flat vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub fns: Vec<f64>,
    pub fn_grads: Vec<f64>,
    /// Length of each gradient row.
    pub gradient_width: usize,
}

impl Reply {
    /// Iterates the gradient rows.
    pub fn gradients(&self) -> impl Iterator<Item = &[f64]> {
        self.fn_grads.chunks(self.gradient_width.max(1))
    }
}
