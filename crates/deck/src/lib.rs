//! Compiles study descriptions into section-based input decks.
//!
//! A [`Study`] names a method and how derivatives are obtained. Compiling it
//! against a [`Problem`](tether_core::Problem) snapshot checks every deferred
//! field, classifies the parameters into variable blocks, and renders an
//! immutable [`Deck`] with its sections in engine order:
//!
//! 1. environment
//! 2. method
//! 3. model
//! 4. variables
//! 5. responses
//!
//! The resulting [`Compiled`] study also carries the [`VariableLayout`] and
//! [`ResponseLayout`] an evaluation callback needs to route values back into
//! the model.

mod compile;
mod deck;
mod deferred;
mod distribution;
mod entry;
mod environment;
mod error;
pub mod method;
mod model;
mod responses;
mod study;
mod variables;

pub use compile::Compiled;
pub use deck::{Block, Deck, SectionKind};
pub use deferred::{Deferred, Registry};
pub use distribution::{Distribution, Family, Moment, MomentKind, Uncertain};
pub use entry::{Entry, Form, Value, format_real};
pub use error::ConfigError;
pub use method::{
    CenteredStudy, Conmin, EfficientGlobal, FsuQuasiMc, ListStudy, Method, Moga, MultidimStudy,
    NpsolSqp, OptppNewton, Optimizer, ParameterStudy, PolynomialChaos, SampleType, Sampling,
    Sequence, Soga, StochCollocation, StudyKind, Uncertainty, VectorStudy,
};
pub use responses::{ResponseLayout, ResponseRole};
pub use study::{
    Gradients, Hessians, IntervalType, MethodSource, Nested, NumericalGradients, Study, Verbosity,
};
pub use variables::{BlockKind, VariableLayout};
