//! Core traits and types shared by the tether crates.
//!
//! This crate defines the surface a hosting model exposes to a study:
//!
//! - [`Model`]: named parameters that can be written, a forward solve, and
//!   named responses that can be read back
//! - [`Problem`]: a snapshot of the parameters and responses a model declares
//! - [`ComponentId`]: one scalar component of a possibly vector-valued name

mod component;
mod model;
mod problem;

pub use component::ComponentId;
pub use model::Model;
pub use problem::{Parameter, ParameterKind, Problem, Response};
