//! Runs compiled studies against a model through an external engine.
//!
//! A [`Driver`] owns a [`Model`](tether_core::Model) and a study. Running it
//! compiles the study once, writes the deck, and hands the engine a
//! [`Bridge`] that answers each evaluation request by writing values into the
//! model, solving once, and packing the requested values and gradients.
//!
//! The engine itself is an [`Engine`] implementation supplied by the caller.

pub mod bridge;
pub mod config;
mod driver;
mod engine;
mod error;

pub use bridge::{Bridge, Derivative, EvalError, Reply, Request};
pub use config::{Settings, StudyFile};
pub use driver::Driver;
pub use engine::{Callback, Engine, Invocation};
pub use error::Error;
