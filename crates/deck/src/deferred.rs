//! Values that must be supplied before a study can compile.
//!
//! A [`Deferred`] field is declared by a method or distribution but left for
//! the user to fill in. [`Deferred::resolve`] fails on an unset field, and a
//! [`Registry`] collects every unset field of a study so that compilation can
//! report them all before any section is built.

use serde::{Deserialize, Deserializer};

use crate::ConfigError;

/// A field that is either set or still waiting for a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred<T> {
    Unset,
    Set(T),
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> From<T> for Deferred<T> {
    fn from(value: T) -> Self {
        Self::Set(value)
    }
}

impl<T> Deferred<T> {
    /// Assigns the value.
    pub fn set(&mut self, value: impl Into<T>) {
        *self = Self::Set(value.into());
    }

    /// Returns `true` once a value has been assigned.
    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// Returns the value, if assigned.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }

    /// Returns the assigned value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unassigned`] naming `field` if no value was assigned.
    pub fn resolve(&self, field: &str) -> Result<&T, ConfigError> {
        self.get().ok_or_else(|| ConfigError::Unassigned {
            fields: vec![field.to_owned()],
        })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Deferred<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => Self::Set(value),
            None => Self::Unset,
        })
    }
}

/// Collects the names of unset fields across a whole study.
#[derive(Debug, Default)]
pub struct Registry {
    unset: Vec<String>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `field` if `value` is still unset.
    pub fn check<T>(&mut self, field: impl Into<String>, value: &Deferred<T>) {
        if !value.is_set() {
            self.unset.push(field.into());
        }
    }

    /// Fails if any checked field was unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unassigned`] listing every unset field, in the
    /// order they were checked.
    pub fn finish(self) -> Result<(), ConfigError> {
        if self.unset.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Unassigned { fields: self.unset })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fails_until_set() {
        let mut steps: Deferred<u32> = Deferred::Unset;
        assert_eq!(
            steps.resolve("num_steps"),
            Err(ConfigError::Unassigned {
                fields: vec!["num_steps".into()]
            })
        );

        steps.set(4_u32);
        assert_eq!(steps.resolve("num_steps"), Ok(&4));
    }

    #[test]
    fn registry_reports_every_unset_field() {
        let mut registry = Registry::new();
        registry.check("final_point", &Deferred::<Vec<f64>>::Unset);
        registry.check("seed", &Deferred::Set(7_u64));
        registry.check("num_steps", &Deferred::<u32>::Unset);

        assert_eq!(
            registry.finish(),
            Err(ConfigError::Unassigned {
                fields: vec!["final_point".into(), "num_steps".into()]
            })
        );
    }

    #[test]
    fn empty_registry_passes() {
        assert!(Registry::new().finish().is_ok());
    }

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default)]
        seed: Deferred<u64>,
    }

    #[test]
    fn deserializes_missing_as_unset() {
        let set: Holder = toml::from_str("seed = 3").unwrap();
        assert_eq!(set.seed, Deferred::Set(3));

        let unset: Holder = toml::from_str("").unwrap();
        assert_eq!(unset.seed, Deferred::Unset);
    }
}
