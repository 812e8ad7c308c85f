use std::fmt;

/// One scalar component of a named parameter or response.
///
/// Scalars are identified by name alone. Each element of a vector-valued name
/// carries its index, and is displayed as `name[i]`.
///
/// The index is stored alongside the name rather than encoded into it, so a
/// component never has to be recovered by parsing its display form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    name: String,
    index: Option<usize>,
}

impl ComponentId {
    /// Identifies a scalar.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Identifies element `index` of a vector.
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    /// Expands a name of the given size into its components.
    ///
    /// A size of one yields the scalar component, anything larger yields one
    /// indexed component per element.
    pub fn expand(name: &str, size: usize) -> Vec<Self> {
        if size == 1 {
            vec![Self::scalar(name)]
        } else {
            (0..size).map(|i| Self::indexed(name, i)).collect()
        }
    }

    /// Returns the parameter or response name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the element index, or `None` for a scalar.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Returns the position of this component within its name's values.
    #[must_use]
    pub fn position(&self) -> usize {
        self.index.unwrap_or(0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.name),
            None => f.write_str(&self.name),
        }
    }
}
