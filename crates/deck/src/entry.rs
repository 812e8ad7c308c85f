use std::fmt;

/// A concrete value carried by an [`Entry`].
///
/// There is no "unset" variant: deferred fields are resolved before entries
/// are built, so a value that reaches a deck is always defined.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    /// An unquoted keyword token, such as `lhs` or `forward`.
    Word(String),
    /// A single-quoted identifier, such as a block id.
    Quoted(String),
    Ints(Vec<i64>),
    Reals(Vec<f64>),
    /// A list of single-quoted descriptors.
    Descriptors(Vec<String>),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Word(value.to_string()), Self::Int)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Word(value.to_string()), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Word(value.to_owned())
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Self::Reals(values)
    }
}

impl From<&[f64]> for Value {
    fn from(values: &[f64]) -> Self {
        Self::Reals(values.to_vec())
    }
}

impl From<&[u32]> for Value {
    fn from(values: &[u32]) -> Self {
        Self::Ints(values.iter().copied().map(i64::from).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => f.write_str(&format_real(*v)),
            Self::Word(w) => f.write_str(w),
            Self::Quoted(q) => write!(f, "'{q}'"),
            Self::Ints(vs) => join(f, vs.iter().map(ToString::to_string)),
            Self::Reals(vs) => join(f, vs.iter().map(|v| format_real(*v))),
            Self::Descriptors(ds) => join(f, ds.iter().map(|d| format!("'{d}'"))),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, tokens: impl Iterator<Item = String>) -> fmt::Result {
    for (i, token) in tokens.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        f.write_str(&token)?;
    }
    Ok(())
}

/// Formats a real the way the deck expects it.
///
/// Magnitudes between `1e-4` and `1e15` use plain decimal notation, anything
/// else uses exponent notation. Both forms round-trip exactly.
#[must_use]
pub fn format_real(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || (1e-4..1e15).contains(&magnitude) || !value.is_finite() {
        format!("{value}")
    } else {
        format!("{value:e}")
    }
}

/// How an entry is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    /// Just the key, with no value.
    Bare,
    /// `key = value`.
    Assign(Value),
    /// `key value`, for keywords whose value is written without `=`.
    Directive(Value),
}

/// One line of a deck section.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    key: String,
    form: Form,
    depth: usize,
}

impl Entry {
    /// Creates a bare keyword entry.
    pub fn keyword(key: impl Into<String>) -> Self {
        Self::with_form(key, Form::Bare)
    }

    /// Creates a `key = value` entry.
    pub fn assign(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with_form(key, Form::Assign(value.into()))
    }

    /// Creates a `key value` entry.
    pub fn directive(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with_form(key, Form::Directive(value.into()))
    }

    /// Creates a `key = 'id'` entry.
    pub fn id(key: impl Into<String>, id: &str) -> Self {
        Self::assign(key, Value::Quoted(id.to_owned()))
    }

    fn with_form(key: impl Into<String>, form: Form) -> Self {
        Self {
            key: key.into(),
            form,
            depth: 0,
        }
    }

    /// Indents this entry one level under the entry before it.
    #[must_use]
    pub fn nested(mut self) -> Self {
        self.depth += 1;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the value, or `None` for a bare keyword.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match &self.form {
            Form::Bare => None,
            Form::Assign(value) | Form::Directive(value) => Some(value),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.form {
            Form::Bare => f.write_str(&self.key),
            Form::Assign(value) => write!(f, "{} = {value}", self.key),
            Form::Directive(value) => write!(f, "{} {value}", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_form() {
        assert_eq!(Entry::keyword("no_gradients").to_string(), "no_gradients");
        assert_eq!(
            Entry::assign("objective_functions", 1_usize).to_string(),
            "objective_functions = 1"
        );
        assert_eq!(
            Entry::directive("interval_type", "forward").to_string(),
            "interval_type forward"
        );
        assert_eq!(
            Entry::id("id_method", "opt").to_string(),
            "id_method = 'opt'"
        );
    }

    #[test]
    fn renders_lists() {
        let bounds = Entry::directive("lower_bounds", vec![0.0, -5.0, 2.5]);
        assert_eq!(bounds.to_string(), "lower_bounds 0 -5 2.5");

        let names = Entry::directive(
            "descriptors",
            Value::Descriptors(vec!["x".into(), "z[1]".into()]),
        );
        assert_eq!(names.to_string(), "descriptors 'x' 'z[1]'");

        let partitions = Entry::assign("partitions", &[2_u32, 4][..]);
        assert_eq!(partitions.to_string(), "partitions = 2 4");
    }

    #[test]
    fn formats_reals_compactly() {
        assert_eq!(format_real(10.0), "10");
        assert_eq!(format_real(0.25), "0.25");
        assert_eq!(format_real(1e-7), "1e-7");
        assert_eq!(format_real(-2e20), "-2e20");
        assert_eq!(format_real(0.0), "0");
    }

    #[test]
    fn bare_entries_have_no_value() {
        assert!(Entry::keyword("single").value().is_none());
        assert_eq!(
            Entry::assign("samples", 100_u32).value(),
            Some(&Value::Int(100))
        );
    }
}
