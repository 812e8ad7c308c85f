use serde::Deserialize;

use crate::{ConfigError, Deferred, Entry, Registry};

/// Uncertainty quantification methods.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Uncertainty {
    Sampling(Sampling),
    PolynomialChaos(PolynomialChaos),
    StochCollocation(StochCollocation),
    FsuQuasiMc(FsuQuasiMc),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    #[default]
    Lhs,
    Random,
}

impl SampleType {
    fn keyword(self) -> &'static str {
        match self {
            Self::Lhs => "lhs",
            Self::Random => "random",
        }
    }
}

/// Monte Carlo or Latin hypercube sampling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Sampling {
    pub sample_type: SampleType,
    pub samples: Deferred<u32>,
    pub seed: Option<u64>,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            sample_type: SampleType::Lhs,
            samples: Deferred::Set(100),
            seed: None,
        }
    }
}

/// Polynomial chaos expansion by tensor-product quadrature.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PolynomialChaos {
    pub quadrature_order: Deferred<u32>,
}

impl Default for PolynomialChaos {
    fn default() -> Self {
        Self {
            quadrature_order: Deferred::Set(10),
        }
    }
}

/// Stochastic collocation on a sparse grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StochCollocation {
    pub sparse_grid_level: Deferred<u32>,
}

impl Default for StochCollocation {
    fn default() -> Self {
        Self {
            sparse_grid_level: Deferred::Set(3),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sequence {
    #[default]
    Halton,
    Hammersley,
}

/// Quasi-Monte Carlo sampling with a low-discrepancy sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FsuQuasiMc {
    pub sequence: Sequence,
    pub samples: Deferred<u32>,
    pub latinize: bool,
}

impl Default for FsuQuasiMc {
    fn default() -> Self {
        Self {
            sequence: Sequence::Halton,
            samples: Deferred::Set(100),
            latinize: true,
        }
    }
}

impl Uncertainty {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sampling(_) => "sampling",
            Self::PolynomialChaos(_) => "polynomial_chaos",
            Self::StochCollocation(_) => "stoch_collocation",
            Self::FsuQuasiMc(_) => "fsu_quasi_mc",
        }
    }

    pub(crate) fn audit(&self, registry: &mut Registry) {
        match self {
            Self::Sampling(m) => registry.check("samples", &m.samples),
            Self::PolynomialChaos(m) => registry.check("quadrature_order", &m.quadrature_order),
            Self::StochCollocation(m) => {
                registry.check("sparse_grid_level", &m.sparse_grid_level);
            }
            Self::FsuQuasiMc(m) => registry.check("samples", &m.samples),
        }
    }

    pub(crate) fn entries(&self) -> Result<Vec<Entry>, ConfigError> {
        let entries = match self {
            Self::Sampling(m) => {
                let mut entries = vec![
                    Entry::keyword("sampling"),
                    Entry::directive("sample_type", m.sample_type.keyword()),
                ];
                if let Some(seed) = m.seed {
                    entries.push(Entry::assign("seed", seed));
                }
                entries.push(Entry::assign("samples", *m.samples.resolve("samples")?));
                entries
            }
            Self::PolynomialChaos(m) => vec![
                Entry::keyword("polynomial_chaos"),
                Entry::assign(
                    "quadrature_order",
                    *m.quadrature_order.resolve("quadrature_order")?,
                ),
            ],
            Self::StochCollocation(m) => vec![
                Entry::keyword("stoch_collocation"),
                Entry::assign(
                    "sparse_grid_level",
                    *m.sparse_grid_level.resolve("sparse_grid_level")?,
                ),
            ],
            Self::FsuQuasiMc(m) => {
                let sequence = match m.sequence {
                    Sequence::Halton => "halton",
                    Sequence::Hammersley => "hammersley",
                };
                let mut entries = vec![Entry::directive("fsu_quasi_mc", sequence)];
                if m.latinize {
                    entries.push(Entry::keyword("latinize"));
                }
                entries.push(Entry::assign("samples", *m.samples.resolve("samples")?));
                entries
            }
        };
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(method: &Uncertainty) -> Vec<String> {
        method
            .entries()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn sampling_seed_is_optional() {
        let unseeded = Uncertainty::Sampling(Sampling::default());
        assert_eq!(
            render(&unseeded),
            ["sampling", "sample_type lhs", "samples = 100"]
        );

        let seeded = Uncertainty::Sampling(Sampling {
            sample_type: SampleType::Random,
            seed: Some(52983),
            ..Sampling::default()
        });
        assert_eq!(
            render(&seeded),
            ["sampling", "sample_type random", "seed = 52983", "samples = 100"]
        );
    }

    #[test]
    fn quasi_monte_carlo_names_its_sequence() {
        let method = Uncertainty::FsuQuasiMc(FsuQuasiMc::default());
        assert_eq!(
            render(&method),
            ["fsu_quasi_mc halton", "latinize", "samples = 100"]
        );
    }

    #[test]
    fn unset_samples_fail() {
        let method = Uncertainty::Sampling(Sampling {
            samples: Deferred::Unset,
            ..Sampling::default()
        });
        assert!(matches!(
            method.entries(),
            Err(ConfigError::Unassigned { .. })
        ));
    }
}
