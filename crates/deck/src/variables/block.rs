use tether_core::Parameter;

use crate::{
    ConfigError, Distribution, Entry, Family, MomentKind, Value, method::VariableNeeds,
};

/// A variables block, in the order the engine expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockKind {
    Design,
    Uncertain(Family),
    State,
}

impl BlockKind {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Design => "continuous_design",
            Self::State => "continuous_state",
            Self::Uncertain(family) => match family {
                Family::Normal => "normal_uncertain",
                Family::Lognormal => "lognormal_uncertain",
                Family::Uniform => "uniform_uncertain",
                Family::Exponential => "exponential_uncertain",
                Family::Beta => "beta_uncertain",
                Family::Gamma => "gamma_uncertain",
                Family::Weibull => "weibull_uncertain",
            },
        }
    }
}

/// A parameter placed in a block, with its distribution when uncertain.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Member {
    pub parameter: Parameter,
    pub distribution: Option<Distribution>,
}

/// The parameters of one block, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VariableBlock {
    pub kind: BlockKind,
    pub members: Vec<Member>,
}

impl VariableBlock {
    fn size(&self) -> usize {
        self.members.iter().map(|m| m.parameter.size()).sum()
    }

    fn values(&self) -> Vec<f64> {
        self.members
            .iter()
            .flat_map(|m| m.parameter.values.iter().copied())
            .collect()
    }

    fn descriptors(&self) -> Vec<String> {
        self.members
            .iter()
            .flat_map(|m| m.parameter.components())
            .map(|c| c.to_string())
            .collect()
    }

    pub(crate) fn entries(&self, needs: VariableNeeds) -> Result<Vec<Entry>, ConfigError> {
        let mut entries = vec![Entry::assign(self.kind.keyword(), self.size())];

        match self.kind {
            BlockKind::Design => {
                if needs.initial_point {
                    entries.push(Entry::directive("initial_point", self.values()).nested());
                }
                self.push_declared_bounds(&mut entries, needs.bounds)?;
            }
            BlockKind::State => {
                entries.push(Entry::directive("initial_state", self.values()).nested());
                self.push_declared_bounds(&mut entries, false)?;
            }
            BlockKind::Uncertain(family) => self.push_moments(&mut entries, family)?,
        }

        entries.push(
            Entry::directive("descriptors", Value::Descriptors(self.descriptors())).nested(),
        );
        Ok(entries)
    }

    /// Emits the parameters' own bounds.
    ///
    /// Required bounds must be declared by every member. Otherwise they are
    /// emitted only when every member declares them.
    fn push_declared_bounds(
        &self,
        entries: &mut Vec<Entry>,
        required: bool,
    ) -> Result<(), ConfigError> {
        let mut lower = Vec::with_capacity(self.size());
        let mut upper = Vec::with_capacity(self.size());

        for Member { parameter, .. } in &self.members {
            match (&parameter.lower, &parameter.upper) {
                (Some(lo), Some(hi)) => {
                    lower.extend(checked(lo, parameter, MomentKind::Lower)?);
                    upper.extend(checked(hi, parameter, MomentKind::Upper)?);
                }
                _ if required => {
                    return Err(ConfigError::MissingBounds {
                        variable: parameter.name.clone(),
                        block: self.kind.keyword(),
                    });
                }
                _ => return Ok(()),
            }
        }

        entries.push(Entry::directive("lower_bounds", lower).nested());
        entries.push(Entry::directive("upper_bounds", upper).nested());
        Ok(())
    }

    fn push_moments(&self, entries: &mut Vec<Entry>, family: Family) -> Result<(), ConfigError> {
        for &kind in family.required() {
            let mut values = Vec::with_capacity(self.size());
            for member in &self.members {
                let moment = member
                    .distribution
                    .as_ref()
                    .map(|d| d.moment(kind))
                    .and_then(|m| m.get())
                    .ok_or_else(|| ConfigError::IncompleteDistribution {
                        variable: member.parameter.name.clone(),
                        family: family.name(),
                        moment: kind.name(),
                    })?;
                let parameter = &member.parameter;
                values.extend(moment.expand(parameter.size(), &parameter.name, kind)?);
            }
            entries.push(Entry::directive(kind.keyword(), values).nested());
        }

        match family {
            Family::Uniform => self.push_uniform_bounds(entries),
            Family::Normal => self.push_truncation(entries),
            _ => Ok(()),
        }
    }

    /// Uniform bounds come from the distribution, or else from the parameter.
    fn push_uniform_bounds(&self, entries: &mut Vec<Entry>) -> Result<(), ConfigError> {
        let mut lower = Vec::with_capacity(self.size());
        let mut upper = Vec::with_capacity(self.size());

        for member in &self.members {
            lower.extend(self.uniform_bound(member, MomentKind::Lower)?);
            upper.extend(self.uniform_bound(member, MomentKind::Upper)?);
        }

        entries.push(Entry::directive("lower_bounds", lower).nested());
        entries.push(Entry::directive("upper_bounds", upper).nested());
        Ok(())
    }

    fn uniform_bound(&self, member: &Member, kind: MomentKind) -> Result<Vec<f64>, ConfigError> {
        let parameter = &member.parameter;
        if let Some(moment) = member.distribution.as_ref().and_then(|d| d.moment(kind).get()) {
            return moment.expand(parameter.size(), &parameter.name, kind);
        }

        let declared = match kind {
            MomentKind::Lower => parameter.lower.as_ref(),
            _ => parameter.upper.as_ref(),
        };
        match declared {
            Some(bound) => checked(bound, parameter, kind),
            None => Err(ConfigError::MissingBounds {
                variable: parameter.name.clone(),
                block: self.kind.keyword(),
            }),
        }
    }

    /// Normal bounds are optional. When any member is truncated, the others
    /// are written as unbounded.
    fn push_truncation(&self, entries: &mut Vec<Entry>) -> Result<(), ConfigError> {
        let truncated = self.members.iter().any(|m| {
            m.distribution
                .as_ref()
                .is_some_and(|d| d.lower.is_set() || d.upper.is_set())
        });
        if !truncated {
            return Ok(());
        }

        for (kind, unbounded) in [
            (MomentKind::Lower, f64::NEG_INFINITY),
            (MomentKind::Upper, f64::INFINITY),
        ] {
            let mut values = Vec::with_capacity(self.size());
            for member in &self.members {
                let size = member.parameter.size();
                match member.distribution.as_ref().and_then(|d| d.moment(kind).get()) {
                    Some(moment) => {
                        values.extend(moment.expand(size, &member.parameter.name, kind)?);
                    }
                    None => values.extend(std::iter::repeat_n(unbounded, size)),
                }
            }
            entries.push(Entry::directive(kind.keyword(), values).nested());
        }
        Ok(())
    }
}

fn checked(
    bound: &[f64],
    parameter: &Parameter,
    kind: MomentKind,
) -> Result<Vec<f64>, ConfigError> {
    if bound.len() == parameter.size() {
        Ok(bound.to_vec())
    } else {
        Err(ConfigError::mismatch(
            format!("{}.{}", parameter.name, kind.name()),
            bound.len(),
            "elements",
            parameter.size(),
        ))
    }
}
