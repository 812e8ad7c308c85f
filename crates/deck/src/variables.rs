//! Partitions a problem's parameters into engine variable blocks.
//!
//! Every parameter is expanded into scalar [`ComponentId`](tether_core::ComponentId)s and placed in
//! exactly one block. Blocks are emitted in a fixed order, and the
//! [`VariableLayout`] recording that order is what the evaluation bridge uses
//! to route values back into the model.

mod block;
mod layout;

use std::collections::{BTreeMap, HashMap};

use tether_core::{ParameterKind, Problem};

pub use block::BlockKind;
pub use layout::VariableLayout;

use block::{Member, VariableBlock};

use crate::{ConfigError, Distribution, Entry, Family, Uncertain, method::VariableNeeds};

/// Which variables block of a study is being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// The only variables block of a flat study.
    Single,
    /// The outer optimizer's block of a nested study: design parameters only.
    Outer,
    /// The inner sampler's block of a nested study: design parameters become
    /// state, tagged parameters stay uncertain.
    Inner,
}

/// Classified variable blocks and the layout they define.
#[derive(Debug, Clone)]
pub(crate) struct Variables {
    blocks: Vec<VariableBlock>,
    layout: VariableLayout,
}

impl Variables {
    pub(crate) fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    pub(crate) fn into_layout(self) -> VariableLayout {
        self.layout
    }

    /// Builds the entries of every block, in block order.
    pub(crate) fn entries(&self, needs: VariableNeeds) -> Result<Vec<Entry>, ConfigError> {
        let mut entries = Vec::new();
        for block in &self.blocks {
            entries.extend(block.entries(needs)?);
        }
        Ok(entries)
    }
}

/// Assigns each parameter of `problem` to a block.
///
/// `uniform_default` places untagged design parameters in a uniform block,
/// as uncertainty studies need every varied parameter to be uncertain.
pub(crate) fn classify(
    problem: &Problem,
    distributions: &[Uncertain],
    role: Role,
    uniform_default: bool,
) -> Result<Variables, ConfigError> {
    let tags = index_distributions(problem, distributions)?;
    let mut grouped: BTreeMap<BlockKind, Vec<Member>> = BTreeMap::new();

    for parameter in &problem.parameters {
        let tag = tags.get(parameter.name.as_str()).copied();
        let placement = match (role, tag, parameter.kind) {
            (Role::Outer, Some(_), _) | (Role::Outer, None, ParameterKind::State) => None,
            (Role::Outer, None, ParameterKind::Design) => Some((BlockKind::Design, None)),
            (_, Some(uncertain), _) => Some((
                BlockKind::Uncertain(uncertain.family()),
                Some(uncertain.distribution.clone()),
            )),
            (Role::Inner, None, _) | (_, None, ParameterKind::State) => {
                Some((BlockKind::State, None))
            }
            (Role::Single, None, ParameterKind::Design) if uniform_default => Some((
                BlockKind::Uncertain(Family::Uniform),
                Some(Distribution::uniform()),
            )),
            (Role::Single, None, ParameterKind::Design) => Some((BlockKind::Design, None)),
        };

        if let Some((kind, distribution)) = placement {
            grouped.entry(kind).or_default().push(Member {
                parameter: parameter.clone(),
                distribution,
            });
        }
    }

    let mut layout = VariableLayout::default();
    let blocks: Vec<VariableBlock> = grouped
        .into_iter()
        .map(|(kind, members)| VariableBlock { kind, members })
        .collect();

    for block in &blocks {
        for member in &block.members {
            for component in member.parameter.components() {
                layout.push(component, block.kind)?;
            }
        }
    }

    Ok(Variables { blocks, layout })
}

/// Maps parameter names to their distributions, rejecting tags for unknown
/// parameters and parameters tagged twice.
fn index_distributions<'a>(
    problem: &Problem,
    distributions: &'a [Uncertain],
) -> Result<HashMap<&'a str, &'a Uncertain>, ConfigError> {
    let mut tags = HashMap::new();
    for uncertain in distributions {
        if problem.find_parameter(&uncertain.parameter).is_none() {
            return Err(ConfigError::UnknownParameter(uncertain.parameter.clone()));
        }
        if tags.insert(uncertain.parameter.as_str(), uncertain).is_some() {
            return Err(ConfigError::DuplicateDistribution(
                uncertain.parameter.clone(),
            ));
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use tether_core::Parameter;

    use super::*;

    const OPTIMIZER: VariableNeeds = VariableNeeds {
        initial_point: true,
        bounds: true,
    };

    fn render(variables: &Variables, needs: VariableNeeds) -> Vec<String> {
        variables
            .entries(needs)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn design_block_lists_bounds_in_declaration_order() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("x", 1.0).with_bounds(0.0, 10.0))
            .parameter(Parameter::scalar("y", 2.0).with_bounds(-5.0, 5.0));

        let variables = classify(&problem, &[], Role::Single, false).unwrap();
        assert_eq!(
            render(&variables, OPTIMIZER),
            [
                "continuous_design = 2",
                "initial_point 1 2",
                "lower_bounds 0 -5",
                "upper_bounds 10 5",
                "descriptors 'x' 'y'",
            ]
        );
    }

    #[test]
    fn missing_required_bounds_fail() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("x", 1.0).with_bounds(0.0, 1.0))
            .parameter(Parameter::scalar("y", 2.0));

        let variables = classify(&problem, &[], Role::Single, false).unwrap();
        assert_eq!(
            variables.entries(OPTIMIZER),
            Err(ConfigError::MissingBounds {
                variable: "y".into(),
                block: "continuous_design",
            })
        );
    }

    #[test]
    fn vector_parameters_expand_into_indexed_components() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("x", 0.0))
            .parameter(Parameter::vector("z", vec![1.0, 2.0, 3.0]));

        let variables = classify(&problem, &[], Role::Single, false).unwrap();
        assert_eq!(variables.layout().descriptors(), ["x", "z[0]", "z[1]", "z[2]"]);
    }

    #[test]
    fn blocks_follow_engine_order() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("s", 4.0).as_state())
            .parameter(Parameter::scalar("w", 1.0))
            .parameter(Parameter::scalar("n", 0.0))
            .parameter(Parameter::scalar("x", 1.0).with_bounds(0.0, 2.0));
        let tags = [
            Uncertain::new("w", Distribution::weibull(1.5, 2.0)),
            Uncertain::new("n", Distribution::normal(0.0, 1.0)),
        ];

        let variables = classify(&problem, &tags, Role::Single, false).unwrap();
        let headers: Vec<String> = render(&variables, OPTIMIZER)
            .into_iter()
            .filter(|line| line.contains(" = "))
            .collect();

        assert_eq!(
            headers,
            [
                "continuous_design = 1",
                "normal_uncertain = 1",
                "weibull_uncertain = 1",
                "continuous_state = 1",
            ]
        );
        assert_eq!(variables.layout().descriptors(), ["x", "n", "w", "s"]);
    }

    #[test]
    fn gamma_parameters_get_a_gamma_block() {
        let problem = Problem::new().parameter(Parameter::vector("load", vec![1.0, 1.0]));
        let tags = [Uncertain::new(
            "load",
            Distribution::gamma(vec![2.0, 3.0], 0.5),
        )];

        let variables = classify(&problem, &tags, Role::Single, true).unwrap();
        assert_eq!(
            render(&variables, OPTIMIZER),
            [
                "gamma_uncertain = 2",
                "alphas 2 3",
                "betas 0.5 0.5",
                "descriptors 'load[0]' 'load[1]'",
            ]
        );
    }

    #[test]
    fn untagged_parameters_default_to_uniform() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("x", 0.5).with_bounds(0.0, 1.0))
            .parameter(Parameter::scalar("y", 0.5));

        let variables = classify(&problem, &[], Role::Single, true).unwrap();
        assert_eq!(
            variables.entries(OPTIMIZER),
            Err(ConfigError::MissingBounds {
                variable: "y".into(),
                block: "uniform_uncertain",
            })
        );
    }

    #[test]
    fn partially_truncated_normals_are_unbounded_elsewhere() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("a", 0.0))
            .parameter(Parameter::scalar("b", 0.0));
        let tags = [
            Uncertain::new("a", Distribution::normal(0.0, 1.0).with_bounds(-2.0, 2.0)),
            Uncertain::new("b", Distribution::normal(1.0, 0.1)),
        ];

        let variables = classify(&problem, &tags, Role::Single, false).unwrap();
        let lines = render(&variables, OPTIMIZER);
        assert!(lines.contains(&"lower_bounds -2 -inf".to_owned()));
        assert!(lines.contains(&"upper_bounds 2 inf".to_owned()));
    }

    #[test]
    fn nested_roles_split_design_and_uncertain() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("x", 1.0).with_bounds(0.0, 2.0))
            .parameter(Parameter::scalar("u", 0.0));
        let tags = [Uncertain::new("u", Distribution::normal(0.0, 1.0))];

        let outer = classify(&problem, &tags, Role::Outer, false).unwrap();
        assert_eq!(outer.layout().descriptors(), ["x"]);

        let inner = classify(&problem, &tags, Role::Inner, false).unwrap();
        assert_eq!(inner.layout().descriptors(), ["u", "x"]);
        assert_eq!(inner.layout().block(1), Some(BlockKind::State));
    }

    #[test]
    fn distribution_tags_must_name_a_single_known_parameter() {
        let problem = Problem::new().parameter(Parameter::scalar("x", 0.0));

        let unknown = [Uncertain::new("y", Distribution::exponential(1.0))];
        assert_eq!(
            classify(&problem, &unknown, Role::Single, false).map(|_| ()),
            Err(ConfigError::UnknownParameter("y".into()))
        );

        let twice = [
            Uncertain::new("x", Distribution::exponential(1.0)),
            Uncertain::new("x", Distribution::exponential(2.0)),
        ];
        assert_eq!(
            classify(&problem, &twice, Role::Single, false).map(|_| ()),
            Err(ConfigError::DuplicateDistribution("x".into()))
        );
    }

    #[test]
    fn repeated_parameter_names_are_rejected() {
        let problem = Problem::new()
            .parameter(Parameter::scalar("x", 0.0).with_bounds(-1.0, 1.0))
            .parameter(Parameter::scalar("x", 1.0).with_bounds(-1.0, 1.0));
        assert_eq!(
            classify(&problem, &[], Role::Single, false).map(|_| ()),
            Err(ConfigError::DuplicateParameter("x".into()))
        );

        let problem = Problem::new()
            .parameter(Parameter::vector("z", vec![0.0, 1.0]))
            .parameter(Parameter::scalar("z[0]", 2.0));
        assert_eq!(
            classify(&problem, &[], Role::Single, false).map(|_| ()),
            Err(ConfigError::DuplicateParameter("z[0]".into()))
        );
    }
}
