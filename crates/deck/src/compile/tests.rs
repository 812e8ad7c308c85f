use tether_core::{Parameter, Response};

use super::*;
use crate::{
    CenteredStudy, Conmin, Distribution, EfficientGlobal, ListStudy, Moga, PolynomialChaos,
    Sampling, Soga, Uncertain, Uncertainty, Value, VectorStudy,
};

/// Two bounded design parameters, one objective, one inequality constraint.
fn bounded_problem() -> Problem {
    Problem::new()
        .parameter(Parameter::scalar("x1", 1.0).with_bounds(0.0, 10.0))
        .parameter(Parameter::scalar("x2", 0.0).with_bounds(-5.0, 5.0))
        .objective(Response::scalar("f"))
        .ineq_constraint(Response::scalar("g"))
}

fn lines(compiled: &Compiled, kind: SectionKind) -> Vec<String> {
    compiled
        .deck()
        .section(kind)
        .flat_map(Block::entries)
        .map(ToString::to_string)
        .collect()
}

#[test]
fn conmin_end_to_end() {
    let compiled = Study::new(Conmin::default())
        .compile(&bounded_problem())
        .unwrap();

    let responses = lines(&compiled, SectionKind::Responses);
    assert!(responses.contains(&"objective_functions = 1".to_owned()));
    assert!(responses.contains(&"nonlinear_inequality_constraints = 1".to_owned()));

    let variables = lines(&compiled, SectionKind::Variables);
    assert_eq!(
        variables,
        [
            "continuous_design = 2",
            "initial_point 1 0",
            "lower_bounds 0 -5",
            "upper_bounds 10 5",
            "descriptors 'x1' 'x2'",
        ]
    );

    let method = lines(&compiled, SectionKind::Method);
    assert_eq!(method[0], "conmin_mfd");
    assert!(method.contains(&"constraint_tolerance = 1e-7".to_owned()));
    assert_eq!(method.last().map(String::as_str), Some("output = normal"));
}

#[test]
fn renders_the_whole_deck() {
    let problem = Problem::new()
        .parameter(Parameter::scalar("x", 0.5).with_bounds(0.0, 1.0))
        .objective(Response::scalar("f"));
    let study = Study::new(Soga::default()).with_tabular_data(false);

    let expected = "\
environment

method
  soga
  convergence_type average_fitness_tracker
  population_size = 100
  max_iterations = 2000
  max_function_evaluations = 999000
  replacement_type unique_roulette_wheel
  output = normal

model
  single

variables
  continuous_design = 1
    lower_bounds 0
    upper_bounds 1
    descriptors 'x'

responses
  objective_functions = 1
  descriptors 'f'
  no_gradients
  no_hessians
";
    assert_eq!(study.compile(&problem).unwrap().render(), expected);
}

#[test]
fn compiling_twice_is_byte_identical() {
    let study = Study::new(Conmin::default())
        .with_distribution(Uncertain::new("x2", Distribution::normal(0.0, 1.0)));
    let problem = bounded_problem();

    let first = study.compile(&problem).unwrap().render();
    let second = study.compile(&problem).unwrap().render();
    assert_eq!(first, second);
}

#[test]
fn compiling_does_not_change_the_study() {
    let study = Study::new(VectorStudy::new(vec![2.0, 2.0], 4));
    let before = study.clone();
    let compiled = study.compile(&bounded_problem()).unwrap();

    assert_eq!(study, before);
    assert_eq!(compiled.study(), &before);
}

#[test]
fn sections_follow_engine_order() {
    let compiled = Study::new(Conmin::default())
        .compile(&bounded_problem())
        .unwrap();
    let order: Vec<SectionKind> = compiled.deck().blocks().iter().map(Block::kind).collect();

    assert_eq!(
        order,
        [
            SectionKind::Environment,
            SectionKind::Method,
            SectionKind::Model,
            SectionKind::Variables,
            SectionKind::Responses,
        ]
    );
}

#[test]
fn vector_final_point_mismatch_fails_at_compile_time() {
    let study = Study::new(VectorStudy::new(vec![1.0, 2.0, 3.0], 5));
    assert_eq!(
        study.compile(&bounded_problem()),
        Err(ConfigError::mismatch("final_point", 3, "parameters", 2))
    );
}

#[test]
fn constraint_tolerance_dropped_without_inequalities() {
    let problem = Problem::new()
        .parameter(Parameter::scalar("x", 1.0).with_bounds(0.0, 2.0))
        .objective(Response::scalar("f"));
    let compiled = Study::new(Conmin::default()).compile(&problem).unwrap();

    let method = lines(&compiled, SectionKind::Method);
    assert_eq!(method[0], "conmin_frcg");
    assert!(method.iter().all(|line| !line.starts_with("constraint_tolerance")));
}

#[test]
fn every_unset_field_is_reported_at_once() {
    let study = Study::new(VectorStudy::default());
    assert_eq!(
        study.compile(&bounded_problem()),
        Err(ConfigError::Unassigned {
            fields: vec!["final_point".into(), "num_steps".into()]
        })
    );

    let study = Study::new(EfficientGlobal::default()).with_gradients(Gradients::numerical());
    let Gradients::Numerical(mut numerical) = study.gradients.clone() else {
        unreachable!();
    };
    numerical.fd_step_size = crate::Deferred::Unset;
    let study = study.with_gradients(Gradients::Numerical(numerical));
    assert_eq!(
        study.compile(&bounded_problem()),
        Err(ConfigError::Unassigned {
            fields: vec!["seed".into(), "fd_gradient_step_size".into()]
        })
    );
}

#[test]
fn no_entry_holds_an_unset_value() {
    let mut ego = EfficientGlobal::default();
    ego.seed.set(7_u64);
    let compiled = Study::new(ego).compile(&bounded_problem()).unwrap();

    for block in compiled.deck().blocks() {
        for entry in block.entries() {
            if let Some(Value::Word(word)) = entry.value() {
                assert!(!word.is_empty(), "empty value for {}", entry.key());
            }
        }
    }
    assert!(compiled.render().contains("seed = 7"));
}

#[test]
fn empty_problems_are_rejected() {
    let study = Study::new(Conmin::default());
    assert_eq!(
        study.compile(&Problem::new().objective(Response::scalar("f"))),
        Err(ConfigError::NoParameters)
    );
    assert_eq!(
        study.compile(&Problem::new().parameter(Parameter::scalar("x", 0.0))),
        Err(ConfigError::NoObjectives)
    );
}

#[test]
fn repeated_parameters_fail_to_compile() {
    let problem = bounded_problem().parameter(Parameter::scalar("x1", 3.0));
    assert_eq!(
        Study::new(Conmin::default()).compile(&problem),
        Err(ConfigError::DuplicateParameter("x1".into()))
    );
}

#[test]
fn empty_point_lists_fail_to_compile() {
    let study = Study::new(ListStudy::new(Vec::new()));
    assert_eq!(
        study.compile(&bounded_problem()),
        Err(ConfigError::mismatch("list_of_points", 0, "points", 1))
    );
}

#[test]
fn single_objective_methods_reject_several() {
    let problem = bounded_problem().objective(Response::scalar("cost"));

    assert!(matches!(
        Study::new(Soga::default()).compile(&problem),
        Err(ConfigError::TooManyObjectives { found: 2, .. })
    ));
    assert!(Study::new(Moga::default()).compile(&problem).is_ok());
}

#[test]
fn list_studies_count_response_functions() {
    let study = Study::new(ListStudy::new(vec![vec![0.0, 0.0], vec![1.0, -1.0]]));
    let compiled = study.compile(&bounded_problem()).unwrap();

    let responses = lines(&compiled, SectionKind::Responses);
    assert_eq!(responses[0], "response_functions = 2");
    let method = lines(&compiled, SectionKind::Method);
    assert!(method.contains(&"list_of_points = 0 0 1 -1".to_owned()));
}

#[test]
fn centered_studies_include_state_variables() {
    let problem = bounded_problem().parameter(Parameter::scalar("t", 300.0).as_state());
    let study = Study::new(CenteredStudy::new(vec![0.1, 0.1], vec![2, 2]));

    assert_eq!(
        study.compile(&problem),
        Err(ConfigError::mismatch("step_vector", 2, "parameters", 3))
    );

    let study = Study::new(CenteredStudy::new(vec![0.1, 0.1, 1.0], vec![2, 2, 1]));
    let compiled = study.compile(&problem).unwrap();
    assert!(lines(&compiled, SectionKind::Variables).contains(&"initial_state 300".to_owned()));
    assert_eq!(compiled.variables().descriptors(), ["x1", "x2", "t"]);
}

#[test]
fn sampling_makes_untagged_parameters_uniform() {
    let study = Study::new(Sampling::default())
        .with_distribution(Uncertain::new("x2", Distribution::gamma(2.0, 0.5)));
    let compiled = study.compile(&bounded_problem()).unwrap();

    let variables = lines(&compiled, SectionKind::Variables);
    assert!(variables.contains(&"uniform_uncertain = 1".to_owned()));
    assert!(variables.contains(&"gamma_uncertain = 1".to_owned()));
    assert_eq!(compiled.variables().descriptors(), ["x1", "x2"]);
}

#[test]
fn incomplete_distribution_fails() {
    let mut beta = Distribution::beta(2.0, 3.0, 0.0, 1.0);
    beta.upper = crate::Deferred::Unset;
    let study = Study::new(Sampling::default()).with_distribution(Uncertain::new("x1", beta));

    assert_eq!(
        study.compile(&bounded_problem()),
        Err(ConfigError::IncompleteDistribution {
            variable: "x1".into(),
            family: "beta",
            moment: "upper",
        })
    );
}

fn nested_study(compromise: bool) -> Study {
    let nested = Nested {
        compromise,
        ..Nested::new(Uncertainty::PolynomialChaos(PolynomialChaos::default()))
    };
    Study::new(Moga::default())
        .with_distribution(Uncertain::new("x2", Distribution::normal(0.0, 1.0)))
        .with_nested(nested)
}

#[test]
fn nested_study_links_outer_and_inner_blocks() {
    let compiled = nested_study(true).compile(&bounded_problem()).unwrap();
    let text = compiled.render();

    assert!(text.contains("top_method_pointer = 'opt'"));
    assert!(text.contains("sub_method_pointer = 'inner'"));
    assert!(text.contains("primary_variable_mapping 'x1'"));
    assert!(text.contains("primary_response_mapping 1 1 0 0"));
    assert!(text.contains("secondary_response_mapping 0 0 1 1"));
    assert!(text.contains("polynomial_chaos"));
    assert!(text.contains("output = silent"));

    assert_eq!(compiled.deck().section(SectionKind::Method).count(), 2);
    assert_eq!(compiled.deck().section(SectionKind::Variables).count(), 2);

    // the callback evaluates the inner model
    assert_eq!(compiled.variables().descriptors(), ["x2", "x1"]);
    assert_eq!(compiled.responses().descriptors(), ["f", "g"]);
}

#[test]
fn nested_study_without_compromise_has_two_objectives() {
    let compiled = nested_study(false).compile(&bounded_problem()).unwrap();
    let outer = compiled
        .deck()
        .section(SectionKind::Responses)
        .next()
        .map(|b| b.entries().iter().map(ToString::to_string).collect::<Vec<_>>())
        .unwrap();

    assert!(outer.contains(&"objective_functions = 2".to_owned()));
    assert!(outer.contains(&"descriptors 'f_mean' 'f_std_dev' 'g'".to_owned()));
    assert!(compiled.render().contains("primary_response_mapping 1 0 0 0 0 1 0 0"));
}

#[test]
fn nested_study_needs_an_optimizer_and_no_equalities() {
    let mut study = nested_study(true);
    study.method = Sampling::default().into();
    assert!(matches!(
        study.compile(&bounded_problem()),
        Err(ConfigError::Incompatible { .. })
    ));

    let problem = bounded_problem().eq_constraint(Response::scalar("h"));
    assert!(matches!(
        nested_study(true).compile(&problem),
        Err(ConfigError::Incompatible { .. })
    ));
}

#[test]
fn toml_study_matches_builder() {
    let from_toml: Study = toml::from_str(
        r#"
        output = "quiet"

        [method]
        kind = "parameter_study"
        method = "vector"
        final_point = [2.0, 3.0]
        num_steps = 4
        "#,
    )
    .unwrap();
    let built = Study::new(VectorStudy::new(vec![2.0, 3.0], 4)).with_output(Verbosity::Quiet);

    let problem = bounded_problem();
    assert_eq!(
        from_toml.compile(&problem).unwrap().render(),
        built.compile(&problem).unwrap().render()
    );
}
