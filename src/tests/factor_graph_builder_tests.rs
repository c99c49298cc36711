use ndarray::{Array, IxDyn};

use crate::core::{
    Argument, DiscreteDomain, Domain, EdgeRef, FGBuilderError, FactorFunction, FactorGraphBuilder, FactorTable,
    RealDomain, Value,
};

fn binary_table(arity: usize) -> FactorFunction {
    let weights = Array::from_elem(IxDyn(&vec![2; arity]), 1f64);
    FactorFunction::Table(FactorTable::from_weights(&weights))
}

#[test]
fn small_factor_graph_builder_logic() {
    let mut fgb = FactorGraphBuilder::new_with_variables(Domain::Discrete(DiscreteDomain::range(0, 2)), 4, 3);
    let vars = |indices: &[usize]| indices.iter().map(|i| Argument::var(*i)).collect::<Vec<_>>();
    assert_eq!(fgb.add_factor(binary_table(3), &vars(&[0, 1, 3])).unwrap(), 0);
    assert_eq!(fgb.add_factor(binary_table(2), &vars(&[1, 2])).unwrap(), 1);
    assert_eq!(fgb.add_factor(binary_table(2), &vars(&[3, 1])).unwrap(), 2);
    let fg = fgb.build();
    assert_eq!(3, fg.factors_number());
    assert_eq!(4, fg.variables_number());
    assert_eq!(7, fg.edges_number());
    // --------------------------------------------------------------------------------------
    assert_eq!(fg.get_variable_degrees(), [1, 3, 1, 2]);
    assert_eq!(fg.get_factor_degrees(), [3, 2, 2]);
    // --------------------------------------------------------------------------------------
    assert_eq!(fg.factor(0).unwrap().siblings(), [0, 1, 3]);
    assert_eq!(fg.factor(1).unwrap().siblings(), [1, 2]);
    assert_eq!(fg.factor(2).unwrap().siblings(), [3, 1]);
    // --------------------------------------------------------------------------------------
    assert_eq!(fg.factor(0).unwrap().edges(), [0, 1, 2]);
    assert_eq!(fg.factor(1).unwrap().edges(), [3, 4]);
    assert_eq!(fg.factor(2).unwrap().edges(), [5, 6]);
    // --------------------------------------------------------------------------------------
    assert_eq!(fg.variable(0).unwrap().edges(), [0]);
    assert_eq!(fg.variable(1).unwrap().edges(), [1, 3, 6]);
    assert_eq!(fg.variable(2).unwrap().edges(), [4]);
    assert_eq!(fg.variable(3).unwrap().edges(), [2, 5]);
    // --------------------------------------------------------------------------------------
    assert_eq!(
        fg.edge(6).unwrap(),
        EdgeRef {
            factor: 2,
            variable: 1,
            factor_port: 1,
            variable_port: 2,
        }
    );
    assert_eq!(
        fg.edge(5).unwrap(),
        EdgeRef {
            factor: 2,
            variable: 3,
            factor_port: 0,
            variable_port: 1,
        }
    );
    for (id, edge) in fg.edges().iter().enumerate() {
        assert_eq!(fg.variable(edge.variable).unwrap().edges()[edge.variable_port], id);
        assert_eq!(fg.factor(edge.factor).unwrap().edges()[edge.factor_port], id);
    }
    assert!(fg.is_discrete_factor(0).unwrap());
}

#[test]
fn builder_errors() {
    let mut fgb = FactorGraphBuilder::new_with_variables(Domain::Discrete(DiscreteDomain::range(0, 2)), 4, 1);
    assert_eq!(
        fgb.add_factor(binary_table(2), &[Argument::var(0), Argument::var(7)]),
        Err(FGBuilderError::OutOfRangeVariable(4, 7))
    );
    assert_eq!(
        fgb.add_factor(binary_table(2), &[Argument::var(0), Argument::var(1), Argument::var(2)]),
        Err(FGBuilderError::ArityError {
            function: "Table".into(),
            arguments: 3,
        })
    );
    assert_eq!(
        fgb.add_factor(binary_table(2), &[Argument::var(1), Argument::var(1)]),
        Err(FGBuilderError::RepeatedVariable(1))
    );
    assert_eq!(
        fgb.add_factor(FactorFunction::gamma(), &[Argument::constant(1.0), Argument::var(0)]),
        Err(FGBuilderError::ArityError {
            function: "Gamma".into(),
            arguments: 2,
        })
    );
    // failed additions leave no trace
    let fg = fgb.build();
    assert_eq!(fg.factors_number(), 0);
    assert_eq!(fg.edges_number(), 0);
}

#[test]
fn constant_arguments() {
    let mut fgb = FactorGraphBuilder::new();
    let beta = fgb.add_variable(Domain::Real(RealDomain::non_negative()));
    let x = fgb.add_variable(Domain::Real(RealDomain::non_negative()));
    let f = fgb
        .add_factor(
            FactorFunction::gamma(),
            &[Argument::constant(2.0), Argument::var(beta), Argument::constant(0.5), Argument::var(x)],
        )
        .unwrap();
    let fg = fgb.build();
    let factor = fg.factor(f).unwrap();
    assert_eq!(factor.arity(), 4);
    assert_eq!(factor.sibling_count(), 2);
    assert!(factor.has_constants());
    assert!(factor.has_constant_at_index(0));
    assert!(!factor.has_constant_at_index(1));
    assert_eq!(factor.constant_indices(), [0, 2]);
    assert_eq!(factor.constant_values(), [&Value::Real(2.0), &Value::Real(0.5)]);
    assert_eq!(factor.constant_value_by_index(2), Some(&Value::Real(0.5)));
    assert_eq!(factor.arg_index_to_sibling_number(0), None);
    assert_eq!(factor.arg_index_to_sibling_number(1), Some(0));
    assert_eq!(factor.arg_index_to_sibling_number(3), Some(1));
    assert!(!fg.is_discrete_factor(f).unwrap());
}
