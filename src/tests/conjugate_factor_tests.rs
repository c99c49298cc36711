use crate::core::{Argument, Domain, FGError, FactorFunction, FactorGraph, FactorGraphBuilder, RealDomain, Value};
use crate::gibbs::custom_factors::{ln_gamma, CustomExponential, CustomGamma, EdgeRole, ParameterSlot};
use crate::gibbs::samplers::SamplerFamily;
use crate::gibbs::GibbsGraph;
use crate::messages::{GammaParameters, ParameterMessage};
use crate::tests::utils::assert_close;

fn non_negative_variables(number: usize) -> FactorGraphBuilder {
    FactorGraphBuilder::new_with_variables(Domain::Real(RealDomain::non_negative()), number, 1)
}

// Gamma(x1, x2, x3 | 2, rate), the rate is variable 0
fn gamma_with_constant_shape(extra: &[Argument]) -> FactorGraph {
    let mut fgb = non_negative_variables(4);
    let mut arguments = vec![
        Argument::constant(2.0),
        Argument::var(0),
        Argument::var(1),
        Argument::var(2),
        Argument::var(3),
    ];
    arguments.extend_from_slice(extra);
    fgb.add_factor(FactorFunction::gamma(), &arguments).unwrap();
    fgb.build()
}

#[test]
fn gamma_rate_and_output_messages() {
    let fg = gamma_with_constant_shape(&[]);
    let factor = CustomGamma::new(&fg, 0).unwrap();
    let binding = factor.binding();
    assert_eq!(binding.parameters()[0], ParameterSlot::ModelConstant(2.0));
    assert_eq!(binding.conjugate_parameter_port(), Some(0));
    assert_eq!(binding.output_count(), 3);
    assert_eq!(factor.edge_role(0), EdgeRole::ConjugateParameter);
    assert_eq!(factor.edge_role(2), EdgeRole::Output);
    let samples = [0.5, 1., 2., 3.];
    assert_eq!(
        factor.update_edge(0, &samples[..]).unwrap(),
        Some(ParameterMessage::Gamma(GammaParameters::new(6., 6.)))
    );
    // an output gets Gamma(alpha, rate) at the current rate
    assert_eq!(
        factor.update_edge(1, &samples[..]).unwrap(),
        Some(ParameterMessage::Gamma(GammaParameters::new(1., 0.5)))
    );
    assert_eq!(factor.conjugate_samplers(0), [SamplerFamily::Gamma]);
    assert!(SamplerFamily::Gamma.is_compatible_with_domain(fg.variable(0).unwrap().domain()));
}

#[test]
fn constant_and_fixed_outputs() {
    let fg = gamma_with_constant_shape(&[Argument::constant(4.0)]);
    fg.fix_variable(3, Some(Value::Real(3.))).unwrap();
    let factor = CustomGamma::new(&fg, 0).unwrap();
    let binding = factor.binding();
    assert_eq!(binding.live_outputs(), [(1usize, 1usize), (2, 2)]);
    assert_eq!(binding.constant_output_count(), 2);
    assert_eq!(binding.constant_output_sum(), 7.);
    assert_eq!(binding.output_count(), 4);
    // a fixed output still sits on an output edge
    assert_eq!(factor.edge_role(3), EdgeRole::Output);
    let samples = [0.5, 1., 2., 100.];
    assert_eq!(
        factor.update_edge(0, &samples[..]).unwrap(),
        Some(ParameterMessage::Gamma(GammaParameters::new(8., 10.)))
    );
}

#[test]
fn live_shape_has_no_conjugate_update() {
    let mut fgb = non_negative_variables(3);
    fgb.add_factor(FactorFunction::gamma(), &[Argument::var(0), Argument::var(1), Argument::var(2)])
        .unwrap();
    let fg = fgb.build();
    let factor = CustomGamma::new(&fg, 0).unwrap();
    assert_eq!(factor.edge_role(0), EdgeRole::Other);
    assert_eq!(factor.edge_role(1), EdgeRole::ConjugateParameter);
    assert_eq!(factor.update_edge(0, &[3., 1., 1.][..]).unwrap(), None);
    assert!(factor.conjugate_samplers(0).is_empty());
    assert_eq!(
        factor.update_edge(1, &[3., 1., 2.][..]).unwrap(),
        Some(ParameterMessage::Gamma(GammaParameters::new(3., 2.)))
    );
}

#[test]
fn parameters_baked_into_function() {
    let mut fgb = non_negative_variables(2);
    fgb.add_factor(FactorFunction::gamma_with_parameters(3., 2.), &[Argument::var(0), Argument::var(1)])
        .unwrap();
    let fg = fgb.build();
    let factor = CustomGamma::new(&fg, 0).unwrap();
    assert_eq!(
        factor.binding().parameters(),
        [ParameterSlot::FunctionConstant(3.), ParameterSlot::FunctionConstant(2.)]
    );
    assert_eq!(factor.binding().conjugate_parameter_port(), None);
    assert_eq!(factor.edge_role(0), EdgeRole::Output);
    assert_eq!(
        factor.update_edge(1, &[1., 1.][..]).unwrap(),
        Some(ParameterMessage::Gamma(GammaParameters::new(2., 2.)))
    );
}

#[test]
fn fixing_the_rate_changes_the_binding() {
    let fg = gamma_with_constant_shape(&[]);
    let mut factor = CustomGamma::new(&fg, 0).unwrap();
    assert!(!factor.initialize(&fg).unwrap());
    fg.fix_variable(0, Some(Value::Real(2.))).unwrap();
    assert!(factor.initialize(&fg).unwrap());
    assert!(!factor.initialize(&fg).unwrap());
    assert_eq!(factor.binding().parameters()[1], ParameterSlot::ModelConstant(2.));
    assert_eq!(factor.edge_role(0), EdgeRole::Other);
    fg.fix_variable(0, None).unwrap();
    assert!(factor.initialize(&fg).unwrap());
    assert_eq!(factor.edge_role(0), EdgeRole::ConjugateParameter);
}

#[test]
fn non_numeric_constant() {
    let mut fgb = non_negative_variables(2);
    fgb.add_factor(
        FactorFunction::gamma(),
        &[Argument::constant(vec![1., 2.]), Argument::var(0), Argument::var(1)],
    )
    .unwrap();
    let fg = fgb.build();
    assert_eq!(
        CustomGamma::new(&fg, 0).unwrap_err(),
        FGError::NonNumericConstant { factor: 0, index: 0 }
    );
}

#[test]
fn exponential_messages() {
    let mut fgb = non_negative_variables(4);
    fgb.add_factor(
        FactorFunction::exponential(),
        &[Argument::var(0), Argument::var(1), Argument::var(2), Argument::var(3)],
    )
    .unwrap();
    let fg = fgb.build();
    let factor = CustomExponential::new(&fg, 0).unwrap();
    let samples = [0.25, 1., 2., 3.];
    assert_eq!(
        factor.update_edge(0, &samples[..]).unwrap(),
        Some(ParameterMessage::Gamma(GammaParameters::new(3., 6.)))
    );
    assert_eq!(
        factor.update_edge(3, &samples[..]).unwrap(),
        Some(ParameterMessage::Gamma(GammaParameters::new(0., 0.25)))
    );
    assert!(matches!(
        CustomGamma::new(&fg, 0),
        Err(FGError::UnsupportedFactor { factor: 0, .. })
    ));
}

#[test]
fn changed_binding_invalidates_edges() {
    let mut fgb = non_negative_variables(2);
    fgb.add_factor(FactorFunction::exponential(), &[Argument::var(0), Argument::var(1)])
        .unwrap();
    let fg = fgb.build();
    let mut gibbs = GibbsGraph::new(&fg).unwrap();
    let message = ParameterMessage::Gamma(GammaParameters::new(1., 1.));
    gibbs.set_factor_to_var_message(0, Some(message.clone())).unwrap();
    gibbs.set_factor_to_var_message(1, Some(message.clone())).unwrap();
    // an unchanged binding keeps edge states
    gibbs.initialize().unwrap();
    assert_eq!(gibbs.factor_to_var_message(0).unwrap(), Some(&message));
    fg.fix_variable(0, Some(Value::Real(1.5))).unwrap();
    gibbs.initialize().unwrap();
    assert_eq!(gibbs.factor_to_var_message(0).unwrap(), None);
    assert_eq!(gibbs.factor_to_var_message(1).unwrap(), None);
    gibbs.update_factor(0).unwrap();
    assert_eq!(gibbs.factor_to_var_message(0).unwrap(), None);
    assert_eq!(
        gibbs.factor_to_var_message(1).unwrap(),
        Some(&ParameterMessage::Gamma(GammaParameters::new(0., 1.5)))
    );
}

#[test]
fn gibbs_edge_reset_and_move() {
    let mut fgb = non_negative_variables(3);
    fgb.add_factor(FactorFunction::exponential(), &[Argument::var(0), Argument::var(1)])
        .unwrap();
    fgb.add_factor(FactorFunction::exponential(), &[Argument::var(0), Argument::var(2)])
        .unwrap();
    let fg = fgb.build();
    let mut gibbs = GibbsGraph::new(&fg).unwrap();
    gibbs.update_factor(0).unwrap();
    gibbs.update_factor(1).unwrap();
    let moved = gibbs.factor_to_var_message(0).unwrap().cloned();
    assert_eq!(moved, Some(ParameterMessage::Gamma(GammaParameters::new(1., 1.))));
    gibbs.move_messages(0, 1, 0, 0).unwrap();
    assert_eq!(gibbs.factor_to_var_message(2).unwrap().cloned(), moved);
    // a reset state keeps its family but carries no information
    assert_eq!(
        gibbs.factor_to_var_message(0).unwrap(),
        Some(&ParameterMessage::Gamma(GammaParameters::default()))
    );
    gibbs.reset_edge_messages(2).unwrap();
    assert_eq!(
        gibbs.factor_to_var_message(2).unwrap(),
        Some(&ParameterMessage::Gamma(GammaParameters::default()))
    );
    assert_eq!(gibbs.reset_edge_messages(7), Err(FGError::OutOfRangeEdge(4, 7)));
}

#[test]
fn factor_log_densities() {
    assert_close(ln_gamma(1.), 0., 1e-9);
    assert_close(ln_gamma(5.), 24f64.ln(), 1e-9);
    assert_close(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), 1e-9);
    assert_eq!(ln_gamma(0.), f64::INFINITY);
    // Gamma(x1, x2, x3 | 2, rate) at rate 3
    let fg = gamma_with_constant_shape(&[]);
    let factor = CustomGamma::new(&fg, 0).unwrap();
    let samples = [3., 1., 2., 0.5];
    let expected = [1f64, 2., 0.5]
        .iter()
        .map(|x| 2. * 3f64.ln() + x.ln() - 3. * x)
        .sum::<f64>();
    assert_close(factor.log_density(&samples[..]).unwrap(), expected, 1e-9);
    // outputs outside of the support
    assert_eq!(factor.log_density(&[3., 1., 0., 0.5][..]).unwrap(), f64::NEG_INFINITY);
    assert_eq!(factor.log_density(&[0., 1., 2., 0.5][..]).unwrap(), f64::NEG_INFINITY);
    // Exponential(1, 0.5 | 2) with a constant output
    let mut fgb = non_negative_variables(2);
    fgb.add_factor(
        FactorFunction::exponential(),
        &[Argument::var(0), Argument::var(1), Argument::constant(0.5)],
    )
    .unwrap();
    let fg = fgb.build();
    let factor = CustomExponential::new(&fg, 0).unwrap();
    assert_eq!(factor.binding().output_values(&[2., 1.][..]).unwrap(), [0.5, 1.]);
    assert_close(factor.log_density(&[2., 1.][..]).unwrap(), 2. * 2f64.ln() - 3., 1e-12);
}
