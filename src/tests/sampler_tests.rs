use rand::{rngs::StdRng, SeedableRng};

use crate::core::{Datum, Domain, FGError, RealDomain, RealJointDomain, Value};
use crate::gibbs::samplers::{normalize_to_simplex, ConjugateSampler, DirichletSampler, GammaSampler, SamplerFamily};
use crate::gibbs::RandomWalk;
use crate::messages::{DirichletParameters, GammaParameters, ParameterMessage};
use crate::tests::utils::{assert_close, ScriptedDraws};

#[test]
fn dirichlet_aggregation() {
    let mut sampler = DirichletSampler::new();
    let mut parameters = sampler.create_parameter_message();
    assert_eq!(parameters.size(), 0);
    let message = ParameterMessage::Dirichlet(DirichletParameters::from_alpha_minus_one(vec![1., 1.]));
    let empty = ParameterMessage::Dirichlet(DirichletParameters::default());
    let input = Datum::Dirichlet(DirichletParameters::from_alpha_minus_one(vec![2., 3.]));
    sampler
        .aggregate_parameters(&mut parameters, &[Some(&message), None, Some(&empty)], &[&input])
        .unwrap();
    assert_eq!(sampler.dimension(), Some(2));
    assert_eq!(parameters.alpha_minus_one(), [3., 4.]);
    // a conditioning value adds nothing but its dimension
    let value = Datum::Value(Value::RealJoint(vec![2., 5.]));
    sampler
        .aggregate_parameters(&mut parameters, &[Some(&message)], &[&value])
        .unwrap();
    assert_eq!(parameters.alpha_minus_one(), [1., 1.]);
    let mut sampler = DirichletSampler::new();
    sampler
        .aggregate_parameters(&mut parameters, &[None], &[&value])
        .unwrap();
    assert_eq!(sampler.dimension(), Some(2));
    assert_eq!(parameters.alpha_minus_one(), [0., 0.]);
    let longer = Datum::Value(Value::RealJoint(vec![0.2, 0.3, 0.5]));
    assert!(matches!(
        sampler.aggregate_parameters(&mut parameters, &[], &[&longer]),
        Err(FGError::DimensionMismatch { expected: 2, found: 3, .. })
    ));
}

#[test]
fn dirichlet_dimension_errors() {
    let mut sampler = DirichletSampler::with_dimension(3);
    let mut parameters = sampler.create_parameter_message();
    let message = ParameterMessage::Dirichlet(DirichletParameters::from_alpha_minus_one(vec![1., 1., 1.]));
    let input = Datum::Dirichlet(DirichletParameters::from_alpha_minus_one(vec![1., 1.]));
    assert!(matches!(
        sampler.aggregate_parameters(&mut parameters, &[Some(&message)], &[&input]),
        Err(FGError::DimensionMismatch { expected: 3, found: 2, .. })
    ));
    let mut sampler = DirichletSampler::new();
    assert!(matches!(
        sampler.aggregate_parameters(&mut parameters, &[None], &[]),
        Err(FGError::UnknownDimension(_))
    ));
    let gamma = ParameterMessage::Gamma(GammaParameters::new(1., 1.));
    assert_eq!(
        sampler.aggregate_parameters(&mut parameters, &[Some(&gamma)], &[]),
        Err(FGError::MessageFamilyMismatch {
            expected: "Dirichlet".into(),
            found: "Gamma".into(),
        })
    );
}

#[test]
fn all_zero_draws_give_a_dominant_dimension() {
    let mut draws = ScriptedDraws::new(vec![0.], 2);
    let sampler = DirichletSampler::with_dimension(4);
    let sample = sampler
        .next_sample(&DirichletParameters::from_concentration(&[1e-3; 4]), &mut draws)
        .unwrap();
    assert_eq!(sample.len(), 4);
    assert_eq!(sample.iter().sum::<f64>(), 1.);
    for (i, x) in sample.iter().enumerate() {
        assert!(*x > 0.);
        if i != 2 {
            assert!(*x < sample[2]);
        }
    }
}

#[test]
fn partially_zero_draws_stay_positive() {
    let mut draws = ScriptedDraws::new(vec![], 0);
    let sample = normalize_to_simplex(vec![0., 1., 3.], &mut draws);
    assert!(sample.iter().all(|x| *x > 0.));
    assert_close(sample.iter().sum::<f64>(), 1., 1e-15);
    assert_close(sample[1], 0.25, 1e-15);
    assert_close(sample[2], 0.75, 1e-15);
    let sample = normalize_to_simplex(vec![2., 6.], &mut draws);
    assert_eq!(sample, [0.25, 0.75]);
}

#[test]
fn dirichlet_samples_lie_on_simplex() {
    let mut rng = StdRng::seed_from_u64(7);
    let sampler = DirichletSampler::with_dimension(3);
    let parameters = DirichletParameters::from_concentration(&[0.5, 2., 10.]);
    let mut mean = [0f64; 3];
    let samples_number = 20000;
    for _ in 0..samples_number {
        let sample = sampler.next_sample(&parameters, &mut rng).unwrap();
        assert_close(sample.iter().sum::<f64>(), 1., 1e-12);
        mean.iter_mut().zip(&sample).for_each(|(m, x)| *m += x / samples_number as f64);
    }
    assert_close(mean[0], 0.5 / 12.5, 0.01);
    assert_close(mean[1], 2. / 12.5, 0.01);
    assert_close(mean[2], 10. / 12.5, 0.01);
}

#[test]
fn gamma_aggregation() {
    let mut sampler = GammaSampler;
    let mut parameters = sampler.create_parameter_message();
    let message = ParameterMessage::Gamma(GammaParameters::new(3., 6.));
    let prior = Datum::Gamma(GammaParameters::from_shape_and_rate(1., 1.));
    sampler
        .aggregate_parameters(&mut parameters, &[Some(&message), None], &[&prior])
        .unwrap();
    assert_eq!(parameters, GammaParameters::new(3., 7.));
    assert_eq!(
        sampler.aggregate_parameters(&mut parameters, &[], &[&Datum::Normal { mean: 0., precision: 1. }]),
        Err(FGError::UnsupportedInput {
            family: "Gamma".into(),
            found: "Normal".into(),
        })
    );
    let dirichlet = ParameterMessage::Dirichlet(DirichletParameters::new(2));
    assert_eq!(
        sampler.aggregate_parameters(&mut parameters, &[Some(&dirichlet)], &[]),
        Err(FGError::MessageFamilyMismatch {
            expected: "Gamma".into(),
            found: "Dirichlet".into(),
        })
    );
}

#[test]
fn gamma_samples() {
    let mut rng = StdRng::seed_from_u64(42);
    let sampler = GammaSampler;
    let parameters = GammaParameters::from_shape_and_rate(10., 5.);
    let samples_number = 20000;
    let mean = (0..samples_number)
        .map(|_| sampler.next_sample(&parameters, &mut rng).unwrap())
        .sum::<f64>()
        / samples_number as f64;
    assert_close(mean, 2., 0.02);
    assert!(matches!(
        sampler.next_sample(&GammaParameters::default(), &mut rng),
        Err(FGError::InvalidDistribution(_))
    ));
    assert!(matches!(
        sampler.next_sample(&GammaParameters::new(1., -1.), &mut rng),
        Err(FGError::InvalidDistribution(_))
    ));
}

#[test]
fn domain_and_input_compatibility() {
    let non_negative = Domain::Real(RealDomain::non_negative());
    let bounded = Domain::Real(RealDomain::new(0., 10.));
    let positive = Domain::Real(RealDomain::new(1., f64::INFINITY));
    assert!(SamplerFamily::Gamma.is_compatible_with_domain(&non_negative));
    assert!(SamplerFamily::Gamma.is_compatible_with_domain(&Domain::Real(RealDomain::unbounded())));
    assert!(!SamplerFamily::Gamma.is_compatible_with_domain(&bounded));
    assert!(!SamplerFamily::Gamma.is_compatible_with_domain(&positive));
    assert!(!SamplerFamily::Dirichlet.is_compatible_with_domain(&non_negative));
    assert!(SamplerFamily::Dirichlet.is_compatible_with_domain(&Domain::RealJoint(RealJointDomain::unit_cube(3))));
    assert!(!SamplerFamily::Dirichlet.is_compatible_with_domain(&Domain::RealJoint(RealJointDomain::uniform(
        3,
        RealDomain::new(0., 0.5)
    ))));
    let gamma = Datum::Gamma(GammaParameters::default());
    assert!(SamplerFamily::Gamma.is_compatible_with_input(None));
    assert!(SamplerFamily::Gamma.is_compatible_with_input(Some(&gamma)));
    assert!(SamplerFamily::Gamma.is_compatible_with_input(Some(&Datum::Value(Value::Real(1.)))));
    assert!(!SamplerFamily::Dirichlet.is_compatible_with_input(Some(&gamma)));
}

#[test]
fn random_walk_steps() {
    let walk = RandomWalk::default();
    let domain = RealDomain::non_negative();
    let mut draws = ScriptedDraws::new(vec![1.], 0);
    // log-density of Normal(0, 1)
    let normal = |x: f64| Ok(-0.5 * x * x);
    draws.normal_draw = -0.5;
    assert_eq!(walk.step(1., &domain, normal, &mut draws).unwrap(), 0.5);
    // a move losing 4 in log-density is rejected when the uniform draw is 0.5
    draws.normal_draw = 2.;
    assert_eq!(walk.step(1., &domain, normal, &mut draws).unwrap(), 1.);
    draws.uniform_draw = 0.01;
    assert_eq!(walk.step(0., &domain, normal, &mut draws).unwrap(), 2.);
    // proposals outside of the domain are rejected
    draws.normal_draw = -3.;
    assert_eq!(walk.step(1., &domain, normal, &mut draws).unwrap(), 1.);
    // a state of zero density moves to any admissible proposal
    let walk = RandomWalk::new(0.5);
    draws.normal_draw = 1.;
    draws.uniform_draw = 0.99;
    let shifted = |x: f64| Ok(if x < 1. { f64::NEG_INFINITY } else { -x });
    assert_eq!(walk.step(0.75, &domain, shifted, &mut draws).unwrap(), 1.25);
    draws.normal_draw = -1.;
    assert_eq!(walk.step(0.75, &domain, shifted, &mut draws).unwrap(), 0.75);
    let failing = |_: f64| Err(FGError::SingularMatrix);
    assert_eq!(walk.step(0.75, &domain, failing, &mut draws), Err(FGError::SingularMatrix));
}
