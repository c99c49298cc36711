use crate::core::{
    Datum, DiscreteDomain, Domain, FGError, FactorGraphBuilder, RandomSource, RealDomain, SolverConfig, SolverContext,
    Value,
};
use crate::messages::GammaParameters;

#[test]
fn handles_are_released() {
    let mut fgb = FactorGraphBuilder::new();
    let x = fgb.add_variable(Domain::Discrete(DiscreteDomain::range(0, 3)));
    let fg = fgb.build();
    fg.fix_variable(x, Some(Value::Int(1))).unwrap();
    assert!(!fg.has_open_known_data_handles());
    {
        let known = fg.prior_and_condition(x);
        assert!(fg.has_open_known_data_handles());
        assert_eq!(known.fixed_value(), Some(&Value::Int(1)));
        assert_eq!(known.value(), Some(&Value::Int(1)));
        assert!(known.prior().is_none());
    }
    assert!(!fg.has_open_known_data_handles());
    let known = fg.prior_and_condition(x);
    known.release();
    assert!(!fg.has_open_known_data_handles());
    assert!(fg.has_fixed_value(x));
    fg.fix_variable(x, None).unwrap();
    assert!(!fg.has_fixed_value(x));
}

#[test]
fn known_values_and_priors() {
    let mut fgb = FactorGraphBuilder::new();
    let x = fgb.add_variable(Domain::Discrete(DiscreteDomain::range(0, 3)));
    let y = fgb.add_variable(Domain::Real(RealDomain::non_negative()));
    let fg = fgb.build();
    assert_eq!(
        fg.fix_variable(x, Some(Value::Int(3))),
        Err(FGError::ValueOutsideDomain {
            variable: x,
            value: "3".into(),
        })
    );
    assert!(matches!(
        fg.fix_variable(y, Some(Value::Real(-0.5))),
        Err(FGError::ValueOutsideDomain { .. })
    ));
    assert_eq!(fg.set_prior(2, None), Err(FGError::OutOfRangeVariable(2, 2)));
    fg.set_prior(y, Some(Datum::Value(Value::Real(2.)))).unwrap();
    assert_eq!(fg.prior_and_condition(y).value(), Some(&Value::Real(2.)));
    // a fixed value wins over a conditioning prior
    fg.fix_variable(y, Some(Value::Real(1.))).unwrap();
    assert_eq!(fg.prior_and_condition(y).value(), Some(&Value::Real(1.)));
    fg.set_prior(y, Some(Datum::Gamma(GammaParameters::from_shape_and_rate(2., 3.))))
        .unwrap();
    fg.fix_variable(y, None).unwrap();
    assert_eq!(fg.prior_and_condition(y).value(), None);
    // clones do not share known data
    let copy = fg.clone();
    copy.set_prior(y, None).unwrap();
    assert!(fg.prior_and_condition(y).prior().is_some());
    assert!(copy.prior_and_condition(y).prior().is_none());
}

#[test]
fn solver_config_from_yaml() {
    let config: SolverConfig = serde_yaml::from_str("seed: 42\nworkers: 4\n").unwrap();
    assert_eq!(
        config,
        SolverConfig {
            seed: Some(42),
            workers: 4,
            ..SolverConfig::default()
        }
    );
    assert_eq!(config.sweeps, 100);
    let empty: SolverConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(empty, SolverConfig::default());
    assert!(empty.seed.is_none());
}

#[test]
fn worker_contexts_are_reproducible() {
    let config = SolverConfig {
        seed: Some(7),
        ..SolverConfig::default()
    };
    let draws = |worker: usize| {
        let mut context = SolverContext::for_worker(&config, worker);
        assert_eq!(context.worker(), worker);
        (0..8).map(|_| context.next_uniform()).collect::<Vec<_>>()
    };
    assert_eq!(draws(0), draws(0));
    assert_eq!(draws(3), draws(3));
    assert_ne!(draws(0), draws(1));
    let mut context = SolverContext::seeded(1);
    assert_eq!(context.next_int(0), 0);
    assert!(context.next_int(5) < 5);
    assert!(matches!(
        context.next_gamma(-1., 1.),
        Err(FGError::InvalidDistribution(_))
    ));
    assert!(matches!(
        context.next_normal(0., -1.),
        Err(FGError::InvalidDistribution(_))
    ));
    assert_eq!(context.next_normal(2., 0.).unwrap(), 2.);
}
