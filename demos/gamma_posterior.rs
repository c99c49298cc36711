use clap::Parser;
use fgsolve::core::{Argument, Datum, Domain, FactorFunction, FactorGraphBuilder, RealDomain, SolverConfig};
use fgsolve::gibbs::run_replicas;
use fgsolve::messages::GammaParameters;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Exp};

/// Samples the rate of exponentially distributed observations with a Gamma prior
#[derive(Parser, Debug)]
struct Args {
    /// Path to a YAML file with sampling parameters
    #[arg(short, long)]
    config: Option<String>,

    /// Rate used to generate observations
    #[arg(long, default_value_t = 2.5)]
    true_rate: f64,

    /// Number of observations
    #[arg(long, default_value_t = 50)]
    observations: usize,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let config: SolverConfig = match &args.config {
        Some(path) => {
            let file = std::fs::File::open(path).unwrap();
            serde_yaml::from_reader(file).unwrap()
        }
        None => SolverConfig::default(),
    };
    // observations ------------------------------------------------------------------------
    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(0));
    let distr = Exp::new(args.true_rate).unwrap();
    let observations = (0..args.observations)
        .map(|_| distr.sample(&mut rng))
        .collect::<Vec<_>>();
    // rate ~ Gamma(1, 1), observations ~ Exponential(rate) --------------------------------
    let mut fgb = FactorGraphBuilder::new();
    let rate = fgb.add_variable(Domain::Real(RealDomain::non_negative()));
    let mut arguments = vec![Argument::var(rate)];
    arguments.extend(observations.iter().map(|x| Argument::constant(*x)));
    fgb.add_factor(FactorFunction::exponential(), &arguments).unwrap();
    let fg = fgb.build();
    fg.set_prior(rate, Some(Datum::Gamma(GammaParameters::from_shape_and_rate(1., 1.))))
        .unwrap();
    // -------------------------------------------------------------------------------------
    let infos = run_replicas(&fg, &[rate], &config).unwrap();
    for info in &infos {
        println!("worker {}: posterior mean of the rate {:?}", info.worker, info.mean(0));
    }
    let sum: f64 = observations.iter().sum();
    let exact = (1. + args.observations as f64) / (1. + sum);
    println!("Exact posterior mean: {exact}");
}
