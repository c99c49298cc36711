use crate::core::{Datum, FGError, FGResult, RandomSource, Value};
use crate::gibbs::samplers::{ConjugateSampler, SamplerFamily};
use crate::messages::{DirichletParameters, ParameterMessage};

/// The smallest positive subnormal number
const TINY: f64 = f64::MIN_POSITIVE * f64::EPSILON;

/// A Dirichlet posterior sampler.
///
/// The dimension is taken from the first non-empty edge message or input
/// and never changes afterwards. A conditioning value among inputs adds no
/// concentration, it only fixes the dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirichletSampler {
    dimension: Option<usize>,
}

impl DirichletSampler {
    #[inline]
    pub fn new() -> Self {
        DirichletSampler { dimension: None }
    }

    #[inline]
    pub fn with_dimension(dimension: usize) -> Self {
        DirichletSampler {
            dimension: Some(dimension),
        }
    }

    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn unify_dimension(&mut self, found: usize) -> FGResult<()> {
        match self.dimension {
            Some(expected) if expected != found => Err(FGError::DimensionMismatch {
                context: "Dirichlet parameters".into(),
                expected,
                found,
            }),
            Some(_) => Ok(()),
            None => {
                self.dimension = Some(found);
                Ok(())
            }
        }
    }
}

impl ConjugateSampler for DirichletSampler {
    type Parameters = DirichletParameters;
    type Sample = Vec<f64>;

    #[inline]
    fn family(&self) -> SamplerFamily {
        SamplerFamily::Dirichlet
    }

    #[inline]
    fn create_parameter_message(&self) -> DirichletParameters {
        DirichletParameters::new(self.dimension.unwrap_or(0))
    }

    fn aggregate_parameters(
        &mut self,
        out: &mut DirichletParameters,
        edges: &[Option<&ParameterMessage>],
        inputs: &[&Datum],
    ) -> FGResult<()> {
        let mut messages = Vec::with_capacity(edges.len());
        for message in edges.iter().flatten() {
            match message {
                ParameterMessage::Dirichlet(parameters) if parameters.size() == 0 => {}
                ParameterMessage::Dirichlet(parameters) => {
                    self.unify_dimension(parameters.size())?;
                    messages.push(parameters);
                }
                other => {
                    return Err(FGError::MessageFamilyMismatch {
                        expected: self.family().name().into(),
                        found: other.family_name().into(),
                    })
                }
            }
        }
        // a conditioning value only tells the dimension
        let mut priors = Vec::with_capacity(inputs.len());
        for input in inputs {
            match input {
                Datum::Dirichlet(parameters) => {
                    self.unify_dimension(parameters.size())?;
                    priors.push(parameters);
                }
                Datum::Value(Value::RealJoint(value)) => self.unify_dimension(value.len())?,
                _ => {}
            }
        }
        let dimension = self
            .dimension
            .ok_or_else(|| FGError::UnknownDimension("Dirichlet sampler".into()))?;
        out.set_size(dimension);
        for parameters in messages.into_iter().chain(priors) {
            out.add_from(parameters)?;
        }
        Ok(())
    }

    fn next_sample<R: RandomSource + ?Sized>(&self, parameters: &DirichletParameters, rng: &mut R) -> FGResult<Vec<f64>> {
        let draws = parameters
            .concentration()
            .into_iter()
            .map(|alpha| rng.next_gamma(alpha, 1f64))
            .collect::<FGResult<Vec<_>>>()?;
        Ok(normalize_to_simplex(draws, rng))
    }
}

/// Normalizes non-negative draws to a strictly positive point of a simplex.
///
/// If every draw is zero, a random dimension takes all the mass but `TINY`
/// per other dimension. If some draws are zero, they are set to `TINY` and the
/// rest are lowered to compensate.
pub fn normalize_to_simplex<R: RandomSource + ?Sized>(mut values: Vec<f64>, rng: &mut R) -> Vec<f64> {
    let dimension = values.len();
    if dimension == 0 {
        return values;
    }
    let sum: f64 = values.iter().sum();
    let zeros = values.iter().filter(|x| **x == 0f64).count();
    if zeros == dimension || sum == 0f64 {
        let dominant = rng.next_int(dimension);
        values.fill(TINY);
        values[dominant] = 1f64 - TINY * (dimension - 1) as f64;
    } else if zeros > 0 {
        let compensation = TINY * zeros as f64 / (dimension - zeros) as f64;
        for x in &mut values {
            *x = if *x == 0f64 { TINY } else { *x / sum - compensation };
        }
    } else {
        values.iter_mut().for_each(|x| *x /= sum);
    }
    values
}
