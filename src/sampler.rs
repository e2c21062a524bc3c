//! Acoustic property sampling
//!
//! A property is either a fixed constant or a normal law truncated to a
//! closed interval. Truncated draws use the inverse-CDF method so the shape of
//! the truncated density is preserved exactly (no clipping of an unbounded draw).

use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::error::{PhantomError, Result};

/// Distribution of one acoustic quantity for one tissue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertySpec {
    Constant(f64),
    TruncatedNormal { mean: f64, sd: f64, min: f64, max: f64 },
}

impl PropertySpec {
    /// Check that the spec describes a well-formed distribution
    pub fn validate(&self) -> Result<()> {
        match *self {
            PropertySpec::Constant(v) => {
                if !v.is_finite() {
                    return Err(invalid(format!("constant {} is not finite", v)));
                }
                Ok(())
            }
            PropertySpec::TruncatedNormal { mean, sd, min, max } => {
                TruncatedGaussian::new(mean, sd, min, max).map(|_| ())
            }
        }
    }

    /// Draw one value
    ///
    /// Constants are returned unchanged; truncated normals consume entropy
    /// from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        match *self {
            PropertySpec::Constant(v) => {
                self.validate()?;
                Ok(v)
            }
            PropertySpec::TruncatedNormal { mean, sd, min, max } => {
                let dist = TruncatedGaussian::new(mean, sd, min, max)?;
                Ok(dist.sample(rng))
            }
        }
    }
}

fn invalid(reason: String) -> PhantomError {
    PhantomError::InvalidSpec { reason }
}

/// Normal distribution N(mean, sd^2) restricted to [min, max]
///
/// Sampling maps a uniform variate in [Phi(alpha), Phi(beta)) through the
/// standard normal quantile function. The mean must lie inside the interval,
/// which keeps both CDF values away from the saturated tails.
#[derive(Clone, Debug)]
pub struct TruncatedGaussian {
    mean: f64,
    sd: f64,
    // Standardized bounds
    alpha: f64,
    beta: f64,
    cdf_lo: f64,
    cdf_hi: f64,
    standard: Normal,
}

impl TruncatedGaussian {
    pub fn new(mean: f64, sd: f64, min: f64, max: f64) -> Result<Self> {
        if ![mean, sd, min, max].iter().all(|v| v.is_finite()) {
            return Err(invalid(format!(
                "truncated normal parameters must be finite (mean={}, sd={}, min={}, max={})",
                mean, sd, min, max
            )));
        }
        if sd <= 0.0 {
            return Err(invalid(format!("standard deviation {} must be positive", sd)));
        }
        if min >= max {
            return Err(invalid(format!("lower bound {} must be below upper bound {}", min, max)));
        }
        if mean < min || mean > max {
            return Err(invalid(format!("mean {} lies outside [{}, {}]", mean, min, max)));
        }

        let standard = Normal::new(0.0, 1.0)
            .map_err(|e| invalid(format!("standard normal: {}", e)))?;

        let alpha = (min - mean) / sd;
        let beta = (max - mean) / sd;
        let cdf_lo = standard.cdf(alpha);
        let cdf_hi = standard.cdf(beta);
        if !(cdf_hi - cdf_lo > f64::EPSILON) {
            return Err(invalid(format!(
                "interval [{}, {}] carries no representable probability mass under N({}, {}^2)",
                min, max, mean, sd
            )));
        }

        Ok(Self { mean, sd, alpha, beta, cdf_lo, cdf_hi, standard })
    }

    /// Truncated standard normal on [lo, hi] (in units of sigma)
    pub fn standard(lo: f64, hi: f64) -> Result<Self> {
        Self::new(0.0, 1.0, lo, hi)
    }

    pub fn min(&self) -> f64 {
        self.mean + self.sd * self.alpha
    }

    pub fn max(&self) -> f64 {
        self.mean + self.sd * self.beta
    }

    /// Mean of the truncated law (differs from `mean` for asymmetric bounds)
    pub fn truncated_mean(&self) -> f64 {
        let z = self.cdf_hi - self.cdf_lo;
        let shift = (self.standard.pdf(self.alpha) - self.standard.pdf(self.beta)) / z;
        self.mean + self.sd * shift
    }
}

impl Distribution<f64> for TruncatedGaussian {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        let p = self.cdf_lo + (self.cdf_hi - self.cdf_lo) * u;
        // Quantile rounding can step a hair past the bounds at p ~ cdf_lo/cdf_hi
        let z = self.standard.inverse_cdf(p).clamp(self.alpha, self.beta);
        self.mean + self.sd * z
    }
}
