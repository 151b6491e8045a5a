//! Discounted returns, plain and baseline-normalized.

use crate::error::{Result, RlError};
use serde::{Deserialize, Serialize};

/// Absolute floor of the zero-deviation tolerance used by [`normalize`].
pub const STD_EPSILON: f32 = 1e-8;

/// Which return signal weights the log-probabilities in the loss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnMode {
    /// Raw discounted returns.
    #[default]
    Plain,
    /// Returns minus their episode mean, scaled to unit standard deviation.
    Baseline,
}

impl ReturnMode {
    /// # Errors
    ///
    /// See [`discounted_returns`].
    pub fn compute(self, rewards: &[f32], gamma: f32) -> Result<Vec<f32>> {
        match self {
            ReturnMode::Plain => discounted_returns(rewards, gamma),
            ReturnMode::Baseline => normalized_returns(rewards, gamma),
        }
    }
}

/// # Errors
///
/// Returns [`RlError::InvalidDiscount`] unless `gamma` is finite and in `(0, 1]`.
pub fn validate_gamma(gamma: f32) -> Result<()> {
    if gamma.is_finite() && gamma > 0.0 && gamma <= 1.0 {
        Ok(())
    } else {
        Err(RlError::InvalidDiscount(gamma))
    }
}

/// `G_t = r_t + gamma * G_{t+1}` with `G_{T+1} = 0`, filled back to front.
///
/// # Errors
///
/// Fails on an empty reward sequence or a discount outside `(0, 1]`.
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Result<Vec<f32>> {
    if rewards.is_empty() {
        return Err(RlError::EmptyRewards);
    }
    validate_gamma(gamma)?;

    let mut returns = vec![0.0; rewards.len()];
    let mut running = 0.0;
    for t in (0..rewards.len()).rev() {
        running = rewards[t] + gamma * running;
        returns[t] = running;
    }
    Ok(returns)
}

/// Discounted returns with the episode mean subtracted and divided by the
/// population standard deviation.
///
/// When the standard deviation is numerically zero (see [`normalize`]) the
/// mean-centred values are returned unscaled.
///
/// # Errors
///
/// See [`discounted_returns`].
pub fn normalized_returns(rewards: &[f32], gamma: f32) -> Result<Vec<f32>> {
    let mut returns = discounted_returns(rewards, gamma)?;
    normalize(&mut returns);
    Ok(returns)
}

/// Mean-centres `values` in place and scales them to unit standard deviation
/// when that deviation is not numerically zero.
///
/// Moments are accumulated in `f64`. A deviation within a few `f32` ulps of
/// the mean is rounding noise, so the tolerance scales with `|mean|` and never
/// drops below [`STD_EPSILON`].
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn normalize(values: &mut [f32]) {
    if values.is_empty() {
        return;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let var = values.iter().map(|&v| (f64::from(v) - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    let tolerance = f64::from(STD_EPSILON).max(4.0 * f64::from(f32::EPSILON) * mean.abs());
    for v in values.iter_mut() {
        let centred = f64::from(*v) - mean;
        *v = if std > tolerance { (centred / std) as f32 } else { centred as f32 };
    }
}
