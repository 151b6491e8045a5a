//! Stochastic policies over a discrete action set.

use crate::error::{Result, RlError};
use ml::{log_softmax_row, Activation, Dense, Graph, Recorder, Tensor, TensorStore};

/// Categorical distribution parameterised by unnormalised scores.
///
/// Log-probabilities are computed once with log-sum-exp, so they stay finite
/// for probabilities far below `f32::MIN_POSITIVE`.
#[derive(Clone, Debug, PartialEq)]
pub struct Categorical {
    logits: Vec<f32>,
    log_probs: Vec<f32>,
}

impl Categorical {
    /// # Panics
    ///
    /// Panics if `logits` is empty.
    #[must_use]
    pub fn from_logits(logits: Vec<f32>) -> Self {
        assert!(!logits.is_empty(), "a categorical needs at least one action");
        let log_probs = log_softmax_row(&logits);
        Self { logits, log_probs }
    }

    #[must_use]
    pub fn logits(&self) -> &[f32] {
        &self.logits
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        self.logits.len()
    }

    #[must_use]
    pub fn probs(&self) -> Vec<f32> {
        self.log_probs.iter().map(|lp| lp.exp()).collect()
    }

    /// # Errors
    ///
    /// Returns [`RlError::InvalidAction`] if `action` is out of range.
    pub fn log_prob(&self, action: usize) -> Result<f32> {
        self.log_probs
            .get(action)
            .copied()
            .ok_or(RlError::InvalidAction { action, count: self.action_count() })
    }

    /// Inverse-CDF draw from `rng`.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> usize {
        let u = rng.f32();
        let mut cumulative = 0.0;
        for (action, lp) in self.log_probs.iter().enumerate() {
            cumulative += lp.exp();
            if u < cumulative {
                return action;
            }
        }
        // rounding left the cumulative sum just short of 1
        self.log_probs
            .iter()
            .rposition(|lp| lp.is_finite())
            .unwrap_or(self.action_count() - 1)
    }

    /// Most likely action; ties go to the lowest index.
    #[must_use]
    pub fn mode(&self) -> usize {
        Tensor::from_vec(vec![self.logits.len()], self.logits.clone()).argmax()
    }
}

/// State to action-distribution mapping used by the episode sampler.
pub trait Policy {
    fn action_count(&self) -> usize;

    /// Deterministic in the parameters and `state`.
    ///
    /// # Errors
    ///
    /// Fails if `state` has the wrong dimension.
    fn distribution(&self, state: &[f32]) -> Result<Categorical>;

    fn sample(&self, dist: &Categorical, rng: &mut fastrand::Rng) -> usize {
        dist.sample(rng)
    }

    /// # Errors
    ///
    /// Fails if `action` is out of range.
    fn log_probability(&self, dist: &Categorical, action: usize) -> Result<f32> {
        dist.log_prob(action)
    }
}

/// One hidden layer, a nonlinearity, and a linear head producing logits.
#[derive(Clone, Debug)]
pub struct MlpPolicy {
    hidden: Dense,
    head: Dense,
    activation: Activation,
    state_dim: usize,
}

impl MlpPolicy {
    #[must_use]
    pub fn new(
        state_dim: usize,
        hidden_size: usize,
        action_count: usize,
        activation: Activation,
        rng: &mut fastrand::Rng,
    ) -> Self {
        Self {
            hidden: Dense::glorot(state_dim, hidden_size, rng),
            head: Dense::glorot(hidden_size, action_count, rng),
            activation,
            state_dim,
        }
    }

    /// Assembles a policy from existing layers.
    ///
    /// # Errors
    ///
    /// Returns [`RlError::LayerMismatch`] if `hidden` does not feed `head`.
    pub fn from_layers(hidden: Dense, head: Dense, activation: Activation) -> Result<Self> {
        if hidden.out_dim != head.in_dim {
            return Err(RlError::LayerMismatch { hidden: hidden.out_dim, head: head.in_dim });
        }
        let state_dim = hidden.in_dim;
        Ok(Self { hidden, head, activation, state_dim })
    }

    #[must_use]
    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    /// Batched forward pass: `states [batch, state_dim] -> logits [batch, actions]`.
    pub fn logits(
        &self,
        states: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut TensorStore,
    ) -> Tensor {
        let h = self.hidden.forward(states, recorder, tensors);
        let h = self.activation.apply(&h, recorder, tensors);
        self.head.forward(&h, recorder, tensors)
    }

    #[must_use]
    pub fn params(&self) -> Vec<&Tensor> {
        let mut params = self.hidden.params();
        params.extend(self.head.params());
        params
    }

    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.hidden.params_mut();
        params.extend(self.head.params_mut());
        params
    }

    /// Makes the parameters visible to a tape's backward pass.
    pub fn watch(&self, tensors: &mut TensorStore) {
        for p in self.params() {
            p.watch(tensors);
        }
    }
}

impl Policy for MlpPolicy {
    fn action_count(&self) -> usize {
        self.head.out_dim
    }

    fn distribution(&self, state: &[f32]) -> Result<Categorical> {
        if state.len() != self.state_dim {
            return Err(RlError::StateDimension { expected: self.state_dim, got: state.len() });
        }
        let x = Tensor::from_vec(vec![1, self.state_dim], state.to_vec());
        let logits = self.logits(&x, &mut Graph::new(), &mut TensorStore::new());
        Ok(Categorical::from_logits(logits.data))
    }
}
