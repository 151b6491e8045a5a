use crate::tape::Gradients;
use crate::tensor::Tensor;
use anyhow::{bail, Result};

/// Adam with per-parameter first and second moment estimates.
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: u32,
    m: Vec<Vec<f32>>,
    v: Vec<Vec<f32>>,
}

impl Adam {
    /// Moments are sized from `params`; later calls to [`Adam::step`] must
    /// pass the same parameters in the same order.
    #[must_use]
    pub fn new(params: &[&Tensor], lr: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            t: 0,
            m: params.iter().map(|p| vec![0.0; p.data.len()]).collect(),
            v: params.iter().map(|p| vec![0.0; p.data.len()]).collect(),
        }
    }

    #[must_use]
    pub fn lr(&self) -> f32 {
        self.lr
    }

    #[must_use]
    pub fn steps_taken(&self) -> u32 {
        self.t
    }

    /// Applies one update. Parameters without an entry in `grads` are treated
    /// as having a zero gradient.
    ///
    /// # Errors
    ///
    /// Fails if `params` does not match the layout the optimizer was built for.
    pub fn step(&mut self, params: &mut [&mut Tensor], grads: &Gradients) -> Result<()> {
        if params.len() != self.m.len() {
            bail!("optimizer tracks {} parameters, got {}", self.m.len(), params.len());
        }
        for (i, p) in params.iter().enumerate() {
            if p.len() != self.m[i].len() {
                bail!("parameter {i} has {} elements, expected {}", p.len(), self.m[i].len());
            }
        }

        self.t += 1;
        #[allow(clippy::cast_possible_wrap)]
        let t = self.t as i32;
        let lr_t = self.lr * (1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t));

        for (i, p) in params.iter_mut().enumerate() {
            let grad = grads.wrt(p);
            for j in 0..p.data.len() {
                let g = grad.map_or(0.0, |g| g[j]);
                self.m[i][j] = self.beta1 * self.m[i][j] + (1.0 - self.beta1) * g;
                self.v[i][j] = self.beta2 * self.v[i][j] + (1.0 - self.beta2) * g.powi(2);
                p.data[j] -= lr_t * self.m[i][j] / (self.v[i][j].sqrt() + self.eps);
            }
        }
        Ok(())
    }
}
