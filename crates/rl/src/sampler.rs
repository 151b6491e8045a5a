//! Episode collection under a fixed policy.

use crate::env::Env;
use crate::error::{Result, RlError};
use crate::policy::Policy;

/// One time step of an episode.
#[derive(Clone, Debug, PartialEq)]
pub struct StepRecord {
    /// State the action was chosen in.
    pub state: Vec<f32>,
    pub action: usize,
    /// `ln pi(action | state)` under the parameters used for sampling.
    pub log_prob: f32,
    pub reward: f32,
}

/// Time-ordered steps of one episode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeTrace {
    steps: Vec<StepRecord>,
}

impl EpisodeTrace {
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    #[must_use]
    pub fn rewards(&self) -> Vec<f32> {
        self.steps.iter().map(|s| s.reward).collect()
    }

    #[must_use]
    pub fn log_probs(&self) -> Vec<f32> {
        self.steps.iter().map(|s| s.log_prob).collect()
    }

    #[must_use]
    pub fn actions(&self) -> Vec<usize> {
        self.steps.iter().map(|s| s.action).collect()
    }

    /// States stacked row-major, `len() * state_dim` values.
    #[must_use]
    pub fn states_flat(&self) -> Vec<f32> {
        self.steps.iter().flat_map(|s| s.state.iter().copied()).collect()
    }

    #[must_use]
    pub fn total_reward(&self) -> f32 {
        self.steps.iter().map(|s| s.reward).sum()
    }
}

/// A finished episode.
#[derive(Clone, Debug, PartialEq)]
pub struct Episode {
    pub trace: EpisodeTrace,
    pub total_reward: f32,
    /// `true` if the environment signalled `done`, `false` if the step cap
    /// cut the episode short.
    pub terminated: bool,
}

enum Selection<'a> {
    Sample(&'a mut fastrand::Rng),
    Greedy,
}

/// Runs whole episodes; never touches the policy's parameters.
#[derive(Clone, Copy, Debug)]
pub struct EpisodeSampler {
    max_steps: usize,
    render: bool,
}

impl EpisodeSampler {
    /// # Errors
    ///
    /// Returns [`RlError::NonPositive`] when `max_steps` is zero.
    pub fn new(max_steps: usize) -> Result<Self> {
        if max_steps == 0 {
            return Err(RlError::NonPositive { name: "max_steps", value: 0.0 });
        }
        Ok(Self { max_steps, render: false })
    }

    /// Call [`Env::render`] after every step.
    #[must_use]
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Samples actions from the policy until `done` or the step cap.
    ///
    /// # Errors
    ///
    /// Propagates policy and environment failures.
    pub fn sample<P, E>(&self, policy: &P, env: &mut E, rng: &mut fastrand::Rng) -> Result<Episode>
    where
        P: Policy + ?Sized,
        E: Env + ?Sized,
    {
        self.run(policy, env, Selection::Sample(rng))
    }

    /// Like [`EpisodeSampler::sample`] but always takes the most likely action.
    ///
    /// # Errors
    ///
    /// Propagates policy and environment failures.
    pub fn greedy<P, E>(&self, policy: &P, env: &mut E) -> Result<Episode>
    where
        P: Policy + ?Sized,
        E: Env + ?Sized,
    {
        self.run(policy, env, Selection::Greedy)
    }

    fn run<P, E>(
        &self,
        policy: &P,
        env: &mut E,
        mut selection: Selection<'_>,
    ) -> Result<Episode>
    where
        P: Policy + ?Sized,
        E: Env + ?Sized,
    {
        let mut steps = Vec::with_capacity(self.max_steps.min(1024));
        let mut state = env.reset();
        let mut terminated = false;

        while steps.len() < self.max_steps {
            let dist = policy.distribution(&state)?;
            let action = match &mut selection {
                Selection::Sample(rng) => policy.sample(&dist, rng),
                Selection::Greedy => dist.mode(),
            };
            let log_prob = policy.log_probability(&dist, action)?;
            let transition = env.step(action)?;
            if self.render {
                env.render();
            }
            steps.push(StepRecord { state, action, log_prob, reward: transition.reward });
            state = transition.state;
            if transition.done {
                terminated = true;
                break;
            }
        }

        let trace = EpisodeTrace { steps };
        let total_reward = trace.total_reward();
        Ok(Episode { trace, total_reward, terminated })
    }
}
