//! REINFORCE training loop.
//!
//! Each iteration samples one episode with the current policy, turns its
//! rewards into returns, and takes one Adam step on
//! `loss = -sum_t log pi(a_t | s_t) * G_t`. Minimising that loss ascends the
//! policy-gradient objective.

use crate::config::TrainerConfig;
use crate::env::Env;
use crate::error::{Result, RlError};
use crate::policy::{MlpPolicy, Policy};
use crate::sampler::{EpisodeSampler, EpisodeTrace};
use crate::score::ScoreHistory;
use ml::{Adam, Recorder, Tape, Tensor, TensorStore};
use serde::Serialize;

/// Lifecycle of a training run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainerState {
    Initialized,
    Running,
    /// Rolling average reached the solved threshold.
    Solved,
    /// Episode budget spent without solving.
    Exhausted,
    /// A collaborator error aborted the run.
    Failed,
}

impl TrainerState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, TrainerState::Solved | TrainerState::Exhausted | TrainerState::Failed)
    }

    fn label(self) -> &'static str {
        match self {
            TrainerState::Initialized => "initialized",
            TrainerState::Running => "running",
            TrainerState::Solved => "solved",
            TrainerState::Exhausted => "exhausted",
            TrainerState::Failed => "failed",
        }
    }
}

/// What happened during one training iteration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeReport {
    /// 1-based episode number.
    pub episode: usize,
    pub length: usize,
    pub total_reward: f32,
    pub loss: f32,
    pub rolling_average: f32,
}

/// Result of a complete run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub outcome: TrainerState,
    pub episodes: usize,
    pub scores: Vec<f32>,
    pub rolling_average: f32,
}

/// Builds the REINFORCE loss for `trace` on `recorder`.
///
/// The log-probabilities are recomputed in one batched forward pass; the
/// parameters are unchanged since sampling, so they match the values stored
/// in the trace.
///
/// # Errors
///
/// Returns [`RlError::LengthMismatch`] if `returns` and `trace` differ in length.
pub fn reinforce_loss(
    policy: &MlpPolicy,
    trace: &EpisodeTrace,
    returns: &[f32],
    recorder: &mut impl Recorder,
    tensors: &mut TensorStore,
) -> Result<Tensor> {
    if trace.len() != returns.len() {
        return Err(RlError::LengthMismatch { trace: trace.len(), returns: returns.len() });
    }
    let states = Tensor::from_vec(vec![trace.len(), policy.state_dim()], trace.states_flat());
    let weights = Tensor::from_vec(vec![returns.len()], returns.to_vec());
    states.watch(tensors);
    weights.watch(tensors);

    let logits = policy.logits(&states, recorder, tensors);
    let log_probs = logits
        .log_softmax(recorder, tensors)
        .gather(&trace.actions(), recorder, tensors);
    Ok(log_probs
        .mul(&weights, recorder, tensors)
        .reduce_sum(recorder, tensors)
        .mul_scalar(-1.0, recorder, tensors))
}

fn check_env(env: &impl Env) -> Result<()> {
    if env.action_count() == 0 {
        return Err(RlError::NonPositive { name: "action_count", value: 0.0 });
    }
    if env.state_dimension() == 0 {
        return Err(RlError::NonPositive { name: "state_dimension", value: 0.0 });
    }
    Ok(())
}

/// Single-environment REINFORCE trainer.
pub struct Trainer<E: Env> {
    config: TrainerConfig,
    env: E,
    policy: MlpPolicy,
    optimizer: Adam,
    rng: fastrand::Rng,
    sampler: EpisodeSampler,
    scores: ScoreHistory,
    state: TrainerState,
}

impl<E: Env> Trainer<E> {
    /// Builds the policy for `env`'s dimensions and seeds every random source
    /// from `config.seed`.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate or `env` reports no actions or an
    /// empty state.
    pub fn new(config: TrainerConfig, mut env: E) -> Result<Self> {
        config.validate()?;
        check_env(&env)?;
        let mut rng = fastrand::Rng::with_seed(config.seed);
        env.seed(config.seed);
        let policy = MlpPolicy::new(
            env.state_dimension(),
            config.hidden_size,
            env.action_count(),
            config.activation,
            &mut rng,
        );
        Self::assemble(config, env, policy, rng)
    }

    /// Trains `policy` instead of a freshly initialised one. `config.hidden_size`
    /// and `config.activation` are ignored.
    ///
    /// # Errors
    ///
    /// Fails as [`Trainer::new`], or if `policy` does not match `env`'s state
    /// dimension and action count.
    pub fn with_policy(config: TrainerConfig, mut env: E, policy: MlpPolicy) -> Result<Self> {
        config.validate()?;
        check_env(&env)?;
        if policy.state_dim() != env.state_dimension() {
            return Err(RlError::StateDimension {
                expected: env.state_dimension(),
                got: policy.state_dim(),
            });
        }
        if policy.action_count() != env.action_count() {
            return Err(RlError::ActionCount {
                expected: env.action_count(),
                got: policy.action_count(),
            });
        }
        let rng = fastrand::Rng::with_seed(config.seed);
        env.seed(config.seed);
        Self::assemble(config, env, policy, rng)
    }

    fn assemble(config: TrainerConfig, env: E, policy: MlpPolicy, rng: fastrand::Rng) -> Result<Self> {
        let optimizer = Adam::new(&policy.params(), config.learning_rate);
        let sampler = EpisodeSampler::new(config.max_steps)?.with_render(config.render);
        let scores = ScoreHistory::new(config.rolling_window);
        Ok(Self {
            config,
            env,
            policy,
            optimizer,
            rng,
            sampler,
            scores,
            state: TrainerState::Initialized,
        })
    }

    #[must_use]
    pub fn state(&self) -> TrainerState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    #[must_use]
    pub fn policy(&self) -> &MlpPolicy {
        &self.policy
    }

    #[must_use]
    pub fn scores(&self) -> &ScoreHistory {
        &self.scores
    }

    #[must_use]
    pub fn episodes(&self) -> usize {
        self.scores.len()
    }

    /// Runs one episode and one parameter update.
    ///
    /// # Errors
    ///
    /// Returns [`RlError::Finished`] once the run is in a terminal state.
    /// Any environment or gradient failure moves the trainer to
    /// [`TrainerState::Failed`] and is returned.
    pub fn step(&mut self) -> Result<EpisodeReport> {
        if self.state.is_terminal() {
            return Err(RlError::Finished(self.state.label()));
        }
        self.state = TrainerState::Running;
        match self.iterate() {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!(episode = self.episodes() + 1, error = %e, "training run failed");
                self.state = TrainerState::Failed;
                Err(e)
            }
        }
    }

    fn iterate(&mut self) -> Result<EpisodeReport> {
        let episode = self.sampler.sample(&self.policy, &mut self.env, &mut self.rng)?;
        self.scores.push(episode.total_reward);

        let returns = self
            .config
            .return_mode
            .compute(&episode.trace.rewards(), self.config.gamma)?;
        let loss = self.update(&episode.trace, &returns)?;

        let n = self.episodes();
        let rolling_average = self.scores.rolling_average().unwrap_or(episode.total_reward);
        tracing::debug!(
            episode = n,
            length = episode.trace.len(),
            total_reward = episode.total_reward,
            loss,
            rolling_average,
            "episode finished"
        );
        if self.config.verbose && n % self.config.report_interval == 0 {
            tracing::info!("Episode {n}\tAverage Score: {rolling_average:.2}");
        }

        if rolling_average >= self.config.solved_threshold {
            self.state = TrainerState::Solved;
            tracing::info!(episode = n, rolling_average, "environment solved");
        } else if n >= self.config.num_episodes {
            self.state = TrainerState::Exhausted;
            tracing::warn!(episodes = n, rolling_average, "episode budget exhausted");
        }

        Ok(EpisodeReport {
            episode: n,
            length: episode.trace.len(),
            total_reward: episode.total_reward,
            loss,
            rolling_average,
        })
    }

    /// Fresh tape per update, so no gradient carries over between episodes.
    fn update(&mut self, trace: &EpisodeTrace, returns: &[f32]) -> Result<f32> {
        let mut tensors = TensorStore::new();
        self.policy.watch(&mut tensors);
        let mut tape = Tape::new();
        let loss = reinforce_loss(&self.policy, trace, returns, &mut tape, &mut tensors)?;
        let grads = tape.backward(&loss, &tensors).map_err(RlError::Autodiff)?;
        self.optimizer
            .step(&mut self.policy.params_mut(), &grads)
            .map_err(RlError::Autodiff)?;
        Ok(loss.data[0])
    }

    /// Trains until the run is solved or the budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the first failure from [`Trainer::step`].
    pub fn run(&mut self) -> Result<TrainingSummary> {
        tracing::info!(
            seed = self.config.seed,
            mode = ?self.config.return_mode,
            episodes = self.config.num_episodes,
            "starting training"
        );
        while !self.state.is_terminal() {
            self.step()?;
        }
        Ok(self.summary())
    }

    #[must_use]
    pub fn summary(&self) -> TrainingSummary {
        TrainingSummary {
            outcome: self.state,
            episodes: self.episodes(),
            scores: self.scores.scores().to_vec(),
            rolling_average: self.scores.rolling_average().unwrap_or(0.0),
        }
    }

    /// Most likely action in `state` under the current policy.
    ///
    /// # Errors
    ///
    /// Fails if `state` has the wrong dimension.
    pub fn act_greedy(&self, state: &[f32]) -> Result<usize> {
        Ok(self.policy.distribution(state)?.mode())
    }

    /// Total rewards of `episodes` greedy rollouts. Parameters are not updated
    /// and the score history is left alone.
    ///
    /// # Errors
    ///
    /// Propagates environment failures.
    pub fn evaluate(&mut self, episodes: usize) -> Result<Vec<f32>> {
        (0..episodes)
            .map(|_| Ok(self.sampler.greedy(&self.policy, &mut self.env)?.total_reward))
            .collect()
    }
}
