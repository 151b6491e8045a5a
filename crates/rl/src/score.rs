use std::collections::VecDeque;

/// Per-episode total rewards: the full history plus a bounded window of the
/// most recent scores for the rolling average.
#[derive(Clone, Debug)]
pub struct ScoreHistory {
    scores: Vec<f32>,
    window: VecDeque<f32>,
    capacity: usize,
}

impl ScoreHistory {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling window must hold at least one score");
        Self { scores: Vec::new(), window: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, score: f32) {
        self.scores.push(score);
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(score);
    }

    /// Mean of the last `capacity` scores, or of all of them if fewer.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rolling_average(&self) -> Option<f32> {
        if self.window.is_empty() {
            return None;
        }
        Some(self.window.iter().sum::<f32>() / self.window.len() as f32)
    }

    #[must_use]
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
