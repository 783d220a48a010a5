use gridworld::Continous;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QLearnerConfig {
    pub episodes: usize,
    pub alpha: Continous,
    pub gamma: Continous,
    pub epsilon: Continous,
}

impl Default for QLearnerConfig {
    fn default() -> Self {
        Self {
            episodes: 100_000,
            alpha: 0.8,
            gamma: 0.95,
            epsilon: 0.7,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct McConfig {
    pub episodes: usize,
}

impl Default for McConfig {
    fn default() -> Self {
        Self { episodes: 10 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueIterationConfig {
    pub gamma: Continous,
    pub theta: Continous,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            theta: 1e-6,
        }
    }
}
