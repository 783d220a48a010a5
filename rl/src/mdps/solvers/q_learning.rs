use crate::config::QLearnerConfig;
use gridworld::{Action, Continous, Environment};
use rand::prelude::*;
use tracing::{debug, info};

/// Tabular TD control: epsilon-greedy behaviour over the same table the
/// updates bootstrap from, with a max-over-next-actions target.
pub struct QLearner {
    config: QLearnerConfig,
    q: Vec<Vec<Continous>>,
}

impl QLearner {
    /// The n_s x n_a action-value table starts at zero everywhere.
    pub fn new(config: QLearnerConfig, n_s: usize) -> Self {
        let q = vec![vec![0.; Action::ALL.len()]; n_s];
        Self { config, q }
    }

    pub fn q_values(&self) -> &[Vec<Continous>] {
        &self.q
    }

    /// With probability (1 - epsilon) a uniformly random action, otherwise
    /// greedy on the table.
    pub fn choose_action(&self, rng: &mut StdRng, state: usize) -> Action {
        if rng.gen::<Continous>() > self.config.epsilon {
            *Action::ALL.choose(rng).unwrap()
        } else {
            self.greedy_action(state)
        }
    }

    /// Argmax over the state's action values, ties broken by the lowest
    /// action index.
    pub fn greedy_action(&self, state: usize) -> Action {
        let mut best = Action::ALL[0];
        for action in Action::ALL {
            if self.q[state][action.index()] > self.q[state][best.index()] {
                best = action;
            }
        }

        best
    }

    /// One TD backup for the transition (s0, a0, r, s1):
    /// q[s0][a0] += alpha * (r + gamma * max_a q[s1][a] - q[s0][a0]).
    pub fn update(&mut self, state0: usize, action0: Action, reward: Continous, state1: usize) {
        let current = self.q[state0][action0.index()];
        let max_next = self.q[state1]
            .iter()
            .cloned()
            .fold(Continous::MIN, Continous::max);
        let target = reward + self.config.gamma * max_next;
        self.q[state0][action0.index()] = current + self.config.alpha * (target - current);
    }

    /// Runs the configured number of episodes against the environment,
    /// updating the table after every transition. Returns the cumulative
    /// reward over all episodes.
    pub fn train(&mut self, env: &mut Environment, rng: &mut StdRng) -> Continous {
        let mut total = 0.;

        for episode in 0..self.config.episodes {
            let si = env.reset();
            let mut state0 = env.model().state_index(si.observation);
            let mut action0 = self.choose_action(rng, state0);

            loop {
                let si = env.step(action0);
                let state1 = env.model().state_index(si.observation);
                let action1 = self.choose_action(rng, state1);
                self.update(state0, action0, si.reward, state1);

                state0 = state1;
                action0 = action1;
                total += si.reward;

                if si.done {
                    break;
                }
            }
            debug!(episode, total, "episode finished");
        }
        info!(episodes = self.config.episodes, "training finished");

        total
    }

    /// The greedy policy derived from the table, one action per state.
    pub fn greedy_policy(&self) -> Vec<Action> {
        (0..self.q.len()).map(|s| self.greedy_action(s)).collect()
    }

    /// Replays one episode under the greedy policy and returns its total
    /// return. A greedy walk longer than the state count has revisited a
    /// state and can never terminate, so the replay stops there.
    pub fn evaluate(&self, env: &mut Environment) -> Continous {
        let policy = self.greedy_policy();
        let si = env.reset();
        let mut state = env.model().state_index(si.observation);
        let mut total = 0.;

        for _ in 0..self.q.len() {
            let si = env.step(policy[state]);
            total += si.reward;
            if si.done {
                break;
            }
            state = env.model().state_index(si.observation);
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;

    fn config(epsilon: Continous) -> QLearnerConfig {
        QLearnerConfig {
            episodes: 1,
            alpha: 0.5,
            gamma: 0.9,
            epsilon,
        }
    }

    #[test]
    fn update_applies_the_td_rule() {
        let learner = &mut QLearner::new(config(0.7), 3);

        learner.update(0, Action::Right, 2., 1);
        assert_float_eq!(learner.q_values()[0][Action::Right.index()], 1., abs <= 1e-12);

        // Give state 1 a best action worth 2, then back it up into state 0.
        learner.update(1, Action::Down, 4., 2);
        learner.update(0, Action::Right, 2., 1);
        assert_float_eq!(
            learner.q_values()[0][Action::Right.index()],
            1. + 0.5 * ((2. + 0.9 * 2.) - 1.),
            abs <= 1e-12
        );
    }

    #[test]
    fn greedy_ties_break_to_the_lowest_action_index() {
        let learner = &mut QLearner::new(config(0.7), 2);
        assert_eq!(learner.greedy_action(0), Action::Up);

        learner.update(0, Action::Left, 1., 1);
        assert_eq!(learner.greedy_action(0), Action::Left);
    }

    #[test]
    fn choose_action_is_greedy_when_epsilon_is_one() {
        let learner = &mut QLearner::new(config(1.), 1);
        learner.update(0, Action::Down, 1., 0);

        let rng = &mut StdRng::seed_from_u64(2718);
        for _ in 0..100 {
            assert_eq!(learner.choose_action(rng, 0), Action::Down);
        }
    }

    #[test]
    fn choose_action_is_uniform_when_epsilon_is_zero() {
        let learner = &QLearner::new(config(0.), 1);

        let rng = &mut StdRng::from_entropy();
        let mut counts = [0; 4];
        let n = 8000;
        for _ in 0..n {
            counts[learner.choose_action(rng, 0).index()] += 1;
        }

        for count in counts {
            assert_float_eq!(count as Continous / n as Continous, 0.25, abs <= 0.05);
        }
    }

    #[test]
    fn corridor_training_learns_the_greedy_path() {
        let env = &mut Environment::from_layout(&["S-G"]).unwrap();
        let config = QLearnerConfig {
            episodes: 20_000,
            ..Default::default()
        };
        let learner = &mut QLearner::new(config, env.n_s());
        let rng = &mut StdRng::seed_from_u64(2718);

        learner.train(env, rng);

        let start = env.model().state_index((0, 0));
        let mid = env.model().state_index((0, 1));
        let policy = learner.greedy_policy();
        assert_eq!(policy[start], Action::Right);
        assert_eq!(policy[mid], Action::Right);

        let q = learner.q_values();
        for action in [Action::Up, Action::Down, Action::Left] {
            assert!(q[start][Action::Right.index()] > q[start][action.index()]);
            assert!(q[mid][Action::Right.index()] > q[mid][action.index()]);
        }

        // Greedy replay: -1 for the first step, +1 for the winning one.
        assert_float_eq!(learner.evaluate(env), 0., abs <= 1e-12);
    }
}
