pub mod mc_methods;
pub mod q_learning;
pub mod value_iteration;

use gridworld::{Action, Environment, EpisodeEvent};
use rand::prelude::*;

/// Produces batches of episodes for the episode-consuming solvers.
pub trait EpisodeGenerator {
    fn generate(&mut self, n: usize) -> Vec<Vec<EpisodeEvent>>;
}

/// Uniform-random rollouts of a grid environment. The first event of every
/// episode is the reset observation with reward 0; the environment itself
/// stays deterministic, all sampling happens here.
pub struct RandomWalkEpisodes<'a> {
    env: &'a mut Environment,
    rng: StdRng,
}

impl<'a> RandomWalkEpisodes<'a> {
    pub fn new(env: &'a mut Environment, seed: u64) -> Self {
        Self {
            env,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl EpisodeGenerator for RandomWalkEpisodes<'_> {
    fn generate(&mut self, n: usize) -> Vec<Vec<EpisodeEvent>> {
        let mut eps = vec![];

        for _ in 0..n {
            let mut ep = vec![];
            let si = self.env.reset();
            ep.push(EpisodeEvent {
                s: si.observation,
                r: si.reward,
            });
            loop {
                let action = *Action::ALL.choose(&mut self.rng).unwrap();
                let si = self.env.step(action);
                ep.push(EpisodeEvent {
                    s: si.observation,
                    r: si.reward,
                });
                if si.done {
                    break;
                }
            }
            eps.push(ep);
        }

        eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_walk_episodes_run_from_reset_to_terminal() {
        let env = &mut Environment::from_layout(&["S-G", "---"]).unwrap();
        let model = env.model().clone();
        let eps = RandomWalkEpisodes::new(env, 2718).generate(5);

        assert_eq!(eps.len(), 5);
        for ep in &eps {
            assert_eq!(ep[0], EpisodeEvent { s: (0, 0), r: 0. });
            let last = ep.last().unwrap();
            assert_eq!(last.s, model.goal());
            assert_eq!(last.r, 1.);
            assert!(ep[1..ep.len() - 1]
                .iter()
                .all(|e| e.s != model.goal() && model.free_cells().contains(&e.s)));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_episodes() {
        let env = &mut Environment::from_layout(&["S-G"]).unwrap();
        let a = RandomWalkEpisodes::new(env, 42).generate(3);
        let env = &mut Environment::from_layout(&["S-G"]).unwrap();
        let b = RandomWalkEpisodes::new(env, 42).generate(3);

        assert_eq!(a, b);
    }
}
