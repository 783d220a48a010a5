use crate::config::McConfig;
use crate::mdps::solvers::EpisodeGenerator;
use gridworld::{Continous, Discrete, Position};
use tracing::{debug, info};

/// First-visit Monte Carlo prediction of the uniform-random policy's state
/// values. Prediction only: the sampling policy is never improved.
pub struct McFirstVisit {
    config: McConfig,
    values: Vec<Vec<Continous>>,
    visit_counts: Vec<Vec<u32>>,
}

impl McFirstVisit {
    /// Both grid-shaped tables start at zero.
    pub fn new(config: McConfig, height: Discrete, width: Discrete) -> Self {
        Self {
            config,
            values: vec![vec![0.; width as usize]; height as usize],
            visit_counts: vec![vec![0; width as usize]; height as usize],
        }
    }

    pub fn values(&self) -> &[Vec<Continous>] {
        &self.values
    }

    pub fn visit_counts(&self) -> &[Vec<u32>] {
        &self.visit_counts
    }

    /// Draws the configured number of episodes from the generator and folds
    /// each episode's undiscounted return into the running averages.
    pub fn run(&mut self, ep_gen: &mut dyn EpisodeGenerator) {
        let eps = ep_gen.generate(self.config.episodes);

        for (episode, ep) in eps.iter().enumerate() {
            // Visited cells are the post-step observations; the reset event
            // only counts if the walk lands on it again.
            let steps = &ep[1..];
            let r = steps.iter().map(|e| e.r).sum::<Continous>();

            let mut visited: Vec<Position> = vec![];
            for e in steps {
                if !visited.contains(&e.s) {
                    visited.push(e.s);
                }
            }
            for s in visited {
                self.update(s, r);
            }
            debug!(episode, reward = r, "episode finished");
        }
        info!(episodes = self.config.episodes, "estimation finished");
    }

    /// Incremental running mean: v += (R - v) / n.
    fn update(&mut self, s: Position, r: Continous) {
        let (x, y) = (s.0 as usize, s.1 as usize);
        self.visit_counts[x][y] += 1;
        let n = self.visit_counts[x][y] as Continous;
        let v = self.values[x][y];
        self.values[x][y] = round3(v + (r - v) / n);
    }
}

/// Estimates are clamped to 3 decimal places after every update.
fn round3(v: Continous) -> Continous {
    (v * 1_000.).round() / 1_000.
}
