use gridworld::{Continous, Discrete};
use itertools::Itertools;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphMdpError {
    #[error("state ({x}, {y}) has no neighbours at Manhattan distance 1")]
    NoNeighbours { x: Discrete, y: Discrete },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Terminal,
    NonTerminal,
}

#[derive(Debug, Clone)]
pub struct GraphState {
    pub x: Discrete,
    pub y: Discrete,
    pub kind: StateKind,
    pub value: Continous,
}

impl GraphState {
    pub fn new(x: Discrete, y: Discrete, kind: StateKind) -> Self {
        Self {
            x,
            y,
            kind,
            value: 0.,
        }
    }
}

/// State-indexed rewards, keyed by role. The reward for landing on a state
/// does not depend on the action taken to reach it.
#[derive(Debug, Clone, Copy)]
pub struct StateRewards {
    pub terminal: Continous,
    pub non_terminal: Continous,
}

impl StateRewards {
    pub fn reward(&self, kind: StateKind) -> Continous {
        match kind {
            StateKind::Terminal => self.terminal,
            StateKind::NonTerminal => self.non_terminal,
        }
    }
}

impl Default for StateRewards {
    fn default() -> Self {
        Self {
            terminal: 0.,
            non_terminal: -1.,
        }
    }
}

/// Markov Decision Process - Sutton & Barto 2018. States are connected by
/// the implicit 4-neighbour grid adjacency and evaluated under a uniform
/// policy over neighbour moves.
#[derive(Debug, Clone)]
pub struct GraphMdp {
    states: Vec<GraphState>,
    neighbours: Vec<Vec<usize>>,
    rewards: StateRewards,
    gamma: Continous,
}

impl GraphMdp {
    /// Every state of a height x width rectangle, all non-terminal with
    /// value 0. Callers mark terminal states before building the MDP.
    pub fn rectangle(height: Discrete, width: Discrete) -> Vec<GraphState> {
        (0..height)
            .cartesian_product(0..width)
            .map(|(x, y)| GraphState::new(x, y, StateKind::NonTerminal))
            .collect()
    }

    /// Precomputes every state's neighbour list once. A state with no
    /// neighbour at Manhattan distance 1 is rejected here, so no backup can
    /// divide by a zero neighbour count.
    pub fn new(
        states: Vec<GraphState>,
        rewards: StateRewards,
        gamma: Continous,
    ) -> Result<Self, GraphMdpError> {
        let neighbours = states
            .iter()
            .map(|s| {
                states
                    .iter()
                    .positions(|o| (s.x - o.x).abs() + (s.y - o.y).abs() == 1)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        if let Some(i) = neighbours.iter().position(|n| n.is_empty()) {
            return Err(GraphMdpError::NoNeighbours {
                x: states[i].x,
                y: states[i].y,
            });
        }

        Ok(Self {
            states,
            neighbours,
            rewards,
            gamma,
        })
    }

    pub fn n_s(&self) -> usize {
        self.states.len()
    }

    #[allow(dead_code)]
    pub fn gamma(&self) -> Continous {
        self.gamma
    }

    pub fn states(&self) -> &[GraphState] {
        &self.states
    }

    pub fn neighbours(&self, s: usize) -> &[usize] {
        &self.neighbours[s]
    }

    pub fn is_terminal(&self, s: usize) -> bool {
        self.states[s].kind == StateKind::Terminal
    }

    /// Snapshot of all state values.
    pub fn values(&self) -> Vec<Continous> {
        self.states.iter().map(|s| s.value).collect()
    }

    /// 1-step Bellman expectation backup for one state, reading neighbour
    /// values from the `old` snapshot.
    pub fn backup(&self, s: usize, old: &[Continous]) -> Continous {
        let ns = &self.neighbours[s];
        let p = 1. / ns.len() as Continous;

        ns.iter()
            .map(|&n| p * (self.rewards.reward(self.states[n].kind) + self.gamma * old[n]))
            .sum()
    }

    pub(crate) fn set_value(&mut self, s: usize, value: Continous) {
        self.states[s].value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_enumerates_row_major_non_terminal_states() {
        let states = GraphMdp::rectangle(2, 3);

        assert_eq!(states.len(), 6);
        assert_eq!((states[0].x, states[0].y), (0, 0));
        assert_eq!((states[4].x, states[4].y), (1, 1));
        assert!(states
            .iter()
            .all(|s| s.kind == StateKind::NonTerminal && s.value == 0.));
    }

    #[test]
    fn adjacency_is_precomputed_from_manhattan_distance() {
        let mdp = GraphMdp::new(GraphMdp::rectangle(2, 2), StateRewards::default(), 0.9).unwrap();

        assert_eq!(mdp.neighbours(0), [1, 2]);
        assert_eq!(mdp.neighbours(3), [1, 2]);
    }

    #[test]
    fn lone_state_is_a_degenerate_adjacency() {
        let states = vec![GraphState::new(0, 0, StateKind::NonTerminal)];

        assert_eq!(
            GraphMdp::new(states, StateRewards::default(), 0.9).unwrap_err(),
            GraphMdpError::NoNeighbours { x: 0, y: 0 }
        );
    }

    #[test]
    fn disconnected_state_is_a_degenerate_adjacency() {
        let states = vec![
            GraphState::new(0, 0, StateKind::NonTerminal),
            GraphState::new(0, 1, StateKind::NonTerminal),
            GraphState::new(0, 3, StateKind::Terminal),
        ];

        assert_eq!(
            GraphMdp::new(states, StateRewards::default(), 0.9).unwrap_err(),
            GraphMdpError::NoNeighbours { x: 0, y: 3 }
        );
    }
}
