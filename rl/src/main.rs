mod config;
mod mdps;

use anyhow::Result;
use config::*;
use gridworld::Environment;
use mdps::mdp::*;
use mdps::solvers::{
    mc_methods::McFirstVisit, q_learning::QLearner, value_iteration::value_iteration,
    RandomWalkEpisodes,
};
use rand::prelude::*;
use tracing::info;

const LAYOUT: [&str; 5] = ["SW---G", "-WW-WW", "----W-", "-WW---", "----W-"];

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Q-learning control of the grid MDP.
    let env = &mut Environment::from_layout(&LAYOUT)?;
    let config = QLearnerConfig::default();
    let learner = &mut QLearner::new(config.clone(), env.n_s());
    let rng = &mut StdRng::seed_from_u64(2718);
    let total = learner.train(env, rng);
    info!(episodes = config.episodes, total, "q-learning finished");
    info!("q table: {}", serde_json::to_string(learner.q_values())?);
    let ret = learner.evaluate(env);
    info!(ret, "greedy replay return");
    info!("greedy replay ends at:\n{}", env.render_ansi());

    // Monte Carlo prediction under the uniform-random policy.
    let env = &mut Environment::from_layout(&LAYOUT)?;
    let (height, width) = (env.model().height(), env.model().width());
    let mc = &mut McFirstVisit::new(McConfig::default(), height, width);
    mc.run(&mut RandomWalkEpisodes::new(env, 2718));
    info!("state values: {}", serde_json::to_string(mc.values())?);
    info!("visit counts: {}", serde_json::to_string(mc.visit_counts())?);

    // Value iteration on the 4x4 neighbour-graph MDP with two opposite
    // corner terminals.
    let vi = ValueIterationConfig {
        gamma: 1.,
        ..Default::default()
    };
    let mut states = GraphMdp::rectangle(4, 4);
    states[0].kind = StateKind::Terminal;
    states[15].kind = StateKind::Terminal;
    let mdp = &mut GraphMdp::new(states, StateRewards::default(), vi.gamma)?;
    value_iteration(mdp, vi.theta);
    let values = mdp.states().iter().map(|s| s.value).collect::<Vec<_>>();
    info!("graph values: {}", serde_json::to_string(&values)?);

    Ok(())
}
