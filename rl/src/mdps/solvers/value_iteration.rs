use crate::mdps::mdp::GraphMdp;
use gridworld::Continous;
use tracing::info;

/// Synchronous value iteration: every sweep backs all states up from the
/// previous sweep's values, with terminal states pinned at 0. Stops once the
/// largest absolute per-state change falls below theta and returns the sweep
/// count.
pub fn value_iteration(mdp: &mut GraphMdp, theta: Continous) -> usize {
    let mut i = 0;

    loop {
        let old = mdp.values();
        let mut delta: Continous = 0.;

        for s in 0..mdp.n_s() {
            let value = if mdp.is_terminal(s) {
                0.
            } else {
                mdp.backup(s, &old)
            };
            delta = delta.max((old[s] - value).abs());
            mdp.set_value(s, value);
        }

        i += 1;
        if delta < theta {
            info!(iterations = i, "value iteration converged");
            return i;
        }
    }
}
