use crate::agent::AgentTrait;
use crate::history::History;

/// Budget cap applied around any agent
/// Once an agent's spend over the previous rounds reaches its budget, its bids are forced to zero.
/// The wrapped strategy is still asked for a bid every round so stateful strategies keep observing the history.
pub struct AgentBudgetCapped {
    pub inner: Box<dyn AgentTrait>,
    pub budget: u64,
}

impl AgentBudgetCapped {
    pub fn new(inner: Box<dyn AgentTrait>, budget: u64) -> Self {
        Self { inner, budget }
    }

    /// Whether the agent may still bid in `round` (spend through round - 1 strictly below budget)
    pub fn has_budget(&self, round: usize, history: &History) -> bool {
        history.total_spent(self.inner.agent_id(), round) < self.budget
    }
}

impl AgentTrait for AgentBudgetCapped {
    fn agent_id(&self) -> usize {
        self.inner.agent_id()
    }

    fn agent_name(&self) -> &str {
        self.inner.agent_name()
    }

    fn value_per_click(&self) -> u64 {
        self.inner.value_per_click()
    }

    fn initial_bid(&mut self, reserve: u64) -> u64 {
        // Nothing has been spent before the first round
        self.inner.initial_bid(reserve)
    }

    fn bid(&mut self, round: usize, history: &History, reserve: u64) -> u64 {
        let bid = self.inner.bid(round, history, reserve);
        if self.has_budget(round, history) {
            bid
        } else {
            0
        }
    }

    fn strategy_string(&self) -> String {
        format!("{}, budget {}", self.inner.strategy_string(), self.budget)
    }
}
