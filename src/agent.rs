use crate::history::History;

/// Trait for agents bidding in the slot auctions
pub trait AgentTrait {
    /// Get the agent ID (equal to its index in the agent population)
    fn agent_id(&self) -> usize;

    /// Get the agent name
    fn agent_name(&self) -> &str;

    /// Value of one click to this agent
    fn value_per_click(&self) -> u64;

    /// Bid for round 0, when there is no history yet
    fn initial_bid(&mut self, reserve: u64) -> u64;

    /// Bid for round `round` (>= 1), given the history of rounds 0..round
    fn bid(&mut self, round: usize, history: &History, reserve: u64) -> u64;

    /// Get a string representation of the bidding strategy for logging
    fn strategy_string(&self) -> String;
}

/// Trait for agent bidding strategies
/// Strategies only decide the bid; identity and value live in the agent
pub trait AgentBidderTrait {
    /// Bid when there is no history to learn from
    fn initial_bid(&self, value_per_click: u64, reserve: u64) -> u64;

    /// Calculate the bid for the given round
    ///
    /// # Arguments
    /// * `agent_id` - Agent the bid is placed for (to look itself up in the history)
    /// * `value_per_click` - Agent's value of a click
    /// * `round` - Current round, at least 1
    /// * `history` - Records of all previous rounds
    /// * `reserve` - Reserve price of the auction
    fn get_bid(&mut self, agent_id: usize, value_per_click: u64, round: usize, history: &History, reserve: u64) -> u64;

    /// Get a string representation of the bidding type
    fn get_bidding_type(&self) -> String;
}

/// An agent is an identity, a per-click value and a bidding strategy
pub struct AgentGeneral {
    pub agent_id: usize,
    pub agent_name: String,
    pub value_per_click: u64,
    pub bidder: Box<dyn AgentBidderTrait>,
}

impl AgentTrait for AgentGeneral {
    fn agent_id(&self) -> usize {
        self.agent_id
    }

    fn agent_name(&self) -> &str {
        &self.agent_name
    }

    fn value_per_click(&self) -> u64 {
        self.value_per_click
    }

    fn initial_bid(&mut self, reserve: u64) -> u64 {
        self.bidder.initial_bid(self.value_per_click, reserve)
    }

    fn bid(&mut self, round: usize, history: &History, reserve: u64) -> u64 {
        self.bidder.get_bid(self.agent_id, self.value_per_click, round, history, reserve)
    }

    fn strategy_string(&self) -> String {
        format!("{} (value {})", self.bidder.get_bidding_type(), self.value_per_click)
    }
}
