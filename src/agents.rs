use rand::rngs::StdRng;
use crate::agent::{AgentBidderTrait, AgentGeneral};
use crate::agent_bidders::{BidderAdaptive, BidderBalanced, BidderBudgetPacing, BidderTruthful};
use crate::budget::AgentBudgetCapped;
use crate::values::ValueGeneratorTrait;
pub use crate::agent::AgentTrait;

/// Default step of adaptive bidders, in currency units
pub const DEFAULT_ADAPTIVE_STEP: u64 = 5;

/// Bidding strategy of an agent
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentType {
    TRUTHFUL,
    BALANCED,
    ADAPTIVE { step: u64 },
    BUDGET_PACING,
}

impl AgentType {
    /// Parse a strategy name as used on the command line; returns None for unknown names
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "truthful" => Some(AgentType::TRUTHFUL),
            "balanced" | "bb" => Some(AgentType::BALANCED),
            "adaptive" => Some(AgentType::ADAPTIVE { step: DEFAULT_ADAPTIVE_STEP }),
            "pacing" => Some(AgentType::BUDGET_PACING),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::TRUTHFUL => "truthful",
            AgentType::BALANCED => "balanced",
            AgentType::ADAPTIVE { .. } => "adaptive",
            AgentType::BUDGET_PACING => "pacing",
        }
    }
}

/// A number of agents sharing one strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSpec {
    pub agent_type: AgentType,
    pub count: usize,
}

/// Container for the agent population
/// Agent IDs are always equal to the index in `agents`
pub struct Agents {
    pub agents: Vec<Box<dyn AgentTrait>>,
    pub agent_types: Vec<AgentType>,
}

impl Agents {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            agent_types: Vec::new(),
        }
    }

    /// Build a population from specs, drawing each agent's value from the generator
    /// Every agent is wrapped in a budget cap
    pub fn from_specs(specs: &[AgentSpec], value_generator: &dyn ValueGeneratorTrait, budget: u64, num_rounds: usize, rng: &mut StdRng) -> Self {
        let mut agents = Self::new();
        for spec in specs {
            for _ in 0..spec.count {
                let value_per_click = value_generator.generate_value(rng);
                agents.add(spec.agent_type, value_per_click, budget, num_rounds);
            }
        }
        agents
    }

    /// Add an agent (ID is automatically set to match Vec index)
    ///
    /// # Arguments
    /// * `agent_type` - Bidding strategy
    /// * `value_per_click` - Agent's value of one click
    /// * `budget` - Spend after which the agent's bids are forced to zero
    /// * `num_rounds` - Length of the run, used by budget pacing
    ///
    /// # Returns
    /// The agent_id of the just added agent
    pub fn add(&mut self, agent_type: AgentType, value_per_click: u64, budget: u64, num_rounds: usize) -> usize {
        let agent_id = self.agents.len();

        let bidder: Box<dyn AgentBidderTrait> = match agent_type {
            AgentType::TRUTHFUL => Box::new(BidderTruthful),
            AgentType::BALANCED => Box::new(BidderBalanced),
            AgentType::ADAPTIVE { step } => Box::new(BidderAdaptive { step }),
            AgentType::BUDGET_PACING => Box::new(BidderBudgetPacing::new(budget, num_rounds)),
        };

        let agent = AgentGeneral {
            agent_id,
            agent_name: format!("{}{}", agent_type.as_str(), agent_id),
            value_per_click,
            bidder,
        };

        self.agents.push(Box::new(AgentBudgetCapped::new(Box::new(agent), budget)));
        self.agent_types.push(agent_type);
        agent_id
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }
}

impl Default for Agents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{ValueGeneratorFixed, ValueGeneratorUniform};
    use rand::SeedableRng;

    #[test]
    fn test_parse_agent_types() {
        assert_eq!(AgentType::parse("Truthful"), Some(AgentType::TRUTHFUL));
        assert_eq!(AgentType::parse("bb"), Some(AgentType::BALANCED));
        assert_eq!(AgentType::parse("adaptive"), Some(AgentType::ADAPTIVE { step: DEFAULT_ADAPTIVE_STEP }));
        assert_eq!(AgentType::parse("pacing"), Some(AgentType::BUDGET_PACING));
        assert_eq!(AgentType::parse("random"), None);
    }

    #[test]
    fn test_ids_match_index() {
        let mut rng = StdRng::seed_from_u64(1);
        let specs = vec![
            AgentSpec { agent_type: AgentType::TRUTHFUL, count: 2 },
            AgentSpec { agent_type: AgentType::BALANCED, count: 3 },
        ];
        let agents = Agents::from_specs(&specs, ValueGeneratorUniform::new(25, 175).as_ref(), 1000, 10, &mut rng);
        assert_eq!(agents.len(), 5);
        for (index, agent) in agents.agents.iter().enumerate() {
            assert_eq!(agent.agent_id(), index);
            assert!((25..=175).contains(&agent.value_per_click()));
        }
        assert_eq!(agents.agent_types[4], AgentType::BALANCED);
        assert_eq!(agents.agents[3].agent_name(), "balanced3");
    }

    #[test]
    fn test_agents_are_budget_capped() {
        let mut rng = StdRng::seed_from_u64(1);
        let specs = vec![AgentSpec { agent_type: AgentType::TRUTHFUL, count: 1 }];
        let agents = Agents::from_specs(&specs, ValueGeneratorFixed::new(10).as_ref(), 250, 10, &mut rng);
        assert!(agents.agents[0].strategy_string().ends_with("budget 250"));
    }
}
