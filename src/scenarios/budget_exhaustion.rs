/// Truthful bidders with a small budget under GSP.
/// Agents that have spent their budget must bid zero and drop out of the auction.

use crate::agents::{AgentSpec, AgentType};
use crate::config::SimulationConfig;
use crate::experiment::Experiment;
use crate::logger::{Logger, LogEvent};
use crate::mechanism::MechanismType;
use crate::scenarios::Validations;
use crate::utils;
use crate::logln;

inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "budget_exhaustion",
    run,
});

const BUDGET: u64 = 3000;

pub fn run(scenario_name: &str, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let experiment = Experiment::new(SimulationConfig {
        mechanism: MechanismType::GSP,
        reserve: 10,
        budget: BUDGET,
        iterations: 2,
        seed: Some(utils::get_seed(3)),
        agent_specs: vec![AgentSpec { agent_type: AgentType::TRUTHFUL, count: 5 }],
        ..SimulationConfig::default()
    });
    let stats = experiment.run_variant("Running truthful agents with a small budget", scenario_name, "small-budget", logger)?;

    logln!(logger, LogEvent::Scenario, "");
    let mut validations = Validations::new();

    let mut exhausted_agents = 0;
    let mut violations = 0;
    for iteration in &stats.iterations {
        let history = &iteration.history;
        for agent_id in 0..history.num_agents {
            if history.total_spent(agent_id, history.num_rounds()) >= BUDGET {
                exhausted_agents += 1;
            }
        }
        for record in history.rounds().iter().skip(1) {
            for bid in &record.bids {
                let out_of_budget = history.total_spent(bid.agent_id, record.round) >= BUDGET;
                if out_of_budget && (bid.amount != 0 || record.agent_slot(bid.agent_id).is_some()) {
                    violations += 1;
                }
            }
        }
    }

    validations.check(logger, exhausted_agents > 0, format!("Some agents exhaust their budget of {}: {} agents", BUDGET, exhausted_agents));
    validations.check(logger, violations == 0, format!("Agents out of budget bid zero and win nothing: {} violations", violations));

    validations.finish(scenario_name)
}
