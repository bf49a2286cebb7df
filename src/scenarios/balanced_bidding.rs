/// Balanced bidders competing with truthful bidders under GSP.
/// Balanced bidding shades bids below value, so nobody should ever overbid or lose money in a round.

use crate::agents::{AgentSpec, AgentType};
use crate::config::SimulationConfig;
use crate::experiment::Experiment;
use crate::logger::{Logger, LogEvent};
use crate::mechanism::MechanismType;
use crate::scenarios::Validations;
use crate::utils;
use crate::logln;

inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "balanced_bidding",
    run,
});

pub fn run(scenario_name: &str, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let experiment = Experiment::new(SimulationConfig {
        mechanism: MechanismType::GSP,
        reserve: 20,
        budget: 1_000_000_000,
        iterations: 2,
        seed: Some(utils::get_seed(4)),
        agent_specs: vec![
            AgentSpec { agent_type: AgentType::TRUTHFUL, count: 2 },
            AgentSpec { agent_type: AgentType::BALANCED, count: 3 },
        ],
        ..SimulationConfig::default()
    });
    let stats = experiment.run_variant("Running balanced bidders against truthful bidders", scenario_name, "balanced", logger)?;

    logln!(logger, LogEvent::Scenario, "");
    let mut validations = Validations::new();

    let mut overbids = 0;
    let mut losing_rounds = 0;
    let mut broken_rounds = 0;
    for iteration in &stats.iterations {
        let reserve = experiment.config.reserve;
        for record in iteration.history.rounds() {
            for bid in &record.bids {
                if bid.amount > iteration.values[bid.agent_id] {
                    overbids += 1;
                }
            }
            losing_rounds += record.utilities.iter().filter(|&&utility| utility < 0).count();

            let consistent = record.slot_occupants.len() == record.per_click_payments.len()
                && record.per_click_payments.iter().all(|&p| p >= reserve)
                && record.per_click_payments.windows(2).all(|w| w[0] >= w[1])
                && record.slot_occupants.iter().zip(record.per_click_payments.iter())
                    .all(|(&agent_id, &price)| record.agent_bid(agent_id).map_or(false, |bid| bid >= price));
            if !consistent {
                broken_rounds += 1;
            }
        }
    }

    validations.check(logger, overbids == 0, format!("No agent bids above its value: {} overbids", overbids));
    validations.check(logger, losing_rounds == 0, format!("No agent has negative utility in any round: {} cases", losing_rounds));
    validations.check(logger, broken_rounds == 0, format!("Every round's prices are at least the reserve, non-increasing and below the occupant's bid: {} broken rounds", broken_rounds));

    let balanced = stats.utilities_of(AgentType::BALANCED);
    let truthful = stats.utilities_of(AgentType::TRUTHFUL);
    logln!(logger, LogEvent::Scenario, "Mean utility per agent (balanced/truthful): {:.2} / {:.2}", utils::mean(&balanced), utils::mean(&truthful));

    validations.finish(scenario_name)
}
