/// Effect of the reserve price on truthful bidders under GSP.
///
/// - Variant A: no reserve
///
/// - Variant B: reserve of 100 (values are drawn from 25..=175, so some agents never qualify)

use crate::agents::{AgentSpec, AgentType};
use crate::config::SimulationConfig;
use crate::experiment::Experiment;
use crate::logger::{Logger, LogEvent};
use crate::mechanism::MechanismType;
use crate::scenarios::Validations;
use crate::utils;
use crate::logln;

inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "reserve_price",
    run,
});

const HIGH_RESERVE: u64 = 100;

fn prepare_experiment(reserve: u64) -> Experiment {
    Experiment::new(SimulationConfig {
        mechanism: MechanismType::GSP,
        reserve,
        budget: 1_000_000_000,
        iterations: 2,
        seed: Some(utils::get_seed(2)),
        agent_specs: vec![AgentSpec { agent_type: AgentType::TRUTHFUL, count: 5 }],
        ..SimulationConfig::default()
    })
}

pub fn run(scenario_name: &str, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let stats_a = prepare_experiment(0).run_variant("Running without reserve", scenario_name, "no-reserve", logger)?;
    let stats_b = prepare_experiment(HIGH_RESERVE).run_variant("Running with high reserve", scenario_name, "high-reserve", logger)?;

    logln!(logger, LogEvent::Scenario, "");
    let mut validations = Validations::new();

    validations.check(logger, stats_b.filled_slots() <= stats_a.filled_slots(), format!(
        "Variant B (reserve {}) fills no more slots than Variant A (no reserve): {} <= {}",
        HIGH_RESERVE, stats_b.filled_slots(), stats_a.filled_slots()
    ));

    let rounds_b = || stats_b.iterations.iter().flat_map(|it| it.history.rounds().iter());

    let payments_above_reserve = rounds_b().all(|record| record.per_click_payments.iter().all(|&p| p >= HIGH_RESERVE));
    validations.check(logger, payments_above_reserve, format!("Variant B charges at least the reserve {} per click", HIGH_RESERVE));

    let occupants_qualify = rounds_b().all(|record| {
        record.slot_occupants.iter().all(|&agent_id| record.agent_bid(agent_id).map_or(false, |bid| bid >= HIGH_RESERVE))
    });
    validations.check(logger, occupants_qualify, "Variant B only allocates slots to bids at or above the reserve".to_string());

    validations.finish(scenario_name)
}
