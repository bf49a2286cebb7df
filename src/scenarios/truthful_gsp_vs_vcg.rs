/// Truthful bidders facing GSP and VCG.
///
/// With identical truthful bids and the same tie-break randomness both mechanisms allocate the same way,
/// and VCG never charges more than GSP for the same slot.
///
/// - Variant A: GSP
///
/// - Variant B: VCG

use crate::agents::{AgentSpec, AgentType};
use crate::config::SimulationConfig;
use crate::experiment::Experiment;
use crate::logger::{Logger, LogEvent};
use crate::mechanism::MechanismType;
use crate::scenarios::Validations;
use crate::utils;
use crate::logln;

// Register this scenario in the catalog
inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "truthful_gsp_vs_vcg",
    run,
});

fn prepare_experiment(mechanism: MechanismType) -> Experiment {
    Experiment::new(SimulationConfig {
        mechanism,
        // Budget never binds, so both variants see the same bids every round
        budget: 1_000_000_000,
        iterations: 2,
        seed: Some(utils::get_seed(1)),
        agent_specs: vec![AgentSpec { agent_type: AgentType::TRUTHFUL, count: 5 }],
        ..SimulationConfig::default()
    })
}

pub fn run(scenario_name: &str, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let stats_a = prepare_experiment(MechanismType::GSP).run_variant("Running truthful agents under GSP", scenario_name, "gsp", logger)?;
    let stats_b = prepare_experiment(MechanismType::VCG).run_variant("Running truthful agents under VCG", scenario_name, "vcg", logger)?;

    logln!(logger, LogEvent::Scenario, "");
    let mut validations = Validations::new();

    validations.check(logger, stats_b.total_revenue() <= stats_a.total_revenue(), format!(
        "Variant B (VCG) revenue is not above Variant A (GSP): {} <= {}",
        stats_b.total_revenue(), stats_a.total_revenue()
    ));

    validations.check(logger, stats_b.total_utility() >= stats_a.total_utility(), format!(
        "Variant B (VCG) agent utility is not below Variant A (GSP): {} >= {}",
        stats_b.total_utility(), stats_a.total_utility()
    ));

    let same_allocations = stats_a.iterations.iter().zip(stats_b.iterations.iter()).all(|(a, b)| {
        a.history.rounds().iter().zip(b.history.rounds().iter()).all(|(ra, rb)| ra.slot_occupants == rb.slot_occupants)
    });
    validations.check(logger, same_allocations, "Both variants allocate every round identically".to_string());

    validations.finish(scenario_name)
}
