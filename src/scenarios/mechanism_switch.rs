/// Switching from GSP to VCG halfway through the run.
///
/// - Variant A: GSP throughout
///
/// - Variant B: VCG throughout
///
/// - Variant C: switch, which should match A on the first half of the rounds and B on the second half

use crate::agents::{AgentSpec, AgentType};
use crate::config::SimulationConfig;
use crate::experiment::Experiment;
use crate::logger::{Logger, LogEvent};
use crate::mechanism::MechanismType;
use crate::scenarios::Validations;
use crate::utils;
use crate::logln;

inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "mechanism_switch",
    run,
});

fn prepare_experiment(mechanism: MechanismType) -> Experiment {
    Experiment::new(SimulationConfig {
        mechanism,
        budget: 1_000_000_000,
        iterations: 2,
        seed: Some(utils::get_seed(5)),
        agent_specs: vec![AgentSpec { agent_type: AgentType::TRUTHFUL, count: 4 }],
        ..SimulationConfig::default()
    })
}

pub fn run(scenario_name: &str, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let stats_a = prepare_experiment(MechanismType::GSP).run_variant("Running GSP", scenario_name, "gsp", logger)?;
    let stats_b = prepare_experiment(MechanismType::VCG).run_variant("Running VCG", scenario_name, "vcg", logger)?;
    let experiment_c = prepare_experiment(MechanismType::SWITCH);
    let stats_c = experiment_c.run_variant("Running GSP then VCG", scenario_name, "switch", logger)?;

    logln!(logger, LogEvent::Scenario, "");
    let mut validations = Validations::new();

    let switch_round = experiment_c.config.num_rounds / 2;
    let mut schedule_ok = true;
    let mut matches_gsp = true;
    let mut matches_vcg = true;
    for ((a, b), c) in stats_a.iterations.iter().zip(stats_b.iterations.iter()).zip(stats_c.iterations.iter()) {
        for record in c.history.rounds() {
            let expected = if record.round < switch_round { "gsp" } else { "vcg" };
            schedule_ok &= record.mechanism_name == expected;

            let reference = if record.round < switch_round { &a.history } else { &b.history };
            let same = reference.round(record.round).map_or(false, |r| r.slot_payments == record.slot_payments);
            if record.round < switch_round {
                matches_gsp &= same;
            } else {
                matches_vcg &= same;
            }
        }
    }

    validations.check(logger, schedule_ok, format!("Variant C runs GSP before round {} and VCG from then on", switch_round));
    validations.check(logger, matches_gsp, "Variant C payments match Variant A (GSP) in the first half".to_string());
    validations.check(logger, matches_vcg, "Variant C payments match Variant B (VCG) in the second half".to_string());

    logln!(logger, LogEvent::Scenario, "Mean revenue (gsp/vcg/switch): {:.2} / {:.2} / {:.2}",
        stats_a.mean_revenue(), stats_b.mean_revenue(), stats_c.mean_revenue());

    validations.finish(scenario_name)
}
