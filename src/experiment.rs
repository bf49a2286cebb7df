use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use crate::agents::{AgentType, Agents};
use crate::config::SimulationConfig;
use crate::history::History;
use crate::logger::{Logger, LogEvent, FileReceiver, sanitize_filename};
use crate::simulationrun::{SimulationRun, SimulationStat};
use crate::utils::{make_rng, mean, stddev, TOTAL_SIMULATION_RUNS, VERBOSE_ROUNDS};
use crate::logln;

/// Everything one iteration produced
pub struct IterationOutcome {
    pub seed: Option<u64>,
    pub agent_types: Vec<AgentType>,
    pub values: Vec<u64>,
    pub history: History,
    pub stat: SimulationStat,
}

impl IterationOutcome {
    /// Mean total utility of the agents of one type, None if there are none
    pub fn mean_utility_of(&self, agent_type: AgentType) -> Option<f64> {
        let utilities: Vec<f64> = self.agent_types.iter()
            .zip(self.stat.agent_stats.iter())
            .filter(|(t, _)| **t == agent_type)
            .map(|(_, agent_stat)| agent_stat.total_utility as f64)
            .collect();
        if utilities.is_empty() {
            None
        } else {
            Some(mean(&utilities))
        }
    }
}

/// Results across all iterations of an experiment
pub struct ExperimentStat {
    pub iterations: Vec<IterationOutcome>,
}

impl ExperimentStat {
    pub fn revenues(&self) -> Vec<f64> {
        self.iterations.iter().map(|it| it.stat.overall_stat.total_revenue as f64).collect()
    }

    pub fn mean_revenue(&self) -> f64 {
        mean(&self.revenues())
    }

    pub fn total_revenue(&self) -> u64 {
        self.iterations.iter().map(|it| it.stat.overall_stat.total_revenue).sum()
    }

    pub fn total_utility(&self) -> i64 {
        self.iterations.iter().map(|it| it.stat.overall_stat.total_utility).sum()
    }

    pub fn filled_slots(&self) -> usize {
        self.iterations.iter().map(|it| it.stat.overall_stat.filled_slots).sum()
    }

    /// Per-iteration mean utility of the given agent type (iterations without such agents are skipped)
    pub fn utilities_of(&self, agent_type: AgentType) -> Vec<f64> {
        self.iterations.iter().filter_map(|it| it.mean_utility_of(agent_type)).collect()
    }

    /// Agent types present in any iteration, in order of first appearance
    fn agent_types(&self) -> Vec<AgentType> {
        let mut types = Vec::new();
        for iteration in &self.iterations {
            for agent_type in &iteration.agent_types {
                if !types.contains(agent_type) {
                    types.push(*agent_type);
                }
            }
        }
        types
    }

    pub fn printout(&self, logger: &mut Logger) {
        let event = LogEvent::Experiment;
        let revenues = self.revenues();
        logln!(logger, event, "\n=== Experiment Statistics ({} iterations) ===", self.iterations.len());
        let seeds: Vec<String> = self.iterations.iter()
            .map(|it| it.seed.map_or("entropy".to_string(), |seed| seed.to_string()))
            .collect();
        logln!(logger, event, "Seeds: {}", seeds.join(", "));
        logln!(logger, event, "Revenue: mean {:.2}, stddev {:.2}", mean(&revenues), stddev(&revenues));
        for agent_type in self.agent_types() {
            let utilities = self.utilities_of(agent_type);
            logln!(logger, event, "Utility per {} agent: mean {:.2}, stddev {:.2}", agent_type.as_str(), mean(&utilities), stddev(&utilities));
        }
    }
}

/// Runs a configuration over several iterations, each with freshly drawn agent values
pub struct Experiment {
    pub config: SimulationConfig,
}

impl Experiment {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Seed of iteration `iteration`, None for entropy-seeded runs
    pub fn iteration_seed(&self, iteration: usize) -> Option<u64> {
        self.config.seed.map(|seed| seed.wrapping_add(iteration as u64))
    }

    /// Run a single iteration
    /// The same RNG draws agent values first and then drives the tie-breaks,
    /// so two configurations with the same seed see the same agents
    pub fn run_iteration(&self, iteration: usize, logger: &mut Logger) -> IterationOutcome {
        let seed = self.iteration_seed(iteration);
        let mut rng = make_rng(seed);

        let value_generator = self.config.value_generator();
        let mut agents = Agents::from_specs(&self.config.agent_specs, value_generator.as_ref(), self.config.budget, self.config.num_rounds, &mut rng);

        let run = SimulationRun::new(&mut agents, &self.config, &mut rng, logger);
        TOTAL_SIMULATION_RUNS.fetch_add(1, Ordering::Relaxed);

        let stat = SimulationStat::new(&agents, &run.history);
        stat.printout(&agents, logger);

        IterationOutcome {
            seed,
            agent_types: agents.agent_types.clone(),
            values: agents.agents.iter().map(|agent| agent.value_per_click()).collect(),
            history: run.history,
            stat,
        }
    }

    /// Run all iterations
    ///
    /// # Arguments
    /// * `description` - Human readable description of the variant
    /// * `scenario_name` - Name of the scenario (for log file paths)
    /// * `variant_name` - Short name of the variant (for log file paths)
    /// * `logger` - Logger for event-based logging
    pub fn run_variant(&self, description: &str, scenario_name: &str, variant_name: &str, logger: &mut Logger) -> Result<ExperimentStat, Box<dyn Error>> {
        logln!(logger, LogEvent::Scenario, "\n=== {} ===", description);
        logln!(logger, LogEvent::Simulation, "{}", self.config.summary_string());

        let mut iterations = Vec::with_capacity(self.config.iterations);
        for iteration in 0..self.config.iterations {
            logln!(logger, LogEvent::Simulation, "\n=== {} - Iteration {} ===", variant_name, iteration + 1);

            let rounds_receiver_id = if VERBOSE_ROUNDS.load(Ordering::Relaxed) {
                let path = PathBuf::from(format!("log/{}/rounds-{}-iter{}.log", sanitize_filename(scenario_name), sanitize_filename(variant_name), iteration + 1));
                Some(logger.add_receiver(FileReceiver::new(&path, vec![LogEvent::Round])?))
            } else {
                None
            };

            iterations.push(self.run_iteration(iteration, logger));

            if let Some(receiver_id) = rounds_receiver_id {
                logger.remove_receiver(receiver_id);
            }
        }

        let stats = ExperimentStat { iterations };
        stats.printout(logger);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentSpec;
    use crate::mechanism::MechanismType;

    fn config(mechanism: MechanismType, iterations: usize) -> SimulationConfig {
        SimulationConfig {
            mechanism,
            iterations,
            num_rounds: 12,
            seed: Some(100),
            agent_specs: vec![
                AgentSpec { agent_type: AgentType::TRUTHFUL, count: 3 },
                AgentSpec { agent_type: AgentType::BALANCED, count: 2 },
            ],
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_iterations_use_consecutive_seeds() {
        let experiment = Experiment::new(config(MechanismType::GSP, 3));
        let mut logger = Logger::new();
        let stats = experiment.run_variant("GSP", "test", "gsp", &mut logger).unwrap();

        assert_eq!(stats.iterations.len(), 3);
        let seeds: Vec<Option<u64>> = stats.iterations.iter().map(|it| it.seed).collect();
        assert_eq!(seeds, vec![Some(100), Some(101), Some(102)]);
        assert!(stats.iterations.iter().all(|it| it.history.num_rounds() == 12));
        assert_eq!(stats.utilities_of(AgentType::TRUTHFUL).len(), 3);
        assert!(stats.utilities_of(AgentType::ADAPTIVE { step: 5 }).is_empty());
    }

    #[test]
    fn test_printout_reports_seeds() {
        use crate::logger::MemoryReceiver;
        use std::cell::RefCell;
        use std::rc::Rc;

        let buffer = Rc::new(RefCell::new(String::new()));
        let mut logger = Logger::new();
        logger.add_receiver(Box::new(MemoryReceiver { enabled_events: vec![LogEvent::Experiment], buffer: buffer.clone() }));

        Experiment::new(config(MechanismType::GSP, 2)).run_variant("GSP", "test", "gsp", &mut logger).unwrap();
        assert!(buffer.borrow().contains("Seeds: 100, 101"));
    }

    #[test]
    fn test_same_seed_same_agents_across_mechanisms() {
        let mut logger = Logger::new();
        let gsp = Experiment::new(config(MechanismType::GSP, 1)).run_iteration(0, &mut logger);
        let vcg = Experiment::new(config(MechanismType::VCG, 1)).run_iteration(0, &mut logger);
        assert_eq!(gsp.values, vcg.values);
        assert_eq!(gsp.agent_types, vcg.agent_types);
    }

    #[test]
    fn test_mean_utility_of_type() {
        let mut logger = Logger::new();
        let outcome = Experiment::new(config(MechanismType::VCG, 1)).run_iteration(0, &mut logger);
        let truthful: Vec<f64> = outcome.stat.agent_stats[..3].iter().map(|s| s.total_utility as f64).collect();
        assert_eq!(outcome.mean_utility_of(AgentType::TRUTHFUL), Some(mean(&truthful)));
        assert_eq!(outcome.mean_utility_of(AgentType::BUDGET_PACING), None);
    }
}
