mod utils;
mod auction;
mod mechanism;
mod gsp;
mod vcg;
mod history;
mod agent;
mod agent_bidders;
mod agents;
mod budget;
mod controllers;
mod values;
mod logger;
mod simulationrun;
mod experiment;
mod config;
mod charts;
mod scenarios;

use config::{parse_args, SimulationConfig};
use experiment::Experiment;
use logger::{Logger, LogEvent, ConsoleReceiver, sanitize_filename};
use std::path::PathBuf;

use scenarios::get_scenario_catalog;
use utils::{RAND_SEED, TOTAL_SIMULATION_RUNS, VERBOSE_ROUNDS};
use std::sync::atomic::Ordering;

/// Parse the run flags or exit before any round is simulated
fn config_or_exit(args: &[String]) -> SimulationConfig {
    match parse_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_simulation(config: SimulationConfig) {
    let mut logger = Logger::new();
    let mut events = vec![LogEvent::Simulation, LogEvent::Experiment, LogEvent::Scenario];
    if VERBOSE_ROUNDS.load(Ordering::Relaxed) {
        events.push(LogEvent::Round);
    }
    logger.add_receiver(ConsoleReceiver::new(events));

    let description = format!("Running {} agents under {}", config.num_agents(), config.mechanism.as_str());
    let variant_name = config.mechanism.as_str();
    if let Err(e) = Experiment::new(config).run_variant(&description, "run", variant_name, &mut logger) {
        eprintln!("Error running simulation: {}", e);
        std::process::exit(1);
    }
}

fn main() {
    let raw_args: Vec<String> = std::env::args().collect();

    // Parse and filter out --verbose and --fastbreak arguments
    let mut args = Vec::new();
    let mut skip_next = false;
    let mut fastbreak = false;
    for (i, arg) in raw_args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--verbose" {
            if i + 1 < raw_args.len() && raw_args[i+1] == "rounds" {
                VERBOSE_ROUNDS.store(true, Ordering::Relaxed);
                skip_next = true;
            }
            continue;
        }
        if arg == "--fastbreak" {
            fastbreak = true;
            continue;
        }
        args.push(arg.clone());
    }

    // No arguments: default configuration
    if args.len() <= 1 {
        run_simulation(SimulationConfig::default());
        return;
    }

    if args[1] == "run" {
        run_simulation(config_or_exit(&args[2..]));
        return;
    }

    if args[1] == "charts" {
        let config = config_or_exit(&args[2..]);
        match charts::generate_all_charts(&config) {
            Ok(()) => {
                println!("All chart generation completed successfully.");
            }
            Err(e) => {
                eprintln!("Error generating charts: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let scenario_arg = &args[1];

    let iterations = if args.len() > 2 {
        match args[2].parse::<u64>() {
            Ok(n) if n > 0 => n,
            _ => {
                eprintln!("Error: Invalid iterations parameter '{}'. Expected a positive number.", args[2]);
                std::process::exit(1);
            }
        }
    } else {
        1
    };

    let start_iteration = if args.len() > 3 {
        match args[3].parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: Invalid start iteration parameter '{}'. Expected a number.", args[3]);
                std::process::exit(1);
            }
        }
    } else {
        0
    };

    let all_scenarios = get_scenario_catalog();
    let scenarios: Vec<_> = if scenario_arg == "all" {
        all_scenarios.clone()
    } else {
        match all_scenarios.iter().find(|s| s.short_name == scenario_arg) {
            Some(scenario) => vec![scenario.clone()],
            None => {
                eprintln!("Error: Unknown command or scenario '{}'.", scenario_arg);
                eprintln!("Commands: run, charts, all");
                eprintln!("Available scenarios:");
                for s in &all_scenarios {
                    eprintln!("  {}", s.short_name);
                }
                std::process::exit(1);
            }
        }
    };

    // Scenario details go to the console only for a single run of a single scenario
    let mut logger = Logger::new();
    if scenario_arg != "all" && iterations == 1 {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation, LogEvent::Scenario]));
    } else {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation]));
    }

    let summary_receiver_id = logger.add_file_receiver(&PathBuf::from("log/summary.log"), vec![LogEvent::Validation]);

    TOTAL_SIMULATION_RUNS.store(0, Ordering::Relaxed);
    let target = if scenario_arg == "all" { "all scenarios".to_string() } else { format!("scenario '{}'", scenario_arg) };
    if iterations > 1 {
        logln!(&mut logger, LogEvent::Validation, "Running {} {} times...\n", target, iterations);
    } else {
        logln!(&mut logger, LogEvent::Validation, "Running {}...\n", target);
    }

    let mut failures = 0;
    'scenarios: for scenario in &scenarios {
        log!(&mut logger, LogEvent::Validation, "{}: ", scenario.short_name);

        let scenario_log = PathBuf::from(format!("log/{}/scenario.log", sanitize_filename(scenario.short_name)));
        let scenario_receiver_id = logger.add_file_receiver(&scenario_log, vec![LogEvent::Scenario]);

        for i in start_iteration..(start_iteration + iterations) {
            if iterations > 1 {
                log!(&mut logger, LogEvent::Validation, "[{}/{}] ", i - start_iteration + 1, iterations);
            }

            RAND_SEED.store(i, Ordering::Relaxed);

            match (scenario.run)(scenario.short_name, &mut logger) {
                Ok(()) => {
                    if iterations > 1 {
                        logln!(&mut logger, LogEvent::Validation, "✓");
                    } else {
                        logln!(&mut logger, LogEvent::Validation, "✓ PASSED");
                    }
                },
                Err(e) => {
                    failures += 1;
                    if iterations > 1 {
                        logln!(&mut logger, LogEvent::Validation, "✗");
                    } else {
                        logln!(&mut logger, LogEvent::Validation, "✗ FAILED: {}", e);
                    }

                    if fastbreak {
                        if let Some(id) = scenario_receiver_id {
                            logger.remove_receiver(id);
                        }
                        logln!(&mut logger, LogEvent::Validation, "\nStopping scenario execution due to failure (--fastbreak enabled)");
                        logln!(&mut logger, LogEvent::Validation, "Error at iteration {}/{} (seed {}): {}", i - start_iteration + 1, iterations, i, e);
                        break 'scenarios;
                    }
                }
            }

            let _ = logger.flush();
        }

        if let Some(id) = scenario_receiver_id {
            logger.remove_receiver(id);
        }
    }

    logln!(&mut logger, LogEvent::Validation, "\nTotal simulation runs completed: {}", TOTAL_SIMULATION_RUNS.load(Ordering::Relaxed));

    if let Some(id) = summary_receiver_id {
        logger.remove_receiver(id);
    }
    if failures > 0 {
        std::process::exit(1);
    }
}
