use std::error::Error;
use std::fs;
use plotters::prelude::*;
use crate::config::SimulationConfig;
use crate::experiment::Experiment;
use crate::history::History;
use crate::logger::Logger;
use crate::mechanism::MechanismType;

static SERIES_COLORS: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];

fn series_color(index: usize) -> &'static RGBColor {
    &SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Run the configuration under GSP and VCG with the same seed and chart both runs into charts/
pub fn generate_all_charts(config: &SimulationConfig) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all("charts")?;

    // Both mechanisms must see the same agents
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut logger = Logger::new();

    let mut histories = Vec::new();
    for mechanism in [MechanismType::GSP, MechanismType::VCG] {
        let experiment = Experiment::new(SimulationConfig {
            mechanism,
            seed: Some(seed),
            iterations: 1,
            ..config.clone()
        });
        let outcome = experiment.run_iteration(0, &mut logger);
        histories.push((mechanism.as_str(), outcome.history));
    }

    let series: Vec<(&str, &History)> = histories.iter().map(|(name, history)| (*name, history)).collect();
    generate_revenue_chart("charts/revenue_by_round.png", &series)?;
    println!("Generated: charts/revenue_by_round.png");

    for (name, history) in &histories {
        let filepath = format!("charts/cumulative_utility_{}.png", name);
        generate_cumulative_utility_chart(&filepath, &format!("Cumulative utility ({})", name), history)?;
        println!("Generated: {}", filepath);
    }

    println!("Seed: {}", seed);
    Ok(())
}

/// Line chart of revenue per round, one line per history
pub fn generate_revenue_chart(filepath: &str, series: &[(&str, &History)]) -> Result<(), Box<dyn Error>> {
    let num_rounds = series.iter().map(|(_, history)| history.num_rounds()).max().unwrap_or(0).max(1);
    let max_revenue = series.iter()
        .flat_map(|(_, history)| history.rounds().iter().map(|record| record.revenue()))
        .max()
        .unwrap_or(0)
        .max(1);

    let root = BitMapBackend::new(filepath, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Revenue per round", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0usize..num_rounds, 0u64..max_revenue + max_revenue / 10)?;

    chart.configure_mesh()
        .x_desc("Round")
        .y_desc("Revenue")
        .draw()?;

    for (index, (label, history)) in series.iter().enumerate() {
        let color = series_color(index);
        chart.draw_series(LineSeries::new(
            history.rounds().iter().map(|record| (record.round, record.revenue())),
            color,
        ))?
        .label(*label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Cumulative utility of every agent over the rounds of one history
pub fn generate_cumulative_utility_chart(filepath: &str, title: &str, history: &History) -> Result<(), Box<dyn Error>> {
    let mut cumulative: Vec<Vec<(usize, i64)>> = vec![Vec::with_capacity(history.num_rounds()); history.num_agents];
    let mut totals = vec![0i64; history.num_agents];
    for record in history.rounds() {
        for (agent_id, utility) in record.utilities.iter().enumerate() {
            totals[agent_id] += utility;
            cumulative[agent_id].push((record.round, totals[agent_id]));
        }
    }

    let all_values = cumulative.iter().flatten().map(|(_, total)| *total);
    let y_min = all_values.clone().min().unwrap_or(0).min(0);
    let y_max = all_values.max().unwrap_or(0).max(y_min + 1);

    let root = BitMapBackend::new(filepath, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0usize..history.num_rounds().max(1), y_min..y_max + (y_max - y_min) / 10)?;

    chart.configure_mesh()
        .x_desc("Round")
        .y_desc("Utility")
        .draw()?;

    for (agent_id, points) in cumulative.into_iter().enumerate() {
        let color = series_color(agent_id);
        chart.draw_series(LineSeries::new(points, color))?
            .label(format!("Agent {}", agent_id))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
