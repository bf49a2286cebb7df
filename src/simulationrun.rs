/// This file contains the SimulationRun struct, which runs one full sequence of rounds
/// (which is then repeated across seeds by experiment.rs), and the statistics collected from it.
///
/// Each round:
/// - clicks per slot follow a triangular wave over the run (a simulated day) with a fixed dropoff between ranks
/// - every agent bids (initial bid in round 0, history-driven afterwards; agents out of budget bid zero)
/// - the mechanism scheduled for the round allocates slots and sets per-click prices
/// - slot payments and utilities are derived and the round is appended to the history

use rand::rngs::StdRng;
use crate::agents::Agents;
use crate::auction::Bid;
use crate::config::SimulationConfig;
use crate::history::{History, RoundRecord};
use crate::logger::{Logger, LogEvent};
use crate::mechanism::MechanismSchedule;
use crate::utils::iround;
use crate::{logln, warnln};

/// Expected clicks per slot, per round
#[derive(Debug, Clone, PartialEq)]
pub struct ClickSchedule {
    /// Top-slot clicks in the middle of the run
    pub peak_clicks: f64,
    /// Top-slot clicks at the start and end of the run
    pub trough_clicks: f64,
    /// Ratio of clicks between consecutive slot ranks
    pub dropoff: f64,
}

impl ClickSchedule {
    pub fn new(dropoff: f64) -> Self {
        Self {
            peak_clicks: 80.0,
            trough_clicks: 20.0,
            dropoff,
        }
    }

    /// Top-slot clicks for `round`: rises linearly from trough to peak at mid-run and falls back
    pub fn top_slot_clicks(&self, round: usize, num_rounds: usize) -> u64 {
        let half = num_rounds as f64 / 2.0;
        if half == 0.0 {
            return iround(self.peak_clicks);
        }
        let distance = (round as f64 - half).abs() / half;
        iround(self.peak_clicks - (self.peak_clicks - self.trough_clicks) * distance)
    }

    /// Clicks for each of `num_slots` slots given the top-slot clicks
    pub fn slot_clicks(&self, top_slot_clicks: u64, num_slots: usize) -> Vec<u64> {
        (0..num_slots)
            .map(|slot| iround(top_slot_clicks as f64 * self.dropoff.powi(slot as i32)))
            .collect()
    }
}

/// Number of slots offered to a population of `num_agents`: one fewer than agents, at least one
pub fn num_slots_for(num_agents: usize) -> usize {
    num_agents.saturating_sub(1).max(1)
}

/// History of one complete run
pub struct SimulationRun {
    pub history: History,
}

impl SimulationRun {
    /// Run all rounds of the configured simulation
    ///
    /// # Arguments
    /// * `agents` - Agent population (mutable since strategies may keep state)
    /// * `config` - Reserve, rounds, dropoff and mechanism selection
    /// * `rng` - Source of the mechanisms' tie-break randomness
    /// * `logger` - Logger; full round data goes to `LogEvent::Round`
    pub fn new(agents: &mut Agents, config: &SimulationConfig, rng: &mut StdRng, logger: &mut Logger) -> Self {
        let click_schedule = ClickSchedule::new(config.dropoff);
        let mechanism_schedule = MechanismSchedule::new(config.mechanism);
        let mut history = History::new(agents.len());

        for round in 0..config.num_rounds {
            let record = Self::run_round(round, agents, config, &click_schedule, &mechanism_schedule, &history, rng);
            if logger.is_enabled(LogEvent::Round) {
                Self::printout_round(&record, &history, agents, logger);
            }
            history.push(record);
        }

        Self { history }
    }

    fn run_round(
        round: usize,
        agents: &mut Agents,
        config: &SimulationConfig,
        click_schedule: &ClickSchedule,
        mechanism_schedule: &MechanismSchedule,
        history: &History,
        rng: &mut StdRng,
    ) -> RoundRecord {
        let reserve = config.reserve;

        let bids: Vec<Bid> = agents.agents.iter_mut()
            .map(|agent| {
                let amount = if round == 0 {
                    agent.initial_bid(reserve)
                } else {
                    agent.bid(round, history, reserve)
                };
                Bid::new(agent.agent_id(), amount)
            })
            .collect();

        let num_slots = num_slots_for(agents.len());
        let top_slot_clicks = click_schedule.top_slot_clicks(round, config.num_rounds);
        let slot_clicks = click_schedule.slot_clicks(top_slot_clicks, num_slots);

        let mechanism = mechanism_schedule.mechanism_for_round(round, config.num_rounds);
        let outcome = mechanism.compute(&slot_clicks, reserve, &bids, rng);

        // Allocation may be shorter than slot_clicks, zip stops at the last filled slot
        let slot_payments: Vec<u64> = slot_clicks.iter()
            .zip(outcome.per_click_payments.iter())
            .map(|(clicks, per_click)| clicks * per_click)
            .collect();

        let mut utilities = vec![0i64; agents.len()];
        for (slot, &agent_id) in outcome.allocation.iter().enumerate() {
            let value = agents.agents[agent_id].value_per_click() as i64 * slot_clicks[slot] as i64;
            utilities[agent_id] = value - slot_payments[slot] as i64;
        }

        RoundRecord {
            round,
            mechanism_name: mechanism.mechanism_name(),
            bids,
            slot_clicks,
            slot_occupants: outcome.allocation,
            per_click_payments: outcome.per_click_payments,
            slot_payments,
            utilities,
        }
    }

    fn printout_round(record: &RoundRecord, history: &History, agents: &Agents, logger: &mut Logger) {
        let event = LogEvent::Round;
        let bids: Vec<String> = record.bids.iter().map(|bid| format!("{}:{}", bid.agent_id, bid.amount)).collect();
        // Totals include this round, which is not in the history yet
        let totals_spent: Vec<u64> = agents.agents.iter()
            .map(|agent| history.total_spent(agent.agent_id(), record.round) + record.agent_payment(agent.agent_id()))
            .collect();

        logln!(logger, event, "\t=== Round {} ({}) ===", record.round, record.mechanism_name);
        logln!(logger, event, "\tnum_slots: {}", record.slot_clicks.len());
        logln!(logger, event, "\tbids: [{}]", bids.join(", "));
        logln!(logger, event, "\tslot occupants: {:?}", record.slot_occupants);
        logln!(logger, event, "\tslot clicks: {:?}", record.slot_clicks);
        logln!(logger, event, "\tper click payments: {:?}", record.per_click_payments);
        logln!(logger, event, "\tslot payments: {:?}", record.slot_payments);
        logln!(logger, event, "\tutilities: {:?}", record.utilities);
        logln!(logger, event, "\ttotals spent: {:?}", totals_spent);
    }
}

/// Statistics for a single agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStat {
    pub value_per_click: u64,
    pub rounds_with_slot: usize,
    pub total_clicks: u64,
    pub total_spent: u64,
    pub total_utility: i64,
}

/// Overall statistics for the run
#[derive(Debug, Clone, PartialEq)]
pub struct OverallStat {
    pub total_revenue: u64,
    pub total_utility: i64,
    pub total_clicks_sold: u64,
    pub filled_slots: usize,
    pub offered_slots: usize,
}

/// Complete run statistics
pub struct SimulationStat {
    pub agent_stats: Vec<AgentStat>,
    pub overall_stat: OverallStat,
}

impl SimulationStat {
    /// Generate statistics from the agents and the history of their run
    pub fn new(agents: &Agents, history: &History) -> Self {
        let mut agent_stats: Vec<AgentStat> = agents.agents.iter()
            .map(|agent| AgentStat {
                value_per_click: agent.value_per_click(),
                rounds_with_slot: 0,
                total_clicks: 0,
                total_spent: 0,
                total_utility: 0,
            })
            .collect();

        let mut overall_stat = OverallStat {
            total_revenue: 0,
            total_utility: 0,
            total_clicks_sold: 0,
            filled_slots: 0,
            offered_slots: 0,
        };

        for record in history.rounds() {
            overall_stat.offered_slots += record.slot_clicks.len();
            overall_stat.filled_slots += record.slot_occupants.len();

            for (slot, &agent_id) in record.slot_occupants.iter().enumerate() {
                let agent_stat = &mut agent_stats[agent_id];
                agent_stat.rounds_with_slot += 1;
                agent_stat.total_clicks += record.slot_clicks[slot];
                agent_stat.total_spent += record.slot_payments[slot];

                overall_stat.total_revenue += record.slot_payments[slot];
                overall_stat.total_clicks_sold += record.slot_clicks[slot];
            }

            for (agent_id, utility) in record.utilities.iter().enumerate() {
                agent_stats[agent_id].total_utility += utility;
                overall_stat.total_utility += utility;
            }
        }

        Self { agent_stats, overall_stat }
    }

    /// Output agent statistics
    pub fn printout_agents(&self, agents: &Agents, logger: &mut Logger, event: LogEvent) {
        for (index, agent_stat) in self.agent_stats.iter().enumerate() {
            let agent = &agents.agents[index];
            logln!(logger, event, "\nAgent {} ({}) - {}", agent.agent_id(), agent.agent_name(), agent.strategy_string());
            logln!(logger, event, "  Rounds with slot: {}", agent_stat.rounds_with_slot);
            logln!(logger, event, "  Clicks / spent: {} / {}", agent_stat.total_clicks, agent_stat.total_spent);
            logln!(logger, event, "  Utility: {}", agent_stat.total_utility);
        }
    }

    /// Output overall statistics
    pub fn printout_overall(&self, logger: &mut Logger, event: LogEvent) {
        logln!(logger, event, "\n=== Overall Statistics ===");
        logln!(logger, event, "Slots (filled/offered): {} / {}", self.overall_stat.filled_slots, self.overall_stat.offered_slots);
        logln!(logger, event, "Clicks sold: {}", self.overall_stat.total_clicks_sold);
        logln!(logger, event, "Revenue: {}", self.overall_stat.total_revenue);
        logln!(logger, event, "Total agent utility: {}", self.overall_stat.total_utility);
        if self.overall_stat.filled_slots == 0 && self.overall_stat.offered_slots > 0 {
            warnln!(logger, event, "No slot was filled in any round, the reserve may be above every bid");
        }
    }

    /// Output complete statistics
    pub fn printout(&self, agents: &Agents, logger: &mut Logger) {
        logln!(logger, LogEvent::Simulation, "\n=== Agent Statistics ===");
        self.printout_agents(agents, logger, LogEvent::Simulation);
        self.printout_overall(logger, LogEvent::Simulation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentType;
    use crate::mechanism::MechanismType;
    use rand::SeedableRng;

    fn config(mechanism: MechanismType, reserve: u64, budget: u64, num_rounds: usize) -> SimulationConfig {
        SimulationConfig {
            mechanism,
            reserve,
            budget,
            num_rounds,
            ..SimulationConfig::default()
        }
    }

    fn truthful_agents(values: &[u64], budget: u64, num_rounds: usize) -> Agents {
        let mut agents = Agents::new();
        for &value in values {
            agents.add(AgentType::TRUTHFUL, value, budget, num_rounds);
        }
        agents
    }

    #[test]
    fn test_click_schedule_triangle() {
        let schedule = ClickSchedule::new(0.75);
        assert_eq!(schedule.top_slot_clicks(0, 48), 20);
        assert_eq!(schedule.top_slot_clicks(24, 48), 80);
        assert_eq!(schedule.top_slot_clicks(12, 48), 50);
        assert_eq!(schedule.top_slot_clicks(36, 48), 50);
        assert_eq!(schedule.top_slot_clicks(30, 48), 65);
        assert_eq!(schedule.top_slot_clicks(0, 0), 80);
    }

    #[test]
    fn test_slot_clicks_dropoff() {
        let schedule = ClickSchedule::new(0.75);
        assert_eq!(schedule.slot_clicks(80, 4), vec![80, 60, 45, 34]);
        assert!(schedule.slot_clicks(80, 0).is_empty());
    }

    #[test]
    fn test_num_slots() {
        assert_eq!(num_slots_for(0), 1);
        assert_eq!(num_slots_for(1), 1);
        assert_eq!(num_slots_for(5), 4);
    }

    #[test]
    fn test_truthful_run_records_every_round() {
        let cfg = config(MechanismType::GSP, 0, 1_000_000, 10);
        let mut agents = truthful_agents(&[100, 80, 60], cfg.budget, cfg.num_rounds);
        let mut rng = StdRng::seed_from_u64(1);
        let mut logger = Logger::new();

        let run = SimulationRun::new(&mut agents, &cfg, &mut rng, &mut logger);
        assert_eq!(run.history.num_rounds(), 10);

        for record in run.history.rounds() {
            // 3 agents -> 2 slots, distinct values -> deterministic allocation
            assert_eq!(record.slot_occupants, vec![0, 1]);
            assert_eq!(record.per_click_payments, vec![80, 60]);
            let top = record.slot_clicks[0] as i64;
            assert_eq!(record.utilities[0], 100 * top - 80 * top);
            assert_eq!(record.utilities[2], 0);
        }
    }

    #[test]
    fn test_budget_exhaustion_forces_zero_bids() {
        let cfg = config(MechanismType::GSP, 10, 2000, 12);
        let mut agents = truthful_agents(&[100, 80, 60], cfg.budget, cfg.num_rounds);
        let mut rng = StdRng::seed_from_u64(2);
        let mut logger = Logger::new();

        let run = SimulationRun::new(&mut agents, &cfg, &mut rng, &mut logger);
        let history = &run.history;

        let mut exhausted = false;
        for record in history.rounds().iter().skip(1) {
            for bid in &record.bids {
                if history.total_spent(bid.agent_id, record.round) >= cfg.budget {
                    exhausted = true;
                    assert_eq!(bid.amount, 0);
                    assert_eq!(record.agent_slot(bid.agent_id), None);
                }
            }
        }
        assert!(exhausted);
    }

    #[test]
    fn test_stats_match_history() {
        let cfg = config(MechanismType::VCG, 5, 1_000_000, 8);
        let mut agents = truthful_agents(&[50, 40, 30, 20], cfg.budget, cfg.num_rounds);
        let mut rng = StdRng::seed_from_u64(3);
        let mut logger = Logger::new();

        let run = SimulationRun::new(&mut agents, &cfg, &mut rng, &mut logger);
        let stat = SimulationStat::new(&agents, &run.history);

        let revenue: u64 = run.history.rounds().iter().map(|record| record.revenue()).sum();
        assert_eq!(stat.overall_stat.total_revenue, revenue);
        assert_eq!(stat.overall_stat.offered_slots, 8 * 3);
        assert_eq!(stat.overall_stat.filled_slots, 8 * 3);
        for (agent_id, agent_stat) in stat.agent_stats.iter().enumerate() {
            assert_eq!(agent_stat.total_spent, run.history.total_spent(agent_id, 8));
            let utility: i64 = run.history.rounds().iter().map(|record| record.utilities[agent_id]).sum();
            assert_eq!(agent_stat.total_utility, utility);
        }
        assert_eq!(stat.agent_stats[3].rounds_with_slot, 0);
    }

    #[test]
    fn test_same_seed_same_history() {
        let cfg = config(MechanismType::SWITCH, 0, 1_000_000, 6);
        let mut agents_a = truthful_agents(&[30, 30, 30, 30], cfg.budget, cfg.num_rounds);
        let mut agents_b = truthful_agents(&[30, 30, 30, 30], cfg.budget, cfg.num_rounds);
        let mut logger = Logger::new();

        let run_a = SimulationRun::new(&mut agents_a, &cfg, &mut StdRng::seed_from_u64(9), &mut logger);
        let run_b = SimulationRun::new(&mut agents_b, &cfg, &mut StdRng::seed_from_u64(9), &mut logger);
        assert_eq!(run_a.history.rounds(), run_b.history.rounds());
        assert_eq!(run_a.history.round(0).map(|r| r.mechanism_name), Some("gsp"));
        assert_eq!(run_a.history.round(5).map(|r| r.mechanism_name), Some("vcg"));
    }
}
