/// This is a file where agent bidders reside
/// Bidder is a sub-component of an agent that turns its per-click value and the auction history into a bid.
///
/// - Truthful: always bids value
/// - Balanced bidding: picks the slot with the best expected utility against last round's bids
///   and bids so that it would be indifferent between that slot and the one above it
/// - Adaptive: nudges its last bid down after winning a slot and up after losing
/// - Budget pacing: multiplies value by a pacing factor that a proportional controller steers
///   towards an even spend of the budget over the rounds

use crate::auction::BidRange;
use crate::gsp::MechanismGsp;
use crate::mechanism::MechanismTrait;
use crate::controllers::ControllerProportional;
use crate::history::History;
use crate::utils::iround;

pub use crate::agent::AgentBidderTrait;

/// Bidder that always bids its true value
pub struct BidderTruthful;

impl AgentBidderTrait for BidderTruthful {
    fn initial_bid(&self, value_per_click: u64, _reserve: u64) -> u64 {
        value_per_click
    }

    fn get_bid(&mut self, _agent_id: usize, value_per_click: u64, _round: usize, _history: &History, _reserve: u64) -> u64 {
        value_per_click
    }

    fn get_bidding_type(&self) -> String {
        "Truthful".to_string()
    }
}

/// Balanced bidding against the previous round's competition
pub struct BidderBalanced;

impl BidderBalanced {
    /// Bid ranges per slot, computed from last round's clicks and the other agents' bids
    /// Balanced bidding targets GSP prices, so the ranges come from the GSP mechanism
    fn slot_ranges(agent_id: usize, history: &History, round: usize, reserve: u64) -> Option<(Vec<u64>, Vec<BidRange>)> {
        let previous = history.round(round.checked_sub(1)?)?;
        let other_bids = previous.other_bids(agent_id);
        let ranges = (0..previous.slot_clicks.len())
            .map(|slot| MechanismGsp.bid_range_for_slot(slot, &previous.slot_clicks, reserve, &other_bids))
            .collect();
        Some((previous.slot_clicks.clone(), ranges))
    }

    /// Slot with the highest expected utility, the first one on ties
    fn target_slot(value_per_click: u64, slot_clicks: &[u64], ranges: &[BidRange]) -> usize {
        let mut best_slot = 0;
        let mut best_utility = i64::MIN;
        for (slot, (clicks, range)) in slot_clicks.iter().zip(ranges.iter()).enumerate() {
            let utility = *clicks as i64 * (value_per_click as i64 - range.min_bid as i64);
            if utility > best_utility {
                best_utility = utility;
                best_slot = slot;
            }
        }
        best_slot
    }
}

impl AgentBidderTrait for BidderBalanced {
    fn initial_bid(&self, value_per_click: u64, _reserve: u64) -> u64 {
        value_per_click / 2
    }

    fn get_bid(&mut self, agent_id: usize, value_per_click: u64, round: usize, history: &History, reserve: u64) -> u64 {
        let (slot_clicks, ranges) = match Self::slot_ranges(agent_id, history, round, reserve) {
            Some(info) if !info.0.is_empty() => info,
            _ => return value_per_click,
        };

        let target = Self::target_slot(value_per_click, &slot_clicks, &ranges);
        let min_bid = ranges[target].min_bid;

        // Top slot, or no slot is profitable: bid value
        if target == 0 || min_bid >= value_per_click {
            return value_per_click;
        }

        let clicks_above = slot_clicks[target - 1];
        if clicks_above == 0 {
            return value_per_click;
        }
        let click_ratio = slot_clicks[target] as f64 / clicks_above as f64;
        let bid = value_per_click as f64 - click_ratio * (value_per_click - min_bid) as f64;
        iround(bid).min(value_per_click)
    }

    fn get_bidding_type(&self) -> String {
        "Balanced bidding".to_string()
    }
}

/// Bidder that walks its bid by a fixed step depending on whether it won a slot last round
pub struct BidderAdaptive {
    pub step: u64,
}

impl AgentBidderTrait for BidderAdaptive {
    fn initial_bid(&self, value_per_click: u64, _reserve: u64) -> u64 {
        value_per_click / 2
    }

    fn get_bid(&mut self, agent_id: usize, value_per_click: u64, round: usize, history: &History, reserve: u64) -> u64 {
        let previous = match round.checked_sub(1).and_then(|r| history.round(r)) {
            Some(record) => record,
            None => return self.initial_bid(value_per_click, reserve),
        };
        let previous_bid = previous.agent_bid(agent_id).unwrap_or(value_per_click / 2);

        let bid = if previous.agent_slot(agent_id).is_some() {
            previous_bid.saturating_sub(self.step).max(reserve)
        } else {
            previous_bid + self.step
        };
        bid.min(value_per_click)
    }

    fn get_bidding_type(&self) -> String {
        format!("Adaptive (step {})", self.step)
    }
}

/// Bidder that paces value-bidding to spend its budget evenly across rounds
pub struct BidderBudgetPacing {
    pub budget: u64,
    pub num_rounds: usize,
    pub pacing: f64,
    pub controller: ControllerProportional,
}

impl BidderBudgetPacing {
    pub fn new(budget: u64, num_rounds: usize) -> Self {
        Self {
            budget,
            num_rounds,
            pacing: 1.0,
            controller: ControllerProportional::new(),
        }
    }
}

impl AgentBidderTrait for BidderBudgetPacing {
    fn initial_bid(&self, value_per_click: u64, _reserve: u64) -> u64 {
        iround(value_per_click as f64 * self.pacing).min(value_per_click)
    }

    fn get_bid(&mut self, agent_id: usize, value_per_click: u64, round: usize, history: &History, _reserve: u64) -> u64 {
        if let Some(previous) = round.checked_sub(1).and_then(|r| history.round(r)) {
            let target = self.budget as f64 / self.num_rounds.max(1) as f64;
            let actual = previous.agent_payment(agent_id) as f64;
            let (_, next_pacing) = self.controller.next_pacing(target, actual, self.pacing);
            self.pacing = next_pacing;
        }
        iround(value_per_click as f64 * self.pacing).min(value_per_click)
    }

    fn get_bidding_type(&self) -> String {
        format!("Budget pacing ({:.4})", self.pacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::record;

    #[test]
    fn test_truthful_bids_value() {
        let mut bidder = BidderTruthful;
        let history = History::new(1);
        assert_eq!(bidder.initial_bid(80, 10), 80);
        assert_eq!(bidder.get_bid(0, 80, 3, &history, 10), 80);
    }

    #[test]
    fn test_balanced_targets_profitable_slot() {
        // Agent 3 with value 60 looks at other bids 100, 50, 20 and clicks 100, 80, 60
        // Slot utilities: 100*(60-100) < 0, 80*(60-50) = 800, 60*(60-20) = 2400 -> slot 2
        // Bid = 60 - 60/80 * (60 - 20) = 30
        let mut history = History::new(4);
        history.push(record(0, &[100, 50, 20, 30], &[100, 80, 60], &[0, 1, 3], &[50, 30, 20]));

        let mut bidder = BidderBalanced;
        assert_eq!(bidder.get_bid(3, 60, 1, &history, 0), 30);
    }

    #[test]
    fn test_balanced_ranges_come_from_mechanism_query() {
        let mut history = History::new(4);
        history.push(record(0, &[100, 50, 20, 30], &[100, 80, 60], &[0, 1, 3], &[50, 30, 20]));

        let (slot_clicks, ranges) = BidderBalanced::slot_ranges(3, &history, 1, 0).unwrap();
        assert_eq!(slot_clicks, vec![100, 80, 60]);
        assert_eq!(ranges, vec![
            BidRange { min_bid: 100, max_bid: None },
            BidRange { min_bid: 50, max_bid: Some(100) },
            BidRange { min_bid: 20, max_bid: Some(50) },
        ]);
        assert!(BidderBalanced::slot_ranges(3, &history, 0, 0).is_none());
    }

    #[test]
    fn test_balanced_bids_value_for_top_slot() {
        let mut history = History::new(3);
        history.push(record(0, &[10, 5, 200], &[100, 50], &[2, 0], &[10, 5]));
        let mut bidder = BidderBalanced;
        // Others bid 10 and 5: top slot utility 100*(200-10) dominates
        assert_eq!(bidder.get_bid(2, 200, 1, &history, 0), 200);
    }

    #[test]
    fn test_balanced_never_bids_above_value() {
        let mut history = History::new(3);
        history.push(record(0, &[90, 80, 10], &[40, 30], &[0, 1], &[80, 10]));
        let mut bidder = BidderBalanced;
        for value in [1, 5, 10, 50, 79, 81, 95, 200] {
            assert!(bidder.get_bid(2, value, 1, &history, 5) <= value);
        }
    }

    #[test]
    fn test_adaptive_walks_bid() {
        let mut history = History::new(2);
        history.push(record(0, &[40, 30], &[10], &[0], &[30]));
        let mut bidder = BidderAdaptive { step: 5 };
        // Agent 0 won: lower its bid
        assert_eq!(bidder.get_bid(0, 100, 1, &history, 0), 35);
        // Agent 1 lost: raise its bid
        assert_eq!(bidder.get_bid(1, 100, 1, &history, 0), 35);
        // Capped at value
        assert_eq!(bidder.get_bid(1, 32, 1, &history, 0), 32);
        // Not below reserve after winning
        assert_eq!(bidder.get_bid(0, 100, 1, &history, 38), 38);
    }

    #[test]
    fn test_budget_pacing_slows_down_when_overspending() {
        let mut history = History::new(2);
        // Agent 0 pays 10 * 50 = 500 against a per-round target of 1000 / 10 = 100
        history.push(record(0, &[80, 50], &[10], &[0], &[50]));
        let mut bidder = BidderBudgetPacing::new(1000, 10);
        assert_eq!(bidder.initial_bid(80, 0), 80);
        let bid = bidder.get_bid(0, 80, 1, &history, 0);
        assert!(bid < 80);
        assert!(bidder.pacing < 1.0);
    }
}
