use crate::auction::Bid;

/// Snapshot of everything that happened in one round
/// Slot-indexed vectors (`slot_occupants`, `per_click_payments`, `slot_payments`) have one entry per filled slot;
/// `slot_clicks` has one entry per offered slot and may be longer.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRecord {
    pub round: usize,
    pub mechanism_name: &'static str,
    /// One bid per agent, in agent id order
    pub bids: Vec<Bid>,
    pub slot_clicks: Vec<u64>,
    pub slot_occupants: Vec<usize>,
    pub per_click_payments: Vec<u64>,
    pub slot_payments: Vec<u64>,
    /// Utility per agent, indexed by agent id (zero for agents without a slot)
    pub utilities: Vec<i64>,
}

impl RoundRecord {
    /// Slot the agent occupied in this round, if any
    pub fn agent_slot(&self, agent_id: usize) -> Option<usize> {
        self.slot_occupants.iter().position(|&occupant| occupant == agent_id)
    }

    /// Bid the agent placed in this round
    pub fn agent_bid(&self, agent_id: usize) -> Option<u64> {
        self.bids.iter().find(|bid| bid.agent_id == agent_id).map(|bid| bid.amount)
    }

    /// Bids of everyone except the given agent
    pub fn other_bids(&self, agent_id: usize) -> Vec<Bid> {
        self.bids.iter().filter(|bid| bid.agent_id != agent_id).copied().collect()
    }

    /// Amount the agent paid in this round
    pub fn agent_payment(&self, agent_id: usize) -> u64 {
        self.agent_slot(agent_id).map_or(0, |slot| self.slot_payments[slot])
    }

    pub fn revenue(&self) -> u64 {
        self.slot_payments.iter().sum()
    }
}

/// Append-only record of all rounds run so far, read by agents when they bid
pub struct History {
    pub num_agents: usize,
    rounds: Vec<RoundRecord>,
}

impl History {
    pub fn new(num_agents: usize) -> Self {
        Self {
            num_agents,
            rounds: Vec::new(),
        }
    }

    /// Append the record of the next round
    pub fn push(&mut self, record: RoundRecord) {
        debug_assert_eq!(record.round, self.rounds.len(), "rounds must be recorded in order");
        self.rounds.push(record);
    }

    pub fn round(&self, round: usize) -> Option<&RoundRecord> {
        self.rounds.get(round)
    }

    pub fn last_round(&self) -> Option<&RoundRecord> {
        self.rounds.last()
    }

    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    /// Slot the agent occupied in the given round, None if it had no slot or the round hasn't happened
    pub fn agent_slot(&self, agent_id: usize, round: usize) -> Option<usize> {
        self.round(round).and_then(|record| record.agent_slot(agent_id))
    }

    /// Total amount spent by the agent through (not including) round `end`
    pub fn total_spent(&self, agent_id: usize, end: usize) -> u64 {
        self.rounds.iter().take(end).map(|record| record.agent_payment(agent_id)).sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a record where the given agents hold slots in order, paying the given per-click prices
    pub(crate) fn record(round: usize, bids: &[u64], slot_clicks: &[u64], occupants: &[usize], per_click: &[u64]) -> RoundRecord {
        let slot_payments: Vec<u64> = slot_clicks.iter().zip(per_click.iter()).map(|(c, p)| c * p).collect();
        let mut utilities = vec![0; bids.len()];
        for (slot, &agent_id) in occupants.iter().enumerate() {
            utilities[agent_id] = -(slot_payments[slot] as i64);
        }
        RoundRecord {
            round,
            mechanism_name: "gsp",
            bids: bids.iter().enumerate().map(|(id, &amount)| Bid::new(id, amount)).collect(),
            slot_clicks: slot_clicks.to_vec(),
            slot_occupants: occupants.to_vec(),
            per_click_payments: per_click.to_vec(),
            slot_payments,
            utilities,
        }
    }

    #[test]
    fn test_agent_slot_and_payment() {
        let record = record(0, &[30, 20, 10], &[10, 5], &[0, 1], &[20, 10]);
        assert_eq!(record.agent_slot(0), Some(0));
        assert_eq!(record.agent_slot(1), Some(1));
        assert_eq!(record.agent_slot(2), None);
        assert_eq!(record.agent_payment(0), 200);
        assert_eq!(record.agent_payment(2), 0);
        assert_eq!(record.revenue(), 250);
        assert_eq!(record.other_bids(1), vec![Bid::new(0, 30), Bid::new(2, 10)]);
    }

    #[test]
    fn test_total_spent_excludes_end_round() {
        let mut history = History::new(3);
        history.push(record(0, &[30, 20, 10], &[10, 5], &[0, 1], &[20, 10]));
        history.push(record(1, &[30, 20, 10], &[10, 5], &[1, 0], &[30, 10]));

        assert_eq!(history.total_spent(0, 0), 0);
        assert_eq!(history.total_spent(0, 1), 200);
        assert_eq!(history.total_spent(0, 2), 250);
        assert_eq!(history.total_spent(1, 2), 50 + 300);
        assert_eq!(history.total_spent(2, 2), 0);
        let revenue: u64 = history.rounds().iter().map(|r| r.revenue()).sum();
        assert_eq!(revenue, 250 + 350);
        assert_eq!(history.agent_slot(1, 1), Some(0));
        assert_eq!(history.agent_slot(1, 5), None);
        assert_eq!(history.num_rounds(), 2);
        assert_eq!(history.last_round().map(|r| r.round), Some(1));
        assert!(History::new(3).last_round().is_none());
    }
}
