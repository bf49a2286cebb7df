/// Building blocks shared by every slot mechanism: the bid filter, the tie-break shuffle,
/// the ranking that decides who gets which slot, and the marginal bid range query.
///
/// Amounts are integer currency units (cents), so negative bids and reserves are unrepresentable.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// One agent's bid for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    pub agent_id: usize,
    pub amount: u64,
}

impl Bid {
    pub fn new(agent_id: usize, amount: u64) -> Self {
        Self { agent_id, amount }
    }
}

/// Result of clearing one round
/// `allocation[i]` is the agent in slot i, `per_click_payments[i]` is what it owes per click
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuctionOutcome {
    pub allocation: Vec<usize>,
    pub per_click_payments: Vec<u64>,
}

impl AuctionOutcome {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Half-open interval `[min_bid, max_bid)` of bids that land a new bidder in a given slot
/// `max_bid` is None when there is no upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidRange {
    pub min_bid: u64,
    pub max_bid: Option<u64>,
}

/// Keep only the bids that meet the reserve
pub fn filter_bids(bids: &[Bid], reserve: u64) -> Vec<Bid> {
    bids.iter().filter(|bid| bid.amount >= reserve).copied().collect()
}

/// Filter, shuffle and sort bids by amount descending
///
/// The shuffle happens before a stable sort, so bidders with equal amounts end up in
/// random order rather than in agent id order.
pub fn rank_bids(bids: &[Bid], reserve: u64, rng: &mut StdRng) -> Vec<Bid> {
    let mut valid_bids = filter_bids(bids, reserve);
    valid_bids.shuffle(rng);
    valid_bids.sort_by(|a, b| b.amount.cmp(&a.amount));
    valid_bids
}

/// Price of the rank right below the last allocated slot: the first unallocated qualifying bid or the reserve
pub fn price_below_allocation(ranked_bids: &[Bid], num_allocated: usize, reserve: u64) -> u64 {
    ranked_bids.get(num_allocated).map_or(reserve, |bid| bid.amount)
}

/// Range of bids that would put a hypothetical new bidder in `slot`, with the other bids held fixed
///
/// Deterministic: no tie-break shuffle, ties go to the incumbents.
/// Slot clicks do not affect the range; mechanisms expose it as `MechanismTrait::bid_range_for_slot`.
pub fn bid_range_for_slot(slot: usize, reserve: u64, bids: &[Bid]) -> BidRange {
    let mut bid_amounts: Vec<u64> = bids.iter().map(|bid| bid.amount).filter(|&amount| amount >= reserve).collect();
    bid_amounts.sort_unstable_by(|a, b| b.cmp(a));

    let n = bid_amounts.len();
    if slot >= n {
        // More than reserve, less than the smallest bid
        let max_bid = match bid_amounts.last() {
            Some(&smallest) => Some(smallest),
            None if slot > 0 => Some(reserve),
            None => None,
        };
        return BidRange { min_bid: reserve, max_bid };
    }

    let min_bid = bid_amounts[slot];
    let max_bid = if slot > 0 { Some(bid_amounts[slot - 1]) } else { None };
    BidRange { min_bid, max_bid }
}
