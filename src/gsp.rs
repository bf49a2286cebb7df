/// Generalized second price auction
/// Each slot's occupant pays, per click, the bid of the next-ranked qualifying bidder.
/// The occupant of the last filled slot pays the first unallocated qualifying bid, or the reserve if there is none.

use crate::auction::{price_below_allocation, rank_bids, AuctionOutcome, Bid};
use crate::mechanism::MechanismTrait;
use rand::rngs::StdRng;

pub struct MechanismGsp;

impl MechanismTrait for MechanismGsp {
    fn mechanism_name(&self) -> &'static str {
        "gsp"
    }

    fn compute(&self, slot_clicks: &[u64], reserve: u64, bids: &[Bid], rng: &mut StdRng) -> AuctionOutcome {
        let valid_bids = rank_bids(bids, reserve, rng);

        let num_slots = slot_clicks.len();
        let num_allocated = num_slots.min(valid_bids.len());
        if num_allocated == 0 {
            return AuctionOutcome::empty();
        }

        let allocated_bids = &valid_bids[..num_allocated];
        let allocation: Vec<usize> = allocated_bids.iter().map(|bid| bid.agent_id).collect();

        // Each pays the bid below them
        let mut per_click_payments: Vec<u64> = allocated_bids[1..].iter().map(|bid| bid.amount).collect();
        per_click_payments.push(price_below_allocation(&valid_bids, num_allocated, reserve));

        AuctionOutcome { allocation, per_click_payments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const A: usize = 0;
    const B: usize = 1;
    const C: usize = 2;
    const D: usize = 3;

    fn example_bids() -> Vec<Bid> {
        vec![Bid::new(A, 30), Bid::new(B, 20), Bid::new(C, 20), Bid::new(D, 5)]
    }

    #[test]
    fn test_gsp_example_payments() {
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = MechanismGsp.compute(&[3, 2, 1], 10, &example_bids(), &mut rng);

        assert_eq!(outcome.allocation.len(), 3);
        assert_eq!(outcome.allocation[0], A);
        let mut tied = vec![outcome.allocation[1], outcome.allocation[2]];
        tied.sort();
        assert_eq!(tied, vec![B, C]);
        assert_eq!(outcome.per_click_payments, vec![20, 20, 10]);
    }

    #[test]
    fn test_last_slot_pays_first_unallocated_bid() {
        let mut rng = StdRng::seed_from_u64(2);
        let bids = vec![Bid::new(0, 50), Bid::new(1, 40), Bid::new(2, 30), Bid::new(3, 15)];
        let outcome = MechanismGsp.compute(&[10, 5], 10, &bids, &mut rng);
        assert_eq!(outcome.allocation, vec![0, 1]);
        assert_eq!(outcome.per_click_payments, vec![40, 30]);
    }

    #[test]
    fn test_bids_equal_to_slots_last_pays_reserve() {
        let mut rng = StdRng::seed_from_u64(3);
        let bids = vec![Bid::new(0, 50), Bid::new(1, 40)];
        let outcome = MechanismGsp.compute(&[10, 5], 7, &bids, &mut rng);
        assert_eq!(outcome.allocation, vec![0, 1]);
        assert_eq!(outcome.per_click_payments, vec![40, 7]);
    }

    #[test]
    fn test_fewer_bids_than_slots() {
        let mut rng = StdRng::seed_from_u64(4);
        let bids = vec![Bid::new(4, 12)];
        let outcome = MechanismGsp.compute(&[10, 5, 2], 3, &bids, &mut rng);
        assert_eq!(outcome.allocation, vec![4]);
        assert_eq!(outcome.per_click_payments, vec![3]);
    }

    #[test]
    fn test_all_bids_below_reserve() {
        let mut rng = StdRng::seed_from_u64(5);
        let bids = vec![Bid::new(0, 1), Bid::new(1, 9)];
        let outcome = MechanismGsp.compute(&[10, 5], 10, &bids, &mut rng);
        assert!(outcome.allocation.is_empty());
        assert!(outcome.per_click_payments.is_empty());
    }

    #[test]
    fn test_no_bids_and_no_slots() {
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(MechanismGsp.compute(&[10, 5], 0, &[], &mut rng), AuctionOutcome::empty());
        let bids = vec![Bid::new(0, 100)];
        assert_eq!(MechanismGsp.compute(&[], 0, &bids, &mut rng), AuctionOutcome::empty());
    }

    #[test]
    fn test_zero_bid_wins_with_zero_reserve() {
        let mut rng = StdRng::seed_from_u64(7);
        let bids = vec![Bid::new(0, 0)];
        let outcome = MechanismGsp.compute(&[10], 0, &bids, &mut rng);
        assert_eq!(outcome.allocation, vec![0]);
        assert_eq!(outcome.per_click_payments, vec![0]);
    }

    #[test]
    fn test_invariants_over_random_inputs() {
        use rand::Rng;
        let mut input_rng = StdRng::seed_from_u64(11);
        let mut rng = StdRng::seed_from_u64(12);

        for _ in 0..500 {
            let num_bids = input_rng.gen_range(0..8);
            let num_slots = input_rng.gen_range(0..6);
            let reserve = input_rng.gen_range(0..40);
            let bids: Vec<Bid> = (0..num_bids).map(|id| Bid::new(id, input_rng.gen_range(0..100))).collect();
            let mut slot_clicks: Vec<u64> = (0..num_slots).map(|_| input_rng.gen_range(0..100)).collect();
            slot_clicks.sort_by(|a, b| b.cmp(a));

            let outcome = MechanismGsp.compute(&slot_clicks, reserve, &bids, &mut rng);
            let qualifying = bids.iter().filter(|bid| bid.amount >= reserve).count();

            assert_eq!(outcome.allocation.len(), num_slots.min(qualifying));
            assert_eq!(outcome.per_click_payments.len(), outcome.allocation.len());
            assert!(outcome.per_click_payments.iter().all(|&p| p >= reserve));
            assert!(outcome.per_click_payments.windows(2).all(|w| w[0] >= w[1]));
            for (slot, agent_id) in outcome.allocation.iter().enumerate() {
                let bid = bids[*agent_id].amount;
                assert!(bid >= reserve);
                // nobody pays more than they bid
                assert!(outcome.per_click_payments[slot] <= bid);
            }
        }
    }

    #[test]
    fn test_tie_break_is_fair() {
        let mut rng = StdRng::seed_from_u64(42);
        let bids: Vec<Bid> = (0..4).map(|id| Bid::new(id, 25)).collect();
        let mut top_slot_counts = [0usize; 4];
        let trials = 4000;

        for _ in 0..trials {
            let outcome = MechanismGsp.compute(&[10, 8, 6], 0, &bids, &mut rng);
            top_slot_counts[outcome.allocation[0]] += 1;
        }

        // Expected 1000 each; the bound is more than 5 standard deviations wide
        for count in top_slot_counts {
            assert!(count > 850 && count < 1150, "unfair tie-break: {:?}", top_slot_counts);
        }
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let bids: Vec<Bid> = vec![Bid::new(0, 10), Bid::new(1, 10), Bid::new(2, 10), Bid::new(3, 8)];
        let first = MechanismGsp.compute(&[5, 4, 3], 0, &bids, &mut StdRng::seed_from_u64(99));
        let second = MechanismGsp.compute(&[5, 4, 3], 0, &bids, &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn test_bid_range_through_trait() {
        let bids = vec![Bid::new(0, 50), Bid::new(1, 30), Bid::new(2, 10)];
        let range = MechanismGsp.bid_range_for_slot(1, &[3, 2, 1], 5, &bids);
        assert_eq!(range.min_bid, 30);
        assert_eq!(range.max_bid, Some(50));
    }
}
