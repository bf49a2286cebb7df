/// VCG slot auction
/// Allocation is identical to GSP. Each occupant pays the externality it imposes on the bidders ranked below it:
/// the total payment of slot k is sum over j >= k of (clicks[j] - clicks[j+1]) * bid[j+1],
/// where the bid below the last filled slot is the first unallocated qualifying bid or the reserve.
/// The per-click price is that total divided by the slot's clicks, rounded to the nearest unit.

use crate::auction::{price_below_allocation, rank_bids, AuctionOutcome, Bid};
use crate::mechanism::MechanismTrait;
use rand::rngs::StdRng;

pub struct MechanismVcg;

impl MechanismTrait for MechanismVcg {
    fn mechanism_name(&self) -> &'static str {
        "vcg"
    }

    fn compute(&self, slot_clicks: &[u64], reserve: u64, bids: &[Bid], rng: &mut StdRng) -> AuctionOutcome {
        let valid_bids = rank_bids(bids, reserve, rng);

        let num_allocated = slot_clicks.len().min(valid_bids.len());
        if num_allocated == 0 {
            return AuctionOutcome::empty();
        }

        let allocation: Vec<usize> = valid_bids[..num_allocated].iter().map(|bid| bid.agent_id).collect();

        // next_prices[k] is the bid ranked right below slot k
        let mut next_prices: Vec<u64> = valid_bids[1..num_allocated].iter().map(|bid| bid.amount).collect();
        next_prices.push(price_below_allocation(&valid_bids, num_allocated, reserve));

        // Walk from the bottom slot up, accumulating total payments
        let mut per_click_payments = vec![0; num_allocated];
        let mut total_payment: u64 = 0;
        for k in (0..num_allocated).rev() {
            let clicks_below = if k + 1 < num_allocated { slot_clicks[k + 1] } else { 0 };
            total_payment += slot_clicks[k].saturating_sub(clicks_below) * next_prices[k];

            per_click_payments[k] = if slot_clicks[k] == 0 {
                // No clicks to spread the payment over, price at the limit
                next_prices[k]
            } else {
                (total_payment + slot_clicks[k] / 2) / slot_clicks[k]
            };
        }

        AuctionOutcome { allocation, per_click_payments }
    }
}
