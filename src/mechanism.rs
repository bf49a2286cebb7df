use crate::auction::{self, AuctionOutcome, Bid, BidRange};
use crate::gsp::MechanismGsp;
use crate::vcg::MechanismVcg;
use rand::rngs::StdRng;

/// Trait for slot auction mechanisms
/// All mechanisms share the allocation rule (reserve filter, random tie-break, rank by bid);
/// they differ only in how per-click prices are set.
pub trait MechanismTrait {
    /// Short name of the mechanism, recorded in the round history
    fn mechanism_name(&self) -> &'static str;

    /// Allocate slots and compute per-click payments
    ///
    /// # Arguments
    /// * `slot_clicks` - Expected clicks per slot, non-increasing (slot 0 gets the most clicks)
    /// * `reserve` - Minimum qualifying bid
    /// * `bids` - One bid per agent
    /// * `rng` - Source of randomness for the tie-break shuffle
    ///
    /// # Returns
    /// Allocation and per-click payments, both of length `min(slot_clicks.len(), bids >= reserve)`
    fn compute(&self, slot_clicks: &[u64], reserve: u64, bids: &[Bid], rng: &mut StdRng) -> AuctionOutcome;

    /// Range of bids that would place a new bidder in `slot` given the other bids
    fn bid_range_for_slot(&self, slot: usize, _slot_clicks: &[u64], reserve: u64, bids: &[Bid]) -> BidRange {
        auction::bid_range_for_slot(slot, reserve, bids)
    }
}

/// Mechanism selection as given in configuration
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MechanismType {
    GSP,
    VCG,
    /// GSP for the first half of the rounds, VCG for the second half
    SWITCH,
}

impl MechanismType {
    /// Parse a mechanism name (case insensitive); returns None for unknown names
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "gsp" => Some(MechanismType::GSP),
            "vcg" => Some(MechanismType::VCG),
            "switch" => Some(MechanismType::SWITCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MechanismType::GSP => "gsp",
            MechanismType::VCG => "vcg",
            MechanismType::SWITCH => "switch",
        }
    }
}

/// Decides which mechanism clears each round
pub struct MechanismSchedule {
    mechanism_type: MechanismType,
    gsp: MechanismGsp,
    vcg: MechanismVcg,
}

impl MechanismSchedule {
    pub fn new(mechanism_type: MechanismType) -> Self {
        Self {
            mechanism_type,
            gsp: MechanismGsp,
            vcg: MechanismVcg,
        }
    }

    /// Get the mechanism used in round `round` of a run with `num_rounds` rounds
    pub fn mechanism_for_round(&self, round: usize, num_rounds: usize) -> &dyn MechanismTrait {
        match self.mechanism_type {
            MechanismType::GSP => &self.gsp,
            MechanismType::VCG => &self.vcg,
            MechanismType::SWITCH => {
                if round < num_rounds / 2 {
                    &self.gsp
                } else {
                    &self.vcg
                }
            }
        }
    }
}
