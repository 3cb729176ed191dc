//! Bounty Settlement - Events
//!
//! Structured records for indexers. Every state-changing instruction emits one.

use anchor_lang::prelude::*;

#[event]
pub struct BountyInitialized {
    pub bounty: Pubkey,
    pub bounty_id: u64,
    pub owner: Pubkey,
    pub judge_authority: Pubkey,
    pub mint: Pubkey,
    pub floor_amount: u64,
    pub entry_fee: u64,
    pub timestamp: i64,
}

#[event]
pub struct BountyFunded {
    pub bounty_id: u64,
    pub funder: Pubkey,
    pub amount: u64,
}

#[event]
pub struct EntryAccepted {
    pub bounty_id: u64,
    pub payer: Pubkey,
    pub nonce: u64,
    pub amount_paid: u64,
    pub jackpot_contribution: u64,
    pub fee_contribution: u64,
    pub current_jackpot: u64,
    pub timestamp: i64,
}

#[event]
pub struct DecisionRecorded {
    pub bounty_id: u64,
    pub decision_hash: [u8; 32],
    pub participant: Pubkey,
    pub participant_numeric_id: u64,
    pub is_successful: bool,
    pub timestamp: i64,
}

#[event]
pub struct JackpotPaid {
    pub bounty_id: u64,
    pub winner: Pubkey,
    pub amount: u64,
    pub reseeded_jackpot: u64,
    pub timestamp: i64,
}

#[event]
pub struct FundsRecovered {
    pub bounty_id: u64,
    pub owner: Pubkey,
    pub amount: u64,
    pub max_recovery: u64,
    pub remaining_jackpot: u64,
    pub timestamp: i64,
}

#[event]
pub struct BountyStatusChanged {
    pub bounty_id: u64,
    pub active: bool,
    pub by: Pubkey,
}

#[event]
pub struct JudgeAuthorityUpdated {
    pub bounty_id: u64,
    pub previous: Pubkey,
    pub current: Pubkey,
}
