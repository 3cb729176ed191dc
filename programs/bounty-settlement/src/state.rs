//! Bounty Settlement - State Accounts

use anchor_lang::prelude::*;

use crate::attestation::MAX_SESSION_ID_LENGTH;
use crate::errors::SettlementError;

/// Share of each entry payment credited to the jackpot, out of `SHARE_DENOMINATOR`
pub const JACKPOT_SHARE_NUMERATOR: u64 = 60;
pub const SHARE_DENOMINATOR: u64 = 100;

/// Minimum time between two emergency recoveries (24 hours)
pub const RECOVERY_COOLDOWN_SECONDS: i64 = 24 * 60 * 60;
/// Maximum percentage of the current jackpot one recovery may withdraw
pub const MAX_RECOVERY_PERCENT: u64 = 10;

/// `ParticipantState::active_bounty_id` for a participant not locked to any bounty
pub const NO_ACTIVE_BOUNTY: u64 = 0;

// ============================================================================
// Entry Split
// ============================================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntrySplit {
    pub jackpot_contribution: u64,
    pub fee_contribution: u64,
}

/// Split a payment into its jackpot and fee shares.
///
/// The jackpot share is rounded down once; the fee share is whatever remains,
/// so the two always sum to `amount`.
pub fn split_entry_amount(amount: u64) -> Result<EntrySplit> {
    let jackpot = (amount as u128)
        .checked_mul(JACKPOT_SHARE_NUMERATOR as u128)
        .ok_or(error!(SettlementError::Overflow))?
        / SHARE_DENOMINATOR as u128;
    let jackpot_contribution =
        u64::try_from(jackpot).map_err(|_| error!(SettlementError::Overflow))?;
    let fee_contribution = amount
        .checked_sub(jackpot_contribution)
        .ok_or(error!(SettlementError::Underflow))?;

    Ok(EntrySplit {
        jackpot_contribution,
        fee_contribution,
    })
}

// ============================================================================
// Bounty Ledger (Per-Bounty State)
// ============================================================================

/// PDA seeds: [b"lottery", bounty_id.to_le_bytes()]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct BountyLedger {
    /// Bounty identifier, 1..N
    pub bounty_id: u64,

    /// May pause the bounty, rotate the judge and run emergency recovery
    pub owner_authority: Pubkey,

    /// Ed25519 key whose signatures settle decisions
    pub judge_authority: Pubkey,

    /// Token mint of entries and payouts
    pub mint: Pubkey,

    /// Custodial vault holding the jackpot (token authority is this PDA)
    pub prize_wallet: Pubkey,

    /// Token account receiving the fee share of each entry
    pub fee_wallet: Pubkey,

    /// Jackpot value re-seeded after every payout
    pub floor_amount: u64,

    /// Exact payment required per entry
    pub entry_fee: u64,

    /// Prize owed to the next winner
    pub current_jackpot: u64,

    /// Statistics
    pub total_entries: u64,
    pub total_decisions: u64,
    pub total_payouts: u64,

    pub active: bool,

    /// Reentrancy guard held for the duration of one settlement
    pub processing: bool,

    /// Unix time of the last emergency recovery, 0 if none
    pub last_recovery_time: i64,

    /// Timestamps
    pub created_at: i64,
    pub updated_at: i64,

    /// PDA bump seeds
    pub bump: u8,
    pub vault_bump: u8,
}

impl BountyLedger {
    pub const SEED: &'static [u8] = b"lottery";
    pub const VAULT_SEED: &'static [u8] = b"vault";

    pub fn ensure_bounty_id(&self, bounty_id: u64) -> Result<()> {
        require!(
            bounty_id != 0 && bounty_id == self.bounty_id,
            SettlementError::InvalidBountyId
        );
        Ok(())
    }

    pub fn ensure_active(&self) -> Result<()> {
        require!(self.active, SettlementError::InactiveBounty);
        Ok(())
    }

    /// Validate a payment against the entry fee and compute its split
    pub fn quote_entry(&self, amount: u64) -> Result<EntrySplit> {
        require!(amount == self.entry_fee, SettlementError::WrongAmount);
        split_entry_amount(amount)
    }

    /// Credit an accepted entry to the jackpot
    pub fn credit_entry(&mut self, split: &EntrySplit, now: i64) -> Result<()> {
        self.current_jackpot = self
            .current_jackpot
            .checked_add(split.jackpot_contribution)
            .ok_or(error!(SettlementError::Overflow))?;
        self.total_entries = self
            .total_entries
            .checked_add(1)
            .ok_or(error!(SettlementError::Overflow))?;
        self.updated_at = now;
        Ok(())
    }

    /// Acquire the settlement guard
    pub fn begin_processing(&mut self) -> Result<()> {
        require!(!self.processing, SettlementError::AlreadyProcessing);
        self.processing = true;
        Ok(())
    }

    /// Release the settlement guard
    pub fn end_processing(&mut self) {
        self.processing = false;
    }

    pub fn record_decision(&mut self, now: i64) -> Result<()> {
        self.total_decisions = self
            .total_decisions
            .checked_add(1)
            .ok_or(error!(SettlementError::Overflow))?;
        self.updated_at = now;
        Ok(())
    }

    /// Amount owed to a winner, provided custody covers it
    pub fn payout_amount(&self, vault_balance: u64) -> Result<u64> {
        require!(self.current_jackpot > 0, SettlementError::InsufficientFunds);
        require!(
            vault_balance >= self.current_jackpot,
            SettlementError::InsufficientFunds
        );
        Ok(self.current_jackpot)
    }

    /// Pay out the whole jackpot and immediately re-seed it to the floor.
    /// Returns the amount paid.
    pub fn settle_payout(&mut self, now: i64) -> Result<u64> {
        let paid = self.current_jackpot;
        self.current_jackpot = self.floor_amount;
        self.total_payouts = self
            .total_payouts
            .checked_add(1)
            .ok_or(error!(SettlementError::Overflow))?;
        self.updated_at = now;
        Ok(paid)
    }

    pub fn max_recovery_amount(&self) -> Result<u64> {
        let max = (self.current_jackpot as u128)
            .checked_mul(MAX_RECOVERY_PERCENT as u128)
            .ok_or(error!(SettlementError::Overflow))?
            / 100;
        u64::try_from(max).map_err(|_| error!(SettlementError::Overflow))
    }

    /// Check an emergency recovery request. Returns the cap that applied.
    pub fn authorize_recovery(&self, amount: u64, now: i64, vault_balance: u64) -> Result<u64> {
        require!(amount > 0, SettlementError::InvalidInput);

        if self.last_recovery_time > 0 {
            let elapsed = now
                .checked_sub(self.last_recovery_time)
                .ok_or(error!(SettlementError::Underflow))?;
            require!(
                elapsed >= RECOVERY_COOLDOWN_SECONDS,
                SettlementError::RecoveryCooldownActive
            );
        }

        let max_recovery = self.max_recovery_amount()?;
        require!(
            amount <= max_recovery,
            SettlementError::RecoveryAmountExceedsLimit
        );
        require!(vault_balance >= amount, SettlementError::InsufficientFunds);

        Ok(max_recovery)
    }

    pub fn apply_recovery(&mut self, amount: u64, now: i64) -> Result<()> {
        self.current_jackpot = self
            .current_jackpot
            .checked_sub(amount)
            .ok_or(error!(SettlementError::Underflow))?;
        self.last_recovery_time = now;
        self.updated_at = now;
        Ok(())
    }
}

// ============================================================================
// Entry Record (Per-Payment Receipt)
// ============================================================================

/// PDA seeds: [b"entry", bounty_id.to_le_bytes(), payer, nonce.to_le_bytes()]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct EntryRecord {
    pub bounty_id: u64,
    pub payer: Pubkey,

    /// Per-(bounty, payer) uniqueness key chosen by the client
    pub nonce: u64,

    pub amount_paid: u64,
    pub jackpot_contribution: u64,
    pub fee_contribution: u64,
    pub created_at: i64,
    pub bump: u8,
}

impl EntryRecord {
    pub const SEED: &'static [u8] = b"entry";

    /// A freshly allocated record is all zeroes; a written one always has a payer
    pub fn is_recorded(&self) -> bool {
        self.payer != Pubkey::default()
    }

    pub fn write(
        &mut self,
        bounty_id: u64,
        payer: Pubkey,
        nonce: u64,
        amount_paid: u64,
        split: &EntrySplit,
        now: i64,
    ) {
        self.bounty_id = bounty_id;
        self.payer = payer;
        self.nonce = nonce;
        self.amount_paid = amount_paid;
        self.jackpot_contribution = split.jackpot_contribution;
        self.fee_contribution = split.fee_contribution;
        self.created_at = now;
    }
}

// ============================================================================
// Participant State (Cross-Bounty Exclusivity)
// ============================================================================

/// PDA seeds: [b"participant", participant]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct ParticipantState {
    pub participant: Pubkey,

    /// Bounty the participant is locked to, `NO_ACTIVE_BOUNTY` if none
    pub active_bounty_id: u64,

    pub total_entries: u64,
    pub total_wins: u64,
    pub bump: u8,
}

impl ParticipantState {
    pub const SEED: &'static [u8] = b"participant";

    pub fn is_active_in(&self, bounty_id: u64) -> bool {
        bounty_id != NO_ACTIVE_BOUNTY && self.active_bounty_id == bounty_id
    }

    pub fn ensure_can_enter(&self, bounty_id: u64) -> Result<()> {
        require!(
            self.active_bounty_id == NO_ACTIVE_BOUNTY || self.active_bounty_id == bounty_id,
            SettlementError::ParticipantActiveInDifferentBounty
        );
        Ok(())
    }

    /// Lock the participant to `bounty_id` (or confirm the existing lock)
    pub fn record_entry(&mut self, participant: Pubkey, bounty_id: u64) -> Result<()> {
        self.ensure_can_enter(bounty_id)?;

        if self.participant == Pubkey::default() {
            self.participant = participant;
        }
        self.active_bounty_id = bounty_id;
        self.total_entries = self
            .total_entries
            .checked_add(1)
            .ok_or(error!(SettlementError::Overflow))?;
        Ok(())
    }

    /// Release the exclusivity lock after a win
    pub fn release_after_win(&mut self) -> Result<()> {
        self.active_bounty_id = NO_ACTIVE_BOUNTY;
        self.total_wins = self
            .total_wins
            .checked_add(1)
            .ok_or(error!(SettlementError::Overflow))?;
        Ok(())
    }
}

// ============================================================================
// Decision Record (Audit Trail + Replay Guard)
// ============================================================================

/// PDA seeds: [b"decision", bounty_id.to_le_bytes(), decision_hash]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct DecisionRecord {
    pub bounty_id: u64,
    pub decision_hash: [u8; 32],

    /// Wallet the decision was settled against
    pub participant: Pubkey,

    /// Judge-side numeric participant id
    pub participant_numeric_id: u64,

    #[max_len(MAX_SESSION_ID_LENGTH)]
    pub session_id: String,

    pub is_successful: bool,
    pub attestation_timestamp: i64,
    pub recorded_at: i64,

    /// Amount transferred to the participant, 0 for a failed attempt
    pub payout: u64,

    pub recorded: bool,
    pub bump: u8,
}

impl DecisionRecord {
    pub const SEED: &'static [u8] = b"decision";
}
