//! Bounty Settlement Program
//!
//! Custodial settlement engine for pay-to-play bounties. Participants pay an
//! entry fee into a per-bounty prize vault; an off-chain judge signs a verdict
//! for each attempt; this program is the only party that can move vault funds,
//! and only after verifying the judge's Ed25519 signature and the SHA-256
//! commitment of the decision payload.
//!
//! Features:
//! - Exact 60/40 entry split between jackpot and fee wallet
//! - Judge attestations checked via the Ed25519 precompile
//! - Per-participant lock to a single bounty until a win
//! - Rate-limited, capped emergency recovery for the bounty owner

use anchor_lang::prelude::*;

pub mod attestation;
pub mod custody;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

#[cfg(test)]
pub(crate) mod test_utils;

pub use attestation::DecisionAttestation;
pub use instructions::*;
pub use state::EntryRecord;

declare_id!("71BUJ9CAUmignSQtFjppKE4fhB8XCpST8MEokSVrh8sZ");

#[program]
pub mod bounty_settlement {
    use super::*;

    // ========================================================================
    // Bounty Setup
    // ========================================================================

    /// Create a bounty ledger and vault, seeded with `floor_amount` from the owner
    pub fn initialize_bounty(
        ctx: Context<InitializeBounty>,
        bounty_id: u64,
        floor_amount: u64,
        entry_fee: u64,
        judge_authority: Pubkey,
    ) -> Result<()> {
        instructions::initialize_bounty::handler(ctx, bounty_id, floor_amount, entry_fee, judge_authority)
    }

    /// Add backing tokens to a bounty vault
    pub fn fund_bounty(ctx: Context<FundBounty>, bounty_id: u64, amount: u64) -> Result<()> {
        instructions::fund_bounty::handler(ctx, bounty_id, amount)
    }

    // ========================================================================
    // Entries & Decisions
    // ========================================================================

    /// Accept one entry payment from the signer
    pub fn submit_entry(
        ctx: Context<SubmitEntry>,
        bounty_id: u64,
        amount: u64,
        nonce: u64,
    ) -> Result<EntryRecord> {
        instructions::submit_entry::handler(ctx, bounty_id, amount, nonce)
    }

    /// Verify a judge-signed decision and pay the jackpot if it is a win
    pub fn submit_decision(
        ctx: Context<SubmitDecision>,
        bounty_id: u64,
        attestation: DecisionAttestation,
    ) -> Result<DecisionOutcome> {
        instructions::submit_decision::handler(ctx, bounty_id, attestation)
    }

    // ========================================================================
    // Owner Controls
    // ========================================================================

    /// Withdraw up to 10% of the jackpot, once per 24 hours
    pub fn recover_funds(ctx: Context<RecoverFunds>, bounty_id: u64, amount: u64) -> Result<()> {
        instructions::recover_funds::handler(ctx, bounty_id, amount)
    }

    pub fn set_bounty_active(ctx: Context<BountyAdmin>, bounty_id: u64, active: bool) -> Result<()> {
        instructions::admin::set_bounty_active(ctx, bounty_id, active)
    }

    pub fn update_judge_authority(
        ctx: Context<BountyAdmin>,
        bounty_id: u64,
        new_judge: Pubkey,
    ) -> Result<()> {
        instructions::admin::update_judge_authority(ctx, bounty_id, new_judge)
    }
}
