//! Bounty Settlement - Owner Controls

use anchor_lang::prelude::*;

use crate::errors::SettlementError;
use crate::events::{BountyStatusChanged, JudgeAuthorityUpdated};
use crate::state::BountyLedger;

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct BountyAdmin<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [BountyLedger::SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump,
        constraint = bounty.owner_authority == owner.key() @ SettlementError::Unauthorized
    )]
    pub bounty: Account<'info, BountyLedger>,
}

/// Pause or resume entries and decisions on a bounty
pub fn set_bounty_active(ctx: Context<BountyAdmin>, bounty_id: u64, active: bool) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let bounty = &mut ctx.accounts.bounty;

    bounty.ensure_bounty_id(bounty_id)?;
    bounty.set_active(active, now);

    if active {
        msg!("Bounty {} RESUMED by owner: {}", bounty_id, ctx.accounts.owner.key());
    } else {
        msg!("Bounty {} PAUSED by owner: {}", bounty_id, ctx.accounts.owner.key());
    }

    emit!(BountyStatusChanged {
        bounty_id,
        active,
        by: ctx.accounts.owner.key(),
    });

    Ok(())
}

/// Rotate the judge key that settles decisions
pub fn update_judge_authority(
    ctx: Context<BountyAdmin>,
    bounty_id: u64,
    new_judge: Pubkey,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let bounty = &mut ctx.accounts.bounty;

    bounty.ensure_bounty_id(bounty_id)?;
    let previous = bounty.rotate_judge(new_judge, now)?;

    msg!("Judge authority updated for bounty {}:", bounty_id);
    msg!("  Previous: {}", previous);
    msg!("  Current: {}", new_judge);

    emit!(JudgeAuthorityUpdated {
        bounty_id,
        previous,
        current: new_judge,
    });

    Ok(())
}

// ============================================================================
// Ledger Controls
// ============================================================================

impl BountyLedger {
    pub fn set_active(&mut self, active: bool, now: i64) {
        self.active = active;
        self.updated_at = now;
    }

    /// Replace the judge key. Returns the previous key.
    pub fn rotate_judge(&mut self, new_judge: Pubkey, now: i64) -> Result<Pubkey> {
        require!(new_judge != Pubkey::default(), SettlementError::InvalidInput);
        require!(!self.processing, SettlementError::AlreadyProcessing);

        let previous = self.judge_authority;
        self.judge_authority = new_judge;
        self.updated_at = now;
        Ok(previous)
    }
}
