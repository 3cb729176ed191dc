//! Emergency recovery of part of a bounty jackpot by its owner
//!
//! Bounded to 10% of the current jackpot per call, at most once every 24 hours.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::custody;
use crate::errors::SettlementError;
use crate::events::FundsRecovered;
use crate::state::BountyLedger;

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct RecoverFunds<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [BountyLedger::SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump,
        constraint = bounty.owner_authority == owner.key() @ SettlementError::Unauthorized
    )]
    pub bounty: Account<'info, BountyLedger>,

    #[account(address = bounty.mint)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(mut, address = bounty.prize_wallet)]
    pub prize_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = owner,
        token::token_program = token_program
    )]
    pub owner_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<RecoverFunds>, bounty_id: u64, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let bounty = &mut ctx.accounts.bounty;

    bounty.ensure_bounty_id(bounty_id)?;
    let max_recovery = bounty.authorize_recovery(amount, now, ctx.accounts.prize_vault.amount)?;
    bounty.apply_recovery(amount, now)?;
    let remaining_jackpot = bounty.current_jackpot;
    let bump = bounty.bump;

    custody::release(
        ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.mint,
        ctx.accounts.prize_vault.to_account_info(),
        ctx.accounts.owner_token_account.to_account_info(),
        ctx.accounts.bounty.to_account_info(),
        bounty_id,
        bump,
        amount,
    )?;

    msg!("EMERGENCY RECOVERY by owner: {}", ctx.accounts.owner.key());
    msg!("  Bounty ID: {}", bounty_id);
    msg!("  Amount: {} (max {})", amount, max_recovery);
    msg!("  Remaining jackpot: {}", remaining_jackpot);

    emit!(FundsRecovered {
        bounty_id,
        owner: ctx.accounts.owner.key(),
        amount,
        max_recovery,
        remaining_jackpot,
        timestamp: now,
    });

    Ok(())
}
