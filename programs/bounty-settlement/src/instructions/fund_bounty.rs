//! Top up a bounty vault. Permissionless.
//!
//! Deposits back future re-seeds of the jackpot; `current_jackpot` is unchanged.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::custody;
use crate::errors::SettlementError;
use crate::events::BountyFunded;
use crate::state::BountyLedger;

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct FundBounty<'info> {
    pub funder: Signer<'info>,

    #[account(
        seeds = [BountyLedger::SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, BountyLedger>,

    #[account(address = bounty.mint)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(mut, address = bounty.prize_wallet)]
    pub prize_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = funder,
        token::token_program = token_program
    )]
    pub funder_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<FundBounty>, bounty_id: u64, amount: u64) -> Result<()> {
    ctx.accounts.bounty.ensure_bounty_id(bounty_id)?;
    require!(amount > 0, SettlementError::InvalidInput);
    require!(
        ctx.accounts.funder_token_account.amount >= amount,
        SettlementError::InsufficientFunds
    );

    custody::deposit(
        ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.mint,
        ctx.accounts.funder_token_account.to_account_info(),
        ctx.accounts.prize_vault.to_account_info(),
        ctx.accounts.funder.to_account_info(),
        amount,
    )?;

    msg!(
        "Bounty {} funded with {} by {}",
        bounty_id,
        amount,
        ctx.accounts.funder.key()
    );

    emit!(BountyFunded {
        bounty_id,
        funder: ctx.accounts.funder.key(),
        amount,
    });

    Ok(())
}
