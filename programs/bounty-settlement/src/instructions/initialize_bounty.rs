//! Create a bounty ledger and its custodial vault, seeded with the floor amount

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::custody;
use crate::errors::SettlementError;
use crate::events::BountyInitialized;
use crate::state::BountyLedger;

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct InitializeBounty<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init,
        payer = owner,
        space = 8 + BountyLedger::INIT_SPACE,
        seeds = [BountyLedger::SEED, bounty_id.to_le_bytes().as_ref()],
        bump
    )]
    pub bounty: Account<'info, BountyLedger>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = owner,
        seeds = [BountyLedger::VAULT_SEED, bounty_id.to_le_bytes().as_ref()],
        bump,
        token::mint = mint,
        token::authority = bounty,
        token::token_program = token_program
    )]
    pub prize_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        token::mint = mint,
        token::token_program = token_program
    )]
    pub fee_wallet: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = owner,
        token::token_program = token_program
    )]
    pub owner_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Parameter checks for a new bounty
pub fn validate_bounty_params(
    bounty_id: u64,
    floor_amount: u64,
    entry_fee: u64,
    judge_authority: &Pubkey,
    owner_balance: u64,
) -> Result<()> {
    require!(bounty_id != 0, SettlementError::InvalidBountyId);
    require!(floor_amount > 0, SettlementError::InvalidInput);
    require!(entry_fee > 0, SettlementError::InvalidInput);
    require!(
        *judge_authority != Pubkey::default(),
        SettlementError::InvalidInput
    );
    require!(
        owner_balance >= floor_amount,
        SettlementError::InsufficientInitialFunding
    );
    Ok(())
}

pub fn handler(
    ctx: Context<InitializeBounty>,
    bounty_id: u64,
    floor_amount: u64,
    entry_fee: u64,
    judge_authority: Pubkey,
) -> Result<()> {
    validate_bounty_params(
        bounty_id,
        floor_amount,
        entry_fee,
        &judge_authority,
        ctx.accounts.owner_token_account.amount,
    )?;

    let now = Clock::get()?.unix_timestamp;

    custody::deposit(
        ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.mint,
        ctx.accounts.owner_token_account.to_account_info(),
        ctx.accounts.prize_vault.to_account_info(),
        ctx.accounts.owner.to_account_info(),
        floor_amount,
    )?;

    let bounty = &mut ctx.accounts.bounty;
    bounty.bounty_id = bounty_id;
    bounty.owner_authority = ctx.accounts.owner.key();
    bounty.judge_authority = judge_authority;
    bounty.mint = ctx.accounts.mint.key();
    bounty.prize_wallet = ctx.accounts.prize_vault.key();
    bounty.fee_wallet = ctx.accounts.fee_wallet.key();
    bounty.floor_amount = floor_amount;
    bounty.entry_fee = entry_fee;
    bounty.current_jackpot = floor_amount;
    bounty.total_entries = 0;
    bounty.total_decisions = 0;
    bounty.total_payouts = 0;
    bounty.active = true;
    bounty.processing = false;
    bounty.last_recovery_time = 0;
    bounty.created_at = now;
    bounty.updated_at = now;
    bounty.bump = ctx.bumps.bounty;
    bounty.vault_bump = ctx.bumps.prize_vault;

    msg!("Bounty initialized:");
    msg!("  Bounty ID: {}", bounty_id);
    msg!("  Owner: {}", bounty.owner_authority);
    msg!("  Judge: {}", judge_authority);
    msg!("  Floor: {}, Entry fee: {}", floor_amount, entry_fee);

    emit!(BountyInitialized {
        bounty: bounty.key(),
        bounty_id,
        owner: bounty.owner_authority,
        judge_authority,
        mint: bounty.mint,
        floor_amount,
        entry_fee,
        timestamp: now,
    });

    Ok(())
}
