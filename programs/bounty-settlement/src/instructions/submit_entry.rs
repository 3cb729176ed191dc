//! Accept an entry payment into a bounty
//!
//! The payment is split 60/40: the jackpot share goes to the bounty vault and
//! raises `current_jackpot`, the fee share goes to the fee wallet. The payer is
//! locked to this bounty until they win it.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::custody;
use crate::errors::SettlementError;
use crate::events::EntryAccepted;
use crate::state::{BountyLedger, EntryRecord, EntrySplit, ParticipantState};

#[derive(Accounts)]
#[instruction(bounty_id: u64, amount: u64, nonce: u64)]
pub struct SubmitEntry<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [BountyLedger::SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, BountyLedger>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + EntryRecord::INIT_SPACE,
        seeds = [
            EntryRecord::SEED,
            bounty_id.to_le_bytes().as_ref(),
            payer.key().as_ref(),
            nonce.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub entry: Account<'info, EntryRecord>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + ParticipantState::INIT_SPACE,
        seeds = [ParticipantState::SEED, payer.key().as_ref()],
        bump
    )]
    pub participant_state: Account<'info, ParticipantState>,

    #[account(address = bounty.mint)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = payer,
        token::token_program = token_program
    )]
    pub payer_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(mut, address = bounty.prize_wallet)]
    pub prize_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(mut, address = bounty.fee_wallet)]
    pub fee_wallet: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// One entry payment as seen by the ledger
#[derive(Debug, Clone, Copy)]
pub struct EntryRequest {
    pub bounty_id: u64,
    pub payer: Pubkey,
    pub amount: u64,
    pub nonce: u64,
    /// Balance of the paying token account before the transfer
    pub payer_balance: u64,
}

/// Validate an entry and apply it to the ledger, the receipt and the payer's
/// participant record. Checks run in a fixed order and nothing is written
/// unless all of them pass.
pub fn apply_entry(
    ledger: &mut BountyLedger,
    entry: &mut EntryRecord,
    participant: &mut ParticipantState,
    request: &EntryRequest,
    now: i64,
) -> Result<EntrySplit> {
    ledger.ensure_bounty_id(request.bounty_id)?;
    ledger.ensure_active()?;
    let split = ledger.quote_entry(request.amount)?;
    require!(!entry.is_recorded(), SettlementError::DuplicateEntry);
    participant.ensure_can_enter(request.bounty_id)?;
    require!(
        request.payer_balance >= request.amount,
        SettlementError::InsufficientFunds
    );

    ledger.credit_entry(&split, now)?;
    participant.record_entry(request.payer, request.bounty_id)?;
    entry.write(
        request.bounty_id,
        request.payer,
        request.nonce,
        request.amount,
        &split,
        now,
    );

    Ok(split)
}

pub fn handler(
    ctx: Context<SubmitEntry>,
    bounty_id: u64,
    amount: u64,
    nonce: u64,
) -> Result<EntryRecord> {
    let now = Clock::get()?.unix_timestamp;
    let payer = ctx.accounts.payer.key();

    let request = EntryRequest {
        bounty_id,
        payer,
        amount,
        nonce,
        payer_balance: ctx.accounts.payer_token_account.amount,
    };

    let split = apply_entry(
        &mut ctx.accounts.bounty,
        &mut ctx.accounts.entry,
        &mut ctx.accounts.participant_state,
        &request,
        now,
    )?;
    ctx.accounts.entry.bump = ctx.bumps.entry;
    ctx.accounts.participant_state.bump = ctx.bumps.participant_state;

    custody::deposit(
        ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.mint,
        ctx.accounts.payer_token_account.to_account_info(),
        ctx.accounts.prize_vault.to_account_info(),
        ctx.accounts.payer.to_account_info(),
        split.jackpot_contribution,
    )?;
    custody::deposit(
        ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.mint,
        ctx.accounts.payer_token_account.to_account_info(),
        ctx.accounts.fee_wallet.to_account_info(),
        ctx.accounts.payer.to_account_info(),
        split.fee_contribution,
    )?;

    let current_jackpot = ctx.accounts.bounty.current_jackpot;

    msg!("Entry accepted:");
    msg!("  Bounty ID: {}, Payer: {}, Nonce: {}", bounty_id, payer, nonce);
    msg!(
        "  Jackpot share: {}, Fee share: {}",
        split.jackpot_contribution,
        split.fee_contribution
    );
    msg!("  Current jackpot: {}", current_jackpot);

    emit!(EntryAccepted {
        bounty_id,
        payer,
        nonce,
        amount_paid: amount,
        jackpot_contribution: split.jackpot_contribution,
        fee_contribution: split.fee_contribution,
        current_jackpot,
        timestamp: now,
    });

    Ok((*ctx.accounts.entry).clone())
}
