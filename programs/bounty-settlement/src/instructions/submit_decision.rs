//! Verify a judge decision and settle it
//!
//! Only the judge service submits decisions: the judge authority signs the
//! transaction, and the same key's Ed25519 signature over the decision digest
//! must be carried as a precompile instruction placed immediately before this
//! one. The winner wallet is an account, so it is only trusted when the judge
//! itself names it.
//!
//! The ledger's `processing` flag is set and written back to the account
//! before any token CPI, and cleared again on the way out.

use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use solana_program::sysvar::instructions::ID as INSTRUCTIONS_SYSVAR_ID;

use crate::attestation::{load_preceding_instruction, verify_decision, DecisionAttestation};
use crate::custody;
use crate::errors::SettlementError;
use crate::events::{DecisionRecorded, JackpotPaid};
use crate::state::{BountyLedger, DecisionRecord, ParticipantState};

#[derive(Accounts)]
#[instruction(bounty_id: u64, attestation: DecisionAttestation)]
pub struct SubmitDecision<'info> {
    /// Pays for the decision record
    #[account(mut)]
    pub relayer: Signer<'info>,

    #[account(
        mut,
        seeds = [BountyLedger::SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, BountyLedger>,

    /// Must sign; compared against `bounty.judge_authority` during verification
    pub judge_authority: Signer<'info>,

    #[account(
        init_if_needed,
        payer = relayer,
        space = 8 + DecisionRecord::INIT_SPACE,
        seeds = [
            DecisionRecord::SEED,
            bounty_id.to_le_bytes().as_ref(),
            attestation.decision_hash.as_ref()
        ],
        bump
    )]
    pub decision: Account<'info, DecisionRecord>,

    /// CHECK: wallet the decision settles against; bound by the participant
    /// state seeds and the token account authority below
    pub winner: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [ParticipantState::SEED, winner.key().as_ref()],
        bump = winner_state.bump
    )]
    pub winner_state: Account<'info, ParticipantState>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = winner,
        token::token_program = token_program
    )]
    pub winner_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(address = bounty.mint)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(mut, address = bounty.prize_wallet)]
    pub prize_vault: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: address constrained to the instructions sysvar
    #[account(address = INSTRUCTIONS_SYSVAR_ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Result of a settled decision
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub jackpot_paid: bool,
    /// Amount transferred to the winner, 0 when nothing was paid
    pub payout: u64,
}

/// Apply a verified decision to the ledger, the decision record and the
/// winner's participant record.
///
/// A failed attempt is only recorded. A successful one pays the full jackpot,
/// re-seeds it to the floor and releases the winner's exclusivity lock.
pub fn apply_decision_outcome(
    ledger: &mut BountyLedger,
    record: &mut DecisionRecord,
    winner_state: &mut ParticipantState,
    winner: Pubkey,
    attestation: &DecisionAttestation,
    vault_balance: u64,
    now: i64,
) -> Result<DecisionOutcome> {
    require!(!record.recorded, SettlementError::DecisionAlreadyRecorded);

    let mut payout = 0;
    if attestation.is_successful {
        require!(
            winner_state.is_active_in(ledger.bounty_id),
            SettlementError::WinnerNotActiveInBounty
        );
        ledger.payout_amount(vault_balance)?;
        payout = ledger.settle_payout(now)?;
        winner_state.release_after_win()?;
    }
    ledger.record_decision(now)?;

    record.bounty_id = ledger.bounty_id;
    record.decision_hash = attestation.decision_hash;
    record.participant = winner;
    record.participant_numeric_id = attestation.participant_numeric_id;
    record.session_id = attestation.session_id.clone();
    record.is_successful = attestation.is_successful;
    record.attestation_timestamp = attestation.timestamp;
    record.recorded_at = now;
    record.payout = payout;
    record.recorded = true;

    Ok(DecisionOutcome {
        jackpot_paid: attestation.is_successful,
        payout,
    })
}

pub fn handler(
    ctx: Context<SubmitDecision>,
    bounty_id: u64,
    attestation: DecisionAttestation,
) -> Result<DecisionOutcome> {
    let now = Clock::get()?.unix_timestamp;

    ctx.accounts.bounty.begin_processing()?;
    ctx.accounts.bounty.exit(&crate::ID)?;

    let result = settle(ctx.accounts, ctx.bumps.decision, bounty_id, &attestation, now);

    ctx.accounts.bounty.end_processing();
    result
}

fn settle<'info>(
    accounts: &mut SubmitDecision<'info>,
    decision_bump: u8,
    bounty_id: u64,
    attestation: &DecisionAttestation,
    now: i64,
) -> Result<DecisionOutcome> {
    accounts.bounty.ensure_bounty_id(bounty_id)?;
    accounts.bounty.ensure_active()?;

    let judge_instruction =
        load_preceding_instruction(&accounts.instructions_sysvar.to_account_info());
    verify_decision(
        &accounts.bounty,
        attestation,
        &accounts.judge_authority.key(),
        judge_instruction.as_ref(),
        now,
    )?;

    let winner = accounts.winner.key();
    let outcome = apply_decision_outcome(
        &mut accounts.bounty,
        &mut accounts.decision,
        &mut accounts.winner_state,
        winner,
        attestation,
        accounts.prize_vault.amount,
        now,
    )?;
    accounts.decision.bump = decision_bump;

    msg!("Decision recorded:");
    msg!("  Bounty ID: {}", bounty_id);
    msg!("  Participant: {} ({})", winner, attestation.participant_numeric_id);
    msg!("  Session: {}", attestation.session_id);
    msg!("  Successful: {}", attestation.is_successful);

    emit!(DecisionRecorded {
        bounty_id,
        decision_hash: attestation.decision_hash,
        participant: winner,
        participant_numeric_id: attestation.participant_numeric_id,
        is_successful: attestation.is_successful,
        timestamp: now,
    });

    if outcome.jackpot_paid {
        custody::release(
            accounts.token_program.to_account_info(),
            &accounts.mint,
            accounts.prize_vault.to_account_info(),
            accounts.winner_token_account.to_account_info(),
            accounts.bounty.to_account_info(),
            bounty_id,
            accounts.bounty.bump,
            outcome.payout,
        )?;

        msg!("JACKPOT PAID: {} to {}", outcome.payout, winner);
        msg!("  Jackpot re-seeded to {}", accounts.bounty.current_jackpot);

        emit!(JackpotPaid {
            bounty_id,
            winner,
            amount: outcome.payout,
            reseeded_jackpot: accounts.bounty.current_jackpot,
            timestamp: now,
        });
    }

    Ok(outcome)
}
