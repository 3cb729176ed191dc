//! Bounty Settlement - Token Custody
//!
//! All token movement goes through these two helpers. Deposits are signed by
//! the paying wallet; releases from a vault are signed by the bounty ledger PDA,
//! which is the vault's token authority.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{transfer_checked, Mint, TransferChecked};

use crate::state::BountyLedger;

/// Move `amount` from a wallet-owned token account. Zero amounts are skipped.
pub fn deposit<'info>(
    token_program: AccountInfo<'info>,
    mint: &InterfaceAccount<'info, Mint>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let accounts = TransferChecked {
        from,
        mint: mint.to_account_info(),
        to,
        authority,
    };
    transfer_checked(CpiContext::new(token_program, accounts), amount, mint.decimals)
}

/// Move `amount` out of a bounty vault, signed by the ledger PDA.
/// Zero amounts are skipped.
#[allow(clippy::too_many_arguments)]
pub fn release<'info>(
    token_program: AccountInfo<'info>,
    mint: &InterfaceAccount<'info, Mint>,
    vault: AccountInfo<'info>,
    to: AccountInfo<'info>,
    ledger: AccountInfo<'info>,
    bounty_id: u64,
    ledger_bump: u8,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let bounty_id_bytes = bounty_id.to_le_bytes();
    let seeds: &[&[u8]] = &[BountyLedger::SEED, &bounty_id_bytes, &[ledger_bump]];
    let signer_seeds = &[seeds];

    let accounts = TransferChecked {
        from: vault,
        mint: mint.to_account_info(),
        to,
        authority: ledger,
    };
    transfer_checked(
        CpiContext::new_with_signer(token_program, accounts, signer_seeds),
        amount,
        mint.decimals,
    )
}
