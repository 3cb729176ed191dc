#![allow(dead_code)]

use anchor_lang::error::Error;
use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use bounty_settlement::attestation::DecisionAttestation;
use bounty_settlement::errors::SettlementError;
use bounty_settlement::state::BountyLedger;
use solana_sdk::ed25519_instruction::{
    DATA_START, PUBKEY_SERIALIZED_SIZE, SIGNATURE_OFFSETS_START, SIGNATURE_SERIALIZED_SIZE,
};
use solana_sdk::signature::{Keypair, Signer};

/// 6-decimal token: 10,000.00
pub const FLOOR: u64 = 10_000_000_000;
/// 6-decimal token: 10.00
pub const ENTRY_FEE: u64 = 10_000_000;
pub const NOW: i64 = 1_750_000_000;

pub fn new_ledger(bounty_id: u64, judge: &Pubkey) -> BountyLedger {
    BountyLedger {
        bounty_id,
        owner_authority: Pubkey::new_unique(),
        judge_authority: *judge,
        mint: Pubkey::new_unique(),
        prize_wallet: Pubkey::new_unique(),
        fee_wallet: Pubkey::new_unique(),
        floor_amount: FLOOR,
        entry_fee: ENTRY_FEE,
        current_jackpot: FLOOR,
        active: true,
        created_at: NOW,
        updated_at: NOW,
        ..Default::default()
    }
}

/// Judge-side construction of a signed attestation
pub fn attest(
    judge: &Keypair,
    participant_numeric_id: u64,
    session_id: &str,
    is_successful: bool,
    timestamp: i64,
) -> DecisionAttestation {
    let mut attestation = DecisionAttestation {
        user_message: format!("attempt from {session_id}"),
        judge_response: if is_successful {
            "You win.".to_string()
        } else {
            "Nice try.".to_string()
        },
        decision_hash: [0; 32],
        signature: vec![],
        is_successful,
        participant_numeric_id,
        session_id: session_id.to_string(),
        timestamp,
    };
    attestation.decision_hash = attestation.compute_hash();
    attestation.signature = judge
        .sign_message(&attestation.decision_hash)
        .as_ref()
        .to_vec();
    attestation
}

/// Ed25519 precompile instruction for one signature, all data inline
pub fn judge_precompile(signer: &Pubkey, attestation: &DecisionAttestation) -> Instruction {
    let message = &attestation.decision_hash;
    let public_key_offset = DATA_START as u16;
    let signature_offset = public_key_offset + PUBKEY_SERIALIZED_SIZE as u16;
    let message_offset = signature_offset + SIGNATURE_SERIALIZED_SIZE as u16;

    let mut data = vec![1u8, 0u8];
    assert_eq!(data.len(), SIGNATURE_OFFSETS_START);
    for value in [
        signature_offset,
        u16::MAX,
        public_key_offset,
        u16::MAX,
        message_offset,
        message.len() as u16,
        u16::MAX,
    ] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(signer.as_ref());
    data.extend_from_slice(&attestation.signature);
    data.extend_from_slice(message);

    Instruction {
        program_id: solana_sdk::ed25519_program::ID,
        accounts: vec![],
        data,
    }
}

#[track_caller]
pub fn assert_rejected<T: std::fmt::Debug>(result: anchor_lang::Result<T>, expected: SettlementError) {
    match result {
        Ok(value) => panic!("expected {expected:?}, got Ok({value:?})"),
        Err(Error::AnchorError(e)) => {
            assert_eq!(e.error_code_number, u32::from(expected), "expected {expected:?}")
        }
        Err(other) => panic!("expected {expected:?}, got {other:?}"),
    }
}
