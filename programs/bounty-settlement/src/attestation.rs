//! Bounty Settlement - Judge Attestations
//!
//! A judge verdict reaches the program as a `DecisionAttestation`. Before any
//! funds move it has to pass, in order: shape limits, timestamp freshness, the
//! SHA-256 payload commitment, and an Ed25519 signature by the bounty judge.
//!
//! Signatures are verified by the Ed25519 precompile. The judge service places
//! a precompile instruction immediately before `submit_decision` in the same
//! transaction; the runtime rejects the whole transaction if that signature is
//! invalid, and this module checks that the instruction verified the right key,
//! digest and signature bytes.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hashv;
use solana_program::ed25519_program;
use solana_program::instruction::Instruction;
use solana_program::sysvar::instructions::{load_current_index_checked, load_instruction_at_checked};

use crate::errors::SettlementError;
use crate::state::BountyLedger;

/// Maximum length of the participant message and the judge response (bytes)
pub const MAX_MESSAGE_LENGTH: usize = 5000;
/// Maximum length of a session id (bytes)
pub const MAX_SESSION_ID_LENGTH: usize = 100;
/// Accepted distance between the attested timestamp and the cluster clock
pub const TIMESTAMP_TOLERANCE_SECONDS: i64 = 3600;
pub const SIGNATURE_LENGTH: usize = 64;

// Ed25519 precompile instruction layout
const ED25519_OFFSETS_START: usize = 2;
const ED25519_OFFSETS_LEN: usize = 14;
const ED25519_PUBKEY_LEN: usize = 32;
/// Instruction index meaning "data lives in this same instruction"
const CURRENT_INSTRUCTION: u16 = u16::MAX;

const FIELD_SEPARATOR: &[u8] = &[0];

// ============================================================================
// Attestation Payload
// ============================================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DecisionAttestation {
    /// Participant message the judge evaluated
    pub user_message: String,

    /// Response the judge evaluated
    pub judge_response: String,

    /// SHA-256 commitment over the other fields
    pub decision_hash: [u8; 32],

    /// Ed25519 signature by the judge over `decision_hash`
    pub signature: Vec<u8>,

    pub is_successful: bool,

    /// Judge-side participant id, never 0
    pub participant_numeric_id: u64,

    pub session_id: String,

    /// Unix time at which the judge issued the decision
    pub timestamp: i64,
}

impl DecisionAttestation {
    pub fn validate_shape(&self) -> Result<()> {
        require!(
            self.user_message.len() <= MAX_MESSAGE_LENGTH,
            SettlementError::InputTooLong
        );
        require!(
            self.judge_response.len() <= MAX_MESSAGE_LENGTH,
            SettlementError::InputTooLong
        );
        require!(
            self.session_id.len() <= MAX_SESSION_ID_LENGTH,
            SettlementError::InputTooLong
        );
        require!(
            is_valid_session_id(&self.session_id),
            SettlementError::InvalidSessionId
        );
        require!(
            self.participant_numeric_id != 0,
            SettlementError::InvalidInput
        );
        Ok(())
    }

    pub fn check_freshness(&self, now: i64) -> Result<()> {
        require!(
            self.timestamp > 0
                && now.abs_diff(self.timestamp) <= TIMESTAMP_TOLERANCE_SECONDS as u64,
            SettlementError::TimestampOutOfRange
        );
        Ok(())
    }

    pub fn compute_hash(&self) -> [u8; 32] {
        compute_decision_hash(
            &self.user_message,
            &self.judge_response,
            self.is_successful,
            self.participant_numeric_id,
            &self.session_id,
            self.timestamp,
        )
    }

    pub fn verify_hash(&self) -> Result<()> {
        require!(
            self.decision_hash == self.compute_hash(),
            SettlementError::InvalidDecisionHash
        );
        Ok(())
    }
}

/// Non-empty, ASCII letters, digits, '-' and '_' only.
///
/// Stricter than the judge service's own ids, which may be empty or contain
/// Unicode alphanumerics; such sessions are rejected with `InvalidSessionId`
/// rather than stored.
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Canonical decision digest.
///
/// Byte layout: `user_message ‖ 0x00 ‖ judge_response ‖ 0x00 ‖ is_successful (1 byte)
/// ‖ participant_numeric_id (u64 LE) ‖ session_id ‖ timestamp (i64 LE)`.
/// The judge service must hash exactly this sequence.
pub fn compute_decision_hash(
    user_message: &str,
    judge_response: &str,
    is_successful: bool,
    participant_numeric_id: u64,
    session_id: &str,
    timestamp: i64,
) -> [u8; 32] {
    let outcome = [is_successful as u8];
    let participant = participant_numeric_id.to_le_bytes();
    let issued_at = timestamp.to_le_bytes();

    hashv(&[
        user_message.as_bytes(),
        FIELD_SEPARATOR,
        judge_response.as_bytes(),
        FIELD_SEPARATOR,
        &outcome,
        &participant,
        session_id.as_bytes(),
        &issued_at,
    ])
    .to_bytes()
}

// ============================================================================
// Ed25519 Precompile Introspection
// ============================================================================

/// What a single-signature Ed25519 precompile instruction verified
#[derive(Debug, PartialEq, Eq)]
pub struct Ed25519Verification<'a> {
    pub public_key: Pubkey,
    pub signature: &'a [u8],
    pub message: &'a [u8],
}

/// Parse precompile instruction data.
///
/// Only one signature is accepted, and every offset must point into the
/// instruction itself so the verified bytes cannot be borrowed from elsewhere
/// in the transaction.
pub fn parse_ed25519_instruction(data: &[u8]) -> Result<Ed25519Verification<'_>> {
    require!(
        data.len() >= ED25519_OFFSETS_START + ED25519_OFFSETS_LEN,
        SettlementError::InvalidSignature
    );
    require!(data[0] == 1, SettlementError::InvalidSignature);

    let offsets = &data[ED25519_OFFSETS_START..ED25519_OFFSETS_START + ED25519_OFFSETS_LEN];
    let field = |i: usize| u16::from_le_bytes([offsets[2 * i], offsets[2 * i + 1]]);

    let signature_offset = field(0) as usize;
    let signature_instruction = field(1);
    let public_key_offset = field(2) as usize;
    let public_key_instruction = field(3);
    let message_offset = field(4) as usize;
    let message_size = field(5) as usize;
    let message_instruction = field(6);

    require!(
        signature_instruction == CURRENT_INSTRUCTION
            && public_key_instruction == CURRENT_INSTRUCTION
            && message_instruction == CURRENT_INSTRUCTION,
        SettlementError::InvalidSignature
    );

    let signature = read_slice(data, signature_offset, SIGNATURE_LENGTH)?;
    let public_key = read_slice(data, public_key_offset, ED25519_PUBKEY_LEN)?;
    let message = read_slice(data, message_offset, message_size)?;

    let public_key = <[u8; 32]>::try_from(public_key)
        .map_err(|_| error!(SettlementError::InvalidSignature))?;

    Ok(Ed25519Verification {
        public_key: Pubkey::new_from_array(public_key),
        signature,
        message,
    })
}

fn read_slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset
        .checked_add(len)
        .ok_or(error!(SettlementError::InvalidSignature))?;
    data.get(offset..end)
        .ok_or(error!(SettlementError::InvalidSignature))
}

/// Check that `instruction` is a precompile verification of `signature` over
/// `message` by `judge`.
pub fn verify_judge_signature(
    instruction: &Instruction,
    judge: &Pubkey,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    require_keys_eq!(
        instruction.program_id,
        ed25519_program::ID,
        SettlementError::InvalidSignature
    );

    let verified = parse_ed25519_instruction(&instruction.data)?;

    require_keys_eq!(
        verified.public_key,
        *judge,
        SettlementError::UnauthorizedBackend
    );
    require!(verified.message == message, SettlementError::InvalidSignature);
    require!(verified.signature == signature, SettlementError::InvalidSignature);

    Ok(())
}

/// Load the instruction right before the one currently executing
pub fn load_preceding_instruction(instructions_sysvar: &AccountInfo) -> Option<Instruction> {
    let current = load_current_index_checked(instructions_sysvar).ok()?;
    let previous = current.checked_sub(1)?;
    load_instruction_at_checked(previous as usize, instructions_sysvar).ok()
}

// ============================================================================
// Full Verification Pipeline
// ============================================================================

/// Run every attestation check in order. The first failure aborts.
///
/// `judge_account` is the authority account the caller supplied;
/// `judge_instruction` is the precompile instruction preceding the call, if any.
pub fn verify_decision(
    ledger: &BountyLedger,
    attestation: &DecisionAttestation,
    judge_account: &Pubkey,
    judge_instruction: Option<&Instruction>,
    now: i64,
) -> Result<()> {
    attestation.validate_shape()?;
    attestation.check_freshness(now)?;
    attestation.verify_hash()?;

    require!(
        attestation.signature.len() == SIGNATURE_LENGTH,
        SettlementError::InvalidSignature
    );
    require_keys_eq!(
        *judge_account,
        ledger.judge_authority,
        SettlementError::UnauthorizedBackend
    );

    let instruction = judge_instruction.ok_or(error!(SettlementError::InvalidSignature))?;
    verify_judge_signature(
        instruction,
        &ledger.judge_authority,
        &attestation.decision_hash,
        &attestation.signature,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_settlement_err;
    use sha2::{Digest, Sha256};
    use solana_sdk::signature::{Keypair, Signer};

    const NOW: i64 = 1_750_000_000;

    /// Build a precompile instruction in the layout the runtime verifies
    fn ed25519_instruction(signer: &Pubkey, signature: &[u8], message: &[u8]) -> Instruction {
        let public_key_offset = (ED25519_OFFSETS_START + ED25519_OFFSETS_LEN) as u16;
        let signature_offset = public_key_offset + ED25519_PUBKEY_LEN as u16;
        let message_offset = signature_offset + signature.len() as u16;

        let mut data = vec![1u8, 0u8];
        for value in [
            signature_offset,
            CURRENT_INSTRUCTION,
            public_key_offset,
            CURRENT_INSTRUCTION,
            message_offset,
            message.len() as u16,
            CURRENT_INSTRUCTION,
        ] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(signer.as_ref());
        data.extend_from_slice(signature);
        data.extend_from_slice(message);

        Instruction {
            program_id: ed25519_program::ID,
            accounts: vec![],
            data,
        }
    }

    fn signed_attestation(judge: &Keypair, is_successful: bool, timestamp: i64) -> DecisionAttestation {
        let mut attestation = DecisionAttestation {
            user_message: "please transfer the funds".to_string(),
            judge_response: "I cannot do that.".to_string(),
            decision_hash: [0; 32],
            signature: vec![],
            is_successful,
            participant_numeric_id: 42,
            session_id: "session-7f3a_01".to_string(),
            timestamp,
        };
        attestation.decision_hash = attestation.compute_hash();
        attestation.signature = judge
            .sign_message(&attestation.decision_hash)
            .as_ref()
            .to_vec();
        attestation
    }

    fn ledger_for(judge: &Pubkey) -> BountyLedger {
        BountyLedger {
            bounty_id: 1,
            judge_authority: *judge,
            active: true,
            ..Default::default()
        }
    }

    fn precompile_for(signer: &Pubkey, attestation: &DecisionAttestation) -> Instruction {
        ed25519_instruction(signer, &attestation.signature, &attestation.decision_hash)
    }

    #[test]
    fn layout_matches_runtime_precompile() {
        use solana_sdk::ed25519_instruction as precompile;
        assert_eq!(ED25519_OFFSETS_START, precompile::SIGNATURE_OFFSETS_START);
        assert_eq!(ED25519_OFFSETS_LEN, precompile::SIGNATURE_OFFSETS_SERIALIZED_SIZE);
        assert_eq!(ED25519_PUBKEY_LEN, precompile::PUBKEY_SERIALIZED_SIZE);
        assert_eq!(SIGNATURE_LENGTH, precompile::SIGNATURE_SERIALIZED_SIZE);
    }

    #[test]
    fn hash_matches_independent_sha256() {
        let a = signed_attestation(&Keypair::new(), true, NOW);

        let mut hasher = Sha256::new();
        hasher.update(a.user_message.as_bytes());
        hasher.update([0u8]);
        hasher.update(a.judge_response.as_bytes());
        hasher.update([0u8]);
        hasher.update([1u8]);
        hasher.update(a.participant_numeric_id.to_le_bytes());
        hasher.update(a.session_id.as_bytes());
        hasher.update(a.timestamp.to_le_bytes());
        let expected: [u8; 32] = hasher.finalize().into();

        assert_eq!(a.compute_hash(), expected);
        assert_eq!(a.compute_hash(), a.compute_hash());
    }

    #[test]
    fn hash_changes_with_every_field() {
        let base = signed_attestation(&Keypair::new(), false, NOW);
        let baseline = base.compute_hash();

        let mut variants = Vec::new();
        let mut v = base.clone();
        v.user_message.push('!');
        variants.push(v);
        let mut v = base.clone();
        v.judge_response.push('!');
        variants.push(v);
        let mut v = base.clone();
        v.is_successful = true;
        variants.push(v);
        let mut v = base.clone();
        v.participant_numeric_id += 1;
        variants.push(v);
        let mut v = base.clone();
        v.session_id.push('x');
        variants.push(v);
        let mut v = base.clone();
        v.timestamp += 1;
        variants.push(v);

        for variant in variants {
            assert_ne!(variant.compute_hash(), baseline, "{variant:?}");
        }
    }

    #[test]
    fn separators_keep_message_boundaries_distinct() {
        let a = compute_decision_hash("ab", "c", false, 1, "s", NOW);
        let b = compute_decision_hash("a", "bc", false, 1, "s", NOW);
        assert_ne!(a, b);
    }

    #[test]
    fn shape_limits() {
        let judge = Keypair::new();
        let base = signed_attestation(&judge, false, NOW);
        assert!(base.validate_shape().is_ok());

        let mut a = base.clone();
        a.user_message = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert_settlement_err(a.validate_shape(), SettlementError::InputTooLong);

        let mut a = base.clone();
        a.judge_response = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert_settlement_err(a.validate_shape(), SettlementError::InputTooLong);

        let mut a = base.clone();
        a.session_id = "s".repeat(MAX_SESSION_ID_LENGTH + 1);
        assert_settlement_err(a.validate_shape(), SettlementError::InputTooLong);

        let mut a = base.clone();
        a.user_message = "x".repeat(MAX_MESSAGE_LENGTH);
        a.session_id = "s".repeat(MAX_SESSION_ID_LENGTH);
        assert!(a.validate_shape().is_ok());

        for bad in ["", "has space", "semi;colon", "slash/", "ünïcode"] {
            let mut a = base.clone();
            a.session_id = bad.to_string();
            assert_settlement_err(a.validate_shape(), SettlementError::InvalidSessionId);
        }

        let mut a = base.clone();
        a.participant_numeric_id = 0;
        assert_settlement_err(a.validate_shape(), SettlementError::InvalidInput);
    }

    #[test]
    fn freshness_window_is_inclusive() {
        let a = signed_attestation(&Keypair::new(), false, NOW);
        assert!(a.check_freshness(NOW + TIMESTAMP_TOLERANCE_SECONDS).is_ok());
        assert!(a.check_freshness(NOW - TIMESTAMP_TOLERANCE_SECONDS).is_ok());
        assert_settlement_err(
            a.check_freshness(NOW + TIMESTAMP_TOLERANCE_SECONDS + 1),
            SettlementError::TimestampOutOfRange,
        );
        assert_settlement_err(
            a.check_freshness(NOW - TIMESTAMP_TOLERANCE_SECONDS - 1),
            SettlementError::TimestampOutOfRange,
        );

        let mut negative = a.clone();
        negative.timestamp = -5;
        assert_settlement_err(negative.check_freshness(0), SettlementError::TimestampOutOfRange);
    }

    #[test]
    fn judge_signed_decision_verifies() {
        let judge = Keypair::new();
        let a = signed_attestation(&judge, true, NOW);
        let ix = precompile_for(&judge.pubkey(), &a);
        assert!(verify_decision(&ledger_for(&judge.pubkey()), &a, &judge.pubkey(), Some(&ix), NOW).is_ok());
    }

    #[test]
    fn wrong_signature_length_is_rejected_even_with_correct_hash() {
        let judge = Keypair::new();
        let ledger = ledger_for(&judge.pubkey());
        for len in [0usize, 32, 63, 65, 128] {
            let mut a = signed_attestation(&judge, true, NOW);
            a.signature.resize(len, 7);
            let ix = precompile_for(&judge.pubkey(), &a);
            assert!(a.verify_hash().is_ok());
            assert_settlement_err(
                verify_decision(&ledger, &a, &judge.pubkey(), Some(&ix), NOW),
                SettlementError::InvalidSignature,
            );
        }
    }

    #[test]
    fn signature_from_another_key_is_unauthorized() {
        let judge = Keypair::new();
        let impostor = Keypair::new();
        let a = signed_attestation(&impostor, true, NOW);
        let ix = precompile_for(&impostor.pubkey(), &a);
        assert!(a.verify_hash().is_ok());
        assert_settlement_err(
            verify_decision(&ledger_for(&judge.pubkey()), &a, &judge.pubkey(), Some(&ix), NOW),
            SettlementError::UnauthorizedBackend,
        );
    }

    #[test]
    fn supplied_authority_account_must_be_the_judge() {
        let judge = Keypair::new();
        let a = signed_attestation(&judge, true, NOW);
        let ix = precompile_for(&judge.pubkey(), &a);
        assert_settlement_err(
            verify_decision(&ledger_for(&judge.pubkey()), &a, &Pubkey::new_unique(), Some(&ix), NOW),
            SettlementError::UnauthorizedBackend,
        );
    }

    #[test]
    fn missing_or_mismatched_precompile_is_invalid_signature() {
        let judge = Keypair::new();
        let ledger = ledger_for(&judge.pubkey());
        let a = signed_attestation(&judge, true, NOW);

        assert_settlement_err(
            verify_decision(&ledger, &a, &judge.pubkey(), None, NOW),
            SettlementError::InvalidSignature,
        );

        // precompile verified a different digest
        let other = signed_attestation(&judge, false, NOW);
        let ix = precompile_for(&judge.pubkey(), &other);
        assert_settlement_err(
            verify_decision(&ledger, &a, &judge.pubkey(), Some(&ix), NOW),
            SettlementError::InvalidSignature,
        );

        let mut ix = precompile_for(&judge.pubkey(), &a);
        ix.program_id = Pubkey::new_unique();
        assert_settlement_err(
            verify_decision(&ledger, &a, &judge.pubkey(), Some(&ix), NOW),
            SettlementError::InvalidSignature,
        );
    }

    #[test]
    fn valid_signature_over_other_payload_cannot_be_replayed() {
        let judge = Keypair::new();
        let ledger = ledger_for(&judge.pubkey());
        let losing = signed_attestation(&judge, false, NOW);

        // flip the verdict but keep the judge's digest and signature
        let mut forged = losing.clone();
        forged.is_successful = true;
        let ix = precompile_for(&judge.pubkey(), &losing);
        assert_settlement_err(
            verify_decision(&ledger, &forged, &judge.pubkey(), Some(&ix), NOW),
            SettlementError::InvalidDecisionHash,
        );
    }

    #[test]
    fn stale_decision_is_rejected_regardless_of_signature() {
        let judge = Keypair::new();
        let a = signed_attestation(&judge, true, NOW - TIMESTAMP_TOLERANCE_SECONDS - 1);
        let ix = precompile_for(&judge.pubkey(), &a);
        assert_settlement_err(
            verify_decision(&ledger_for(&judge.pubkey()), &a, &judge.pubkey(), Some(&ix), NOW),
            SettlementError::TimestampOutOfRange,
        );

        let future = signed_attestation(&judge, true, NOW + TIMESTAMP_TOLERANCE_SECONDS + 1);
        let ix = precompile_for(&judge.pubkey(), &future);
        assert_settlement_err(
            verify_decision(&ledger_for(&judge.pubkey()), &future, &judge.pubkey(), Some(&ix), NOW),
            SettlementError::TimestampOutOfRange,
        );
    }

    #[test]
    fn precompile_parser_rejects_foreign_offsets_and_batches() {
        let judge = Keypair::new();
        let a = signed_attestation(&judge, true, NOW);
        let ix = precompile_for(&judge.pubkey(), &a);

        let parsed = parse_ed25519_instruction(&ix.data).unwrap();
        assert_eq!(parsed.public_key, judge.pubkey());
        assert_eq!(parsed.message, &a.decision_hash[..]);

        // message read from instruction 0 instead of the precompile itself
        let mut foreign = ix.data.clone();
        foreign[ED25519_OFFSETS_START + 12..ED25519_OFFSETS_START + 14]
            .copy_from_slice(&0u16.to_le_bytes());
        assert_settlement_err(
            parse_ed25519_instruction(&foreign),
            SettlementError::InvalidSignature,
        );

        let mut batch = ix.data.clone();
        batch[0] = 2;
        assert_settlement_err(
            parse_ed25519_instruction(&batch),
            SettlementError::InvalidSignature,
        );

        assert_settlement_err(
            parse_ed25519_instruction(&ix.data[..ix.data.len() - 1]),
            SettlementError::InvalidSignature,
        );
        assert_settlement_err(parse_ed25519_instruction(&[1, 0]), SettlementError::InvalidSignature);
    }
}
