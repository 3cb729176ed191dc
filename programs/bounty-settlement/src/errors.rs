//! Bounty Settlement - Program Errors

use anchor_lang::prelude::*;

#[error_code]
pub enum SettlementError {
    // ========================================================================
    // Input / Shape Errors
    // ========================================================================

    #[msg("Invalid bounty id: 0 is reserved and ids must match the ledger")]
    InvalidBountyId,

    #[msg("Payment must equal the bounty entry fee exactly")]
    WrongAmount,

    #[msg("Input string exceeds maximum length")]
    InputTooLong,

    #[msg("Invalid session id: only letters, digits, '-' and '_' are allowed")]
    InvalidSessionId,

    #[msg("Input value is invalid")]
    InvalidInput,

    #[msg("Decision timestamp is outside the accepted window")]
    TimestampOutOfRange,

    // ========================================================================
    // Authorization / Integrity Errors
    // ========================================================================

    #[msg("Unauthorized: caller is not the bounty owner")]
    Unauthorized,

    #[msg("Unauthorized judge: decision was not issued by the bounty judge")]
    UnauthorizedBackend,

    #[msg("Invalid judge signature")]
    InvalidSignature,

    #[msg("Decision hash does not match the attested payload")]
    InvalidDecisionHash,

    #[msg("A settlement is already in progress for this bounty")]
    AlreadyProcessing,

    #[msg("This decision has already been recorded")]
    DecisionAlreadyRecorded,

    // ========================================================================
    // Policy Errors
    // ========================================================================

    #[msg("Bounty is not active")]
    InactiveBounty,

    #[msg("An entry with this nonce already exists")]
    DuplicateEntry,

    #[msg("Participant is already active in a different bounty")]
    ParticipantActiveInDifferentBounty,

    #[msg("Winner is not active in this bounty")]
    WinnerNotActiveInBounty,

    #[msg("Emergency recovery cooldown is still active")]
    RecoveryCooldownActive,

    #[msg("Emergency recovery amount exceeds maximum allowed")]
    RecoveryAmountExceedsLimit,

    // ========================================================================
    // Funds Errors
    // ========================================================================

    #[msg("Insufficient funds for operation")]
    InsufficientFunds,

    #[msg("Owner cannot fund the bounty floor")]
    InsufficientInitialFunding,

    // ========================================================================
    // Arithmetic Errors
    // ========================================================================

    #[msg("Overflow in arithmetic operation")]
    Overflow,

    #[msg("Underflow in arithmetic operation")]
    Underflow,
}

/// How a caller should treat a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input; resubmit with corrected data.
    Input,
    /// Bad signature, hash, authority or reentrancy. Never retried automatically.
    Integrity,
    /// Expected during normal operation.
    Policy,
    /// Custody does not cover the request.
    Funds,
    Arithmetic,
}

impl SettlementError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SettlementError::InvalidBountyId
            | SettlementError::WrongAmount
            | SettlementError::InputTooLong
            | SettlementError::InvalidSessionId
            | SettlementError::InvalidInput
            | SettlementError::TimestampOutOfRange => ErrorCategory::Input,

            SettlementError::Unauthorized
            | SettlementError::UnauthorizedBackend
            | SettlementError::InvalidSignature
            | SettlementError::InvalidDecisionHash
            | SettlementError::AlreadyProcessing
            | SettlementError::DecisionAlreadyRecorded => ErrorCategory::Integrity,

            SettlementError::InactiveBounty
            | SettlementError::DuplicateEntry
            | SettlementError::ParticipantActiveInDifferentBounty
            | SettlementError::WinnerNotActiveInBounty
            | SettlementError::RecoveryCooldownActive
            | SettlementError::RecoveryAmountExceedsLimit => ErrorCategory::Policy,

            SettlementError::InsufficientFunds
            | SettlementError::InsufficientInitialFunding => ErrorCategory::Funds,

            SettlementError::Overflow | SettlementError::Underflow => ErrorCategory::Arithmetic,
        }
    }

    /// Integrity failures point at a caller bug or a forgery attempt.
    pub fn is_retryable(&self) -> bool {
        self.category() != ErrorCategory::Integrity
    }
}
