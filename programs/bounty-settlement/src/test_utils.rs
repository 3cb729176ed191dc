//! Shared assertions for unit tests

use anchor_lang::error::Error;

use crate::errors::SettlementError;

pub fn error_code(err: Error) -> u32 {
    match err {
        Error::AnchorError(e) => e.error_code_number,
        Error::ProgramError(e) => panic!("expected a settlement error, got {e:?}"),
    }
}

#[track_caller]
pub fn assert_settlement_err<T: std::fmt::Debug>(
    result: anchor_lang::Result<T>,
    expected: SettlementError,
) {
    match result {
        Ok(value) => panic!("expected {expected:?}, got Ok({value:?})"),
        Err(err) => assert_eq!(
            error_code(err),
            u32::from(expected),
            "expected {expected:?}"
        ),
    }
}
