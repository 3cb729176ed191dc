//! Instruction handlers for bounty settlement

pub mod admin;
pub mod fund_bounty;
pub mod initialize_bounty;
pub mod recover_funds;
pub mod submit_decision;
pub mod submit_entry;

pub use admin::*;
pub use fund_bounty::*;
pub use initialize_bounty::*;
pub use recover_funds::*;
pub use submit_decision::*;
pub use submit_entry::*;
