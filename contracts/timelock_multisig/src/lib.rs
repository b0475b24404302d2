//! Time-locked multi-signature vault.
//!
//! Owners submit and confirm outbound transactions against a configurable
//! threshold. Small payload-free transfers execute as soon as the threshold
//! is met; everything else waits out a time-lock. A rolling daily limit caps
//! the value moved per day, guardians can freeze ordinary activity with an
//! emergency mode, and the vault's own membership and parameters change only
//! through governance proposals that wait out a doubled time-lock.
#![no_std]

mod config;
mod daily_limit;
mod emergency;
mod errors;
mod events;
mod multisig;
mod proposals;
mod reentrancy;
mod registry;
mod transactions;
mod types;

pub use crate::errors::MultisigError;
pub use crate::multisig::{TimeLockMultiSig, TimeLockMultiSigClient};
pub use crate::types::{
    ContractCall, DailyLimit, EmergencyState, Payload, Proposal, ProposalAction, Transaction,
    TxStatus, VaultConfig,
};

#[cfg(test)]
mod test_proposals;
