//! Audit log of the vault.
//!
//! Every state transition publishes one `#[contractevent]`. The snake_case
//! struct name is the leading topic; fields marked `#[topic]` are appended
//! to the topics and the rest forms the data map. Entities are never deleted
//! from storage, so these events together with the stored records are the
//! complete history of the vault.
use soroban_sdk::{contractevent, Address, Env};

use crate::types::ProposalAction;

// ---------------------------------------------------------------------------
// Transaction pipeline
// ---------------------------------------------------------------------------

#[contractevent]
#[derive(Clone, Debug)]
pub struct TransactionSubmitted {
    #[topic]
    pub id: u64,
    pub proposer: Address,
    pub to: Address,
    pub value: i128,
    pub has_payload: bool,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct TransactionConfirmed {
    #[topic]
    pub id: u64,
    pub owner: Address,
    pub confirmation_count: u32,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct ConfirmationRevoked {
    #[topic]
    pub id: u64,
    pub owner: Address,
    pub confirmation_count: u32,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct TransactionQueued {
    #[topic]
    pub id: u64,
    pub execute_after: u64,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct TransactionExecuted {
    #[topic]
    pub id: u64,
    pub executor: Address,
    pub to: Address,
    pub value: i128,
    pub instant: bool,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct TransactionCancelled {
    #[topic]
    pub id: u64,
    pub cancelled_by: Address,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct TransactionExpired {
    #[topic]
    pub id: u64,
}

// ---------------------------------------------------------------------------
// Governance pipeline
// ---------------------------------------------------------------------------

#[contractevent]
#[derive(Clone, Debug)]
pub struct ProposalSubmitted {
    #[topic]
    pub id: u64,
    pub proposer: Address,
    pub action: ProposalAction,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct ProposalConfirmed {
    #[topic]
    pub id: u64,
    pub owner: Address,
    pub confirmation_count: u32,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct ProposalConfirmationRevoked {
    #[topic]
    pub id: u64,
    pub owner: Address,
    pub confirmation_count: u32,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct ProposalQueued {
    #[topic]
    pub id: u64,
    pub execute_after: u64,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct ProposalExecuted {
    #[topic]
    pub id: u64,
    pub executor: Address,
    pub action: ProposalAction,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct ProposalCancelled {
    #[topic]
    pub id: u64,
    pub cancelled_by: Address,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct ProposalExpired {
    #[topic]
    pub id: u64,
}

// ---------------------------------------------------------------------------
// Registry, limits, emergency, custody
// ---------------------------------------------------------------------------

#[contractevent]
#[derive(Clone, Debug)]
pub struct OwnerAdded {
    pub owner: Address,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct OwnerRemoved {
    pub owner: Address,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct ThresholdChanged {
    pub threshold: u32,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct TimeLockChanged {
    pub time_lock_delay: u64,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct DailyLimitChanged {
    pub limit: i128,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct GuardianAdded {
    pub guardian: Address,
    pub added_by: Address,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct GuardianRemoved {
    pub guardian: Address,
    pub removed_by: Address,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct EmergencyModeActivated {
    pub guardian: Address,
    pub activated_at: u64,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct EmergencyModeDeactivated {
    pub deactivated_by: Address,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct EmergencyRecoveryExecuted {
    pub new_owner: Address,
    pub timestamp: u64,
}

#[contractevent]
#[derive(Clone, Debug)]
pub struct Deposit {
    pub from: Address,
    pub amount: i128,
    pub timestamp: u64,
}

// ---------------------------------------------------------------------------
// Emit helpers
// ---------------------------------------------------------------------------

pub fn emit_confirmed(env: &Env, id: u64, owner: &Address, confirmation_count: u32) {
    TransactionConfirmed {
        id,
        owner: owner.clone(),
        confirmation_count,
    }
    .publish(env);
}

pub fn emit_proposal_confirmed(env: &Env, id: u64, owner: &Address, confirmation_count: u32) {
    ProposalConfirmed {
        id,
        owner: owner.clone(),
        confirmation_count,
    }
    .publish(env);
}

pub fn emit_queued(env: &Env, id: u64, execute_after: u64) {
    TransactionQueued { id, execute_after }.publish(env);
}

pub fn emit_proposal_queued(env: &Env, id: u64, execute_after: u64) {
    ProposalQueued { id, execute_after }.publish(env);
}

pub fn emit_deposit(env: &Env, event: Deposit) {
    event.publish(env);
}
