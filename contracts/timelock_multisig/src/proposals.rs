//! Governance proposal pipeline.
//!
//! Same lifecycle as transactions, but a proposal never executes instantly:
//! reaching the threshold always queues it behind the emergency time-lock
//! (twice the ordinary delay). Execution dispatches on [`ProposalAction`] and
//! every handler re-validates against the state at execution time, since
//! membership and parameters may have moved since submission.
//!
//! While emergency mode is on, only `EmergencyRecovery` proposals can be
//! submitted or confirmed. A recovery proposal's grace period starts no
//! earlier than the moment recovery becomes possible.
use soroban_sdk::{log, Address, Env, String, Vec};

use crate::config;
use crate::daily_limit;
use crate::emergency;
use crate::errors::MultisigError;
use crate::events::{
    emit_proposal_confirmed, emit_proposal_queued, DailyLimitChanged, EmergencyModeDeactivated,
    EmergencyRecoveryExecuted, OwnerAdded, OwnerRemoved, ProposalCancelled,
    ProposalConfirmationRevoked, ProposalExecuted, ProposalExpired, ProposalSubmitted,
    ThresholdChanged, TimeLockChanged,
};
use crate::registry;
use crate::transactions::{check_execution_window, is_past_grace};
use crate::types::{DataKey, Proposal, ProposalAction, TxStatus};

pub fn load(env: &Env, id: u64) -> Result<Proposal, MultisigError> {
    env.storage()
        .persistent()
        .get(&DataKey::Proposal(id))
        .ok_or(MultisigError::ProposalNotFound)
}

fn store(env: &Env, proposal: &Proposal) {
    let key = DataKey::Proposal(proposal.id);
    env.storage().persistent().set(&key, proposal);
    config::extend_record_ttl(env, &key);
}

pub fn count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ProposalCount)
        .unwrap_or(0u64)
}

fn next_id(env: &Env) -> u64 {
    let id = count(env) + 1;
    env.storage().instance().set(&DataKey::ProposalCount, &id);
    id
}

fn is_recovery(action: &ProposalAction) -> bool {
    matches!(action, ProposalAction::EmergencyRecovery(_))
}

fn require_open_for(env: &Env, action: &ProposalAction) -> Result<(), MultisigError> {
    if is_recovery(action) {
        return Ok(());
    }
    emergency::require_inactive(env)
}

fn grace_from(env: &Env, proposal: &Proposal) -> u64 {
    if !is_recovery(&proposal.action) {
        return proposal.execute_after;
    }
    match emergency::recovery_opens_at(env) {
        Some(opens_at) => proposal.execute_after.max(opens_at),
        None => proposal.execute_after,
    }
}

/// Checks `action` against current state without applying it.
fn validate(env: &Env, action: &ProposalAction) -> Result<(), MultisigError> {
    match action {
        ProposalAction::AddOwner(owner) => {
            if *owner == env.current_contract_address() {
                return Err(MultisigError::InvalidTarget);
            }
            registry::check_add_owner(env, owner)
        }
        ProposalAction::RemoveOwner(owner) => registry::check_remove_owner(env, owner),
        ProposalAction::ChangeThreshold(threshold) => registry::check_threshold(env, *threshold),
        ProposalAction::ChangeTimeLock(delay) => config::check_time_lock(*delay),
        ProposalAction::ChangeDailyLimit(limit) => daily_limit::check_limit(*limit),
        ProposalAction::EmergencyRecovery(new_owner) => {
            if *new_owner == env.current_contract_address() {
                return Err(MultisigError::InvalidTarget);
            }
            Ok(())
        }
    }
}

pub fn submit(
    env: &Env,
    proposer: Address,
    action: ProposalAction,
    description: String,
) -> Result<u64, MultisigError> {
    registry::require_owner(env, &proposer)?;
    require_open_for(env, &action)?;
    if description.len() == 0 {
        return Err(MultisigError::EmptyDescription);
    }
    validate(env, &action)?;

    let id = next_id(env);
    let proposal = Proposal {
        id,
        proposer: proposer.clone(),
        action: action.clone(),
        description,
        confirmation_count: 0,
        confirmed_by: Vec::new(env),
        status: TxStatus::Pending,
        created_at: env.ledger().timestamp(),
        queued_at: 0,
        execute_after: 0,
    };

    ProposalSubmitted {
        id,
        proposer: proposer.clone(),
        action,
    }
    .publish(env);

    record_confirmation(env, proposal, &proposer)?;
    Ok(id)
}

pub fn confirm(env: &Env, owner: Address, id: u64) -> Result<(), MultisigError> {
    registry::require_owner(env, &owner)?;
    let proposal = load(env, id)?;
    require_open_for(env, &proposal.action)?;
    record_confirmation(env, proposal, &owner)
}

fn record_confirmation(
    env: &Env,
    mut proposal: Proposal,
    owner: &Address,
) -> Result<(), MultisigError> {
    if proposal.status != TxStatus::Pending {
        return Err(MultisigError::InvalidStatus);
    }
    if proposal.confirmed_by.contains(owner) {
        // Re-confirming only advances an item a lowered threshold left behind.
        if proposal.confirmation_count < registry::threshold(env) {
            return Err(MultisigError::AlreadyConfirmed);
        }
    } else {
        proposal.confirmed_by.push_back(owner.clone());
        proposal.confirmation_count += 1;
        emit_proposal_confirmed(env, proposal.id, owner, proposal.confirmation_count);
    }

    if proposal.confirmation_count >= registry::threshold(env) {
        let now = env.ledger().timestamp();
        proposal.status = TxStatus::Queued;
        proposal.queued_at = now;
        proposal.execute_after = now.saturating_add(config::emergency_time_lock(env));
        log!(env, "proposal {} queued until {}", proposal.id, proposal.execute_after);
        emit_proposal_queued(env, proposal.id, proposal.execute_after);
    }

    store(env, &proposal);
    Ok(())
}

pub fn execute(env: &Env, executor: Address, id: u64) -> Result<(), MultisigError> {
    let mut proposal = load(env, id)?;
    if proposal.status != TxStatus::Queued {
        return Err(MultisigError::InvalidStatus);
    }
    registry::require_executor(env, &executor)?;
    check_execution_window(env, proposal.execute_after, grace_from(env, &proposal))?;

    proposal.status = TxStatus::Executed;
    store(env, &proposal);

    apply(env, &proposal.action, &executor)?;

    ProposalExecuted {
        id,
        executor,
        action: proposal.action,
    }
    .publish(env);
    Ok(())
}

fn apply(env: &Env, action: &ProposalAction, executor: &Address) -> Result<(), MultisigError> {
    match action {
        ProposalAction::AddOwner(owner) => {
            registry::add_owner(env, owner)?;
            OwnerAdded {
                owner: owner.clone(),
            }
            .publish(env);
        }
        ProposalAction::RemoveOwner(owner) => {
            registry::remove_owner(env, owner)?;
            OwnerRemoved {
                owner: owner.clone(),
            }
            .publish(env);
        }
        ProposalAction::ChangeThreshold(threshold) => {
            registry::change_threshold(env, *threshold)?;
            ThresholdChanged {
                threshold: *threshold,
            }
            .publish(env);
        }
        ProposalAction::ChangeTimeLock(delay) => {
            config::set_time_lock(env, *delay)?;
            TimeLockChanged {
                time_lock_delay: *delay,
            }
            .publish(env);
        }
        ProposalAction::ChangeDailyLimit(limit) => {
            daily_limit::set_limit(env, *limit)?;
            DailyLimitChanged { limit: *limit }.publish(env);
        }
        ProposalAction::EmergencyRecovery(new_owner) => {
            emergency::check_recovery_window(env)?;
            registry::replace_owners(env, new_owner);
            emergency::deactivate(env)?;
            log!(env, "emergency recovery hands the vault to {}", new_owner.clone());
            EmergencyRecoveryExecuted {
                new_owner: new_owner.clone(),
                timestamp: env.ledger().timestamp(),
            }
            .publish(env);
            EmergencyModeDeactivated {
                deactivated_by: executor.clone(),
            }
            .publish(env);
        }
    }
    Ok(())
}

pub fn cancel(env: &Env, caller: Address, id: u64) -> Result<(), MultisigError> {
    registry::require_owner(env, &caller)?;
    let mut proposal = load(env, id)?;
    if !proposal.status.is_open() {
        return Err(MultisigError::InvalidStatus);
    }
    if caller != proposal.proposer && proposal.confirmation_count >= registry::threshold(env) {
        return Err(MultisigError::NotAuthorized);
    }

    proposal.status = TxStatus::Cancelled;
    store(env, &proposal);
    ProposalCancelled {
        id,
        cancelled_by: caller,
    }
    .publish(env);
    Ok(())
}

pub fn revoke(env: &Env, owner: Address, id: u64) -> Result<(), MultisigError> {
    registry::require_owner(env, &owner)?;
    let mut proposal = load(env, id)?;
    if proposal.status != TxStatus::Pending {
        return Err(MultisigError::InvalidStatus);
    }
    let index = proposal
        .confirmed_by
        .first_index_of(&owner)
        .ok_or(MultisigError::NotConfirmed)?;

    proposal.confirmed_by.remove(index);
    proposal.confirmation_count -= 1;
    store(env, &proposal);
    ProposalConfirmationRevoked {
        id,
        owner,
        confirmation_count: proposal.confirmation_count,
    }
    .publish(env);
    Ok(())
}

pub fn expire(env: &Env, id: u64) -> Result<(), MultisigError> {
    let mut proposal = load(env, id)?;
    if proposal.status != TxStatus::Queued {
        return Err(MultisigError::InvalidStatus);
    }
    if !is_past_grace(env, grace_from(env, &proposal)) {
        return Err(MultisigError::NotExpired);
    }

    proposal.status = TxStatus::Expired;
    store(env, &proposal);
    ProposalExpired { id }.publish(env);
    Ok(())
}

pub fn is_confirmed(env: &Env, id: u64, owner: &Address) -> Result<bool, MultisigError> {
    Ok(load(env, id)?.confirmed_by.contains(owner))
}
