//! Transaction pipeline.
//!
//! `Pending -> Queued -> Executed`, with `Pending | Queued -> Cancelled` and
//! `Queued -> Expired` once the grace period after the time-lock has run out.
//! A transaction that reaches the threshold either executes on the spot
//! (payload-free, within the instant limit, daily budget and balance) or is
//! queued behind the ordinary time-lock. An instant attempt whose transfer
//! is refused by the token falls back to the queue.
//!
//! Execution writes `Executed` and the daily spend before the outbound call
//! and holds the reentrancy guard across it. A failed call surfaces as
//! `ExecutionFailed`; the host discards every write of the failing
//! invocation, so the transaction is left `Queued` and can be retried.
use soroban_sdk::{log, token, Address, Env, String, Val, Vec};

use crate::config;
use crate::daily_limit;
use crate::emergency;
use crate::errors::MultisigError;
use crate::events::{
    emit_confirmed, emit_queued, ConfirmationRevoked, TransactionCancelled, TransactionExecuted,
    TransactionExpired, TransactionSubmitted,
};
use crate::reentrancy::ReentrancyGuard;
use crate::registry;
use crate::types::{
    ContractCall, DataKey, Payload, Transaction, TxStatus, EXECUTION_GRACE_PERIOD,
};

pub fn load(env: &Env, id: u64) -> Result<Transaction, MultisigError> {
    env.storage()
        .persistent()
        .get(&DataKey::Transaction(id))
        .ok_or(MultisigError::TransactionNotFound)
}

fn store(env: &Env, tx: &Transaction) {
    let key = DataKey::Transaction(tx.id);
    env.storage().persistent().set(&key, tx);
    config::extend_record_ttl(env, &key);
}

pub fn count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::TransactionCount)
        .unwrap_or(0u64)
}

fn next_id(env: &Env) -> u64 {
    let id = count(env) + 1;
    env.storage().instance().set(&DataKey::TransactionCount, &id);
    id
}

/// Fails unless `now >= execute_after` and the grace period counted from
/// `grace_from` has not run out.
pub(crate) fn check_execution_window(
    env: &Env,
    execute_after: u64,
    grace_from: u64,
) -> Result<(), MultisigError> {
    if env.ledger().timestamp() < execute_after {
        return Err(MultisigError::TimeLockActive);
    }
    if is_past_grace(env, grace_from) {
        return Err(MultisigError::TransactionExpired);
    }
    Ok(())
}

pub(crate) fn is_past_grace(env: &Env, grace_from: u64) -> bool {
    env.ledger().timestamp() > grace_from.saturating_add(EXECUTION_GRACE_PERIOD)
}

/// Ids of transactions that are still pending or queued, oldest first.
pub fn open_ids(env: &Env) -> Vec<u64> {
    env.storage()
        .instance()
        .get(&DataKey::OpenTransactions)
        .unwrap_or(Vec::new(env))
}

fn track(env: &Env, id: u64) {
    let mut ids = open_ids(env);
    ids.push_back(id);
    env.storage().instance().set(&DataKey::OpenTransactions, &ids);
}

fn untrack(env: &Env, id: u64) {
    let mut ids = open_ids(env);
    if let Some(index) = ids.first_index_of(id) {
        ids.remove(index);
        env.storage().instance().set(&DataKey::OpenTransactions, &ids);
    }
}

pub fn submit(
    env: &Env,
    proposer: Address,
    to: Address,
    value: i128,
    payload: Option<ContractCall>,
    description: String,
) -> Result<u64, MultisigError> {
    registry::require_owner(env, &proposer)?;
    emergency::require_inactive(env)?;

    if to == env.current_contract_address() {
        return Err(MultisigError::InvalidTarget);
    }
    if value < 0 {
        return Err(MultisigError::InvalidAmount);
    }
    if description.len() == 0 {
        return Err(MultisigError::EmptyDescription);
    }

    let id = next_id(env);
    let tx = Transaction {
        id,
        proposer: proposer.clone(),
        to: to.clone(),
        value,
        payload: Payload::from(payload),
        description,
        confirmation_count: 0,
        confirmed_by: Vec::new(env),
        status: TxStatus::Pending,
        created_at: env.ledger().timestamp(),
        queued_at: 0,
        execute_after: 0,
    };

    TransactionSubmitted {
        id,
        proposer: proposer.clone(),
        to,
        value,
        has_payload: tx.payload.is_call(),
    }
    .publish(env);

    track(env, id);
    record_confirmation(env, tx, &proposer)?;
    Ok(id)
}

pub fn confirm(env: &Env, owner: Address, id: u64) -> Result<(), MultisigError> {
    registry::require_owner(env, &owner)?;
    emergency::require_inactive(env)?;
    let tx = load(env, id)?;
    record_confirmation(env, tx, &owner)
}

fn record_confirmation(
    env: &Env,
    mut tx: Transaction,
    owner: &Address,
) -> Result<(), MultisigError> {
    if tx.status != TxStatus::Pending {
        return Err(MultisigError::InvalidStatus);
    }
    if tx.confirmed_by.contains(owner) {
        // A lowered threshold may leave an item with enough confirmations
        // still pending; confirming again lets it advance.
        if tx.confirmation_count < registry::threshold(env) {
            return Err(MultisigError::AlreadyConfirmed);
        }
    } else {
        tx.confirmed_by.push_back(owner.clone());
        tx.confirmation_count += 1;
        emit_confirmed(env, tx.id, owner, tx.confirmation_count);

        if tx.confirmation_count < registry::threshold(env) {
            store(env, &tx);
            return Ok(());
        }
    }

    if !is_instant_eligible(env, &tx)? {
        queue(env, tx);
        return Ok(());
    }

    log!(env, "transaction {} executes instantly", tx.id);
    let snapshot = daily_limit::state(env)?;
    match perform(env, tx.clone(), owner, true) {
        Err(MultisigError::ExecutionFailed) => {
            log!(env, "instant transfer of {} refused, queueing", tx.id);
            daily_limit::restore(env, &snapshot);
            queue(env, tx);
            Ok(())
        }
        result => result,
    }
}

/// Read-only: payload-free, within the instant limit, the daily budget and
/// the vault balance.
fn is_instant_eligible(env: &Env, tx: &Transaction) -> Result<bool, MultisigError> {
    if tx.payload.is_call() || tx.value > config::instant_limit(env) {
        return Ok(false);
    }
    if !daily_limit::can_spend(env, tx.value)? {
        return Ok(false);
    }
    let asset = config::asset(env)?;
    let balance = token::Client::new(env, &asset).balance(&env.current_contract_address());
    Ok(balance >= tx.value)
}

fn queue(env: &Env, mut tx: Transaction) {
    let now = env.ledger().timestamp();
    tx.status = TxStatus::Queued;
    tx.queued_at = now;
    tx.execute_after = now.saturating_add(config::time_lock_delay(env));
    store(env, &tx);
    log!(env, "transaction {} queued until {}", tx.id, tx.execute_after);
    emit_queued(env, tx.id, tx.execute_after);
}

pub fn execute(env: &Env, executor: Address, id: u64) -> Result<(), MultisigError> {
    let tx = load(env, id)?;
    if tx.status != TxStatus::Queued {
        return Err(MultisigError::InvalidStatus);
    }
    registry::require_executor(env, &executor)?;
    check_execution_window(env, tx.execute_after, tx.execute_after)?;
    perform(env, tx, &executor, false)
}

fn perform(
    env: &Env,
    mut tx: Transaction,
    executor: &Address,
    instant: bool,
) -> Result<(), MultisigError> {
    let _guard = ReentrancyGuard::new(env)?;

    daily_limit::spend(env, tx.value)?;

    let asset = config::asset(env)?;
    let token = token::Client::new(env, &asset);
    let vault = env.current_contract_address();
    if token.balance(&vault) < tx.value {
        return Err(MultisigError::InsufficientBalance);
    }

    tx.status = TxStatus::Executed;
    store(env, &tx);

    if tx.value > 0 {
        match token.try_transfer(&vault, &tx.to, &tx.value) {
            Ok(Ok(())) => {}
            _ => return Err(MultisigError::ExecutionFailed),
        }
    }

    if let Payload::Call(call) = &tx.payload {
        let result = env.try_invoke_contract::<Val, soroban_sdk::Error>(
            &tx.to,
            &call.function,
            call.args.clone(),
        );
        match result {
            Ok(Ok(_)) => {}
            _ => {
                log!(env, "transaction {} call failed", tx.id);
                return Err(MultisigError::ExecutionFailed);
            }
        }
    }

    untrack(env, tx.id);
    TransactionExecuted {
        id: tx.id,
        executor: executor.clone(),
        to: tx.to.clone(),
        value: tx.value,
        instant,
    }
    .publish(env);
    Ok(())
}

/// The proposer may always cancel an open transaction; other owners only
/// while it is still short of the threshold.
pub fn cancel(env: &Env, caller: Address, id: u64) -> Result<(), MultisigError> {
    registry::require_owner(env, &caller)?;
    let mut tx = load(env, id)?;
    if !tx.status.is_open() {
        return Err(MultisigError::InvalidStatus);
    }
    if caller != tx.proposer && tx.confirmation_count >= registry::threshold(env) {
        return Err(MultisigError::NotAuthorized);
    }

    tx.status = TxStatus::Cancelled;
    store(env, &tx);
    untrack(env, id);
    TransactionCancelled {
        id,
        cancelled_by: caller,
    }
    .publish(env);
    Ok(())
}

pub fn revoke(env: &Env, owner: Address, id: u64) -> Result<(), MultisigError> {
    registry::require_owner(env, &owner)?;
    let mut tx = load(env, id)?;
    if tx.status != TxStatus::Pending {
        return Err(MultisigError::InvalidStatus);
    }
    let index = tx
        .confirmed_by
        .first_index_of(&owner)
        .ok_or(MultisigError::NotConfirmed)?;

    tx.confirmed_by.remove(index);
    tx.confirmation_count -= 1;
    store(env, &tx);
    ConfirmationRevoked {
        id,
        owner,
        confirmation_count: tx.confirmation_count,
    }
    .publish(env);
    Ok(())
}

pub fn expire(env: &Env, id: u64) -> Result<(), MultisigError> {
    let mut tx = load(env, id)?;
    if tx.status != TxStatus::Queued {
        return Err(MultisigError::InvalidStatus);
    }
    if !is_past_grace(env, tx.execute_after) {
        return Err(MultisigError::NotExpired);
    }

    tx.status = TxStatus::Expired;
    store(env, &tx);
    untrack(env, id);
    TransactionExpired { id }.publish(env);
    Ok(())
}

pub fn is_confirmed(env: &Env, id: u64, owner: &Address) -> Result<bool, MultisigError> {
    Ok(load(env, id)?.confirmed_by.contains(owner))
}
