//! Daily spend governor.
//!
//! A 24 hour spend counter that resets lazily: the first check that sees
//! `now >= last_reset_time + DAY_IN_SECONDS` starts a new window at `now`.
//! `can_spend` applies the reset virtually and never writes; `spend` applies
//! it for real and commits. The two can disagree across a queue interval, and
//! callers treat a failed `spend` as retryable.
use soroban_sdk::Env;

use crate::errors::MultisigError;
use crate::types::{DailyLimit, DataKey, DAY_IN_SECONDS};

pub fn init(env: &Env, limit: i128) -> Result<(), MultisigError> {
    check_limit(limit)?;
    let state = DailyLimit {
        limit,
        spent: 0,
        last_reset_time: env.ledger().timestamp(),
    };
    env.storage().instance().set(&DataKey::DailyLimit, &state);
    Ok(())
}

/// Stored state, without applying a pending reset.
pub fn state(env: &Env) -> Result<DailyLimit, MultisigError> {
    env.storage()
        .instance()
        .get(&DataKey::DailyLimit)
        .ok_or(MultisigError::NotInitialized)
}

/// State as the next check would see it.
fn current(env: &Env) -> Result<DailyLimit, MultisigError> {
    let mut state = state(env)?;
    let now = env.ledger().timestamp();
    if now >= state.last_reset_time.saturating_add(DAY_IN_SECONDS) {
        state.spent = 0;
        state.last_reset_time = now;
    }
    Ok(state)
}

fn fits(state: &DailyLimit, amount: i128) -> bool {
    match state.spent.checked_add(amount) {
        Some(total) => total <= state.limit,
        None => false,
    }
}

pub fn can_spend(env: &Env, amount: i128) -> Result<bool, MultisigError> {
    Ok(fits(&current(env)?, amount))
}

pub fn spend(env: &Env, amount: i128) -> Result<(), MultisigError> {
    let mut state = current(env)?;
    if !fits(&state, amount) {
        return Err(MultisigError::DailyLimitExceeded);
    }
    state.spent += amount;
    env.storage().instance().set(&DataKey::DailyLimit, &state);
    Ok(())
}

/// Puts back a state read with [`state`] before a spend that did not go through.
pub fn restore(env: &Env, snapshot: &DailyLimit) {
    env.storage().instance().set(&DataKey::DailyLimit, snapshot);
}

pub fn remaining(env: &Env) -> Result<i128, MultisigError> {
    let state = current(env)?;
    Ok((state.limit - state.spent).max(0))
}

pub fn check_limit(limit: i128) -> Result<(), MultisigError> {
    if limit <= 0 {
        return Err(MultisigError::InvalidDailyLimit);
    }
    Ok(())
}

/// Replaces the cap. Amounts already spent in the open window still count.
pub fn set_limit(env: &Env, limit: i128) -> Result<(), MultisigError> {
    check_limit(limit)?;
    let mut state = state(env)?;
    state.limit = limit;
    env.storage().instance().set(&DataKey::DailyLimit, &state);
    Ok(())
}
