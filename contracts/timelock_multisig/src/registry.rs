//! Membership & threshold registry.
//!
//! Owners and the approval threshold change only as side effects of executed
//! governance proposals; no entrypoint lets a single owner edit them. The
//! `check_*` functions validate a change against current state without
//! applying it, so proposals can be screened at submission and re-checked
//! by the handler at execution.
use soroban_sdk::{Address, Env, Vec};

use crate::emergency;
use crate::errors::MultisigError;
use crate::types::{DataKey, MAX_OWNERS};

pub fn owners(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::Owners)
        .unwrap_or(Vec::new(env))
}

pub fn threshold(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::Threshold)
        .unwrap_or(0)
}

pub fn is_owner(env: &Env, account: &Address) -> bool {
    owners(env).contains(account)
}

pub fn require_owner(env: &Env, account: &Address) -> Result<(), MultisigError> {
    if !is_owner(env, account) {
        return Err(MultisigError::NotOwner);
    }
    Ok(())
}

/// Stores the initial owner set after validating it.
pub fn init(env: &Env, initial: &Vec<Address>, threshold: u32) -> Result<(), MultisigError> {
    if initial.is_empty() {
        return Err(MultisigError::EmptyOwners);
    }
    if initial.len() > MAX_OWNERS {
        return Err(MultisigError::TooManyOwners);
    }
    if threshold == 0 || threshold > initial.len() {
        return Err(MultisigError::InvalidThreshold);
    }

    let mut unique: Vec<Address> = Vec::new(env);
    for owner in initial.iter() {
        if unique.contains(&owner) {
            return Err(MultisigError::DuplicateOwner);
        }
        unique.push_back(owner);
    }

    env.storage().instance().set(&DataKey::Owners, &unique);
    env.storage().instance().set(&DataKey::Threshold, &threshold);
    Ok(())
}

pub fn check_add_owner(env: &Env, owner: &Address) -> Result<(), MultisigError> {
    let current = owners(env);
    if current.contains(owner) {
        return Err(MultisigError::DuplicateOwner);
    }
    if current.len() >= MAX_OWNERS {
        return Err(MultisigError::TooManyOwners);
    }
    Ok(())
}

pub fn check_remove_owner(env: &Env, owner: &Address) -> Result<(), MultisigError> {
    let current = owners(env);
    if !current.contains(owner) {
        return Err(MultisigError::OwnerNotFound);
    }
    // The remaining set must still be able to reach the threshold.
    if current.len() <= threshold(env) {
        return Err(MultisigError::ThresholdViolation);
    }
    Ok(())
}

pub fn check_threshold(env: &Env, new_threshold: u32) -> Result<(), MultisigError> {
    if new_threshold == 0 || new_threshold > owners(env).len() {
        return Err(MultisigError::InvalidThreshold);
    }
    Ok(())
}

pub fn add_owner(env: &Env, owner: &Address) -> Result<(), MultisigError> {
    check_add_owner(env, owner)?;
    let mut current = owners(env);
    current.push_back(owner.clone());
    env.storage().instance().set(&DataKey::Owners, &current);
    Ok(())
}

/// Removes `owner`. Confirmations it already recorded on open items stay.
pub fn remove_owner(env: &Env, owner: &Address) -> Result<(), MultisigError> {
    check_remove_owner(env, owner)?;
    let mut current = owners(env);
    if let Some(index) = current.first_index_of(owner) {
        current.remove(index);
    }
    env.storage().instance().set(&DataKey::Owners, &current);
    Ok(())
}

pub fn change_threshold(env: &Env, new_threshold: u32) -> Result<(), MultisigError> {
    check_threshold(env, new_threshold)?;
    env.storage()
        .instance()
        .set(&DataKey::Threshold, &new_threshold);
    Ok(())
}

/// Collapses the owner set to `new_owner` with a threshold of one.
pub fn replace_owners(env: &Env, new_owner: &Address) {
    let mut replacement = Vec::new(env);
    replacement.push_back(new_owner.clone());
    env.storage().instance().set(&DataKey::Owners, &replacement);
    env.storage().instance().set(&DataKey::Threshold, &1u32);
}

// ---------------------------------------------------------------------------
// Guardians
// ---------------------------------------------------------------------------

pub fn guardians(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::Guardians)
        .unwrap_or(Vec::new(env))
}

pub fn is_guardian(env: &Env, account: &Address) -> bool {
    guardians(env).contains(account)
}

pub fn require_guardian(env: &Env, account: &Address) -> Result<(), MultisigError> {
    if !is_guardian(env, account) {
        return Err(MultisigError::NotGuardian);
    }
    Ok(())
}

pub fn add_guardian(env: &Env, guardian: &Address) -> Result<(), MultisigError> {
    let mut current = guardians(env);
    if current.contains(guardian) {
        return Err(MultisigError::DuplicateGuardian);
    }
    current.push_back(guardian.clone());
    env.storage().instance().set(&DataKey::Guardians, &current);
    Ok(())
}

pub fn remove_guardian(env: &Env, guardian: &Address) -> Result<(), MultisigError> {
    let mut current = guardians(env);
    let index = current
        .first_index_of(guardian)
        .ok_or(MultisigError::GuardianNotFound)?;
    current.remove(index);
    env.storage().instance().set(&DataKey::Guardians, &current);
    Ok(())
}

/// Owners and guardians may execute queued items; during an emergency only
/// guardians may.
pub fn require_executor(env: &Env, account: &Address) -> Result<(), MultisigError> {
    if emergency::is_active(env) {
        return require_guardian(env, account);
    }
    if is_owner(env, account) || is_guardian(env, account) {
        return Ok(());
    }
    Err(MultisigError::NotAuthorized)
}
