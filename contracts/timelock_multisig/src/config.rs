//! Vault parameters and storage lifetime management.
use soroban_sdk::{Address, Env};

use crate::errors::MultisigError;
use crate::types::{DataKey, VaultConfig, MAX_TIME_LOCK, MIN_TIME_LOCK};
use crate::daily_limit;

const DAY_IN_LEDGERS: u32 = 17_280;
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
const RECORD_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const RECORD_LIFETIME_THRESHOLD: u32 = RECORD_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Initialized)
}

pub fn require_initialized(env: &Env) -> Result<(), MultisigError> {
    if !is_initialized(env) {
        return Err(MultisigError::NotInitialized);
    }
    Ok(())
}

pub fn init(env: &Env, config: &VaultConfig) -> Result<(), MultisigError> {
    check_time_lock(config.time_lock_delay)?;
    if config.instant_limit < 0 {
        return Err(MultisigError::InvalidAmount);
    }
    daily_limit::init(env, config.daily_limit)?;

    let storage = env.storage().instance();
    storage.set(&DataKey::Asset, &config.asset);
    storage.set(&DataKey::InstantLimit, &config.instant_limit);
    storage.set(&DataKey::TimeLockDelay, &config.time_lock_delay);
    storage.set(&DataKey::Initialized, &true);
    Ok(())
}

pub fn get(env: &Env) -> Result<VaultConfig, MultisigError> {
    Ok(VaultConfig {
        asset: asset(env)?,
        instant_limit: instant_limit(env),
        daily_limit: daily_limit::state(env)?.limit,
        time_lock_delay: time_lock_delay(env),
    })
}

pub fn asset(env: &Env) -> Result<Address, MultisigError> {
    env.storage()
        .instance()
        .get(&DataKey::Asset)
        .ok_or(MultisigError::NotInitialized)
}

pub fn instant_limit(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::InstantLimit)
        .unwrap_or(0)
}

pub fn time_lock_delay(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::TimeLockDelay)
        .unwrap_or(MIN_TIME_LOCK)
}

/// Delay applied to governance proposals.
pub fn emergency_time_lock(env: &Env) -> u64 {
    time_lock_delay(env).saturating_mul(2)
}

pub fn check_time_lock(delay: u64) -> Result<(), MultisigError> {
    if !(MIN_TIME_LOCK..=MAX_TIME_LOCK).contains(&delay) {
        return Err(MultisigError::InvalidTimeLock);
    }
    Ok(())
}

pub fn set_time_lock(env: &Env, delay: u64) -> Result<(), MultisigError> {
    check_time_lock(delay)?;
    env.storage().instance().set(&DataKey::TimeLockDelay, &delay);
    Ok(())
}

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn extend_record_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}
