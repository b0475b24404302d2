use soroban_sdk::Env;

use crate::errors::MultisigError;
use crate::types::{DataKey, EmergencyState, RECOVERY_TIMEOUT};

pub fn state(env: &Env) -> EmergencyState {
    env.storage()
        .instance()
        .get(&DataKey::Emergency)
        .unwrap_or(EmergencyState {
            active: false,
            activated_at: 0,
        })
}

pub fn is_active(env: &Env) -> bool {
    state(env).active
}

pub fn require_inactive(env: &Env) -> Result<(), MultisigError> {
    if is_active(env) {
        return Err(MultisigError::EmergencyActive);
    }
    Ok(())
}

pub fn activate(env: &Env) -> Result<u64, MultisigError> {
    require_inactive(env)?;
    let activated_at = env.ledger().timestamp();
    env.storage().instance().set(
        &DataKey::Emergency,
        &EmergencyState {
            active: true,
            activated_at,
        },
    );
    Ok(activated_at)
}

pub fn deactivate(env: &Env) -> Result<(), MultisigError> {
    let mut current = state(env);
    if !current.active {
        return Err(MultisigError::EmergencyNotActive);
    }
    current.active = false;
    env.storage().instance().set(&DataKey::Emergency, &current);
    Ok(())
}

/// When a recovery may first run, if emergency mode is on.
pub fn recovery_opens_at(env: &Env) -> Option<u64> {
    let current = state(env);
    if !current.active {
        return None;
    }
    Some(current.activated_at.saturating_add(RECOVERY_TIMEOUT))
}

/// Recovery needs an active emergency that has lasted `RECOVERY_TIMEOUT`.
pub fn check_recovery_window(env: &Env) -> Result<(), MultisigError> {
    let current = state(env);
    if !current.active {
        return Err(MultisigError::EmergencyNotActive);
    }
    if env.ledger().timestamp() < current.activated_at.saturating_add(RECOVERY_TIMEOUT) {
        return Err(MultisigError::RecoveryTimeoutActive);
    }
    Ok(())
}
