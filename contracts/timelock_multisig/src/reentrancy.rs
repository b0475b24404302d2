use soroban_sdk::{symbol_short, Env, Symbol};

use crate::errors::MultisigError;

const EXECUTION_LOCK: Symbol = symbol_short!("EXEC_LOCK");

/// Busy flag held for the duration of an outbound call.
///
/// The flag lives in temporary storage and is cleared when the guard is
/// dropped, so every exit path of the holder releases it.
pub struct ReentrancyGuard<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyGuard<'a> {
    pub fn new(env: &'a Env) -> Result<Self, MultisigError> {
        if env.storage().temporary().has(&EXECUTION_LOCK) {
            return Err(MultisigError::Reentrancy);
        }
        env.storage().temporary().set(&EXECUTION_LOCK, &true);
        Ok(Self { env })
    }
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        self.env.storage().temporary().remove(&EXECUTION_LOCK);
    }
}
