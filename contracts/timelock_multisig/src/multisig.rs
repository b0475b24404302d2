use soroban_sdk::{contract, contractimpl, token, Address, Env, String, Vec};

use crate::config;
use crate::daily_limit;
use crate::emergency;
use crate::errors::MultisigError;
use crate::events::{
    emit_deposit, Deposit, EmergencyModeActivated, EmergencyModeDeactivated, GuardianAdded,
    GuardianRemoved,
};
use crate::proposals;
use crate::registry;
use crate::transactions;
use crate::types::{
    ContractCall, DailyLimit, EmergencyState, Proposal, ProposalAction, Transaction, VaultConfig,
};

#[contract]
pub struct TimeLockMultiSig;

#[contractimpl]
impl TimeLockMultiSig {
    pub fn initialize(
        env: Env,
        owners: Vec<Address>,
        threshold: u32,
        guardians: Vec<Address>,
        vault_config: VaultConfig,
    ) -> Result<(), MultisigError> {
        if config::is_initialized(&env) {
            return Err(MultisigError::AlreadyInitialized);
        }

        registry::init(&env, &owners, threshold)?;
        for guardian in guardians.iter() {
            registry::add_guardian(&env, &guardian)?;
        }
        config::init(&env, &vault_config)?;
        config::extend_instance_ttl(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    pub fn submit_transaction(
        env: Env,
        proposer: Address,
        to: Address,
        value: i128,
        payload: Option<ContractCall>,
        description: String,
    ) -> Result<u64, MultisigError> {
        Self::enter(&env, &proposer)?;
        transactions::submit(&env, proposer, to, value, payload, description)
    }

    pub fn confirm_transaction(env: Env, owner: Address, id: u64) -> Result<(), MultisigError> {
        Self::enter(&env, &owner)?;
        transactions::confirm(&env, owner, id)
    }

    pub fn revoke_confirmation(env: Env, owner: Address, id: u64) -> Result<(), MultisigError> {
        Self::enter(&env, &owner)?;
        transactions::revoke(&env, owner, id)
    }

    pub fn execute_transaction(env: Env, executor: Address, id: u64) -> Result<(), MultisigError> {
        Self::enter(&env, &executor)?;
        transactions::execute(&env, executor, id)
    }

    pub fn cancel_transaction(env: Env, caller: Address, id: u64) -> Result<(), MultisigError> {
        Self::enter(&env, &caller)?;
        transactions::cancel(&env, caller, id)
    }

    /// Closes a queued transaction whose execution window has passed.
    /// Anyone may call it.
    pub fn expire_transaction(env: Env, id: u64) -> Result<(), MultisigError> {
        config::require_initialized(&env)?;
        config::extend_instance_ttl(&env);
        transactions::expire(&env, id)
    }

    // -----------------------------------------------------------------------
    // Governance proposals
    // -----------------------------------------------------------------------

    pub fn submit_proposal(
        env: Env,
        proposer: Address,
        action: ProposalAction,
        description: String,
    ) -> Result<u64, MultisigError> {
        Self::enter(&env, &proposer)?;
        proposals::submit(&env, proposer, action, description)
    }

    pub fn confirm_proposal(env: Env, owner: Address, id: u64) -> Result<(), MultisigError> {
        Self::enter(&env, &owner)?;
        proposals::confirm(&env, owner, id)
    }

    pub fn revoke_proposal_confirmation(
        env: Env,
        owner: Address,
        id: u64,
    ) -> Result<(), MultisigError> {
        Self::enter(&env, &owner)?;
        proposals::revoke(&env, owner, id)
    }

    pub fn execute_proposal(env: Env, executor: Address, id: u64) -> Result<(), MultisigError> {
        Self::enter(&env, &executor)?;
        proposals::execute(&env, executor, id)
    }

    pub fn cancel_proposal(env: Env, caller: Address, id: u64) -> Result<(), MultisigError> {
        Self::enter(&env, &caller)?;
        proposals::cancel(&env, caller, id)
    }

    pub fn expire_proposal(env: Env, id: u64) -> Result<(), MultisigError> {
        config::require_initialized(&env)?;
        config::extend_instance_ttl(&env);
        proposals::expire(&env, id)
    }

    // -----------------------------------------------------------------------
    // Emergency mode and guardians
    // -----------------------------------------------------------------------

    pub fn activate_emergency_mode(env: Env, guardian: Address) -> Result<(), MultisigError> {
        Self::enter(&env, &guardian)?;
        registry::require_guardian(&env, &guardian)?;
        let activated_at = emergency::activate(&env)?;
        EmergencyModeActivated {
            guardian,
            activated_at,
        }
        .publish(&env);
        Ok(())
    }

    pub fn deactivate_emergency_mode(env: Env, owner: Address) -> Result<(), MultisigError> {
        Self::enter(&env, &owner)?;
        registry::require_owner(&env, &owner)?;
        emergency::deactivate(&env)?;
        EmergencyModeDeactivated {
            deactivated_by: owner,
        }
        .publish(&env);
        Ok(())
    }

    pub fn add_guardian(env: Env, owner: Address, guardian: Address) -> Result<(), MultisigError> {
        Self::enter(&env, &owner)?;
        registry::require_owner(&env, &owner)?;
        registry::add_guardian(&env, &guardian)?;
        GuardianAdded {
            guardian,
            added_by: owner,
        }
        .publish(&env);
        Ok(())
    }

    pub fn remove_guardian(
        env: Env,
        owner: Address,
        guardian: Address,
    ) -> Result<(), MultisigError> {
        Self::enter(&env, &owner)?;
        registry::require_owner(&env, &owner)?;
        registry::remove_guardian(&env, &guardian)?;
        GuardianRemoved {
            guardian,
            removed_by: owner,
        }
        .publish(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Custody
    // -----------------------------------------------------------------------

    /// Moves `amount` of the vault asset from `from` into the vault.
    pub fn deposit(env: Env, from: Address, amount: i128) -> Result<(), MultisigError> {
        Self::enter(&env, &from)?;
        if amount <= 0 {
            return Err(MultisigError::InvalidAmount);
        }
        let asset = config::asset(&env)?;
        token::Client::new(&env, &asset).transfer(&from, &env.current_contract_address(), &amount);
        emit_deposit(
            &env,
            Deposit {
                from,
                amount,
                timestamp: env.ledger().timestamp(),
            },
        );
        Ok(())
    }

    pub fn get_balance(env: Env) -> Result<i128, MultisigError> {
        let asset = config::asset(&env)?;
        Ok(token::Client::new(&env, &asset).balance(&env.current_contract_address()))
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn get_transaction(env: Env, id: u64) -> Result<Transaction, MultisigError> {
        transactions::load(&env, id)
    }

    pub fn get_transaction_count(env: Env) -> u64 {
        transactions::count(&env)
    }

    pub fn get_pending_transactions(env: Env) -> Vec<u64> {
        transactions::open_ids(&env)
    }

    pub fn is_transaction_confirmed(
        env: Env,
        id: u64,
        owner: Address,
    ) -> Result<bool, MultisigError> {
        transactions::is_confirmed(&env, id, &owner)
    }

    pub fn get_proposal(env: Env, id: u64) -> Result<Proposal, MultisigError> {
        proposals::load(&env, id)
    }

    pub fn get_proposal_count(env: Env) -> u64 {
        proposals::count(&env)
    }

    pub fn is_proposal_confirmed(env: Env, id: u64, owner: Address) -> Result<bool, MultisigError> {
        proposals::is_confirmed(&env, id, &owner)
    }

    pub fn get_owners(env: Env) -> Vec<Address> {
        registry::owners(&env)
    }

    pub fn get_threshold(env: Env) -> u32 {
        registry::threshold(&env)
    }

    pub fn is_owner(env: Env, account: Address) -> bool {
        registry::is_owner(&env, &account)
    }

    pub fn get_guardians(env: Env) -> Vec<Address> {
        registry::guardians(&env)
    }

    pub fn is_guardian(env: Env, account: Address) -> bool {
        registry::is_guardian(&env, &account)
    }

    /// Stored daily limit state. A window that has elapsed is only reset by
    /// the next spend.
    pub fn get_daily_limit(env: Env) -> Result<DailyLimit, MultisigError> {
        daily_limit::state(&env)
    }

    pub fn remaining_daily_allowance(env: Env) -> Result<i128, MultisigError> {
        daily_limit::remaining(&env)
    }

    pub fn get_emergency_state(env: Env) -> EmergencyState {
        emergency::state(&env)
    }

    pub fn get_config(env: Env) -> Result<VaultConfig, MultisigError> {
        config::get(&env)
    }
}

impl TimeLockMultiSig {
    /// Common prologue of every authenticated entrypoint.
    fn enter(env: &Env, caller: &Address) -> Result<(), MultisigError> {
        config::require_initialized(env)?;
        caller.require_auth();
        config::extend_instance_ttl(env);
        Ok(())
    }
}
