#![cfg(test)]

use crate::errors::MultisigError;
use crate::multisig::{TimeLockMultiSig, TimeLockMultiSigClient};
use crate::test::{
    advance, event_id, setup, setup_with, text, vault_event, QueuedRecord, Setup, START,
    TIME_LOCK, UNIT,
};
use crate::types::{
    ProposalAction, TxStatus, VaultConfig, EXECUTION_GRACE_PERIOD, RECOVERY_TIMEOUT,
};
use soroban_sdk::{
    contracttype,
    testutils::{Address as _, Ledger},
    vec, Address, Env, TryFromVal, Vec,
};

const GOVERNANCE_DELAY: u64 = 2 * TIME_LOCK;

/// Submits `action` from owner `a` and confirms it with `b`.
fn propose(s: &Setup, action: ProposalAction) -> u64 {
    let id = s
        .client
        .submit_proposal(&s.a, &action, &text(&s.env, "governance"));
    s.client.confirm_proposal(&s.b, &id);
    id
}

/// Proposes, waits out the governance delay and executes.
fn enact(s: &Setup, action: ProposalAction) -> u64 {
    let id = propose(s, action);
    advance(&s.env, GOVERNANCE_DELAY);
    s.client.execute_proposal(&s.a, &id);
    id
}

#[test]
fn test_proposal_waits_for_double_time_lock() {
    let s = setup();
    let newcomer = Address::generate(&s.env);

    let id = s.client.submit_proposal(
        &s.a,
        &ProposalAction::AddOwner(newcomer.clone()),
        &text(&s.env, "add newcomer"),
    );
    let proposal = s.client.get_proposal(&id);
    assert_eq!(proposal.status, TxStatus::Pending);
    assert_eq!(proposal.confirmation_count, 1);
    assert!(s.client.is_proposal_confirmed(&id, &s.a));
    assert_eq!(s.client.get_proposal_count(), 1);

    s.client.confirm_proposal(&s.b, &id);
    let proposal = s.client.get_proposal(&id);
    assert_eq!(proposal.status, TxStatus::Queued);
    assert_eq!(proposal.execute_after, START + GOVERNANCE_DELAY);

    // The ordinary delay is not enough for governance
    advance(&s.env, TIME_LOCK);
    let result = s.client.try_execute_proposal(&s.c, &id);
    assert_eq!(result, Err(Ok(MultisigError::TimeLockActive)));

    advance(&s.env, TIME_LOCK);
    s.client.execute_proposal(&s.c, &id);

    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Executed);
    assert!(s.client.is_owner(&newcomer));
    assert_eq!(s.client.get_owners().len(), 4);
    assert_eq!(s.client.get_threshold(), 2);
}

#[test]
fn test_threshold_of_one_queues_proposal_on_submit() {
    let s = setup_with(1, 0);
    let id = s.client.submit_proposal(
        &s.a,
        &ProposalAction::ChangeDailyLimit(20 * UNIT),
        &text(&s.env, "raise limit"),
    );

    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Queued);
}

#[test]
fn test_remove_owner_and_threshold_floor() {
    let s = setup();

    enact(&s, ProposalAction::RemoveOwner(s.c.clone()));

    assert!(!s.client.is_owner(&s.c));
    assert_eq!(s.client.get_owners(), vec![&s.env, s.a.clone(), s.b.clone()]);
    assert_eq!(s.client.get_threshold(), 2);

    // Two owners and threshold two: nobody else can leave
    let result = s.client.try_submit_proposal(
        &s.a,
        &ProposalAction::RemoveOwner(s.b.clone()),
        &text(&s.env, "remove b"),
    );
    assert_eq!(result, Err(Ok(MultisigError::ThresholdViolation)));

    let result = s.client.try_submit_proposal(
        &s.a,
        &ProposalAction::RemoveOwner(s.c.clone()),
        &text(&s.env, "remove c again"),
    );
    assert_eq!(result, Err(Ok(MultisigError::OwnerNotFound)));
}

#[test]
fn test_submission_rejects_invalid_actions() {
    let s = setup();
    let check = |action: ProposalAction, expected: MultisigError| {
        let result = s
            .client
            .try_submit_proposal(&s.a, &action, &text(&s.env, "invalid"));
        assert_eq!(result, Err(Ok(expected)));
    };

    check(ProposalAction::AddOwner(s.b.clone()), MultisigError::DuplicateOwner);
    check(ProposalAction::AddOwner(s.vault.clone()), MultisigError::InvalidTarget);
    check(ProposalAction::ChangeThreshold(0), MultisigError::InvalidThreshold);
    check(ProposalAction::ChangeThreshold(4), MultisigError::InvalidThreshold);
    check(ProposalAction::ChangeTimeLock(1_800), MultisigError::InvalidTimeLock);
    check(ProposalAction::ChangeTimeLock(5_184_000), MultisigError::InvalidTimeLock);
    check(ProposalAction::ChangeDailyLimit(0), MultisigError::InvalidDailyLimit);
    check(ProposalAction::EmergencyRecovery(s.vault.clone()), MultisigError::InvalidTarget);

    let result = s.client.try_submit_proposal(
        &s.a,
        &ProposalAction::ChangeThreshold(3),
        &text(&s.env, ""),
    );
    assert_eq!(result, Err(Ok(MultisigError::EmptyDescription)));

    let result = s.client.try_submit_proposal(
        &s.guardian,
        &ProposalAction::ChangeThreshold(3),
        &text(&s.env, "guardian"),
    );
    assert_eq!(result, Err(Ok(MultisigError::NotOwner)));

    assert_eq!(s.client.get_proposal_count(), 0);
}

#[test]
fn test_owner_cap() {
    let env = Env::default();
    env.mock_all_auths();
    let vault = env.register(TimeLockMultiSig, ());
    let client = TimeLockMultiSigClient::new(&env, &vault);

    let mut owners = Vec::new(&env);
    for _ in 0..20 {
        owners.push_back(Address::generate(&env));
    }
    client.initialize(
        &owners,
        &1,
        &Vec::new(&env),
        &VaultConfig {
            asset: Address::generate(&env),
            instant_limit: UNIT,
            daily_limit: 10 * UNIT,
            time_lock_delay: TIME_LOCK,
        },
    );

    let result = client.try_submit_proposal(
        &owners.get_unchecked(0),
        &ProposalAction::AddOwner(Address::generate(&env)),
        &text(&env, "one too many"),
    );
    assert_eq!(result, Err(Ok(MultisigError::TooManyOwners)));
}

#[test]
fn test_change_threshold() {
    let s = setup();

    enact(&s, ProposalAction::ChangeThreshold(3));
    assert_eq!(s.client.get_threshold(), 3);

    // Two confirmations no longer queue anything
    let id = propose(&s, ProposalAction::ChangeThreshold(2));
    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Pending);
    s.client.confirm_proposal(&s.c, &id);
    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Queued);
}

#[test]
fn test_actions_are_revalidated_at_execution() {
    let s = setup();

    let raise = propose(&s, ProposalAction::ChangeThreshold(3));
    let remove_c = propose(&s, ProposalAction::RemoveOwner(s.c.clone()));
    let remove_b = propose(&s, ProposalAction::RemoveOwner(s.b.clone()));
    advance(&s.env, GOVERNANCE_DELAY);

    s.client.execute_proposal(&s.a, &remove_c);
    assert_eq!(s.client.get_owners().len(), 2);

    // Valid when submitted, not anymore with two owners left
    let result = s.client.try_execute_proposal(&s.a, &raise);
    assert_eq!(result, Err(Ok(MultisigError::InvalidThreshold)));
    assert_eq!(s.client.get_proposal(&raise).status, TxStatus::Queued);

    let result = s.client.try_execute_proposal(&s.a, &remove_b);
    assert_eq!(result, Err(Ok(MultisigError::ThresholdViolation)));
    assert_eq!(s.client.get_proposal(&remove_b).status, TxStatus::Queued);

    assert_eq!(s.client.get_threshold(), 2);
    assert!(s.client.is_owner(&s.b));
}

#[test]
fn test_change_time_lock_applies_to_new_transactions() {
    let s = setup();

    enact(&s, ProposalAction::ChangeTimeLock(3 * TIME_LOCK));
    assert_eq!(s.client.get_config().time_lock_delay, 3 * TIME_LOCK);

    let now = START + GOVERNANCE_DELAY;
    let id = s.client.submit_transaction(
        &s.a,
        &Address::generate(&s.env),
        &(5 * UNIT),
        &None,
        &text(&s.env, "payment"),
    );
    s.client.confirm_transaction(&s.b, &id);
    assert_eq!(s.client.get_transaction(&id).execute_after, now + 3 * TIME_LOCK);

    // Governance now waits twice the new delay
    let next = propose(&s, ProposalAction::ChangeThreshold(3));
    assert_eq!(
        s.client.get_proposal(&next).execute_after,
        now + 6 * TIME_LOCK
    );
}

#[test]
fn test_change_daily_limit() {
    let s = setup();

    enact(&s, ProposalAction::ChangeDailyLimit(20 * UNIT));

    let limit = s.client.get_daily_limit();
    assert_eq!(limit.limit, 20 * UNIT);
    assert_eq!(limit.spent, 0);
    assert_eq!(s.client.get_config().daily_limit, 20 * UNIT);
    assert_eq!(s.client.remaining_daily_allowance(), 20 * UNIT);
}

#[test]
fn test_removed_owner_confirmation_still_counts() {
    let s = setup();

    let pending = s.client.submit_proposal(
        &s.c,
        &ProposalAction::ChangeDailyLimit(20 * UNIT),
        &text(&s.env, "raise limit"),
    );
    enact(&s, ProposalAction::RemoveOwner(s.c.clone()));

    let result = s.client.try_confirm_proposal(&s.c, &pending);
    assert_eq!(result, Err(Ok(MultisigError::NotOwner)));

    s.client.confirm_proposal(&s.b, &pending);
    let proposal = s.client.get_proposal(&pending);
    assert_eq!(proposal.confirmation_count, 2);
    assert_eq!(proposal.status, TxStatus::Queued);
    assert!(s.client.is_proposal_confirmed(&pending, &s.c));
}

#[test]
fn test_cancel_and_revoke_proposal() {
    let s = setup_with(3, 0);

    let id = s.client.submit_proposal(
        &s.a,
        &ProposalAction::ChangeThreshold(2),
        &text(&s.env, "lower threshold"),
    );
    s.client.confirm_proposal(&s.b, &id);

    s.client.revoke_proposal_confirmation(&s.b, &id);
    assert_eq!(s.client.get_proposal(&id).confirmation_count, 1);
    assert!(!s.client.is_proposal_confirmed(&id, &s.b));

    let result = s.client.try_revoke_proposal_confirmation(&s.b, &id);
    assert_eq!(result, Err(Ok(MultisigError::NotConfirmed)));

    // Below threshold any owner may cancel
    s.client.cancel_proposal(&s.c, &id);
    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Cancelled);

    let result = s.client.try_confirm_proposal(&s.b, &id);
    assert_eq!(result, Err(Ok(MultisigError::InvalidStatus)));

    let result = s.client.try_cancel_proposal(&s.a, &id);
    assert_eq!(result, Err(Ok(MultisigError::InvalidStatus)));
}

#[test]
fn test_only_proposer_cancels_queued_proposal() {
    let s = setup();
    let id = propose(&s, ProposalAction::ChangeThreshold(3));

    let result = s.client.try_cancel_proposal(&s.b, &id);
    assert_eq!(result, Err(Ok(MultisigError::NotAuthorized)));

    s.client.cancel_proposal(&s.a, &id);
    advance(&s.env, GOVERNANCE_DELAY);
    let result = s.client.try_execute_proposal(&s.a, &id);
    assert_eq!(result, Err(Ok(MultisigError::InvalidStatus)));
    assert_eq!(s.client.get_threshold(), 2);
}

#[test]
fn test_proposal_expiry_and_terminality() {
    let s = setup();
    let expiring = propose(&s, ProposalAction::ChangeThreshold(3));
    let executed = enact(&s, ProposalAction::ChangeDailyLimit(5 * UNIT));

    let result = s.client.try_execute_proposal(&s.a, &executed);
    assert_eq!(result, Err(Ok(MultisigError::InvalidStatus)));

    let result = s.client.try_expire_proposal(&expiring);
    assert_eq!(result, Err(Ok(MultisigError::NotExpired)));

    advance(&s.env, EXECUTION_GRACE_PERIOD + 1);
    let result = s.client.try_execute_proposal(&s.a, &expiring);
    assert_eq!(result, Err(Ok(MultisigError::TransactionExpired)));

    s.client.expire_proposal(&expiring);
    assert_eq!(s.client.get_proposal(&expiring).status, TxStatus::Expired);
    assert_eq!(s.client.get_threshold(), 2);

    let result = s.client.try_expire_proposal(&executed);
    assert_eq!(result, Err(Ok(MultisigError::InvalidStatus)));
}

#[test]
fn test_proposal_executor_rules() {
    let s = setup();
    let id = propose(&s, ProposalAction::ChangeThreshold(3));
    advance(&s.env, GOVERNANCE_DELAY);

    let result = s.client.try_execute_proposal(&Address::generate(&s.env), &id);
    assert_eq!(result, Err(Ok(MultisigError::NotAuthorized)));

    let result = s.client.try_execute_proposal(&s.a, &42);
    assert_eq!(result, Err(Ok(MultisigError::ProposalNotFound)));

    s.client.execute_proposal(&s.guardian, &id);
    assert_eq!(s.client.get_threshold(), 3);
}

// ---------------------------------------------------------------------------
// Emergency recovery
// ---------------------------------------------------------------------------

#[test]
fn test_emergency_blocks_ordinary_proposals() {
    let s = setup();
    let pending = s.client.submit_proposal(
        &s.a,
        &ProposalAction::ChangeThreshold(3),
        &text(&s.env, "raise threshold"),
    );
    let queued = propose(&s, ProposalAction::ChangeDailyLimit(20 * UNIT));

    s.client.activate_emergency_mode(&s.guardian);

    let result = s.client.try_submit_proposal(
        &s.a,
        &ProposalAction::ChangeThreshold(1),
        &text(&s.env, "lower threshold"),
    );
    assert_eq!(result, Err(Ok(MultisigError::EmergencyActive)));

    let result = s.client.try_confirm_proposal(&s.b, &pending);
    assert_eq!(result, Err(Ok(MultisigError::EmergencyActive)));

    advance(&s.env, GOVERNANCE_DELAY);
    let result = s.client.try_execute_proposal(&s.a, &queued);
    assert_eq!(result, Err(Ok(MultisigError::NotGuardian)));

    s.client.execute_proposal(&s.guardian, &queued);
    assert_eq!(s.client.get_daily_limit().limit, 20 * UNIT);
}

#[test]
fn test_emergency_recovery_hands_over_the_vault() {
    let s = setup();
    let rescuer = Address::generate(&s.env);

    s.client.activate_emergency_mode(&s.guardian);

    let result = s.client.try_submit_transaction(
        &s.a,
        &Address::generate(&s.env),
        &UNIT,
        &None,
        &text(&s.env, "payment"),
    );
    assert_eq!(result, Err(Ok(MultisigError::EmergencyActive)));

    // Recovery proposals stay open during the emergency
    let id = propose(&s, ProposalAction::EmergencyRecovery(rescuer.clone()));
    let proposal = s.client.get_proposal(&id);
    assert_eq!(proposal.status, TxStatus::Queued);
    assert_eq!(proposal.execute_after, START + GOVERNANCE_DELAY);

    advance(&s.env, GOVERNANCE_DELAY);
    let result = s.client.try_execute_proposal(&s.a, &id);
    assert_eq!(result, Err(Ok(MultisigError::NotGuardian)));

    let result = s.client.try_execute_proposal(&s.guardian, &id);
    assert_eq!(result, Err(Ok(MultisigError::RecoveryTimeoutActive)));
    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Queued);

    s.env
        .ledger()
        .with_mut(|li| li.timestamp = START + RECOVERY_TIMEOUT);
    s.client.execute_proposal(&s.guardian, &id);

    let (_topics, data) =
        vault_event(&s, "emergency_recovery_executed").expect("recovery event");
    let record = RecoveryRecord::try_from_val(&s.env, &data).expect("recovery data");
    assert_eq!(record.new_owner, rescuer);
    assert_eq!(record.timestamp, START + RECOVERY_TIMEOUT);

    let (_topics, data) =
        vault_event(&s, "emergency_mode_deactivated").expect("deactivation event");
    let record = DeactivatedRecord::try_from_val(&s.env, &data).expect("deactivation data");
    assert_eq!(record.deactivated_by, s.guardian);

    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Executed);
    assert_eq!(s.client.get_owners(), vec![&s.env, rescuer.clone()]);
    assert_eq!(s.client.get_threshold(), 1);
    assert!(!s.client.get_emergency_state().active);
    assert!(!s.client.is_owner(&s.a));

    // The rescuer runs the vault alone from here
    let recipient = Address::generate(&s.env);
    let tx = s.client.submit_transaction(
        &rescuer,
        &recipient,
        &UNIT,
        &None,
        &text(&s.env, "first payment"),
    );
    assert_eq!(s.client.get_transaction(&tx).status, TxStatus::Executed);
}

#[test]
fn test_recovery_requires_active_emergency() {
    let s = setup();
    let id = propose(&s, ProposalAction::EmergencyRecovery(Address::generate(&s.env)));
    advance(&s.env, GOVERNANCE_DELAY);

    let result = s.client.try_execute_proposal(&s.a, &id);
    assert_eq!(result, Err(Ok(MultisigError::EmergencyNotActive)));
    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Queued);
    assert_eq!(s.client.get_owners().len(), 3);
}

#[test]
fn test_recovery_grace_period_starts_when_recovery_opens() {
    let s = setup();
    let rescuer = Address::generate(&s.env);

    // Queued well before the emergency starts
    let id = propose(&s, ProposalAction::EmergencyRecovery(rescuer.clone()));
    advance(&s.env, 3 * TIME_LOCK);
    s.client.activate_emergency_mode(&s.guardian);
    let opens_at = START + 3 * TIME_LOCK + RECOVERY_TIMEOUT;

    s.env.ledger().with_mut(|li| li.timestamp = opens_at - 1);
    let result = s.client.try_execute_proposal(&s.guardian, &id);
    assert_eq!(result, Err(Ok(MultisigError::RecoveryTimeoutActive)));

    // Past execute_after + grace, but recovery has only just opened
    s.env.ledger().with_mut(|li| li.timestamp = opens_at);
    let result = s.client.try_expire_proposal(&id);
    assert_eq!(result, Err(Ok(MultisigError::NotExpired)));

    s.client.execute_proposal(&s.guardian, &id);
    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Executed);
    assert_eq!(s.client.get_owners(), vec![&s.env, rescuer]);
}

#[test]
fn test_recovery_expires_a_grace_period_after_it_opens() {
    let s = setup();
    s.client.activate_emergency_mode(&s.guardian);
    let id = propose(&s, ProposalAction::EmergencyRecovery(Address::generate(&s.env)));
    let opens_at = START + RECOVERY_TIMEOUT;

    s.env
        .ledger()
        .with_mut(|li| li.timestamp = opens_at + EXECUTION_GRACE_PERIOD);
    let result = s.client.try_expire_proposal(&id);
    assert_eq!(result, Err(Ok(MultisigError::NotExpired)));

    advance(&s.env, 1);
    let result = s.client.try_execute_proposal(&s.guardian, &id);
    assert_eq!(result, Err(Ok(MultisigError::TransactionExpired)));

    s.client.expire_proposal(&id);
    assert_eq!(s.client.get_proposal(&id).status, TxStatus::Expired);
    assert!(s.client.get_emergency_state().active);
}

// ---------------------------------------------------------------------------
// Lowered threshold
// ---------------------------------------------------------------------------

#[test]
fn test_lowered_threshold_lets_confirmers_advance_pending_items() {
    let s = setup_with(3, 100 * UNIT);

    let tx = s.client.submit_transaction(
        &s.a,
        &Address::generate(&s.env),
        &(2 * UNIT),
        &None,
        &text(&s.env, "payment"),
    );
    s.client.confirm_transaction(&s.b, &tx);
    let limit = s.client.submit_proposal(
        &s.a,
        &ProposalAction::ChangeDailyLimit(20 * UNIT),
        &text(&s.env, "raise limit"),
    );
    s.client.confirm_proposal(&s.b, &limit);

    let lower = propose(&s, ProposalAction::ChangeThreshold(2));
    s.client.confirm_proposal(&s.c, &lower);
    advance(&s.env, GOVERNANCE_DELAY);
    s.client.execute_proposal(&s.a, &lower);
    enact(&s, ProposalAction::RemoveOwner(s.c.clone()));

    // Every remaining owner has confirmed, yet both items are still pending
    assert_eq!(s.client.get_owners(), vec![&s.env, s.a.clone(), s.b.clone()]);
    assert_eq!(s.client.get_transaction(&tx).status, TxStatus::Pending);
    assert_eq!(s.client.get_proposal(&limit).status, TxStatus::Pending);

    s.client.confirm_transaction(&s.a, &tx);
    let stored = s.client.get_transaction(&tx);
    assert_eq!(stored.status, TxStatus::Queued);
    assert_eq!(stored.confirmation_count, 2);

    s.client.confirm_proposal(&s.b, &limit);
    let stored = s.client.get_proposal(&limit);
    assert_eq!(stored.status, TxStatus::Queued);
    assert_eq!(stored.confirmation_count, 2);
}

#[test]
fn test_reconfirming_below_threshold_still_fails() {
    let s = setup_with(3, 0);
    let id = propose(&s, ProposalAction::ChangeThreshold(2));

    let result = s.client.try_confirm_proposal(&s.b, &id);
    assert_eq!(result, Err(Ok(MultisigError::AlreadyConfirmed)));
    assert_eq!(s.client.get_proposal(&id).confirmation_count, 2);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone, Debug)]
pub struct ProposalExecutedRecord {
    pub executor: Address,
    pub action: ProposalAction,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ThresholdRecord {
    pub threshold: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RecoveryRecord {
    pub new_owner: Address,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DeactivatedRecord {
    pub deactivated_by: Address,
}

#[test]
fn test_governance_publishes_events() {
    let s = setup();

    let id = propose(&s, ProposalAction::ChangeThreshold(3));
    let (topics, data) = vault_event(&s, "proposal_queued").expect("queued event");
    assert_eq!(event_id(&s, &topics), id);
    let record = QueuedRecord::try_from_val(&s.env, &data).expect("queued data");
    assert_eq!(record.execute_after, START + GOVERNANCE_DELAY);

    advance(&s.env, GOVERNANCE_DELAY);
    s.client.execute_proposal(&s.c, &id);

    let (topics, data) = vault_event(&s, "proposal_executed").expect("executed event");
    assert_eq!(event_id(&s, &topics), id);
    let record = ProposalExecutedRecord::try_from_val(&s.env, &data).expect("executed data");
    assert_eq!(record.executor, s.c);
    assert_eq!(record.action, ProposalAction::ChangeThreshold(3));

    let (_topics, data) = vault_event(&s, "threshold_changed").expect("threshold event");
    let record = ThresholdRecord::try_from_val(&s.env, &data).expect("threshold data");
    assert_eq!(record.threshold, 3);
}
